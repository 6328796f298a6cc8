pub mod scanner;
pub mod filters;
pub mod artifacts;
pub mod duplicates;

pub use scanner::{scan_path, scan_path_with_progress, ProgressCb};
pub use filters::*;
pub use artifacts::{default_patterns, detect_artifacts, ArtifactConfig, ArtifactPattern};
pub use duplicates::find_duplicates;
pub use ai_storage_domain::ScanResult;
