pub mod file_tree;
pub mod scan_result;
pub mod top_file_entry;
pub mod artifact;
pub mod duplicate;
pub mod classification;
pub mod action;
pub mod cleanup_plan;
pub mod risk;

pub use file_tree::*;
pub use scan_result::*;
pub use top_file_entry::*;
pub use artifact::*;
pub use duplicate::*;
pub use classification::*;
pub use action::*;
pub use cleanup_plan::*;
pub use risk::*;
