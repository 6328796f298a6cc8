pub mod error;
pub mod config;
pub mod telemetry;
pub mod cancel;

pub use error::*;
pub use config::*;
pub use telemetry::*;
pub use cancel::*;
