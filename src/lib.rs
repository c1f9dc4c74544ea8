pub mod agents;
pub mod config;
pub mod error;
pub mod external;
pub mod html;
pub mod lang;
pub mod providers;
pub mod resilience;
pub mod types;
pub mod workflow;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
pub use workflow::Workflow;
