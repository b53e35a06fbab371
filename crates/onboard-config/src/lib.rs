//! onboard-config
//!
//! Tunable wizard limits and policies plus their disk persistence.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{SingleKindPolicy, WizardConfig};
