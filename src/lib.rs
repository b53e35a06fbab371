#![doc(test(attr(deny(warnings))))]

//! Onboard Core implements the influencer listing wizard: step-gated
//! validation, the live-editable offer collection and dependent-field
//! handling, independent of any particular UI.

pub mod cli;
pub mod errors;
pub mod forms;
pub mod utils;

pub use onboard_config as config;
pub use onboard_domain as domain;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Onboard Core tracing initialized.");
    });
}
