//! onboard-domain
//!
//! Pure data types for the influencer listing wizard (form values, offers,
//! catalog entries). No I/O, no terminal, no validation policy.

pub mod catalog;
pub mod offer;
pub mod values;

pub use catalog::*;
pub use offer::*;
pub use values::*;
