//! Multi-step listing wizard: rules, step schemas, form state, the offer
//! editor and the controller that sequences them.

pub mod engine;
pub mod offers;
pub mod rules;
pub mod schema;
pub mod store;
pub mod submission;
pub mod wizard;

pub use engine::{validate, validate_field, FieldErrors, CONFIGURATION_ERROR_MESSAGE};
pub use offers::OfferCollectionEditor;
pub use rules::{Condition, OfferLimits, Pattern, RegexPattern, Rule, RuleSet};
pub use schema::{listing_steps, FieldDescriptor, FieldKind, StepDefinition, StepSchema};
pub use store::FormStateStore;
pub use submission::{
    JsonFileSink, LogSink, MemorySink, NoopSink, SubmissionRecord, SubmissionSink,
};
pub use wizard::{
    Transition, UserRole, WizardContext, WizardController, WizardMode, WizardPhase,
    WizardSnapshot,
};
