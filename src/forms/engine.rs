//! Rule interpreter: evaluates a step schema against the form values.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use onboard_domain::FormValues;
use tracing::{debug, warn};

use super::rules::RuleSet;
use super::schema::StepSchema;
use crate::errors::RuleError;

/// field → first failing message
pub type FieldErrors = BTreeMap<String, String>;

/// Shown in place of a rule that could not be evaluated.
pub const CONFIGURATION_ERROR_MESSAGE: &str =
    "This field could not be checked because of a configuration error";

/// Checks every field in `schema`. Fields short-circuit on their first
/// failing rule; an empty map means the step is valid. Never panics.
pub fn validate(values: &FormValues, schema: &StepSchema) -> FieldErrors {
    let errors: FieldErrors = schema
        .field_rules()
        .filter_map(|(field, rules)| {
            evaluate(values, field, rules).map(|message| (field.to_string(), message))
        })
        .collect();
    debug!(
        step = schema.step_number,
        failures = errors.len(),
        "validated step"
    );
    errors
}

/// Checks a single field. `None` when the field passes or has no rules.
pub fn validate_field(values: &FormValues, schema: &StepSchema, field: &str) -> Option<String> {
    schema
        .rules_for(field)
        .and_then(|rules| evaluate(values, field, rules))
}

fn evaluate(values: &FormValues, field: &str, rules: &RuleSet) -> Option<String> {
    for rule in rules.rules() {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.check(values, field)))
            .unwrap_or_else(|_| {
                Err(RuleError::Panicked {
                    rule: rule.describe(),
                })
            });
        match outcome {
            Ok(None) => continue,
            Ok(Some(message)) => return Some(message),
            Err(err) => {
                warn!(field, error = %err, "rule downgraded to configuration error");
                return Some(CONFIGURATION_ERROR_MESSAGE.to_string());
            }
        }
    }
    None
}

/// `field: message` lines in field order.
pub fn summarize(errors: &FieldErrors) -> Vec<String> {
    errors
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect()
}
