//! Step sequencing for the listing wizard.
//!
//! `Step(1) → Step(2) → … → Submitted`, with unvalidated backward moves.
//! Leaving a step forward requires its schema to pass; the last step hands
//! the accumulated values to a [`SubmissionSink`].

use std::collections::BTreeSet;
use std::fmt;

use onboard_config::WizardConfig;
use onboard_domain::{FieldValue, FormValues, OfferIdAllocator};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::engine::{self, FieldErrors};
use super::offers::OfferCollectionEditor;
use super::schema::{listing_steps, StepDefinition};
use super::store::FormStateStore;
use super::submission::{SubmissionRecord, SubmissionSink};
use crate::errors::OnboardError;

/// Error key used when the submission sink refuses the listing.
pub const SUBMISSION_ERROR_KEY: &str = "submission";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Influencer,
    Brand,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UserRole::Influencer => "influencer",
            UserRole::Brand => "brand",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardMode {
    /// New listing.
    #[default]
    Create,
    /// Profile edit, pre-populated from an existing listing.
    Edit,
}

/// Caller-supplied facts about who is filling in the wizard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardContext {
    pub role: UserRole,
    pub mode: WizardMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardPhase {
    Step(usize),
    Submitted,
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Advanced,
    Retreated,
    Rejected,
    Submitted,
    /// Nothing to do (first step going back, already submitted, or submit
    /// requested before the last step).
    Unchanged,
}

/// Serializable view of the wizard for renderers and resumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardSnapshot {
    pub phase: WizardPhase,
    pub values: FormValues,
    pub errors: FieldErrors,
    pub touched: BTreeSet<String>,
}

pub struct WizardController<S: SubmissionSink> {
    steps: Vec<StepDefinition>,
    config: WizardConfig,
    context: WizardContext,
    store: FormStateStore,
    ids: OfferIdAllocator,
    phase: WizardPhase,
    sink: S,
    submission: Option<SubmissionRecord>,
}

impl<S: SubmissionSink> WizardController<S> {
    pub fn new(
        steps: Vec<StepDefinition>,
        store: FormStateStore,
        config: WizardConfig,
        context: WizardContext,
        sink: S,
    ) -> Result<Self, OnboardError> {
        if steps.is_empty() {
            return Err(OnboardError::InvalidInput(
                "a wizard needs at least one step".into(),
            ));
        }
        config.validate()?;
        let ids = OfferIdAllocator::seeded_above(store.values().offers());
        Ok(Self {
            steps,
            config,
            context,
            store,
            ids,
            phase: WizardPhase::Step(1),
            sink,
            submission: None,
        })
    }

    /// The three-step influencer listing wizard.
    pub fn listing(config: WizardConfig, context: WizardContext, sink: S) -> Result<Self, OnboardError> {
        let steps = listing_steps(&config);
        Self::new(steps, FormStateStore::for_listing(), config, context, sink)
    }

    /// Pre-populates the wizard, typically with an existing listing in edit
    /// mode. New offers get ids above any id already present.
    pub fn with_values(mut self, values: FormValues) -> Self {
        self.reset(values);
        self
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn is_submitted(&self) -> bool {
        self.phase == WizardPhase::Submitted
    }

    /// 1-based step number; stays on the last step once submitted.
    pub fn current_step(&self) -> usize {
        match self.phase {
            WizardPhase::Step(number) => number,
            WizardPhase::Submitted => self.steps.len(),
        }
    }

    pub fn step(&self) -> &StepDefinition {
        &self.steps[self.current_step() - 1]
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    pub fn values(&self) -> &FormValues {
        self.store.values()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.store.get(key)
    }

    pub fn errors(&self) -> &FieldErrors {
        self.store.errors()
    }

    pub fn touched(&self) -> &BTreeSet<String> {
        self.store.touched()
    }

    pub fn store(&self) -> &FormStateStore {
        &self.store
    }

    pub fn context(&self) -> WizardContext {
        self.context
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Record handed to the sink, once submitted.
    pub fn submission(&self) -> Option<&SubmissionRecord> {
        self.submission.as_ref()
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        WizardSnapshot {
            phase: self.phase,
            values: self.store.values().clone(),
            errors: self.store.errors().clone(),
            touched: self.store.touched().clone(),
        }
    }

    /// Writes a field. Returns dependent keys that were cleared.
    pub fn set_field(&mut self, key: &str, value: FieldValue) -> Vec<String> {
        self.set_fields(vec![(key.to_string(), value)])
    }

    /// Writes a batch of fields as one update.
    pub fn set_fields(&mut self, updates: Vec<(String, FieldValue)>) -> Vec<String> {
        if self.is_submitted() {
            warn!("ignoring field update after submission");
            return Vec::new();
        }
        let mut changed: Vec<String> = updates.iter().map(|(key, _)| key.clone()).collect();
        let cleared = self.store.set_many(updates);
        changed.extend(cleared.iter().cloned());
        if self.config.validate_on_change {
            self.revalidate(&changed);
        }
        cleared
    }

    /// Editor over the `offers` field. Edits go straight to the store.
    pub fn offers(&mut self) -> OfferCollectionEditor<'_> {
        OfferCollectionEditor::new(&mut self.store, &mut self.ids, &self.config)
    }

    /// Re-checks one field of the current step and updates its message.
    pub fn revalidate_field(&mut self, key: &str) -> Option<String> {
        let message = engine::validate_field(self.store.values(), &self.step().schema, key);
        self.store.set_error(key, message.clone());
        message
    }

    /// Errors the current step would report, without changing any state.
    pub fn preview_errors(&self) -> FieldErrors {
        engine::validate(self.store.values(), &self.step().schema)
    }

    /// Validates the current step and moves forward. On the last step this
    /// is [`WizardController::submit`].
    pub fn next(&mut self) -> Transition {
        let WizardPhase::Step(number) = self.phase else {
            return Transition::Unchanged;
        };
        if self.is_last(number) {
            return self.submit();
        }
        if !self.gate(number) {
            return Transition::Rejected;
        }
        self.phase = WizardPhase::Step(number + 1);
        info!(from = number, to = number + 1, "wizard advanced");
        Transition::Advanced
    }

    /// Steps back without validating. Errors and values are left as they are.
    pub fn previous(&mut self) -> Transition {
        match self.phase {
            WizardPhase::Step(number) if number > 1 => {
                self.phase = WizardPhase::Step(number - 1);
                debug!(from = number, to = number - 1, "wizard moved back");
                Transition::Retreated
            }
            _ => Transition::Unchanged,
        }
    }

    /// Validates the last step and hands the values to the sink.
    pub fn submit(&mut self) -> Transition {
        let WizardPhase::Step(number) = self.phase else {
            return Transition::Unchanged;
        };
        if !self.is_last(number) {
            warn!(step = number, "submit requested before the last step");
            return Transition::Unchanged;
        }
        if !self.gate(number) {
            return Transition::Rejected;
        }

        let record = SubmissionRecord::new(self.context, self.store.values().clone());
        match self.sink.submit(&record) {
            Ok(()) => {
                info!(
                    submission = %record.id,
                    offers = record.values.offers().len(),
                    "wizard submitted"
                );
                self.phase = WizardPhase::Submitted;
                self.submission = Some(record);
                Transition::Submitted
            }
            Err(err) => {
                warn!(error = %err, "submission sink refused the listing");
                self.store
                    .set_error(SUBMISSION_ERROR_KEY, Some(format!("Submission failed: {}", err)));
                Transition::Rejected
            }
        }
    }

    /// Starts over from step 1 with `values`.
    pub fn reset(&mut self, values: FormValues) {
        self.ids.observe(values.offers());
        self.store.reset(values);
        self.phase = WizardPhase::Step(1);
        self.submission = None;
        debug!("wizard reset");
    }

    /// Restores a snapshot taken with [`WizardController::snapshot`].
    /// The submission record is not part of a snapshot, so a submitted
    /// snapshot resumes on the last step, ready to be submitted again.
    pub fn resume(&mut self, snapshot: WizardSnapshot) {
        self.reset(snapshot.values);
        self.store.set_errors(snapshot.errors);
        self.store.touch(snapshot.touched);
        let last = self.steps.len();
        self.phase = match snapshot.phase {
            WizardPhase::Step(number) => WizardPhase::Step(number.clamp(1, last)),
            WizardPhase::Submitted => WizardPhase::Step(last),
        };
    }

    fn is_last(&self, number: usize) -> bool {
        number >= self.steps.len() || self.steps[number - 1].terminal
    }

    /// Runs the step schema; on failure records errors and touches the
    /// step's fields so the renderer shows them.
    fn gate(&mut self, number: usize) -> bool {
        let step = &self.steps[number - 1];
        let errors = engine::validate(self.store.values(), &step.schema);
        if errors.is_empty() {
            self.store.set_errors(FieldErrors::new());
            return true;
        }
        warn!(
            step = number,
            fields = ?errors.keys().collect::<Vec<_>>(),
            "step rejected"
        );
        self.store.touch(step.field_keys());
        self.store.set_errors(errors);
        false
    }

    fn revalidate(&mut self, changed: &[String]) {
        if matches!(self.phase, WizardPhase::Submitted) {
            return;
        }
        let mut targets: Vec<String> = self.store.errors().keys().cloned().collect();
        for key in changed {
            if self.store.is_touched(key) && !targets.contains(key) {
                targets.push(key.clone());
            }
        }
        for key in targets {
            if key == SUBMISSION_ERROR_KEY {
                continue;
            }
            if self.step().schema.rules_for(&key).is_none() {
                continue;
            }
            self.revalidate_field(&key);
        }
    }
}

impl<S: SubmissionSink> fmt::Debug for WizardController<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardController")
            .field("phase", &self.phase)
            .field("context", &self.context)
            .field("fields", &self.store.values().len())
            .field("offers", &self.store.values().offers().len())
            .field("errors", &self.store.errors().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::submission::MemorySink;
    use onboard_domain::{keys, FileHandle};

    fn wizard() -> WizardController<MemorySink> {
        WizardController::listing(
            WizardConfig::default(),
            WizardContext::default(),
            MemorySink::new(),
        )
        .expect("listing wizard")
    }

    fn fill_profile(wizard: &mut WizardController<MemorySink>) {
        wizard.set_fields(vec![
            (keys::NAME.into(), FieldValue::text("Ana")),
            (keys::PLATFORMS.into(), FieldValue::set(["youtube"])),
            (
                keys::YOUTUBE_URL.into(),
                FieldValue::text("https://youtube.com/@ana"),
            ),
            (keys::CATEGORIES.into(), FieldValue::set(["Travel"])),
            (keys::LANGUAGES.into(), FieldValue::set(["English"])),
            (keys::STATE.into(), FieldValue::text("Maharashtra")),
            (keys::CITY.into(), FieldValue::text("Mumbai")),
        ]);
    }

    #[test]
    fn starts_on_step_one() {
        let wizard = wizard();
        assert_eq!(wizard.current_step(), 1);
        assert_eq!(wizard.phase(), WizardPhase::Step(1));
        assert!(wizard.values().is_empty());
    }

    #[test]
    fn empty_step_is_rejected_and_touched() {
        let mut wizard = wizard();
        assert_eq!(wizard.next(), Transition::Rejected);
        assert_eq!(wizard.current_step(), 1);
        assert_eq!(wizard.errors()[keys::NAME], "Name is required");
        assert!(wizard.touched().contains(keys::CITY));
    }

    #[test]
    fn previous_on_first_step_is_a_no_op() {
        let mut wizard = wizard();
        assert_eq!(wizard.previous(), Transition::Unchanged);
        assert_eq!(wizard.current_step(), 1);
    }

    #[test]
    fn submit_before_last_step_is_ignored() {
        let mut wizard = wizard();
        fill_profile(&mut wizard);
        assert_eq!(wizard.submit(), Transition::Unchanged);
        assert_eq!(wizard.current_step(), 1);
        assert!(wizard.sink().records.is_empty());
    }

    #[test]
    fn fixing_a_field_clears_its_error_on_change() {
        let mut wizard = wizard();
        wizard.next();
        assert!(wizard.errors().contains_key(keys::NAME));
        wizard.set_field(keys::NAME, FieldValue::text("Ana"));
        assert!(!wizard.errors().contains_key(keys::NAME));
    }

    #[test]
    fn edit_mode_seeds_offer_ids_above_existing() {
        let mut existing = FormValues::new();
        existing.insert(
            keys::OFFERS,
            FieldValue::Offers(vec![onboard_domain::Offer::new(onboard_domain::OfferId(5))]),
        );
        let mut wizard = WizardController::listing(
            WizardConfig::default(),
            WizardContext {
                role: UserRole::Influencer,
                mode: WizardMode::Edit,
            },
            MemorySink::new(),
        )
        .unwrap()
        .with_values(existing);

        let id = wizard.offers().add_offer().unwrap();
        assert_eq!(id, onboard_domain::OfferId(6));
    }

    #[test]
    fn full_pass_submits_once() {
        let mut wizard = wizard();
        fill_profile(&mut wizard);
        assert_eq!(wizard.next(), Transition::Advanced);
        wizard.set_fields(vec![
            (keys::STARTING_PRICE.into(), FieldValue::Number(1000.0)),
            (keys::YOUTUBE_VIDEO_PRICE.into(), FieldValue::Number(5000.0)),
            (keys::YOUTUBE_SHORT_PRICE.into(), FieldValue::Number(1500.0)),
        ]);
        assert_eq!(wizard.next(), Transition::Advanced);
        wizard.set_field(
            keys::PROFILE_IMAGE,
            FieldValue::File(FileHandle::new("upload://avatar")),
        );
        assert_eq!(wizard.next(), Transition::Submitted);
        assert!(wizard.is_submitted());
        assert_eq!(wizard.next(), Transition::Unchanged);
        assert_eq!(wizard.previous(), Transition::Unchanged);
        assert_eq!(wizard.sink().records.len(), 1);
    }

    #[test]
    fn empty_step_list_is_refused() {
        let result = WizardController::new(
            Vec::new(),
            FormStateStore::new(),
            WizardConfig::default(),
            WizardContext::default(),
            MemorySink::new(),
        );
        assert!(matches!(result, Err(OnboardError::InvalidInput(_))));
    }
}
