//! Drives a [`WizardController`] from a [`StepInteraction`]: prompts every
//! field of the current step, applies the answers, then asks the controller
//! to advance.

use onboard_domain::{
    keys, ContentType, FieldValue, FileHandle, FormValues, LocationCatalog, Offer, OfferId,
    OfferKind,
};

use super::interaction::{split_list, PromptContext, PromptResponse, StepInteraction};
use super::output;
use crate::errors::OnboardError;
use crate::forms::{
    engine, FieldDescriptor, FieldKind, StepDefinition, SubmissionRecord, SubmissionSink,
    Transition, WizardController,
};

/// How an interactive run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Submitted(SubmissionRecord),
    Cancelled,
}

enum StepControl {
    Done,
    Back,
    Cancel,
}

pub struct WizardRunner<I: StepInteraction> {
    interaction: I,
}

impl<I: StepInteraction> WizardRunner<I> {
    pub fn new(interaction: I) -> Self {
        Self { interaction }
    }

    pub fn into_inner(self) -> I {
        self.interaction
    }

    pub fn run<S: SubmissionSink>(
        &mut self,
        wizard: &mut WizardController<S>,
    ) -> Result<RunOutcome, OnboardError> {
        let total = wizard.steps().len();
        loop {
            if let Some(record) = wizard.submission() {
                return Ok(RunOutcome::Submitted(record.clone()));
            }

            let step = wizard.step().clone();
            output::section(format!("Step {}/{}: {}", step.number, total, step.title));

            match self.fill_step(wizard, &step, total)? {
                StepControl::Cancel => {
                    output::warning("Wizard cancelled.");
                    return Ok(RunOutcome::Cancelled);
                }
                StepControl::Back => {
                    if wizard.previous() == Transition::Unchanged {
                        output::info("Already on the first step.");
                    }
                    continue;
                }
                StepControl::Done => {}
            }

            match wizard.next() {
                Transition::Advanced => {}
                Transition::Submitted => output::success("Listing submitted."),
                Transition::Rejected => {
                    output::error("Please fix the following before continuing:");
                    for line in engine::summarize(wizard.errors()) {
                        output::warning(line);
                    }
                }
                Transition::Retreated | Transition::Unchanged => {}
            }
        }
    }

    fn fill_step<S: SubmissionSink>(
        &mut self,
        wizard: &mut WizardController<S>,
        step: &StepDefinition,
        total: usize,
    ) -> Result<StepControl, OnboardError> {
        for descriptor in &step.fields {
            let control = match descriptor.kind {
                FieldKind::Offers => self.edit_offers(wizard)?,
                _ => self.fill_field(wizard, descriptor, step.number, total)?,
            };
            if !matches!(control, StepControl::Done) {
                return Ok(control);
            }
        }
        Ok(StepControl::Done)
    }

    fn fill_field<S: SubmissionSink>(
        &mut self,
        wizard: &mut WizardController<S>,
        descriptor: &FieldDescriptor,
        step: usize,
        total: usize,
    ) -> Result<StepControl, OnboardError> {
        loop {
            let response = {
                let context = PromptContext {
                    descriptor,
                    options: options_for(&descriptor.kind, wizard.values()),
                    current: wizard.get(descriptor.key).and_then(render_value),
                    error: wizard.errors().get(descriptor.key).map(String::as_str),
                    step,
                    total_steps: total,
                };
                self.interaction.prompt_field(&context)?
            };

            let raw = match response {
                PromptResponse::Keep => return Ok(StepControl::Done),
                PromptResponse::Back => return Ok(StepControl::Back),
                PromptResponse::Cancel => return Ok(StepControl::Cancel),
                PromptResponse::Value(raw) => raw,
            };

            let options = options_for(&descriptor.kind, wizard.values());
            match parse_input(&descriptor.kind, &options, &raw) {
                Ok(value) => {
                    let cleared = wizard.set_field(descriptor.key, value);
                    if !cleared.is_empty() {
                        output::info(format!("Cleared {}.", cleared.join(", ")));
                    }
                    return Ok(StepControl::Done);
                }
                Err(message) => output::warning(message),
            }
        }
    }

    fn edit_offers<S: SubmissionSink>(
        &mut self,
        wizard: &mut WizardController<S>,
    ) -> Result<StepControl, OnboardError> {
        print_offers(wizard.values().offers());
        loop {
            let line = match self.interaction.prompt_offer_command()? {
                PromptResponse::Keep => return Ok(StepControl::Done),
                PromptResponse::Back => return Ok(StepControl::Back),
                PromptResponse::Cancel => return Ok(StepControl::Cancel),
                PromptResponse::Value(line) => line,
            };
            let command = match OfferCommand::parse(&line) {
                Ok(command) => command,
                Err(message) => {
                    output::warning(message);
                    continue;
                }
            };
            if command == OfferCommand::Done {
                return Ok(StepControl::Done);
            }
            match apply_offer_command(wizard, command) {
                Ok(Some(message)) => output::success(message),
                Ok(None) => {}
                Err(message) => output::warning(message),
            }
        }
    }
}

/// Offer editor commands. Offer and item numbers are 1-based positions.
#[derive(Debug, Clone, PartialEq)]
pub enum OfferCommand {
    Add,
    Remove(usize),
    Kind(usize, OfferKind),
    Name(usize, String),
    Price(usize, f64),
    AddItem(usize),
    DropItem(usize, usize),
    SetItem(usize, usize, ContentType, u32),
    Move(usize, usize),
    List,
    Done,
}

impl OfferCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().unwrap_or_default().to_ascii_lowercase();
        let rest: Vec<&str> = parts.collect();

        let position = |index: usize| -> Result<usize, String> {
            rest.get(index)
                .and_then(|raw| raw.parse::<usize>().ok())
                .filter(|value| *value > 0)
                .ok_or_else(|| format!("`{}` needs a position starting at 1", verb))
        };

        match verb.as_str() {
            "add" => Ok(OfferCommand::Add),
            "list" => Ok(OfferCommand::List),
            "done" => Ok(OfferCommand::Done),
            "remove" => Ok(OfferCommand::Remove(position(0)?)),
            "item" => Ok(OfferCommand::AddItem(position(0)?)),
            "drop" => Ok(OfferCommand::DropItem(position(0)?, position(1)?)),
            "move" => Ok(OfferCommand::Move(position(0)?, position(1)?)),
            "kind" => {
                let kind = rest
                    .get(1)
                    .and_then(|raw| OfferKind::parse(raw))
                    .ok_or_else(|| "usage: kind N single|combo".to_string())?;
                Ok(OfferCommand::Kind(position(0)?, kind))
            }
            "name" => Ok(OfferCommand::Name(
                position(0)?,
                rest.get(1..).unwrap_or_default().join(" "),
            )),
            "price" => {
                let price = rest
                    .get(1)
                    .and_then(|raw| raw.parse::<f64>().ok())
                    .filter(|price| price.is_finite())
                    .ok_or_else(|| "usage: price N AMOUNT".to_string())?;
                Ok(OfferCommand::Price(position(0)?, price))
            }
            "set" => {
                let content_type = rest
                    .get(2)
                    .and_then(|raw| ContentType::parse(raw))
                    .ok_or_else(|| "usage: set N M TYPE QUANTITY".to_string())?;
                let quantity = rest
                    .get(3)
                    .and_then(|raw| raw.parse::<u32>().ok())
                    .ok_or_else(|| "usage: set N M TYPE QUANTITY".to_string())?;
                Ok(OfferCommand::SetItem(
                    position(0)?,
                    position(1)?,
                    content_type,
                    quantity,
                ))
            }
            other => Err(format!("Unknown offer command `{}`", other)),
        }
    }
}

fn offer_id_at<S: SubmissionSink>(
    wizard: &WizardController<S>,
    position: usize,
) -> Result<OfferId, String> {
    wizard
        .values()
        .offers()
        .get(position - 1)
        .map(|offer| offer.id)
        .ok_or_else(|| format!("There is no offer {}", position))
}

fn apply_offer_command<S: SubmissionSink>(
    wizard: &mut WizardController<S>,
    command: OfferCommand,
) -> Result<Option<String>, String> {
    let result = execute_offer_command(wizard, command);
    print_offers(wizard.values().offers());
    result
}

fn execute_offer_command<S: SubmissionSink>(
    wizard: &mut WizardController<S>,
    command: OfferCommand,
) -> Result<Option<String>, String> {
    match command {
        OfferCommand::Add => {
            let id = wizard.offers().add_offer().map_err(|err| err.to_string())?;
            Ok(Some(format!("Added {}.", id)))
        }
        OfferCommand::Remove(position) => {
            let id = offer_id_at(wizard, position)?;
            wizard.offers().remove_offer(id);
            Ok(Some(format!("Removed {}.", id)))
        }
        OfferCommand::Kind(position, kind) => {
            let id = offer_id_at(wizard, position)?;
            wizard
                .offers()
                .set_offer_kind(id, kind)
                .map_err(|err| err.to_string())?;
            Ok(None)
        }
        OfferCommand::Name(position, name) => {
            let id = offer_id_at(wizard, position)?;
            wizard
                .offers()
                .rename_offer(id, &name)
                .map_err(|err| err.to_string())?;
            Ok(None)
        }
        OfferCommand::Price(position, price) => {
            let id = offer_id_at(wizard, position)?;
            wizard
                .offers()
                .set_offer_price(id, price)
                .map_err(|err| err.to_string())?;
            Ok(None)
        }
        OfferCommand::AddItem(position) => {
            let id = offer_id_at(wizard, position)?;
            let index = wizard.offers().add_item(id).map_err(|err| err.to_string())?;
            Ok(Some(format!("Added item {} to {}.", index + 1, id)))
        }
        OfferCommand::DropItem(position, item) => {
            let id = offer_id_at(wizard, position)?;
            wizard
                .offers()
                .remove_item(id, item - 1)
                .map_err(|err| err.to_string())?;
            Ok(None)
        }
        OfferCommand::SetItem(position, item, content_type, quantity) => {
            let id = offer_id_at(wizard, position)?;
            wizard
                .offers()
                .update_item(id, item - 1, Some(content_type), Some(quantity))
                .map_err(|err| err.to_string())?;
            Ok(None)
        }
        OfferCommand::Move(position, target) => {
            let id = offer_id_at(wizard, position)?;
            wizard
                .offers()
                .move_offer(id, target - 1)
                .map_err(|err| err.to_string())?;
            Ok(None)
        }
        OfferCommand::List | OfferCommand::Done => Ok(None),
    }
}

fn print_offers(offers: &[Offer]) {
    if offers.is_empty() {
        output::info("No offers yet. Type `add` to create one or press enter to skip.");
        return;
    }
    for (position, offer) in offers.iter().enumerate() {
        let items: Vec<String> = offer
            .items
            .iter()
            .map(|item| {
                let content = item
                    .content_type
                    .map(|content| content.to_string())
                    .unwrap_or_else(|| "?".into());
                let quantity = item
                    .quantity
                    .map(|quantity| quantity.to_string())
                    .unwrap_or_else(|| "?".into());
                format!("{} x{}", content, quantity)
            })
            .collect();
        let name = if offer.name.is_empty() {
            String::new()
        } else {
            format!(" \"{}\"", offer.name)
        };
        output::info(format!(
            "{}. {} {}{} @ {:.2}: {}",
            position + 1,
            offer.id,
            offer.kind,
            name,
            offer.price,
            items.join(", ")
        ));
    }
}

/// Options offered for a field, narrowed by parent values for dependent
/// choices.
pub fn options_for(kind: &FieldKind, values: &FormValues) -> Vec<String> {
    match kind {
        FieldKind::Choice(options) | FieldKind::MultiChoice(options) => options.clone(),
        FieldKind::DependentChoice(parent) => {
            let state = values.text(keys::STATE).unwrap_or_default();
            let found = if parent == keys::STATE {
                LocationCatalog::cities(state)
            } else if parent == keys::CITY {
                LocationCatalog::localities(state, values.text(keys::CITY).unwrap_or_default())
            } else {
                Vec::new()
            };
            found.into_iter().map(str::to_string).collect()
        }
        _ => Vec::new(),
    }
}

/// Converts a typed answer into the value stored for a field. An empty
/// answer clears the field.
pub fn parse_input(kind: &FieldKind, options: &[String], raw: &str) -> Result<FieldValue, String> {
    let raw = raw.trim();
    match kind {
        FieldKind::Number => {
            if raw.is_empty() {
                return Ok(FieldValue::Text(String::new()));
            }
            raw.parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
                .map(FieldValue::Number)
                .ok_or_else(|| format!("`{}` is not a number", raw))
        }
        FieldKind::MultiChoice(_) => Ok(FieldValue::set(
            split_list(raw)
                .into_iter()
                .map(|value| canonical(options, &value)),
        )),
        FieldKind::Choice(_) | FieldKind::DependentChoice(_) => {
            Ok(FieldValue::Text(canonical(options, raw)))
        }
        FieldKind::File => {
            if raw.is_empty() {
                Ok(FieldValue::Text(String::new()))
            } else {
                let mut handle = FileHandle::new(raw);
                handle.file_name = raw.rsplit(['/', '\\']).next().map(str::to_string);
                Ok(FieldValue::File(handle))
            }
        }
        FieldKind::Offers => Err("offers are edited with offer commands".to_string()),
        FieldKind::Text | FieldKind::LongText | FieldKind::Url => {
            Ok(FieldValue::Text(raw.to_string()))
        }
    }
}

fn canonical(options: &[String], value: &str) -> String {
    options
        .iter()
        .find(|option| option.eq_ignore_ascii_case(value))
        .cloned()
        .unwrap_or_else(|| value.to_string())
}

/// Single-line rendering of a stored value, used as the prompt default.
pub fn render_value(value: &FieldValue) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    match value {
        FieldValue::Text(text) => Some(text.clone()),
        FieldValue::Number(number) => Some(number.to_string()),
        FieldValue::Set(set) => Some(set.iter().cloned().collect::<Vec<_>>().join(", ")),
        FieldValue::File(handle) => Some(handle.reference.clone()),
        FieldValue::Offers(offers) => Some(format!("{} offers", offers.len())),
    }
}
