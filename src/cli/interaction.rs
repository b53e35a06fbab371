//! Input sources for the wizard runner: an interactive terminal backed by
//! dialoguer, and a line script read from any `BufRead`.

use std::io::BufRead;

use dialoguer::{theme::ColorfulTheme, Input, MultiSelect, Select};

use crate::errors::OnboardError;
use crate::forms::{FieldDescriptor, FieldKind};

/// How a prompt was answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    /// User supplied a concrete value.
    Value(String),
    /// Keep whatever the field currently holds.
    Keep,
    /// Go back to the previous step.
    Back,
    /// Abort the wizard.
    Cancel,
}

impl PromptResponse {
    /// Maps a typed line onto a response: blank keeps, `:back` / `:cancel`
    /// navigate, `-` clears, anything else is a value.
    pub fn from_line(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            "" => PromptResponse::Keep,
            ":back" => PromptResponse::Back,
            ":cancel" | ":quit" => PromptResponse::Cancel,
            "-" => PromptResponse::Value(String::new()),
            _ => PromptResponse::Value(trimmed.to_string()),
        }
    }
}

/// Everything a prompt needs to render one field.
pub struct PromptContext<'a> {
    pub descriptor: &'a FieldDescriptor,
    /// Choices for choice fields, already narrowed for dependent choices.
    pub options: Vec<String>,
    pub current: Option<String>,
    pub error: Option<&'a str>,
    pub step: usize,
    pub total_steps: usize,
}

pub trait StepInteraction {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> Result<PromptResponse, OnboardError>;

    /// One offer-editor command (`add`, `kind 1 combo`, `done`, …).
    fn prompt_offer_command(&mut self) -> Result<PromptResponse, OnboardError>;
}

/// Reads one answer per line. End of input cancels the wizard.
pub struct ScriptInteraction<R: BufRead> {
    reader: R,
}

impl<R: BufRead> ScriptInteraction<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    fn next_line(&mut self) -> Result<Option<String>, OnboardError> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line)?;
        if read == 0 {
            Ok(None)
        } else {
            Ok(Some(line))
        }
    }
}

impl<R: BufRead> StepInteraction for ScriptInteraction<R> {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> Result<PromptResponse, OnboardError> {
        println!("{}:", context.descriptor.label);
        Ok(self
            .next_line()?
            .map(|line| PromptResponse::from_line(&line))
            .unwrap_or(PromptResponse::Cancel))
    }

    fn prompt_offer_command(&mut self) -> Result<PromptResponse, OnboardError> {
        println!("offer>");
        Ok(self
            .next_line()?
            .map(|line| PromptResponse::from_line(&line))
            .unwrap_or(PromptResponse::Cancel))
    }
}

/// Interactive prompts with dialoguer's colorful theme.
pub struct TerminalInteraction {
    theme: ColorfulTheme,
}

impl TerminalInteraction {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    fn prompt_label(context: &PromptContext<'_>) -> String {
        let mut label = format!(
            "[{}/{}] {}",
            context.step, context.total_steps, context.descriptor.label
        );
        if let Some(error) = context.error {
            label.push_str(&format!(" ({})", error));
        }
        label
    }

    fn prompt_text(&self, context: &PromptContext<'_>) -> Result<PromptResponse, OnboardError> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(Self::prompt_label(context))
            .allow_empty(true);
        if let Some(current) = &context.current {
            input = input.with_initial_text(current.clone());
        }
        let raw = input.interact_text()?;
        Ok(PromptResponse::from_line(&raw))
    }

    fn prompt_choice(&self, context: &PromptContext<'_>) -> Result<PromptResponse, OnboardError> {
        if context.options.is_empty() {
            return self.prompt_text(context);
        }
        let default = context
            .current
            .as_ref()
            .and_then(|current| {
                context
                    .options
                    .iter()
                    .position(|option| option.eq_ignore_ascii_case(current))
            })
            .unwrap_or(0);
        let selection = Select::with_theme(&self.theme)
            .with_prompt(Self::prompt_label(context))
            .items(&context.options)
            .default(default)
            .interact_opt()?;
        Ok(match selection {
            Some(index) => PromptResponse::Value(context.options[index].clone()),
            None => PromptResponse::Back,
        })
    }

    fn prompt_multi_choice(
        &self,
        context: &PromptContext<'_>,
    ) -> Result<PromptResponse, OnboardError> {
        let selected: Vec<String> = context
            .current
            .as_deref()
            .map(split_list)
            .unwrap_or_default();
        let defaults: Vec<bool> = context
            .options
            .iter()
            .map(|option| {
                selected
                    .iter()
                    .any(|value| value.eq_ignore_ascii_case(option))
            })
            .collect();
        let picked = MultiSelect::with_theme(&self.theme)
            .with_prompt(Self::prompt_label(context))
            .items(&context.options)
            .defaults(&defaults)
            .interact_opt()?;
        Ok(match picked {
            Some(indices) => PromptResponse::Value(
                indices
                    .into_iter()
                    .map(|index| context.options[index].clone())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            None => PromptResponse::Back,
        })
    }
}

impl Default for TerminalInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl StepInteraction for TerminalInteraction {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> Result<PromptResponse, OnboardError> {
        match context.descriptor.kind {
            FieldKind::Choice(_) | FieldKind::DependentChoice(_) => self.prompt_choice(context),
            FieldKind::MultiChoice(_) => self.prompt_multi_choice(context),
            _ => self.prompt_text(context),
        }
    }

    fn prompt_offer_command(&mut self) -> Result<PromptResponse, OnboardError> {
        let raw = Input::<String>::with_theme(&self.theme)
            .with_prompt("offer (add, kind N single|combo, item N, drop N M, set N M TYPE QTY, price N AMOUNT, name N TEXT, move N POS, remove N, done)")
            .allow_empty(true)
            .interact_text()?;
        Ok(PromptResponse::from_line(&raw))
    }
}

/// Splits a comma-separated answer into trimmed, non-empty entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}
