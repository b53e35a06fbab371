pub mod interaction;
pub mod output;
pub mod runner;

use std::io;
use std::path::{Path, PathBuf};

use onboard_config::{ConfigManager, WizardConfig};
use serde::Serialize;
use tracing::debug;

use crate::errors::OnboardError;
use crate::forms::{
    engine, listing_steps, FieldDescriptor, JsonFileSink, WizardContext, WizardController,
};
use crate::utils::{build_info, persistence};
use interaction::{ScriptInteraction, StepInteraction, TerminalInteraction};
use runner::{RunOutcome, WizardRunner};

/// Switches `run` from dialoguer prompts to one answer per stdin line.
pub const SCRIPT_ENV: &str = "ONBOARD_CLI_SCRIPT";
/// Overrides the config file location.
pub const CONFIG_ENV: &str = "ONBOARD_CONFIG";

const USAGE: &str = "\
usage: onboard_cli <command> [options]

commands:
  steps                    print the wizard steps as JSON
  check <values.json>      validate saved values against every step
  run [--out <dir>]        fill in the listing wizard and submit it
  version                  print build information
  help                     show this message

options:
  --config <path>          read wizard settings from <path>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Steps,
    Check(PathBuf),
    Run { out: Option<PathBuf> },
    Version,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub command: CliCommand,
    pub config: Option<PathBuf>,
}

impl CliArgs {
    pub fn parse<I, S>(args: I) -> Result<Self, OnboardError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut positional = Vec::new();
        let mut config = None;
        let mut out = None;
        let mut args = args.into_iter().map(Into::<String>::into);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => config = Some(PathBuf::from(expect_value(&mut args, "--config")?)),
                "--out" => out = Some(PathBuf::from(expect_value(&mut args, "--out")?)),
                "-h" | "--help" => positional.insert(0, "help".to_string()),
                _ => positional.push(arg),
            }
        }

        let command = match positional.first().map(String::as_str) {
            None | Some("help") => CliCommand::Help,
            Some("steps") => CliCommand::Steps,
            Some("version") => CliCommand::Version,
            Some("run") => CliCommand::Run { out },
            Some("check") => {
                let path = positional.get(1).ok_or_else(|| {
                    OnboardError::InvalidInput("`check` needs a values file".into())
                })?;
                CliCommand::Check(PathBuf::from(path))
            }
            Some(other) => {
                return Err(OnboardError::InvalidInput(format!(
                    "unknown command `{}` (try `help`)",
                    other
                )))
            }
        };
        Ok(Self { command, config })
    }
}

fn expect_value(
    args: &mut impl Iterator<Item = String>,
    flag: &str,
) -> Result<String, OnboardError> {
    args.next()
        .ok_or_else(|| OnboardError::InvalidInput(format!("{} needs a value", flag)))
}

/// Entry point used by the `onboard_cli` binary.
pub fn run_cli() -> Result<(), OnboardError> {
    let args = CliArgs::parse(std::env::args().skip(1))?;
    let script = std::env::var_os(SCRIPT_ENV).is_some();
    if script {
        output::set_plain(true);
    }
    execute(args, script)
}

pub fn execute(args: CliArgs, script: bool) -> Result<(), OnboardError> {
    debug!(command = ?args.command, "running command");
    match args.command {
        CliCommand::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        CliCommand::Version => {
            println!("{}", build_info::current().summary());
            Ok(())
        }
        CliCommand::Steps => {
            let config = load_config(args.config.as_deref())?;
            print_steps(&config)
        }
        CliCommand::Check(path) => {
            let config = load_config(args.config.as_deref())?;
            check_values(&config, &path)
        }
        CliCommand::Run { out } => {
            let config = load_config(args.config.as_deref())?;
            if script {
                run_wizard(config, out, ScriptInteraction::new(io::stdin().lock()))
            } else {
                run_wizard(config, out, TerminalInteraction::new())
            }
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<WizardConfig, OnboardError> {
    let manager = match path {
        Some(path) => ConfigManager::new(path.to_path_buf()),
        None => match std::env::var_os(CONFIG_ENV) {
            Some(path) => ConfigManager::new(PathBuf::from(path)),
            None => ConfigManager::from_default_location()?,
        },
    };
    debug!(path = %manager.config_path().display(), "loading wizard config");
    Ok(manager.load()?)
}

#[derive(Serialize)]
struct StepView<'a> {
    number: usize,
    title: &'a str,
    terminal: bool,
    fields: &'a [FieldDescriptor],
}

fn print_steps(config: &WizardConfig) -> Result<(), OnboardError> {
    let steps = listing_steps(config);
    let views: Vec<StepView<'_>> = steps
        .iter()
        .map(|step| StepView {
            number: step.number,
            title: step.title,
            terminal: step.terminal,
            fields: &step.fields,
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&views)?);
    Ok(())
}

fn check_values(config: &WizardConfig, path: &Path) -> Result<(), OnboardError> {
    let values = persistence::load_values(path)?;
    let mut failing = 0;
    for step in listing_steps(config) {
        let errors = engine::validate(&values, &step.schema);
        if errors.is_empty() {
            output::success(format!("Step {} ({}): ok", step.number, step.title));
            continue;
        }
        failing += 1;
        output::error(format!("Step {} ({}):", step.number, step.title));
        for line in engine::summarize(&errors) {
            output::warning(format!("  {}", line));
        }
    }
    if failing > 0 {
        return Err(OnboardError::InvalidInput(format!(
            "{} step(s) failed validation",
            failing
        )));
    }
    Ok(())
}

fn run_wizard<I: StepInteraction>(
    config: WizardConfig,
    out: Option<PathBuf>,
    interaction: I,
) -> Result<(), OnboardError> {
    let dir = out.unwrap_or_else(|| config.resolve_submission_dir());
    let sink = JsonFileSink::new(dir);
    let mut wizard = WizardController::listing(config, WizardContext::default(), sink)?;
    let mut runner = WizardRunner::new(interaction);

    match runner.run(&mut wizard)? {
        RunOutcome::Submitted(record) => {
            if let Some(path) = wizard.sink().written().last() {
                output::success(format!("Submission {} saved to {}", record.id, path.display()));
            }
        }
        RunOutcome::Cancelled => output::info("Nothing was submitted."),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_flags() {
        let args = CliArgs::parse(["run", "--out", "/tmp/listings"]).unwrap();
        assert_eq!(
            args.command,
            CliCommand::Run {
                out: Some(PathBuf::from("/tmp/listings"))
            }
        );

        let args = CliArgs::parse(["--config", "wizard.json", "check", "values.json"]).unwrap();
        assert_eq!(args.command, CliCommand::Check(PathBuf::from("values.json")));
        assert_eq!(args.config, Some(PathBuf::from("wizard.json")));

        assert_eq!(
            CliArgs::parse(Vec::<String>::new()).unwrap().command,
            CliCommand::Help
        );
    }

    #[test]
    fn rejects_unknown_command_and_missing_values() {
        assert!(matches!(
            CliArgs::parse(["launch"]),
            Err(OnboardError::InvalidInput(_))
        ));
        assert!(matches!(
            CliArgs::parse(["check"]),
            Err(OnboardError::InvalidInput(_))
        ));
        assert!(matches!(
            CliArgs::parse(["run", "--out"]),
            Err(OnboardError::InvalidInput(_))
        ));
    }
}
