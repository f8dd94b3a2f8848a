//! Shell context, dispatch, and the CLI error types.

use std::{io, path::PathBuf};

use rust_decimal::Decimal;
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use uuid::Uuid;

use crate::{
    config::{Config, ConfigError, ConfigManager},
    core::{
        services::{InvoiceService, ServiceError},
        utils::app_data_dir,
    },
    currency::{format_amount, CurrencyCode, LocaleConfig},
    storage::{JsonStore, StorageError},
};

use super::commands;
use super::output;
use super::registry::{CommandEntry, CommandRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

/// Errors that end the shell.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Command failed: {0}")]
    Command(String),
}

/// Errors a single command reports before the shell moves on.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("No scope selected. Use `scope new` or `scope <id>` first.")]
    ScopeNotSelected,
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<StorageError> for CommandError {
    fn from(err: StorageError) -> Self {
        CommandError::Service(ServiceError::Storage(err))
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub service: InvoiceService<JsonStore>,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub base_dir: PathBuf,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_base_dir(mode, app_data_dir())
    }

    pub fn with_base_dir(mode: CliMode, base_dir: PathBuf) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let config_manager = ConfigManager::with_base_dir(base_dir.clone())?;
        let config = config_manager.load()?;
        let store = JsonStore::in_base_dir(&base_dir)?;
        let service = InvoiceService::with_lookback(store, config.lookback_months);

        Ok(Self {
            mode,
            registry,
            service,
            config_manager,
            config,
            base_dir,
            running: true,
        })
    }

    pub fn prompt(&self) -> String {
        match self.config.active_scope {
            Some(scope) => format!("invoice[{}]> ", short_id(scope)),
            None => "invoice> ".to_string(),
        }
    }

    pub fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn active_scope(&self) -> Result<Uuid, CommandError> {
        self.config.active_scope.ok_or(CommandError::ScopeNotSelected)
    }

    /// Switches the active scope and drops the cached months of the old one.
    pub(crate) fn set_scope(&mut self, scope: Uuid) -> CommandResult {
        if let Some(previous) = self.config.active_scope.replace(scope) {
            if previous != scope {
                self.service.invalidate_scope(previous);
            }
        }
        self.persist_config()
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    pub(crate) fn format_amount(&self, amount: Decimal) -> String {
        format_amount(
            amount,
            &CurrencyCode::new(self.config.currency.as_str()),
            &LocaleConfig::for_tag(&self.config.locale),
        )
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = shell_words::split(line)
            .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
        let Some(raw) = tokens.first() else {
            return Ok(LoopControl::Continue);
        };
        let command = raw.to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.dispatch(&command, raw, &args)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, input), name))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::hint(format!("Did you mean `{}`?", name));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::ScopeNotSelected => {
                output::error(CommandError::ScopeNotSelected.to_string());
                output::hint("Try `scope new` to start a fresh scope.");
                Ok(())
            }
            other => {
                output::error(other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn print_warning(&self, message: &str) {
        output::warning(message);
    }
}

pub(crate) fn short_id(id: Uuid) -> String {
    let mut short = id.simple().to_string();
    short.truncate(8);
    short
}
