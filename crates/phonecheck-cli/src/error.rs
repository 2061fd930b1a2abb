use anyhow::Error;
use phonecheck_config::ConfigError;
use phonecheck_core::{CoreError, ReconciliationError};
use phonecheck_source::SourceError;
use std::process::ExitCode;
use thiserror::Error as ThisError;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_NOT_FOUND: u8 = 2;
pub const EXIT_INVALID_INPUT: u8 = 3;
pub const EXIT_SETUP: u8 = 4;
pub const EXIT_MISMATCH: u8 = 5;

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub fn invalid_input(message: impl Into<String>) -> Error {
    CliError::InvalidInput(message.into()).into()
}

pub fn not_found(message: impl Into<String>) -> Error {
    CliError::NotFound(message.into()).into()
}

pub fn report_error(err: &Error, verbose: bool) {
    if verbose {
        eprintln!("error: {:#}", err);
    } else {
        eprintln!("error: {}", err);
    }
}

pub fn exit_code_for(err: &Error) -> ExitCode {
    for cause in err.chain() {
        if let Some(cli_err) = cause.downcast_ref::<CliError>() {
            return ExitCode::from(match cli_err {
                CliError::InvalidInput(_) => EXIT_INVALID_INPUT,
                CliError::NotFound(_) => EXIT_NOT_FOUND,
            });
        }
        if cause.downcast_ref::<ReconciliationError>().is_some() {
            return ExitCode::from(EXIT_MISMATCH);
        }
        if let Some(source_err) = cause.downcast_ref::<SourceError>() {
            return ExitCode::from(source_exit_code(source_err));
        }
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return ExitCode::from(config_exit_code(config_err));
        }
        if cause.downcast_ref::<CoreError>().is_some() {
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
    }
    ExitCode::from(EXIT_FAILURE)
}

fn source_exit_code(err: &SourceError) -> u8 {
    if err.is_setup() {
        EXIT_SETUP
    } else if err.is_invalid_input() {
        EXIT_INVALID_INPUT
    } else {
        EXIT_FAILURE
    }
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingHomeDir => EXIT_FAILURE,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::MissingConfigFile(_)
        | ConfigError::InvalidWaitTimeout(_)
        | ConfigError::InvalidBaseUrl { .. }
        | ConfigError::InvalidPageName(_)
        | ConfigError::DuplicatePageName(_)
        | ConfigError::InvalidPageField { .. }
        | ConfigError::Read { .. }
        | ConfigError::Parse { .. } => EXIT_INVALID_INPUT,
    }
}
