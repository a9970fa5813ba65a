//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => exitcode::IOERR,
                InfraError::Snapshot { .. } => exitcode::NOINPUT,
                InfraError::Application(app) => match app {
                    ApplicationError::Config { .. } => exitcode::CONFIG,
                    ApplicationError::ProposalNotFound(_)
                    | ApplicationError::ItemNotFound(_)
                    | ApplicationError::Domain(_) => exitcode::DATAERR,
                    ApplicationError::OperationFailed { source, .. } => {
                        let malformed = source
                            .downcast_ref::<std::io::Error>()
                            .is_some_and(|io| io.kind() == std::io::ErrorKind::InvalidData);
                        if malformed {
                            exitcode::DATAERR
                        } else {
                            exitcode::IOERR
                        }
                    }
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn given_missing_snapshot_when_mapping_exit_code_then_noinput() {
        let err = CliError::from(InfraError::Snapshot {
            path: "/nowhere.json".into(),
            message: "file does not exist".into(),
        });
        assert_eq!(err.exit_code(), exitcode::NOINPUT);
    }

    #[test]
    fn given_cycle_when_mapping_exit_code_then_dataerr() {
        let err = CliError::from(ApplicationError::from(DomainError::CycleDetected("A".into())));
        assert_eq!(err.exit_code(), exitcode::DATAERR);
    }

    #[test]
    fn given_malformed_json_when_mapping_exit_code_then_dataerr() {
        let parse = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let err = CliError::from(ApplicationError::OperationFailed {
            context: "load snapshot".into(),
            source: Box::new(std::io::Error::from(parse)),
        });
        assert_eq!(err.exit_code(), exitcode::DATAERR);
    }

    #[test]
    fn given_config_error_when_mapping_exit_code_then_config() {
        let err = CliError::from(ApplicationError::Config {
            message: "bad".into(),
        });
        assert_eq!(err.exit_code(), exitcode::CONFIG);
    }
}
