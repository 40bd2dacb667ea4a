pub mod commands;
pub mod handlers;
use crate::error::Error;

pub use commands::TaskRunCommands;
pub use handlers::handle_taskrun_command;

pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CLI_NAME: &str = "chains-provenance";

pub fn format_error(error: &Error) -> String {
    match error {
        Error::MaterialsUnresolved(cause) => format!("Materials unresolved: {cause}"),
        Error::Io(err) => format!("IO error: {err}"),
        Error::Json(err) => format!("JSON error: {err}"),
        Error::Yaml(err) => format!("YAML error: {err}"),
        Error::Serialization(msg) => format!("Serialization error: {msg}"),
        Error::Validation(msg) => format!("Validation error: {msg}"),
        Error::Signing(msg) => format!("Signing error: {msg}"),
        Error::Config(msg) => format!("Configuration error: {msg}"),
        Error::Storage(msg) => format!("Storage error: {msg}"),
        Error::InitializationError(msg) => format!("Initialization error: {msg}"),
    }
}
