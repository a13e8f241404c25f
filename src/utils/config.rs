use std::fmt::Write;
use std::env::VarError;
use config::ConfigError;
use serde::{Deserialize, Serialize};
use crate::model::snapshot::ConfigSnapshot;
use super::{console::prelude::*, errors::{self, InternalError}};

///
/// The service configuration - initialised at start-up.
///
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Configuration {
    pub port: i32,                       // The port to run this service on.
    pub base_url: String,                // The root url to host endpoints on.
    pub keep_alive: Option<usize>,       // Allow client connections to be re-used. None disables.
    pub client_timeout: u64,             // Timeout (seconds) client http connections.
    pub jaeger_endpoint: Option<String>, // If jaeger tracing is enabled, this is the endpoint to send traces to.
    pub distributed_tracing: bool,       // Send traces to Jaeger.
    pub redact_error_messages: bool,     // If true, error responses to clients will only have a code and no descriptive message.
    pub redact_secrets: bool,            // If true, secret-looking values are masked on the config page and console.
    pub identity_user_header: String,    // Header the upstream gateway puts the authenticated user name in.
    pub identity_roles_header: String,   // Header the upstream gateway puts the comma-separated user roles in.
    pub admin_role: String,              // The role which grants access to the admin endpoints.
}

impl Configuration {
    ///
    /// Load the service's configuration.
    ///
    pub fn from_env() -> Result<Configuration, InternalError> {
        let mut cfg = config::Config::default();

        // Merge any environment variables with the same name as the struct fields.
        cfg.merge(config::Environment::new())?;

        // Set defaults for settings that were not specified.
        cfg.set_default("admin_role", "admin")?;
        cfg.set_default("base_url", "/")?;
        cfg.set_default("client_timeout", 30)?;
        cfg.set_default("distributed_tracing", false)?;
        cfg.set_default("identity_roles_header", "x-authenticated-roles")?;
        cfg.set_default("identity_user_header", "x-authenticated-user")?;
        cfg.set_default("jaeger_endpoint", None::<String>)?;
        cfg.set_default("keep_alive", Some(15))?;
        cfg.set_default("port", 8989)?;
        cfg.set_default("redact_error_messages", false)?;
        cfg.set_default("redact_secrets", false)?;

        let config: Configuration = cfg.try_into()?;
        config.validate()?;

        *errors::REDACT_ERROR_MESSAGES.write() = config.redact_error_messages;

        Ok(config)
    }

    fn validate(&self) -> Result<(), InternalError> {
        if self.distributed_tracing && self.jaeger_endpoint.is_none() {
            return Err(InternalError::InvalidConfiguration {
                cause: "Distributed tracing is enabled but no Jaeger endpoint is configured".to_string() })
        }

        if self.admin_role.trim().is_empty() {
            return Err(InternalError::InvalidConfiguration {
                cause: "The admin_role cannot be blank".to_string() })
        }

        Ok(())
    }

    ///
    /// Pretty-print the config with ansi colours.
    ///
    /// Uses the same snapshot as the config page so internal fields stay hidden and redaction
    /// applies here too.
    ///
    pub fn fmt_console(&self) -> Result<String, InternalError> {
        let mut snapshot = ConfigSnapshot::capture(self)?;
        if self.redact_secrets {
            snapshot = snapshot.redacted();
        }

        let mut output = String::new();
        for setting in snapshot.iter() {
            writeln!(&mut output, "{:>23}{} {}",
                setting.name,
                *COLON,
                setting.value)?;
        }

        Ok(output)
    }
}

impl From<ConfigError> for InternalError {
    fn from(error: ConfigError) -> Self {
        InternalError::InvalidConfiguration { cause: error.to_string() }
    }
}

///
/// If the specified environment variable is not set for this process, set it to the default value specified.
///
pub fn default_env(key: &str, value: &str) {
    if let Err(VarError::NotPresent) = std::env::var(key) {
        std::env::set_var(key, value);
    }
}
