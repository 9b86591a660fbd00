//! API key sources shared by the hosted providers.

use super::provider::LlmError;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Timeout for api_key_command execution.
const API_KEY_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of API key for authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKeySource {
    /// No authentication.
    None,
    /// Static API key.
    Static(String),
    /// Shell command that outputs the API key (for rotating tokens).
    Command(String),
}

impl ApiKeySource {
    /// Builds the source from the two mutually exclusive config values.
    /// A static key wins if both are somehow present.
    pub fn from_config(api_key: Option<String>, api_key_command: Option<String>) -> Self {
        match (api_key, api_key_command) {
            (Some(key), _) if !key.is_empty() => ApiKeySource::Static(key),
            (_, Some(cmd)) if !cmd.is_empty() => ApiKeySource::Command(cmd),
            _ => ApiKeySource::None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ApiKeySource::None)
    }

    /// Get the current API key, executing the command if necessary.
    pub(crate) async fn get_key(&self) -> Result<Option<String>, LlmError> {
        match self {
            ApiKeySource::None => Ok(None),
            ApiKeySource::Static(key) => Ok(Some(key.clone())),
            ApiKeySource::Command(cmd) => {
                debug!(command = %cmd, "Fetching API key via command");

                let result = tokio::time::timeout(
                    API_KEY_COMMAND_TIMEOUT,
                    Command::new("sh").arg("-c").arg(cmd).output(),
                )
                .await;

                let output = match result {
                    Ok(Ok(output)) => output,
                    Ok(Err(e)) => {
                        warn!(command = %cmd, error = %e, "api_key_command failed to execute");
                        return Err(LlmError::Connection(format!(
                            "Failed to execute api_key_command: {}",
                            e
                        )));
                    }
                    Err(_) => {
                        warn!(command = %cmd, "api_key_command timed out");
                        return Err(LlmError::Timeout);
                    }
                };

                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!(command = %cmd, stderr = %stderr, "api_key_command failed");
                    return Err(LlmError::Connection(format!(
                        "api_key_command failed with status {}",
                        output.status
                    )));
                }

                let key = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if key.is_empty() {
                    warn!(command = %cmd, "api_key_command returned empty key");
                    return Err(LlmError::Connection(
                        "api_key_command returned empty key".to_string(),
                    ));
                }

                Ok(Some(key))
            }
        }
    }
}
