use ignition_execution::{
    replay, summarize, DeploymentPlan, DeploymentState, DeploymentSummary, JournalError,
    JournalReader, ReplayError, MAX_MESSAGE_SIZE,
};
use ignition_types::{JournalMessage, JournalMessageType};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;
use tracing::Level;

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_message_size() -> usize {
    MAX_MESSAGE_SIZE
}

/// Configuration for the `ignition-journal` tool.
///
/// Every field has a default so a config file is optional; command-line flags are
/// applied on top with [`Config::with_overrides`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub journal: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json_logs: bool,
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            journal: None,
            plan: None,
            log_level: default_log_level(),
            json_logs: false,
            max_message_size: default_max_message_size(),
        }
    }
}

/// Values given on the command line. `None` keeps the config file value.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub journal: Option<String>,
    pub plan: Option<String>,
    pub log_level: Option<String>,
    pub json_logs: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("a journal path is required (set `journal` or pass --journal)")]
    MissingJournal,
    #[error("invalid log level: {value}")]
    InvalidLogLevel { value: String },
    #[error("{field} must be > 0 (got {value})")]
    InvalidNonZero { field: &'static str, value: usize },
    #[error("{field} must be at most {max} (got {value})")]
    TooLarge {
        field: &'static str,
        value: usize,
        max: usize,
    },
}

#[derive(Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    pub journal: PathBuf,
    pub plan: Option<PathBuf>,
    pub log_level: Level,
    pub json_logs: bool,
    pub max_message_size: NonZeroUsize,
}

impl fmt::Debug for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("journal", &self.journal.display())
            .field("plan", &self.plan.as_ref().map(|plan| plan.display()))
            .field("log_level", &self.log_level)
            .field("json_logs", &self.json_logs)
            .field("max_message_size", &self.max_message_size)
            .finish()
    }
}

fn nonzero_usize(field: &'static str, value: usize) -> Result<NonZeroUsize, ConfigError> {
    NonZeroUsize::new(value).ok_or(ConfigError::InvalidNonZero { field, value })
}

impl Config {
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if overrides.journal.is_some() {
            self.journal = overrides.journal;
        }
        if overrides.plan.is_some() {
            self.plan = overrides.plan;
        }
        if let Some(log_level) = overrides.log_level {
            self.log_level = log_level;
        }
        self.json_logs |= overrides.json_logs;
        self
    }

    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        let journal = self
            .journal
            .filter(|journal| !journal.trim().is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingJournal)?;
        let log_level =
            Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidLogLevel {
                value: self.log_level.clone(),
            })?;
        let max_message_size = nonzero_usize("max_message_size", self.max_message_size)?;
        // Record lengths are stored as u32.
        let max = u32::MAX as usize;
        if max_message_size.get() > max {
            return Err(ConfigError::TooLarge {
                field: "max_message_size",
                value: max_message_size.get(),
                max,
            });
        }

        Ok(ValidatedConfig {
            journal,
            plan: self.plan.map(PathBuf::from),
            log_level,
            json_logs: self.json_logs,
            max_message_size,
        })
    }
}

/// Reads the journal at `path` without modifying it.
///
/// A deployment may still be appending to the file; an incomplete last record is skipped.
pub fn read_journal(
    path: &Path,
    max_message_size: NonZeroUsize,
) -> Result<Vec<JournalMessage>, JournalError> {
    JournalReader::open_with_max_message_size(path, max_message_size.get())?.read_all()
}

/// One line of `inspect` output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRow {
    pub index: usize,
    #[serde(rename = "type")]
    pub message_type: JournalMessageType,
    pub future_id: Option<String>,
    pub network_interaction_id: Option<u32>,
}

pub fn message_rows(messages: &[JournalMessage]) -> Vec<MessageRow> {
    messages
        .iter()
        .enumerate()
        .map(|(index, message)| MessageRow {
            index,
            message_type: message.message_type(),
            future_id: message.future_id().map(str::to_string),
            network_interaction_id: message.network_interaction_id(),
        })
        .collect()
}

/// Output of `replay`.
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub messages: usize,
    pub digest: String,
    pub state: DeploymentState,
}

pub fn replay_report(messages: &[JournalMessage]) -> Result<ReplayReport, ReplayError> {
    let state = replay(messages)?;
    Ok(ReplayReport {
        messages: messages.len(),
        digest: commonware_utils::hex(state.digest().as_ref()),
        state,
    })
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Replay(#[from] ReplayError),
    #[error("replay is not deterministic: {first} != {second}")]
    DigestMismatch { first: String, second: String },
}

/// Replays `messages` twice and checks both passes agree. Returns the hex digest.
pub fn verify(messages: &[JournalMessage]) -> Result<String, VerifyError> {
    let first = commonware_utils::hex(replay(messages)?.digest().as_ref());
    let second = commonware_utils::hex(replay(messages)?.digest().as_ref());
    if first != second {
        return Err(VerifyError::DigestMismatch { first, second });
    }
    Ok(first)
}

/// Status read model. Without a plan, modules are derived from the journal itself.
pub fn status_report(
    messages: &[JournalMessage],
    plan: Option<&DeploymentPlan>,
) -> Result<DeploymentSummary, ReplayError> {
    let state = replay(messages)?;
    Ok(match plan {
        Some(plan) => summarize(&state, plan),
        None => summarize(&state, &DeploymentPlan::from_state(&state)),
    })
}
