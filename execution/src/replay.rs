//! Journal replay.
//!
//! Replay folds recorded messages through [`deployment_state_reducer`] starting from an
//! empty projection. It uses the same reducers as live execution, never performs I/O
//! beyond reading the journal, and is deterministic: the same journal always yields the
//! same projection (and the same [`DeploymentState::digest`]).

use crate::deployment_state::{deployment_state_reducer, DeploymentState, ReducerError};
use crate::journal::{Journal, JournalError};
use commonware_utils::hex;
use ignition_types::JournalMessage;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read journal: {0}")]
    Journal(#[from] JournalError),
    #[error("journal message {index} rejected: {source}")]
    Rejected {
        index: usize,
        #[source]
        source: ReducerError,
    },
}

/// Folds `messages` in order from an empty projection.
pub fn replay<'a, I>(messages: I) -> Result<DeploymentState, ReplayError>
where
    I: IntoIterator<Item = &'a JournalMessage>,
{
    let mut state = DeploymentState::new();
    let mut count = 0usize;
    for (index, message) in messages.into_iter().enumerate() {
        state = deployment_state_reducer(&state, message)
            .map_err(|source| ReplayError::Rejected { index, source })?;
        debug!(
            index,
            message_type = %message.message_type(),
            future_id = message.future_id().unwrap_or_default(),
            "replayed message"
        );
        count += 1;
    }
    info!(
        messages = count,
        futures = state.len(),
        digest = %hex(state.digest().as_ref()),
        "replay complete"
    );
    Ok(state)
}

/// Reads `journal` and replays it.
pub fn replay_journal<J: Journal>(journal: &J) -> Result<DeploymentState, ReplayError> {
    let messages = journal.read_all()?;
    replay(&messages)
}
