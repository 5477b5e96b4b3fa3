//! Journal-backed execution engine.
//!
//! The engine is the single writer of a deployment journal. A message is applied in
//! three steps:
//!
//! 1. reduce it against the current projection (a rejected message changes nothing),
//! 2. append it to the journal (durable before returning),
//! 3. commit the new projection.
//!
//! If the process dies between 2 and 3, reopening the journal replays the message, so
//! the projection observed after restart is the one that would have been committed.

use crate::deployment_state::{deployment_state_reducer, DeploymentState, ReducerError};
use crate::journal::{Journal, JournalError};
use crate::replay::{replay, ReplayError};
use ignition_types::JournalMessage;
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Replay(#[from] ReplayError),
    #[error(transparent)]
    Rejected(#[from] ReducerError),
    #[error(transparent)]
    Journal(#[from] JournalError),
}

pub struct Engine<J: Journal> {
    journal: J,
    state: DeploymentState,
    applied: usize,
}

impl<J: Journal> Engine<J> {
    /// Replays `journal` and returns an engine positioned after its last message.
    pub fn open(journal: J) -> Result<Self, EngineError> {
        let messages = journal.read_all()?;
        let state = replay(&messages)?;
        let applied = messages.len();
        info!(messages = applied, futures = state.len(), "engine opened");
        Ok(Self {
            journal,
            state,
            applied,
        })
    }

    /// Validates, records and commits `message`.
    pub fn apply(&mut self, message: JournalMessage) -> Result<&DeploymentState, EngineError> {
        let next = match deployment_state_reducer(&self.state, &message) {
            Ok(next) => next,
            Err(err) => {
                error!(index = self.applied, error = %err, "rejected message");
                return Err(err.into());
            }
        };
        self.journal.append(&message)?;
        self.state = next;
        debug!(
            index = self.applied,
            message_type = %message.message_type(),
            "applied message"
        );
        self.applied += 1;
        Ok(&self.state)
    }

    /// Current projection.
    pub fn state(&self) -> &DeploymentState {
        &self.state
    }

    /// Number of messages in the journal.
    pub fn applied(&self) -> usize {
        self.applied
    }

    pub fn journal(&self) -> &J {
        &self.journal
    }

    pub fn into_journal(self) -> J {
        self.journal
    }
}
