//! Whole-deployment projection and its reducer.

use crate::reducers::{initialize_execution_state, reduce_execution_state};
use bytes::{Buf, BufMut};
use commonware_codec::{Encode, EncodeSize, Error, Read, ReadExt, Write};
use commonware_cryptography::{
    sha256::{Digest, Sha256},
    Hasher,
};
use ignition_types::codec::read_len;
use ignition_types::constants::MAX_EXECUTION_STATES;
use ignition_types::{ExecutionState, InvariantViolation, JournalMessage, JournalMessageType};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Everything known about a deployment after folding its journal.
///
/// Execution states are shared through [`Arc`], so producing the next projection only
/// allocates the state of the future a message touched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentState {
    pub chain_id: Option<u64>,
    pub execution_states: BTreeMap<String, Arc<ExecutionState>>,
}

impl DeploymentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, future_id: &str) -> Option<&ExecutionState> {
        self.execution_states.get(future_id).map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.execution_states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.execution_states.is_empty()
    }

    /// SHA-256 of the canonical encoding. Equal projections have equal digests.
    pub fn digest(&self) -> Digest {
        Sha256::hash(&self.encode())
    }
}

impl Write for DeploymentState {
    fn write(&self, writer: &mut impl BufMut) {
        match self.chain_id {
            Some(chain_id) => {
                true.write(writer);
                chain_id.write(writer);
            }
            None => false.write(writer),
        }
        (self.execution_states.len() as u32).write(writer);
        for state in self.execution_states.values() {
            state.write(writer);
        }
    }
}

impl Read for DeploymentState {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let chain_id = if bool::read(reader)? {
            Some(u64::read(reader)?)
        } else {
            None
        };
        let len = read_len(reader, MAX_EXECUTION_STATES, "DeploymentState")?;
        let mut execution_states: BTreeMap<String, Arc<ExecutionState>> = BTreeMap::new();
        for _ in 0..len {
            let state = ExecutionState::read(reader)?;
            if let Some((last, _)) = execution_states.last_key_value() {
                if last.as_str() >= state.id() {
                    return Err(Error::Invalid("DeploymentState", "futures not sorted"));
                }
            }
            execution_states.insert(state.id().to_string(), Arc::new(state));
        }
        Ok(Self {
            chain_id,
            execution_states,
        })
    }
}

impl EncodeSize for DeploymentState {
    fn encode_size(&self) -> usize {
        1 + self.chain_id.map(|_| 8).unwrap_or(0)
            + 4
            + self
                .execution_states
                .values()
                .map(|state| state.encode_size())
                .sum::<usize>()
    }
}

/// A message the projection cannot absorb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReducerError {
    pub future_id: Option<String>,
    pub message_type: JournalMessageType,
    pub network_interaction_id: Option<u32>,
    pub violation: InvariantViolation,
}

impl ReducerError {
    pub fn new(message: &JournalMessage, violation: InvariantViolation) -> Self {
        Self {
            future_id: message.future_id().map(str::to_string),
            message_type: message.message_type(),
            network_interaction_id: message.network_interaction_id(),
            violation,
        }
    }
}

impl fmt::Display for ReducerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rejected", self.message_type)?;
        if let Some(future_id) = &self.future_id {
            write!(f, " for future {future_id}")?;
        }
        if let Some(id) = self.network_interaction_id {
            write!(f, " (network interaction {id})")?;
        }
        write!(f, ": {}", self.violation)
    }
}

impl std::error::Error for ReducerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.violation)
    }
}

/// Folds one message into the deployment projection.
///
/// The input is left untouched; on error no partial update is observable.
pub fn deployment_state_reducer(
    state: &DeploymentState,
    message: &JournalMessage,
) -> Result<DeploymentState, ReducerError> {
    match message {
        JournalMessage::RunStart { chain_id } => start_run(state, *chain_id),
        JournalMessage::Wipe { future_id } => wipe(state, future_id),
        _ => apply_to_future(state, message),
    }
    .map_err(|violation| ReducerError::new(message, violation))
}

fn start_run(
    state: &DeploymentState,
    chain_id: u64,
) -> Result<DeploymentState, InvariantViolation> {
    if let Some(expected) = state.chain_id {
        if expected != chain_id {
            return Err(InvariantViolation::ChainIdMismatch {
                expected,
                got: chain_id,
            });
        }
    }
    Ok(DeploymentState {
        chain_id: Some(chain_id),
        execution_states: state.execution_states.clone(),
    })
}

fn wipe(state: &DeploymentState, future_id: &str) -> Result<DeploymentState, InvariantViolation> {
    let mut execution_states = state.execution_states.clone();
    if execution_states.remove(future_id).is_none() {
        return Err(InvariantViolation::UnknownFuture);
    }
    Ok(DeploymentState {
        chain_id: state.chain_id,
        execution_states,
    })
}

fn apply_to_future(
    state: &DeploymentState,
    message: &JournalMessage,
) -> Result<DeploymentState, InvariantViolation> {
    let future_id = message.future_id().ok_or(InvariantViolation::UnknownFuture)?;
    let next = match state.execution_states.get(future_id) {
        Some(_) if message.is_initialize() => return Err(InvariantViolation::AlreadyInitialized),
        Some(current) => reduce_execution_state(current, message)?,
        None => initialize_execution_state(message)?,
    };

    let mut execution_states = state.execution_states.clone();
    execution_states.insert(future_id.to_string(), Arc::new(next));
    Ok(DeploymentState {
        chain_id: state.chain_id,
        execution_states,
    })
}
