//! Reducer for raw value/data transfers.

use super::utils::{ensure_future_type, ensure_started, reduce_onchain, OnchainUpdate};
use ignition_types::{
    ExecutionStateType, ExecutionStatus, InvariantViolation, JournalMessage,
    SendDataExecutionState, SendDataInitialize,
};

const STATE_TYPE: ExecutionStateType = ExecutionStateType::SendData;

pub fn initialize(init: &SendDataInitialize) -> Result<SendDataExecutionState, InvariantViolation> {
    ensure_future_type(init.future.future_type, STATE_TYPE)?;
    Ok(SendDataExecutionState {
        future: init.future.clone(),
        status: ExecutionStatus::Started,
        to: init.to.clone(),
        data: init.data.clone(),
        value: init.value,
        from: init.from.clone(),
        network_interactions: Vec::new(),
        result: None,
    })
}

pub fn reduce(
    state: &SendDataExecutionState,
    message: &JournalMessage,
) -> Result<SendDataExecutionState, InvariantViolation> {
    ensure_started(state.status)?;
    match reduce_onchain(&state.network_interactions, message)? {
        OnchainUpdate::Interactions(network_interactions) => {
            return Ok(SendDataExecutionState {
                network_interactions,
                ..state.clone()
            });
        }
        OnchainUpdate::Timeout => {
            return Ok(SendDataExecutionState {
                status: ExecutionStatus::Timeout,
                ..state.clone()
            });
        }
        OnchainUpdate::Unhandled => {}
    }

    match message {
        JournalMessage::SendDataExecutionStateInitialize(_) => {
            Err(InvariantViolation::AlreadyInitialized)
        }
        JournalMessage::SendDataExecutionStateComplete { result, .. } => Ok(SendDataExecutionState {
            status: result.status(),
            result: Some(result.clone()),
            ..state.clone()
        }),
        _ => Err(InvariantViolation::UnexpectedMessage {
            state_type: STATE_TYPE,
        }),
    }
}
