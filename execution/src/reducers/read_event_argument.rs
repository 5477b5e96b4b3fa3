//! Reducer for event arguments read from an earlier receipt.
//!
//! The argument is read by the orchestrator before initialization, so the state is
//! created as `SUCCESS` with its result and accepts no further messages.

use super::utils::ensure_future_type;
use ignition_types::{
    ExecutionStateType, ExecutionStatus, InvariantViolation, JournalMessage,
    ReadEventArgumentExecutionState, ReadEventArgumentInitialize,
};

const STATE_TYPE: ExecutionStateType = ExecutionStateType::ReadEventArgument;

pub fn initialize(
    init: &ReadEventArgumentInitialize,
) -> Result<ReadEventArgumentExecutionState, InvariantViolation> {
    ensure_future_type(init.future.future_type, STATE_TYPE)?;
    Ok(ReadEventArgumentExecutionState {
        future: init.future.clone(),
        status: ExecutionStatus::Success,
        artifact_future_id: init.artifact_future_id.clone(),
        event_name: init.event_name.clone(),
        argument_name: init.argument_name.clone(),
        event_index: init.event_index,
        emitter_address: init.emitter_address.clone(),
        tx_to_read_from: init.tx_to_read_from.clone(),
        result: init.result.clone(),
    })
}

pub fn reduce(
    _state: &ReadEventArgumentExecutionState,
    message: &JournalMessage,
) -> Result<ReadEventArgumentExecutionState, InvariantViolation> {
    match message {
        JournalMessage::ReadEventArgumentExecutionStateInitialize(_) => {
            Err(InvariantViolation::AlreadyInitialized)
        }
        JournalMessage::RunStart { .. }
        | JournalMessage::Wipe { .. }
        | JournalMessage::DeploymentExecutionStateInitialize(_)
        | JournalMessage::DeploymentExecutionStateComplete { .. }
        | JournalMessage::CallExecutionStateInitialize(_)
        | JournalMessage::CallExecutionStateComplete { .. }
        | JournalMessage::StaticCallExecutionStateInitialize(_)
        | JournalMessage::StaticCallExecutionStateComplete { .. }
        | JournalMessage::SendDataExecutionStateInitialize(_)
        | JournalMessage::SendDataExecutionStateComplete { .. }
        | JournalMessage::ContractAtExecutionStateInitialize(_)
        | JournalMessage::NetworkInteractionRequest { .. }
        | JournalMessage::TransactionSend { .. }
        | JournalMessage::TransactionConfirm { .. }
        | JournalMessage::StaticCallComplete { .. }
        | JournalMessage::OnchainInteractionBumpFees { .. }
        | JournalMessage::OnchainInteractionDropped { .. }
        | JournalMessage::OnchainInteractionReplacedByUser { .. }
        | JournalMessage::OnchainInteractionTimeout { .. } => {
            Err(InvariantViolation::UnexpectedMessage {
                state_type: STATE_TYPE,
            })
        }
    }
}
