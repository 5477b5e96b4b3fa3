//! Reducer for contracts referenced by address.
//!
//! Nothing needs to be sent, so the state is created as `SUCCESS` and accepts no
//! further messages.

use super::utils::ensure_future_type;
use ignition_types::{
    ContractAtExecutionState, ContractAtInitialize, ExecutionStateType, ExecutionStatus,
    InvariantViolation, JournalMessage,
};

const STATE_TYPE: ExecutionStateType = ExecutionStateType::ContractAt;

pub fn initialize(
    init: &ContractAtInitialize,
) -> Result<ContractAtExecutionState, InvariantViolation> {
    ensure_future_type(init.future.future_type, STATE_TYPE)?;
    Ok(ContractAtExecutionState {
        future: init.future.clone(),
        status: ExecutionStatus::Success,
        artifact_future_id: init.artifact_future_id.clone(),
        contract_name: init.contract_name.clone(),
        contract_address: init.contract_address.clone(),
    })
}

pub fn reduce(
    _state: &ContractAtExecutionState,
    message: &JournalMessage,
) -> Result<ContractAtExecutionState, InvariantViolation> {
    match message {
        JournalMessage::ContractAtExecutionStateInitialize(_) => {
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
        | JournalMessage::ReadEventArgumentExecutionStateInitialize(_)
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
