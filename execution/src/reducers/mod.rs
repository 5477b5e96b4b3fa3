//! Kind reducers.
//!
//! Each execution state kind has its own module exposing `initialize` (build the state
//! from its initialize message) and `reduce` (fold one message into an existing state).
//! Both are pure: they borrow their input and return a new value.

pub mod call;
pub mod contract_at;
pub mod deployment;
pub mod read_event_argument;
pub mod send_data;
pub mod static_call;
mod utils;

use ignition_types::{ExecutionState, InvariantViolation, JournalMessage};

/// Creates the execution state described by an initialize message.
///
/// Any other message names a future that was never initialized.
pub fn initialize_execution_state(
    message: &JournalMessage,
) -> Result<ExecutionState, InvariantViolation> {
    match message {
        JournalMessage::DeploymentExecutionStateInitialize(init) => {
            deployment::initialize(init).map(ExecutionState::Deployment)
        }
        JournalMessage::CallExecutionStateInitialize(init) => {
            call::initialize(init).map(ExecutionState::Call)
        }
        JournalMessage::StaticCallExecutionStateInitialize(init) => {
            static_call::initialize(init).map(ExecutionState::StaticCall)
        }
        JournalMessage::SendDataExecutionStateInitialize(init) => {
            send_data::initialize(init).map(ExecutionState::SendData)
        }
        JournalMessage::ContractAtExecutionStateInitialize(init) => {
            contract_at::initialize(init).map(ExecutionState::ContractAt)
        }
        JournalMessage::ReadEventArgumentExecutionStateInitialize(init) => {
            read_event_argument::initialize(init).map(ExecutionState::ReadEventArgument)
        }
        _ => Err(InvariantViolation::UnknownFuture),
    }
}

/// Routes a message to the reducer of the state's kind.
pub fn reduce_execution_state(
    state: &ExecutionState,
    message: &JournalMessage,
) -> Result<ExecutionState, InvariantViolation> {
    match state {
        ExecutionState::Deployment(state) => {
            deployment::reduce(state, message).map(ExecutionState::Deployment)
        }
        ExecutionState::Call(state) => call::reduce(state, message).map(ExecutionState::Call),
        ExecutionState::StaticCall(state) => {
            static_call::reduce(state, message).map(ExecutionState::StaticCall)
        }
        ExecutionState::SendData(state) => {
            send_data::reduce(state, message).map(ExecutionState::SendData)
        }
        ExecutionState::ContractAt(state) => {
            contract_at::reduce(state, message).map(ExecutionState::ContractAt)
        }
        ExecutionState::ReadEventArgument(state) => {
            read_event_argument::reduce(state, message).map(ExecutionState::ReadEventArgument)
        }
    }
}
