//! Reducer for read-only calls.
//!
//! Static-call futures never touch the chain state, so only static-call interactions
//! may be requested and every onchain message is rejected.

use super::utils::{ensure_future_type, ensure_started, request_static_call};
use ignition_types::network_interaction::complete_static_call;
use ignition_types::{
    ExecutionStateType, ExecutionStatus, InvariantViolation, JournalMessage,
    StaticCallExecutionState, StaticCallInitialize,
};

const STATE_TYPE: ExecutionStateType = ExecutionStateType::StaticCall;

pub fn initialize(
    init: &StaticCallInitialize,
) -> Result<StaticCallExecutionState, InvariantViolation> {
    ensure_future_type(init.future.future_type, STATE_TYPE)?;
    Ok(StaticCallExecutionState {
        future: init.future.clone(),
        status: ExecutionStatus::Started,
        artifact_future_id: init.artifact_future_id.clone(),
        contract_address: init.contract_address.clone(),
        function_name: init.function_name.clone(),
        args: init.args.clone(),
        name_or_index: init.name_or_index.clone(),
        from: init.from.clone(),
        network_interactions: Vec::new(),
        result: None,
    })
}

pub fn reduce(
    state: &StaticCallExecutionState,
    message: &JournalMessage,
) -> Result<StaticCallExecutionState, InvariantViolation> {
    ensure_started(state.status)?;

    match message {
        JournalMessage::StaticCallExecutionStateInitialize(_) => {
            Err(InvariantViolation::AlreadyInitialized)
        }
        JournalMessage::NetworkInteractionRequest {
            network_interaction,
            ..
        } => Ok(StaticCallExecutionState {
            network_interactions: request_static_call(
                STATE_TYPE,
                &state.network_interactions,
                network_interaction,
            )?,
            ..state.clone()
        }),
        JournalMessage::StaticCallComplete {
            network_interaction_id,
            result,
            ..
        } => Ok(StaticCallExecutionState {
            network_interactions: complete_static_call(
                &state.network_interactions,
                *network_interaction_id,
                result.clone(),
            )?,
            ..state.clone()
        }),
        JournalMessage::StaticCallExecutionStateComplete { result, .. } => {
            Ok(StaticCallExecutionState {
                status: result.status(),
                result: Some(result.clone()),
                ..state.clone()
            })
        }
        JournalMessage::RunStart { .. }
        | JournalMessage::Wipe { .. }
        | JournalMessage::DeploymentExecutionStateInitialize(_)
        | JournalMessage::DeploymentExecutionStateComplete { .. }
        | JournalMessage::CallExecutionStateInitialize(_)
        | JournalMessage::CallExecutionStateComplete { .. }
        | JournalMessage::SendDataExecutionStateInitialize(_)
        | JournalMessage::SendDataExecutionStateComplete { .. }
        | JournalMessage::ContractAtExecutionStateInitialize(_)
        | JournalMessage::ReadEventArgumentExecutionStateInitialize(_)
        | JournalMessage::TransactionSend { .. }
        | JournalMessage::TransactionConfirm { .. }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{
        onchain_request, send, static_call_complete, static_call_init, static_call_request,
        static_call_success,
    };
    use ignition_types::{SolidityValue, StaticCallResult, StaticCallSuccess};

    const ID: &str = "Module#Token.balanceOf";

    fn started() -> StaticCallExecutionState {
        let JournalMessage::StaticCallExecutionStateInitialize(init) =
            static_call_init(ID, &["Module#Token"])
        else {
            unreachable!()
        };
        initialize(&init).unwrap()
    }

    #[test]
    fn static_call_lifecycle() {
        let state = [
            static_call_request(ID, 0),
            static_call_complete(ID, 0),
            static_call_success(ID, SolidityValue::Uint(42)),
        ]
        .iter()
        .fold(started(), |state, message| reduce(&state, message).unwrap());

        assert_eq!(state.status, ExecutionStatus::Success);
        assert_eq!(
            state.result,
            Some(StaticCallResult::Success(StaticCallSuccess {
                value: SolidityValue::Uint(42)
            }))
        );
        assert!(state.network_interactions[0]
            .as_static_call()
            .unwrap()
            .result
            .is_some());
    }

    #[test]
    fn onchain_request_is_rejected() {
        let err = reduce(&started(), &onchain_request(ID, 0)).unwrap_err();
        assert_eq!(
            err,
            InvariantViolation::OnchainInteractionNotAllowed {
                id: 0,
                state_type: ExecutionStateType::StaticCall
            }
        );
    }

    #[test]
    fn transaction_messages_are_rejected() {
        let state = reduce(&started(), &static_call_request(ID, 0)).unwrap();
        let err = reduce(&state, &send(ID, 0, "0xaaa", 0)).unwrap_err();
        assert_eq!(
            err,
            InvariantViolation::UnexpectedMessage {
                state_type: ExecutionStateType::StaticCall
            }
        );
    }
}
