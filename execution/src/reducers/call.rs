//! Reducer for state-changing contract calls.

use super::utils::{ensure_future_type, ensure_started, reduce_onchain, OnchainUpdate};
use ignition_types::{
    CallExecutionState, CallInitialize, ExecutionStateType, ExecutionStatus, InvariantViolation,
    JournalMessage,
};

const STATE_TYPE: ExecutionStateType = ExecutionStateType::Call;

pub fn initialize(init: &CallInitialize) -> Result<CallExecutionState, InvariantViolation> {
    ensure_future_type(init.future.future_type, STATE_TYPE)?;
    Ok(CallExecutionState {
        future: init.future.clone(),
        status: ExecutionStatus::Started,
        artifact_future_id: init.artifact_future_id.clone(),
        contract_address: init.contract_address.clone(),
        function_name: init.function_name.clone(),
        args: init.args.clone(),
        value: init.value,
        from: init.from.clone(),
        network_interactions: Vec::new(),
        result: None,
    })
}

pub fn reduce(
    state: &CallExecutionState,
    message: &JournalMessage,
) -> Result<CallExecutionState, InvariantViolation> {
    ensure_started(state.status)?;
    match reduce_onchain(&state.network_interactions, message)? {
        OnchainUpdate::Interactions(network_interactions) => {
            return Ok(CallExecutionState {
                network_interactions,
                ..state.clone()
            });
        }
        OnchainUpdate::Timeout => {
            return Ok(CallExecutionState {
                status: ExecutionStatus::Timeout,
                ..state.clone()
            });
        }
        OnchainUpdate::Unhandled => {}
    }

    match message {
        JournalMessage::CallExecutionStateInitialize(_) => {
            Err(InvariantViolation::AlreadyInitialized)
        }
        JournalMessage::CallExecutionStateComplete { result, .. } => Ok(CallExecutionState {
            status: result.status(),
            result: Some(result.clone()),
            ..state.clone()
        }),
        _ => Err(InvariantViolation::UnexpectedMessage {
            state_type: STATE_TYPE,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{
        bump_fees, call_complete_success, call_init, confirm, deployment_success, dropped,
        onchain_request, send, static_call_complete, static_call_request,
    };
    use ignition_types::{CallResult, Completed};

    const ID: &str = "Module#Token.mint";

    fn started() -> CallExecutionState {
        let JournalMessage::CallExecutionStateInitialize(init) = call_init(ID, &["Module#Token"])
        else {
            unreachable!()
        };
        initialize(&init).unwrap()
    }

    fn apply(state: &CallExecutionState, messages: &[JournalMessage]) -> CallExecutionState {
        messages
            .iter()
            .fold(state.clone(), |state, message| reduce(&state, message).unwrap())
    }

    #[test]
    fn dependencies_fixed_at_initialize() {
        let state = apply(
            &started(),
            &[
                static_call_request(ID, 0),
                static_call_complete(ID, 0),
                onchain_request(ID, 1),
                send(ID, 1, "0xaaa", 3),
                confirm(ID, 1, "0xaaa"),
                call_complete_success(ID),
            ],
        );
        assert_eq!(
            state.future.dependencies.iter().collect::<Vec<_>>(),
            vec!["Module#Token"]
        );
        assert_eq!(state.status, ExecutionStatus::Success);
        assert_eq!(state.result, Some(CallResult::Success(Completed)));
        assert_eq!(state.network_interactions.len(), 2);
    }

    #[test]
    fn bump_and_drop_keep_nonce() {
        let state = apply(
            &started(),
            &[onchain_request(ID, 0), send(ID, 0, "0xaaa", 3), bump_fees(ID, 0)],
        );
        let onchain = state.network_interactions[0].as_onchain().unwrap();
        assert!(onchain.should_be_resent);
        assert_eq!(onchain.nonce, Some(3));

        let state = apply(&state, &[send(ID, 0, "0xbbb", 3), dropped(ID, 0)]);
        let onchain = state.network_interactions[0].as_onchain().unwrap();
        assert!(onchain.should_be_resent);
        assert_eq!(onchain.nonce, Some(3));
        assert_eq!(onchain.transactions.len(), 2);
    }

    #[test]
    fn nonce_change_without_replacement_is_rejected() {
        let state = apply(&started(), &[onchain_request(ID, 0), send(ID, 0, "0xaaa", 3)]);
        let err = reduce(&state, &send(ID, 0, "0xbbb", 4)).unwrap_err();
        assert_eq!(
            err,
            InvariantViolation::NonceMismatch {
                id: 0,
                expected: 3,
                got: 4
            }
        );
    }

    #[test]
    fn interaction_ids_are_sequential() {
        let err = reduce(&started(), &onchain_request(ID, 1)).unwrap_err();
        assert_eq!(
            err,
            InvariantViolation::NonSequentialNetworkInteraction {
                expected: 0,
                got: 1
            }
        );
    }

    #[test]
    fn deployment_completion_is_rejected() {
        let err = reduce(&started(), &deployment_success(ID, "0x01")).unwrap_err();
        assert_eq!(
            err,
            InvariantViolation::UnexpectedMessage {
                state_type: ExecutionStateType::Call
            }
        );
    }
}
