//! Reducer for contract and library deployments.

use super::utils::{ensure_future_type, ensure_started, reduce_onchain, OnchainUpdate};
use ignition_types::{
    DeploymentExecutionState, DeploymentInitialize, ExecutionStateType, ExecutionStatus,
    InvariantViolation, JournalMessage,
};

const STATE_TYPE: ExecutionStateType = ExecutionStateType::Deployment;

pub fn initialize(
    init: &DeploymentInitialize,
) -> Result<DeploymentExecutionState, InvariantViolation> {
    ensure_future_type(init.future.future_type, STATE_TYPE)?;
    Ok(DeploymentExecutionState {
        future: init.future.clone(),
        status: ExecutionStatus::Started,
        artifact_future_id: init.artifact_future_id.clone(),
        contract_name: init.contract_name.clone(),
        constructor_args: init.constructor_args.clone(),
        libraries: init.libraries.clone(),
        value: init.value,
        from: init.from.clone(),
        network_interactions: Vec::new(),
        result: None,
    })
}

pub fn reduce(
    state: &DeploymentExecutionState,
    message: &JournalMessage,
) -> Result<DeploymentExecutionState, InvariantViolation> {
    ensure_started(state.status)?;
    match reduce_onchain(&state.network_interactions, message)? {
        OnchainUpdate::Interactions(network_interactions) => {
            return Ok(DeploymentExecutionState {
                network_interactions,
                ..state.clone()
            });
        }
        OnchainUpdate::Timeout => {
            return Ok(DeploymentExecutionState {
                status: ExecutionStatus::Timeout,
                ..state.clone()
            });
        }
        OnchainUpdate::Unhandled => {}
    }

    match message {
        JournalMessage::DeploymentExecutionStateInitialize(_) => {
            Err(InvariantViolation::AlreadyInitialized)
        }
        JournalMessage::DeploymentExecutionStateComplete { result, .. } => {
            Ok(DeploymentExecutionState {
                status: result.status(),
                result: Some(result.clone()),
                ..state.clone()
            })
        }
        _ => Err(InvariantViolation::UnexpectedMessage {
            state_type: STATE_TYPE,
        }),
    }
}
