use ignition_types::network_interaction::{
    append_network_interaction, append_transaction, complete_static_call, confirm_transaction,
    ensure_pending_onchain_interaction, mark_for_resend, NetworkInteraction,
};
use ignition_types::{
    ExecutionStateType, ExecutionStatus, FutureType, InvariantViolation, JournalMessage,
};

/// Rejects any message once the future left `STARTED`.
pub(crate) fn ensure_started(status: ExecutionStatus) -> Result<(), InvariantViolation> {
    if status.is_terminal() {
        return Err(InvariantViolation::AlreadyFinished { status });
    }
    Ok(())
}

/// Checks that `future_type` is executed with a `state_type` execution state.
pub(crate) fn ensure_future_type(
    future_type: FutureType,
    state_type: ExecutionStateType,
) -> Result<(), InvariantViolation> {
    if future_type.state_type() != state_type {
        return Err(InvariantViolation::FutureTypeMismatch {
            future_type,
            state_type,
        });
    }
    Ok(())
}

/// Appends a requested interaction to a kind that may only issue static calls.
pub(crate) fn request_static_call(
    state_type: ExecutionStateType,
    interactions: &[NetworkInteraction],
    interaction: &NetworkInteraction,
) -> Result<Vec<NetworkInteraction>, InvariantViolation> {
    if let NetworkInteraction::Onchain(onchain) = interaction {
        return Err(InvariantViolation::OnchainInteractionNotAllowed {
            id: onchain.id,
            state_type,
        });
    }
    append_network_interaction(interactions, interaction.clone())
}

/// Effect of a network interaction message on an execution state that sends transactions.
pub(crate) enum OnchainUpdate {
    Interactions(Vec<NetworkInteraction>),
    /// A pending onchain interaction timed out.
    Timeout,
    /// Not a network interaction message; the caller decides.
    Unhandled,
}

/// Applies the messages shared by deployments, calls and send-data.
pub(crate) fn reduce_onchain(
    interactions: &[NetworkInteraction],
    message: &JournalMessage,
) -> Result<OnchainUpdate, InvariantViolation> {
    let updated = match message {
        JournalMessage::NetworkInteractionRequest {
            network_interaction,
            ..
        } => append_network_interaction(interactions, network_interaction.clone())?,
        JournalMessage::TransactionSend {
            network_interaction_id,
            transaction,
            nonce,
            ..
        } => append_transaction(
            interactions,
            *network_interaction_id,
            transaction.clone(),
            *nonce,
        )?,
        JournalMessage::TransactionConfirm {
            network_interaction_id,
            hash,
            receipt,
            ..
        } => confirm_transaction(interactions, *network_interaction_id, hash, receipt.clone())?,
        JournalMessage::StaticCallComplete {
            network_interaction_id,
            result,
            ..
        } => complete_static_call(interactions, *network_interaction_id, result.clone())?,
        JournalMessage::OnchainInteractionBumpFees {
            network_interaction_id,
            ..
        }
        | JournalMessage::OnchainInteractionDropped {
            network_interaction_id,
            ..
        } => mark_for_resend(interactions, *network_interaction_id, false)?,
        JournalMessage::OnchainInteractionReplacedByUser {
            network_interaction_id,
            ..
        } => mark_for_resend(interactions, *network_interaction_id, true)?,
        JournalMessage::OnchainInteractionTimeout {
            network_interaction_id,
            ..
        } => {
            ensure_pending_onchain_interaction(interactions, *network_interaction_id)?;
            return Ok(OnchainUpdate::Timeout);
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
        | JournalMessage::ReadEventArgumentExecutionStateInitialize(_) => {
            return Ok(OnchainUpdate::Unhandled)
        }
    };
    Ok(OnchainUpdate::Interactions(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{deployment_success, onchain_request, send, timeout_message, wipe};

    const ID: &str = "Module#Token";

    fn requested() -> Vec<NetworkInteraction> {
        match reduce_onchain(&[], &onchain_request(ID, 0)).unwrap() {
            OnchainUpdate::Interactions(interactions) => interactions,
            _ => panic!("request must add an interaction"),
        }
    }

    #[test]
    fn interaction_messages_update_interactions() {
        let interactions = requested();
        assert_eq!(interactions.len(), 1);
        match reduce_onchain(&interactions, &send(ID, 0, "0xaaa", 0)).unwrap() {
            OnchainUpdate::Interactions(updated) => {
                let onchain = updated[0].as_onchain().unwrap();
                assert_eq!(onchain.transactions.len(), 1);
            }
            _ => panic!("send must update the interaction"),
        }
    }

    #[test]
    fn timeout_requires_pending_interaction() {
        assert!(matches!(
            reduce_onchain(&requested(), &timeout_message(ID, 0)),
            Ok(OnchainUpdate::Timeout)
        ));
        assert!(reduce_onchain(&requested(), &timeout_message(ID, 4)).is_err());
    }

    #[test]
    fn other_messages_are_left_to_the_caller() {
        for message in [wipe(ID), deployment_success(ID, "0xabc")] {
            assert!(matches!(
                reduce_onchain(&requested(), &message),
                Ok(OnchainUpdate::Unhandled)
            ));
        }
    }
}
