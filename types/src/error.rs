use crate::execution_state::{ExecutionStateType, ExecutionStatus, FutureType};
use thiserror::Error;

/// A message sequence the state machine cannot have produced.
///
/// Violations are protocol/programming errors on the orchestrator side. They
/// abort the message that triggered them and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("network interaction {id} does not exist")]
    UnknownNetworkInteraction { id: u32 },
    #[error("network interaction {id} is not an onchain interaction")]
    NotOnchainInteraction { id: u32 },
    #[error("network interaction {id} is not a static call")]
    NotStaticCall { id: u32 },
    #[error("unable to find transaction {hash} in network interaction {id}")]
    UnknownTransaction { id: u32, hash: String },
    #[error("network interaction {id} already has a confirmed transaction")]
    InteractionResolved { id: u32 },
    #[error("transaction {hash} sent on network interaction {id} already carries a receipt")]
    SentTransactionHasReceipt { id: u32, hash: String },
    #[error("network interaction {id} uses nonce {expected}, got {got}")]
    NonceMismatch { id: u32, expected: u64, got: u64 },
    #[error("static call {id} already completed")]
    StaticCallCompleted { id: u32 },
    #[error("expected network interaction id {expected}, got {got}")]
    NonSequentialNetworkInteraction { expected: u32, got: u32 },
    #[error("{state_type} execution states cannot request onchain interaction {id}")]
    OnchainInteractionNotAllowed { id: u32, state_type: ExecutionStateType },
    #[error("future type {future_type} cannot initialize a {state_type} execution state")]
    FutureTypeMismatch {
        future_type: FutureType,
        state_type: ExecutionStateType,
    },
    #[error("execution state already initialized")]
    AlreadyInitialized,
    #[error("execution state not initialized")]
    UnknownFuture,
    #[error("{state_type} execution state cannot handle this message")]
    UnexpectedMessage { state_type: ExecutionStateType },
    #[error("execution state already finished with status {status}")]
    AlreadyFinished { status: ExecutionStatus },
    #[error("journal belongs to chain {expected}, got {got}")]
    ChainIdMismatch { expected: u64, got: u64 },
}
