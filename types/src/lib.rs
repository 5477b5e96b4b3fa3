//! Data model of a journaled deployment.
//!
//! The types in this crate describe what the journal records ([`JournalMessage`]) and
//! what replaying it produces ([`ExecutionState`] per future). They carry no behavior
//! beyond the pure network interaction updates in [`network_interaction`]; the reducers
//! that fold messages into states live in `ignition-execution`.

pub mod codec;
pub mod constants;
pub mod error;
pub mod execution_state;
pub mod messages;
pub mod network_interaction;
pub mod value;

pub use error::InvariantViolation;
pub use execution_state::{
    CallExecutionState, CallResult, Completed, ContractAtExecutionState, DeploymentExecutionState,
    DeploymentResult, DeploymentSuccess, ExecutionFailure, ExecutionResult, ExecutionState,
    ExecutionStateType, ExecutionStatus, FutureDescriptor, FutureType,
    ReadEventArgumentExecutionState, SendDataExecutionState, SendDataResult,
    StaticCallExecutionState, StaticCallResult, StaticCallSuccess,
};
pub use messages::{
    CallInitialize, ContractAtInitialize, DeploymentInitialize, JournalMessage,
    JournalMessageType, ReadEventArgumentInitialize, SendDataInitialize, StaticCallInitialize,
};
pub use network_interaction::{
    NetworkFees, NetworkInteraction, OnchainInteraction, RawStaticCallResult, StaticCall,
    Transaction, TransactionLog, TransactionReceipt, TransactionReceiptStatus,
};
pub use value::SolidityValue;
