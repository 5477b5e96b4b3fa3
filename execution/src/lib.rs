//! Ignition execution layer.
//!
//! This crate turns a journal of [`JournalMessage`]s into the projection of a
//! deployment ([`DeploymentState`]) and keeps that projection and the journal in step.
//!
//! ## Determinism requirements
//! - Reducers are pure: they borrow the current state and return a new one.
//! - Do not consult the network, the clock or randomness while reducing. Every outcome
//!   that matters has to arrive as a message.
//! - Iterate futures in id order (`BTreeMap`) wherever output depends on order.
//!
//! ## Recovery invariants
//! A message is appended to the journal only after it was accepted by the reducers, and
//! the projection is committed only after the append is durable. Replaying the journal
//! after a crash therefore reproduces the last committed projection, or the one right
//! after it when the crash hit between append and commit.
//!
//! ## Minimal pipeline (example)
//! ```rust,ignore
//! use ignition_execution::{Engine, FileJournal};
//!
//! let journal = FileJournal::open("deployment.journal")?;
//! let mut engine = Engine::open(journal)?;
//! engine.apply(JournalMessage::RunStart { chain_id: 31337 })?;
//! for (id, execution_state) in &engine.state().execution_states {
//!     println!("{id}: {}", execution_state.status());
//! }
//! ```
//!
//! [`JournalMessage`]: ignition_types::JournalMessage

pub mod deployment_state;
pub mod engine;
pub mod journal;
pub mod reducers;
pub mod replay;
pub mod status;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

#[cfg(test)]
mod proptest_replay;
#[cfg(test)]
mod replay_harness_tests;

pub use deployment_state::{deployment_state_reducer, DeploymentState, ReducerError};
pub use engine::{Engine, EngineError};
pub use journal::{
    FileJournal, Journal, JournalError, JournalReader, MemoryJournal, MAX_MESSAGE_SIZE,
};
pub use replay::{replay, replay_journal, ReplayError};
pub use status::{
    future_status, summarize, summarize_module, DeploymentPlan, DeploymentSummary, FutureStatus,
    FutureSummary, ModulePlan, ModuleSummary,
};
