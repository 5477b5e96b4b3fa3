//! Property tests for replay determinism.
//!
//! Generated journals are valid by construction: each future is initialized, requests a
//! single onchain interaction, sends one or more attempts, optionally confirms one of
//! them and completes. Futures are interleaved arbitrarily while keeping the order of
//! each future's own messages.
//!
//! Properties checked:
//!
//! 1. **Replay determinism**: replaying the same journal twice yields equal projections
//!    and digests.
//! 2. **Interleaving independence**: the projection does not depend on how messages of
//!    independent futures are interleaved.
//! 3. **Dependency immutability**: the dependencies recorded at initialization survive
//!    every later message unchanged.
//! 4. **Atomic rejection**: a rejected message leaves the projection and the journal
//!    untouched.

#[cfg(test)]
mod tests {
    use crate::deployment_state::{deployment_state_reducer, DeploymentState};
    use crate::engine::Engine;
    use crate::journal::MemoryJournal;
    use crate::mocks::{
        confirm, deployment_failure, deployment_init, deployment_success, onchain_request, send,
        CONTRACT,
    };
    use crate::replay::replay;
    use commonware_codec::{DecodeExt, Encode};
    use ignition_types::{ExecutionStatus, JournalMessage};
    use proptest::prelude::*;

    #[derive(Clone, Debug)]
    struct FuturePlan {
        /// Indices of earlier futures this one depends on.
        dependencies: Vec<usize>,
        attempts: u8,
        /// Attempt to confirm, if any.
        confirmed: Option<u8>,
        succeeds: bool,
    }

    fn future_id(index: usize) -> String {
        format!("Module#Future{index}")
    }

    fn hash(index: usize, attempt: u8) -> String {
        format!("0x{index:04x}{attempt:02x}")
    }

    fn arb_future_plan(earlier: usize) -> impl Strategy<Value = FuturePlan> {
        let dependencies = if earlier == 0 {
            Just(Vec::new()).boxed()
        } else {
            prop::collection::vec(0..earlier, 0..=earlier.min(3))
                .prop_map(|mut deps| {
                    deps.sort_unstable();
                    deps.dedup();
                    deps
                })
                .boxed()
        };
        (dependencies, 1u8..=4, any::<bool>(), any::<u8>(), any::<bool>()).prop_map(
            |(dependencies, attempts, confirm, pick, succeeds)| FuturePlan {
                dependencies,
                attempts,
                confirmed: confirm.then_some(pick % attempts),
                succeeds,
            },
        )
    }

    fn arb_plans() -> impl Strategy<Value = Vec<FuturePlan>> {
        (1usize..=5).prop_flat_map(|count| {
            (0..count)
                .map(arb_future_plan)
                .collect::<Vec<_>>()
        })
    }

    fn future_messages(index: usize, plan: &FuturePlan) -> Vec<JournalMessage> {
        let id = future_id(index);
        let dependencies: Vec<String> = plan.dependencies.iter().map(|d| future_id(*d)).collect();
        let dependencies: Vec<&str> = dependencies.iter().map(String::as_str).collect();

        let mut messages = vec![deployment_init(&id, &dependencies), onchain_request(&id, 0)];
        for attempt in 0..plan.attempts {
            messages.push(send(&id, 0, &hash(index, attempt), index as u64));
        }
        if let Some(attempt) = plan.confirmed {
            messages.push(confirm(&id, 0, &hash(index, attempt)));
            messages.push(if plan.succeeds {
                deployment_success(&id, CONTRACT)
            } else {
                deployment_failure(&id, "reverted")
            });
        }
        messages
    }

    fn sequential(plans: &[FuturePlan]) -> Vec<JournalMessage> {
        plans
            .iter()
            .enumerate()
            .flat_map(|(index, plan)| future_messages(index, plan))
            .collect()
    }

    /// Merges per-future message lists, picking the next source with `picks`.
    fn interleaved(plans: &[FuturePlan], picks: &[usize]) -> Vec<JournalMessage> {
        let mut queues: Vec<std::collections::VecDeque<JournalMessage>> = plans
            .iter()
            .enumerate()
            .map(|(index, plan)| future_messages(index, plan).into())
            .collect();
        let mut merged = Vec::new();
        let mut picks = picks.iter().cycle();
        while queues.iter().any(|queue| !queue.is_empty()) {
            let live: Vec<usize> = (0..queues.len())
                .filter(|index| !queues[*index].is_empty())
                .collect();
            let pick = picks.next().copied().unwrap_or(0);
            let source = live[pick % live.len()];
            if let Some(message) = queues[source].pop_front() {
                merged.push(message);
            }
        }
        merged
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn replay_is_deterministic(plans in arb_plans()) {
            let messages = sequential(&plans);
            let first = replay(&messages).unwrap();
            let second = replay(&messages).unwrap();
            prop_assert_eq!(first.digest(), second.digest());
            prop_assert_eq!(&first, &second);

            let decoded = DeploymentState::decode(first.encode()).unwrap();
            prop_assert_eq!(decoded.digest(), first.digest());
        }

        #[test]
        fn interleaving_does_not_change_projection(
            plans in arb_plans(),
            picks in prop::collection::vec(any::<usize>(), 1..32),
        ) {
            let expected = replay(&sequential(&plans)).unwrap();
            let actual = replay(&interleaved(&plans, &picks)).unwrap();
            prop_assert_eq!(actual.digest(), expected.digest());
        }

        #[test]
        fn dependencies_survive_every_message(plans in arb_plans()) {
            let mut state = DeploymentState::new();
            for message in sequential(&plans) {
                state = deployment_state_reducer(&state, &message).unwrap();
                for (index, plan) in plans.iter().enumerate() {
                    if let Some(execution_state) = state.get(&future_id(index)) {
                        let declared: Vec<String> =
                            plan.dependencies.iter().map(|d| future_id(*d)).collect();
                        let recorded: Vec<String> =
                            execution_state.dependencies().iter().cloned().collect();
                        prop_assert_eq!(recorded, declared);
                    }
                }
            }
        }

        #[test]
        fn final_statuses_follow_plan(plans in arb_plans()) {
            let state = replay(&sequential(&plans)).unwrap();
            for (index, plan) in plans.iter().enumerate() {
                let execution_state = state.get(&future_id(index)).unwrap();
                let onchain = execution_state.network_interactions()[0].as_onchain().unwrap();
                match plan.confirmed {
                    Some(attempt) => {
                        let expected_status = if plan.succeeds {
                            ExecutionStatus::Success
                        } else {
                            ExecutionStatus::Failed
                        };
                        prop_assert_eq!(execution_state.status(), expected_status);
                        prop_assert_eq!(onchain.transactions.len(), 1);
                        prop_assert_eq!(&onchain.transactions[0].hash, &hash(index, attempt));
                    }
                    None => {
                        prop_assert_eq!(execution_state.status(), ExecutionStatus::Started);
                        prop_assert_eq!(onchain.transactions.len(), plan.attempts as usize);
                    }
                }
            }
        }

        #[test]
        fn rejected_message_changes_nothing(
            plans in arb_plans(),
            cut in any::<prop::sample::Index>(),
        ) {
            let messages = sequential(&plans);
            let prefix = &messages[..cut.index(messages.len() + 1)];

            let mut engine = Engine::open(MemoryJournal::new()).unwrap();
            for message in prefix {
                engine.apply(message.clone()).unwrap();
            }
            let before = engine.state().clone();

            // Never sent by any plan.
            let bogus = confirm(&future_id(0), 0, "0xdeadbeef");
            prop_assert!(engine.apply(bogus).is_err());
            prop_assert_eq!(engine.state(), &before);
            prop_assert_eq!(engine.applied(), prefix.len());
            prop_assert_eq!(engine.journal().len(), prefix.len());
        }
    }
}
