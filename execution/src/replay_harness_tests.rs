//! Replay harness tests for crash recovery.
//!
//! These tests run a deployment through the engine, interrupt it at every possible
//! point (between messages and in the middle of a journal append), reopen the journal
//! and check that the recovered projection matches an uninterrupted run.

#[cfg(test)]
mod tests {
    use crate::engine::Engine;
    use crate::journal::{FileJournal, Journal, MemoryJournal};
    use crate::mocks::{
        call_complete_success, call_init, confirm, contract_at_init, deployment_init,
        deployment_lifecycle, onchain_request, read_event_argument_init, receipt, run_start, send,
        static_call_complete, static_call_init, static_call_request, static_call_success,
    };
    use crate::replay::replay;
    use ignition_types::{ExecutionStatus, JournalMessage, SolidityValue, Transaction};
    use std::fs::OpenOptions;

    /// A deployment touching every execution state kind.
    fn scenario() -> Vec<JournalMessage> {
        let mut messages = vec![run_start(31337)];
        messages.extend(deployment_lifecycle("Token#Token", &[]));
        messages.extend([
            contract_at_init("Token#Existing", &[]),
            call_init("Token#Token.mint", &["Token#Token"]),
            static_call_request("Token#Token.mint", 0),
            static_call_complete("Token#Token.mint", 0),
            onchain_request("Token#Token.mint", 1),
            send("Token#Token.mint", 1, "0xccc", 1),
            confirm("Token#Token.mint", 1, "0xccc"),
            call_complete_success("Token#Token.mint"),
            read_event_argument_init("Token#Transfer.value", &["Token#Token.mint"]),
            static_call_init("Token#Token.balanceOf", &["Token#Token.mint"]),
            static_call_request("Token#Token.balanceOf", 0),
            static_call_complete("Token#Token.balanceOf", 0),
            static_call_success("Token#Token.balanceOf", SolidityValue::Uint(5)),
        ]);
        messages
    }

    fn run_clean(messages: &[JournalMessage]) -> Engine<MemoryJournal> {
        let mut engine = Engine::open(MemoryJournal::new()).expect("open engine");
        for message in messages {
            engine.apply(message.clone()).expect("clean run should apply");
        }
        engine
    }

    #[test]
    fn test_end_to_end_confirm_collapse() {
        let messages = vec![
            deployment_init("F1", &[]),
            onchain_request("F1", 0),
            send("F1", 0, "0xaaa", 0),
            send("F1", 0, "0xbbb", 0),
            confirm("F1", 0, "0xbbb"),
        ];
        let state = replay(&messages).expect("replay");
        let f1 = state.get("F1").expect("F1 initialized");

        assert_eq!(f1.status(), ExecutionStatus::Started);
        assert!(f1.dependencies().is_empty());
        assert_eq!(f1.network_interactions().len(), 1);
        let onchain = f1.network_interactions()[0]
            .as_onchain()
            .expect("onchain interaction");
        assert_eq!(
            onchain.transactions,
            vec![Transaction {
                receipt: Some(receipt()),
                ..Transaction::sent("0xbbb", crate::mocks::FEES)
            }]
        );
    }

    #[test]
    fn test_scenario_reaches_expected_statuses() {
        let engine = run_clean(&scenario());
        let state = engine.state();

        assert_eq!(state.chain_id, Some(31337));
        assert_eq!(state.len(), 5);
        for (id, execution_state) in &state.execution_states {
            assert_eq!(
                execution_state.status(),
                ExecutionStatus::Success,
                "{id} should have succeeded"
            );
        }
    }

    #[test]
    fn test_replay_matches_live_projection() {
        let engine = run_clean(&scenario());
        let replayed = replay(&scenario()).expect("replay");
        assert_eq!(&replayed, engine.state());
        assert_eq!(replayed.digest(), engine.state().digest());
    }

    #[test]
    fn test_crash_between_messages_converges() {
        let messages = scenario();
        let expected = run_clean(&messages).state().digest();

        for crash_at in 0..=messages.len() {
            let dir = tempfile::tempdir().expect("tempdir");
            let path = dir.path().join("journal.bin");
            {
                let mut engine =
                    Engine::open(FileJournal::open(&path).expect("open journal")).expect("engine");
                for message in &messages[..crash_at] {
                    engine.apply(message.clone()).expect("apply before crash");
                }
            }

            let mut engine =
                Engine::open(FileJournal::open(&path).expect("reopen journal")).expect("recover");
            assert_eq!(engine.applied(), crash_at);
            for message in &messages[crash_at..] {
                engine.apply(message.clone()).expect("apply after recovery");
            }
            assert_eq!(
                engine.state().digest(),
                expected,
                "divergence after crash at message {crash_at}"
            );
        }
    }

    #[test]
    fn test_crash_mid_append_drops_partial_record() {
        let messages = scenario();
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("journal.bin");

        let mut record_ends = Vec::new();
        {
            let mut journal = FileJournal::open(&path).expect("open journal");
            for message in &messages {
                journal.append(message).expect("append");
                record_ends.push(std::fs::metadata(&path).expect("metadata").len());
            }
        }

        // Cut the file halfway into the record of message `k`.
        let k = messages.len() / 2;
        let start = record_ends[k - 1];
        let cut = start + (record_ends[k] - start) / 2;
        let file = OpenOptions::new().write(true).open(&path).expect("open file");
        file.set_len(cut).expect("truncate");
        drop(file);

        let mut engine =
            Engine::open(FileJournal::open(&path).expect("reopen journal")).expect("recover");
        assert_eq!(engine.applied(), k);
        assert_eq!(engine.state(), &replay(&messages[..k]).expect("prefix replay"));

        for message in &messages[k..] {
            engine.apply(message.clone()).expect("resume");
        }
        assert_eq!(engine.state(), run_clean(&messages).state());
    }

    #[test]
    fn test_crash_after_broadcast_before_journal() {
        // The send for "0xaaa" was broadcast but never journaled. After recovery the
        // orchestrator observes the same hash again, which must be accepted once.
        let before_crash = vec![deployment_init("F1", &[]), onchain_request("F1", 0)];
        let mut engine = Engine::open(MemoryJournal::from_messages(before_crash)).expect("recover");

        let onchain = engine.state().get("F1").expect("F1").network_interactions()[0]
            .as_onchain()
            .expect("onchain")
            .clone();
        assert!(onchain.transactions.is_empty());

        engine.apply(send("F1", 0, "0xaaa", 0)).expect("first observation");
        engine.apply(send("F1", 0, "0xaaa", 0)).expect("second observation");
        let onchain = engine.state().get("F1").expect("F1").network_interactions()[0]
            .as_onchain()
            .expect("onchain")
            .clone();
        assert_eq!(onchain.transactions.len(), 1);
    }
}
