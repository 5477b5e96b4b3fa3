use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ignition_execution::{deployment_state_reducer, mocks, replay, DeploymentState};
use ignition_types::JournalMessage;

fn setup_journal(futures: usize) -> Vec<JournalMessage> {
    let mut messages = vec![mocks::run_start(31337)];
    for index in 0..futures {
        let id = format!("Module#Contract{index}");
        let previous = index
            .checked_sub(1)
            .map(|previous| format!("Module#Contract{previous}"));
        let dependencies: Vec<&str> = previous.iter().map(String::as_str).collect();
        messages.extend(mocks::deployment_lifecycle(&id, &dependencies));
    }
    messages
}

fn replay_journal(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");
    for futures in [10usize, 100, 1_000] {
        let messages = setup_journal(futures);

        group.bench_function(BenchmarkId::new("full", futures), |b| {
            b.iter(|| black_box(replay(&messages).expect("valid journal")))
        });

        let state = replay(&messages[..messages.len() - 1]).expect("valid journal");
        let last = messages.last().cloned().expect("non-empty journal");
        group.bench_function(BenchmarkId::new("single_message", futures), |b| {
            b.iter(|| black_box(deployment_state_reducer(&state, &last).expect("accepted")))
        });

        group.bench_function(BenchmarkId::new("digest", futures), |b| {
            b.iter(|| black_box(state.digest()))
        });
    }
    group.finish();
}

fn empty_digest(c: &mut Criterion) {
    let state = DeploymentState::new();
    c.bench_function("digest_empty", |b| b.iter(|| black_box(state.digest())));
}

criterion_group!(benches, replay_journal, empty_digest);
criterion_main!(benches);
