//! End-to-end turn-flow scenarios across the orchestrator, both memory
//! tiers, and a scripted generation stream.

use echomind_assistant::test_helpers::{
    orchestrator_over_store, FlakyStore, Script, ScriptedGenerator,
};
use echomind_assistant::{TurnOrchestrator, TurnOutcome};
use echomind_core::memory::MemoryStore;
use echomind_memory::long_term::NO_RESULTS_SENTINEL;
use echomind_memory::short_term::EMPTY_SENTINEL;
use echomind_memory::InMemoryStore;
use std::sync::Arc;
use std::time::Duration;

/// Wait for the background write queue to land `expected` adds in the store.
async fn await_store_count(store: &InMemoryStore, expected: usize) {
    for _ in 0..200 {
        if store.count().await == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("store never reached {expected} writes");
}

#[tokio::test]
async fn hello_end_to_end() {
    // Empty STM, empty LTM, a two-chunk stream: the full first-turn contract.
    let generator = Arc::new(ScriptedGenerator::streaming(vec!["Hi", " there"]));
    let store = Arc::new(InMemoryStore::new());
    let orchestrator = orchestrator_over_store(generator.clone(), store.clone(), 10);

    let mut cumulative: Vec<String> = Vec::new();
    let mut sink = |full: &str| cumulative.push(full.to_string());
    let outcome = orchestrator.process_turn("Hello", &mut sink).await.unwrap();

    // The sink saw cumulative text, not deltas.
    assert_eq!(cumulative, vec!["Hi".to_string(), "Hi there".to_string()]);
    assert_eq!(
        outcome,
        TurnOutcome::Completed {
            reply: "Hi there".into()
        }
    );

    // The prompt carried both sentinels and the literal input.
    let prompt = generator.last_prompt().unwrap();
    assert!(prompt.contains(EMPTY_SENTINEL));
    assert!(prompt.contains(NO_RESULTS_SENTINEL));
    assert!(prompt.contains("User: Hello"));

    // Exactly one STM append, with the canonical record form.
    assert_eq!(
        orchestrator.short_term_snapshot(),
        vec!["User: Hello\nAssistant: Hi there"]
    );

    // Exactly one LTM add of the same record, off the critical path.
    await_store_count(&store, 1).await;
    let hits = store.search("Hello", "default_user", 10).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].memory, "User: Hello\nAssistant: Hi there");
}

#[tokio::test]
async fn capacity_two_keeps_the_last_two_turns() {
    let generator = Arc::new(ScriptedGenerator::replies(&["A1", "A2", "A3"]));
    let store = Arc::new(InMemoryStore::new());
    let orchestrator = orchestrator_over_store(generator, store, 2);

    let mut sink = |_: &str| {};
    for input in ["T1", "T2", "T3"] {
        let outcome = orchestrator.process_turn(input, &mut sink).await.unwrap();
        assert!(matches!(outcome, TurnOutcome::Completed { .. }));
    }

    assert_eq!(
        orchestrator.short_term_snapshot(),
        vec!["User: T2\nAssistant: A2", "User: T3\nAssistant: A3"]
    );
}

#[tokio::test]
async fn second_turn_sees_the_first_in_short_term_context() {
    let generator = Arc::new(ScriptedGenerator::replies(&["blue", "noted"]));
    let store = Arc::new(InMemoryStore::new());
    let orchestrator = orchestrator_over_store(generator.clone(), store, 10);

    let mut sink = |_: &str| {};
    orchestrator
        .process_turn("favorite color?", &mut sink)
        .await
        .unwrap();
    orchestrator.process_turn("remember that", &mut sink).await.unwrap();

    let prompt = generator.last_prompt().unwrap();
    assert!(prompt.contains("User: favorite color?\nAssistant: blue"));
    assert!(!prompt.contains(EMPTY_SENTINEL));
}

#[tokio::test]
async fn ltm_write_failure_does_not_fail_the_turn() {
    let generator = Arc::new(ScriptedGenerator::replies(&["answered"]));
    let store = Arc::new(FlakyStore::failing_add());
    let orchestrator = orchestrator_over_store(generator, store.clone(), 10);

    let mut sink = |_: &str| {};
    let outcome = orchestrator.process_turn("question", &mut sink).await.unwrap();

    // The user got their answer and STM recorded it; the dropped write is
    // logged, never surfaced.
    assert_eq!(
        outcome,
        TurnOutcome::Completed {
            reply: "answered".into()
        }
    );
    assert_eq!(orchestrator.short_term_snapshot().len(), 1);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(store.adds().is_empty());
}

#[tokio::test]
async fn retrieved_memories_are_rendered_into_the_prompt() {
    let generator = Arc::new(ScriptedGenerator::replies(&["I remember"]));
    let store = Arc::new(InMemoryStore::new());
    store
        .add("User: I like astronomy\nAssistant: noted", "default_user")
        .await
        .unwrap();
    let orchestrator = orchestrator_over_store(generator.clone(), store, 10);

    let mut sink = |_: &str| {};
    orchestrator.process_turn("astronomy", &mut sink).await.unwrap();

    let prompt = generator.last_prompt().unwrap();
    assert!(prompt.contains("- User: I like astronomy"));
    assert!(prompt.contains("(relevance:"));
    assert!(!prompt.contains(NO_RESULTS_SENTINEL));
}

#[tokio::test(flavor = "multi_thread")]
async fn at_most_one_turn_in_flight() {
    use tokio::sync::Notify;

    /// A generator that parks until released, so a second trigger can race.
    struct ParkedGenerator {
        release: Arc<Notify>,
    }

    #[async_trait::async_trait]
    impl echomind_core::generation::Generator for ParkedGenerator {
        fn name(&self) -> &str {
            "parked"
        }

        async fn generate(
            &self,
            _request: echomind_core::generation::GenerationRequest,
            on_token: echomind_core::generation::TokenSink<'_>,
        ) -> Result<String, echomind_core::error::GenerationError> {
            self.release.notified().await;
            on_token("done");
            Ok("done".into())
        }

        async fn health_check(&self) -> Result<(), echomind_core::error::GenerationError> {
            Ok(())
        }
    }

    let release = Arc::new(Notify::new());
    let generator = Arc::new(ParkedGenerator {
        release: release.clone(),
    });

    let memory = Arc::new(echomind_memory::LongTermMemory::new(
        Arc::new(InMemoryStore::new()),
        "default_user",
    ));
    let writer = echomind_memory::MemoryWriter::spawn(memory.clone(), 8);
    let orchestrator = Arc::new(TurnOrchestrator::new(
        generator,
        memory,
        writer,
        echomind_core::persona::Persona::default(),
        echomind_assistant::TurnSettings {
            model: "test-model".into(),
            temperature: 0.8,
            num_gpu: 99,
            recall_limit: 3,
        },
        10,
    ));

    // First turn parks inside generation.
    let first = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            let mut sink = |_: &str| {};
            orchestrator.process_turn("first", &mut sink).await.unwrap()
        })
    };

    // Give the first turn time to take the in-flight guard.
    tokio::time::sleep(Duration::from_millis(50)).await;

    // A second trigger while Processing is rejected, never run concurrently.
    let mut sink = |_: &str| {};
    let second = orchestrator.process_turn("second", &mut sink).await.unwrap();
    assert_eq!(second, TurnOutcome::Busy);

    release.notify_one();
    let first = first.await.unwrap();
    assert_eq!(first, TurnOutcome::Completed { reply: "done".into() });

    // Guard released: a fresh trigger processes normally again.
    release.notify_one();
    let third = orchestrator.process_turn("third", &mut sink).await.unwrap();
    assert_eq!(third, TurnOutcome::Completed { reply: "done".into() });
}

#[tokio::test]
async fn failing_turn_then_successful_turn() {
    let generator = Arc::new(ScriptedGenerator::new_sequence(vec![
        Script::Fail(echomind_core::error::GenerationError::StreamInterrupted(
            "reset by peer".into(),
        )),
        Script::Stream(vec!["back online"]),
    ]));
    let store = Arc::new(InMemoryStore::new());
    let orchestrator = orchestrator_over_store(generator, store.clone(), 10);

    let mut sink = |_: &str| {};
    assert!(orchestrator.process_turn("one", &mut sink).await.is_err());
    assert!(orchestrator.short_term_snapshot().is_empty());

    let outcome = orchestrator.process_turn("two", &mut sink).await.unwrap();
    assert_eq!(
        outcome,
        TurnOutcome::Completed {
            reply: "back online".into()
        }
    );
    assert_eq!(orchestrator.short_term_snapshot().len(), 1);
    await_store_count(&store, 1).await;
}
