//! Scenario sequencing against a mock engine: command dispatch, slot
//! resolution, and fail-fast ordering.

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use parking_lot::Mutex;

use drift_events::EventProducer;
use drift_harness::{
    Action, EngineHandle, Event, FileInfo, HarnessError, MatchError, NoiseFilter, Peer, Scenario,
    WaitConfig,
};

/// Shared state of the mock engine, inspected by the tests.
#[derive(Default)]
struct MockState {
    commands: Mutex<Vec<String>>,
    /// Callback capability, wired up after the peer exists — exactly like a
    /// real engine receives it during startup.
    producer: Mutex<Option<EventProducer>>,
    fail_stop: bool,
}

impl MockState {
    fn commands(&self) -> Vec<String> {
        self.commands.lock().clone()
    }

    fn emit(&self, payload: &str) {
        if let Some(producer) = &*self.producer.lock() {
            producer.on_event(payload);
        }
    }
}

/// Engine double: records commands and emits the events a real engine would.
struct MockEngine(Arc<MockState>);

#[async_trait]
impl EngineHandle for MockEngine {
    async fn new_transfer(&self, peer: &str, paths: &[String]) -> anyhow::Result<String> {
        self.0
            .commands
            .lock()
            .push(format!("new_transfer {peer} {paths:?}"));

        // The engine reports the queued transfer through the callback before
        // the command returns, from its own context.
        self.0.emit(
            r#"{
                "type": "RequestQueued",
                "data": {
                    "peer": "bob",
                    "transfer": "xf-out-1",
                    "files": [{"id": "f1", "path": "a.txt", "size": 100}]
                }
            }"#,
        );
        Ok("xf-out-1".to_string())
    }

    async fn download(
        &self,
        transfer_id: &str,
        file_id: &str,
        destination: &str,
    ) -> anyhow::Result<()> {
        self.0
            .commands
            .lock()
            .push(format!("download {transfer_id} {file_id} {destination}"));
        Ok(())
    }

    async fn cancel_transfer(&self, transfer_id: &str) -> anyhow::Result<()> {
        self.0
            .commands
            .lock()
            .push(format!("cancel_transfer {transfer_id}"));
        Ok(())
    }

    async fn reject_file(&self, transfer_id: &str, file_id: &str) -> anyhow::Result<()> {
        self.0
            .commands
            .lock()
            .push(format!("reject_file {transfer_id} {file_id}"));
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        if self.0.fail_stop {
            anyhow::bail!("instance already stopped");
        }
        self.0.commands.lock().push("stop".to_string());
        Ok(())
    }
}

fn test_peer(state: Arc<MockState>) -> Peer {
    let peer = Peer::with_config(
        "dave",
        Box::new(MockEngine(Arc::clone(&state))),
        WaitConfig {
            poll_interval: Duration::from_millis(10),
            max_polls: 20,
        },
    );
    *state.producer.lock() = Some(peer.producer());
    peer
}

#[tokio::test(start_paused = true)]
async fn commands_resolve_slots_through_the_registry() {
    let state = Arc::new(MockState::default());
    let peer = test_peer(Arc::clone(&state));

    // An incoming request arrives before the scenario starts.
    peer.producer().on_event(
        r#"{
            "type": "RequestReceived",
            "data": {
                "peer": "alice",
                "transfer": "xf-in-7",
                "files": [{"id": "f1", "path": "photo.jpg", "size": 4096}]
            }
        }"#,
    );

    let scenario = Scenario::new(
        "receive and download",
        vec![
            Action::Wait {
                target: Event::RequestReceived {
                    slot: 0,
                    peer: "alice".to_string(),
                    files: vec![FileInfo::new("f1", "photo.jpg", 4096)],
                },
                filter: NoiseFilter::default(),
            },
            Action::Download {
                slot: 0,
                file: "f1".to_string(),
                destination: "/tmp/dl".to_string(),
            },
        ],
    );

    scenario.run(&peer).await.expect("scenario must pass");
    // The command went out under the opaque id, not the slot.
    assert_eq!(state.commands(), vec!["download xf-in-7 f1 /tmp/dl"]);
}

#[tokio::test(start_paused = true)]
async fn initiating_side_sees_its_transfer_under_slot_zero() {
    let state = Arc::new(MockState::default());
    let peer = test_peer(Arc::clone(&state));

    let scenario = Scenario::new(
        "send",
        vec![
            Action::NewTransfer {
                peer: "bob".to_string(),
                paths: vec!["a.txt".to_string()],
            },
            Action::Wait {
                target: Event::Queued {
                    slot: 0,
                    peer: "bob".to_string(),
                    files: vec![FileInfo::new("f1", "a.txt", 100)],
                },
                filter: NoiseFilter::default(),
            },
        ],
    );

    scenario.run(&peer).await.expect("scenario must pass");
    assert_eq!(peer.slots().slot_to_id(0), "xf-out-1");
}

#[tokio::test(start_paused = true)]
async fn first_failure_aborts_the_remaining_actions() {
    let state = Arc::new(MockState::default());
    let peer = test_peer(Arc::clone(&state));
    peer.producer().on_event(
        r#"{"type": "RuntimeError", "data": {"status": 3}}"#,
    );
    peer.slots().register_if_new("xf-in-7");

    let scenario = Scenario::new(
        "fails at the wait",
        vec![
            Action::Wait {
                target: Event::FinishFileUploaded {
                    slot: 0,
                    file: "f1".to_string(),
                },
                filter: NoiseFilter::default(),
            },
            Action::CancelTransfer { slot: 0 },
        ],
    );

    let err = scenario.run(&peer).await.expect_err("wait must mismatch");
    assert_matches!(err, HarnessError::Match(MatchError::Mismatch { .. }));
    // The cancel behind the failed wait never reached the engine.
    assert_eq!(state.commands(), Vec::<String>::new());
}

#[tokio::test(start_paused = true)]
async fn commands_against_unassigned_slots_fail_fast() {
    let state = Arc::new(MockState::default());
    let peer = test_peer(Arc::clone(&state));

    let err = Action::Download {
        slot: 3,
        file: "f1".to_string(),
        destination: "/tmp/dl".to_string(),
    }
    .run(&peer)
    .await
    .expect_err("slot 3 was never assigned");

    assert_matches!(err, HarnessError::UnknownSlot { slot: 3 });
    assert_eq!(state.commands(), Vec::<String>::new());
}

#[tokio::test(start_paused = true)]
async fn silence_window_ignores_noise_but_not_signals() {
    let state = Arc::new(MockState::default());
    let peer = test_peer(Arc::clone(&state));
    peer.slots().register_if_new("xf-in-7");

    peer.producer().on_event(
        r#"{"type": "FileProgress", "data": {"transfer": "xf-in-7", "file": "f1", "transfered": 9}}"#,
    );
    Action::ExpectSilence {
        duration: Duration::from_secs(2),
        filter: NoiseFilter::default(),
    }
    .run(&peer)
    .await
    .expect("progress noise must not break the silence");

    peer.producer().on_event(
        r#"{"type": "FilePaused", "data": {"transfer": "xf-in-7", "file": "f1"}}"#,
    );
    let err = Action::ExpectSilence {
        duration: Duration::from_secs(2),
        filter: NoiseFilter::default(),
    }
    .run(&peer)
    .await
    .expect_err("a pause event must break the silence");

    assert_matches!(err, HarnessError::UnexpectedEvent { event } => {
        assert_eq!(
            *event,
            Event::Paused { slot: 0, file: "f1".to_string() }
        );
    });
}

#[tokio::test(start_paused = true)]
async fn engine_failures_surface_as_harness_errors() {
    let state = Arc::new(MockState {
        fail_stop: true,
        ..MockState::default()
    });
    let peer = test_peer(Arc::clone(&state));

    let err = Action::Stop.run(&peer).await.expect_err("stop must fail");
    assert_matches!(err, HarnessError::Engine { message } => {
        assert!(message.contains("instance already stopped"));
    });
}

#[tokio::test(start_paused = true)]
async fn clear_between_phases_discards_stale_signals() {
    let state = Arc::new(MockState::default());
    let peer = test_peer(Arc::clone(&state));
    peer.slots().register_if_new("xf-in-7");

    peer.producer().on_event(
        r#"{"type": "FilePaused", "data": {"transfer": "xf-in-7", "file": "f1"}}"#,
    );

    Scenario::new(
        "phase boundary",
        vec![
            Action::ClearEvents,
            Action::ExpectSilence {
                duration: Duration::from_secs(1),
                filter: NoiseFilter::none(),
            },
        ],
    )
    .run(&peer)
    .await
    .expect("the stale pause was cleared");
}
