//! Functional tests for the editor command mailbox.
//!
//! The editor polls a shared directory; these tests play the editor's part
//! and check the discipline on our side of the exchange:
//! - A result left over from an earlier command is never returned.
//! - Each result is consumed exactly once.
//! - Silence ends in a timeout only after the full polling ceiling.
//! - Editor failure sentinels come back as failures, not payloads.

use bridge_channel::{
    ChannelConfig, Command, CommandOutcome, FileChannel, Payload, COMMAND_FILE, RESULT_FILE,
};
use bridge_test_utils::EditorStub;
use std::time::Duration;

fn channel(dir: &std::path::Path) -> FileChannel {
    FileChannel::new(
        ChannelConfig::new(dir)
            .with_poll_interval(Duration::from_millis(20))
            .with_max_attempts(10),
    )
}

/// Tenet: stale results are discarded before a command is issued.
#[tokio::test]
async fn test_stale_result_is_never_returned() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(RESULT_FILE), "LEFTOVER").unwrap();

    let _editor = EditorStub::spawn(
        dir.path().join(COMMAND_FILE),
        dir.path().join(RESULT_FILE),
        |_| Some("FRESH".to_string()),
    );
    let outcome = channel(dir.path()).send(&Command::new("get_selection")).await.unwrap();

    assert_eq!(
        outcome,
        CommandOutcome::Success {
            payload: Payload::Text("FRESH".to_string())
        }
    );
}

/// Tenet: no answer means timeout, after at least the whole ceiling.
#[tokio::test]
async fn test_silence_times_out_after_ceiling() {
    let dir = tempfile::tempdir().unwrap();
    let channel = channel(dir.path());

    let outcome = channel.send(&Command::new("play")).await.unwrap();
    match outcome {
        CommandOutcome::Timeout { attempts, waited } => {
            assert_eq!(attempts, 10);
            assert!(waited >= channel.config().ceiling());
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    assert!(dir.path().join(COMMAND_FILE).exists());
}

/// Tenet: a sentinel is a failure with its text preserved.
#[tokio::test]
async fn test_sentinel_is_failure() {
    let dir = tempfile::tempdir().unwrap();
    let _editor = EditorStub::spawn(
        dir.path().join(COMMAND_FILE),
        dir.path().join(RESULT_FILE),
        |_| Some("Failed".to_string()),
    );

    let outcome = channel(dir.path())
        .send(&Command::create_gameobject("Cube", Some("Cube")))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        CommandOutcome::Failure {
            reason: "Failed".to_string()
        }
    );
}

/// Tenet: results are consumed exactly once.
#[tokio::test]
async fn test_result_consumed_once() {
    let dir = tempfile::tempdir().unwrap();
    let _editor = EditorStub::spawn(
        dir.path().join(COMMAND_FILE),
        dir.path().join(RESULT_FILE),
        |line| Some(format!("echo:{line}")),
    );

    let outcome = channel(dir.path()).send(&Command::new("stop")).await.unwrap();
    assert!(outcome.is_success());
    assert!(!dir.path().join(RESULT_FILE).exists());
}
