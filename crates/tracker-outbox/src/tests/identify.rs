//! User identification and storage reset.

use super::harness::{test_config, MockResponse, TestTracker};
use crate::TrackEvent;
use serde_json::json;
use std::sync::Arc;
use tracker_storage::{DurableStore, StorageKeys};

#[tokio::test]
async fn same_user_twice_sends_one_identify() {
    let t = TestTracker::new();

    let first = t.tracker.set_user("alice");
    let second = t.tracker.set_user("alice");

    first.expect("first set_user should publish").await.unwrap();
    assert!(second.is_none());
    assert_eq!(t.transport.request_count(), 1);
}

#[tokio::test]
async fn different_users_send_two_identifies() {
    let t = TestTracker::new();

    t.tracker.set_user("alice").unwrap().await.unwrap();
    t.tracker.set_user("bob").unwrap().await.unwrap();

    let bodies = t.transport.bodies();
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0]["clientId"], json!("alice"));
    assert_eq!(bodies[1]["clientId"], json!("bob"));
}

#[tokio::test]
async fn back_to_back_identifies_keep_their_own_user() {
    let t = TestTracker::new();

    let alice = t.tracker.set_user("alice").unwrap();
    let bob = t.tracker.set_user("bob").unwrap();
    alice.await.unwrap();
    bob.await.unwrap();

    let mut client_ids: Vec<String> = t
        .transport
        .bodies()
        .iter()
        .map(|body| body["clientId"].as_str().unwrap().to_string())
        .collect();
    client_ids.sort();
    assert_eq!(client_ids, vec!["alice", "bob"]);
}

#[tokio::test]
async fn identify_event_has_empty_data() {
    let t = TestTracker::new();
    t.tracker.set_user("alice").unwrap().await.unwrap();

    let body = t.transport.last_body();
    assert_eq!(body["name"], json!("identify"));
    assert_eq!(body["data"], json!({}));
    assert_eq!(body["clientId"], json!("alice"));
}

#[tokio::test]
async fn later_events_carry_client_id() {
    let t = TestTracker::new();
    t.tracker.set_user("alice").unwrap().await.unwrap();
    t.tracker.send(TrackEvent::page_view()).await.unwrap();

    assert_eq!(t.transport.last_body()["clientId"], json!("alice"));
    assert_eq!(t.tracker.user_id().as_deref(), Some("alice"));
}

#[tokio::test]
async fn user_survives_restart_and_is_not_reidentified() {
    let first = TestTracker::new();
    first.tracker.set_user("alice").unwrap().await.unwrap();
    let tmp_id = first.tracker.tmp_id();
    let store = first.store.clone();
    drop(first);

    let second = TestTracker::with_store(test_config(), store);
    assert_eq!(second.tracker.user_id().as_deref(), Some("alice"));
    assert_eq!(second.tracker.tmp_id(), tmp_id);
    assert!(second.tracker.set_user("alice").is_none());
}

#[tokio::test]
async fn concurrent_set_user_publishes_once() {
    let t = Arc::new(TestTracker::new());

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let t = t.clone();
        tasks.push(tokio::spawn(async move { t.tracker.set_user("carol") }));
    }

    let mut published = 0;
    for task in tasks {
        if let Some(handle) = task.await.unwrap() {
            handle.await.unwrap();
            published += 1;
        }
    }

    assert_eq!(published, 1);
    assert_eq!(t.transport.request_count(), 1);
}

#[tokio::test]
async fn clear_storage_resets_identity_and_queue() {
    let t = TestTracker::new();
    t.tracker.set_user("alice").unwrap().await.unwrap();
    t.transport.queue_response(MockResponse::Status(503));
    t.tracker.send(TrackEvent::page_view()).await.unwrap();
    let old_tmp_id = t.tracker.tmp_id().unwrap();
    assert_eq!(t.pending().await, 1);

    t.tracker.clear_storage().await.unwrap();

    for key in StorageKeys::ALL {
        assert!(!t.store.has(key).unwrap(), "{key} should be cleared");
    }
    assert!(t.tracker.user_id().is_none());
    assert!(t.tracker.is_running());

    t.tracker.send(TrackEvent::page_view()).await.unwrap();
    let body = t.transport.last_body();
    assert!(body.get("clientId").is_none());
    assert_ne!(body["tmpId"], json!(old_tmp_id));

    // The user can be identified again after a reset.
    assert!(t.tracker.set_user("alice").is_some());
}
