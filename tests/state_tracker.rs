//! Seeding, live updates and retry behaviour of the state tracker.

mod common;

use appbridge::{StateError, StateTracker};
use appbridge_proto::{Event, ProtocolClient, ProtocolError, event_types};
use common::{CallLog, MockClient};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

const ROOM: &str = "!room:hs";
const RETRY: Duration = Duration::from_secs(1);

fn topic(text: &str) -> Event {
    Event::state(ROOM, "@alice:hs", event_types::TOPIC, "", json!({"topic": text}))
}

fn member(user: &str, membership: &str) -> Event {
    Event::state(ROOM, user, event_types::MEMBER, user, json!({"membership": membership}))
}

fn state_response(events: &[Event]) -> Value {
    serde_json::to_value(events).unwrap()
}

fn tracker(client: &Arc<MockClient>) -> StateTracker {
    StateTracker::new(Arc::clone(client) as Arc<dyn ProtocolClient>, RETRY)
}

#[tokio::test(start_paused = true)]
async fn pushed_events_wait_for_the_fetch_and_win_over_it() {
    let log = CallLog::new();
    let client = MockClient::new("@bot:hs", &log);
    client.script_after(
        "room_state",
        Duration::from_millis(100),
        Ok(state_response(&[topic("from fetch"), member("@alice:hs", "join")])),
    );
    let tracker = tracker(&client);

    let seeding = tokio::spawn({
        let tracker = tracker.clone();
        async move { tracker.track(ROOM).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    tracker.on_event(&topic("pushed"));
    assert!(tracker.is_tracked(ROOM));
    assert!(tracker.get_state(ROOM, event_types::TOPIC).is_empty());

    seeding.await.unwrap().unwrap();

    let current = tracker
        .get_state_event(ROOM, event_types::TOPIC, "")
        .unwrap();
    assert_eq!(current.content["topic"], "pushed");
    assert_eq!(tracker.get_state(ROOM, event_types::MEMBER).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn events_after_seeding_apply_immediately() {
    let log = CallLog::new();
    let client = MockClient::new("@bot:hs", &log);
    let tracker = tracker(&client);

    tracker.track(ROOM).await.unwrap();
    tracker.on_event(&member("@bob:hs", "join"));
    tracker.on_event(&member("@alice:hs", "invite"));
    tracker.on_event(&member("@bob:hs", "leave"));

    let members = tracker.get_state(ROOM, event_types::MEMBER);
    let keys: Vec<_> = members
        .iter()
        .map(|e| (e.state_key.clone().unwrap(), e.membership().unwrap().to_string()))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("@alice:hs".to_string(), "invite".to_string()),
            ("@bob:hs".to_string(), "leave".to_string()),
        ]
    );
    assert!(tracker.get_state_event(ROOM, event_types::MEMBER, "@carol:hs").is_none());
}

#[tokio::test(start_paused = true)]
async fn structured_failure_is_not_retried() {
    let log = CallLog::new();
    let client = MockClient::new("@bot:hs", &log);
    client.fail("room_state", ProtocolError::forbidden("not in room"));
    let tracker = tracker(&client);

    let err = tracker.track(ROOM).await.unwrap_err();

    assert!(matches!(err, StateError::Protocol(ref e) if e.is_permission_denied()));
    assert_eq!(log.count("room_state"), 1);
    assert!(!tracker.is_tracked(ROOM));

    // Forgotten, so a later track starts over.
    tracker.track(ROOM).await.unwrap();
    assert_eq!(log.count("room_state"), 2);
}

#[tokio::test(start_paused = true)]
async fn transient_failures_are_retried_until_success() {
    let log = CallLog::new();
    let client = MockClient::new("@bot:hs", &log);
    client.fail("room_state", ProtocolError::transient("connection reset"));
    client.fail("room_state", ProtocolError::transient("connection reset"));
    client.fail("room_state", ProtocolError::transient("timeout"));
    client.script("room_state", Ok(state_response(&[topic("finally")])));
    let tracker = tracker(&client);

    let started = tokio::time::Instant::now();
    tracker.track(ROOM).await.unwrap();

    assert_eq!(log.count("room_state"), 4);
    assert!(started.elapsed() >= RETRY * 3);
    assert_eq!(
        tracker.get_state_event(ROOM, event_types::TOPIC, "").unwrap().content["topic"],
        "finally"
    );
}

#[tokio::test(start_paused = true)]
async fn concurrent_tracks_share_one_fetch() {
    let log = CallLog::new();
    let client = MockClient::new("@bot:hs", &log);
    client.script_after("room_state", Duration::from_millis(50), Ok(json!([])));
    let tracker = tracker(&client);

    let (a, b) = tokio::join!(tracker.track(ROOM), tracker.track(ROOM));
    a.unwrap();
    b.unwrap();
    tracker.track(ROOM).await.unwrap();

    assert_eq!(log.count("room_state"), 1);
    assert_eq!(tracker.tracked_rooms(), vec![ROOM.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn untrack_stops_the_retry_loop() {
    let log = CallLog::new();
    let client = MockClient::new("@bot:hs", &log);
    for _ in 0..5 {
        client.fail("room_state", ProtocolError::transient("down"));
    }
    let tracker = tracker(&client);

    let seeding = tokio::spawn({
        let tracker = tracker.clone();
        async move { tracker.track(ROOM).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(tracker.untrack(ROOM));

    let err = seeding.await.unwrap().unwrap_err();
    assert_eq!(err, StateError::Untracked(ROOM.to_string()));
    assert_eq!(log.count("room_state"), 1);
    assert!(tracker.tracked_rooms().is_empty());
}

#[tokio::test(start_paused = true)]
async fn ignores_untracked_rooms_and_filtered_types() {
    let log = CallLog::new();
    let client = MockClient::new("@bot:hs", &log);
    client.script(
        "room_state",
        Ok(state_response(&[topic("hidden"), member("@alice:hs", "join")])),
    );
    let tracker = StateTracker::with_event_types(
        Arc::clone(&client) as Arc<dyn ProtocolClient>,
        [event_types::MEMBER],
        RETRY,
    );

    tracker.on_event(&member("@early:hs", "join"));
    tracker.track(ROOM).await.unwrap();
    tracker.on_event(&topic("also hidden"));
    tracker.on_event(&Event::message(ROOM, "@alice:hs", event_types::MESSAGE, json!({"body": "hi"})));

    assert!(tracker.get_state(ROOM, event_types::TOPIC).is_empty());
    assert!(tracker.get_state(ROOM, event_types::MESSAGE).is_empty());
    let members = tracker.get_state(ROOM, event_types::MEMBER);
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].sender, "@alice:hs");
    assert!(tracker.get_state("!other:hs", event_types::MEMBER).is_empty());
}
