// crates/gamelog-core/tests/service_unit.rs
// ============================================================================
// Module: Game Log Service Tests
// Description: Request-path tests for validation, authorization, and ranking.
// Purpose: Exercise the service against in-memory and failing backends.
// Dependencies: gamelog-core, serde_json, time
// ============================================================================

//! ## Overview
//! Drives [`GameLogService`] end to end with in-memory stores and a fixed
//! clock, plus failing stores to cover the write/read failure mappings.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::Arc;

use gamelog_core::AuthorizationFailure;
use gamelog_core::EventStore;
use gamelog_core::EventStoreError;
use gamelog_core::FixedClock;
use gamelog_core::GameLogError;
use gamelog_core::GameLogService;
use gamelog_core::GameName;
use gamelog_core::InMemoryEventStore;
use gamelog_core::InMemoryScoreStore;
use gamelog_core::InMemorySecretResolver;
use gamelog_core::LogEvent;
use gamelog_core::ObjectKey;
use gamelog_core::ScoreRecord;
use gamelog_core::ScoreRegistration;
use gamelog_core::ScoreStore;
use gamelog_core::ScoreStoreError;
use gamelog_core::SecretError;
use gamelog_core::SecretResolver;
use gamelog_core::Timestamp;
use gamelog_core::sign_body;
use serde_json::Value;
use time::macros::datetime;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

struct Harness {
    service: GameLogService,
    events: InMemoryEventStore,
    scores: InMemoryScoreStore,
    clock: Arc<FixedClock>,
}

fn game(name: &str) -> GameName {
    GameName::parse(name).unwrap()
}

fn harness() -> Harness {
    let events = InMemoryEventStore::new();
    let scores = InMemoryScoreStore::new();
    let secrets = InMemorySecretResolver::new()
        .with_secret(game("A"), "secret-a")
        .with_secret(game("B"), "secret-b");
    let clock = Arc::new(FixedClock::new(Timestamp::new(datetime!(2024-07-01 12:00 UTC))));
    let service = GameLogService::new(
        Arc::new(events.clone()),
        Arc::new(scores.clone()),
        Arc::new(secrets),
        clock.clone(),
    );
    Harness {
        service,
        events,
        scores,
        clock,
    }
}

fn score_body(game_name: &str, player: &str, score: i64) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "game_name": game_name,
        "player_id": player,
        "score": score,
    }))
    .unwrap()
}

fn bearer(body: &[u8], secret: &str) -> String {
    format!("Bearer {}", sign_body(body, secret).unwrap())
}

fn submit(h: &Harness, game_name: &str, secret: &str, score: i64) -> ScoreRecord {
    let body = score_body(game_name, "player", score);
    h.service.register_score(&body, Some(&bearer(&body, secret))).unwrap()
}

// ============================================================================
// SECTION: Event Logging
// ============================================================================

#[test]
fn log_event_assigns_server_timestamp_and_remote_addr() {
    let h = harness();
    let body = br#"{"game_name":"A","payload":{"kind":"start","ts":"client-supplied"}}"#;
    let key = h.service.log_event(body, "203.0.113.9").unwrap();
    assert!(key.as_str().starts_with("logs/game=A/dt=2024-07-01/"));
    assert!(key.as_str().ends_with(".json"));

    let stored: Value = serde_json::from_slice(&h.events.get(&key).unwrap().unwrap()).unwrap();
    assert_eq!(stored["serverTimestamp"], "2024-07-01T12:00:00Z");
    assert_eq!(stored["remoteAddr"], "203.0.113.9");
    assert_eq!(stored["payload"]["ts"], "client-supplied");
}

#[test]
fn log_event_does_not_require_signature_or_known_game() {
    let h = harness();
    assert!(h.service.log_event(br#"{"game_name":"unprovisioned","payload":1}"#, "").is_ok());
}

#[test]
fn log_event_rejects_missing_game_and_bad_json() {
    let h = harness();
    for body in [&b"not json"[..], br#"{"payload":{}}"#, br#"{"game_name":"","payload":{}}"#] {
        assert!(matches!(h.service.log_event(body, ""), Err(GameLogError::Validation(_))));
    }
    assert!(h.events.keys().unwrap().is_empty());
}

// ============================================================================
// SECTION: Score Registration
// ============================================================================

#[test]
fn register_score_with_valid_signature_creates_record() {
    let h = harness();
    let record = submit(&h, "A", "secret-a", 100);
    assert!(!record.id.as_str().is_empty());
    assert_eq!(record.score, 100);
    assert_eq!(record.player_id, "player");
    assert_eq!(h.scores.record_count().unwrap(), 1);
}

#[test]
fn repeated_submissions_create_distinct_records() {
    let h = harness();
    let first = submit(&h, "A", "secret-a", 5);
    let second = submit(&h, "A", "secret-a", 5);
    assert_ne!(first.id, second.id);
    assert_eq!(h.scores.record_count().unwrap(), 2);
}

#[test]
fn authorization_failures_share_one_message() {
    let h = harness();
    let body = score_body("A", "p", 1);
    let wrong_key = h.service.register_score(&body, Some(&bearer(&body, "secret-b"))).unwrap_err();
    let missing = h.service.register_score(&body, None).unwrap_err();
    let unknown_body = score_body("Z", "p", 1);
    let unknown = h
        .service
        .register_score(&unknown_body, Some(&bearer(&unknown_body, "secret-a")))
        .unwrap_err();

    assert!(matches!(
        wrong_key,
        GameLogError::Authorization(AuthorizationFailure::SignatureMismatch)
    ));
    assert!(matches!(missing, GameLogError::Authorization(AuthorizationFailure::SignatureMismatch)));
    assert!(matches!(unknown, GameLogError::Authorization(AuthorizationFailure::UnknownGame)));
    assert_eq!(wrong_key.to_string(), unknown.to_string());
    assert_eq!(missing.to_string(), "Invalid signature");
    assert_eq!(h.scores.record_count().unwrap(), 0);
}

#[test]
fn signature_covers_exact_body_bytes() {
    let h = harness();
    let body = score_body("A", "p", 1);
    let header = bearer(&body, "secret-a");
    let mut reformatted = body.clone();
    reformatted.push(b' ');
    assert!(matches!(
        h.service.register_score(&reformatted, Some(&header)),
        Err(GameLogError::Authorization(_))
    ));
}

#[test]
fn register_score_validates_before_authorizing() {
    let h = harness();
    let body = br#"{"player_id":"p","score":1}"#;
    assert!(matches!(h.service.register_score(body, None), Err(GameLogError::Validation(_))));
}

// ============================================================================
// SECTION: Leaderboards
// ============================================================================

#[test]
fn leaderboard_scenario_orders_and_isolates_games() {
    let h = harness();
    let t1 = Timestamp::new(datetime!(2024-07-01 12:00 UTC));
    let t2 = Timestamp::new(datetime!(2024-07-01 12:01 UTC));
    let t3 = Timestamp::new(datetime!(2024-07-01 12:02 UTC));
    let t4 = Timestamp::new(datetime!(2024-07-01 12:03 UTC));
    h.clock.set(t1);
    submit(&h, "A", "secret-a", 100);
    h.clock.set(t2);
    submit(&h, "A", "secret-a", 200);
    h.clock.set(t3);
    submit(&h, "A", "secret-a", 200);
    h.clock.set(t4);
    submit(&h, "B", "secret-b", 999);

    let a: Vec<(i64, Timestamp)> =
        h.service.top_scores("A").unwrap().into_iter().map(|r| (r.score, r.timestamp)).collect();
    assert_eq!(a, vec![(200, t3), (200, t2), (100, t1)]);
    let b: Vec<(i64, Timestamp)> =
        h.service.top_scores("B").unwrap().into_iter().map(|r| (r.score, r.timestamp)).collect();
    assert_eq!(b, vec![(999, t4)]);
}

#[test]
fn leaderboard_is_capped_at_ten_and_monotonic() {
    let h = harness();
    for score in [3, 17, 4, 4, 99, -5, 0, 12, 12, 8, 41, 7, 23] {
        h.clock.advance(time::Duration::seconds(1));
        submit(&h, "A", "secret-a", score);
    }
    let top = h.service.top_scores("A").unwrap();
    assert_eq!(top.len(), 10);
    for pair in top.windows(2) {
        assert!(pair[0].score >= pair[1].score);
        if pair[0].score == pair[1].score {
            assert!(pair[0].timestamp >= pair[1].timestamp);
        }
    }
}

#[test]
fn leaderboard_for_unknown_game_is_empty() {
    let h = harness();
    assert!(h.service.top_scores("never-seen").unwrap().is_empty());
}

#[test]
fn leaderboard_rejects_empty_game_name() {
    let h = harness();
    assert!(matches!(h.service.top_scores(""), Err(GameLogError::Validation(_))));
}

// ============================================================================
// SECTION: Failure Mapping
// ============================================================================

struct FailingStores;

impl EventStore for FailingStores {
    fn append(&self, _event: &LogEvent) -> Result<ObjectKey, EventStoreError> {
        Err(EventStoreError::Backend("bucket unavailable".to_string()))
    }
}

impl ScoreStore for FailingStores {
    fn register(&self, _registration: ScoreRegistration) -> Result<ScoreRecord, ScoreStoreError> {
        Err(ScoreStoreError::Io("disk full".to_string()))
    }

    fn list_top(
        &self,
        _game_name: &GameName,
        _limit: usize,
    ) -> Result<Vec<ScoreRecord>, ScoreStoreError> {
        Err(ScoreStoreError::Io("connection lost".to_string()))
    }
}

impl SecretResolver for FailingStores {
    fn get_secret(&self, _game_name: &GameName) -> Result<String, SecretError> {
        Err(SecretError::Read("metadata unavailable".to_string()))
    }
}

#[test]
fn store_failures_map_to_write_and_read_failures() {
    let failing = Arc::new(FailingStores);
    let clock = Arc::new(FixedClock::new(Timestamp::new(datetime!(2024-07-01 12:00 UTC))));
    let service = GameLogService::new(failing.clone(), failing.clone(), failing, clock);

    assert!(matches!(
        service.log_event(br#"{"game_name":"A"}"#, ""),
        Err(GameLogError::WriteFailure(_))
    ));
    assert!(matches!(service.top_scores("A"), Err(GameLogError::ReadFailure(_))));
    let body = score_body("A", "p", 1);
    assert!(matches!(
        service.register_score(&body, Some(&bearer(&body, "x"))),
        Err(GameLogError::ReadFailure(_))
    ));
}

#[test]
fn registration_write_failure_is_reported() {
    let failing = Arc::new(FailingStores);
    let secrets = InMemorySecretResolver::new().with_secret(game("A"), "k");
    let clock = Arc::new(FixedClock::new(Timestamp::new(datetime!(2024-07-01 12:00 UTC))));
    let service = GameLogService::new(failing.clone(), failing, Arc::new(secrets), clock);
    let body = score_body("A", "p", 1);
    assert!(matches!(
        service.register_score(&body, Some(&bearer(&body, "k"))),
        Err(GameLogError::WriteFailure(_))
    ));
}

/// Event store refusing every event with a fixed error.
struct RefusingEvents(fn() -> EventStoreError);

impl EventStore for RefusingEvents {
    fn append(&self, _event: &LogEvent) -> Result<ObjectKey, EventStoreError> {
        Err((self.0)())
    }
}

#[test]
fn event_store_refusals_are_caller_errors() {
    let service_with = |refusal: fn() -> EventStoreError| {
        GameLogService::new(
            Arc::new(RefusingEvents(refusal)),
            Arc::new(InMemoryScoreStore::new()),
            Arc::new(InMemorySecretResolver::new()),
            Arc::new(FixedClock::new(Timestamp::new(datetime!(2024-07-01 12:00 UTC)))),
        )
    };
    let body = br#"{"game_name":"A","payload":{}}"#;

    let too_large = service_with(|| EventStoreError::TooLarge("5000000 > 4194304".to_string()));
    assert!(matches!(too_large.log_event(body, ""), Err(GameLogError::PayloadTooLarge(_))));
    let invalid = service_with(|| EventStoreError::Invalid("segment too long".to_string()));
    assert!(matches!(invalid.log_event(body, ""), Err(GameLogError::Validation(_))));
    let io = service_with(|| EventStoreError::Io("disk full".to_string()));
    assert!(matches!(io.log_event(body, ""), Err(GameLogError::WriteFailure(_))));
}

#[test]
fn null_player_and_score_read_as_zero_values() {
    let h = harness();
    let body = br#"{"game_name":"A","player_id":null,"score":null}"#;
    let record = h.service.register_score(body, Some(&bearer(body, "secret-a"))).unwrap();
    assert_eq!(record.player_id, "");
    assert_eq!(record.score, 0);
    assert_eq!(h.service.top_scores("A").unwrap(), vec![record]);
}
