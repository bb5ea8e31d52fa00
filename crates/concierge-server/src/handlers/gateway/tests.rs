//! Tests for the authorization gateway.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use concierge_domain::{
    AuthorizationDecision, AuthorizationQuery, EntityResolver, Identity, Record, ResolverConfig,
};
use concierge_storage::{MemoryRecordStore, RecordStore, StorageError, StorageResult};

use super::*;
use crate::oracle::{AuthorizationOracle, OracleError, OracleResult, UnavailableOracle};

// ============================================================
// Test Mocks
// ============================================================

/// Oracle backed by a set of `(subject, object)` owner grants.
///
/// Records every query so tests can assert on call counts and triples.
struct MockOracle {
    grants: Mutex<HashSet<(String, String)>>,
    failure: Option<OracleError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    queries: Mutex<Vec<AuthorizationQuery>>,
}

impl MockOracle {
    fn new() -> Self {
        Self {
            grants: Mutex::new(HashSet::new()),
            failure: None,
            delay: None,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Each user owns their own profile, as in the demo store.
    fn self_owned() -> Self {
        let oracle = Self::new();
        for id in ["user_123", "user_456", "user_789"] {
            oracle.grant(id, id);
        }
        oracle
    }

    fn failing(failure: OracleError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::new()
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::self_owned()
        }
    }

    fn grant(&self, requester: &str, target: &str) {
        self.grants
            .lock()
            .unwrap()
            .insert((format!("user:{requester}"), format!("profile:{target}")));
    }

    fn revoke(&self, requester: &str, target: &str) {
        self.grants
            .lock()
            .unwrap()
            .remove(&(format!("user:{requester}"), format!("profile:{target}")));
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn queries(&self) -> Vec<AuthorizationQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthorizationOracle for MockOracle {
    async fn check(&self, query: &AuthorizationQuery) -> OracleResult<AuthorizationDecision> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }

        let allowed = query.relation == "owner"
            && self
                .grants
                .lock()
                .unwrap()
                .contains(&(query.subject.to_string(), query.object.clone()));
        Ok(AuthorizationDecision::from(allowed))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Record store that counts lookups and can be made to fail.
struct CountingStore {
    inner: MemoryRecordStore,
    fail: bool,
    gets: AtomicUsize,
}

impl CountingStore {
    fn seeded() -> Self {
        Self {
            inner: MemoryRecordStore::seeded(),
            fail: false,
            gets: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::seeded()
        }
    }

    fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for CountingStore {
    async fn list_all(&self) -> StorageResult<Vec<Record>> {
        self.inner.list_all().await
    }

    async fn get(&self, id: &str) -> StorageResult<Option<Record>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StorageError::Internal {
                message: "disk on fire".to_string(),
            });
        }
        self.inner.get(id).await
    }

    fn backend_name(&self) -> &'static str {
        "counting"
    }
}

fn user(id: &str) -> Identity {
    Identity::user(id).unwrap()
}

fn gateway(
    oracle: MockOracle,
) -> (
    AuthorizationGateway<CountingStore, MockOracle>,
    Arc<CountingStore>,
    Arc<MockOracle>,
) {
    let store = Arc::new(CountingStore::seeded());
    let oracle = Arc::new(oracle);
    let gateway = AuthorizationGateway::new(Arc::clone(&store), Arc::clone(&oracle));
    (gateway, store, oracle)
}

// ============================================================
// Scenarios
// ============================================================

#[tokio::test]
async fn test_own_points_are_answered() {
    let (gateway, _store, oracle) = gateway(MockOracle::self_owned());

    let outcome = gateway.handle(&user("user_123"), "what are my points").await;

    let record = outcome.record().expect("expected an answer");
    assert_eq!(record.name, "Alice");
    assert_eq!(record.loyalty_points, 1500);
    assert_eq!(record.tier.to_string(), "Gold");
    assert_eq!(record.last_visit.to_string(), "2024-07-09");

    let queries = oracle.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].subject.to_string(), "user:user_123");
    assert_eq!(queries[0].relation, "owner");
    assert_eq!(queries[0].object, "profile:user_123");
}

#[tokio::test]
async fn test_other_users_points_are_refused() {
    let (gateway, store, oracle) = gateway(MockOracle::self_owned());

    let outcome = gateway
        .handle(&user("user_456"), "what are alice's points")
        .await;

    assert_eq!(
        outcome,
        Outcome::Refusal(Refusal {
            target_id: "user_123".to_string()
        })
    );
    assert_eq!(outcome.class(), OutcomeClass::Refusal);
    assert_eq!(
        Refusal {
            target_id: "user_123".to_string()
        }
        .to_string(),
        "not authorized for user_123"
    );
    assert_eq!(oracle.queries()[0].object, "profile:user_123");
    // Denied requests never read the store
    assert_eq!(store.gets(), 0);
}

#[tokio::test]
async fn test_unconfigured_oracle_fails_for_every_requester() {
    let store = Arc::new(CountingStore::seeded());
    let gateway =
        AuthorizationGateway::new(Arc::clone(&store), Arc::new(UnavailableOracle::default()));

    for requester in ["user_123", "user_456", "user_789", "user_000"] {
        for query in ["my points", "alice balance", "show bob's points", "cathy profile"] {
            let outcome = gateway.handle(&user(requester), query).await;
            assert_eq!(
                outcome,
                Outcome::Failure(GatewayFailure::AuthorizationUnavailable)
            );
            assert_eq!(
                GatewayFailure::AuthorizationUnavailable.to_string(),
                "authorization unavailable"
            );
        }
    }
    assert_eq!(store.gets(), 0);
}

#[tokio::test]
async fn test_no_intent_skips_oracle_and_store() {
    let (gateway, store, oracle) = gateway(MockOracle::self_owned());

    let outcome = gateway.handle(&user("user_123"), "hello").await;

    assert_eq!(outcome, Outcome::Guidance(GUIDANCE_TEXT.to_string()));
    assert_eq!(outcome.reply(), GUIDANCE_TEXT);
    assert_eq!(oracle.calls(), 0);
    assert_eq!(store.gets(), 0);
}

// ============================================================
// Fail-closed behaviour
// ============================================================

#[tokio::test]
async fn test_backend_error_fails_closed() {
    let (gateway, store, _oracle) =
        gateway(MockOracle::failing(OracleError::backend("500 Internal Server Error")));

    let outcome = gateway.handle(&user("user_123"), "my points").await;

    assert_eq!(
        outcome,
        Outcome::Failure(GatewayFailure::AuthorizationUnavailable)
    );
    assert_eq!(store.gets(), 0);
}

#[tokio::test]
async fn test_unreachable_oracle_fails_closed() {
    let (gateway, _store, _oracle) =
        gateway(MockOracle::failing(OracleError::unavailable("connection refused")));

    let outcome = gateway.handle(&user("user_123"), "my points").await;

    assert_eq!(outcome.class(), OutcomeClass::Unavailable);
    assert!(outcome.record().is_none());
}

#[tokio::test]
async fn test_slow_oracle_times_out_and_fails_closed() {
    let store = Arc::new(CountingStore::seeded());
    let oracle = Arc::new(MockOracle::slow(Duration::from_millis(500)));
    let gateway = AuthorizationGateway::new(Arc::clone(&store), Arc::clone(&oracle))
        .with_config(GatewayConfig::default().with_check_timeout(Duration::from_millis(20)));

    let outcome = gateway.handle(&user("user_123"), "my points").await;

    assert_eq!(
        outcome,
        Outcome::Failure(GatewayFailure::AuthorizationUnavailable)
    );
    assert_eq!(oracle.calls(), 1);
    assert_eq!(store.gets(), 0);
}

#[tokio::test]
async fn test_failures_are_not_retried() {
    let (gateway, _store, oracle) =
        gateway(MockOracle::failing(OracleError::unavailable("down")));

    gateway.handle(&user("user_123"), "my points").await;

    assert_eq!(oracle.calls(), 1);
}

#[tokio::test]
async fn test_denial_never_discloses_any_target() {
    // Nobody owns anything
    let (gateway, _store, _oracle) = gateway(MockOracle::new());

    for requester in ["user_123", "user_456", "user_789"] {
        for query in [
            "my points",
            "alice points",
            "bob balance",
            "cathy profile",
            "points of alice and bob",
        ] {
            let outcome = gateway.handle(&user(requester), query).await;
            assert_eq!(outcome.class(), OutcomeClass::Refusal, "{requester}: {query}");
            assert!(outcome.record().is_none());
        }
    }
}

// ============================================================
// Record lookup
// ============================================================

#[tokio::test]
async fn test_authorized_missing_record_is_not_found() {
    let oracle = MockOracle::new();
    oracle.grant("user_000", "user_000");
    let (gateway, store, _oracle) = gateway(oracle);

    let outcome = gateway.handle(&user("user_000"), "my balance").await;

    assert_eq!(outcome, Outcome::Failure(GatewayFailure::RecordNotFound));
    assert_eq!(outcome.class(), OutcomeClass::NotFound);
    assert_eq!(outcome.reply(), "Profile not found.");
    assert_eq!(store.gets(), 1);
}

#[tokio::test]
async fn test_store_error_never_discloses() {
    let store = Arc::new(CountingStore::failing());
    let gateway = AuthorizationGateway::new(store, Arc::new(MockOracle::self_owned()));

    let outcome = gateway.handle(&user("user_123"), "my points").await;

    assert_eq!(outcome, Outcome::Failure(GatewayFailure::RecordUnavailable));
    assert_eq!(outcome.class(), OutcomeClass::Unavailable);
}

#[tokio::test]
async fn test_granted_access_to_other_profile() {
    let oracle = MockOracle::self_owned();
    oracle.grant("user_456", "user_789");
    let (gateway, _store, _oracle) = gateway(oracle);

    let outcome = gateway.handle(&user("user_456"), "cathy's points?").await;

    assert_eq!(outcome.record().map(|r| r.name.as_str()), Some("Cathy"));
}

// ============================================================
// Decisions are never reused
// ============================================================

#[tokio::test]
async fn test_every_request_asks_the_oracle() {
    let oracle = MockOracle::self_owned();
    oracle.grant("user_456", "user_123");
    let (gateway, _store, oracle) = gateway(oracle);
    let bob = user("user_456");

    let first = gateway.handle(&bob, "alice points").await;
    assert_eq!(first.class(), OutcomeClass::Answer);

    oracle.revoke("user_456", "user_123");
    let second = gateway.handle(&bob, "alice points").await;
    assert_eq!(second.class(), OutcomeClass::Refusal);

    assert_eq!(oracle.calls(), 2);
}

#[tokio::test]
async fn test_same_request_same_outcome_class() {
    let (gateway, _store, _oracle) = gateway(MockOracle::self_owned());

    for (requester, query) in [
        ("user_123", "what are my points"),
        ("user_456", "what are alice's points"),
        ("user_789", "hello"),
    ] {
        let first = gateway.handle(&user(requester), query).await;
        let second = gateway.handle(&user(requester), query).await;
        assert_eq!(first.class(), second.class());
        assert_eq!(first, second);
    }
}

#[tokio::test]
async fn test_concurrent_requests_are_independent() {
    let (gateway, _store, oracle) = gateway(MockOracle::self_owned());
    let gateway = Arc::new(gateway);

    let mut handles = Vec::new();
    for requester in ["user_123", "user_456", "user_789"] {
        for _ in 0..10 {
            let gateway = Arc::clone(&gateway);
            handles.push(tokio::spawn(async move {
                let outcome = gateway.handle(&user(requester), "my points").await;
                (requester, outcome)
            }));
        }
    }

    for handle in handles {
        let (requester, outcome) = handle.await.unwrap();
        let record = outcome.record().expect("own profile should be answered");
        assert_eq!(record.id, requester);
    }
    assert_eq!(oracle.calls(), 30);
}

// ============================================================
// Direct profile checks and custom resolvers
// ============================================================

#[tokio::test]
async fn test_check_profile_skips_resolution() {
    let (gateway, _store, oracle) = gateway(MockOracle::self_owned());

    let allowed = gateway.check_profile(&user("user_789"), "user_789").await;
    assert_eq!(allowed.record().map(|r| r.name.as_str()), Some("Cathy"));

    let denied = gateway.check_profile(&user("user_789"), "user_123").await;
    assert_eq!(denied.class(), OutcomeClass::Refusal);

    assert_eq!(oracle.calls(), 2);
}

#[tokio::test]
async fn test_custom_resolver() {
    let oracle = MockOracle::new();
    oracle.grant("user_1", "user_123");
    let resolver = EntityResolver::new(
        ResolverConfig::empty()
            .with_intent_term("comps")
            .with_entry("ally", "user_123"),
    );
    let (gateway, _store, _oracle) = gateway(oracle);
    let gateway = gateway.with_resolver(resolver);

    assert_eq!(
        gateway.handle(&user("user_1"), "ally comps").await.class(),
        OutcomeClass::Answer
    );
    assert_eq!(
        gateway.handle(&user("user_1"), "alice points").await.class(),
        OutcomeClass::Guidance
    );
}

// ============================================================
// Reply rendering
// ============================================================

#[tokio::test]
async fn test_reply_texts() {
    let (gateway, _store, _oracle) = gateway(MockOracle::self_owned());

    let answer = gateway.handle(&user("user_123"), "my points").await;
    assert_eq!(
        answer.reply(),
        "Here is the profile for Alice:\nLoyalty Points: 1500\nTier: Gold\nLast Visit: 2024-07-09"
    );

    let refusal = gateway.handle(&user("user_123"), "bob's points").await;
    assert_eq!(
        refusal.reply(),
        "You are not authorized to view the profile for user user_456."
    );

    assert_eq!(
        Outcome::Failure(GatewayFailure::AuthorizationUnavailable).reply(),
        "Authorization is unavailable right now. Please try again later."
    );
}
