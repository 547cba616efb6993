use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::test_helpers::{MockBackend, fixture, profile, rejected};

// =============================================================
// Seeding and set_credential
// =============================================================

#[test]
fn new_session_seeds_from_store() {
    let fx = fixture(Some("tok-123"), MockBackend::default());
    assert!(fx.session.is_authenticated());
    assert_eq!(fx.session.credential().as_deref(), Some("tok-123"));
    assert!(!fx.session.is_bootstrapped());
    assert!(fx.session.profile().is_none());
}

#[test]
fn new_session_without_persisted_credential() {
    let fx = fixture(None, MockBackend::default());
    assert!(!fx.session.is_authenticated());
}

#[test]
fn authenticated_tracks_credential_after_every_set() {
    let fx = fixture(None, MockBackend::default());
    for next in [Some("a"), None, Some("b"), Some("c"), None, None] {
        fx.session.set_credential(next.map(str::to_owned));
        assert_eq!(fx.session.is_authenticated(), next.is_some());
        assert_eq!(fx.session.snapshot().authenticated, next.is_some());
        assert_eq!(fx.store.read().as_deref(), next);
    }
}

#[test]
fn clearing_credential_clears_profile() {
    let fx = fixture(Some("tok-123"), MockBackend::default());
    fx.session.update(|data| data.profile = Some(profile("u1", "a@x.com", false)));
    fx.session.set_credential(None);
    assert!(fx.session.profile().is_none());
}

// =============================================================
// fetch_profile
// =============================================================

#[tokio::test]
async fn fetch_profile_without_credential_skips_network() {
    let fx = fixture(None, MockBackend::default());
    assert_eq!(fx.session.fetch_profile().await.unwrap(), None);
    assert_eq!(fx.backend.profile_calls(), 0);
}

#[tokio::test]
async fn fetch_profile_stores_profile() {
    let backend = MockBackend::default().with_profile("tok-123", Ok(profile("u1", "a@x.com", false)));
    let fx = fixture(Some("tok-123"), backend);
    let fetched = fx.session.fetch_profile().await.unwrap().unwrap();
    assert_eq!(fetched.id, "u1");
    assert_eq!(fx.session.profile().unwrap().email, "a@x.com");
}

#[tokio::test]
async fn fetch_profile_failure_keeps_credential() {
    let fx = fixture(Some("tok-expired"), MockBackend::default());
    let err = fx.session.fetch_profile().await.unwrap_err();
    assert!(err.is_credential_rejected());
    assert!(fx.session.is_authenticated());
    assert_eq!(fx.store.read().as_deref(), Some("tok-expired"));
}

#[tokio::test]
async fn fetch_profile_ignored_after_concurrent_logout() {
    let backend = MockBackend::slow(3).with_profile("tok-123", Ok(profile("u1", "a@x.com", false)));
    let fx = fixture(Some("tok-123"), backend);
    let logout = async {
        tokio::task::yield_now().await;
        fx.session.logout();
    };
    let (fetched, ()) = tokio::join!(fx.session.fetch_profile(), logout);
    assert!(fetched.unwrap().is_some());
    assert!(!fx.session.is_authenticated());
    assert!(fx.session.profile().is_none());
}

// =============================================================
// login
// =============================================================

#[tokio::test]
async fn login_success_sets_credential_and_profile() {
    let backend = MockBackend::default()
        .with_exchange(Ok("tok-new".to_owned()))
        .with_profile("tok-new", Ok(profile("u1", "a@x.com", false)));
    let fx = fixture(None, backend);

    assert!(fx.session.login("a@x.com", "secret").await);

    let state = fx.session.snapshot();
    assert!(state.authenticated);
    assert_eq!(state.user.unwrap().id, "u1");
    assert!(!state.loading);
    assert_eq!(state.last_error, None);
    assert_eq!(fx.store.read().as_deref(), Some("tok-new"));
}

#[tokio::test]
async fn login_rejected_reports_detail() {
    let backend = MockBackend::default().with_exchange(Err(rejected("Invalid credentials")));
    let fx = fixture(None, backend);

    assert!(!fx.session.login("a@x.com", "bad").await);
    assert_eq!(fx.session.last_error().as_deref(), Some("Invalid credentials"));
}

#[tokio::test]
async fn login_failure_rolls_back_prior_session() {
    let backend = MockBackend::default()
        .with_exchange(Err(rejected("Invalid credentials")))
        .with_profile("tok-old", Ok(profile("u1", "a@x.com", false)));
    let fx = fixture(Some("tok-old"), backend);
    fx.session.fetch_profile().await.unwrap();

    assert!(!fx.session.login("a@x.com", "bad").await);

    let state = fx.session.snapshot();
    assert!(!state.authenticated);
    assert!(state.user.is_none());
    assert!(state.last_error.is_some());
    assert!(!state.loading);
    assert_eq!(fx.store.read(), None);
}

#[tokio::test]
async fn login_profile_failure_leaves_no_partial_session() {
    let backend = MockBackend::default()
        .with_exchange(Ok("tok-new".to_owned()))
        .with_profile("tok-new", Err(ApiError::Transport("connection reset".to_owned())));
    let fx = fixture(None, backend);

    assert!(!fx.session.login("a@x.com", "secret").await);
    assert!(!fx.session.is_authenticated());
    assert_eq!(fx.session.last_error().as_deref(), Some("network error: connection reset"));
    assert_eq!(fx.store.read(), None);
}

#[tokio::test]
async fn login_clears_previous_error() {
    let backend = MockBackend::default().with_exchange(Err(rejected("Invalid credentials")));
    let fx = fixture(None, backend);
    assert!(!fx.session.login("a@x.com", "bad").await);

    *fx.backend.exchange_result.lock().unwrap() = Some(Ok("tok-new".to_owned()));
    fx.backend
        .profiles
        .lock()
        .unwrap()
        .insert("tok-new".to_owned(), Ok(profile("u1", "a@x.com", false)));
    assert!(fx.session.login("a@x.com", "good").await);
    assert_eq!(fx.session.last_error(), None);
}

#[tokio::test]
async fn login_refused_while_loading() {
    let backend = MockBackend::slow(3)
        .with_exchange(Ok("tok-new".to_owned()))
        .with_profile("tok-new", Ok(profile("u1", "a@x.com", false)));
    let fx = fixture(None, backend);

    let (first, second) = tokio::join!(fx.session.login("a@x.com", "pw"), fx.session.login("a@x.com", "pw"));
    assert!(first);
    assert!(!second);
    assert_eq!(fx.backend.exchange_calls(), 1);
    assert!(!fx.session.is_loading());
}

#[tokio::test]
async fn logout_during_login_profile_fetch_fails_login() {
    let backend = MockBackend::slow(3)
        .with_exchange(Ok("tok-new".to_owned()))
        .with_profile("tok-new", Ok(profile("u1", "a@x.com", false)));
    let fx = fixture(None, backend);
    let stale_rejection = async {
        while fx.backend.profile_calls() == 0 {
            tokio::task::yield_now().await;
        }
        fx.session.force_logout();
    };

    let (ok, ()) = tokio::join!(fx.session.login("a@x.com", "pw"), stale_rejection);

    assert!(!ok);
    assert!(!fx.session.is_authenticated());
    assert!(fx.session.profile().is_none());
    assert_eq!(fx.session.last_error().as_deref(), Some("credential rejected"));
    assert!(!fx.session.is_loading());
}

#[tokio::test]
async fn loading_visible_during_login() {
    let backend = MockBackend::slow(3).with_exchange(Err(rejected("Invalid credentials")));
    let fx = fixture(None, backend);
    let observe = async {
        tokio::task::yield_now().await;
        fx.session.is_loading()
    };
    let (ok, seen_loading) = tokio::join!(fx.session.login("a@x.com", "bad"), observe);
    assert!(!ok);
    assert!(seen_loading);
    assert!(!fx.session.is_loading());
}

// =============================================================
// register
// =============================================================

#[tokio::test]
async fn register_success_does_not_sign_in() {
    let fx = fixture(None, MockBackend::default());
    assert!(fx.session.register("a@x.com", "secret1", Some("  Alice ")).await);
    assert!(!fx.session.is_authenticated());
    let sent = fx.backend.registrations.lock().unwrap()[0].clone();
    assert_eq!(sent.full_name.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn register_sends_null_for_blank_name() {
    let fx = fixture(None, MockBackend::default());
    assert!(fx.session.register("a@x.com", "secret1", Some("")).await);
    assert_eq!(fx.backend.registrations.lock().unwrap()[0].full_name, None);
}

#[tokio::test]
async fn register_failure_keeps_existing_session() {
    let backend = MockBackend::default().with_register(Err(ApiError::Status {
        status: 400,
        body: Some(crate::net::types::ApiErrorBody {
            detail: Some("Email already registered".to_owned()),
            message: None,
        }),
    }));
    let fx = fixture(Some("tok-123"), backend);

    assert!(!fx.session.register("a@x.com", "secret1", None).await);
    assert_eq!(fx.session.last_error().as_deref(), Some("Email already registered"));
    assert!(fx.session.is_authenticated());
    assert!(!fx.session.is_loading());
}

// =============================================================
// logout
// =============================================================

#[test]
fn logout_is_idempotent() {
    let fx = fixture(Some("tok-123"), MockBackend::default());
    fx.session.logout();
    fx.session.logout();
    assert!(!fx.session.is_authenticated());
    assert_eq!(fx.store.read(), None);
}

// =============================================================
// bootstrap
// =============================================================

#[tokio::test]
async fn bootstrap_restores_persisted_session() {
    let backend = MockBackend::default().with_profile("tok-123", Ok(profile("u1", "a@x.com", false)));
    let fx = fixture(Some("tok-123"), backend);

    fx.session.bootstrap().await;

    assert!(fx.session.is_bootstrapped());
    assert!(fx.session.is_authenticated());
    assert_eq!(fx.session.profile().unwrap().id, "u1");
}

#[tokio::test]
async fn bootstrap_without_credential_only_latches() {
    let fx = fixture(None, MockBackend::default());
    fx.session.bootstrap().await;
    assert!(fx.session.is_bootstrapped());
    assert_eq!(fx.backend.profile_calls(), 0);
}

#[tokio::test]
async fn bootstrap_with_expired_credential_logs_out() {
    let fx = fixture(Some("tok-expired"), MockBackend::default());

    fx.session.bootstrap().await;

    assert!(fx.session.is_bootstrapped());
    assert!(!fx.session.is_authenticated());
    assert_eq!(fx.store.read(), None);
}

#[tokio::test]
async fn bootstrap_transport_failure_also_logs_out() {
    let backend = MockBackend::default().with_profile("tok-123", Err(ApiError::Timeout(std::time::Duration::from_secs(20))));
    let fx = fixture(Some("tok-123"), backend);
    fx.session.bootstrap().await;
    assert!(!fx.session.is_authenticated());
}

#[tokio::test]
async fn concurrent_bootstrap_issues_one_lookup() {
    let backend = MockBackend::slow(5).with_profile("tok-123", Ok(profile("u1", "a@x.com", false)));
    let fx = fixture(Some("tok-123"), backend);

    tokio::join!(fx.session.bootstrap(), fx.session.bootstrap());

    assert_eq!(fx.backend.profile_calls(), 1);
    assert!(fx.session.is_bootstrapped());
    assert!(fx.session.is_authenticated());
}

#[tokio::test]
async fn concurrent_bootstrap_failure_handled_once() {
    let fx = fixture(Some("tok-expired"), MockBackend::slow(5));
    let logouts = Arc::new(AtomicUsize::new(0));
    let seen = logouts.clone();
    let was_authenticated = Arc::new(Mutex::new(true));
    let last = was_authenticated.clone();
    fx.session.watch(move |state| {
        let mut prev = last.lock().unwrap();
        if *prev && !state.authenticated {
            seen.fetch_add(1, Ordering::SeqCst);
        }
        *prev = state.authenticated;
    });

    tokio::join!(fx.session.bootstrap(), fx.session.bootstrap(), fx.session.bootstrap());

    assert_eq!(fx.backend.profile_calls(), 1);
    assert_eq!(logouts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn bootstrap_runs_once_per_session() {
    let backend = MockBackend::default().with_profile("tok-123", Ok(profile("u1", "a@x.com", false)));
    let fx = fixture(Some("tok-123"), backend);
    fx.session.bootstrap().await;
    fx.session.bootstrap().await;
    assert_eq!(fx.backend.profile_calls(), 1);
}

#[tokio::test]
async fn bootstrap_latch_survives_logout() {
    let fx = fixture(None, MockBackend::default());
    fx.session.bootstrap().await;
    fx.session.logout();
    assert!(fx.session.is_bootstrapped());
}

// =============================================================
// watch
// =============================================================

#[tokio::test]
async fn watchers_see_bootstrap_completion() {
    let fx = fixture(None, MockBackend::default());
    let states = Arc::new(Mutex::new(Vec::new()));
    let sink = states.clone();
    fx.session.watch(move |state| sink.lock().unwrap().push(state.clone()));

    fx.session.bootstrap().await;

    let states = states.lock().unwrap();
    assert!(states.last().unwrap().bootstrapped);
}

#[test]
fn watchers_see_logout() {
    let fx = fixture(Some("tok-123"), MockBackend::default());
    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    fx.session.watch(move |state| *sink.lock().unwrap() = Some(state.authenticated));
    fx.session.logout();
    assert_eq!(*seen.lock().unwrap(), Some(false));
}
