use super::*;
use crate::api::User;
use crate::nav::MemoryHistory;

fn guard() -> ClientGuard {
    ClientGuard::new(RouteTable::default(), "https://dashboard.charity.org")
}

fn signed_in(role: Role) -> AuthState {
    AuthState::authenticated(User {
        id: "u7".into(),
        name: "Layla".into(),
        email: "layla@charity.org".into(),
        role,
    })
}

const ADMIN_ONLY: &[Role] = &[Role::Admin];

// =============================================================================
// Loading / unauthenticated
// =============================================================================

#[test]
fn loading_never_redirects() {
    let guard = guard();
    let history = MemoryHistory::new();
    for _ in 0..3 {
        let decision = guard.enforce(&AuthState::default(), "/projects", &[], None, &history);
        assert_eq!(decision, GuardDecision::Loading);
    }
    assert!(history.visits().is_empty());
}

#[test]
fn repeated_unauthenticated_checks_navigate_once() {
    let guard = guard();
    let history = MemoryHistory::new();
    let state = AuthState::unauthenticated();

    let decisions: Vec<_> = (0..5)
        .map(|_| guard.enforce(&state, "/projects", &[], None, &history))
        .collect();

    assert_eq!(decisions[0], GuardDecision::Navigate("/login".into()));
    assert!(decisions[1..].iter().all(|d| *d == GuardDecision::Hold));
    assert_eq!(history.visits(), vec!["/login".to_owned()]);
}

#[test]
fn latch_resets_after_reauthentication() {
    let guard = guard();
    let history = MemoryHistory::new();
    let out = AuthState::unauthenticated();

    guard.enforce(&out, "/projects", &[], None, &history);
    assert_eq!(guard.enforce(&signed_in(Role::Admin), "/projects", &[], None, &history), GuardDecision::Render);
    guard.enforce(&out, "/projects", &[], None, &history);
    guard.enforce(&out, "/projects", &[], None, &history);

    assert_eq!(history.visits(), vec!["/login".to_owned(), "/login".to_owned()]);
}

// =============================================================================
// Roles
// =============================================================================

#[test]
fn allowed_role_renders() {
    let guard = guard();
    assert_eq!(guard.check(&signed_in(Role::Admin), "/settings", ADMIN_ONLY, None), GuardDecision::Render);
    assert_eq!(guard.check(&signed_in(Role::Subadmin), "/projects", &[], None), GuardDecision::Render);
}

#[test]
fn role_mismatch_keeps_session_and_returns_to_referrer() {
    let guard = guard();
    let state = signed_in(Role::Subadmin);
    let before = state.clone();

    let decision = guard.check(
        &state,
        "/settings",
        ADMIN_ONLY,
        Some("https://dashboard.charity.org/projects/4?tab=media"),
    );

    assert_eq!(decision, GuardDecision::Navigate("/projects/4?tab=media".into()));
    assert!(state.is_authenticated);
    assert_eq!(state, before);
}

#[test]
fn role_mismatch_with_foreign_referrer_goes_to_landing() {
    let guard = guard();
    let decision = guard.check(&signed_in(Role::Subadmin), "/settings", ADMIN_ONLY, Some("https://evil.example/phish"));
    assert_eq!(decision, GuardDecision::Navigate("/".into()));
}

#[test]
fn role_mismatch_without_usable_referrer_goes_to_landing() {
    let guard = guard();
    let state = signed_in(Role::Unknown);
    assert_eq!(guard.check(&state, "/settings", ADMIN_ONLY, None), GuardDecision::Navigate("/".into()));
    assert_eq!(
        guard.check(&state, "/settings", ADMIN_ONLY, Some("/settings/")),
        GuardDecision::Navigate("/".into()),
        "referrer equal to the current view would loop"
    );
}

#[test]
fn relative_referrer_is_same_origin() {
    let guard = guard();
    let decision = guard.check(&signed_in(Role::Subadmin), "/settings", ADMIN_ONLY, Some("/messages"));
    assert_eq!(decision, GuardDecision::Navigate("/messages".into()));
}

#[test]
fn role_mismatch_navigates_through_navigator() {
    let guard = guard();
    let history = MemoryHistory::new();
    guard.enforce(&signed_in(Role::Subadmin), "/settings", ADMIN_ONLY, None, &history);
    assert_eq!(history.current().as_deref(), Some("/"));
}

#[test]
fn role_mismatch_on_landing_page_holds_instead_of_looping() {
    let guard = guard();
    let history = MemoryHistory::new();
    let state = signed_in(Role::Subadmin);

    for _ in 0..3 {
        assert_eq!(guard.enforce(&state, "/", ADMIN_ONLY, None, &history), GuardDecision::Hold);
    }
    assert_eq!(guard.check(&state, "/?tab=1", ADMIN_ONLY, Some("/")), GuardDecision::Hold);
    assert!(history.visits().is_empty());
    assert!(state.is_authenticated);
}
