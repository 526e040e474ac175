use super::*;
use crate::session::storage::{KeyValueStore, REDIRECT_TARGET_KEY};
use crate::session::test_support::{APP, MemoryNavigator, config, stores};

#[test]
fn build_auth_url_encodes_callback_client_and_session() {
    let url = build_auth_url(&config(), "abc-123");
    assert_eq!(
        url,
        "https://auth.example.com/?redirect_uri=https%3A%2F%2Fapp.example.com%2Fcallback&client_id=qa-console&authorization_session_id=abc-123"
    );
}

#[test]
fn redirect_from_protected_page_remembers_it_and_navigates() {
    let s = stores();
    let nav = MemoryNavigator::at(&format!("{APP}/dashboard"));

    let url = redirect_to_auth(&s.session, &nav, &config(), None).unwrap();

    assert!(url.starts_with("https://auth.example.com/?redirect_uri=https%3A%2F%2Fapp.example.com%2Fcallback&"));
    assert_eq!(*nav.assigned.borrow(), vec![url.clone()]);
    assert_eq!(s.tab.get(REDIRECT_TARGET_KEY).as_deref(), Some("/dashboard"));
    let id = s.session.correlation_id().unwrap();
    assert!(url.ends_with(&format!("authorization_session_id={id}")));
}

#[test]
fn redirect_keeps_query_of_current_location() {
    let s = stores();
    let nav = MemoryNavigator::at(&format!("{APP}/suites/9?tab=runs"));
    redirect_to_auth(&s.session, &nav, &config(), None);
    assert_eq!(s.session.take_redirect_target().as_deref(), Some("/suites/9?tab=runs"));
}

#[test]
fn redirect_uses_explicit_path_over_location() {
    let s = stores();
    let nav = MemoryNavigator::at(&format!("{APP}/dashboard"));
    redirect_to_auth(&s.session, &nav, &config(), Some("/scheduler"));
    assert_eq!(s.session.take_redirect_target().as_deref(), Some("/scheduler"));
}

#[test]
fn redirect_from_callback_does_not_remember_callback() {
    let s = stores();
    s.session.remember_redirect_target("/usage");
    let nav = MemoryNavigator::at(&format!("{APP}/callback?code=xyz"));

    redirect_to_auth(&s.session, &nav, &config(), None);

    assert_eq!(s.session.take_redirect_target().as_deref(), Some("/usage"));
    assert_eq!(nav.assigned.borrow().len(), 1);
}

#[test]
fn repeated_redirects_reuse_correlation_id() {
    let s = stores();
    let nav = MemoryNavigator::at(&format!("{APP}/dashboard"));

    let first = redirect_to_auth(&s.session, &nav, &config(), None).unwrap();
    let second = redirect_to_auth(&s.session, &nav, &config(), None).unwrap();

    assert_eq!(first, second);
    assert_eq!(nav.assigned.borrow().len(), 2);
}

#[test]
fn redirect_leaves_correlation_id_pending() {
    let s = stores();
    let nav = MemoryNavigator::at(&format!("{APP}/dashboard"));
    redirect_to_auth(&s.session, &nav, &config(), None);
    assert!(s.session.correlation_id().is_some());
}

#[test]
fn redirect_outside_browser_is_noop() {
    let s = stores();
    let nav = MemoryNavigator::detached();

    assert_eq!(redirect_to_auth(&s.session, &nav, &config(), None), None);
    assert!(nav.assigned.borrow().is_empty());
    assert!(s.tab.is_empty());
}
