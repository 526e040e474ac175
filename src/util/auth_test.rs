use super::*;
use crate::net::types::User;

#[test]
fn should_redirect_unauth_when_not_loading_and_user_missing() {
    let state = AuthState { user: None, loading: false };
    assert!(should_redirect_unauth(&state));
}

#[test]
fn should_not_redirect_while_loading() {
    let state = AuthState { user: None, loading: true };
    assert!(!should_redirect_unauth(&state));
}

#[test]
fn should_not_redirect_when_user_exists() {
    let state = AuthState {
        user: Some(User {
            id: "u1".to_owned(),
            name: "Alice".to_owned(),
            email: "alice@example.com".to_owned(),
            picture: None,
        }),
        loading: false,
    };
    assert!(!should_redirect_unauth(&state));
}

#[test]
fn callback_path_is_auth_screen() {
    assert!(is_auth_screen("/callback", "/callback"));
}

#[test]
fn login_and_auth_routes_are_auth_screens() {
    assert!(is_auth_screen("/login", "/callback"));
    assert!(is_auth_screen("/auth", "/callback"));
    assert!(is_auth_screen("/auth/google", "/callback"));
}

#[test]
fn protected_routes_are_not_auth_screens() {
    assert!(!is_auth_screen("/dashboard", "/callback"));
    assert!(!is_auth_screen("/authors", "/callback"));
    assert!(!is_auth_screen("/", "/callback"));
}
