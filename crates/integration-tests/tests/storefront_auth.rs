//! Integration tests for registration, login and session persistence.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use qkart_core::{CredentialError, Price};
use qkart_integration_tests::{FakeBackend, PASSWORD};
use qkart_storefront::session::{FileSessionStore, Session};
use qkart_storefront::{Action, StorefrontError, ValidationFailure};

#[tokio::test]
async fn test_register_then_login() {
    let backend = FakeBackend::start().await.unwrap();
    let (storefront, _) = backend.storefront().unwrap();

    storefront
        .auth()
        .register("new.shopper", "secret123", "secret123")
        .await
        .unwrap();
    assert!(!storefront.session().is_logged_in());

    storefront
        .auth()
        .login("new.shopper", "secret123")
        .await
        .unwrap();

    let session = storefront.session();
    assert!(session.is_logged_in());
    assert_eq!(session.username().as_deref(), Some("new.shopper"));
    assert_eq!(session.balance(), Price::from_units(5000));
}

#[tokio::test]
async fn test_wrong_password_shows_server_message() {
    let backend = FakeBackend::start().await.unwrap();
    backend.add_user("crio.do", 5000);
    let (storefront, _) = backend.storefront().unwrap();

    let err = storefront
        .auth()
        .login("crio.do", "not-the-password")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StorefrontError::Server {
            action: Action::Login,
            status: 400,
            ..
        }
    ));
    assert_eq!(err.notice().message, "Password is incorrect");
    assert!(!storefront.session().is_logged_in());
}

#[tokio::test]
async fn test_taken_username_shows_server_message() {
    let backend = FakeBackend::start().await.unwrap();
    backend.add_user("crio.do", 5000);
    let (storefront, _) = backend.storefront().unwrap();

    let err = storefront
        .auth()
        .register("crio.do", PASSWORD, PASSWORD)
        .await
        .unwrap_err();

    assert_eq!(err.notice().message, "Username is already taken");
}

#[tokio::test]
async fn test_invalid_registration_makes_no_request() {
    let backend = FakeBackend::start().await.unwrap();
    let (storefront, _) = backend.storefront().unwrap();

    let err = storefront
        .auth()
        .register("shopper", "secret123", "secret321")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StorefrontError::Validation(ValidationFailure::Credentials(
            CredentialError::PasswordMismatch
        ))
    ));
    assert_eq!(err.notice().message, "Passwords do not match");
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_logout_ends_session() {
    let backend = FakeBackend::start().await.unwrap();
    backend.add_user("crio.do", 5000);
    let (storefront, _) = backend.storefront().unwrap();
    storefront.auth().login("crio.do", PASSWORD).await.unwrap();

    storefront.auth().logout().unwrap();

    let session = storefront.session();
    assert!(!session.is_logged_in());
    assert_eq!(session.username(), None);
    assert_eq!(session.balance(), Price::ZERO);
}

#[tokio::test]
async fn test_session_survives_restart() {
    let backend = FakeBackend::start().await.unwrap();
    backend.add_user("crio.do", 5000);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let open = |path: std::path::PathBuf| {
        let session = Session::new(FileSessionStore::open(path).unwrap());
        backend
            .storefront_with(session, Duration::ZERO, Duration::from_millis(50))
            .unwrap()
            .0
    };

    let first = open(path.clone());
    first.auth().login("crio.do", PASSWORD).await.unwrap();
    drop(first);

    let second = open(path.clone());
    assert_eq!(second.session().username().as_deref(), Some("crio.do"));
    let catalog = second.fetch_catalog().await.unwrap();
    assert!(second.cart().load(&catalog).await.unwrap().is_empty());

    second.auth().logout().unwrap();
    assert!(!path.exists());
}
