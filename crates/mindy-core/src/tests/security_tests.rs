use std::sync::Arc;

use crate::application::Application;
use crate::kernel::constants::TOKEN_STORAGE_ID;
use crate::security::{Principal, Token, TokenStorage, UserInterface};
use crate::tests::common::TestKernel;

#[derive(Debug)]
struct Member {
    name: String,
}

impl UserInterface for Member {
    fn username(&self) -> &str {
        &self.name
    }

    fn roles(&self) -> Vec<String> {
        vec!["ROLE_USER".to_string()]
    }
}

/// Application whose container holds `storage` under the token storage id.
fn app_with_storage(storage: Arc<TokenStorage>) -> Application {
    let mut kernel = TestKernel::build("test", "test", false);
    kernel.container_mut().register_instance(TOKEN_STORAGE_ID, storage);
    Application::with_kernel(Arc::new(kernel), false)
}

#[test]
fn test_get_user_without_token_storage() {
    let app = Application::new::<TestKernel>("test", false).unwrap();
    assert!(app.get_user().is_none());
}

#[test]
fn test_get_user_without_token() {
    let app = app_with_storage(Arc::new(TokenStorage::new()));
    assert!(app.get_user().is_none());
}

#[test]
fn test_get_user_with_anonymous_token() {
    let storage = Arc::new(TokenStorage::new());
    storage.set_token(Some(Token::anonymous("visitor")));
    let app = app_with_storage(storage);
    assert!(app.get_user().is_none());
}

#[test]
fn test_get_user_with_authenticated_user() {
    let storage = Arc::new(TokenStorage::new());
    storage.set_token(Some(Token::for_user(Arc::new(Member { name: "max".into() }))));
    let app = app_with_storage(storage.clone());

    let user = app.get_user().expect("user should be returned");
    assert_eq!(user.username(), "max");
    assert_eq!(user.roles(), vec!["ROLE_USER".to_string()]);

    storage.set_token(None);
    assert!(app.get_user().is_none(), "logging out clears the user");
}

#[test]
fn test_get_user_with_wrong_storage_type() {
    let mut kernel = TestKernel::build("test", "test", false);
    kernel
        .container_mut()
        .register_instance(TOKEN_STORAGE_ID, Arc::new("not a storage".to_string()));
    let app = Application::with_kernel(Arc::new(kernel), false);
    assert!(app.get_user().is_none());
}

#[test]
fn test_token_principal() {
    let token = Token::anonymous("key");
    assert!(matches!(token.principal(), Principal::Anonymous(k) if k == "key"));
    assert!(token.user().is_none());
}
