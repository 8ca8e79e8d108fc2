//! Authentication state as seen by the bootstrap.
//!
//! Kernels that support authentication register a [`TokenStorage`] under
//! [`TOKEN_STORAGE_ID`](crate::kernel::constants::TOKEN_STORAGE_ID);
//! `Application::get_user` reads the current principal from it.
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// An authenticated user.
pub trait UserInterface: Send + Sync + fmt::Debug {
    fn username(&self) -> &str;

    fn roles(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Who a token stands for.
#[derive(Debug, Clone)]
pub enum Principal {
    /// Unauthenticated visitor, identified only by a key.
    Anonymous(String),
    User(Arc<dyn UserInterface>),
}

/// Authentication token held by the [`TokenStorage`].
#[derive(Debug, Clone)]
pub struct Token {
    principal: Principal,
}

impl Token {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn for_user(user: Arc<dyn UserInterface>) -> Self {
        Self::new(Principal::User(user))
    }

    pub fn anonymous(key: impl Into<String>) -> Self {
        Self::new(Principal::Anonymous(key.into()))
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// The authenticated user, `None` for anonymous tokens.
    pub fn user(&self) -> Option<Arc<dyn UserInterface>> {
        match &self.principal {
            Principal::User(user) => Some(user.clone()),
            Principal::Anonymous(_) => None,
        }
    }
}

/// Holds the token of the current request, if any.
#[derive(Debug, Default)]
pub struct TokenStorage {
    token: RwLock<Option<Token>>,
}

impl TokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_token(&self) -> Option<Token> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_token(&self, token: Option<Token>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }
}
