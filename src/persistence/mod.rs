//! Storage collaborators injected into feature environments.
//!
//! Features never touch the filesystem directly. They hold a
//! [`Repository`] and describe loads and saves as effects; the result comes
//! back as an action.

mod fallback;
mod json;
mod memory;

use std::path::PathBuf;

use futures::future::BoxFuture;
use thiserror::Error;

pub use fallback::Fallback;
pub use json::{JsonFile, JsonRepository};
pub use memory::InMemoryRepository;

/// Errors that can occur while loading or saving persisted values.
///
/// Carries messages rather than source errors so it can travel inside
/// `Clone + PartialEq` actions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Failed to read '{path}': {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to write '{path}': {message}")]
    Write { path: PathBuf, message: String },

    #[error("Failed to decode '{path}': {message}")]
    Decode { path: PathBuf, message: String },

    #[error("Failed to encode value for '{path}': {message}")]
    Encode { path: PathBuf, message: String },
}

/// Asynchronous load/save of one value.
///
/// `load` yields `Ok(None)` when nothing has been stored yet.
pub trait Repository<T>: Send + Sync + 'static {
    type Error: Send + 'static;

    fn load(&self) -> BoxFuture<'static, Result<Option<T>, Self::Error>>;

    fn save(&self, value: T) -> BoxFuture<'static, Result<(), Self::Error>>;
}
