use std::sync::Arc;

use futures::future::{self, BoxFuture};
use futures::FutureExt;
use parking_lot::Mutex;

use super::{PersistenceError, Repository};

/// Repository kept in memory, for tests and dry runs.
///
/// Clones share storage. Failures can be scripted per operation.
pub struct InMemoryRepository<T> {
    inner: Arc<Mutex<MemoryInner<T>>>,
}

struct MemoryInner<T> {
    value: Option<T>,
    saves: usize,
    load_error: Option<PersistenceError>,
    save_error: Option<PersistenceError>,
}

impl<T> Clone for InMemoryRepository<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryInner {
                value: None,
                saves: 0,
                load_error: None,
                save_error: None,
            })),
        }
    }
}

impl<T: Clone> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: T) -> Self {
        let repository = Self::default();
        repository.inner.lock().value = Some(value);
        repository
    }

    pub fn failing_loads(self, error: PersistenceError) -> Self {
        self.inner.lock().load_error = Some(error);
        self
    }

    pub fn failing_saves(self, error: PersistenceError) -> Self {
        self.inner.lock().save_error = Some(error);
        self
    }

    pub fn stored(&self) -> Option<T> {
        self.inner.lock().value.clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.inner.lock().saves
    }
}

impl<T> Repository<T> for InMemoryRepository<T>
where
    T: Clone + Send + 'static,
{
    type Error = PersistenceError;

    fn load(&self) -> BoxFuture<'static, Result<Option<T>, PersistenceError>> {
        let inner = self.inner.lock();
        let result = match &inner.load_error {
            Some(error) => Err(error.clone()),
            None => Ok(inner.value.clone()),
        };
        future::ready(result).boxed()
    }

    fn save(&self, value: T) -> BoxFuture<'static, Result<(), PersistenceError>> {
        let inner = Arc::clone(&self.inner);
        async move {
            let mut inner = inner.lock();
            if let Some(error) = &inner.save_error {
                return Err(error.clone());
            }
            inner.value = Some(value);
            inner.saves += 1;
            Ok(())
        }
        .boxed()
    }
}
