use std::convert::Infallible;

use futures::future::BoxFuture;
use futures::FutureExt;

use super::{PersistenceError, Repository};

/// Adapter that cannot fail.
///
/// Load failures are logged and read as "nothing stored"; save failures are
/// logged and dropped. Suits values where a default is always acceptable,
/// such as the onboarding flag.
pub struct Fallback<R> {
    inner: R,
}

impl<R> Fallback<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R, T> Repository<T> for Fallback<R>
where
    R: Repository<T, Error = PersistenceError>,
    T: Send + 'static,
{
    type Error = Infallible;

    fn load(&self) -> BoxFuture<'static, Result<Option<T>, Infallible>> {
        let load = self.inner.load();
        async move {
            match load.await {
                Ok(value) => Ok(value),
                Err(e) => {
                    tracing::warn!(error = %e, "Load failed, using default");
                    Ok(None)
                }
            }
        }
        .boxed()
    }

    fn save(&self, value: T) -> BoxFuture<'static, Result<(), Infallible>> {
        let save = self.inner.save(value);
        async move {
            if let Err(e) = save.await {
                tracing::warn!(error = %e, "Save failed");
            }
            Ok(())
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::InMemoryRepository;
    use futures::executor::block_on;
    use std::path::PathBuf;

    fn broken() -> PersistenceError {
        PersistenceError::Read {
            path: PathBuf::from("flag.json"),
            message: "permission denied".into(),
        }
    }

    #[test]
    fn load_error_reads_as_none() {
        let inner = InMemoryRepository::with_value(true).failing_loads(broken());
        let repository = Fallback::new(inner);
        assert_eq!(block_on(repository.load()), Ok(None));
    }

    #[test]
    fn save_error_is_swallowed() {
        let inner = InMemoryRepository::<bool>::new().failing_saves(broken());
        let repository = Fallback::new(inner.clone());
        assert_eq!(block_on(repository.save(true)), Ok(()));
        assert_eq!(inner.stored(), None);
    }
}
