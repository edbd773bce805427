use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use fs2::FileExt;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{PersistenceError, Repository};

/// One JSON document on disk.
///
/// Saves are atomic: the value is written to a `.tmp` sibling, synced, then
/// renamed over the target. Writers serialize on an exclusive lock held on
/// a `.lock` sibling, so concurrent saves from several stores never
/// interleave.
pub struct JsonFile<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFile<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T: Serialize + DeserializeOwned> JsonFile<T> {
    /// Load the document. A missing file is `Ok(None)`.
    pub fn load(&self) -> Result<Option<T>, PersistenceError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.read_error(e)),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| PersistenceError::Decode {
                path: self.path.clone(),
                message: e.to_string(),
            })
    }

    pub fn save(&self, value: &T) -> Result<(), PersistenceError> {
        self.save_if(value, || true).map(|_| ())
    }

    /// Save unless `should_write`, checked while the file lock is held,
    /// returns false. Returns whether the file was written.
    pub fn save_if(
        &self,
        value: &T,
        should_write: impl FnOnce() -> bool,
    ) -> Result<bool, PersistenceError> {
        let json = serde_json::to_string_pretty(value).map_err(|e| PersistenceError::Encode {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }

        let lock = self.lock_file().map_err(|e| self.write_error(e))?;
        lock.lock_exclusive().map_err(|e| self.write_error(e))?;
        let _unlock = scopeguard::guard(lock, |lock| {
            let _ = FileExt::unlock(&lock);
        });

        if !should_write() {
            return Ok(false);
        }
        self.write_atomic(json.as_bytes())
            .map_err(|e| self.write_error(e))?;
        Ok(true)
    }

    fn write_atomic(&self, bytes: &[u8]) -> io::Result<()> {
        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_data()?;
        drop(file);
        fs::rename(&tmp_path, &self.path)
    }

    fn lock_file(&self) -> io::Result<File> {
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.path.with_extension("json.lock"))
    }

    fn read_error(&self, e: io::Error) -> PersistenceError {
        PersistenceError::Read {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }

    fn write_error(&self, e: io::Error) -> PersistenceError {
        PersistenceError::Write {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }
}

/// [`Repository`] over a [`JsonFile`], running file I/O on Tokio's
/// blocking pool.
///
/// Saves are ordered by when `save` was called, not by when their blocking
/// write gets to run. A write that finds a newer one already on disk is
/// skipped, so an aborted save still running on the pool can never
/// overwrite a later snapshot.
pub struct JsonRepository<T> {
    file: Arc<JsonFile<T>>,
    issued: AtomicU64,
    written: Arc<Mutex<u64>>,
}

impl<T> JsonRepository<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Arc::new(JsonFile::new(path)),
            issued: AtomicU64::new(0),
            written: Arc::new(Mutex::new(0)),
        }
    }
}

impl<T> Repository<T> for JsonRepository<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    type Error = PersistenceError;

    fn load(&self) -> BoxFuture<'static, Result<Option<T>, PersistenceError>> {
        let file = Arc::clone(&self.file);
        async move {
            let path = file.path().to_path_buf();
            tokio::task::spawn_blocking(move || file.load())
                .await
                .unwrap_or_else(|e| {
                    Err(PersistenceError::Read {
                        path,
                        message: e.to_string(),
                    })
                })
        }
        .boxed()
    }

    fn save(&self, value: T) -> BoxFuture<'static, Result<(), PersistenceError>> {
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let file = Arc::clone(&self.file);
        let written = Arc::clone(&self.written);
        async move {
            let path = file.path().to_path_buf();
            let write = move || {
                file.save_if(&value, || {
                    let mut last = written.lock();
                    if *last > generation {
                        return false;
                    }
                    *last = generation;
                    true
                })
            };
            match tokio::task::spawn_blocking(write).await {
                Ok(Ok(true)) => Ok(()),
                Ok(Ok(false)) => {
                    tracing::debug!(path = %path.display(), generation, "Skipped stale save");
                    Ok(())
                }
                Ok(Err(e)) => Err(e),
                Err(e) => Err(PersistenceError::Write {
                    path,
                    message: e.to_string(),
                }),
            }
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DistanceUnit, Settings};
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let file: JsonFile<Settings> = JsonFile::new(dir.path().join("settings.json"));
        assert_eq!(file.load(), Ok(None));
    }

    #[test]
    fn save_then_load_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let file = JsonFile::new(dir.path().join("nested").join("settings.json"));
        let settings = Settings {
            distance_unit: DistanceUnit::Miles,
            service_interval_km: 900,
        };

        file.save(&settings).unwrap();

        assert_eq!(file.load(), Ok(Some(settings)));
        assert!(!file.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        let file: JsonFile<Settings> = JsonFile::new(&path);

        match file.load() {
            Err(PersistenceError::Decode { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn older_save_finishing_last_does_not_overwrite_newer() {
        let dir = TempDir::new().unwrap();
        let repository = JsonRepository::new(dir.path().join("settings.json"));
        let older = Settings {
            service_interval_km: 900,
            ..Settings::default()
        };
        let newer = Settings {
            service_interval_km: 700,
            ..Settings::default()
        };

        let first = repository.save(older);
        let second = repository.save(newer.clone());
        second.await.unwrap();
        first.await.unwrap();

        assert_eq!(repository.load().await, Ok(Some(newer)));
    }

    #[test]
    fn save_if_leaves_file_untouched_when_declined() {
        let dir = TempDir::new().unwrap();
        let file = JsonFile::new(dir.path().join("settings.json"));
        file.save(&Settings::default()).unwrap();

        let miles = Settings {
            distance_unit: DistanceUnit::Miles,
            ..Settings::default()
        };
        assert_eq!(file.save_if(&miles, || false), Ok(false));
        assert_eq!(file.load(), Ok(Some(Settings::default())));
    }

    #[tokio::test]
    async fn repository_runs_on_blocking_pool() {
        let dir = TempDir::new().unwrap();
        let repository = JsonRepository::new(dir.path().join("settings.json"));
        repository.save(Settings::default()).await.unwrap();
        assert_eq!(repository.load().await, Ok(Some(Settings::default())));
    }
}
