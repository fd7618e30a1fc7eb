//! Generic JSON collection files.

use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{RwLock, RwLockWriteGuard};

use super::RepositoryError;

/// What a missing collection file means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingFile {
    /// Read as an empty collection.
    Empty,
    /// Report `RepositoryError::NotFound`.
    NotFound,
}

/// A collection of records stored as one JSON array in one file.
///
/// `save_all` rewrites the whole file: it writes a sibling temporary file
/// and renames it over the original, so readers never observe a partially
/// written collection. There is no locking here; see [`Collection`].
#[derive(Debug)]
pub struct RecordStore<T> {
    path: PathBuf,
    missing: MissingFile,
    _record: PhantomData<fn() -> T>,
}

impl<T> RecordStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create a store for the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, missing: MissingFile) -> Self {
        Self {
            path: path.into(),
            missing,
            _record: PhantomData,
        }
    }

    /// Deserialize the whole collection.
    ///
    /// An empty file and a file holding `null` both read as an empty
    /// collection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the file is absent and the
    /// store was created with `MissingFile::NotFound`,
    /// `RepositoryError::Io` if it cannot be read, and
    /// `RepositoryError::Decode` if its content is malformed.
    pub async fn load_all(&self) -> Result<Vec<T>, RepositoryError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return match self.missing {
                    MissingFile::Empty => Ok(Vec::new()),
                    MissingFile::NotFound => Err(RepositoryError::NotFound(format!(
                        "collection file {}",
                        self.path.display()
                    ))),
                };
            }
            Err(e) => return Err(RepositoryError::io(&self.path, e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let records: Option<Vec<T>> =
            serde_json::from_slice(&bytes).map_err(|source| RepositoryError::Decode {
                path: self.path.clone(),
                source,
            })?;

        Ok(records.unwrap_or_default())
    }

    /// Replace the whole collection with `records`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Encode` if the records cannot be serialized
    /// and `RepositoryError::Io` if the file cannot be written.
    pub async fn save_all(&self, records: &[T]) -> Result<(), RepositoryError> {
        let mut bytes = serde_json::to_vec_pretty(records).map_err(RepositoryError::Encode)?;
        bytes.push(b'\n');

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| RepositoryError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| RepositoryError::io(&self.path, e))?;

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// A [`RecordStore`] guarded by a reader/writer lock.
///
/// Reads share the lock; every write holds it exclusively from load to
/// save, so two concurrent read-modify-write sequences on the same
/// collection never interleave.
#[derive(Debug)]
pub struct Collection<T> {
    store: RecordStore<T>,
    lock: RwLock<()>,
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Wrap a store.
    #[must_use]
    pub fn new(store: RecordStore<T>) -> Self {
        Self {
            store,
            lock: RwLock::new(()),
        }
    }

    /// Load a consistent snapshot of the collection.
    ///
    /// # Errors
    ///
    /// Propagates `RecordStore::load_all` errors.
    pub async fn read(&self) -> Result<Vec<T>, RepositoryError> {
        let _guard = self.lock.read().await;
        self.store.load_all().await
    }

    /// Take the write lock.
    ///
    /// The returned guard gives access to the store until it is dropped.
    pub async fn write(&self) -> CollectionWriter<'_, T> {
        CollectionWriter {
            _guard: self.lock.write().await,
            store: &self.store,
        }
    }

    /// Load, mutate and save the collection under the write lock.
    ///
    /// Nothing is written if `mutate` returns an error.
    ///
    /// # Errors
    ///
    /// Propagates load, mutation and save errors.
    pub async fn update<R, F>(&self, mutate: F) -> Result<R, RepositoryError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, RepositoryError>,
    {
        let writer = self.write().await;
        let mut records = writer.load_all().await?;
        let result = mutate(&mut records)?;
        writer.save_all(&records).await?;
        Ok(result)
    }
}

/// Exclusive access to a collection's store.
pub struct CollectionWriter<'a, T> {
    _guard: RwLockWriteGuard<'a, ()>,
    store: &'a RecordStore<T>,
}

impl<T> CollectionWriter<'_, T>
where
    T: Serialize + DeserializeOwned,
{
    /// See [`RecordStore::load_all`].
    ///
    /// # Errors
    ///
    /// Propagates `RecordStore::load_all` errors.
    pub async fn load_all(&self) -> Result<Vec<T>, RepositoryError> {
        self.store.load_all().await
    }

    /// See [`RecordStore::save_all`].
    ///
    /// # Errors
    ///
    /// Propagates `RecordStore::save_all` errors.
    pub async fn save_all(&self, records: &[T]) -> Result<(), RepositoryError> {
        self.store.save_all(records).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        n: u32,
    }

    #[tokio::test]
    async fn test_missing_file_policies() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rows.json");

        let empty = RecordStore::<Row>::new(&path, MissingFile::Empty);
        assert!(empty.load_all().await.unwrap().is_empty());

        let strict = RecordStore::<Row>::new(&path, MissingFile::NotFound);
        assert!(matches!(
            strict.load_all().await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let store = RecordStore::new(tmp.path().join("rows.json"), MissingFile::NotFound);

        store.save_all(&[Row { n: 1 }, Row { n: 2 }]).await.unwrap();

        assert_eq!(
            store.load_all().await.unwrap(),
            vec![Row { n: 1 }, Row { n: 2 }]
        );
        assert!(!tmp.path().join("rows.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_is_human_readable() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rows.json");
        let store = RecordStore::new(&path, MissingFile::Empty);

        store.save_all(&[Row { n: 7 }]).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"n\": 7"));
    }

    #[tokio::test]
    async fn test_empty_and_null_files_read_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rows.json");
        let store = RecordStore::<Row>::new(&path, MissingFile::NotFound);

        std::fs::write(&path, "").unwrap();
        assert!(store.load_all().await.unwrap().is_empty());

        std::fs::write(&path, "null\n").unwrap();
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_file_is_decode_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rows.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = RecordStore::<Row>::new(&path, MissingFile::Empty);
        assert!(matches!(
            store.load_all().await,
            Err(RepositoryError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn test_failed_mutation_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rows.json");
        let collection = Collection::new(RecordStore::new(&path, MissingFile::Empty));
        collection
            .update(|rows| {
                rows.push(Row { n: 1 });
                Ok(())
            })
            .await
            .unwrap();

        let result: Result<(), _> = collection
            .update(|rows| {
                rows.push(Row { n: 2 });
                Err(RepositoryError::Conflict("nope".to_owned()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(collection.read().await.unwrap(), vec![Row { n: 1 }]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_are_not_lost() {
        let tmp = tempfile::tempdir().unwrap();
        let collection = Arc::new(Collection::new(RecordStore::new(
            tmp.path().join("rows.json"),
            MissingFile::Empty,
        )));

        let mut handles = Vec::new();
        for n in 0..32 {
            let collection = Arc::clone(&collection);
            handles.push(tokio::spawn(async move {
                collection
                    .update(|rows| {
                        rows.push(Row { n });
                        Ok(())
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut rows = collection.read().await.unwrap();
        rows.sort_by_key(|r| r.n);
        assert_eq!(rows.len(), 32);
        assert!(rows.iter().enumerate().all(|(i, r)| r.n as usize == i));
    }

    #[tokio::test]
    async fn test_interleaved_writers_without_lock_lose_updates() {
        let tmp = tempfile::tempdir().unwrap();
        let store = RecordStore::<Row>::new(tmp.path().join("rows.json"), MissingFile::Empty);

        // Two writers both read before either saves.
        let mut first = store.load_all().await.unwrap();
        let mut second = store.load_all().await.unwrap();
        first.push(Row { n: 1 });
        second.push(Row { n: 2 });
        store.save_all(&first).await.unwrap();
        store.save_all(&second).await.unwrap();

        assert_eq!(store.load_all().await.unwrap(), vec![Row { n: 2 }]);
    }

    #[tokio::test]
    async fn test_interleaved_writers_with_lock_keep_both_updates() {
        let tmp = tempfile::tempdir().unwrap();
        let collection = Arc::new(Collection::new(RecordStore::<Row>::new(
            tmp.path().join("rows.json"),
            MissingFile::Empty,
        )));

        // The first writer holds the lock across load and save; the second
        // can only load once the first has saved.
        let writer = collection.write().await;
        let mut rows = writer.load_all().await.unwrap();
        let second = tokio::spawn({
            let collection = Arc::clone(&collection);
            async move {
                collection
                    .update(|rows| {
                        rows.push(Row { n: 2 });
                        Ok(())
                    })
                    .await
            }
        });
        tokio::task::yield_now().await;
        rows.push(Row { n: 1 });
        writer.save_all(&rows).await.unwrap();
        drop(writer);
        second.await.unwrap().unwrap();

        assert_eq!(
            collection.read().await.unwrap(),
            vec![Row { n: 1 }, Row { n: 2 }]
        );
    }
}
