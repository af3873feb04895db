//! Storage seam shared by every collection the service persists.
//!
//! Each record type names its identifier; repositories hold whole documents and are
//! addressed only by that identifier. Checks that span records (unique codes, unique
//! e-mails, roles still held by users) run inside the conditional writes below so the
//! check and the write observe the same state.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// A document that can live in a [`Repository`].
pub trait Record: Clone + Send + Sync + 'static {
    type Id: Clone + Ord + Debug + Send + Sync + 'static;

    fn id(&self) -> &Self::Id;
}

/// Storage abstraction so the services can be exercised in isolation.
///
/// Closures handed to the conditional operations run while the repository is locked and
/// must not call back into the same repository. They may call into other repositories;
/// the services always nest them as roles, then schools, then users, then employees.
pub trait Repository<T: Record>: Send + Sync {
    /// Store `record` unless an existing record `conflicts` with it.
    fn insert_unless<F>(&self, record: T, conflicts: F) -> Result<T, RepositoryError>
    where
        F: Fn(&T) -> bool;

    /// Read-modify-write of one record. `change` sees every other record; when it fails
    /// the stored record is left untouched.
    fn update_with<F, E>(&self, id: &T::Id, change: F) -> Result<T, E>
    where
        F: FnOnce(&mut T, &[&T]) -> Result<(), E>,
        E: From<RepositoryError>;

    /// Run `inspect` against the stored record; it cannot change or disappear meanwhile.
    fn with_record<F, O, E>(&self, id: &T::Id, inspect: F) -> Result<O, E>
    where
        F: FnOnce(Option<&T>) -> Result<O, E>,
        E: From<RepositoryError>;

    /// Remove the record once `check` allows it.
    fn remove_if<F, E>(&self, id: &T::Id, check: F) -> Result<T, E>
    where
        F: FnOnce(&T) -> Result<(), E>,
        E: From<RepositoryError>;

    fn fetch(&self, id: &T::Id) -> Result<Option<T>, RepositoryError>;
    fn list(&self) -> Result<Vec<T>, RepositoryError>;

    fn insert(&self, record: T) -> Result<T, RepositoryError> {
        self.insert_unless(record, |_| false)
    }

    fn update(&self, record: T) -> Result<(), RepositoryError> {
        let id = record.id().clone();
        self.update_with(&id, move |slot, _| {
            *slot = record;
            Ok::<_, RepositoryError>(())
        })
        .map(|_| ())
    }

    fn remove(&self, id: &T::Id) -> Result<T, RepositoryError> {
        self.remove_if(id, |_| Ok::<_, RepositoryError>(()))
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Process-local store behind one mutex; contents are lost on restart.
pub struct MemoryRepository<T: Record> {
    records: Arc<Mutex<BTreeMap<T::Id, T>>>,
}

impl<T: Record> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self {
            records: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

impl<T: Record> MemoryRepository<T> {
    fn lock(&self) -> MutexGuard<'_, BTreeMap<T::Id, T>> {
        self.records.lock().expect("repository mutex poisoned")
    }
}

impl<T: Record> Repository<T> for MemoryRepository<T> {
    fn insert_unless<F>(&self, record: T, conflicts: F) -> Result<T, RepositoryError>
    where
        F: Fn(&T) -> bool,
    {
        let mut guard = self.lock();
        if guard.contains_key(record.id()) || guard.values().any(|existing| conflicts(existing)) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id().clone(), record.clone());
        Ok(record)
    }

    fn update_with<F, E>(&self, id: &T::Id, change: F) -> Result<T, E>
    where
        F: FnOnce(&mut T, &[&T]) -> Result<(), E>,
        E: From<RepositoryError>,
    {
        let mut guard = self.lock();
        let mut record = guard.get(id).cloned().ok_or(RepositoryError::NotFound)?;
        let others: Vec<&T> = guard.values().filter(|other| other.id() != id).collect();
        change(&mut record, &others)?;
        guard.insert(id.clone(), record.clone());
        Ok(record)
    }

    fn with_record<F, O, E>(&self, id: &T::Id, inspect: F) -> Result<O, E>
    where
        F: FnOnce(Option<&T>) -> Result<O, E>,
        E: From<RepositoryError>,
    {
        let guard = self.lock();
        inspect(guard.get(id))
    }

    fn remove_if<F, E>(&self, id: &T::Id, check: F) -> Result<T, E>
    where
        F: FnOnce(&T) -> Result<(), E>,
        E: From<RepositoryError>,
    {
        let mut guard = self.lock();
        let record = guard.get(id).ok_or(RepositoryError::NotFound)?;
        check(record)?;
        Ok(guard.remove(id).ok_or(RepositoryError::NotFound)?)
    }

    fn fetch(&self, id: &T::Id) -> Result<Option<T>, RepositoryError> {
        Ok(self.lock().get(id).cloned())
    }

    fn list(&self) -> Result<Vec<T>, RepositoryError> {
        Ok(self.lock().values().cloned().collect())
    }
}

/// Monotonic id source producing `prefix-000001` style identifiers.
pub(crate) struct IdSequence {
    prefix: &'static str,
    next: AtomicU64,
}

impl IdSequence {
    pub(crate) const fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            next: AtomicU64::new(1),
        }
    }

    pub(crate) fn next(&self) -> String {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{id:06}", self.prefix)
    }
}
