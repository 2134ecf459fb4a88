//! Testing utilities for baseapi.
//!
//! # Features
//!
//! - [`MemoryStore`]: an in-memory data store with a unit of work, call
//!   counters, and an offline switch
//! - [`MemoryRepository`]: the repository a [`MemoryStore`] hands out
//! - [`SpyHook`]: a hook that counts how often it ran
//! - [`ResultHook`]: a hook that stores a fixed payload

use baseapi_core::{
    Document, Hook, HookResult, Manager, Message, Output, Payload, ProcessEvent, Repository,
    RepositoryError, RepositoryHandle, StoreError, Value,
};
use std::{
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

// ============================================================================
// Memory Store
// ============================================================================

/// A document a [`MemoryStore`] can assign identifiers to.
pub trait MemoryDocument: Document {
    /// Set the identifier.
    fn set_id(&mut self, id: String);
}

enum Staged<D> {
    Persist(D),
    Remove(String),
}

struct Shared<D> {
    rows: Mutex<Vec<D>>,
    staged: Mutex<Vec<Staged<D>>>,
    next_id: AtomicUsize,
    persists: AtomicUsize,
    removes: AtomicUsize,
    flushes: AtomicUsize,
    offline: AtomicBool,
}

impl<D> Shared<D> {
    fn rows(&self) -> MutexGuard<'_, Vec<D>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn staged(&self) -> MutexGuard<'_, Vec<Staged<D>>> {
        self.staged.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_online(&self) -> Result<(), RepositoryError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(RepositoryError::Connection("data store is offline".into()))
        } else {
            Ok(())
        }
    }
}

/// An in-memory data store.
///
/// `persist` and `remove` are staged and only become visible to repositories
/// after `flush`. Clones share the same storage.
///
/// # Example
///
/// ```rust,ignore
/// let store = MemoryStore::new().with_documents(fixtures);
/// let stores = DataStores::new().register("memory", store.clone());
///
/// // ... drive a controller ...
///
/// assert_eq!(store.flush_count(), 1);
/// ```
pub struct MemoryStore<D> {
    shared: Arc<Shared<D>>,
    repositories: Arc<Vec<String>>,
}

impl<D: MemoryDocument> MemoryStore<D> {
    /// An empty store exposing one repository named after `D::KIND`.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                rows: Mutex::new(Vec::new()),
                staged: Mutex::new(Vec::new()),
                next_id: AtomicUsize::new(1),
                persists: AtomicUsize::new(0),
                removes: AtomicUsize::new(0),
                flushes: AtomicUsize::new(0),
                offline: AtomicBool::new(false),
            }),
            repositories: Arc::new(vec![D::KIND.to_owned()]),
        }
    }

    /// Also expose the repository `name`. All repositories see the same rows.
    pub fn with_repository(mut self, name: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.repositories).push(name.into());
        self
    }

    /// Seed the store, bypassing the unit of work and the counters.
    pub fn with_documents(self, documents: impl IntoIterator<Item = D>) -> Self {
        for mut document in documents {
            if document.id().is_none() {
                document.set_id(self.generate_id());
            }
            self.shared.rows().push(document);
        }
        self
    }

    /// Snapshot of the flushed documents, in insertion order.
    pub fn documents(&self) -> Vec<D> {
        self.shared.rows().clone()
    }

    /// The flushed document with identifier `id`.
    pub fn find(&self, id: &str) -> Option<D> {
        find_by_id(&self.shared.rows(), id)
    }

    /// Make every subsequent call fail with a connection error.
    pub fn set_offline(&self, offline: bool) {
        self.shared.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of `persist` calls.
    pub fn persist_count(&self) -> usize {
        self.shared.persists.load(Ordering::SeqCst)
    }

    /// Number of `remove` calls.
    pub fn remove_count(&self) -> usize {
        self.shared.removes.load(Ordering::SeqCst)
    }

    /// Number of `flush` calls.
    pub fn flush_count(&self) -> usize {
        self.shared.flushes.load(Ordering::SeqCst)
    }

    /// Number of changes waiting for `flush`.
    pub fn pending(&self) -> usize {
        self.shared.staged().len()
    }

    fn generate_id(&self) -> String {
        format!("{:024x}", self.shared.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

impl<D: MemoryDocument> Default for MemoryStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Clone for MemoryStore<D> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            repositories: Arc::clone(&self.repositories),
        }
    }
}

impl<D: MemoryDocument> Manager<D> for MemoryStore<D> {
    fn repository(&self, name: &str) -> Result<RepositoryHandle<D>, StoreError> {
        if self.repositories.iter().any(|known| known == name) {
            Ok(Arc::new(MemoryRepository {
                name: name.to_owned(),
                shared: Arc::clone(&self.shared),
            }))
        } else {
            Err(StoreError::UnknownRepository(name.to_owned()))
        }
    }

    async fn persist(&self, document: &mut D) -> Result<(), RepositoryError> {
        self.shared.persists.fetch_add(1, Ordering::SeqCst);
        self.shared.check_online()?;
        if document.id().is_none() {
            document.set_id(self.generate_id());
        }
        self.shared.staged().push(Staged::Persist(document.clone()));
        Ok(())
    }

    async fn remove(&self, document: &D) -> Result<(), RepositoryError> {
        self.shared.removes.fetch_add(1, Ordering::SeqCst);
        self.shared.check_online()?;
        if let Some(id) = document.id() {
            self.shared.staged().push(Staged::Remove(id));
        }
        Ok(())
    }

    async fn flush(&self) -> Result<(), RepositoryError> {
        self.shared.flushes.fetch_add(1, Ordering::SeqCst);
        self.shared.check_online()?;
        let staged: Vec<Staged<D>> = self.shared.staged().drain(..).collect();
        let mut rows = self.shared.rows();
        for change in staged {
            match change {
                Staged::Persist(document) => {
                    let id = document.id();
                    match rows.iter_mut().find(|row| row.id() == id) {
                        Some(row) => *row = document,
                        None => rows.push(document),
                    }
                }
                Staged::Remove(id) => rows.retain(|row| row.id().as_deref() != Some(id.as_str())),
            }
        }
        Ok(())
    }
}

fn find_by_id<D: Document>(rows: &[D], id: &str) -> Option<D> {
    rows.iter()
        .find(|row| row.id().as_deref() == Some(id))
        .cloned()
}

// ============================================================================
// Memory Repository
// ============================================================================

/// A repository over a [`MemoryStore`].
///
/// Supports `findOneById(id)`, `findAll()`, `findPaginated(skip, limit)` and
/// `count()`. Pagination arguments may be numbers, numeric strings, or
/// `null`; a `limit` of 0 or `null` means no limit.
pub struct MemoryRepository<D> {
    name: String,
    shared: Arc<Shared<D>>,
}

impl<D: MemoryDocument> Repository<D> for MemoryRepository<D> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn call(&self, method: &str, arguments: &[Value]) -> Result<Output<D>, RepositoryError> {
        self.shared.check_online()?;
        match method {
            "findOneById" => {
                let id = match arguments.first() {
                    Some(Value::String(id)) => id.clone(),
                    Some(Value::Number(id)) => id.to_string(),
                    _ => return Ok(Output::Empty),
                };
                Ok(Output::from(find_by_id(&self.shared.rows(), &id)))
            }
            "findAll" => Ok(Output::many(self.shared.rows().clone())),
            "findPaginated" => {
                let skip = count_argument(arguments.first(), "skip")?.unwrap_or(0);
                let limit = count_argument(arguments.get(1), "limit")?.filter(|limit| *limit > 0);
                let rows = self.shared.rows();
                let page: Vec<D> = rows
                    .iter()
                    .skip(skip)
                    .take(limit.unwrap_or(usize::MAX))
                    .cloned()
                    .collect();
                Ok(Output::many(page))
            }
            "count" => Ok(Output::Value(Value::from(self.shared.rows().len()))),
            _ => Err(RepositoryError::unknown_method(&self.name, method)),
        }
    }
}

fn count_argument(argument: Option<&Value>, name: &str) -> Result<Option<usize>, RepositoryError> {
    let invalid = || RepositoryError::InvalidArgument(format!("`{name}` must be a non-negative integer"));
    match argument {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(invalid),
        Some(Value::String(text)) => text.trim().parse::<usize>().map(Some).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

// ============================================================================
// Spy Hook
// ============================================================================

/// A hook that counts its invocations and returns a fixed [`HookResult`].
///
/// Clones share the counter.
///
/// # Example
///
/// ```rust,ignore
/// let spy = SpyHook::new();
/// bus.add_listener(HookPoint::Get, spy.clone());
/// bus.dispatch(HookPoint::Get, &mut event).await?;
/// assert_eq!(spy.count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SpyHook {
    calls: Arc<AtomicUsize>,
    result: HookResult,
}

impl SpyHook {
    /// A spy returning `Next`.
    pub fn new() -> Self {
        Self::with_result(HookResult::Next)
    }

    /// A spy returning `result`.
    pub fn with_result(result: HookResult) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            result,
        }
    }

    /// Number of invocations so far.
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Whether the spy ran at least once.
    pub fn was_called(&self) -> bool {
        self.count() > 0
    }
}

impl Default for SpyHook {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Message> Hook<E> for SpyHook {
    async fn on_event(&self, _event: &mut E) -> Result<HookResult, E::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result)
    }
}

// ============================================================================
// Result Hook
// ============================================================================

/// A hook that stores a fixed payload on every [`ProcessEvent`] it sees.
pub struct ResultHook<D> {
    payload: Payload<D>,
}

impl<D: Document> ResultHook<D> {
    /// A hook storing `payload`.
    pub fn new(payload: Payload<D>) -> Self {
        Self { payload }
    }
}

impl<D: Document> Hook<ProcessEvent<D>> for ResultHook<D> {
    async fn on_event(&self, event: &mut ProcessEvent<D>) -> Result<HookResult, baseapi_core::ApiError> {
        event.set_result(self.payload.clone());
        Ok(HookResult::Next)
    }
}
