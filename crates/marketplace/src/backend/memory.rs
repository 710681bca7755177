//! In-memory backend.
//!
//! Implements all three gateway capabilities inside the process. Used by the
//! test suites and for local development without Firebase credentials.
//! Failures and latency can be injected per operation, and every call is
//! counted so tests can assert that a workflow did or did not reach the
//! backend.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use mime::Mime;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use uuid::Uuid;

use drivex_core::{Email, ListingId, OwnerId};

use super::{
    AuthError, AuthEvents, AuthProvider, AuthSubscription, BackendError, BlobPath, BlobStore,
    ListingField, ListingQuery, ListingStore,
};
use crate::models::{ListingFields, ListingRecord, SessionIdentity};

/// Minimum password length enforced on sign-up (matches Firebase).
const MIN_PASSWORD_LENGTH: usize = 6;

/// Snapshot of how many calls reached the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub queries: usize,
    pub gets: usize,
    pub creates: usize,
    pub document_deletes: usize,
    pub uploads: usize,
    pub blob_deletes: usize,
    pub auth: usize,
}

impl CallCounts {
    /// Total document and blob calls (auth excluded).
    #[must_use]
    pub const fn storage_total(&self) -> usize {
        self.queries
            + self.gets
            + self.creates
            + self.document_deletes
            + self.uploads
            + self.blob_deletes
    }
}

#[derive(Default)]
struct Counters {
    queries: AtomicUsize,
    gets: AtomicUsize,
    creates: AtomicUsize,
    document_deletes: AtomicUsize,
    uploads: AtomicUsize,
    blob_deletes: AtomicUsize,
    auth: AtomicUsize,
}

/// A stored object.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Clone)]
struct Account {
    uid: OwnerId,
    password: String,
    name: Option<String>,
}

#[derive(Default)]
struct Faults {
    queries: bool,
    gets: bool,
    create: bool,
    document_delete: bool,
    uploads: bool,
    blob_deletes: HashSet<String>,
    query_delays: HashMap<ListingField, Duration>,
}

#[derive(Default)]
struct Data {
    documents: Vec<ListingRecord>,
    next_id: u64,
    blobs: HashMap<String, StoredBlob>,
    accounts: HashMap<String, Account>,
}

/// In-memory document store, blob store and auth provider.
#[derive(Default)]
pub struct InMemoryBackend {
    data: Mutex<Data>,
    faults: Mutex<Faults>,
    counters: Counters,
    events: AuthEvents,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> MutexGuard<'_, Data> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn faults(&self) -> MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Seeding and inspection
    // =========================================================================

    /// Insert a document directly, bypassing counters and faults.
    pub fn insert(&self, fields: ListingFields) -> ListingRecord {
        let mut data = self.data();
        data.next_id += 1;
        let record = ListingRecord::new(ListingId::new(format!("doc-{}", data.next_id)), fields);
        data.documents.push(record.clone());
        record
    }

    /// Every stored document, in insertion order.
    #[must_use]
    pub fn documents(&self) -> Vec<ListingRecord> {
        self.data().documents.clone()
    }

    /// Whether an object exists at `path`.
    #[must_use]
    pub fn has_blob(&self, path: &BlobPath) -> bool {
        self.data().blobs.contains_key(&path.to_string())
    }

    /// Number of stored objects.
    #[must_use]
    pub fn blob_count(&self) -> usize {
        self.data().blobs.len()
    }

    /// Store an object directly, bypassing counters and faults.
    pub fn put_blob(&self, path: &BlobPath, bytes: Vec<u8>, content_type: &str) -> String {
        self.data().blobs.insert(
            path.to_string(),
            StoredBlob {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        blob_url(path)
    }

    /// Create an account without signing in.
    pub fn add_account(&self, email: &str, password: &str, name: Option<&str>) -> OwnerId {
        let uid = OwnerId::new(Uuid::new_v4().simple().to_string());
        self.data().accounts.insert(
            email.to_string(),
            Account {
                uid: uid.clone(),
                password: password.to_string(),
                name: name.map(str::to_string),
            },
        );
        uid
    }

    /// Replace the signed-in identity and notify subscribers.
    pub fn set_user(&self, identity: Option<SessionIdentity>) {
        self.events.publish(identity);
    }

    /// Calls made so far.
    #[must_use]
    pub fn calls(&self) -> CallCounts {
        let c = &self.counters;
        CallCounts {
            queries: c.queries.load(Ordering::SeqCst),
            gets: c.gets.load(Ordering::SeqCst),
            creates: c.creates.load(Ordering::SeqCst),
            document_deletes: c.document_deletes.load(Ordering::SeqCst),
            uploads: c.uploads.load(Ordering::SeqCst),
            blob_deletes: c.blob_deletes.load(Ordering::SeqCst),
            auth: c.auth.load(Ordering::SeqCst),
        }
    }

    // =========================================================================
    // Fault injection
    // =========================================================================

    pub fn fail_queries(&self, fail: bool) {
        self.faults().queries = fail;
    }

    pub fn fail_gets(&self, fail: bool) {
        self.faults().gets = fail;
    }

    pub fn fail_creates(&self, fail: bool) {
        self.faults().create = fail;
    }

    pub fn fail_document_deletes(&self, fail: bool) {
        self.faults().document_delete = fail;
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.faults().uploads = fail;
    }

    /// Make deletion of the object at `path` fail.
    pub fn fail_blob_delete(&self, path: &BlobPath) {
        self.faults().blob_deletes.insert(path.to_string());
    }

    /// Delay every query on `field` before answering.
    pub fn delay_queries_on(&self, field: ListingField, delay: Duration) {
        self.faults().query_delays.insert(field, delay);
    }

    fn run_query(&self, query: &ListingQuery) -> Vec<ListingRecord> {
        let data = self.data();
        match query {
            ListingQuery::Recent => {
                let mut all = data.documents.clone();
                all.sort_by(|a, b| b.fields.created_at.cmp(&a.fields.created_at));
                all
            }
            ListingQuery::Equals { field, value } => data
                .documents
                .iter()
                .filter(|doc| field.value_of(&doc.fields) == Some(value.as_str()))
                .cloned()
                .collect(),
            ListingQuery::Range { field, start, end } => data
                .documents
                .iter()
                .filter(|doc| {
                    field
                        .value_of(&doc.fields)
                        .is_some_and(|v| v >= start.as_str() && v <= end.as_str())
                })
                .cloned()
                .collect(),
        }
    }

    fn identity_for(email: &str, account: &Account) -> SessionIdentity {
        SessionIdentity {
            uid: account.uid.clone(),
            name: account.name.clone(),
            email: Some(email.to_string()),
        }
    }
}

fn blob_url(path: &BlobPath) -> String {
    format!("memory://{path}")
}

fn unavailable(operation: &str) -> BackendError {
    BackendError::Unavailable(format!("injected {operation} failure"))
}

impl ListingStore for InMemoryBackend {
    async fn query(&self, query: &ListingQuery) -> Result<Vec<ListingRecord>, BackendError> {
        self.counters.queries.fetch_add(1, Ordering::SeqCst);
        let (fail, delay) = {
            let faults = self.faults();
            let delay = match query {
                ListingQuery::Equals { field, .. } | ListingQuery::Range { field, .. } => {
                    faults.query_delays.get(field).copied()
                }
                ListingQuery::Recent => None,
            };
            (faults.queries, delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(unavailable("query"));
        }
        let results = self.run_query(query);
        debug!(?query, count = results.len(), "In-memory query");
        Ok(results)
    }

    async fn get(&self, id: &ListingId) -> Result<Option<ListingRecord>, BackendError> {
        self.counters.gets.fetch_add(1, Ordering::SeqCst);
        if self.faults().gets {
            return Err(unavailable("get"));
        }
        let data = self.data();
        Ok(data.documents.iter().find(|doc| &doc.id == id).cloned())
    }

    async fn create(&self, fields: &ListingFields) -> Result<ListingRecord, BackendError> {
        self.counters.creates.fetch_add(1, Ordering::SeqCst);
        if self.faults().create {
            return Err(unavailable("create"));
        }
        Ok(self.insert(fields.clone()))
    }

    async fn delete(&self, id: &ListingId) -> Result<(), BackendError> {
        self.counters
            .document_deletes
            .fetch_add(1, Ordering::SeqCst);
        if self.faults().document_delete {
            return Err(unavailable("document delete"));
        }
        // Deleting a missing document succeeds, as in Firestore.
        self.data().documents.retain(|doc| &doc.id != id);
        Ok(())
    }
}

impl BlobStore for InMemoryBackend {
    async fn upload(
        &self,
        path: &BlobPath,
        bytes: Vec<u8>,
        content_type: &Mime,
    ) -> Result<String, BackendError> {
        self.counters.uploads.fetch_add(1, Ordering::SeqCst);
        if self.faults().uploads {
            return Err(unavailable("upload"));
        }
        Ok(self.put_blob(path, bytes, content_type.essence_str()))
    }

    async fn delete(&self, path: &BlobPath) -> Result<(), BackendError> {
        self.counters.blob_deletes.fetch_add(1, Ordering::SeqCst);
        let key = path.to_string();
        if self.faults().blob_deletes.contains(&key) {
            return Err(unavailable("blob delete"));
        }
        match self.data().blobs.remove(&key) {
            Some(_) => Ok(()),
            None => Err(BackendError::NotFound(key)),
        }
    }
}

impl AuthProvider for InMemoryBackend {
    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<SessionIdentity, AuthError> {
        self.counters.auth.fetch_add(1, Ordering::SeqCst);
        let identity = {
            let data = self.data();
            let account = data
                .accounts
                .get(email.as_str())
                .filter(|account| account.password == password.expose_secret())
                .ok_or(AuthError::InvalidCredentials)?;
            Self::identity_for(email.as_str(), account)
        };
        self.events.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<SessionIdentity, AuthError> {
        self.counters.auth.fetch_add(1, Ordering::SeqCst);
        if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword(format!(
                "Password should be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        let identity = {
            let mut data = self.data();
            if data.accounts.contains_key(email.as_str()) {
                return Err(AuthError::EmailInUse);
            }
            let account = Account {
                uid: OwnerId::new(Uuid::new_v4().simple().to_string()),
                password: password.expose_secret().to_string(),
                name: None,
            };
            let identity = Self::identity_for(email.as_str(), &account);
            data.accounts.insert(email.as_str().to_string(), account);
            identity
        };
        self.events.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn update_display_name(&self, name: &str) -> Result<SessionIdentity, AuthError> {
        self.counters.auth.fetch_add(1, Ordering::SeqCst);
        let current = self.events.current().ok_or(AuthError::NotSignedIn)?;
        {
            let mut data = self.data();
            if let Some(account) = data
                .accounts
                .values_mut()
                .find(|account| account.uid == current.uid)
            {
                account.name = Some(name.to_string());
            }
        }
        let identity = SessionIdentity {
            name: Some(name.to_string()),
            ..current
        };
        self.events.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.counters.auth.fetch_add(1, Ordering::SeqCst);
        self.events.publish(None);
        Ok(())
    }

    fn subscribe(&self) -> AuthSubscription {
        self.events.subscribe()
    }
}
