//! Session store: who is using the kiosk and what they scanned.
//!
//! The store is an owned value, injected into whichever component needs it.
//! Components that live on the event loop share it through [`SessionHandle`].
//!
//! # Invariants
//!
//! - History is most-recent-first.
//! - `scan_id` is unique within the history.
//! - Logging out clears the current user and the history together; no caller
//!   can observe one cleared without the other.

use crate::directory::{InMemoryUserDirectory, UserDirectory};
use crate::models::{NewUser, User};
use badgekey_core::{
    Error, Result, ScanIdGenerator, ScanRecord, VisitorRecord, constants::RECENT_SCANS_SHOWN,
};
use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Current operator plus the session's scan history.
///
/// # Examples
///
/// ```
/// use badgekey_session::{SessionStore, VisitorDirectory};
///
/// let mut session = SessionStore::seeded();
/// assert!(session.login("admin", "admin123"));
///
/// let visitor = VisitorDirectory::seeded().resolve("1").into_visitor().unwrap();
/// session.record_scan(visitor);
/// assert_eq!(session.scan_count(), 1);
///
/// session.logout();
/// assert!(session.current_user().is_none());
/// assert_eq!(session.scan_count(), 0);
/// ```
#[derive(Debug)]
pub struct SessionStore<D = InMemoryUserDirectory> {
    directory: D,
    current_user: Option<User>,
    history: VecDeque<ScanRecord>,
    scan_ids: ScanIdGenerator,
}

impl SessionStore<InMemoryUserDirectory> {
    /// Session backed by the seeded in-memory directory.
    pub fn seeded() -> Self {
        Self::new(InMemoryUserDirectory::seeded())
    }
}

impl<D: UserDirectory> SessionStore<D> {
    /// Create a logged-out session over a user directory.
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            current_user: None,
            history: VecDeque::new(),
            scan_ids: ScanIdGenerator::default(),
        }
    }

    /// Log in with a username and password.
    ///
    /// On success the current user is replaced and `true` is returned. On
    /// failure the session is left exactly as it was, including any user who
    /// was already logged in.
    pub fn login(&mut self, username: &str, password: &str) -> bool {
        match self.directory.verify(username, password) {
            Some(user) => {
                info!(user_id = %user.id, username, "Operator logged in");
                self.current_user = Some(user);
                true
            }
            None => {
                warn!(username, "Login rejected");
                false
            }
        }
    }

    /// Register a new operator. Does not log them in.
    ///
    /// # Errors
    /// Returns `Error::MissingField` if username, password or name is blank.
    pub fn register(&mut self, profile: NewUser) -> Result<User> {
        let user = self.directory.register(profile)?;
        info!(user_id = %user.id, username = %user.username, "Operator registered");
        Ok(user)
    }

    /// Clear the current user and the scan history together.
    pub fn logout(&mut self) {
        let cleared = self.history.len();
        if let Some(user) = self.current_user.take() {
            info!(user_id = %user.id, cleared, "Operator logged out");
        }
        self.history.clear();
    }

    /// Prepend a scan to the history.
    ///
    /// The same visitor may appear many times: every accepted scan is its own
    /// attendance record.
    ///
    /// # Errors
    /// Returns `Error::DuplicateScanId` if a record with the same id is already
    /// in the history.
    pub fn add_scan_history(&mut self, record: ScanRecord) -> Result<()> {
        if self.history.iter().any(|r| r.scan_id == record.scan_id) {
            return Err(Error::DuplicateScanId(record.scan_id.as_u64()));
        }

        debug!(scan_id = %record.scan_id, visitor = %record.visitor.id, "Scan recorded");
        self.scan_ids.observe(record.scan_id);
        self.history.push_front(record);
        Ok(())
    }

    /// Stamp a resolved visitor with the current time and a fresh scan id, and
    /// prepend it to the history.
    pub fn record_scan(&mut self, visitor: VisitorRecord) -> ScanRecord {
        self.record_scan_at(visitor, Local::now())
    }

    /// As [`record_scan`](Self::record_scan), with an explicit capture time.
    pub fn record_scan_at(&mut self, visitor: VisitorRecord, at: DateTime<Local>) -> ScanRecord {
        let scan_id = self.scan_ids.next_at(at);
        let record = ScanRecord::new(visitor, at, scan_id);

        debug!(scan_id = %record.scan_id, visitor = %record.visitor.id, "Scan recorded");
        self.history.push_front(record.clone());
        record
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    /// Scan history, most recent first.
    pub fn history(&self) -> impl Iterator<Item = &ScanRecord> {
        self.history.iter()
    }

    /// The `n` most recent scans.
    pub fn recent(&self, n: usize) -> Vec<&ScanRecord> {
        self.history.iter().take(n).collect()
    }

    /// The scans shown on the home screen's "recent scans" panel.
    pub fn recent_for_home(&self) -> Vec<&ScanRecord> {
        self.recent(RECENT_SCANS_SHOWN)
    }

    pub fn scan_count(&self) -> usize {
        self.history.len()
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }
}

/// Shared handle to a [`SessionStore`] for components on the event loop.
///
/// Cloning the handle shares the same store.
#[derive(Debug)]
pub struct SessionHandle<D = InMemoryUserDirectory> {
    inner: Arc<Mutex<SessionStore<D>>>,
}

impl<D> Clone for SessionHandle<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: UserDirectory> SessionHandle<D> {
    pub fn new(store: SessionStore<D>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Lock the store for a sequence of operations.
    pub async fn lock(&self) -> MutexGuard<'_, SessionStore<D>> {
        self.inner.lock().await
    }

    pub async fn login(&self, username: &str, password: &str) -> bool {
        self.inner.lock().await.login(username, password)
    }

    pub async fn logout(&self) {
        self.inner.lock().await.logout();
    }

    pub async fn record_scan(&self, visitor: VisitorRecord) -> ScanRecord {
        self.inner.lock().await.record_scan(visitor)
    }

    pub async fn current_user(&self) -> Option<User> {
        self.inner.lock().await.current_user().cloned()
    }

    /// Copy of the history, most recent first.
    pub async fn history(&self) -> Vec<ScanRecord> {
        self.inner.lock().await.history().cloned().collect()
    }

    pub async fn scan_count(&self) -> usize {
        self.inner.lock().await.scan_count()
    }
}
