//! Visitor code resolver.
//!
//! Translates a decoded QR payload into a [`VisitorRecord`]. Lookup is an
//! exact match on the payload string: no trimming, no case folding, no
//! payload validation beyond presence in the table.
//!
//! An unknown payload is not an error. [`Resolution::NotFound`] is a regular
//! outcome the caller must branch on, the same way a denied access is a
//! regular response rather than a failure.

use badgekey_core::VisitorRecord;
use std::collections::BTreeMap;

/// Outcome of resolving a decoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The payload identifies a known visitor.
    Found(VisitorRecord),

    /// The payload is not in the visitor table.
    NotFound,
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    pub fn into_visitor(self) -> Option<VisitorRecord> {
        match self {
            Resolution::Found(visitor) => Some(visitor),
            Resolution::NotFound => None,
        }
    }
}

/// Static visitor table keyed by QR payload.
///
/// # Examples
///
/// ```
/// use badgekey_session::{Resolution, VisitorDirectory};
///
/// let visitors = VisitorDirectory::seeded();
///
/// assert!(visitors.resolve("1").is_found());
/// assert_eq!(visitors.resolve("999"), Resolution::NotFound);
/// ```
#[derive(Debug, Clone, Default)]
pub struct VisitorDirectory {
    visitors: BTreeMap<String, VisitorRecord>,
}

impl VisitorDirectory {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding the default demo visitor under payload `"1"`.
    pub fn seeded() -> Self {
        Self::from_records([VisitorRecord::new("1", "Irhan Achmad J")
            .with_company("SMK Jaya")
            .with_position("Administrator")
            .with_phone("+62 852-1234-5678")
            .with_email("irhan@gmail.com")
            .with_address("Jl. Cimahi No. 123, Bandung")])
    }

    /// Build a table keyed by each record's `id`. Later duplicates win.
    pub fn from_records(records: impl IntoIterator<Item = VisitorRecord>) -> Self {
        let visitors = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self { visitors }
    }

    /// Add or replace a visitor, returning the previous record for that id.
    pub fn insert(&mut self, record: VisitorRecord) -> Option<VisitorRecord> {
        self.visitors.insert(record.id.clone(), record)
    }

    /// Resolve a decoded payload to a visitor.
    pub fn resolve(&self, payload: &str) -> Resolution {
        match self.visitors.get(payload) {
            Some(visitor) => Resolution::Found(visitor.clone()),
            None => Resolution::NotFound,
        }
    }

    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }

    /// Visitors ordered by payload.
    pub fn iter(&self) -> impl Iterator<Item = &VisitorRecord> {
        self.visitors.values()
    }
}
