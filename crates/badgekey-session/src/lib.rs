//! Session layer for the visitor badge kiosk.
//!
//! This crate holds everything that answers "who is using the kiosk" and
//! "what have they scanned":
//!
//! - [`SessionStore`] / [`SessionHandle`] - current operator and scan history
//! - [`CredentialVerifier`] / [`UserDirectory`] - pluggable credential check,
//!   with the seeded [`InMemoryUserDirectory`]
//! - [`VisitorDirectory`] - resolves decoded QR payloads to visitors
//!
//! Nothing here is persisted. History lives for the session and is cleared on
//! logout.
//!
//! # Examples
//!
//! ```
//! use badgekey_session::{Resolution, SessionStore, VisitorDirectory};
//!
//! let mut session = SessionStore::seeded();
//! let visitors = VisitorDirectory::seeded();
//!
//! assert!(session.login("admin", "admin123"));
//!
//! match visitors.resolve("1") {
//!     Resolution::Found(visitor) => {
//!         let record = session.record_scan(visitor);
//!         println!("Scanned {} at {}", record.visitor.name, record.timestamp);
//!     }
//!     Resolution::NotFound => println!("Unknown code"),
//! }
//! ```

pub mod directory;
pub mod models;
pub mod resolver;
pub mod session;

pub use directory::{CredentialVerifier, InMemoryUserDirectory, UserDirectory};
pub use models::{NewUser, User, UserId};
pub use resolver::{Resolution, VisitorDirectory};
pub use session::{SessionHandle, SessionStore};
