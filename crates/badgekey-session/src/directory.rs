//! Operator directory and credential verification.
//!
//! The session store never compares passwords itself; it asks a
//! [`CredentialVerifier`]. The in-memory directory below is the seeded
//! implementation used on the kiosk. A hashed or remote store can replace it
//! without touching the session store's contract.

use crate::models::{NewUser, User, UserId};
use badgekey_core::Result;
use subtle::ConstantTimeEq;

/// Checks a username/password pair and returns the matching user.
pub trait CredentialVerifier {
    /// Return the user (credentials stripped) if the pair matches a record.
    fn verify(&self, username: &str, password: &str) -> Option<User>;
}

/// A credential verifier that also accepts new registrations.
pub trait UserDirectory: CredentialVerifier {
    /// Append a new operator and return the stored record.
    ///
    /// # Errors
    /// Returns `Error::MissingField` if a required field is blank.
    fn register(&mut self, profile: NewUser) -> Result<User>;

    /// Number of registered operators.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
struct UserEntry {
    user: User,
    password: String,
}

impl UserEntry {
    /// Constant-time so response timing does not reveal how much of the
    /// password matched.
    fn matches(&self, username: &str, password: &str) -> bool {
        let password_ok: bool = self.password.as_bytes().ct_eq(password.as_bytes()).into();
        self.user.username == username && password_ok
    }
}

/// In-memory operator directory.
///
/// Ids are assigned as `len() + 1` at registration time, so they increase
/// monotonically as long as nothing is removed (the directory offers no
/// removal).
///
/// # Examples
///
/// ```
/// use badgekey_session::{CredentialVerifier, InMemoryUserDirectory, NewUser, UserDirectory};
///
/// let mut directory = InMemoryUserDirectory::seeded();
/// let user = directory
///     .register(NewUser::new("budi", "rahasia", "Budi Santoso"))
///     .unwrap();
///
/// assert_eq!(user.id.as_u64(), 2);
/// assert!(directory.verify("budi", "rahasia").is_some());
/// assert!(directory.verify("budi", "salah").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    entries: Vec<UserEntry>,
}

impl InMemoryUserDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory holding the default kiosk administrator.
    pub fn seeded() -> Self {
        let mut admin = NewUser::new("admin", "admin123", "Irhan Achmad J");
        admin.email = "irhan@gmail.com".to_string();
        admin.phone = "+62 852-1234-5678".to_string();
        admin.address = "Jl. Cimahi No. 123, Bandung".to_string();
        admin.company = "SMK Jaya".to_string();
        admin.position = "Administrator".to_string();
        admin.department = "IT Department".to_string();

        let (user, password) = admin.into_parts(UserId::new(1));
        Self {
            entries: vec![UserEntry { user, password }],
        }
    }

    /// Build a directory from seed profiles, assigning ids in order.
    ///
    /// # Errors
    /// Returns `Error::MissingField` if any profile lacks a required field.
    pub fn from_profiles(profiles: impl IntoIterator<Item = NewUser>) -> Result<Self> {
        let mut directory = Self::new();
        for profile in profiles {
            directory.register(profile)?;
        }
        Ok(directory)
    }

    /// Iterate over registered users.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.entries.iter().map(|entry| &entry.user)
    }
}

impl CredentialVerifier for InMemoryUserDirectory {
    fn verify(&self, username: &str, password: &str) -> Option<User> {
        self.entries
            .iter()
            .find(|entry| entry.matches(username, password))
            .map(|entry| entry.user.clone())
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn register(&mut self, profile: NewUser) -> Result<User> {
        profile.validate()?;

        let id = UserId::new(self.entries.len() as u64 + 1);
        let (user, password) = profile.into_parts(id);
        self.entries.push(UserEntry {
            user: user.clone(),
            password,
        });

        Ok(user)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use badgekey_core::Error;

    #[test]
    fn test_seeded_directory_verifies_admin() {
        let directory = InMemoryUserDirectory::seeded();

        let user = directory.verify("admin", "admin123").unwrap();
        assert_eq!(user.id, UserId::new(1));
        assert_eq!(user.company, "SMK Jaya");
    }

    #[test]
    fn test_verify_rejects_wrong_password_and_unknown_user() {
        let directory = InMemoryUserDirectory::seeded();

        assert!(directory.verify("admin", "wrong").is_none());
        assert!(directory.verify("admin", "").is_none());
        assert!(directory.verify("root", "admin123").is_none());
    }

    #[test]
    fn test_verify_is_case_sensitive() {
        let directory = InMemoryUserDirectory::seeded();
        assert!(directory.verify("Admin", "admin123").is_none());
        assert!(directory.verify("admin", "ADMIN123").is_none());
    }

    #[test]
    fn test_register_assigns_ids_from_directory_size() {
        let mut directory = InMemoryUserDirectory::new();

        let first = directory.register(NewUser::new("a", "1", "A")).unwrap();
        let second = directory.register(NewUser::new("b", "2", "B")).unwrap();

        assert_eq!(first.id, UserId::new(1));
        assert_eq!(second.id, UserId::new(2));
        assert_eq!(directory.len(), 2);
    }

    #[test]
    fn test_register_rejects_missing_name() {
        let mut directory = InMemoryUserDirectory::seeded();

        let result = directory.register(NewUser::new("ghost", "pw", ""));

        assert!(matches!(result, Err(Error::MissingField(ref f)) if f == "name"));
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn test_from_profiles_keeps_order() {
        let directory = InMemoryUserDirectory::from_profiles([
            NewUser::new("one", "pw", "One"),
            NewUser::new("two", "pw", "Two"),
        ])
        .unwrap();

        let names: Vec<_> = directory.users().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["One", "Two"]);
    }
}
