use badgekey_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned to a kiosk operator when they register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    pub fn new(id: u64) -> Self {
        UserId(id)
    }

    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An authenticated kiosk operator, with credentials stripped.
///
/// This is what the session store exposes as the current user. The password
/// never leaves the user directory.
///
/// # Examples
///
/// ```
/// use badgekey_session::{InMemoryUserDirectory, CredentialVerifier};
///
/// let directory = InMemoryUserDirectory::seeded();
/// let user = directory.verify("admin", "admin123").unwrap();
///
/// assert_eq!(user.name, "Irhan Achmad J");
/// assert_eq!(user.department, "IT Department");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub company: String,
    pub position: String,
    pub department: String,
}

/// Registration profile for a new operator.
///
/// `username`, `password` and `name` are required; every other field may be
/// left empty. Also used to seed the directory from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub company: String,
    pub position: String,
    pub department: String,
}

impl NewUser {
    /// Create a profile with the required fields.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Check that the required fields are present.
    ///
    /// # Errors
    /// Returns `Error::MissingField` naming the first blank required field.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("username", &self.username),
            ("password", &self.password),
            ("name", &self.name),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::MissingField(field.to_string()));
            }
        }

        Ok(())
    }

    /// Split the profile into the public user record and the password.
    pub(crate) fn into_parts(self, id: UserId) -> (User, String) {
        let user = User {
            id,
            username: self.username,
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            company: self.company,
            position: self.position,
            department: self.department,
        };
        (user, self.password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_validate_accepts_required_fields_only() {
        let profile = NewUser::new("budi", "rahasia", "Budi Santoso");
        assert!(profile.validate().is_ok());
    }

    #[rstest]
    #[case(NewUser::new("", "pw", "Name"), "username")]
    #[case(NewUser::new("user", "", "Name"), "password")]
    #[case(NewUser::new("user", "pw", "   "), "name")]
    fn test_validate_rejects_blank_required_field(#[case] profile: NewUser, #[case] field: &str) {
        match profile.validate() {
            Err(Error::MissingField(missing)) => assert_eq!(missing, field),
            other => panic!("expected MissingField({field}), got {other:?}"),
        }
    }

    #[test]
    fn test_into_parts_strips_password() {
        let mut profile = NewUser::new("sari", "pw123", "Sari Dewi");
        profile.department = "Front Desk".to_string();

        let (user, password) = profile.into_parts(UserId::new(3));

        assert_eq!(user.id, UserId::new(3));
        assert_eq!(user.department, "Front Desk");
        assert_eq!(password, "pw123");
    }
}
