//! The logged-in user as stored under the `user` credential key.

use std::fmt;

use serde::Deserialize;
use tracing::warn;
use zeroize::Zeroizing;

use crate::error::{PosError, PosResult};
use crate::notify::Notice;

/// Role value the backend uses for shoppers. Every other role is staff.
pub const CUSTOMER_ROLE: &str = "customer";

#[derive(Deserialize)]
struct StoredUser {
    id: i64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
}

/// Read-only view of the authenticated user.
pub struct Session {
    id: i64,
    name: Option<String>,
    email: Option<String>,
    role: String,
    access_token: Option<Zeroizing<String>>,
}

impl Session {
    /// Parse the stored user object. Bad JSON or a missing id means the
    /// user has to log in again. A missing or blank token is kept as `None`:
    /// the backend does not always issue one, and requests then go out
    /// unauthenticated.
    pub fn from_json(raw: &str) -> PosResult<Self> {
        let stored: StoredUser = serde_json::from_str(raw).map_err(|e| {
            warn!(error = %e, "stored user is not valid JSON");
            PosError::SessionRequired
        })?;

        let token = stored
            .access_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        if token.is_none() {
            warn!(user_id = stored.id, "stored user has no access token");
        }

        Ok(Self {
            id: stored.id,
            name: stored.name,
            email: stored.email,
            role: stored.role.unwrap_or_default(),
            access_token: token.map(Zeroizing::new),
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn is_customer(&self) -> bool {
        self.role == CUSTOMER_ROLE
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().map(String::as_str)
    }

    /// Warning to show when the user has no token to send.
    pub fn token_notice(&self) -> Option<Notice> {
        self.access_token
            .is_none()
            .then(|| Notice::error("Authentication token missing. Please log in again."))
    }

    /// Name for greetings, falling back to the email and then the id.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| format!("user #{}", self.id))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("role", &self.role)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn test_session(role: &str, id: i64) -> Session {
    Session::from_json(
        &serde_json::json!({
            "id": id,
            "name": "Test User",
            "role": role,
            "access_token": "tok-123",
        })
        .to_string(),
    )
    .expect("test session should parse")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_customer_session() {
        let s = Session::from_json(
            r#"{"id":7,"name":"Rana","role":"customer","email":"r@x.jo","access_token":"abc"}"#,
        )
        .unwrap();
        assert_eq!(s.id(), 7);
        assert!(s.is_customer());
        assert_eq!(s.access_token(), Some("abc"));
        assert!(s.token_notice().is_none());
        assert_eq!(s.display_name(), "Rana");
    }

    #[test]
    fn staff_roles_are_not_customers() {
        assert!(!test_session("CASHIER", 3).is_customer());
        assert!(!test_session("", 3).is_customer());
    }

    #[test]
    fn tokenless_user_is_kept_with_warning() {
        let s = Session::from_json(
            r#"{"id":1,"name":"rana","role":"customer","access_token":null,"token_type":null}"#,
        )
        .unwrap();
        assert_eq!(s.id(), 1);
        assert_eq!(s.access_token(), None);
        assert_eq!(
            s.token_notice(),
            Some(Notice::error("Authentication token missing. Please log in again."))
        );

        let blank = Session::from_json(r#"{"id":1,"access_token":"   "}"#).unwrap();
        assert_eq!(blank.access_token(), None);
    }

    #[test]
    fn missing_id_requires_login() {
        let err = Session::from_json(r#"{"name":"rana","access_token":"abc"}"#).unwrap_err();
        assert!(matches!(err, PosError::SessionRequired));
    }

    #[test]
    fn garbage_requires_login() {
        let err = Session::from_json("not json").unwrap_err();
        assert!(matches!(err, PosError::SessionRequired));
    }

    #[test]
    fn debug_redacts_token() {
        let rendered = format!("{:?}", test_session("customer", 1));
        assert!(!rendered.contains("tok-123"));
        assert!(rendered.contains("<redacted>"));
    }
}
