//! Session storage using the OS credential store.
//!
//! On Windows this uses DPAPI (via the `keyring` crate), on macOS Keychain,
//! and on Linux the Secret Service API. The logged-in user is kept as one
//! JSON blob under the `user` key.
//!
//! Headless machines without a secret service can supply the same JSON in
//! the `SUPERVIBE_USER` environment variable; it is read first and never
//! written.

use keyring::Entry;
use tracing::{info, warn};

use crate::error::{PosError, PosResult};
use crate::session::Session;

const SERVICE_NAME: &str = "supervibe-pos";

/// Credential key holding the logged-in user object.
pub const KEY_USER: &str = "user";

pub const ENV_USER: &str = "SUPERVIBE_USER";

// ---------------------------------------------------------------------------
// Low-level helpers
// ---------------------------------------------------------------------------

/// Retrieve a single credential from the OS keyring. Returns `None` when the
/// entry does not exist (or the platform returns a "not found" error).
pub fn get_credential(key: &str) -> Option<String> {
    let entry = match Entry::new(SERVICE_NAME, key) {
        Ok(e) => e,
        Err(e) => {
            warn!(key, error = %e, "keyring: failed to create entry");
            return None;
        }
    };
    match entry.get_password() {
        Ok(pw) => Some(pw),
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            warn!(key, error = %e, "keyring: failed to read credential");
            None
        }
    }
}

/// Store a credential in the OS keyring.
pub fn set_credential(key: &str, value: &str) -> PosResult<()> {
    let entry = Entry::new(SERVICE_NAME, key)?;
    entry.set_password(value)?;
    Ok(())
}

/// Delete a credential from the OS keyring. Silently succeeds if the entry
/// does not exist.
pub fn delete_credential(key: &str) -> PosResult<()> {
    let entry = Entry::new(SERVICE_NAME, key)?;
    match entry.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

// ---------------------------------------------------------------------------
// Session API
// ---------------------------------------------------------------------------

fn stored_user_json() -> Option<String> {
    std::env::var(ENV_USER)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| get_credential(KEY_USER))
}

/// Load the current session. No stored user means the caller must send the
/// user to login.
pub fn load_session() -> PosResult<Session> {
    let raw = stored_user_json().ok_or(PosError::SessionRequired)?;
    Session::from_json(&raw)
}

/// Persist the user object returned by a successful login.
pub fn save_user(user: &serde_json::Value) -> PosResult<()> {
    set_credential(KEY_USER, &user.to_string())?;
    info!("user session stored");
    Ok(())
}

/// Forget the logged-in user.
pub fn clear_session() -> PosResult<()> {
    info!("clearing stored user session");
    delete_credential(KEY_USER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn env_user_takes_priority() {
        std::env::set_var(
            ENV_USER,
            r#"{"id":12,"role":"MANAGER","access_token":"env-token"}"#,
        );
        let session = load_session();
        std::env::remove_var(ENV_USER);

        let session = session.expect("env session should load");
        assert_eq!(session.id(), 12);
        assert_eq!(session.role(), "MANAGER");
    }

    #[test]
    #[serial]
    fn env_user_without_token_still_loads() {
        std::env::set_var(ENV_USER, r#"{"id":12,"role":"customer","access_token":null}"#);
        let result = load_session();
        std::env::remove_var(ENV_USER);

        let session = result.expect("tokenless user should load");
        assert_eq!(session.access_token(), None);
        assert!(session.token_notice().is_some());
    }

    #[test]
    #[serial]
    fn malformed_env_user_requires_login() {
        std::env::set_var(ENV_USER, "{not json");
        let result = load_session();
        std::env::remove_var(ENV_USER);

        assert!(matches!(result, Err(PosError::SessionRequired)));
    }
}
