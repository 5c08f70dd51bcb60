//! Account creation, login and logout against the `/api/v1/auth` endpoints.

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::api::{self, ApiTransport, API_PREFIX};
use crate::error::{PosError, PosResult};
use crate::session::Session;
use crate::storage;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
    role: &'a str,
}

/// Authenticate and return the user object exactly as the server sent it.
/// The backend may answer without an access token; the session then
/// carries none and [`Session::token_notice`] reports it.
pub async fn request_login<A: ApiTransport>(
    api: &A,
    email: &str,
    password: &str,
    role: &str,
) -> PosResult<(Session, Value)> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(PosError::validation("Email and password are required"));
    }

    let body = serde_json::to_value(LoginRequest {
        email,
        password,
        role,
    })?;
    let user = api::post_json(api, &format!("{API_PREFIX}/auth/login"), body, "Login failed")
        .await?;

    let session = Session::from_json(&user.to_string()).map_err(|_| {
        warn!(email, "login response did not describe a user");
        PosError::Decode("login response has no user id".into())
    })?;
    info!(
        user_id = session.id(),
        role = %session.role(),
        has_token = session.access_token().is_some(),
        "login succeeded"
    );
    Ok((session, user))
}

/// Log in and store the user in the credential store.
pub async fn login<A: ApiTransport>(
    api: &A,
    email: &str,
    password: &str,
    role: &str,
) -> PosResult<Session> {
    let (session, user) = request_login(api, email, password, role).await?;
    storage::save_user(&user)?;
    Ok(session)
}

pub fn logout() -> PosResult<()> {
    storage::clear_session()
}

// ---------------------------------------------------------------------------
// Signup
// ---------------------------------------------------------------------------

/// Which account table a signup goes to, with the fields only that kind has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountKind {
    Customer {
        membership: bool,
    },
    Employee {
        role: String,
        date_of_employment: String,
    },
}

impl AccountKind {
    fn endpoint(&self) -> String {
        let segment = match self {
            AccountKind::Customer { .. } => "customer",
            AccountKind::Employee { .. } => "employee",
        };
        format!("{API_PREFIX}/auth/signup/{segment}")
    }
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: Zeroizing<String>,
    pub age: u32,
    pub kind: AccountKind,
}

#[derive(Serialize)]
struct SignupRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    age: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    membership: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    #[serde(rename = "dateOfEmployment", skip_serializing_if = "Option::is_none")]
    date_of_employment: Option<&'a str>,
}

/// Create an account. The backend does not log the new user in; the
/// returned user object is only used for the confirmation.
///
/// Password strength and duplicate emails are checked by the server and
/// come back as its `detail` message.
pub async fn signup<A: ApiTransport>(api: &A, account: &NewAccount) -> PosResult<Value> {
    let name = account.name.trim();
    let email = account.email.trim();
    if name.is_empty() || email.is_empty() || account.password.is_empty() {
        return Err(PosError::validation("Name, email and password are required"));
    }
    if !(1..120).contains(&account.age) {
        return Err(PosError::validation("Age must be between 1 and 119"));
    }

    let (membership, role, date_of_employment) = match &account.kind {
        AccountKind::Customer { membership } => (Some(*membership), None, None),
        AccountKind::Employee {
            role,
            date_of_employment,
        } => (None, Some(role.trim()), Some(date_of_employment.trim())),
    };
    let body = serde_json::to_value(SignupRequest {
        name,
        email,
        password: account.password.as_str(),
        age: account.age,
        membership,
        role,
        date_of_employment,
    })?;

    let created = api::post_json(api, &account.kind.endpoint(), body, "Signup failed").await?;
    let id = created.get("id").and_then(Value::as_i64);
    info!(id, endpoint = %account.kind.endpoint(), "account created");
    Ok(created)
}
