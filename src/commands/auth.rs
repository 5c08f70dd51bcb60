use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use zeroize::Zeroizing;

use crate::api::ApiTransport;
use crate::auth::{self, NewAccount};
use crate::error::PosResult;
use crate::notify::Notice;
use crate::session::Session;
use crate::storage;

/// Log in and store the session. A session without a token still logs in,
/// followed by the token error notice.
pub async fn login<A: ApiTransport>(
    api: &A,
    email: &str,
    password: &str,
    role: &str,
) -> PosResult<Vec<Notice>> {
    let session = auth::login(api, email, password, role).await?;
    let mut notices = vec![Notice::success(format!(
        "Welcome, {}",
        session.display_name()
    ))];
    notices.extend(session.token_notice());
    Ok(notices)
}

pub async fn signup<A: ApiTransport>(api: &A, account: &NewAccount) -> Notice {
    match auth::signup(api, account).await {
        Ok(_) => Notice::success(format!(
            "Account created for {}. You can now log in.",
            account.name.trim()
        )),
        Err(e) => Notice::from_error(&e, "Signup failed"),
    }
}

pub fn logout() -> PosResult<Notice> {
    auth::logout()?;
    Ok(Notice::info("Logged out"))
}

pub fn whoami() -> PosResult<String> {
    Ok(describe(&storage::load_session()?))
}

pub fn describe(session: &Session) -> String {
    format!(
        "{} (role: {}, id: {})",
        session.display_name(),
        session.role(),
        session.id()
    )
}

// ---------------------------------------------------------------------------
// Password prompt
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum KeyOutcome {
    Continue,
    Done,
    Cancelled,
}

fn apply_key(buf: &mut String, key: &KeyEvent) -> KeyOutcome {
    if key.kind == KeyEventKind::Release {
        return KeyOutcome::Continue;
    }
    match key.code {
        KeyCode::Enter => KeyOutcome::Done,
        KeyCode::Esc => KeyOutcome::Cancelled,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            KeyOutcome::Cancelled
        }
        KeyCode::Backspace => {
            buf.pop();
            KeyOutcome::Continue
        }
        KeyCode::Char(c) => {
            buf.push(c);
            KeyOutcome::Continue
        }
        _ => KeyOutcome::Continue,
    }
}

/// Read a password without echoing it. The prompt goes to stderr. When
/// stdin is not a terminal, one line is read as is.
pub fn read_password(prompt: &str) -> io::Result<Zeroizing<String>> {
    let mut stderr = io::stderr();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;

    let mut buf = Zeroizing::new(String::new());
    if !io::stdin().is_terminal() {
        io::stdin().lock().read_line(&mut buf)?;
        let len = buf.trim_end_matches(['\r', '\n']).len();
        buf.truncate(len);
        return Ok(buf);
    }

    terminal::enable_raw_mode()?;
    let outcome = loop {
        match event::read() {
            Ok(Event::Key(key)) => match apply_key(&mut buf, &key) {
                KeyOutcome::Continue => {}
                done => break Ok(done),
            },
            Ok(_) => {}
            Err(e) => break Err(e),
        }
    };
    terminal::disable_raw_mode()?;
    writeln!(stderr)?;

    match outcome? {
        KeyOutcome::Cancelled => Err(io::Error::new(
            io::ErrorKind::Interrupted,
            "password entry cancelled",
        )),
        _ => Ok(buf),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeApi;
    use crate::auth::AccountKind;
    use crate::session::test_session;
    use serde_json::json;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn account() -> NewAccount {
        NewAccount {
            name: "Rana".into(),
            email: "rana@x.jo".into(),
            password: Zeroizing::new("Str0ng!pass".into()),
            age: 29,
            kind: AccountKind::Customer { membership: false },
        }
    }

    #[test]
    fn describe_shows_role_and_id() {
        let session = test_session("MANAGER", 4);
        assert_eq!(describe(&session), "Test User (role: MANAGER, id: 4)");
    }

    #[test]
    fn typed_keys_build_the_password() {
        let mut buf = String::new();
        for c in "pa#x".chars() {
            assert_eq!(apply_key(&mut buf, &press(KeyCode::Char(c))), KeyOutcome::Continue);
        }
        apply_key(&mut buf, &press(KeyCode::Backspace));
        apply_key(&mut buf, &press(KeyCode::Left));
        assert_eq!(buf, "pa#");
        assert_eq!(apply_key(&mut buf, &press(KeyCode::Enter)), KeyOutcome::Done);
    }

    #[test]
    fn key_release_is_ignored() {
        let mut buf = String::new();
        let mut key = press(KeyCode::Char('a'));
        key.kind = KeyEventKind::Release;
        apply_key(&mut buf, &key);
        assert!(buf.is_empty());
    }

    #[test]
    fn ctrl_c_and_escape_cancel() {
        let mut buf = String::from("abc");
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(apply_key(&mut buf, &ctrl_c), KeyOutcome::Cancelled);
        assert_eq!(buf, "abc");
        assert_eq!(apply_key(&mut buf, &press(KeyCode::Esc)), KeyOutcome::Cancelled);
    }

    #[tokio::test]
    async fn signup_confirms_account() {
        let api = FakeApi::new().reply(201, json!({ "id": 40, "name": "Rana" }));
        let notice = signup(&api, &account()).await;
        assert_eq!(
            notice.to_string(),
            "[ok] Account created for Rana. You can now log in."
        );
    }

    #[tokio::test]
    async fn signup_shows_backend_detail() {
        let api = FakeApi::new().reply(
            400,
            json!({ "detail": "Password must contain at least one special character" }),
        );
        let notice = signup(&api, &account()).await;
        assert_eq!(
            notice.to_string(),
            "[error] Error: Password must contain at least one special character"
        );
    }
}
