// UI layer: maps a parsed `Command` onto one API client operation and
// renders the result. Prompts go through `dialoguer`, the in-flight
// spinner through `indicatif`, both on stderr so stdout stays clean.
// Colour is only applied when the stream is a terminal.

use crate::api::{ApiClient, Credentials, Outcome};
use crate::cli::Command;
use crate::error::ClientError;
use crate::session::SessionStore;
use crate::transport::Transport;
use anyhow::Result;
use crossterm::style::{style, Color, Stylize};
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Display;
use std::io::IsTerminal;
use std::time::Duration;

/// Run one command against the service and return what it produced.
///
/// The session is loaded first; commands other than register/login
/// fail with `NotLoggedIn` before any prompt or request when it holds
/// no token.
pub fn run<T: Transport>(
    command: Command,
    api: &ApiClient<T>,
    store: &dyn SessionStore,
) -> Result<Outcome> {
    let mut session = store.load()?;
    if command.requires_login() {
        session.require_token()?;
    }

    let outcome = match command {
        Command::Register { username, password } => {
            let creds = credentials(username, password)?;
            with_spinner("Registering...", || api.register(&creds))
        }
        Command::Login { username, password } => {
            let creds = credentials(username, password)?;
            with_spinner("Logging in...", || api.login(&creds, &mut session, store))
        }
        Command::Newroom { roomname, nickname } => with_spinner("Creating room...", || {
            api.newroom(&session, &roomname, nickname.as_deref())
        }),
        Command::Subscribe { roomname, nickname } => with_spinner("Joining room...", || {
            api.subscribe(&session, &roomname, nickname.as_deref())
        }),
        Command::Publish { roomname, message } => with_spinner("Sending...", || {
            api.publish(&session, &roomname, &message)
        }),
        Command::Room { roomname } => {
            with_spinner("Loading history...", || api.room(&session, &roomname))
        }
    }?;
    Ok(outcome)
}

/// Print a successful outcome on stdout.
pub fn report(outcome: &Outcome) {
    println!("{}", render_outcome(outcome, std::io::stdout().is_terminal()));
}

/// Print a failure on stderr.
pub fn report_error(err: &anyhow::Error) {
    eprintln!("{}", render_error(err, std::io::stderr().is_terminal()));
}

/// Outcome text, coloured only when `colored` is set.
pub fn render_outcome(outcome: &Outcome, colored: bool) -> String {
    match outcome {
        // Message text is shown as the server stored it
        Outcome::History(messages) if !messages.is_empty() => outcome.to_string(),
        _ => paint(outcome, Color::Green, colored),
    }
}

/// Error text, coloured only when `colored` is set.
pub fn render_error(err: &anyhow::Error, colored: bool) -> String {
    let color = match err.downcast_ref::<ClientError>() {
        Some(ClientError::Unavailable | ClientError::NotLoggedIn) => Color::Yellow,
        _ => Color::Red,
    };
    paint(err, color, colored)
}

fn paint(text: impl Display, color: Color, colored: bool) -> String {
    if colored {
        style(text).with(color).to_string()
    } else {
        text.to_string()
    }
}

fn credentials(username: String, password: Option<String>) -> Result<Credentials> {
    let password = match password {
        Some(password) => password,
        // `Password` hides input in the terminal
        None => Password::new().with_prompt("Password").interact()?,
    };
    Ok(Credentials::new(username, password))
}

fn with_spinner<R>(message: &'static str, f: impl FnOnce() -> R) -> R {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let out = f();
    spinner.finish_and_clear();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::session::{MemorySessionStore, Session};
    use crate::transport::{Endpoint, RawResponse};
    use std::cell::RefCell;

    struct Canned {
        response: RawResponse,
        calls: RefCell<Vec<Endpoint>>,
    }

    impl Transport for Canned {
        fn post_json(
            &self,
            endpoint: Endpoint,
            _body: &serde_json::Value,
        ) -> Result<RawResponse, TransportError> {
            self.calls.borrow_mut().push(endpoint);
            Ok(self.response.clone())
        }
    }

    fn client(status: u16, body: &str) -> ApiClient<Canned> {
        ApiClient::new(Canned {
            response: RawResponse::new(status, body),
            calls: RefCell::new(Vec::new()),
        })
    }

    #[test]
    fn plain_rendering_has_no_escape_codes() {
        let published = Outcome::Published {
            truncated_to: Some(254),
        };
        assert_eq!(
            render_outcome(&published, false),
            "Message has been sent\nHowever, message was truncated to fit in 254 byte limit"
        );

        let err = anyhow::Error::new(ClientError::Rejected("no such room".into()));
        assert_eq!(render_error(&err, false), "no such room");

        let err = anyhow::Error::new(ClientError::Unavailable);
        assert!(!render_error(&err, false).contains('\u{1b}'));
    }

    #[test]
    fn coloured_rendering_keeps_the_text() {
        let err = anyhow::Error::new(ClientError::Rejected("no such room".into()));
        assert!(render_error(&err, true).contains("no such room"));
        assert!(render_outcome(&Outcome::LoggedIn, true).contains("Successfully logged in"));
    }

    #[test]
    fn history_is_never_coloured() {
        let history = Outcome::History(vec![crate::api::Message {
            sender: "ann".into(),
            text: "hi".into(),
        }]);
        assert_eq!(render_outcome(&history, true), "ann: hi");
    }

    #[test]
    fn room_without_login_sends_nothing() {
        let api = client(200, "{}");
        let store = MemorySessionStore::new();
        let err = run(
            Command::Room {
                roomname: "general".into(),
            },
            &api,
            &store,
        )
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ClientError>(),
            Some(ClientError::NotLoggedIn)
        ));
        assert!(api.transport().calls.borrow().is_empty());
    }

    #[test]
    fn login_dispatches_and_persists() {
        let api = client(200, r#"{"token":"abc123"}"#);
        let store = MemorySessionStore::new();
        let outcome = run(
            Command::Login {
                username: "ann".into(),
                password: Some("pw".into()),
            },
            &api,
            &store,
        )
        .unwrap();

        assert_eq!(outcome, Outcome::LoggedIn);
        assert_eq!(*api.transport().calls.borrow(), vec![Endpoint::Login]);
        assert_eq!(store.snapshot().unwrap().token.as_deref(), Some("abc123"));
    }

    #[test]
    fn each_command_hits_its_endpoint() {
        let session = Session {
            token: Some("t".into()),
        };
        let cases = [
            (
                Command::Newroom {
                    roomname: "r".into(),
                    nickname: None,
                },
                Endpoint::NewRoom,
            ),
            (
                Command::Subscribe {
                    roomname: "r".into(),
                    nickname: Some("n".into()),
                },
                Endpoint::Subscribe,
            ),
            (
                Command::Publish {
                    roomname: "r".into(),
                    message: "m".into(),
                },
                Endpoint::Publish,
            ),
            (
                Command::Room {
                    roomname: "r".into(),
                },
                Endpoint::Room,
            ),
            (
                Command::Register {
                    username: "u".into(),
                    password: Some("p".into()),
                },
                Endpoint::Register,
            ),
        ];

        for (command, endpoint) in cases {
            let api = client(200, r#"{"messages":[]}"#);
            let store = MemorySessionStore::with_session(session.clone());
            run(command, &api, &store).unwrap();
            assert_eq!(*api.transport().calls.borrow(), vec![endpoint]);
        }
    }
}
