// API client module: builds one request per server capability, sends it
// through a `Transport` and turns the reply into an `Outcome` or a
// `ClientError`. It is synchronous; each call issues exactly one request.

use crate::error::{ClientError, REJECTED_FALLBACK};
use crate::session::{Session, SessionStore};
use crate::transport::{Endpoint, RawResponse, Transport};
use crate::truncate::{truncate, was_truncated, DEFAULT_MESSAGE_LIMIT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Client for the room messaging service. Holds the transport and the
/// byte budget applied to published messages.
pub struct ApiClient<T> {
    transport: T,
    message_limit: usize,
}

/// Register/login payload. Never persisted.
#[derive(Serialize, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body for newroom and subscribe. `username` is the optional nickname;
/// `null` lets the server fall back to the account name.
#[derive(Serialize, Debug)]
struct MembershipRequest<'a> {
    roomname: &'a str,
    username: Option<&'a str>,
    token: &'a str,
}

#[derive(Serialize, Debug)]
struct RoomRequest<'a> {
    roomname: &'a str,
    token: &'a str,
}

#[derive(Serialize, Debug)]
struct PublishRequest<'a> {
    roomname: &'a str,
    message: &'a str,
    token: &'a str,
}

#[derive(Deserialize, Debug)]
struct LoginResponse {
    token: String,
}

#[derive(Deserialize, Debug, Default)]
struct HistoryResponse {
    #[serde(default)]
    messages: Vec<Message>,
}

#[derive(Deserialize, Debug)]
struct ErrorResponse {
    message: Option<String>,
}

/// A message as returned by the server.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub text: String,
}

/// Three-way reading of an HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    ClientError,
    Other,
}

impl StatusClass {
    pub fn of(status: u16) -> Self {
        match status {
            200 => StatusClass::Success,
            400 => StatusClass::ClientError,
            _ => StatusClass::Other,
        }
    }
}

/// Successful result of an operation, rendered for the user by `Display`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Registered,
    LoggedIn,
    RoomCreated { roomname: String },
    History(Vec<Message>),
    /// `truncated_to` carries the byte limit when the text was shortened.
    Published { truncated_to: Option<usize> },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Registered => write!(f, "Successfully registered"),
            Outcome::LoggedIn => write!(f, "Successfully logged in"),
            Outcome::RoomCreated { roomname } => write!(
                f,
                "Room has been created. Use \"room {roomname}\" command to enter it"
            ),
            Outcome::History(messages) if messages.is_empty() => {
                write!(f, "Room history is empty. Write first message")
            }
            Outcome::History(messages) => {
                for (i, message) in messages.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}: {}", message.sender, message.text)?;
                }
                Ok(())
            }
            Outcome::Published { truncated_to: None } => write!(f, "Message has been sent"),
            Outcome::Published {
                truncated_to: Some(limit),
            } => write!(
                f,
                "Message has been sent\nHowever, message was truncated to fit in {limit} byte limit"
            ),
        }
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        ApiClient {
            transport,
            message_limit: DEFAULT_MESSAGE_LIMIT,
        }
    }

    /// Override the byte budget for published messages.
    pub fn with_message_limit(mut self, limit: usize) -> Self {
        self.message_limit = limit;
        self
    }

    pub fn message_limit(&self) -> usize {
        self.message_limit
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn send<B: Serialize>(&self, endpoint: Endpoint, body: &B) -> Result<RawResponse, ClientError> {
        let body = serde_json::to_value(body).map_err(|e| {
            tracing::warn!(error = %e, "failed to encode request body");
            ClientError::Unavailable
        })?;
        let res = self.transport.post_json(endpoint, &body)?;
        tracing::debug!(endpoint = endpoint.path(), status = res.status, "request finished");
        Ok(res)
    }

    /// Create an account. A 400 means the name is taken.
    pub fn register(&self, credentials: &Credentials) -> Result<Outcome, ClientError> {
        let res = self.send(Endpoint::Register, credentials)?;
        match StatusClass::of(res.status) {
            StatusClass::Success => Ok(Outcome::Registered),
            StatusClass::ClientError => Err(ClientError::UsernameOccupied),
            StatusClass::Other => Err(unavailable(&res)),
        }
    }

    /// Log in and persist the issued token through `store`.
    pub fn login(
        &self,
        credentials: &Credentials,
        session: &mut Session,
        store: &dyn SessionStore,
    ) -> Result<Outcome, ClientError> {
        let res = self.send(Endpoint::Login, credentials)?;
        match StatusClass::of(res.status) {
            StatusClass::Success => {
                let parsed: LoginResponse = serde_json::from_str(&res.body).map_err(|e| {
                    tracing::warn!(error = %e, "login response carries no token");
                    ClientError::Unavailable
                })?;
                // Only a persisted token reaches the caller's session
                let updated = Session {
                    token: Some(parsed.token),
                };
                store.save(&updated)?;
                *session = updated;
                tracing::info!(username = %credentials.username, "logged in");
                Ok(Outcome::LoggedIn)
            }
            StatusClass::ClientError => Err(rejected(&res)),
            StatusClass::Other => Err(unavailable(&res)),
        }
    }

    /// Create a room. The server's 400 reasons are not surfaced.
    pub fn newroom(
        &self,
        session: &Session,
        roomname: &str,
        nickname: Option<&str>,
    ) -> Result<Outcome, ClientError> {
        let token = session.require_token()?;
        let res = self.send(
            Endpoint::NewRoom,
            &MembershipRequest {
                roomname,
                username: nickname,
                token,
            },
        )?;
        match StatusClass::of(res.status) {
            StatusClass::Success => Ok(Outcome::RoomCreated {
                roomname: roomname.to_string(),
            }),
            StatusClass::ClientError | StatusClass::Other => Err(unavailable(&res)),
        }
    }

    /// Join a room and return its history.
    pub fn subscribe(
        &self,
        session: &Session,
        roomname: &str,
        nickname: Option<&str>,
    ) -> Result<Outcome, ClientError> {
        let token = session.require_token()?;
        let res = self.send(
            Endpoint::Subscribe,
            &MembershipRequest {
                roomname,
                username: nickname,
                token,
            },
        )?;
        history(&res)
    }

    /// Fetch the history of a room already joined.
    pub fn room(&self, session: &Session, roomname: &str) -> Result<Outcome, ClientError> {
        let token = session.require_token()?;
        let res = self.send(Endpoint::Room, &RoomRequest { roomname, token })?;
        history(&res)
    }

    /// Post a message, shrinking it to the byte budget first.
    pub fn publish(
        &self,
        session: &Session,
        roomname: &str,
        message: &str,
    ) -> Result<Outcome, ClientError> {
        let token = session.require_token()?;
        let text = truncate(message, self.message_limit);
        let truncated = was_truncated(message, &text);
        if truncated {
            tracing::debug!(
                from = message.len(),
                to = text.len(),
                "message truncated before sending"
            );
        }

        let res = self.send(
            Endpoint::Publish,
            &PublishRequest {
                roomname,
                message: &text,
                token,
            },
        )?;
        match StatusClass::of(res.status) {
            StatusClass::Success => Ok(Outcome::Published {
                truncated_to: truncated.then_some(self.message_limit),
            }),
            StatusClass::ClientError => Err(rejected(&res)),
            StatusClass::Other => Err(unavailable(&res)),
        }
    }
}

fn history(res: &RawResponse) -> Result<Outcome, ClientError> {
    match StatusClass::of(res.status) {
        StatusClass::Success => {
            let parsed: HistoryResponse = serde_json::from_str(&res.body).map_err(|e| {
                tracing::warn!(error = %e, "malformed history response");
                ClientError::Unavailable
            })?;
            Ok(Outcome::History(parsed.messages))
        }
        StatusClass::ClientError => Err(rejected(res)),
        StatusClass::Other => Err(unavailable(res)),
    }
}

/// Server-supplied message of a 400 reply, or the fixed fallback.
fn rejected(res: &RawResponse) -> ClientError {
    let message = serde_json::from_str::<ErrorResponse>(&res.body)
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| REJECTED_FALLBACK.to_string());
    ClientError::Rejected(message)
}

fn unavailable(res: &RawResponse) -> ClientError {
    tracing::debug!(status = res.status, "unclassified response");
    ClientError::Unavailable
}
