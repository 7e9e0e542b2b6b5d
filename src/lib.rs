// Library root
// -----------
// This crate exposes the client as a library; the binary (`main.rs`) only
// parses the command line, sets up logging and configuration, and hands
// off to `ui::run`.
//
// Module responsibilities:
// - `session`: load/save of the login token between invocations.
// - `truncate`: byte-budget shortening of outbound message text.
// - `transport`: one JSON POST per call, reqwest-backed.
// - `api`: one operation per server capability and reply interpretation.
// - `error`: the error taxonomy shown to the user.
// - `config`: TOML configuration with defaults.
// - `cli`/`ui`: command line surface and its dispatch onto `api`.
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod session;
pub mod transport;
pub mod truncate;
pub mod ui;

pub use api::{ApiClient, Credentials, Message, Outcome};
pub use error::ClientError;
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
pub use transport::{Endpoint, HttpTransport, RawResponse, Transport};
pub use truncate::{truncate, DEFAULT_MESSAGE_LIMIT};
