// Command line surface. Each subcommand maps to exactly one API client
// operation; the mapping itself lives in `ui::run`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "roomchat")]
#[command(author, version, about = "Client for a room-based messaging service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (default: <config dir>/roomchat/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Session file holding the login token
    #[arg(long, global = true, env = "ROOMCHAT_SESSION")]
    pub session: Option<PathBuf>,

    /// Base URL of the messaging service
    #[arg(long, global = true, env = "ROOMCHAT_BASE_URL")]
    pub base_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Register a user to join rooms and publish messages
    Register {
        username: String,
        /// Prompted for when omitted
        password: Option<String>,
    },

    /// Log in and store the session token
    Login {
        username: String,
        /// Prompted for when omitted
        password: Option<String>,
    },

    /// Create a new room
    Newroom {
        roomname: String,
        /// Name other users will see (default: your username)
        nickname: Option<String>,
    },

    /// Join a room and show its history
    Subscribe {
        roomname: String,
        /// Name other users will see (default: your username)
        nickname: Option<String>,
    },

    /// Send a message to a room
    Publish { roomname: String, message: String },

    /// Show the message history of a room
    Room { roomname: String },
}

impl Command {
    /// Whether the command needs a stored token.
    pub fn requires_login(&self) -> bool {
        !matches!(self, Command::Register { .. } | Command::Login { .. })
    }
}
