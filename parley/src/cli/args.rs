//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::reply::DEFAULT_SERVER_URL;
use crate::server::DEFAULT_CHAT_MODEL;

/// Parley - chat with an AI reply server from your terminal
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the reply server
    #[arg(short, long, default_value = DEFAULT_SERVER_URL)]
    pub server: String,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive chat session (the default)
    Chat,

    /// Send a single message and print the reply
    Send {
        /// Message to send
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },

    /// Run the reply server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Gemini API key (falls back to the GEMINI_API_KEY env var)
        #[arg(long)]
        api_key: Option<String>,

        /// Chat model to generate replies with
        #[arg(short, long, default_value = DEFAULT_CHAT_MODEL)]
        model: String,
    },
}
