use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{ComposeFields, Controller, EventKind, EventSource, RelayClient};

mod config;
mod view;

use view::TerminalView;

#[derive(Parser, Debug)]
#[command(about = "Terminal client for the relay-backed messenger")]
struct Cli {
    /// Relay base URL; overrides RELAY_SERVER_URL and console.toml.
    #[arg(long)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a new identity with the relay.
    Register { name: String },
    /// List every registered identity.
    Clients,
    /// Derive the shared key for a pair of identities.
    SharedKey {
        client_a: String,
        client_b: String,
    },
    /// Encrypt and send a message.
    Send {
        sender: String,
        receiver: String,
        /// Message body; multiple words are joined with spaces.
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },
    /// Fetch and decrypt a user's inbox.
    Inbox { user: String },
    /// Delete every stored message on the relay.
    ClearMessages,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let cli = Cli::parse();

    let mut settings = config::load_settings();
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }

    let mut view = TerminalView::default();
    let event = match &cli.command {
        Command::Register { name } => {
            view.register_name = name.clone();
            Some((EventSource::RegisterForm, EventKind::Submit))
        }
        Command::Clients => Some((EventSource::Bootstrap, EventKind::Startup)),
        Command::SharedKey { client_a, client_b } => {
            view.key_pair = (client_a.clone(), client_b.clone());
            Some((EventSource::SharedKeyForm, EventKind::Submit))
        }
        Command::Send {
            sender,
            receiver,
            message,
        } => {
            view.compose = ComposeFields {
                sender: sender.clone(),
                receiver: receiver.clone(),
                message: message.join(" "),
            };
            Some((EventSource::ComposeForm, EventKind::Submit))
        }
        Command::Inbox { user } => {
            view.inbox_user = user.clone();
            Some((EventSource::InboxForm, EventKind::Submit))
        }
        Command::ClearMessages => None,
    };

    let mut controller = Controller::new(RelayClient::new(settings.server_url), view);
    match event {
        Some((source, kind)) => {
            controller.fire(source, kind).await;
        }
        None => controller.clear_messages().await,
    }

    Ok(())
}
