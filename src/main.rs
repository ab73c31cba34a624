//! Cura chat terminal client
//!
//! Entry point: loads configuration, opens the history and runs the
//! line-oriented chat loop.

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::map_err_ignore)]
#![allow(clippy::manual_let_else)]

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use dotenvy::dotenv;
use futures::future::BoxFuture;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use cura_chat::config::AppConfig;
use cura_chat::error::ExchangeError;
use cura_chat::exchange::{Dispatch, ExchangeController, HttpReplyService, RejectReason};
use cura_chat::session::SessionStore;
use cura_chat::ui::terminal::HELP_TEXT;
use cura_chat::ui::{ChatView, Command, TerminalView};

type Controller = ExchangeController<TerminalView<std::io::Stdout>>;

/// The one request currently running.
struct InFlight {
    dispatch: Dispatch,
    reply: BoxFuture<'static, Result<String, ExchangeError>>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    // Initialize tracing (M-LOG-STRUCTURED); stderr keeps logs out of the transcript
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let config = AppConfig::load()?;

    info!(
        name: "client.config.loaded",
        base_url = %config.service.base_url,
        history = %config.storage.path.display(),
        ephemeral = config.storage.ephemeral,
        "Configuration loaded"
    );

    let service = HttpReplyService::new(&config.service.base_url, config.service.timeout())?;
    let sessions = SessionStore::open(config.storage.open());
    let mut controller = ExchangeController::new(sessions, Arc::new(service), TerminalView::stdout())
        .with_reply_delay(config.exchange.reply_delay());

    controller.refresh_history();
    controller.view_mut().notice("Cura: type a message, or /help for commands.");
    controller.view_mut().focus_input();

    run(&mut controller).await?;

    info!(name: "client.stopped", "Client stopped");
    Ok(())
}

async fn run(controller: &mut Controller) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight: Option<InFlight> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Command::parse(&line) {
                    Command::Quit => break,
                    command => {
                        if let Some(flight) = handle(controller, command) {
                            in_flight = Some(flight);
                        }
                    }
                }
            }
            result = wait(&mut in_flight) => {
                if let Some(flight) = in_flight.take() {
                    controller.complete(flight.dispatch, result);
                }
            }
        }
    }
    Ok(())
}

/// Resolves with the running request's result, or never if nothing runs.
async fn wait(in_flight: &mut Option<InFlight>) -> Result<String, ExchangeError> {
    match in_flight {
        Some(flight) => flight.reply.as_mut().await,
        None => std::future::pending().await,
    }
}

fn handle(controller: &mut Controller, command: Command) -> Option<InFlight> {
    let admitted = match command {
        Command::Say(text) => controller.begin_submit(&text),
        Command::Quick(action) => controller.begin_submit(action.message()),
        Command::Retry => controller.begin_retry(),
        Command::New => {
            controller.new_chat();
            return None;
        }
        Command::List => {
            controller.view_mut().print_history();
            controller.view_mut().focus_input();
            return None;
        }
        Command::Open(n) => {
            match controller.view().session_at(n) {
                Some(id) => {
                    controller.select_session(&id);
                }
                None => controller.view_mut().notice("No such chat, see /list"),
            }
            controller.view_mut().focus_input();
            return None;
        }
        Command::Delete(n) => {
            match controller.view().session_at(n) {
                Some(id) => {
                    controller.delete_session(&id);
                    controller.view_mut().notice("Chat deleted");
                }
                None => controller.view_mut().notice("No such chat, see /list"),
            }
            controller.view_mut().focus_input();
            return None;
        }
        Command::Dismiss => {
            controller.dismiss_error();
            controller.view_mut().focus_input();
            return None;
        }
        Command::Help => {
            controller.view_mut().notice(HELP_TEXT);
            controller.view_mut().focus_input();
            return None;
        }
        Command::Invalid(hint) => {
            controller.view_mut().notice(&hint);
            controller.view_mut().focus_input();
            return None;
        }
        Command::Quit => return None,
    };

    match admitted {
        Ok(dispatch) => {
            let reply = controller.request(&dispatch);
            Some(InFlight { dispatch, reply })
        }
        // Dropped while a reply is pending; the typing indicator is still up.
        Err(RejectReason::AwaitingReply | RejectReason::InputDisabled) => None,
        Err(RejectReason::NothingToRetry) => {
            controller.view_mut().notice("Nothing to retry");
            controller.view_mut().focus_input();
            None
        }
        Err(RejectReason::Empty) => {
            controller.view_mut().focus_input();
            None
        }
    }
}
