//! Entry point for the cheese drop bot.
//!
//! The runner speaks a JSON-lines protocol with a chat gateway: inbound
//! messages, reactions, and commands arrive on stdin; posts and reaction
//! updates leave on stdout. Logs go to stderr.
//!
//! # Architecture
//!
//! ```text
//! stdin --> CheeseRunner --+--> DropCoordinator --+
//!                          |         ^            |
//!                          |    ReactionHub       +--> LineBridge --> stdout
//!                          |                      |
//!                          +--> CommandHandler ---+
//! ```
//!
//! Everything runs on one thread. Drops and commands are local tasks that
//! interleave at their await points.

mod bridge;
mod config;
mod error;
mod logging;
mod protocol;
mod runner;

use std::sync::Arc;

use cheese_core::{AdminPolicy, CommandHandler, DropCoordinator, ReactionHub, Tunables};
use cheese_ledger::Ledger;
use tokio::io::BufReader;
use tokio::sync::Mutex;
use tokio::task::LocalSet;
use tracing::info;

use crate::bridge::LineBridge;
use crate::config::RunnerConfig;
use crate::runner::CheeseRunner;

/// Application entry point.
///
/// Loads configuration, opens the ledger, wires the engine to the line
/// bridge, and serves until stdin closes.
///
/// # Errors
///
/// Returns an error if logging cannot be installed or a bridge stream
/// fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let verbosity = logging::init()?;

    let runner_config = RunnerConfig::from_env();
    let config = runner_config.load_engine_config();
    if !logging::filter_from_env() {
        verbosity(config.debug);
    }

    info!(
        config_path = %runner_config.config_path.display(),
        scores_file = %config.scores_file.display(),
        chance_weight = config.chance_weight().percent(),
        admins = config.admin_ids().len(),
        "cheese-runner starting"
    );

    let tunables = Tunables::from_config(&config).shared();
    let ledger = Arc::new(Mutex::new(Ledger::open(&config.scores_file)));
    info!(collectors = ledger.lock().await.len(), "ledger loaded");

    let (surface, frames) = LineBridge::new();
    let policy =
        AdminPolicy::new(config.admin_ids(), Arc::clone(&tunables)).with_verbosity_hook(verbosity);
    let commands = CommandHandler::new(surface.clone(), Arc::clone(&ledger), policy);
    let coordinator = DropCoordinator::new(
        surface.clone(),
        ReactionHub::new(),
        ledger,
        tunables,
        &config,
    );
    let runner = CheeseRunner::new(surface, coordinator, commands);

    let local = LocalSet::new();
    local
        .run_until(async move {
            let writer = tokio::task::spawn_local(bridge::write_frames(frames, tokio::io::stdout()));
            let served = runner.run(BufReader::new(tokio::io::stdin())).await;
            // Dropping the runner releases the last bridge handles and ends
            // the writer.
            writer.await??;
            served
        })
        .await?;

    info!("cheese-runner stopped");
    Ok(())
}
