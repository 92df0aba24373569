//! mdpad: collaborative markdown pad for the terminal.
//!
//! Lines typed on stdin are appended to the shared document; the rendered
//! preview is written to an HTML file that any browser can keep open.
//! Lines starting with `:` are commands (`:help` lists them).

mod app;
mod cli;
mod clipboard;
mod commands;
mod prefs;

use std::error::Error;

use clap::Parser;
use log::info;
use mdpad_collab::{EngineEvent, MemoryEngine, SyncEngine, WsEngine};
use mdpad_core::{Location, PresenceRoster, SessionId};

use app::App;
use cli::Cli;
use clipboard::Osc52;
use prefs::Preferences;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let target = cli.target()?;
    let prefs = Preferences::load(cli.prefs.clone().or_else(prefs::default_path));
    match prefs.path() {
        Some(path) => info!("Preferences: {}", path.display()),
        None => info!("No config directory, preferences are not saved"),
    }

    if target.created {
        println!(
            "Created a new document: {}",
            target.origin.shareable_link(&target.id)
        );
    }

    if cli.offline {
        info!("Offline mode, nothing is shared");
        let engine = MemoryEngine::new();
        engine.remote().auto_reply(vec![
            EngineEvent::Connected,
            EngineEvent::Users(PresenceRoster::new()),
        ]);
        start(&cli, target.origin, target.id, engine, prefs).await;
    } else {
        start(&cli, target.origin, target.id, WsEngine::new(), prefs).await;
    }
    Ok(())
}

async fn start<E: SyncEngine + Clone>(
    cli: &Cli,
    origin: Location,
    id: SessionId,
    engine: E,
    prefs: Preferences,
) {
    let app = App::new(
        origin,
        engine,
        prefs,
        cli.preview.clone(),
        Box::new(Osc52::stdout()),
    );
    info!(
        "Preview: {} ({} theme)",
        app.preview_path().display(),
        if app.is_dark() { "dark" } else { "light" }
    );
    app.run(id).await;
}
