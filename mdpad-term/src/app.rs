//! The editor flow.
//!
//! ```text
//!   stdin line ──► Command ──► SessionView (model, presence)
//!                                  │            └──► RenderPipeline.input
//!   engine event ──► SessionView.dispatch
//!   reconnect deadline ──► SessionView.poll_reconnect
//!   render deadline ──► RenderPipeline.poll ──► preview file
//! ```
//!
//! Everything runs on one task; the loop sleeps until whichever of the
//! four sources is ready first.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use mdpad_collab::{ConnectionState, ReconnectPolicy, SessionObserver, SessionView, SyncEngine};
use mdpad_core::presence::{random_hue, random_name};
use mdpad_core::{EditorModel, Location, PresenceRegistry, PresenceRoster, SessionId, TextModel, UserInfo};
use mdpad_render::{preview_document, RenderConfig, RenderPipeline};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli;
use crate::clipboard::Clipboard;
use crate::commands::{Command, HELP};
use crate::prefs::{Preferences, DARK_MODE_KEY, HUE_KEY, NAME_KEY};

pub const DESYNC_WARNING: &str =
    "!! Desynchronized with server. Please save your work and refresh the page.";

/// Prints connection changes as status lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalObserver;

impl SessionObserver for TerminalObserver {
    fn on_connected(&mut self) {
        println!("[connected]");
    }

    fn on_disconnected(&mut self) {
        println!("[disconnected, reconnecting]");
    }

    fn on_desynchronized(&mut self) {
        println!("{DESYNC_WARNING}");
    }

    fn on_change_users(&mut self, roster: &PresenceRoster) {
        match roster.len() {
            0 => println!("[no one else here]"),
            1 => println!("[1 other user online]"),
            n => println!("[{n} other users online]"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App<E: SyncEngine + Clone> {
    view: SessionView<TextModel, E, TerminalObserver>,
    pipeline: RenderPipeline,
    config: RenderConfig,
    prefs: Preferences,
    preview: PathBuf,
    clipboard: Box<dyn Clipboard>,
    dark: bool,
}

impl<E: SyncEngine + Clone> App<E> {
    /// Local identity and theme come from `prefs`, initialized on first run.
    pub fn new(
        origin: Location,
        engine: E,
        mut prefs: Preferences,
        preview: PathBuf,
        clipboard: Box<dyn Clipboard>,
    ) -> Self {
        let name: String = prefs.get_or_init(NAME_KEY, random_name);
        let hue: u32 = prefs.get_or_init(HUE_KEY, random_hue);
        let dark: bool = prefs.get_or_init(DARK_MODE_KEY, || false);

        let config = RenderConfig::default();
        let view = SessionView::new(
            origin,
            TextModel::new(),
            PresenceRegistry::new(UserInfo::new(name, hue)),
            engine,
            ReconnectPolicy::default(),
            TerminalObserver,
        );
        Self {
            view,
            pipeline: RenderPipeline::new(&config),
            config,
            prefs,
            preview,
            clipboard,
            dark,
        }
    }

    pub fn view(&self) -> &SessionView<TextModel, E, TerminalObserver> {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut SessionView<TextModel, E, TerminalObserver> {
        &mut self.view
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    pub fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    pub fn preview_path(&self) -> &Path {
        &self.preview
    }

    pub fn is_dark(&self) -> bool {
        self.dark
    }

    /// Open `id`, discarding the current buffer and any pending render.
    pub fn open(&mut self, id: SessionId, now: Instant) {
        self.view.open(id);
        self.pipeline.cancel();
        self.pipeline.input(self.view.model().value(), now);
        if let Some(link) = self.view.shareable_link() {
            println!("Editing {link}");
        }
    }

    /// Run the editor on `id` until `:quit` or end of input.
    pub async fn run(mut self, id: SessionId) {
        self.open(id, Instant::now());
        println!("Type :help for commands.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let reconnect = self.view.reconnect_deadline();
            let render = self.pipeline.deadline();

            tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if self.handle_line(&line, Instant::now()) == Flow::Quit {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        log::error!("Failed to read input: {e}");
                        break;
                    }
                },
                event = self.view.recv() => self.view.dispatch(event, Instant::now()),
                _ = sleep_until(reconnect) => {
                    self.view.poll_reconnect(Instant::now());
                }
                _ = sleep_until(render) => {
                    if self.pipeline.poll(Instant::now()) {
                        self.write_preview();
                    }
                }
            }
        }

        self.render_now();
        self.view.close();
    }

    /// Render any pending input immediately.
    pub fn render_now(&mut self) {
        if self.pipeline.flush() {
            self.write_preview();
        }
    }

    fn write_preview(&self) {
        let page = preview_document(self.pipeline.surface().html(), &self.config, self.dark);
        if let Err(e) = fs::write(&self.preview, page) {
            log::warn!("Cannot write preview to {}: {e}", self.preview.display());
        }
    }

    fn changed(&mut self, now: Instant) {
        self.pipeline.input(self.view.model().value(), now);
    }

    pub fn handle_line(&mut self, line: &str, now: Instant) -> Flow {
        match Command::parse(line) {
            Command::Edit(text) => {
                self.view.model_mut().append(&format!("{text}\n"));
                self.changed(now);
            }
            Command::Name(name) => {
                if name.is_empty() {
                    println!("Usage: :name <text>");
                } else if self.view.set_name(&name) {
                    self.prefs.set(NAME_KEY, &name);
                }
            }
            Command::Color => {
                if self.view.reroll_color() {
                    let hue = self.view.presence().local().hue;
                    self.prefs.set(HUE_KEY, &hue);
                    println!("Your color is now hue {hue}");
                }
            }
            Command::ToggleDark => {
                self.dark = !self.dark;
                self.prefs.set(DARK_MODE_KEY, &self.dark);
                self.write_preview();
            }
            Command::Example => {
                let example = self.view.load_example();
                println!("Loaded example: {}", example.title);
                self.changed(now);
            }
            Command::Link => match self.view.shareable_link() {
                Some(link) => println!("{link}"),
                None => println!("No document open"),
            },
            Command::Copy => {
                if let Some(link) = self.view.shareable_link() {
                    match self.clipboard.write_text(&link) {
                        Ok(()) => println!("Copied!"),
                        Err(e) => log::debug!("Clipboard write failed: {e}"),
                    }
                }
            }
            Command::Open(arg) => match cli::resolve_open(&arg) {
                Ok(id) => {
                    if self.view.session_id() != Some(&id) {
                        self.open(id, now);
                    }
                }
                Err(e) => println!("Cannot open {arg:?}: {e}"),
            },
            Command::Undo => {
                if self.view.model_mut().undo() {
                    self.changed(now);
                }
            }
            Command::Status => self.print_status(),
            Command::Users => {
                for participant in self.view.presence().participants() {
                    let me = if participant.is_me { " (you)" } else { "" };
                    println!(
                        "  {}{me}  {}",
                        participant.info.name,
                        participant.info.css_color()
                    );
                }
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return Flow::Quit,
            Command::Unknown(word) => println!("Unknown command :{word}, try :help"),
        }
        Flow::Continue
    }

    fn print_status(&self) {
        let state = self.view.state();
        if state == ConnectionState::Desynchronized {
            println!("{DESYNC_WARNING}");
        } else {
            println!("Status: {}", state.label());
        }
        if let Some(link) = self.view.shareable_link() {
            println!("Document: {link}");
        }
        println!(
            "Users: {}  Renders: {}  Preview: {}",
            self.view.presence().remote_count() + 1,
            self.pipeline.surface().renders(),
            self.preview.display()
        );
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at.into()).await,
        None => std::future::pending().await,
    }
}
