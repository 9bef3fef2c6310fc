//! colwm - Column Tiling Window Manager
//!
//! A minimal X11 window manager that arranges windows into side-by-side
//! columns, one row of columns per screen.

mod atoms;
mod backend;
mod commands;
mod config;
mod event;
mod icccm;
mod keyboard;
mod keysym;
mod layout;
mod ownership;
mod screens;
mod spawn;
mod types;
mod workspaces;

use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{bail, Context, Result};
use clap::Parser;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use atoms::Atoms;
use backend::Backend;
use commands::BINDINGS;
use config::{Args, Config, LayoutConfig};
use keyboard::Keymap;
use spawn::Terminal;
use workspaces::{TaskOutcome, Workspaces};

/// Window manager state
struct Wm<B: Backend> {
    backend: Arc<B>,
    root: Window,
    atoms: Atoms,
    keymap: Keymap,
    workspaces: Workspaces,
    /// Window the pointer last entered
    active: Option<Window>,
    layout: LayoutConfig,
    terminal: Option<Terminal>,
    /// Broadcast tasks that may still be running
    tasks: Vec<JoinHandle<TaskOutcome>>,
}

impl<B: Backend> Wm<B> {
    pub fn new(
        backend: Arc<B>,
        root: Window,
        atoms: Atoms,
        keymap: Keymap,
        workspaces: Workspaces,
        layout: LayoutConfig,
        terminal: Option<Terminal>,
    ) -> Self {
        Self {
            backend,
            root,
            atoms,
            keymap,
            workspaces,
            active: None,
            layout,
            terminal,
            tasks: Vec::new(),
        }
    }

    /// Tile every workspace, logging failures
    fn tile_all(&self) {
        for ws in self.workspaces.iter() {
            if let Err(e) = ws.tile_windows(&*self.backend, self.active, &self.layout) {
                log::warn!("Initial tiling failed: {}", e);
            }
        }
    }
}

impl Wm<RustConnection> {
    /// Manage any existing windows
    fn scan_existing_windows(&mut self) -> Result<()> {
        let tree = self
            .backend
            .query_tree(self.root)?
            .reply()
            .context("Failed to list existing windows")?;

        let default = Arc::clone(self.workspaces.default_workspace());
        for &window in &tree.children {
            let attrs = match self.backend.get_window_attributes(window)?.reply() {
                Ok(attrs) => attrs,
                Err(e) => {
                    log::debug!("Skipping window 0x{:x}: {}", window, e);
                    continue;
                }
            };

            // Skip windows that are:
            // - override_redirect (popups, menus, etc.)
            // - not viewable (unmapped)
            if attrs.override_redirect || attrs.map_state != MapState::VIEWABLE {
                continue;
            }

            log::info!("Found existing window 0x{:x}", window);
            if let Err(e) = default.add_window(&*self.backend, window, &self.layout) {
                log::warn!("Could not manage window 0x{:x}: {}", window, e);
            }
        }

        self.tile_all();
        Ok(())
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    log::info!("Starting colwm - Column Tiling Window Manager");

    let config = Config::load_from_path(args.config.clone().unwrap_or_else(Config::default_path));

    let (conn, screen_num) =
        x11rb::connect(args.display.as_deref()).context("Failed to connect to the X server")?;

    let roots = conn.setup().roots.len();
    if roots != 1 {
        bail!("Expected exactly one root window, found {}", roots);
    }
    let root = conn
        .setup()
        .roots
        .get(screen_num)
        .context("Could not parse setup information")?
        .root;

    let screens = screens::discover(&conn, screen_num)?;
    let atoms = Atoms::new(&conn)?;

    // Become the window manager
    ownership::claim_manager_role(&conn, root)?;

    // Grab our keybindings
    let keymap = Keymap::load(&conn)?;
    let grabbed = keyboard::grab_bindings(
        &conn,
        root,
        &keymap,
        BINDINGS.iter().map(|b| (b.keysym, b.modifiers)),
    )?;
    log::info!("Grabbed {} key combinations", grabbed);

    let terminal = Terminal::parse(&config.general.terminal);
    match &terminal {
        Some(terminal) => log::info!("Terminal: {}", terminal.program()),
        None => log::warn!("No terminal configured, Alt+E is disabled"),
    }

    let workspaces = Workspaces::new(&screens);
    log::info!("Created {} workspaces", workspaces.len());
    let mut wm = Wm::new(
        Arc::new(conn),
        root,
        atoms,
        keymap,
        workspaces,
        config.layout_config(),
        terminal,
    );

    // Manage any existing windows
    wm.scan_existing_windows()?;

    // Run the event loop
    wm.run()?;

    Ok(())
}
