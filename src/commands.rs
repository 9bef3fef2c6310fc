//! Keyboard command dispatcher.
//!
//! The keybindings are fixed. A key event is matched on the primary keysym
//! of its keycode plus the exact modifier state, with lock modifiers
//! already stripped.

use anyhow::Result;
use x11rb::protocol::xproto::{Keysym, Timestamp};

use crate::backend::Backend;
use crate::event::Control;
use crate::icccm;
use crate::keysym::*;
use crate::layout::{Direction, TileError};
use crate::Wm;

const SHIFT: u16 = 1 << 0;
const CONTROL: u16 = 1 << 2;
/// Mod1, normally Alt
const ALT: u16 = 1 << 3;

/// Actions reachable from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    SpawnTerminal,
    /// Ask the active window to close, destroying it if it can't
    Close,
    /// Destroy the active window
    Destroy,
    Move(Direction),
    /// Resize the active window inside its column
    ResizeWindow(Direction),
    /// Resize the column holding the active window
    ResizeColumn(Direction),
    NewColumn,
    DeleteEmptyColumns,
}

/// A key combination bound to a command
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    pub keysym: Keysym,
    pub modifiers: u16,
    pub command: Command,
}

const fn bind(keysym: Keysym, modifiers: u16, command: Command) -> Binding {
    Binding {
        keysym,
        modifiers,
        command,
    }
}

pub const BINDINGS: &[Binding] = &[
    bind(XK_BACKSPACE, CONTROL | ALT, Command::Quit),
    bind(XK_E, ALT, Command::SpawnTerminal),
    bind(XK_Q, ALT, Command::Close),
    bind(XK_Q, ALT | SHIFT, Command::Destroy),
    bind(XK_H, ALT, Command::Move(Direction::Left)),
    bind(XK_J, ALT, Command::Move(Direction::Down)),
    bind(XK_K, ALT, Command::Move(Direction::Up)),
    bind(XK_L, ALT, Command::Move(Direction::Right)),
    bind(XK_UP, CONTROL | ALT, Command::ResizeWindow(Direction::Up)),
    bind(XK_DOWN, CONTROL | ALT, Command::ResizeWindow(Direction::Down)),
    bind(XK_LEFT, CONTROL | ALT, Command::ResizeColumn(Direction::Left)),
    bind(XK_RIGHT, CONTROL | ALT, Command::ResizeColumn(Direction::Right)),
    bind(XK_N, CONTROL | SHIFT, Command::NewColumn),
    bind(XK_D, CONTROL | SHIFT, Command::DeleteEmptyColumns),
];

impl Command {
    /// Look up the command for a primary keysym and lock-free modifier state
    pub fn from_key(keysym: Keysym, state: u16) -> Option<Command> {
        BINDINGS
            .iter()
            .find(|b| b.keysym == keysym && b.modifiers == state)
            .map(|b| b.command)
    }
}

impl<B: Backend> Wm<B> {
    /// Run a command triggered by a key event at `time`
    pub fn execute(&mut self, command: Command, time: Timestamp) -> Result<Control> {
        log::debug!("Executing {:?}", command);

        match command {
            Command::Quit => {
                log::info!("Quit requested");
                return Ok(Control::Quit);
            }
            Command::SpawnTerminal => match &self.terminal {
                Some(terminal) => {
                    terminal.spawn()?;
                }
                None => log::warn!("No terminal configured"),
            },
            Command::Close => {
                if let Some(window) = self.active {
                    icccm::close_window(&*self.backend, &self.atoms, window, time)?;
                }
            }
            Command::Destroy => {
                if let Some(window) = self.active {
                    icccm::destroy_window(&*self.backend, window)?;
                }
            }
            Command::Move(direction) => {
                if let Some(window) = self.active {
                    self.fan_out("move", move |ws| match direction {
                        Direction::Up => ws.up(window),
                        Direction::Down => ws.down(window),
                        Direction::Left => ws.left(window),
                        Direction::Right => ws.right(window),
                    });
                }
            }
            Command::ResizeWindow(direction) => {
                if let Some(window) = self.active {
                    let step = self.layout.resize_step;
                    self.fan_out("resize-window", move |ws| {
                        ws.resize_window(window, direction, step)
                    });
                }
            }
            Command::ResizeColumn(direction) => {
                if let Some(window) = self.active {
                    let step = self.layout.resize_step;
                    self.fan_out("resize-column", move |ws| {
                        ws.resize_column(window, direction, step)
                    });
                }
            }
            Command::NewColumn => {
                for ws in self.workspaces.attached() {
                    ws.new_column();
                    if let Err(e) = ws.tile_windows(&*self.backend, self.active, &self.layout) {
                        log::warn!("Retile after new column failed: {}", e);
                    }
                }
            }
            Command::DeleteEmptyColumns => {
                for ws in self.workspaces.attached() {
                    if !ws.delete_empty_columns() {
                        continue;
                    }
                    match ws.tile_windows(&*self.backend, self.active, &self.layout) {
                        Ok(()) | Err(TileError::NoColumns) => {}
                        Err(e) => log::warn!("Retile after deleting columns failed: {}", e),
                    }
                }
            }
        }

        Ok(Control::Continue)
    }
}
