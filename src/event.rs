//! Event handling for X11 events.
//!
//! The loop blocks for one event at a time and handles it to completion
//! before reading the next. Handler errors are logged and never stop the
//! loop; only the quit command or a broken connection does.

use anyhow::{Context, Result};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{ConfigureRequestEvent, Keycode, Timestamp, Window};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

use crate::backend::Backend;
use crate::commands::Command;
use crate::icccm;
use crate::keyboard;
use crate::keysym;
use crate::layout::{TileError, Workspace};
use crate::Wm;

/// What the loop should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Short name of an event for log output
fn event_name(event: &Event) -> &'static str {
    match event {
        Event::KeyPress(_) => "KeyPress",
        Event::KeyRelease(_) => "KeyRelease",
        Event::ButtonPress(_) => "ButtonPress",
        Event::ButtonRelease(_) => "ButtonRelease",
        Event::EnterNotify(_) => "EnterNotify",
        Event::LeaveNotify(_) => "LeaveNotify",
        Event::CreateNotify(_) => "CreateNotify",
        Event::DestroyNotify(_) => "DestroyNotify",
        Event::UnmapNotify(_) => "UnmapNotify",
        Event::MapNotify(_) => "MapNotify",
        Event::MapRequest(_) => "MapRequest",
        Event::ConfigureNotify(_) => "ConfigureNotify",
        Event::ConfigureRequest(_) => "ConfigureRequest",
        Event::ClientMessage(_) => "ClientMessage",
        Event::MappingNotify(_) => "MappingNotify",
        Event::Error(_) => "Error",
        _ => "other",
    }
}

impl<B: Backend> Wm<B> {
    /// Handle an X11 event
    pub fn handle_event(&mut self, event: Event) -> Control {
        let name = event_name(&event);

        let result = match event {
            Event::KeyPress(e) => self.handle_key_press(e.detail, u16::from(e.state), e.time),
            Event::DestroyNotify(e) => {
                self.handle_destroy_notify(e.window);
                Ok(Control::Continue)
            }
            Event::ConfigureRequest(e) => self
                .handle_configure_request(&e)
                .map(|()| Control::Continue),
            Event::MapRequest(e) => self.handle_map_request(e.window).map(|()| Control::Continue),
            Event::EnterNotify(e) => self
                .handle_enter_notify(e.event, e.time)
                .map(|()| Control::Continue),
            Event::Error(e) => {
                log::warn!(
                    "X11 error {:?} (major opcode {}, bad value 0x{:x}, sequence {})",
                    e.error_kind,
                    e.major_opcode,
                    e.bad_value,
                    e.sequence
                );
                Ok(Control::Continue)
            }
            _ => {
                log::debug!("Ignoring {} event", name);
                Ok(Control::Continue)
            }
        };

        if let Err(e) = self.backend.flush() {
            log::warn!("Failed to flush requests: {}", e);
        }

        match result {
            Ok(control) => control,
            Err(e) => {
                log::error!("Error handling {}: {:#}", name, e);
                Control::Continue
            }
        }
    }

    /// Handle a key press event
    fn handle_key_press(&mut self, keycode: Keycode, state: u16, time: Timestamp) -> Result<Control> {
        let sym = self.keymap.primary(keycode);
        let clean_state = keyboard::clean_state(state);

        log::debug!(
            "KeyPress: keycode={}, keysym=0x{:x} ({}), state=0x{:x}, clean_state=0x{:x}",
            keycode,
            sym,
            keysym::name(sym),
            state,
            clean_state
        );

        match Command::from_key(sym, clean_state) {
            Some(command) => self.execute(command, time),
            None => Ok(Control::Continue),
        }
    }

    /// Forget a destroyed window everywhere
    fn handle_destroy_notify(&mut self, window: Window) {
        log::debug!("DestroyNotify for window 0x{:x}", window);

        if self.active == Some(window) {
            self.active = None;
            if let Err(e) = icccm::focus_root(&*self.backend, self.root) {
                log::warn!("Failed to return focus to root: {}", e);
            }
        }

        self.fan_out("remove", move |ws| ws.remove_window(window));
    }

    /// Acknowledge a configure request without changing anything
    fn handle_configure_request(&self, event: &ConfigureRequestEvent) -> Result<()> {
        log::debug!(
            "ConfigureRequest for window 0x{:x}: {}x{}+{}+{}",
            event.window,
            event.width,
            event.height,
            event.x,
            event.y
        );
        self.backend.send_configure_notify(event)
    }

    /// Map a window and manage it on the default workspace
    fn handle_map_request(&mut self, window: Window) -> Result<()> {
        log::debug!("MapRequest for window 0x{:x}", window);

        let override_redirect = match self.backend.is_override_redirect(window) {
            Ok(flag) => flag,
            Err(e) => {
                log::debug!("Could not read attributes of 0x{:x}, managing it anyway: {}", window, e);
                false
            }
        };
        if override_redirect {
            log::debug!("Window 0x{:x} is override-redirect, leaving it alone", window);
            return Ok(());
        }

        self.backend.map_window(window)?;

        let ws = self.workspaces.default_workspace();
        ws.add_window(&*self.backend, window, &self.layout)
            .with_context(|| format!("Failed to manage window 0x{:x}", window))?;
        if let Err(e) = ws.tile_windows(&*self.backend, self.active, &self.layout) {
            log::warn!("Retile after mapping 0x{:x} failed: {}", window, e);
        }
        Ok(())
    }

    /// Track the window under the pointer and hand it focus
    fn handle_enter_notify(&mut self, window: Window, time: Timestamp) -> Result<()> {
        log::debug!("EnterNotify for window 0x{:x}", window);
        self.active = Some(window);
        let outcome = icccm::focus_window(&*self.backend, &self.atoms, window, time)?;
        log::debug!("Focus for 0x{:x}: {:?}", window, outcome);
        Ok(())
    }

    /// Broadcast an operation on the active layout to every workspace
    pub(crate) fn fan_out<F>(&mut self, label: &'static str, op: F)
    where
        F: Fn(&Workspace) -> Result<(), TileError> + Send + Sync + 'static,
    {
        let handles = self
            .workspaces
            .broadcast(&self.backend, self.active, self.layout, label, op);
        self.tasks.extend(handles);
    }

    /// Drop handles of tasks that already finished
    fn prune_tasks(&mut self) {
        self.tasks.retain(|task| !task.is_finished());
    }

    /// Wait for every outstanding broadcast task
    #[cfg(test)]
    fn join_tasks(&mut self) -> Vec<crate::workspaces::TaskOutcome> {
        self.tasks
            .drain(..)
            .map(|task| task.join().unwrap())
            .collect()
    }
}

impl Wm<RustConnection> {
    /// Run the event loop until quit
    pub fn run(&mut self) -> Result<()> {
        log::info!("Entering event loop");

        loop {
            let event = self
                .backend
                .wait_for_event()
                .context("Lost connection to the X server")?;
            self.prune_tasks();

            if self.handle_event(event) == Control::Quit {
                break;
            }
        }

        // Running broadcast tasks are abandoned with the connection
        log::info!("Exiting window manager ({} tasks still running)", self.tasks.len());
        Ok(())
    }
}
