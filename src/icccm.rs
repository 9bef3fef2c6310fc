//! ICCCM client protocol handling.
//!
//! Covers the `WM_PROTOCOLS` conventions colwm honours:
//! - `WM_DELETE_WINDOW` for polite closing, with a forced destroy fallback
//! - `WM_TAKE_FOCUS` for clients that manage their own input focus

use anyhow::Result;
use x11rb::protocol::xproto::{Atom, GetPropertyReply, Timestamp, Window};

use crate::atoms::Atoms;
use crate::backend::Backend;

/// Decode an ATOM-list property reply.
///
/// Returns `None` when the property does not exist or is not a list of
/// 32-bit values.
pub fn decode_atoms(reply: &GetPropertyReply) -> Option<Vec<Atom>> {
    if reply.type_ == x11rb::NONE {
        return None;
    }
    reply.value32().map(|atoms| atoms.collect())
}

/// The protocols a client advertises in `WM_PROTOCOLS`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WmProtocols(Vec<Atom>);

impl WmProtocols {
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self(atoms)
    }

    pub fn supports(&self, protocol: Atom) -> bool {
        self.0.contains(&protocol)
    }
}

/// Read a window's `WM_PROTOCOLS`; an unset property yields an empty list.
pub fn protocols<B: Backend>(backend: &B, atoms: &Atoms, window: Window) -> Result<WmProtocols> {
    let list = backend.get_atom_list(window, atoms.wm_protocols)?;
    Ok(WmProtocols::new(list.unwrap_or_default()))
}

/// How a close request was carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The client was asked to close itself
    DeleteRequested,
    /// The window was destroyed by the manager
    Destroyed,
}

/// Close a window politely if it supports `WM_DELETE_WINDOW`, otherwise destroy it.
pub fn close_window<B: Backend>(
    backend: &B,
    atoms: &Atoms,
    window: Window,
    time: Timestamp,
) -> Result<CloseOutcome> {
    let protocols = protocols(backend, atoms, window)?;

    if protocols.supports(atoms.wm_delete_window) {
        log::info!("Asking window 0x{:x} to close", window);
        backend.send_client_message(
            window,
            atoms.wm_protocols,
            [atoms.wm_delete_window, time, 0, 0, 0],
        )?;
        return Ok(CloseOutcome::DeleteRequested);
    }

    log::info!("Window 0x{:x} lacks WM_DELETE_WINDOW, destroying", window);
    destroy_window(backend, window)?;
    Ok(CloseOutcome::Destroyed)
}

/// Destroy a window regardless of its advertised protocols.
pub fn destroy_window<B: Backend>(backend: &B, window: Window) -> Result<()> {
    log::info!("Destroying window 0x{:x}", window);
    backend.destroy_window(window)
}

/// How focus was handed to a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusOutcome {
    /// A `WM_TAKE_FOCUS` message was sent; the client focuses itself
    TakeFocusSent,
    /// Focus was set explicitly with SetInputFocus
    InputFocusSet,
}

/// Run the take-focus handshake for a window the pointer entered.
///
/// `time` must be the timestamp of the triggering event; ICCCM forbids
/// `CurrentTime` in `WM_TAKE_FOCUS` messages.
pub fn focus_window<B: Backend>(
    backend: &B,
    atoms: &Atoms,
    window: Window,
    time: Timestamp,
) -> Result<FocusOutcome> {
    match protocols(backend, atoms, window) {
        Ok(protocols) if protocols.supports(atoms.wm_take_focus) => {
            backend.send_client_message(
                window,
                atoms.wm_protocols,
                [atoms.wm_take_focus, time, 0, 0, 0],
            )?;
            log::debug!("Sent WM_TAKE_FOCUS to 0x{:x}", window);
            return Ok(FocusOutcome::TakeFocusSent);
        }
        Ok(_) => {}
        Err(e) => log::debug!("Could not read WM_PROTOCOLS of 0x{:x}: {}", window, e),
    }

    backend.set_input_focus(window, time)?;
    log::debug!("Set input focus to 0x{:x}", window);
    Ok(FocusOutcome::InputFocusSet)
}

/// Hand keyboard focus back to the root window.
pub fn focus_root<B: Backend>(backend: &B, root: Window) -> Result<()> {
    backend.set_input_focus(root, x11rb::CURRENT_TIME)
}
