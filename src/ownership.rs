//! Claiming the window manager role.
//!
//! Only one client per root window may select SubstructureRedirect; the
//! server answers a second attempt with an Access error.

use anyhow::{bail, Result};
use x11rb::connection::Connection;
use x11rb::errors::ReplyError;
use x11rb::protocol::xproto::{ChangeWindowAttributesAux, ConnectionExt, EventMask, Window};
use x11rb::protocol::ErrorKind;
use x11rb::rust_connection::RustConnection;

/// Events colwm needs on the root window
pub fn root_event_mask() -> EventMask {
    EventMask::KEY_PRESS
        | EventMask::KEY_RELEASE
        | EventMask::BUTTON_PRESS
        | EventMask::BUTTON_RELEASE
        | EventMask::STRUCTURE_NOTIFY
        | EventMask::SUBSTRUCTURE_REDIRECT
}

/// Become the window manager by requesting SubstructureRedirect on root
pub fn claim_manager_role(conn: &RustConnection, root: Window) -> Result<()> {
    let cookie = conn.change_window_attributes(
        root,
        &ChangeWindowAttributesAux::new().event_mask(root_event_mask()),
    )?;
    conn.flush()?;

    match cookie.check() {
        Ok(()) => {
            log::info!("Successfully became the window manager");
            Ok(())
        }
        Err(ReplyError::X11Error(e)) if is_already_managed(e.error_kind) => {
            bail!("Another window manager is already running")
        }
        Err(e) => bail!("Failed to select events on the root window: {}", e),
    }
}

/// Access is the server's answer to a second SubstructureRedirect client
fn is_already_managed(kind: ErrorKind) -> bool {
    kind == ErrorKind::Access
}
