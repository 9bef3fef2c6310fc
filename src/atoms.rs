//! ICCCM atom registry.
//!
//! The handful of protocol atoms colwm needs are interned once at startup
//! and then passed around by value.

use anyhow::{Context, Result};
use x11rb::protocol::xproto::{Atom, ConnectionExt};
use x11rb::rust_connection::RustConnection;

/// ICCCM atoms used by the window manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Atoms {
    pub wm_protocols: Atom,
    pub wm_delete_window: Atom,
    pub wm_take_focus: Atom,
}

impl Atoms {
    /// Intern all required atoms
    pub fn new(conn: &RustConnection) -> Result<Self> {
        let atoms = Self {
            wm_protocols: Self::intern(conn, b"WM_PROTOCOLS")?,
            wm_delete_window: Self::intern(conn, b"WM_DELETE_WINDOW")?,
            wm_take_focus: Self::intern(conn, b"WM_TAKE_FOCUS")?,
        };
        log::debug!("Interned atoms: {:?}", atoms);
        Ok(atoms)
    }

    /// Intern an atom name
    fn intern(conn: &RustConnection, name: &[u8]) -> Result<Atom> {
        let atom = conn
            .intern_atom(false, name)?
            .reply()
            .with_context(|| format!("Failed to intern {}", String::from_utf8_lossy(name)))?
            .atom;
        Ok(atom)
    }
}
