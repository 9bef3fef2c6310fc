//! Keyboard mapping and passive key grabs.
//!
//! The server's keycode table is read once at startup. Bindings are resolved
//! against each keycode's primary (unshifted) keysym, and key events are
//! interpreted the same way; shift handling is left to the modifier mask.

use anyhow::{Context, Result};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{ConnectionExt, GrabMode, Keycode, Keysym, ModMask, Window};
use x11rb::rust_connection::RustConnection;

use crate::keysym;

/// CapsLock and NumLock (usually Mod2), which must not change what a binding means
fn lock_masks() -> (u16, u16) {
    (u16::from(ModMask::LOCK), u16::from(ModMask::M2))
}

/// Strip CapsLock and NumLock from a key event state
pub fn clean_state(state: u16) -> u16 {
    let (capslock, numlock) = lock_masks();
    state & !(capslock | numlock)
}

/// The server's keycode → keysyms table
#[derive(Debug, Clone)]
pub struct Keymap {
    min_keycode: Keycode,
    keysyms_per_keycode: usize,
    keysyms: Vec<Keysym>,
}

impl Keymap {
    pub fn new(min_keycode: Keycode, keysyms_per_keycode: u8, keysyms: Vec<Keysym>) -> Self {
        Self {
            min_keycode,
            keysyms_per_keycode: keysyms_per_keycode as usize,
            keysyms,
        }
    }

    /// Fetch the table for the server's whole keycode range
    pub fn load(conn: &RustConnection) -> Result<Self> {
        let setup = conn.setup();
        let min_keycode = setup.min_keycode;
        let max_keycode = setup.max_keycode;

        let mapping = conn
            .get_keyboard_mapping(min_keycode, max_keycode - min_keycode + 1)?
            .reply()
            .context("Failed to read keyboard mapping")?;

        log::debug!(
            "Keyboard mapping: keycodes {}..={}, {} keysyms per keycode",
            min_keycode,
            max_keycode,
            mapping.keysyms_per_keycode
        );
        Ok(Self::new(min_keycode, mapping.keysyms_per_keycode, mapping.keysyms))
    }

    /// Primary keysym of a keycode, or 0 (NoSymbol) if unknown
    pub fn primary(&self, keycode: Keycode) -> Keysym {
        let Some(offset) = keycode.checked_sub(self.min_keycode) else {
            return 0;
        };
        self.keysyms
            .get(offset as usize * self.keysyms_per_keycode)
            .copied()
            .unwrap_or(0)
    }

    /// Every keycode whose primary keysym is `keysym`
    pub fn keycodes_for(&self, keysym: Keysym) -> Vec<Keycode> {
        if self.keysyms_per_keycode == 0 || keysym == 0 {
            return Vec::new();
        }
        self.keysyms
            .chunks(self.keysyms_per_keycode)
            .enumerate()
            .filter(|(_, syms)| syms[0] == keysym)
            .filter_map(|(i, _)| {
                u8::try_from(i)
                    .ok()
                    .and_then(|i| self.min_keycode.checked_add(i))
            })
            .collect()
    }
}

/// Passively grab every (keysym, modifiers) binding on the root window.
///
/// Each grab is repeated with the lock modifiers so bindings keep working
/// with CapsLock or NumLock on. Failures are logged and skipped. Returns
/// the number of key combinations grabbed.
pub fn grab_bindings<I>(conn: &RustConnection, root: Window, keymap: &Keymap, bindings: I) -> Result<usize>
where
    I: IntoIterator<Item = (Keysym, u16)>,
{
    let mut grabbed = 0;

    for (sym, modifiers) in bindings {
        let keycodes = keymap.keycodes_for(sym);
        if keycodes.is_empty() {
            log::warn!(
                "No keycode produces {} (keysym 0x{:x}), binding skipped",
                keysym::name(sym),
                sym
            );
            continue;
        }

        for keycode in keycodes {
            match grab_key(conn, root, keycode, modifiers) {
                Ok(()) => {
                    grabbed += 1;
                    log::debug!(
                        "Grabbed {} (keycode {}, mods 0x{:x})",
                        keysym::name(sym),
                        keycode,
                        modifiers
                    );
                }
                Err(e) => log::warn!(
                    "Failed to grab {} (keycode {}, mods 0x{:x}): {}",
                    keysym::name(sym),
                    keycode,
                    modifiers,
                    e
                ),
            }
        }
    }

    conn.flush()?;
    Ok(grabbed)
}

/// Grab a single key combination, with and without the lock modifiers
fn grab_key(conn: &RustConnection, root: Window, keycode: Keycode, modifiers: u16) -> Result<()> {
    let grabbed = grab_lock_variants(modifiers, |mods| {
        conn.grab_key(
            false, // owner_events
            root,
            ModMask::from(mods),
            keycode,
            GrabMode::ASYNC,
            GrabMode::ASYNC,
        )?
        .check()?;
        Ok(())
    })?;
    log::trace!("Keycode {}: {} of 4 lock variants grabbed", keycode, grabbed);
    Ok(())
}

/// Run `grab` for `modifiers` plus every CapsLock/NumLock combination.
///
/// Every variant is attempted. Returns how many succeeded, or the last
/// error if none did.
fn grab_lock_variants<F>(modifiers: u16, mut grab: F) -> Result<usize>
where
    F: FnMut(u16) -> Result<()>,
{
    let (capslock, numlock) = lock_masks();
    let mut grabbed = 0;
    let mut last_error = None;

    for extra in [0, capslock, numlock, capslock | numlock] {
        let mods = modifiers | extra;
        match grab(mods) {
            Ok(()) => grabbed += 1,
            Err(e) => {
                log::warn!("Failed to grab with mods 0x{:x}: {}", mods, e);
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if grabbed == 0 => Err(e),
        _ => Ok(grabbed),
    }
}
