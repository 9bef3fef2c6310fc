//! X11 keysym values for the keys colwm binds.
//!
//! Values come from `X11/keysymdef.h`. Only the symbols used by the fixed
//! keybinding table are listed.

use x11rb::protocol::xproto::Keysym;

pub const XK_BACKSPACE: Keysym = 0xff08;
pub const XK_LEFT: Keysym = 0xff51;
pub const XK_UP: Keysym = 0xff52;
pub const XK_RIGHT: Keysym = 0xff53;
pub const XK_DOWN: Keysym = 0xff54;

pub const XK_D: Keysym = 0x64;
pub const XK_E: Keysym = 0x65;
pub const XK_H: Keysym = 0x68;
pub const XK_J: Keysym = 0x6a;
pub const XK_K: Keysym = 0x6b;
pub const XK_L: Keysym = 0x6c;
pub const XK_N: Keysym = 0x6e;
pub const XK_Q: Keysym = 0x71;

/// Human readable name of a keysym, for log output
pub fn name(keysym: Keysym) -> &'static str {
    match keysym {
        XK_BACKSPACE => "BackSpace",
        XK_LEFT => "Left",
        XK_UP => "Up",
        XK_RIGHT => "Right",
        XK_DOWN => "Down",
        XK_D => "d",
        XK_E => "e",
        XK_H => "h",
        XK_J => "j",
        XK_K => "k",
        XK_L => "l",
        XK_N => "n",
        XK_Q => "q",
        _ => "unknown",
    }
}
