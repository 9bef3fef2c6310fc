//! The X11 request surface used by the window manager core.
//!
//! Handlers and the tiling engine talk to the server only through
//! [`Backend`], so the same code drives a live `RustConnection` and the
//! recording fake used by the unit tests.

use anyhow::Result;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use crate::icccm;
use crate::types::Rect;

/// Requests the core issues against the display server
pub trait Backend: Send + Sync + 'static {
    /// Set a window's border width (checked)
    fn set_border_width(&self, window: Window, width: u32) -> Result<()>;

    /// Select the events we want from a client window (checked)
    fn select_input(&self, window: Window, mask: EventMask) -> Result<()>;

    /// Move and resize a window (checked)
    fn place(&self, window: Window, rect: Rect) -> Result<()>;

    /// Move the pointer to an offset inside a window
    fn warp_pointer(&self, window: Window, x: i16, y: i16) -> Result<()>;

    fn map_window(&self, window: Window) -> Result<()>;

    /// Forcibly destroy a window (checked)
    fn destroy_window(&self, window: Window) -> Result<()>;

    /// Read the override-redirect attribute of a window
    fn is_override_redirect(&self, window: Window) -> Result<bool>;

    /// Acknowledge a configure request with a synthetic ConfigureNotify
    /// echoing the requested geometry
    fn send_configure_notify(&self, request: &ConfigureRequestEvent) -> Result<()>;

    /// Read an ATOM-list property; `None` when the property is not set
    fn get_atom_list(&self, window: Window, property: Atom) -> Result<Option<Vec<Atom>>>;

    /// Send a 32-bit client message to a window (checked)
    fn send_client_message(&self, window: Window, type_: Atom, data: [u32; 5]) -> Result<()>;

    /// Give a window input focus, reverting to pointer root (checked)
    fn set_input_focus(&self, window: Window, time: Timestamp) -> Result<()>;

    fn flush(&self) -> Result<()>;
}

impl Backend for RustConnection {
    fn set_border_width(&self, window: Window, width: u32) -> Result<()> {
        self.configure_window(window, &ConfigureWindowAux::new().border_width(width))?
            .check()?;
        Ok(())
    }

    fn select_input(&self, window: Window, mask: EventMask) -> Result<()> {
        self.change_window_attributes(window, &ChangeWindowAttributesAux::new().event_mask(mask))?
            .check()?;
        Ok(())
    }

    fn place(&self, window: Window, rect: Rect) -> Result<()> {
        self.configure_window(
            window,
            &ConfigureWindowAux::new()
                .x(rect.x)
                .y(rect.y)
                .width(rect.width)
                .height(rect.height),
        )?
        .check()?;
        Ok(())
    }

    fn warp_pointer(&self, window: Window, x: i16, y: i16) -> Result<()> {
        Connection::flush(self)?;
        ConnectionExt::warp_pointer(self, x11rb::NONE, window, 0, 0, 0, 0, x, y)?;
        Ok(())
    }

    fn map_window(&self, window: Window) -> Result<()> {
        ConnectionExt::map_window(self, window)?;
        Ok(())
    }

    fn destroy_window(&self, window: Window) -> Result<()> {
        ConnectionExt::destroy_window(self, window)?.check()?;
        Ok(())
    }

    fn is_override_redirect(&self, window: Window) -> Result<bool> {
        Ok(self.get_window_attributes(window)?.reply()?.override_redirect)
    }

    fn send_configure_notify(&self, request: &ConfigureRequestEvent) -> Result<()> {
        let event = ConfigureNotifyEvent {
            response_type: CONFIGURE_NOTIFY_EVENT,
            sequence: 0,
            event: request.window,
            window: request.window,
            above_sibling: x11rb::NONE,
            x: request.x,
            y: request.y,
            width: request.width,
            height: request.height,
            border_width: 0,
            override_redirect: false,
        };
        self.send_event(false, request.window, EventMask::STRUCTURE_NOTIFY, event)?;
        Ok(())
    }

    fn get_atom_list(&self, window: Window, property: Atom) -> Result<Option<Vec<Atom>>> {
        let reply = self
            .get_property(false, window, property, AtomEnum::ANY, 0, 64)?
            .reply()?;
        Ok(icccm::decode_atoms(&reply))
    }

    fn send_client_message(&self, window: Window, type_: Atom, data: [u32; 5]) -> Result<()> {
        let event = ClientMessageEvent {
            response_type: CLIENT_MESSAGE_EVENT,
            format: 32,
            sequence: 0,
            window,
            type_,
            data: ClientMessageData::from(data),
        };
        self.send_event(false, window, EventMask::NO_EVENT, event)?.check()?;
        Ok(())
    }

    fn set_input_focus(&self, window: Window, time: Timestamp) -> Result<()> {
        ConnectionExt::set_input_focus(self, InputFocus::POINTER_ROOT, window, time)?.check()?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Connection::flush(self)?;
        Ok(())
    }
}
