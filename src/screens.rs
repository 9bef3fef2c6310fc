//! Screen geometry discovery.
//!
//! Screens come from Xinerama. When the extension is missing, inactive or
//! reports nothing, a single screen covering the root window is used.

use anyhow::{Context, Result};
use x11rb::connection::{Connection, RequestConnection};
use x11rb::protocol::xinerama::{self, ConnectionExt as XineramaExt, ScreenInfo};
use x11rb::rust_connection::RustConnection;

use crate::types::Rect;

/// Query the screen rectangles of the display.
///
/// Xinerama failures are not fatal; they only cause the root-window fallback.
pub fn discover(conn: &RustConnection, screen_num: usize) -> Result<Vec<Rect>> {
    let root = conn
        .setup()
        .roots
        .get(screen_num)
        .context("Display has no screen with that number")?;

    let infos = match query_xinerama(conn) {
        Ok(infos) => infos,
        Err(e) => {
            log::warn!("Xinerama query failed: {:#}", e);
            Vec::new()
        }
    };

    let screens = screens_from(&infos, root.width_in_pixels, root.height_in_pixels);
    for (i, screen) in screens.iter().enumerate() {
        log::info!("Screen {}: {}", i, screen);
    }
    Ok(screens)
}

fn query_xinerama(conn: &RustConnection) -> Result<Vec<ScreenInfo>> {
    if conn
        .extension_information(xinerama::X11_EXTENSION_NAME)?
        .is_none()
    {
        log::info!("Xinerama extension not available");
        return Ok(Vec::new());
    }
    if conn.xinerama_is_active()?.reply()?.state == 0 {
        log::info!("Xinerama is not active");
        return Ok(Vec::new());
    }
    Ok(conn.xinerama_query_screens()?.reply()?.screen_info)
}

/// Turn Xinerama screen infos into rectangles.
///
/// Cloned outputs show up as identical entries and are reported once. An
/// empty list falls back to the root window size.
pub fn screens_from(infos: &[ScreenInfo], root_width: u16, root_height: u16) -> Vec<Rect> {
    let mut screens: Vec<Rect> = Vec::with_capacity(infos.len());
    for info in infos {
        let rect = Rect::new(
            info.x_org as i32,
            info.y_org as i32,
            info.width as u32,
            info.height as u32,
        );
        if rect.width == 0 || rect.height == 0 || screens.contains(&rect) {
            continue;
        }
        screens.push(rect);
    }

    if screens.is_empty() {
        screens.push(Rect::new(0, 0, root_width as u32, root_height as u32));
    }
    screens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(x_org: i16, y_org: i16, width: u16, height: u16) -> ScreenInfo {
        ScreenInfo {
            x_org,
            y_org,
            width,
            height,
        }
    }

    #[test]
    fn test_empty_falls_back_to_root() {
        assert_eq!(screens_from(&[], 1024, 768), vec![Rect::new(0, 0, 1024, 768)]);
    }

    #[test]
    fn test_screens_keep_origin() {
        let screens = screens_from(&[info(0, 0, 1280, 800), info(1280, 0, 1920, 1080)], 3200, 1080);
        assert_eq!(
            screens,
            vec![Rect::new(0, 0, 1280, 800), Rect::new(1280, 0, 1920, 1080)]
        );
    }

    #[test]
    fn test_cloned_screens_reported_once() {
        let screens = screens_from(&[info(0, 0, 1920, 1080), info(0, 0, 1920, 1080)], 1920, 1080);
        assert_eq!(screens, vec![Rect::new(0, 0, 1920, 1080)]);
    }

    #[test]
    fn test_zero_sized_screens_ignored() {
        assert_eq!(screens_from(&[info(0, 0, 0, 0)], 800, 600), vec![Rect::new(0, 0, 800, 600)]);
    }
}
