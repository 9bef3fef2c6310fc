//! Shared geometry types used across multiple modules.

/// A rectangle representing geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge (exclusive)
    #[cfg(test)]
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Bottom edge (exclusive)
    #[cfg(test)]
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Shrink by a border on every side, never below 1x1.
    ///
    /// X11 rejects zero-sized windows, so degenerate slots still get a
    /// one pixel client area.
    pub fn inset(&self, border: u32) -> Rect {
        let both_sides = border.saturating_mul(2);
        Rect {
            x: self.x,
            y: self.y,
            width: self.width.saturating_sub(both_sides).max(1),
            height: self.height.saturating_sub(both_sides).max(1),
        }
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}
