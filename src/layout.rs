//! Column tiling engine.
//!
//! A workspace is a row of columns bound to one screen:
//! - Columns are laid out left to right and share the screen width
//! - Each column stacks its windows top to bottom and shares the height
//!
//! Every column and window carries a `size_delta`, a manual adjustment
//! relative to its equal share. Geometry is computed from a snapshot of the
//! columns, so no X request is issued while the workspace lock is held.

use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use x11rb::protocol::xproto::{EventMask, Window};

use crate::backend::Backend;
use crate::config::LayoutConfig;
use crate::types::Rect;

/// Direction for move and resize commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Up and Left point towards the start of a stack
    fn towards_start(self) -> bool {
        matches!(self, Direction::Up | Direction::Left)
    }
}

/// Failures of tiling engine operations
#[derive(Debug, Error)]
pub enum TileError {
    #[error("workspace is not attached to a screen")]
    NotAttached,
    #[error("workspace has no columns")]
    NoColumns,
    #[error("window 0x{0:x} is not managed by this workspace")]
    NotManaged(Window),
    #[error("window is already at the top of its column")]
    AtTop,
    #[error("window is already at the bottom of its column")]
    AtBottom,
    #[error("window is already in the first column")]
    AtFirstColumn,
    #[error("window is already in the last column")]
    AtLastColumn,
    #[error(transparent)]
    Protocol(#[from] anyhow::Error),
}

impl TileError {
    /// "Not found" is expected when an operation is broadcast to every workspace
    pub fn is_not_managed(&self) -> bool {
        matches!(self, TileError::NotManaged(_))
    }
}

/// A top-level client window under management
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagedWindow {
    pub window: Window,
    /// Height adjustment relative to the equal share of its column
    pub size_delta: i32,
}

impl ManagedWindow {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            size_delta: 0,
        }
    }

    pub fn resize(&mut self, delta: i32) {
        self.size_delta = self.size_delta.saturating_add(delta);
    }
}

/// A vertical stack of windows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Column {
    pub windows: Vec<ManagedWindow>,
    /// Width adjustment relative to the equal share of the workspace
    pub size_delta: i32,
}

impl Column {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(window: Window) -> Self {
        Self {
            windows: vec![ManagedWindow::new(window)],
            size_delta: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    fn position(&self, window: Window) -> Option<usize> {
        self.windows.iter().position(|w| w.window == window)
    }

    pub fn resize(&mut self, delta: i32) {
        self.size_delta = self.size_delta.saturating_add(delta);
    }
}

/// Find a window as (column index, row index)
fn locate(columns: &[Column], window: Window) -> Option<(usize, usize)> {
    columns
        .iter()
        .enumerate()
        .find_map(|(c, column)| column.position(window).map(|r| (c, r)))
}

/// A row of columns bound to one screen
#[derive(Debug)]
pub struct Workspace {
    screen: Option<Rect>,
    columns: Mutex<Vec<Column>>,
}

impl Workspace {
    pub fn new(screen: Option<Rect>) -> Self {
        Self {
            screen,
            columns: Mutex::new(Vec::new()),
        }
    }

    pub fn screen(&self) -> Option<Rect> {
        self.screen
    }

    /// A poisoned lock still holds a structurally valid column list
    fn lock(&self) -> MutexGuard<'_, Vec<Column>> {
        self.columns.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current columns
    pub fn snapshot(&self) -> Vec<Column> {
        self.lock().clone()
    }

    #[cfg(test)]
    pub fn contains(&self, window: Window) -> bool {
        locate(&self.lock(), window).is_some()
    }

    /// Take a window under management and place it in a column.
    ///
    /// The border and event subscription are requested first; if either
    /// fails the window stays unmanaged.
    pub fn add_window<B: Backend>(
        &self,
        backend: &B,
        window: Window,
        cfg: &LayoutConfig,
    ) -> Result<(), TileError> {
        backend.set_border_width(window, cfg.border_width)?;
        backend.select_input(window, EventMask::STRUCTURE_NOTIFY | EventMask::ENTER_WINDOW)?;

        if self.insert(window) {
            log::info!("Managing window 0x{:x}", window);
        } else {
            log::debug!("Window 0x{:x} is already managed", window);
        }
        Ok(())
    }

    /// Place a window in the column layout without talking to the server.
    ///
    /// Returns false if the window was already managed here.
    pub fn insert(&self, window: Window) -> bool {
        let mut columns = self.lock();
        if locate(&columns, window).is_some() {
            return false;
        }

        match columns.len() {
            0 => columns.push(Column::with_window(window)),
            1 if !columns[0].is_empty() => columns.push(Column::with_window(window)),
            _ => {
                let target = columns
                    .iter()
                    .position(Column::is_empty)
                    .unwrap_or(columns.len() - 1);
                columns[target].windows.push(ManagedWindow::new(window));
            }
        }
        true
    }

    /// Stop managing a window, keeping the order of the others
    pub fn remove_window(&self, window: Window) -> Result<(), TileError> {
        let mut columns = self.lock();
        let (c, r) = locate(&columns, window).ok_or(TileError::NotManaged(window))?;
        columns[c].windows.remove(r);
        log::debug!("Removed window 0x{:x} from column {}", window, c);
        Ok(())
    }

    /// Move a window one step in a direction.
    ///
    /// Up/Down swap with the vertical neighbour. Left/Right append the
    /// window to the adjacent column. The window keeps its size delta.
    pub fn move_window(&self, window: Window, direction: Direction) -> Result<(), TileError> {
        let mut columns = self.lock();
        let (c, r) = locate(&columns, window).ok_or(TileError::NotManaged(window))?;

        match direction {
            Direction::Up => {
                if r == 0 {
                    return Err(TileError::AtTop);
                }
                columns[c].windows.swap(r, r - 1);
            }
            Direction::Down => {
                if r + 1 >= columns[c].windows.len() {
                    return Err(TileError::AtBottom);
                }
                columns[c].windows.swap(r, r + 1);
            }
            Direction::Left => {
                if c == 0 {
                    return Err(TileError::AtFirstColumn);
                }
                let managed = columns[c].windows.remove(r);
                columns[c - 1].windows.push(managed);
            }
            Direction::Right => {
                if c + 1 >= columns.len() {
                    return Err(TileError::AtLastColumn);
                }
                let managed = columns[c].windows.remove(r);
                columns[c + 1].windows.push(managed);
            }
        }
        Ok(())
    }

    pub fn up(&self, window: Window) -> Result<(), TileError> {
        self.move_window(window, Direction::Up)
    }

    pub fn down(&self, window: Window) -> Result<(), TileError> {
        self.move_window(window, Direction::Down)
    }

    pub fn left(&self, window: Window) -> Result<(), TileError> {
        self.move_window(window, Direction::Left)
    }

    pub fn right(&self, window: Window) -> Result<(), TileError> {
        self.move_window(window, Direction::Right)
    }

    /// Resize a window inside its column.
    ///
    /// Up shrinks the top window and grows any other; Down does the reverse.
    pub fn resize_window(
        &self,
        window: Window,
        direction: Direction,
        step: i32,
    ) -> Result<(), TileError> {
        let mut columns = self.lock();
        let (c, r) = locate(&columns, window).ok_or(TileError::NotManaged(window))?;
        let delta = if (r == 0) == direction.towards_start() { -step } else { step };
        columns[c].windows[r].resize(delta);
        Ok(())
    }

    /// Resize the column holding a window.
    ///
    /// Left shrinks the first column and grows any other; Right does the reverse.
    pub fn resize_column(
        &self,
        window: Window,
        direction: Direction,
        step: i32,
    ) -> Result<(), TileError> {
        let mut columns = self.lock();
        let (c, _) = locate(&columns, window).ok_or(TileError::NotManaged(window))?;
        let delta = if (c == 0) == direction.towards_start() { -step } else { step };
        columns[c].resize(delta);
        Ok(())
    }

    /// Append an empty column on the right
    pub fn new_column(&self) {
        self.lock().push(Column::new());
    }

    /// Drop every column without windows; returns whether anything changed
    pub fn delete_empty_columns(&self) -> bool {
        let mut columns = self.lock();
        let before = columns.len();
        columns.retain(|c| !c.is_empty());
        before != columns.len()
    }

    /// Place every window according to the current columns.
    ///
    /// Placement is best effort: every window is attempted and the first
    /// failure is returned afterwards. If `active` is still laid out here the
    /// pointer is warped back inside it.
    pub fn tile_windows<B: Backend>(
        &self,
        backend: &B,
        active: Option<Window>,
        cfg: &LayoutConfig,
    ) -> Result<(), TileError> {
        let screen = self.screen.ok_or(TileError::NotAttached)?;
        let columns = self.snapshot();
        if columns.is_empty() {
            return Err(TileError::NoColumns);
        }

        let placements = compute_layout(screen, &columns, cfg.absorb_remainder);
        let mut first_error: Option<anyhow::Error> = None;

        for (window, slot) in &placements {
            let rect = slot.inset(cfg.border_width);
            log::debug!("Placing 0x{:x} at {}", window, rect);
            if let Err(e) = backend.place(*window, rect) {
                log::warn!("Failed to place window 0x{:x}: {}", window, e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        if let Some(active) = active.filter(|a| placements.iter().any(|(w, _)| w == a)) {
            if let Err(e) = backend.warp_pointer(active, cfg.warp_offset, cfg.warp_offset) {
                log::warn!("Failed to warp pointer to 0x{:x}: {}", active, e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        backend.flush()?;

        match first_error {
            Some(e) => Err(TileError::Protocol(e)),
            None => Ok(()),
        }
    }

    /// Window ids per column, for assertions
    #[cfg(test)]
    pub fn window_columns(&self) -> Vec<Vec<Window>> {
        self.lock()
            .iter()
            .map(|c| c.windows.iter().map(|w| w.window).collect())
            .collect()
    }
}

/// Compute the outer rectangle of every window.
///
/// Columns without windows still take their share of the width but
/// produce no placements.
pub fn compute_layout(
    screen: Rect,
    columns: &[Column],
    absorb_remainder: bool,
) -> Vec<(Window, Rect)> {
    let column_deltas: Vec<i32> = columns.iter().map(|c| c.size_delta).collect();
    let slots = partition(screen.x, screen.width, &column_deltas, absorb_remainder);

    let mut placements = Vec::new();
    for (column, (x, width)) in columns.iter().zip(slots) {
        if column.is_empty() {
            continue;
        }
        let window_deltas: Vec<i32> = column.windows.iter().map(|w| w.size_delta).collect();
        let rows = partition(screen.y, screen.height, &window_deltas, absorb_remainder);
        for (managed, (y, height)) in column.windows.iter().zip(rows) {
            placements.push((managed.window, Rect::new(x, y, width, height)));
        }
    }
    placements
}

/// Split `extent` pixels starting at `origin` into one span per delta.
///
/// Each span gets `(extent - sum(deltas)) / n + delta`, truncating. The
/// truncation remainder goes to the last span when `absorb_remainder` is
/// set and is otherwise left as a gap at the end. Negative sizes clamp
/// to zero; the running offset does not.
fn partition(origin: i32, extent: u32, deltas: &[i32], absorb_remainder: bool) -> Vec<(i32, u32)> {
    if deltas.is_empty() {
        return Vec::new();
    }

    let count = deltas.len() as i64;
    let total_delta: i64 = deltas.iter().map(|&d| i64::from(d)).sum();
    let available = i64::from(extent) - total_delta;
    let share = available / count;
    let remainder = available - share * count;

    let mut offset = i64::from(origin);
    let last = deltas.len() - 1;
    deltas
        .iter()
        .enumerate()
        .map(|(i, &delta)| {
            let mut size = share + i64::from(delta);
            if absorb_remainder && i == last {
                size += remainder;
            }
            let start = offset;
            offset += size;
            (
                start.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
                size.clamp(0, i64::from(u32::MAX)) as u32,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{Call, FakeBackend};
    use proptest::prelude::*;

    const A: Window = 0xa;
    const B: Window = 0xb;
    const C: Window = 0xc;

    fn flat() -> LayoutConfig {
        LayoutConfig {
            border_width: 0,
            ..LayoutConfig::default()
        }
    }

    fn workspace_with(columns: &[&[Window]]) -> Workspace {
        let ws = Workspace::new(Some(Rect::new(0, 0, 1000, 800)));
        {
            let mut guard = ws.lock();
            for windows in columns {
                guard.push(Column {
                    windows: windows.iter().map(|&w| ManagedWindow::new(w)).collect(),
                    size_delta: 0,
                });
            }
        }
        ws
    }

    #[test]
    fn test_first_window_creates_column() {
        let ws = Workspace::new(None);
        assert!(ws.insert(A));
        assert_eq!(ws.window_columns(), vec![vec![A]]);
    }

    #[test]
    fn test_second_window_opens_second_column() {
        let ws = Workspace::new(None);
        ws.insert(A);
        ws.insert(B);
        assert_eq!(ws.window_columns(), vec![vec![A], vec![B]]);
    }

    #[test]
    fn test_single_empty_column_is_reused() {
        let ws = workspace_with(&[&[]]);
        ws.insert(A);
        assert_eq!(ws.window_columns(), vec![vec![A]]);
    }

    #[test]
    fn test_fills_first_empty_column() {
        let ws = workspace_with(&[&[A], &[], &[B], &[]]);
        ws.insert(C);
        assert_eq!(ws.window_columns(), vec![vec![A], vec![C], vec![B], vec![]]);
    }

    #[test]
    fn test_appends_to_last_column_when_none_empty() {
        let ws = workspace_with(&[&[A], &[B]]);
        ws.insert(C);
        assert_eq!(ws.window_columns(), vec![vec![A], vec![B, C]]);
    }

    #[test]
    fn test_duplicate_insert_is_noop() {
        let ws = workspace_with(&[&[A], &[B]]);
        assert!(!ws.insert(A));
        assert_eq!(ws.window_columns(), vec![vec![A], vec![B]]);
    }

    #[test]
    fn test_add_window_sets_border_and_events() {
        let backend = FakeBackend::new();
        let ws = Workspace::new(None);
        ws.add_window(&backend, A, &LayoutConfig::default()).unwrap();

        assert_eq!(backend.calls(), vec![Call::BorderWidth(A, 2), Call::SelectInput(A)]);
        assert!(ws.contains(A));
    }

    #[test]
    fn test_add_window_setup_failure_leaves_unmanaged() {
        let backend = FakeBackend::new();
        backend.failing_setup.lock().unwrap().insert(A);
        let ws = Workspace::new(None);

        let err = ws.add_window(&backend, A, &LayoutConfig::default()).unwrap_err();
        assert!(matches!(err, TileError::Protocol(_)));
        assert!(!ws.contains(A));
        assert!(ws.window_columns().is_empty());
    }

    #[test]
    fn test_remove_window_once() {
        let ws = workspace_with(&[&[A, B, C]]);
        ws.remove_window(B).unwrap();
        assert_eq!(ws.window_columns(), vec![vec![A, C]]);

        let err = ws.remove_window(B).unwrap_err();
        assert!(err.is_not_managed());
    }

    #[test]
    fn test_remove_unknown_window() {
        let ws = Workspace::new(None);
        assert!(matches!(ws.remove_window(A), Err(TileError::NotManaged(A))));
    }

    #[test]
    fn test_remove_keeps_empty_column() {
        let ws = workspace_with(&[&[A], &[B]]);
        ws.remove_window(A).unwrap();
        assert_eq!(ws.window_columns(), vec![vec![], vec![B]]);
    }

    #[test]
    fn test_up_down_swap() {
        let ws = workspace_with(&[&[A, B, C]]);
        ws.up(C).unwrap();
        assert_eq!(ws.window_columns(), vec![vec![A, C, B]]);
        ws.down(A).unwrap();
        assert_eq!(ws.window_columns(), vec![vec![C, A, B]]);
    }

    #[test]
    fn test_vertical_boundaries() {
        let ws = workspace_with(&[&[A, B]]);
        assert!(matches!(ws.up(A), Err(TileError::AtTop)));
        assert!(matches!(ws.down(B), Err(TileError::AtBottom)));
        assert_eq!(ws.window_columns(), vec![vec![A, B]]);
    }

    #[test]
    fn test_left_right_append_to_neighbour() {
        let ws = workspace_with(&[&[A], &[B, C]]);
        ws.left(B).unwrap();
        assert_eq!(ws.window_columns(), vec![vec![A, B], vec![C]]);
        ws.right(A).unwrap();
        assert_eq!(ws.window_columns(), vec![vec![B], vec![C, A]]);
    }

    #[test]
    fn test_horizontal_boundaries() {
        let ws = workspace_with(&[&[A], &[B]]);
        assert!(matches!(ws.left(A), Err(TileError::AtFirstColumn)));
        assert!(matches!(ws.right(B), Err(TileError::AtLastColumn)));
    }

    #[test]
    fn test_move_unknown_is_distinct_from_boundary() {
        let ws = workspace_with(&[&[A]]);
        let err = ws.up(C).unwrap_err();
        assert!(err.is_not_managed());
        assert!(!ws.up(A).unwrap_err().is_not_managed());
    }

    #[test]
    fn test_move_keeps_size_delta() {
        let ws = workspace_with(&[&[A, B], &[C]]);
        ws.resize_window(B, Direction::Up, 10).unwrap();
        ws.right(B).unwrap();
        let columns = ws.snapshot();
        assert_eq!(columns[1].windows[1], ManagedWindow { window: B, size_delta: 10 });
    }

    #[test]
    fn test_resize_window_directions() {
        let ws = workspace_with(&[&[A, B]]);
        ws.resize_window(A, Direction::Up, 10).unwrap();
        ws.resize_window(B, Direction::Up, 10).unwrap();
        let column = &ws.snapshot()[0];
        assert_eq!(column.windows[0].size_delta, -10);
        assert_eq!(column.windows[1].size_delta, 10);

        ws.resize_window(A, Direction::Down, 10).unwrap();
        ws.resize_window(B, Direction::Down, 10).unwrap();
        let column = &ws.snapshot()[0];
        assert_eq!(column.windows[0].size_delta, 0);
        assert_eq!(column.windows[1].size_delta, 0);
    }

    #[test]
    fn test_resize_column_directions() {
        let ws = workspace_with(&[&[A], &[B]]);
        ws.resize_column(A, Direction::Left, 10).unwrap();
        ws.resize_column(B, Direction::Left, 10).unwrap();
        let columns = ws.snapshot();
        assert_eq!(columns[0].size_delta, -10);
        assert_eq!(columns[1].size_delta, 10);

        ws.resize_column(A, Direction::Right, 5).unwrap();
        assert_eq!(ws.snapshot()[0].size_delta, -5);
        assert!(ws.resize_column(C, Direction::Right, 5).unwrap_err().is_not_managed());
    }

    #[test]
    fn test_new_and_delete_empty_columns() {
        let ws = workspace_with(&[&[A], &[B]]);
        ws.new_column();
        assert_eq!(ws.window_columns(), vec![vec![A], vec![B], vec![]]);

        ws.remove_window(A).unwrap();
        assert!(ws.delete_empty_columns());
        assert_eq!(ws.window_columns(), vec![vec![B]]);
        assert!(!ws.delete_empty_columns());
    }

    #[test]
    fn test_tile_not_attached() {
        let backend = FakeBackend::new();
        let ws = Workspace::new(None);
        ws.insert(A);
        let err = ws.tile_windows(&backend, None, &flat()).unwrap_err();
        assert!(matches!(err, TileError::NotAttached));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_tile_no_columns() {
        let backend = FakeBackend::new();
        let ws = Workspace::new(Some(Rect::new(0, 0, 100, 100)));
        assert!(matches!(
            ws.tile_windows(&backend, None, &flat()),
            Err(TileError::NoColumns)
        ));
    }

    #[test]
    fn test_tile_empty_column_places_nothing() {
        let backend = FakeBackend::new();
        let ws = workspace_with(&[&[]]);
        ws.tile_windows(&backend, Some(A), &flat()).unwrap();
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_tile_two_windows() {
        let backend = FakeBackend::new();
        let ws = Workspace::new(Some(Rect::new(0, 0, 1000, 800)));
        ws.insert(A);
        ws.insert(B);

        ws.tile_windows(&backend, None, &flat()).unwrap();
        assert_eq!(
            backend.placements(),
            vec![(A, Rect::new(0, 0, 500, 800)), (B, Rect::new(500, 0, 500, 800))]
        );
    }

    #[test]
    fn test_tile_subtracts_border() {
        let backend = FakeBackend::new();
        let ws = workspace_with(&[&[A], &[B]]);
        ws.tile_windows(&backend, None, &LayoutConfig::default()).unwrap();
        assert_eq!(
            backend.placements(),
            vec![(A, Rect::new(0, 0, 496, 796)), (B, Rect::new(500, 0, 496, 796))]
        );
    }

    #[test]
    fn test_tile_stacks_column() {
        let backend = FakeBackend::new();
        let ws = workspace_with(&[&[A, B]]);
        ws.resize_window(B, Direction::Up, 100).unwrap();
        ws.tile_windows(&backend, None, &flat()).unwrap();

        // (800 - 100) / 2 = 350; B gets 350 + 100
        assert_eq!(
            backend.placements(),
            vec![(A, Rect::new(0, 0, 1000, 350)), (B, Rect::new(0, 350, 1000, 450))]
        );
    }

    #[test]
    fn test_tile_keeps_going_after_failure() {
        let backend = FakeBackend::new();
        backend.failing_place.lock().unwrap().insert(A);
        let ws = workspace_with(&[&[A], &[B]]);

        let err = ws.tile_windows(&backend, None, &flat()).unwrap_err();
        assert!(matches!(err, TileError::Protocol(_)));
        assert_eq!(backend.placements(), vec![(B, Rect::new(500, 0, 500, 800))]);
    }

    #[test]
    fn test_tile_warps_to_active() {
        let backend = FakeBackend::new();
        let ws = workspace_with(&[&[A], &[B]]);
        ws.tile_windows(&backend, Some(B), &flat()).unwrap();
        assert_eq!(backend.calls().last(), Some(&Call::Warp(B, 10, 10)));

        // A window laid out elsewhere does not move the pointer
        backend.clear();
        ws.tile_windows(&backend, Some(C), &flat()).unwrap();
        assert!(!backend.calls().iter().any(|c| matches!(c, Call::Warp(..))));
    }

    #[test]
    fn test_layout_uses_screen_origin() {
        let columns = vec![Column::with_window(A), Column::with_window(B)];
        let placements = compute_layout(Rect::new(1280, 100, 800, 600), &columns, true);
        assert_eq!(
            placements,
            vec![(A, Rect::new(1280, 100, 400, 600)), (B, Rect::new(1680, 100, 400, 600))]
        );
    }

    #[test]
    fn test_truncation_remainder() {
        let columns = vec![Column::with_window(A), Column::with_window(B), Column::with_window(C)];
        let screen = Rect::new(0, 0, 1000, 10);

        let truncated = compute_layout(screen, &columns, false);
        assert_eq!(truncated[2].1, Rect::new(666, 0, 333, 10));

        let absorbed = compute_layout(screen, &columns, true);
        assert_eq!(absorbed[2].1, Rect::new(666, 0, 334, 10));
    }

    #[test]
    fn test_degenerate_sizes_clamp() {
        let mut first = Column::with_window(A);
        first.resize(-2000);
        let columns = vec![first, Column::with_window(B)];

        let placements = compute_layout(Rect::new(0, 0, 1000, 800), &columns, true);
        // share = (1000 + 2000) / 2 = 1500; A collapses, B starts at -500
        assert_eq!(placements[0].1.width, 0);
        assert_eq!(placements[1].1, Rect::new(-500, 0, 1500, 800));
        assert_eq!(placements[0].1.inset(2).width, 1);
    }

    fn arb_columns() -> impl Strategy<Value = Vec<usize>> {
        prop::collection::vec(1usize..5, 1..6)
    }

    fn build(counts: &[usize]) -> Vec<Column> {
        let mut next = 1;
        counts
            .iter()
            .map(|&n| {
                let windows = (0..n)
                    .map(|_| {
                        next += 1;
                        ManagedWindow::new(next)
                    })
                    .collect();
                Column {
                    windows,
                    size_delta: 0,
                }
            })
            .collect()
    }

    proptest! {
        #[test]
        fn prop_layout_covers_screen(
            counts in arb_columns(),
            width in 1u32..4000,
            height in 1u32..3000,
        ) {
            let columns = build(&counts);
            let screen = Rect::new(0, 0, width, height);
            let placements = compute_layout(screen, &columns, true);

            let mut idx = 0;
            let mut x = 0;
            for (column, &n) in columns.iter().zip(&counts) {
                let rects: Vec<Rect> = placements[idx..idx + n].iter().map(|(_, r)| *r).collect();
                prop_assert_eq!(rects[0].x, x);
                let mut y = 0;
                for (managed, rect) in column.windows.iter().zip(&rects) {
                    prop_assert_eq!(placements[idx].0, managed.window);
                    prop_assert_eq!(rect.x, x);
                    prop_assert_eq!(rect.width, rects[0].width);
                    prop_assert_eq!(rect.y, y);
                    y = rect.bottom();
                    idx += 1;
                }
                prop_assert_eq!(y, height as i32);
                x = rects[0].right();
            }
            prop_assert_eq!(x, width as i32);
        }

        #[test]
        fn prop_truncation_gap_is_bounded(
            counts in arb_columns(),
            width in 1u32..4000,
        ) {
            let columns = build(&counts);
            let placements = compute_layout(Rect::new(0, 0, width, 100), &columns, false);
            let right = placements.iter().map(|(_, r)| r.right()).max().unwrap();
            let gap = width as i32 - right;
            prop_assert!(gap >= 0);
            prop_assert!(gap < counts.len() as i32);
        }

        #[test]
        fn prop_resize_is_additive(d1 in -1000i32..1000, d2 in -1000i32..1000) {
            let mut twice = Column::new();
            twice.resize(d1);
            twice.resize(d2);
            let mut once = Column::new();
            once.resize(d1 + d2);
            prop_assert_eq!(twice, once);

            let mut window = ManagedWindow::new(A);
            window.resize(d1);
            window.resize(d2);
            prop_assert_eq!(window.size_delta, d1 + d2);
        }

        #[test]
        fn prop_placement_prefers_empty_then_last(
            ops in prop::collection::vec(any::<bool>(), 1..30),
        ) {
            // true adds a window, false opens an empty column
            let ws = Workspace::new(None);
            let mut next: Window = 1;
            for add in ops {
                if !add {
                    ws.new_column();
                    continue;
                }
                let before = ws.window_columns();
                let expected = match before.len() {
                    0 => 0,
                    1 if !before[0].is_empty() => 1,
                    n => before.iter().position(Vec::is_empty).unwrap_or(n - 1),
                };
                next += 1;
                prop_assert!(ws.insert(next));
                let after = ws.window_columns();
                prop_assert_eq!(after[expected].last(), Some(&next));
                prop_assert_eq!(
                    after.iter().map(Vec::len).sum::<usize>(),
                    before.iter().map(Vec::len).sum::<usize>() + 1
                );
            }
        }
    }
}
