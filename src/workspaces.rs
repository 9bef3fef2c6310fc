//! Workspace registry.
//!
//! colwm keeps one workspace per screen. Which workspace owns a window is
//! not indexed, so operations on a window are broadcast: one background
//! thread per workspace tries the operation and retiles if it applied.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use x11rb::protocol::xproto::Window;

use crate::backend::Backend;
use crate::config::LayoutConfig;
use crate::layout::{TileError, Workspace};
use crate::types::Rect;

/// Result of one broadcast task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The operation changed this workspace and it was retiled
    Applied,
    /// The operation changed this workspace but retiling it failed
    RetileFailed,
    /// The window does not live in this workspace
    NotManaged,
    /// The operation was refused or failed
    Failed,
}

/// All workspaces, in screen order
pub struct Workspaces {
    workspaces: Vec<Arc<Workspace>>,
}

impl Workspaces {
    /// Create one workspace per screen.
    ///
    /// Without screens a single unattached workspace is created; it manages
    /// windows but refuses to tile them.
    pub fn new(screens: &[Rect]) -> Self {
        let workspaces = if screens.is_empty() {
            vec![Arc::new(Workspace::new(None))]
        } else {
            screens
                .iter()
                .map(|&screen| Arc::new(Workspace::new(Some(screen))))
                .collect()
        };
        Self { workspaces }
    }

    /// The workspace that receives newly mapped windows
    pub fn default_workspace(&self) -> &Arc<Workspace> {
        &self.workspaces[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Workspace>> {
        self.workspaces.iter()
    }

    /// Workspaces bound to a screen
    pub fn attached(&self) -> impl Iterator<Item = &Arc<Workspace>> {
        self.workspaces.iter().filter(|ws| ws.screen().is_some())
    }

    pub fn len(&self) -> usize {
        self.workspaces.len()
    }

    /// Run `op` against every workspace, one thread each.
    ///
    /// A workspace where `op` succeeds is retiled, and the task reports
    /// whether that retile worked. "Not managed" is the
    /// expected answer from every workspace but one and is only logged at
    /// debug level. The returned handles are never required to be joined.
    pub fn broadcast<B, F>(
        &self,
        backend: &Arc<B>,
        active: Option<Window>,
        cfg: LayoutConfig,
        label: &'static str,
        op: F,
    ) -> Vec<JoinHandle<TaskOutcome>>
    where
        B: Backend,
        F: Fn(&Workspace) -> Result<(), TileError> + Send + Sync + 'static,
    {
        let op = Arc::new(op);
        let mut handles = Vec::with_capacity(self.workspaces.len());

        for (index, ws) in self.workspaces.iter().enumerate() {
            let ws = Arc::clone(ws);
            let backend = Arc::clone(backend);
            let op = Arc::clone(&op);

            let spawned = thread::Builder::new()
                .name(format!("{}-{}", label, index))
                .spawn(move || match op(&ws) {
                    Ok(()) => match ws.tile_windows(&*backend, active, &cfg) {
                        Ok(()) => TaskOutcome::Applied,
                        Err(e) => {
                            log::warn!("Retile of workspace {} after {} failed: {}", index, label, e);
                            TaskOutcome::RetileFailed
                        }
                    },
                    Err(e) if e.is_not_managed() => {
                        log::debug!("{}: {} (workspace {})", label, e, index);
                        TaskOutcome::NotManaged
                    }
                    Err(e) => {
                        log::info!("{} on workspace {}: {}", label, index, e);
                        TaskOutcome::Failed
                    }
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => log::error!("Failed to start {} task: {}", label, e),
            }
        }

        handles
    }
}
