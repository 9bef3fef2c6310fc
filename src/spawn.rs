//! Launching the terminal.
//!
//! Children run in their own session so they outlive the window manager,
//! and are reaped from a background thread so no zombies pile up.

use std::process::Command;
use std::thread;

use anyhow::{Context, Result};

/// A program plus arguments, parsed from the configured command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    program: String,
    args: Vec<String>,
}

impl Terminal {
    /// Split a command line on whitespace after expanding `~`.
    ///
    /// Returns `None` for an empty command.
    pub fn parse(command: &str) -> Option<Self> {
        let expanded = shellexpand::tilde(command);
        let mut parts = expanded.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Start the program without waiting for it; returns its pid
    pub fn spawn(&self) -> Result<u32> {
        log::info!("Spawning terminal: {} {:?}", self.program, self.args);

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        // Detach from colwm's session so terminals survive if it exits
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            unsafe {
                cmd.pre_exec(|| {
                    libc::setsid();
                    Ok(())
                });
            }
        }

        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn {}", self.program))?;
        let pid = child.id();

        let reaper = thread::Builder::new()
            .name(format!("reap-{}", pid))
            .spawn(move || match child.wait() {
                Ok(status) => log::debug!("Child {} exited: {}", pid, status),
                Err(e) => log::warn!("Failed to wait for child {}: {}", pid, e),
            });
        if let Err(e) = reaper {
            log::warn!("Could not start reaper for child {}: {}", pid, e);
        }

        Ok(pid)
    }
}
