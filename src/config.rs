//! Configuration for colwm.
//!
//! Command-line flags come from clap. Settings are read from
//! ~/.config/colwm/config.toml if it exists, otherwise defaults are used.
//!
//! Also provides `LayoutConfig`, the resolved runtime values handed to the
//! tiling engine.

use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

// =============================================================================
// Command line
// =============================================================================

/// colwm - a column-tiling window manager for X11
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// X display to manage (default: $DISPLAY)
    #[arg(long)]
    pub display: Option<String>,

    /// Config file (default: ~/.config/colwm/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    pub verbose: bool,
}

// =============================================================================
// Runtime Configuration (resolved values)
// =============================================================================

/// Runtime layout parameters.
///
/// Copied into every background tiling task, so it stays `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Border width set on every managed window
    pub border_width: u32,
    /// Pixels added or removed by one resize command
    pub resize_step: i32,
    /// Pointer offset inside the active window after a retile
    pub warp_offset: i16,
    /// Give the integer division remainder to the last column/window
    pub absorb_remainder: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            border_width: 2,
            resize_step: 10,
            warp_offset: 10,
            absorb_remainder: true,
        }
    }
}

// =============================================================================
// File-based Configuration (TOML parsing)
// =============================================================================

/// Top-level configuration
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub layout: LayoutSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Terminal launched by alt+e
    pub terminal: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            terminal: "xterm".to_string(),
        }
    }
}

/// The `[layout]` table
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LayoutSection {
    pub border_width: u32,
    pub resize_step: i32,
    pub warp_offset: i16,
    pub absorb_remainder: bool,
}

impl Default for LayoutSection {
    fn default() -> Self {
        let defaults = LayoutConfig::default();
        Self {
            border_width: defaults.border_width,
            resize_step: defaults.resize_step,
            warp_offset: defaults.warp_offset,
            absorb_remainder: defaults.absorb_remainder,
        }
    }
}

impl Config {
    /// Default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("colwm")
            .join("config.toml")
    }

    /// Load config from a specific path; problems fall back to defaults
    pub fn load_from_path(path: PathBuf) -> Self {
        match std::fs::read_to_string(&path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {:?}", path);
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse config: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No config file found at {:?}, using defaults", path);
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Resolve the `[layout]` table into runtime values
    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            border_width: self.layout.border_width,
            resize_step: self.layout.resize_step,
            warp_offset: self.layout.warp_offset,
            absorb_remainder: self.layout.absorb_remainder,
        }
    }
}
