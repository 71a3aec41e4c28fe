//! Opening the rendered chart in the desktop image viewer.

use crate::traits::ChartViewer;
use emgraph_common::{EmGraphError, Result};
use std::{path::Path, process::Command};
use tracing::{debug, info};

/// Hands the image to the platform opener (`xdg-open`, `open` or `start`).
#[derive(Debug, Clone, Default)]
pub struct SystemViewer {
    program: Option<String>,
}

impl SystemViewer {
    /// Viewer using the platform default opener.
    pub const fn new() -> Self {
        Self { program: None }
    }

    /// Viewer running `program <path>` instead of the platform default.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: Some(program.into()),
        }
    }

    fn command(&self, path: &Path) -> Command {
        if let Some(program) = &self.program {
            let mut cmd = Command::new(program);
            cmd.arg(path);
            return cmd;
        }
        platform_command(path)
    }
}

#[cfg(target_os = "windows")]
fn platform_command(path: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]).arg(path);
    cmd
}

#[cfg(target_os = "macos")]
fn platform_command(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn platform_command(path: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}

impl ChartViewer for SystemViewer {
    fn show(&self, path: &Path) -> Result<()> {
        let mut cmd = self.command(path);
        debug!(command = ?cmd, "Launching image viewer");

        let status = cmd.status().map_err(|e| {
            EmGraphError::display_with_source(
                format!("Failed to launch image viewer for {}", path.display()),
                e,
            )
        })?;

        if !status.success() {
            return Err(EmGraphError::display(format!(
                "Image viewer exited with {status} for {}",
                path.display()
            )));
        }

        info!("Opened {} in image viewer", path.display());
        Ok(())
    }
}

/// Viewer used when display is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopViewer;

impl ChartViewer for NoopViewer {
    fn show(&self, path: &Path) -> Result<()> {
        debug!("Display disabled, chart left at {}", path.display());
        Ok(())
    }
}
