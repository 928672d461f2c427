use hwsel_kernel::selector::ConnectionGate;
use std::io;
use std::process::Command;
use tracing::debug;

/// Asks `snapctl is-connected` whether a snap interface is connected.
///
/// Exit status 0 means connected and 1 means not connected; any other
/// status, or failing to launch `snapctl`, is an error.
#[derive(Debug, Clone)]
pub struct SnapctlGate {
    program: String,
}

impl Default for SnapctlGate {
    fn default() -> Self {
        Self {
            program: "snapctl".to_string(),
        }
    }
}

impl SnapctlGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use another executable with the same calling convention.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl ConnectionGate for SnapctlGate {
    fn is_connected(&self, connection: &str) -> Result<bool, io::Error> {
        let output = Command::new(&self.program)
            .args(["is-connected", connection])
            .output()?;
        debug!(connection, status = %output.status, "checked snap connection");
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(io::Error::other(format!(
                "{} is-connected {connection}: {} {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }
}
