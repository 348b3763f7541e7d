//! GnuPG command runner.
//!
//! Shared by the key store and the decryption engine. Every invocation is
//! non-interactive (`--batch`) and honours the configured home directory.

use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use tracing::{debug, trace};

use crate::core::config::GpgConfig;
use crate::error::KeyStoreError;

/// Location and settings of the `gpg` and `gpg-connect-agent` binaries.
#[derive(Debug, Clone)]
pub struct Gpg {
    binary: String,
    agent_binary: String,
    homedir: Option<PathBuf>,
}

impl Gpg {
    pub fn new(config: &GpgConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            agent_binary: config.agent_binary.clone(),
            homedir: config.homedir.clone(),
        }
    }

    /// Check that the gpg binary can be found.
    pub fn check(&self) -> Result<(), KeyStoreError> {
        which::which(&self.binary)
            .map(|path| debug!(gpg = %path.display(), "found gpg"))
            .map_err(|_| KeyStoreError::Unavailable(self.binary.clone()))
    }

    /// A `gpg --batch` command with the home directory applied.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--batch");
        if let Some(home) = &self.homedir {
            cmd.arg("--homedir").arg(home);
        }
        cmd
    }

    /// A `gpg-connect-agent` command with the home directory applied.
    pub fn agent_command(&self) -> Command {
        let mut cmd = Command::new(&self.agent_binary);
        if let Some(home) = &self.homedir {
            cmd.arg("--homedir").arg(home);
        }
        cmd
    }

    /// Run `cmd`, feeding `input` on stdin, and collect its output.
    pub fn run(&self, mut cmd: Command, input: Option<&[u8]>) -> std::io::Result<Output> {
        trace!(command = ?cmd.get_program(), args = cmd.get_args().count(), "running");

        cmd.stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

        let mut child = cmd.spawn()?;
        if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
            // gpg may exit before reading stdin (e.g. NO_SECKEY); its status
            // lines still explain why, so collect them either way
            match stdin.write_all(input) {
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    debug!("gpg closed stdin before reading it");
                }
                Err(e) => {
                    drop(stdin);
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(e);
                }
                Ok(()) => {}
            }
        }
        child.wait_with_output()
    }
}

impl Default for Gpg {
    fn default() -> Self {
        Self::new(&GpgConfig::default())
    }
}
