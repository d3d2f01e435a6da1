use std::io::Write;
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("no command configured")]
    NotConfigured,
    #[error("could not run `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("`{program}` exited with {status}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    Copied,
    /// Nothing worked; show the text so it can be copied by hand.
    Manual(String),
}

pub trait ShareTarget {
    fn deliver(&self, text: &str) -> Result<(), ShareError>;
}

/// Runs a program and writes the text to its stdin.
#[derive(Clone, Debug)]
pub struct CommandTarget {
    argv: Vec<String>,
}

impl CommandTarget {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    pub fn from_config(argv: Option<&Vec<String>>) -> Option<Self> {
        argv.filter(|a| !a.is_empty()).map(|a| Self::new(a.clone()))
    }
}

impl ShareTarget for CommandTarget {
    fn deliver(&self, text: &str) -> Result<(), ShareError> {
        let Some((program, args)) = self.argv.split_first() else {
            return Err(ShareError::NotConfigured);
        };
        let spawn_err = |source| ShareError::Spawn {
            program: program.clone(),
            source,
        };
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(spawn_err)?;
        if let Some(mut stdin) = child.stdin.take() {
            let written = stdin.write_all(text.as_bytes());
            drop(stdin);
            if let Err(err) = written {
                // Reap the child before bailing out.
                let _ = child.wait();
                return Err(spawn_err(err));
            }
        }
        let status = child.wait().map_err(spawn_err)?;
        if status.success() {
            Ok(())
        } else {
            Err(ShareError::Failed {
                program: program.clone(),
                status,
            })
        }
    }
}

/// Try the share target, then the clipboard, then fall back to manual copy.
pub fn share_text(
    text: &str,
    share: Option<&dyn ShareTarget>,
    clipboard: Option<&dyn ShareTarget>,
) -> ShareOutcome {
    if let Some(target) = share {
        match target.deliver(text) {
            Ok(()) => {
                info!("results_shared");
                return ShareOutcome::Shared;
            }
            Err(err) => debug!(%err, "share_failed"),
        }
    }
    if let Some(target) = clipboard {
        match target.deliver(text) {
            Ok(()) => {
                info!("results_copied");
                return ShareOutcome::Copied;
            }
            Err(err) => debug!(%err, "clipboard_failed"),
        }
    }
    ShareOutcome::Manual(text.to_string())
}

/// Clipboard program for the current platform, if there is a usual one.
pub fn default_clipboard_command() -> Option<Vec<String>> {
    let argv: &[&str] = if cfg!(target_os = "macos") {
        &["pbcopy"]
    } else if cfg!(target_os = "windows") {
        &["clip"]
    } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
        &["wl-copy"]
    } else if std::env::var_os("DISPLAY").is_some() {
        &["xclip", "-selection", "clipboard"]
    } else {
        return None;
    };
    Some(argv.iter().map(|s| s.to_string()).collect())
}
