use super::runner::InstallerError;
use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Runs the external installer once, returning when it has exited.
///
/// The exit status is deliberately not part of the result: success is decided
/// by [`InstallState`](super::InstallState) afterwards.
pub trait InstallerLauncher {
    fn launch(&self) -> impl Future<Output = Result<(), InstallerError>> + Send;
}

impl<T: InstallerLauncher + ?Sized> InstallerLauncher for &T {
    fn launch(&self) -> impl Future<Output = Result<(), InstallerError>> + Send {
        (**self).launch()
    }
}

/// Spawns a process and relays its output line by line, prefixed with a tag.
#[derive(Clone, Debug)]
pub struct CommandLauncher {
    program: String,
    args: Vec<String>,
    tag: String,
}

impl CommandLauncher {
    pub fn new(program: impl Into<String>, args: Vec<String>, tag: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args,
            tag: tag.into(),
        }
    }

    /// `<runtime> -jar <jar>`
    pub fn java_jar(runtime: impl Into<String>, jar: &Path, tag: impl Into<String>) -> Self {
        Self::new(
            runtime,
            vec!["-jar".to_string(), jar.to_string_lossy().into_owned()],
            tag,
        )
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl InstallerLauncher for CommandLauncher {
    async fn launch(&self) -> Result<(), InstallerError> {
        debug!(program = %self.program, args = ?self.args, "Spawning installer");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| InstallerError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stderr_task = child.stderr.take().map(|stderr| {
            let tag = self.tag.clone();
            tokio::spawn(async move {
                relay_lines(stderr, |line| warn!("{}: {}", tag, line)).await;
            })
        });

        if let Some(stdout) = child.stdout.take() {
            relay_lines(stdout, |line| info!("{}: {}", self.tag, line)).await;
        }

        let status = child.wait().await.map_err(|source| InstallerError::Wait {
            program: self.program.clone(),
            source,
        })?;
        if let Some(task) = stderr_task {
            let _ = task.await;
        }

        debug!(program = %self.program, %status, "Installer exited");
        Ok(())
    }
}

/// Drains `reader` to the end, handing every line to `emit`.
///
/// Bytes that are not UTF-8 are replaced rather than ending the relay, so the
/// child never writes into a closed pipe.
async fn relay_lines<R: AsyncRead + Unpin>(reader: R, mut emit: impl FnMut(&str)) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                emit(line.trim_end_matches(['\n', '\r']));
            }
            Err(err) => {
                debug!("Stopped relaying installer output: {}", err);
                break;
            }
        }
    }
}
