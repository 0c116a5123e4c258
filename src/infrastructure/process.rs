use crate::core::interfaces::{ProcessOutput, ProcessRequest, ProcessRunner};
use crate::utils::{Logger, OjPackError, Result};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Runs tools as child processes and waits for them. No timeout: a hung tool
/// hangs the caller.
pub struct TokioProcessRunner;

#[async_trait::async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, request: ProcessRequest) -> Result<ProcessOutput> {
        Logger::tool_invocation(&request.program, &request.args);

        let mut command = Command::new(&request.program);
        command
            .args(&request.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if request.stdin.is_some() { Stdio::piped() } else { Stdio::null() });

        if let Some(cwd) = &request.cwd {
            command.current_dir(cwd);
        }

        let mut child = command.spawn().map_err(|e| {
            OjPackError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to start `{}`: {}", request.program, e),
            ))
        })?;

        // Fed from its own task while stdout/stderr drain, so a child that
        // answers before reading all of its input cannot block on full pipes
        let feeder = match (request.stdin.clone(), child.stdin.take()) {
            (Some(input), Some(mut stdin)) => Some(tokio::spawn(async move {
                let written = stdin.write_all(input.as_bytes()).await;
                // Dropping closes the pipe so the child sees EOF
                drop(stdin);
                written
            })),
            _ => None,
        };

        let output = child.wait_with_output().await?;

        if let Some(feeder) = feeder {
            match feeder.await {
                Ok(Ok(())) => {}
                // The child exited without reading everything it was given
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => return Err(OjPackError::Io(e)),
                Err(e) => {
                    return Err(OjPackError::Io(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        format!("stdin writer for `{}` failed: {}", request.program, e),
                    )))
                }
            }
        }

        Ok(ProcessOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
