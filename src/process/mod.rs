//! Child process execution with streamed, merged output.
//!
//! An [`Execution`] hands back the child's output as a line stream and its
//! exit code as a separate value delivered once the stream is exhausted.
//! Standard output lines come first, then standard error lines. Both pipes
//! are read concurrently so a chatty child never blocks on a full pipe.

use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};

/// Exit code reported when the child could not be launched or waited on.
pub const LAUNCH_FAILURE: i32 = -1;

const LINE_BUFFER: usize = 256;

/// A running (or finished) child process.
pub struct Execution {
    lines: mpsc::Receiver<String>,
    completion: oneshot::Receiver<i32>,
}

impl Execution {
    /// An execution that already finished with `lines` and `code`.
    pub fn finished<I, S>(lines: I, code: i32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        let (line_tx, line_rx) = mpsc::channel(lines.len().max(1));
        for line in lines {
            // Capacity covers every line
            let _ = line_tx.try_send(line);
        }
        let (exit_tx, exit_rx) = oneshot::channel();
        let _ = exit_tx.send(code);
        Self {
            lines: line_rx,
            completion: exit_rx,
        }
    }

    /// Next output line, `None` once both pipes are drained.
    pub async fn next_line(&mut self) -> Option<String> {
        self.lines.recv().await
    }

    /// Discard any remaining output and wait for the exit code.
    pub async fn exit_code(mut self) -> i32 {
        while self.lines.recv().await.is_some() {}
        self.completion.await.unwrap_or(LAUNCH_FAILURE)
    }

    /// Gather all output lines and the exit code.
    pub async fn collect(mut self) -> (Vec<String>, i32) {
        let mut lines = Vec::new();
        while let Some(line) = self.lines.recv().await {
            lines.push(line);
        }
        let code = self.completion.await.unwrap_or(LAUNCH_FAILURE);
        (lines, code)
    }
}

/// Launches external commands.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn execute(&self, program: &str, args: &[String]) -> Execution;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn execute(&self, program: &str, args: &[String]) -> Execution {
        let (line_tx, line_rx) = mpsc::channel(LINE_BUFFER);
        let (exit_tx, exit_rx) = oneshot::channel();
        let execution = Execution {
            lines: line_rx,
            completion: exit_rx,
        };

        let mut child = match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                tracing::error!("failed to launch {}: {}", program, e);
                let _ = exit_tx.send(LAUNCH_FAILURE);
                return execution;
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Stderr is buffered so it can follow stdout in the merged stream
        let stderr_task = tokio::spawn(async move {
            let mut buffered = Vec::new();
            if let Some(stderr) = stderr {
                let mut reader = BufReader::new(stderr);
                let mut buf = Vec::new();
                while let Some(line) = read_line_lossy(&mut reader, &mut buf).await {
                    buffered.push(line);
                }
            }
            buffered
        });

        let program = program.to_string();
        tokio::spawn(async move {
            if let Some(stdout) = stdout {
                let mut reader = BufReader::new(stdout);
                let mut buf = Vec::new();
                while let Some(line) = read_line_lossy(&mut reader, &mut buf).await {
                    // Keep draining even if the consumer went away
                    let _ = line_tx.send(line).await;
                }
            }
            for line in stderr_task.await.unwrap_or_default() {
                let _ = line_tx.send(line).await;
            }
            drop(line_tx);

            let code = match child.wait().await {
                Ok(status) => exit_code_of(status),
                Err(e) => {
                    tracing::error!("failed to wait for {}: {}", program, e);
                    LAUNCH_FAILURE
                }
            };
            tracing::debug!("exit code: {}", code);
            let _ = exit_tx.send(code);
        });

        execution
    }
}

/// Next line without its terminator, `None` at end of stream.
///
/// Bytes that are not valid UTF-8 are replaced rather than ending the stream.
async fn read_line_lossy<R>(reader: &mut R, buf: &mut Vec<u8>) -> Option<String>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    match reader.read_until(b'\n', buf).await {
        Ok(0) => None,
        Ok(_) => {
            if buf.last() == Some(&b'\n') {
                buf.pop();
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }
            }
            Some(String::from_utf8_lossy(buf).into_owned())
        }
        Err(e) => {
            tracing::debug!("stopped reading child output: {}", e);
            None
        }
    }
}

/// Space-joined command line, for logging.
pub fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    LAUNCH_FAILURE
}
