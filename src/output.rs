use std::io::Write;
use std::sync::Mutex;

/// Abstraction over user-facing output.
///
/// Orchestration code uses this trait instead of `println!`/`eprintln!` so
/// that streamed unit output can be captured by tests or suppressed when
/// maestro is embedded.
pub trait UserOutput: Send + Sync {
    /// Informational status message, also used for streamed child output
    fn status(&self, message: &str);

    /// Success message (e.g., "maestro exit code: 0")
    fn success(&self, message: &str);

    /// Warning message (e.g., "unit ... already running")
    fn warning(&self, message: &str);

    /// Error message (e.g., "maestro exit code: 3")
    fn error(&self, message: &str);

    /// Inline progress (no trailing newline). Call `finish_progress` after.
    fn progress(&self, message: &str);

    /// Finish an inline progress line with a result.
    fn finish_progress(&self, result: &str);

    /// A blank line separator.
    fn blank(&self);
}

/// Terminal output: plain status on stdout, colored verdicts and warnings.
pub struct CliOutput;

impl UserOutput for CliOutput {
    fn status(&self, message: &str) {
        println!("{}", message);
    }

    fn success(&self, message: &str) {
        println!("\x1b[32m{}\x1b[0m", message);
    }

    fn warning(&self, message: &str) {
        eprintln!("\x1b[33m{}\x1b[0m", message);
    }

    fn error(&self, message: &str) {
        eprintln!("\x1b[31m{}\x1b[0m", message);
    }

    fn progress(&self, message: &str) {
        print!("{}", message);
        std::io::stdout().flush().ok();
    }

    fn finish_progress(&self, result: &str) {
        println!("{}", result);
    }

    fn blank(&self) {
        println!();
    }
}

/// Suppresses all output.
pub struct QuietOutput;

impl UserOutput for QuietOutput {
    fn status(&self, _message: &str) {}
    fn success(&self, _message: &str) {}
    fn warning(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
    fn progress(&self, _message: &str) {}
    fn finish_progress(&self, _result: &str) {}
    fn blank(&self) {}
}

/// Records every message in order, without styling.
#[derive(Default)]
pub struct BufferedOutput {
    lines: Mutex<Vec<String>>,
}

impl BufferedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, one entry per line.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|lines| lines.clone()).unwrap_or_default()
    }

    fn push(&self, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(message.to_string());
        }
    }
}

impl UserOutput for BufferedOutput {
    fn status(&self, message: &str) {
        self.push(message);
    }

    fn success(&self, message: &str) {
        self.push(message);
    }

    fn warning(&self, message: &str) {
        self.push(message);
    }

    fn error(&self, message: &str) {
        self.push(message);
    }

    fn progress(&self, message: &str) {
        self.push(message);
    }

    fn finish_progress(&self, result: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            match lines.last_mut() {
                Some(last) => last.push_str(result),
                None => lines.push(result.to_string()),
            }
        }
    }

    fn blank(&self) {
        self.push("");
    }
}
