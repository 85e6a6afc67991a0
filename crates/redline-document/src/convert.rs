//! Equation markup conversion seam.
//!
//! Converting equation markup into a structured object is delegated to an
//! external collaborator. Editing code calls [`EquationConverter::convert`]
//! exactly once per equation-mode call, before touching the document.

use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::ConversionError;
use crate::model::Equation;

const CONVERTER_TARGET: &str = "redline_document::convert";

/// Deadline applied when none is configured.
pub const DEFAULT_CONVERTER_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Converts equation markup into an embeddable [`Equation`].
pub trait EquationConverter: Send + Sync {
    /// Converts `markup`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] when the markup cannot be converted.
    fn convert(&self, markup: &str) -> Result<Equation, ConversionError>;
}

/// Converter that pipes markup through an external program.
///
/// The markup is written to the program's standard input from a separate
/// thread while standard output and standard error are drained, so large
/// payloads cannot fill a pipe and stall both sides. The trimmed standard
/// output becomes the structured payload. A program still running when the
/// timeout passes is killed.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandConverter {
    /// Creates a converter running `program` with `args`.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: DEFAULT_CONVERTER_TIMEOUT,
        }
    }

    /// Kills the program when it runs longer than `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Same as [`CommandConverter::with_timeout`], in milliseconds as
    /// configured through `converter_timeout_ms`.
    #[must_use]
    pub const fn with_timeout_ms(self, timeout_ms: u64) -> Self {
        self.with_timeout(Duration::from_millis(timeout_ms))
    }

    fn spawn_error(&self, error: &io::Error) -> ConversionError {
        ConversionError::Spawn {
            program: self.program.clone(),
            message: error.to_string(),
        }
    }

    /// Polls `child` until it exits, killing it once the timeout passes.
    fn wait_for_exit(&self, child: &mut Child) -> Result<ExitStatus, ConversionError> {
        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if start.elapsed() >= self.timeout => {
                    let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                    warn!(
                        target: CONVERTER_TARGET,
                        program = %self.program,
                        timeout_ms,
                        "equation converter timed out, killing process"
                    );
                    drop(child.kill());
                    drop(child.wait());
                    return Err(ConversionError::TimedOut {
                        program: self.program.clone(),
                        timeout_ms,
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(error) => return Err(self.spawn_error(&error)),
            }
        }
    }

    fn join<T>(
        &self,
        handle: Option<JoinHandle<io::Result<T>>>,
    ) -> Result<Option<T>, ConversionError> {
        let Some(handle) = handle else {
            return Ok(None);
        };
        let result = handle.join().map_err(|_| ConversionError::Spawn {
            program: self.program.clone(),
            message: String::from("converter I/O thread panicked"),
        })?;
        result.map(Some).map_err(|error| self.spawn_error(&error))
    }
}

/// Writes `input` and closes the pipe. A program that exits without reading
/// reports through its status instead.
fn feed(mut stdin: impl Write, input: &[u8]) -> io::Result<()> {
    match stdin.write_all(input).and_then(|()| stdin.flush()) {
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

fn drain(mut source: impl Read) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    source.read_to_end(&mut buffer)?;
    Ok(buffer)
}

impl EquationConverter for CommandConverter {
    fn convert(&self, markup: &str) -> Result<Equation, ConversionError> {
        debug!(
            target: CONVERTER_TARGET,
            program = %self.program,
            markup_bytes = markup.len(),
            "spawning equation converter"
        );
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|error| self.spawn_error(&error))?;

        let input = markup.as_bytes().to_vec();
        let writer = child
            .stdin
            .take()
            .map(|stdin| thread::spawn(move || feed(stdin, &input)));
        let stdout = child.stdout.take().map(|out| thread::spawn(move || drain(out)));
        let stderr = child.stderr.take().map(|err| thread::spawn(move || drain(err)));

        // On timeout the I/O threads are left to finish once the pipes close.
        let status = self.wait_for_exit(&mut child)?;
        self.join(writer)?;
        let output = self.join(stdout)?.unwrap_or_default();
        let errors = self.join(stderr)?.unwrap_or_default();

        if !status.success() {
            return Err(ConversionError::Failed {
                program: self.program.clone(),
                message: format!("{status}: {}", String::from_utf8_lossy(&errors).trim()),
            });
        }

        let structured = String::from_utf8_lossy(&output).trim().to_owned();
        if structured.is_empty() {
            return Err(ConversionError::EmptyOutput {
                program: self.program.clone(),
            });
        }

        Ok(Equation {
            source: markup.to_owned(),
            structured,
        })
    }
}

/// Configurable converter for tests and behavioural specs.
///
/// Returns a fixed outcome and counts how often it was called.
#[derive(Debug)]
pub struct ConfigurableConverter {
    outcome: Result<String, String>,
    calls: AtomicUsize,
}

impl ConfigurableConverter {
    /// Creates a converter that always succeeds with `structured` as payload.
    #[must_use]
    pub fn succeeding(structured: impl Into<String>) -> Self {
        Self {
            outcome: Ok(structured.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Creates a converter that always fails with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of conversions requested so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EquationConverter for ConfigurableConverter {
    fn convert(&self, markup: &str) -> Result<Equation, ConversionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Ok(structured) => Ok(Equation {
                source: markup.to_owned(),
                structured: structured.clone(),
            }),
            Err(message) => Err(ConversionError::Rejected {
                message: message.clone(),
            }),
        }
    }
}

impl<T: EquationConverter + ?Sized> EquationConverter for std::sync::Arc<T> {
    fn convert(&self, markup: &str) -> Result<Equation, ConversionError> {
        (**self).convert(markup)
    }
}
