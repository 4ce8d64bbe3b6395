//! Action executor: run the configured commands in order

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{error, info, warn};
use trd_core::{format_command, CommandSpec};

/// Exit code and combined output of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when terminated by a signal
    pub code: Option<i32>,
    /// Standard output and standard error, merged in arrival order
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Spawns a program and waits for it
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<CommandOutput>;
}

/// Runs commands as child processes via tokio
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<CommandOutput> {
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdout = child.stdout.take();
        let mut stderr = child.stderr.take();
        let mut combined = Vec::new();
        let mut out_buf = [0u8; 4096];
        let mut err_buf = [0u8; 4096];

        while stdout.is_some() || stderr.is_some() {
            tokio::select! {
                n = read_chunk(&mut stdout, &mut out_buf), if stdout.is_some() => match n? {
                    0 => stdout = None,
                    n => combined.extend_from_slice(&out_buf[..n]),
                },
                n = read_chunk(&mut stderr, &mut err_buf), if stderr.is_some() => match n? {
                    0 => stderr = None,
                    n => combined.extend_from_slice(&err_buf[..n]),
                },
            }
        }

        let status = child.wait().await?;

        Ok(CommandOutput {
            code: status.code(),
            output: String::from_utf8_lossy(&combined).into_owned(),
        })
    }
}

async fn read_chunk<R: AsyncRead + Unpin>(
    reader: &mut Option<R>,
    buf: &mut [u8],
) -> std::io::Result<usize> {
    match reader {
        Some(reader) => reader.read(buf).await,
        None => Ok(0),
    }
}

/// Why a trigger's command chain stopped early
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandFailure {
    /// The program could not be started
    Spawn { command: String, message: String },
    /// The program exited unsuccessfully
    Exit {
        command: String,
        code: Option<i32>,
        output: String,
    },
}

/// What one execution pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Commands that ran to a successful exit
    pub succeeded: usize,
    /// Empty commands skipped as invalid
    pub skipped: usize,
    /// The failure that ended the chain, if any
    pub failure: Option<CommandFailure>,
}

impl ExecutionReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Runs the command chain against the watched file
#[derive(Clone)]
pub struct ActionExecutor {
    path: PathBuf,
    commands: Arc<[CommandSpec]>,
    runner: Arc<dyn CommandRunner>,
}

impl ActionExecutor {
    pub fn new(path: &Path, commands: Vec<CommandSpec>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            path: path.to_path_buf(),
            commands: commands.into(),
            runner,
        }
    }

    /// Run every command in order, stopping at the first failure
    ///
    /// Failures are logged and reported, never propagated: the daemon keeps
    /// watching for the next change.
    pub async fn execute(&self) -> ExecutionReport {
        info!("Updated: '{}'", self.path.display());

        let mut report = ExecutionReport::default();

        for spec in self.commands.iter() {
            let tokens = spec.resolve(&self.path);
            let Some((program, args)) = tokens.split_first() else {
                warn!("Invalid command '{}'", spec);
                report.skipped += 1;
                continue;
            };
            let line = format_command(program, args);

            match self.runner.run(program, args).await {
                Ok(out) if out.success() => {
                    info!(program = %program, args = ?args, "{}", line);
                    log_output(&out.output);
                    report.succeeded += 1;
                }
                Ok(out) => {
                    error!(
                        program = %program,
                        args = ?args,
                        code = ?out.code,
                        "Error: {}, exit status {}",
                        line,
                        describe_code(out.code)
                    );
                    log_output(&out.output);
                    report.failure = Some(CommandFailure::Exit {
                        command: line,
                        code: out.code,
                        output: out.output,
                    });
                    return report;
                }
                Err(e) => {
                    error!(program = %program, args = ?args, "Error: {}, {}", line, e);
                    report.failure = Some(CommandFailure::Spawn {
                        command: line,
                        message: e.to_string(),
                    });
                    return report;
                }
            }
        }

        report
    }
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "killed by signal".to_string(),
    }
}

fn log_output(output: &str) {
    let output = output.trim_end();
    if !output.is_empty() {
        info!("{}", output);
    }
}
