//! Re-launch in the background

use crate::config::{ensure_log_outside, Settings};
use crate::logging::LogTarget;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use trd_core::{format_command, WatchTarget};

/// `<app_dir>/log/<exe_name>.log`
///
/// `app_dir` is the executable's directory, or its parent when the
/// executable sits in a `bin` directory.
pub fn default_log_file(exe: &Path) -> Result<PathBuf> {
    let dir = exe
        .parent()
        .with_context(|| format!("Executable has no directory: '{}'", exe.display()))?;
    let app_dir = match (dir.file_name(), dir.parent()) {
        (Some(name), Some(parent)) if name == OsStr::new("bin") => parent,
        _ => dir,
    };
    let name = exe
        .file_stem()
        .with_context(|| format!("Executable has no name: '{}'", exe.display()))?;

    Ok(app_dir
        .join("log")
        .join(format!("{}.log", name.to_string_lossy())))
}

/// Log file handed to the child
pub fn log_file(log: &LogTarget, exe: &Path) -> Result<PathBuf> {
    match log.file() {
        Some(path) => Ok(path.to_path_buf()),
        None => default_log_file(exe),
    }
}

/// Spawn a detached `-f` copy of this program and return its PID
pub fn start(settings: &Settings) -> Result<u32> {
    let exe = std::env::current_exe().context("Failed to get current executable path")?;
    let log_file = log_file(&settings.log, &exe)?;

    let target = WatchTarget::resolve(&settings.file)?;
    ensure_log_outside(target.dir(), &log_file)?;

    let args = settings.background_args(&log_file);
    println!("Run cmd: {}", format_command(&exe.to_string_lossy(), &args));

    let mut command = Command::new(&exe);
    command
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // Own process group so a Ctrl-C in this terminal does not reach it
        command.process_group(0);
    }

    let child = command
        .spawn()
        .context("Failed to spawn background process")?;
    let pid = child.id();

    println!("{} (pid {})", "Started in background".green(), pid);
    println!("Logs: {}", log_file.display().to_string().cyan());

    Ok(pid)
}
