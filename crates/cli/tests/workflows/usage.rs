//! Argument handling and startup checks

use crate::common::TrdCommand;
use crate::trd;
use anyhow::Result;

#[test]
fn test_help_lists_flags() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let result = trd!(temp.path(), "--help").assert_success()?;

    for flag in ["--command", "--delay", "--lock-retry", "--foreground", "--log"] {
        assert!(result.contains_stdout(flag), "missing {flag}: {}", result.stdout);
    }
    Ok(())
}

#[test]
fn test_version() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let result = trd!(temp.path(), "--version").assert_success()?;
    assert!(result.contains_stdout(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn test_missing_commands() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let result = trd!(temp.path(), "-f", "app.bin").assert_failure()?;

    assert_eq!(result.exit_code, 1);
    assert!(result.contains_stderr("empty commands"), "{}", result.stderr);
    Ok(())
}

#[test]
fn test_invalid_delay() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let result = trd!(temp.path(), "-d", "soon", "-c", "true", "app.bin").assert_failure()?;

    assert_eq!(result.exit_code, 2);
    assert!(result.contains_stderr("--delay"), "{}", result.stderr);
    Ok(())
}

#[test]
fn test_log_in_watch_dir_refused_in_foreground() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let dir = temp.path().canonicalize()?;
    let log = dir.join("trd.log");
    let file = dir.join("app.bin");

    let result = TrdCommand::new(&dir)
        .args(&[
            "-f",
            "--log",
            log.to_str().unwrap(),
            "-c",
            "true",
            file.to_str().unwrap(),
        ])
        .assert_failure()?;

    assert!(
        result.contains_stderr("watch path can not be equal log path"),
        "{}",
        result.stderr
    );
    Ok(())
}

#[test]
fn test_log_in_watch_dir_refused_before_background_start() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let dir = temp.path().canonicalize()?;
    let log = dir.join("trd.log");
    let file = dir.join("app.bin");

    let result = TrdCommand::new(&dir)
        .args(&["--log", log.to_str().unwrap(), "-c", "true", file.to_str().unwrap()])
        .assert_failure()?;

    assert!(result.contains_stderr("watch path can not be equal log path"));
    assert!(!result.contains_stdout("Run cmd:"));
    Ok(())
}

#[test]
fn test_config_file_supplies_commands() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let dir = temp.path().canonicalize()?;
    let config = dir.join("trd.toml");
    std::fs::write(
        &config,
        format!(
            "[watch]\ncommands = [\"true\"]\nlog = \"{}\"\n",
            dir.join("trd.log").display()
        ),
    )?;

    // Commands came from the file: the run gets past the empty-commands
    // check and stops at the log location check instead
    let result = TrdCommand::new(&dir)
        .args(&["-f", "--config", config.to_str().unwrap(), "app.bin"])
        .assert_failure()?;

    assert!(!result.contains_stderr("empty commands"), "{}", result.stderr);
    assert!(result.contains_stderr("watch path can not be equal log path"));
    Ok(())
}

#[test]
fn test_config_file_unknown_key() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let config = temp.path().join("trd.toml");
    std::fs::write(&config, "[watch]\ncmds = [\"true\"]\n")?;

    let result = TrdCommand::new(temp.path())
        .args(&["-f", "--config", config.to_str().unwrap(), "app.bin"])
        .assert_failure()?;

    assert!(result.contains_stderr("Failed to parse config file"), "{}", result.stderr);
    Ok(())
}
