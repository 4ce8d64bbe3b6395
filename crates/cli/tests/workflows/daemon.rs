//! Full watch cycles against the real binary

use crate::common::cli::terminate;
use crate::common::{wait_exit, wait_until, TrdCommand};
use anyhow::Result;
use std::path::Path;
use std::time::Duration;

const SETTLE: Duration = Duration::from_millis(500);
const WAIT: Duration = Duration::from_secs(10);

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_foreground_runs_commands_and_stops_on_sigterm() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let root = temp.path().canonicalize()?;
    let watch_dir = root.join("deploy");
    let out_dir = root.join("out");
    std::fs::create_dir_all(&watch_dir)?;
    std::fs::create_dir_all(&out_dir)?;

    let file = watch_dir.join("app.bin");
    let marker = out_dir.join("marker");
    let copy = out_dir.join("app.copy");
    let log = root.join("logs").join("trd.log");

    let touch = format!("touch {}", path_arg(&marker));
    let cp = format!("cp %1 {}", path_arg(&copy));

    let mut child = TrdCommand::new(&root)
        .args(&[
            "-f",
            "-v",
            "-d",
            "100ms",
            "--lock-retry",
            "50ms",
            "--log",
            path_arg(&log),
            "-c",
            cp.as_str(),
            "-c",
            touch.as_str(),
            path_arg(&file),
        ])
        .spawn()?;

    std::thread::sleep(SETTLE);
    std::fs::write(&file, b"release-1")?;

    let ran = wait_until(WAIT, || marker.exists());
    terminate(child.id())?;
    let status = wait_exit(&mut child, WAIT)?;

    assert!(ran, "commands did not run");
    assert_eq!(std::fs::read(&copy)?, b"release-1");
    assert!(status.success(), "exit status {status:?}");

    let contents = std::fs::read_to_string(&log)?;
    assert!(contents.contains("Updated"), "{contents}");
    assert!(contents.contains("SIGTERM"), "{contents}");
    Ok(())
}

#[test]
fn test_failed_command_stops_sequence() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let root = temp.path().canonicalize()?;
    let watch_dir = root.join("deploy");
    std::fs::create_dir_all(&watch_dir)?;

    let file = watch_dir.join("app.bin");
    let first = root.join("first");
    let never = root.join("never");
    let log = root.join("logs").join("trd.log");

    let touch_first = format!("touch {}", path_arg(&first));
    let touch_never = format!("touch {}", path_arg(&never));

    let mut child = TrdCommand::new(&root)
        .args(&[
            "-f",
            "-d",
            "100ms",
            "--log",
            path_arg(&log),
            "-c",
            touch_first.as_str(),
            "-c",
            "false",
            "-c",
            touch_never.as_str(),
            path_arg(&file),
        ])
        .spawn()?;

    std::thread::sleep(SETTLE);
    std::fs::write(&file, b"release-1")?;

    let ran = wait_until(WAIT, || first.exists());
    // Give a wrongly-continued sequence time to reach the last command
    std::thread::sleep(SETTLE);

    terminate(child.id())?;
    let status = wait_exit(&mut child, WAIT)?;

    assert!(ran);
    assert!(!never.exists());
    assert!(status.success());
    Ok(())
}

#[test]
fn test_background_start_detaches() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let root = temp.path().canonicalize()?;
    let watch_dir = root.join("deploy");
    std::fs::create_dir_all(&watch_dir)?;

    let file = watch_dir.join("app.bin");
    let marker = root.join("marker");
    let log = root.join("logs").join("trd.log");
    let touch = format!("touch {}", path_arg(&marker));

    let result = TrdCommand::new(&root)
        .args(&[
            "-d",
            "100ms",
            "--log",
            path_arg(&log),
            "-c",
            touch.as_str(),
            path_arg(&file),
        ])
        .assert_success()?;

    assert!(result.contains_stdout("Run cmd:"), "{}", result.stdout);
    assert!(result.contains_stdout(" -f --log "), "{}", result.stdout);
    let pid = result.background_pid().expect("pid in output");

    // The detached child owns the log file once it is up
    assert!(wait_until(WAIT, || log.exists()));
    std::thread::sleep(SETTLE);
    std::fs::write(&file, b"release-1")?;
    let ran = wait_until(WAIT, || marker.exists());

    terminate(pid)?;
    assert!(ran, "background daemon did not run the command");
    Ok(())
}
