//! Drives the compiled binary through symlinks named after build modes.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use dockhand_test_support::fixtures::{temp_dir, write_script};
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;

const SOURCE_BUILD: &str =
    r#"{"kind":"Build","metadata":{"name":"app-1"},"spec":{"strategy":{"type":"Source"}}}"#;
const PRODUCTION_MOUNTS: [&str; 2] = [
    "/var/run/secrets/kubernetes.io/serviceaccount/ca.crt",
    "/var/run/configs/openshift.io/certs/certs.d",
];

fn production_mounts_present() -> bool {
    let present = PRODUCTION_MOUNTS.iter().any(|path| Path::new(path).exists());
    if present {
        eprintln!("skipping: host has production trust mounts that would be copied");
    }
    present
}

struct Sandbox {
    _root: tempfile::TempDir,
    bin_dir: PathBuf,
    step_dir: PathBuf,
}

impl Sandbox {
    fn new() -> Result<Self> {
        let root = temp_dir()?;
        let bin_dir = root.path().join("bin");
        let step_dir = root.path().join("steps");
        fs::create_dir_all(&bin_dir)?;
        fs::create_dir_all(&step_dir)?;
        Ok(Self {
            _root: root,
            bin_dir,
            step_dir,
        })
    }

    fn command(&self, name: &str) -> Result<Command> {
        let link = self.bin_dir.join(name);
        if !link.exists() {
            std::os::unix::fs::symlink(env!("CARGO_BIN_EXE_dockhand"), &link)
                .with_context(|| format!("linking {name}"))?;
        }
        let mut command = Command::new(link);
        command
            .env("DOCKHAND_STEP_DIR", &self.step_dir)
            .env("DOCKHAND_LOG_LEVEL", "warn")
            .env("BUILD", SOURCE_BUILD)
            .env_remove("RUST_LOG")
            .env_remove("BUILD_LOGLEVEL");
        Ok(command)
    }

    fn step(&self, name: &str, body: &str) -> Result<PathBuf> {
        write_script(&self.step_dir, name, body)
    }
}

fn output(mut command: Command) -> Result<Output> {
    Ok(command.stdin(Stdio::null()).output()?)
}

#[test]
fn unknown_name_exits_with_diagnostic() -> Result<()> {
    if production_mounts_present() {
        return Ok(());
    }
    let sandbox = Sandbox::new()?;
    let result = output(sandbox.command("openshift-unknown-tool")?)?;

    assert_eq!(result.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(
        stdout.contains("unknown command name: openshift-unknown-tool"),
        "stdout was: {stdout}"
    );
    Ok(())
}

#[test]
fn recognised_name_runs_its_step_program() -> Result<()> {
    if production_mounts_present() {
        return Ok(());
    }
    let sandbox = Sandbox::new()?;
    let record = sandbox.step_dir.join("record");
    sandbox.step(
        "openshift-sti-build",
        &format!(
            "printf '%s\\n' \"$*\" \"$BUILD\" > '{}'",
            record.display()
        ),
    )?;

    let mut command = sandbox.command("openshift-sti-build")?;
    command.env("BUILD_LOGLEVEL", "2");
    let result = output(command)?;

    assert!(
        result.status.success(),
        "stderr was: {}",
        String::from_utf8_lossy(&result.stderr)
    );
    let recorded = fs::read_to_string(&record)?;
    let mut lines = recorded.lines();
    assert_eq!(lines.next(), Some("--loglevel 2"));
    assert_eq!(lines.next(), Some(SOURCE_BUILD));
    Ok(())
}

#[test]
fn failing_step_exits_one() -> Result<()> {
    if production_mounts_present() {
        return Ok(());
    }
    let sandbox = Sandbox::new()?;
    sandbox.step("openshift-git-clone", "exit 4")?;

    let result = output(sandbox.command("openshift-git-clone")?)?;
    assert_eq!(result.status.code(), Some(1));
    Ok(())
}

#[test]
fn strategy_mismatch_exits_one_without_running_the_step() -> Result<()> {
    if production_mounts_present() {
        return Ok(());
    }
    let sandbox = Sandbox::new()?;
    let marker = sandbox.step_dir.join("ran");
    sandbox.step(
        "openshift-docker-build",
        &format!("touch '{}'", marker.display()),
    )?;

    let result = output(sandbox.command("openshift-docker-build")?)?;
    assert_eq!(result.status.code(), Some(1));
    assert!(!marker.exists());
    Ok(())
}

fn wait_for(path: &Path, limit: Duration) -> Result<()> {
    let deadline = Instant::now() + limit;
    while !path.exists() {
        if Instant::now() > deadline {
            return Err(anyhow!("{} never appeared", path.display()));
        }
        thread::sleep(Duration::from_millis(20));
    }
    Ok(())
}

fn wait_with_deadline(child: &mut Child, limit: Duration) -> Result<Option<i32>> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status.code());
        }
        if Instant::now() > deadline {
            child.kill()?;
            return Err(anyhow!("process did not exit after SIGTERM"));
        }
        thread::sleep(Duration::from_millis(20));
    }
}

#[test]
fn sigterm_during_a_long_step_exits_one() -> Result<()> {
    if production_mounts_present() {
        return Ok(());
    }
    let sandbox = Sandbox::new()?;
    let pid_file = sandbox.step_dir.join("step.pid");
    sandbox.step(
        "openshift-manage-dockerfile",
        &format!("echo $$ > '{}'\nexec sleep 20", pid_file.display()),
    )?;

    let mut command = sandbox.command("openshift-manage-dockerfile")?;
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    wait_for(&pid_file, Duration::from_secs(10))?;

    let started = Instant::now();
    kill(Pid::from_raw(i32::try_from(child.id())?), Signal::SIGTERM)?;
    let code = wait_with_deadline(&mut child, Duration::from_secs(10))?;

    assert_eq!(code, Some(1));
    assert!(started.elapsed() < Duration::from_secs(15));

    // The step is orphaned by the forced exit; reap it here.
    if let Ok(step_pid) = fs::read_to_string(&pid_file)?.trim().parse::<i32>() {
        let _ = kill(Pid::from_raw(step_pid), Signal::SIGKILL);
    }
    Ok(())
}
