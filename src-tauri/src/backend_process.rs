use std::{
    fs,
    io::{BufRead, BufReader, Read},
    path::PathBuf,
    process::{Child, Command, ExitStatus, Stdio},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread,
};

use crate::AtomicFlagGuard;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BackendLaunchPlan {
    pub(crate) cmd: String,
    pub(crate) args: Vec<String>,
    pub(crate) cwd: Option<PathBuf>,
}

/// `None` when no command is configured: the backend is then expected to be
/// started by someone else.
pub(crate) fn resolve_launch_plan(
    raw_cmd: Option<&str>,
    raw_cwd: Option<&str>,
) -> Result<Option<BackendLaunchPlan>, String> {
    let Some(raw_cmd) = raw_cmd.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };

    let mut parts = shlex::split(raw_cmd)
        .ok_or_else(|| format!("Backend command has unbalanced quotes: {raw_cmd}"))?;
    if parts.is_empty() {
        return Ok(None);
    }
    let cmd = parts.remove(0);
    let cwd = raw_cwd
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from);

    Ok(Some(BackendLaunchPlan {
        cmd,
        args: parts,
        cwd,
    }))
}

pub(crate) fn build_debug_command(plan: &BackendLaunchPlan) -> Vec<String> {
    let mut parts = vec![plan.cmd.clone()];
    parts.extend(plan.args.clone());
    parts
}

pub(crate) type LineSink = Arc<dyn Fn(String) + Send + Sync>;

#[derive(Debug, Default)]
pub(crate) struct BackendProcess {
    child: Mutex<Option<Child>>,
    is_spawning: AtomicBool,
}

impl BackendProcess {
    /// Starts the backend with piped output; every stdout/stderr line is
    /// handed to `on_line` from a reader thread.
    pub(crate) fn spawn(&self, plan: &BackendLaunchPlan, on_line: LineSink) -> Result<(), String> {
        let Some(_spawn_guard) = AtomicFlagGuard::try_set(&self.is_spawning) else {
            return Err("Backend process is already being started.".to_string());
        };
        if self.is_running() {
            return Ok(());
        }

        if let Some(cwd) = &plan.cwd {
            if !cwd.exists() {
                fs::create_dir_all(cwd).map_err(|error| {
                    format!("Failed to create backend cwd {}: {}", cwd.display(), error)
                })?;
            }
        }

        let mut command = Command::new(&plan.cmd);
        command
            .args(&plan.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .env("PYTHONUNBUFFERED", "1");
        if let Some(cwd) = &plan.cwd {
            command.current_dir(cwd);
        }

        let mut child = command.spawn().map_err(|error| {
            format!(
                "Failed to spawn backend process with command {:?}: {}",
                build_debug_command(plan),
                error
            )
        })?;

        if let Some(stdout) = child.stdout.take() {
            forward_lines("backend-stdout", stdout, Arc::clone(&on_line))?;
        }
        if let Some(stderr) = child.stderr.take() {
            forward_lines("backend-stderr", stderr, on_line)?;
        }

        *self
            .child
            .lock()
            .map_err(|_| "Backend process lock poisoned.".to_string())? = Some(child);
        Ok(())
    }

    pub(crate) fn is_running(&self) -> bool {
        self.child
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Reaps the child if it has exited. The slot is cleared so the exit is
    /// reported only once.
    pub(crate) fn poll_exit(&self) -> Result<Option<ExitStatus>, String> {
        let mut guard = self
            .child
            .lock()
            .map_err(|_| "Backend process lock poisoned.".to_string())?;
        let Some(child) = guard.as_mut() else {
            return Ok(None);
        };

        match child.try_wait() {
            Ok(Some(status)) => {
                *guard = None;
                Ok(Some(status))
            }
            Ok(None) => Ok(None),
            Err(error) => Err(format!("Failed to poll backend process status: {error}")),
        }
    }

    pub(crate) fn stop(&self) {
        let mut child = match self.child.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        if let Some(process) = child.as_mut() {
            stop_child_process(process);
        }
    }
}

fn forward_lines<R>(name: &str, stream: R, on_line: LineSink) -> Result<(), String>
where
    R: Read + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || drain_lines(BufReader::new(stream), |line| on_line(line)))
        .map(|_| ())
        .map_err(|error| format!("Failed to start {name} reader: {error}"))
}

/// Reads until EOF. Invalid UTF-8 is replaced rather than ending the read, so
/// the pipe keeps draining for the lifetime of the process.
fn drain_lines<R, F>(mut reader: R, mut on_line: F)
where
    R: BufRead,
    F: FnMut(String),
{
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        match reader.read_until(b'\n', &mut buffer) {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buffer);
                on_line(line.trim_end_matches(['\n', '\r']).to_string());
            }
            Err(error) if error.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(_) => break,
        }
    }
}

fn stop_child_process(child: &mut Child) {
    #[cfg(target_os = "windows")]
    {
        let _ = Command::new("taskkill")
            .args(["/pid", &child.id().to_string(), "/t", "/f"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .stdin(Stdio::null())
            .status();
        let _ = child.wait();
    }

    #[cfg(not(target_os = "windows"))]
    {
        let _ = child.kill();
        let _ = child.wait();
    }
}
