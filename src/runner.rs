use anyhow::{Context, Result};
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Captured result of an external tool invocation.
#[derive(Debug, Clone)]
pub struct CmdOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Seam between collection logic and the host's tools.
///
/// Every adapter talks to the operating system through this trait, so the
/// whole pipeline can run against canned output in tests.
pub trait CommandRunner {
    /// Run a tool to completion, capturing its output.
    /// `Err` means the tool could not be spawned at all.
    fn run(&self, program: &str, args: &[&str]) -> Result<CmdOutput>;

    /// Run a tool under a wall-clock budget. `Ok(None)` means the budget
    /// elapsed; the child has been killed and reaped.
    fn run_with_limit(
        &self,
        program: &str,
        args: &[&str],
        limit: Duration,
    ) -> Result<Option<CmdOutput>>;

    /// Locate a tool on PATH or in the sbin directories system tools live in.
    fn which(&self, name: &str) -> Option<PathBuf>;
}

/// Production runner backed by `std::process::Command`.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CmdOutput> {
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to spawn {}", program))?;

        Ok(CmdOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    fn run_with_limit(
        &self,
        program: &str,
        args: &[&str],
        limit: Duration,
    ) -> Result<Option<CmdOutput>> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn {}", program))?;

        let status = child
            .wait_timeout(limit)
            .with_context(|| format!("failed to wait on {}", program))?;

        match status {
            Some(status) => {
                let mut stdout = String::new();
                let mut stderr = String::new();
                if let Some(mut pipe) = child.stdout.take() {
                    pipe.read_to_string(&mut stdout).ok();
                }
                if let Some(mut pipe) = child.stderr.take() {
                    pipe.read_to_string(&mut stderr).ok();
                }
                Ok(Some(CmdOutput {
                    status: status.code(),
                    stdout,
                    stderr,
                }))
            }
            None => {
                child.kill().ok();
                child.wait().ok();
                Ok(None)
            }
        }
    }

    fn which(&self, name: &str) -> Option<PathBuf> {
        if let Some(p) = find_in_path(name) {
            return Some(p);
        }

        // iptables, getenforce and the lvm tools often live outside PATH
        // for non-login shells.
        let sbin_dirs = ["/sbin", "/usr/sbin", "/usr/local/sbin"];
        for dir in &sbin_dirs {
            let p = PathBuf::from(dir).join(name);
            if p.is_file() {
                return Some(p);
            }
        }

        None
    }
}

fn find_in_path(name: &str) -> Option<PathBuf> {
    std::env::var_os("PATH").and_then(|paths| {
        std::env::split_paths(&paths)
            .map(|dir| dir.join(name))
            .find(|path| path.is_file())
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_runner_captures_stdout() {
        let out = SystemRunner.run("echo", &["hello"]).unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn spawn_failure_is_an_error() {
        assert!(SystemRunner
            .run("definitely-not-a-real-tool", &[])
            .is_err());
    }

    #[test]
    fn budget_elapse_returns_none() {
        let out = SystemRunner
            .run_with_limit("sleep", &["5"], Duration::from_millis(50))
            .unwrap();
        assert!(out.is_none());
    }
}
