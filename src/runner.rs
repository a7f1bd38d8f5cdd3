use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, ExitStatus, Output, Stdio};
use thiserror::Error;

/// Failure of a shell command run in a vault
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to execute '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {status}{}", stderr_suffix(.stderr))]
    Exit {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// Build a command running `script` through the platform shell
pub fn shell(script: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", script]);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", script]);
        cmd
    }
}

/// Run `script` through the shell and capture its output
///
/// A non-zero exit is an error carrying the trimmed stderr.
pub fn run_shell(script: &str, cwd: Option<&Path>) -> Result<Output, CommandError> {
    let mut cmd = shell(script);
    cmd.stdin(Stdio::null());
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd.output().map_err(|e| CommandError::Spawn {
        command: script.to_string(),
        source: e,
    })?;

    if output.status.success() {
        Ok(output)
    } else {
        Err(CommandError::Exit {
            command: script.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Run a command and inherit stdio (shows output in real-time)
pub fn run(cmd: &str, args: &[&str]) -> Result<ExitStatus> {
    Command::new(cmd)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("Failed to execute: {} {}", cmd, args.join(" ")))
}

/// Editor command line: `$VISUAL`, `$EDITOR`, then the platform opener
pub fn editor_command() -> Vec<String> {
    let configured = ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty());

    if let Some(editor) = configured {
        return editor.split_whitespace().map(String::from).collect();
    }

    let fallback: &[&str] = if cfg!(windows) {
        &["notepad"]
    } else if cfg!(target_os = "macos") {
        &["open", "-e"]
    } else {
        &["xdg-open"]
    };
    fallback.iter().map(ToString::to_string).collect()
}

/// Open `path` in the user's editor and wait for it to exit
pub fn open_in_editor(path: &Path) -> Result<()> {
    let command = editor_command();
    let (program, args) = command
        .split_first()
        .context("No editor configured")?;

    let path_arg = path.to_string_lossy();
    let mut all_args: Vec<&str> = args.iter().map(String::as_str).collect();
    all_args.push(&path_arg);

    let status = run(program, &all_args)?;
    if !status.success() {
        anyhow::bail!("{} exited with {}", program, status);
    }
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_run_shell_captures_stdout() {
        let output = run_shell("echo hello", None).unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
    }

    #[test]
    fn test_run_shell_uses_cwd() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("marker.txt"), "").unwrap();

        let output = run_shell("ls", Some(tmp.path())).unwrap();
        assert!(String::from_utf8_lossy(&output.stdout).contains("marker.txt"));
    }

    #[test]
    fn test_run_shell_failure_carries_stderr() {
        let err = run_shell("echo broken >&2; exit 3", None).unwrap_err();
        match &err {
            CommandError::Exit { stderr, status, .. } => {
                assert_eq!(stderr, "broken");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("expected exit error, got {other}"),
        }
        assert!(err.to_string().ends_with(": broken"));
    }

    #[test]
    fn test_shell_missing_cwd_is_spawn_error() {
        let err = run_shell("true", Some(Path::new("/definitely/not/here"))).unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }
}
