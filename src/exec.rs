//! Scoped subprocess invocation with cancellation, output capture, and error
//! wrapping.
//!
//! The teacher invokes `std::process::Command::new("git")...output()` inline
//! at every call site with no cancellation and no shared wrapper. This module
//! keeps that direct `Command`-building style but centralizes it behind one
//! entry point so every external-tool call gets identical cancellation and
//! error-wrapping semantics, per spec.md §4.1.

use std::{
   path::Path,
   process::{Command, Stdio},
   time::Duration,
};

use crate::{
   cancel::CancellationToken,
   error::{FlowError, Result},
};

const POLL_INTERVAL: Duration = Duration::from_millis(15);

/// Execute `program` with `args` in `cwd`, honoring `cancel`.
///
/// Arguments are passed literally — never shell-interpreted. On success,
/// returns trimmed-of-nothing raw stdout bytes. On non-zero exit, returns
/// `FlowError::OperationFailed` naming `program` and the trimmed stderr text
/// (omitted if stderr was empty). If `cancel` fires while the child is
/// running, the child is killed and `FlowError::OperationCanceled` is
/// returned instead of the exit error.
pub fn run(program: &str, args: &[&str], cwd: &Path, cancel: &CancellationToken) -> Result<Vec<u8>> {
   cancel.check()?;

   let mut child = Command::new(program)
      .args(args)
      .current_dir(cwd)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .spawn()
      .map_err(|e| FlowError::OperationFailed(format!("failed to spawn {program}: {e}")))?;

   loop {
      if cancel.is_canceled() {
         let _ = child.kill();
         let _ = child.wait();
         return Err(FlowError::OperationCanceled);
      }
      match child.try_wait() {
         Ok(Some(_status)) => break,
         Ok(None) => {
            std::thread::sleep(POLL_INTERVAL);
         },
         Err(e) => return Err(FlowError::Io(e)),
      }
   }

   let output = child
      .wait_with_output()
      .map_err(|e| FlowError::OperationFailed(format!("failed to collect output of {program}: {e}")))?;

   if output.status.success() {
      return Ok(output.stdout);
   }

   let stderr = String::from_utf8_lossy(&output.stderr);
   let trimmed = stderr.trim();
   let message = if trimmed.is_empty() {
      format!("{program} {}: exited with {}", args.first().unwrap_or(&""), describe_status(&output.status))
   } else {
      format!(
         "{program} {}: {trimmed}",
         args.first().unwrap_or(&""),
      )
   };
   Err(FlowError::OperationFailed(message))
}

/// Run and decode stdout as UTF-8, trimming trailing whitespace — the common
/// case for porcelain/plumbing commands that return a single value.
pub fn run_text(program: &str, args: &[&str], cwd: &Path, cancel: &CancellationToken) -> Result<String> {
   let bytes = run(program, args, cwd, cancel)?;
   Ok(String::from_utf8_lossy(&bytes).trim_end().to_string())
}

fn describe_status(status: &std::process::ExitStatus) -> String {
   match status.code() {
      Some(code) => format!("exit code {code}"),
      None => "no exit code (terminated by signal)".to_string(),
   }
}

#[cfg(test)]
mod tests {
   use std::path::PathBuf;

   use super::*;

   fn cwd() -> PathBuf {
      std::env::temp_dir()
   }

   #[test]
   fn test_run_text_success() {
      let cancel = CancellationToken::new();
      let out = run_text("echo", &["hello"], &cwd(), &cancel).unwrap();
      assert_eq!(out, "hello");
   }

   #[test]
   fn test_run_nonzero_exit_reports_stderr() {
      let cancel = CancellationToken::new();
      let result = run("sh", &["-c", "echo boom 1>&2; exit 1"], &cwd(), &cancel);
      match result {
         Err(FlowError::OperationFailed(msg)) => assert!(msg.contains("boom")),
         other => panic!("expected OperationFailed, got {other:?}"),
      }
   }

   #[test]
   fn test_run_already_canceled_short_circuits() {
      let cancel = CancellationToken::new();
      cancel.cancel();
      let result = run("echo", &["hi"], &cwd(), &cancel);
      assert!(matches!(result, Err(FlowError::OperationCanceled)));
   }

   #[test]
   fn test_run_cancel_kills_long_running_child() {
      let cancel = CancellationToken::new();
      let waiter = cancel.clone();
      let handle = std::thread::spawn(move || run("sleep", &["5"], &cwd(), &waiter));
      std::thread::sleep(Duration::from_millis(50));
      cancel.cancel();
      let result = handle.join().unwrap();
      assert!(matches!(result, Err(FlowError::OperationCanceled)));
   }
}
