//! External tool invocation
//!
//! Runs a child process to completion, forwarding each line it prints to the
//! log tagged with the child's pid.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use crate::error::{Result, ToolError};

/// Lines of stderr kept for the error message of a failed run
const STDERR_TAIL_LINES: usize = 20;

/// Run `program` with `args` and wait for it to exit successfully
pub async fn run_tool(program: &Path, args: &[OsString]) -> Result<()> {
    let program_name = program.display().to_string();
    tracing::debug!("Running {} {}", program_name, join_args(args));

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ToolError::Spawn {
            program: program_name.clone(),
            source,
        })?;

    let pid = child.id().unwrap_or_default();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (_, stderr_tail, status) = tokio::join!(
        forward_lines(stdout, pid, false),
        forward_lines(stderr, pid, true),
        child.wait()
    );
    let status = status?;

    if !status.success() {
        tracing::error!("cmd failed: {} {}", program_name, join_args(args));
        return Err(ToolError::Exit {
            program: program_name,
            args: join_args(args),
            status,
            stderr: stderr_tail.into_iter().collect::<Vec<_>>().join("\n"),
        }
        .into());
    }

    Ok(())
}

/// Log every line of a child's output stream, returning the last few
async fn forward_lines<R>(stream: Option<R>, pid: u32, is_stderr: bool) -> VecDeque<String>
where
    R: AsyncRead + Unpin,
{
    let mut tail = VecDeque::new();
    let Some(stream) = stream else {
        return tail;
    };

    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if is_stderr {
            tracing::info!(pid, "!! {}", line);
            if tail.len() == STDERR_TAIL_LINES {
                tail.pop_front();
            }
            tail.push_back(line);
        } else {
            tracing::info!(pid, ">> {}", line);
        }
    }
    tail
}

fn join_args(args: &[OsString]) -> String {
    args.iter()
        .map(|a| a.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
