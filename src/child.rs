//! Child process supervision: spawn with piped stdio, reap, and map the
//! termination status onto the wrapper's exit code.

use anyhow::{Context, Result};
use std::process::{Child, Command, Stdio};

/// Exit code reported when the child terminated abnormally (e.g. by signal).
/// 255 is the largest value that survives `waitpid` truncation.
pub const ABNORMAL_EXIT: i32 = 255;

/// Spawn the child command with stdin and stdout piped; stderr and the
/// environment are inherited.
pub fn spawn(argv: &[String]) -> Result<Child> {
    let (program, args) = argv.split_first().context("empty child command")?;
    let mut cmd = Command::new(program);
    cmd.args(args).stdin(Stdio::piped()).stdout(Stdio::piped());
    #[cfg(target_os = "linux")]
    {
        use std::os::unix::process::CommandExt;
        // Have the kernel SIGTERM the child if the wrapper dies, so a
        // crashed wrapper does not leave an orphan behind.
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }
    }
    cmd.spawn()
        .with_context(|| format!("failed to spawn child: {program}"))
}

/// Wait for the child and map its termination: a normal exit propagates the
/// child's code, anything else becomes [`ABNORMAL_EXIT`].
pub fn reap(mut child: Child) -> Result<i32> {
    let status = child.wait().context("failed to wait for child")?;
    Ok(status.code().unwrap_or(ABNORMAL_EXIT))
}
