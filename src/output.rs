//! Output worker: replay handles in input order, reading one child response
//! per still-empty handle and emitting every line downstream.

use anyhow::{bail, Context, Result};
use crossbeam_channel::Receiver;
use std::io::{BufRead, Write};

use crate::cache::Handle;
use crate::chomp;

/// Consume handles until the sentinel, filling empty slots from the child's
/// stdout and writing one line downstream per handle.
pub fn run(
    queue: Receiver<Option<Handle>>,
    mut from_child: impl BufRead,
    mut downstream: impl Write,
) -> Result<()> {
    let mut line = Vec::new();
    loop {
        let handle = match queue.recv() {
            Ok(Some(handle)) => handle,
            // Sentinel: no more lines.
            Ok(None) => break,
            Err(_) => bail!("input worker hung up without finishing"),
        };
        if handle.value().is_none() {
            line.clear();
            let n = from_child
                .read_until(b'\n', &mut line)
                .context("failed to read from child")?;
            if n == 0 {
                bail!("child closed its output with responses still pending");
            }
            chomp(&mut line);
            handle.fill(std::mem::take(&mut line))?;
        }
        let bytes = handle
            .value()
            .context("cache slot still empty after fill")?;
        downstream
            .write_all(bytes)
            .and_then(|()| downstream.write_all(b"\n"))
            .context("failed to write downstream")?;
    }
    downstream.flush().context("failed to flush downstream")?;
    Ok(())
}
