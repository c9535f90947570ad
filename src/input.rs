//! Input worker: read upstream lines, fingerprint and deduplicate them,
//! forward novel lines to the child, and enqueue one handle per line.

use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use std::io::{BufRead, BufWriter, Write};

use crate::cache::{Cache, Handle};
use crate::chomp;
use crate::fingerprint::KeySpec;

/// Drive the input side of the pipeline until upstream end-of-input.
///
/// Whatever happens, the child's stdin is flushed and closed and the `None`
/// sentinel is enqueued before returning, so the output worker can always
/// drain the queue and exit.
pub fn run(
    upstream: impl BufRead,
    child_stdin: impl Write,
    queue: Sender<Option<Handle>>,
    cache: &mut Cache,
    key: &KeySpec,
    flush_rate: usize,
) -> Result<()> {
    let mut to_child = BufWriter::new(child_stdin);
    let result = pump(upstream, &mut to_child, &queue, cache, key, flush_rate);
    let flushed = to_child.flush().context("failed to flush child stdin");
    // Dropping the writer closes the pipe: EOF for the child.
    drop(to_child);
    let _ = queue.send(None);
    result.and(flushed)
}

fn pump(
    mut upstream: impl BufRead,
    to_child: &mut impl Write,
    queue: &Sender<Option<Handle>>,
    cache: &mut Cache,
    key: &KeySpec,
    flush_rate: usize,
) -> Result<()> {
    let flush_rate = flush_rate.max(1);
    let mut until_flush = flush_rate;
    let mut line = Vec::new();
    let mut scratch = Vec::new();
    loop {
        line.clear();
        let n = upstream
            .read_until(b'\n', &mut line)
            .context("failed to read upstream input")?;
        if n == 0 {
            break;
        }
        chomp(&mut line);
        let fingerprint = key.fingerprint(&line, &mut scratch);
        let (handle, is_new) = cache.lookup_or_insert(fingerprint);
        if is_new {
            to_child
                .write_all(&line)
                .and_then(|()| to_child.write_all(b"\n"))
                .context("failed to write line to child")?;
            // Make sure the child actually receives batched lines every so
            // often; in between, the writer flushes whenever its buffer
            // fills.
            until_flush -= 1;
            if until_flush == 0 {
                to_child.flush().context("failed to flush child stdin")?;
                until_flush = flush_rate;
            }
        }
        queue.send(Some(handle)).context("output worker hung up")?;
    }
    Ok(())
}
