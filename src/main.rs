use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::io::{self, BufReader, BufWriter};
use std::thread;

use linecache::cache::Cache;
use linecache::fingerprint::KeySpec;
use linecache::{child, input, output};

#[derive(Parser)]
#[command(
    name = "cache",
    about = "Acts as a cache around another program processing one line in, one line out from stdin to stdout.",
    version
)]
struct Cli {
    /// Column(s) to use as the deduplication key (comma-separated, 1-based)
    #[arg(short = 'k', long = "key", default_value = "-1", value_name = "COLS")]
    key: String,

    /// Field separator used when splitting out key columns
    #[arg(
        short = 't',
        long = "field_separator",
        default_value = "\t",
        value_name = "SEP"
    )]
    field_separator: String,

    /// Flush buffered lines to the child at least every N novel lines
    #[arg(long = "flush_rate", default_value_t = 4096, value_name = "N")]
    flush_rate: usize,

    /// Child command and its arguments
    #[arg(trailing_var_arg = true, required = true, value_name = "CHILD")]
    command: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("cache: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let key = KeySpec::parse(&cli.key, &cli.field_separator)?;

    let mut child_proc = child::spawn(&cli.command)?;
    let child_stdin = child_proc
        .stdin
        .take()
        .context("child stdin was not piped")?;
    let child_stdout = child_proc
        .stdout
        .take()
        .context("child stdout was not piped")?;

    // The cache outlives both workers; handles minted by the input worker
    // travel to the output worker over an unbounded queue, one per line,
    // terminated by a `None` sentinel.
    let mut cache = Cache::new();
    let (tx, rx) = crossbeam_channel::unbounded();

    // Input gets its own thread; output drives downstream stdout from here.
    let (input_res, output_res) = thread::scope(|s| {
        let cache = &mut cache;
        let key = &key;
        let flush_rate = cli.flush_rate;
        let input_worker = s.spawn(move || {
            let upstream = io::stdin().lock();
            input::run(upstream, child_stdin, tx, cache, key, flush_rate)
        });
        let downstream = BufWriter::with_capacity(128 * 1024, io::stdout().lock());
        let output_res = output::run(rx, BufReader::new(child_stdout), downstream);
        let input_res = input_worker
            .join()
            .unwrap_or_else(|_| Err(anyhow!("input worker panicked")));
        (input_res, output_res)
    });
    input_res?;
    output_res?;

    child::reap(child_proc)
}
