//! Cache hierarchy trace replayer.
//!
//! This binary drives a `MemoryHierarchy` from a text trace. It performs:
//! 1. **Setup:** Builds the hierarchy from a JSON config (or the reference sizing) and an optional seed.
//! 2. **Image load:** Optionally places a raw binary in memory before any access, bypassing the caches.
//! 3. **Replay:** Executes `r`/`w`/`p`/`flush`/`init` commands, printing loads and probes.
//! 4. **Report:** Prints hit/miss/eviction statistics as text or JSON.

mod trace;

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::{fs, process};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use memsim_core::config::Config;
use memsim_core::MemoryHierarchy;

use crate::trace::Command;

#[derive(Parser, Debug)]
#[command(
    name = "memsim",
    author,
    version,
    about = "Replay a load/store trace through a two-level cache hierarchy",
    long_about = "Replay a load/store trace through a write-through L1 and write-back L2.\n\nTrace commands, one per line (# comments):\n  r ADDR LEN          load LEN (1, 2, 4) bytes and print the value\n  w ADDR LEN VALUE    store the LEN low bytes of VALUE\n  p ADDR LEN          probe L1 and L2 without side effects\n  flush               write dirty L2 lines back to memory\n  init                invalidate both levels\n\nExamples:\n  memsim trace.txt\n  memsim --config small.json --seed 7 trace.txt\n  memsim --load image.bin --load-addr 0x1000 --json trace.txt"
)]
struct Cli {
    /// Trace file to replay.
    trace: PathBuf,

    /// JSON hierarchy configuration (default: 128 MiB, 64 KiB L1, 4 MiB L2).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replacement seed; overrides the config file.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Raw image to place in memory before replay.
    #[arg(long)]
    load: Option<PathBuf>,

    /// Physical address of the image given with --load.
    #[arg(long, default_value = "0", value_parser = parse_addr)]
    load_addr: u64,

    /// Print the final statistics as JSON.
    #[arg(long)]
    json: bool,
}

fn parse_addr(text: &str) -> Result<u64, String> {
    trace::parse_number(text).ok_or_else(|| format!("`{text}` is not an address"))
}

fn fail(msg: impl Display) -> ! {
    eprintln!("Error: {msg}");
    process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .unwrap_or_else(|e| fail(format_args!("{}: {e}", path.display()))),
        None => Config::default(),
    };
    if cli.seed.is_some() {
        config.general.seed = cli.seed;
    }

    let mut mem = MemoryHierarchy::new(&config).unwrap_or_else(|e| fail(e));
    if let Some(path) = &cli.load {
        load_image(&mut mem, path, cli.load_addr);
    }
    mem.init_caches();

    let text = fs::read_to_string(&cli.trace)
        .unwrap_or_else(|e| fail(format_args!("{}: {e}", cli.trace.display())));
    let commands = trace::parse(&text).unwrap_or_else(|e| fail(e));
    info!(commands = commands.len(), "replaying trace");

    replay(&mut mem, &commands);

    if cli.json {
        match serde_json::to_string_pretty(&mem.stats()) {
            Ok(json) => println!("{json}"),
            Err(e) => fail(e),
        }
    } else {
        println!("{}", mem.stats());
    }
}

/// Copies a raw image into DRAM, exiting if it does not fit.
fn load_image(mem: &mut MemoryHierarchy, path: &Path, addr: u64) {
    let image = fs::read(path).unwrap_or_else(|e| fail(format_args!("{}: {e}", path.display())));
    let size = mem.memory_size();
    let fits = usize::try_from(addr)
        .ok()
        .is_some_and(|offset| mem.backing_mut().load(&image, offset));
    if !fits {
        fail(format_args!(
            "{}: {} bytes at {addr:#x} do not fit in {size} bytes of memory",
            path.display(),
            image.len()
        ));
    }
    info!(path = %path.display(), bytes = image.len(), addr, "loaded image");
}

/// Executes every command in order.
///
/// Accesses that would leave physical memory are reported against their
/// trace line instead of reaching the hierarchy's fatal address check.
fn replay(mem: &mut MemoryHierarchy, commands: &[(usize, Command)]) {
    let size = mem.memory_size();
    let in_range = |addr: u64, len: usize| addr.checked_add(len as u64).is_some_and(|end| end <= size);

    for &(line, command) in commands {
        debug!(line, ?command, "trace command");
        match command {
            Command::Read { addr, len }
            | Command::Write { addr, len, .. }
            | Command::Probe { addr, len }
                if !in_range(addr, len) =>
            {
                fail(format_args!(
                    "line {line}: {len}-byte access at {addr:#x} is outside of the {size}-byte memory"
                ));
            }
            Command::Read { addr, len } => {
                let value = mem.read(addr, len);
                println!("r {addr:#x} {len} = {value:#0width$x}", width = 2 + 2 * len);
            }
            Command::Write { addr, len, value } => mem.write(addr, len, value),
            Command::Probe { addr, len } => {
                match mem.probe_l1(addr, len) {
                    Some(probe) => println!("p {addr:#x} L1: {probe}"),
                    None => println!("p {addr:#x} L1: not present"),
                }
                match mem.probe_l2(addr, len) {
                    Some(probe) => println!("p {addr:#x} L2: {probe}"),
                    None => println!("p {addr:#x} L2: not present"),
                }
            }
            Command::Flush => {
                let lines = mem.flush();
                println!("flush: {lines} dirty line(s) written back");
            }
            Command::Init => mem.init_caches(),
        }
    }
}
