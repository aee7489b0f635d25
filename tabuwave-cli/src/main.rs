// Copyright 2024-2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use anyhow::{bail, Context};
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use indicatif::ProgressStyle;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use tabuwave::{LoadOptions, NodeKind, NodeRef, Time, Waveform, SCOPE_SEPARATOR};

#[derive(Parser, Debug)]
#[command(name = "tabuwave")]
#[command(version)]
#[command(about = "Loads a VCD file and prints the values of its signals at a point in time.", long_about = None)]
struct Args {
    /// Waveform file to load
    #[arg(short, long, value_name = "VCDFILE")]
    file: PathBuf,
    #[arg(long)]
    single_thread: bool,
    /// Number of threads used to index the signals
    #[arg(short = 'j', long)]
    workers: Option<NonZeroUsize>,
    /// Print the scope hierarchy
    #[arg(long)]
    tree: bool,
    /// Signal or array to print, e.g. `top.cnt`. Defaults to everything in the top scope.
    #[arg(short, long = "signal", value_name = "PATH")]
    signals: Vec<String>,
    /// Time at which the values are printed
    #[arg(short, long, default_value_t = 0)]
    time: Time,
    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .format_timestamp(None)
        .filter_level(args.verbosity.log_level_filter())
        .init();

    let options = LoadOptions {
        multi_thread: !args.single_thread,
        workers: args.workers,
    };
    let wave = load_with_progress_bar(&args.file, &options)?;

    println!("file:      {}", args.file.display());
    if !wave.version().is_empty() {
        println!("version:   {}", wave.version());
    }
    if !wave.date().is_empty() {
        println!("date:      {}", wave.date());
    }
    if let Some(timescale) = wave.timescale() {
        println!("timescale: {timescale}");
    }
    println!("max time:  {}", wave.max_timestamp());
    println!();

    if args.tree {
        let root = wave.root();
        print_tree(&wave, root, wave.name(root), 0);
        println!();
    }

    // columns are labeled with the name used to select them, aliases included
    let columns = if args.signals.is_empty() {
        wave.children(wave.root())
            .filter(|(_, node)| wave.kind(*node) != NodeKind::Scope)
            .map(|(name, node)| (name.to_string(), node))
            .collect::<Vec<_>>()
    } else {
        let mut columns = Vec::with_capacity(args.signals.len());
        for path in args.signals.iter() {
            let node = wave.resolve_path(path, None)?;
            if wave.kind(node) == NodeKind::Scope {
                bail!("`{path}` is a scope, only signals and arrays have values");
            }
            columns.push((column_label(path).to_string(), node));
        }
        columns
    };
    print_table(&wave, &columns, args.time);
    Ok(())
}

fn load_with_progress_bar(filename: &Path, options: &LoadOptions) -> anyhow::Result<Waveform> {
    let file_len = std::fs::metadata(filename)
        .with_context(|| format!("failed to open {}", filename.display()))?
        .len();
    let style = ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.cyan/blue} {decimal_bytes} ({percent_precise}%)",
    )?;

    let p = Arc::new(AtomicU64::new(0));
    let p_out = p.clone();
    let done = Arc::new(AtomicBool::new(false));
    let done_out = done.clone();
    let ten_millis = std::time::Duration::from_millis(10);
    let t = thread::spawn(move || {
        let bar = indicatif::ProgressBar::new(file_len);
        bar.set_style(style);
        loop {
            // always update
            bar.set_position(p.load(Ordering::SeqCst));
            thread::sleep(ten_millis);
            if done.load(Ordering::SeqCst) {
                bar.finish_and_clear();
                break;
            }
        }
    });

    let start = std::time::Instant::now();
    let wave = tabuwave::read_with_progress(filename, options, Some(p_out));
    done_out.store(true, Ordering::SeqCst);
    if t.join().is_err() {
        log::warn!("progress bar thread panicked");
    }
    let wave = wave.with_context(|| format!("failed to load {}", filename.display()))?;
    log::info!("loading {} took {:?}", filename.display(), start.elapsed());
    Ok(wave)
}

fn print_tree(wave: &Waveform, node: NodeRef, name: &str, depth: usize) {
    let indent = "  ".repeat(depth);
    match wave.kind(node) {
        NodeKind::Scope => {
            println!("{indent}{name}");
            for (child_name, child) in wave.children(node) {
                print_tree(wave, child, child_name, depth + 1);
            }
        }
        NodeKind::ArrayScope => {
            let size = wave.size(node).unwrap_or(0);
            let width = wave.bit_width(node).unwrap_or(0);
            println!("{indent}{name} [{size} x {width} bit]");
        }
        NodeKind::Signal => match wave.bit_width(node) {
            Some(width) => println!("{indent}{name} ({width} bit)"),
            None => println!("{indent}{name}"),
        },
    }
}

/// Last segment of a hierarchical path.
fn column_label(path: &str) -> &str {
    path.rsplit(SCOPE_SEPARATOR).next().unwrap_or(path)
}

/// One column per node, one row per bit or array element.
fn print_table(wave: &Waveform, columns: &[(String, NodeRef)], time: Time) {
    let rows = columns
        .iter()
        .filter_map(|(_, n)| wave.size(*n))
        .max()
        .unwrap_or(0);
    let widths: Vec<usize> = columns
        .iter()
        .map(|(label, n)| {
            let values = wave.hierarchy()[*n]
                .as_queryable()
                .map_or(0, |q| q.value_width(wave));
            label.len().max(values)
        })
        .collect();
    let values: Vec<Vec<String>> = columns
        .iter()
        .map(|(_, n)| match wave.padded_value_at(*n, time, rows) {
            Ok(values) => values,
            Err(e) => {
                log::warn!("{e}");
                vec!["?".to_string(); rows]
            }
        })
        .collect();

    println!("t = {time}");
    println!();
    let mut header = String::from(" index |");
    for ((label, _), width) in columns.iter().zip(widths.iter().copied()) {
        header.push_str(&format!(" {label:>width$} |"));
    }
    println!("{header}");
    println!("{}", "=".repeat(header.len()));
    for row in 0..rows {
        let mut line = format!("{row:>6} |");
        for (column, width) in values.iter().zip(widths.iter().copied()) {
            line.push_str(&format!(" {:>width$} |", column[row]));
        }
        println!("{line}");
    }
}
