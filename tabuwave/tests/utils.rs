// Copyright 2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

#![allow(dead_code)]

use std::io::Write;
use std::num::NonZeroUsize;
use tabuwave::*;

/// Two scalar clock ticks and an eight bit counter array with two elements.
pub const COUNTER_TRACE: &str = "$timescale 1ns $end
$scope module top $end
$var wire 1 ! clk $end
$var wire 8 \" cnt[0] $end
$var wire 8 # cnt[1] $end
$upscope $end
$enddefinitions $end
#0
0!
b00000000 \"
b00000001 #
#5
1!
b00000001 \"
#10
";

pub fn load_str(input: &str) -> Waveform {
    read_from_bytes(input.as_bytes(), &LoadOptions::default()).expect("failed to load trace")
}

pub fn load_str_with_workers(input: &str, workers: usize) -> Waveform {
    let options = LoadOptions {
        multi_thread: true,
        workers: NonZeroUsize::new(workers),
    };
    read_from_bytes(input.as_bytes(), &options).expect("failed to load trace")
}

pub fn load_str_single_threaded(input: &str) -> Waveform {
    let options = LoadOptions {
        multi_thread: false,
        workers: None,
    };
    read_from_bytes(input.as_bytes(), &options).expect("failed to load trace")
}

pub fn write_temp_file(input: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("failed to create temp file");
    file.write_all(input).expect("failed to write temp file");
    file.flush().expect("failed to flush temp file");
    file
}

/// Raw value of every signal at `time`, keyed by full name.
pub fn snapshot(wave: &Waveform, time: Time) -> Vec<(String, Option<String>)> {
    let h = wave.hierarchy();
    h.iter_nodes()
        .filter(|(_, node)| node.kind() == NodeKind::Signal)
        .map(|(node, _)| {
            let value = wave.value_at(node, time).ok().map(str::to_string);
            (h.full_name(node), value)
        })
        .collect()
}
