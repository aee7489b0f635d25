// Copyright 2023-2024 The Regents of the University of California
// Copyright 2024-2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

pub mod compaction;
mod hierarchy;
mod timeline;
pub mod values;
pub mod vcd;
mod waveform;

use std::num::NonZeroUsize;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

/// Cargo.toml version of this library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Timestamp as it appears in the trace, in multiples of the timescale.
pub type Time = u64;

/// Number of input bytes consumed so far. Shared with a progress display.
pub type ProgressCount = Arc<AtomicU64>;

#[derive(Debug, Copy, Clone)]
pub struct LoadOptions {
    /// Indicates that the loader should use multiple threads if possible.
    pub multi_thread: bool,
    /// Number of compaction workers. Defaults to the available parallelism minus one.
    pub workers: Option<NonZeroUsize>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            multi_thread: true,
            workers: None,
        }
    }
}

impl LoadOptions {
    pub fn worker_count(&self) -> usize {
        if !self.multi_thread {
            return 1;
        }
        self.workers
            .map(NonZeroUsize::get)
            .unwrap_or_else(compaction::default_worker_count)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TabuwaveError {
    #[error("failed to load trace:\n{0}")]
    Parse(#[from] vcd::ParseError),
    #[error("io error")]
    Io(#[from] std::io::Error),
    #[error("failed to start the compaction workers")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, TabuwaveError>;

pub use hierarchy::{
    split_array_name, ArrayElement, ArrayScope, Children, Hierarchy, HierarchyBuilder,
    HierarchyError, LookupError, Node, NodeData, NodeKind, NodeRef, Scope, ScopeType, Signal,
    SignalEncoding, SignalRef, Timescale, TimescaleUnit, VarType, SCOPE_SEPARATOR,
};
pub use timeline::{CompactionError, QueryError, RawChanges, Timeline};
pub use waveform::{
    read, read_from_bytes, read_from_reader, read_with_options, read_with_progress, Queryable,
    Waveform,
};
