// Copyright 2023-2024 The Regents of the University of California
// Copyright 2024-2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>
//
// Loads a trace and answers point queries against the finished timelines.

use crate::compaction::{compact_all, CompactionResult};
use crate::hierarchy::*;
use crate::timeline::{CompactionError, QueryError, Timeline};
use crate::values::{hex_digits, hex_value, pad_with_blanks, padded_value};
use crate::vcd::ParsedTrace;
use crate::{LoadOptions, ProgressCount, Result, Time};
use std::fmt::{Debug, Formatter};
use std::io::Read;

/// Read a trace with the default options.
pub fn read<P: AsRef<std::path::Path>>(filename: P) -> Result<Waveform> {
    read_with_options(filename, &LoadOptions::default())
}

pub fn read_with_options<P: AsRef<std::path::Path>>(
    filename: P,
    options: &LoadOptions,
) -> Result<Waveform> {
    read_with_progress(filename, options, None)
}

/// Like `read_with_options`, but adds the number of parsed bytes to `progress`.
pub fn read_with_progress<P: AsRef<std::path::Path>>(
    filename: P,
    options: &LoadOptions,
    progress: Option<ProgressCount>,
) -> Result<Waveform> {
    let input_file = std::fs::File::open(filename)?;
    let mmap = unsafe { memmap2::Mmap::map(&input_file)? };
    load(&mmap[..], options, progress)
}

pub fn read_from_bytes(input: &[u8], options: &LoadOptions) -> Result<Waveform> {
    load(input, options, None)
}

/// Read from something that is not a file.
pub fn read_from_reader<R: Read>(mut input: R, options: &LoadOptions) -> Result<Waveform> {
    let mut buf = Vec::new();
    input.read_to_end(&mut buf)?;
    load(&buf, options, None)
}

fn load(input: &[u8], options: &LoadOptions, progress: Option<ProgressCount>) -> Result<Waveform> {
    let start = std::time::Instant::now();
    let ParsedTrace {
        hierarchy,
        changes,
        max_time,
        ..
    } = crate::vcd::parse(input, progress)?;
    log::info!(
        "parsed {} bytes with {} signals in {:?}",
        input.len(),
        changes.len(),
        start.elapsed()
    );

    let start = std::time::Instant::now();
    let workers = options.worker_count();
    let timelines = compact_all(changes, max_time, workers)?;
    log::info!(
        "built {} timelines with {workers} workers in {:?}",
        timelines.len(),
        start.elapsed()
    );

    let waveform = Waveform {
        hierarchy,
        timelines,
        max_time,
    };
    for (node, reason) in waveform.unqueryable_signals() {
        log::warn!(
            "`{}` cannot be queried: {reason}",
            waveform.hierarchy.full_name(node)
        );
    }
    Ok(waveform)
}

/// A loaded trace. All timelines are complete once a `Waveform` exists.
pub struct Waveform {
    hierarchy: Hierarchy,
    /// indexed by `SignalRef`
    timelines: Vec<CompactionResult>,
    max_time: Time,
}

impl Debug for Waveform {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Waveform(...)")
    }
}

impl Waveform {
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub fn root(&self) -> NodeRef {
        self.hierarchy.root()
    }

    pub fn children(&self, node: NodeRef) -> Children<'_> {
        self.hierarchy.children(node)
    }

    pub fn name(&self, node: NodeRef) -> &str {
        self.hierarchy[node].name()
    }

    pub fn kind(&self, node: NodeRef) -> NodeKind {
        self.hierarchy[node].kind()
    }

    pub fn resolve_path(&self, path: &str, start: Option<NodeRef>) -> std::result::Result<NodeRef, LookupError> {
        self.hierarchy.resolve_path(path, start)
    }

    pub fn resolve_signal(&self, path: &str, start: Option<NodeRef>) -> std::result::Result<NodeRef, LookupError> {
        self.hierarchy.resolve_signal(path, start)
    }

    pub fn max_timestamp(&self) -> Time {
        self.max_time
    }

    pub fn timescale(&self) -> Option<Timescale> {
        self.hierarchy.timescale()
    }

    pub fn date(&self) -> &str {
        self.hierarchy.date()
    }

    pub fn version(&self) -> &str {
        self.hierarchy.version()
    }

    pub fn comments(&self) -> &[String] {
        self.hierarchy.comments()
    }

    /// Bit width of a signal or of the elements of an array scope.
    pub fn bit_width(&self, node: NodeRef) -> Option<u32> {
        self.hierarchy.bit_width(node)
    }

    /// Number of entries of the padded view. `None` for plain scopes.
    pub fn size(&self, node: NodeRef) -> Option<usize> {
        Some(self.hierarchy[node].as_queryable()?.size(self))
    }

    /// Column width needed to show the name and the values of a node.
    pub fn display_width(&self, node: NodeRef) -> Option<usize> {
        let query = self.hierarchy[node].as_queryable()?;
        Some(self.name(node).len().max(query.value_width(self)))
    }

    /// Value token as stored in the trace. Only signals have a single raw value.
    pub fn value_at(&self, node: NodeRef, time: Time) -> std::result::Result<&str, QueryError> {
        match self.hierarchy[node].as_signal() {
            Some(signal) => self.signal_timeline(signal)?.value_at(time),
            None => Err(QueryError::NotQueryable(self.kind(node))),
        }
    }

    /// Hex rendering of the value of a signal.
    pub fn hex_value_at(&self, node: NodeRef, time: Time) -> std::result::Result<String, QueryError> {
        let signal = self.hierarchy[node]
            .as_signal()
            .ok_or(QueryError::NotQueryable(self.kind(node)))?;
        let value = self.signal_timeline(signal)?.value_at(time)?;
        Ok(hex_value(value, signal.encoding()))
    }

    /// One entry per bit (signals) or per element (array scopes), padded with blanks.
    pub fn padded_value_at(
        &self,
        node: NodeRef,
        time: Time,
        pad_to_size: usize,
    ) -> std::result::Result<Vec<String>, QueryError> {
        self.hierarchy[node]
            .as_queryable()
            .ok_or(QueryError::NotQueryable(self.kind(node)))?
            .padded_value_at(self, time, pad_to_size)
    }

    pub fn timeline(&self, signal: SignalRef) -> Option<&Timeline> {
        self.timelines.get(signal.index())?.as_ref().ok()
    }

    /// Reason why a signal could not be indexed.
    pub fn compaction_error(&self, signal: SignalRef) -> Option<&CompactionError> {
        self.timelines.get(signal.index())?.as_ref().err()
    }

    /// Signals without a timeline, identified by the node that declared them.
    pub fn unqueryable_signals(&self) -> impl Iterator<Item = (NodeRef, &CompactionError)> + '_ {
        self.timelines.iter().enumerate().filter_map(|(ii, result)| {
            let reason = result.as_ref().err()?;
            let node = self.hierarchy.signal_node(SignalRef::from_index(ii)?)?;
            Some((node, reason))
        })
    }

    fn signal_timeline(&self, signal: &Signal) -> std::result::Result<&Timeline, QueryError> {
        match self.timelines.get(signal.signal_ref().index()) {
            Some(Ok(timeline)) => Ok(timeline),
            Some(Err(reason)) => Err(self.unqueryable(signal.signal_ref(), reason.clone())),
            None => Err(self.unqueryable(signal.signal_ref(), CompactionError::NoChanges)),
        }
    }

    fn unqueryable(&self, signal: SignalRef, reason: CompactionError) -> QueryError {
        let signal = self
            .hierarchy
            .signal_node(signal)
            .map(|node| self.hierarchy.full_name(node))
            .unwrap_or_default();
        QueryError::Unqueryable { signal, reason }
    }
}

/// Something that can be shown as a column of values.
pub trait Queryable {
    /// Bit width of one entry of the underlying values.
    fn bit_width(&self, waveform: &Waveform) -> Option<u32>;
    /// Number of entries returned by `padded_value_at` without padding.
    fn size(&self, waveform: &Waveform) -> usize;
    /// Width of the widest entry returned by `padded_value_at`.
    fn value_width(&self, waveform: &Waveform) -> usize;
    fn padded_value_at(
        &self,
        waveform: &Waveform,
        time: Time,
        pad_to_size: usize,
    ) -> std::result::Result<Vec<String>, QueryError>;
}

impl Queryable for Signal {
    fn bit_width(&self, _waveform: &Waveform) -> Option<u32> {
        Signal::bit_width(self)
    }

    fn size(&self, _waveform: &Waveform) -> usize {
        Signal::bit_width(self).unwrap_or(1) as usize
    }

    fn value_width(&self, waveform: &Waveform) -> usize {
        match self.encoding() {
            SignalEncoding::BitVector(_) => 1,
            SignalEncoding::Real | SignalEncoding::String => waveform
                .signal_timeline(self)
                .map(|t| t.values().map(str::len).max().unwrap_or(1))
                .unwrap_or(1),
        }
    }

    fn padded_value_at(
        &self,
        waveform: &Waveform,
        time: Time,
        pad_to_size: usize,
    ) -> std::result::Result<Vec<String>, QueryError> {
        let value = waveform.signal_timeline(self)?.value_at(time)?;
        Ok(padded_value(value, self.encoding(), pad_to_size))
    }
}

impl Queryable for ArrayScope {
    fn bit_width(&self, waveform: &Waveform) -> Option<u32> {
        self.elements()
            .iter()
            .filter_map(|e| waveform.bit_width(e.node()))
            .max()
    }

    fn size(&self, _waveform: &Waveform) -> usize {
        self.len()
    }

    fn value_width(&self, waveform: &Waveform) -> usize {
        hex_digits(Queryable::bit_width(self, waveform).unwrap_or(1)) + 2
    }

    /// Hex values of the elements in index order. Elements without a value at `time` are
    /// shown as all `x`.
    fn padded_value_at(
        &self,
        waveform: &Waveform,
        time: Time,
        pad_to_size: usize,
    ) -> std::result::Result<Vec<String>, QueryError> {
        let mut out = Vec::with_capacity(pad_to_size.max(self.len()));
        for element in self.elements() {
            let value = match waveform.hex_value_at(element.node(), time) {
                Ok(value) => value,
                Err(QueryError::Unqueryable { .. } | QueryError::BeforeFirstChange { .. }) => {
                    let width = waveform.bit_width(element.node()).unwrap_or(1);
                    "x".repeat(hex_digits(width))
                }
                Err(e) => return Err(e),
            };
            out.push(value);
        }
        pad_with_blanks(&mut out, pad_to_size);
        Ok(out)
    }
}

impl Node {
    /// Signals and array scopes can be queried, plain scopes cannot.
    pub fn as_queryable(&self) -> Option<&dyn Queryable> {
        match self.data() {
            NodeData::Signal(signal) => Some(signal),
            NodeData::ArrayScope(array) => Some(array),
            NodeData::Scope(_) => None,
        }
    }
}
