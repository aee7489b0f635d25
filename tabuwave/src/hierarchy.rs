// Copyright 2023-2024 The Regents of the University of California
// Copyright 2024-2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>
//
// Arena based scope/signal tree. Every node lives in one `Vec` owned by the `Hierarchy`
// and is addressed through a `NodeRef`. Parents and children are handles, never owners.

use std::collections::{btree_map, BTreeMap};
use std::fmt::{Display, Formatter};
use std::num::NonZeroU32;
use std::ops::Index;

/// Separates scope names in a hierarchical path.
pub const SCOPE_SEPARATOR: char = '.';

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct Timescale {
    pub factor: u32,
    pub unit: TimescaleUnit,
}

impl Timescale {
    pub fn new(factor: u32, unit: TimescaleUnit) -> Self {
        Timescale { factor, unit }
    }
}

impl Display for Timescale {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.factor, self.unit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub enum TimescaleUnit {
    FemtoSeconds,
    PicoSeconds,
    NanoSeconds,
    MicroSeconds,
    MilliSeconds,
    Seconds,
    Unknown,
}

impl TimescaleUnit {
    pub fn to_exponent(&self) -> Option<i8> {
        match &self {
            TimescaleUnit::FemtoSeconds => Some(-15),
            TimescaleUnit::PicoSeconds => Some(-12),
            TimescaleUnit::NanoSeconds => Some(-9),
            TimescaleUnit::MicroSeconds => Some(-6),
            TimescaleUnit::MilliSeconds => Some(-3),
            TimescaleUnit::Seconds => Some(0),
            TimescaleUnit::Unknown => None,
        }
    }
}

impl Display for TimescaleUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TimescaleUnit::FemtoSeconds => "fs",
            TimescaleUnit::PicoSeconds => "ps",
            TimescaleUnit::NanoSeconds => "ns",
            TimescaleUnit::MicroSeconds => "us",
            TimescaleUnit::MilliSeconds => "ms",
            TimescaleUnit::Seconds => "s",
            TimescaleUnit::Unknown => "?",
        };
        f.write_str(name)
    }
}

/// Uniquely identifies a node (scope, array scope or signal) in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeRef(NonZeroU32);

impl NodeRef {
    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        NonZeroU32::new(index as u32 + 1).map(Self)
    }

    #[inline]
    pub fn index(&self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Identifies the value history of a signal. Aliased declarations share one `SignalRef`.
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalRef(NonZeroU32);

impl SignalRef {
    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        NonZeroU32::new(index as u32 + 1).map(Self)
    }

    #[inline]
    pub fn index(&self) -> usize {
        (self.0.get() - 1) as usize
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub enum ScopeType {
    Module,
    Task,
    Function,
    Begin,
    Fork,
    Generate,
    Struct,
    Union,
    Class,
    Interface,
    Package,
    Program,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub enum VarType {
    Event,
    Integer,
    Parameter,
    Real,
    Reg,
    Supply0,
    Supply1,
    Time,
    Tri,
    TriAnd,
    TriOr,
    TriReg,
    Tri0,
    Tri1,
    WAnd,
    Wire,
    WOr,
    String,
    Port,
    SparseArray,
    RealTime,
    // System Verilog
    Bit,
    Logic,
    Int,
    ShortInt,
    LongInt,
    Byte,
    Enum,
    ShortReal,
    Unknown,
}

/// Specifies how the values of a signal are encoded.
/// This is different from the `VarType` which tries to correspond to the variable type in the
/// source HDL code.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub enum SignalEncoding {
    /// variable length strings
    String,
    /// floating point values in their textual form
    Real,
    /// a fixed width bit-vector
    BitVector(NonZeroU32),
}

impl SignalEncoding {
    pub fn bit_width(&self) -> Option<u32> {
        match self {
            SignalEncoding::BitVector(len) => Some(len.get()),
            SignalEncoding::String | SignalEncoding::Real => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    Scope,
    ArrayScope,
    Signal,
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NodeKind::Scope => "scope",
            NodeKind::ArrayScope => "array scope",
            NodeKind::Signal => "signal",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("[vcd] $upscope without an open scope")]
    UnbalancedUpscope,
    #[error("[vcd] variable `{0}` is declared outside of any scope")]
    NoOpenScope(String),
    #[error("[vcd] `{name}` in `{scope}` conflicts with an earlier declaration")]
    NameConflict { scope: String, name: String },
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("no node at `{0}`")]
    NotFound(String),
    #[error("`{path}` is a {actual}, expected a {expected}")]
    WrongKind {
        path: String,
        expected: NodeKind,
        actual: NodeKind,
    },
}

#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    parent: Option<NodeRef>,
    data: NodeData,
}

#[derive(Debug, Clone)]
pub enum NodeData {
    Scope(Scope),
    ArrayScope(ArrayScope),
    Signal(Signal),
}

impl Node {
    /// Local name. Array elements are named by their index token, e.g. `[3]`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` only for the root scope.
    pub fn parent(&self) -> Option<NodeRef> {
        self.parent
    }

    pub fn kind(&self) -> NodeKind {
        match &self.data {
            NodeData::Scope(_) => NodeKind::Scope,
            NodeData::ArrayScope(_) => NodeKind::ArrayScope,
            NodeData::Signal(_) => NodeKind::Signal,
        }
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn as_signal(&self) -> Option<&Signal> {
        match &self.data {
            NodeData::Signal(signal) => Some(signal),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayScope> {
        match &self.data {
            NodeData::ArrayScope(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_scope(&self) -> Option<&Scope> {
        match &self.data {
            NodeData::Scope(scope) => Some(scope),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scope {
    tpe: ScopeType,
    children: BTreeMap<String, NodeRef>,
}

impl Scope {
    pub fn scope_type(&self) -> ScopeType {
        self.tpe
    }

    pub fn get(&self, name: &str) -> Option<NodeRef> {
        self.children.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ArrayElement {
    index: u64,
    key: String,
    node: NodeRef,
}

impl ArrayElement {
    pub fn index(&self) -> u64 {
        self.index
    }
    pub fn key(&self) -> &str {
        &self.key
    }
    pub fn node(&self) -> NodeRef {
        self.node
    }
}

/// Unpacked array recovered from flattened `<base>[<index>]` names.
/// Elements are kept sorted by their numeric index.
#[derive(Debug, Clone, Default)]
pub struct ArrayScope {
    elements: Vec<ArrayElement>,
}

impl ArrayScope {
    pub fn elements(&self) -> &[ArrayElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, index: u64) -> Option<NodeRef> {
        self.elements
            .binary_search_by_key(&index, |e| e.index)
            .ok()
            .map(|pos| self.elements[pos].node)
    }

    /// Checks that the indices form the range `0..len` without gaps.
    pub fn is_contiguous(&self) -> bool {
        self.elements
            .iter()
            .enumerate()
            .all(|(ii, e)| e.index == ii as u64)
    }

    fn insert(&mut self, element: ArrayElement) {
        let pos = self.elements.partition_point(|e| e.index < element.index);
        self.elements.insert(pos, element);
    }
}

#[derive(Debug, Clone)]
pub struct Signal {
    var_tpe: VarType,
    encoding: SignalEncoding,
    id_code: String,
    dimensions: Option<String>,
    signal_ref: SignalRef,
}

impl Signal {
    pub fn var_type(&self) -> VarType {
        self.var_tpe
    }

    pub fn encoding(&self) -> SignalEncoding {
        self.encoding
    }

    /// Returns `None` for real and string signals.
    pub fn bit_width(&self) -> Option<u32> {
        self.encoding.bit_width()
    }

    /// Identifier code used in the trace body.
    pub fn id_code(&self) -> &str {
        &self.id_code
    }

    /// Trailing declaration tokens after the name, e.g. `[7:0]`.
    pub fn dimensions(&self) -> Option<&str> {
        self.dimensions.as_deref()
    }

    pub fn signal_ref(&self) -> SignalRef {
        self.signal_ref
    }
}

/// Iterates over `(local name, child)` pairs. Scopes yield in name order, array scopes in
/// index order. Signals have no children.
pub enum Children<'a> {
    Scope(btree_map::Iter<'a, String, NodeRef>),
    Array(std::slice::Iter<'a, ArrayElement>),
    Empty,
}

impl<'a> Iterator for Children<'a> {
    type Item = (&'a str, NodeRef);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Children::Scope(iter) => iter.next().map(|(name, node)| (name.as_str(), *node)),
            Children::Array(iter) => iter.next().map(|e| (e.key.as_str(), e.node)),
            Children::Empty => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct HierarchyMetaData {
    timescale: Option<Timescale>,
    date: String,
    version: String,
    comments: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Hierarchy {
    nodes: Vec<Node>,
    root: NodeRef,
    /// signal ref -> node that declared the signal first
    signals: Vec<NodeRef>,
    meta: HierarchyMetaData,
}

impl Hierarchy {
    pub fn root(&self) -> NodeRef {
        self.root
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = (NodeRef, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .flat_map(|(ii, n)| NodeRef::from_index(ii).map(|r| (r, n)))
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_signals(&self) -> usize {
        self.signals.len()
    }

    /// The node that first declared `signal`. Aliases link this same node.
    pub fn signal_node(&self, signal: SignalRef) -> Option<NodeRef> {
        self.signals.get(signal.index()).copied()
    }

    pub fn children(&self, node: NodeRef) -> Children<'_> {
        match &self[node].data {
            NodeData::Scope(scope) => Children::Scope(scope.children.iter()),
            NodeData::ArrayScope(array) => Children::Array(array.elements.iter()),
            NodeData::Signal(_) => Children::Empty,
        }
    }

    /// Looks up a direct child. Inside an array scope `name` is an index token like `[3]`.
    pub fn child(&self, node: NodeRef, name: &str) -> Option<NodeRef> {
        match &self[node].data {
            NodeData::Scope(scope) => scope.get(name),
            NodeData::ArrayScope(array) => array.element(parse_index_token(name)?),
            NodeData::Signal(_) => None,
        }
    }

    pub fn full_name(&self, node: NodeRef) -> String {
        full_name(&self.nodes, node)
    }

    /// Bit width of a signal, or the widest element of an array scope.
    pub fn bit_width(&self, node: NodeRef) -> Option<u32> {
        match &self[node].data {
            NodeData::Signal(signal) => signal.bit_width(),
            NodeData::ArrayScope(array) => array
                .elements
                .iter()
                .filter_map(|e| self[e.node].as_signal().and_then(|s| s.bit_width()))
                .max(),
            NodeData::Scope(_) => None,
        }
    }

    /// Resolves a dotted path. Without `start`, the first segment has to name the root.
    /// Segments of the form `mem[3]` resolve through the array scope `mem` unless a child
    /// is literally named `mem[3]`.
    pub fn resolve_path(&self, path: &str, start: Option<NodeRef>) -> Result<NodeRef, LookupError> {
        let not_found = || LookupError::NotFound(path.to_string());
        let mut segments = path.split(SCOPE_SEPARATOR);
        let mut current = match start {
            Some(start) => start,
            None => {
                let first = segments.next().ok_or_else(not_found)?;
                if self[self.root].name != first {
                    return Err(not_found());
                }
                self.root
            }
        };
        for segment in segments {
            current = self.lookup_segment(current, segment).ok_or_else(not_found)?;
        }
        Ok(current)
    }

    /// Like `resolve_path`, but the result has to be a signal.
    pub fn resolve_signal(&self, path: &str, start: Option<NodeRef>) -> Result<NodeRef, LookupError> {
        let node = self.resolve_path(path, start)?;
        match self[node].kind() {
            NodeKind::Signal => Ok(node),
            actual => Err(LookupError::WrongKind {
                path: path.to_string(),
                expected: NodeKind::Signal,
                actual,
            }),
        }
    }

    fn lookup_segment(&self, parent: NodeRef, segment: &str) -> Option<NodeRef> {
        if let Some(child) = self.child(parent, segment) {
            return Some(child);
        }
        let (base, index, _) = split_array_name(segment)?;
        let array = self.child(parent, base)?;
        self[array].as_array()?.element(index)
    }

    pub fn date(&self) -> &str {
        &self.meta.date
    }
    pub fn version(&self) -> &str {
        &self.meta.version
    }
    pub fn timescale(&self) -> Option<Timescale> {
        self.meta.timescale
    }
    pub fn comments(&self) -> &[String] {
        &self.meta.comments
    }
}

impl Index<NodeRef> for Hierarchy {
    type Output = Node;

    fn index(&self, index: NodeRef) -> &Self::Output {
        &self.nodes[index.index()]
    }
}

/// Joins the names from the root down to `node`. Array elements attach without a separator.
fn full_name(nodes: &[Node], node: NodeRef) -> String {
    let mut parts = vec![nodes[node.index()].name.as_str()];
    let mut current = nodes[node.index()].parent;
    while let Some(parent) = current {
        parts.push(&nodes[parent.index()].name);
        current = nodes[parent.index()].parent;
    }
    let mut out = String::with_capacity(parts.iter().map(|p| p.len() + 1).sum());
    for (ii, part) in parts.iter().rev().enumerate() {
        if ii > 0 && !part.starts_with('[') {
            out.push(SCOPE_SEPARATOR);
        }
        out.push_str(part);
    }
    out
}

/// Splits `mem[12]` into `("mem", 12, "[12]")`.
pub fn split_array_name(name: &str) -> Option<(&str, u64, &str)> {
    let open = name.rfind('[')?;
    let (base, token) = name.split_at(open);
    if base.is_empty() {
        return None;
    }
    Some((base, parse_index_token(token)?, token))
}

fn parse_index_token(token: &str) -> Option<u64> {
    let digits = token.strip_prefix('[')?.strip_suffix(']')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Where a declared name ends up: directly in a scope, or as an element of an array scope.
struct Slot {
    container: NodeRef,
    key: String,
    index: Option<u64>,
    existing: Option<NodeRef>,
}

pub struct HierarchyBuilder {
    nodes: Vec<Node>,
    root: Option<NodeRef>,
    scope_stack: Vec<NodeRef>,
    signals: Vec<NodeRef>,
    meta: HierarchyMetaData,
}

impl Default for HierarchyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        HierarchyBuilder {
            nodes: Vec::default(),
            root: None,
            scope_stack: Vec::default(),
            signals: Vec::default(),
            meta: HierarchyMetaData::default(),
        }
    }

    /// Returns `None` if no scope was ever declared.
    pub fn finish(mut self) -> Option<Hierarchy> {
        let root = self.root?;
        self.nodes.shrink_to_fit();
        self.signals.shrink_to_fit();
        let hierarchy = Hierarchy {
            nodes: self.nodes,
            root,
            signals: self.signals,
            meta: self.meta,
        };
        check_arrays(&hierarchy);
        Some(hierarchy)
    }

    fn push_node(&mut self, name: String, parent: Option<NodeRef>, data: NodeData) -> NodeRef {
        let node = NodeRef::from_index(self.nodes.len()).unwrap();
        self.nodes.push(Node { name, parent, data });
        node
    }

    fn full_name(&self, node: NodeRef) -> String {
        full_name(&self.nodes, node)
    }

    /// Opens a scope. Declaring a scope that already exists at the same place re-enters it.
    /// A second top-level scope with a different name is nested under the root.
    pub fn add_scope(&mut self, name: String, tpe: ScopeType) -> Result<NodeRef, HierarchyError> {
        let parent = match (self.scope_stack.last(), self.root) {
            (Some(&parent), _) => parent,
            (None, None) => {
                let data = NodeData::Scope(Scope {
                    tpe,
                    children: BTreeMap::new(),
                });
                let root = self.push_node(name, None, data);
                self.root = Some(root);
                self.scope_stack.push(root);
                return Ok(root);
            }
            (None, Some(root)) if self.nodes[root.index()].name == name => {
                self.scope_stack.push(root);
                return Ok(root);
            }
            (None, Some(root)) => {
                log::warn!(
                    "second top-level scope `{name}`, placing it inside of the root scope `{}`",
                    self.nodes[root.index()].name
                );
                root
            }
        };

        let existing = match &self.nodes[parent.index()].data {
            NodeData::Scope(s) => s.get(&name),
            _ => unreachable!("only scopes are pushed onto the scope stack"),
        };
        let scope = match existing {
            Some(duplicate) if self.nodes[duplicate.index()].kind() == NodeKind::Scope => duplicate,
            Some(_) => {
                return Err(HierarchyError::NameConflict {
                    scope: self.full_name(parent),
                    name,
                })
            }
            None => {
                let data = NodeData::Scope(Scope {
                    tpe,
                    children: BTreeMap::new(),
                });
                let scope = self.push_node(name.clone(), Some(parent), data);
                self.link(parent, name, None, scope);
                scope
            }
        };
        self.scope_stack.push(scope);
        Ok(scope)
    }

    pub fn pop_scope(&mut self) -> Result<(), HierarchyError> {
        self.scope_stack
            .pop()
            .map(|_| ())
            .ok_or(HierarchyError::UnbalancedUpscope)
    }

    /// Declares a new signal under the current scope.
    pub fn add_signal(
        &mut self,
        name: &str,
        var_tpe: VarType,
        encoding: SignalEncoding,
        id_code: String,
        dimensions: Option<String>,
    ) -> Result<(NodeRef, SignalRef), HierarchyError> {
        let slot = self.find_slot(name)?;
        if slot.existing.is_some() {
            return Err(HierarchyError::NameConflict {
                scope: self.full_name(slot.container),
                name: name.to_string(),
            });
        }
        let signal_ref = SignalRef::from_index(self.signals.len()).unwrap();
        let data = NodeData::Signal(Signal {
            var_tpe,
            encoding,
            id_code,
            dimensions,
            signal_ref,
        });
        let node = self.push_node(slot.key.clone(), Some(slot.container), data);
        self.signals.push(node);
        self.link(slot.container, slot.key, slot.index, node);
        Ok((node, signal_ref))
    }

    /// Makes an existing signal visible under `name` in the current scope.
    /// The signal keeps its original parent.
    pub fn add_alias(&mut self, name: &str, node: NodeRef) -> Result<(), HierarchyError> {
        let slot = self.find_slot(name)?;
        match slot.existing {
            Some(existing) if existing == node => Ok(()),
            Some(_) => Err(HierarchyError::NameConflict {
                scope: self.full_name(slot.container),
                name: name.to_string(),
            }),
            None => {
                self.link(slot.container, slot.key, slot.index, node);
                Ok(())
            }
        }
    }

    fn find_slot(&mut self, name: &str) -> Result<Slot, HierarchyError> {
        let scope = *self
            .scope_stack
            .last()
            .ok_or_else(|| HierarchyError::NoOpenScope(name.to_string()))?;
        let lookup = |nodes: &[Node], container: NodeRef, key: &str| match &nodes[container.index()]
            .data
        {
            NodeData::Scope(s) => s.get(key),
            NodeData::ArrayScope(a) => a.element(parse_index_token(key)?),
            NodeData::Signal(_) => None,
        };

        if let Some((base, index, token)) = split_array_name(name) {
            if let Some(array) = self.find_or_add_array(scope, base) {
                return Ok(Slot {
                    container: array,
                    key: token.to_string(),
                    index: Some(index),
                    existing: lookup(&self.nodes, array, token),
                });
            }
        }
        Ok(Slot {
            container: scope,
            key: name.to_string(),
            index: None,
            existing: lookup(&self.nodes, scope, name),
        })
    }

    /// Returns `None` if `base` already names something other than an array scope.
    fn find_or_add_array(&mut self, scope: NodeRef, base: &str) -> Option<NodeRef> {
        let existing = self.nodes[scope.index()].as_scope().and_then(|s| s.get(base));
        match existing {
            Some(node) if self.nodes[node.index()].kind() == NodeKind::ArrayScope => Some(node),
            Some(_) => {
                log::warn!(
                    "`{base}` in `{}` is not an array, keeping its elements as plain signals",
                    self.full_name(scope)
                );
                None
            }
            None => {
                let data = NodeData::ArrayScope(ArrayScope::default());
                let array = self.push_node(base.to_string(), Some(scope), data);
                self.link(scope, base.to_string(), None, array);
                Some(array)
            }
        }
    }

    fn link(&mut self, container: NodeRef, key: String, index: Option<u64>, node: NodeRef) {
        match (&mut self.nodes[container.index()].data, index) {
            (NodeData::Scope(s), _) => {
                s.children.insert(key, node);
            }
            (NodeData::ArrayScope(a), Some(index)) => a.insert(ArrayElement { index, key, node }),
            _ => unreachable!("children are only linked into scopes and array scopes"),
        }
    }

    pub fn set_date(&mut self, value: String) {
        self.meta.date = value;
    }

    pub fn set_version(&mut self, value: String) {
        self.meta.version = value;
    }

    pub fn set_timescale(&mut self, value: Timescale) {
        self.meta.timescale = Some(value);
    }

    pub fn add_comment(&mut self, comment: String) {
        self.meta.comments.push(comment);
    }
}

/// Array scopes are accepted as declared; irregular ones are only reported.
fn check_arrays(h: &Hierarchy) {
    for (node, data) in h.iter_nodes() {
        let Some(array) = data.as_array() else {
            continue;
        };
        if !array.is_contiguous() {
            log::warn!(
                "array `{}` has gaps in its indices, elements are shown in index order",
                h.full_name(node)
            );
        }
        let mut widths = array
            .elements
            .iter()
            .map(|e| h[e.node].as_signal().and_then(|s| s.bit_width()));
        if let Some(first) = widths.next() {
            if widths.any(|w| w != first) {
                log::warn!(
                    "elements of array `{}` differ in width, using the widest one",
                    h.full_name(node)
                );
            }
        }
    }
}
