// Copyright 2023-2024 The Regents of the University of California
// Copyright 2024-2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>
//
// Single pass VCD parser. Builds the hierarchy and collects the raw value changes of every
// signal. Compaction into timelines happens afterwards.

use crate::hierarchy::*;
use crate::timeline::RawChanges;
use crate::{ProgressCount, Time};
use rustc_hash::FxHashMap;
use std::borrow::Cow;
use std::num::NonZeroU32;
use std::sync::atomic::Ordering;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    #[error("[vcd] unknown or invalid command: `{0}`, valid are: {list}", list = DIRECTIVES.join(", "))]
    UnknownDirective(String),
    #[error("[vcd] unexpected token `{token}` at byte {pos}")]
    UnexpectedToken { token: String, pos: usize },
    #[error("[vcd] unexpected number of tokens for command {0}: {1}")]
    UnexpectedNumberOfTokens(String, String),
    #[error("[vcd] failed to parse {what}: `{value}`")]
    MalformedNumber { what: &'static str, value: String },
    #[error("[vcd] value change for unknown id `{0}`")]
    UnknownIdCode(String),
    #[error("[vcd] expected an id for a value change, but did not find one")]
    EmptyIdCode,
    #[error("[vcd] time goes backwards from {prev} to {next}")]
    TimeRegression { prev: Time, next: Time },
    #[error("[vcd] the trace does not declare any scope")]
    MissingRootScope,
    #[error("[vcd] input ends inside of a {0} command")]
    UnterminatedDirective(&'static str),
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// Everything the parser extracts from a trace.
#[derive(Debug)]
pub struct ParsedTrace {
    pub hierarchy: Hierarchy,
    /// Raw value changes, indexed by `SignalRef`.
    pub changes: Vec<RawChanges>,
    /// Largest timestamp in the trace.
    pub max_time: Time,
    /// Byte offset of the first token after `$enddefinitions $end`.
    pub body_start: Option<usize>,
}

const DIRECTIVES: [&str; 9] = [
    "$version",
    "$date",
    "$timescale",
    "$comment",
    "$scope",
    "$upscope",
    "$var",
    "$enddefinitions",
    "$end",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ParseState {
    #[default]
    None,
    Version,
    Date,
    Timescale,
    Comment,
    ScopeDecl,
    UpscopeDecl,
    VarDecl,
    EndDefinitions,
    Values,
    Error,
}

impl ParseState {
    fn from_directive(token: &str) -> Self {
        match token {
            "$version" => ParseState::Version,
            "$date" => ParseState::Date,
            "$timescale" => ParseState::Timescale,
            "$comment" => ParseState::Comment,
            "$scope" => ParseState::ScopeDecl,
            "$upscope" => ParseState::UpscopeDecl,
            "$var" => ParseState::VarDecl,
            "$enddefinitions" => ParseState::EndDefinitions,
            _ => ParseState::Error,
        }
    }

    fn directive(&self) -> &'static str {
        match self {
            ParseState::Version => "$version",
            ParseState::Date => "$date",
            ParseState::Timescale => "$timescale",
            ParseState::Comment => "$comment",
            ParseState::ScopeDecl => "$scope",
            ParseState::UpscopeDecl => "$upscope",
            ParseState::VarDecl => "$var",
            ParseState::EndDefinitions => "$enddefinitions",
            ParseState::None | ParseState::Values | ParseState::Error => "",
        }
    }
}

/// Parses a complete trace.
pub fn parse(input: &[u8], progress: Option<ProgressCount>) -> Result<ParsedTrace> {
    let mut reporter = ProgressReporter::new(progress, input.len());
    let mut parser = Parser::default();
    for (pos, token) in Tokens::new(input) {
        reporter.report(pos, false);
        parser.token(pos, String::from_utf8_lossy(token))?;
    }
    reporter.report(input.len(), true);
    parser.finish()
}

#[derive(Default)]
struct Parser<'a> {
    state: ParseState,
    /// tokens of the header command that is currently open
    pending: Vec<Cow<'a, str>>,
    hierarchy: HierarchyBuilder,
    ids: FxHashMap<Cow<'a, str>, (NodeRef, SignalRef)>,
    changes: Vec<RawChanges>,
    time: Time,
    body_start: Option<usize>,
    /// skipping a command like `$comment` inside of the value section
    skip_to_end: bool,
    /// multi-bit value waiting for its id
    vector_value: Option<Cow<'a, str>>,
}

impl<'a> Parser<'a> {
    fn token(&mut self, pos: usize, token: Cow<'a, str>) -> Result<()> {
        if self.state == ParseState::Values {
            self.value_token(pos, token)
        } else {
            self.header_token(pos, token)
        }
    }

    fn header_token(&mut self, pos: usize, token: Cow<'a, str>) -> Result<()> {
        if token == "$end" {
            let state = self.state;
            return match state {
                ParseState::None => Err(unexpected(&token, pos)),
                state => {
                    self.commit(state)?;
                    self.pending.clear();
                    self.state = if state == ParseState::EndDefinitions {
                        self.body_start.get_or_insert(pos + token.len());
                        ParseState::Values
                    } else {
                        ParseState::None
                    };
                    Ok(())
                }
            };
        }
        match self.state {
            ParseState::None if token.starts_with('$') => {
                self.state = ParseState::from_directive(&token);
                if self.state == ParseState::Error {
                    return Err(ParseError::UnknownDirective(token.into_owned()));
                }
                Ok(())
            }
            ParseState::None => Err(unexpected(&token, pos)),
            // identifier codes may start with `$` as well
            _ => {
                self.pending.push(token);
                Ok(())
            }
        }
    }

    fn commit(&mut self, state: ParseState) -> Result<()> {
        match state {
            ParseState::Version => self.hierarchy.set_version(self.pending.join(" ")),
            ParseState::Date => self.hierarchy.set_date(self.pending.join(" ")),
            ParseState::Comment => self.hierarchy.add_comment(self.pending.join(" ")),
            ParseState::Timescale => {
                let timescale = parse_timescale(&self.pending)?;
                self.hierarchy.set_timescale(timescale);
            }
            ParseState::ScopeDecl => {
                let (tpe, name) = match self.pending.as_slice() {
                    [tpe] => (tpe.as_ref(), ""),
                    [tpe, name, ..] => (tpe.as_ref(), name.as_ref()),
                    [] => return Err(unexpected_n_tokens("scope", &self.pending)),
                };
                self.hierarchy
                    .add_scope(name.to_string(), convert_scope_tpe(tpe))?;
            }
            ParseState::UpscopeDecl => self.hierarchy.pop_scope()?,
            ParseState::VarDecl => self.declare_var()?,
            ParseState::EndDefinitions
            | ParseState::None
            | ParseState::Values
            | ParseState::Error => {}
        }
        Ok(())
    }

    fn declare_var(&mut self) -> Result<()> {
        let [tpe, width, id, name, dims @ ..] = self.pending.as_slice() else {
            return Err(unexpected_n_tokens("variable", &self.pending));
        };
        let var_tpe = convert_var_tpe(tpe);
        let encoding = match var_tpe {
            VarType::String => SignalEncoding::String,
            VarType::Real | VarType::RealTime | VarType::ShortReal => SignalEncoding::Real,
            _ => {
                let len = width
                    .parse::<u32>()
                    .ok()
                    .and_then(NonZeroU32::new)
                    .ok_or_else(|| ParseError::MalformedNumber {
                        what: "variable width",
                        value: width.to_string(),
                    })?;
                SignalEncoding::BitVector(len)
            }
        };
        match self.ids.get(id.as_ref()) {
            Some(&(node, _)) => self.hierarchy.add_alias(name, node)?,
            None => {
                let dimensions = (!dims.is_empty()).then(|| dims.join(" "));
                let (node, signal) = self.hierarchy.add_signal(
                    name,
                    var_tpe,
                    encoding,
                    id.to_string(),
                    dimensions,
                )?;
                debug_assert_eq!(signal.index(), self.changes.len());
                self.ids.insert(id.clone(), (node, signal));
                self.changes.push(Vec::new());
            }
        }
        Ok(())
    }

    fn value_token(&mut self, pos: usize, token: Cow<'a, str>) -> Result<()> {
        if self.skip_to_end {
            self.skip_to_end = token != "$end";
            return Ok(());
        }
        if let Some(value) = self.vector_value.take() {
            return self.vector_change(&value, &token);
        }
        match parse_first_token(&token, pos)? {
            FirstToken::Time(time) => {
                if time < self.time {
                    return Err(ParseError::TimeRegression {
                        prev: self.time,
                        next: time,
                    });
                }
                self.time = time;
            }
            FirstToken::OneBitValue(value, id) => {
                if id.is_empty() {
                    return Err(ParseError::EmptyIdCode);
                }
                self.record(id, value.to_ascii_lowercase())?;
            }
            FirstToken::MultiBitValue => self.vector_value = Some(token.clone()),
            FirstToken::SkippedCmd => {
                log::debug!("skipping `{token}` at byte {pos} inside of the value section");
                self.skip_to_end = true;
            }
            FirstToken::EndDefinitions => {
                self.pending.clear();
                self.state = ParseState::EndDefinitions;
            }
            FirstToken::IgnoredCmd => {}
        }
        Ok(())
    }

    fn vector_change(&mut self, token: &str, id: &str) -> Result<()> {
        let (marker, value) = token.split_at(1);
        let value = match marker {
            "b" | "B" => value.to_ascii_lowercase(),
            _ => value.to_string(),
        };
        self.record(id, value)
    }

    fn record(&mut self, id: &str, value: String) -> Result<()> {
        let &(_, signal) = self
            .ids
            .get(id)
            .ok_or_else(|| ParseError::UnknownIdCode(id.to_string()))?;
        let changes = &mut self.changes[signal.index()];
        match changes.last_mut() {
            // only the last change within one timestep counts
            Some((time, last)) if *time == self.time => *last = value,
            _ => changes.push((self.time, value)),
        }
        Ok(())
    }

    fn finish(self) -> Result<ParsedTrace> {
        if self.vector_value.is_some() {
            return Err(ParseError::EmptyIdCode);
        }
        match self.state {
            ParseState::None | ParseState::Values => {}
            state => return Err(ParseError::UnterminatedDirective(state.directive())),
        }
        let hierarchy = self
            .hierarchy
            .finish()
            .ok_or(ParseError::MissingRootScope)?;
        log::debug!(
            "parsed {} signals, value section starts at {:?}",
            self.changes.len(),
            self.body_start
        );
        Ok(ParsedTrace {
            hierarchy,
            changes: self.changes,
            max_time: self.time,
            body_start: self.body_start,
        })
    }
}

enum FirstToken<'a> {
    Time(Time),
    OneBitValue(&'a str, &'a str),
    MultiBitValue,
    /// header command whose tokens up to `$end` carry no values
    SkippedCmd,
    EndDefinitions,
    IgnoredCmd,
}

fn parse_first_token(token: &str, pos: usize) -> Result<FirstToken<'_>> {
    match token.as_bytes()[0] {
        b'#' => Ok(FirstToken::Time(parse_time(&token[1..])?)),
        b'0' | b'1' | b'z' | b'Z' | b'x' | b'X' | b'h' | b'H' | b'u' | b'U' | b'w' | b'W'
        | b'l' | b'L' | b'-' => {
            let (value, id) = token.split_at(1);
            Ok(FirstToken::OneBitValue(value, id))
        }
        b'b' | b'B' | b'r' | b'R' | b's' | b'S' => Ok(FirstToken::MultiBitValue),
        // the values inside of a `$dumpvars` block still count
        b'$' => match token {
            "$dumpvars" | "$dumpall" | "$dumpon" | "$dumpoff" | "$end" => {
                Ok(FirstToken::IgnoredCmd)
            }
            _ => match ParseState::from_directive(token) {
                ParseState::EndDefinitions => Ok(FirstToken::EndDefinitions),
                ParseState::Error => Err(ParseError::UnknownDirective(token.to_string())),
                _ => Ok(FirstToken::SkippedCmd),
            },
        },
        _ => Err(unexpected(token, pos)),
    }
}

fn parse_time(value: &str) -> Result<Time> {
    match value.parse::<u64>() {
        Ok(time) => Ok(time),
        // some simulators print integer times as floats
        Err(_) => match value.parse::<f64>() {
            Ok(f) if f.fract() == 0.0 && f >= 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
            _ => Err(ParseError::MalformedNumber {
                what: "timestamp",
                value: value.to_string(),
            }),
        },
    }
}

fn parse_timescale<S: AsRef<str>>(tokens: &[S]) -> Result<Timescale> {
    let (factor, unit) = match tokens {
        // find the first non-numeric character
        [token] => {
            let token = token.as_ref();
            match token.find(|c: char| !c.is_ascii_digit()) {
                None => (token, ""),
                Some(pos) => token.split_at(pos),
            }
        }
        [factor, unit] => (factor.as_ref(), unit.as_ref()),
        _ => return Err(unexpected_n_tokens("timescale", tokens)),
    };
    let factor = factor
        .parse::<u32>()
        .map_err(|_| ParseError::MalformedNumber {
            what: "timescale factor",
            value: factor.to_string(),
        })?;
    Ok(Timescale::new(factor, convert_timescale_unit(unit)))
}

fn convert_timescale_unit(name: &str) -> TimescaleUnit {
    match name {
        "fs" => TimescaleUnit::FemtoSeconds,
        "ps" => TimescaleUnit::PicoSeconds,
        "ns" => TimescaleUnit::NanoSeconds,
        "us" => TimescaleUnit::MicroSeconds,
        "ms" => TimescaleUnit::MilliSeconds,
        "s" => TimescaleUnit::Seconds,
        _ => TimescaleUnit::Unknown,
    }
}

fn convert_scope_tpe(tpe: &str) -> ScopeType {
    match tpe {
        "module" => ScopeType::Module,
        "task" => ScopeType::Task,
        "function" => ScopeType::Function,
        "begin" => ScopeType::Begin,
        "fork" => ScopeType::Fork,
        "generate" => ScopeType::Generate,
        "struct" => ScopeType::Struct,
        "union" => ScopeType::Union,
        "class" => ScopeType::Class,
        "interface" => ScopeType::Interface,
        "package" => ScopeType::Package,
        "program" => ScopeType::Program,
        // questa sim produces "unknown" scopes
        "unknown" => ScopeType::Unknown,
        other => {
            log::warn!("unknown scope type `{other}`");
            ScopeType::Unknown
        }
    }
}

fn convert_var_tpe(tpe: &str) -> VarType {
    match tpe {
        "wire" => VarType::Wire,
        "reg" => VarType::Reg,
        "parameter" => VarType::Parameter,
        "integer" => VarType::Integer,
        "string" => VarType::String,
        "event" => VarType::Event,
        "real" => VarType::Real,
        "real_parameter" => VarType::Parameter,
        "supply0" => VarType::Supply0,
        "supply1" => VarType::Supply1,
        "time" => VarType::Time,
        "tri" => VarType::Tri,
        "triand" => VarType::TriAnd,
        "trior" => VarType::TriOr,
        "trireg" => VarType::TriReg,
        "tri0" => VarType::Tri0,
        "tri1" => VarType::Tri1,
        "wand" => VarType::WAnd,
        "wor" => VarType::WOr,
        "logic" => VarType::Logic,
        "port" => VarType::Port,
        "sparray" => VarType::SparseArray,
        "realtime" => VarType::RealTime,
        "bit" => VarType::Bit,
        "int" => VarType::Int,
        "shortint" => VarType::ShortInt,
        "longint" => VarType::LongInt,
        "byte" => VarType::Byte,
        "enum" => VarType::Enum,
        "shortreal" => VarType::ShortReal,
        other => {
            log::warn!("unknown variable type `{other}`");
            VarType::Unknown
        }
    }
}

#[inline]
fn unexpected(token: &str, pos: usize) -> ParseError {
    ParseError::UnexpectedToken {
        token: token.to_string(),
        pos,
    }
}

#[inline]
fn unexpected_n_tokens<S: AsRef<str>>(cmd: &str, tokens: &[S]) -> ParseError {
    let tokens: Vec<&str> = tokens.iter().map(|t| t.as_ref()).collect();
    ParseError::UnexpectedNumberOfTokens(cmd.to_string(), tokens.join(", "))
}

#[inline]
fn is_white_space(b: u8) -> bool {
    matches!(b, b' ' | b'\n' | b'\r' | b'\t')
}

/// Whitespace separated tokens together with their byte offset.
struct Tokens<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = (usize, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.input;
        let start = self.pos + bytes[self.pos..].iter().position(|b| !is_white_space(*b))?;
        let end = bytes[start..]
            .iter()
            .position(|b| is_white_space(*b))
            .map_or(bytes.len(), |len| start + len);
        self.pos = end;
        Some((start, &bytes[start..end]))
    }
}

struct ProgressReporter {
    progress: Option<ProgressCount>,
    last_reported_pos: usize,
    report_increments: usize,
}

impl ProgressReporter {
    #[inline]
    fn new(progress: Option<ProgressCount>, len: usize) -> Self {
        Self {
            progress,
            last_reported_pos: 0,
            report_increments: std::cmp::max(len / 1000, 512),
        }
    }

    #[inline]
    fn report(&mut self, pos: usize, always_report: bool) {
        if let Some(p) = self.progress.as_ref() {
            let increment = pos - self.last_reported_pos;
            if always_report || increment > self.report_increments {
                p.fetch_add(increment as u64, Ordering::SeqCst);
                self.last_reported_pos = pos;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;
    use std::sync::Arc;

    fn parse_str(input: &str) -> Result<ParsedTrace> {
        parse(input.as_bytes(), None)
    }

    #[test]
    fn test_tokens() {
        let tokens: Vec<_> = Tokens::new(b"  $var wire\t1 !\r\n clk $end")
            .map(|(pos, token)| (pos, std::str::from_utf8(token).unwrap()))
            .collect();
        assert_eq!(
            tokens,
            [
                (2, "$var"),
                (7, "wire"),
                (12, "1"),
                (14, "!"),
                (18, "clk"),
                (22, "$end")
            ]
        );
        assert_eq!(Tokens::new(b" \n ").count(), 0);
    }

    #[test]
    fn test_parse_timescale() {
        assert_eq!(
            parse_timescale(&["1ns"]).unwrap(),
            Timescale::new(1, TimescaleUnit::NanoSeconds)
        );
        assert_eq!(
            parse_timescale(&["10", "ps"]).unwrap(),
            Timescale::new(10, TimescaleUnit::PicoSeconds)
        );
        assert_eq!(
            parse_timescale(&["1", "ticks"]).unwrap(),
            Timescale::new(1, TimescaleUnit::Unknown)
        );
        assert!(matches!(
            parse_timescale(&["ns"]),
            Err(ParseError::MalformedNumber { .. })
        ));
        assert!(matches!(
            parse_timescale(&["1", "ns", "extra"]),
            Err(ParseError::UnexpectedNumberOfTokens(..))
        ));
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("100").unwrap(), 100);
        assert_eq!(parse_time("20.0").unwrap(), 20);
        assert!(parse_time("2.5").is_err());
        assert!(parse_time("-1").is_err());
        assert!(parse_time("").is_err());
    }

    #[test]
    fn test_header_strings() {
        let trace = parse_str(
            "$date Mon Feb 12 $end $version Icarus  Verilog $end \
             $comment hello $scope world $end \
             $timescale 1 us $end $scope module t $end $upscope $end \
             $enddefinitions $end",
        )
        .unwrap();
        let h = &trace.hierarchy;
        assert_eq!(h.date(), "Mon Feb 12");
        assert_eq!(h.version(), "Icarus Verilog");
        assert_eq!(h.comments(), ["hello $scope world"]);
        assert_eq!(
            h.timescale(),
            Some(Timescale::new(1, TimescaleUnit::MicroSeconds))
        );
        assert_eq!(trace.max_time, 0);
        assert!(trace.body_start.is_some());
    }

    #[test]
    fn test_values() {
        let trace = parse_str(
            "$scope module top $end \
             $var wire 4 ! data [3:0] $end $var real 64 \" r $end \
             $var wire 1 # en $end \
             $upscope $end $enddefinitions $end \
             $dumpvars bXX01 ! r1.5 \" Z# $end \
             #3 b1 ! b0 ! $comment ignore #4 this $end \
             #7 1# R2.25 \"",
        )
        .unwrap();
        assert_eq!(trace.max_time, 7);
        let data = |ii: usize| {
            trace.changes[ii]
                .iter()
                .map(|(t, v)| (*t, v.as_str()))
                .collect::<Vec<_>>()
        };
        assert_eq!(data(0), [(0, "xx01"), (3, "0")]);
        assert_eq!(data(1), [(0, "1.5"), (7, "2.25")]);
        assert_eq!(data(2), [(0, "z"), (7, "1")]);

        let h = &trace.hierarchy;
        let node = h.resolve_signal("top.data", None).unwrap();
        assert_eq!(h[node].as_signal().unwrap().dimensions(), Some("[3:0]"));
        let r = h.resolve_signal("top.r", None).unwrap();
        assert_eq!(
            h[r].as_signal().unwrap().encoding(),
            SignalEncoding::Real
        );
    }

    #[test]
    fn test_errors() {
        let header = "$scope module top $end $var wire 1 ! a $end $upscope $end $enddefinitions $end ";
        assert!(matches!(
            parse_str(&format!("{header} #5 1! #4")),
            Err(ParseError::TimeRegression { prev: 5, next: 4 })
        ));
        assert!(matches!(
            parse_str(&format!("{header} #5 1?")),
            Err(ParseError::UnknownIdCode(id)) if id == "?"
        ));
        assert!(matches!(
            parse_str(&format!("{header} 1")),
            Err(ParseError::EmptyIdCode)
        ));
        assert!(matches!(
            parse_str(&format!("{header} b101")),
            Err(ParseError::EmptyIdCode)
        ));
        assert!(matches!(
            parse_str(&format!("{header} #1x")),
            Err(ParseError::MalformedNumber { .. })
        ));
        assert!(matches!(
            parse_str(&format!("{header} foo")),
            Err(ParseError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            parse_str("$scope module top $end $upscope $end $upscope $end"),
            Err(ParseError::Hierarchy(HierarchyError::UnbalancedUpscope))
        ));
        assert!(matches!(
            parse_str("$foo $end"),
            Err(ParseError::UnknownDirective(d)) if d == "$foo"
        ));
        assert!(matches!(
            parse_str("$scope module top $end $var wire x ! a $end"),
            Err(ParseError::MalformedNumber { .. })
        ));
        assert!(matches!(
            parse_str("$scope module top $end $var wire 0 ! a $end"),
            Err(ParseError::MalformedNumber { .. })
        ));
        assert!(matches!(
            parse_str("$scope module top $end $var wire 1 ! $end"),
            Err(ParseError::UnexpectedNumberOfTokens(..))
        ));
        assert!(matches!(
            parse_str("$scope module top $end $var wire 1 ! a"),
            Err(ParseError::UnterminatedDirective("$var"))
        ));
        assert!(matches!(
            parse_str("$date today $end $enddefinitions $end"),
            Err(ParseError::MissingRootScope)
        ));
        assert!(matches!(
            parse_str("top $end"),
            Err(ParseError::UnexpectedToken { pos: 0, .. })
        ));
    }

    #[test]
    fn test_header_commands_inside_of_values() {
        let trace = parse_str(
            "$scope module top $end $var wire 1 ! a $end $upscope $end $enddefinitions $end \
             #0 1! $upscope $end \
             #5 0! $scope module late $end $var wire 1 \" b $end $upscope $end \
             #6 $date later $end 1! $timescale 1 ps $end #8 0!",
        )
        .unwrap();
        assert_eq!(trace.max_time, 8);
        assert_eq!(
            trace.changes[0],
            [
                (0, "1".to_string()),
                (5, "0".to_string()),
                (6, "1".to_string()),
                (8, "0".to_string())
            ]
        );
        // declarations after the header do not change the hierarchy
        assert_eq!(trace.changes.len(), 1);
        assert_eq!(trace.hierarchy.num_nodes(), 2);
        assert_eq!(trace.hierarchy.date(), "");
        assert_eq!(trace.hierarchy.timescale(), None);

        let header = "$scope module top $end $var wire 1 ! a $end $upscope $end $enddefinitions $end ";
        assert!(matches!(
            parse_str(&format!("{header} #0 $bogus $end")),
            Err(ParseError::UnknownDirective(d)) if d == "$bogus"
        ));
    }

    #[test]
    fn test_repeated_enddefinitions() {
        let input = "$scope module top $end $var wire 1 ! a $end $upscope $end $enddefinitions $end #0 1! ";
        let first_body = input.find("#0").unwrap() - 1;
        let trace = parse_str(&format!("{input}$enddefinitions $end #3 0! #4 1!")).unwrap();
        assert_eq!(trace.body_start, Some(first_body));
        assert_eq!(trace.max_time, 4);
        let times: Vec<_> = trace.changes[0].iter().map(|(t, _)| *t).collect();
        assert_eq!(times, [0, 3, 4]);
    }

    #[test]
    fn test_non_utf8_bytes() {
        let input = b"$comment caf\xe9 $end $scope module top $end $var string 1 ! s $end \
             $upscope $end $enddefinitions $end #0 s\xff\xfe ! $comment \xc0 $end #2 sok !";
        let trace = parse(input, None).unwrap();
        assert_eq!(trace.hierarchy.comments(), ["caf\u{fffd}"]);
        assert_eq!(
            trace.changes[0],
            [(0, "\u{fffd}\u{fffd}".to_string()), (2, "ok".to_string())]
        );
    }

    #[test]
    fn test_progress_reports_all_bytes() {
        let input = "$scope module top $end $var wire 1 ! a $end $enddefinitions $end #0 1! #1 0!\n";
        let progress: ProgressCount = Arc::new(AtomicU64::new(0));
        parse(input.as_bytes(), Some(progress.clone())).unwrap();
        assert_eq!(progress.load(Ordering::SeqCst), input.len() as u64);
    }
}
