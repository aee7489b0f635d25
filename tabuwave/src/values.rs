// Copyright 2024-2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>
//
// Display forms of stored value tokens.

use crate::hierarchy::SignalEncoding;

/// Placeholder for rows past the width of a value.
pub const BLANK: &str = " ";

/// Splits a binary value into one entry per bit, least significant bit first.
///
/// Bits missing from `value` but inside `bit_width` are `"0"`, or `"x"` when the whole value
/// is the don't-care token `x`. Entries past `bit_width` up to `pad_to_size` are blank.
pub fn padded_bits(value: &str, bit_width: u32, pad_to_size: usize) -> Vec<String> {
    let width = bit_width as usize;
    let len = pad_to_size.max(width).max(value.len());
    let fill = if value == "x" { "x" } else { "0" };
    let mut out: Vec<String> = value.chars().rev().map(String::from).collect();
    while out.len() < width {
        out.push(fill.to_string());
    }
    pad_with_blanks(&mut out, len);
    out
}

/// Number of hex digits needed to show `bit_width` bits.
#[inline]
pub fn hex_digits(bit_width: u32) -> usize {
    (bit_width as usize).div_ceil(4)
}

/// Renders a binary value as lower case hex, zero padded to the width of the signal.
///
/// A single `x` bit makes the whole word `x`. Words with `z` but without `x` are all `z`.
/// Any other non binary character also turns the word into `x`.
pub fn to_hex(value: &str, bit_width: u32) -> String {
    let digits = hex_digits(bit_width).max(value.len().div_ceil(4));
    let bytes = value.as_bytes();
    if let Some(state) = non_binary_state(bytes) {
        return std::iter::repeat(state).take(digits).collect();
    }
    let mut out: Vec<char> = Vec::with_capacity(digits);
    for chunk in bytes.rchunks(4) {
        let nibble = chunk
            .iter()
            .fold(0u32, |acc, b| (acc << 1) | u32::from(*b == b'1'));
        // a nibble is always < 16
        out.push(char::from_digit(nibble, 16).unwrap_or('x'));
    }
    while out.len() < digits {
        out.push('0');
    }
    out.iter().rev().collect()
}

fn non_binary_state(bytes: &[u8]) -> Option<char> {
    if bytes.iter().all(|b| matches!(b, b'0' | b'1')) {
        None
    } else if bytes.iter().any(|b| matches!(b, b'x' | b'X')) {
        Some('x')
    } else if bytes.iter().all(|b| matches!(b, b'0' | b'1' | b'z' | b'Z')) {
        Some('z')
    } else {
        Some('x')
    }
}

/// Padded view of a value according to the encoding of its signal.
/// Real and string values occupy a single entry.
pub fn padded_value(value: &str, encoding: SignalEncoding, pad_to_size: usize) -> Vec<String> {
    match encoding {
        SignalEncoding::BitVector(width) => padded_bits(value, width.get(), pad_to_size),
        SignalEncoding::Real | SignalEncoding::String => {
            let mut out = vec![value.to_string()];
            pad_with_blanks(&mut out, pad_to_size);
            out
        }
    }
}

/// Hex view of a value. Real and string values are returned unchanged.
pub fn hex_value(value: &str, encoding: SignalEncoding) -> String {
    match encoding {
        SignalEncoding::BitVector(width) => to_hex(value, width.get()),
        SignalEncoding::Real | SignalEncoding::String => value.to_string(),
    }
}

#[inline]
pub fn pad_with_blanks(values: &mut Vec<String>, len: usize) {
    if values.len() < len {
        values.resize(len, BLANK.to_string());
    }
}
