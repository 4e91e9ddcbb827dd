//! Span utility functions for diagnostic rendering.
//!
//! Helpers for computing line and column numbers from byte spans.

use rill_ir::Span;

/// Compute the 1-based line number where a span starts.
pub fn line_number(source: &str, span: Span) -> u32 {
    offset_to_line_col(source, span.start).0
}

/// Compute 1-based (line, column) from a byte offset.
///
/// The column counts characters (not bytes) from the start of the line.
pub fn offset_to_line_col(source: &str, offset: u32) -> (u32, u32) {
    let offset = (offset as usize).min(source.len());
    let mut line = 1u32;
    let mut line_start = 0usize;

    for (i, byte) in source.bytes().enumerate() {
        if i >= offset {
            break;
        }
        if byte == b'\n' {
            line += 1;
            line_start = i + 1;
        }
    }

    let col = source[line_start..offset].chars().count() as u32 + 1;
    (line, col)
}
