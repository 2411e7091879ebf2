//! Physical line splitting
//!
//! Splits the source on `\n`, `\r\n` and lone `\r`, keeping the kind of terminator so lines
//! can be written back unchanged.

use crate::robot::token::EolKind;

/// One line of source text, without its terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalLine<'a> {
    pub text: &'a str,
    /// byte offset of the first character of `text`
    pub offset: usize,
    pub eol: EolKind,
}

pub fn split_lines(source: &str) -> Vec<PhysicalLine<'_>> {
    let bytes = source.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(PhysicalLine {
                    text: &source[start..i],
                    offset: start,
                    eol: EolKind::Lf,
                });
                i += 1;
                start = i;
            }
            b'\r' => {
                let crlf = bytes.get(i + 1) == Some(&b'\n');
                lines.push(PhysicalLine {
                    text: &source[start..i],
                    offset: start,
                    eol: if crlf { EolKind::CrLf } else { EolKind::Cr },
                });
                i += if crlf { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        lines.push(PhysicalLine {
            text: &source[start..],
            offset: start,
            eol: EolKind::Eof,
        });
    }
    lines
}
