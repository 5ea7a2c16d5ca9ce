/*
 *     This file is part of Classweave.
 *
 *     Classweave is free software: you can redistribute it and/or modify
 *     it under the terms of the GNU Lesser General Public License as published by
 *     the Free Software Foundation, either version 3 of the License, or
 *     (at your option) any later version.
 *
 *     Classweave is distributed in the hope that it will be useful,
 *     but WITHOUT ANY WARRANTY; without even the implied warranty of
 *     MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *     GNU General Public License for more details.
 *
 *     You should have received a copy of the GNU Lesser General Public License
 *     along with Classweave. (LICENSE.md)  If not, see <https://www.gnu.org/licenses/>.
 */

//! Conversion between the JVM's modified UTF-8 and Rust strings.
//!
//! Modified UTF-8 differs from standard UTF-8 in two ways: NUL is encoded as two bytes
//! (`C0 80`), and characters outside the basic multilingual plane are written as a surrogate
//! pair of two three-byte sequences (six bytes) instead of one four-byte sequence.
//!
//! Refer to the [JVM Spec](https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.4.7) for more info.
//!
//! Constant pool entries keep their raw bytes, so these conversions are only needed when a
//! string is actually looked at.

use std::convert::TryFrom;
use thiserror::Error;

/// An error encountered during conversion.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum MUTFError {
    /// A multi-byte sequence was cut off by the end of the buffer.
    #[error("Malformed Input: Partial character at end")]
    PartialCharacterAtEnd,

    /// The sequence starting at this byte index is invalid.
    #[error("Malformed Input around byte: {0}")]
    AroundByte(usize),
}

#[inline]
fn continuation(buf: &[u8], at: usize) -> Result<u32, MUTFError> {
    match buf.get(at) {
        Some(b) if b & 0xC0 == 0x80 => Ok((b & 0x3F) as u32),
        Some(_) => Err(MUTFError::AroundByte(at)),
        None => Err(MUTFError::PartialCharacterAtEnd),
    }
}

/// Tries to read a six byte surrogate pair at `at`, returning `None` if the bytes there
/// are not a high surrogate followed by a low surrogate.
fn surrogate_pair(buf: &[u8], at: usize) -> Option<u32> {
    let s = buf.get(at..at + 6)?;
    if s[0] != 0xED || s[1] & 0xF0 != 0xA0 || s[2] & 0xC0 != 0x80 {
        return None;
    }
    if s[3] != 0xED || s[4] & 0xF0 != 0xB0 || s[5] & 0xC0 != 0x80 {
        return None;
    }
    let high = ((s[1] & 0x0F) as u32 + 1) << 16 | ((s[2] & 0x3F) as u32) << 10;
    let low = ((s[4] & 0x0F) as u32) << 6 | (s[5] & 0x3F) as u32;
    Some(high | low)
}

/// Converts a modified utf-8 sequence to an owned rust string.
pub fn modified_utf8_to_string(buf: &[u8]) -> Result<String, MUTFError> {
    let mut out = String::with_capacity(buf.len());
    let mut i = 0;
    while i < buf.len() {
        let c = buf[i];
        let (code, width) = match c >> 4 {
            0..=7 => (c as u32, 1),
            12 | 13 => (((c & 0x1F) as u32) << 6 | continuation(buf, i + 1)?, 2),
            14 => match surrogate_pair(buf, i) {
                Some(code) => (code, 6),
                None => {
                    let c2 = continuation(buf, i + 1)?;
                    let c3 = continuation(buf, i + 2)?;
                    (((c & 0x0F) as u32) << 12 | c2 << 6 | c3, 3)
                }
            },
            _ => return Err(MUTFError::AroundByte(i)),
        };
        // an unpaired surrogate has no Rust representation
        out.push(char::try_from(code).map_err(|_| MUTFError::AroundByte(i))?);
        i += width;
    }
    Ok(out)
}

/// Converts a string to modified UTF-8.
///
/// This never fails: every `&str` is valid UTF-8 and every Unicode scalar value has a
/// modified UTF-8 encoding.
pub fn string_to_modified_utf8(str: &str) -> Vec<u8> {
    let len = str
        .chars()
        .map(|c| match c as u32 {
            0x1..=0x7F => 1,
            0x0 | 0x80..=0x7FF => 2,
            0x800..=0xFFFF => 3,
            _ => 6,
        })
        .sum();
    let mut vec = Vec::with_capacity(len);
    for c in str.chars() {
        let c = c as u32;
        match c {
            0x1..=0x7F => vec.push(c as u8),
            0x0 | 0x80..=0x7FF => {
                vec.push(0xC0 | (c >> 6) as u8 & 0x1F);
                vec.push(0x80 | c as u8 & 0x3F);
            }
            0x800..=0xFFFF => {
                vec.push(0xE0 | (c >> 12) as u8 & 0x0F);
                vec.push(0x80 | (c >> 6) as u8 & 0x3F);
                vec.push(0x80 | c as u8 & 0x3F);
            }
            _ => {
                // high surrogate, then low surrogate
                vec.push(0xED);
                vec.push(0xA0 | (((c >> 16) as u8 & 0x1F) - 1));
                vec.push(0x80 | (c >> 10) as u8 & 0x3F);
                vec.push(0xED);
                vec.push(0xB0 | (c >> 6) as u8 & 0x0F);
                vec.push(0x80 | c as u8 & 0x3F);
            }
        }
    }
    vec
}
