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
use thiserror::Error;

/// Everything that can go wrong while reading, writing or rewriting a class file.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying stream failure. A truncated input shows up here as `UnexpectedEof`.
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error("Invalid {0}: {1}")]
    Invalid(&'static str, String),
    #[error(transparent)]
    MUTF(#[from] crate::mod_utf8::MUTFError),
    #[error("Attribute length mismatch in {name}: declared {declared} bytes, consumed {consumed} bytes")]
    AttributeLength {
        name: String,
        declared: u32,
        consumed: u32,
    },
    #[error("Bad magic number {0:#010x}, expected 0xcafebabe")]
    BadMagic(u32),

    /// A constant pool index that is zero, out of bounds, the second slot of a
    /// long/double, or an entry of the wrong kind.
    #[error("Constant pool index {index} does not refer to a {expected} entry")]
    InvalidReference { index: u16, expected: &'static str },

    #[error("Branch at offset {at} targets offset {target}, which is not an instruction boundary")]
    InvalidTarget { at: u32, target: i64 },
    #[error("Exception table entry refers to pc {0}, which is not an instruction boundary")]
    InvalidException(u32),
    #[error("Line number table entry refers to pc {0}, which is not an instruction boundary")]
    InvalidLineNumber(u32),
    #[error("Local variable entry refers to pc {0}, which is not an instruction boundary")]
    InvalidLocalVariable(u32),
    #[error("Type annotation refers to pc {0}, which is not an instruction boundary")]
    InvalidTypeAnnotation(u32),
    #[error("Stack map frame at pc {0} is not on an instruction boundary")]
    InvalidStackMapFrame(u32),
    #[error("More than one insertion requested at instruction {0}")]
    DuplicateInsertion(usize),
    #[error("Insertion at instruction {position} is out of range ({len} instructions)")]
    InsertionOutOfRange { position: usize, len: usize },
    #[error("Branch offset {0} does not fit its operand")]
    BranchOverflow(i64),

    #[error("Conversion overflows")]
    ArithmeticOverflow,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
