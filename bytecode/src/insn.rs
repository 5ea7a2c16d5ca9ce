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
//! The instruction model.
//!
//! Instructions are kept close to their binary form: an [`Opcode`], the raw [`Operand`] that
//! follows it, and the byte offset of the instruction inside its code array. Constant pool
//! indices stay indices and branch offsets stay relative, so a decoded code array encodes back
//! byte for byte.
//!
//! The offset is derived state. [`decode`] stamps it from the reader's byte count and the
//! insertion engine recomputes it after splicing; [`Instruction::write_to`] ignores it and takes
//! the switch padding from the writer's byte count instead.

use std::convert::TryFrom;
use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::io::{ByteReader, ByteWriter};
use crate::opcode::{Opcode, OperandShape};
use crate::rw::PREALLOCATION_LIMIT;

/// The operands following an opcode.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Operand {
    None,
    /// `bipush` (reinterpret as `i8`), `ldc` and `newarray`.
    Byte(u8),
    /// Loads, stores and `ret`. `wide` is set when the instruction carries the `wide` prefix.
    Local { index: u16, wide: bool },
    /// `sipush` (reinterpret as `i16`) and every instruction taking a two byte constant pool index.
    Short(u16),
    Branch(i16),
    /// `goto_w` and `jsr_w`.
    WideBranch(i32),
    InvokeDynamic { index: u16, reserved: u16 },
    Increment { index: u16, constant: i16, wide: bool },
    InvokeInterface { index: u16, count: u8, reserved: u8 },
    MultiANewArray { index: u16, dimensions: u8 },
    /// A jump table for keys `low..=high`. When `high < low` the table is empty.
    TableSwitch {
        default: i32,
        low: i32,
        high: i32,
        offsets: Vec<i32>,
    },
    /// Match and offset pairs, sorted by match in well formed code.
    LookupSwitch { default: i32, pairs: Vec<(i32, i32)> },
}

/// One instruction and its position in the code array.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Instruction {
    pub offset: u32,
    pub opcode: Opcode,
    pub operand: Operand,
}

/// Number of zero bytes after a switch opcode at `offset`, so that its operands start on a
/// multiple of four.
#[inline]
pub const fn padding(offset: u32) -> u32 {
    (4 - (offset + 1) % 4) % 4
}

/// Number of jump table entries of a `tableswitch`.
fn table_len(low: i32, high: i32) -> usize {
    if high < low {
        0
    } else {
        (high as i64 - low as i64 + 1) as usize
    }
}

impl Instruction {
    /// An instruction at offset 0; the offset is filled in once it is placed in a sequence.
    pub fn new(opcode: Opcode, operand: Operand) -> Self {
        Instruction {
            offset: 0,
            opcode,
            operand,
        }
    }

    /// An instruction without operands.
    pub fn simple(opcode: Opcode) -> Self {
        Self::new(opcode, Operand::None)
    }

    pub fn branch(opcode: Opcode, offset: i16) -> Self {
        Self::new(opcode, Operand::Branch(offset))
    }

    /// Encoded size if the instruction were placed at `offset`.
    ///
    /// Only switches depend on the offset, through their padding.
    pub fn size_at(&self, offset: u32) -> u32 {
        match &self.operand {
            Operand::None => 1,
            Operand::Byte(_) => 2,
            Operand::Local { wide: false, .. } => 2,
            Operand::Local { wide: true, .. } => 4,
            Operand::Short(_) | Operand::Branch(_) => 3,
            Operand::Increment { wide: false, .. } => 3,
            Operand::Increment { wide: true, .. } => 6,
            Operand::MultiANewArray { .. } => 4,
            Operand::WideBranch(_) | Operand::InvokeDynamic { .. } | Operand::InvokeInterface { .. } => 5,
            Operand::TableSwitch { offsets, .. } => 1 + padding(offset) + 12 + 4 * offsets.len() as u32,
            Operand::LookupSwitch { pairs, .. } => 1 + padding(offset) + 8 + 8 * pairs.len() as u32,
        }
    }

    /// Encoded size at the instruction's own offset.
    #[inline]
    pub fn size(&self) -> u32 {
        self.size_at(self.offset)
    }

    /// Offset of the next instruction.
    #[inline]
    pub fn end(&self) -> u32 {
        self.offset + self.size()
    }

    pub fn is_branch(&self) -> bool {
        matches!(
            self.operand,
            Operand::Branch(_)
                | Operand::WideBranch(_)
                | Operand::TableSwitch { .. }
                | Operand::LookupSwitch { .. }
        )
    }

    /// Relative branch offsets in operand order: the single offset of a branch, or the
    /// default followed by every table entry of a switch. Empty for everything else.
    pub fn branch_offsets(&self) -> Vec<i32> {
        match &self.operand {
            Operand::Branch(o) => vec![*o as i32],
            Operand::WideBranch(o) => vec![*o],
            Operand::TableSwitch {
                default, offsets, ..
            } => std::iter::once(*default).chain(offsets.iter().copied()).collect(),
            Operand::LookupSwitch { default, pairs } => std::iter::once(*default)
                .chain(pairs.iter().map(|(_, o)| *o))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Absolute branch targets, in the same order as [`branch_offsets`](Self::branch_offsets).
    pub fn branch_targets(&self) -> Vec<i64> {
        self.branch_offsets()
            .into_iter()
            .map(|o| self.offset as i64 + o as i64)
            .collect()
    }

    /// Replaces the branch offsets, given in the order [`branch_offsets`](Self::branch_offsets) returns them.
    ///
    /// Fails with [`Error::BranchOverflow`] if an offset does not fit the operand.
    pub fn set_branch_offsets(&mut self, new: &[i64]) -> Result<()> {
        fn wide(o: i64) -> Result<i32> {
            i32::try_from(o).map_err(|_| Error::BranchOverflow(o))
        }
        let expected = self.branch_offsets().len();
        if new.len() != expected {
            return Err(Error::Invalid(
                "branch offset count",
                format!("{} for {}, expected {}", new.len(), self.opcode, expected),
            ));
        }
        match &mut self.operand {
            Operand::Branch(o) => *o = i16::try_from(new[0]).map_err(|_| Error::BranchOverflow(new[0]))?,
            Operand::WideBranch(o) => *o = wide(new[0])?,
            Operand::TableSwitch {
                default, offsets, ..
            } => {
                *default = wide(new[0])?;
                for (o, n) in offsets.iter_mut().zip(&new[1..]) {
                    *o = wide(*n)?;
                }
            }
            Operand::LookupSwitch { default, pairs } => {
                *default = wide(new[0])?;
                for ((_, o), n) in pairs.iter_mut().zip(&new[1..]) {
                    *o = wide(*n)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Reads one instruction. The reader's byte count must be the offset inside the code array.
    pub fn read_from<R: Read>(reader: &mut ByteReader<R>) -> Result<Instruction> {
        let offset = reader.bytes_read() as u32;
        let mut opcode = Opcode::try_from(reader.read_u8()?)?;
        let mut wide = false;
        if opcode == Opcode::Wide {
            opcode = Opcode::try_from(reader.read_u8()?)?;
            if !opcode.is_widenable() {
                return Err(Error::Invalid("opcode after wide", opcode.to_string()));
            }
            wide = true;
        }
        let operand = match opcode.shape() {
            OperandShape::None => Operand::None,
            OperandShape::Byte => Operand::Byte(reader.read_u8()?),
            OperandShape::Local => Operand::Local {
                index: if wide {
                    reader.read_u16()?
                } else {
                    reader.read_u8()? as u16
                },
                wide,
            },
            OperandShape::Short => Operand::Short(reader.read_u16()?),
            OperandShape::Branch => Operand::Branch(reader.read_i16()?),
            OperandShape::WideBranch => Operand::WideBranch(reader.read_i32()?),
            OperandShape::Increment => {
                if wide {
                    Operand::Increment {
                        index: reader.read_u16()?,
                        constant: reader.read_i16()?,
                        wide,
                    }
                } else {
                    Operand::Increment {
                        index: reader.read_u8()? as u16,
                        constant: reader.read_i8()? as i16,
                        wide,
                    }
                }
            }
            OperandShape::InvokeInterface => Operand::InvokeInterface {
                index: reader.read_u16()?,
                count: reader.read_u8()?,
                reserved: reader.read_u8()?,
            },
            OperandShape::InvokeDynamic => Operand::InvokeDynamic {
                index: reader.read_u16()?,
                reserved: reader.read_u16()?,
            },
            OperandShape::MultiANewArray => Operand::MultiANewArray {
                index: reader.read_u16()?,
                dimensions: reader.read_u8()?,
            },
            OperandShape::TableSwitch => {
                reader.read_fully(padding(offset) as usize)?;
                let default = reader.read_i32()?;
                let low = reader.read_i32()?;
                let high = reader.read_i32()?;
                let len = table_len(low, high);
                let mut offsets = Vec::with_capacity(len.min(PREALLOCATION_LIMIT));
                for _ in 0..len {
                    offsets.push(reader.read_i32()?);
                }
                Operand::TableSwitch {
                    default,
                    low,
                    high,
                    offsets,
                }
            }
            OperandShape::LookupSwitch => {
                reader.read_fully(padding(offset) as usize)?;
                let default = reader.read_i32()?;
                let npairs = reader.read_i32()?;
                if npairs < 0 {
                    return Err(Error::Invalid("lookupswitch pair count", npairs.to_string()));
                }
                let mut pairs = Vec::with_capacity((npairs as usize).min(PREALLOCATION_LIMIT));
                for _ in 0..npairs {
                    pairs.push((reader.read_i32()?, reader.read_i32()?));
                }
                Operand::LookupSwitch { default, pairs }
            }
            OperandShape::Wide => return Err(Error::Invalid("opcode after wide", opcode.to_string())),
        };
        Ok(Instruction {
            offset,
            opcode,
            operand,
        })
    }

    /// Writes the instruction. Switch padding is derived from the writer's byte count, which
    /// must be the offset inside the code array.
    pub fn write_to<W: Write>(&self, writer: &mut ByteWriter<W>) -> Result<()> {
        let mismatch = || {
            Error::Invalid(
                "operand",
                format!("{:?} does not match the operands of {}", self.operand, self.opcode),
            )
        };
        let shape = self.opcode.shape();
        let wide = match &self.operand {
            Operand::Local { wide, .. } | Operand::Increment { wide, .. } => *wide,
            _ => false,
        };
        if wide {
            writer.write_u8(Opcode::Wide.as_u8())?;
        }
        writer.write_u8(self.opcode.as_u8())?;
        match (&self.operand, shape) {
            (Operand::None, OperandShape::None) => {}
            (Operand::Byte(b), OperandShape::Byte) => writer.write_u8(*b)?,
            (Operand::Local { index, wide: true }, OperandShape::Local) => writer.write_u16(*index)?,
            (Operand::Local { index, wide: false }, OperandShape::Local) => {
                writer.write_u8(u8::try_from(*index).map_err(|_| mismatch())?)?
            }
            (Operand::Short(s), OperandShape::Short) => writer.write_u16(*s)?,
            (Operand::Branch(o), OperandShape::Branch) => writer.write_i16(*o)?,
            (Operand::WideBranch(o), OperandShape::WideBranch) => writer.write_i32(*o)?,
            (
                Operand::Increment {
                    index,
                    constant,
                    wide: true,
                },
                OperandShape::Increment,
            ) => {
                writer.write_u16(*index)?;
                writer.write_i16(*constant)?;
            }
            (
                Operand::Increment {
                    index,
                    constant,
                    wide: false,
                },
                OperandShape::Increment,
            ) => {
                writer.write_u8(u8::try_from(*index).map_err(|_| mismatch())?)?;
                writer.write_i8(i8::try_from(*constant).map_err(|_| mismatch())?)?;
            }
            (
                Operand::InvokeInterface {
                    index,
                    count,
                    reserved,
                },
                OperandShape::InvokeInterface,
            ) => {
                writer.write_u16(*index)?;
                writer.write_u8(*count)?;
                writer.write_u8(*reserved)?;
            }
            (Operand::InvokeDynamic { index, reserved }, OperandShape::InvokeDynamic) => {
                writer.write_u16(*index)?;
                writer.write_u16(*reserved)?;
            }
            (Operand::MultiANewArray { index, dimensions }, OperandShape::MultiANewArray) => {
                writer.write_u16(*index)?;
                writer.write_u8(*dimensions)?;
            }
            (
                Operand::TableSwitch {
                    default,
                    low,
                    high,
                    offsets,
                },
                OperandShape::TableSwitch,
            ) => {
                if offsets.len() != table_len(*low, *high) {
                    return Err(Error::Invalid(
                        "tableswitch",
                        format!("{} offsets for keys {}..={}", offsets.len(), low, high),
                    ));
                }
                // the opcode is already written, so the count is one past the opcode
                let pad = padding(writer.bytes_written() as u32 - 1);
                writer.write_bytes(&[0; 3][..pad as usize])?;
                writer.write_i32(*default)?;
                writer.write_i32(*low)?;
                writer.write_i32(*high)?;
                for o in offsets {
                    writer.write_i32(*o)?;
                }
            }
            (Operand::LookupSwitch { default, pairs }, OperandShape::LookupSwitch) => {
                let npairs = i32::try_from(pairs.len()).map_err(|_| Error::ArithmeticOverflow)?;
                let pad = padding(writer.bytes_written() as u32 - 1);
                writer.write_bytes(&[0; 3][..pad as usize])?;
                writer.write_i32(*default)?;
                writer.write_i32(npairs)?;
                for (m, o) in pairs {
                    writer.write_i32(*m)?;
                    writer.write_i32(*o)?;
                }
            }
            _ => return Err(mismatch()),
        }
        Ok(())
    }
}

/// Decodes a whole code array, stamping every instruction with its offset.
pub fn decode(code: &[u8]) -> Result<Vec<Instruction>> {
    let mut reader = ByteReader::new(code);
    let mut insns = Vec::new();
    while reader.bytes_read() < code.len() {
        insns.push(Instruction::read_from(&mut reader)?);
    }
    Ok(insns)
}

/// Encodes a sequence of instructions into a code array.
pub fn encode(insns: &[Instruction]) -> Result<Vec<u8>> {
    let mut writer = ByteWriter::new(Vec::new());
    for insn in insns {
        insn.write_to(&mut writer)?;
    }
    Ok(writer.into_inner())
}

/// Assigns consecutive offsets starting at zero and returns the total code length.
pub fn layout(insns: &mut [Instruction]) -> u32 {
    let mut offset = 0;
    for insn in insns {
        insn.offset = offset;
        offset += insn.size();
    }
    offset
}
