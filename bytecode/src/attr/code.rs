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
use std::io::{Read, Write};

use crate::attr::{Attribute, AttributeInfo, LineNumber, LocalVariable, StackMapFrame};
use crate::constant_pool::ConstantPoolReader;
use crate::error::Result;
use crate::insert::{CodeInsertion, Relocation};
use crate::insn::{self, Instruction};
use crate::rw::{read_bytes, read_vec, vec_size, write_len, write_vec};
use crate::{ConstantPoolReadWrite, ReadWrite};

/// An entry of the exception table. `end_pc` is exclusive and may equal the code length.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ReadWrite)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// Class index of the caught type, 0 to catch everything.
    pub catch_type: u16,
}

/// The body of a method.
#[derive(Clone, Debug, PartialEq)]
pub struct Code {
    pub max_stack: u16,
    pub max_locals: u16,
    /// The decoded code array. Offsets are recomputed on write, so an edited sequence does not
    /// need to be laid out by hand first.
    pub code: Vec<Instruction>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Vec<Attribute>,
}

impl Code {
    /// Length of the code array once encoded.
    pub fn code_length(&self) -> u32 {
        self.code.iter().fold(0, |at, insn| at + insn.size_at(at))
    }

    /// Reassigns instruction offsets from the current sequence.
    pub fn layout(&mut self) -> u32 {
        insn::layout(&mut self.code)
    }

    /// Splices instructions into this body and repairs everything that points into the code
    /// array: branches, the exception table, line numbers, local variable ranges and stack
    /// map frames.
    ///
    /// Nothing is changed if an error is returned.
    pub fn insert(&mut self, insertion: &CodeInsertion) -> Result<Relocation> {
        insertion.apply(self)
    }

    pub fn line_numbers(&self) -> impl Iterator<Item = &LineNumber> {
        self.attributes.iter().flat_map(|a| match &a.info {
            AttributeInfo::LineNumberTable(t) => t.as_slice(),
            _ => &[],
        })
    }

    pub fn local_variables(&self) -> impl Iterator<Item = &LocalVariable> {
        self.attributes.iter().flat_map(|a| match &a.info {
            AttributeInfo::LocalVariableTable(t) => t.as_slice(),
            _ => &[],
        })
    }

    pub fn stack_map(&self) -> Option<&[StackMapFrame]> {
        self.attributes.iter().find_map(|a| match &a.info {
            AttributeInfo::StackMapTable(frames) => Some(frames.as_slice()),
            _ => None,
        })
    }
}

impl ConstantPoolReadWrite for Code {
    fn read_from<C: ConstantPoolReader, R: Read>(cp: &C, reader: &mut R) -> Result<Self> {
        let max_stack = u16::read_from(reader)?;
        let max_locals = u16::read_from(reader)?;
        let code_length = u32::read_from(reader)?;
        let bytes = read_bytes(reader, code_length as usize)?;
        Ok(Code {
            max_stack,
            max_locals,
            code: insn::decode(&bytes)?,
            exception_table: read_vec::<u16, _, _>(reader)?,
            attributes: read_from!(cp, reader)?,
        })
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.max_stack.write_to(writer)?;
        self.max_locals.write_to(writer)?;
        let bytes = insn::encode(&self.code)?;
        write_len::<u32, W>(bytes.len(), writer)?;
        writer.write_all(&bytes)?;
        write_vec::<u16, _, _>(&self.exception_table, writer)?;
        ConstantPoolReadWrite::write_to(&self.attributes, writer)
    }

    fn size(&self) -> usize {
        8 + self.code_length() as usize
            + vec_size::<u16, _>(&self.exception_table)
            + ConstantPoolReadWrite::size(&self.attributes)
    }
}
