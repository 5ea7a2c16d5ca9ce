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
//! Re-exports of the types most code working on class files needs.

pub use crate::access::AccessFlags;
pub use crate::attr::{Attribute, AttributeInfo, Code, ExceptionTableEntry, LineNumber, LocalVariable};
pub use crate::class::ClassFile;
pub use crate::constant_pool::{ConstantEntry, ConstantPool, ConstantPoolReader};
pub use crate::insert::{CodeInsertion, DuplicatePolicy, Insertion, Relocation};
pub use crate::insn::{Instruction, Operand};
pub use crate::member::ClassMember;
pub use crate::opcode::Opcode;
pub use crate::version::ClassVersion;
pub use crate::{ConstantPoolReadWrite, Error, ReadWrite, Result};
