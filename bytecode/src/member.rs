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
//! Fields and methods.

use std::borrow::Cow;
use std::io::{Read, Write};

use crate::access::AccessFlags;
use crate::attr::{Attribute, AttributeInfo, Code};
use crate::constant_pool::ConstantPoolReader;
use crate::descriptor::{FieldType, MethodDescriptor};
use crate::error::Result;
use crate::{ConstantPoolReadWrite, ReadWrite};

/// A field or method record. Both share one layout; which one it is follows from the table
/// it sits in.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassMember {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<Attribute>,
}

impl ClassMember {
    pub fn new(access_flags: AccessFlags, name_index: u16, descriptor_index: u16) -> Self {
        ClassMember {
            access_flags,
            name_index,
            descriptor_index,
            attributes: Vec::new(),
        }
    }

    pub fn name<'a, C: ConstantPoolReader>(&self, cp: &'a C) -> Result<Cow<'a, str>> {
        cp.read_utf8(self.name_index)
    }

    pub fn descriptor<'a, C: ConstantPoolReader>(&self, cp: &'a C) -> Result<Cow<'a, str>> {
        cp.read_utf8(self.descriptor_index)
    }

    /// The descriptor of a field, parsed.
    pub fn field_type<C: ConstantPoolReader>(&self, cp: &C) -> Result<FieldType> {
        self.descriptor(cp)?.parse()
    }

    /// The descriptor of a method, parsed.
    pub fn method_descriptor<C: ConstantPoolReader>(&self, cp: &C) -> Result<MethodDescriptor> {
        self.descriptor(cp)?.parse()
    }

    /// The method body, if this member has one.
    pub fn code(&self) -> Option<&Code> {
        self.attributes.iter().find_map(|a| match &a.info {
            AttributeInfo::Code(code) => Some(code),
            _ => None,
        })
    }

    pub fn code_mut(&mut self) -> Option<&mut Code> {
        self.attributes.iter_mut().find_map(|a| match &mut a.info {
            AttributeInfo::Code(code) => Some(code),
            _ => None,
        })
    }
}

impl ConstantPoolReadWrite for ClassMember {
    fn read_from<C: ConstantPoolReader, R: Read>(cp: &C, reader: &mut R) -> Result<Self> {
        Ok(ClassMember {
            access_flags: AccessFlags::read_from(reader)?,
            name_index: u16::read_from(reader)?,
            descriptor_index: u16::read_from(reader)?,
            attributes: read_from!(cp, reader)?,
        })
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.access_flags.write_to(writer)?;
        self.name_index.write_to(writer)?;
        self.descriptor_index.write_to(writer)?;
        ConstantPoolReadWrite::write_to(&self.attributes, writer)
    }

    fn size(&self) -> usize {
        6 + ConstantPoolReadWrite::size(&self.attributes)
    }
}
