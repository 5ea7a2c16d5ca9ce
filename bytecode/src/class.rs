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
//! The class file record.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::debug;

use crate::access::AccessFlags;
use crate::attr::Attribute;
use crate::constant_pool::{ConstantPool, ConstantPoolReader};
use crate::error::{Error, Result};
use crate::member::ClassMember;
use crate::rw::{read_vec, vec_size, write_vec};
use crate::version::ClassVersion;
use crate::{ConstantPoolReadWrite, ReadWrite};

pub const JVM_MAGIC: u32 = 0xCAFEBABE;

/// A complete class file.
///
/// Every field maps to one part of the binary layout, in order. References are kept as raw
/// constant pool indices, so writing a class back out produces the bytes it was read from.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassFile {
    pub version: ClassVersion,
    pub constant_pool: ConstantPool,
    pub access_flags: AccessFlags,
    pub this_class: u16,
    /// 0 for `java/lang/Object` and module descriptors.
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<ClassMember>,
    pub methods: Vec<ClassMember>,
    pub attributes: Vec<Attribute>,
}

impl ClassFile {
    pub fn from_bytes(bytes: &[u8]) -> Result<ClassFile> {
        let mut reader = bytes;
        let class = ClassFile::read_from(&mut reader)?;
        if !reader.is_empty() {
            return Err(Error::Invalid(
                "class file",
                format!("{} trailing bytes", reader.len()),
            ));
        }
        Ok(class)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.size());
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Reads a class file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<ClassFile> {
        let mut bytes = Vec::new();
        BufReader::new(File::open(path)?).read_to_end(&mut bytes)?;
        ClassFile::from_bytes(&bytes)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Internal name of this class, e.g. `java/lang/String`.
    pub fn this_class_name(&self) -> Result<Cow<'_, str>> {
        self.constant_pool.read_class(self.this_class)
    }

    pub fn super_class_name(&self) -> Result<Option<Cow<'_, str>>> {
        match self.super_class {
            0 => Ok(None),
            index => self.constant_pool.read_class(index).map(Some),
        }
    }

    fn find_member(&self, members: &[ClassMember], name: &str, descriptor: &str) -> Option<usize> {
        members.iter().position(|m| {
            matches!(m.name(&self.constant_pool), Ok(n) if n == name)
                && matches!(m.descriptor(&self.constant_pool), Ok(d) if d == descriptor)
        })
    }

    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<&ClassMember> {
        let index = self.find_member(&self.methods, name, descriptor)?;
        self.methods.get(index)
    }

    pub fn find_method_mut(&mut self, name: &str, descriptor: &str) -> Option<&mut ClassMember> {
        let index = self.find_member(&self.methods, name, descriptor)?;
        self.methods.get_mut(index)
    }

    pub fn find_field(&self, name: &str, descriptor: &str) -> Option<&ClassMember> {
        let index = self.find_member(&self.fields, name, descriptor)?;
        self.fields.get(index)
    }
}

impl ReadWrite for ClassFile {
    fn read_from<T: Read>(reader: &mut T) -> Result<Self> {
        match u32::read_from(reader)? {
            JVM_MAGIC => {
                let version = ClassVersion::read_from(reader)?;
                let constant_pool = ConstantPool::read_from(reader)?;
                let cp = &constant_pool;
                let access_flags = AccessFlags::read_from(reader)?;
                let this_class = u16::read_from(reader)?;
                let super_class = u16::read_from(reader)?;
                let interfaces = read_vec::<u16, _, _>(reader)?;
                let fields: Vec<ClassMember> = read_from!(cp, reader)?;
                let methods: Vec<ClassMember> = read_from!(cp, reader)?;
                let attributes: Vec<Attribute> = read_from!(cp, reader)?;
                debug!(
                    "read class ({}): {} constants, {} fields, {} methods, {} attributes",
                    version,
                    constant_pool.count(),
                    fields.len(),
                    methods.len(),
                    attributes.len()
                );
                Ok(ClassFile {
                    version,
                    constant_pool,
                    access_flags,
                    this_class,
                    super_class,
                    interfaces,
                    fields,
                    methods,
                    attributes,
                })
            }
            n => Err(Error::BadMagic(n)),
        }
    }

    fn write_to<T: Write>(&self, writer: &mut T) -> Result<()> {
        debug!(
            "writing class ({}): {} constants, {} methods",
            self.version,
            self.constant_pool.count(),
            self.methods.len()
        );
        JVM_MAGIC.write_to(writer)?;
        self.version.write_to(writer)?;
        self.constant_pool.write_to(writer)?;
        self.access_flags.write_to(writer)?;
        self.this_class.write_to(writer)?;
        self.super_class.write_to(writer)?;
        write_vec::<u16, _, _>(&self.interfaces, writer)?;
        ConstantPoolReadWrite::write_to(&self.fields, writer)?;
        ConstantPoolReadWrite::write_to(&self.methods, writer)?;
        ConstantPoolReadWrite::write_to(&self.attributes, writer)
    }

    fn size(&self) -> usize {
        4 + 4
            + self.constant_pool.size()
            + 6
            + vec_size::<u16, _>(&self.interfaces)
            + ConstantPoolReadWrite::size(&self.fields)
            + ConstantPoolReadWrite::size(&self.methods)
            + ConstantPoolReadWrite::size(&self.attributes)
    }
}
