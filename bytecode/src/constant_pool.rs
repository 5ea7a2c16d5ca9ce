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
//! The constant pool.
//!
//! Entries keep the raw indices they refer to, so nothing is resolved while reading and every
//! pool writes back exactly as it was read. Resolution happens on demand through the
//! [`ConstantPoolReader`] query trait, which fails with [`Error::InvalidReference`] for an
//! index that is zero, out of range, the unusable slot after a long or double, or an entry of
//! the wrong kind.

use std::borrow::Cow;
use std::hash::{Hash, Hasher};
use std::io::{Read, Write};

use crate::descriptor::{FieldType, MethodDescriptor};
use crate::error::{Error, Result};
use crate::mod_utf8::{modified_utf8_to_string, string_to_modified_utf8};
use crate::rw::PREALLOCATION_LIMIT;
use crate::ReadWrite;

/// The payload of a `CONSTANT_Utf8` entry, kept as raw modified UTF-8.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, ReadWrite)]
pub struct Utf8 {
    #[vec_len_type(u16)]
    pub bytes: Vec<u8>,
}

impl Utf8 {
    /// Decodes the string. Pure ASCII is borrowed as is.
    pub fn as_str(&self) -> Result<Cow<'_, str>> {
        if self.bytes.is_ascii() && !self.bytes.contains(&0) {
            if let Ok(s) = std::str::from_utf8(&self.bytes) {
                return Ok(Cow::Borrowed(s));
            }
        }
        Ok(Cow::Owned(modified_utf8_to_string(&self.bytes)?))
    }
}

impl From<&str> for Utf8 {
    fn from(s: &str) -> Self {
        Utf8 {
            bytes: string_to_modified_utf8(s),
        }
    }
}

/// A constant pool entry, tagged as in the class file.
#[derive(Clone, Debug, ReadWrite)]
#[tag_type(u8)]
pub enum ConstantEntry {
    #[tag(1)]
    Utf8(Utf8),
    #[tag(3)]
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    /// Name of the class, as a Utf8 index.
    Class(u16),
    String(u16),
    /// Class index and NameAndType index.
    FieldRef(u16, u16),
    MethodRef(u16, u16),
    InterfaceMethodRef(u16, u16),
    /// Name index and descriptor index.
    NameAndType(u16, u16),
    /// Reference kind and reference index.
    #[tag(15)]
    MethodHandle(u8, u16),
    MethodType(u16),
    /// Bootstrap method attribute index and NameAndType index.
    Dynamic(u16, u16),
    InvokeDynamic(u16, u16),
    Module(u16),
    Package(u16),
}

// floats compare by bit pattern so that `find` and round-trips agree on NaNs
impl PartialEq for ConstantEntry {
    fn eq(&self, other: &Self) -> bool {
        use ConstantEntry as E;
        match (self, other) {
            (E::Utf8(a), E::Utf8(b)) => a == b,
            (E::Integer(a), E::Integer(b)) => a == b,
            (E::Float(a), E::Float(b)) => a.to_bits() == b.to_bits(),
            (E::Long(a), E::Long(b)) => a == b,
            (E::Double(a), E::Double(b)) => a.to_bits() == b.to_bits(),
            (E::Class(a), E::Class(b))
            | (E::String(a), E::String(b))
            | (E::MethodType(a), E::MethodType(b))
            | (E::Module(a), E::Module(b))
            | (E::Package(a), E::Package(b)) => a == b,
            (E::FieldRef(a1, a2), E::FieldRef(b1, b2))
            | (E::MethodRef(a1, a2), E::MethodRef(b1, b2))
            | (E::InterfaceMethodRef(a1, a2), E::InterfaceMethodRef(b1, b2))
            | (E::NameAndType(a1, a2), E::NameAndType(b1, b2))
            | (E::Dynamic(a1, a2), E::Dynamic(b1, b2))
            | (E::InvokeDynamic(a1, a2), E::InvokeDynamic(b1, b2)) => a1 == b1 && a2 == b2,
            (E::MethodHandle(a1, a2), E::MethodHandle(b1, b2)) => a1 == b1 && a2 == b2,
            _ => false,
        }
    }
}

impl Eq for ConstantEntry {}

impl Hash for ConstantEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        use ConstantEntry as E;
        std::mem::discriminant(self).hash(state);
        match self {
            E::Utf8(s) => s.hash(state),
            E::Integer(i) => i.hash(state),
            E::Float(f) => f.to_bits().hash(state),
            E::Long(l) => l.hash(state),
            E::Double(d) => d.to_bits().hash(state),
            E::Class(u) | E::String(u) | E::MethodType(u) | E::Module(u) | E::Package(u) => u.hash(state),
            E::FieldRef(u1, u2)
            | E::MethodRef(u1, u2)
            | E::InterfaceMethodRef(u1, u2)
            | E::NameAndType(u1, u2)
            | E::Dynamic(u1, u2)
            | E::InvokeDynamic(u1, u2) => {
                u1.hash(state);
                u2.hash(state);
            }
            E::MethodHandle(b, u) => {
                b.hash(state);
                u.hash(state);
            }
        }
    }
}

impl ConstantEntry {
    /// Returns `true` if this entry is a Long/Double constant, which takes 2 indices.
    #[inline]
    pub const fn is_wide(&self) -> bool {
        matches!(self, ConstantEntry::Long(_) | ConstantEntry::Double(_))
    }

    /// The entry's kind as it is named in the JVM specification.
    pub fn kind(&self) -> &'static str {
        match self {
            ConstantEntry::Utf8(_) => "Utf8",
            ConstantEntry::Integer(_) => "Integer",
            ConstantEntry::Float(_) => "Float",
            ConstantEntry::Long(_) => "Long",
            ConstantEntry::Double(_) => "Double",
            ConstantEntry::Class(_) => "Class",
            ConstantEntry::String(_) => "String",
            ConstantEntry::FieldRef(..) => "Fieldref",
            ConstantEntry::MethodRef(..) => "Methodref",
            ConstantEntry::InterfaceMethodRef(..) => "InterfaceMethodref",
            ConstantEntry::NameAndType(..) => "NameAndType",
            ConstantEntry::MethodHandle(..) => "MethodHandle",
            ConstantEntry::MethodType(_) => "MethodType",
            ConstantEntry::Dynamic(..) => "Dynamic",
            ConstantEntry::InvokeDynamic(..) => "InvokeDynamic",
            ConstantEntry::Module(_) => "Module",
            ConstantEntry::Package(_) => "Package",
        }
    }
}

/// The constant pool of a class file.
///
/// Slot 0 and the slot after every long or double are empty, so the vector is indexed
/// directly by constant pool index and its length is the `constant_pool_count` of the file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstantPool {
    entries: Vec<Option<ConstantEntry>>,
}

impl Default for ConstantPool {
    fn default() -> Self {
        ConstantPool::new()
    }
}

impl ConstantPool {
    pub fn new() -> Self {
        ConstantPool {
            entries: vec![None],
        }
    }

    /// The `constant_pool_count` of the file: one more than the highest index.
    #[inline]
    pub fn count(&self) -> u16 {
        self.entries.len() as u16
    }

    pub fn get(&self, index: u16) -> Option<&ConstantEntry> {
        self.entries.get(index as usize).and_then(Option::as_ref)
    }

    /// Appends an entry and returns its index. Longs and doubles take two slots.
    pub fn push(&mut self, entry: ConstantEntry) -> Result<u16> {
        let width = if entry.is_wide() { 2 } else { 1 };
        if self.entries.len() + width > u16::MAX as usize {
            return Err(Error::ArithmeticOverflow);
        }
        let index = self.entries.len() as u16;
        self.entries.push(Some(entry));
        if width == 2 {
            self.entries.push(None);
        }
        Ok(index)
    }

    /// Finds the first index holding an equal entry.
    pub fn find(&self, entry: &ConstantEntry) -> Option<u16> {
        self.iter().find(|(_, e)| *e == entry).map(|(i, _)| i)
    }

    /// Returns the index of an equal entry, pushing the entry if there is none.
    pub fn intern(&mut self, entry: ConstantEntry) -> Result<u16> {
        match self.find(&entry) {
            Some(i) => Ok(i),
            None => self.push(entry),
        }
    }

    pub fn intern_utf8(&mut self, s: &str) -> Result<u16> {
        self.intern(ConstantEntry::Utf8(Utf8::from(s)))
    }

    pub fn intern_class(&mut self, name: &str) -> Result<u16> {
        let utf8 = self.intern_utf8(name)?;
        self.intern(ConstantEntry::Class(utf8))
    }

    /// Every usable index with its entry, in index order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &ConstantEntry)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (i as u16, e)))
    }
}

impl ReadWrite for ConstantPool {
    fn read_from<T: Read>(reader: &mut T) -> Result<Self> {
        let count = u16::read_from(reader)? as usize;
        if count == 0 {
            return Err(Error::Invalid("constant pool count", "0".into()));
        }
        let mut entries = Vec::with_capacity(count.min(PREALLOCATION_LIMIT));
        entries.push(None);
        while entries.len() < count {
            let entry = ConstantEntry::read_from(reader)?;
            let wide = entry.is_wide();
            entries.push(Some(entry));
            if wide {
                if entries.len() == count {
                    return Err(Error::Invalid(
                        "constant pool",
                        "long or double in the last slot".into(),
                    ));
                }
                entries.push(None);
            }
        }
        Ok(ConstantPool { entries })
    }

    fn write_to<T: Write>(&self, writer: &mut T) -> Result<()> {
        self.count().write_to(writer)?;
        for (_, entry) in self.iter() {
            entry.write_to(writer)?;
        }
        Ok(())
    }

    fn size(&self) -> usize {
        2 + self.iter().map(|(_, e)| e.size()).sum::<usize>()
    }
}

/// A resolved field, method or interface method reference.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MemberRef<'a> {
    pub owner: Cow<'a, str>,
    pub name: Cow<'a, str>,
    pub descriptor: Cow<'a, str>,
    pub interface: bool,
}

const HANDLE_KINDS: [&str; 9] = [
    "getField",
    "getStatic",
    "putField",
    "putStatic",
    "invokeVirtual",
    "invokeStatic",
    "invokeSpecial",
    "newInvokeSpecial",
    "invokeInterface",
];

/// Read-only queries over a constant pool.
///
/// Everything that reads attributes takes one of these, which is how attribute names are
/// resolved while decoding. Only [`read_raw`](Self::read_raw) has to be provided.
pub trait ConstantPoolReader {
    /// The entry at `index`, if the index is usable.
    fn read_raw(&self, index: u16) -> Option<&ConstantEntry>;

    fn read_entry(&self, index: u16) -> Result<&ConstantEntry> {
        self.read_raw(index).ok_or(Error::InvalidReference {
            index,
            expected: "constant",
        })
    }

    fn read_utf8(&self, index: u16) -> Result<Cow<'_, str>> {
        match self.read_raw(index) {
            Some(ConstantEntry::Utf8(s)) => s.as_str(),
            _ => Err(Error::InvalidReference {
                index,
                expected: "Utf8",
            }),
        }
    }

    /// Internal name of a class entry, e.g. `java/lang/Object`.
    fn read_class(&self, index: u16) -> Result<Cow<'_, str>> {
        match self.read_raw(index) {
            Some(ConstantEntry::Class(n)) => self.read_utf8(*n),
            _ => Err(Error::InvalidReference {
                index,
                expected: "Class",
            }),
        }
    }

    fn read_string(&self, index: u16) -> Result<Cow<'_, str>> {
        match self.read_raw(index) {
            Some(ConstantEntry::String(n)) => self.read_utf8(*n),
            _ => Err(Error::InvalidReference {
                index,
                expected: "String",
            }),
        }
    }

    fn read_module(&self, index: u16) -> Result<Cow<'_, str>> {
        match self.read_raw(index) {
            Some(ConstantEntry::Module(n)) => self.read_utf8(*n),
            _ => Err(Error::InvalidReference {
                index,
                expected: "Module",
            }),
        }
    }

    fn read_package(&self, index: u16) -> Result<Cow<'_, str>> {
        match self.read_raw(index) {
            Some(ConstantEntry::Package(n)) => self.read_utf8(*n),
            _ => Err(Error::InvalidReference {
                index,
                expected: "Package",
            }),
        }
    }

    /// Name and descriptor of a NameAndType entry.
    fn read_name_and_type(&self, index: u16) -> Result<(Cow<'_, str>, Cow<'_, str>)> {
        match self.read_raw(index) {
            Some(ConstantEntry::NameAndType(n, t)) => Ok((self.read_utf8(*n)?, self.read_utf8(*t)?)),
            _ => Err(Error::InvalidReference {
                index,
                expected: "NameAndType",
            }),
        }
    }

    fn read_member(&self, index: u16) -> Result<MemberRef<'_>> {
        let (owner, nat, interface) = match self.read_raw(index) {
            Some(ConstantEntry::FieldRef(o, nt)) | Some(ConstantEntry::MethodRef(o, nt)) => (*o, *nt, false),
            Some(ConstantEntry::InterfaceMethodRef(o, nt)) => (*o, *nt, true),
            _ => {
                return Err(Error::InvalidReference {
                    index,
                    expected: "member reference",
                })
            }
        };
        let (name, descriptor) = self.read_name_and_type(nat)?;
        Ok(MemberRef {
            owner: self.read_class(owner)?,
            name,
            descriptor,
            interface,
        })
    }

    fn read_int(&self, index: u16) -> Result<i32> {
        match self.read_raw(index) {
            Some(ConstantEntry::Integer(i)) => Ok(*i),
            _ => Err(Error::InvalidReference {
                index,
                expected: "Integer",
            }),
        }
    }

    fn read_long(&self, index: u16) -> Result<i64> {
        match self.read_raw(index) {
            Some(ConstantEntry::Long(l)) => Ok(*l),
            _ => Err(Error::InvalidReference {
                index,
                expected: "Long",
            }),
        }
    }

    fn read_float(&self, index: u16) -> Result<f32> {
        match self.read_raw(index) {
            Some(ConstantEntry::Float(f)) => Ok(*f),
            _ => Err(Error::InvalidReference {
                index,
                expected: "Float",
            }),
        }
    }

    fn read_double(&self, index: u16) -> Result<f64> {
        match self.read_raw(index) {
            Some(ConstantEntry::Double(d)) => Ok(*d),
            _ => Err(Error::InvalidReference {
                index,
                expected: "Double",
            }),
        }
    }

    /// A label for the entry at `index`, as a viewer would show it on a link to that entry.
    ///
    /// Class names are dotted (array classes as `int[]`), member references are `Owner.name`,
    /// descriptors are rendered in Java source form.
    fn display_name(&self, index: u16) -> Result<String> {
        Ok(match self.read_entry(index)? {
            ConstantEntry::Utf8(s) => s.as_str()?.into_owned(),
            ConstantEntry::Integer(i) => i.to_string(),
            ConstantEntry::Float(f) => format!("{}f", f),
            ConstantEntry::Long(l) => format!("{}L", l),
            ConstantEntry::Double(d) => format!("{}d", d),
            ConstantEntry::Class(_) => class_display(&self.read_class(index)?)?,
            ConstantEntry::String(_) => format!("\"{}\"", self.read_string(index)?),
            ConstantEntry::FieldRef(..) | ConstantEntry::MethodRef(..) | ConstantEntry::InterfaceMethodRef(..) => {
                let m = self.read_member(index)?;
                format!("{}.{}", class_display(&m.owner)?, m.name)
            }
            ConstantEntry::NameAndType(..) => {
                let (name, descriptor) = self.read_name_and_type(index)?;
                name_and_type_display(&name, &descriptor)?
            }
            ConstantEntry::MethodHandle(kind, reference) => {
                let kind = HANDLE_KINDS
                    .get((*kind as usize).wrapping_sub(1))
                    .ok_or_else(|| Error::Invalid("method handle kind", kind.to_string()))?;
                format!("{} {}", kind, self.display_name(*reference)?)
            }
            ConstantEntry::MethodType(d) => self.read_utf8(*d)?.parse::<MethodDescriptor>()?.to_string(),
            ConstantEntry::Dynamic(bsm, nat) | ConstantEntry::InvokeDynamic(bsm, nat) => {
                let (name, descriptor) = self.read_name_and_type(*nat)?;
                format!("#{}:{}", bsm, name_and_type_display(&name, &descriptor)?)
            }
            ConstantEntry::Module(_) => self.read_module(index)?.into_owned(),
            ConstantEntry::Package(_) => self.read_package(index)?.replace('/', "."),
        })
    }
}

fn class_display(internal: &str) -> Result<String> {
    if internal.starts_with('[') {
        Ok(internal.parse::<FieldType>()?.to_string())
    } else {
        Ok(internal.replace('/', "."))
    }
}

fn name_and_type_display(name: &str, descriptor: &str) -> Result<String> {
    if descriptor.starts_with('(') {
        Ok(format!("{}{}", name, descriptor.parse::<MethodDescriptor>()?))
    } else {
        Ok(format!("{} {}", descriptor.parse::<FieldType>()?, name))
    }
}

impl ConstantPoolReader for ConstantPool {
    fn read_raw(&self, index: u16) -> Option<&ConstantEntry> {
        self.get(index)
    }
}
