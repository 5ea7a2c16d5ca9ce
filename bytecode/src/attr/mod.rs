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
//! Attributes.
//!
//! An attribute is a constant pool name, a length, and that many bytes of payload. The name
//! selects the payload's layout while reading; names this crate does not know are kept as
//! [`AttributeInfo::Unknown`] and written back untouched. The length is never stored: it is
//! recomputed from the payload whenever it is needed.

use std::borrow::Cow;
use std::io::{Read, Write};

use log::trace;

use crate::access::AccessFlags;
use crate::constant_pool::{ConstantPool, ConstantPoolReader};
use crate::error::{Error, Result};
use crate::rw::{read_bytes, read_vec, vec_size, write_len, write_vec};
use crate::{ConstantPoolReadWrite, ReadWrite};

pub mod annotation;
pub mod code;
pub mod module;
pub mod stack_map;

pub use annotation::*;
pub use code::{Code, ExceptionTableEntry};
pub use module::*;
pub use stack_map::{StackMapFrame, VerificationType};

#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    /// Utf8 index of the attribute's name.
    pub name_index: u16,
    pub info: AttributeInfo,
}

/// The payload of an attribute, one variant per attribute name.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeInfo {
    /// Index of the constant value.
    ConstantValue(u16),
    Code(Code),
    StackMapTable(Vec<StackMapFrame>),
    /// Class indices of the checked exceptions.
    Exceptions(Vec<u16>),
    InnerClasses(Vec<InnerClass>),
    EnclosingMethod(EnclosingMethod),
    Synthetic,
    /// Utf8 index of the signature.
    Signature(u16),
    /// Utf8 index of the source file name.
    SourceFile(u16),
    /// Raw modified UTF-8, not length prefixed.
    SourceDebugExtension(Vec<u8>),
    LineNumberTable(Vec<LineNumber>),
    LocalVariableTable(Vec<LocalVariable>),
    /// Same layout as `LocalVariableTable`, with signature indices in place of descriptor indices.
    LocalVariableTypeTable(Vec<LocalVariable>),
    Deprecated,
    RuntimeVisibleAnnotations(Vec<Annotation>),
    RuntimeInvisibleAnnotations(Vec<Annotation>),
    RuntimeVisibleParameterAnnotations(Vec<ParameterAnnotations>),
    RuntimeInvisibleParameterAnnotations(Vec<ParameterAnnotations>),
    RuntimeVisibleTypeAnnotations(Vec<TypeAnnotation>),
    RuntimeInvisibleTypeAnnotations(Vec<TypeAnnotation>),
    AnnotationDefault(ElementValue),
    BootstrapMethods(Vec<BootstrapMethod>),
    MethodParameters(Vec<MethodParameter>),
    Module(Module),
    /// Package indices.
    ModulePackages(Vec<u16>),
    /// Class index.
    ModuleMainClass(u16),
    /// Class index.
    NestHost(u16),
    NestMembers(Vec<u16>),
    Record(Vec<RecordComponent>),
    PermittedSubclasses(Vec<u16>),
    /// An attribute whose name is not recognized, with its raw payload.
    Unknown(Vec<u8>),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ReadWrite)]
pub struct LineNumber {
    pub start_pc: u16,
    pub line_number: u16,
}

/// An entry of a `LocalVariableTable` or `LocalVariableTypeTable`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ReadWrite)]
pub struct LocalVariable {
    pub start_pc: u16,
    pub length: u16,
    pub name_index: u16,
    /// A descriptor in a `LocalVariableTable`, a signature in a `LocalVariableTypeTable`.
    pub descriptor_index: u16,
    pub index: u16,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ReadWrite)]
pub struct InnerClass {
    pub inner_class_info_index: u16,
    /// 0 if the class is not a member.
    pub outer_class_info_index: u16,
    /// 0 if the class is anonymous.
    pub inner_name_index: u16,
    pub inner_class_access_flags: AccessFlags,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ReadWrite)]
pub struct EnclosingMethod {
    pub class_index: u16,
    /// NameAndType index, or 0 outside of a method.
    pub method_index: u16,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, ReadWrite)]
pub struct BootstrapMethod {
    /// MethodHandle index.
    pub method_ref: u16,
    /// Loadable constant indices.
    #[vec_len_type(u16)]
    pub arguments: Vec<u16>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ReadWrite)]
pub struct MethodParameter {
    /// Utf8 index, 0 for a parameter without a name.
    pub name_index: u16,
    pub access_flags: AccessFlags,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordComponent {
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<Attribute>,
}

impl ConstantPoolReadWrite for RecordComponent {
    fn read_from<C: ConstantPoolReader, R: Read>(cp: &C, reader: &mut R) -> Result<Self> {
        Ok(RecordComponent {
            name_index: u16::read_from(reader)?,
            descriptor_index: u16::read_from(reader)?,
            attributes: read_from!(cp, reader)?,
        })
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.name_index.write_to(writer)?;
        self.descriptor_index.write_to(writer)?;
        ConstantPoolReadWrite::write_to(&self.attributes, writer)
    }

    fn size(&self) -> usize {
        4 + ConstantPoolReadWrite::size(&self.attributes)
    }
}

impl AttributeInfo {
    /// The name this payload is written under, `None` for [`AttributeInfo::Unknown`].
    pub fn name(&self) -> Option<&'static str> {
        Some(match self {
            AttributeInfo::ConstantValue(_) => "ConstantValue",
            AttributeInfo::Code(_) => "Code",
            AttributeInfo::StackMapTable(_) => "StackMapTable",
            AttributeInfo::Exceptions(_) => "Exceptions",
            AttributeInfo::InnerClasses(_) => "InnerClasses",
            AttributeInfo::EnclosingMethod(_) => "EnclosingMethod",
            AttributeInfo::Synthetic => "Synthetic",
            AttributeInfo::Signature(_) => "Signature",
            AttributeInfo::SourceFile(_) => "SourceFile",
            AttributeInfo::SourceDebugExtension(_) => "SourceDebugExtension",
            AttributeInfo::LineNumberTable(_) => "LineNumberTable",
            AttributeInfo::LocalVariableTable(_) => "LocalVariableTable",
            AttributeInfo::LocalVariableTypeTable(_) => "LocalVariableTypeTable",
            AttributeInfo::Deprecated => "Deprecated",
            AttributeInfo::RuntimeVisibleAnnotations(_) => "RuntimeVisibleAnnotations",
            AttributeInfo::RuntimeInvisibleAnnotations(_) => "RuntimeInvisibleAnnotations",
            AttributeInfo::RuntimeVisibleParameterAnnotations(_) => "RuntimeVisibleParameterAnnotations",
            AttributeInfo::RuntimeInvisibleParameterAnnotations(_) => "RuntimeInvisibleParameterAnnotations",
            AttributeInfo::RuntimeVisibleTypeAnnotations(_) => "RuntimeVisibleTypeAnnotations",
            AttributeInfo::RuntimeInvisibleTypeAnnotations(_) => "RuntimeInvisibleTypeAnnotations",
            AttributeInfo::AnnotationDefault(_) => "AnnotationDefault",
            AttributeInfo::BootstrapMethods(_) => "BootstrapMethods",
            AttributeInfo::MethodParameters(_) => "MethodParameters",
            AttributeInfo::Module(_) => "Module",
            AttributeInfo::ModulePackages(_) => "ModulePackages",
            AttributeInfo::ModuleMainClass(_) => "ModuleMainClass",
            AttributeInfo::NestHost(_) => "NestHost",
            AttributeInfo::NestMembers(_) => "NestMembers",
            AttributeInfo::Record(_) => "Record",
            AttributeInfo::PermittedSubclasses(_) => "PermittedSubclasses",
            AttributeInfo::Unknown(_) => return None,
        })
    }

    /// Parses the payload of an attribute called `name`. Known attributes must use up the
    /// payload exactly.
    pub fn parse<C: ConstantPoolReader>(cp: &C, name: &str, payload: &[u8]) -> Result<AttributeInfo> {
        let mut r = payload;
        let reader = &mut r;
        let info = match name {
            "ConstantValue" => AttributeInfo::ConstantValue(u16::read_from(reader)?),
            "Code" => AttributeInfo::Code(read_from!(cp, reader)?),
            "StackMapTable" => AttributeInfo::StackMapTable(read_vec::<u16, _, _>(reader)?),
            "Exceptions" => AttributeInfo::Exceptions(read_vec::<u16, _, _>(reader)?),
            "InnerClasses" => AttributeInfo::InnerClasses(read_vec::<u16, _, _>(reader)?),
            "EnclosingMethod" => AttributeInfo::EnclosingMethod(EnclosingMethod::read_from(reader)?),
            "Synthetic" => AttributeInfo::Synthetic,
            "Signature" => AttributeInfo::Signature(u16::read_from(reader)?),
            "SourceFile" => AttributeInfo::SourceFile(u16::read_from(reader)?),
            "SourceDebugExtension" => AttributeInfo::SourceDebugExtension(read_bytes(reader, payload.len())?),
            "LineNumberTable" => AttributeInfo::LineNumberTable(read_vec::<u16, _, _>(reader)?),
            "LocalVariableTable" => AttributeInfo::LocalVariableTable(read_vec::<u16, _, _>(reader)?),
            "LocalVariableTypeTable" => AttributeInfo::LocalVariableTypeTable(read_vec::<u16, _, _>(reader)?),
            "Deprecated" => AttributeInfo::Deprecated,
            "RuntimeVisibleAnnotations" => AttributeInfo::RuntimeVisibleAnnotations(read_vec::<u16, _, _>(reader)?),
            "RuntimeInvisibleAnnotations" => {
                AttributeInfo::RuntimeInvisibleAnnotations(read_vec::<u16, _, _>(reader)?)
            }
            "RuntimeVisibleParameterAnnotations" => {
                AttributeInfo::RuntimeVisibleParameterAnnotations(read_vec::<u8, _, _>(reader)?)
            }
            "RuntimeInvisibleParameterAnnotations" => {
                AttributeInfo::RuntimeInvisibleParameterAnnotations(read_vec::<u8, _, _>(reader)?)
            }
            "RuntimeVisibleTypeAnnotations" => {
                AttributeInfo::RuntimeVisibleTypeAnnotations(read_vec::<u16, _, _>(reader)?)
            }
            "RuntimeInvisibleTypeAnnotations" => {
                AttributeInfo::RuntimeInvisibleTypeAnnotations(read_vec::<u16, _, _>(reader)?)
            }
            "AnnotationDefault" => AttributeInfo::AnnotationDefault(ElementValue::read_from(reader)?),
            "BootstrapMethods" => AttributeInfo::BootstrapMethods(read_vec::<u16, _, _>(reader)?),
            "MethodParameters" => AttributeInfo::MethodParameters(read_vec::<u8, _, _>(reader)?),
            "Module" => AttributeInfo::Module(Module::read_from(reader)?),
            "ModulePackages" => AttributeInfo::ModulePackages(read_vec::<u16, _, _>(reader)?),
            "ModuleMainClass" => AttributeInfo::ModuleMainClass(u16::read_from(reader)?),
            "NestHost" => AttributeInfo::NestHost(u16::read_from(reader)?),
            "NestMembers" => AttributeInfo::NestMembers(read_vec::<u16, _, _>(reader)?),
            "Record" => AttributeInfo::Record(read_from!(cp, reader)?),
            "PermittedSubclasses" => AttributeInfo::PermittedSubclasses(read_vec::<u16, _, _>(reader)?),
            _ => return Ok(AttributeInfo::Unknown(payload.to_vec())),
        };
        if !r.is_empty() {
            return Err(Error::AttributeLength {
                name: name.to_owned(),
                declared: payload.len() as u32,
                consumed: (payload.len() - r.len()) as u32,
            });
        }
        Ok(info)
    }

    /// Writes the payload, without name and length.
    pub fn write_payload<W: Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            AttributeInfo::ConstantValue(i)
            | AttributeInfo::Signature(i)
            | AttributeInfo::SourceFile(i)
            | AttributeInfo::ModuleMainClass(i)
            | AttributeInfo::NestHost(i) => i.write_to(writer),
            AttributeInfo::Code(code) => ConstantPoolReadWrite::write_to(code, writer),
            AttributeInfo::StackMapTable(frames) => write_vec::<u16, _, _>(frames, writer),
            AttributeInfo::Exceptions(v)
            | AttributeInfo::ModulePackages(v)
            | AttributeInfo::NestMembers(v)
            | AttributeInfo::PermittedSubclasses(v) => write_vec::<u16, _, _>(v, writer),
            AttributeInfo::InnerClasses(v) => write_vec::<u16, _, _>(v, writer),
            AttributeInfo::EnclosingMethod(e) => e.write_to(writer),
            AttributeInfo::Synthetic | AttributeInfo::Deprecated => Ok(()),
            AttributeInfo::SourceDebugExtension(bytes) | AttributeInfo::Unknown(bytes) => {
                writer.write_all(bytes)?;
                Ok(())
            }
            AttributeInfo::LineNumberTable(v) => write_vec::<u16, _, _>(v, writer),
            AttributeInfo::LocalVariableTable(v) | AttributeInfo::LocalVariableTypeTable(v) => {
                write_vec::<u16, _, _>(v, writer)
            }
            AttributeInfo::RuntimeVisibleAnnotations(v) | AttributeInfo::RuntimeInvisibleAnnotations(v) => {
                write_vec::<u16, _, _>(v, writer)
            }
            AttributeInfo::RuntimeVisibleParameterAnnotations(v)
            | AttributeInfo::RuntimeInvisibleParameterAnnotations(v) => write_vec::<u8, _, _>(v, writer),
            AttributeInfo::RuntimeVisibleTypeAnnotations(v) | AttributeInfo::RuntimeInvisibleTypeAnnotations(v) => {
                write_vec::<u16, _, _>(v, writer)
            }
            AttributeInfo::AnnotationDefault(v) => v.write_to(writer),
            AttributeInfo::BootstrapMethods(v) => write_vec::<u16, _, _>(v, writer),
            AttributeInfo::MethodParameters(v) => write_vec::<u8, _, _>(v, writer),
            AttributeInfo::Module(m) => m.write_to(writer),
            AttributeInfo::Record(v) => ConstantPoolReadWrite::write_to(v, writer),
        }
    }

    /// Size of the payload in bytes; this is the `attribute_length` written before it.
    pub fn payload_size(&self) -> usize {
        match self {
            AttributeInfo::ConstantValue(_)
            | AttributeInfo::Signature(_)
            | AttributeInfo::SourceFile(_)
            | AttributeInfo::ModuleMainClass(_)
            | AttributeInfo::NestHost(_) => 2,
            AttributeInfo::Code(code) => ConstantPoolReadWrite::size(code),
            AttributeInfo::StackMapTable(frames) => vec_size::<u16, _>(frames),
            AttributeInfo::Exceptions(v)
            | AttributeInfo::ModulePackages(v)
            | AttributeInfo::NestMembers(v)
            | AttributeInfo::PermittedSubclasses(v) => vec_size::<u16, _>(v),
            AttributeInfo::InnerClasses(v) => vec_size::<u16, _>(v),
            AttributeInfo::EnclosingMethod(_) => 4,
            AttributeInfo::Synthetic | AttributeInfo::Deprecated => 0,
            AttributeInfo::SourceDebugExtension(bytes) | AttributeInfo::Unknown(bytes) => bytes.len(),
            AttributeInfo::LineNumberTable(v) => vec_size::<u16, _>(v),
            AttributeInfo::LocalVariableTable(v) | AttributeInfo::LocalVariableTypeTable(v) => vec_size::<u16, _>(v),
            AttributeInfo::RuntimeVisibleAnnotations(v) | AttributeInfo::RuntimeInvisibleAnnotations(v) => {
                vec_size::<u16, _>(v)
            }
            AttributeInfo::RuntimeVisibleParameterAnnotations(v)
            | AttributeInfo::RuntimeInvisibleParameterAnnotations(v) => vec_size::<u8, _>(v),
            AttributeInfo::RuntimeVisibleTypeAnnotations(v) | AttributeInfo::RuntimeInvisibleTypeAnnotations(v) => {
                vec_size::<u16, _>(v)
            }
            AttributeInfo::AnnotationDefault(v) => v.size(),
            AttributeInfo::BootstrapMethods(v) => vec_size::<u16, _>(v),
            AttributeInfo::MethodParameters(v) => vec_size::<u8, _>(v),
            AttributeInfo::Module(m) => m.size(),
            AttributeInfo::Record(v) => ConstantPoolReadWrite::size(v),
        }
    }
}

impl Attribute {
    /// Creates an attribute, adding its name to the constant pool if needed.
    ///
    /// Unknown payloads have no name of their own; use a struct literal for those.
    pub fn new(cp: &mut ConstantPool, info: AttributeInfo) -> Result<Attribute> {
        let name = info
            .name()
            .ok_or_else(|| Error::Invalid("attribute", "an unknown attribute needs an explicit name".into()))?;
        Ok(Attribute {
            name_index: cp.intern_utf8(name)?,
            info,
        })
    }

    pub fn name<'a, C: ConstantPoolReader>(&self, cp: &'a C) -> Result<Cow<'a, str>> {
        cp.read_utf8(self.name_index)
    }

    /// The `attribute_length` of this attribute, derived from its current content.
    pub fn attribute_length(&self) -> Result<u32> {
        u32::try_from(self.info.payload_size()).map_err(|_| Error::ArithmeticOverflow)
    }
}

impl ConstantPoolReadWrite for Attribute {
    fn read_from<C: ConstantPoolReader, R: Read>(cp: &C, reader: &mut R) -> Result<Self> {
        let name_index = try_cp_read!(cp, reader, read_utf8)?;
        let len = u32::read_from(reader)?;
        let name = cp.read_utf8(name_index)?;
        let payload = read_bytes(reader, len as usize)?;
        trace!("attribute {} ({} bytes)", name, len);
        Ok(Attribute {
            name_index,
            info: AttributeInfo::parse(cp, &name, &payload)?,
        })
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.name_index.write_to(writer)?;
        write_len::<u32, W>(self.info.payload_size(), writer)?;
        self.info.write_payload(writer)
    }

    fn size(&self) -> usize {
        6 + self.info.payload_size()
    }
}
