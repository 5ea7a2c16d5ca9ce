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
//! Annotations, parameter annotations and type annotations (JVMS §4.7.16 to §4.7.22).
//!
//! Everything here is context free: names, types and constants are constant pool indices.

#[derive(Clone, Debug, Eq, PartialEq, Hash, ReadWrite)]
pub struct Annotation {
    /// Utf8 index of the annotation's field descriptor.
    pub type_index: u16,
    #[vec_len_type(u16)]
    pub element_value_pairs: Vec<ElementValuePair>,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, ReadWrite)]
pub struct ElementValuePair {
    pub name_index: u16,
    pub value: ElementValue,
}

/// An annotation element value, tagged by the character the class file uses.
#[derive(Clone, Debug, Eq, PartialEq, Hash, ReadWrite)]
#[tag_type(u8)]
pub enum ElementValue {
    /// Integer constant index.
    #[tag(b'B')]
    Byte(u16),
    #[tag(b'C')]
    Char(u16),
    /// Double constant index.
    #[tag(b'D')]
    Double(u16),
    #[tag(b'F')]
    Float(u16),
    #[tag(b'I')]
    Int(u16),
    /// Long constant index.
    #[tag(b'J')]
    Long(u16),
    #[tag(b'S')]
    Short(u16),
    #[tag(b'Z')]
    Boolean(u16),
    /// Utf8 index of the string itself.
    #[tag(b's')]
    String(u16),
    #[tag(b'e')]
    Enum {
        type_name_index: u16,
        const_name_index: u16,
    },
    /// Utf8 index of a return descriptor, `V` for `void.class`.
    #[tag(b'c')]
    Class(u16),
    #[tag(b'@')]
    Annotation(Annotation),
    #[tag(b'[')]
    Array(#[vec_len_type(u16)] Vec<ElementValue>),
}

/// The annotations of one formal parameter.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Default, ReadWrite)]
pub struct ParameterAnnotations {
    #[vec_len_type(u16)]
    pub annotations: Vec<Annotation>,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, ReadWrite)]
pub struct TypeAnnotation {
    pub target: TypeAnnotationTarget,
    pub target_path: TypePath,
    pub type_index: u16,
    #[vec_len_type(u16)]
    pub element_value_pairs: Vec<ElementValuePair>,
}

/// The `target_type` and `target_info` items of a type annotation.
///
/// Variants from `LocalVariable` on only appear in a `Code` attribute and hold code offsets.
#[derive(Clone, Debug, Eq, PartialEq, Hash, ReadWrite)]
#[tag_type(u8)]
pub enum TypeAnnotationTarget {
    #[tag(0x00)]
    ClassTypeParameter(u8),
    MethodTypeParameter(u8),
    /// `65535` for the `extends` clause, otherwise an index into `interfaces`.
    #[tag(0x10)]
    SuperType(u16),
    ClassTypeParameterBound {
        type_parameter_index: u8,
        bound_index: u8,
    },
    MethodTypeParameterBound {
        type_parameter_index: u8,
        bound_index: u8,
    },
    Field,
    MethodReturn,
    MethodReceiver,
    MethodFormalParameter(u8),
    /// Index into the `Exceptions` attribute.
    Throws(u16),
    #[tag(0x40)]
    LocalVariable(#[vec_len_type(u16)] Vec<LocalVariableTarget>),
    ResourceVariable(#[vec_len_type(u16)] Vec<LocalVariableTarget>),
    /// Index into the exception table.
    ExceptionParameter(u16),
    InstanceOf(u16),
    New(u16),
    ConstructorReference(u16),
    MethodReference(u16),
    Cast {
        offset: u16,
        type_argument_index: u8,
    },
    ConstructorInvocationTypeArgument {
        offset: u16,
        type_argument_index: u8,
    },
    MethodInvocationTypeArgument {
        offset: u16,
        type_argument_index: u8,
    },
    ConstructorReferenceTypeArgument {
        offset: u16,
        type_argument_index: u8,
    },
    MethodReferenceTypeArgument {
        offset: u16,
        type_argument_index: u8,
    },
}

impl TypeAnnotationTarget {
    /// The offset of the instruction this target annotates, for targets that name one.
    pub fn offset_mut(&mut self) -> Option<&mut u16> {
        use TypeAnnotationTarget::*;
        match self {
            InstanceOf(offset) | New(offset) | ConstructorReference(offset) | MethodReference(offset) => Some(offset),
            Cast { offset, .. }
            | ConstructorInvocationTypeArgument { offset, .. }
            | MethodInvocationTypeArgument { offset, .. }
            | ConstructorReferenceTypeArgument { offset, .. }
            | MethodReferenceTypeArgument { offset, .. } => Some(offset),
            _ => None,
        }
    }

    /// The live ranges of a local variable or resource variable target.
    pub fn ranges_mut(&mut self) -> Option<&mut [LocalVariableTarget]> {
        match self {
            TypeAnnotationTarget::LocalVariable(ranges) | TypeAnnotationTarget::ResourceVariable(ranges) => {
                Some(ranges.as_mut_slice())
            }
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ReadWrite)]
pub struct LocalVariableTarget {
    pub start_pc: u16,
    pub length: u16,
    pub index: u16,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Default, ReadWrite)]
pub struct TypePath {
    #[vec_len_type(u8)]
    pub path: Vec<TypePathEntry>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ReadWrite)]
pub struct TypePathEntry {
    /// 0: deeper in an array, 1: deeper in a nested type, 2: wildcard bound, 3: type argument.
    pub type_path_kind: u8,
    pub type_argument_index: u8,
}
