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
use std::io::ErrorKind;

use pretty_assertions::assert_eq;

use super::{cp, loop_code_attribute, sample_pool, Bytes, SAMPLE};
use crate::access::AccessFlags;
use crate::attr::{
    Annotation, Attribute, AttributeInfo, BootstrapMethod, ElementValue, ElementValuePair, Export, ExceptionTableEntry,
    InnerClass, LineNumber, LocalVariableTarget, MethodParameter, Module, Open, ParameterAnnotations, Provide,
    RecordComponent, Require, StackMapFrame, TypeAnnotation, TypeAnnotationTarget, TypePath, TypePathEntry,
};
use crate::class::ClassFile;
use crate::constant_pool::ConstantPoolReader;
use crate::insert::{CodeInsertion, Insertion};
use crate::insn::{Instruction, Operand};
use crate::opcode::Opcode;
use crate::version::ClassVersion;
use crate::{ConstantPoolReadWrite, Error};

fn class_with_attribute(name_index: u16, payload: Bytes) -> Vec<u8> {
    Bytes::new()
        .u32(0xCAFEBABE)
        .u16(0)
        .u16(52)
        .raw(&sample_pool().build())
        .u16(0x0021)
        .u16(cp::THIS_CLASS)
        .u16(cp::SUPER_CLASS)
        .u16(0)
        .u16(0)
        .u16(0)
        .u16(1)
        .attr(name_index, payload)
        .build()
}

fn every_attribute(class: &ClassFile) -> Vec<&Attribute> {
    let mut all: Vec<&Attribute> = class.attributes.iter().collect();
    for member in class.fields.iter().chain(&class.methods) {
        for attr in &member.attributes {
            all.push(attr);
            if let AttributeInfo::Code(code) = &attr.info {
                all.extend(&code.attributes);
            }
        }
    }
    all
}

#[test]
fn sample_round_trip() {
    let class = ClassFile::from_bytes(&SAMPLE).unwrap();
    assert_eq!(class.to_bytes().unwrap(), *SAMPLE);
}

#[test]
fn sample_structure() {
    let class = ClassFile::from_bytes(&SAMPLE).unwrap();
    assert_eq!(class.version, ClassVersion::J8);
    assert_eq!(class.this_class_name().unwrap(), "demo/Sample");
    assert_eq!(class.super_class_name().unwrap().unwrap(), "java/lang/Object");
    assert_eq!(class.constant_pool.count(), cp::COUNT);

    let field = class.find_field("value", "J").unwrap();
    assert_eq!(field.attributes[0].info, AttributeInfo::ConstantValue(cp::LONG));
    assert_eq!(class.constant_pool.read_long(cp::LONG).unwrap(), 1234);

    let method = class.find_method("loop", "(I)I").unwrap();
    assert!(class.find_method("loop", "()V").is_none());
    let code = method.code().unwrap();
    assert_eq!(code.max_stack, 2);
    assert_eq!(code.code_length(), 12);
    assert_eq!(
        code.code.iter().map(|i| (i.offset, i.opcode)).collect::<Vec<_>>(),
        [
            (0, Opcode::ILoad0),
            (1, Opcode::IfEq),
            (4, Opcode::IInc),
            (7, Opcode::Goto),
            (10, Opcode::ILoad0),
            (11, Opcode::IReturn)
        ]
    );
    assert_eq!(code.code[1].branch_targets(), [10]);
    assert_eq!(code.code[3].branch_targets(), [1]);
    assert_eq!(
        code.exception_table,
        [
            ExceptionTableEntry {
                start_pc: 4,
                end_pc: 10,
                handler_pc: 10,
                catch_type: cp::EXCEPTION
            },
            ExceptionTableEntry {
                start_pc: 0,
                end_pc: 12,
                handler_pc: 10,
                catch_type: 0
            }
        ]
    );
    assert_eq!(
        code.stack_map().unwrap(),
        [
            StackMapFrame::Same { offset_delta: 1 },
            StackMapFrame::Same { offset_delta: 8 }
        ]
    );

    assert_eq!(class.attributes[0].name(&class.constant_pool).unwrap(), "SourceFile");
    assert_eq!(class.attributes[1].info, AttributeInfo::Unknown(vec![1, 2, 3, 4, 5]));
    assert_eq!(class.attributes[1].info.name(), None);
}

#[test]
fn attribute_lengths_match_encoding() {
    let class = ClassFile::from_bytes(&SAMPLE).unwrap();
    for attr in every_attribute(&class) {
        let mut out = Vec::new();
        ConstantPoolReadWrite::write_to(attr, &mut out).unwrap();
        assert_eq!(out.len(), 6 + attr.attribute_length().unwrap() as usize);
        assert_eq!(out.len(), ConstantPoolReadWrite::size(attr));
    }
}

#[test]
fn code_attribute_length_follows_edits() {
    let mut class = ClassFile::from_bytes(&SAMPLE).unwrap();
    let code_attr = &mut class.methods[0].attributes[0];
    let before = code_attr.attribute_length().unwrap();
    if let AttributeInfo::Code(code) = &mut code_attr.info {
        code.code.insert(0, Instruction::simple(Opcode::Nop));
    }
    assert_eq!(code_attr.attribute_length().unwrap(), before + 1);
}

#[test]
fn bad_magic() {
    let mut bytes = SAMPLE.clone();
    bytes[3] = 0xBF;
    assert!(matches!(ClassFile::from_bytes(&bytes), Err(Error::BadMagic(0xCAFEBABF))));
}

#[test]
fn truncated_input() {
    let bytes = &SAMPLE[..SAMPLE.len() - 3];
    match ClassFile::from_bytes(bytes) {
        Err(Error::IO(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
        other => panic!("expected end of stream, got {:?}", other),
    }
}

#[test]
fn trailing_bytes() {
    let mut bytes = SAMPLE.clone();
    bytes.push(0);
    assert!(matches!(ClassFile::from_bytes(&bytes), Err(Error::Invalid(..))));
}

#[test]
fn attribute_with_leftover_bytes() {
    let bytes = class_with_attribute(cp::SOURCE_FILE, Bytes::new().u16(cp::SOURCE_FILE_NAME).u8(0));
    match ClassFile::from_bytes(&bytes) {
        Err(Error::AttributeLength {
            name,
            declared,
            consumed,
        }) => {
            assert_eq!(name, "SourceFile");
            assert_eq!((declared, consumed), (3, 2));
        }
        other => panic!("expected a length mismatch, got {:?}", other),
    }
}

#[test]
fn attribute_shorter_than_its_contents() {
    // a line number table claiming two entries but carrying one
    let payload = Bytes::new().u16(2).raw(&[0, 0, 0, 1]);
    let bytes = class_with_attribute(cp::LINE_NUMBER_TABLE, payload);
    match ClassFile::from_bytes(&bytes) {
        Err(Error::IO(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
        other => panic!("expected end of stream, got {:?}", other),
    }
}

#[test]
fn attribute_name_must_be_utf8() {
    let bytes = class_with_attribute(cp::THIS_CLASS, Bytes::new());
    assert!(matches!(
        ClassFile::from_bytes(&bytes),
        Err(Error::InvalidReference {
            index: cp::THIS_CLASS,
            ..
        })
    ));
}

#[test]
fn unknown_attribute_survives_any_content() {
    let payload = Bytes::new().raw(&[0xFF; 17]);
    let bytes = class_with_attribute(cp::CUSTOM, payload);
    let class = ClassFile::from_bytes(&bytes).unwrap();
    assert_eq!(class.attributes[0].info, AttributeInfo::Unknown(vec![0xFF; 17]));
    assert_eq!(class.to_bytes().unwrap(), bytes);
}

#[test]
fn known_attributes_round_trip() {
    let mut class = ClassFile::from_bytes(&SAMPLE).unwrap();
    let pool = &mut class.constant_pool;
    let infos = vec![
        AttributeInfo::Synthetic,
        AttributeInfo::Deprecated,
        AttributeInfo::Signature(cp::LOOP_DESC),
        AttributeInfo::SourceDebugExtension(b"SMAP\n".to_vec()),
        AttributeInfo::NestMembers(vec![cp::THIS_CLASS, cp::EXCEPTION]),
        AttributeInfo::PermittedSubclasses(vec![]),
        AttributeInfo::ModulePackages(vec![]),
        AttributeInfo::EnclosingMethod(crate::attr::EnclosingMethod {
            class_index: cp::SUPER_CLASS,
            method_index: 0,
        }),
    ];
    for info in infos {
        let attr = Attribute::new(pool, info).unwrap();
        class.attributes.push(attr);
    }
    let bytes = class.to_bytes().unwrap();
    let read = ClassFile::from_bytes(&bytes).unwrap();
    assert_eq!(read, class);
    assert_eq!(read.to_bytes().unwrap(), bytes);
}

fn annotation(type_index: u16, value: ElementValue) -> Annotation {
    Annotation {
        type_index,
        element_value_pairs: vec![ElementValuePair {
            name_index: cp::VALUE,
            value,
        }],
    }
}

fn type_annotation(target: TypeAnnotationTarget, path: Vec<TypePathEntry>) -> TypeAnnotation {
    TypeAnnotation {
        target,
        target_path: TypePath { path },
        type_index: cp::LOOP_DESC,
        element_value_pairs: vec![ElementValuePair {
            name_index: cp::VALUE,
            value: ElementValue::Int(cp::CONSTANT_VALUE),
        }],
    }
}

#[test]
fn nested_attributes_round_trip() {
    let mut class = ClassFile::from_bytes(&SAMPLE).unwrap();
    let pool = &mut class.constant_pool;

    let nested = ElementValue::Array(vec![
        ElementValue::String(cp::SOURCE_FILE_NAME),
        ElementValue::Enum {
            type_name_index: cp::LOOP_DESC,
            const_name_index: cp::LOOP,
        },
        ElementValue::Class(cp::VALUE_DESC),
        ElementValue::Annotation(annotation(cp::VALUE_DESC, ElementValue::Boolean(cp::CONSTANT_VALUE))),
        ElementValue::Array(vec![]),
    ]);
    let scalars = [
        ElementValue::Byte(1),
        ElementValue::Char(1),
        ElementValue::Double(cp::LONG),
        ElementValue::Float(1),
        ElementValue::Long(cp::LONG),
        ElementValue::Short(1),
    ];
    let type_annotations = vec![
        type_annotation(TypeAnnotationTarget::ClassTypeParameter(0), vec![]),
        type_annotation(TypeAnnotationTarget::SuperType(0xFFFF), vec![
            TypePathEntry {
                type_path_kind: 3,
                type_argument_index: 0,
            },
            TypePathEntry {
                type_path_kind: 0,
                type_argument_index: 0,
            },
        ]),
        type_annotation(
            TypeAnnotationTarget::ClassTypeParameterBound {
                type_parameter_index: 0,
                bound_index: 1,
            },
            vec![],
        ),
        type_annotation(TypeAnnotationTarget::Field, vec![]),
        type_annotation(TypeAnnotationTarget::Throws(0), vec![]),
        type_annotation(
            TypeAnnotationTarget::LocalVariable(vec![LocalVariableTarget {
                start_pc: 0,
                length: 4,
                index: 1,
            }]),
            vec![],
        ),
        type_annotation(TypeAnnotationTarget::ExceptionParameter(0), vec![]),
        type_annotation(
            TypeAnnotationTarget::MethodReferenceTypeArgument {
                offset: 2,
                type_argument_index: 1,
            },
            vec![TypePathEntry {
                type_path_kind: 2,
                type_argument_index: 0,
            }],
        ),
    ];
    let signature = Attribute::new(pool, AttributeInfo::Signature(cp::VALUE_DESC)).unwrap();
    let infos = vec![
        AttributeInfo::RuntimeVisibleAnnotations(vec![
            annotation(cp::LOOP_DESC, nested.clone()),
            annotation(cp::VALUE_DESC, ElementValue::Int(cp::CONSTANT_VALUE)),
        ]),
        AttributeInfo::RuntimeInvisibleAnnotations(
            scalars.iter().map(|v| annotation(cp::LOOP_DESC, v.clone())).collect(),
        ),
        AttributeInfo::RuntimeVisibleParameterAnnotations(vec![
            ParameterAnnotations::default(),
            ParameterAnnotations {
                annotations: vec![annotation(cp::LOOP_DESC, nested.clone())],
            },
        ]),
        AttributeInfo::RuntimeInvisibleParameterAnnotations(vec![ParameterAnnotations::default()]),
        AttributeInfo::RuntimeVisibleTypeAnnotations(type_annotations.clone()),
        AttributeInfo::RuntimeInvisibleTypeAnnotations(type_annotations[..2].to_vec()),
        AttributeInfo::AnnotationDefault(nested),
        AttributeInfo::BootstrapMethods(vec![
            BootstrapMethod {
                method_ref: cp::LOOP,
                arguments: vec![cp::SOURCE_FILE_NAME, cp::LONG],
            },
            BootstrapMethod {
                method_ref: cp::LOOP,
                arguments: vec![],
            },
        ]),
        AttributeInfo::InnerClasses(vec![InnerClass {
            inner_class_info_index: cp::EXCEPTION,
            outer_class_info_index: cp::THIS_CLASS,
            inner_name_index: cp::VALUE,
            inner_class_access_flags: AccessFlags::ACC_PUBLIC | AccessFlags::ACC_STATIC,
        }]),
        AttributeInfo::MethodParameters(vec![
            MethodParameter {
                name_index: cp::VALUE,
                access_flags: AccessFlags::ACC_FINAL,
            },
            MethodParameter {
                name_index: 0,
                access_flags: AccessFlags::ACC_MANDATED,
            },
        ]),
        AttributeInfo::Exceptions(vec![cp::EXCEPTION]),
        AttributeInfo::Record(vec![
            RecordComponent {
                name_index: cp::VALUE,
                descriptor_index: cp::VALUE_DESC,
                attributes: vec![signature],
            },
            RecordComponent {
                name_index: cp::LOOP,
                descriptor_index: cp::LOOP_DESC,
                attributes: vec![],
            },
        ]),
        AttributeInfo::Module(Module {
            name_index: cp::THIS_CLASS,
            flags: AccessFlags::ACC_OPEN,
            version_index: 0,
            requires: vec![Require {
                module_index: cp::SUPER_CLASS,
                flags: AccessFlags::ACC_MANDATED,
                version_index: cp::VALUE,
            }],
            exports: vec![Export {
                package_index: cp::EXCEPTION,
                flags: AccessFlags::empty(),
                to: vec![],
            }],
            opens: vec![Open {
                package_index: cp::EXCEPTION,
                flags: AccessFlags::ACC_SYNTHETIC,
                to: vec![cp::SUPER_CLASS, cp::THIS_CLASS],
            }],
            uses: vec![cp::EXCEPTION],
            provides: vec![Provide {
                service_index: cp::EXCEPTION,
                with: vec![cp::THIS_CLASS],
            }],
        }),
        AttributeInfo::ModuleMainClass(cp::THIS_CLASS),
        AttributeInfo::NestHost(cp::SUPER_CLASS),
    ];
    for info in infos {
        let attr = Attribute::new(pool, info).unwrap();
        class.attributes.push(attr);
    }

    let bytes = class.to_bytes().unwrap();
    let read = ClassFile::from_bytes(&bytes).unwrap();
    assert_eq!(read, class);
    assert_eq!(read.to_bytes().unwrap(), bytes);
    for attr in &read.attributes {
        let mut out = Vec::new();
        ConstantPoolReadWrite::write_to(attr, &mut out).unwrap();
        assert_eq!(out.len(), 6 + attr.attribute_length().unwrap() as usize);
        assert_eq!(out.len(), ConstantPoolReadWrite::size(attr));
    }
}

#[test]
fn element_value_tags_are_characters() {
    let value = ElementValue::Array(vec![ElementValue::String(7), ElementValue::Enum {
        type_name_index: 1,
        const_name_index: 2,
    }]);
    let mut out = Vec::new();
    crate::ReadWrite::write_to(&value, &mut out).unwrap();
    assert_eq!(out, [b'[', 0, 2, b's', 0, 7, b'e', 0, 1, 0, 2]);
    assert_eq!(crate::ReadWrite::size(&value), out.len());

    // local variable targets start at 0x40, right after throws at 0x17
    let target = TypeAnnotationTarget::LocalVariable(vec![]);
    let mut out = Vec::new();
    crate::ReadWrite::write_to(&target, &mut out).unwrap();
    assert_eq!(out, [0x40, 0, 0]);
    let cast: TypeAnnotationTarget = crate::read_from!(&mut &[0x47u8, 0, 9, 1][..]).unwrap();
    assert_eq!(cast, TypeAnnotationTarget::Cast {
        offset: 9,
        type_argument_index: 1,
    });
    let throws: TypeAnnotationTarget = crate::read_from!(&mut &[0x17u8, 0, 3][..]).unwrap();
    assert_eq!(throws, TypeAnnotationTarget::Throws(3));
}

#[test]
fn code_round_trip_after_insertion() {
    let mut class = ClassFile::from_bytes(&SAMPLE).unwrap();
    let code = class.find_method_mut("loop", "(I)I").unwrap().code_mut().unwrap();
    // keep jumps to the final load going to the load itself
    let insertion = CodeInsertion::new().with(Insertion::new(
        4,
        vec![Instruction::new(Opcode::SiPush, Operand::Short(500)), Instruction::simple(Opcode::Pop)],
        vec![],
        false,
    ));
    let relocation = code.insert(&insertion).unwrap();
    assert_eq!(relocation.growth(), 4);

    let bytes = class.to_bytes().unwrap();
    let read = ClassFile::from_bytes(&bytes).unwrap();
    let code = read.methods[0].code().unwrap();
    assert_eq!(code.code_length(), 16);
    assert_eq!(code.code[1].branch_targets(), [14]);
    assert_eq!(code.code[3].opcode, Opcode::Goto);
    assert_eq!(code.code[3].branch_targets(), [1]);
    assert_eq!(
        code.line_numbers().copied().collect::<Vec<_>>(),
        [
            LineNumber {
                start_pc: 0,
                line_number: 3
            },
            LineNumber {
                start_pc: 4,
                line_number: 4
            },
            LineNumber {
                start_pc: 14,
                line_number: 6
            }
        ]
    );
    assert_eq!(
        code.exception_table,
        [
            ExceptionTableEntry {
                start_pc: 4,
                end_pc: 14,
                handler_pc: 14,
                catch_type: cp::EXCEPTION
            },
            ExceptionTableEntry {
                start_pc: 0,
                end_pc: 16,
                handler_pc: 14,
                catch_type: 0
            }
        ]
    );
    assert_eq!(
        code.stack_map().unwrap(),
        [
            StackMapFrame::Same { offset_delta: 1 },
            StackMapFrame::Same { offset_delta: 12 }
        ]
    );
}

#[test]
fn file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Sample.class");
    let class = ClassFile::from_bytes(&SAMPLE).unwrap();
    class.save(&path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), *SAMPLE);
    assert_eq!(ClassFile::open(&path).unwrap(), class);
}

#[test]
fn code_attribute_on_its_own() {
    let class = ClassFile::from_bytes(&SAMPLE).unwrap();
    let payload = loop_code_attribute().build();
    let code: crate::attr::Code = crate::read_from!(&class.constant_pool, &mut payload.as_slice()).unwrap();
    let mut out = Vec::new();
    ConstantPoolReadWrite::write_to(&code, &mut out).unwrap();
    assert_eq!(out, payload);
}
