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
use pretty_assertions::assert_eq;

use super::{cp, sample_pool, Bytes};
use crate::constant_pool::{ConstantEntry, ConstantPool, ConstantPoolReader, Utf8};
use crate::{Error, ReadWrite};

fn pool(entries: Vec<ConstantEntry>) -> ConstantPool {
    let mut pool = ConstantPool::new();
    for e in entries {
        pool.push(e).unwrap();
    }
    pool
}

#[test]
fn wide_entries_take_two_slots() {
    let mut pool = ConstantPool::new();
    assert_eq!(pool.push(ConstantEntry::Integer(1)).unwrap(), 1);
    assert_eq!(pool.push(ConstantEntry::Double(2.5)).unwrap(), 2);
    assert_eq!(pool.push(ConstantEntry::Integer(3)).unwrap(), 4);
    assert_eq!(pool.count(), 5);
    assert!(pool.get(3).is_none());
    assert!(pool.get(0).is_none());
    assert!(matches!(
        pool.read_int(3),
        Err(Error::InvalidReference { index: 3, .. })
    ));
    assert_eq!(pool.read_double(2).unwrap(), 2.5);
    assert_eq!(pool.iter().map(|(i, _)| i).collect::<Vec<_>>(), [1, 2, 4]);
}

#[test]
fn intern_reuses_entries() {
    let mut pool = ConstantPool::new();
    let a = pool.intern_class("java/lang/Object").unwrap();
    let b = pool.intern_class("java/lang/Object").unwrap();
    assert_eq!(a, b);
    assert_eq!(pool.count(), 3);
    assert_eq!(pool.find(&ConstantEntry::Utf8(Utf8::from("java/lang/Object"))), Some(1));
    assert_eq!(pool.find(&ConstantEntry::Float(f32::NAN)), None);

    let nan = pool.push(ConstantEntry::Float(f32::NAN)).unwrap();
    assert_eq!(pool.intern(ConstantEntry::Float(f32::NAN)).unwrap(), nan);
}

#[test]
fn sample_pool_round_trip() {
    let bytes = sample_pool().build();
    let pool = ConstantPool::read_from(&mut bytes.as_slice()).unwrap();
    assert_eq!(pool.count(), cp::COUNT);
    assert_eq!(pool.size(), bytes.len());
    let mut out = Vec::new();
    pool.write_to(&mut out).unwrap();
    assert_eq!(out, bytes);
}

#[test]
fn malformed_pools() {
    let empty = [0u8, 0];
    assert!(matches!(ConstantPool::read_from(&mut &empty[..]), Err(Error::Invalid(..))));

    // a long in the last slot has nowhere to put its second half
    let long_last = Bytes::new().u16(2).u8(5).raw(&[0; 8]).build();
    assert!(matches!(ConstantPool::read_from(&mut long_last.as_slice()), Err(Error::Invalid(..))));

    let bad_tag = Bytes::new().u16(2).u8(2).build();
    assert!(ConstantPool::read_from(&mut bad_tag.as_slice()).is_err());
}

#[test]
fn utf8_keeps_its_bytes() {
    // a NUL written as two bytes, and a lone high surrogate
    let bytes = Bytes::new().u16(3).u8(1).u16(2).raw(&[0xC0, 0x80]).u8(1).u16(3).raw(&[0xED, 0xA0, 0x80]).build();
    let pool = ConstantPool::read_from(&mut bytes.as_slice()).unwrap();
    assert_eq!(pool.read_utf8(1).unwrap(), "\u{0}");
    assert!(matches!(pool.read_utf8(2), Err(Error::MUTF(_))));
    let mut out = Vec::new();
    pool.write_to(&mut out).unwrap();
    assert_eq!(out, bytes);
}

#[test]
fn typed_reads_check_the_kind() {
    let pool = pool(vec![
        ConstantEntry::Utf8("demo/Point".into()),
        ConstantEntry::Class(1),
        ConstantEntry::Utf8("x".into()),
        ConstantEntry::Utf8("I".into()),
        ConstantEntry::NameAndType(3, 4),
        ConstantEntry::FieldRef(2, 5),
        ConstantEntry::InterfaceMethodRef(2, 5),
    ]);
    assert_eq!(pool.read_class(2).unwrap(), "demo/Point");
    assert!(matches!(
        pool.read_class(1),
        Err(Error::InvalidReference {
            index: 1,
            expected: "Class"
        })
    ));
    assert!(matches!(pool.read_utf8(0), Err(Error::InvalidReference { index: 0, .. })));
    assert!(matches!(pool.read_utf8(99), Err(Error::InvalidReference { index: 99, .. })));

    let field = pool.read_member(6).unwrap();
    assert_eq!((&*field.owner, &*field.name, &*field.descriptor), ("demo/Point", "x", "I"));
    assert!(!field.interface);
    assert!(pool.read_member(7).unwrap().interface);
    assert_eq!(pool.read_entry(5).unwrap().kind(), "NameAndType");
}

#[test]
fn display_names() {
    let pool = pool(vec![
        ConstantEntry::Utf8("java/lang/String".into()), // 1
        ConstantEntry::Class(1),
        ConstantEntry::Utf8("[[I".into()),
        ConstantEntry::Class(3),
        ConstantEntry::Utf8("valueOf".into()), // 5
        ConstantEntry::Utf8("(I[Ljava/lang/Object;)Ljava/lang/String;".into()),
        ConstantEntry::NameAndType(5, 6),
        ConstantEntry::MethodRef(2, 7),
        ConstantEntry::MethodHandle(6, 8),
        ConstantEntry::String(5), // 10
        ConstantEntry::Long(-3),
        ConstantEntry::MethodType(6), // 13
        ConstantEntry::Utf8("count".into()),
        ConstantEntry::Utf8("J".into()),
        ConstantEntry::NameAndType(14, 15), // 16
        ConstantEntry::InvokeDynamic(0, 7),
        ConstantEntry::Utf8("java/util".into()),
        ConstantEntry::Package(18),
        ConstantEntry::MethodHandle(12, 8), // 20
    ]);
    let name = |i| pool.display_name(i).unwrap();
    assert_eq!(name(2), "java.lang.String");
    assert_eq!(name(4), "int[][]");
    assert_eq!(name(7), "valueOf(int, java.lang.Object[])java.lang.String");
    assert_eq!(name(8), "java.lang.String.valueOf");
    assert_eq!(name(9), "invokeStatic java.lang.String.valueOf");
    assert_eq!(name(10), "\"valueOf\"");
    assert_eq!(name(11), "-3L");
    assert_eq!(name(13), "(int, java.lang.Object[])java.lang.String");
    assert_eq!(name(16), "long count");
    assert_eq!(name(17), "#0:valueOf(int, java.lang.Object[])java.lang.String");
    assert_eq!(name(19), "java.util");
    assert!(matches!(pool.display_name(12), Err(Error::InvalidReference { index: 12, .. })));
    assert!(matches!(pool.display_name(20), Err(Error::Invalid("method handle kind", _))));
}

#[test]
fn deep_array_class_name_is_an_error() {
    let name = format!("{}I", "[".repeat(60_000));
    let pool = pool(vec![ConstantEntry::Utf8(name.as_str().into()), ConstantEntry::Class(1)]);
    assert!(matches!(pool.display_name(2), Err(Error::Invalid("field descriptor", _))));
}
