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

mod class;
mod constant_pool;
mod descriptor;

use lazy_static::lazy_static;

/// Big-endian byte assembler for hand-written class files.
#[derive(Clone, Debug, Default)]
pub(crate) struct Bytes(Vec<u8>);

impl Bytes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.0.push(v);
        self
    }

    pub fn u16(mut self, v: u16) -> Self {
        self.0.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.0.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.0.extend_from_slice(bytes);
        self
    }

    /// A `CONSTANT_Utf8` entry holding ASCII text.
    pub fn utf8(self, s: &str) -> Self {
        self.u8(1).u16(s.len() as u16).raw(s.as_bytes())
    }

    /// An attribute with the given name index and payload; the length is filled in.
    pub fn attr(self, name_index: u16, payload: Bytes) -> Self {
        let payload = payload.build();
        self.u16(name_index).u32(payload.len() as u32).raw(&payload)
    }

    pub fn build(self) -> Vec<u8> {
        self.0
    }
}

pub(crate) mod cp {
    pub const THIS_CLASS: u16 = 2;
    pub const SUPER_CLASS: u16 = 4;
    pub const CODE: u16 = 5;
    pub const LINE_NUMBER_TABLE: u16 = 6;
    pub const LOOP: u16 = 7;
    pub const LOOP_DESC: u16 = 8;
    pub const SOURCE_FILE: u16 = 9;
    pub const SOURCE_FILE_NAME: u16 = 10;
    pub const CUSTOM: u16 = 11;
    pub const LONG: u16 = 12;
    pub const STACK_MAP_TABLE: u16 = 14;
    pub const VALUE: u16 = 15;
    pub const VALUE_DESC: u16 = 16;
    pub const CONSTANT_VALUE: u16 = 17;
    pub const EXCEPTION: u16 = 19;
    pub const COUNT: u16 = 20;
}

/// Constant pool of the sample class.
pub(crate) fn sample_pool() -> Bytes {
    Bytes::new()
        .u16(cp::COUNT)
        .utf8("demo/Sample")
        .u8(7)
        .u16(1)
        .utf8("java/lang/Object")
        .u8(7)
        .u16(3)
        .utf8("Code")
        .utf8("LineNumberTable")
        .utf8("loop")
        .utf8("(I)I")
        .utf8("SourceFile")
        .utf8("Sample.java")
        .utf8("Custom")
        .u8(5)
        .raw(&1234i64.to_be_bytes())
        .utf8("StackMapTable")
        .utf8("value")
        .utf8("J")
        .utf8("ConstantValue")
        .utf8("java/lang/Exception")
        .u8(7)
        .u16(18)
}

/// Code array of `static int loop(int)`:
///
/// ```text
///  0: iload_0
///  1: ifeq 10
///  4: iinc 0, -1
///  7: goto 1
/// 10: iload_0
/// 11: ireturn
/// ```
pub(crate) const LOOP_CODE: [u8; 12] = [
    0x1A, 0x99, 0x00, 0x09, 0x84, 0x00, 0xFF, 0xA7, 0xFF, 0xFA, 0x1A, 0xAC,
];

pub(crate) fn loop_code_attribute() -> Bytes {
    Bytes::new()
        .u16(2)
        .u16(1)
        .u32(LOOP_CODE.len() as u32)
        .raw(&LOOP_CODE)
        .u16(2)
        .raw(&[0, 4, 0, 10, 0, 10])
        .u16(cp::EXCEPTION)
        .raw(&[0, 0, 0, 12, 0, 10, 0, 0])
        .u16(2)
        .attr(
            cp::LINE_NUMBER_TABLE,
            Bytes::new().u16(3).raw(&[0, 0, 0, 3, 0, 4, 0, 4, 0, 10, 0, 6]),
        )
        // same frames at 1 and 10
        .attr(cp::STACK_MAP_TABLE, Bytes::new().u16(2).u8(1).u8(8))
}

/// A small but complete class: one field with a constant value, one method with a loop, an
/// exception table, line numbers and a stack map, and an attribute nobody knows.
pub(crate) fn sample_class() -> Vec<u8> {
    Bytes::new()
        .u32(0xCAFEBABE)
        .u16(0)
        .u16(52)
        .raw(&sample_pool().build())
        .u16(0x0021)
        .u16(cp::THIS_CLASS)
        .u16(cp::SUPER_CLASS)
        .u16(0)
        // fields
        .u16(1)
        .u16(0x0018)
        .u16(cp::VALUE)
        .u16(cp::VALUE_DESC)
        .u16(1)
        .attr(cp::CONSTANT_VALUE, Bytes::new().u16(cp::LONG))
        // methods
        .u16(1)
        .u16(0x0008)
        .u16(cp::LOOP)
        .u16(cp::LOOP_DESC)
        .u16(1)
        .attr(cp::CODE, loop_code_attribute())
        // attributes
        .u16(2)
        .attr(cp::SOURCE_FILE, Bytes::new().u16(cp::SOURCE_FILE_NAME))
        .attr(cp::CUSTOM, Bytes::new().raw(&[1, 2, 3, 4, 5]))
        .build()
}

lazy_static! {
    pub(crate) static ref SAMPLE: Vec<u8> = sample_class();
}
