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
//! Lossless reading and writing of Java class files.
//!
//! A [`ClassFile`](class::ClassFile) is read into a model that keeps every constant pool
//! reference as its raw index and every unknown attribute as its raw bytes, so writing it back
//! reproduces the input byte for byte. Method bodies are decoded into
//! [`Instruction`](insn::Instruction)s, and [`insert`] splices new instructions into them while
//! keeping branches, exception ranges, line numbers, local variable ranges and stack map frames
//! pointing at the same instructions as before.
//!
//! ```no_run
//! use classweave::prelude::*;
//!
//! # fn main() -> classweave::Result<()> {
//! let mut class = ClassFile::open("Hello.class")?;
//! if let Some(code) = class.find_method_mut("main", "([Ljava/lang/String;)V").and_then(|m| m.code_mut()) {
//!     let insertion = CodeInsertion::new().with(Insertion::before(0, vec![Instruction::simple(Opcode::Nop)]));
//!     code.insert(&insertion)?;
//! }
//! class.save("Hello.class")?;
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate bitflags;

#[macro_use]
extern crate classweave_macros;

#[macro_use]
pub mod rw;

pub mod access;
pub mod attr;
pub mod class;
pub mod constant_pool;
pub mod descriptor;
pub mod error;
pub mod insert;
pub mod insn;
pub mod io;
pub mod member;
pub mod mod_utf8;
pub mod opcode;
pub mod prelude;
pub mod version;

#[cfg(test)]
mod tests;

pub use crate::constant_pool::ConstantPoolReader;
pub use crate::error::{Error, Result};
pub use crate::rw::{ConstantPoolReadWrite, ReadWrite};
