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
//! The `Module` attribute.
//!
//! A module is not a class, but it is still represented by a .class file: one with the
//! `ACC_MODULE` flag and a `Module` attribute.
//!
//! See [the JVM Spec](https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.7.25) for more details.

use crate::access::AccessFlags;

#[derive(Clone, Debug, Eq, PartialEq, Hash, ReadWrite)]
pub struct Module {
    /// Module constant index.
    pub name_index: u16,
    pub flags: AccessFlags,
    /// Utf8 index, or 0 when there is no version.
    pub version_index: u16,
    #[vec_len_type(u16)]
    pub requires: Vec<Require>,
    #[vec_len_type(u16)]
    pub exports: Vec<Export>,
    #[vec_len_type(u16)]
    pub opens: Vec<Open>,
    /// Class indices of the services used.
    #[vec_len_type(u16)]
    pub uses: Vec<u16>,
    #[vec_len_type(u16)]
    pub provides: Vec<Provide>,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, ReadWrite)]
pub struct Require {
    pub module_index: u16,
    pub flags: AccessFlags,
    pub version_index: u16,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, ReadWrite)]
pub struct Export {
    /// Package constant index.
    pub package_index: u16,
    pub flags: AccessFlags,
    /// Module indices; empty for an unqualified export.
    #[vec_len_type(u16)]
    pub to: Vec<u16>,
}

/// Same layout as [`Export`].
#[derive(Clone, Debug, Eq, PartialEq, Hash, ReadWrite)]
pub struct Open {
    pub package_index: u16,
    pub flags: AccessFlags,
    #[vec_len_type(u16)]
    pub to: Vec<u16>,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, ReadWrite)]
pub struct Provide {
    /// Class index of the service interface.
    pub service_index: u16,
    /// Class indices of the implementations.
    #[vec_len_type(u16)]
    pub with: Vec<u16>,
}
