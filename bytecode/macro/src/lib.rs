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
//! Procedural macros for classweave.
//!
//! The generated code refers to `crate::ReadWrite` and `crate::error`,
//! so the derive is only usable from inside classweave itself.

extern crate proc_macro;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod derive;

/// Derives `ReadWrite` for structs and tagged enums.
///
/// - `#[tag_type(u8)]` on an enum selects the integer type of the leading tag.
/// - `#[tag(7)]` on a variant sets its tag; untagged variants take the previous tag plus one.
/// - `#[vec_len_type(u16)]` on a `Vec` field writes the element count before the elements.
#[proc_macro_derive(ReadWrite, attributes(tag_type, tag, vec_len_type))]
pub fn derive_readwrite(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    derive::derive_readwrite_inner(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
