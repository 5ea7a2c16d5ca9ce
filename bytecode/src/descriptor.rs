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
//! Field and method descriptors (JVMS §4.3).
//!
//! Only used for rendering; the class file model itself keeps descriptors as constant pool
//! indices.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use nom::branch::alt;
use nom::bytes::complete::is_not;
use nom::character::complete::{char, one_of};
use nom::combinator::{all_consuming, map, value};
use nom::multi::{many0, many_m_n};
use nom::sequence::delimited;
use nom::{Finish, IResult};

use crate::error::Error;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum FieldType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    /// An internal class name, e.g. `java/lang/Object`.
    Object(String),
    Array(Box<FieldType>),
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MethodDescriptor {
    pub parameters: Vec<FieldType>,
    /// `None` for `void`.
    pub return_type: Option<FieldType>,
}

impl FieldType {
    /// Number of array dimensions, 0 for non-array types.
    pub fn dimensions(&self) -> usize {
        match self {
            FieldType::Array(t) => 1 + t.dimensions(),
            _ => 0,
        }
    }

    /// Local variable slots a value of this type takes.
    pub fn slots(&self) -> u16 {
        match self {
            FieldType::Long | FieldType::Double => 2,
            _ => 1,
        }
    }
}

/// JVMS §4.3.2: a field descriptor has at most 255 array dimensions.
pub const MAX_ARRAY_DIMENSIONS: usize = 255;

fn field_type(i: &str) -> IResult<&str, FieldType> {
    let (i, dims) = many_m_n(0, MAX_ARRAY_DIMENSIONS, char('['))(i)?;
    let (rest, mut t) = element_type(i)?;
    for _ in 0..dims.len() {
        t = FieldType::Array(Box::new(t));
    }
    Ok((rest, t))
}

fn element_type(i: &str) -> IResult<&str, FieldType> {
    let (rest, c) = one_of("BCDFIJSZL")(i)?;
    let t = match c {
        'B' => FieldType::Byte,
        'C' => FieldType::Char,
        'D' => FieldType::Double,
        'F' => FieldType::Float,
        'I' => FieldType::Int,
        'J' => FieldType::Long,
        'S' => FieldType::Short,
        'Z' => FieldType::Boolean,
        _ => return object_type(i),
    };
    Ok((rest, t))
}

fn object_type(i: &str) -> IResult<&str, FieldType> {
    map(delimited(char('L'), is_not(";"), char(';')), |name: &str| {
        FieldType::Object(name.to_owned())
    })(i)
}

fn return_type(i: &str) -> IResult<&str, Option<FieldType>> {
    alt((value(None, char('V')), map(field_type, Some)))(i)
}

fn method_descriptor(i: &str) -> IResult<&str, MethodDescriptor> {
    let (i, parameters) = delimited(char('('), many0(field_type), char(')'))(i)?;
    let (i, return_type) = return_type(i)?;
    Ok((
        i,
        MethodDescriptor {
            parameters,
            return_type,
        },
    ))
}

impl FromStr for FieldType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_consuming(field_type)(s)
            .finish()
            .map(|(_, t)| t)
            .map_err(|_| Error::Invalid("field descriptor", s.to_owned()))
    }
}

impl FromStr for MethodDescriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_consuming(method_descriptor)(s)
            .finish()
            .map(|(_, t)| t)
            .map_err(|_| Error::Invalid("method descriptor", s.to_owned()))
    }
}

/// Renders in Java source form: `int`, `java.lang.String`, `byte[][]`.
impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Byte => f.write_str("byte"),
            FieldType::Char => f.write_str("char"),
            FieldType::Double => f.write_str("double"),
            FieldType::Float => f.write_str("float"),
            FieldType::Int => f.write_str("int"),
            FieldType::Long => f.write_str("long"),
            FieldType::Short => f.write_str("short"),
            FieldType::Boolean => f.write_str("boolean"),
            FieldType::Object(name) => f.write_str(&name.replace('/', ".")),
            FieldType::Array(t) => write!(f, "{}[]", t),
        }
    }
}

/// Renders as `(int, java.lang.String)void`.
impl Display for MethodDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("(")?;
        for (n, p) in self.parameters.iter().enumerate() {
            if n != 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", p)?;
        }
        f.write_str(")")?;
        match &self.return_type {
            Some(t) => write!(f, "{}", t),
            None => f.write_str("void"),
        }
    }
}
