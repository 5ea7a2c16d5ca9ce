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

use std::convert::TryFrom;
use std::io::{Read, Write};

use crate::constant_pool::ConstantPoolReader;
use crate::error::{Error, Result};

/// Upper bound on how many elements are preallocated for a count read from the input.
///
/// Counts come straight from the file, so a corrupt count must not turn into a huge allocation
/// before the stream runs dry.
pub const PREALLOCATION_LIMIT: usize = 4096;

/// The generic read and write trait. This indicates a structure can be read without additional contextual information.
///
/// This trait can be derived with #[derive(ReadWrite)] if all the types it can hold are also `ReadWrite`.
/// Furthermore, all integer types implement `ReadWrite`.
pub trait ReadWrite
where
    Self: Sized,
{
    fn read_from<T: Read>(reader: &mut T) -> Result<Self>;
    fn write_to<T: Write>(&self, writer: &mut T) -> Result<()>;
    /// Number of bytes `write_to` produces for the current value.
    fn size(&self) -> usize;
}

/// The read and write trait for structures that need the constant pool to be read.
///
/// The constant pool is handed in as a plain borrowed reader; nothing keeps a pointer back
/// to it once reading is done. Writing never needs it because every reference is kept
/// as its raw index.
pub trait ConstantPoolReadWrite
where
    Self: Sized,
{
    fn read_from<C: ConstantPoolReader, R: Read>(cp: &C, reader: &mut R) -> Result<Self>;
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()>;
    fn size(&self) -> usize;
}

/// Helper macro to disambiguate if a type implements both [`ConstantPoolReadWrite`] and [`ReadWrite`].
///
/// [`ConstantPoolReadWrite`]: ConstantPoolReadWrite
/// [`ReadWrite`]: ReadWrite
#[macro_export]
macro_rules! read_from {
    ($reader: expr) => {
        $crate::ReadWrite::read_from($reader)
    };
    ($cp: expr, $reader: expr) => {
        $crate::ConstantPoolReadWrite::read_from($cp, $reader)
    };
}

/// Reads a `u16` index and resolves it through the given constant pool lookup,
/// returning the index itself once it is known to be valid.
#[macro_export]
macro_rules! try_cp_read {
    ($cp: ident, $reader: ident, $fn: ident) => {{
        let idx: u16 = $crate::ReadWrite::read_from($reader)?;
        $cp.$fn(idx).map(|_| idx)
    }};
}

macro_rules! impl_readwrite_nums {
    ($(($i:ty, $s:literal)),*) => {
        $(
            impl ReadWrite for $i {
                fn read_from<T: Read>(reader: &mut T) -> Result<Self> {
                    let mut bytes = [0u8; $s];
                    reader.read_exact(&mut bytes)?;
                    Ok(<$i>::from_be_bytes(bytes))
                }
                fn write_to<T: Write>(&self, writer: &mut T) -> Result<()> {
                    writer.write_all(&self.to_be_bytes())?;
                    Ok(())
                }
                #[inline]
                fn size(&self) -> usize {
                    $s
                }
            }
        )*
    };
}

impl_readwrite_nums! { (u8, 1),  (i8, 1),  (u16, 2),  (i16, 2),  (u32, 4),  (i32, 4),  (f32, 4),  (u64, 8),  (i64, 8),  (f64, 8) }

/// Attribute tables and the other context-dependent arrays of the format are all prefixed by a `u16` count.
impl<T: ConstantPoolReadWrite> ConstantPoolReadWrite for Vec<T> {
    fn read_from<C: ConstantPoolReader, R: Read>(cp: &C, reader: &mut R) -> Result<Self> {
        let len = u16::read_from(reader)? as usize;
        let mut vec = Vec::with_capacity(len.min(PREALLOCATION_LIMIT));
        for _ in 0..len {
            vec.push(T::read_from(cp, reader)?);
        }
        Ok(vec)
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_len::<u16, W>(self.len(), writer)?;
        for t in self {
            t.write_to(writer)?;
        }
        Ok(())
    }

    fn size(&self) -> usize {
        2 + self.iter().map(T::size).sum::<usize>()
    }
}

/// Writes an in-memory length as the count type `L`, failing if it does not fit.
pub(crate) fn write_len<L, W>(len: usize, writer: &mut W) -> Result<()>
where
    L: ReadWrite + TryFrom<usize>,
    W: Write,
{
    L::try_from(len)
        .map_err(|_| Error::ArithmeticOverflow)?
        .write_to(writer)
}

/// Reads exactly `len` bytes, without trusting `len` for the initial allocation.
pub(crate) fn read_bytes<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(len.min(PREALLOCATION_LIMIT));
    let got = Read::take(&mut *reader, len as u64).read_to_end(&mut buf)?;
    if got != len {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }
    Ok(buf)
}

/// Reads an array prefixed by a count of type `L`.
pub(crate) fn read_vec<L, T, R>(reader: &mut R) -> Result<Vec<T>>
where
    L: ReadWrite + Into<usize>,
    T: ReadWrite,
    R: Read,
{
    let len: usize = L::read_from(reader)?.into();
    let mut vec = Vec::with_capacity(len.min(PREALLOCATION_LIMIT));
    for _ in 0..len {
        vec.push(T::read_from(reader)?);
    }
    Ok(vec)
}

/// Writes an array prefixed by a count of type `L`.
pub(crate) fn write_vec<L, T, W>(items: &[T], writer: &mut W) -> Result<()>
where
    L: ReadWrite + TryFrom<usize>,
    T: ReadWrite,
    W: Write,
{
    write_len::<L, W>(items.len(), writer)?;
    for item in items {
        item.write_to(writer)?;
    }
    Ok(())
}

/// Encoded size of an array prefixed by a count of type `L`.
pub(crate) fn vec_size<L, T: ReadWrite>(items: &[T]) -> usize {
    std::mem::size_of::<L>() + items.iter().map(T::size).sum::<usize>()
}
