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
//! Sequential big-endian reader and writer that count the bytes passing through them.
//!
//! Instructions need to know their position inside the code array to compute switch padding,
//! so the code array is always decoded from a [`ByteReader`] and encoded into a [`ByteWriter`].

use std::io::{Read, Write};

use crate::error::Result;
use crate::rw::{read_bytes, ReadWrite};

/// Wraps a reader and tracks how many bytes have been consumed from it.
#[derive(Debug)]
pub struct ByteReader<R> {
    inner: R,
    read: usize,
}

impl<R: Read> ByteReader<R> {
    pub fn new(inner: R) -> Self {
        ByteReader { inner, read: 0 }
    }

    /// Bytes consumed since this reader was created.
    #[inline]
    pub fn bytes_read(&self) -> usize {
        self.read
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        u8::read_from(self)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        i8::read_from(self)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        u16::read_from(self)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        i16::read_from(self)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        u32::read_from(self)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        i32::read_from(self)
    }

    /// Reads exactly `n` bytes.
    pub fn read_fully(&mut self, n: usize) -> Result<Vec<u8>> {
        read_bytes(self, n)
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for ByteReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.read += n;
        Ok(n)
    }
}

/// Wraps a writer and tracks how many bytes have been written to it.
#[derive(Debug)]
pub struct ByteWriter<W> {
    inner: W,
    written: usize,
}

impl<W: Write> ByteWriter<W> {
    pub fn new(inner: W) -> Self {
        ByteWriter { inner, written: 0 }
    }

    /// Bytes written since this writer was created.
    #[inline]
    pub fn bytes_written(&self) -> usize {
        self.written
    }

    pub fn write_u8(&mut self, v: u8) -> Result<()> {
        v.write_to(self)
    }

    pub fn write_i8(&mut self, v: i8) -> Result<()> {
        v.write_to(self)
    }

    pub fn write_u16(&mut self, v: u16) -> Result<()> {
        v.write_to(self)
    }

    pub fn write_i16(&mut self, v: i16) -> Result<()> {
        v.write_to(self)
    }

    pub fn write_u32(&mut self, v: u32) -> Result<()> {
        v.write_to(self)
    }

    pub fn write_i32(&mut self, v: i32) -> Result<()> {
        v.write_to(self)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_all(bytes)?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for ByteWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
