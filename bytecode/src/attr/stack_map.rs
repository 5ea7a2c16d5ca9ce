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
//! `StackMapTable` frames.

use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::rw::{read_vec, vec_size, write_vec};
use crate::ReadWrite;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ReadWrite)]
#[tag_type(u8)]
pub enum VerificationType {
    Top,
    Integer,
    Float,
    Double,
    Long,
    Null,
    UninitializedThis,
    /// A class constant pool index.
    Object(u16),
    /// Offset of the `new` instruction that created the object.
    Uninitialized(u16),
}

/// One frame of a `StackMapTable`.
///
/// The compact and extended encodings are distinct variants so that a frame writes back in
/// the form it was read. Deltas of `Same` and `SameLocals1StackItem` must stay below 64.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum StackMapFrame {
    Same {
        offset_delta: u16,
    },
    SameLocals1StackItem {
        offset_delta: u16,
        stack: VerificationType,
    },
    SameLocals1StackItemExtended {
        offset_delta: u16,
        stack: VerificationType,
    },
    /// The last `chopped` (1 to 3) locals are absent.
    Chop {
        offset_delta: u16,
        chopped: u8,
    },
    SameExtended {
        offset_delta: u16,
    },
    /// One to three additional locals.
    Append {
        offset_delta: u16,
        locals: Vec<VerificationType>,
    },
    Full {
        offset_delta: u16,
        locals: Vec<VerificationType>,
        stack: Vec<VerificationType>,
    },
}

impl StackMapFrame {
    pub fn offset_delta(&self) -> u16 {
        match self {
            StackMapFrame::Same { offset_delta }
            | StackMapFrame::SameLocals1StackItem { offset_delta, .. }
            | StackMapFrame::SameLocals1StackItemExtended { offset_delta, .. }
            | StackMapFrame::Chop { offset_delta, .. }
            | StackMapFrame::SameExtended { offset_delta }
            | StackMapFrame::Append { offset_delta, .. }
            | StackMapFrame::Full { offset_delta, .. } => *offset_delta,
        }
    }

    /// Sets the delta, switching a compact frame to its extended form if the delta needs it.
    pub fn set_offset_delta(&mut self, delta: u16) {
        match self {
            StackMapFrame::Same { .. } if delta > 63 => {
                *self = StackMapFrame::SameExtended {
                    offset_delta: delta,
                }
            }
            StackMapFrame::SameLocals1StackItem { stack, .. } if delta > 63 => {
                *self = StackMapFrame::SameLocals1StackItemExtended {
                    offset_delta: delta,
                    stack: *stack,
                }
            }
            StackMapFrame::Same { offset_delta }
            | StackMapFrame::SameLocals1StackItem { offset_delta, .. }
            | StackMapFrame::SameLocals1StackItemExtended { offset_delta, .. }
            | StackMapFrame::Chop { offset_delta, .. }
            | StackMapFrame::SameExtended { offset_delta }
            | StackMapFrame::Append { offset_delta, .. }
            | StackMapFrame::Full { offset_delta, .. } => *offset_delta = delta,
        }
    }

    /// Every verification type in the frame, locals first.
    pub fn verification_types_mut(&mut self) -> impl Iterator<Item = &mut VerificationType> {
        let (locals, stack): (&mut [VerificationType], &mut [VerificationType]) = match self {
            StackMapFrame::SameLocals1StackItem { stack, .. }
            | StackMapFrame::SameLocals1StackItemExtended { stack, .. } => (&mut [], std::slice::from_mut(stack)),
            StackMapFrame::Append { locals, .. } => (locals.as_mut_slice(), &mut []),
            StackMapFrame::Full { locals, stack, .. } => (locals.as_mut_slice(), stack.as_mut_slice()),
            _ => (&mut [], &mut []),
        };
        locals.iter_mut().chain(stack.iter_mut())
    }
}

/// Absolute code offsets of a sequence of frames.
///
/// The first frame is at its delta, every later one at `previous + delta + 1`.
pub fn frame_offsets(frames: &[StackMapFrame]) -> Vec<u32> {
    let mut offsets = Vec::with_capacity(frames.len());
    let mut prev: Option<u32> = None;
    for f in frames {
        let at = match prev {
            None => f.offset_delta() as u32,
            Some(p) => p + f.offset_delta() as u32 + 1,
        };
        offsets.push(at);
        prev = Some(at);
    }
    offsets
}

impl ReadWrite for StackMapFrame {
    fn read_from<T: Read>(reader: &mut T) -> Result<Self> {
        let tag = u8::read_from(reader)?;
        Ok(match tag {
            0..=63 => StackMapFrame::Same {
                offset_delta: tag as u16,
            },
            64..=127 => StackMapFrame::SameLocals1StackItem {
                offset_delta: (tag - 64) as u16,
                stack: VerificationType::read_from(reader)?,
            },
            128..=246 => return Err(Error::Invalid("stack map frame type (reserved)", tag.to_string())),
            247 => StackMapFrame::SameLocals1StackItemExtended {
                offset_delta: u16::read_from(reader)?,
                stack: VerificationType::read_from(reader)?,
            },
            248..=250 => StackMapFrame::Chop {
                offset_delta: u16::read_from(reader)?,
                chopped: 251 - tag,
            },
            251 => StackMapFrame::SameExtended {
                offset_delta: u16::read_from(reader)?,
            },
            252..=254 => {
                let offset_delta = u16::read_from(reader)?;
                let mut locals = Vec::with_capacity((tag - 251) as usize);
                for _ in 251..tag {
                    locals.push(VerificationType::read_from(reader)?);
                }
                StackMapFrame::Append {
                    offset_delta,
                    locals,
                }
            }
            255 => StackMapFrame::Full {
                offset_delta: u16::read_from(reader)?,
                locals: read_vec::<u16, _, _>(reader)?,
                stack: read_vec::<u16, _, _>(reader)?,
            },
        })
    }

    fn write_to<T: Write>(&self, writer: &mut T) -> Result<()> {
        match self {
            StackMapFrame::Same {
                offset_delta: off @ 0..=63,
            } => (*off as u8).write_to(writer)?,
            StackMapFrame::SameLocals1StackItem {
                offset_delta: off @ 0..=63,
                stack,
            } => {
                (*off as u8 + 64).write_to(writer)?;
                stack.write_to(writer)?;
            }
            StackMapFrame::Same { offset_delta } | StackMapFrame::SameLocals1StackItem { offset_delta, .. } => {
                return Err(Error::Invalid("compact stack map frame delta", offset_delta.to_string()))
            }
            StackMapFrame::SameLocals1StackItemExtended { offset_delta, stack } => {
                247u8.write_to(writer)?;
                offset_delta.write_to(writer)?;
                stack.write_to(writer)?;
            }
            StackMapFrame::Chop {
                offset_delta,
                chopped: chopped @ 1..=3,
            } => {
                (251 - *chopped).write_to(writer)?;
                offset_delta.write_to(writer)?;
            }
            StackMapFrame::Chop { chopped, .. } => return Err(Error::Invalid("chopped locals", chopped.to_string())),
            StackMapFrame::SameExtended { offset_delta } => {
                251u8.write_to(writer)?;
                offset_delta.write_to(writer)?;
            }
            StackMapFrame::Append { offset_delta, locals } if (1..=3).contains(&locals.len()) => {
                (251 + locals.len() as u8).write_to(writer)?;
                offset_delta.write_to(writer)?;
                for local in locals {
                    local.write_to(writer)?;
                }
            }
            StackMapFrame::Append { locals, .. } => {
                return Err(Error::Invalid("appended locals", locals.len().to_string()))
            }
            StackMapFrame::Full {
                offset_delta,
                locals,
                stack,
            } => {
                255u8.write_to(writer)?;
                offset_delta.write_to(writer)?;
                write_vec::<u16, _, _>(locals, writer)?;
                write_vec::<u16, _, _>(stack, writer)?;
            }
        }
        Ok(())
    }

    fn size(&self) -> usize {
        match self {
            StackMapFrame::Same { .. } => 1,
            StackMapFrame::SameLocals1StackItem { stack, .. } => 1 + stack.size(),
            StackMapFrame::SameLocals1StackItemExtended { stack, .. } => 3 + stack.size(),
            StackMapFrame::Chop { .. } | StackMapFrame::SameExtended { .. } => 3,
            StackMapFrame::Append { locals, .. } => 3 + locals.iter().map(VerificationType::size).sum::<usize>(),
            StackMapFrame::Full { locals, stack, .. } => {
                3 + vec_size::<u16, _>(locals) + vec_size::<u16, _>(stack)
            }
        }
    }
}
