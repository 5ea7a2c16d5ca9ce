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
//! Splicing instructions into a code array.
//!
//! An insertion names a position in the *original* instruction sequence and carries
//! instructions to emit before (`pre`) and after (`post`) the instruction found there. All
//! requests of a [`CodeInsertion`] are applied in one pass, after which every offset that
//! pointed into the old code array is rewritten to point at the same instruction in the new
//! one.
//!
//! Each original instruction ends up with two positions in the new sequence: its *slot*, where
//! the instruction itself now lives, and its *target*, where references to it now go. The two
//! only differ when an insertion with `shift_target` set put pre-instructions in front of it;
//! jumps to it then land on the first of those instead. Branch sources always use the slot.
//!
//! ```
//! use classweave::insert::{CodeInsertion, Insertion};
//! use classweave::insn::{self, Instruction};
//! use classweave::opcode::Opcode;
//!
//! let mut method = vec![Instruction::simple(Opcode::Return)];
//! insn::layout(&mut method);
//!
//! let nops = vec![Instruction::simple(Opcode::Nop), Instruction::simple(Opcode::Nop)];
//! let insertion = CodeInsertion::new().with(Insertion::before(0, nops));
//! let (code, relocation) = insertion.relocate(&method).unwrap();
//!
//! assert_eq!(code.iter().map(|i| i.offset).collect::<Vec<_>>(), [0, 1, 2]);
//! assert_eq!(relocation.new_code_length(), 3);
//! ```

use log::{debug, trace};

use crate::attr::stack_map::frame_offsets;
use crate::attr::{AttributeInfo, Code, LocalVariable, StackMapFrame, TypeAnnotation, VerificationType};
use crate::error::{Error, Result};
use crate::insn::Instruction;

/// Instructions to splice in around one instruction of the original sequence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Insertion {
    /// Index into the original instruction sequence.
    pub position: usize,
    pub pre: Vec<Instruction>,
    pub post: Vec<Instruction>,
    /// When set, references to the instruction at `position` are redirected to the first
    /// pre-instruction, so jumps to it run the inserted code too.
    pub shift_target: bool,
}

impl Insertion {
    pub fn new(position: usize, pre: Vec<Instruction>, post: Vec<Instruction>, shift_target: bool) -> Self {
        Insertion {
            position,
            pre,
            post,
            shift_target,
        }
    }

    /// Code that runs every time the instruction at `position` is reached, including by a jump.
    pub fn before(position: usize, pre: Vec<Instruction>) -> Self {
        Self::new(position, pre, Vec::new(), true)
    }

    /// Code placed right after the instruction at `position`.
    pub fn after(position: usize, post: Vec<Instruction>) -> Self {
        Self::new(position, Vec::new(), post, false)
    }
}

/// What to do when two requests name the same original position.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum DuplicatePolicy {
    /// Fail with [`Error::DuplicateInsertion`].
    #[default]
    Reject,
    /// Apply the first request given for the position and drop the others.
    KeepFirst,
}

/// A batch of insertions applied to one code array.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CodeInsertion {
    insertions: Vec<Insertion>,
    policy: DuplicatePolicy,
}

/// How positions in a code array moved during an insertion.
///
/// Every table is indexed by original instruction index, with one extra entry at the end for the
/// end of the code array, so that exclusive end offsets can be mapped like any other pc.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Relocation {
    old_offsets: Vec<u32>,
    new_offsets: Vec<u32>,
    slots: Vec<usize>,
    targets: Vec<usize>,
}

impl Relocation {
    pub fn old_code_length(&self) -> u32 {
        self.old_offsets.last().copied().unwrap_or(0)
    }

    pub fn new_code_length(&self) -> u32 {
        self.new_offsets.last().copied().unwrap_or(0)
    }

    /// Number of bytes added to the code array.
    pub fn growth(&self) -> u32 {
        self.new_code_length() - self.old_code_length()
    }

    /// Index of the original instruction starting at `pc`. The code length maps to one past the
    /// last instruction.
    pub fn old_index_of(&self, pc: u32) -> Option<usize> {
        self.old_offsets.binary_search(&pc).ok()
    }

    /// New index of the original instruction at `index`.
    pub fn slot(&self, index: usize) -> Option<usize> {
        self.slots.get(index).copied()
    }

    /// New index that references to the original instruction at `index` now go to.
    pub fn target(&self, index: usize) -> Option<usize> {
        self.targets.get(index).copied()
    }

    /// New offset for a reference to the original pc, `None` if `pc` was not an instruction
    /// boundary.
    pub fn map_pc(&self, pc: u32) -> Option<u32> {
        let index = self.old_index_of(pc)?;
        Some(self.new_offsets[self.targets[index]])
    }

    /// New offset of the original instruction at `pc` itself.
    pub fn map_source(&self, pc: u32) -> Option<u32> {
        let index = self.old_index_of(pc)?;
        Some(self.new_offsets[self.slots[index]])
    }
}

/// Offsets of a sequence laid out from zero, followed by its total length.
fn running_offsets(insns: &[Instruction]) -> Vec<u32> {
    let mut offsets = Vec::with_capacity(insns.len() + 1);
    let mut at = 0;
    for insn in insns {
        offsets.push(at);
        at += insn.size_at(at);
    }
    offsets.push(at);
    offsets
}

fn narrow(pc: u32) -> Result<u16> {
    u16::try_from(pc).map_err(|_| Error::ArithmeticOverflow)
}

impl CodeInsertion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, insertion: Insertion) -> Self {
        self.insertions.push(insertion);
        self
    }

    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn push(&mut self, insertion: Insertion) {
        self.insertions.push(insertion);
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn insertions(&self) -> &[Insertion] {
        &self.insertions
    }

    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty()
    }

    /// The request that applies at each original index.
    fn plan(&self, len: usize) -> Result<Vec<Option<&Insertion>>> {
        let mut sorted: Vec<&Insertion> = self.insertions.iter().collect();
        sorted.sort_by_key(|i| i.position);
        let mut plan = vec![None; len];
        for insertion in sorted {
            let position = insertion.position;
            let entry = plan
                .get_mut(position)
                .ok_or(Error::InsertionOutOfRange { position, len })?;
            if entry.is_some() {
                match self.policy {
                    DuplicatePolicy::Reject => return Err(Error::DuplicateInsertion(position)),
                    DuplicatePolicy::KeepFirst => {
                        debug!("dropping duplicate insertion at instruction {}", position);
                        continue;
                    }
                }
            }
            *entry = Some(insertion);
        }
        Ok(plan)
    }

    /// Builds the new instruction sequence with every branch of the original sequence
    /// repointed, and the new offsets written onto the instructions.
    ///
    /// Offsets of `original` are recomputed from its contents rather than taken from the
    /// instructions. Inserted instructions are emitted as given.
    pub fn relocate(&self, original: &[Instruction]) -> Result<(Vec<Instruction>, Relocation)> {
        let plan = self.plan(original.len())?;
        let old_offsets = running_offsets(original);

        let added: usize = plan.iter().flatten().map(|i| i.pre.len() + i.post.len()).sum();
        let mut code = Vec::with_capacity(original.len() + added);
        let mut slots = Vec::with_capacity(original.len() + 1);
        let mut targets = Vec::with_capacity(original.len() + 1);
        for (insn, insertion) in original.iter().zip(&plan) {
            match insertion {
                Some(insertion) => {
                    let first = code.len();
                    code.extend(insertion.pre.iter().cloned());
                    let slot = code.len();
                    code.push(insn.clone());
                    code.extend(insertion.post.iter().cloned());
                    slots.push(slot);
                    targets.push(if insertion.shift_target { first } else { slot });
                }
                None => {
                    slots.push(code.len());
                    targets.push(code.len());
                    code.push(insn.clone());
                }
            }
        }
        slots.push(code.len());
        targets.push(code.len());

        let new_offsets = running_offsets(&code);
        for (insn, offset) in code.iter_mut().zip(&new_offsets) {
            insn.offset = *offset;
        }

        let instructions = &old_offsets[..original.len()];
        for (index, insn) in original.iter().enumerate() {
            if !insn.is_branch() {
                continue;
            }
            let at = old_offsets[index];
            let from = new_offsets[slots[index]];
            let mut relocated = Vec::new();
            for offset in insn.branch_offsets() {
                let target = at as i64 + offset as i64;
                let found = u32::try_from(target)
                    .ok()
                    .and_then(|t| instructions.binary_search(&t).ok())
                    .ok_or(Error::InvalidTarget { at, target })?;
                relocated.push(new_offsets[targets[found]] as i64 - from as i64);
            }
            trace!(
                "{} at {} -> {}: {:?} -> {:?}",
                insn.opcode,
                at,
                from,
                insn.branch_offsets(),
                relocated
            );
            code[slots[index]].set_branch_offsets(&relocated)?;
        }

        let relocation = Relocation {
            old_offsets,
            new_offsets,
            slots,
            targets,
        };
        debug!(
            "{} instructions ({} bytes) -> {} instructions ({} bytes)",
            original.len(),
            relocation.old_code_length(),
            code.len(),
            relocation.new_code_length()
        );
        Ok((code, relocation))
    }

    /// Applies the insertions to a method body and repairs its exception table, line numbers,
    /// local variable ranges, type annotation offsets and stack map frames. `code` is left untouched on error.
    pub fn apply(&self, code: &mut Code) -> Result<Relocation> {
        debug!("applying {} insertion(s)", self.insertions.len());
        let (instructions, relocation) = self.relocate(&code.code)?;

        let mut exception_table = code.exception_table.clone();
        for entry in &mut exception_table {
            let map = |pc: u16| {
                relocation
                    .map_pc(pc as u32)
                    .ok_or(Error::InvalidException(pc as u32))
                    .and_then(narrow)
            };
            entry.start_pc = map(entry.start_pc)?;
            entry.end_pc = map(entry.end_pc)?;
            entry.handler_pc = map(entry.handler_pc)?;
        }

        let mut attributes = code.attributes.clone();
        for attribute in &mut attributes {
            match &mut attribute.info {
                AttributeInfo::LineNumberTable(lines) => {
                    for line in lines {
                        let pc = line.start_pc as u32;
                        line.start_pc = narrow(relocation.map_pc(pc).ok_or(Error::InvalidLineNumber(pc))?)?;
                    }
                }
                AttributeInfo::LocalVariableTable(vars) | AttributeInfo::LocalVariableTypeTable(vars) => {
                    for var in vars {
                        relocate_local(&relocation, var)?;
                    }
                }
                AttributeInfo::StackMapTable(frames) => relocate_frames(&relocation, frames)?,
                AttributeInfo::RuntimeVisibleTypeAnnotations(annotations)
                | AttributeInfo::RuntimeInvisibleTypeAnnotations(annotations) => {
                    for annotation in annotations {
                        relocate_type_annotation(&relocation, annotation)?;
                    }
                }
                _ => {}
            }
        }

        code.code = instructions;
        code.exception_table = exception_table;
        code.attributes = attributes;
        Ok(relocation)
    }
}

/// Maps a `start..start + length` range, returning the new start and length.
fn relocate_range(relocation: &Relocation, start: u16, length: u16, err: fn(u32) -> Error) -> Result<(u16, u16)> {
    let start = start as u32;
    let end = start + length as u32;
    let new_start = relocation.map_pc(start).ok_or_else(|| err(start))?;
    let new_end = relocation.map_pc(end).ok_or_else(|| err(end))?;
    Ok((narrow(new_start)?, narrow(new_end - new_start)?))
}

fn relocate_local(relocation: &Relocation, var: &mut LocalVariable) -> Result<()> {
    let (start_pc, length) = relocate_range(relocation, var.start_pc, var.length, Error::InvalidLocalVariable)?;
    var.start_pc = start_pc;
    var.length = length;
    Ok(())
}

/// Instruction offsets follow the instruction itself, variable ranges follow their targets.
fn relocate_type_annotation(relocation: &Relocation, annotation: &mut TypeAnnotation) -> Result<()> {
    if let Some(offset) = annotation.target.offset_mut() {
        let pc = *offset as u32;
        *offset = narrow(relocation.map_source(pc).ok_or(Error::InvalidTypeAnnotation(pc))?)?;
    }
    if let Some(ranges) = annotation.target.ranges_mut() {
        for range in ranges {
            let (start_pc, length) =
                relocate_range(relocation, range.start_pc, range.length, Error::InvalidTypeAnnotation)?;
            range.start_pc = start_pc;
            range.length = length;
        }
    }
    Ok(())
}

fn relocate_frames(relocation: &Relocation, frames: &mut [StackMapFrame]) -> Result<()> {
    let offsets = frame_offsets(frames);
    let mut previous: Option<u32> = None;
    for (frame, pc) in frames.iter_mut().zip(offsets) {
        let at = relocation.map_pc(pc).ok_or(Error::InvalidStackMapFrame(pc))?;
        let delta = match previous {
            None => at,
            Some(p) => at - p - 1,
        };
        frame.set_offset_delta(narrow(delta)?);
        for ty in frame.verification_types_mut() {
            if let VerificationType::Uninitialized(new_at) = ty {
                let pc = *new_at as u32;
                *new_at = narrow(relocation.map_source(pc).ok_or(Error::InvalidStackMapFrame(pc))?)?;
            }
        }
        previous = Some(at);
    }
    Ok(())
}
