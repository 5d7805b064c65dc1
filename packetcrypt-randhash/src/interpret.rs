//! Recursive-descent execution of RandHash programs.
//!
//! A program is a flat array of instruction words with block structure:
//! `Loop` and the two `If` forms open a block that a matching `End`
//! closes. Blocks are executed by recursing into [`Machine::run_block`],
//! which records the stack depth on entry as a lexical scope; the block's
//! `End` folds every value the block produced into the output buffer at a
//! rotating cursor and truncates the stack back to the scope marker.
//!
//! Each cycle reads one half of the state buffer and folds into the
//! other, swapping halves between cycles so a cycle's output becomes the
//! next cycle's input.

use crate::{
    INOUT_WORDS, MAX_OPS, MEMORY_WORDS, MIN_OPS, RandHashError, decode, opcode::OpCode, ops,
};

struct Machine<'a> {
    prog: &'a [u32],
    memory: &'a [u32],
    /// The register file. Instructions address it by absolute index;
    /// every value-producing instruction pushes its results.
    stack: Vec<u32>,
    /// Stack lengths at each open block entry.
    scopes: Vec<usize>,
    hash_cursor: usize,
    op_count: u32,
    loop_cycle: u32,
}

impl Machine<'_> {
    fn reg(&self, index: u32, pc: usize) -> Result<u32, RandHashError> {
        self.stack
            .get(index as usize)
            .copied()
            .ok_or(RandHashError::BadRegister {
                index,
                stack: self.stack.len(),
                pc,
            })
    }

    /// A 64-bit value spans two consecutive registers, low word first.
    /// The index names the high word, so index 0 can never be valid.
    fn reg_pair(&self, index: u32, pc: usize) -> Result<u64, RandHashError> {
        if index == 0 {
            return Err(RandHashError::BadRegister {
                index,
                stack: self.stack.len(),
                pc,
            });
        }
        let lo = self.reg(index - 1, pc)? as u64;
        let hi = self.reg(index, pc)? as u64;
        Ok((hi << 32) | lo)
    }

    fn operand_a(&self, insn: u32, pc: usize) -> Result<u32, RandHashError> {
        self.reg(decode::reg_a(insn), pc)
    }

    fn operand_b(&self, insn: u32, pc: usize) -> Result<u32, RandHashError> {
        if decode::has_imm(insn) {
            Ok(decode::imm(insn) as u32)
        } else {
            self.reg(decode::reg_b(insn), pc)
        }
    }

    fn operand_a2(&self, insn: u32, pc: usize) -> Result<u64, RandHashError> {
        self.reg_pair(decode::reg_a(insn), pc)
    }

    fn operand_b2(&self, insn: u32, pc: usize) -> Result<u64, RandHashError> {
        if decode::has_imm(insn) {
            Ok(decode::imm(insn) as u64)
        } else {
            self.reg_pair(decode::reg_b(insn), pc)
        }
    }

    fn push2(&mut self, value: u64) {
        self.stack.push(value as u32);
        self.stack.push((value >> 32) as u32);
    }

    fn push4(&mut self, value: u128) {
        self.push2(value as u64);
        self.push2((value >> 64) as u64);
    }

    fn unary(&mut self, insn: u32, pc: usize, f: fn(u32) -> u32) -> Result<(), RandHashError> {
        let a = self.operand_a(insn, pc)?;
        self.stack.push(f(a));
        Ok(())
    }

    fn binary(&mut self, insn: u32, pc: usize, f: fn(u32, u32) -> u32) -> Result<(), RandHashError> {
        let a = self.operand_a(insn, pc)?;
        let b = self.operand_b(insn, pc)?;
        self.stack.push(f(a, b));
        Ok(())
    }

    fn binary_wide(
        &mut self,
        insn: u32,
        pc: usize,
        f: fn(u32, u32) -> u64,
    ) -> Result<(), RandHashError> {
        let a = self.operand_a(insn, pc)?;
        let b = self.operand_b(insn, pc)?;
        self.push2(f(a, b));
        Ok(())
    }

    fn binary64(&mut self, insn: u32, pc: usize, f: fn(u64, u64) -> u64) -> Result<(), RandHashError> {
        let a = self.operand_a2(insn, pc)?;
        let b = self.operand_b2(insn, pc)?;
        self.push2(f(a, b));
        Ok(())
    }

    fn binary64_wide(
        &mut self,
        insn: u32,
        pc: usize,
        f: fn(u64, u64) -> u128,
    ) -> Result<(), RandHashError> {
        let a = self.operand_a2(insn, pc)?;
        let b = self.operand_b2(insn, pc)?;
        self.push4(f(a, b));
        Ok(())
    }

    /// Execute one block starting at `pc`, returning the pc of the `End`
    /// instruction that closed it.
    fn run_block(
        &mut self,
        mut pc: usize,
        input: &[u32],
        output: &mut [u32],
    ) -> Result<usize, RandHashError> {
        self.scopes.push(self.stack.len());
        loop {
            let insn = *self
                .prog
                .get(pc)
                .ok_or(RandHashError::ProgramOverrun { pc })?;
            if self.op_count >= MAX_OPS {
                return Err(RandHashError::TooLong { ops: self.op_count });
            }
            self.op_count += 1;
            let op = OpCode::from_byte((insn & 0xff) as u8)
                .ok_or(RandHashError::BadOpcode { insn, pc })?;
            match op {
                OpCode::End => {
                    // Unreachable while blocks recurse, but kept as a check
                    // on the interpreter itself.
                    let marker = self
                        .scopes
                        .pop()
                        .ok_or(RandHashError::ScopeUnderflow { pc })?;
                    let mut cursor = self.hash_cursor;
                    for value in self.stack.drain(marker..).rev() {
                        output[cursor] = output[cursor].wrapping_add(value);
                        cursor = (cursor + 1) % INOUT_WORDS;
                    }
                    self.hash_cursor = cursor;
                    return Ok(pc);
                }
                OpCode::Loop => {
                    let count = decode::loop_count(insn);
                    if count == 0 {
                        return Err(RandHashError::EmptyLoop { pc });
                    }
                    let mut end_pc = pc;
                    for cycle in 0..count {
                        self.loop_cycle = cycle;
                        end_pc = self.run_block(pc + 1, input, output)?;
                    }
                    pc = end_pc;
                }
                OpCode::IfLikely | OpCode::IfRandom => {
                    let a = self.operand_a(insn, pc)?;
                    let taken = match op {
                        OpCode::IfLikely => a & 7 != 0,
                        _ => a & 1 != 0,
                    };
                    if taken {
                        // Run the branch body; the jmp at pc + 1 is the
                        // not-taken path and hops over the body's end.
                        pc = self.run_block(pc + 2, input, output)?;
                    }
                }
                OpCode::Jmp => {
                    pc += decode::jmp_count(insn) as usize;
                }
                OpCode::In => {
                    let index = decode::imm(insn) as u32 as usize % INOUT_WORDS;
                    self.stack.push(input[index]);
                }
                OpCode::Memory => {
                    let index = decode::memory_base(insn).wrapping_add(
                        self.loop_cycle
                            .wrapping_add(decode::memory_carry(insn))
                            .wrapping_mul(decode::memory_step(insn)),
                    ) as usize
                        % MEMORY_WORDS;
                    self.stack.push(self.memory[index]);
                }
                OpCode::Popcnt8 => self.unary(insn, pc, ops::popcnt8)?,
                OpCode::Popcnt16 => self.unary(insn, pc, ops::popcnt16)?,
                OpCode::Popcnt32 => self.unary(insn, pc, ops::popcnt32)?,
                OpCode::Clz8 => self.unary(insn, pc, ops::clz8)?,
                OpCode::Clz16 => self.unary(insn, pc, ops::clz16)?,
                OpCode::Clz32 => self.unary(insn, pc, ops::clz32)?,
                OpCode::Ctz8 => self.unary(insn, pc, ops::ctz8)?,
                OpCode::Ctz16 => self.unary(insn, pc, ops::ctz16)?,
                OpCode::Ctz32 => self.unary(insn, pc, ops::ctz32)?,
                OpCode::Bswap16 => self.unary(insn, pc, ops::bswap16)?,
                OpCode::Bswap32 => self.unary(insn, pc, ops::bswap32)?,
                OpCode::Add8 => self.binary(insn, pc, ops::add8)?,
                OpCode::Add16 => self.binary(insn, pc, ops::add16)?,
                OpCode::Add32 => self.binary(insn, pc, ops::add32)?,
                OpCode::Sub8 => self.binary(insn, pc, ops::sub8)?,
                OpCode::Sub16 => self.binary(insn, pc, ops::sub16)?,
                OpCode::Sub32 => self.binary(insn, pc, ops::sub32)?,
                OpCode::Shll8 => self.binary(insn, pc, ops::shll8)?,
                OpCode::Shll16 => self.binary(insn, pc, ops::shll16)?,
                OpCode::Shll32 => self.binary(insn, pc, ops::shll32)?,
                OpCode::Shrl8 => self.binary(insn, pc, ops::shrl8)?,
                OpCode::Shrl16 => self.binary(insn, pc, ops::shrl16)?,
                OpCode::Shrl32 => self.binary(insn, pc, ops::shrl32)?,
                OpCode::Shra8 => self.binary(insn, pc, ops::shra8)?,
                OpCode::Shra16 => self.binary(insn, pc, ops::shra16)?,
                OpCode::Shra32 => self.binary(insn, pc, ops::shra32)?,
                OpCode::Rotl8 => self.binary(insn, pc, ops::rotl8)?,
                OpCode::Rotl16 => self.binary(insn, pc, ops::rotl16)?,
                OpCode::Rotl32 => self.binary(insn, pc, ops::rotl32)?,
                OpCode::Mul8 => self.binary(insn, pc, ops::mul8)?,
                OpCode::Mul16 => self.binary(insn, pc, ops::mul16)?,
                OpCode::Mul32 => self.binary(insn, pc, ops::mul32)?,
                OpCode::And => self.binary(insn, pc, ops::and)?,
                OpCode::Or => self.binary(insn, pc, ops::or)?,
                OpCode::Xor => self.binary(insn, pc, ops::xor)?,
                OpCode::Add8C => self.binary_wide(insn, pc, ops::add8c)?,
                OpCode::Add16C => self.binary_wide(insn, pc, ops::add16c)?,
                OpCode::Add32C => self.binary_wide(insn, pc, ops::add32c)?,
                OpCode::Sub8C => self.binary_wide(insn, pc, ops::sub8c)?,
                OpCode::Sub16C => self.binary_wide(insn, pc, ops::sub16c)?,
                OpCode::Sub32C => self.binary_wide(insn, pc, ops::sub32c)?,
                OpCode::Mul8C => self.binary_wide(insn, pc, ops::mul8c)?,
                OpCode::Mul16C => self.binary_wide(insn, pc, ops::mul16c)?,
                OpCode::Mul32C => self.binary_wide(insn, pc, ops::mul32c)?,
                OpCode::Mulsu8C => self.binary_wide(insn, pc, ops::mulsu8c)?,
                OpCode::Mulsu16C => self.binary_wide(insn, pc, ops::mulsu16c)?,
                OpCode::Mulsu32C => self.binary_wide(insn, pc, ops::mulsu32c)?,
                OpCode::Mulu8C => self.binary_wide(insn, pc, ops::mulu8c)?,
                OpCode::Mulu16C => self.binary_wide(insn, pc, ops::mulu16c)?,
                OpCode::Mulu32C => self.binary_wide(insn, pc, ops::mulu32c)?,
                OpCode::Add64 => self.binary64(insn, pc, ops::add64)?,
                OpCode::Sub64 => self.binary64(insn, pc, ops::sub64)?,
                OpCode::Shll64 => self.binary64(insn, pc, ops::shll64)?,
                OpCode::Shrl64 => self.binary64(insn, pc, ops::shrl64)?,
                OpCode::Shra64 => self.binary64(insn, pc, ops::shra64)?,
                OpCode::Rotl64 => self.binary64(insn, pc, ops::rotl64)?,
                OpCode::Rotr64 => self.binary64(insn, pc, ops::rotr64)?,
                OpCode::Mul64 => self.binary64(insn, pc, ops::mul64)?,
                OpCode::Add64C => self.binary64_wide(insn, pc, ops::add64c)?,
                OpCode::Sub64C => self.binary64_wide(insn, pc, ops::sub64c)?,
                OpCode::Mul64C => self.binary64_wide(insn, pc, ops::mul64c)?,
                OpCode::Mulsu64C => self.binary64_wide(insn, pc, ops::mulsu64c)?,
                OpCode::Mulu64C => self.binary64_wide(insn, pc, ops::mulu64c)?,
            }
            pc += 1;
        }
    }
}

/// Run `prog` for `cycles` cycles against the caller's buffers.
///
/// `state` is the 512-word in/out buffer: the first 256 words feed the
/// first cycle as input while the block folds of that cycle accumulate
/// into the second 256, and the halves swap every cycle. `memory` is the
/// 256-word read-only item buffer `Memory` instructions index. Both are
/// mutated/read in place; identical inputs always produce identical
/// final states.
pub fn interpret(
    prog: &[u32],
    state: &mut [u32],
    memory: &[u32],
    cycles: u32,
) -> Result<(), RandHashError> {
    if prog.is_empty() {
        return Err(RandHashError::EmptyProgram);
    }
    if state.len() != 2 * INOUT_WORDS {
        return Err(RandHashError::BufferLength {
            what: "state",
            expected: 2 * INOUT_WORDS,
            actual: state.len(),
        });
    }
    if memory.len() != MEMORY_WORDS {
        return Err(RandHashError::BufferLength {
            what: "memory",
            expected: MEMORY_WORDS,
            actual: memory.len(),
        });
    }
    let mut machine = Machine {
        prog,
        memory,
        stack: Vec::with_capacity(64),
        scopes: Vec::with_capacity(8),
        hash_cursor: 0,
        op_count: 0,
        loop_cycle: 0,
    };
    for cycle in 0..cycles {
        machine.stack.clear();
        machine.scopes.clear();
        machine.hash_cursor = 0;
        machine.op_count = 0;
        machine.loop_cycle = 0;
        let (lo, hi) = state.split_at_mut(INOUT_WORDS);
        let (input, output) = if cycle % 2 == 0 { (&*lo, hi) } else { (&*hi, lo) };
        machine.run_block(0, input, output)?;
        if machine.op_count < MIN_OPS {
            return Err(RandHashError::TooShort {
                ops: machine.op_count,
                min: MIN_OPS,
            });
        }
    }
    Ok(())
}
