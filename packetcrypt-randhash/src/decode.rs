//! Instruction word field extraction.
//!
//! Every instruction is one 32-bit word. The low byte is the opcode; the
//! remaining fields overlap by opcode class:
//!
//! ```text
//! bits 0..8    opcode
//! bits 9..18   register A
//! bit  18      operand B is an immediate
//! bits 20..29  register B
//! bits 20..32  signed 12-bit immediate
//! bits 9..13   memory carry     (Memory only)
//! bits 13..17  memory step      (Memory only)
//! bits 17..32  memory base      (Memory only)
//! bits 20..32  iteration count  (Loop only)
//! bits 8..32   jump distance    (Jmp only)
//! ```

/// Register A index.
pub(crate) fn reg_a(insn: u32) -> u32 {
    (insn >> 9) & 0x1ff
}

/// Whether operand B is the immediate field instead of a register.
pub(crate) fn has_imm(insn: u32) -> bool {
    insn & (1 << 18) != 0
}

/// Register B index.
pub(crate) fn reg_b(insn: u32) -> u32 {
    (insn >> 20) & 0x1ff
}

/// The sign-extended 12-bit immediate.
pub(crate) fn imm(insn: u32) -> i64 {
    ((insn as i32) >> 20) as i64
}

/// Memory op carry added to the loop cycle.
pub(crate) fn memory_carry(insn: u32) -> u32 {
    (insn >> 9) & 15
}

/// Memory op per-cycle stride.
pub(crate) fn memory_step(insn: u32) -> u32 {
    (insn >> 13) & 15
}

/// Memory op base index.
pub(crate) fn memory_base(insn: u32) -> u32 {
    insn >> 17
}

/// Loop iteration count.
pub(crate) fn loop_count(insn: u32) -> u32 {
    insn >> 20
}

/// Jump distance from the jmp instruction to its target.
pub(crate) fn jmp_count(insn: u32) -> u32 {
    insn >> 8
}
