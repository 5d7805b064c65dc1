use thiserror::Error;

/// Errors from RandHash program interpretation.
///
/// All of these mark the program (or the call) definitively invalid;
/// none are retryable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RandHashError {
    /// The instruction budget was exhausted mid-execution.
    #[error("program ran too long: {ops} operations")]
    TooLong {
        /// Instructions executed when the budget tripped.
        ops: u32,
    },
    /// A cycle completed under the minimum instruction count.
    #[error("program too short: {ops} operations, minimum {min}")]
    TooShort {
        /// Instructions the cycle executed.
        ops: u32,
        /// Required minimum.
        min: u32,
    },
    /// An instruction's opcode byte is not part of the instruction set.
    #[error("bad opcode in instruction {insn:#010x} at pc {pc}")]
    BadOpcode {
        /// The full instruction word.
        insn: u32,
        /// Program counter of the instruction.
        pc: usize,
    },
    /// An instruction referenced a register beyond the live stack.
    #[error("register {index} out of range (stack size {stack}) at pc {pc}")]
    BadRegister {
        /// The referenced register index.
        index: u32,
        /// Live stack size at the time of the reference.
        stack: usize,
        /// Program counter of the instruction.
        pc: usize,
    },
    /// Execution ran off the end of the program without an end instruction.
    #[error("program counter {pc} past end of program")]
    ProgramOverrun {
        /// The out-of-range program counter.
        pc: usize,
    },
    /// An end instruction had no open scope to close.
    #[error("end instruction with no open scope at pc {pc}")]
    ScopeUnderflow {
        /// Program counter of the end instruction.
        pc: usize,
    },
    /// A loop instruction declared zero iterations.
    #[error("loop with zero iterations at pc {pc}")]
    EmptyLoop {
        /// Program counter of the loop instruction.
        pc: usize,
    },
    /// A caller-supplied buffer had the wrong size.
    #[error("{what} buffer must be {expected} words, got {actual}")]
    BufferLength {
        /// Which buffer was wrong.
        what: &'static str,
        /// Required word count.
        expected: usize,
        /// Word count actually supplied.
        actual: usize,
    },
    /// The program contained no instructions.
    #[error("empty program")]
    EmptyProgram,
}
