//! The RandHash instruction set.
//!
//! Opcode byte values are consensus-fixed: a program word's low byte must
//! decode to exactly one of these, and byte 0 is deliberately left
//! unassigned so an all-zero word is never a valid instruction.

/// One opcode of the RandHash instruction set.
///
/// Naming: a trailing width gives the lane size (`Add8` adds each of the
/// four byte lanes of a 32-bit word independently), `C` marks the
/// widening variants that produce a double-width result, and the `64`
/// family operates on register pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum OpCode {
    Popcnt8 = 1,
    Popcnt16 = 2,
    Popcnt32 = 3,
    Clz8 = 4,
    Clz16 = 5,
    Clz32 = 6,
    Ctz8 = 7,
    Ctz16 = 8,
    Ctz32 = 9,
    Bswap16 = 10,
    Bswap32 = 11,
    Add8 = 12,
    Add16 = 13,
    Add32 = 14,
    Sub8 = 15,
    Sub16 = 16,
    Sub32 = 17,
    Shll8 = 18,
    Shll16 = 19,
    Shll32 = 20,
    Shrl8 = 21,
    Shrl16 = 22,
    Shrl32 = 23,
    Shra8 = 24,
    Shra16 = 25,
    Shra32 = 26,
    Rotl8 = 27,
    Rotl16 = 28,
    Rotl32 = 29,
    Mul8 = 30,
    Mul16 = 31,
    Mul32 = 32,
    And = 33,
    Or = 34,
    Xor = 35,
    Add8C = 36,
    Add16C = 37,
    Add32C = 38,
    Sub8C = 39,
    Sub16C = 40,
    Sub32C = 41,
    Mul8C = 42,
    Mul16C = 43,
    Mul32C = 44,
    Mulsu8C = 45,
    Mulsu16C = 46,
    Mulsu32C = 47,
    Mulu8C = 48,
    Mulu16C = 49,
    Mulu32C = 50,
    Add64 = 51,
    Sub64 = 52,
    Shll64 = 53,
    Shrl64 = 54,
    Shra64 = 55,
    Rotl64 = 56,
    Rotr64 = 57,
    Mul64 = 58,
    Add64C = 59,
    Sub64C = 60,
    Mul64C = 61,
    Mulsu64C = 62,
    Mulu64C = 63,
    In = 64,
    Memory = 65,
    Loop = 66,
    IfLikely = 67,
    IfRandom = 68,
    Jmp = 69,
    End = 70,
}

impl OpCode {
    /// Decode an opcode byte, `None` for unassigned values.
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            1 => Self::Popcnt8,
            2 => Self::Popcnt16,
            3 => Self::Popcnt32,
            4 => Self::Clz8,
            5 => Self::Clz16,
            6 => Self::Clz32,
            7 => Self::Ctz8,
            8 => Self::Ctz16,
            9 => Self::Ctz32,
            10 => Self::Bswap16,
            11 => Self::Bswap32,
            12 => Self::Add8,
            13 => Self::Add16,
            14 => Self::Add32,
            15 => Self::Sub8,
            16 => Self::Sub16,
            17 => Self::Sub32,
            18 => Self::Shll8,
            19 => Self::Shll16,
            20 => Self::Shll32,
            21 => Self::Shrl8,
            22 => Self::Shrl16,
            23 => Self::Shrl32,
            24 => Self::Shra8,
            25 => Self::Shra16,
            26 => Self::Shra32,
            27 => Self::Rotl8,
            28 => Self::Rotl16,
            29 => Self::Rotl32,
            30 => Self::Mul8,
            31 => Self::Mul16,
            32 => Self::Mul32,
            33 => Self::And,
            34 => Self::Or,
            35 => Self::Xor,
            36 => Self::Add8C,
            37 => Self::Add16C,
            38 => Self::Add32C,
            39 => Self::Sub8C,
            40 => Self::Sub16C,
            41 => Self::Sub32C,
            42 => Self::Mul8C,
            43 => Self::Mul16C,
            44 => Self::Mul32C,
            45 => Self::Mulsu8C,
            46 => Self::Mulsu16C,
            47 => Self::Mulsu32C,
            48 => Self::Mulu8C,
            49 => Self::Mulu16C,
            50 => Self::Mulu32C,
            51 => Self::Add64,
            52 => Self::Sub64,
            53 => Self::Shll64,
            54 => Self::Shrl64,
            55 => Self::Shra64,
            56 => Self::Rotl64,
            57 => Self::Rotr64,
            58 => Self::Mul64,
            59 => Self::Add64C,
            60 => Self::Sub64C,
            61 => Self::Mul64C,
            62 => Self::Mulsu64C,
            63 => Self::Mulu64C,
            64 => Self::In,
            65 => Self::Memory,
            66 => Self::Loop,
            67 => Self::IfLikely,
            68 => Self::IfRandom,
            69 => Self::Jmp,
            70 => Self::End,
            _ => return None,
        })
    }
}
