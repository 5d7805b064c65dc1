//! The RandHash ALU: one pure function per opcode.
//!
//! Narrow widths are SIMD-within-a-register: a 32-bit word is split into
//! independent 16- or 8-bit lanes, the scalar operation runs on each lane
//! with ordinary wraparound, and the lanes are repacked. The splitting is
//! expressed as recursive halving (32 into 16s, 16s into 8s) so each
//! width's semantics stay auditable against the scalar case. Shift
//! amounts are masked to the lane width, and the widening `*c` variants
//! return the full double-width result, big lane first.

// ── lane adapters ────────────────────────────────────────────────────

/// Apply a 16-bit binary op to both lanes of a 32-bit word.
fn map16x2(a: u32, b: u32, f: impl Fn(u16, u16) -> u16 + Copy) -> u32 {
    let hi = f((a >> 16) as u16, (b >> 16) as u16);
    let lo = f(a as u16, b as u16);
    ((hi as u32) << 16) | lo as u32
}

/// Apply an 8-bit binary op to all four lanes of a 32-bit word.
fn map8x4(a: u32, b: u32, f: impl Fn(u8, u8) -> u8 + Copy) -> u32 {
    map16x2(a, b, |x, y| {
        let hi = f((x >> 8) as u8, (y >> 8) as u8);
        let lo = f(x as u8, y as u8);
        ((hi as u16) << 8) | lo as u16
    })
}

/// Apply a 16-bit unary op to both lanes of a 32-bit word.
fn umap16x2(a: u32, f: impl Fn(u16) -> u16 + Copy) -> u32 {
    ((f((a >> 16) as u16) as u32) << 16) | f(a as u16) as u32
}

/// Apply an 8-bit unary op to all four lanes of a 32-bit word.
fn umap8x4(a: u32, f: impl Fn(u8) -> u8 + Copy) -> u32 {
    umap16x2(a, |x| ((f((x >> 8) as u8) as u16) << 8) | f(x as u8) as u16)
}

/// Apply a widening 16-bit op to both lanes, packing the two 32-bit
/// results big lane first.
fn wide16x2(a: u32, b: u32, f: impl Fn(u16, u16) -> u32 + Copy) -> u64 {
    let hi = f((a >> 16) as u16, (b >> 16) as u16) as u64;
    let lo = f(a as u16, b as u16) as u64;
    (hi << 32) | lo
}

/// Apply a widening 8-bit op to all four lanes, packing the four 16-bit
/// results big lane first.
fn wide8x4(a: u32, b: u32, f: impl Fn(u8, u8) -> u16 + Copy) -> u64 {
    wide16x2(a, b, |x, y| {
        let hi = f((x >> 8) as u8, (y >> 8) as u8) as u32;
        let lo = f(x as u8, y as u8) as u32;
        (hi << 16) | lo
    })
}

// ── unary ────────────────────────────────────────────────────────────

pub(crate) fn popcnt8(a: u32) -> u32 {
    umap8x4(a, |x| x.count_ones() as u8)
}

pub(crate) fn popcnt16(a: u32) -> u32 {
    umap16x2(a, |x| x.count_ones() as u16)
}

pub(crate) fn popcnt32(a: u32) -> u32 {
    a.count_ones()
}

pub(crate) fn clz8(a: u32) -> u32 {
    umap8x4(a, |x| x.leading_zeros() as u8)
}

pub(crate) fn clz16(a: u32) -> u32 {
    umap16x2(a, |x| x.leading_zeros() as u16)
}

pub(crate) fn clz32(a: u32) -> u32 {
    a.leading_zeros()
}

pub(crate) fn ctz8(a: u32) -> u32 {
    umap8x4(a, |x| x.trailing_zeros() as u8)
}

pub(crate) fn ctz16(a: u32) -> u32 {
    umap16x2(a, |x| x.trailing_zeros() as u16)
}

pub(crate) fn ctz32(a: u32) -> u32 {
    a.trailing_zeros()
}

pub(crate) fn bswap16(a: u32) -> u32 {
    umap16x2(a, u16::swap_bytes)
}

pub(crate) fn bswap32(a: u32) -> u32 {
    a.swap_bytes()
}

// ── binary, non-widening ─────────────────────────────────────────────

pub(crate) fn add8(a: u32, b: u32) -> u32 {
    map8x4(a, b, u8::wrapping_add)
}

pub(crate) fn add16(a: u32, b: u32) -> u32 {
    map16x2(a, b, u16::wrapping_add)
}

pub(crate) fn add32(a: u32, b: u32) -> u32 {
    a.wrapping_add(b)
}

pub(crate) fn sub8(a: u32, b: u32) -> u32 {
    map8x4(a, b, u8::wrapping_sub)
}

pub(crate) fn sub16(a: u32, b: u32) -> u32 {
    map16x2(a, b, u16::wrapping_sub)
}

pub(crate) fn sub32(a: u32, b: u32) -> u32 {
    a.wrapping_sub(b)
}

pub(crate) fn shll8(a: u32, b: u32) -> u32 {
    map8x4(a, b, |x, y| x << (y & 7))
}

pub(crate) fn shll16(a: u32, b: u32) -> u32 {
    map16x2(a, b, |x, y| x << (y & 15))
}

pub(crate) fn shll32(a: u32, b: u32) -> u32 {
    a << (b & 31)
}

pub(crate) fn shrl8(a: u32, b: u32) -> u32 {
    map8x4(a, b, |x, y| x >> (y & 7))
}

pub(crate) fn shrl16(a: u32, b: u32) -> u32 {
    map16x2(a, b, |x, y| x >> (y & 15))
}

pub(crate) fn shrl32(a: u32, b: u32) -> u32 {
    a >> (b & 31)
}

pub(crate) fn shra8(a: u32, b: u32) -> u32 {
    map8x4(a, b, |x, y| ((x as i8) >> (y & 7)) as u8)
}

pub(crate) fn shra16(a: u32, b: u32) -> u32 {
    map16x2(a, b, |x, y| ((x as i16) >> (y & 15)) as u16)
}

pub(crate) fn shra32(a: u32, b: u32) -> u32 {
    ((a as i32) >> (b & 31)) as u32
}

pub(crate) fn rotl8(a: u32, b: u32) -> u32 {
    map8x4(a, b, |x, y| x.rotate_left((y & 7) as u32))
}

pub(crate) fn rotl16(a: u32, b: u32) -> u32 {
    map16x2(a, b, |x, y| x.rotate_left((y & 15) as u32))
}

pub(crate) fn rotl32(a: u32, b: u32) -> u32 {
    a.rotate_left(b & 31)
}

pub(crate) fn mul8(a: u32, b: u32) -> u32 {
    map8x4(a, b, u8::wrapping_mul)
}

pub(crate) fn mul16(a: u32, b: u32) -> u32 {
    map16x2(a, b, u16::wrapping_mul)
}

pub(crate) fn mul32(a: u32, b: u32) -> u32 {
    a.wrapping_mul(b)
}

pub(crate) fn and(a: u32, b: u32) -> u32 {
    a & b
}

pub(crate) fn or(a: u32, b: u32) -> u32 {
    a | b
}

pub(crate) fn xor(a: u32, b: u32) -> u32 {
    a ^ b
}

// ── binary, widening ─────────────────────────────────────────────────

pub(crate) fn add8c(a: u32, b: u32) -> u64 {
    wide8x4(a, b, |x, y| x as u16 + y as u16)
}

pub(crate) fn add16c(a: u32, b: u32) -> u64 {
    wide16x2(a, b, |x, y| x as u32 + y as u32)
}

pub(crate) fn add32c(a: u32, b: u32) -> u64 {
    a as u64 + b as u64
}

pub(crate) fn sub8c(a: u32, b: u32) -> u64 {
    wide8x4(a, b, |x, y| (x as u16).wrapping_sub(y as u16))
}

pub(crate) fn sub16c(a: u32, b: u32) -> u64 {
    wide16x2(a, b, |x, y| (x as u32).wrapping_sub(y as u32))
}

pub(crate) fn sub32c(a: u32, b: u32) -> u64 {
    (a as u64).wrapping_sub(b as u64)
}

pub(crate) fn mul8c(a: u32, b: u32) -> u64 {
    wide8x4(a, b, |x, y| ((x as i8 as i16).wrapping_mul(y as i8 as i16)) as u16)
}

pub(crate) fn mul16c(a: u32, b: u32) -> u64 {
    wide16x2(a, b, |x, y| {
        ((x as i16 as i32).wrapping_mul(y as i16 as i32)) as u32
    })
}

pub(crate) fn mul32c(a: u32, b: u32) -> u64 {
    ((a as i32 as i64).wrapping_mul(b as i32 as i64)) as u64
}

pub(crate) fn mulsu8c(a: u32, b: u32) -> u64 {
    wide8x4(a, b, |x, y| ((x as i8 as i16).wrapping_mul(y as i16)) as u16)
}

pub(crate) fn mulsu16c(a: u32, b: u32) -> u64 {
    wide16x2(a, b, |x, y| ((x as i16 as i32).wrapping_mul(y as i32)) as u32)
}

pub(crate) fn mulsu32c(a: u32, b: u32) -> u64 {
    ((a as i32 as i64).wrapping_mul(b as i64)) as u64
}

pub(crate) fn mulu8c(a: u32, b: u32) -> u64 {
    wide8x4(a, b, |x, y| x as u16 * y as u16)
}

pub(crate) fn mulu16c(a: u32, b: u32) -> u64 {
    wide16x2(a, b, |x, y| x as u32 * y as u32)
}

pub(crate) fn mulu32c(a: u32, b: u32) -> u64 {
    a as u64 * b as u64
}

// ── 64-bit, on register pairs ────────────────────────────────────────

pub(crate) fn add64(a: u64, b: u64) -> u64 {
    a.wrapping_add(b)
}

pub(crate) fn sub64(a: u64, b: u64) -> u64 {
    a.wrapping_sub(b)
}

pub(crate) fn shll64(a: u64, b: u64) -> u64 {
    a << (b & 63)
}

pub(crate) fn shrl64(a: u64, b: u64) -> u64 {
    a >> (b & 63)
}

pub(crate) fn shra64(a: u64, b: u64) -> u64 {
    ((a as i64) >> (b & 63)) as u64
}

pub(crate) fn rotl64(a: u64, b: u64) -> u64 {
    a.rotate_left((b & 63) as u32)
}

pub(crate) fn rotr64(a: u64, b: u64) -> u64 {
    a.rotate_right((b & 63) as u32)
}

pub(crate) fn mul64(a: u64, b: u64) -> u64 {
    a.wrapping_mul(b)
}

pub(crate) fn add64c(a: u64, b: u64) -> u128 {
    a as u128 + b as u128
}

pub(crate) fn sub64c(a: u64, b: u64) -> u128 {
    (a as u128).wrapping_sub(b as u128)
}

pub(crate) fn mul64c(a: u64, b: u64) -> u128 {
    ((a as i64 as i128).wrapping_mul(b as i64 as i128)) as u128
}

pub(crate) fn mulsu64c(a: u64, b: u64) -> u128 {
    ((a as i64 as i128).wrapping_mul(b as i128)) as u128
}

pub(crate) fn mulu64c(a: u64, b: u64) -> u128 {
    a as u128 * b as u128
}
