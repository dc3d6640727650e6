//! This module contains the concrete arithmetic kernel: the semantics of
//! every word-producing EVM operation over values that are fully known at
//! analysis time.
//!
//! All functions here are total. The EVM never traps on arithmetic, so the
//! conventions are baked in: addition, subtraction, and multiplication wrap
//! modulo 2^256; division and remainder by zero yield zero; out-of-range
//! shift amounts saturate. Signed operations view their operands through
//! two's complement on 256 bits.

use ethnum::U256;
use primitive_types::U512;

use crate::constant::WORD_SIZE_BYTES;

/// Converts a boolean into the EVM's 0/1 word encoding.
fn from_bool(value: bool) -> U256 {
    if value {
        U256::ONE
    } else {
        U256::ZERO
    }
}

/// Widens a word into a 512-bit intermediate.
fn widen(value: U256) -> U512 {
    U512::from_big_endian(&value.to_be_bytes())
}

/// Narrows a 512-bit intermediate back into a word.
///
/// The callers below only narrow values that have already been reduced below
/// 2^256, so the discarded high half is always zero.
fn narrow(value: U512) -> U256 {
    let mut bytes = [0u8; 64];
    value.to_big_endian(&mut bytes);
    let mut low = [0u8; WORD_SIZE_BYTES];
    low.copy_from_slice(&bytes[WORD_SIZE_BYTES..]);
    U256::from_be_bytes(low)
}

/// Addition modulo 2^256.
#[must_use]
pub fn add(left: U256, right: U256) -> U256 {
    left.wrapping_add(right)
}

/// Subtraction modulo 2^256.
#[must_use]
pub fn sub(left: U256, right: U256) -> U256 {
    left.wrapping_sub(right)
}

/// Multiplication modulo 2^256.
#[must_use]
pub fn mul(left: U256, right: U256) -> U256 {
    left.wrapping_mul(right)
}

/// Unsigned division; division by zero yields zero.
#[must_use]
pub fn div(dividend: U256, divisor: U256) -> U256 {
    if divisor == U256::ZERO {
        U256::ZERO
    } else {
        dividend / divisor
    }
}

/// Signed division, truncated towards zero; division by zero yields zero.
///
/// The one overflowing case, `MIN / -1`, wraps back to `MIN` as on the EVM.
#[must_use]
pub fn sdiv(dividend: U256, divisor: U256) -> U256 {
    if divisor == U256::ZERO {
        U256::ZERO
    } else {
        dividend
            .as_i256()
            .wrapping_div(divisor.as_i256())
            .as_u256()
    }
}

/// Unsigned remainder; a zero divisor yields zero.
#[must_use]
pub fn rem(dividend: U256, divisor: U256) -> U256 {
    if divisor == U256::ZERO {
        U256::ZERO
    } else {
        dividend % divisor
    }
}

/// Signed remainder, taking the sign of the dividend; a zero divisor yields
/// zero.
#[must_use]
pub fn srem(dividend: U256, divisor: U256) -> U256 {
    if divisor == U256::ZERO {
        U256::ZERO
    } else {
        dividend
            .as_i256()
            .wrapping_rem(divisor.as_i256())
            .as_u256()
    }
}

/// Addition performed in 512 bits and reduced modulo `modulus`; a zero
/// modulus yields zero.
#[must_use]
pub fn addmod(left: U256, right: U256, modulus: U256) -> U256 {
    if modulus == U256::ZERO {
        U256::ZERO
    } else {
        narrow((widen(left) + widen(right)) % widen(modulus))
    }
}

/// Multiplication performed in 512 bits and reduced modulo `modulus`; a zero
/// modulus yields zero.
#[must_use]
pub fn mulmod(left: U256, right: U256, modulus: U256) -> U256 {
    if modulus == U256::ZERO {
        U256::ZERO
    } else {
        narrow((widen(left) * widen(right)) % widen(modulus))
    }
}

/// Exponentiation modulo 2^256, by square and multiply.
#[must_use]
pub fn exp(value: U256, exponent: U256) -> U256 {
    let mut result = U256::ONE;
    let mut base = value;
    let mut exponent = exponent;
    while exponent != U256::ZERO {
        if exponent & U256::ONE == U256::ONE {
            result = result.wrapping_mul(base);
        }
        base = base.wrapping_mul(base);
        exponent = exponent >> 1u32;
    }
    result
}

/// Sign-extends `value` from byte position `size`, counting from the least
/// significant byte. The sign bit is bit `size * 8 + 7`; a `size` of 31 or
/// more is the identity.
#[must_use]
pub fn sign_extend(size: U256, value: U256) -> U256 {
    if size >= U256::new(31) {
        return value;
    }
    let shift = 248 - 8 * size.as_u32();
    ((value << shift).as_i256() >> shift).as_u256()
}

/// The unsigned minimum of two words.
#[must_use]
pub fn min(left: U256, right: U256) -> U256 {
    left.min(right)
}

/// Unsigned less-than as a 0/1 word.
#[must_use]
pub fn lt(left: U256, right: U256) -> U256 {
    from_bool(left < right)
}

/// Unsigned greater-than as a 0/1 word.
#[must_use]
pub fn gt(left: U256, right: U256) -> U256 {
    from_bool(left > right)
}

/// Unsigned less-than-or-equal as a 0/1 word.
#[must_use]
pub fn leq(left: U256, right: U256) -> U256 {
    from_bool(left <= right)
}

/// Unsigned greater-than-or-equal as a 0/1 word.
#[must_use]
pub fn geq(left: U256, right: U256) -> U256 {
    from_bool(left >= right)
}

/// Signed less-than as a 0/1 word.
#[must_use]
pub fn slt(left: U256, right: U256) -> U256 {
    from_bool(left.as_i256() < right.as_i256())
}

/// Signed greater-than as a 0/1 word.
#[must_use]
pub fn sgt(left: U256, right: U256) -> U256 {
    from_bool(left.as_i256() > right.as_i256())
}

/// Equality as a 0/1 word.
#[must_use]
pub fn eq(left: U256, right: U256) -> U256 {
    from_bool(left == right)
}

/// The zero test as a 0/1 word.
#[must_use]
pub fn is_zero(value: U256) -> U256 {
    from_bool(value == U256::ZERO)
}

/// Bitwise conjunction.
#[must_use]
pub fn and(left: U256, right: U256) -> U256 {
    left & right
}

/// Bitwise disjunction.
#[must_use]
pub fn or(left: U256, right: U256) -> U256 {
    left | right
}

/// Bitwise exclusive or.
#[must_use]
pub fn xor(left: U256, right: U256) -> U256 {
    left ^ right
}

/// Bitwise complement.
#[must_use]
pub fn not(value: U256) -> U256 {
    !value
}

/// Left shift by `shift` bits; shifts of 256 or more yield zero.
#[must_use]
pub fn shl(shift: U256, value: U256) -> U256 {
    if shift >= U256::new(256) {
        U256::ZERO
    } else {
        value << shift.as_u32()
    }
}

/// Logical right shift by `shift` bits; shifts of 256 or more yield zero.
#[must_use]
pub fn shr(shift: U256, value: U256) -> U256 {
    if shift >= U256::new(256) {
        U256::ZERO
    } else {
        value >> shift.as_u32()
    }
}

/// Arithmetic right shift by `shift` bits, preserving the sign bit. Shifts
/// of 256 or more saturate to all-ones for negative values and to zero
/// otherwise.
#[must_use]
pub fn sar(shift: U256, value: U256) -> U256 {
    if shift >= U256::new(256) {
        if value.as_i256().is_negative() {
            U256::MAX
        } else {
            U256::ZERO
        }
    } else {
        (value.as_i256() >> shift.as_u32()).as_u256()
    }
}

/// The number of leading zero bits in `value`.
#[must_use]
pub fn count_leading_zeros(value: U256) -> u32 {
    value.leading_zeros()
}

/// Checks whether `value` is a power of two.
#[must_use]
pub fn is_power_of_two(value: U256) -> bool {
    value != U256::ZERO && value & value.wrapping_sub(U256::ONE) == U256::ZERO
}

/// Checks whether the set bits of `value` start on a byte boundary, as the
/// masks produced by byte-oriented code do.
#[must_use]
pub fn is_byte_aligned(value: U256) -> bool {
    value.trailing_zeros() % 8 == 0
}

/// Decodes a big-endian byte string of at most 32 bytes into a word,
/// zero-extending on the left. Longer inputs keep their 32 low-order bytes.
#[must_use]
pub fn word_from_bytes(bytes: &[u8]) -> U256 {
    let bytes = if bytes.len() > WORD_SIZE_BYTES {
        &bytes[bytes.len() - WORD_SIZE_BYTES..]
    } else {
        bytes
    };
    let mut padded = [0u8; WORD_SIZE_BYTES];
    padded[WORD_SIZE_BYTES - bytes.len()..].copy_from_slice(bytes);
    U256::from_be_bytes(padded)
}

/// Encodes a word as its 32 big-endian bytes.
#[must_use]
pub fn word_to_bytes(value: U256) -> [u8; WORD_SIZE_BYTES] {
    value.to_be_bytes()
}

#[cfg(test)]
mod test {
    use ethnum::U256;

    use crate::value::known;

    /// The two's-complement encoding of `-value`.
    fn neg(value: u128) -> U256 {
        U256::ZERO.wrapping_sub(U256::new(value))
    }

    /// The most negative signed 256-bit value.
    fn min_int() -> U256 {
        U256::ONE << 255u32
    }

    #[test]
    fn addition_wraps() {
        assert_eq!(known::add(U256::new(3), U256::new(4)), U256::new(7));
        assert_eq!(known::add(U256::MAX, U256::ONE), U256::ZERO);
    }

    #[test]
    fn subtraction_wraps() {
        assert_eq!(known::sub(U256::new(10), U256::new(3)), U256::new(7));
        assert_eq!(known::sub(U256::ZERO, U256::ONE), U256::MAX);
    }

    #[test]
    fn multiplication_wraps() {
        assert_eq!(known::mul(U256::new(3), U256::new(4)), U256::new(12));
        assert_eq!(known::mul(min_int(), U256::new(2)), U256::ZERO);
    }

    #[test]
    fn division_by_zero_is_zero() {
        assert_eq!(known::div(U256::new(10), U256::new(2)), U256::new(5));
        assert_eq!(known::div(U256::new(10), U256::ZERO), U256::ZERO);
        assert_eq!(known::sdiv(U256::new(10), U256::ZERO), U256::ZERO);
        assert_eq!(known::rem(U256::new(10), U256::ZERO), U256::ZERO);
        assert_eq!(known::srem(U256::new(10), U256::ZERO), U256::ZERO);
    }

    #[test]
    fn signed_division_truncates_towards_zero() {
        assert_eq!(known::sdiv(neg(4), U256::new(2)), neg(2));
        assert_eq!(known::sdiv(neg(7), U256::new(2)), neg(3));
        assert_eq!(known::sdiv(U256::new(7), neg(2)), neg(3));
    }

    #[test]
    fn signed_division_overflow_wraps() {
        assert_eq!(known::sdiv(min_int(), neg(1)), min_int());
    }

    #[test]
    fn remainders_take_the_sign_of_the_dividend() {
        assert_eq!(known::rem(U256::new(10), U256::new(3)), U256::ONE);
        assert_eq!(known::srem(neg(5), U256::new(3)), neg(2));
        assert_eq!(known::srem(U256::new(5), neg(3)), U256::new(2));
    }

    #[test]
    fn modular_arithmetic_widens_past_word_size() {
        // MAX ≡ 0 (mod 3), so no 256-bit overflow may leak into the result.
        assert_eq!(
            known::addmod(U256::MAX, U256::new(2), U256::new(3)),
            U256::new(2)
        );
        // MAX ≡ 7 (mod 8) and 7 * 7 ≡ 1 (mod 8).
        assert_eq!(
            known::mulmod(U256::MAX, U256::MAX, U256::new(8)),
            U256::ONE
        );
    }

    #[test]
    fn modular_arithmetic_by_zero_is_zero() {
        assert_eq!(known::addmod(U256::ONE, U256::ONE, U256::ZERO), U256::ZERO);
        assert_eq!(known::mulmod(U256::ONE, U256::ONE, U256::ZERO), U256::ZERO);
    }

    #[test]
    fn exponentiation_wraps() {
        assert_eq!(known::exp(U256::new(3), U256::new(5)), U256::new(243));
        assert_eq!(known::exp(U256::new(2), U256::new(256)), U256::ZERO);
        assert_eq!(known::exp(U256::ZERO, U256::ZERO), U256::ONE);
        assert_eq!(known::exp(U256::new(7), U256::ZERO), U256::ONE);
    }

    #[test]
    fn sign_extension_propagates_the_sign_bit() {
        assert_eq!(known::sign_extend(U256::ZERO, U256::new(0xff)), U256::MAX);
        assert_eq!(
            known::sign_extend(U256::ZERO, U256::new(0x7f)),
            U256::new(0x7f)
        );
        assert_eq!(
            known::sign_extend(U256::ONE, U256::new(0x8000)),
            U256::ZERO.wrapping_sub(U256::new(0x8000))
        );
    }

    #[test]
    fn sign_extension_past_the_top_byte_is_the_identity() {
        assert_eq!(known::sign_extend(U256::new(31), neg(1)), neg(1));
        assert_eq!(known::sign_extend(U256::MAX, U256::new(0xff)), U256::new(0xff));
    }

    #[test]
    fn comparisons_produce_zero_or_one() {
        assert_eq!(known::lt(U256::new(3), U256::new(4)), U256::ONE);
        assert_eq!(known::lt(U256::new(4), U256::new(3)), U256::ZERO);
        assert_eq!(known::gt(U256::new(4), U256::new(3)), U256::ONE);
        assert_eq!(known::leq(U256::new(4), U256::new(4)), U256::ONE);
        assert_eq!(known::geq(U256::new(3), U256::new(4)), U256::ZERO);
        assert_eq!(known::eq(U256::new(4), U256::new(4)), U256::ONE);
        assert_eq!(known::is_zero(U256::ZERO), U256::ONE);
        assert_eq!(known::is_zero(U256::ONE), U256::ZERO);
    }

    #[test]
    fn signed_comparisons_respect_the_sign_bit() {
        assert_eq!(known::slt(neg(1), U256::ZERO), U256::ONE);
        assert_eq!(known::lt(neg(1), U256::ZERO), U256::ZERO);
        assert_eq!(known::sgt(U256::ZERO, neg(1)), U256::ONE);
        assert_eq!(known::sgt(neg(1), U256::ZERO), U256::ZERO);
    }

    #[test]
    fn shifts_saturate_past_word_size() {
        assert_eq!(known::shl(U256::new(4), U256::ONE), U256::new(16));
        assert_eq!(known::shl(U256::new(256), U256::ONE), U256::ZERO);
        assert_eq!(known::shr(U256::new(4), U256::new(16)), U256::ONE);
        assert_eq!(known::shr(U256::new(256), U256::MAX), U256::ZERO);
    }

    #[test]
    fn arithmetic_shift_preserves_the_sign() {
        assert_eq!(known::sar(U256::new(4), neg(16)), U256::MAX);
        assert_eq!(known::sar(U256::new(2), U256::new(16)), U256::new(4));
        assert_eq!(known::sar(U256::new(300), neg(16)), U256::MAX);
        assert_eq!(known::sar(U256::new(300), U256::new(16)), U256::ZERO);
        // A logical shift of the same operands differs, which is the point.
        assert_ne!(known::sar(U256::new(4), neg(16)), known::shr(U256::new(4), neg(16)));
    }

    #[test]
    fn mask_helpers_inspect_bit_patterns() {
        assert_eq!(known::count_leading_zeros(U256::ZERO), 256);
        assert_eq!(known::count_leading_zeros(U256::ONE), 255);
        assert!(known::is_power_of_two(U256::new(64)));
        assert!(!known::is_power_of_two(U256::new(6)));
        assert!(!known::is_power_of_two(U256::ZERO));
        assert!(known::is_byte_aligned(U256::new(0xff00)));
        assert!(!known::is_byte_aligned(U256::new(0b10)));
    }

    #[test]
    fn byte_conversions_are_big_endian() {
        assert_eq!(known::word_from_bytes(&[0x01, 0x02]), U256::new(0x0102));
        assert_eq!(known::word_from_bytes(&[]), U256::ZERO);
        assert_eq!(known::word_to_bytes(U256::new(0x42))[31], 0x42);
        assert_eq!(known::word_to_bytes(U256::new(0x42))[0], 0x00);
    }
}
