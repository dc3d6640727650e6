//! Smart constructors for the arithmetic operations.

use crate::{
    ops::{op2, op3},
    value::{known, Word},
};

/// Addition modulo 2^256.
#[must_use]
pub fn add(left: Word, right: Word) -> Word {
    op2(|left, right| Word::Add { left, right }, known::add, left, right)
}

/// Subtraction modulo 2^256.
#[must_use]
pub fn sub(left: Word, right: Word) -> Word {
    op2(|left, right| Word::Sub { left, right }, known::sub, left, right)
}

/// Multiplication modulo 2^256.
#[must_use]
pub fn mul(left: Word, right: Word) -> Word {
    op2(|left, right| Word::Mul { left, right }, known::mul, left, right)
}

/// Unsigned division; division by zero yields zero.
#[must_use]
pub fn div(dividend: Word, divisor: Word) -> Word {
    op2(
        |dividend, divisor| Word::Div { dividend, divisor },
        known::div,
        dividend,
        divisor,
    )
}

/// Signed division, truncated towards zero; division by zero yields zero.
#[must_use]
pub fn sdiv(dividend: Word, divisor: Word) -> Word {
    op2(
        |dividend, divisor| Word::SDiv { dividend, divisor },
        known::sdiv,
        dividend,
        divisor,
    )
}

/// The `MOD` operation: unsigned remainder, with a zero divisor yielding
/// zero.
#[must_use]
pub fn emod(dividend: Word, divisor: Word) -> Word {
    op2(
        |dividend, divisor| Word::Mod { dividend, divisor },
        known::rem,
        dividend,
        divisor,
    )
}

/// The `SMOD` operation: signed remainder taking the sign of the dividend,
/// with a zero divisor yielding zero.
#[must_use]
pub fn smod(dividend: Word, divisor: Word) -> Word {
    op2(
        |dividend, divisor| Word::SMod { dividend, divisor },
        known::srem,
        dividend,
        divisor,
    )
}

/// Addition in 512 bits reduced modulo `modulus`; a zero modulus yields
/// zero.
#[must_use]
pub fn addmod(left: Word, right: Word, modulus: Word) -> Word {
    op3(
        |left, right, modulus| Word::AddMod {
            left,
            right,
            modulus,
        },
        known::addmod,
        left,
        right,
        modulus,
    )
}

/// Multiplication in 512 bits reduced modulo `modulus`; a zero modulus
/// yields zero.
#[must_use]
pub fn mulmod(left: Word, right: Word, modulus: Word) -> Word {
    op3(
        |left, right, modulus| Word::MulMod {
            left,
            right,
            modulus,
        },
        known::mulmod,
        left,
        right,
        modulus,
    )
}

/// Exponentiation modulo 2^256.
#[must_use]
pub fn exp(value: Word, exponent: Word) -> Word {
    op2(
        |value, exponent| Word::Exp { value, exponent },
        known::exp,
        value,
        exponent,
    )
}

/// Sign extension of `value` from byte position `size`; sizes of 31 and
/// above are the identity.
#[must_use]
pub fn sign_extend(size: Word, value: Word) -> Word {
    op2(
        |size, value| Word::SEx { size, value },
        known::sign_extend,
        size,
        value,
    )
}

/// The unsigned minimum of two words.
#[must_use]
pub fn min(left: Word, right: Word) -> Word {
    op2(|left, right| Word::Min { left, right }, known::min, left, right)
}
