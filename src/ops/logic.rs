//! Smart constructors for the comparison, bitwise, and shift operations.

use crate::{
    ops::op2,
    value::{known, Word},
};

/// Unsigned less-than, producing a 0/1 word.
#[must_use]
pub fn lt(left: Word, right: Word) -> Word {
    op2(|left, right| Word::Lt { left, right }, known::lt, left, right)
}

/// Unsigned greater-than, producing a 0/1 word.
#[must_use]
pub fn gt(left: Word, right: Word) -> Word {
    op2(|left, right| Word::Gt { left, right }, known::gt, left, right)
}

/// Unsigned less-than-or-equal, producing a 0/1 word.
#[must_use]
pub fn leq(left: Word, right: Word) -> Word {
    op2(|left, right| Word::LEq { left, right }, known::leq, left, right)
}

/// Unsigned greater-than-or-equal, producing a 0/1 word.
#[must_use]
pub fn geq(left: Word, right: Word) -> Word {
    op2(|left, right| Word::GEq { left, right }, known::geq, left, right)
}

/// Signed less-than, producing a 0/1 word.
#[must_use]
pub fn slt(left: Word, right: Word) -> Word {
    op2(|left, right| Word::SLt { left, right }, known::slt, left, right)
}

/// Signed greater-than, producing a 0/1 word.
#[must_use]
pub fn sgt(left: Word, right: Word) -> Word {
    op2(|left, right| Word::SGt { left, right }, known::sgt, left, right)
}

/// Equality, producing a 0/1 word.
#[must_use]
pub fn eq(left: Word, right: Word) -> Word {
    op2(|left, right| Word::Eq { left, right }, known::eq, left, right)
}

/// The zero test, producing a 0/1 word.
#[must_use]
pub fn iszero(value: Word) -> Word {
    match value {
        Word::Lit { value } => Word::Lit {
            value: known::is_zero(value),
        },
        value => Word::IsZero {
            value: Box::new(value),
        },
    }
}

/// Bitwise conjunction.
#[must_use]
pub fn and(left: Word, right: Word) -> Word {
    op2(|left, right| Word::And { left, right }, known::and, left, right)
}

/// Bitwise disjunction.
#[must_use]
pub fn or(left: Word, right: Word) -> Word {
    op2(|left, right| Word::Or { left, right }, known::or, left, right)
}

/// Bitwise exclusive or.
#[must_use]
pub fn xor(left: Word, right: Word) -> Word {
    op2(|left, right| Word::Xor { left, right }, known::xor, left, right)
}

/// Bitwise complement.
#[must_use]
pub fn not(value: Word) -> Word {
    match value {
        Word::Lit { value } => Word::Lit {
            value: known::not(value),
        },
        value => Word::Not {
            value: Box::new(value),
        },
    }
}

/// Left shift of `value` by `shift` bits; shifts of 256 or more yield zero.
#[must_use]
pub fn shl(shift: Word, value: Word) -> Word {
    op2(
        |shift, value| Word::Shl { shift, value },
        known::shl,
        shift,
        value,
    )
}

/// Logical right shift of `value` by `shift` bits; shifts of 256 or more
/// yield zero.
#[must_use]
pub fn shr(shift: Word, value: Word) -> Word {
    op2(
        |shift, value| Word::Shr { shift, value },
        known::shr,
        shift,
        value,
    )
}

/// Arithmetic right shift of `value` by `shift` bits, preserving the sign
/// bit.
#[must_use]
pub fn sar(shift: Word, value: Word) -> Word {
    op2(
        |shift, value| Word::Sar { shift, value },
        known::sar,
        shift,
        value,
    )
}
