//! This module contains the smart constructors of the algebra: for every
//! operation a function that evaluates to a literal whenever its operands are
//! literal, and builds the corresponding symbolic node otherwise.
//!
//! The folding rule is deliberately shallow. Only direct concrete evaluation
//! is performed; no algebraic rewriting (such as `x + 0` to `x`) happens
//! here, so the shape of a symbolic term always mirrors the operations that
//! produced it.

pub mod arithmetic;
pub mod bytes;
pub mod logic;
pub mod memory;
pub mod storage;

use ethnum::U256;

use crate::value::Word;

/// Folds a binary word operation: literal operands evaluate through
/// `concrete`, anything else builds the node via `construct`.
fn op2(
    construct: impl FnOnce(Box<Word>, Box<Word>) -> Word,
    concrete: impl FnOnce(U256, U256) -> U256,
    left: Word,
    right: Word,
) -> Word {
    match (left, right) {
        (Word::Lit { value: left }, Word::Lit { value: right }) => Word::Lit {
            value: concrete(left, right),
        },
        (left, right) => construct(Box::new(left), Box::new(right)),
    }
}

/// Folds a ternary word operation, analogously to [`op2`].
fn op3(
    construct: impl FnOnce(Box<Word>, Box<Word>, Box<Word>) -> Word,
    concrete: impl FnOnce(U256, U256, U256) -> U256,
    first: Word,
    second: Word,
    third: Word,
) -> Word {
    match (first, second, third) {
        (
            Word::Lit { value: first },
            Word::Lit { value: second },
            Word::Lit { value: third },
        ) => Word::Lit {
            value: concrete(first, second, third),
        },
        (first, second, third) => construct(Box::new(first), Box::new(second), Box::new(third)),
    }
}
