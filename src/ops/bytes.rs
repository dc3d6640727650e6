//! Smart constructors that move between the byte and word sorts: indexing a
//! single byte out of a word, and joining bytes back into a word.
//!
//! The byte order follows the EVM convention throughout: byte 0 of a word is
//! its most significant byte.

use ethnum::U256;

use crate::{
    constant::WORD_SIZE_BYTES,
    value::{known, Byte, Word},
};

/// Extracts byte `index` of `word`, where byte 0 is the most significant.
///
/// A literal index of 32 or more denotes a byte outside the word and is the
/// zero byte regardless of `word`. Indexing into a joined word selects the
/// corresponding byte term directly.
#[must_use]
pub fn index_word(index: Word, word: Word) -> Byte {
    match (index, word) {
        (Word::Lit { value: index }, Word::Lit { value: word }) => {
            if index < U256::new(WORD_SIZE_BYTES as u128) {
                Byte::lit(word.to_be_bytes()[index.as_usize()])
            } else {
                Byte::lit(0)
            }
        }
        (Word::Lit { value: index }, Word::JoinBytes { bytes }) => {
            if index < U256::new(WORD_SIZE_BYTES as u128) {
                bytes[index.as_usize()].clone()
            } else {
                Byte::lit(0)
            }
        }
        (Word::Lit { value: index }, _) if index >= U256::new(WORD_SIZE_BYTES as u128) => {
            Byte::lit(0)
        }
        (index, word) => Byte::IndexWord {
            index: Box::new(index),
            word: Box::new(word),
        },
    }
}

/// Joins at most 32 byte terms into a word, most significant byte first,
/// padding on the left with zero bytes. Longer inputs keep their 32
/// low-order bytes.
///
/// If every byte is literal the result is the literal big-endian decoding;
/// otherwise a join node carrying all 32 positions is built.
#[must_use]
pub fn join_bytes(bytes: Vec<Byte>) -> Word {
    let mut bytes = bytes;
    if bytes.len() > WORD_SIZE_BYTES {
        bytes.drain(..bytes.len() - WORD_SIZE_BYTES);
    }

    if bytes.iter().all(Byte::is_lit) {
        let raw: Vec<u8> = bytes.iter().filter_map(Byte::as_lit).collect();
        return Word::Lit {
            value: known::word_from_bytes(&raw),
        };
    }

    let pad = WORD_SIZE_BYTES - bytes.len();
    let mut joined: [Byte; WORD_SIZE_BYTES] = std::array::from_fn(|_| Byte::lit(0));
    for (position, byte) in bytes.into_iter().enumerate() {
        joined[pad + position] = byte;
    }
    Word::JoinBytes {
        bytes: Box::new(joined),
    }
}

/// Zero-extends a single byte term into a word.
#[must_use]
pub fn pad_byte(byte: Byte) -> Word {
    join_bytes(vec![byte])
}

/// Equality of two byte terms, producing a 0/1 word.
#[must_use]
pub fn eq_byte(left: Byte, right: Byte) -> Word {
    match (left, right) {
        (Byte::Lit { value: left }, Byte::Lit { value: right }) => {
            Word::lit(u128::from(left == right))
        }
        (left, right) => Word::EqByte {
            left: Box::new(left),
            right: Box::new(right),
        },
    }
}
