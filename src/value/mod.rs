//! This module contains the definition of the four sorts of term that make up
//! the symbolic intermediate representation: 256-bit words, bytes, buffers,
//! and storage.
//!
//! Terms are immutable trees with structural equality. "Mutation" of a buffer
//! or storage produces a new node layered over the previous one, and reads
//! peel those layers off again. Two structurally equal terms are equal
//! regardless of how they were built, and nothing in the library depends on
//! node identity.
//!
//! Terms should be built through the constructors in [`crate::ops`], which
//! fold concrete operands into literal leaves. Building variants directly is
//! possible (the fields are public) but bypasses that folding.

pub mod known;

use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
};

use ethnum::U256;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::constant::{ADDRESS_SIZE_BYTES, WORD_SIZE_BYTES};

/// A 256-bit word term.
///
/// This is the main sort of the algebra: every EVM opcode that produces a
/// stack item produces a `Word`. A word is either a literal, a free variable
/// whose value only the solver can determine, an arithmetic or logical
/// operation over other words, or a read out of a buffer or storage term.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Word {
    /// A concrete 256-bit value.
    Lit { value: U256 },

    /// A free symbolic variable, identified by name.
    Var { name: String },

    /// Addition modulo 2^256.
    Add { left: Box<Word>, right: Box<Word> },

    /// Subtraction modulo 2^256.
    Sub { left: Box<Word>, right: Box<Word> },

    /// Multiplication modulo 2^256.
    Mul { left: Box<Word>, right: Box<Word> },

    /// Unsigned division, with division by zero yielding zero.
    Div { dividend: Box<Word>, divisor: Box<Word> },

    /// Two's-complement signed division, with division by zero yielding zero.
    SDiv { dividend: Box<Word>, divisor: Box<Word> },

    /// Unsigned remainder, with a zero divisor yielding zero.
    Mod { dividend: Box<Word>, divisor: Box<Word> },

    /// Signed remainder taking the sign of the dividend, with a zero divisor
    /// yielding zero.
    SMod { dividend: Box<Word>, divisor: Box<Word> },

    /// Addition in 512 bits followed by reduction modulo `modulus`.
    AddMod {
        left: Box<Word>,
        right: Box<Word>,
        modulus: Box<Word>,
    },

    /// Multiplication in 512 bits followed by reduction modulo `modulus`.
    MulMod {
        left: Box<Word>,
        right: Box<Word>,
        modulus: Box<Word>,
    },

    /// Exponentiation modulo 2^256.
    Exp { value: Box<Word>, exponent: Box<Word> },

    /// Sign extension of `value` from byte position `size`.
    SEx { size: Box<Word>, value: Box<Word> },

    /// The unsigned minimum of two words.
    Min { left: Box<Word>, right: Box<Word> },

    /// Unsigned less-than, producing a 0/1 word.
    Lt { left: Box<Word>, right: Box<Word> },

    /// Unsigned greater-than, producing a 0/1 word.
    Gt { left: Box<Word>, right: Box<Word> },

    /// Unsigned less-than-or-equal, producing a 0/1 word.
    LEq { left: Box<Word>, right: Box<Word> },

    /// Unsigned greater-than-or-equal, producing a 0/1 word.
    GEq { left: Box<Word>, right: Box<Word> },

    /// Signed less-than, producing a 0/1 word.
    SLt { left: Box<Word>, right: Box<Word> },

    /// Signed greater-than, producing a 0/1 word.
    SGt { left: Box<Word>, right: Box<Word> },

    /// Equality, producing a 0/1 word.
    Eq { left: Box<Word>, right: Box<Word> },

    /// A zero test, producing a 0/1 word.
    IsZero { value: Box<Word> },

    /// Bitwise conjunction.
    And { left: Box<Word>, right: Box<Word> },

    /// Bitwise disjunction.
    Or { left: Box<Word>, right: Box<Word> },

    /// Bitwise exclusive or.
    Xor { left: Box<Word>, right: Box<Word> },

    /// Bitwise complement.
    Not { value: Box<Word> },

    /// Left shift of `value` by `shift` bits; shifts of 256 or more yield
    /// zero.
    Shl { shift: Box<Word>, value: Box<Word> },

    /// Logical right shift of `value` by `shift` bits; shifts of 256 or more
    /// yield zero.
    Shr { shift: Box<Word>, value: Box<Word> },

    /// Arithmetic right shift of `value` by `shift` bits, preserving the
    /// sign bit.
    Sar { shift: Box<Word>, value: Box<Word> },

    /// A 32-byte big-endian read out of `buffer` starting at `index`.
    ReadWord { index: Box<Word>, buffer: Box<Buf> },

    /// The length of a buffer term.
    BufLength { buffer: Box<Buf> },

    /// A word assembled from 32 byte terms, most significant first.
    JoinBytes { bytes: Box<[Byte; 32]> },

    /// A read of `key` out of a storage term.
    SLoad { key: Box<Word>, storage: Box<Storage> },

    /// Equality of two byte terms, producing a 0/1 word.
    EqByte { left: Box<Byte>, right: Box<Byte> },
}

impl Word {
    /// Constructs a literal word.
    #[must_use]
    pub fn lit(value: impl Into<U256>) -> Self {
        Self::Lit { value: value.into() }
    }

    /// Constructs a free variable with the provided `name`.
    #[must_use]
    pub fn var(name: impl Into<String>) -> Self {
        Self::Var { name: name.into() }
    }

    /// Constructs a literal word from a 160-bit account address,
    /// zero-extended on the left.
    #[must_use]
    pub fn lit_addr(address: [u8; ADDRESS_SIZE_BYTES]) -> Self {
        let mut bytes = [0u8; WORD_SIZE_BYTES];
        bytes[WORD_SIZE_BYTES - ADDRESS_SIZE_BYTES..].copy_from_slice(&address);
        Self::Lit {
            value: U256::from_be_bytes(bytes),
        }
    }

    /// Checks whether this word is a literal.
    #[must_use]
    pub fn is_lit(&self) -> bool {
        matches!(self, Self::Lit { .. })
    }

    /// Gets the value of this word if it is a literal.
    #[must_use]
    pub fn as_lit(&self) -> Option<U256> {
        match self {
            Self::Lit { value } => Some(*value),
            _ => None,
        }
    }
}

/// An 8-bit byte term.
///
/// Bytes arise from indexing into words and from reading buffers at a single
/// offset. They are joined back into words via
/// [`crate::ops::bytes::join_bytes`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Byte {
    /// A concrete byte.
    Lit { value: u8 },

    /// A single-byte read out of `buffer` at `index`.
    ReadByte { index: Box<Word>, buffer: Box<Buf> },

    /// Byte `index` of `word`, where byte 0 is the most significant. A
    /// literal `index` of 32 or more denotes the zero byte.
    IndexWord { index: Box<Word>, word: Box<Word> },
}

impl Byte {
    /// Constructs a literal byte.
    #[must_use]
    pub fn lit(value: u8) -> Self {
        Self::Lit { value }
    }

    /// Checks whether this byte is a literal.
    #[must_use]
    pub fn is_lit(&self) -> bool {
        matches!(self, Self::Lit { .. })
    }

    /// Gets the value of this byte if it is a literal.
    #[must_use]
    pub fn as_lit(&self) -> Option<u8> {
        match self {
            Self::Lit { value } => Some(*value),
            _ => None,
        }
    }
}

/// A byte-addressed buffer term.
///
/// Buffers model memory, calldata, and returndata. A buffer is conceptually
/// infinite: every index beyond the explicitly known bytes reads as zero.
/// Writes do not mutate; they layer an overlay node over the base buffer, and
/// the read operations in [`crate::ops::memory`] resolve through those
/// overlays.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum Buf {
    /// The all-zeroes buffer.
    #[default]
    Empty,

    /// A buffer with a fully known prefix; indices past the prefix read as
    /// zero.
    Concrete { bytes: Vec<u8> },

    /// A buffer about whose contents nothing is known.
    Abstract { name: String },

    /// A one-byte overlay over `base` at `index`.
    WriteByte {
        index: Box<Word>,
        byte: Box<Byte>,
        base: Box<Buf>,
    },

    /// A 32-byte big-endian overlay over `base` at `index..index + 32`.
    WriteWord {
        index: Box<Word>,
        word: Box<Word>,
        base: Box<Buf>,
    },

    /// `size` bytes of `src` starting at `src_offset`, overlaid onto `dst`
    /// starting at `dst_offset`; all other indices resolve to `dst`.
    CopySlice {
        src_offset: Box<Word>,
        dst_offset: Box<Word>,
        size: Box<Word>,
        src: Box<Buf>,
        dst: Box<Buf>,
    },
}

impl Buf {
    /// Constructs a buffer with the provided concrete contents.
    #[must_use]
    pub fn concrete(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Concrete { bytes: bytes.into() }
    }

    /// Constructs a fully unknown buffer with the provided `name`.
    #[must_use]
    pub fn abstract_named(name: impl Into<String>) -> Self {
        Self::Abstract { name: name.into() }
    }
}

/// A word-keyed, word-valued storage term.
///
/// Unlike buffers, storage reads distinguish "this key was never written"
/// from any written value, so that a caller holding an out-of-band data
/// source (such as an RPC node) can materialize the missing slot. See
/// [`crate::ops::storage::read_storage`].
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum Storage {
    /// Storage with no prior writes.
    #[default]
    Empty,

    /// Storage with fully known contents; absent keys have never been
    /// written.
    Concrete { slots: BTreeMap<U256, U256> },

    /// Storage about whose contents nothing is known.
    Abstract { name: String },

    /// A single-slot write of `value` at `key`, layered over `base`.
    SStore {
        key: Box<Word>,
        value: Box<Word>,
        base: Box<Storage>,
    },
}

impl Storage {
    /// Constructs storage with the provided concrete contents.
    #[must_use]
    pub fn concrete(slots: BTreeMap<U256, U256>) -> Self {
        Self::Concrete { slots }
    }

    /// Constructs fully unknown storage with the provided `name`.
    #[must_use]
    pub fn abstract_named(name: impl Into<String>) -> Self {
        Self::Abstract { name: name.into() }
    }
}

/// Formats a word as a hexadecimal number with leading zeroes trimmed.
fn fmt_hex(value: U256, f: &mut Formatter<'_>) -> std::fmt::Result {
    let str = hex::encode(value.to_be_bytes());
    let str = str.trim_start_matches('0');
    let str = if str.is_empty() { "0" } else { str };
    write!(f, "0x{str}")
}

impl Display for Word {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lit { value } => fmt_hex(*value, f),
            Self::Var { name } => write!(f, "{name}"),
            Self::Add { left, right } => write!(f, "Add({left}, {right})"),
            Self::Sub { left, right } => write!(f, "Sub({left}, {right})"),
            Self::Mul { left, right } => write!(f, "Mul({left}, {right})"),
            Self::Div { dividend, divisor } => write!(f, "Div({dividend}, {divisor})"),
            Self::SDiv { dividend, divisor } => write!(f, "SDiv({dividend}, {divisor})"),
            Self::Mod { dividend, divisor } => write!(f, "Mod({dividend}, {divisor})"),
            Self::SMod { dividend, divisor } => write!(f, "SMod({dividend}, {divisor})"),
            Self::AddMod {
                left,
                right,
                modulus,
            } => write!(f, "AddMod({left}, {right}, {modulus})"),
            Self::MulMod {
                left,
                right,
                modulus,
            } => write!(f, "MulMod({left}, {right}, {modulus})"),
            Self::Exp { value, exponent } => write!(f, "Exp({value}, {exponent})"),
            Self::SEx { size, value } => write!(f, "SEx({size}, {value})"),
            Self::Min { left, right } => write!(f, "Min({left}, {right})"),
            Self::Lt { left, right } => write!(f, "Lt({left}, {right})"),
            Self::Gt { left, right } => write!(f, "Gt({left}, {right})"),
            Self::LEq { left, right } => write!(f, "LEq({left}, {right})"),
            Self::GEq { left, right } => write!(f, "GEq({left}, {right})"),
            Self::SLt { left, right } => write!(f, "SLt({left}, {right})"),
            Self::SGt { left, right } => write!(f, "SGt({left}, {right})"),
            Self::Eq { left, right } => write!(f, "Eq({left}, {right})"),
            Self::IsZero { value } => write!(f, "IsZero({value})"),
            Self::And { left, right } => write!(f, "And({left}, {right})"),
            Self::Or { left, right } => write!(f, "Or({left}, {right})"),
            Self::Xor { left, right } => write!(f, "Xor({left}, {right})"),
            Self::Not { value } => write!(f, "Not({value})"),
            Self::Shl { shift, value } => write!(f, "Shl({shift}, {value})"),
            Self::Shr { shift, value } => write!(f, "Shr({shift}, {value})"),
            Self::Sar { shift, value } => write!(f, "Sar({shift}, {value})"),
            Self::ReadWord { index, buffer } => write!(f, "ReadWord({index}, {buffer})"),
            Self::BufLength { buffer } => write!(f, "BufLength({buffer})"),
            Self::JoinBytes { bytes } => {
                write!(f, "JoinBytes({})", bytes.iter().join(", "))
            }
            Self::SLoad { key, storage } => write!(f, "SLoad({key}, {storage})"),
            Self::EqByte { left, right } => write!(f, "EqByte({left}, {right})"),
        }
    }
}

impl Display for Byte {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lit { value } => write!(f, "0x{}", hex::encode([*value])),
            Self::ReadByte { index, buffer } => write!(f, "ReadByte({index}, {buffer})"),
            Self::IndexWord { index, word } => write!(f, "IndexWord({index}, {word})"),
        }
    }
}

impl Display for Buf {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::Concrete { bytes } => write!(f, "0x{}", hex::encode(bytes)),
            Self::Abstract { name } => write!(f, "{name}"),
            Self::WriteByte { index, byte, base } => {
                write!(f, "WriteByte({index}, {byte}, {base})")
            }
            Self::WriteWord { index, word, base } => {
                write!(f, "WriteWord({index}, {word}, {base})")
            }
            Self::CopySlice {
                src_offset,
                dst_offset,
                size,
                src,
                dst,
            } => write!(
                f,
                "CopySlice({src_offset}, {dst_offset}, {size}, {src}, {dst})"
            ),
        }
    }
}

impl Display for Storage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::Concrete { slots } => {
                let entries = slots
                    .iter()
                    .map(|(key, value)| format!("{key:#x} => {value:#x}"))
                    .join(", ");
                write!(f, "{{{entries}}}")
            }
            Self::Abstract { name } => write!(f, "{name}"),
            Self::SStore { key, value, base } => write!(f, "SStore({key}, {value}, {base})"),
        }
    }
}
