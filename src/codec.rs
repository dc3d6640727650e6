//! This module contains the canonical binary encoding of terms, as consumed
//! by the solver frontend and the term printer.
//!
//! Every variant has a single tag byte, listed in [`tag`]; children follow
//! the tag depth-first. Word literals are 32 big-endian bytes and byte
//! literals a single byte. Names and concrete buffer contents are prefixed
//! with a 32-bit big-endian length. Known storage is a 32-bit big-endian
//! entry count followed by 64-byte key/value pairs in the map's iteration
//! order; consumers must not rely on that order. A copy node carries its
//! destination offset, source offset, size, source, and destination, in
//! that order.
//!
//! Encoding is total; decoding fails on truncated input, unknown tags,
//! malformed names, and trailing bytes.

#![allow(clippy::cast_possible_truncation)] // Lengths are 32-bit on the wire

use ethnum::U256;

use crate::{
    constant::WORD_SIZE_BYTES,
    error::codec::{Error, Result},
    value::{Buf, Byte, Storage, Word},
};

/// The tag bytes of the encoding, one per variant of each sort.
pub mod tag {
    pub const WORD_LIT: u8 = 0x00;
    pub const WORD_VAR: u8 = 0x01;
    pub const WORD_ADD: u8 = 0x02;
    pub const WORD_SUB: u8 = 0x03;
    pub const WORD_MUL: u8 = 0x04;
    pub const WORD_DIV: u8 = 0x05;
    pub const WORD_SDIV: u8 = 0x06;
    pub const WORD_MOD: u8 = 0x07;
    pub const WORD_SMOD: u8 = 0x08;
    pub const WORD_ADDMOD: u8 = 0x09;
    pub const WORD_MULMOD: u8 = 0x0a;
    pub const WORD_EXP: u8 = 0x0b;
    pub const WORD_SEX: u8 = 0x0c;
    pub const WORD_LT: u8 = 0x0d;
    pub const WORD_GT: u8 = 0x0e;
    pub const WORD_LEQ: u8 = 0x0f;
    pub const WORD_GEQ: u8 = 0x10;
    pub const WORD_SLT: u8 = 0x11;
    pub const WORD_SGT: u8 = 0x12;
    pub const WORD_EQ: u8 = 0x13;
    pub const WORD_ISZERO: u8 = 0x14;
    pub const WORD_AND: u8 = 0x15;
    pub const WORD_OR: u8 = 0x16;
    pub const WORD_XOR: u8 = 0x17;
    pub const WORD_NOT: u8 = 0x18;
    pub const WORD_SHL: u8 = 0x19;
    pub const WORD_SHR: u8 = 0x1a;
    pub const WORD_SAR: u8 = 0x1b;
    pub const WORD_MIN: u8 = 0x1c;
    pub const WORD_READ_WORD: u8 = 0x1d;
    pub const WORD_BUF_LENGTH: u8 = 0x1e;
    pub const WORD_JOIN_BYTES: u8 = 0x1f;
    pub const WORD_SLOAD: u8 = 0x20;
    pub const WORD_EQ_BYTE: u8 = 0x21;

    pub const BYTE_LIT: u8 = 0x00;
    pub const BYTE_READ_BYTE: u8 = 0x01;
    pub const BYTE_INDEX_WORD: u8 = 0x02;

    pub const BUF_EMPTY: u8 = 0x00;
    pub const BUF_CONCRETE: u8 = 0x01;
    pub const BUF_ABSTRACT: u8 = 0x02;
    pub const BUF_WRITE_BYTE: u8 = 0x03;
    pub const BUF_WRITE_WORD: u8 = 0x04;
    pub const BUF_COPY_SLICE: u8 = 0x05;

    pub const STORAGE_EMPTY: u8 = 0x00;
    pub const STORAGE_CONCRETE: u8 = 0x01;
    pub const STORAGE_ABSTRACT: u8 = 0x02;
    pub const STORAGE_SSTORE: u8 = 0x03;
}

/// Encodes a word term.
#[must_use]
pub fn encode_word(word: &Word) -> Vec<u8> {
    let mut out = Vec::new();
    write_word(word, &mut out);
    out
}

/// Encodes a byte term.
#[must_use]
pub fn encode_byte(byte: &Byte) -> Vec<u8> {
    let mut out = Vec::new();
    write_byte(byte, &mut out);
    out
}

/// Encodes a buffer term.
#[must_use]
pub fn encode_buf(buffer: &Buf) -> Vec<u8> {
    let mut out = Vec::new();
    write_buf(buffer, &mut out);
    out
}

/// Encodes a storage term.
#[must_use]
pub fn encode_storage(storage: &Storage) -> Vec<u8> {
    let mut out = Vec::new();
    write_storage(storage, &mut out);
    out
}

/// Decodes a word term, requiring the input to be fully consumed.
pub fn decode_word(bytes: &[u8]) -> Result<Word> {
    let mut reader = Reader::new(bytes);
    let word = read_word(&mut reader)?;
    reader.finish()?;
    Ok(word)
}

/// Decodes a byte term, requiring the input to be fully consumed.
pub fn decode_byte(bytes: &[u8]) -> Result<Byte> {
    let mut reader = Reader::new(bytes);
    let byte = read_byte(&mut reader)?;
    reader.finish()?;
    Ok(byte)
}

/// Decodes a buffer term, requiring the input to be fully consumed.
pub fn decode_buf(bytes: &[u8]) -> Result<Buf> {
    let mut reader = Reader::new(bytes);
    let buffer = read_buf(&mut reader)?;
    reader.finish()?;
    Ok(buffer)
}

/// Decodes a storage term, requiring the input to be fully consumed.
pub fn decode_storage(bytes: &[u8]) -> Result<Storage> {
    let mut reader = Reader::new(bytes);
    let storage = read_storage(&mut reader)?;
    reader.finish()?;
    Ok(storage)
}

fn write_u256(value: U256, out: &mut Vec<u8>) {
    out.extend(value.to_be_bytes());
}

fn write_prefixed(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend((bytes.len() as u32).to_be_bytes());
    out.extend(bytes);
}

fn write_word(word: &Word, out: &mut Vec<u8>) {
    match word {
        Word::Lit { value } => {
            out.push(tag::WORD_LIT);
            write_u256(*value, out);
        }
        Word::Var { name } => {
            out.push(tag::WORD_VAR);
            write_prefixed(name.as_bytes(), out);
        }
        Word::Add { left, right } => write_pair(tag::WORD_ADD, left, right, out),
        Word::Sub { left, right } => write_pair(tag::WORD_SUB, left, right, out),
        Word::Mul { left, right } => write_pair(tag::WORD_MUL, left, right, out),
        Word::Div { dividend, divisor } => write_pair(tag::WORD_DIV, dividend, divisor, out),
        Word::SDiv { dividend, divisor } => write_pair(tag::WORD_SDIV, dividend, divisor, out),
        Word::Mod { dividend, divisor } => write_pair(tag::WORD_MOD, dividend, divisor, out),
        Word::SMod { dividend, divisor } => write_pair(tag::WORD_SMOD, dividend, divisor, out),
        Word::AddMod {
            left,
            right,
            modulus,
        } => {
            out.push(tag::WORD_ADDMOD);
            write_word(left, out);
            write_word(right, out);
            write_word(modulus, out);
        }
        Word::MulMod {
            left,
            right,
            modulus,
        } => {
            out.push(tag::WORD_MULMOD);
            write_word(left, out);
            write_word(right, out);
            write_word(modulus, out);
        }
        Word::Exp { value, exponent } => write_pair(tag::WORD_EXP, value, exponent, out),
        Word::SEx { size, value } => write_pair(tag::WORD_SEX, size, value, out),
        Word::Lt { left, right } => write_pair(tag::WORD_LT, left, right, out),
        Word::Gt { left, right } => write_pair(tag::WORD_GT, left, right, out),
        Word::LEq { left, right } => write_pair(tag::WORD_LEQ, left, right, out),
        Word::GEq { left, right } => write_pair(tag::WORD_GEQ, left, right, out),
        Word::SLt { left, right } => write_pair(tag::WORD_SLT, left, right, out),
        Word::SGt { left, right } => write_pair(tag::WORD_SGT, left, right, out),
        Word::Eq { left, right } => write_pair(tag::WORD_EQ, left, right, out),
        Word::IsZero { value } => {
            out.push(tag::WORD_ISZERO);
            write_word(value, out);
        }
        Word::And { left, right } => write_pair(tag::WORD_AND, left, right, out),
        Word::Or { left, right } => write_pair(tag::WORD_OR, left, right, out),
        Word::Xor { left, right } => write_pair(tag::WORD_XOR, left, right, out),
        Word::Not { value } => {
            out.push(tag::WORD_NOT);
            write_word(value, out);
        }
        Word::Shl { shift, value } => write_pair(tag::WORD_SHL, shift, value, out),
        Word::Shr { shift, value } => write_pair(tag::WORD_SHR, shift, value, out),
        Word::Sar { shift, value } => write_pair(tag::WORD_SAR, shift, value, out),
        Word::Min { left, right } => write_pair(tag::WORD_MIN, left, right, out),
        Word::ReadWord { index, buffer } => {
            out.push(tag::WORD_READ_WORD);
            write_word(index, out);
            write_buf(buffer, out);
        }
        Word::BufLength { buffer } => {
            out.push(tag::WORD_BUF_LENGTH);
            write_buf(buffer, out);
        }
        Word::JoinBytes { bytes } => {
            out.push(tag::WORD_JOIN_BYTES);
            for byte in bytes.iter() {
                write_byte(byte, out);
            }
        }
        Word::SLoad { key, storage } => {
            out.push(tag::WORD_SLOAD);
            write_word(key, out);
            write_storage(storage, out);
        }
        Word::EqByte { left, right } => {
            out.push(tag::WORD_EQ_BYTE);
            write_byte(left, out);
            write_byte(right, out);
        }
    }
}

fn write_pair(tag: u8, left: &Word, right: &Word, out: &mut Vec<u8>) {
    out.push(tag);
    write_word(left, out);
    write_word(right, out);
}

fn write_byte(byte: &Byte, out: &mut Vec<u8>) {
    match byte {
        Byte::Lit { value } => {
            out.push(tag::BYTE_LIT);
            out.push(*value);
        }
        Byte::ReadByte { index, buffer } => {
            out.push(tag::BYTE_READ_BYTE);
            write_word(index, out);
            write_buf(buffer, out);
        }
        Byte::IndexWord { index, word } => {
            out.push(tag::BYTE_INDEX_WORD);
            write_word(index, out);
            write_word(word, out);
        }
    }
}

fn write_buf(buffer: &Buf, out: &mut Vec<u8>) {
    match buffer {
        Buf::Empty => out.push(tag::BUF_EMPTY),
        Buf::Concrete { bytes } => {
            out.push(tag::BUF_CONCRETE);
            write_prefixed(bytes, out);
        }
        Buf::Abstract { name } => {
            out.push(tag::BUF_ABSTRACT);
            write_prefixed(name.as_bytes(), out);
        }
        Buf::WriteByte { index, byte, base } => {
            out.push(tag::BUF_WRITE_BYTE);
            write_word(index, out);
            write_byte(byte, out);
            write_buf(base, out);
        }
        Buf::WriteWord { index, word, base } => {
            out.push(tag::BUF_WRITE_WORD);
            write_word(index, out);
            write_word(word, out);
            write_buf(base, out);
        }
        Buf::CopySlice {
            src_offset,
            dst_offset,
            size,
            src,
            dst,
        } => {
            out.push(tag::BUF_COPY_SLICE);
            write_word(dst_offset, out);
            write_word(src_offset, out);
            write_word(size, out);
            write_buf(src, out);
            write_buf(dst, out);
        }
    }
}

fn write_storage(storage: &Storage, out: &mut Vec<u8>) {
    match storage {
        Storage::Empty => out.push(tag::STORAGE_EMPTY),
        Storage::Concrete { slots } => {
            out.push(tag::STORAGE_CONCRETE);
            out.extend((slots.len() as u32).to_be_bytes());
            for (key, value) in slots {
                write_u256(*key, out);
                write_u256(*value, out);
            }
        }
        Storage::Abstract { name } => {
            out.push(tag::STORAGE_ABSTRACT);
            write_prefixed(name.as_bytes(), out);
        }
        Storage::SStore { key, value, base } => {
            out.push(tag::STORAGE_SSTORE);
            write_word(key, out);
            write_word(value, out);
            write_storage(base, out);
        }
    }
}

/// A cursor over the input being decoded.
struct Reader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEndOfInput {
                requested: count - self.remaining(),
                available: self.remaining(),
            });
        }
        let taken = &self.bytes[self.position..self.position + count];
        self.position += count;
        Ok(taken)
    }

    fn take_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn take_u256(&mut self) -> Result<U256> {
        let mut bytes = [0u8; WORD_SIZE_BYTES];
        bytes.copy_from_slice(self.take(WORD_SIZE_BYTES)?);
        Ok(U256::from_be_bytes(bytes))
    }

    fn take_prefixed(&mut self) -> Result<&'a [u8]> {
        let mut prefix = [0u8; 4];
        prefix.copy_from_slice(self.take(4)?);
        let length = u32::from_be_bytes(prefix) as usize;
        if self.remaining() < length {
            return Err(Error::LengthOutOfBounds { length });
        }
        self.take(length)
    }

    fn take_name(&mut self) -> Result<String> {
        let bytes = self.take_prefixed()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| Error::InvalidName)
    }

    fn finish(&self) -> Result<()> {
        if self.remaining() > 0 {
            return Err(Error::TrailingBytes {
                remaining: self.remaining(),
            });
        }
        Ok(())
    }
}

fn read_word(reader: &mut Reader) -> Result<Word> {
    let tag = reader.take_u8()?;
    let word = match tag {
        tag::WORD_LIT => Word::Lit {
            value: reader.take_u256()?,
        },
        tag::WORD_VAR => Word::Var {
            name: reader.take_name()?,
        },
        tag::WORD_ADD => read_pair(reader, |left, right| Word::Add { left, right })?,
        tag::WORD_SUB => read_pair(reader, |left, right| Word::Sub { left, right })?,
        tag::WORD_MUL => read_pair(reader, |left, right| Word::Mul { left, right })?,
        tag::WORD_DIV => read_pair(reader, |dividend, divisor| Word::Div { dividend, divisor })?,
        tag::WORD_SDIV => {
            read_pair(reader, |dividend, divisor| Word::SDiv { dividend, divisor })?
        }
        tag::WORD_MOD => read_pair(reader, |dividend, divisor| Word::Mod { dividend, divisor })?,
        tag::WORD_SMOD => {
            read_pair(reader, |dividend, divisor| Word::SMod { dividend, divisor })?
        }
        tag::WORD_ADDMOD => {
            let left = Box::new(read_word(reader)?);
            let right = Box::new(read_word(reader)?);
            let modulus = Box::new(read_word(reader)?);
            Word::AddMod {
                left,
                right,
                modulus,
            }
        }
        tag::WORD_MULMOD => {
            let left = Box::new(read_word(reader)?);
            let right = Box::new(read_word(reader)?);
            let modulus = Box::new(read_word(reader)?);
            Word::MulMod {
                left,
                right,
                modulus,
            }
        }
        tag::WORD_EXP => read_pair(reader, |value, exponent| Word::Exp { value, exponent })?,
        tag::WORD_SEX => read_pair(reader, |size, value| Word::SEx { size, value })?,
        tag::WORD_LT => read_pair(reader, |left, right| Word::Lt { left, right })?,
        tag::WORD_GT => read_pair(reader, |left, right| Word::Gt { left, right })?,
        tag::WORD_LEQ => read_pair(reader, |left, right| Word::LEq { left, right })?,
        tag::WORD_GEQ => read_pair(reader, |left, right| Word::GEq { left, right })?,
        tag::WORD_SLT => read_pair(reader, |left, right| Word::SLt { left, right })?,
        tag::WORD_SGT => read_pair(reader, |left, right| Word::SGt { left, right })?,
        tag::WORD_EQ => read_pair(reader, |left, right| Word::Eq { left, right })?,
        tag::WORD_ISZERO => Word::IsZero {
            value: Box::new(read_word(reader)?),
        },
        tag::WORD_AND => read_pair(reader, |left, right| Word::And { left, right })?,
        tag::WORD_OR => read_pair(reader, |left, right| Word::Or { left, right })?,
        tag::WORD_XOR => read_pair(reader, |left, right| Word::Xor { left, right })?,
        tag::WORD_NOT => Word::Not {
            value: Box::new(read_word(reader)?),
        },
        tag::WORD_SHL => read_pair(reader, |shift, value| Word::Shl { shift, value })?,
        tag::WORD_SHR => read_pair(reader, |shift, value| Word::Shr { shift, value })?,
        tag::WORD_SAR => read_pair(reader, |shift, value| Word::Sar { shift, value })?,
        tag::WORD_MIN => read_pair(reader, |left, right| Word::Min { left, right })?,
        tag::WORD_READ_WORD => {
            let index = Box::new(read_word(reader)?);
            let buffer = Box::new(read_buf(reader)?);
            Word::ReadWord { index, buffer }
        }
        tag::WORD_BUF_LENGTH => Word::BufLength {
            buffer: Box::new(read_buf(reader)?),
        },
        tag::WORD_JOIN_BYTES => {
            let mut bytes: [Byte; WORD_SIZE_BYTES] = std::array::from_fn(|_| Byte::lit(0));
            for slot in &mut bytes {
                *slot = read_byte(reader)?;
            }
            Word::JoinBytes {
                bytes: Box::new(bytes),
            }
        }
        tag::WORD_SLOAD => {
            let key = Box::new(read_word(reader)?);
            let storage = Box::new(read_storage(reader)?);
            Word::SLoad { key, storage }
        }
        tag::WORD_EQ_BYTE => {
            let left = Box::new(read_byte(reader)?);
            let right = Box::new(read_byte(reader)?);
            Word::EqByte { left, right }
        }
        tag => return Err(Error::UnknownTag { tag, sort: "word" }),
    };
    Ok(word)
}

fn read_pair(
    reader: &mut Reader,
    construct: impl FnOnce(Box<Word>, Box<Word>) -> Word,
) -> Result<Word> {
    let left = Box::new(read_word(reader)?);
    let right = Box::new(read_word(reader)?);
    Ok(construct(left, right))
}

fn read_byte(reader: &mut Reader) -> Result<Byte> {
    let tag = reader.take_u8()?;
    let byte = match tag {
        tag::BYTE_LIT => Byte::Lit {
            value: reader.take_u8()?,
        },
        tag::BYTE_READ_BYTE => {
            let index = Box::new(read_word(reader)?);
            let buffer = Box::new(read_buf(reader)?);
            Byte::ReadByte { index, buffer }
        }
        tag::BYTE_INDEX_WORD => {
            let index = Box::new(read_word(reader)?);
            let word = Box::new(read_word(reader)?);
            Byte::IndexWord { index, word }
        }
        tag => return Err(Error::UnknownTag { tag, sort: "byte" }),
    };
    Ok(byte)
}

fn read_buf(reader: &mut Reader) -> Result<Buf> {
    let tag = reader.take_u8()?;
    let buffer = match tag {
        tag::BUF_EMPTY => Buf::Empty,
        tag::BUF_CONCRETE => Buf::Concrete {
            bytes: reader.take_prefixed()?.to_vec(),
        },
        tag::BUF_ABSTRACT => Buf::Abstract {
            name: reader.take_name()?,
        },
        tag::BUF_WRITE_BYTE => {
            let index = Box::new(read_word(reader)?);
            let byte = Box::new(read_byte(reader)?);
            let base = Box::new(read_buf(reader)?);
            Buf::WriteByte { index, byte, base }
        }
        tag::BUF_WRITE_WORD => {
            let index = Box::new(read_word(reader)?);
            let word = Box::new(read_word(reader)?);
            let base = Box::new(read_buf(reader)?);
            Buf::WriteWord { index, word, base }
        }
        tag::BUF_COPY_SLICE => {
            let dst_offset = Box::new(read_word(reader)?);
            let src_offset = Box::new(read_word(reader)?);
            let size = Box::new(read_word(reader)?);
            let src = Box::new(read_buf(reader)?);
            let dst = Box::new(read_buf(reader)?);
            Buf::CopySlice {
                src_offset,
                dst_offset,
                size,
                src,
                dst,
            }
        }
        tag => return Err(Error::UnknownTag { tag, sort: "buf" }),
    };
    Ok(buffer)
}

fn read_storage(reader: &mut Reader) -> Result<Storage> {
    let tag = reader.take_u8()?;
    let storage = match tag {
        tag::STORAGE_EMPTY => Storage::Empty,
        tag::STORAGE_CONCRETE => {
            let mut prefix = [0u8; 4];
            prefix.copy_from_slice(reader.take(4)?);
            let count = u32::from_be_bytes(prefix) as usize;
            if reader.remaining() < count.saturating_mul(2 * WORD_SIZE_BYTES) {
                return Err(Error::LengthOutOfBounds {
                    length: count.saturating_mul(2 * WORD_SIZE_BYTES),
                });
            }
            let mut slots = std::collections::BTreeMap::new();
            for _ in 0..count {
                let key = reader.take_u256()?;
                let value = reader.take_u256()?;
                slots.insert(key, value);
            }
            Storage::Concrete { slots }
        }
        tag::STORAGE_ABSTRACT => Storage::Abstract {
            name: reader.take_name()?,
        },
        tag::STORAGE_SSTORE => {
            let key = Box::new(read_word(reader)?);
            let value = Box::new(read_word(reader)?);
            let base = Box::new(read_storage(reader)?);
            Storage::SStore { key, value, base }
        }
        tag => return Err(Error::UnknownTag {
            tag,
            sort: "storage",
        }),
    };
    Ok(storage)
}
