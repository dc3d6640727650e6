//! The buffer overlay engine: byte-accurate reads and writes over buffer
//! terms.
//!
//! Writes never mutate a buffer; they layer an overlay node over it. A read
//! therefore has to look through a chain of overlays, and the functions here
//! do so by walking towards the base buffer, deciding at every node whether
//! the read falls inside that node's write region. A node whose region the
//! read provably misses is skipped entirely, which keeps fully concrete
//! chains folding down to literals no matter how deep they are.
//!
//! The walk is a loop, not recursion, so chain depth costs no stack.

use ethnum::U256;

use crate::{
    constant::{MAX_CONCRETE_BYTES, WORD_SIZE_BYTES},
    ops::{arithmetic, bytes},
    value::{Buf, Byte, Word},
};

/// Checks that a `span`-byte concrete write ending at `offset + span` is
/// small enough to materialize.
fn within_fold_bound(offset: U256, span: u64) -> bool {
    offset <= U256::new(u128::from(MAX_CONCRETE_BYTES - span))
}

/// Gets the explicit bytes of a buffer whose contents are fully known.
fn known_bytes(buffer: &Buf) -> Option<&[u8]> {
    match buffer {
        Buf::Empty => Some(&[]),
        Buf::Concrete { bytes } => Some(bytes),
        _ => None,
    }
}

/// Checks whether a buffer is known to contain only zeroes.
fn is_known_empty(buffer: &Buf) -> bool {
    known_bytes(buffer).map_or(false, <[u8]>::is_empty)
}

/// Resolves a single-byte read at a literal `offset` by walking the overlay
/// chain of `buffer`.
///
/// Every step either terminates on a base buffer, skips an overlay that the
/// read provably misses, redirects through a fully-literal copy, or stops
/// with a residual read node for the solver.
fn read_byte_at(offset: U256, buffer: &Buf) -> Byte {
    let mut offset = offset;
    let mut buffer = buffer;
    let word_size = U256::new(WORD_SIZE_BYTES as u128);

    loop {
        match buffer {
            Buf::Empty => return Byte::lit(0),
            Buf::Concrete { bytes } => {
                let value = if offset < U256::new(bytes.len() as u128) {
                    bytes[offset.as_usize()]
                } else {
                    0
                };
                return Byte::lit(value);
            }
            Buf::WriteByte { index, byte, base } => match index.as_lit() {
                Some(index) if index == offset => return (**byte).clone(),
                Some(_) => buffer = base.as_ref(),
                None => break,
            },
            Buf::WriteWord { index, word, base } => match index.as_lit() {
                Some(index) => {
                    if offset >= index && offset - index < word_size {
                        return bytes::index_word(Word::lit(offset - index), (**word).clone());
                    }
                    buffer = base.as_ref();
                }
                None => break,
            },
            Buf::CopySlice {
                src_offset,
                dst_offset,
                size,
                src,
                dst,
            } => match (src_offset.as_lit(), dst_offset.as_lit(), size.as_lit()) {
                (Some(src_off), Some(dst_off), Some(size)) => {
                    if offset >= dst_off && offset - dst_off < size {
                        offset = (offset - dst_off).wrapping_add(src_off);
                        buffer = src.as_ref();
                    } else {
                        buffer = dst.as_ref();
                    }
                }
                (_, Some(dst_off), Some(size)) => {
                    if offset < dst_off || offset - dst_off >= size {
                        buffer = dst.as_ref();
                    } else {
                        break;
                    }
                }
                (_, Some(dst_off), None) => {
                    if offset < dst_off {
                        buffer = dst.as_ref();
                    } else {
                        break;
                    }
                }
                _ => break,
            },
            Buf::Abstract { .. } => break,
        }
    }

    Byte::ReadByte {
        index: Box::new(Word::lit(offset)),
        buffer: Box::new(buffer.clone()),
    }
}

/// Reads the byte at `index` out of `buffer`.
///
/// Indices past the known contents of a buffer read as zero; a read that
/// cannot be resolved produces a residual read node.
#[must_use]
pub fn read_byte(index: Word, buffer: Buf) -> Byte {
    match index {
        Word::Lit { value } => read_byte_at(value, &buffer),
        index => Byte::ReadByte {
            index: Box::new(index),
            buffer: Box::new(buffer),
        },
    }
}

/// Reads the 32-byte big-endian word at `index` out of `buffer`.
///
/// The result is a literal exactly when all 32 byte reads resolve to
/// literals; otherwise it is a single residual word read.
#[must_use]
pub fn read_word(index: Word, buffer: Buf) -> Word {
    let Word::Lit { value: offset } = index else {
        return Word::ReadWord {
            index: Box::new(index),
            buffer: Box::new(buffer),
        };
    };

    let mut bytes = [0u8; WORD_SIZE_BYTES];
    for (position, slot) in bytes.iter_mut().enumerate() {
        let index = offset.wrapping_add(U256::new(position as u128));
        match read_byte_at(index, &buffer) {
            Byte::Lit { value } => *slot = value,
            _ => {
                return Word::ReadWord {
                    index: Box::new(Word::lit(offset)),
                    buffer: Box::new(buffer),
                }
            }
        }
    }
    Word::lit(U256::from_be_bytes(bytes))
}

/// Reads `count` consecutive bytes (at most 32) starting at `index`, as a
/// left-zero-padded word.
#[must_use]
pub fn read_bytes(count: usize, index: Word, buffer: Buf) -> Word {
    let count = count.min(WORD_SIZE_BYTES);
    let mut read = Vec::with_capacity(count);
    for position in 0..count {
        let index = arithmetic::add(index.clone(), Word::lit(position as u128));
        let byte = match index {
            Word::Lit { value } => read_byte_at(value, &buffer),
            index => Byte::ReadByte {
                index: Box::new(index),
                buffer: Box::new(buffer.clone()),
            },
        };
        read.push(byte);
    }
    bytes::join_bytes(read)
}

/// Writes a single byte at `index` over `buffer`.
///
/// A literal byte written at a literal index into a fully known buffer
/// splices the byte string directly, zero-padding any gap; anything else
/// layers an overlay node.
#[must_use]
pub fn write_byte(index: Word, byte: Byte, buffer: Buf) -> Buf {
    match (index, byte, buffer) {
        (Word::Lit { value: index }, Byte::Lit { value: byte }, Buf::Empty)
            if within_fold_bound(index, 1) =>
        {
            let offset = index.as_usize();
            let mut bytes = vec![0u8; offset + 1];
            bytes[offset] = byte;
            Buf::Concrete { bytes }
        }
        (Word::Lit { value: index }, Byte::Lit { value: byte }, Buf::Concrete { mut bytes })
            if within_fold_bound(index, 1) =>
        {
            let offset = index.as_usize();
            if bytes.len() <= offset {
                bytes.resize(offset + 1, 0);
            }
            bytes[offset] = byte;
            Buf::Concrete { bytes }
        }
        (index, byte, buffer) => Buf::WriteByte {
            index: Box::new(index),
            byte: Box::new(byte),
            base: Box::new(buffer),
        },
    }
}

/// Writes the 32-byte big-endian encoding of `word` at `index..index + 32`
/// over `buffer`.
#[must_use]
pub fn write_word(index: Word, word: Word, buffer: Buf) -> Buf {
    match (index, word, buffer) {
        (Word::Lit { value: index }, Word::Lit { value: word }, Buf::Empty)
            if within_fold_bound(index, WORD_SIZE_BYTES as u64) =>
        {
            let mut bytes = vec![0u8; index.as_usize()];
            bytes.extend(word.to_be_bytes());
            Buf::Concrete { bytes }
        }
        (Word::Lit { value: index }, Word::Lit { value: word }, Buf::Concrete { mut bytes })
            if within_fold_bound(index, WORD_SIZE_BYTES as u64) =>
        {
            let offset = index.as_usize();
            if bytes.len() < offset + WORD_SIZE_BYTES {
                bytes.resize(offset + WORD_SIZE_BYTES, 0);
            }
            bytes[offset..offset + WORD_SIZE_BYTES].copy_from_slice(&word.to_be_bytes());
            Buf::Concrete { bytes }
        }
        (index, word, buffer) => Buf::WriteWord {
            index: Box::new(index),
            word: Box::new(word),
            base: Box::new(buffer),
        },
    }
}

/// Copies `size` bytes of `src` starting at `src_offset` onto `dst` starting
/// at `dst_offset`, leaving the rest of `dst` unchanged.
///
/// With literal offsets and a fully known destination, the copy folds to a
/// concrete buffer whenever every copied byte resolves to a literal, even
/// through overlays on the source side. Copies out of a known-empty source
/// leave a known destination untouched. Everything else builds a copy node.
#[must_use]
pub fn copy_slice(src_offset: Word, dst_offset: Word, size: Word, src: Buf, dst: Buf) -> Buf {
    if is_known_empty(&src) {
        match dst {
            Buf::Empty => return Buf::Empty,
            Buf::Concrete { bytes } => return Buf::Concrete { bytes },
            dst => return copy_slice_node(src_offset, dst_offset, size, src, dst),
        }
    }

    if let (Some(src_off), Some(dst_off), Some(size_lit)) =
        (src_offset.as_lit(), dst_offset.as_lit(), size.as_lit())
    {
        let foldable = within_fold_bound(dst_off, 0)
            && within_fold_bound(size_lit, 0)
            && within_fold_bound(dst_off.wrapping_add(size_lit), 0);
        if foldable {
            if let Some(dest) = known_bytes(&dst) {
                let length = size_lit.as_usize();
                let mut slice = Vec::with_capacity(length);
                for position in 0..length {
                    let index = src_off.wrapping_add(U256::new(position as u128));
                    match read_byte_at(index, &src) {
                        Byte::Lit { value } => slice.push(value),
                        _ => break,
                    }
                }

                if slice.len() == length {
                    let offset = dst_off.as_usize();
                    let mut bytes: Vec<u8> = dest.iter().copied().take(offset).collect();
                    bytes.resize(offset, 0);
                    bytes.extend(slice);
                    if dest.len() > offset + length {
                        bytes.extend(&dest[offset + length..]);
                    }
                    return Buf::Concrete { bytes };
                }
            }
        }
    }

    copy_slice_node(src_offset, dst_offset, size, src, dst)
}

/// Builds the symbolic copy node.
fn copy_slice_node(src_offset: Word, dst_offset: Word, size: Word, src: Buf, dst: Buf) -> Buf {
    Buf::CopySlice {
        src_offset: Box::new(src_offset),
        dst_offset: Box::new(dst_offset),
        size: Box::new(size),
        src: Box::new(src),
        dst: Box::new(dst),
    }
}

/// The length of a buffer term: literal for known buffers, a length node
/// otherwise.
#[must_use]
pub fn buf_length(buffer: Buf) -> Word {
    match buffer {
        Buf::Empty => Word::lit(0u128),
        Buf::Concrete { bytes } => Word::lit(bytes.len() as u128),
        buffer => Word::BufLength {
            buffer: Box::new(buffer),
        },
    }
}

/// Peels all write overlays off `buffer`, following the destination side of
/// copies, down to the underlying base buffer.
///
/// The base gives a lower bound on the buffer's extent, which is what
/// callers sizing a known prefix need.
#[must_use]
pub fn base(buffer: &Buf) -> &Buf {
    let mut buffer = buffer;
    loop {
        match buffer {
            Buf::WriteByte { base, .. } | Buf::WriteWord { base, .. } => buffer = base.as_ref(),
            Buf::CopySlice { dst, .. } => buffer = dst.as_ref(),
            _ => return buffer,
        }
    }
}
