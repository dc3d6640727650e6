//! This module is an integration test that drives fully concrete data
//! through the algebra the way an interpreter would during a call, checking
//! that every intermediate result folds to a literal.
#![cfg(test)]

use ethnum::U256;
use evm_symbolic_algebra::{
    ops::{arithmetic, logic, memory, storage},
    value::{Buf, Byte, Storage, Word},
};

/// Builds the calldata for a `transfer(address,uint256)` call.
fn transfer_calldata(recipient: [u8; 20], amount: u128) -> Vec<u8> {
    let mut calldata = vec![0xa9, 0x05, 0x9c, 0xbb];
    let mut padded = [0u8; 32];
    padded[12..].copy_from_slice(&recipient);
    calldata.extend(padded);
    calldata.extend(U256::new(amount).to_be_bytes());
    calldata
}

#[test]
fn decodes_a_transfer_call_without_residual_terms() {
    let recipient = [0x11u8; 20];
    let calldata = Buf::concrete(transfer_calldata(recipient, 500));

    // The selector load: the first four calldata bytes, right-aligned.
    let selector = memory::read_bytes(4, Word::lit(0u128), calldata.clone());
    assert_eq!(selector, Word::lit(0xa905_9cbbu128));

    // The dispatcher's way of getting the same value: load a full word and
    // shift the tail away.
    let shifted = logic::shr(
        Word::lit(224u128),
        memory::read_word(Word::lit(0u128), calldata.clone()),
    );
    assert_eq!(shifted, selector);

    // Argument loads skip the selector.
    let to = memory::read_word(Word::lit(4u128), calldata.clone());
    assert_eq!(to, Word::lit_addr(recipient));
    let amount = memory::read_word(Word::lit(36u128), calldata.clone());
    assert_eq!(amount, Word::lit(500u128));

    // The interpreter stages calldata into memory before hashing it; the
    // staged copy still reads back literally.
    let staged = memory::copy_slice(
        Word::lit(4u128),
        Word::lit(0u128),
        Word::lit(64u128),
        calldata,
        Buf::Empty,
    );
    assert!(matches!(staged, Buf::Concrete { .. }));
    assert_eq!(memory::read_word(Word::lit(0u128), staged), to);
}

#[test]
fn a_balance_update_stays_concrete_end_to_end() {
    let slot = Word::lit(3u128);
    let state = storage::write_storage(slot.clone(), Word::lit(1000u128), Storage::Empty);

    // Read, debit, and write back.
    let balance = storage::read_storage(&state, &slot).expect("the slot was just written");
    let debited = arithmetic::sub(balance, Word::lit(400u128));
    assert_eq!(debited, Word::lit(600u128));
    let state = storage::write_storage(slot.clone(), debited, state);

    assert_eq!(storage::read_storage(&state, &slot), Some(Word::lit(600u128)));
    // Untouched slots still read as never written, concretely.
    assert_eq!(storage::read_storage(&state, &Word::lit(4u128)), None);
}

#[test]
fn literal_leaves_fold_through_every_operation_layer() {
    // A little program over literals only: the result of every layer must
    // be a literal, no matter how the layers nest.
    let buffer = memory::write_word(
        Word::lit(0u128),
        arithmetic::mul(Word::lit(6u128), Word::lit(7u128)),
        memory::write_byte(Word::lit(63u128), Byte::lit(0x05), Buf::Empty),
    );
    let word = memory::read_word(Word::lit(0u128), buffer.clone());
    assert_eq!(word, Word::lit(42u128));

    let length = memory::buf_length(buffer.clone());
    assert_eq!(length, Word::lit(64u128));

    let mixed = arithmetic::addmod(
        word,
        memory::read_word(Word::lit(32u128), buffer),
        Word::lit(7u128),
    );
    // 42 + 5 = 47 ≡ 5 (mod 7)
    assert_eq!(mixed, Word::lit(5u128));

    assert_eq!(
        logic::iszero(logic::eq(mixed, Word::lit(5u128))),
        Word::lit(0u128)
    );
}

#[test]
fn copies_compose_with_writes_under_reads() {
    // Scatter two regions into memory, then gather a slice across both.
    let part_one = Buf::concrete(vec![0xaa, 0xbb]);
    let part_two = Buf::concrete(vec![0xcc, 0xdd]);

    let memory_buf = memory::copy_slice(
        Word::lit(0u128),
        Word::lit(0u128),
        Word::lit(2u128),
        part_one,
        Buf::Empty,
    );
    let memory_buf = memory::copy_slice(
        Word::lit(0u128),
        Word::lit(2u128),
        Word::lit(2u128),
        part_two,
        memory_buf,
    );

    assert_eq!(memory_buf, Buf::concrete(vec![0xaa, 0xbb, 0xcc, 0xdd]));

    let gathered = memory::read_bytes(4, Word::lit(0u128), memory_buf);
    assert_eq!(gathered, Word::lit(0xaabb_ccddu128));
}
