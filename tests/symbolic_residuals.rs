//! This module is an integration test that drives partially symbolic data
//! through the algebra, checking that unknown inputs survive as structured
//! residual terms while everything provable still folds.
#![cfg(test)]

use evm_symbolic_algebra::{
    codec,
    ops::{logic, memory, storage},
    value::{Buf, Byte, Storage, Word},
};

#[test]
fn symbolic_calldata_loads_become_residual_reads() {
    let calldata = Buf::abstract_named("calldata");

    let selector_word = memory::read_word(Word::lit(0u128), calldata.clone());
    assert_eq!(
        selector_word,
        Word::ReadWord {
            index: Box::new(Word::lit(0u128)),
            buffer: Box::new(calldata.clone()),
        }
    );

    // The shift wraps the residual read rather than evaluating it.
    let selector = logic::shr(Word::lit(224u128), selector_word.clone());
    assert_eq!(
        selector,
        Word::Shr {
            shift: Box::new(Word::lit(224u128)),
            value: Box::new(selector_word),
        }
    );
}

#[test]
fn symbolic_stores_read_back_unchanged() {
    let deposit = Word::var("x");
    let scratch = memory::write_word(Word::lit(0u128), deposit.clone(), Buf::Empty);
    assert_eq!(memory::read_word(Word::lit(0u128), scratch), deposit);
}

#[test]
fn concrete_frames_over_symbolic_bases_resolve_where_provable() {
    // A concrete header written over fully unknown memory.
    let memory_buf = memory::write_word(
        Word::lit(0u128),
        Word::lit(0x60u128),
        Buf::abstract_named("memory"),
    );

    // Reads inside the written window resolve.
    assert_eq!(
        memory::read_byte(Word::lit(31u128), memory_buf.clone()),
        Byte::lit(0x60)
    );
    // Reads beyond it cannot: the base is unknown.
    assert!(matches!(
        memory::read_byte(Word::lit(32u128), memory_buf.clone()),
        Byte::ReadByte { .. }
    ));
    // A word read straddling the window edge picks up an unknown byte.
    assert!(matches!(
        memory::read_word(Word::lit(1u128), memory_buf),
        Word::ReadWord { .. }
    ));
}

#[test]
fn copy_windows_shield_the_destination() {
    // Unknown returndata copied into a concrete scratch space: only the
    // window is poisoned.
    let scratch = Buf::concrete(vec![0u8; 96]);
    let memory_buf = memory::copy_slice(
        Word::lit(0u128),
        Word::lit(32u128),
        Word::lit(32u128),
        Buf::abstract_named("returndata"),
        scratch,
    );

    assert_eq!(
        memory::read_byte(Word::lit(0u128), memory_buf.clone()),
        Byte::lit(0)
    );
    assert_eq!(
        memory::read_byte(Word::lit(64u128), memory_buf.clone()),
        Byte::lit(0)
    );
    let inside = memory::read_byte(Word::lit(40u128), memory_buf);
    let Byte::ReadByte { index, buffer } = inside else {
        panic!("a read inside the window must be residual");
    };
    // The read was redirected into the copy source before stopping.
    assert_eq!(*index, Word::lit(8u128));
    assert_eq!(*buffer, Buf::abstract_named("returndata"));
}

#[test]
fn storage_write_logs_are_never_dropped() {
    let state = storage::write_storage(
        Word::var("key"),
        Word::lit(1u128),
        storage::write_storage(Word::lit(0u128), Word::lit(7u128), Storage::Empty),
    );

    // The symbolic write sits on top of the folded concrete map.
    let Storage::SStore { key, value, base } = &state else {
        panic!("a symbolic write must be logged");
    };
    assert_eq!(**key, Word::var("key"));
    assert_eq!(**value, Word::lit(1u128));
    assert!(matches!(**base, Storage::Concrete { .. }));

    // Any later read has to go through the possible alias.
    let loaded = storage::read_storage(&state, &Word::lit(0u128));
    assert_eq!(
        loaded,
        Some(Word::SLoad {
            key: Box::new(Word::lit(0u128)),
            storage: Box::new(state),
        })
    );
}

#[test]
fn residual_terms_survive_the_wire_format() -> anyhow::Result<()> {
    let term = memory::read_word(
        Word::var("offset"),
        memory::write_word(
            Word::lit(0u128),
            Word::var("x"),
            Buf::abstract_named("memory"),
        ),
    );

    let decoded = codec::decode_word(&codec::encode_word(&term))?;
    assert_eq!(term, decoded);
    Ok(())
}
