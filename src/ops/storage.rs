//! The storage engine: point lookups and writes over storage terms.
//!
//! Writes with symbolic keys or values are kept as a log of store nodes so
//! that no information is lost before the solver sees the term. Reads walk
//! that log towards the base store, skipping writes at provably different
//! keys; a write whose key cannot be separated from the queried one stops
//! the walk with a residual load node.

use crate::value::{Storage, Word};

/// Reads `key` out of `storage`.
///
/// Returns [`None`] exactly when a concrete lookup finds no prior write:
/// against empty storage, or against fully known storage without the key.
/// Callers with an out-of-band data source treat that as the signal to fetch
/// the slot; every other case resolves to a word, possibly a residual load.
#[must_use]
pub fn read_storage(storage: &Storage, key: &Word) -> Option<Word> {
    let mut storage = storage;
    loop {
        match storage {
            Storage::Empty => return None,
            Storage::Concrete { slots } => {
                return match key.as_lit() {
                    Some(key) => slots.get(&key).map(|value| Word::lit(*value)),
                    None => Some(residual_load(key, storage)),
                };
            }
            Storage::Abstract { .. } => return Some(residual_load(key, storage)),
            Storage::SStore {
                key: written,
                value,
                base,
            } => match (written.as_lit(), key.as_lit()) {
                (Some(written), Some(wanted)) if written == wanted => {
                    return Some((**value).clone())
                }
                (Some(_), Some(_)) => storage = base.as_ref(),
                _ => return Some(residual_load(key, storage)),
            },
        }
    }
}

/// Builds the residual load node for a read that cannot be resolved.
fn residual_load(key: &Word, storage: &Storage) -> Word {
    Word::SLoad {
        key: Box::new(key.clone()),
        storage: Box::new(storage.clone()),
    }
}

/// Writes `value` at `key` over `storage`.
///
/// A literal write into known storage updates the slot map directly; any
/// symbolic part appends to the write log instead. Writes are never dropped.
#[must_use]
pub fn write_storage(key: Word, value: Word, storage: Storage) -> Storage {
    match (key, value, storage) {
        (Word::Lit { value: key }, Word::Lit { value }, Storage::Empty) => Storage::Concrete {
            slots: std::iter::once((key, value)).collect(),
        },
        (Word::Lit { value: key }, Word::Lit { value }, Storage::Concrete { mut slots }) => {
            slots.insert(key, value);
            Storage::Concrete { slots }
        }
        (key, value, storage) => Storage::SStore {
            key: Box::new(key),
            value: Box::new(value),
            base: Box::new(storage),
        },
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;

    use ethnum::U256;

    use crate::{
        ops::storage::{read_storage, write_storage},
        value::{Storage, Word},
    };

    #[test]
    fn empty_storage_reads_as_never_written() {
        assert_eq!(read_storage(&Storage::Empty, &Word::lit(3u128)), None);
    }

    #[test]
    fn concrete_misses_read_as_never_written() {
        let storage = Storage::concrete(BTreeMap::from([(U256::new(1), U256::new(9))]));
        assert_eq!(read_storage(&storage, &Word::lit(1u128)), Some(Word::lit(9u128)));
        assert_eq!(read_storage(&storage, &Word::lit(2u128)), None);
    }

    #[test]
    fn literal_writes_fold_into_the_slot_map() {
        let storage = write_storage(Word::lit(7u128), Word::lit(9u128), Storage::Empty);
        assert_eq!(
            storage,
            Storage::concrete(BTreeMap::from([(U256::new(7), U256::new(9))]))
        );

        let storage = write_storage(Word::lit(7u128), Word::lit(10u128), storage);
        assert_eq!(read_storage(&storage, &Word::lit(7u128)), Some(Word::lit(10u128)));
    }

    #[test]
    fn reads_skip_writes_at_different_keys() {
        let storage = write_storage(
            Word::lit(7u128),
            Word::lit(9u128),
            write_storage(Word::lit(3u128), Word::lit(5u128), Storage::Empty),
        );

        assert_eq!(read_storage(&storage, &Word::lit(3u128)), Some(Word::lit(5u128)));
        assert_eq!(read_storage(&storage, &Word::lit(7u128)), Some(Word::lit(9u128)));
        assert_eq!(read_storage(&storage, &Word::lit(4u128)), None);
    }

    #[test]
    fn reads_skip_logged_writes_at_different_literal_keys() {
        // A symbolic value forces the write into the log, but its key is
        // still provably different from the queried one.
        let storage = write_storage(Word::lit(7u128), Word::var("v"), Storage::Empty);
        assert!(matches!(storage, Storage::SStore { .. }));
        assert_eq!(read_storage(&storage, &Word::lit(3u128)), None);
        assert_eq!(read_storage(&storage, &Word::lit(7u128)), Some(Word::var("v")));
    }

    #[test]
    fn symbolic_keys_cannot_be_skipped() {
        let storage = write_storage(Word::var("k"), Word::lit(1u128), Storage::Empty);
        let loaded = read_storage(&storage, &Word::lit(3u128));
        assert_eq!(
            loaded,
            Some(Word::SLoad {
                key: Box::new(Word::lit(3u128)),
                storage: Box::new(storage),
            })
        );
    }

    #[test]
    fn abstract_storage_always_loads_symbolically() {
        let storage = Storage::abstract_named("state");
        let loaded = read_storage(&storage, &Word::lit(3u128));
        assert_eq!(
            loaded,
            Some(Word::SLoad {
                key: Box::new(Word::lit(3u128)),
                storage: Box::new(storage),
            })
        );
    }

    #[test]
    fn symbolic_reads_of_concrete_storage_stay_symbolic() {
        let storage = Storage::concrete(BTreeMap::from([(U256::new(1), U256::new(9))]));
        let loaded = read_storage(&storage, &Word::var("k"));
        assert_eq!(
            loaded,
            Some(Word::SLoad {
                key: Box::new(Word::var("k")),
                storage: Box::new(storage),
            })
        );
    }

    #[test]
    fn residual_loads_wrap_the_remaining_log() {
        // The top write has a different literal key and is skipped; the walk
        // stops at the symbolic write below it.
        let below = write_storage(Word::var("k"), Word::lit(1u128), Storage::Empty);
        let storage = write_storage(Word::lit(9u128), Word::lit(2u128), below.clone());

        let loaded = read_storage(&storage, &Word::lit(3u128));
        assert_eq!(
            loaded,
            Some(Word::SLoad {
                key: Box::new(Word::lit(3u128)),
                storage: Box::new(below),
            })
        );
    }
}
