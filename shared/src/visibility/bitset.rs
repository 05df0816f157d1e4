use crate::identity::observable_id::ObservableId;

/// Fixed-size table of one flag per observable identity, indexed directly
/// by `ObservableId`. Never resizes after construction.
pub trait VisibilityBitset {
    fn with_capacity(capacity: usize) -> Self
    where
        Self: Sized;

    fn capacity(&self) -> usize;

    /// Returns false for identities outside of the table
    fn get(&self, id: ObservableId) -> bool;

    /// Sets the flag and returns its previous value
    fn set(&mut self, id: ObservableId, value: bool) -> bool;

    fn clear(&mut self);

    fn count(&self) -> usize;

    fn iter_ones(&self) -> Box<dyn Iterator<Item = ObservableId> + '_>;
}

// PackedBitset
#[derive(Clone, Debug)]
pub struct PackedBitset {
    words: Vec<u64>,
    capacity: usize,
}

impl PackedBitset {
    fn locate(id: ObservableId) -> (usize, u64) {
        let index = id.index();
        (index / 64, 1u64 << (index % 64))
    }
}

impl VisibilityBitset for PackedBitset {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(64)],
            capacity,
        }
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn get(&self, id: ObservableId) -> bool {
        if id.index() >= self.capacity {
            return false;
        }
        let (word, mask) = Self::locate(id);
        self.words[word] & mask != 0
    }

    fn set(&mut self, id: ObservableId, value: bool) -> bool {
        if id.index() >= self.capacity {
            panic!(
                "Observable identity {} is outside of a bitset of capacity {}",
                id, self.capacity
            );
        }
        let (word, mask) = Self::locate(id);
        let previous = self.words[word] & mask != 0;
        if value {
            self.words[word] |= mask;
        } else {
            self.words[word] &= !mask;
        }
        previous
    }

    fn clear(&mut self) {
        self.words.iter_mut().for_each(|word| *word = 0);
    }

    fn count(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    fn iter_ones(&self) -> Box<dyn Iterator<Item = ObservableId> + '_> {
        Box::new(
            self.words
                .iter()
                .enumerate()
                .flat_map(|(word_index, word)| {
                    let word = *word;
                    (0..64usize)
                        .filter(move |bit| word & (1u64 << bit) != 0)
                        .map(move |bit| word_index * 64 + bit)
                })
                .map(|index| ObservableId::new(index as u16)),
        )
    }
}

// ByteBitset
/// One byte per identity. Larger than `PackedBitset` but each flag is a
/// plain load and store.
#[derive(Clone, Debug)]
pub struct ByteBitset {
    flags: Vec<bool>,
}

impl VisibilityBitset for ByteBitset {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            flags: vec![false; capacity],
        }
    }

    fn capacity(&self) -> usize {
        self.flags.len()
    }

    fn get(&self, id: ObservableId) -> bool {
        self.flags.get(id.index()).copied().unwrap_or(false)
    }

    fn set(&mut self, id: ObservableId, value: bool) -> bool {
        let capacity = self.flags.len();
        let Some(flag) = self.flags.get_mut(id.index()) else {
            panic!(
                "Observable identity {} is outside of a bitset of capacity {}",
                id, capacity
            );
        };
        std::mem::replace(flag, value)
    }

    fn clear(&mut self) {
        self.flags.iter_mut().for_each(|flag| *flag = false);
    }

    fn count(&self) -> usize {
        self.flags.iter().filter(|flag| **flag).count()
    }

    fn iter_ones(&self) -> Box<dyn Iterator<Item = ObservableId> + '_> {
        Box::new(
            self.flags
                .iter()
                .enumerate()
                .filter(|(_, flag)| **flag)
                .map(|(index, _)| ObservableId::new(index as u16)),
        )
    }
}
