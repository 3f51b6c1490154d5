use serde::{Deserialize, Serialize};

const WORD_BITS: usize = u64::BITS as usize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
///
/// Set of activity IDs, stored as a bit-vector
///
/// Trailing empty words are never stored, so equal sets have equal representations.
pub struct ActivitySet {
    words: Vec<u64>,
}

impl ActivitySet {
    /// Create an empty set
    pub fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// All activities `1..alphabet_len` (i.e., everything except the start/end marker)
    pub fn full(alphabet_len: usize) -> Self {
        (1..alphabet_len).collect()
    }

    /// Insert an activity, returns `true` if it was not contained before
    pub fn insert(&mut self, id: usize) -> bool {
        let (word, bit) = (id / WORD_BITS, id % WORD_BITS);
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        let was_contained = self.words[word] & (1u64 << bit) != 0;
        self.words[word] |= 1u64 << bit;
        !was_contained
    }

    /// Remove an activity, returns `true` if it was contained
    pub fn remove(&mut self, id: usize) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.words[id / WORD_BITS] &= !(1u64 << (id % WORD_BITS));
        self.normalize();
        true
    }

    /// Check if an activity is contained
    pub fn contains(&self, id: usize) -> bool {
        self.words
            .get(id / WORD_BITS)
            .is_some_and(|w| w & (1u64 << (id % WORD_BITS)) != 0)
    }

    /// Number of contained activities
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// `true` if no activity is contained
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Check if `self ⊆ other`
    pub fn is_subset(&self, other: &ActivitySet) -> bool {
        self.words.iter().enumerate().all(|(i, w)| {
            let o = other.words.get(i).copied().unwrap_or(0);
            w & !o == 0
        })
    }

    /// Check if `self ⊇ other`
    pub fn is_superset(&self, other: &ActivitySet) -> bool {
        other.is_subset(self)
    }

    /// Set union
    pub fn union(&self, other: &ActivitySet) -> ActivitySet {
        let len = self.words.len().max(other.words.len());
        let words = (0..len)
            .map(|i| {
                self.words.get(i).copied().unwrap_or(0) | other.words.get(i).copied().unwrap_or(0)
            })
            .collect();
        ActivitySet { words }
    }

    /// All activities of `1..alphabet_len` not contained in this set
    pub fn complement(&self, alphabet_len: usize) -> ActivitySet {
        (1..alphabet_len).filter(|id| !self.contains(*id)).collect()
    }

    /// Iterate over the contained activities (ascending)
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, w)| {
            (0..WORD_BITS)
                .filter(move |bit| w & (1u64 << bit) != 0)
                .map(move |bit| i * WORD_BITS + bit)
        })
    }

    fn normalize(&mut self) {
        while self.words.last() == Some(&0) {
            self.words.pop();
        }
    }
}

impl FromIterator<usize> for ActivitySet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = ActivitySet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Which end of the inclusion order an [`ActivitySetFamily`] keeps
pub enum Antichain {
    /// Keep inclusion-minimal sets (a new set evicts its supersets)
    Minimal,
    /// Keep inclusion-maximal sets (a new set evicts its subsets)
    Maximal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
///
/// Family of [`ActivitySet`]s that is kept an antichain under set inclusion
///
/// No two members are ever comparable under ⊆. Members are kept in insertion order.
pub struct ActivitySetFamily {
    orientation: Antichain,
    sets: Vec<ActivitySet>,
}

impl ActivitySetFamily {
    /// Create an empty family keeping inclusion-minimal sets
    pub fn minimal() -> Self {
        Self {
            orientation: Antichain::Minimal,
            sets: Vec::new(),
        }
    }

    /// Create an empty family keeping inclusion-maximal sets
    pub fn maximal() -> Self {
        Self {
            orientation: Antichain::Maximal,
            sets: Vec::new(),
        }
    }

    /// Orientation of this family
    pub fn orientation(&self) -> Antichain {
        self.orientation
    }

    /// Check if some member makes `candidate` redundant
    ///
    /// For [`Antichain::Minimal`] this is a member `m ⊆ candidate`, for [`Antichain::Maximal`] a member `m ⊇ candidate`.
    pub fn is_dominated(&self, candidate: &ActivitySet) -> bool {
        self.sets.iter().any(|m| Self::dominates(self.orientation, m, candidate))
    }

    /// Insert a candidate
    ///
    /// Returns `false` (and leaves the family unchanged) if the candidate is dominated.
    /// Otherwise all members dominated by the candidate are discarded and the candidate is added.
    pub fn insert(&mut self, candidate: ActivitySet) -> bool {
        if self.is_dominated(&candidate) {
            return false;
        }
        let orientation = self.orientation;
        self.sets.retain(|m| !Self::dominates(orientation, &candidate, m));
        self.sets.push(candidate);
        true
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// `true` if there are no members
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Iterate over the members (in insertion order)
    pub fn iter(&self) -> impl Iterator<Item = &ActivitySet> + '_ {
        self.sets.iter()
    }

    /// Consume into the members
    pub fn into_vec(self) -> Vec<ActivitySet> {
        self.sets
    }

    fn dominates(orientation: Antichain, member: &ActivitySet, candidate: &ActivitySet) -> bool {
        match orientation {
            Antichain::Minimal => member.is_subset(candidate),
            Antichain::Maximal => member.is_superset(candidate),
        }
    }
}
