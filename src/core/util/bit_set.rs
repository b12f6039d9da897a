// Copyright 2019 Zhizhesihai (Beijing) Technology Limited.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// See the License for the specific language governing permissions and
// limitations under the License.

use core::search::NO_MORE_DOCS;
use core::util::bit_util::{self, bits2words};
use core::util::{Bits, DocId};

use error::{ErrorKind, Result};

pub trait ImmutableBitSet: Bits {
    /// Return the number of bits that are set.
    /// this method is likely to run in linear time
    fn cardinality(&self) -> usize;

    fn approximate_cardinality(&self) -> usize {
        self.cardinality()
    }

    /// Returns the index of the first set bit starting at the index specified.
    /// `NO_MORE_DOCS` is returned if there are no more set bits.
    fn next_set_bit(&self, index: usize) -> DocId;

    /// Returns the index of the last set bit before or on the index specified.
    /// -1 is returned if there are no more set bits.
    fn prev_set_bit(&self, index: usize) -> DocId;
}

pub struct BitSetIterator<'a, S> {
    bit_set: &'a S,
    current: i32,
}

impl<'a, S: ImmutableBitSet> BitSetIterator<'a, S> {
    pub fn new(bit_set: &'a S) -> Self {
        Self {
            bit_set,
            current: -1,
        }
    }
}

impl<'a, S: ImmutableBitSet + 'a> Iterator for BitSetIterator<'a, S> {
    type Item = i32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current + 1 >= self.bit_set.len() as i32 {
            None
        } else {
            self.current = self.bit_set.next_set_bit((self.current + 1) as usize);
            if self.current == NO_MORE_DOCS {
                None
            } else {
                Some(self.current)
            }
        }
    }
}

/// Base implementation for a bit set.
pub trait BitSet: ImmutableBitSet {
    fn set(&mut self, i: usize);
}

/// BitSet of fixed length (num_bits), backed by accessible `bits`
/// Vec<i64>, accessed with an int index, implementing `Bits`.
///
/// Parent document sets of a segment are kept in this form: one bit per
/// document, set for every root document of a nested block.
#[derive(Clone, Debug)]
pub struct FixedBitSet {
    // Array of longs holding the bits
    pub bits: Vec<i64>,
    // The number of bits in use
    pub num_bits: usize,
    // The exact number of longs needed to hold num_bits (<= bits.len())
    pub num_words: usize,
}

impl Default for FixedBitSet {
    fn default() -> Self {
        FixedBitSet {
            bits: Vec::with_capacity(0),
            num_bits: 0,
            num_words: 0,
        }
    }
}

impl FixedBitSet {
    /// Creates a new FixedBitSet.
    /// The internally allocated long array will be exactly the size needed to accommodate the
    /// num_bits specified.
    pub fn new(num_bits: usize) -> FixedBitSet {
        let num_words = bits2words(num_bits);
        let bits = vec![0; num_words];
        FixedBitSet {
            num_bits,
            bits,
            num_words,
        }
    }

    /// Builds a set of `num_bits` bits with every listed doc set.
    pub fn from_docs(docs: &[DocId], num_bits: usize) -> Result<FixedBitSet> {
        let mut set = FixedBitSet::new(num_bits);
        for &doc in docs {
            if doc < 0 || doc as usize >= num_bits {
                bail!(ErrorKind::IllegalArgument(format!(
                    "doc {} out of bounds for a bit set of {} bits",
                    doc, num_bits
                )));
            }
            set.set(doc as usize);
        }
        Ok(set)
    }
}

impl ImmutableBitSet for FixedBitSet {
    fn cardinality(&self) -> usize {
        bit_util::pop_array(&self.bits, 0, self.num_words)
    }

    fn next_set_bit(&self, index: usize) -> DocId {
        // Depends on the ghost bits being clear!
        debug_assert!(index < self.num_bits);
        let mut i = index >> 6;
        // skip all the bits to the right of index
        let word = self.bits[i] >> (index & 0x3fusize);

        if word != 0 {
            return (index as u32 + word.trailing_zeros()) as i32;
        }

        loop {
            i += 1;
            if i >= self.num_words {
                break;
            }
            let word = self.bits[i];
            if word != 0 {
                return ((i << 6) as u32 + word.trailing_zeros()) as i32;
            }
        }
        NO_MORE_DOCS
    }

    fn prev_set_bit(&self, index: usize) -> DocId {
        debug_assert!(index < self.num_bits);
        let mut i = index >> 6;
        let sub_index = index & 0x3fusize;
        // skip all the bits to the left of index
        let word = self.bits[i] << (63 - sub_index);

        if word != 0 {
            return ((i << 6) + sub_index) as i32 - word.leading_zeros() as i32;
        }

        while i > 0 {
            i -= 1;
            let word = self.bits[i];
            if word != 0 {
                return ((i << 6) + 63) as i32 - word.leading_zeros() as i32;
            }
        }
        -1
    }
}

impl BitSet for FixedBitSet {
    #[inline]
    fn set(&mut self, index: usize) {
        debug_assert!(index < self.num_bits);
        let word_num = index >> 6;
        let mask = 1i64 << (index & 0x3fusize);
        self.bits[word_num] |= mask;
    }
}

impl Bits for FixedBitSet {
    #[inline]
    fn get(&self, index: usize) -> Result<bool> {
        debug_assert!(index < self.num_bits);
        let i = index >> 6; // div 64
        let mask = 1i64 << (index & 0x3fusize);
        Ok(self.bits[i] & mask != 0)
    }

    fn len(&self) -> usize {
        self.num_bits
    }
}
