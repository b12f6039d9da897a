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

use core::search::{DocIterator, NO_MORE_DOCS};
use core::util::bit_set::ImmutableBitSet;
use core::util::DocId;

use error::Result;

use std::sync::Arc;

/// A `DocIterator` over the set bits of a shared bit set.
pub struct BitSetDocIterator<T: ImmutableBitSet> {
    bits: Arc<T>,
    length: usize,
    cost: usize,
    doc: DocId,
}

impl<T: ImmutableBitSet> BitSetDocIterator<T> {
    pub fn new(bits: Arc<T>, cost: usize) -> Self {
        let length = bits.len();
        BitSetDocIterator {
            bits,
            length,
            cost,
            doc: -1,
        }
    }

    pub fn with_bits(bits: Arc<T>) -> Self {
        let cost = bits.approximate_cardinality();
        Self::new(bits, cost)
    }
}

impl<T: ImmutableBitSet> DocIterator for BitSetDocIterator<T> {
    fn doc_id(&self) -> DocId {
        self.doc
    }

    fn next(&mut self) -> Result<DocId> {
        let next = self.doc + 1;
        self.advance(next)
    }

    fn advance(&mut self, target: DocId) -> Result<DocId> {
        if target >= self.length as i32 {
            self.doc = NO_MORE_DOCS;
        } else {
            self.doc = self.bits.next_set_bit(target as usize);
        }
        Ok(self.doc)
    }

    fn cost(&self) -> usize {
        self.cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::util::bit_set::FixedBitSet;

    #[test]
    fn test_bit_set_doc_iterator() {
        let bits = Arc::new(FixedBitSet::from_docs(&[0, 3, 4, 9], 10).unwrap());
        let mut iter = BitSetDocIterator::with_bits(bits);
        assert_eq!(iter.doc_id(), -1);
        assert_eq!(iter.cost(), 4);
        assert_eq!(iter.next().unwrap(), 0);
        assert_eq!(iter.advance(1).unwrap(), 3);
        assert_eq!(iter.next().unwrap(), 4);
        assert_eq!(iter.advance(9).unwrap(), 9);
        assert_eq!(iter.next().unwrap(), NO_MORE_DOCS);
        assert_eq!(iter.doc_id(), NO_MORE_DOCS);
    }
}
