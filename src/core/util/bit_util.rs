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

/// Returns the number of set bits in an array of longs.
pub fn pop_array(arr: &[i64], word_offset: usize, num_words: usize) -> usize {
    let mut pop_count = 0usize;
    for a in arr.iter().skip(word_offset).take(num_words) {
        pop_count += a.count_ones() as usize;
    }
    pop_count
}

/// returns the number of 64 bit words it would take to hold num_bits
#[inline]
pub fn bits2words(num_bits: usize) -> usize {
    if num_bits == 0 {
        0
    } else {
        ((num_bits - 1) >> 6) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_for_bits() {
        assert_eq!(bits2words(0), 0);
        assert_eq!(bits2words(1), 1);
        assert_eq!(bits2words(64), 1);
        assert_eq!(bits2words(65), 2);
        assert_eq!(pop_array(&[0b1011, -1, 1], 1, 2), 65);
    }
}
