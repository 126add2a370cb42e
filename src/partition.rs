//! Splitting an issue sequence into contiguous chunks, one per output file.

use std::ops::Range;

/// Splits `[0, len)` into ordered, non-overlapping ranges of at most
/// `chunk_size` elements. Only the final range may be shorter. An empty
/// sequence yields no ranges.
///
/// `chunk_size` of zero is a programming error; config validation rejects it
/// before this is ever reached.
pub fn partition(len: usize, chunk_size: usize) -> Vec<Range<usize>> {
    assert!(chunk_size > 0, "partition chunk_size must be positive");

    let mut ranges = Vec::with_capacity(len.div_ceil(chunk_size));
    let mut start = 0;
    while start < len {
        let end = usize::min(start + chunk_size, len);
        ranges.push(start..end);
        start = end;
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_with_short_tail() {
        assert_eq!(partition(5, 2), vec![0..2, 2..4, 4..5]);
    }

    #[test]
    fn exact_multiple_has_no_short_tail() {
        assert_eq!(partition(4, 2), vec![0..2, 2..4]);
    }

    #[test]
    fn empty_sequence_yields_no_ranges() {
        assert_eq!(partition(0, 2), Vec::<Range<usize>>::new());
    }

    #[test]
    fn single_chunk_when_under_limit() {
        assert_eq!(partition(3, 10), vec![0..3]);
    }

    #[test]
    fn ranges_are_contiguous_and_cover_the_sequence() {
        for len in 0..50 {
            for chunk in 1..10 {
                let ranges = partition(len, chunk);
                let mut expected_start = 0;
                for r in &ranges {
                    assert_eq!(r.start, expected_start);
                    assert!(r.end > r.start);
                    assert!(r.end - r.start <= chunk);
                    expected_start = r.end;
                }
                assert_eq!(expected_start, len);
                // Only the final range may fall short of the chunk size.
                for r in ranges.iter().rev().skip(1) {
                    assert_eq!(r.end - r.start, chunk);
                }
            }
        }
    }

    #[test]
    #[should_panic(expected = "chunk_size must be positive")]
    fn zero_chunk_size_panics() {
        partition(5, 0);
    }
}
