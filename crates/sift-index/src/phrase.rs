//! Sloppy phrase matching over token positions.
//!
//! A phrase of `n` tokens matches when every token can be given a distinct position in
//! the field such that the shifts `position - index` span at most `slop`. An inserted
//! word shifts the tokens after it by one; swapping two neighbours spans two.

use std::collections::BTreeSet;

/// Whether some choice of one position per phrase token satisfies the slop.
///
/// `positions[i]` lists the field positions of the `i`-th phrase token.
pub fn within_slop(positions: &[Vec<u32>], slop: u32) -> bool {
    if positions.is_empty() || positions.iter().any(Vec::is_empty) {
        return false;
    }

    let starts: BTreeSet<i64> = positions
        .iter()
        .zip(0_i64..)
        .flat_map(|(candidates, index)| candidates.iter().map(move |&p| i64::from(p) - index))
        .collect();

    let mut used = Vec::with_capacity(positions.len());
    starts.into_iter().any(|low| {
        used.clear();
        assign(positions, 0, low, low + i64::from(slop), &mut used)
    })
}

/// Picks distinct positions for tokens `index..` whose shifts fall in `low..=high`.
fn assign(positions: &[Vec<u32>], index: usize, low: i64, high: i64, used: &mut Vec<u32>) -> bool {
    let Some(candidates) = positions.get(index) else {
        return true;
    };
    let Ok(shift) = i64::try_from(index) else {
        return false;
    };

    for &position in candidates {
        let offset = i64::from(position) - shift;
        if offset < low || offset > high || used.contains(&position) {
            continue;
        }
        used.push(position);
        if assign(positions, index + 1, low, high, used) {
            return true;
        }
        used.pop();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_tokens_match_without_slop() {
        // "merge windows" in "merge windows"
        assert!(within_slop(&[vec![0], vec![1]], 0));
    }

    #[test]
    fn inserted_word_needs_slop_one() {
        // "merge windows" in "merge all windows"
        let positions = [vec![0], vec![2]];
        assert!(!within_slop(&positions, 0));
        assert!(within_slop(&positions, 1));
    }

    #[test]
    fn one_insertion_inside_a_long_phrase() {
        // "open image in new tab" in "open image in a new tab"
        let positions = [vec![0], vec![1], vec![2], vec![4], vec![5]];
        assert!(within_slop(&positions, 1));
        assert!(!within_slop(&positions, 0));
    }

    #[test]
    fn swapped_tokens_need_slop_two() {
        // "windows merge" in "merge windows"
        let positions = [vec![1], vec![0]];
        assert!(!within_slop(&positions, 1));
        assert!(within_slop(&positions, 2));
    }

    #[test]
    fn repeated_token_needs_distinct_positions() {
        // "tab tab" against a name with a single "tab"
        assert!(!within_slop(&[vec![3], vec![3]], 4));
        assert!(within_slop(&[vec![3, 4], vec![3, 4]], 0));
    }

    #[test]
    fn later_occurrence_can_satisfy_phrase() {
        // "new tab" in "tab for a new tab"
        let positions = [vec![3], vec![0, 4]];
        assert!(within_slop(&positions, 0));
    }

    #[test]
    fn missing_token_never_matches() {
        assert!(!within_slop(&[vec![0], Vec::new()], 5));
        assert!(!within_slop(&[], 5));
    }
}
