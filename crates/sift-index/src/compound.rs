//! Dictionary decompounding of query terms.
//!
//! Names like `DownloadHelper` index as one token, so a query for them never reaches
//! documents that spell the words apart. A compound term is split into two words that
//! both occur in the index.

/// Splits `term` into two known words of at least `min_part` characters.
///
/// The longest known head wins, so `downloadhelper` splits as `download` + `helper`
/// even when `down` is also a word.
pub fn split_compound<'a>(
    term: &'a str,
    min_part: usize,
    is_word: impl Fn(&str) -> bool,
) -> Option<(&'a str, &'a str)> {
    let min_part = min_part.max(1);
    let boundaries: Vec<usize> = term.char_indices().map(|(i, _)| i).collect();
    let chars = boundaries.len();
    if chars < 2 * min_part {
        return None;
    }

    boundaries[min_part..=chars - min_part]
        .iter()
        .rev()
        .map(|&at| term.split_at(at))
        .find(|(head, tail)| is_word(head) && is_word(tail))
}
