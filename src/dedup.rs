//! Span-name deduplication.

use crate::span::Span;
use std::collections::HashMap;

/// Deduplicate span names in a trace by appending an index number to
/// every occurrence of a duplicated name.
///
/// Names that occur exactly once are left untouched. A name occurring
/// more than once is rewritten to `{name}_{k}` with `k` counting from 1
/// in original sequence order, so the first duplicate also gets a
/// suffix:
///
/// ```text
/// ["red", "red"]         -> ["red_1", "red_2"]
/// ["red", "red", "blue"] -> ["red_1", "red_2", "blue"]
/// ```
///
/// Spans are renamed in place to avoid copying; the pre-rename name
/// stays readable through [`Span::original_name`]. Callers must ensure
/// no other writer mutates the same spans' names concurrently.
pub fn deduplicate_span_names(spans: &mut [Span]) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for span in spans.iter() {
        *counts.entry(span.name()).or_insert(0) += 1;
    }
    // Apply renaming only for duplicated names; the map value becomes
    // the next index to assign.
    let mut next_index: HashMap<String, usize> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, _)| (name.to_string(), 1))
        .collect();

    for span in spans.iter_mut() {
        let renamed = match next_index.get_mut(span.name()) {
            Some(index) => {
                let renamed = format!("{}_{}", span.name(), index);
                *index += 1;
                renamed
            }
            None => continue,
        };
        span.rename(renamed);
    }
}
