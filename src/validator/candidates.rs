use std::borrow::Cow;

use crate::parser::preprocess::{has_escaped_underscores, unescape_underscores};

/// Alternative spellings of one query, tried in order until one parses.
///
/// Yields the query unchanged, then (only if it contains `\_`) the query with
/// every `\_` unescaped. Variants are produced lazily; clone the iterator to
/// restart the sequence.
#[derive(Debug, Clone)]
pub struct QueryCandidates<'a> {
    sql: &'a str,
    next: usize,
}

impl<'a> QueryCandidates<'a> {
    /// Candidate sequence for `sql`.
    pub fn new(sql: &'a str) -> Self {
        Self { sql, next: 0 }
    }
}

impl<'a> Iterator for QueryCandidates<'a> {
    type Item = Cow<'a, str>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let step = self.next;
            self.next = (step + 1).min(2);
            match step {
                0 => return Some(Cow::Borrowed(self.sql)),
                1 if has_escaped_underscores(self.sql) => {
                    return Some(Cow::Owned(unescape_underscores(self.sql)))
                }
                1 => continue,
                _ => return None,
            }
        }
    }
}
