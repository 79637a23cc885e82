//! Sorted, deduplicated set of header names.
//!
//! A [`SortedSet`] is built once from the configured allow-list and then only
//! read. Its main job is [`SortedSet::subsumes`], which checks the value of an
//! `Access-Control-Request-Headers` field in a single pass. Browsers send that
//! value as lowercase names, sorted and deduplicated, joined by commas; so a
//! well-formed value maps to a strictly increasing sequence of ranks.

use std::collections::HashMap;
use std::fmt;

/// A set of strings sorted in lexicographical (byte) order.
///
/// Each element has a unique rank in `0..len()`. The default value is the
/// empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortedSet {
    ranks: HashMap<Box<str>, usize>,
    max_len: usize,
}

impl SortedSet {
    /// Builds a set that contains all of `elems` and nothing else.
    ///
    /// Duplicates are collapsed.
    pub fn new<I, S>(elems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sorted: Vec<&str> = Vec::new();
        let owned: Vec<S> = elems.into_iter().collect();
        sorted.extend(owned.iter().map(AsRef::as_ref));
        sorted.sort_unstable();
        sorted.dedup();

        let mut ranks = HashMap::with_capacity(sorted.len());
        let mut max_len = 0;
        for (rank, elem) in sorted.into_iter().enumerate() {
            max_len = max_len.max(elem.len());
            ranks.insert(Box::from(elem), rank);
        }
        Self { ranks, max_len }
    }

    /// Cardinality of the set.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Reports whether `csv` is a sequence of comma-separated names that are
    /// all elements of the set, sorted, and unique.
    ///
    /// The empty string is subsumed by every set.
    ///
    /// At most `max_len + 1` leading bytes of the remaining input are scanned
    /// for a comma per iteration, so an oversized name costs no more than a
    /// short one to reject.
    #[must_use]
    pub fn subsumes(&self, csv: &str) -> bool {
        if csv.is_empty() {
            return true;
        }
        let chunk_size = self.max_len + 1;
        let mut last_rank: Option<usize> = None;
        let mut rest = csv;
        loop {
            let (name, after) = cut_at_comma(rest, chunk_size);
            if name.len() > self.max_len {
                return false;
            }
            let Some(&rank) = self.ranks.get(name) else {
                return false;
            };
            // ranks must strictly increase: this rejects both unsorted input
            // and repeated names
            if last_rank.is_some_and(|last| rank <= last) {
                return false;
            }
            last_rank = Some(rank);
            match after {
                Some(after) => rest = after,
                None => return true,
            }
        }
    }

    fn elems_by_rank(&self) -> Vec<&str> {
        let mut elems = vec![""; self.ranks.len()];
        for (elem, &rank) in &self.ranks {
            elems[rank] = elem;
        }
        elems
    }
}

/// Joins the elements in rank order with a single comma.
impl fmt::Display for SortedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, elem) in self.elems_by_rank().into_iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(elem)?;
        }
        Ok(())
    }
}

impl<S: AsRef<str>> FromIterator<S> for SortedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Splits `s` around the first comma among its first `n` bytes.
///
/// Returns `(s, None)` when no comma appears in that window.
#[inline]
fn cut_at_comma(s: &str, n: usize) -> (&str, Option<&str>) {
    let end = s.len().min(n);
    match s.as_bytes()[..end].iter().position(|&b| b == b',') {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    }
}
