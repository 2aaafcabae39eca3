//! Subsequence-based fuzzy ranking for command palettes and file finders.
//!
//! A candidate survives a query when every query character can be found in
//! it, in order. Survivors are scored by contiguity and by how early their
//! characters appear, then ordered best first. Candidates with equal scores
//! keep their input order.
//!
//! ```
//! let items = ["apple", "application", "banana"];
//! let ranked: Vec<_> = fuzzy::rank(&items, "ap", |s| *s).iter().copied().collect();
//! assert_eq!(ranked, ["apple", "application"]);
//! ```

use tracing::trace;

/// Bonus for a character found directly after the previous match.
pub const CONTIGUITY_BONUS: f64 = 2.0;
/// Bonus every surviving candidate receives once all query characters are placed.
pub const COMPLETENESS_BONUS: f64 = 1.0;
/// Bonus for a candidate equal to the whole query.
pub const EXACT_MATCH_BONUS: f64 = 2.0;

/// Score `candidate` against `query`, case-insensitively.
///
/// Returns `None` when some query character has no un-consumed occurrence
/// left in the candidate.
pub fn score(candidate: &str, query: &str) -> Option<f64> {
    let candidate = candidate.to_lowercase();
    let query = query.to_lowercase();
    let haystack: Vec<char> = candidate.chars().collect();

    let mut score = 0.0;
    let mut next = 0usize;
    let mut matched = 0usize;
    let mut needles = 0usize;

    for needle in query.chars() {
        needles += 1;
        let found = next + haystack.get(next..)?.iter().position(|&c| c == needle)?;

        if found == next {
            score += CONTIGUITY_BONUS;
        }
        score += 1.0 / (found as f64 + 1.0);

        next = found + 1;
        matched += 1;
    }

    // Always true here: a miss returned early above.
    if matched == needles {
        score += COMPLETENESS_BONUS;
    }

    if candidate == query {
        score += EXACT_MATCH_BONUS;
    }

    Some(score)
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Scored {
    index: usize,
    score: f64,
}

/// The ordered result of [`rank`].
///
/// Scores are computed once; iterating is side-effect free and can be
/// repeated any number of times.
#[derive(Debug)]
pub struct Ranking<'a, T> {
    items: &'a [T],
    order: Vec<Scored>,
}

impl<'a, T> Ranking<'a, T> {
    /// Iterate the surviving items, best first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &'a T> + '_ {
        let items = self.items;
        self.order.iter().map(move |scored| &items[scored.index])
    }

    /// Iterate the surviving items together with their scores.
    pub fn scored(&self) -> impl ExactSizeIterator<Item = (&'a T, f64)> + '_ {
        let items = self.items;
        self.order
            .iter()
            .map(move |scored| (&items[scored.index], scored.score))
    }

    /// Positions of the surviving items in the input slice, best first.
    pub fn indices(&self) -> impl ExactSizeIterator<Item = usize> + '_ {
        self.order.iter().map(|scored| scored.index)
    }

    /// Number of surviving items.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Collect the surviving items into a vector, best first.
    pub fn to_vec(&self) -> Vec<&'a T> {
        self.iter().collect()
    }
}

impl<T> Clone for Ranking<'_, T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items,
            order: self.order.clone(),
        }
    }
}

impl<'r, 'a, T> IntoIterator for &'r Ranking<'a, T> {
    type Item = &'a T;
    type IntoIter = Box<dyn Iterator<Item = &'a T> + 'r>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Rank `items` against `query`, using `text_of` to obtain the searchable text.
///
/// Items that do not contain the query as a subsequence are dropped. The rest
/// are ordered by descending [`score`]; ties keep their input order.
pub fn rank<'a, T, F, S>(items: &'a [T], query: &str, text_of: F) -> Ranking<'a, T>
where
    F: Fn(&'a T) -> S,
    S: AsRef<str>,
{
    let mut order: Vec<Scored> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            score(text_of(item).as_ref(), query).map(|score| Scored { index, score })
        })
        .collect();

    // `sort_by` is stable, so equal scores stay in input order.
    order.sort_by(|a, b| b.score.total_cmp(&a.score));

    trace!(
        query,
        candidates = items.len(),
        survivors = order.len(),
        "ranked fuzzy candidates"
    );

    Ranking { items, order }
}
