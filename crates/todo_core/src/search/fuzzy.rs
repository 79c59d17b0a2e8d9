//! Typo-tolerant title search.
//!
//! # Responsibility
//! - Score task titles against a free-text query.
//! - Rank, filter and cap the scored candidates.
//!
//! # Invariants
//! - Scores are in `[0, 1]`.
//! - A query contained in the title scores at least `SUBSTRING_SCORE`.
//! - Ordering is by descending score; equal scores keep collection order.

use crate::model::task::Task;
use std::collections::HashMap;

/// Default maximum number of hits.
pub const DEFAULT_LIMIT: usize = 7;
/// Default minimum score a candidate needs to be returned.
pub const DEFAULT_SCORE_CUTOFF: f64 = 0.55;
/// Floor applied when the query is a literal substring of the title.
pub const SUBSTRING_SCORE: f64 = 0.9;

// Sequences at least this long get popular characters excluded from match seeding.
const AUTOJUNK_MIN_LEN: usize = 200;

/// Search options for fuzzy title matching.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// User query text. Blank text yields no hits.
    pub text: String,
    /// Maximum number of hits to return.
    pub limit: usize,
    /// Candidates scoring below this are dropped.
    pub score_cutoff: f64,
}

impl SearchQuery {
    /// Creates a query with default limit and cutoff.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            limit: DEFAULT_LIMIT,
            score_cutoff: DEFAULT_SCORE_CUTOFF,
        }
    }
}

/// Single ranked hit.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskMatch {
    pub task: Task,
    pub score: f64,
}

/// Scores every task title and returns ranked hits.
pub fn search_tasks(tasks: &[Task], query: &SearchQuery) -> Vec<TaskMatch> {
    let needle = query.text.trim().to_lowercase();
    if needle.is_empty() || query.limit == 0 {
        return Vec::new();
    }

    let mut hits = tasks
        .iter()
        .filter_map(|task| {
            let score = title_score(&needle, &task.title.to_lowercase());
            (score >= query.score_cutoff).then(|| TaskMatch {
                task: task.clone(),
                score,
            })
        })
        .collect::<Vec<_>>();

    // `sort_by` is stable, so ties keep collection order.
    hits.sort_by(|left, right| right.score.total_cmp(&left.score));
    hits.truncate(query.limit);
    hits
}

/// Score of an already lowercased query against an already lowercased title.
pub fn title_score(query: &str, title: &str) -> f64 {
    let score = similarity_ratio(query, title);
    if title.contains(query) {
        score.max(SUBSTRING_SCORE)
    } else {
        score
    }
}

/// Normalized similarity `2 * M / T`, where `M` counts characters in the
/// matching blocks and `T` is the combined length. Two empty strings are
/// identical (1.0).
pub fn similarity_ratio(left: &str, right: &str) -> f64 {
    let a = left.chars().collect::<Vec<_>>();
    let b = right.chars().collect::<Vec<_>>();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = SequenceMatcher::new(&a, &b).matched_len();
    2.0 * matched as f64 / total as f64
}

/// Longest-matching-block aligner over two char sequences.
struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each char in `b`, minus popular chars.
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, ch) in b.iter().enumerate() {
            b2j.entry(*ch).or_default().push(j);
        }
        if b.len() >= AUTOJUNK_MIN_LEN {
            let popular_threshold = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= popular_threshold);
        }
        Self { a, b, b2j }
    }

    /// Total size of all matching blocks.
    fn matched_len(&self) -> usize {
        let mut matched = 0;
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];
        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let (i, j, size) = self.longest_match(alo, ahi, blo, bhi);
            if size == 0 {
                continue;
            }
            matched += size;
            if alo < i && blo < j {
                pending.push((alo, i, blo, j));
            }
            if i + size < ahi && j + size < bhi {
                pending.push((i + size, ahi, j + size, bhi));
            }
        }
        matched
    }

    /// Longest block `a[i..i+size] == b[j..j+size]` inside the given window.
    /// Earliest `i`, then earliest `j`, wins among equal sizes.
    fn longest_match(
        &self,
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
        let mut run_ending_at: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next_runs = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let size = j
                        .checked_sub(1)
                        .and_then(|prev| run_ending_at.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_runs.insert(j, size);
                    if size > best_size {
                        best_i = i + 1 - size;
                        best_j = j + 1 - size;
                        best_size = size;
                    }
                }
            }
            run_ending_at = next_runs;
        }

        // Popular chars never seed a run, so grow the block across them.
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && self.a[best_i + best_size] == self.b[best_j + best_size]
        {
            best_size += 1;
        }

        (best_i, best_j, best_size)
    }
}
