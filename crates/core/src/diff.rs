//! Word-level text diff used to record content edits.
//!
//! Text is split into word, whitespace and punctuation tokens, the two token
//! sequences are compared with the linear-space form of Myers' O(ND)
//! algorithm, and the result is folded into a list of [`EditChange`] runs. Concatenating the runs that are
//! not `added` yields the old text; concatenating the runs that are not
//! `removed` yields the new text.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// One contiguous run of a diff.
///
/// A run is common to both sides when neither flag is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditChange {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed: Option<bool>,
}

impl EditChange {
    pub fn common(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            added: None,
            removed: None,
        }
    }

    pub fn added(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            added: Some(true),
            removed: None,
        }
    }

    pub fn removed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            added: None,
            removed: Some(true),
        }
    }

    pub fn is_added(&self) -> bool {
        self.added == Some(true)
    }

    pub fn is_removed(&self) -> bool {
        self.removed == Some(true)
    }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Space,
    /// Brackets and quotes; each one is its own token.
    Delimiter,
    Punctuation,
}

fn classify(c: char) -> CharClass {
    if c.is_alphanumeric() || c == '_' {
        CharClass::Word
    } else if c.is_whitespace() {
        CharClass::Space
    } else if matches!(c, '(' | ')' | '[' | ']' | '{' | '}' | '\'' | '"') {
        CharClass::Delimiter
    } else {
        CharClass::Punctuation
    }
}

/// Split `text` into diffable tokens. Concatenating the tokens gives `text`.
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut current: Option<CharClass> = None;

    for (i, c) in text.char_indices() {
        let class = classify(c);
        if let Some(prev) = current {
            if prev != class || class == CharClass::Delimiter {
                tokens.push(&text[start..i]);
                start = i;
            }
        }
        current = Some(class);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

// ---------------------------------------------------------------------------
// Myers diff
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    /// Token at this index of the old sequence is kept.
    Equal(usize),
    /// Token at this index of the old sequence is removed.
    Delete(usize),
    /// Token at this index of the new sequence is inserted.
    Insert(usize),
}

/// Shortest edit script turning `a` into `b`.
///
/// Uses the linear-space variant of Myers' algorithm: find a middle snake,
/// then recurse on the two halves. Memory stays O(N + M).
fn diff_tokens<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Op> {
    let mut ops = Vec::with_capacity(a.len().max(b.len()));
    conquer(a, 0, b, 0, &mut ops);
    ops
}

fn common_prefix<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Append the script for `a` -> `b` to `ops`. `a_start` and `b_start` are
/// the positions of the slices in the full sequences.
fn conquer<T: PartialEq>(a: &[T], a_start: usize, b: &[T], b_start: usize, ops: &mut Vec<Op>) {
    let prefix = common_prefix(a, b);
    ops.extend((a_start..a_start + prefix).map(Op::Equal));
    let (a, b) = (&a[prefix..], &b[prefix..]);
    let (a_start, b_start) = (a_start + prefix, b_start + prefix);

    let suffix = common_suffix(a, b);
    let (a, b) = (&a[..a.len() - suffix], &b[..b.len() - suffix]);

    if a.is_empty() {
        ops.extend((b_start..b_start + b.len()).map(Op::Insert));
    } else if b.is_empty() {
        ops.extend((a_start..a_start + a.len()).map(Op::Delete));
    } else {
        let (x, y) = middle_snake(a, b);
        conquer(&a[..x], a_start, &b[..y], b_start, ops);
        conquer(&a[x..], a_start + x, &b[y..], b_start + y, ops);
    }

    let tail = a_start + a.len();
    ops.extend((tail..tail + suffix).map(Op::Equal));
}

/// Furthest-reaching x on each diagonal `k`, for `k` in `-offset..=offset`.
struct Frontier {
    offset: isize,
    xs: Vec<usize>,
}

impl Frontier {
    fn new(max_d: usize) -> Self {
        Self {
            offset: max_d as isize + 1,
            xs: vec![0; 2 * max_d + 3],
        }
    }
}

impl Index<isize> for Frontier {
    type Output = usize;

    fn index(&self, k: isize) -> &usize {
        &self.xs[(k + self.offset) as usize]
    }
}

impl IndexMut<isize> for Frontier {
    fn index_mut(&mut self, k: isize) -> &mut usize {
        &mut self.xs[(k + self.offset) as usize]
    }
}

/// A point on a shortest edit path through the middle of the edit graph.
///
/// Both inputs must be non-empty and share no common prefix or suffix, so
/// the point is never `(0, 0)` or `(a.len(), b.len())`.
fn middle_snake<T: PartialEq>(a: &[T], b: &[T]) -> (usize, usize) {
    let (n, m) = (a.len(), b.len());
    let delta = n as isize - m as isize;
    let odd = delta & 1 == 1;
    let max_d = (n + m + 1) / 2 + 1;
    let mut forward = Frontier::new(max_d);
    let mut backward = Frontier::new(max_d);

    for d in 0..max_d as isize {
        let mut k = -d;
        while k <= d {
            let mut x = if k == -d || (k != d && forward[k - 1] < forward[k + 1]) {
                forward[k + 1]
            } else {
                forward[k - 1] + 1
            };
            let mut y = (x as isize - k) as usize;
            let (x0, y0) = (x, y);
            while x < n && y < m && a[x] == b[y] {
                x += 1;
                y += 1;
            }
            forward[k] = x;
            if odd && (k - delta).abs() < d && x + backward[delta - k] >= n {
                return (x0, y0);
            }
            k += 2;
        }

        let mut k = -d;
        while k <= d {
            let mut x = if k == -d || (k != d && backward[k - 1] < backward[k + 1]) {
                backward[k + 1]
            } else {
                backward[k - 1] + 1
            };
            let mut y = (x as isize - k) as usize;
            while x < n && y < m && a[n - x - 1] == b[m - y - 1] {
                x += 1;
                y += 1;
            }
            backward[k] = x;
            if !odd && (k - delta).abs() <= d && x + forward[delta - k] >= n {
                return (n - x, m - y);
            }
            k += 2;
        }
    }

    // Not reached for valid input; degrade to delete-all then insert-all.
    (n, 0)
}

// ---------------------------------------------------------------------------
// Change runs
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Runs {
    changes: Vec<EditChange>,
    common: String,
    removed: String,
    added: String,
}

impl Runs {
    fn flush_common(&mut self) {
        if !self.common.is_empty() {
            self.changes
                .push(EditChange::common(std::mem::take(&mut self.common)));
        }
    }

    fn flush_hunk(&mut self) {
        if !self.removed.is_empty() {
            self.changes
                .push(EditChange::removed(std::mem::take(&mut self.removed)));
        }
        if !self.added.is_empty() {
            self.changes
                .push(EditChange::added(std::mem::take(&mut self.added)));
        }
    }

    fn finish(mut self) -> Vec<EditChange> {
        self.flush_common();
        self.flush_hunk();
        self.changes
    }
}

/// Diff `old` against `new`.
///
/// Returns `None` when the texts are identical. Otherwise returns the change
/// runs in document order; adjacent runs of the same kind are merged, and
/// within a hunk the removed run precedes the added one.
pub fn compute_changes(old: &str, new: &str) -> Option<Vec<EditChange>> {
    if old == new {
        return None;
    }

    let a = tokenize(old);
    let b = tokenize(new);
    let mut runs = Runs::default();

    for op in diff_tokens(&a, &b) {
        match op {
            Op::Equal(i) => {
                runs.flush_hunk();
                runs.common.push_str(a[i]);
            }
            Op::Delete(i) => {
                runs.flush_common();
                runs.removed.push_str(a[i]);
            }
            Op::Insert(j) => {
                runs.flush_common();
                runs.added.push_str(b[j]);
            }
        }
    }

    Some(runs.finish())
}
