//! Text diffing: tokenize, run Myers, and coalesce into an [`EditScript`].
//!
//! Tokenization never drops characters. Lines keep their trailing newline
//! and words keep the whitespace runs between them as separate tokens, so
//! concatenating the tokens of either side reproduces that side exactly.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DiffError;
use crate::myers::{self, Edit};

/// Unit of comparison for a text diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Whole lines, newline included.
    Line,
    /// Runs of non-whitespace and runs of whitespace.
    Word,
}

impl Granularity {
    /// Split `text` into tokens at this granularity.
    pub fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        match self {
            Granularity::Line => text.split_inclusive('\n').collect(),
            Granularity::Word => split_words(text),
        }
    }
}

fn split_words(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;
    for (i, c) in text.char_indices() {
        let space = c.is_whitespace();
        match in_space {
            Some(prev) if prev != space => {
                tokens.push(&text[start..i]);
                start = i;
            }
            _ => {}
        }
        in_space = Some(space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

/// What an [`DiffOp`] does to the old text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Equal,
    Insert,
    Delete,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpKind::Equal => write!(f, "equal"),
            OpKind::Insert => write!(f, "insert"),
            OpKind::Delete => write!(f, "delete"),
        }
    }
}

/// A run of consecutive tokens sharing one [`OpKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOp {
    pub kind: OpKind,
    /// The tokens of the run, concatenated.
    pub text: String,
    /// Number of tokens in the run.
    pub units: usize,
}

/// Token counts per operation kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub unchanged: usize,
    pub inserted: usize,
    pub deleted: usize,
}

impl DiffStats {
    /// Total inserted and deleted tokens (the edit distance).
    pub fn distance(&self) -> usize {
        self.inserted + self.deleted
    }
}

/// A deterministic edit script between two strings.
///
/// Equal runs are kept alongside inserts and deletes, so the script alone
/// is enough to rebuild either side or to lay the texts out in two columns.
/// Two empty inputs produce no operations at all; identical non-empty
/// inputs produce a single equal run and no edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditScript {
    granularity: Granularity,
    ops: Vec<DiffOp>,
}

impl EditScript {
    /// The granularity the script was computed at.
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// All runs in order.
    pub fn ops(&self) -> &[DiffOp] {
        &self.ops
    }

    /// Only the insert and delete runs.
    pub fn edits(&self) -> impl Iterator<Item = &DiffOp> {
        self.ops.iter().filter(|op| op.kind != OpKind::Equal)
    }

    /// True when the two sides are identical.
    pub fn is_unchanged(&self) -> bool {
        self.edits().next().is_none()
    }

    /// Token counts per kind.
    pub fn stats(&self) -> DiffStats {
        self.ops.iter().fold(DiffStats::default(), |mut s, op| {
            match op.kind {
                OpKind::Equal => s.unchanged += op.units,
                OpKind::Insert => s.inserted += op.units,
                OpKind::Delete => s.deleted += op.units,
            }
            s
        })
    }

    /// Rebuild the old side from the script.
    pub fn old_text(&self) -> String {
        self.side(OpKind::Delete)
    }

    /// Rebuild the new side from the script.
    pub fn new_text(&self) -> String {
        self.side(OpKind::Insert)
    }

    fn side(&self, keep: OpKind) -> String {
        self.ops
            .iter()
            .filter(|op| op.kind == OpKind::Equal || op.kind == keep)
            .map(|op| op.text.as_str())
            .collect()
    }

    /// Replay the script against `old`, producing the new text.
    ///
    /// Every equal and delete run must match `old` at the current position,
    /// and the script must consume `old` completely.
    pub fn apply(&self, old: &str) -> Result<String, DiffError> {
        let mut cursor = 0;
        let mut out = String::with_capacity(old.len());
        for op in &self.ops {
            match op.kind {
                OpKind::Insert => out.push_str(&op.text),
                OpKind::Equal | OpKind::Delete => {
                    if !old[cursor..].starts_with(op.text.as_str()) {
                        return Err(DiffError::Mismatch { offset: cursor });
                    }
                    cursor += op.text.len();
                    if op.kind == OpKind::Equal {
                        out.push_str(&op.text);
                    }
                }
            }
        }
        if cursor != old.len() {
            return Err(DiffError::Incomplete {
                consumed: cursor,
                len: old.len(),
            });
        }
        Ok(out)
    }

    /// The script that turns the new side back into the old side.
    pub fn invert(&self) -> EditScript {
        let ops = self
            .ops
            .iter()
            .map(|op| DiffOp {
                kind: match op.kind {
                    OpKind::Equal => OpKind::Equal,
                    OpKind::Insert => OpKind::Delete,
                    OpKind::Delete => OpKind::Insert,
                },
                text: op.text.clone(),
                units: op.units,
            })
            .collect();
        EditScript {
            granularity: self.granularity,
            ops,
        }
    }
}

/// Diff two strings at the given granularity.
pub fn diff_text(old: &str, new: &str, granularity: Granularity) -> EditScript {
    let a = granularity.tokenize(old);
    let b = granularity.tokenize(new);
    let edits = myers::diff(&a, &b);

    let mut ops: Vec<DiffOp> = Vec::new();
    for edit in edits {
        let (kind, token) = match edit {
            Edit::Equal { old, .. } => (OpKind::Equal, a[old]),
            Edit::Delete { old } => (OpKind::Delete, a[old]),
            Edit::Insert { new } => (OpKind::Insert, b[new]),
        };
        match ops.last_mut() {
            Some(last) if last.kind == kind => {
                last.text.push_str(token);
                last.units += 1;
            }
            _ => ops.push(DiffOp {
                kind,
                text: token.to_string(),
                units: 1,
            }),
        }
    }

    EditScript { granularity, ops }
}

/// Line-level diff.
pub fn diff_lines(old: &str, new: &str) -> EditScript {
    diff_text(old, new, Granularity::Line)
}

/// Word-level diff.
pub fn diff_words(old: &str, new: &str) -> EditScript {
    diff_text(old, new, Granularity::Word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn op(kind: OpKind, text: &str, units: usize) -> DiffOp {
        DiffOp {
            kind,
            text: text.to_string(),
            units,
        }
    }

    #[test]
    fn word_tokens_keep_whitespace() {
        assert_eq!(
            Granularity::Word.tokenize("  two words\n"),
            vec!["  ", "two", " ", "words", "\n"]
        );
        assert!(Granularity::Word.tokenize("").is_empty());
    }

    #[test]
    fn line_tokens_keep_newlines() {
        assert_eq!(
            Granularity::Line.tokenize("a\nb\n\nc"),
            vec!["a\n", "b\n", "\n", "c"]
        );
    }

    #[test]
    fn empty_inputs_give_empty_script() {
        let script = diff_lines("", "");
        assert!(script.ops().is_empty());
        assert!(script.is_unchanged());
        assert_eq!(script.apply("").unwrap(), "");
    }

    #[test]
    fn identical_inputs_have_no_edits() {
        let text = "line one\nline two\n";
        let script = diff_lines(text, text);
        assert!(script.is_unchanged());
        assert_eq!(script.edits().count(), 0);
        assert_eq!(script.ops(), &[op(OpKind::Equal, text, 2)]);
    }

    #[test]
    fn line_replacement() {
        let script = diff_lines("a\nb\nc\n", "a\nB\nc\n");
        assert_eq!(
            script.ops(),
            &[
                op(OpKind::Equal, "a\n", 1),
                op(OpKind::Delete, "b\n", 1),
                op(OpKind::Insert, "B\n", 1),
                op(OpKind::Equal, "c\n", 1),
            ]
        );
        assert_eq!(
            script.stats(),
            DiffStats {
                unchanged: 2,
                inserted: 1,
                deleted: 1
            }
        );
    }

    #[test]
    fn word_diff_inside_a_sentence() {
        let old = "Basic login and registration";
        let new = "Secure login and registration with MFA";
        let script = diff_words(old, new);
        assert_eq!(script.apply(old).unwrap(), new);
        assert_eq!(script.old_text(), old);
        assert_eq!(script.new_text(), new);
        let deleted: Vec<_> = script
            .edits()
            .filter(|o| o.kind == OpKind::Delete)
            .map(|o| o.text.as_str())
            .collect();
        assert_eq!(deleted, vec!["Basic"]);
    }

    #[test]
    fn apply_rejects_wrong_base() {
        let script = diff_lines("a\nb\n", "a\nc\n");
        assert_eq!(
            script.apply("x\nb\n"),
            Err(DiffError::Mismatch { offset: 0 })
        );
        assert_eq!(
            script.apply("a\nb\nextra"),
            Err(DiffError::Incomplete {
                consumed: 4,
                len: 9
            })
        );
    }

    #[test]
    fn invert_reverses_direction() {
        let old = "one\ntwo\nthree\n";
        let new = "zero\none\nthree\nfour\n";
        let script = diff_lines(old, new);
        let back = script.invert();
        assert_eq!(back.apply(new).unwrap(), old);
        assert_eq!(back.stats().inserted, script.stats().deleted);
    }

    #[test]
    fn same_inputs_same_script() {
        let a = "the quick brown fox";
        let b = "the slow brown dog";
        assert_eq!(diff_words(a, b), diff_words(a, b));
    }

    #[test]
    fn multibyte_text_round_trips() {
        let old = "café au lait";
        let new = "café noir";
        let script = diff_words(old, new);
        assert_eq!(script.apply(old).unwrap(), new);
    }

    #[test]
    fn serializes_ops_with_lowercase_kinds() {
        let script = diff_lines("a\n", "b\n");
        let json = serde_json::to_value(&script).unwrap();
        assert_eq!(json["granularity"], "line");
        assert_eq!(json["ops"][0]["kind"], "delete");
        assert_eq!(json["ops"][1]["kind"], "insert");
    }
}
