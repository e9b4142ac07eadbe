//! Diffs over long descriptions stay fast and minimal.

use specflow_diff::{diff_lines, diff_words, DiffStats};

fn words(prefix: &str, count: usize) -> String {
    (0..count)
        .map(|i| format!("{prefix}{i}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn rewriting_a_long_description() {
    let count = 4000;
    let old = words("before", count);
    let new = words("after", count);

    let script = diff_words(&old, &new);
    // Only the separating spaces survive a full rewrite.
    assert_eq!(
        script.stats(),
        DiffStats {
            unchanged: count - 1,
            inserted: count,
            deleted: count,
        }
    );
    assert_eq!(script.apply(&old).unwrap(), new);
    assert_eq!(script.old_text(), old);
}

#[test]
fn scattered_edits_in_many_lines() {
    let old: String = (0..5000).map(|i| format!("line {i}\n")).collect();
    let new: String = (0..5000)
        .map(|i| {
            if i % 100 == 0 {
                format!("changed {i}\n")
            } else {
                format!("line {i}\n")
            }
        })
        .collect();

    let script = diff_lines(&old, &new);
    let stats = script.stats();
    assert_eq!((stats.inserted, stats.deleted, stats.unchanged), (50, 50, 4950));
    assert_eq!(script.apply(&old).unwrap(), new);
}
