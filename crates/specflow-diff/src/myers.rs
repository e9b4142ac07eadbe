//! Myers' O((N+M)·D) shortest-edit-script search in linear space.
//!
//! The middle snake of the edit graph splits the problem in two, and each
//! half is solved the same way, so memory stays O(N+M) however far apart
//! the inputs are. Within every run of changes all deletions come before
//! all insertions, so identical inputs always yield identical scripts.

/// A single element-level edit, indexing into the old and new sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Edit {
    Equal { old: usize, new: usize },
    Delete { old: usize },
    Insert { new: usize },
}

/// Compute the shortest edit script turning `a` into `b`.
pub(crate) fn diff<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Edit> {
    let mut edits = Vec::with_capacity(a.len().max(b.len()));
    solve(a, 0, b, 0, &mut edits);
    deletions_first(&mut edits);
    edits
}

/// Append the edits for `a` (starting at old index `a0`) against `b`
/// (starting at new index `b0`).
fn solve<T: PartialEq>(a: &[T], a0: usize, b: &[T], b0: usize, out: &mut Vec<Edit>) {
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    for i in 0..prefix {
        out.push(Edit::Equal {
            old: a0 + i,
            new: b0 + i,
        });
    }
    let a_rest = &a[prefix..];
    let b_rest = &b[prefix..];
    let suffix = a_rest
        .iter()
        .rev()
        .zip(b_rest.iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    let a_mid = &a_rest[..a_rest.len() - suffix];
    let b_mid = &b_rest[..b_rest.len() - suffix];
    let (am0, bm0) = (a0 + prefix, b0 + prefix);

    if a_mid.is_empty() || b_mid.is_empty() {
        out.extend((0..a_mid.len()).map(|i| Edit::Delete { old: am0 + i }));
        out.extend((0..b_mid.len()).map(|j| Edit::Insert { new: bm0 + j }));
    } else {
        match middle_snake(a_mid, b_mid) {
            Some((x, y)) => {
                solve(&a_mid[..x], am0, &b_mid[..y], bm0, out);
                solve(&a_mid[x..], am0 + x, &b_mid[y..], bm0 + y, out);
            }
            None => {
                out.extend((0..a_mid.len()).map(|i| Edit::Delete { old: am0 + i }));
                out.extend((0..b_mid.len()).map(|j| Edit::Insert { new: bm0 + j }));
            }
        }
    }

    let (as0, bs0) = (am0 + a_mid.len(), bm0 + b_mid.len());
    for i in 0..suffix {
        out.push(Edit::Equal {
            old: as0 + i,
            new: bs0 + i,
        });
    }
}

/// A point on an optimal path strictly inside the edit graph, found by
/// running the forward and reverse searches until they overlap. `None`
/// when the inputs share no element.
///
/// Both inputs must be non-empty and differ in their first and last
/// elements.
fn middle_snake<T: PartialEq>(a: &[T], b: &[T]) -> Option<(usize, usize)> {
    let n = a.len() as isize;
    let m = b.len() as isize;
    let max_d = (n + m + 1) / 2;
    let offset = max_d;
    // Two slots of headroom keep the seed in range when n = m = 1.
    let len = (2 * max_d + 2) as usize;
    let mut forward = vec![-1isize; len];
    let mut reverse = vec![-1isize; len];
    forward[(offset + 1) as usize] = 0;
    reverse[(offset + 1) as usize] = 0;

    let delta = n - m;
    // With an odd delta the paths meet during a forward step.
    let check_forward = delta % 2 != 0;
    let (mut k1_start, mut k1_end, mut k2_start, mut k2_end) = (0, 0, 0, 0);

    for d in 0..max_d {
        let mut k1 = -d + k1_start;
        while k1 <= d - k1_end {
            let i = (offset + k1) as usize;
            let mut x1 = if k1 == -d || (k1 != d && forward[i - 1] < forward[i + 1]) {
                forward[i + 1]
            } else {
                forward[i - 1] + 1
            };
            let mut y1 = x1 - k1;
            while x1 < n && y1 < m && a[x1 as usize] == b[y1 as usize] {
                x1 += 1;
                y1 += 1;
            }
            forward[i] = x1;
            if x1 > n {
                k1_end += 2;
            } else if y1 > m {
                k1_start += 2;
            } else if check_forward {
                let j = offset + delta - k1;
                if (0..len as isize).contains(&j) && reverse[j as usize] != -1 {
                    let x2 = n - reverse[j as usize];
                    if x1 >= x2 {
                        return Some((x1 as usize, y1 as usize));
                    }
                }
            }
            k1 += 2;
        }

        let mut k2 = -d + k2_start;
        while k2 <= d - k2_end {
            let j = (offset + k2) as usize;
            let mut x2 = if k2 == -d || (k2 != d && reverse[j - 1] < reverse[j + 1]) {
                reverse[j + 1]
            } else {
                reverse[j - 1] + 1
            };
            let mut y2 = x2 - k2;
            while x2 < n && y2 < m && a[(n - x2 - 1) as usize] == b[(m - y2 - 1) as usize] {
                x2 += 1;
                y2 += 1;
            }
            reverse[j] = x2;
            if x2 > n {
                k2_end += 2;
            } else if y2 > m {
                k2_start += 2;
            } else if !check_forward {
                let i = offset + delta - k2;
                if (0..len as isize).contains(&i) && forward[i as usize] != -1 {
                    let x1 = forward[i as usize];
                    let y1 = offset + x1 - i;
                    if x1 >= n - x2 {
                        return Some((x1 as usize, y1 as usize));
                    }
                }
            }
            k2 += 2;
        }
    }
    None
}

/// Reorder every run of non-equal edits so its deletions precede its
/// insertions. Cost and index order within each side are unchanged.
fn deletions_first(edits: &mut [Edit]) {
    let mut start = 0;
    while start < edits.len() {
        if matches!(edits[start], Edit::Equal { .. }) {
            start += 1;
            continue;
        }
        let end = edits[start..]
            .iter()
            .position(|e| matches!(e, Edit::Equal { .. }))
            .map_or(edits.len(), |p| start + p);
        edits[start..end].sort_by_key(|e| matches!(e, Edit::Insert { .. }));
        start = end;
    }
}
