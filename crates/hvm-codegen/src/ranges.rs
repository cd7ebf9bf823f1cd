//! Set algebra over closed integer ranges, used to minimize the alternatives
//! inside a lowered bracket expression.
//!
//! The original source's `_range_intersect` combines per-class matches with
//! a non-short-circuiting `and`, which silently keeps only the last
//! computed pair instead of the true intersection across all classes (see
//! `DESIGN.md`). `intersect` below is the direct, correct interval
//! intersection; `transform_classes` folds it pairwise across every class
//! instead of porting the original's behavior.

use rustc_hash::FxHashSet;

/// An inclusive `[lo, hi]` range of codepoints.
pub type Range = (u32, u32);

/// The intersection of two closed ranges, or `None` if they don't overlap.
pub fn intersect(a: Range, b: Range) -> Option<Range> {
    let lo = a.0.max(b.0);
    let hi = a.1.min(b.1);
    if lo <= hi {
        Some((lo, hi))
    } else {
        None
    }
}

/// The 0, 1, or 2 ranges left after removing `(b1, b2)` from `r`.
pub fn subtract(r: Range, b1: u32, b2: u32) -> Vec<Range> {
    let (r0, r1) = r;
    if b2 < r0 || b1 > r1 {
        return vec![r];
    }
    if b2 == r0 && r1 > r0 {
        return vec![(r0 + 1, r1)];
    }
    if b1 == r1 && r1 > r0 {
        return vec![(r0, r1 - 1)];
    }
    if b1 > r0 && b2 < r1 {
        return vec![(r0, b1 - 1), (b2 + 1, r1)];
    }
    Vec::new()
}

/// Whether `r` falls entirely within one of `class`'s ranges, narrowed to
/// that overlap.
fn range_matches_class(r: Range, class: &[Range]) -> Option<Range> {
    class.iter().find_map(|&c| intersect(r, c))
}

/// Intersect every range in `classes` against every other class in the
/// family (a range must satisfy all classes to survive), then subtract each
/// range in `excludes`. Returns the minimized list of single-range
/// alternatives.
pub fn transform_classes(classes: &[Vec<Range>], excludes: &[Range]) -> Vec<Range> {
    let mut working_set: FxHashSet<Range> = FxHashSet::default();
    for class in classes {
        for &range in class {
            let mut narrowed = range;
            let mut keep = true;
            for check_class in classes {
                match range_matches_class(narrowed, check_class) {
                    Some(r) => narrowed = r,
                    None => {
                        keep = false;
                        break;
                    }
                }
            }
            if keep {
                working_set.insert(narrowed);
            }
        }
    }

    for &(b1, b2) in excludes {
        let mut next_set = FxHashSet::default();
        for &r in &working_set {
            for remaining in subtract(r, b1, b2) {
                next_set.insert(remaining);
            }
        }
        working_set = next_set;
    }

    let mut result: Vec<Range> = working_set.into_iter().collect();
    result.sort_unstable();
    result
}
