//! Set difference between the object store and the catalog.

use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Case-insensitive substring every key must contain.
    pub filter: Option<String>,
    /// Keep only the first N keys after sorting (`None`/0 = all).
    pub limit: Option<usize>,
}

/// Counts at each stage, for progress output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub missing: usize,
    pub after_filter: usize,
    pub selected: usize,
}

/// Keys present in `enumerated` but absent from `known`, sorted, then
/// filtered and truncated per `opts`.
///
/// Sorting happens before truncation so a given limit always selects the
/// same keys for the same inputs.
pub fn reconcile<'a, I>(
    enumerated: I,
    known: &HashSet<String>,
    opts: &ReconcileOptions,
) -> (Vec<String>, ReconcileReport)
where
    I: IntoIterator<Item = &'a str>,
{
    let missing: BTreeSet<&str> = enumerated
        .into_iter()
        .filter(|k| !known.contains(*k))
        .collect();
    let mut report = ReconcileReport {
        missing: missing.len(),
        ..Default::default()
    };

    let needle = opts
        .filter
        .as_deref()
        .map(str::to_lowercase)
        .filter(|n| !n.is_empty());
    let mut selected: Vec<String> = missing
        .into_iter()
        .filter(|k| match &needle {
            Some(n) => k.to_lowercase().contains(n.as_str()),
            None => true,
        })
        .map(str::to_string)
        .collect();
    report.after_filter = selected.len();

    if let Some(limit) = opts.limit.filter(|l| *l > 0) {
        selected.truncate(limit);
    }
    report.selected = selected.len();

    (selected, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(keys: &[&str]) -> HashSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn is_a_plain_set_difference() {
        let enumerated = ["c.mp4", "a.mp4", "b.mp4", "a.mp4", "d.mp4"];
        let (keys, report) =
            reconcile(enumerated, &known(&["b.mp4", "zz.mp4"]), &ReconcileOptions::default());
        assert_eq!(keys, vec!["a.mp4", "c.mp4", "d.mp4"]);
        assert_eq!(report.missing, 3);
        assert_eq!(report.selected, 3);
    }

    #[test]
    fn input_order_does_not_matter() {
        let k = known(&["b"]);
        let opts = ReconcileOptions::default();
        let (forward, _) = reconcile(["a", "b", "c", "d"], &k, &opts);
        let (backward, _) = reconcile(["d", "c", "b", "a", "c"], &k, &opts);
        assert_eq!(forward, backward);
    }

    #[test]
    fn limit_takes_lexicographic_prefix_deterministically() {
        let enumerated = ["m.mp4", "b.mp4", "z.mp4", "a.mp4"];
        let opts = ReconcileOptions {
            filter: None,
            limit: Some(2),
        };
        let (first, _) = reconcile(enumerated, &HashSet::new(), &opts);
        let (second, _) = reconcile(enumerated.iter().rev().copied(), &HashSet::new(), &opts);
        assert_eq!(first, vec!["a.mp4", "b.mp4"]);
        assert_eq!(first, second);
    }

    #[test]
    fn filter_is_case_insensitive_and_applies_before_limit() {
        let enumerated = [
            "FS/4way/r1.mp4",
            "cf/open/r1.mp4",
            "nationals/vfs_r2.mp4",
            "ae/freefly.mp4",
            "fs/8way/r3.mp4",
        ];
        let opts = ReconcileOptions {
            filter: Some("fs".into()),
            limit: Some(2),
        };
        let (keys, report) = reconcile(enumerated, &HashSet::new(), &opts);
        assert_eq!(keys, vec!["FS/4way/r1.mp4", "fs/8way/r3.mp4"]);
        assert_eq!(report.missing, 5);
        assert_eq!(report.after_filter, 3);
        assert_eq!(report.selected, 2);
    }

    #[test]
    fn zero_limit_and_empty_filter_mean_everything() {
        let opts = ReconcileOptions {
            filter: Some(String::new()),
            limit: Some(0),
        };
        let (keys, _) = reconcile(["b", "a"], &HashSet::new(), &opts);
        assert_eq!(keys, vec!["a", "b"]);
    }
}
