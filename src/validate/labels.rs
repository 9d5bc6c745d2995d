//! Gene label integrity: missing and duplicated identifiers

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::RawTable;
use crate::error::AnalysisError;

/// Which occurrence of a duplicated gene label survives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeepPolicy {
    #[default]
    First,
    Last,
}

impl fmt::Display for KeepPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeepPolicy::First => f.write_str("first"),
            KeepPolicy::Last => f.write_str("last"),
        }
    }
}

impl FromStr for KeepPolicy {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(KeepPolicy::First),
            "last" => Ok(KeepPolicy::Last),
            other => Err(AnalysisError::InvalidInput {
                reason: format!("unknown keep policy '{}', use 'first' or 'last'", other),
            }),
        }
    }
}

/// Drop rows without a gene identifier
pub fn drop_unlabeled_rows(table: &RawTable) -> (RawTable, String) {
    let keep: Vec<usize> = (0..table.n_rows())
        .filter(|&i| table.row_labels()[i].is_some())
        .collect();
    let removed = table.n_rows() - keep.len();
    (
        table.select_rows(&keep),
        format!("{} unannotated genes removed.", removed),
    )
}

/// Keep one row per gene label, either the first or the last occurrence.
/// Surviving rows stay in their original relative order.
pub fn deduplicate_labels(table: &RawTable, keep: KeepPolicy) -> (RawTable, String) {
    let mut chosen: HashMap<&str, usize> = HashMap::new();
    for (i, label) in table.row_labels().iter().enumerate() {
        if let Some(label) = label {
            match keep {
                KeepPolicy::First => {
                    chosen.entry(label.as_str()).or_insert(i);
                }
                KeepPolicy::Last => {
                    chosen.insert(label.as_str(), i);
                }
            }
        }
    }

    let mut rows: Vec<usize> = chosen.values().copied().collect();
    rows.sort_unstable();

    let message = format!(
        "From all genes ({}), found {} unique genes. Using only {} occurrence.",
        table.n_rows(),
        rows.len(),
        keep
    );
    (table.select_rows(&rows), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Cell;
    use std::collections::HashSet;

    fn table(labels: &[Option<&str>]) -> RawTable {
        RawTable::new(
            labels.iter().map(|l| l.map(|s| s.to_string())).collect(),
            vec![Some("s1".to_string())],
            (0..labels.len()).map(|i| vec![Cell::Number(i as f64)]).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_drop_unlabeled_rows() {
        let (clean, message) = drop_unlabeled_rows(&table(&[Some("A"), None, Some("B"), None]));
        assert_eq!(clean.n_rows(), 2);
        assert_eq!(message, "2 unannotated genes removed.");
    }

    #[test]
    fn test_deduplicate_keep_first() {
        let t = table(&[Some("A"), Some("B"), Some("A"), Some("C"), Some("B")]);
        let (clean, message) = deduplicate_labels(&t, KeepPolicy::First);

        let labels: Vec<_> = clean.row_labels().iter().flatten().cloned().collect();
        assert_eq!(labels, vec!["A", "B", "C"]);
        assert_eq!(clean.cell(0, 0), Some(&Cell::Number(0.0)));
        assert_eq!(clean.cell(1, 0), Some(&Cell::Number(1.0)));
        assert_eq!(
            message,
            "From all genes (5), found 3 unique genes. Using only first occurrence."
        );
    }

    #[test]
    fn test_deduplicate_keep_last() {
        let t = table(&[Some("A"), Some("B"), Some("A"), Some("C"), Some("B")]);
        let (clean, _) = deduplicate_labels(&t, KeepPolicy::Last);

        let labels: Vec<_> = clean.row_labels().iter().flatten().cloned().collect();
        assert_eq!(labels, vec!["A", "C", "B"]);
        assert_eq!(clean.cell(0, 0), Some(&Cell::Number(2.0)));
        assert_eq!(clean.cell(2, 0), Some(&Cell::Number(4.0)));
    }

    #[test]
    fn test_deduplicated_labels_unique() {
        let t = table(&[Some("X"), Some("X"), Some("X"), Some("Y")]);
        let (clean, _) = deduplicate_labels(&t, KeepPolicy::First);
        let unique: HashSet<_> = clean.row_labels().iter().collect();
        assert_eq!(unique.len(), clean.n_rows());
    }

    #[test]
    fn test_keep_policy_from_str() {
        assert_eq!("last".parse::<KeepPolicy>().unwrap(), KeepPolicy::Last);
        assert!("middle".parse::<KeepPolicy>().is_err());
    }
}
