//! Gene-major orientation of the count table

use crate::data::RawTable;

/// True when the table looks sample-major: at least as many columns as rows
pub fn needs_transpose(table: &RawTable) -> bool {
    table.n_cols() >= table.n_rows()
}

/// Return the table with genes as rows.
///
/// Genes are assumed to be the larger axis, so a table with at least as many
/// columns as rows is transposed. Applying this twice to a square or wide
/// table transposes twice over; the function is not idempotent there.
pub fn normalize_orientation(table: &RawTable) -> RawTable {
    if needs_transpose(table) {
        table.transpose()
    } else {
        table.clone()
    }
}

/// Orientation implied by where the design's sample names sit.
///
/// The axis whose labels match more design samples holds the samples;
/// columns win a tie. `None` when no label on either axis is a design
/// sample, leaving the decision to the shape rule.
pub fn transpose_for_samples(table: &RawTable, samples: &[String]) -> Option<bool> {
    let overlap = |labels: &[Option<String>]| {
        samples
            .iter()
            .filter(|s| labels.iter().any(|l| l.as_deref() == Some(s.as_str())))
            .count()
    };
    let in_cols = overlap(table.col_labels());
    let in_rows = overlap(table.row_labels());
    if in_cols == 0 && in_rows == 0 {
        None
    } else {
        Some(in_rows > in_cols)
    }
}

/// Describe what orientation did to a table of the given shape
pub fn orientation_message(n_rows: usize, n_cols: usize, transposed: bool) -> String {
    if transposed {
        format!(
            "Count matrix had {} rows and {} columns; transposed so that genes are rows ({} genes x {} samples).",
            n_rows, n_cols, n_cols, n_rows
        )
    } else {
        format!(
            "Count matrix orientation kept: {} genes x {} samples.",
            n_rows, n_cols
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Cell;

    fn table(rows: usize, cols: usize) -> RawTable {
        RawTable::new(
            (0..rows).map(|i| Some(format!("r{}", i))).collect(),
            (0..cols).map(|j| Some(format!("c{}", j))).collect(),
            (0..rows)
                .map(|i| (0..cols).map(|j| Cell::Number((i * cols + j) as f64)).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_tall_table_untouched() {
        let t = table(5, 3);
        assert_eq!(normalize_orientation(&t), t);
    }

    #[test]
    fn test_wide_table_transposed() {
        let t = table(2, 4);
        let oriented = normalize_orientation(&t);
        assert_eq!(oriented, t.transpose());
        assert_eq!(oriented.n_rows(), 4);
    }

    #[test]
    fn test_sample_names_decide() {
        let t = table(2, 4);
        let cols = vec!["c1".to_string(), "c3".to_string()];
        let rows = vec!["r0".to_string(), "r1".to_string()];
        assert_eq!(transpose_for_samples(&t, &cols), Some(false));
        assert_eq!(transpose_for_samples(&t, &rows), Some(true));
        assert_eq!(transpose_for_samples(&t, &["x".to_string()]), None);
        assert_eq!(transpose_for_samples(&t, &[]), None);
    }

    #[test]
    fn test_partial_overlap_picks_larger_axis() {
        let t = table(2, 4);
        // one design sample absent from the table altogether
        let samples: Vec<String> = ["c0", "c1", "c2", "x"].iter().map(|s| s.to_string()).collect();
        assert_eq!(transpose_for_samples(&t, &samples), Some(false));

        let mixed: Vec<String> = ["r0", "r1", "c0"].iter().map(|s| s.to_string()).collect();
        assert_eq!(transpose_for_samples(&t, &mixed), Some(true));

        let tie: Vec<String> = ["r0", "c0"].iter().map(|s| s.to_string()).collect();
        assert_eq!(transpose_for_samples(&t, &tie), Some(false));
    }

    #[test]
    fn test_square_table_transposed() {
        let t = table(3, 3);
        let once = normalize_orientation(&t);
        assert_eq!(once, t.transpose());
        // applying again flips it back rather than leaving it alone
        assert_eq!(normalize_orientation(&once), t);
    }
}
