//! Input/Output operations: ingestion, result tables and persisted artifacts

mod parse;
mod results;
mod write;

pub use parse::{
    detect_delimiter, parse_design, parse_table, read_count_table, read_design, DesignOptions,
};
pub use results::{
    DgeResults, RawDgeTable, ResultsSummary, BASE_MEAN, LOG2_FOLD_CHANGE, PADJ, PVALUE,
};
pub use write::{
    write_correlation, write_count_matrix, write_design, write_dge_results, write_embedding,
    write_library_sizes, write_normalized, write_report, WriteOptions,
};
