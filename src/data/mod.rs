//! Data structures for count, design and report handling

mod count_matrix;
mod design;
mod report;
mod table;

pub use count_matrix::CountMatrix;
pub use design::{DesignMatrix, Factor};
pub use report::{AnalysisReport, ReportBuilder, ReportEntry, ReportStage};
pub use table::{Cell, RawTable};
