//! Normalization methods for RNA-seq count data

mod counts;

pub use counts::{counts_per_million, library_sizes, log_counts_per_million, LOG_PSEUDOCOUNT, PER_MILLION};
