//! Command-line interface for rnaseq_eda

use clap::{Parser, Subcommand};

/// Names accepted as the first positional argument
pub const SUBCOMMANDS: [&str; 4] = ["eda", "dge", "normalize", "help"];

/// Global options that consume the following argument
const GLOBAL_VALUE_OPTIONS: [&str; 2] = ["-t", "--threads"];

/// The subcommand named on the command line, if any.
///
/// Scans past flags and the values of global options, so
/// `-t 2 eda ...` still finds `eda`.
pub fn find_subcommand(args: &[String]) -> Option<&str> {
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if GLOBAL_VALUE_OPTIONS.contains(&arg.as_str()) {
            iter.next();
        } else if !arg.starts_with('-') {
            return SUBCOMMANDS.iter().copied().find(|s| *s == arg.as_str());
        }
    }
    None
}

#[derive(Parser)]
#[command(name = "rnaseq_eda")]
#[command(version)]
#[command(about = "Validation, exploratory analysis and differential expression for RNA-seq counts")]
#[command(disable_help_flag = true)]
#[command(disable_version_flag = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Number of threads (0 = auto) [default: 0]
    #[arg(short = 't', long, global = true, default_value = "0")]
    pub threads: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate inputs and compute exploratory artifacts
    #[command(
        long_about = "Validate a count matrix against its design matrix and compute\n\
            exploratory artifacts: library sizes, PCA, UMAP (when an engine is\n\
            available) and sample-to-sample correlation on log2(CPM + 1).\n\n\
            Writes processed_count_matrix.csv, processed_design_matrix.csv,\n\
            library_sizes.csv, pca_result.csv, sample_correlation.csv and\n\
            analysis_report.json to the output directory.",
        after_long_help = "\
Examples:
  rnaseq_eda eda -c counts.csv -m design.csv -g gene_id -o eda_out

  # Headerless design file, colour plots by the first factor
  rnaseq_eda eda -c counts.tsv -m design.tsv --no-design-header"
    )]
    Eda {
        /// Path to count matrix file
        #[arg(short, long,
            long_help = "Path to count matrix file (CSV or TSV, auto-detected).\n\
                Genes may be rows or columns; the larger axis is taken as genes.")]
        counts: String,

        /// Path to design matrix file
        #[arg(short = 'm', long,
            long_help = "Path to design matrix file.\n\
                First column = sample IDs, remaining columns = experimental factors.")]
        design: String,

        /// Column holding gene identifiers
        #[arg(short, long, value_name = "COLUMN")]
        gene_column: Option<String>,

        /// Design file has no header row
        #[arg(long)]
        no_design_header: bool,

        /// Occurrence kept for duplicated gene labels [default: first]
        #[arg(long, default_value = "first",
            long_help = "Occurrence kept for duplicated gene labels.\n\
                first: keep the first row seen\n\
                last:  keep the last row seen")]
        keep: String,

        /// Design factor used to annotate embeddings
        #[arg(long, value_name = "FACTOR")]
        color_by: Option<String>,

        /// Output directory [default: .]
        #[arg(short, long, default_value = ".")]
        output: String,
    },

    /// Validate inputs and run a two-group differential expression test
    #[command(
        long_about = "Validate a count matrix against its design matrix, resolve the\n\
            contrast and run a per-gene two-sample t-test on log2(CPM + 1).\n\
            Rows with missing or infinite statistics are removed before writing.\n\n\
            Without --factor/--tested/--control the contrast is derived from a\n\
            single two-level factor: the second level seen in the design is\n\
            tested, the first is control. Swapping them inverts every fold change.",
        after_long_help = "\
Examples:
  rnaseq_eda dge -c counts.csv -m design.csv -g gene_id

  rnaseq_eda dge -c counts.csv -m design.csv -g gene_id \\
    --factor condition --tested treated --control untreated --alpha 0.1"
    )]
    Dge {
        /// Path to count matrix file
        #[arg(short, long)]
        counts: String,

        /// Path to design matrix file
        #[arg(short = 'm', long)]
        design: String,

        /// Column holding gene identifiers
        #[arg(short, long, value_name = "COLUMN")]
        gene_column: Option<String>,

        /// Design file has no header row
        #[arg(long)]
        no_design_header: bool,

        /// Occurrence kept for duplicated gene labels [default: first]
        #[arg(long, default_value = "first")]
        keep: String,

        /// Factor for an explicit contrast
        #[arg(long, requires_all = ["tested", "control"])]
        factor: Option<String>,

        /// Level tested against the control
        #[arg(long, requires = "factor")]
        tested: Option<String>,

        /// Reference level
        #[arg(long, requires = "factor")]
        control: Option<String>,

        /// Minimum samples per group [default: 2]
        #[arg(long, default_value = "2")]
        min_replicates: usize,

        /// Significance threshold for the summary [default: 0.05]
        #[arg(short, long, default_value = "0.05")]
        alpha: f64,

        /// Output directory [default: .]
        #[arg(short, long, default_value = ".")]
        output: String,
    },

    /// Clean a count matrix and write CPM values
    #[command(
        long_about = "Orient and clean a count matrix (numeric columns, labelled and\n\
            unique genes) and write counts-per-million, or log2(CPM + 1) with --log.",
        after_long_help = "\
Examples:
  rnaseq_eda normalize -c counts.csv -g gene_id -o cpm.csv
  rnaseq_eda normalize -c counts.csv -g gene_id -o log_cpm.tsv --log"
    )]
    Normalize {
        /// Path to count matrix file
        #[arg(short, long)]
        counts: String,

        /// Column holding gene identifiers
        #[arg(short, long, value_name = "COLUMN")]
        gene_column: Option<String>,

        /// Occurrence kept for duplicated gene labels [default: first]
        #[arg(long, default_value = "first")]
        keep: String,

        /// Write log2(CPM + 1) instead of CPM
        #[arg(long)]
        log: bool,

        /// Output file path; a .tsv extension writes tab-separated values
        #[arg(short, long)]
        output: String,
    },
}
