//! rnaseq_eda command-line interface

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use log::{info, LevelFilter};

use rnaseq_eda::cli::{find_subcommand, Cli, Commands};
use rnaseq_eda::prelude::*;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if find_subcommand(&args).is_none() {
        if args.len() == 1 {
            print_no_args();
            return;
        }
        if args.iter().any(|a| a == "--help") {
            print_long_help();
            return;
        }
        if args.iter().any(|a| a == "-h") {
            print_short_help();
            return;
        }
        if args.iter().any(|a| a == "-V" || a == "--version") {
            println!("rnaseq_eda {}", VERSION);
            return;
        }
        print_no_args();
        return;
    }

    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    if cli.threads > 0 {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
        {
            log::warn!("Could not configure thread pool: {}", e);
        }
    }

    let result = match cli.command {
        Some(Commands::Eda {
            counts,
            design,
            gene_column,
            no_design_header,
            keep,
            color_by,
            output,
        }) => run_eda(
            &Inputs {
                counts: &counts,
                design: &design,
                gene_column: gene_column.as_deref(),
                design_header: !no_design_header,
                keep: &keep,
            },
            color_by,
            &output,
        ),
        Some(Commands::Dge {
            counts,
            design,
            gene_column,
            no_design_header,
            keep,
            factor,
            tested,
            control,
            min_replicates,
            alpha,
            output,
        }) => {
            let spec = match (factor, tested, control) {
                (Some(factor), Some(tested), Some(control)) => {
                    ContrastSpec::explicit(&factor, &tested, &control)
                }
                _ => ContrastSpec::Automatic,
            };
            run_dge(
                &Inputs {
                    counts: &counts,
                    design: &design,
                    gene_column: gene_column.as_deref(),
                    design_header: !no_design_header,
                    keep: &keep,
                },
                &spec,
                min_replicates,
                alpha,
                &output,
            )
        }
        Some(Commands::Normalize {
            counts,
            gene_column,
            keep,
            log,
            output,
        }) => run_normalize(&counts, gene_column.as_deref(), &keep, log, &output),
        None => {
            print_no_args();
            return;
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Custom help output
// ---------------------------------------------------------------------------

fn print_no_args() {
    println!("rnaseq_eda v{}", VERSION);
    println!("Run `rnaseq_eda -h` for usage or `rnaseq_eda --help` for detailed information.");
}

fn print_short_help() {
    println!("rnaseq_eda v{}", VERSION);
    println!();
    println!("Usage: rnaseq_eda <COMMAND> [OPTIONS]");
    println!();
    println!("Commands:");
    println!("  eda        Validate inputs and compute exploratory artifacts");
    println!("  dge        Two-group differential expression");
    println!("  normalize  Clean a count matrix and write CPM values");
    println!();
    println!("Run `rnaseq_eda <COMMAND> --help` for command-specific options.");
}

fn print_long_help() {
    println!("rnaseq_eda v{}", VERSION);
    println!("Validation, exploratory analysis and differential expression for RNA-seq counts");
    println!();
    println!("Usage: rnaseq_eda <COMMAND> [OPTIONS]");
    println!();
    println!("Commands:");
    println!("  eda        Validate inputs and compute exploratory artifacts");
    println!("               - orientation, numeric columns, gene labels, sample names");
    println!("               - library sizes, PCA and sample correlation on log2(CPM + 1)");
    println!("  dge        Two-group differential expression");
    println!("               - explicit or automatic contrast");
    println!("               - per-gene t-test, BH-adjusted p-values");
    println!("  normalize  Clean a count matrix and write CPM values");
    println!();
    println!("Global Options:");
    println!("  -v, --verbose    Enable verbose output");
    println!("  -t, --threads    Number of threads (0 = auto)");
    println!("  -h               Print short help");
    println!("      --help       Print detailed help");
    println!("  -V, --version    Print version");
    println!();
    println!("Examples:");
    println!("  rnaseq_eda eda -c counts.csv -m design.csv -g gene_id -o eda_out");
    println!();
    println!("  rnaseq_eda dge -c counts.csv -m design.csv -g gene_id \\");
    println!("    --factor condition --tested treated --control untreated");
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

/// Paths and parsing options shared by `eda` and `dge`
struct Inputs<'a> {
    counts: &'a str,
    design: &'a str,
    gene_column: Option<&'a str>,
    design_header: bool,
    keep: &'a str,
}

/// Read both tables and validate them in a fresh session
fn open_session(inputs: &Inputs, embedding: EmbeddingParams) -> Result<AnalysisSession> {
    let config = SessionConfig {
        validation: ValidationParams {
            keep: inputs.keep.parse()?,
        },
        embedding,
    };

    info!("Loading count matrix from: {}", inputs.counts);
    let table = read_count_table(inputs.counts, inputs.gene_column)?;
    info!("  {} rows, {} columns", table.n_rows(), table.n_cols());

    info!("Loading design matrix from: {}", inputs.design);
    let design = read_design(
        inputs.design,
        &DesignOptions {
            has_header: inputs.design_header,
        },
    )?;
    info!("  {} samples, {} factors", design.n_samples(), design.n_factors());

    let mut session = AnalysisSession::new(config);
    session.validate(&table, &design).map_err(print_failure)?;
    Ok(session)
}

/// Show the diagnostics gathered up to a failure, keep the error
fn print_failure(failure: PipelineFailure) -> AnalysisError {
    print!("\n{}", failure.report);
    failure.error
}

fn output_dir(path: &str) -> Result<PathBuf> {
    let dir = PathBuf::from(path);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn write_processed(dir: &Path, session: &AnalysisSession) -> Result<()> {
    let data = session.data().ok_or_else(|| AnalysisError::InvalidState {
        operation: "write processed tables".to_string(),
        state: session.state().to_string(),
    })?;
    let gene_options = WriteOptions {
        index_label: "gene".to_string(),
        ..Default::default()
    };
    let sample_options = WriteOptions {
        index_label: "sample".to_string(),
        ..Default::default()
    };

    write_count_matrix(dir.join("processed_count_matrix.csv"), &data.counts, &gene_options)?;
    write_design(dir.join("processed_design_matrix.csv"), &data.design, &sample_options)?;
    write_report(dir.join("analysis_report.json"), session.report())?;
    Ok(())
}

fn run_eda(inputs: &Inputs, color_by: Option<String>, output: &str) -> Result<()> {
    let dir = output_dir(output)?;
    let mut session = open_session(
        inputs,
        EmbeddingParams {
            color_by,
            ..Default::default()
        },
    )?;
    write_processed(&dir, &session)?;
    print!("\n{}", session.report());

    info!("Computing exploratory artifacts...");
    let artifacts = session
        .compute_embeddings(&EmbeddingEngines::default())
        .map_err(print_failure)?;
    let options = WriteOptions {
        index_label: "sample".to_string(),
        ..Default::default()
    };

    write_library_sizes(dir.join("library_sizes.csv"), &artifacts.library_sizes, &options)?;
    write_embedding(dir.join("pca_result.csv"), &artifacts.pca, &options)?;
    if let Some(umap) = &artifacts.umap {
        write_embedding(dir.join("umap_result.csv"), umap, &options)?;
    }
    write_correlation(dir.join("sample_correlation.csv"), &artifacts.correlation, &options)?;

    print!("{}", artifacts.report);
    session.finish()?;

    info!("Done! Results written to: {}", dir.display());
    Ok(())
}

fn run_dge(
    inputs: &Inputs,
    spec: &ContrastSpec,
    min_replicates: usize,
    alpha: f64,
    output: &str,
) -> Result<()> {
    let dir = output_dir(output)?;
    let mut session = open_session(inputs, EmbeddingParams::default())?;
    write_processed(&dir, &session)?;
    print!("\n{}", session.report());

    let engine = TTestEngine::new(TTestParams { min_replicates });
    info!("Running {} engine...", engine.name());
    let run = session.run_dge(&engine, spec).map_err(print_failure)?;

    let path = dir.join("dge_results.csv");
    info!("Writing results to: {}", path.display());
    write_dge_results(
        &path,
        &run.results,
        &WriteOptions {
            index_label: "gene".to_string(),
            ..Default::default()
        },
    )?;

    print!("{}", run.report);
    println!("\n{}", run.results.summary(alpha));
    session.finish()?;
    Ok(())
}

fn run_normalize(
    counts_path: &str,
    gene_column: Option<&str>,
    keep: &str,
    log_scale: bool,
    output_path: &str,
) -> Result<()> {
    info!("Loading count matrix from: {}", counts_path);
    let table = read_count_table(counts_path, gene_column)?;

    let params = ValidationParams { keep: keep.parse()? };
    let mut report = ReportBuilder::new();
    let counts = clean_counts(&table, &params, &mut report)?;
    info!("  {} genes, {} samples", counts.n_genes(), counts.n_samples());

    let scale = if log_scale { Scale::LogCpm } else { Scale::Cpm };
    let normalized = NormalizedMatrix::with_scale(&counts, scale)?;

    let delimiter = if output_path.ends_with(".tsv") { b'\t' } else { b',' };
    info!("Writing normalized counts to: {}", output_path);
    write_normalized(
        output_path,
        &normalized,
        &WriteOptions {
            delimiter,
            index_label: "gene".to_string(),
        },
    )?;

    info!("Done!");
    Ok(())
}
