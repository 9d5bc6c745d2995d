//! Delimited-text snapshots of processed tables and artifacts

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{Writer, WriterBuilder};

use super::results::{DgeResults, BASE_MEAN, LOG2_FOLD_CHANGE, PADJ, PVALUE};
use crate::data::{AnalysisReport, CountMatrix, DesignMatrix};
use crate::error::Result;
use crate::pipeline::{EmbeddingTable, LibrarySizes, NormalizedMatrix, SampleCorrelation};

/// Options shared by every table writer
#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub delimiter: u8,
    /// Header of the row-identifier column
    pub index_label: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            index_label: String::new(),
        }
    }
}

impl WriteOptions {
    fn writer<P: AsRef<Path>>(&self, path: P) -> Result<Writer<File>> {
        Ok(WriterBuilder::new().delimiter(self.delimiter).from_path(path)?)
    }

    fn header<'a>(&'a self, columns: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        std::iter::once(self.index_label.as_str()).chain(columns).collect()
    }
}

/// Genes as rows, samples as columns
pub fn write_count_matrix<P: AsRef<Path>>(path: P, counts: &CountMatrix, options: &WriteOptions) -> Result<()> {
    let mut wtr = options.writer(path)?;
    wtr.write_record(options.header(counts.sample_ids().iter().map(|s| s.as_str())))?;

    for (i, gene) in counts.gene_ids().iter().enumerate() {
        let mut record = vec![gene.clone()];
        record.extend(counts.gene_counts(i).iter().map(|v| v.to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// CPM or log-CPM values, genes as rows
pub fn write_normalized<P: AsRef<Path>>(path: P, table: &NormalizedMatrix, options: &WriteOptions) -> Result<()> {
    let mut wtr = options.writer(path)?;
    wtr.write_record(options.header(table.sample_ids().iter().map(|s| s.as_str())))?;

    for (gene, values) in table.gene_ids().iter().zip(table.values().rows()) {
        let mut record = vec![gene.clone()];
        record.extend(values.iter().map(|v| v.to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Samples as rows, factors as columns
pub fn write_design<P: AsRef<Path>>(path: P, design: &DesignMatrix, options: &WriteOptions) -> Result<()> {
    let mut wtr = options.writer(path)?;
    wtr.write_record(options.header(design.factors().iter().map(|f| f.name.as_str())))?;

    for (i, sample) in design.sample_ids().iter().enumerate() {
        let mut record = vec![sample.as_str()];
        record.extend(design.factors().iter().map(|f| f.values[i].as_str()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Sample coordinates plus the annotation factor
pub fn write_embedding<P: AsRef<Path>>(path: P, table: &EmbeddingTable, options: &WriteOptions) -> Result<()> {
    let columns = table.columns();
    let mut wtr = options.writer(path)?;
    wtr.write_record(options.header(columns.iter().map(|s| s.as_str())))?;

    for (i, sample) in table.sample_ids.iter().enumerate() {
        let mut record = vec![sample.clone()];
        record.extend(table.coords.row(i).iter().map(|v| v.to_string()));
        if let Some(factor) = &table.annotation {
            record.push(factor.values[i].clone());
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_library_sizes<P: AsRef<Path>>(path: P, sizes: &LibrarySizes, options: &WriteOptions) -> Result<()> {
    let mut columns = vec!["library_size"];
    if let Some(factor) = &sizes.annotation {
        columns.push(factor.name.as_str());
    }
    let mut wtr = options.writer(path)?;
    wtr.write_record(options.header(columns))?;

    for (i, (sample, total)) in sizes.sample_ids.iter().zip(&sizes.totals).enumerate() {
        let mut record = vec![sample.clone(), total.to_string()];
        if let Some(factor) = &sizes.annotation {
            record.push(factor.values[i].clone());
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Square sample-by-sample matrix
pub fn write_correlation<P: AsRef<Path>>(path: P, corr: &SampleCorrelation, options: &WriteOptions) -> Result<()> {
    let mut wtr = options.writer(path)?;
    wtr.write_record(options.header(corr.sample_ids.iter().map(|s| s.as_str())))?;

    for (i, sample) in corr.sample_ids.iter().enumerate() {
        let mut record = vec![sample.clone()];
        record.extend(corr.values.row(i).iter().map(|v| v.to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Sanitized differential expression table, one row per gene
pub fn write_dge_results<P: AsRef<Path>>(path: P, results: &DgeResults, options: &WriteOptions) -> Result<()> {
    let mut wtr = options.writer(path)?;
    wtr.write_record(options.header([BASE_MEAN, LOG2_FOLD_CHANGE, PVALUE, PADJ]))?;

    for (i, gene) in results.gene_ids.iter().enumerate() {
        wtr.write_record([
            gene.clone(),
            results.base_means[i].to_string(),
            results.log2_fold_changes[i].to_string(),
            format!("{:e}", results.pvalues[i]),
            format!("{:e}", results.padj[i]),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Report entries as pretty-printed JSON
pub fn write_report<P: AsRef<Path>>(path: P, report: &AnalysisReport) -> Result<()> {
    let mut file = File::create(path)?;
    serde_json::to_writer_pretty(&mut file, report)?;
    writeln!(file)?;
    Ok(())
}
