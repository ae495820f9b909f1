//! Persistence boundary: resumable snapshots and portable vector export.
//!
//! Two formats, both delegated here so the core types stay
//! format-agnostic:
//!
//! - **Snapshot**: the whole model (vocabulary, relations, table, training
//!   state, configuration) as JSON. Loading one resumes training exactly
//!   where it stopped, burn-in accounting included.
//! - **Vectors-only export**: one tab-separated row per node,
//!   `label \t c0 \t c1 ...`. Portable across tools; importing rebuilds a
//!   vocabulary and table but starts training state from scratch.

use crate::config::DEFAULT_BOUNDARY_EPS;
use crate::corpus::Vocabulary;
use crate::embedding::EmbeddingTable;
use crate::error::{Error, Result};
use crate::trainer::PoincareModel;
use ndarray::Array2;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Write a full resumable snapshot of the model to `path`.
pub fn save_snapshot<P: AsRef<Path>>(path: P, model: &PoincareModel) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer(BufWriter::new(file), model)?;
    Ok(())
}

/// Load a snapshot written by [`save_snapshot`].
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<PoincareModel> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Export vectors as one tab-separated row per node, keyed by label.
pub fn export_vectors<W: Write>(
    writer: W,
    vocab: &Vocabulary,
    table: &EmbeddingTable,
) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer);
    for idx in 0..vocab.len() {
        let mut record = Vec::with_capacity(1 + table.dim());
        record.push(vocab.label(idx).to_string());
        record.extend(table.row(idx).iter().map(|x| x.to_string()));
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Import vectors written by [`export_vectors`].
///
/// The first row fixes the dimension; later rows must match it, every
/// coordinate must parse as a float, and labels must be distinct. Unlike
/// corpus loading, a malformed row here is an error: silently dropping
/// nodes from an export would corrupt the model rather than merely thin
/// the training signal.
pub fn import_vectors<R: Read>(reader: R) -> Result<(Vocabulary, EmbeddingTable)> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(b'\t')
        .from_reader(reader);

    let mut vocab = Vocabulary::new();
    let mut rows: Vec<f64> = Vec::new();
    let mut dim: Option<usize> = None;

    for (row_idx, result) in csv_reader.records().enumerate() {
        let record = result?;
        if record.len() < 2 {
            return Err(Error::MalformedVector {
                row: row_idx,
                reason: format!("expected a label and coordinates, got {} fields", record.len()),
            });
        }
        let row_dim = record.len() - 1;
        match dim {
            None => dim = Some(row_dim),
            Some(expected) if expected != row_dim => {
                return Err(Error::MalformedVector {
                    row: row_idx,
                    reason: format!("dimension {row_dim} does not match {expected}"),
                });
            }
            Some(_) => {}
        }
        let before = vocab.len();
        vocab.intern(&record[0]);
        if vocab.len() == before {
            return Err(Error::MalformedVector {
                row: row_idx,
                reason: format!("duplicate label {:?}", &record[0]),
            });
        }
        for field in record.iter().skip(1) {
            let value: f64 = field.parse().map_err(|_| Error::MalformedVector {
                row: row_idx,
                reason: format!("unparsable coordinate {field:?}"),
            })?;
            rows.push(value);
        }
    }

    let dim = dim.unwrap_or(0);
    let vectors = Array2::from_shape_vec((vocab.len(), dim), rows)
        .expect("row count and dimension are consistent by construction");
    Ok((vocab, EmbeddingTable::from_vectors(vectors, DEFAULT_BOUNDARY_EPS)))
}
