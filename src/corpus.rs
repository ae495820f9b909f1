//! Relation corpus: vocabulary interning and relation loading.
//!
//! A corpus is built once, before any embedding is allocated, and is
//! immutable afterwards. It holds three things:
//!
//! - the [`Vocabulary`] mapping node labels to dense indices,
//! - the ordered list of [`Relation`]s (duplicates preserved),
//! - a per-node adjacency set over both directions, used only to exclude
//!   related nodes from negative sampling.
//!
//! Sources are either an in-memory sequence of `(child, parent)` pairs or a
//! delimited-text stream where every record must have exactly two fields.
//! Malformed records are skipped and counted, never fatal; only an
//! unreadable source is an error. Empty input yields a valid zero-relation
//! corpus (training over it is a no-op).

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Bijection between node labels and dense indices.
///
/// Indices are assigned on first sight and stable for the model lifetime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vocabulary {
    index: HashMap<String, usize>,
    labels: Vec<String>,
}

impl Vocabulary {
    /// Create an empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up or assign the index for a label.
    pub fn intern(&mut self, label: &str) -> usize {
        if let Some(&idx) = self.index.get(label) {
            return idx;
        }
        let idx = self.labels.len();
        self.index.insert(label.to_string(), idx);
        self.labels.push(label.to_string());
        idx
    }

    /// Index of a label, if known.
    pub fn get(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Label at an index. Panics if the index is out of range.
    pub fn label(&self, idx: usize) -> &str {
        &self.labels[idx]
    }

    /// Number of distinct nodes.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterate labels in index order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

/// A directed relation: `child` is a hyponym of `parent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    /// Vocabulary index of the child (hyponym).
    pub child: usize,
    /// Vocabulary index of the parent (hypernym).
    pub parent: usize,
}

/// Vocabulary plus relation list plus adjacency sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationCorpus {
    vocab: Vocabulary,
    relations: Vec<Relation>,
    related: Vec<HashSet<usize>>,
    skipped: usize,
}

impl RelationCorpus {
    /// Build a corpus from an in-memory sequence of `(child, parent)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut corpus = Self::default();
        for (child, parent) in pairs {
            corpus.add_pair(child.as_ref(), parent.as_ref());
        }
        corpus
    }

    /// Build a corpus from a delimited-text stream.
    ///
    /// Each record must have exactly two fields separated by `delimiter`;
    /// records with any other field count (and records the reader cannot
    /// decode) are skipped and counted. Only an unreadable source fails.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let mut corpus = Self::default();
        for result in csv_reader.records() {
            match result {
                Ok(record) if record.len() == 2 => {
                    corpus.add_pair(&record[0], &record[1]);
                }
                Ok(_) => corpus.skipped += 1,
                Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
                Err(_) => corpus.skipped += 1,
            }
        }
        tracing::debug!(
            relations = corpus.relations.len(),
            nodes = corpus.vocab.len(),
            skipped = corpus.skipped,
            "corpus loaded"
        );
        Ok(corpus)
    }

    /// Build a corpus from a delimited-text file.
    pub fn from_path<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self> {
        Self::from_reader(File::open(path)?, delimiter)
    }

    fn add_pair(&mut self, child: &str, parent: &str) {
        let child = self.vocab.intern(child);
        let parent = self.vocab.intern(parent);
        while self.related.len() < self.vocab.len() {
            self.related.push(HashSet::new());
        }
        self.relations.push(Relation { child, parent });
        self.related[child].insert(parent);
        self.related[parent].insert(child);
    }

    /// The vocabulary built from this corpus.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Relations in input order, duplicates included.
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Indices related to `idx` in either direction.
    ///
    /// Used for negative-sample exclusion only.
    pub fn related(&self, idx: usize) -> &HashSet<usize> {
        &self.related[idx]
    }

    /// Total relations loaded.
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// Whether the corpus holds no relations.
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Records skipped as malformed during loading.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
