//! Barcode codebook: per-round-max decoding and intensity thresholding.
//!
//! The codebook is loaded once from experiment metadata and stays read-only
//! for the whole run, so decoding can fan out across records without locks.
//! A spot whose observed barcode matches no catalog entry is labeled
//! [`UNIDENTIFIED`] — that is data, not an error.

use crate::error::Error;
use crate::intensity::{IntensityTable, SpotRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Target label assigned when no barcode matches.
pub const UNIDENTIFIED: &str = "unidentified";

/// One (round, channel, value) component of a codeword, mirroring the
/// on-disk metadata schema.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct CodewordValue {
    pub r: usize,
    pub c: usize,
    pub v: f32,
}

/// One gene target and its canonical (round, channel) intensity pattern.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CodebookEntry {
    pub target: String,
    pub codeword: Vec<CodewordValue>,
}

impl CodebookEntry {
    pub fn new(target: impl Into<String>, codeword: &[(usize, usize, f32)]) -> Self {
        Self {
            target: target.into(),
            codeword: codeword
                .iter()
                .map(|&(r, c, v)| CodewordValue { r, c, v })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCodebook {
    mappings: Vec<CodebookEntry>,
}

/// Read-only catalog mapping per-round channel signatures to gene targets.
pub struct Codebook {
    rounds: usize,
    channels: usize,
    targets: Vec<String>,
    /// Per-round argmax channel signature of each entry, keyed for decode.
    by_signature: HashMap<Vec<usize>, usize>,
}

impl Codebook {
    /// Build a codebook over a `rounds × channels` grid.
    ///
    /// Every entry's per-round argmax signature must be unique; a duplicate
    /// would make decoding ambiguous and is rejected as a [`Error::Config`].
    pub fn new(rounds: usize, channels: usize, entries: Vec<CodebookEntry>) -> Result<Self, Error> {
        if rounds == 0 || channels == 0 {
            return Err(Error::Config(format!(
                "codebook grid must be non-empty, got {rounds} rounds x {channels} channels"
            )));
        }
        let mut targets = Vec::with_capacity(entries.len());
        let mut by_signature = HashMap::with_capacity(entries.len());

        for entry in entries {
            let mut pattern = vec![0.0f32; rounds * channels];
            for cw in &entry.codeword {
                if cw.r >= rounds || cw.c >= channels {
                    return Err(Error::Config(format!(
                        "codeword of '{}' addresses (round {}, channel {}) outside the {} x {} grid",
                        entry.target, cw.r, cw.c, rounds, channels
                    )));
                }
                pattern[cw.r * channels + cw.c] = cw.v;
            }
            let signature = per_round_argmax(&pattern, rounds, channels);
            if let Some(&prev) = by_signature.get(&signature) {
                let prev: &String = &targets[prev];
                return Err(Error::Config(format!(
                    "barcode of '{}' duplicates the pattern of '{}'",
                    entry.target, prev
                )));
            }
            by_signature.insert(signature, targets.len());
            targets.push(entry.target);
        }

        Ok(Self {
            rounds,
            channels,
            targets,
            by_signature,
        })
    }

    /// Load a codebook from the JSON metadata format
    /// (`{"mappings": [{"codeword": [{"r", "c", "v"}...], "target": ...}]}`).
    /// Grid extents are inferred from the codewords.
    pub fn from_json(path: &Path) -> Result<Self, Error> {
        let data = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawCodebook = serde_json::from_str(&data).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        let rounds = raw
            .mappings
            .iter()
            .flat_map(|m| m.codeword.iter())
            .map(|cw| cw.r + 1)
            .max()
            .unwrap_or(1);
        let channels = raw
            .mappings
            .iter()
            .flat_map(|m| m.codeword.iter())
            .map(|cw| cw.c + 1)
            .max()
            .unwrap_or(1);
        Self::new(rounds, channels, raw.mappings)
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Decode every record of the table: per round take the channel of
    /// maximum intensity, match the resulting signature against the catalog
    /// and sum the per-round maxima into `total_intensity`.
    ///
    /// Pure per-record work; with the `parallel` feature the records fan out
    /// across the current rayon pool.
    pub fn decode_per_round_max(&self, table: &IntensityTable) -> DecodedTable {
        debug_assert_eq!(table.rounds(), self.rounds);
        debug_assert_eq!(table.channels(), self.channels);
        let rows = decode_rows(self, table);
        DecodedTable { rows }
    }

    fn decode_one(&self, table: &IntensityTable, index: usize) -> DecodedSpot {
        let row = table.row(index);
        let signature = per_round_argmax(row, self.rounds, self.channels);
        let total_intensity: f32 = (0..self.rounds)
            .map(|r| row[r * self.channels + signature[r]])
            .sum();
        let target = match self.by_signature.get(&signature) {
            Some(&i) => self.targets[i].clone(),
            None => UNIDENTIFIED.to_string(),
        };
        DecodedSpot {
            record: table.records()[index],
            target,
            total_intensity,
        }
    }
}

#[cfg(feature = "parallel")]
fn decode_rows(codebook: &Codebook, table: &IntensityTable) -> Vec<DecodedSpot> {
    use rayon::prelude::*;

    (0..table.len())
        .into_par_iter()
        .map(|i| codebook.decode_one(table, i))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn decode_rows(codebook: &Codebook, table: &IntensityTable) -> Vec<DecodedSpot> {
    (0..table.len()).map(|i| codebook.decode_one(table, i)).collect()
}

/// Channel of maximum value for each round; ties go to the lowest channel.
fn per_round_argmax(pattern: &[f32], rounds: usize, channels: usize) -> Vec<usize> {
    (0..rounds)
        .map(|r| {
            let row = &pattern[r * channels..(r + 1) * channels];
            let mut best = 0usize;
            for (c, &v) in row.iter().enumerate().skip(1) {
                if v > row[best] {
                    best = c;
                }
            }
            best
        })
        .collect()
}

/// One decoded row: the spot, its gene target and the summed per-round-max
/// intensity.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedSpot {
    #[serde(flatten)]
    pub record: SpotRecord,
    pub target: String,
    pub total_intensity: f32,
}

/// Final output artifact: decoded rows in source order.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedTable {
    pub rows: Vec<DecodedSpot>,
}

impl DecodedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Retain rows with `total_intensity` strictly above `cutoff`,
    /// preserving order.
    pub fn filter_by_intensity(&self, cutoff: f32) -> DecodedTable {
        DecodedTable {
            rows: self
                .rows
                .iter()
                .filter(|r| r.total_intensity > cutoff)
                .cloned()
                .collect(),
        }
    }
}
