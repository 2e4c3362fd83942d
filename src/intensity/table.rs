//! Detected spots and the aggregated per-(round, channel) intensity table.

use crate::error::Error;
use serde::Serialize;

/// One detected local maximum. Immutable once emitted by the detector.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotRecord {
    /// Sub-voxel z coordinate (plane units).
    pub z: f32,
    /// Sub-voxel y coordinate.
    pub y: f32,
    /// Sub-voxel x coordinate.
    pub x: f32,
    /// Integrated intensity over the detection box.
    pub mass: f32,
    /// RMS intensity-weighted radius (voxels).
    pub size: f32,
    /// Index of the source image this spot came from; stamped during
    /// aggregation.
    pub source_image: usize,
}

/// Spots detected on one source image, labeled with the (round, channel)
/// that image was acquired under and its index in the field-of-view sequence.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSpots {
    pub source: usize,
    pub round: usize,
    pub channel: usize,
    pub spots: Vec<SpotRecord>,
}

/// Ordered spot records plus one `rounds × channels` intensity vector per
/// record, built by concatenating per-image collections.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntensityTable {
    rounds: usize,
    channels: usize,
    records: Vec<SpotRecord>,
    /// Row-major `len() × rounds × channels` intensity matrix.
    intensities: Vec<f32>,
}

impl IntensityTable {
    /// Concatenate per-image spot collections in the given order.
    ///
    /// Each record is stamped with its collection's source index and its
    /// intensity vector carries the spot mass at the image's
    /// (round, channel). A collection addressing a (round, channel) outside
    /// the declared grid is rejected with [`Error::ShapeMismatch`].
    pub fn concat(rounds: usize, channels: usize, sources: &[ImageSpots]) -> Result<Self, Error> {
        if rounds == 0 || channels == 0 {
            return Err(Error::ShapeMismatch(format!(
                "intensity grid must be non-empty, got {rounds} rounds x {channels} channels"
            )));
        }
        let row_len = rounds * channels;
        let total: usize = sources.iter().map(|s| s.spots.len()).sum();
        let mut records = Vec::with_capacity(total);
        let mut intensities = vec![0.0f32; total * row_len];

        for src in sources {
            if src.round >= rounds || src.channel >= channels {
                return Err(Error::ShapeMismatch(format!(
                    "image {} addresses (round {}, channel {}) outside the {} x {} grid",
                    src.source, src.round, src.channel, rounds, channels
                )));
            }
            for spot in &src.spots {
                let mut record = *spot;
                record.source_image = src.source;
                let row = records.len() * row_len;
                intensities[row + src.round * channels + src.channel] = record.mass;
                records.push(record);
            }
        }

        Ok(Self {
            rounds,
            channels,
            records,
            intensities,
        })
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SpotRecord] {
        &self.records
    }

    /// Intensity vector of one record, `rounds × channels` row-major.
    pub fn row(&self, record: usize) -> &[f32] {
        let len = self.rounds * self.channels;
        &self.intensities[record * len..(record + 1) * len]
    }

    /// Intensity of one record at (round, channel).
    pub fn intensity(&self, record: usize, round: usize, channel: usize) -> f32 {
        self.intensities[record * self.rounds * self.channels + round * self.channels + channel]
    }
}
