//! Orchestrator driving filter → detect → aggregate → decode → threshold.
//!
//! Per field of view the orchestrator fans the configured filter pipeline and
//! spot detection out across images on a bounded worker pool, aggregates the
//! surviving spots in source order, and decodes the aggregate once. One
//! image's failure drops only that image: it becomes an [`ImageFailure`] in
//! the run report while the remaining images proceed.

use crate::codebook::{Codebook, DecodedTable};
use crate::detect::SpotDetector;
use crate::error::{Error, ImageFailure};
use crate::events::{ProgressSink, StageEvent, StageStatus, TimingBreakdown};
use crate::filter::FilterPipeline;
use crate::intensity::{ImageSpots, IntensityTable};
use crate::volume::VolumeF32;
use std::time::Instant;

/// One raw acquisition: a volume plus the (round, channel) it was imaged
/// under.
pub struct FieldImage {
    pub round: usize,
    pub channel: usize,
    pub volume: VolumeF32,
}

/// External collaborator producing the raw volumes of one field of view.
/// File-format parsing lives behind this seam, outside the core.
pub trait ImageLoader {
    fn load_field_of_view(&self, name: &str) -> Result<Vec<FieldImage>, Error>;
}

/// Outcome of one field-of-view run: the thresholded decoded table, the
/// per-image failure summary and a coarse timing breakdown.
pub struct RunReport {
    pub table: DecodedTable,
    pub failures: Vec<ImageFailure>,
    /// Images that made it through filtering and detection.
    pub images_processed: usize,
    /// Spots decoded before the intensity threshold.
    pub spots_decoded: usize,
    pub timing: TimingBreakdown,
}

/// Drives the full per-field-of-view sequence.
pub struct PipelineOrchestrator {
    filters: FilterPipeline,
    detector: SpotDetector,
    codebook: Codebook,
    intensity_threshold: f32,
    workers: usize,
}

impl PipelineOrchestrator {
    /// Assemble an orchestrator from already-validated parts.
    ///
    /// `workers = 0` leaves pool sizing to rayon; any other value bounds the
    /// per-image fan-out.
    pub fn new(
        filters: FilterPipeline,
        detector: SpotDetector,
        codebook: Codebook,
        intensity_threshold: f32,
        workers: usize,
    ) -> Result<Self, Error> {
        if !intensity_threshold.is_finite() {
            return Err(Error::Config(format!(
                "intensity threshold must be finite, got {intensity_threshold}"
            )));
        }
        Ok(Self {
            filters,
            detector,
            codebook,
            intensity_threshold,
            workers,
        })
    }

    /// Build the standard clip → bandpass → low-pass → clip pipeline from a
    /// config. Construction fails fast on any invalid stage parameter.
    pub fn from_config(
        config: &crate::config::PipelineConfig,
        codebook: Codebook,
    ) -> Result<Self, Error> {
        let (filters, detector) = config.build_stages()?;
        Self::new(
            filters,
            detector,
            codebook,
            config.intensity_threshold,
            config.workers,
        )
    }

    /// Load and process one field of view by name.
    pub fn run_field_of_view(
        &self,
        loader: &dyn ImageLoader,
        name: &str,
        sink: &dyn ProgressSink,
    ) -> Result<RunReport, Error> {
        let images = loader.load_field_of_view(name)?;
        self.run(images, sink)
    }

    /// Process a sequence of raw volumes end to end.
    ///
    /// The decoded table follows the source image order regardless of which
    /// worker finished first, because aggregation orders by source index.
    pub fn run(&self, images: Vec<FieldImage>, sink: &dyn ProgressSink) -> Result<RunReport, Error> {
        let total_start = Instant::now();

        let filter_start = Instant::now();
        let results = self.map_images(images, sink);
        let filter_ms = filter_start.elapsed().as_secs_f64() * 1000.0;

        let mut sources = Vec::new();
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(spots) => sources.push(spots),
                Err(failure) => {
                    log::warn!("dropping image {}: {}", failure.image, failure.cause);
                    failures.push(failure);
                }
            }
        }
        let images_processed = sources.len();

        let table =
            IntensityTable::concat(self.codebook.rounds(), self.codebook.channels(), &sources)?;

        let decode_start = Instant::now();
        let decoded = self.codebook.decode_per_round_max(&table);
        let decode_ms = decode_start.elapsed().as_secs_f64() * 1000.0;
        emit(sink, "decode", None, StageStatus::Completed, decode_ms);

        let threshold_start = Instant::now();
        let kept = decoded.filter_by_intensity(self.intensity_threshold);
        let threshold_ms = threshold_start.elapsed().as_secs_f64() * 1000.0;
        emit(sink, "threshold", None, StageStatus::Completed, threshold_ms);

        let mut timing = TimingBreakdown {
            total_ms: total_start.elapsed().as_secs_f64() * 1000.0,
            stages: Vec::new(),
        };
        timing.push("filter+detect", filter_ms);
        timing.push("decode", decode_ms);
        timing.push("threshold", threshold_ms);

        Ok(RunReport {
            spots_decoded: decoded.len(),
            table: kept,
            failures,
            images_processed,
            timing,
        })
    }

    /// Filter and detect one image, emitting a stage event per transition.
    fn process_image(
        &self,
        index: usize,
        image: FieldImage,
        sink: &dyn ProgressSink,
    ) -> Result<ImageSpots, ImageFailure> {
        let mut volume = image.volume;
        for stage in self.filters.stages() {
            let start = Instant::now();
            let elapsed = |s: Instant| s.elapsed().as_secs_f64() * 1000.0;
            if let Err(cause) = stage.run(&mut volume) {
                emit(sink, stage.name(), Some(index), StageStatus::Failed, elapsed(start));
                return Err(ImageFailure {
                    stage: stage.name().to_string(),
                    image: index,
                    cause: cause.to_string(),
                });
            }
            emit(sink, stage.name(), Some(index), StageStatus::Completed, elapsed(start));
        }

        let start = Instant::now();
        let spots = self.detector.detect(&volume);
        emit(
            sink,
            "spot_detect",
            Some(index),
            StageStatus::Completed,
            start.elapsed().as_secs_f64() * 1000.0,
        );

        Ok(ImageSpots {
            source: index,
            round: image.round,
            channel: image.channel,
            spots,
        })
    }

    #[cfg(feature = "parallel")]
    fn map_images(
        &self,
        images: Vec<FieldImage>,
        sink: &dyn ProgressSink,
    ) -> Vec<Result<ImageSpots, ImageFailure>> {
        use rayon::prelude::*;

        let work = |images: Vec<FieldImage>| {
            images
                .into_par_iter()
                .enumerate()
                .map(|(index, image)| self.process_image(index, image, sink))
                .collect()
        };

        if self.workers == 0 {
            return work(images);
        }
        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
        {
            Ok(pool) => pool.install(|| work(images)),
            Err(e) => {
                log::warn!("worker pool unavailable ({e}), falling back to the global pool");
                work(images)
            }
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn map_images(
        &self,
        images: Vec<FieldImage>,
        sink: &dyn ProgressSink,
    ) -> Vec<Result<ImageSpots, ImageFailure>> {
        images
            .into_iter()
            .enumerate()
            .map(|(index, image)| self.process_image(index, image, sink))
            .collect()
    }
}

fn emit(sink: &dyn ProgressSink, stage: &str, image: Option<usize>, status: StageStatus, ms: f64) {
    sink.stage_event(&StageEvent {
        stage: stage.to_string(),
        image,
        status,
        elapsed_ms: ms,
    });
}
