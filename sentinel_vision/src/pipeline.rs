// THEORY:
// The `pipeline` module is the top-level analysis API of the engine. It owns the four
// stages and runs them in their fixed order for every frame:
//
//     luma ──► BackgroundModel ──► MaskFilter ──► BlobExtractor ──► MotionEventController
//
// Its input is an unannotated `PreparedFrame` and its output is a `FrameReport`: the
// filtered mask, the surviving blobs (in full-frame coordinates) and the controller's
// signals. It never touches a file, a window or a clock of its own; the caller passes
// in the frame timestamp. That keeps the whole chain deterministic and testable.

use crate::config::SentinelConfig;
use crate::core_modules::background_model::BackgroundModel;
use crate::core_modules::blob::Blob;
use crate::core_modules::blob_extractor::blob_extractor;
use crate::core_modules::event_controller::{EventSignal, EventState, MotionEventController};
use crate::core_modules::frame::PreparedFrame;
use crate::core_modules::mask_filter::mask_filter;
use crate::error::PipelineError;
use chrono::{DateTime, Local};
use image::GrayImage;

/// The result of running one frame through the pipeline.
#[derive(Debug, Clone)]
pub struct FrameReport {
    /// The denoised foreground mask, in ROI coordinates.
    pub mask: GrayImage,
    /// Surviving blobs, translated into full-frame coordinates.
    pub blobs: Vec<Blob>,
    /// Controller signals for this frame, in the order they must be acted on.
    pub signals: Vec<EventSignal>,
}

impl FrameReport {
    pub fn has_motion(&self) -> bool {
        !self.blobs.is_empty()
    }
}

/// The main analysis struct: background model, mask filter, blob extractor and event
/// controller chained together.
pub struct MotionPipeline {
    background: BackgroundModel,
    controller: MotionEventController,
    median_kernel: u32,
    min_area: u32,
    frames_processed: u64,
}

impl MotionPipeline {
    pub fn new(config: &SentinelConfig) -> Self {
        Self {
            background: BackgroundModel::new(config.background.clone()),
            controller: MotionEventController::new(config.clip_frames()),
            median_kernel: config.median_kernel,
            min_area: config.min_area,
            frames_processed: 0,
        }
    }

    /// Runs one prepared frame through all four stages.
    pub fn process(
        &mut self,
        frame: &PreparedFrame,
        now: DateTime<Local>,
    ) -> Result<FrameReport, PipelineError> {
        // --- 1. Per-pixel Classification ---
        let raw_mask = self.background.classify(&frame.luma)?;

        // --- 2. Noise Removal ---
        let mask = mask_filter::denoise(&raw_mask, self.median_kernel);

        // --- 3. Spatial Grouping ---
        let mut blobs = blob_extractor::extract(&mask, self.min_area);
        let (dx, dy) = frame.origin;
        if dx != 0 || dy != 0 {
            for blob in &mut blobs {
                blob.translate(dx, dy);
            }
        }

        // --- 4. Event Lifecycle ---
        let signals = self.controller.on_frame(blobs.len(), now);

        self.frames_processed += 1;
        log::debug!(
            "frame {}: {} blob(s), controller {}",
            self.frames_processed,
            blobs.len(),
            self.controller.state()
        );

        Ok(FrameReport {
            mask,
            blobs,
            signals,
        })
    }

    /// Force-finalizes an open motion event. Returns its `End` signal, if any.
    pub fn finish(&mut self) -> Option<EventSignal> {
        self.controller.finish()
    }

    pub fn state(&self) -> &EventState {
        self.controller.state()
    }

    pub fn events_started(&self) -> u64 {
        self.controller.events_started()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn background_model(&self) -> &BackgroundModel {
        &self.background
    }
}
