// THEORY:
// The `BackgroundModel` is the temporal analysis layer of the engine. Like a grid of
// tiny statisticians, it keeps one learning entity per pixel, a `PixelModel`, which
// watches the stream of intensities at its location and decides whether the current
// value is "the usual" or something new.
//
// Key architectural principles:
// 1.  **Mixture Memory**: A pixel's history is summarised by a handful of weighted
//     Gaussian components. A swaying branch or a blinking LED produces two or three
//     well-populated components, all of them background.
// 2.  **Variance-Relative Matching**: A value matches a component when its squared
//     distance to the mean is below `var_threshold` times the component variance. Noisy
//     pixels tolerate large swings, quiet pixels flag small ones.
// 3.  **Adaptive Learning**: Every match nudges the component towards the value with a
//     learning rate of `1 / min(2 * age, history)`. Young models learn fast, mature
//     models forget old observations over roughly `history` frames.
// 4.  **Background Selection**: Components are ranked by `weight / sigma`. The top of
//     that ranking, until `background_ratio` of the weight is covered, is background.
//     A pixel is foreground when its value matched none of those.
//
// The first frame seeds every pixel with a single component and is reported as all
// background. A global lighting change produces a burst of foreground that fades as
// the new appearance accumulates weight; that is expected behaviour.

use crate::config::{BackgroundConfig, MAX_COMPONENTS};
use crate::core_modules::frame::{BACKGROUND, FOREGROUND};
use crate::error::PipelineError;
use image::{GrayImage, Luma};

/// A single Gaussian component of a pixel's mixture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Gaussian {
    pub weight: f32,
    pub mean: f32,
    pub variance: f32,
}

impl Gaussian {
    /// Ranking key: heavy, tight components are the most "background-like".
    fn fitness(&self) -> f32 {
        self.weight / self.variance.sqrt()
    }
}

/// Learning parameters resolved for one frame.
#[derive(Debug, Clone, Copy)]
struct Step {
    alpha: f32,
    var_threshold: f32,
    background_ratio: f32,
    max_components: usize,
    var_init: f32,
    var_min: f32,
    var_max: f32,
}

/// The statistical state for one pixel location.
#[derive(Debug, Clone, Copy, Default)]
pub struct PixelModel {
    components: [Gaussian; MAX_COMPONENTS],
    len: usize,
}

impl PixelModel {
    fn seeded(value: f32, var_init: f32) -> Self {
        let mut model = Self::default();
        model.components[0] = Gaussian {
            weight: 1.0,
            mean: value,
            variance: var_init,
        };
        model.len = 1;
        model
    }

    pub fn components(&self) -> &[Gaussian] {
        &self.components[..self.len]
    }

    pub fn weight_sum(&self) -> f32 {
        self.components().iter().map(|g| g.weight).sum()
    }

    /// The component with the highest weight, i.e. the pixel's most likely appearance.
    pub fn dominant(&self) -> Option<&Gaussian> {
        self.components()
            .iter()
            .max_by(|a, b| a.weight.total_cmp(&b.weight))
    }

    /// Indices of the live components ordered by descending fitness.
    fn ranking(&self) -> ([usize; MAX_COMPONENTS], usize) {
        let mut order = [0usize; MAX_COMPONENTS];
        for (index, slot) in order.iter_mut().enumerate().take(self.len) {
            *slot = index;
        }
        let ranked = &mut order[..self.len];
        ranked.sort_by(|&a, &b| {
            self.components[b]
                .fitness()
                .total_cmp(&self.components[a].fitness())
        });
        (order, self.len)
    }

    /// Classifies `value` against the current state, then learns from it.
    /// Returns `true` when the value is foreground.
    fn observe(&mut self, value: f32, step: &Step) -> bool {
        // --- 1. Classification against the pre-update model ---
        let (order, len) = self.ranking();
        let mut accumulated = 0.0f32;
        let mut matched: Option<usize> = None;
        let mut matched_is_background = false;

        for &index in &order[..len] {
            let in_background = accumulated < step.background_ratio;
            accumulated += self.components[index].weight;

            let component = &self.components[index];
            let diff = value - component.mean;
            if diff * diff < step.var_threshold * component.variance {
                matched = Some(index);
                matched_is_background = in_background;
                break;
            }
        }

        // --- 2. Learning ---
        match matched {
            Some(index) => self.reinforce(index, value, step),
            None => self.spawn(value, step),
        }
        self.normalize();

        !matched_is_background
    }

    fn reinforce(&mut self, index: usize, value: f32, step: &Step) {
        let decay = 1.0 - step.alpha;
        for component in &mut self.components[..self.len] {
            component.weight *= decay;
        }

        let component = &mut self.components[index];
        component.weight += step.alpha;

        let rho = (step.alpha / component.weight).min(1.0);
        let diff = value - component.mean;
        component.mean += rho * diff;
        component.variance = (component.variance + rho * (diff * diff - component.variance))
            .clamp(step.var_min, step.var_max);
    }

    fn spawn(&mut self, value: f32, step: &Step) {
        let fresh = Gaussian {
            weight: step.alpha,
            mean: value,
            variance: step.var_init,
        };

        if self.len < step.max_components {
            self.components[self.len] = fresh;
            self.len += 1;
            return;
        }

        let weakest = self.components[..self.len]
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.weight.total_cmp(&b.weight))
            .map(|(index, _)| index)
            .unwrap_or(0);
        self.components[weakest] = fresh;
    }

    fn normalize(&mut self) {
        let total = self.weight_sum();
        if total <= f32::EPSILON {
            // Degenerate; fall back to an even split rather than dividing by zero.
            let even = 1.0 / self.len as f32;
            for component in &mut self.components[..self.len] {
                component.weight = even;
            }
            return;
        }
        let scale = 1.0 / total;
        for component in &mut self.components[..self.len] {
            component.weight *= scale;
        }
    }
}

/// Owns one `PixelModel` per pixel and turns grayscale frames into foreground masks.
pub struct BackgroundModel {
    config: BackgroundConfig,
    /// Frame dimensions, fixed by the first frame.
    dimensions: Option<(u32, u32)>,
    pixels: Vec<PixelModel>,
    /// Frames observed so far, including the seeding frame.
    age: u64,
}

impl BackgroundModel {
    pub fn new(config: BackgroundConfig) -> Self {
        Self {
            config,
            dimensions: None,
            pixels: Vec::new(),
            age: 0,
        }
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }

    /// Learning rate that will be used for the next frame.
    pub fn learning_rate(&self) -> f32 {
        let ramp = (self.age + 1).saturating_mul(2);
        1.0 / ramp.min(self.config.history.max(1) as u64) as f32
    }

    /// The model state for the pixel at (`x`, `y`), once seeded.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&PixelModel> {
        let (width, height) = self.dimensions?;
        if x >= width || y >= height {
            return None;
        }
        self.pixels.get((y * width + x) as usize)
    }

    /// Classifies `frame` into a foreground mask and updates every pixel model with it.
    pub fn classify(&mut self, frame: &GrayImage) -> Result<GrayImage, PipelineError> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Err(PipelineError::EmptyFrame);
        }

        let Some((model_width, model_height)) = self.dimensions else {
            self.seed(frame);
            return Ok(GrayImage::from_pixel(width, height, Luma([BACKGROUND])));
        };

        if (width, height) != (model_width, model_height) {
            return Err(PipelineError::FrameSizeMismatch {
                width: model_width,
                height: model_height,
                got_width: width,
                got_height: height,
            });
        }

        let step = Step {
            alpha: self.learning_rate(),
            var_threshold: self.config.var_threshold,
            background_ratio: self.config.background_ratio,
            max_components: self.config.max_components.clamp(1, MAX_COMPONENTS),
            var_init: self.config.var_init,
            var_min: self.config.var_min,
            var_max: self.config.var_max,
        };

        let mask_data: Vec<u8> = self
            .pixels
            .iter_mut()
            .zip(frame.as_raw())
            .map(|(model, &value)| {
                if model.observe(value as f32, &step) {
                    FOREGROUND
                } else {
                    BACKGROUND
                }
            })
            .collect();
        self.age += 1;

        Ok(GrayImage::from_raw(width, height, mask_data)
            .unwrap_or_else(|| GrayImage::new(width, height)))
    }

    /// Renders the mean of each pixel's dominant component.
    pub fn background_image(&self) -> Option<GrayImage> {
        let (width, height) = self.dimensions?;
        let data = self
            .pixels
            .iter()
            .map(|model| {
                model
                    .dominant()
                    .map_or(0, |g| g.mean.round().clamp(0.0, 255.0) as u8)
            })
            .collect();
        GrayImage::from_raw(width, height, data)
    }

    fn seed(&mut self, frame: &GrayImage) {
        let var_init = self.config.var_init;
        self.pixels = frame
            .as_raw()
            .iter()
            .map(|&value| PixelModel::seeded(value as f32, var_init))
            .collect();
        self.dimensions = Some(frame.dimensions());
        self.age = 1;
        log::debug!(
            "background model seeded with a {}x{} frame",
            frame.width(),
            frame.height()
        );
    }
}
