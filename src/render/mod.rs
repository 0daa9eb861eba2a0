//! # Render Job
//!
//! Runs a [`FrameEffect`] over an ordered sequence of still frames and writes
//! the results as numbered PNGs. Frames are resized to a fixed height and
//! padded to a width divisible by 4 before processing, then cropped back.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{ConfigError, RenderError, Result, VhsError},
    video::{resize_to_height, Frame, FrameEffect},
};

const FRAME_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Render job configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Output height in rows; width follows the aspect ratio
    pub height: u32,

    /// Take the second field from the following frame
    pub next_frame_context: bool,

    /// Input frames already hold one field each, so two make an output frame
    pub interlaced_input: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            height: 480,
            next_frame_context: true,
            interlaced_input: false,
        }
    }
}

impl RenderSettings {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.height < 2 {
            return Err(ConfigError::InvalidValue {
                key: "render.height".to_string(),
                value: self.height.to_string()
            }.into());
        }

        Ok(())
    }
}

/// Shared flag asking a running job to stop after the current frame
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// What a finished job produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSummary {
    pub frames_in: usize,
    pub frames_out: usize,
    pub outputs: Vec<PathBuf>,
}

/// Frame sequence render job
#[derive(Debug, Clone)]
pub struct RenderJob {
    settings: RenderSettings,
    stop: StopHandle,
}

impl RenderJob {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            stop: StopHandle::new(),
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Handle that cancels this job from another task
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// List PNG and JPEG files in `dir`, sorted by file name
    pub fn collect_frames<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let mut frames = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_frame = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if path.is_file() && is_frame {
                frames.push(path);
            }
        }

        if frames.is_empty() {
            return Err(RenderError::NoFrames { path: dir.display().to_string() }.into());
        }
        frames.sort();
        Ok(frames)
    }

    /// Load a frame and bring it to the working size.
    ///
    /// Returns the padded frame and the width to crop the output back to.
    pub fn load_frame<P: AsRef<Path>>(&self, path: P) -> Result<(Frame, u32)> {
        let frame = Frame::open(path)?;
        let (width, height) = resize_to_height(frame.dimensions(), self.settings.height)?;
        Ok((frame.resized(width, height).expand_to_4width(), width))
    }

    /// Process a single image file
    pub fn render_image<E: FrameEffect + ?Sized>(
        &self,
        effect: &mut E,
        input: &Path,
        output: &Path,
    ) -> Result<()> {
        let (frame, width) = self.load_frame(input)?;
        let out = effect.process(&frame, None, 0)?;
        out.cropped_width(width).save_png(output)?;
        info!("Wrote {:?}", output);
        Ok(())
    }

    /// Render every frame in `input_dir` into `output_dir` on this thread
    pub fn run_blocking<E: FrameEffect + ?Sized>(
        &self,
        effect: &mut E,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<RenderSummary> {
        let paths = Self::collect_frames(input_dir)?;
        std::fs::create_dir_all(output_dir)?;

        let interlaced = self.settings.interlaced_input;
        let wants_next = interlaced || self.settings.next_frame_context;
        let step = if interlaced { 2 } else { 1 };

        info!(
            "Rendering {} frames with {} into {:?}",
            paths.len(),
            effect.name(),
            output_dir
        );

        let mut outputs = Vec::new();
        let mut lookahead: Option<(usize, Frame, u32)> = None;
        let mut index = 0;

        while index < paths.len() {
            if self.stop.is_stopped() {
                info!("Render stopped after {} frames", outputs.len());
                return Err(RenderError::Cancelled { frames_done: outputs.len() }.into());
            }

            let (current, width) = match lookahead.take() {
                Some((i, frame, width)) if i == index => (frame, width),
                _ => self.load_frame(&paths[index])?,
            };
            let next = match paths.get(index + 1) {
                Some(path) if wants_next => Some(self.load_frame(path)?),
                _ => None,
            };

            let frame_index = outputs.len();
            let out = effect.process(&current, next.as_ref().map(|(f, _)| f), frame_index)?;

            let path = output_dir.join(format!("{:06}.png", frame_index));
            out.cropped_width(width).save_png(&path)?;
            debug!("Wrote {:?}", path);
            outputs.push(path);

            if step == 1 {
                lookahead = next.map(|(frame, width)| (index + 1, frame, width));
            }
            index += step;
        }

        info!("Rendered {} frames", outputs.len());
        Ok(RenderSummary {
            frames_in: paths.len(),
            frames_out: outputs.len(),
            outputs,
        })
    }

    /// Render on a blocking worker thread.
    ///
    /// The effect is moved onto the worker and handed back with the summary.
    pub async fn run<E: FrameEffect + 'static>(
        self,
        mut effect: E,
        input_dir: PathBuf,
        output_dir: PathBuf,
    ) -> Result<(E, RenderSummary)> {
        tokio::task::spawn_blocking(move || {
            let summary = self.run_blocking(&mut effect, &input_dir, &output_dir)?;
            Ok::<_, VhsError>((effect, summary))
        })
        .await
        .map_err(|e| RenderError::WorkerFailed { reason: e.to_string() })?
    }
}
