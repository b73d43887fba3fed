#![deny(clippy::all)]
#![forbid(unsafe_code)]

//! Writes automaton snapshots to disk: a single PNG, or an MP4 assembled by
//! an external `ffmpeg` process from a temporary directory of PNG frames.

use automaton_grid::Snapshot;
use image::{ImageError, ImageFormat};
use log::{debug, info};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

pub const DEFAULT_FRAME_RATE: u32 = 10;

const DEFAULT_PROGRAM: &str = "ffmpeg";
const DEFAULT_CODEC: &str = "libx264";
const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";
const FRAME_DIR_PREFIX: &str = "ca_frames";
const FRAME_GLOB: &str = "frame_*.png";
const MIN_FRAME_DIGITS: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no frames to export")]
    NoFrames,

    #[error("frame rate must be at least 1")]
    InvalidFrameRate,

    #[error("failed to save image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("failed to create temporary frame directory: {0}")]
    FrameDir(#[source] io::Error),

    #[error("failed to save frame {index}: {source}")]
    Frame {
        index: usize,
        #[source]
        source: ImageError,
    },

    #[error("failed to run {program:?}: {source}")]
    Spawn {
        program: OsString,
        #[source]
        source: io::Error,
    },

    #[error("{program:?} failed with {status}")]
    Encoder {
        program: OsString,
        status: ExitStatus,
    },
}

/// Saves `snapshot` as a PNG file.
pub fn save_png(snapshot: &Snapshot, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    snapshot
        .as_image()
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| ExportError::Image {
            path: path.to_path_buf(),
            source,
        })?;
    info!(
        "Saved {}x{} image to {}",
        snapshot.width(),
        snapshot.height(),
        path.display()
    );
    Ok(())
}

/// Encodes `frames` as a video with the default encoder settings.
pub fn encode_video(frames: &[Snapshot], output: impl AsRef<Path>) -> Result<(), ExportError> {
    VideoEncoder::default().encode(frames, output)
}

/// Runs an external encoder over a directory of numbered PNG frames.
///
/// The frame directory is a [`tempfile::TempDir`], removed when `encode`
/// returns whether or not encoding succeeded.
#[derive(Clone, Debug)]
pub struct VideoEncoder {
    program: OsString,
    frame_rate: u32,
    codec: String,
    pixel_format: String,
    temp_root: Option<PathBuf>,
}

impl Default for VideoEncoder {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.into(),
            frame_rate: DEFAULT_FRAME_RATE,
            codec: DEFAULT_CODEC.to_string(),
            pixel_format: DEFAULT_PIXEL_FORMAT.to_string(),
            temp_root: None,
        }
    }
}

impl VideoEncoder {
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = codec.into();
        self
    }

    pub fn with_pixel_format(mut self, pixel_format: impl Into<String>) -> Self {
        self.pixel_format = pixel_format.into();
        self
    }

    /// Directory to create the temporary frame directory in, instead of the
    /// system temp directory.
    pub fn with_temp_root(mut self, temp_root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(temp_root.into());
        self
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    pub fn encode(
        &self,
        frames: &[Snapshot],
        output: impl AsRef<Path>,
    ) -> Result<(), ExportError> {
        if frames.is_empty() {
            return Err(ExportError::NoFrames);
        }
        if self.frame_rate == 0 {
            return Err(ExportError::InvalidFrameRate);
        }

        let frame_dir = self.frame_dir().map_err(ExportError::FrameDir)?;
        let dir = frame_dir.path();
        debug!("Writing {} frames to {}", frames.len(), dir.display());
        let digits = frame_digits(frames.len());
        for (index, frame) in frames.iter().enumerate() {
            let path = dir.join(frame_file_name(index, digits));
            frame
                .as_image()
                .save_with_format(&path, ImageFormat::Png)
                .map_err(|source| ExportError::Frame { index, source })?;
        }

        self.run(dir, output.as_ref())
    }

    fn frame_dir(&self) -> io::Result<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(FRAME_DIR_PREFIX);
        match &self.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
    }

    fn run(&self, frame_dir: &Path, output: &Path) -> Result<(), ExportError> {
        let mut command = self.command(frame_dir, output);
        debug!("Running {:?}", command);
        let status = command.status().map_err(|source| ExportError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        if !status.success() {
            return Err(ExportError::Encoder {
                program: self.program.clone(),
                status,
            });
        }
        info!("Encoded video {}", output.display());
        Ok(())
    }

    fn command(&self, frame_dir: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("-y")
            .arg("-framerate")
            .arg(self.frame_rate.to_string())
            .arg("-pattern_type")
            .arg("glob")
            .arg("-i")
            .arg(frame_dir.join(FRAME_GLOB))
            .arg("-c:v")
            .arg(&self.codec)
            .arg("-pix_fmt")
            .arg(&self.pixel_format)
            .arg("-loglevel")
            .arg("quiet")
            .arg(output);
        command
    }
}

/// Zero-padding wide enough that the glob's lexical order is frame order.
fn frame_digits(num_frames: usize) -> usize {
    num_frames
        .saturating_sub(1)
        .to_string()
        .len()
        .max(MIN_FRAME_DIGITS)
}

fn frame_file_name(index: usize, digits: usize) -> String {
    format!("frame_{:0width$}.png", index, width = digits)
}
