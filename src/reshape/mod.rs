//! Aspect-ratio reshaper.
//!
//! Converts a video of any resolution into a 1080x1920 vertical video. Every
//! source frame is scaled uniformly to fit, centred on a black canvas and
//! re-encoded at the source frame rate, one output frame per input frame.

pub mod canvas;
pub mod decode;
pub mod encode;
pub mod geometry;

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use ffmpeg_next::{self as ffmpeg, Rational};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
pub use decode::{FrameSource, DEFAULT_FRAME_RATE};
pub use encode::FrameEncoder;
pub use geometry::{fit, Placement, CANVAS_HEIGHT, CANVAS_WIDTH};

/// Prefix of derived output file names
pub const OUTPUT_PREFIX: &str = "converted_916_";

static INIT: OnceLock<std::result::Result<(), ffmpeg::Error>> = OnceLock::new();

/// Initialise FFmpeg once per process.
pub fn init() -> Result<()> {
    INIT.get_or_init(|| {
        ffmpeg::init()?;
        ffmpeg::util::log::set_level(ffmpeg::util::log::Level::Error);
        Ok(())
    })
    .clone()
    .map_err(|e| Error::EncodeFailed(format!("ffmpeg init: {e}")))
}

/// Summary of a decoded video file.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub frame_rate: Option<Rational>,
    pub frames: u64,
}

/// Reshape `source` into a vertical 1080x1920 MP4.
///
/// Without a `destination` the output goes next to the source as
/// `converted_916_<stem>.mp4`, picking a numbered variant rather than
/// overwriting an existing file. An explicit destination is replaced.
/// A failed encode leaves nothing at the destination; a source that cannot
/// be read leaves it untouched. A destination that is the source file itself
/// is refused before anything is opened for writing.
pub fn reshape(source: &Path, destination: Option<&Path>) -> Result<PathBuf> {
    let destination = match destination {
        Some(path) => path.to_path_buf(),
        None => default_destination(source)?,
    };
    if same_file(source, &destination) {
        return Err(Error::EncodeFailed(format!(
            "{}: destination is the source",
            destination.display()
        )));
    }

    let mut frames = FrameSource::open(source)?;
    let frame_rate = frames.frame_rate().unwrap_or_else(|| {
        warn!(source = %source.display(), "no frame rate reported, assuming {DEFAULT_FRAME_RATE}");
        DEFAULT_FRAME_RATE
    });

    // nothing is created until a frame decodes, so an empty source leaves no file
    let Some(first) = frames.next_frame()? else {
        return Err(Error::SourceUnreadable(format!(
            "{}: no decodable frames",
            source.display()
        )));
    };

    info!(
        source = %source.display(),
        destination = %destination.display(),
        width = frames.width(),
        height = frames.height(),
        %frame_rate,
        "reshaping to {CANVAS_WIDTH}x{CANVAS_HEIGHT}"
    );

    let guard = OutputGuard::new(&destination);
    let mut encoder = FrameEncoder::create(&destination, CANVAS_WIDTH, CANVAS_HEIGHT, frame_rate)?;

    let mut next = Some(first);
    while let Some(frame) = next {
        let placement = fit(frame.width(), frame.height());
        let scaled = frames.to_rgb(&frame, placement.width, placement.height)?;
        encoder.write(&canvas::compose(&scaled, &placement))?;
        next = frames.next_frame()?;
    }

    let written = encoder.finish()?;
    guard.commit();
    info!(frames = written, destination = %destination.display(), "reshape complete");
    Ok(destination)
}

/// Derive the output path for `source`, never naming an existing file.
pub fn default_destination(source: &Path) -> Result<PathBuf> {
    let stem = source
        .file_stem()
        .ok_or_else(|| Error::SourceUnreadable(format!("{}: no file name", source.display())))?;
    let dir = source.parent().unwrap_or_else(|| Path::new(""));

    // OsString keeps stems that are not valid UTF-8
    let named = |suffix: &str| {
        let mut name = OsString::from(OUTPUT_PREFIX);
        name.push(stem);
        name.push(suffix);
        dir.join(name)
    };

    let candidate = named(".mp4");
    if !candidate.exists() {
        return Ok(candidate);
    }
    (1u32..)
        .map(|n| named(&format!("_{n}.mp4")))
        .find(|path| !path.exists())
        .ok_or_else(|| Error::EncodeFailed("no free output name".into()))
}

/// Whether both paths resolve to the same existing file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Decode every frame of `path` and report its geometry, rate and length.
pub fn inspect(path: &Path) -> Result<VideoInfo> {
    let mut frames = FrameSource::open(path)?;
    let mut count = 0u64;
    let (mut width, mut height) = (frames.width(), frames.height());
    while let Some(frame) = frames.next_frame()? {
        if count == 0 {
            width = frame.width();
            height = frame.height();
        }
        count += 1;
    }
    Ok(VideoInfo {
        width,
        height,
        frame_rate: frames.frame_rate(),
        frames: count,
    })
}

/// Removes a partially written output unless committed.
struct OutputGuard {
    path: PathBuf,
    committed: bool,
}

impl OutputGuard {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            committed: false,
        }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for OutputGuard {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed partial output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), "could not remove partial output: {e}"),
        }
    }
}
