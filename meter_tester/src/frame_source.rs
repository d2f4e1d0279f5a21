// Frame sources feeding the tick loop. `Ok(None)` means the stream ended
// normally; `Err` means capture failed.

use anyhow::{Context, Result};
use image::RgbImage;
use log::warn;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "tif"];

pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;

    /// Frames the source dropped on its own, e.g. files that failed to decode.
    fn skipped(&self) -> u64 {
        0
    }
}

/// Still images from a directory, in file name order. Files that fail to
/// decode are logged and skipped.
pub struct DirectorySource {
    paths: std::vec::IntoIter<PathBuf>,
    skipped: u64,
}

impl DirectorySource {
    pub fn open(dir: &Path) -> Result<Self> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).with_context(|| format!("reading frame directory {}", dir.display()))? {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
            if path.is_file() && is_image {
                paths.push(path);
            }
        }
        paths.sort();
        log::info!("found {} frames in {}", paths.len(), dir.display());
        Ok(Self {
            paths: paths.into_iter(),
            skipped: 0,
        })
    }
}

impl FrameSource for DirectorySource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        for path in self.paths.by_ref() {
            match image::open(&path) {
                Ok(frame) => return Ok(Some(frame.to_rgb8())),
                Err(err) => {
                    warn!("skipping undecodable frame {}: {err}", path.display());
                    self.skipped += 1;
                }
            }
        }
        Ok(None)
    }

    fn skipped(&self) -> u64 {
        self.skipped
    }
}

/// Frames already held in memory.
#[cfg(test)]
pub struct MemorySource {
    frames: std::vec::IntoIter<RgbImage>,
}

#[cfg(test)]
impl MemorySource {
    pub fn new(frames: Vec<RgbImage>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

#[cfg(test)]
impl FrameSource for MemorySource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        Ok(self.frames.next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn directory_frames_come_back_sorted_and_skip_other_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        RgbImage::from_pixel(4, 3, Rgb([200, 0, 0]))
            .save(dir.path().join("frame_002.png"))
            .expect("write frame");
        RgbImage::from_pixel(4, 3, Rgb([0, 200, 0]))
            .save(dir.path().join("frame_001.png"))
            .expect("write frame");
        std::fs::write(dir.path().join("notes.txt"), "not a frame").expect("write notes");

        let mut source = DirectorySource::open(dir.path()).expect("open source");
        let first = source.next_frame().expect("read").expect("first frame");
        assert_eq!(first.get_pixel(0, 0), &Rgb([0, 200, 0]));
        let second = source.next_frame().expect("read").expect("second frame");
        assert_eq!(second.get_pixel(0, 0), &Rgb([200, 0, 0]));
        assert!(source.next_frame().expect("end of stream").is_none());
    }

    #[test]
    fn corrupt_frame_is_skipped_and_the_next_one_returned() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("frame_001.png"), b"definitely not png").expect("write");
        RgbImage::from_pixel(4, 3, Rgb([0, 0, 200]))
            .save(dir.path().join("frame_002.png"))
            .expect("write frame");
        std::fs::write(dir.path().join("frame_003.png"), b"truncated").expect("write");

        let mut source = DirectorySource::open(dir.path()).expect("open source");
        let frame = source.next_frame().expect("read").expect("good frame");
        assert_eq!(frame.get_pixel(0, 0), &Rgb([0, 0, 200]));
        assert_eq!(source.skipped(), 1);
        assert!(source.next_frame().expect("end of stream").is_none());
        assert_eq!(source.skipped(), 2);
    }

    #[test]
    fn missing_directory_fails_to_open() {
        assert!(DirectorySource::open(Path::new("/nonexistent/meter/frames")).is_err());
    }
}
