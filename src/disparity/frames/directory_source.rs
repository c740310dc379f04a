use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::disparity::common::{DisparityError, FramePair, Image, Result};
use crate::disparity::frames::natural_sort::natural_sort;
use crate::disparity::frames::source::FrameSource;

/// Sub-directory holding the left views.
pub const LEFT_DIR: &str = "left";
/// Sub-directory holding the right views.
pub const RIGHT_DIR: &str = "right";

/// Stereo frames stored as `<root>/left/<name>` and `<root>/right/<name>`.
///
/// Names are taken from the left directory and ordered naturally, so
/// `img2.png` comes before `img10.png`.
#[derive(Debug, Clone)]
pub struct DirectoryFrameSource {
    left_dir: PathBuf,
    right_dir: PathBuf,
    names: Vec<String>,
}

impl DirectoryFrameSource {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        let left_dir = root.join(LEFT_DIR);
        let right_dir = root.join(RIGHT_DIR);

        if !right_dir.is_dir() {
            return Err(DisparityError::FrameReadError(format!(
                "Invalid directory: {}",
                right_dir.display()
            )));
        }

        let entries = std::fs::read_dir(&left_dir).map_err(|e| {
            DisparityError::FrameReadError(format!("Invalid directory: {}: {}", left_dir.display(), e))
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            // Follows symlinks
            if !std::fs::metadata(entry.path())?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => warn!("Skipping non UTF-8 file name {:?}", name),
            }
        }

        if names.is_empty() {
            return Err(DisparityError::EmptyFrameSource(left_dir.display().to_string()));
        }

        natural_sort(&mut names);
        info!("Found {} frames in {}", names.len(), root.display());

        Ok(Self {
            left_dir,
            right_dir,
            names,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

fn load_gray(path: &Path) -> Result<Image> {
    let img = image::open(path)
        .map_err(|e| DisparityError::FrameReadError(format!("{}: {}", path.display(), e)))?
        .to_luma8();
    let (width, height) = (img.width() as usize, img.height() as usize);
    Image::new(width, height, img.into_raw())
}

impl FrameSource for DirectoryFrameSource {
    fn len(&self) -> usize {
        self.names.len()
    }

    fn frame_name(&self, index: usize) -> &str {
        &self.names[index]
    }

    fn read_pair(&self, index: usize) -> Result<FramePair> {
        let name = self.names.get(index).ok_or_else(|| {
            DisparityError::FrameReadError(format!("frame index {index} out of range"))
        })?;

        let left_path = self.left_dir.join(name);
        let right_path = self.right_dir.join(name);
        debug!("Loading {} / {}", left_path.display(), right_path.display());

        let pair = FramePair::new(name.clone(), load_gray(&left_path)?, load_gray(&right_path)?);
        pair.validate()?;
        Ok(pair)
    }
}
