use crate::disparity::common::{DisparityError, FramePair, Result};

/// Ordered, random-access supply of stereo frame pairs.
pub trait FrameSource {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn frame_name(&self, index: usize) -> &str;

    /// Loads pair `index`; left and right are guaranteed to share dimensions.
    fn read_pair(&self, index: usize) -> Result<FramePair>;
}

/// Frames already decoded in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFrameSource {
    frames: Vec<FramePair>,
}

impl InMemoryFrameSource {
    pub fn new(frames: Vec<FramePair>) -> Self {
        Self { frames }
    }

    pub fn push(&mut self, frame: FramePair) {
        self.frames.push(frame);
    }
}

impl FrameSource for InMemoryFrameSource {
    fn len(&self) -> usize {
        self.frames.len()
    }

    fn frame_name(&self, index: usize) -> &str {
        &self.frames[index].name
    }

    fn read_pair(&self, index: usize) -> Result<FramePair> {
        let frame = self.frames.get(index).cloned().ok_or_else(|| {
            DisparityError::FrameReadError(format!("frame index {index} out of range"))
        })?;
        frame.validate()?;
        Ok(frame)
    }
}
