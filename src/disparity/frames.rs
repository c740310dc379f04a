//! Frame sources
//!
//! A frame source hands stereo pairs to the pipeline in natural file-name
//! order. Decoding goes through the `image` crate.

mod natural_sort;
mod source;
mod directory_source;

#[cfg(test)]
mod tests;

pub use natural_sort::{natural_cmp, natural_sort};
pub use source::{FrameSource, InMemoryFrameSource};
pub use directory_source::{DirectoryFrameSource, LEFT_DIR, RIGHT_DIR};
