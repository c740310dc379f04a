pub mod disparity;
pub mod logger;
