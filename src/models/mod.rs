pub mod common;
pub mod image;
pub mod storage;
pub mod text;

pub use common::*;
pub use image::*;
pub use storage::*;
pub use text::*;
