//! Core library for packing images onto a single sprite sheet or collage.
//!
//! - Algorithm: binary partition tree with first-fit depth-first search,
//!   leftover-area split choice and single-axis canvas growth
//! - Modes: fixed-size bin, or a canvas that grows on demand
//! - Pipeline: `pack_images` takes in-memory images and returns the layout plus a composited RGBA sheet
//! - Data model is serde-serializable; JSON exporters are provided.
//!
//! Quick example:
//! ```ignore
//! use image::ImageReader;
//! use sheet_packer_core::{InputImage, PackerConfig, pack_images};
//! # fn main() -> anyhow::Result<()> {
//! let img1 = ImageReader::open("a.png")?.decode()?;
//! let img2 = ImageReader::open("b.png")?.decode()?;
//! let inputs = vec![
//!   InputImage { key: "a".into(), image: img1 },
//!   InputImage { key: "b".into(), image: img2 },
//! ];
//! let cfg = PackerConfig::builder().grow().build();
//! let out = pack_images(inputs, cfg)?;
//! println!("sheet: {}x{}", out.layout.canvas_width, out.layout.canvas_height);
//! # Ok(()) }
//! ```

#[cfg(feature = "image")]
pub mod compositing;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod model;
pub mod order;
#[cfg(feature = "image")]
pub mod pipeline;
pub mod tree;

#[cfg(feature = "image")]
pub use compositing::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use order::*;
#[cfg(feature = "image")]
pub use pipeline::*;
pub use tree::*;

/// Convenience prelude for common types and functions.
/// Importing `sheet_packer_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{Background, PackMode, PackerConfig, PackerConfigBuilder, SortOrder};
    pub use crate::engine::{PackSession, Packing};
    pub use crate::error::PackError;
    pub use crate::model::{LayoutStats, PackedLayout, Placement, Rect, SourceImage};
    pub use crate::tree::{GrowDirection, Node, NodeKind, SplitAxis};
    pub use crate::{pack, pack_layout, packing_order, sort_by_size};
    #[cfg(feature = "image")]
    pub use crate::{InputImage, PackOutput, compose, pack_images};
}
