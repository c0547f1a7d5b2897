use crate::compositing::compose;
use crate::config::PackerConfig;
use crate::engine::pack;
use crate::error::{PackError, Result};
use crate::model::{LayoutStats, PackedLayout, SourceImage};
use image::{DynamicImage, RgbaImage};
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// In-memory image to pack (key + decoded image).
pub struct InputImage {
    pub key: String,
    pub image: DynamicImage,
}

/// Output of a packing run: the layout and the composited sheet.
pub struct PackOutput {
    pub layout: PackedLayout,
    pub rgba: RgbaImage,
}

impl PackOutput {
    /// Computes packing statistics for this output.
    /// This is a convenience method that delegates to `layout.stats()`.
    pub fn stats(&self) -> LayoutStats {
        self.layout.stats()
    }
}

/// Packs `inputs` onto one sheet using configuration `cfg` and returns the
/// layout and the composited RGBA image.
///
/// Notes:
/// - Packing is deterministic for a given input order and configuration.
/// - With the `parallel` feature, RGBA conversion runs on the rayon pool;
///   packing itself is always sequential.
#[instrument(skip_all)]
pub fn pack_images(inputs: Vec<InputImage>, cfg: PackerConfig) -> Result<PackOutput> {
    // Validate configuration first
    cfg.validate()?;

    if inputs.is_empty() {
        return Err(PackError::Empty);
    }

    let images = prepare_inputs(inputs);
    let packing = pack(images, &cfg)?;
    let rgba = compose(&packing, cfg.background);
    let layout = packing.layout();
    info!(
        images = layout.placements.len(),
        width = layout.canvas_width,
        height = layout.canvas_height,
        "sheet composed"
    );
    Ok(PackOutput { layout, rgba })
}

fn to_source(inp: InputImage) -> SourceImage<RgbaImage> {
    let rgba = inp.image.to_rgba8();
    let (w, h) = rgba.dimensions();
    SourceImage::new(inp.key, w, h, rgba)
}

#[cfg(feature = "parallel")]
fn prepare_inputs(inputs: Vec<InputImage>) -> Vec<SourceImage<RgbaImage>> {
    inputs.into_par_iter().map(to_source).collect()
}

#[cfg(not(feature = "parallel"))]
fn prepare_inputs(inputs: Vec<InputImage>) -> Vec<SourceImage<RgbaImage>> {
    inputs.into_iter().map(to_source).collect()
}
