use std::borrow::Borrow;

use image::{Rgba, RgbaImage, imageops};

use crate::config::Background;
use crate::engine::Packing;

/// Renders a finished packing into one RGBA canvas of the layout size.
///
/// The canvas starts filled with `background`; regions no image covers keep
/// that value. On a transparent background pixels are copied verbatim,
/// otherwise they are alpha-blended over the solid colour.
pub fn compose<P: Borrow<RgbaImage>>(packing: &Packing<P>, background: Background) -> RgbaImage {
    let (w, h) = packing.canvas_size();
    let mut canvas = RgbaImage::from_pixel(w, h, Rgba(background.rgba()));
    for (placement, payload) in packing.placed() {
        let src = Borrow::<RgbaImage>::borrow(payload);
        let (x, y) = (placement.x as i64, placement.y as i64);
        match background {
            Background::Transparent => imageops::replace(&mut canvas, src, x, y),
            Background::Solid(_) => imageops::overlay(&mut canvas, src, x, y),
        }
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PackMode;
    use crate::engine::PackSession;
    use crate::model::SourceImage;

    fn single(px: [u8; 4]) -> Packing<RgbaImage> {
        let mut s = PackSession::new(PackMode::fixed(4, 2));
        s.insert(SourceImage::new("a", 2, 2, RgbaImage::from_pixel(2, 2, Rgba(px))))
            .unwrap();
        s.finish().unwrap()
    }

    #[test]
    fn transparent_background_copies_pixels() {
        let sheet = compose(&single([10, 20, 30, 40]), Background::Transparent);
        assert_eq!(sheet.get_pixel(1, 1).0, [10, 20, 30, 40]);
        assert_eq!(sheet.get_pixel(3, 1).0, [0, 0, 0, 0]);
    }

    #[test]
    fn solid_background_blends_translucent_pixels() {
        let sheet = compose(&single([0, 0, 0, 128]), Background::WHITE);
        let px = sheet.get_pixel(0, 0).0;
        assert_eq!(px[3], 255);
        assert!((126..=128).contains(&px[0]), "got {:?}", px);
        assert_eq!(sheet.get_pixel(3, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn opaque_pixels_cover_solid_background() {
        let sheet = compose(&single([10, 20, 30, 255]), Background::BLACK);
        assert_eq!(sheet.get_pixel(1, 0).0, [10, 20, 30, 255]);
    }
}
