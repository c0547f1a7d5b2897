//! Greedy processing order for the packer.
//!
//! Images are sorted ascending by `max(width, height)`, then ascending by
//! area. The engine pops from the tail, so the largest and most constrained
//! shapes are inserted first.

use crate::model::SourceImage;

/// Indices of `images` in packing order (ascending max side, then area).
///
/// The sort is stable: images with equal keys keep their input order.
pub fn packing_order<P>(images: &[SourceImage<P>]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..images.len()).collect();
    idx.sort_by_key(|&i| (images[i].max_side(), images[i].area()));
    idx
}

/// Consumes `images` and returns them in packing order.
pub fn sort_by_size<P>(images: Vec<SourceImage<P>>) -> Vec<SourceImage<P>> {
    let mut out = images;
    out.sort_by_key(|img| (img.max_side(), img.area()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn img(id: &str, w: u32, h: u32) -> SourceImage<()> {
        SourceImage::sized(id, w, h)
    }

    #[test]
    fn max_side_is_primary_key() {
        let images = vec![img("big", 50, 2), img("small", 10, 10), img("mid", 20, 30)];
        let ids: Vec<_> = sort_by_size(images).into_iter().map(|i| i.id).collect();
        assert_eq!(ids, ["small", "mid", "big"]);
    }

    #[test]
    fn area_breaks_ties_and_input_order_breaks_the_rest() {
        let images = vec![
            img("a", 10, 10),
            img("b", 10, 2),
            img("c", 2, 10),
            img("d", 10, 5),
        ];
        let order = packing_order(&images);
        assert_eq!(order, [1, 2, 3, 0]);
        // input untouched
        assert_eq!(images[0].id, "a");
    }
}
