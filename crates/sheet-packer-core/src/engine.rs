use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::config::{PackMode, PackerConfig, SortOrder};
use crate::error::{PackError, Result};
use crate::model::{PackedLayout, Placement, Rect, SourceImage};
use crate::order::sort_by_size;
use crate::tree::Node;

/// One packing run: images are inserted strictly one at a time and each
/// insertion depends on the exact tree left by the previous ones.
///
/// A failed [`PackSession::insert`] leaves the tree untouched, so the caller
/// may skip the image, or drop the session and retry with a larger bin.
#[derive(Debug)]
pub struct PackSession<P> {
    mode: PackMode,
    root: Option<Node<P>>,
    ids: HashSet<String>,
}

impl<P> PackSession<P> {
    pub fn new(mode: PackMode) -> Self {
        Self {
            mode,
            root: None,
            ids: HashSet::new(),
        }
    }

    pub fn mode(&self) -> PackMode {
        self.mode
    }

    /// The partition tree, once the first image has been placed.
    pub fn root(&self) -> Option<&Node<P>> {
        self.root.as_ref()
    }

    /// Current canvas; `None` before the first insertion.
    pub fn canvas(&self) -> Option<Rect> {
        self.root.as_ref().map(Node::rect)
    }

    /// Number of images placed so far.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Places one image.
    pub fn insert(&mut self, image: SourceImage<P>) -> Result<()> {
        if image.width == 0 || image.height == 0 {
            return Err(PackError::InvalidDimensions {
                id: image.id,
                width: image.width,
                height: image.height,
            });
        }
        if self.ids.contains(&image.id) {
            return Err(PackError::DuplicateId(image.id));
        }
        let id = image.id.clone();

        match &mut self.root {
            None => {
                let rect = match self.mode {
                    PackMode::Fixed {
                        max_width,
                        max_height,
                    } => {
                        if !Rect::new(0, 0, max_width, max_height)
                            .can_contain(image.width, image.height)
                        {
                            debug!(%id, width = image.width, height = image.height, "image larger than bin");
                            return Err(PackError::FixedBinOverflow {
                                width: max_width,
                                height: max_height,
                            });
                        }
                        Rect::new(0, 0, max_width, max_height)
                    }
                    PackMode::Grow => Rect::new(0, 0, image.width, image.height),
                };
                let mut root = Node::empty(rect);
                root.split_and_place(image)?;
                self.root = Some(root);
            }
            Some(root) => {
                if let Some(leaf) = root.find_empty_leaf(image.width, image.height) {
                    leaf.split_and_place(image)?;
                } else {
                    match self.mode {
                        PackMode::Fixed {
                            max_width,
                            max_height,
                        } => {
                            debug!(%id, width = image.width, height = image.height, "bin full");
                            return Err(PackError::FixedBinOverflow {
                                width: max_width,
                                height: max_height,
                            });
                        }
                        PackMode::Grow => {
                            root.grow_and_place(image)?;
                        }
                    }
                }
            }
        }
        self.ids.insert(id);
        Ok(())
    }

    /// Ends the session and hands over the finished tree.
    pub fn finish(self) -> Result<Packing<P>> {
        let root = self.root.ok_or(PackError::Empty)?;
        debug_assert!(root.is_well_formed(), "partition tree invariants broken");
        Ok(Packing { root })
    }
}

/// A completed packing: the final partition tree.
#[derive(Debug, Clone)]
pub struct Packing<P> {
    root: Node<P>,
}

impl<P> Packing<P> {
    pub fn root(&self) -> &Node<P> {
        &self.root
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        let r = self.root.rect();
        (r.w, r.h)
    }

    /// Flattens the tree into the canvas size and one placement per image,
    /// in pre-order (first child before second).
    pub fn layout(&self) -> PackedLayout {
        let (canvas_width, canvas_height) = self.canvas_size();
        PackedLayout {
            canvas_width,
            canvas_height,
            placements: self.placed().map(|(p, _)| p).collect(),
        }
    }

    /// Each placement together with its payload, in layout order.
    pub fn placed(&self) -> impl Iterator<Item = (Placement, &P)> + '_ {
        self.root
            .occupied_leaves()
            .map(|(rect, img)| (placement(rect, &img.id), &img.payload))
    }

    /// Consumes the packing, moving the payloads out next to their placements.
    pub fn into_placed(self) -> (PackedLayout, Vec<P>) {
        let (canvas_width, canvas_height) = self.canvas_size();
        let (placements, payloads) = self
            .root
            .into_occupied()
            .into_iter()
            .map(|(rect, img)| (placement(rect, &img.id), img.payload))
            .unzip();
        (
            PackedLayout {
                canvas_width,
                canvas_height,
                placements,
            },
            payloads,
        )
    }
}

fn placement(rect: Rect, id: &str) -> Placement {
    Placement {
        id: id.to_string(),
        x: rect.x,
        y: rect.y,
        width: rect.w,
        height: rect.h,
    }
}

/// Packs all `images` onto one canvas as configured by `cfg`.
///
/// With `SortOrder::MaxSide` images are sorted by [`sort_by_size`] and taken
/// from the tail (largest first); with `SortOrder::None` they are inserted in
/// the given order. The first failing insertion aborts the whole run.
#[instrument(skip_all, fields(count = images.len(), mode = cfg.mode.name()))]
pub fn pack<P>(images: Vec<SourceImage<P>>, cfg: &PackerConfig) -> Result<Packing<P>> {
    cfg.validate()?;
    if images.is_empty() {
        return Err(PackError::Empty);
    }

    let mut queue = match cfg.sort_order {
        SortOrder::MaxSide => sort_by_size(images),
        SortOrder::None => {
            let mut v = images;
            v.reverse();
            v
        }
    };

    let mut session = PackSession::new(cfg.mode);
    while let Some(image) = queue.pop() {
        session.insert(image)?;
    }
    let packing = session.finish()?;
    let (w, h) = packing.canvas_size();
    debug!(width = w, height = h, "packed");
    Ok(packing)
}

/// Layout-only packing of `(key, width, height)` items.
pub fn pack_layout<K: Into<String>>(
    items: Vec<(K, u32, u32)>,
    cfg: &PackerConfig,
) -> Result<PackedLayout> {
    let images = items
        .into_iter()
        .map(|(k, w, h)| SourceImage::sized(k, w, h))
        .collect();
    Ok(pack(images, cfg)?.layout())
}
