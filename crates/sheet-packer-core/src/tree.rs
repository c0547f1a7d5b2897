//! Binary partition tree of canvas regions.
//!
//! Every node owns a rectangle and is in exactly one of three states: an
//! empty leaf, a leaf holding one image of exactly its size, or a split node
//! whose two children tile its rectangle along a single straight cut.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{PackError, Result};
use crate::model::{Rect, SourceImage};

/// Orientation of the cut line that divides a split node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitAxis {
    /// Horizontal cut: `first` is the top child, `second` the bottom one. Equal widths.
    Horizontal,
    /// Vertical cut: `first` is the left child, `second` the right one. Equal heights.
    Vertical,
}

impl SplitAxis {
    /// Picks the cut used to place a `w x h` image into the larger `rect`.
    ///
    /// A side that already matches the image decides the cut. Otherwise the
    /// cut that leaves the larger unused sibling wins; on equal leftovers the
    /// vertical (side by side) cut is used.
    pub fn choose(rect: &Rect, w: u32, h: u32) -> SplitAxis {
        if rect.w == w {
            return SplitAxis::Horizontal;
        }
        if rect.h == h {
            return SplitAxis::Vertical;
        }
        let below = rect.split_at_height(h).1.area();
        let beside = rect.split_at_width(w).1.area();
        if below > beside {
            SplitAxis::Horizontal
        } else {
            SplitAxis::Vertical
        }
    }

    fn split(self, rect: &Rect, w: u32, h: u32) -> (Rect, Rect) {
        match self {
            SplitAxis::Horizontal => rect.split_at_height(h),
            SplitAxis::Vertical => rect.split_at_width(w),
        }
    }
}

/// Direction in which a full canvas is extended to make room for one more image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowDirection {
    /// Add a strip below the canvas (height grows).
    Down,
    /// Add a strip to the right of the canvas (width grows).
    Right,
}

impl GrowDirection {
    /// Picks the growth direction for a `w x h` image, or `None` when neither
    /// single-axis extension can hold it.
    ///
    /// When both work, the one keeping the canvas closer to square wins:
    /// down iff `canvas.h + h < canvas.w + w`.
    pub fn choose(canvas: &Rect, w: u32, h: u32) -> Option<GrowDirection> {
        let can_grow_down = canvas.w >= w;
        let can_grow_right = canvas.h >= h;
        match (can_grow_down, can_grow_right) {
            (false, false) => None,
            (true, false) => Some(GrowDirection::Down),
            (false, true) => Some(GrowDirection::Right),
            (true, true) => {
                let tall = canvas.h as u64 + h as u64;
                let wide = canvas.w as u64 + w as u64;
                if tall < wide {
                    Some(GrowDirection::Down)
                } else {
                    Some(GrowDirection::Right)
                }
            }
        }
    }

    /// The cut separating the old canvas from the new strip.
    pub fn cut(self) -> SplitAxis {
        match self {
            GrowDirection::Down => SplitAxis::Horizontal,
            GrowDirection::Right => SplitAxis::Vertical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind<P> {
    Empty,
    Occupied(SourceImage<P>),
    Split {
        cut: SplitAxis,
        first: Box<Node<P>>,
        second: Box<Node<P>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<P> {
    rect: Rect,
    kind: NodeKind<P>,
}

impl<P> Node<P> {
    pub fn empty(rect: Rect) -> Self {
        Self {
            rect,
            kind: NodeKind::Empty,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn kind(&self) -> &NodeKind<P> {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(self.kind, NodeKind::Split { .. })
    }

    pub fn is_empty_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Empty)
    }

    pub fn image(&self) -> Option<&SourceImage<P>> {
        match &self.kind {
            NodeKind::Occupied(img) => Some(img),
            _ => None,
        }
    }

    pub fn children(&self) -> Option<(&Node<P>, &Node<P>)> {
        match &self.kind {
            NodeKind::Split { first, second, .. } => Some((first, second)),
            _ => None,
        }
    }

    /// Places `image` into this empty leaf, splitting it as needed.
    ///
    /// The image ends up in the top-left corner of the leaf; the remainder of
    /// the leaf stays available as one or two empty leaves. Fails without
    /// touching the node if it is not an empty leaf or is too small.
    pub fn split_and_place(&mut self, image: SourceImage<P>) -> Result<()> {
        if !self.is_empty_leaf() {
            return Err(PackError::NotALeaf);
        }
        let (w, h) = (image.width, image.height);
        if !self.rect.can_contain(w, h) {
            return Err(PackError::DoesNotFit {
                id: image.id,
                width: w,
                height: h,
                node_width: self.rect.w,
                node_height: self.rect.h,
            });
        }
        if self.rect.is_congruent_with(w, h) {
            trace!(id = %image.id, x = self.rect.x, y = self.rect.y, "placed");
            self.kind = NodeKind::Occupied(image);
            return Ok(());
        }

        let cut = SplitAxis::choose(&self.rect, w, h);
        let (a, b) = cut.split(&self.rect, w, h);
        let mut first = Box::new(Node::empty(a));
        first.split_and_place(image)?;
        self.kind = NodeKind::Split {
            cut,
            first,
            second: Box::new(Node::empty(b)),
        };
        Ok(())
    }

    /// First empty leaf, in pre-order (first child before second), that can
    /// hold a `w x h` image.
    pub fn find_empty_leaf(&mut self, w: u32, h: u32) -> Option<&mut Node<P>> {
        if self.is_empty_leaf() {
            return if self.rect.can_contain(w, h) {
                Some(self)
            } else {
                None
            };
        }
        match &mut self.kind {
            NodeKind::Split { first, second, .. } => first
                .find_empty_leaf(w, h)
                .or_else(|| second.find_empty_leaf(w, h)),
            _ => None,
        }
    }

    /// Extends this (root) node by one strip and places `image` in it.
    ///
    /// The current tree becomes the first child of the enlarged root; the
    /// strip spans the full old width (growing down) or the full old height
    /// (growing right). Fails without touching the tree when the root is an
    /// empty leaf or the image is too large for either direction.
    pub fn grow_and_place(&mut self, image: SourceImage<P>) -> Result<GrowDirection> {
        if self.is_empty_leaf() {
            return Err(PackError::GrowEmptyLeaf);
        }
        let (w, h) = (image.width, image.height);
        let r = self.rect;
        let cannot_grow = || PackError::CannotGrow {
            canvas_width: r.w,
            canvas_height: r.h,
            width: w,
            height: h,
        };
        let dir = GrowDirection::choose(&r, w, h).ok_or_else(cannot_grow)?;
        let (strip, grown) = match dir {
            GrowDirection::Down => {
                let total = r.h.checked_add(h).ok_or_else(cannot_grow)?;
                (Rect::new(r.x, r.y + r.h, r.w, h), Rect::new(r.x, r.y, r.w, total))
            }
            GrowDirection::Right => {
                let total = r.w.checked_add(w).ok_or_else(cannot_grow)?;
                (Rect::new(r.x + r.w, r.y, w, r.h), Rect::new(r.x, r.y, total, r.h))
            }
        };

        let mut second = Box::new(Node::empty(strip));
        second.split_and_place(image)?;
        let old = std::mem::replace(self, Node::empty(grown));
        trace!(?dir, width = grown.w, height = grown.h, "canvas grown");
        self.kind = NodeKind::Split {
            cut: dir.cut(),
            first: Box::new(old),
            second,
        };
        Ok(dir)
    }

    /// Occupied leaves in pre-order (first child before second).
    pub fn occupied_leaves(&self) -> OccupiedLeaves<'_, P> {
        OccupiedLeaves { stack: vec![self] }
    }

    /// Consumes the tree, returning each image with its final rectangle in
    /// the same order as [`Node::occupied_leaves`].
    pub fn into_occupied(self) -> Vec<(Rect, SourceImage<P>)> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node.kind {
                NodeKind::Empty => {}
                NodeKind::Occupied(img) => out.push((node.rect, img)),
                NodeKind::Split { first, second, .. } => {
                    stack.push(*second);
                    stack.push(*first);
                }
            }
        }
        out
    }

    pub fn node_count(&self) -> usize {
        match &self.kind {
            NodeKind::Split { first, second, .. } => 1 + first.node_count() + second.node_count(),
            _ => 1,
        }
    }

    /// Levels below this node; a leaf has depth 0.
    pub fn depth(&self) -> usize {
        match &self.kind {
            NodeKind::Split { first, second, .. } => 1 + first.depth().max(second.depth()),
            _ => 0,
        }
    }

    /// Checks the structural invariants of the whole subtree: split children
    /// tile their parent along the recorded cut, occupied leaves match their
    /// image size exactly.
    pub fn is_well_formed(&self) -> bool {
        match &self.kind {
            NodeKind::Empty => true,
            NodeKind::Occupied(img) => self.rect.is_congruent_with(img.width, img.height),
            NodeKind::Split { cut, first, second } => {
                let (a, b) = (first.rect, second.rect);
                let tiles = match cut {
                    SplitAxis::Horizontal => {
                        a.x == self.rect.x
                            && b.x == self.rect.x
                            && a.w == self.rect.w
                            && b.w == self.rect.w
                            && a.y == self.rect.y
                            && b.y == a.y2()
                            && b.y2() == self.rect.y2()
                    }
                    SplitAxis::Vertical => {
                        a.y == self.rect.y
                            && b.y == self.rect.y
                            && a.h == self.rect.h
                            && b.h == self.rect.h
                            && a.x == self.rect.x
                            && b.x == a.x2()
                            && b.x2() == self.rect.x2()
                    }
                };
                tiles && first.is_well_formed() && second.is_well_formed()
            }
        }
    }
}

/// Iterator over occupied leaves, see [`Node::occupied_leaves`].
pub struct OccupiedLeaves<'a, P> {
    stack: Vec<&'a Node<P>>,
}

impl<'a, P> Iterator for OccupiedLeaves<'a, P> {
    type Item = (Rect, &'a SourceImage<P>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match &node.kind {
                NodeKind::Empty => {}
                NodeKind::Occupied(img) => return Some((node.rect, img)),
                NodeKind::Split { first, second, .. } => {
                    self.stack.push(second);
                    self.stack.push(first);
                }
            }
        }
        None
    }
}

fn fmt_rect(r: &Rect, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "<({}, {}) - ({}, {})>", r.x, r.y, r.w, r.h)
}

/// Debug dump: `[ id: <(x, y) - (w, h)> ]` for leaves,
/// `[ <(x, y) - (w, h)> | first second ]` for split nodes.
impl<P> fmt::Display for Node<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Empty => {
                f.write_str("[ ")?;
                fmt_rect(&self.rect, f)?;
                f.write_str(" ]")
            }
            NodeKind::Occupied(img) => {
                write!(f, "[ {}: ", img.id)?;
                fmt_rect(&self.rect, f)?;
                f.write_str(" ]")
            }
            NodeKind::Split { first, second, .. } => {
                f.write_str("[ ")?;
                fmt_rect(&self.rect, f)?;
                write!(f, " | {first} {second} ]")
            }
        }
    }
}
