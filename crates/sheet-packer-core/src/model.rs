use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn area(&self) -> u64 {
        (self.w as u64) * (self.h as u64)
    }

    /// Exclusive right edge (`x + w`).
    pub fn x2(&self) -> u32 {
        self.x + self.w
    }

    /// Exclusive bottom edge (`y + h`).
    pub fn y2(&self) -> u32 {
        self.y + self.h
    }

    /// True if a `w x h` rectangle fits inside this one.
    pub fn can_contain(&self, w: u32, h: u32) -> bool {
        self.w >= w && self.h >= h
    }

    /// True if this rectangle has exactly the size `w x h`.
    pub fn is_congruent_with(&self, w: u32, h: u32) -> bool {
        self.w == w && self.h == h
    }

    /// Cuts along a horizontal line `h` pixels below the top edge.
    /// Returns `(top, bottom)`; both keep the full width.
    pub fn split_at_height(&self, h: u32) -> (Rect, Rect) {
        let top = Rect::new(self.x, self.y, self.w, h);
        let bottom = Rect::new(self.x, self.y + h, self.w, self.h - h);
        (top, bottom)
    }

    /// Cuts along a vertical line `w` pixels right of the left edge.
    /// Returns `(left, right)`; both keep the full height.
    pub fn split_at_width(&self, w: u32) -> (Rect, Rect) {
        let left = Rect::new(self.x, self.y, w, self.h);
        let right = Rect::new(self.x + w, self.y, self.w - w, self.h);
        (left, right)
    }

    /// True if the interiors of the two rectangles overlap.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.x >= other.x2()
            || other.x >= self.x2()
            || self.y >= other.y2()
            || other.y >= self.y2())
    }

    /// Returns true if `r` is fully inside `self`.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.x2() <= self.x2() && r.y2() <= self.y2()
    }
}

/// An image handed to the packer: unique id, pixel size and an opaque payload.
///
/// The packer reads `width`/`height` only; `payload` is moved through the
/// tree untouched and handed back with the placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage<P> {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub payload: P,
}

impl<P> SourceImage<P> {
    pub fn new(id: impl Into<String>, width: u32, height: u32, payload: P) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            payload,
        }
    }

    pub fn max_side(&self) -> u32 {
        self.width.max(self.height)
    }

    pub fn area(&self) -> u64 {
        (self.width as u64) * (self.height as u64)
    }
}

impl SourceImage<()> {
    /// Descriptor with no payload, for layout-only packing.
    pub fn sized(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self::new(id, width, height, ())
    }
}

/// Where one image ended up on the canvas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Placement {
    pub id: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Placement {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Final canvas size plus one placement per packed image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackedLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub placements: Vec<Placement>,
}

/// Statistics about packing efficiency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LayoutStats {
    /// Number of images placed.
    pub num_placements: usize,
    /// Canvas width * height.
    pub canvas_area: u64,
    /// Sum of placement areas.
    pub used_area: u64,
    /// Occupancy ratio: used_area / canvas_area (0.0 to 1.0).
    /// Higher is better (less wasted space).
    pub occupancy: f64,
}

impl PackedLayout {
    pub fn canvas(&self) -> Rect {
        Rect::new(0, 0, self.canvas_width, self.canvas_height)
    }

    /// Looks up the placement of `id`.
    pub fn get(&self, id: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.id == id)
    }

    /// Computes packing statistics for this layout.
    pub fn stats(&self) -> LayoutStats {
        let canvas_area = self.canvas().area();
        let used_area: u64 = self.placements.iter().map(|p| p.rect().area()).sum();
        let occupancy = if canvas_area > 0 {
            used_area as f64 / canvas_area as f64
        } else {
            0.0
        };
        LayoutStats {
            num_placements: self.placements.len(),
            canvas_area,
            used_area,
            occupancy,
        }
    }
}

impl LayoutStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Images: {}, Occupancy: {:.2}%, Canvas Area: {} px², Used Area: {} px²",
            self.num_placements,
            self.occupancy * 100.0,
            self.canvas_area,
            self.used_area,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.canvas_area.saturating_sub(self.used_area)
    }

    /// Returns wasted space as a percentage (0.0 to 100.0).
    pub fn waste_percentage(&self) -> f64 {
        if self.canvas_area > 0 {
            (self.wasted_area() as f64 / self.canvas_area as f64) * 100.0
        } else {
            0.0
        }
    }
}
