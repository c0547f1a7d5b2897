use crate::config::{Background, PackerConfig};
use crate::model::PackedLayout;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Sheet-level metadata written next to the placements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    /// Schema version for the JSON formats; bumped on incompatible changes.
    /// String to allow non-integer versions like "1.0"; current: "1".
    pub schema_version: String,
    pub app: String,
    pub version: String,
    /// "fixed" or "grow".
    pub mode: String,
    /// Bin size in fixed mode.
    pub max_dim: Option<(u32, u32)>,
    pub sort_order: String,
    pub background: Background,
}

impl Meta {
    pub fn from_config(cfg: &PackerConfig) -> Self {
        let max_dim = match cfg.mode {
            crate::config::PackMode::Fixed {
                max_width,
                max_height,
            } => Some((max_width, max_height)),
            crate::config::PackMode::Grow => None,
        };
        Self {
            schema_version: "1".into(),
            app: "sheet-packer".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            mode: cfg.mode.name().into(),
            max_dim,
            sort_order: cfg.sort_order.name().into(),
            background: cfg.background,
        }
    }
}

/// Serialize the layout as `{ canvas, placements: [..], meta }`, keeping
/// placement order.
pub fn to_json_array(layout: &PackedLayout, meta: &Meta) -> Value {
    let placements: Vec<Value> = layout
        .placements
        .iter()
        .map(|p| {
            json!({
                "id": p.id,
                "frame": {"x": p.x, "y": p.y, "w": p.width, "h": p.height},
            })
        })
        .collect();
    json!({
        "canvas": {"w": layout.canvas_width, "h": layout.canvas_height},
        "placements": placements,
        "meta": meta,
    })
}

/// Flatten placements keyed by id.
/// Shape: `{ frames: { id: { frame } }, canvas, meta }`.
pub fn to_json_hash(layout: &PackedLayout, meta: &Meta) -> Value {
    let mut frames = serde_json::Map::new();
    for p in &layout.placements {
        frames.insert(
            p.id.clone(),
            json!({"frame": {"x": p.x, "y": p.y, "w": p.width, "h": p.height}}),
        );
    }
    json!({
        "frames": frames,
        "canvas": {"w": layout.canvas_width, "h": layout.canvas_height},
        "meta": meta,
    })
}
