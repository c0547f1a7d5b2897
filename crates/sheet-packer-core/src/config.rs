use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the canvas is sized.
///   - `Fixed` packs into a bin of exactly `max_width x max_height`; running out of room is an error.
///   - `Grow` starts at the size of the first image and extends one axis at a time on demand.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PackMode {
    Fixed { max_width: u32, max_height: u32 },
    Grow,
}

impl PackMode {
    pub fn fixed(max_width: u32, max_height: u32) -> Self {
        Self::Fixed {
            max_width,
            max_height,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fixed { .. } => "fixed",
            Self::Grow => "grow",
        }
    }
}

/// Order in which images are fed to the packer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Largest max(width, height) first, larger area breaking ties.
    MaxSide,
    /// Caller order, first image first.
    None,
}

impl SortOrder {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MaxSide => "max_side",
            Self::None => "none",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "max_side" | "max_side_desc" => Ok(Self::MaxSide),
            "none" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

/// What empty canvas regions are filled with when compositing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    /// Fully transparent canvas; image pixels are copied verbatim.
    #[default]
    Transparent,
    /// Solid RGBA colour; image pixels are alpha-blended over it.
    Solid([u8; 4]),
}

impl Background {
    pub const WHITE: Background = Background::Solid([255, 255, 255, 255]);
    pub const BLACK: Background = Background::Solid([0, 0, 0, 255]);

    pub fn rgba(&self) -> [u8; 4] {
        match self {
            Self::Transparent => [0, 0, 0, 0],
            Self::Solid(c) => *c,
        }
    }
}

impl FromStr for Background {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "transparent" | "none" => return Ok(Self::Transparent),
            "white" => return Ok(Self::WHITE),
            "black" => return Ok(Self::BLACK),
            _ => {}
        }
        // #rrggbb or #rrggbbaa
        let hex = s.strip_prefix('#').ok_or(())?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ());
        let alpha = if hex.len() == 8 { byte(6)? } else { 255 };
        Ok(Self::Solid([byte(0)?, byte(2)?, byte(4)?, alpha]))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackerConfig {
    /// Fixed bin or growing canvas.
    #[serde(default = "default_mode")]
    pub mode: PackMode,
    /// Insertion order.
    #[serde(default = "default_sort_order")]
    pub sort_order: SortOrder,
    /// Canvas fill used by the compositor.
    #[serde(default)]
    pub background: Background,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            sort_order: default_sort_order(),
            background: Background::default(),
        }
    }
}

impl PackerConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if a fixed bin has a zero dimension.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::PackError;

        if let PackMode::Fixed {
            max_width,
            max_height,
        } = self.mode
        {
            if max_width == 0 || max_height == 0 {
                return Err(PackError::InvalidBin {
                    width: max_width,
                    height: max_height,
                });
            }
        }
        Ok(())
    }
}

fn default_mode() -> PackMode {
    PackMode::Grow
}
fn default_sort_order() -> SortOrder {
    SortOrder::MaxSide
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    pub fn fixed(mut self, max_width: u32, max_height: u32) -> Self {
        self.cfg.mode = PackMode::fixed(max_width, max_height);
        self
    }
    pub fn grow(mut self) -> Self {
        self.cfg.mode = PackMode::Grow;
        self
    }
    pub fn mode(mut self, v: PackMode) -> Self {
        self.cfg.mode = v;
        self
    }
    pub fn sort_order(mut self, v: SortOrder) -> Self {
        self.cfg.sort_order = v;
        self
    }
    pub fn background(mut self, v: Background) -> Self {
        self.cfg.background = v;
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}

impl PackerConfig {
    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_parses_names_and_hex() {
        assert_eq!("transparent".parse::<Background>(), Ok(Background::Transparent));
        assert_eq!("White".parse::<Background>(), Ok(Background::WHITE));
        assert_eq!("#102030".parse::<Background>(), Ok(Background::Solid([16, 32, 48, 255])));
        assert_eq!("#10203080".parse::<Background>(), Ok(Background::Solid([16, 32, 48, 128])));
        assert_eq!("#1020".parse::<Background>(), Err(()));
        assert_eq!("red".parse::<Background>(), Err(()));
    }

    #[test]
    fn zero_sized_bin_is_rejected() {
        let cfg = PackerConfig::builder().fixed(0, 64).build();
        assert!(matches!(
            cfg.validate(),
            Err(crate::error::PackError::InvalidBin { width: 0, height: 64 })
        ));
        assert!(PackerConfig::default().validate().is_ok());
    }

    #[test]
    fn mode_round_trips_through_json() {
        let cfg = PackerConfig::builder().fixed(128, 64).build();
        let text = serde_json::to_string(&cfg).unwrap();
        assert!(text.contains("\"kind\":\"fixed\""));
        let back: PackerConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, cfg);

        let partial: PackerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(partial, PackerConfig::default());
    }
}
