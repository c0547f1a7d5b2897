use sheet_packer_core::config::PackerConfig;
use sheet_packer_core::error::PackError;
use sheet_packer_core::{PackMode, PackSession, SourceImage, pack_layout};

/// Test zero-sized bin dimensions
#[test]
fn test_zero_width_bin() {
    let cfg = PackerConfig::builder().fixed(0, 1024).build();
    match cfg.validate() {
        Err(PackError::InvalidBin { width, height }) => {
            assert_eq!(width, 0);
            assert_eq!(height, 1024);
        }
        _ => panic!("Expected InvalidBin error"),
    }
    assert!(matches!(
        pack_layout(vec![("a", 1, 1)], &cfg),
        Err(PackError::InvalidBin { .. })
    ));
}

#[test]
fn test_empty_input() {
    let items: Vec<(&str, u32, u32)> = Vec::new();
    assert!(matches!(
        pack_layout(items, &PackerConfig::default()),
        Err(PackError::Empty)
    ));
}

#[test]
fn test_zero_sized_image() {
    let result = pack_layout(vec![("ok", 4, 4), ("flat", 4, 0)], &PackerConfig::default());
    match result {
        Err(PackError::InvalidDimensions { id, width, height }) => {
            assert_eq!(id, "flat");
            assert_eq!((width, height), (4, 0));
        }
        _ => panic!("Expected InvalidDimensions error"),
    }
}

#[test]
fn test_duplicate_ids() {
    let result = pack_layout(vec![("a", 4, 4), ("a", 2, 2)], &PackerConfig::default());
    assert!(matches!(result, Err(PackError::DuplicateId(ref id)) if id == "a"));
}

#[test]
fn test_image_exactly_bin_size() {
    let cfg = PackerConfig::builder().fixed(32, 16).build();
    let layout = pack_layout(vec![("a", 32, 16)], &cfg).expect("exact fit");
    assert_eq!(layout.placements.len(), 1);
    assert_eq!(layout.stats().wasted_area(), 0);

    let mut s = PackSession::new(PackMode::fixed(32, 16));
    s.insert(SourceImage::sized("a", 32, 16)).expect("a");
    assert!(matches!(
        s.insert(SourceImage::sized("b", 1, 1)),
        Err(PackError::FixedBinOverflow { width: 32, height: 16 })
    ));
}

#[test]
fn test_single_pixel_images_fill_a_bin() {
    let cfg = PackerConfig::builder().fixed(4, 4).build();
    let items: Vec<(String, u32, u32)> = (0..16).map(|i| (format!("p{}", i), 1, 1)).collect();
    let layout = pack_layout(items, &cfg).expect("16 pixels fit 4x4");
    assert_eq!(layout.stats().occupancy, 1.0);

    let items: Vec<(String, u32, u32)> = (0..17).map(|i| (format!("p{}", i), 1, 1)).collect();
    assert!(matches!(
        pack_layout(items, &cfg),
        Err(PackError::FixedBinOverflow { .. })
    ));
}

#[test]
fn test_error_messages_carry_sizes() {
    let err = PackError::FixedBinOverflow { width: 50, height: 50 };
    assert_eq!(err.to_string(), "Can't pack images into a 50 by 50 rectangle");
    let err = PackError::CannotGrow {
        canvas_width: 10,
        canvas_height: 10,
        width: 20,
        height: 20,
    };
    assert!(err.to_string().contains("20x20"));
    assert!(PackError::GrowEmptyLeaf.is_invariant_violation());
    assert!(!PackError::Empty.is_invariant_violation());
}
