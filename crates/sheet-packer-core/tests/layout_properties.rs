use rand::{Rng, SeedableRng};
use sheet_packer_core::prelude::*;

fn random_images(seed: u64, count: usize, min: u32, max: u32) -> Vec<SourceImage<()>> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let w = rng.gen_range(min..=max);
            let h = rng.gen_range(min..=max);
            SourceImage::sized(format!("img_{}", i), w, h)
        })
        .collect()
}

fn disjoint(placements: &[Placement]) -> bool {
    for i in 0..placements.len() {
        for j in (i + 1)..placements.len() {
            if placements[i].rect().intersects(&placements[j].rect()) {
                return false;
            }
        }
    }
    true
}

fn check_layout(images: &[SourceImage<()>], packing: &Packing<()>) {
    assert!(packing.root().is_well_formed(), "partition invariant broken");
    let layout = packing.layout();
    assert_eq!(layout.placements.len(), images.len());
    assert!(disjoint(&layout.placements), "placements overlap");
    let canvas = layout.canvas();
    for p in &layout.placements {
        assert!(canvas.contains(&p.rect()), "{} outside canvas", p.id);
        let src = images.iter().find(|i| i.id == p.id).expect("known id");
        assert_eq!((p.width, p.height), (src.width, src.height));
    }
}

#[test]
fn grow_mode_random_sets_are_valid() {
    for seed in 0..20u64 {
        let images = random_images(seed, 60, 1, 48);
        let packing = pack(images.clone(), &PackerConfig::default()).expect("grow never fails when sorted");
        check_layout(&images, &packing);
        let stats = packing.layout().stats();
        assert!(stats.occupancy > 0.0 && stats.occupancy <= 1.0);
    }
}

#[test]
fn fixed_mode_random_sets_are_valid() {
    let cfg = PackerConfig::builder().fixed(512, 512).build();
    for seed in 100..120u64 {
        let images = random_images(seed, 80, 4, 40);
        let packing = pack(images.clone(), &cfg).expect("fits in 512x512");
        check_layout(&images, &packing);
        assert_eq!(packing.canvas_size(), (512, 512));
    }
}

#[test]
fn fixed_mode_overflow_reports_bin_size() {
    let cfg = PackerConfig::builder().fixed(64, 64).build();
    let images = random_images(7, 40, 16, 32);
    match pack(images, &cfg) {
        Err(PackError::FixedBinOverflow { width, height }) => assert_eq!((width, height), (64, 64)),
        other => panic!("expected overflow, got {:?}", other.map(|p| p.layout())),
    }
}

#[test]
fn packing_is_deterministic() {
    let images = random_images(42, 120, 2, 64);
    for cfg in [
        PackerConfig::default(),
        PackerConfig::builder().fixed(1024, 1024).build(),
        PackerConfig::builder().sort_order(SortOrder::None).build(),
    ] {
        let a = pack(images.clone(), &cfg).map(|p| p.layout());
        let b = pack(images.clone(), &cfg).map(|p| p.layout());
        match (a, b) {
            (Ok(a), Ok(b)) => assert_eq!(a, b),
            (Err(a), Err(b)) => assert_eq!(a.to_string(), b.to_string()),
            _ => panic!("runs disagree"),
        }
    }
}

#[test]
fn caller_order_random_sets_are_valid_when_they_pack() {
    // Unsorted growth can hit the single-axis limit; whenever it succeeds the
    // layout must still be valid.
    let cfg = PackerConfig::builder().sort_order(SortOrder::None).build();
    let mut packed = 0;
    for seed in 200..240u64 {
        let images = random_images(seed, 12, 1, 32);
        match pack(images.clone(), &cfg) {
            Ok(packing) => {
                check_layout(&images, &packing);
                packed += 1;
            }
            Err(e) => assert!(matches!(e, PackError::CannotGrow { .. }), "{e}"),
        }
    }
    assert!(packed > 0);
}

#[test]
fn ordering_is_monotone() {
    let images = random_images(9, 200, 1, 30);
    let order = packing_order(&images);
    assert_eq!(order.len(), images.len());
    for pair in order.windows(2) {
        let (a, b) = (&images[pair[0]], &images[pair[1]]);
        assert!(
            (a.max_side(), a.area()) <= (b.max_side(), b.area()),
            "{}x{} before {}x{}",
            a.width,
            a.height,
            b.width,
            b.height
        );
    }
    let sorted = sort_by_size(images.clone());
    let by_index: Vec<_> = order.iter().map(|&i| images[i].id.clone()).collect();
    let by_value: Vec<_> = sorted.into_iter().map(|i| i.id).collect();
    assert_eq!(by_index, by_value);
}
