#![no_main]
use echowalk_core::{BoundingBox, Category, Vec3, classify, classify_with_hint};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: [f32; 6]| {
    let bbox = BoundingBox::new(
        Vec3::new(data[0], data[1], data[2]),
        Vec3::new(data[3], data[4], data[5]),
    );
    let c = classify(&bbox);
    assert_eq!(c, classify(&bbox));
    if bbox.is_degenerate() {
        assert_eq!(c, Category::Unknown);
    }
    let _ = classify_with_hint(&bbox, Some(Category::Door));
});
