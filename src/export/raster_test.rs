use super::*;

const SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="50" height="25" viewBox="0 0 50 25"><rect x="0" y="0" width="25" height="25" fill="#ff0000"/></svg>"##;

#[test]
fn rasterize_scales_and_fills_background() {
    let raster = rasterize(SQUARE, 4.0, [0x1e, 0x1e, 0x1e]).unwrap();
    assert_eq!((raster.width, raster.height), (200, 100));
    assert_eq!(raster.rgba.len(), 200 * 100 * 4);

    // Left half is the red rect, right half is the dark background.
    assert_eq!(&raster.rgba[0..4], &[255, 0, 0, 255]);
    let right = (199 * 4) as usize;
    assert_eq!(&raster.rgba[right..right + 4], &[0x1e, 0x1e, 0x1e, 255]);
}

#[test]
fn scale_is_capped_to_max_dimension() {
    assert_eq!(capped_scale(100.0, 50.0, 4.0), 4.0);
    let capped = capped_scale(4096.0, 100.0, 12.0);
    assert!((capped - 2.0).abs() < 1e-9);
    let raster = rasterize(SQUARE, 1_000.0, [255, 255, 255]).unwrap();
    assert!(raster.width <= MAX_RASTER_DIMENSION);
}

#[test]
fn invalid_markup_is_serialization_failure() {
    assert!(matches!(rasterize("<not-svg", 1.0, [0, 0, 0]), Err(ExportError::SerializationFailure(_))));
}

#[test]
fn png_has_signature() {
    let raster = rasterize(SQUARE, 1.0, [255, 255, 255]).unwrap();
    let png = encode_png(&raster).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn jpeg_rows_decode_to_slice_height() {
    let raster = rasterize(SQUARE, 2.0, [255, 255, 255]).unwrap();
    let jpeg = encode_jpeg_rows(&raster, 10, 20).unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    let decoded = image::load_from_memory(&jpeg).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (100, 20));
}

#[test]
fn jpeg_rows_out_of_range_fail() {
    let raster = rasterize(SQUARE, 1.0, [255, 255, 255]).unwrap();
    assert!(encode_jpeg_rows(&raster, 20, 10).is_err());
}
