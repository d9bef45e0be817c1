//! Encode, render, then decode with an independent reader.

use image::Rgb;
use qrsnap::config::EncodingConfig;
use qrsnap::qrcode::{encode, EcLevel, Version, VersionChoice};
use qrsnap::render::{render, RasterImage};

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

fn decode(img: &RasterImage) -> Vec<String> {
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        img.width() as usize,
        img.height() as usize,
        |x, y| img.get_pixel(x as u32, y as u32).0[0],
    );
    prepared
        .detect_grids()
        .into_iter()
        .map(|grid| grid.decode().expect("decode grid").1)
        .collect()
}

fn roundtrip(text: &str, config: &EncodingConfig) -> Vec<String> {
    let matrix = encode(text, config).unwrap();
    let img = render(&matrix, config.module_size_px, BLACK, WHITE).unwrap();
    decode(&img)
}

#[test]
fn test_example_url_every_level() {
    for ecl in EcLevel::ALL {
        let config = EncodingConfig::default()
            .with_ec_level(ecl)
            .with_module_size(4);
        assert_eq!(
            roundtrip("https://example.com", &config),
            vec!["https://example.com".to_string()],
            "level {ecl}"
        );
    }
}

#[test]
fn test_default_pipeline_dimensions() {
    let config = EncodingConfig::default();
    let matrix = encode("https://example.com", &config).unwrap();
    assert_eq!(matrix.version().value(), 2);
    assert_eq!(matrix.side_len(), 33);

    let img = render(&matrix, config.module_size_px, BLACK, WHITE).unwrap();
    assert_eq!(img.dimensions(), (330, 330));
    assert_eq!(decode(&img), vec!["https://example.com".to_string()]);
}

#[test]
fn test_utf8_text() {
    let text = "Grüße aus Köln, 東京 🚀";
    let config = EncodingConfig::default()
        .with_ec_level(EcLevel::Medium)
        .with_module_size(4);
    assert_eq!(roundtrip(text, &config), vec![text.to_string()]);
}

#[test]
fn test_version_with_version_information() {
    let text = "The quick brown fox jumps over the lazy dog. ".repeat(4);
    let config = EncodingConfig::default()
        .with_ec_level(EcLevel::Quartile)
        .with_module_size(3);
    let matrix = encode(&text, &config).unwrap();
    assert!(matrix.version().value() >= 7, "got {}", matrix.version());

    let img = render(&matrix, 3, BLACK, WHITE).unwrap();
    assert_eq!(decode(&img), vec![text]);
}

#[test]
fn test_fixed_larger_version() {
    let config = EncodingConfig::default()
        .with_version(VersionChoice::Fixed(Version::new(5).unwrap()))
        .with_ec_level(EcLevel::High)
        .with_module_size(4);
    let matrix = encode("short", &config).unwrap();
    assert_eq!(matrix.version().value(), 5);
    assert_eq!(matrix.symbol_size(), 37);

    let img = render(&matrix, 4, BLACK, WHITE).unwrap();
    assert_eq!(decode(&img), vec!["short".to_string()]);
}

#[test]
fn test_colored_rendering_decodes() {
    let config = EncodingConfig::default().with_module_size(4);
    let matrix = encode("colors", &config).unwrap();
    // Dark blue on pale yellow still has a clear red channel contrast
    let img = render(&matrix, 4, Rgb([10, 40, 120]), Rgb([250, 240, 200])).unwrap();
    assert_eq!(decode(&img), vec!["colors".to_string()]);
}
