use badgekey_card::{CardRenderer, RasterCardRenderer};
use badgekey_core::{PixelSize, ScanId, ScanRecord, VisitorRecord};
use chrono::{Local, TimeZone};
use image::ImageFormat;

fn seeded_record() -> ScanRecord {
    let visitor = VisitorRecord::new("1", "Irhan Achmad J")
        .with_company("SMK Jaya")
        .with_position("Administrator")
        .with_phone("+62 852-1234-5678")
        .with_email("irhan@gmail.com")
        .with_address("Jl. Cimahi No. 123, Bandung");
    let at = Local.with_ymd_and_hms(2026, 10, 18, 14, 30, 5).unwrap();
    ScanRecord::new(visitor, at, ScanId::new(1))
}

#[tokio::test]
async fn test_capture_produces_decodable_card_png() {
    let mut renderer = RasterCardRenderer::new();
    renderer.mount(&seeded_record()).await.unwrap();
    renderer.wait_layout().await.unwrap();

    let image = renderer.capture(PixelSize::card()).await.unwrap();

    let decoded = image::load_from_memory_with_format(&image.png, ImageFormat::Png)
        .unwrap()
        .into_luma8();
    assert_eq!(decoded.dimensions(), (757, 1069));

    // Something other than background was drawn in every band of the card.
    for band in [0..200, 200..400, 400..700, 700..950, 950..1069] {
        let inked = band
            .clone()
            .any(|y| (0..757).any(|x| decoded.get_pixel(x, y)[0] < 200));
        assert!(inked, "band {band:?} is blank");
    }
}

#[tokio::test]
async fn test_same_record_renders_identically() {
    let mut renderer = RasterCardRenderer::new();
    let record = seeded_record();

    renderer.mount(&record).await.unwrap();
    let first = renderer.capture(PixelSize::card()).await.unwrap();
    renderer.mount(&record).await.unwrap();
    let second = renderer.capture(PixelSize::card()).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_different_visitors_render_differently() {
    let mut renderer = RasterCardRenderer::new();
    let first = seeded_record();
    let mut second = seeded_record();
    second.visitor.id = "2".to_string();

    renderer.mount(&first).await.unwrap();
    let a = renderer.capture(PixelSize::card()).await.unwrap();
    renderer.mount(&second).await.unwrap();
    let b = renderer.capture(PixelSize::card()).await.unwrap();

    assert_ne!(a.png, b.png);
}
