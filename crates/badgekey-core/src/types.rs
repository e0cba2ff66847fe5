use crate::constants::{
    CARD_HEIGHT_PX, CARD_WIDTH_PX, PAPER_HEIGHT_MM, PAPER_WIDTH_MM, SCAN_TIMESTAMP_FORMAT,
};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A visitor known to the kiosk, as encoded in their QR badge.
///
/// Records are produced by the visitor resolver from a static lookup table and
/// are never mutated afterwards. The `id` doubles as the QR payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorRecord {
    /// Unique visitor identifier, also the QR payload value.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
}

impl VisitorRecord {
    /// Create a visitor record with only the identifier and name set.
    ///
    /// # Examples
    ///
    /// ```
    /// use badgekey_core::VisitorRecord;
    ///
    /// let visitor = VisitorRecord::new("7", "Dewi Lestari").with_company("PT Sinar");
    /// assert_eq!(visitor.company, "PT Sinar");
    /// assert!(visitor.email.is_empty());
    /// ```
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            company: String::new(),
            position: String::new(),
            phone: String::new(),
            email: String::new(),
            address: String::new(),
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = position.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }
}

/// Unique identifier of one accepted scan within a session.
///
/// Derived from the capture time in milliseconds, bumped when two scans land in
/// the same millisecond so that ids stay strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanId(u64);

impl ScanId {
    pub fn new(id: u64) -> Self {
        ScanId(id)
    }

    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out time-derived, strictly increasing [`ScanId`]s.
///
/// # Examples
///
/// ```
/// use badgekey_core::ScanIdGenerator;
/// use chrono::Local;
///
/// let mut ids = ScanIdGenerator::default();
/// let now = Local::now();
/// let first = ids.next_at(now);
/// let second = ids.next_at(now);
/// assert!(second > first);
/// ```
#[derive(Debug, Default, Clone)]
pub struct ScanIdGenerator {
    last: Option<u64>,
}

impl ScanIdGenerator {
    /// Next id for a scan captured at `at`.
    pub fn next_at(&mut self, at: DateTime<Local>) -> ScanId {
        let millis = u64::try_from(at.timestamp_millis()).unwrap_or(0);
        let id = match self.last {
            Some(last) if millis <= last => last + 1,
            _ => millis,
        };
        self.last = Some(id);
        ScanId(id)
    }

    /// Account for an id handed out elsewhere, so later ids land above it.
    pub fn observe(&mut self, id: ScanId) {
        self.last = Some(self.last.map_or(id.0, |last| last.max(id.0)));
    }
}

/// One accepted scan: the resolved visitor plus when it was captured.
///
/// Created exactly once per accepted decode event and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    #[serde(flatten)]
    pub visitor: VisitorRecord,

    /// Human-readable capture time, as printed on the card.
    pub timestamp: String,

    /// Machine-readable capture time.
    pub captured_at: DateTime<Local>,

    pub scan_id: ScanId,
}

impl ScanRecord {
    /// Stamp a visitor with a capture time and scan id.
    pub fn new(visitor: VisitorRecord, captured_at: DateTime<Local>, scan_id: ScanId) -> Self {
        Self {
            visitor,
            timestamp: captured_at.format(SCAN_TIMESTAMP_FORMAT).to_string(),
            captured_at,
            scan_id,
        }
    }
}

/// Pixel dimensions of a rasterized card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The fixed card design size (757 × 1069).
    pub const fn card() -> Self {
        Self::new(CARD_WIDTH_PX, CARD_HEIGHT_PX)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for PixelSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}px", self.width, self.height)
    }
}

/// Physical output size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaperSize {
    pub width_mm: u32,
    pub height_mm: u32,
}

impl PaperSize {
    pub const fn new(width_mm: u32, height_mm: u32) -> Self {
        Self {
            width_mm,
            height_mm,
        }
    }

    /// B4 portrait (257 × 364 mm).
    pub const fn b4() -> Self {
        Self::new(PAPER_WIDTH_MM, PAPER_HEIGHT_MM)
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}mm", self.width_mm, self.height_mm)
    }
}

/// A rasterized card, PNG-encoded.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub size: PixelSize,
    pub png: Vec<u8>,
}

impl RasterImage {
    pub fn new(size: PixelSize, png: Vec<u8>) -> Self {
        Self { size, png }
    }
}

// PNG bytes are noise in logs.
impl fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterImage")
            .field("size", &self.size)
            .field("png_bytes", &self.png.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn sample_visitor() -> VisitorRecord {
        VisitorRecord::new("1", "Irhan Achmad J")
            .with_company("SMK Jaya")
            .with_position("Administrator")
            .with_phone("+62 852-1234-5678")
            .with_email("irhan@gmail.com")
            .with_address("Jl. Cimahi No. 123, Bandung")
    }

    #[test]
    fn test_scan_ids_strictly_increase_within_same_millisecond() {
        let mut ids = ScanIdGenerator::default();
        let at = Local.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();

        let a = ids.next_at(at);
        let b = ids.next_at(at);
        let c = ids.next_at(at);

        assert!(a < b && b < c);
        assert_eq!(b.as_u64(), a.as_u64() + 1);
    }

    #[test]
    fn test_scan_ids_follow_clock_when_it_moves_forward() {
        let mut ids = ScanIdGenerator::default();
        let at = Local.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();
        let later = at + chrono::Duration::seconds(2);

        let a = ids.next_at(at);
        let b = ids.next_at(later);

        assert_eq!(b.as_u64() - a.as_u64(), 2_000);
    }

    #[test]
    fn test_scan_ids_never_go_backwards_when_clock_does() {
        let mut ids = ScanIdGenerator::default();
        let at = Local.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();
        let earlier = at - chrono::Duration::minutes(5);

        let a = ids.next_at(at);
        let b = ids.next_at(earlier);

        assert!(b > a);
    }

    #[test]
    fn test_observed_id_is_never_reissued() {
        let mut ids = ScanIdGenerator::default();
        let at = Local.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();
        let taken = ScanId::new(u64::try_from(at.timestamp_millis()).unwrap());

        ids.observe(taken);
        let next = ids.next_at(at);

        assert_eq!(next.as_u64(), taken.as_u64() + 1);
    }

    #[test]
    fn test_observing_an_older_id_keeps_the_sequence() {
        let mut ids = ScanIdGenerator::default();
        let at = Local.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();

        let a = ids.next_at(at);
        ids.observe(ScanId::new(7));
        let b = ids.next_at(at);

        assert_eq!(b.as_u64(), a.as_u64() + 1);
    }

    #[test]
    fn test_scan_record_formats_timestamp() {
        let at = Local.with_ymd_and_hms(2026, 10, 18, 14, 30, 5).unwrap();
        let record = ScanRecord::new(sample_visitor(), at, ScanId::new(42));

        assert_eq!(record.timestamp, "18/10/2026, 14.30.05");
        assert_eq!(record.scan_id.as_u64(), 42);
        assert_eq!(record.visitor.name, "Irhan Achmad J");
    }

    #[test]
    fn test_scan_record_serializes_flat() {
        let at = Local.with_ymd_and_hms(2026, 10, 18, 14, 30, 5).unwrap();
        let record = ScanRecord::new(sample_visitor(), at, ScanId::new(7));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "Irhan Achmad J");
        assert_eq!(json["scan_id"], 7);
        assert_eq!(json["timestamp"], "18/10/2026, 14.30.05");
    }

    #[rstest]
    #[case(PixelSize::new(0, 10), true)]
    #[case(PixelSize::new(10, 0), true)]
    #[case(PixelSize::card(), false)]
    fn test_pixel_size_is_empty(#[case] size: PixelSize, #[case] expected: bool) {
        assert_eq!(size.is_empty(), expected);
    }

    #[test]
    fn test_display_formats() {
        assert_eq!(PixelSize::card().to_string(), "757x1069px");
        assert_eq!(PaperSize::b4().to_string(), "257x364mm");
        assert_eq!(ScanId::new(5).to_string(), "5");
    }

    #[test]
    fn test_raster_image_debug_hides_bytes() {
        let image = RasterImage::new(PixelSize::new(2, 2), vec![0; 64]);
        let debug = format!("{image:?}");
        assert!(debug.contains("png_bytes: 64"));
    }
}
