//! Fixed-size visitor card layout.
//!
//! The card is designed at 757 × 1069 px, a B4-proportioned page. The layout
//! is a flat list of drawing elements in design coordinates, painted in order
//! by the rasterizer:
//!
//! ```text
//!   ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~   wave header
//!               ( logo )
//!             COMPANY NAME
//!                 ----
//!              +--------+
//!              |   QR   |            visitor id
//!              +--------+
//!        INFORMASI PENGUNJUNG
//!        Nama / Posisi / Telepon / Email / Alamat
//!        Waktu Scan: <timestamp>
//!            VISITOR PASS
//!   ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~   wave footer
//! ```
//!
//! # Character Encoding - ASCII Only
//!
//! Text is drawn with the built-in 5×7 font. Lowercase is drawn uppercase,
//! control characters are removed, and any other non-ASCII character is drawn
//! as `?`. Text longer than its column budget is truncated.

use crate::error::Result;
use crate::font::{ADVANCE, text_width};
use crate::qr::QrMatrix;
use badgekey_core::{PixelSize, ScanRecord};

/// Grey levels used on the card.
pub mod shade {
    pub const WHITE: u8 = 255;
    pub const WAVE_DARK: u8 = 101;
    pub const WAVE_MID: u8 = 128;
    pub const WAVE_LIGHT: u8 = 189;
    pub const RULE: u8 = 229;
    pub const TEXT: u8 = 50;
    pub const LABEL: u8 = 113;
    pub const BLACK: u8 = 0;
}

const PADDING_X: i32 = 80;
const CARD_CENTER_X: i32 = 378;

const LABEL_SCALE: u32 = 2;
const VALUE_SCALE: u32 = 3;
const TITLE_SCALE: u32 = 3;
const COMPANY_SCALE: u32 = 4;
const META_SCALE: u32 = 2;

const QR_TOP: i32 = 375;
const QR_SIZE: u32 = 200;
const QR_PADDING: u32 = 24;
const QR_BORDER: u32 = 4;

const ROWS_TOP: i32 = 685;
const ROW_PITCH: i32 = 44;

/// Text alignment relative to a text element's anchor `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Text starts at the anchor.
    Left,
    /// Text is centered on the anchor.
    Center,
    /// Text ends at the anchor.
    Right,
}

/// One drawing primitive, in design coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// Filled axis-aligned ellipse.
    Ellipse {
        cx: i32,
        cy: i32,
        rx: u32,
        ry: u32,
        shade: u8,
    },

    /// Filled rectangle.
    Rect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        shade: u8,
    },

    /// A line of text in the built-in font.
    Text {
        x: i32,
        y: i32,
        scale: u32,
        align: Alignment,
        shade: u8,
        text: String,
    },

    /// A QR code scaled into a `size` × `size` square.
    Qr {
        x: i32,
        y: i32,
        size: u32,
        matrix: QrMatrix,
    },
}

/// The full card for one scan, ready to rasterize.
///
/// # Examples
///
/// ```
/// use badgekey_card::CardLayout;
/// use badgekey_core::{ScanId, ScanRecord, VisitorRecord};
/// use chrono::Local;
///
/// let visitor = VisitorRecord::new("1", "Irhan Achmad J").with_company("SMK Jaya");
/// let record = ScanRecord::new(visitor, Local::now(), ScanId::new(1));
///
/// let layout = CardLayout::for_record(&record).unwrap();
/// assert!(layout.texts().any(|t| t == "SMK JAYA"));
/// assert!(layout.texts().any(|t| t == "VISITOR PASS"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLayout {
    size: PixelSize,
    elements: Vec<Element>,
}

impl CardLayout {
    /// Lay out the card for a scan record.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::QrEncoding` if the visitor id cannot be encoded.
    pub fn for_record(record: &ScanRecord) -> Result<Self> {
        let visitor = &record.visitor;
        let mut layout = Self {
            size: PixelSize::card(),
            elements: Vec::with_capacity(48),
        };

        layout.push_header();

        // Logo: ringed disc with a stylised building.
        layout.ellipse(CARD_CENTER_X, 250, 50, 50, shade::WAVE_DARK);
        layout.ellipse(CARD_CENTER_X, 250, 46, 46, shade::WHITE);
        layout.rect(CARD_CENTER_X - 16, 226, 32, 48, shade::WAVE_MID);
        for row in 0..3 {
            for col in 0..2 {
                layout.rect(
                    CARD_CENTER_X - 10 + col * 14,
                    232 + row * 14,
                    6,
                    8,
                    shade::WHITE,
                );
            }
        }

        layout.text_centered(315, COMPANY_SCALE, shade::TEXT, &visitor.company);
        layout.rect(CARD_CENTER_X - 50, 355, 100, 4, shade::WAVE_DARK);

        layout.push_qr(QrMatrix::encode(&visitor.id)?);

        layout.text_centered(650, TITLE_SCALE, shade::WAVE_DARK, "INFORMASI PENGUNJUNG");

        let rows = [
            ("Nama", visitor.name.as_str()),
            ("Posisi", visitor.position.as_str()),
            ("Telepon", visitor.phone.as_str()),
            ("Email", visitor.email.as_str()),
            ("Alamat", visitor.address.as_str()),
        ];
        let last = rows.len() - 1;
        for (i, (label, value)) in rows.into_iter().enumerate() {
            let y = ROWS_TOP + i as i32 * ROW_PITCH;
            layout.text_left(y, LABEL_SCALE, shade::LABEL, label);
            layout.text_left(y + 17, VALUE_SCALE, shade::TEXT, value);
            if i != last {
                layout.rect(
                    PADDING_X,
                    y + 41,
                    (2 * (CARD_CENTER_X - PADDING_X)) as u32,
                    1,
                    shade::RULE,
                );
            }
        }

        layout.text_centered(
            915,
            META_SCALE,
            shade::LABEL,
            &format!("Waktu Scan: {}", record.timestamp),
        );
        layout.text_centered(940, TITLE_SCALE, shade::WAVE_DARK, "VISITOR PASS");

        layout.push_footer();

        Ok(layout)
    }

    /// Design size of the card.
    pub fn size(&self) -> PixelSize {
        self.size
    }

    /// Elements in paint order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Text of every text element, in paint order, as it will be drawn.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|element| match element {
            Element::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    fn push_header(&mut self) {
        let width = self.size.width;
        // Dark rim shows below the gradient band.
        self.ellipse(CARD_CENTER_X, 0, width * 6 / 10 + 4, 184, shade::WAVE_DARK);
        self.ellipse(CARD_CENTER_X, 0, width * 6 / 10, 180, shade::WAVE_MID);
        self.ellipse(CARD_CENTER_X, 0, width * 4 / 10, 110, shade::WAVE_LIGHT);
    }

    fn push_footer(&mut self) {
        let width = self.size.width;
        let bottom = self.size.height as i32;
        self.ellipse(CARD_CENTER_X, bottom, width * 75 / 100, 60, shade::WAVE_LIGHT);
        self.ellipse(CARD_CENTER_X, bottom, width * 70 / 100, 70, shade::WAVE_MID);
        self.ellipse(CARD_CENTER_X, bottom, width * 65 / 100, 80, shade::WAVE_DARK);
    }

    fn push_qr(&mut self, matrix: QrMatrix) {
        let outer = QR_SIZE + 2 * (QR_PADDING + QR_BORDER);
        let x = CARD_CENTER_X - (outer / 2) as i32;

        self.rect(x, QR_TOP, outer, outer, shade::WAVE_DARK);
        self.rect(
            x + QR_BORDER as i32,
            QR_TOP + QR_BORDER as i32,
            outer - 2 * QR_BORDER,
            outer - 2 * QR_BORDER,
            shade::WHITE,
        );

        let inset = (QR_BORDER + QR_PADDING) as i32;
        self.elements.push(Element::Qr {
            x: x + inset,
            y: QR_TOP + inset,
            size: QR_SIZE,
            matrix,
        });
    }

    fn ellipse(&mut self, cx: i32, cy: i32, rx: u32, ry: u32, shade: u8) {
        self.elements.push(Element::Ellipse {
            cx,
            cy,
            rx,
            ry,
            shade,
        });
    }

    fn rect(&mut self, x: i32, y: i32, width: u32, height: u32, shade: u8) {
        self.elements.push(Element::Rect {
            x,
            y,
            width,
            height,
            shade,
        });
    }

    fn text_left(&mut self, y: i32, scale: u32, shade: u8, text: &str) {
        let budget = column_budget(self.size.width, scale);
        self.elements.push(Element::Text {
            x: PADDING_X,
            y,
            scale,
            align: Alignment::Left,
            shade,
            text: fit_text(text, budget),
        });
    }

    fn text_centered(&mut self, y: i32, scale: u32, shade: u8, text: &str) {
        let budget = column_budget(self.size.width, scale);
        self.elements.push(Element::Text {
            x: CARD_CENTER_X,
            y,
            scale,
            align: Alignment::Center,
            shade,
            text: fit_text(text, budget),
        });
    }
}

/// Characters that fit between the side paddings at `scale`.
pub fn column_budget(card_width: u32, scale: u32) -> usize {
    let usable = card_width.saturating_sub(2 * PADDING_X as u32);
    ((usable + scale) / (ADVANCE * scale)) as usize
}

/// Prepare text for the card font: drop control characters, trim, uppercase,
/// map unsupported characters to `?`, and truncate to `max_chars`.
///
/// # Examples
///
/// ```
/// use badgekey_card::layout::fit_text;
///
/// assert_eq!(fit_text("  Jl. Cimahi ", 40), "JL. CIMAHI");
/// assert_eq!(fit_text("Bandung", 4), "BAND");
/// assert_eq!(fit_text("Café", 10), "CAF?");
/// ```
pub fn fit_text(text: &str, max_chars: usize) -> String {
    text.chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .chars()
        .map(crate::font::printable)
        .take(max_chars)
        .collect()
}

/// Left edge of a text run of `chars` characters anchored at `anchor`.
pub fn aligned_x(anchor: i32, chars: usize, scale: u32, align: Alignment) -> i32 {
    let width = text_width(chars, scale) as i32;
    match align {
        Alignment::Left => anchor,
        Alignment::Center => anchor - width / 2,
        Alignment::Right => anchor - width,
    }
}
