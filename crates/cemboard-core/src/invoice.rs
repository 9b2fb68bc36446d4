//! One-page A4 invoice for a print job
//!
//! Layout is expressed in points from the top-left corner and converted to
//! printpdf's bottom-left millimetre space when drawn.

use crate::calendar;
use crate::config::InvoiceConfig;
use crate::error::{CoreError, Result};
use crate::ledger::format_amount;
use crate::models::PrintRecord;
use printpdf::image_crate::GenericImageView;
use printpdf::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 40.0;
const SELLER_X: f32 = PAGE_WIDTH - 250.0;
const LOGO_SIZE: f32 = 80.0;
const SIGNATURE_WIDTH: f32 = 130.0;

/// Average Helvetica glyph width as a fraction of the font size
const GLYPH_WIDTH: f32 = 0.5;

/// `invoice_{id}.pdf`
pub fn invoice_file_name(id: &str) -> String {
    format!("invoice_{}.pdf", id)
}

/// Raw image bytes drawn on the invoice; missing ones are skipped
#[derive(Debug, Clone, Default)]
pub struct InvoiceAssets {
    pub logo: Option<Vec<u8>>,
    pub signature: Option<Vec<u8>>,
}

async fn read_asset(path: Option<&Path>) -> Option<Vec<u8>> {
    let path = path?;
    match tokio::fs::read(path).await {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Invoice image unavailable, skipping");
            None
        }
    }
}

impl InvoiceAssets {
    /// Load logo and signature concurrently
    pub async fn load(config: &InvoiceConfig) -> Self {
        let (logo, signature) = tokio::join!(
            read_asset(config.logo_path.as_deref()),
            read_asset(config.signature_path.as_deref())
        );
        Self { logo, signature }
    }
}

fn pdf_error(e: impl std::fmt::Display) -> CoreError {
    CoreError::Invoice {
        message: e.to_string(),
    }
}

/// Top-left point coordinates to a printpdf point
fn at(x: f32, y: f32) -> (Mm, Mm) {
    (Mm::from(Pt(x)), Mm::from(Pt(PAGE_HEIGHT - y)))
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * GLYPH_WIDTH
}

struct Canvas {
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Canvas {
    fn text(&self, text: &str, size: f32, x: f32, y: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        let (x, y) = at(x, y);
        self.layer.use_text(text, size, x, y, font);
    }

    fn text_centered(&self, text: &str, size: f32, y: f32, bold: bool) {
        let x = (PAGE_WIDTH - text_width(text, size)) / 2.0;
        self.text(text, size, x, y, bold);
    }

    fn text_right(&self, text: &str, size: f32, right: f32, y: f32) {
        self.text(text, size, right - text_width(text, size), y, false);
    }

    fn rule(&self, y: f32) {
        let (x1, y1) = at(MARGIN, y);
        let (x2, y2) = at(PAGE_WIDTH - MARGIN, y);
        self.layer.add_line(Line {
            points: vec![(Point::new(x1, y1), false), (Point::new(x2, y2), false)],
            is_closed: false,
        });
    }

    /// Draw an image with its top-left corner at (x, y), `width` points wide.
    /// Returns the drawn height, or `None` if the bytes are not an image.
    fn image(&self, bytes: &[u8], x: f32, y: f32, width: f32, height: Option<f32>) -> Option<f32> {
        let decoded = match image_crate::load_from_memory(bytes) {
            Ok(img) => img,
            Err(e) => {
                warn!(error = %e, "Invoice image could not be decoded, skipping");
                return None;
            }
        };
        let (px_w, px_h) = (decoded.width() as f32, decoded.height() as f32);
        if px_w == 0.0 || px_h == 0.0 {
            return None;
        }
        let height = height.unwrap_or(px_h / px_w * width);

        let (tx, ty) = at(x, y + height);
        Image::from_dynamic_image(&decoded).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(tx),
                translate_y: Some(ty),
                scale_x: Some(width / px_w),
                scale_y: Some(height / px_h),
                dpi: Some(72.0),
                ..Default::default()
            },
        );
        Some(height)
    }

    fn link(&self, text: &str, size: f32, y: f32, url: &str) {
        let width = text_width(text, size);
        let x = (PAGE_WIDTH - width) / 2.0;
        self.text(text, size, x, y, false);

        let (llx, lly) = at(x, y + 2.0);
        let (urx, ury) = at(x + width, y - size);
        self.layer.add_link_annotation(LinkAnnotation::new(
            Rect::new(llx, lly, urx, ury),
            Some(BorderArray::default()),
            Some(ColorArray::default()),
            Actions::uri(url.to_string()),
            Some(HighlightingMode::Invert),
        ));
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("-")
}

/// Render the invoice for one record to PDF bytes
pub fn render_invoice(
    record: &PrintRecord,
    config: &InvoiceConfig,
    assets: &InvoiceAssets,
) -> Result<Vec<u8>> {
    let title = format!("Invoice {}", record.id);
    let (doc, page, layer) = PdfDocument::new(
        &title,
        Mm::from(Pt(PAGE_WIDTH)),
        Mm::from(Pt(PAGE_HEIGHT)),
        "Invoice",
    );
    let canvas = Canvas {
        layer: doc.get_page(page).get_layer(layer),
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?,
    };
    canvas.layer.set_outline_thickness(0.75);

    let mut y = 40.0;

    if let Some(logo) = &assets.logo {
        canvas.image(logo, PAGE_WIDTH / 2.0 - LOGO_SIZE / 2.0, y, LOGO_SIZE, Some(LOGO_SIZE));
    }
    y += 100.0;

    canvas.text_centered("INVOICE", 22.0, y, true);
    y += 30.0;

    let date = calendar::short_date(record.date.as_deref()).unwrap_or_else(|| "-".to_string());
    canvas.text(&format!("Invoice ID: {}", record.id), 11.0, MARGIN, y, false);
    canvas.text_right(&format!("Date: {}", date), 11.0, PAGE_WIDTH - MARGIN, y);
    y += 10.0;
    canvas.rule(y);
    y += 20.0;

    canvas.text("Buyer Information", 13.0, MARGIN, y, true);
    canvas.text("Seller Information", 13.0, SELLER_X, y, true);
    y += 18.0;

    let rows = [
        (
            format!("Name: {}", or_dash(Some(record.client_name.as_str()))),
            config.seller_name.clone(),
        ),
        (
            format!("Address: {}", or_dash(record.address.as_deref())),
            config.seller_address.clone(),
        ),
        (
            format!("Phone: {}", or_dash(record.phone.as_deref())),
            format!("Phone: {}", config.seller_phone),
        ),
        (
            format!("Email: {}", or_dash(record.email.as_deref())),
            format!("Email: {}", config.seller_email),
        ),
    ];
    for (buyer, seller) in &rows {
        canvas.text(buyer, 12.0, MARGIN, y, false);
        canvas.text(seller, 12.0, SELLER_X, y, false);
        y += 16.0;
    }
    y += 14.0;

    canvas.text("Item", 12.0, MARGIN, y, true);
    canvas.text("Pages", 12.0, 240.0, y, true);
    canvas.text("Charge/Page", 12.0, 320.0, y, true);
    canvas.text("Total Charge", 12.0, 480.0, y, true);
    y += 10.0;
    canvas.rule(y);
    y += 20.0;

    let totals = record.recomputed();
    canvas.text("Printing Service", 12.0, MARGIN, y, false);
    canvas.text(&format_amount(record.total_pages), 12.0, 240.0, y, false);
    canvas.text(&format_amount(record.charge_per_page), 12.0, 320.0, y, false);
    canvas.text(&format_amount(totals.total_charge), 12.0, 480.0, y, false);
    y += 90.0;

    let sig_x = PAGE_WIDTH - SIGNATURE_WIDTH - MARGIN;
    let sig_height = assets
        .signature
        .as_deref()
        .and_then(|bytes| canvas.image(bytes, sig_x, y, SIGNATURE_WIDTH, None))
        .unwrap_or(0.0);
    canvas.text("Authorized Signature", 11.0, sig_x, y + sig_height + 15.0, false);

    canvas
        .layer
        .set_fill_color(Color::Greyscale(Greyscale::new(0.47, None)));
    canvas.link(
        &config.attribution_text,
        10.0,
        PAGE_HEIGHT - 40.0,
        &config.attribution_url,
    );

    doc.save_to_bytes().map_err(pdf_error)
}

/// Render and write `invoice_{id}.pdf` into `dir`
pub fn write_invoice(
    record: &PrintRecord,
    config: &InvoiceConfig,
    assets: &InvoiceAssets,
    dir: &Path,
) -> Result<PathBuf> {
    let bytes = render_invoice(record, config, assets)?;
    let path = dir.join(invoice_file_name(&record.id));
    std::fs::write(&path, bytes).map_err(|source| CoreError::FileWrite {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), id = %record.id, "Invoice written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record() -> PrintRecord {
        PrintRecord {
            id: "66ab12".to_string(),
            client_name: "Amin".to_string(),
            total_pages: 10.0,
            charge_per_page: 5.0,
            cost_per_page: 3.0,
            total_charge: 50.0,
            total_cost: 30.0,
            profit: 20.0,
            date: Some("2024-05-01T00:00:00.000Z".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(invoice_file_name("abc"), "invoice_abc.pdf");
    }

    #[test]
    fn test_render_without_assets() {
        let bytes =
            render_invoice(&record(), &InvoiceConfig::default(), &InvoiceAssets::default())
                .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_undecodable_assets_are_skipped() {
        let assets = InvoiceAssets {
            logo: Some(b"not a png".to_vec()),
            signature: Some(Vec::new()),
        };
        let bytes = render_invoice(&record(), &InvoiceConfig::default(), &assets).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_write_invoice() {
        let dir = TempDir::new().unwrap();
        let path = write_invoice(
            &record(),
            &InvoiceConfig::default(),
            &InvoiceAssets::default(),
            dir.path(),
        )
        .unwrap();
        assert_eq!(path.file_name().unwrap(), "invoice_66ab12.pdf");
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[tokio::test]
    async fn test_missing_asset_files_load_as_none() {
        let dir = TempDir::new().unwrap();
        let logo = dir.path().join("logo.png");
        std::fs::write(&logo, b"bytes").unwrap();

        let config = InvoiceConfig {
            logo_path: Some(logo),
            signature_path: Some(dir.path().join("missing.png")),
            ..Default::default()
        };
        let assets = InvoiceAssets::load(&config).await;
        assert_eq!(assets.logo.as_deref(), Some(&b"bytes"[..]));
        assert!(assets.signature.is_none());
    }
}
