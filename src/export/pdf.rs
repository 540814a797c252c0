//! Multi-page PDF output: a raster tiled top-to-bottom across A4 pages.
//!
//! Each page embeds one JPEG slice as a `/DCTDecode` image XObject scaled to
//! the page width. Slices never split horizontally; the last page may be
//! partially filled.

use super::ExportError;
use super::raster::{Raster, encode_jpeg_rows};

pub const PAGE_WIDTH_MM: f64 = 210.0;
pub const PAGE_HEIGHT_MM: f64 = 295.0;

const PT_PER_MM: f64 = 72.0 / 25.4;

/// One page's slice of the raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlice {
    pub top: u32,
    pub rows: u32,
}

/// Split `height` raster rows into page-sized slices for a raster `width`
/// pixels wide, fitted to the page width.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn page_slices(width: u32, height: u32) -> Vec<PageSlice> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let rows_per_page = ((f64::from(width) * PAGE_HEIGHT_MM / PAGE_WIDTH_MM).floor() as u32).max(1);
    (0..height)
        .step_by(rows_per_page as usize)
        .map(|top| PageSlice { top, rows: rows_per_page.min(height - top) })
        .collect()
}

/// Build the PDF document for `raster`.
///
/// # Errors
///
/// `SerializationFailure` if the raster is empty or a slice fails to encode.
pub fn write_pdf(raster: &Raster) -> Result<Vec<u8>, ExportError> {
    let slices = page_slices(raster.width, raster.height);
    if slices.is_empty() {
        return Err(ExportError::SerializationFailure("nothing to paginate".into()));
    }

    let page_w = PAGE_WIDTH_MM * PT_PER_MM;
    let page_h = PAGE_HEIGHT_MM * PT_PER_MM;
    let pt_per_px = page_w / f64::from(raster.width);

    let mut doc = PdfWriter::new();
    let page_ids: Vec<usize> = (0..slices.len()).map(|i| 3 + i * 3).collect();
    let kids = page_ids.iter().map(|id| format!("{id} 0 R")).collect::<Vec<_>>().join(" ");

    doc.object(b"<< /Type /Catalog /Pages 2 0 R >>");
    doc.object(format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", slices.len()).as_bytes());

    for (slice, page_id) in slices.iter().zip(&page_ids) {
        let jpeg = encode_jpeg_rows(raster, slice.top, slice.rows)?;
        let draw_h = f64::from(slice.rows) * pt_per_px;
        let content = format!("q {page_w:.2} 0 0 {draw_h:.2} 0 {:.2} cm /Im0 Do Q", page_h - draw_h);

        doc.object(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {page_w:.2} {page_h:.2}] \
                 /Resources << /XObject << /Im0 {} 0 R >> >> /Contents {} 0 R >>",
                page_id + 2,
                page_id + 1
            )
            .as_bytes(),
        );
        doc.stream(&format!("<< /Length {} >>", content.len()), content.as_bytes());
        doc.stream(
            &format!(
                "<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB \
                 /BitsPerComponent 8 /Filter /DCTDecode /Length {} >>",
                raster.width,
                slice.rows,
                jpeg.len()
            ),
            &jpeg,
        );
    }

    Ok(doc.finish())
}

/// Sequential object writer. Objects are numbered in write order from 1.
struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self { buf, offsets: Vec::new() }
    }

    fn begin(&mut self) {
        self.offsets.push(self.buf.len());
        let header = format!("{} 0 obj\n", self.offsets.len());
        self.buf.extend_from_slice(header.as_bytes());
    }

    fn object(&mut self, body: &[u8]) {
        self.begin();
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    fn stream(&mut self, dict: &str, data: &[u8]) {
        self.begin();
        self.buf.extend_from_slice(dict.as_bytes());
        self.buf.extend_from_slice(b"\nstream\n");
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_at = self.buf.len();
        let count = self.offsets.len() + 1;
        let mut xref = format!("xref\n0 {count}\n0000000000 65535 f \n");
        for offset in &self.offsets {
            xref.push_str(&format!("{offset:010} 00000 n \n"));
        }
        xref.push_str(&format!("trailer\n<< /Size {count} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n"));
        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}

#[cfg(test)]
#[path = "pdf_test.rs"]
mod tests;
