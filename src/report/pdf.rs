use anyhow::Result;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};

use crate::models::NutrientRecord;

const PAGE_WIDTH: f64 = 210.0;
const PAGE_HEIGHT: f64 = 297.0;
const MARGIN: f64 = 20.0;
const LINE_HEIGHT: f64 = 6.0;
const ROW_HEIGHT: f64 = 10.0;
const COL_WIDTH: f64 = 50.0;
const BODY_WRAP: usize = 95;

/// Renders the downloadable report: fixed title, filename, the verbatim
/// advisory text, and the extracted nutrient table. Returns the document
/// as an in-memory buffer.
pub fn render_report(
    filename: &str,
    response_text: &str,
    record: &NutrientRecord,
) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        "Calories Advisor Report",
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "report",
    );
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let mut writer = PageWriter::new(&doc, doc.get_page(page).get_layer(layer));

    let title = "Calories Advisor Report";
    writer.text_line(title, 16.0, &bold, centered_x(title, 16.0));
    writer.space(LINE_HEIGHT);

    for line in wrap_text(&format!("Filename: {}", filename), BODY_WRAP) {
        writer.text_line(&line, 12.0, &font, MARGIN);
    }
    writer.space(LINE_HEIGHT);

    writer.text_line("Response:", 12.0, &font, MARGIN);
    for line in wrap_text(response_text, BODY_WRAP) {
        writer.text_line(&line, 12.0, &font, MARGIN);
    }
    writer.space(LINE_HEIGHT);

    writer.text_line("Extracted Nutrition Breakdown", 12.0, &bold, MARGIN);
    writer.space(2.0);

    if record.is_empty() {
        writer.text_line("No nutrition data extracted.", 12.0, &font, MARGIN);
    } else {
        writer.table_row("Nutrient", "Percentage", &bold);
        for (nutrient, value) in record {
            writer.table_row(nutrient, &format!("{}%", value), &font);
        }
    }

    let bytes = doc.save_to_bytes()?;
    Ok(bytes)
}

/// Cursor over the document that starts a new page when content runs past
/// the bottom margin.
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f64,
}

impl<'a> PageWriter<'a> {
    fn new(doc: &'a PdfDocumentReference, layer: PdfLayerReference) -> Self {
        style_layer(&layer);
        Self {
            doc,
            layer,
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn ensure_room(&mut self, needed: f64) {
        if self.y - needed < MARGIN {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "report");
            self.layer = self.doc.get_page(page).get_layer(layer);
            style_layer(&self.layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn text_line(&mut self, text: &str, size: f64, font: &IndirectFontRef, x: f64) {
        self.ensure_room(LINE_HEIGHT);
        if !text.is_empty() {
            self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
        }
        self.y -= LINE_HEIGHT;
    }

    fn space(&mut self, height: f64) {
        self.ensure_room(height);
        self.y -= height;
    }

    /// One bordered table row of two fixed-width cells.
    fn table_row(&mut self, left: &str, right: &str, font: &IndirectFontRef) {
        self.ensure_room(ROW_HEIGHT);
        let top = self.y;
        for (text, x) in [(left, MARGIN), (right, MARGIN + COL_WIDTH)] {
            cell_border(&self.layer, x, top, COL_WIDTH, ROW_HEIGHT);
            self.layer
                .use_text(text, 12.0, Mm(x + 2.0), Mm(top - 7.0), font);
        }
        self.y -= ROW_HEIGHT;
    }
}

fn style_layer(layer: &PdfLayerReference) {
    layer.set_outline_color(Color::Rgb(Rgb::new(0.4, 0.4, 0.4, None)));
    layer.set_outline_thickness(0.3);
}

fn cell_border(layer: &PdfLayerReference, x: f64, top: f64, width: f64, height: f64) {
    let outline = Line {
        points: vec![
            (Point::new(Mm(x), Mm(top)), false),
            (Point::new(Mm(x + width), Mm(top)), false),
            (Point::new(Mm(x + width), Mm(top - height)), false),
            (Point::new(Mm(x), Mm(top - height)), false),
        ],
        is_closed: true,
        has_fill: false,
        has_stroke: true,
        is_clipping_path: false,
    };
    layer.add_shape(outline);
}

/// Helvetica metrics are not exposed for builtin fonts; approximate glyph
/// width at half the point size.
fn centered_x(text: &str, size: f64) -> f64 {
    const PT_TO_MM: f64 = 0.3528;
    let width = text.len() as f64 * size * 0.5 * PT_TO_MM;
    ((PAGE_WIDTH - width) / 2.0).max(MARGIN)
}

/// Greedy word wrap; a single overlong word keeps its own line.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        if raw.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        for word in raw.split_whitespace() {
            if current.is_empty() {
                current = word.to_string();
            } else if current.len() + 1 + word.len() <= width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(current);
                current = word.to_string();
            }
        }
        lines.push(current);
    }
    lines
}
