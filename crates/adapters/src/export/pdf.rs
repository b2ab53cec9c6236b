use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rect, Rgb,
};
use product_inspect_application::{ApplicationError, ReportWriter};
use product_inspect_domain::{ReportFormat, ReportTable};

use super::write_via_part_file;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const TABLE_TOP: f32 = 85.0;
const ROW_HEIGHT: f32 = 8.0;
const FOOTER_TOP: f32 = PAGE_HEIGHT - 10.0;
const TABLE_BOTTOM_LIMIT: f32 = PAGE_HEIGHT - 20.0;
const CELL_FONT_SIZE: f32 = 10.0;
const HEADER_FILL: (u8, u8, u8) = (66, 139, 202);
// Rough Helvetica advance in em, enough to centre short headings.
const AVERAGE_GLYPH_EM: f32 = 0.5;
const POINT_TO_MM: f32 = 0.3528;

#[derive(Debug, Default)]
pub struct PdfReportWriter;

impl ReportWriter for PdfReportWriter {
    fn format(&self) -> ReportFormat {
        ReportFormat::Pdf
    }

    fn write(&self, table: &ReportTable, destination: &Path) -> Result<(), ApplicationError> {
        write_via_part_file(destination, |part| {
            let document = render_document(table)?;
            let file = File::create(part).map_err(|error| error.to_string())?;
            document
                .save(&mut BufWriter::new(file))
                .map_err(|error| error.to_string())
        })
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn render_document(table: &ReportTable) -> Result<PdfDocumentReference, String> {
    let (document, first_page, first_layer) =
        PdfDocument::new(table.title.as_str(), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let fonts = Fonts {
        regular: document
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|error| error.to_string())?,
        bold: document
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|error| error.to_string())?,
    };

    let mut layers = vec![document.get_page(first_page).get_layer(first_layer)];
    let layer = &layers[0];
    text_centered(layer, &table.title, 18.0, 15.0, &fonts.bold);
    text_centered(
        layer,
        &format!("Generated: {}", table.generated_at),
        12.0,
        25.0,
        &fonts.regular,
    );
    text_at(layer, "Summary Statistics", 14.0, MARGIN, 40.0, &fonts.bold);
    for (index, field) in table.summary.iter().enumerate() {
        text_at(
            layer,
            &format!("{}: {}", field.label, field.value),
            12.0,
            MARGIN,
            50.0 + index as f32 * 7.0,
            &fonts.regular,
        );
    }
    let log_heading_top = (50.0 + table.summary.len() as f32 * 7.0 + 9.0).max(80.0);
    text_at(layer, "Recent Inspection Log", 14.0, MARGIN, log_heading_top, &fonts.bold);

    let widths = column_widths(table.columns.len());
    let first_row_top = log_heading_top + (TABLE_TOP - 80.0);
    draw_header_row(&layers[0], &table.columns, &widths, first_row_top, &fonts);

    for (row, placement) in table.rows.iter().zip(row_placements(table.rows.len(), first_row_top)) {
        if placement.page == layers.len() {
            let (page, layer) = document.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            layers.push(document.get_page(page).get_layer(layer));
            draw_header_row(&layers[placement.page], &table.columns, &widths, MARGIN, &fonts);
        }
        draw_body_row(&layers[placement.page], row, &widths, placement.top, &fonts);
    }

    let page_count = layers.len();
    for (index, layer) in layers.iter().enumerate() {
        set_fill(layer, (0, 0, 0));
        text_centered(
            layer,
            &format!("Page {} of {}", index + 1, page_count),
            10.0,
            FOOTER_TOP,
            &fonts.regular,
        );
        text_at(layer, "ProductInspect AI", 10.0, MARGIN, FOOTER_TOP, &fonts.regular);
    }

    Ok(document)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RowPlacement {
    page: usize,
    top: f32,
}

/// Places body rows below the header, moving to a fresh page (with its own header) when a row
/// would run into the footer.
fn row_placements(rows: usize, first_header_top: f32) -> Vec<RowPlacement> {
    let mut placements = Vec::with_capacity(rows);
    let mut page = 0;
    let mut top = first_header_top + ROW_HEIGHT;
    for _ in 0..rows {
        if top + ROW_HEIGHT > TABLE_BOTTOM_LIMIT {
            page += 1;
            top = MARGIN + ROW_HEIGHT;
        }
        placements.push(RowPlacement { page, top });
        top += ROW_HEIGHT;
    }
    placements
}

fn column_widths(columns: usize) -> Vec<f32> {
    let printable = PAGE_WIDTH - MARGIN * 2.0;
    match columns {
        0 => Vec::new(),
        5 => vec![30.0, 18.0, 50.0, 25.0, 47.0],
        count => vec![printable / count as f32; count],
    }
}

fn draw_header_row(
    layer: &PdfLayerReference,
    columns: &[String],
    widths: &[f32],
    top: f32,
    fonts: &Fonts,
) {
    let mut left = MARGIN;
    for (name, width) in columns.iter().zip(widths) {
        set_fill(layer, HEADER_FILL);
        layer.add_rect(cell_rect(left, top, *width).with_mode(PaintMode::Fill));
        draw_cell_border(layer, left, top, *width);
        set_fill(layer, (255, 255, 255));
        text_at(layer, name, CELL_FONT_SIZE, left + 2.0, top + 5.5, &fonts.bold);
        left += width;
    }
}

fn draw_body_row(layer: &PdfLayerReference, row: &[String], widths: &[f32], top: f32, fonts: &Fonts) {
    let mut left = MARGIN;
    for (value, width) in row.iter().zip(widths) {
        draw_cell_border(layer, left, top, *width);
        set_fill(layer, (0, 0, 0));
        text_at(layer, value, CELL_FONT_SIZE, left + 2.0, top + 5.5, &fonts.regular);
        left += width;
    }
}

fn draw_cell_border(layer: &PdfLayerReference, left: f32, top: f32, width: f32) {
    layer.set_outline_color(rgb((200, 200, 200)));
    layer.set_outline_thickness(0.3);
    let bottom = top + ROW_HEIGHT;
    let corners = [
        (left, top),
        (left + width, top),
        (left + width, bottom),
        (left, bottom),
    ];
    layer.add_line(Line {
        points: corners
            .iter()
            .map(|(x, y)| (Point::new(Mm(*x), Mm(PAGE_HEIGHT - y)), false))
            .collect(),
        is_closed: true,
    });
}

fn cell_rect(left: f32, top: f32, width: f32) -> Rect {
    Rect::new(
        Mm(left),
        Mm(PAGE_HEIGHT - top - ROW_HEIGHT),
        Mm(left + width),
        Mm(PAGE_HEIGHT - top),
    )
}

// `top` is measured from the upper page edge; PDF space starts at the bottom.
fn text_at(layer: &PdfLayerReference, text: &str, size: f32, left: f32, top: f32, font: &IndirectFontRef) {
    layer.use_text(text, size, Mm(left), Mm(PAGE_HEIGHT - top), font);
}

fn text_centered(layer: &PdfLayerReference, text: &str, size: f32, top: f32, font: &IndirectFontRef) {
    let left = (PAGE_WIDTH - estimated_width_mm(text, size)) / 2.0;
    text_at(layer, text, size, left.max(0.0), top, font);
}

fn estimated_width_mm(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVERAGE_GLYPH_EM * POINT_TO_MM
}

fn set_fill(layer: &PdfLayerReference, color: (u8, u8, u8)) {
    layer.set_fill_color(rgb(color));
}

fn rgb((red, green, blue): (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(red) / 255.0,
        f32::from(green) / 255.0,
        f32::from(blue) / 255.0,
        None,
    ))
}
