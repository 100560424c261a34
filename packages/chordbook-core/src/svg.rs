//! # SVG Rendering
//!
//! Draws a [`Fretboard`] or a [`StaffLayout`] as a standalone SVG document.
//! Output is built as strings, one element per line, so identical inputs
//! always produce byte-identical documents.

use crate::fretboard::{Fretboard, FRET_HEIGHT, MARKER_RADIUS, NUT_WIDTH, PADDING_LEFT, PADDING_TOP};
use crate::staff::{Barline, Glyph, StaffLayout, StaffMeasure};

const INK: &str = "#374151";
const LIGHT_INK: &str = "#9ca3af";
const MARKER_FILL: &str = "#2563eb";
const FONT_FAMILY: &str = "system-ui, sans-serif";

// Staff geometry
const STAFF_MARGIN: f64 = 16.0;
const TIME_SIGNATURE_WIDTH: f64 = 32.0;
const SLOT_WIDTH: f64 = 48.0;
const SLOT_GAP: f64 = 4.0;
const SLOT_HEIGHT: f64 = 48.0;
const MEASURE_PADDING: f64 = 6.0;
const BRACKET_HEIGHT: f64 = 18.0;
const LINE_GAP: f64 = 16.0;
const THIN_WIDTH: f64 = 1.0;
const HEAVY_WIDTH: f64 = 4.0;
const GLYPH_GAP: f64 = 4.0;
const DOT_RADIUS: f64 = 2.5;

struct SvgBuilder {
    elements: Vec<String>,
    width: f64,
    height: f64,
}

impl SvgBuilder {
    fn new(width: f64, height: f64) -> Self {
        Self {
            elements: Vec::new(),
            width,
            height,
        }
    }

    fn build(self) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {:.1} {:.1}" width="{:.1}" height="{:.1}" font-family="{}">"#,
            self.width, self.height, self.width, self.height, FONT_FAMILY
        );
        svg.push('\n');
        for element in &self.elements {
            svg.push_str("  ");
            svg.push_str(element);
            svg.push('\n');
        }
        svg.push_str("</svg>\n");
        svg
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str, width: f64) {
        self.elements.push(format!(
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="{:.1}"/>"#,
            x1, y1, x2, y2, stroke, width
        ));
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str, stroke: &str) {
        self.elements.push(format!(
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" rx="4" fill="{}" stroke="{}" stroke-dasharray="4 2"/>"#,
            x, y, w, h, fill, stroke
        ));
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str) {
        self.elements.push(format!(
            r#"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}"/>"#,
            cx, cy, r, fill
        ));
    }

    fn polyline(&mut self, points: &[(f64, f64)], stroke: &str) {
        let points: Vec<String> = points
            .iter()
            .map(|(x, y)| format!("{:.1},{:.1}", x, y))
            .collect();
        self.elements.push(format!(
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="1.0"/>"#,
            points.join(" "),
            stroke
        ));
    }

    fn text(&mut self, x: f64, y: f64, content: &str, size: f64, weight: &str, anchor: &str) {
        self.elements.push(format!(
            r#"<text x="{:.1}" y="{:.1}" font-size="{:.1}" font-weight="{}" text-anchor="{}" fill="{}">{}</text>"#,
            x,
            y,
            size,
            weight,
            anchor,
            INK,
            escape(content)
        ));
    }
}

fn escape(content: &str) -> String {
    content
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render a fretboard diagram
pub fn fretboard_to_svg(board: &Fretboard) -> String {
    let mut svg = SvgBuilder::new(board.width(), board.height());
    let left = PADDING_LEFT;
    let right = PADDING_LEFT + board.neck_width();
    let bottom = PADDING_TOP + board.neck_height();

    for (string, label) in board.tuning_labels().iter().enumerate() {
        svg.text(board.string_x(string as u8), PADDING_TOP - 18.0, label, 13.0, "600", "middle");
    }

    // Nut at the open position, plain top fret line otherwise
    if board.shows_open_row() {
        svg.line(left, PADDING_TOP, right, PADDING_TOP, INK, NUT_WIDTH);
    } else {
        svg.line(left, PADDING_TOP, right, PADDING_TOP, LIGHT_INK, 2.0);
    }

    for row in 1..=board.fret_count {
        let y = board.fret_y(row);
        svg.line(left, y, right, y, LIGHT_INK, 2.0);
        svg.text(
            left - 24.0,
            y - FRET_HEIGHT / 2.0 + 4.0,
            &board.absolute_fret(row).to_string(),
            12.0,
            "normal",
            "middle",
        );
    }

    for string in 0..board.string_count {
        let x = board.string_x(string);
        svg.line(x, PADDING_TOP, x, bottom, INK, 1.5);
    }

    for cell in board.placed_markers() {
        svg.circle(cell.x, cell.y, MARKER_RADIUS, MARKER_FILL);
    }

    svg.build()
}

fn measure_width(measure: &StaffMeasure) -> f64 {
    let slots = measure.slots.len().max(1) as f64;
    MEASURE_PADDING * 2.0 + slots * SLOT_WIDTH + (slots - 1.0) * SLOT_GAP
}

/// Horizontal space a barline's glyphs take up
fn barline_width(barline: Barline) -> f64 {
    let glyphs = barline.glyphs();
    let widths: f64 = glyphs
        .iter()
        .map(|glyph| match glyph {
            Glyph::Dots => DOT_RADIUS * 2.0,
            Glyph::Thin => THIN_WIDTH,
            Glyph::Heavy => HEAVY_WIDTH,
        })
        .sum();
    widths + GLYPH_GAP * (glyphs.len() as f64 - 1.0)
}

fn draw_barline(svg: &mut SvgBuilder, barline: Barline, x: f64, top: f64, bottom: f64) {
    let mid = (top + bottom) / 2.0;
    let mut cursor = x;
    for glyph in barline.glyphs() {
        match glyph {
            Glyph::Dots => {
                svg.circle(cursor + DOT_RADIUS, mid - 8.0, DOT_RADIUS, INK);
                svg.circle(cursor + DOT_RADIUS, mid + 8.0, DOT_RADIUS, INK);
                cursor += DOT_RADIUS * 2.0;
            }
            Glyph::Thin => {
                svg.line(cursor + THIN_WIDTH / 2.0, top, cursor + THIN_WIDTH / 2.0, bottom, INK, THIN_WIDTH);
                cursor += THIN_WIDTH;
            }
            Glyph::Heavy => {
                svg.line(cursor + HEAVY_WIDTH / 2.0, top, cursor + HEAVY_WIDTH / 2.0, bottom, INK, HEAVY_WIDTH);
                cursor += HEAVY_WIDTH;
            }
        }
        cursor += GLYPH_GAP;
    }
}

fn line_width(layout: &StaffLayout, index: usize) -> f64 {
    let line = &layout.lines[index];
    let mut width = barline_width(line.opening);
    if line.time_signature.is_some() {
        width += TIME_SIGNATURE_WIDTH;
    }
    for measure in &line.measures {
        width += GLYPH_GAP + measure_width(measure) + GLYPH_GAP + barline_width(measure.closing);
    }
    width
}

/// Render a laid-out staff
pub fn staff_to_svg(layout: &StaffLayout) -> String {
    let line_height = BRACKET_HEIGHT + SLOT_HEIGHT + MEASURE_PADDING * 2.0;
    let widest = (0..layout.lines.len())
        .map(|i| line_width(layout, i))
        .fold(0.0, f64::max);
    let width = STAFF_MARGIN * 2.0 + widest;
    let height = STAFF_MARGIN * 2.0
        + layout.lines.len() as f64 * line_height
        + layout.lines.len().saturating_sub(1) as f64 * LINE_GAP;

    let mut svg = SvgBuilder::new(width, height);

    for (index, line) in layout.lines.iter().enumerate() {
        let line_top = STAFF_MARGIN + index as f64 * (line_height + LINE_GAP);
        let top = line_top + BRACKET_HEIGHT;
        let bottom = top + SLOT_HEIGHT + MEASURE_PADDING * 2.0;
        let mut x = STAFF_MARGIN;

        if let Some(time_signature) = line.time_signature {
            let center = x + TIME_SIGNATURE_WIDTH / 2.0 - GLYPH_GAP;
            let mid = (top + bottom) / 2.0;
            svg.text(center, mid - 4.0, &time_signature.numerator.to_string(), 18.0, "bold", "middle");
            svg.text(center, mid + 16.0, &time_signature.denominator.to_string(), 18.0, "bold", "middle");
            x += TIME_SIGNATURE_WIDTH;
        }

        draw_barline(&mut svg, line.opening, x, top, bottom);
        x += barline_width(line.opening) + GLYPH_GAP;

        for measure in &line.measures {
            let measure_left = x;
            let measure_right = x + measure_width(measure);

            if let Some(ending) = &measure.ending {
                let bracket_y = line_top + 4.0;
                svg.polyline(
                    &[
                        (measure_left, top - 2.0),
                        (measure_left, bracket_y),
                        (measure_right, bracket_y),
                    ],
                    INK,
                );
                svg.text(measure_left + 4.0, bracket_y + 11.0, ending, 11.0, "600", "start");
            }

            let mut slot_x = measure_left + MEASURE_PADDING;
            let slot_y = top + MEASURE_PADDING;
            for slot in &measure.slots {
                svg.rect(slot_x, slot_y, SLOT_WIDTH, SLOT_HEIGHT, "#ffffff", "#d1d5db");
                let center = slot_x + SLOT_WIDTH / 2.0;
                match slot.content.label() {
                    Some(label) => svg.text(center, slot_y + SLOT_HEIGHT / 2.0 + 4.0, label, 12.0, "600", "middle"),
                    None => svg.text(center, slot_y + SLOT_HEIGHT / 2.0 + 4.0, "-", 12.0, "normal", "middle"),
                }
                slot_x += SLOT_WIDTH + SLOT_GAP;
            }

            x = measure_right + GLYPH_GAP;
            draw_barline(&mut svg, measure.closing, x, top, bottom);
            x += barline_width(measure.closing) + GLYPH_GAP;
        }
    }

    svg.build()
}
