use super::color::{self, cell_color};
use super::{Renderer, bar_title, heatmap_title};
use crate::config::{ImageFormat, PidFilter};
use crate::error::Result;
use crate::pages::{GRID_COLS, GridProjection, HotPage};

/// SVG user units per inch
const PT_PER_INCH: f64 = 72.0;

const HEATMAP_INCHES: (f64, f64) = (8.0, 8.0);
const BAR_MIN_WIDTH_INCHES: f64 = 10.0;
const BAR_WIDTH_PER_PAGE_INCHES: f64 = 0.4;
const BAR_HEIGHT_INCHES: f64 = 8.0;

const BAR_COLOR: &str = "#1f77b4";
const TEXT_COLOR: &str = "#222222";
const AXIS_COLOR: &str = "#444444";

/// Hand-written SVG backend. Physical size is `inches × dpi` pixels.
pub struct SvgRenderer {
    dpi: u32,
}

impl SvgRenderer {
    pub fn new(dpi: u32) -> Self {
        Self { dpi }
    }

    fn open(&self, width_in: f64, height_in: f64) -> String {
        let (w, h) = (width_in * PT_PER_INCH, height_in * PT_PER_INCH);
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {:.0} {:.0}" font-family="DejaVu Sans, Arial, sans-serif">
<rect width="100%" height="100%" fill="white"/>
"#,
            (width_in * self.dpi as f64).round() as u64,
            (height_in * self.dpi as f64).round() as u64,
            w,
            h
        )
    }
}

impl Renderer for SvgRenderer {
    fn format(&self) -> ImageFormat {
        ImageFormat::Svg
    }

    fn heatmap(&self, grid: &GridProjection, pids: Option<&PidFilter>) -> Result<Vec<u8>> {
        let (width_in, height_in) = HEATMAP_INCHES;
        let width = width_in * PT_PER_INCH;
        let mut svg = self.open(width_in, height_in);
        svg.push_str(&title(&heatmap_title(pids), width / 2.0));

        let (gx, gy, side) = (40.0, 70.0, 440.0);
        let cell = side / GRID_COLS as f64;
        let max = grid.max();

        svg.push_str(&format!(
            r#"<rect x="{gx}" y="{gy}" width="{side}" height="{side}" fill="{}" stroke="{AXIS_COLOR}" stroke-width="0.5"/>
<g shape-rendering="crispEdges">
"#,
            color::hex(color::EMPTY_CELL)
        ));
        for (r, row) in grid.rows().enumerate() {
            for (c, &count) in row.iter().enumerate() {
                if count == 0 {
                    continue;
                }
                svg.push_str(&format!(
                    r#"<rect x="{:.3}" y="{:.3}" width="{:.3}" height="{:.3}" fill="{}"><title>{}</title></rect>
"#,
                    gx + c as f64 * cell,
                    gy + r as f64 * cell,
                    cell,
                    cell,
                    color::hex(cell_color(count, max)),
                    count
                ));
            }
        }
        svg.push_str("</g>\n");

        svg.push_str(&color_bar(gx + side + 24.0, gy + side * 0.1, side * 0.8, max));
        svg.push_str("</svg>\n");
        Ok(svg.into_bytes())
    }

    fn bar_chart(
        &self,
        pages: &[HotPage],
        top_n: usize,
        pids: Option<&PidFilter>,
    ) -> Result<Vec<u8>> {
        let width_in = BAR_MIN_WIDTH_INCHES.max(BAR_WIDTH_PER_PAGE_INCHES * pages.len() as f64);
        let width = width_in * PT_PER_INCH;
        let height = BAR_HEIGHT_INCHES * PT_PER_INCH;
        let mut svg = self.open(width_in, BAR_HEIGHT_INCHES);
        svg.push_str(&title(&bar_title(top_n, pids), width / 2.0));

        let (left, right, top, bottom) = (70.0, 20.0, 70.0, 120.0);
        let plot_w = width - left - right;
        let plot_h = height - top - bottom;
        let base_y = top + plot_h;

        let max = pages.iter().map(|p| p.count).max().unwrap_or(0);
        let ticks = integer_ticks(max);
        let y_max = ticks.last().copied().unwrap_or(1).max(max).max(1) as f64;
        let y_of = |v: f64| base_y - v / y_max * plot_h;

        for &tick in &ticks {
            let y = y_of(tick as f64);
            svg.push_str(&format!(
                r##"<line x1="{left}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" stroke="#000000" stroke-opacity="0.3" stroke-width="0.5"/>
<text x="{:.2}" y="{:.2}" text-anchor="end" font-size="9" fill="{TEXT_COLOR}">{tick}</text>
"##,
                left + plot_w,
                left - 4.0,
                y + 3.0
            ));
        }

        let slot = plot_w / pages.len().max(1) as f64;
        let label_offset = max as f64 * 0.01 / y_max * plot_h;
        for (i, page) in pages.iter().enumerate() {
            let x = left + i as f64 * slot + slot * 0.1;
            let y = y_of(page.count as f64);
            let cx = x + slot * 0.4;
            svg.push_str(&format!(
                r#"<rect x="{x:.2}" y="{y:.2}" width="{:.2}" height="{:.2}" fill="{BAR_COLOR}" fill-opacity="0.8"/>
<text x="{cx:.2}" y="{:.2}" text-anchor="middle" font-size="8" fill="{TEXT_COLOR}">{}</text>
<text x="{cx:.2}" y="{:.2}" text-anchor="end" font-size="9" fill="{TEXT_COLOR}" transform="rotate(-45 {cx:.2} {:.2})">{}</text>
"#,
                slot * 0.8,
                base_y - y,
                y - label_offset - 2.0,
                page.count,
                base_y + 12.0,
                base_y + 12.0,
                page.label()
            ));
        }

        svg.push_str(&format!(
            r#"<line x1="{left}" y1="{top}" x2="{left}" y2="{base_y}" stroke="{AXIS_COLOR}"/>
<line x1="{left}" y1="{base_y}" x2="{:.2}" y2="{base_y}" stroke="{AXIS_COLOR}"/>
<text x="18" y="{:.2}" text-anchor="middle" font-size="11" fill="{TEXT_COLOR}" transform="rotate(-90 18 {:.2})">Access Count</text>
<text x="{:.2}" y="{:.2}" text-anchor="middle" font-size="11" fill="{TEXT_COLOR}">Physical Address (Page)</text>
</svg>
"#,
            left + plot_w,
            top + plot_h / 2.0,
            top + plot_h / 2.0,
            left + plot_w / 2.0,
            height - 12.0
        ));
        Ok(svg.into_bytes())
    }
}

fn title(lines: &[String; 2], center_x: f64) -> String {
    format!(
        r#"<text x="{center_x:.1}" y="26" text-anchor="middle" font-size="12" fill="{TEXT_COLOR}">{}</text>
<text x="{center_x:.1}" y="44" text-anchor="middle" font-size="12" fill="{TEXT_COLOR}">{}</text>
"#,
        escape_xml(&lines[0]),
        escape_xml(&lines[1])
    )
}

/// Vertical legend for the heat map scale
fn color_bar(x: f64, y: f64, height: f64, max: u64) -> String {
    let width = 14.0;
    let mut out = String::from(
        "<defs><linearGradient id=\"scale\" x1=\"0\" y1=\"1\" x2=\"0\" y2=\"0\">\n",
    );
    for step in 0..=8 {
        out.push_str(&format!(
            "<stop offset=\"{:.3}\" stop-color=\"{}\"/>\n",
            step as f64 / 8.0,
            color::hex(cell_color(step, 8))
        ));
    }
    out.push_str("</linearGradient></defs>\n");
    out.push_str(&format!(
        r#"<rect x="{x:.2}" y="{y:.2}" width="{width}" height="{height:.2}" fill="url(#scale)" stroke="{AXIS_COLOR}" stroke-width="0.5"/>
"#
    ));

    let top = max.max(1) as f64;
    for tick in integer_ticks(max).into_iter().filter(|&t| t as f64 <= top) {
        let ty = y + height - tick as f64 / top * height;
        out.push_str(&format!(
            r#"<line x1="{:.2}" y1="{ty:.2}" x2="{:.2}" y2="{ty:.2}" stroke="{AXIS_COLOR}" stroke-width="0.5"/>
<text x="{:.2}" y="{:.2}" font-size="8" fill="{TEXT_COLOR}">{tick}</text>
"#,
            x + width,
            x + width + 3.0,
            x + width + 5.0,
            ty + 3.0
        ));
    }

    let mid = y + height / 2.0;
    let lx = x + width + 38.0;
    out.push_str(&format!(
        r#"<text x="{lx:.2}" y="{mid:.2}" text-anchor="middle" font-size="10" fill="{TEXT_COLOR}" transform="rotate(90 {lx:.2} {mid:.2})">Access Count</text>
"#
    ));
    out
}

/// Evenly spaced integer ticks from 0 covering `max`, at most about six of them
pub(crate) fn integer_ticks(max: u64) -> Vec<u64> {
    if max == 0 {
        return vec![0, 1];
    }
    let raw = (max as f64 / 5.0).max(1.0);
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude)
        .max(1.0) as u64;

    let mut ticks = Vec::new();
    let mut v = 0;
    loop {
        ticks.push(v);
        if v >= max {
            break;
        }
        v += step;
    }
    ticks
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
