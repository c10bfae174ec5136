//! Scene layout and SVG generation

use kurbo::{Affine, BezPath, Point, Rect};
use std::fmt::Write;

use crate::annotate::CornerMarker;
use crate::config::RenderStyle;

const AXES_MARGIN_LEFT: f64 = 90.0;
const AXES_MARGIN_RIGHT: f64 = 30.0;
const AXES_MARGIN_TOP: f64 = 70.0;
const AXES_MARGIN_BOTTOM: f64 = 60.0;
const AXIS_FONT_SIZE: f64 = 12.0;
const TITLE_FONT_SIZE: f64 = 18.0;
const TICK_LENGTH: f64 = 6.0;
const TARGET_TICKS: f64 = 5.0;
const MAX_TICKS: f64 = 50.0;

/// Axis decoration, present only when axes are shown
#[derive(Debug, Clone, PartialEq)]
pub struct AxesSpec {
    pub title: String,
}

/// Everything that ends up on the canvas
#[derive(Debug, Clone)]
pub struct TrackScene {
    pub width: u32,
    pub height: u32,
    /// Normalized track samples in source units
    pub track: Vec<Point>,
    pub markers: Vec<CornerMarker>,
    pub axes: Option<AxesSpec>,
}

impl TrackScene {
    /// Area the circuit is fitted into
    fn plot_area(&self, style: &RenderStyle) -> Rect {
        let (w, h) = (self.width as f64, self.height as f64);
        let area = if self.axes.is_some() {
            Rect::new(AXES_MARGIN_LEFT, AXES_MARGIN_TOP, w - AXES_MARGIN_RIGHT, h - AXES_MARGIN_BOTTOM)
        } else {
            let pad = style.padding + style.marker_radius;
            Rect::new(pad, pad, w - pad, h - pad)
        };
        // Tiny canvases degrade to the full frame instead of an inverted rect
        if area.width() <= 1.0 || area.height() <= 1.0 { Rect::new(0.0, 0.0, w, h) } else { area }
    }

    fn data_bounds(&self) -> Option<Rect> {
        let mut points = self.track.iter().chain(self.markers.iter().map(|m| &m.position));
        let first = *points.next()?;
        Some(points.fold(Rect::from_points(first, first), |r, &p| r.union_pt(p)))
    }

    /// Data-to-pixel transform: uniform scale, y flipped, data centered.
    pub fn transform(&self, style: &RenderStyle) -> Affine {
        let area = self.plot_area(style);
        let Some(bounds) = self.data_bounds() else {
            return Affine::IDENTITY;
        };
        let sx = if bounds.width() > 0.0 { area.width() / bounds.width() } else { f64::INFINITY };
        let sy = if bounds.height() > 0.0 { area.height() / bounds.height() } else { f64::INFINITY };
        let scale = match sx.min(sy) {
            s if s.is_finite() => s,
            _ => 1.0,
        };
        let data_center = bounds.center();
        let px_center = area.center();
        Affine::new([
            scale,
            0.0,
            0.0,
            -scale,
            px_center.x - data_center.x * scale,
            px_center.y + data_center.y * scale,
        ])
    }

    /// Render the scene as a standalone SVG document
    pub fn to_svg(&self, style: &RenderStyle) -> String {
        let palette = &style.palette;
        let xf = self.transform(style);
        let mut svg = String::with_capacity(64 * (self.track.len() + self.markers.len()) + 1024);

        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        let _ = write!(
            svg,
            r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
            self.width, self.height, palette.background
        );

        if let Some(axes) = &self.axes {
            self.write_axes(&mut svg, axes, style, xf);
        }

        if let Some(path) = polyline(&self.track) {
            let _ = write!(
                svg,
                r#"<path d="{}" fill="none" stroke="{}" stroke-width="{}" stroke-linejoin="round" stroke-linecap="round"/>"#,
                (xf * path).to_svg(),
                palette.track,
                style.track_width
            );
        }

        for marker in &self.markers {
            let center = xf * marker.position;
            if marker.has_connector() {
                let anchor = xf * marker.anchor;
                let _ = write!(
                    svg,
                    r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="1.5"/>"#,
                    center.x, center.y, anchor.x, anchor.y, palette.connector
                );
            }
            let _ = write!(
                svg,
                r#"<circle cx="{:.2}" cy="{:.2}" r="{}" fill="{ring}" stroke="{ring}" stroke-width="2"/>"#,
                center.x,
                center.y,
                style.marker_radius,
                ring = palette.marker_ring
            );
            write_text(
                &mut svg,
                Point::new(center.x, center.y + style.marker_font_size * 0.35),
                &marker.label,
                style.marker_font_size,
                &palette.marker_text,
                "middle",
                true,
            );
        }

        svg.push_str("</svg>");
        svg
    }

    fn write_axes(&self, svg: &mut String, axes: &AxesSpec, style: &RenderStyle, xf: Affine) {
        let area = self.plot_area(style);
        let color = &style.palette.title;
        let _ = write!(
            svg,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none" stroke="{}" stroke-width="1"/>"#,
            area.x0,
            area.y0,
            area.width(),
            area.height(),
            color
        );

        // Visible data window is the plot area pulled back through the transform
        let inv = xf.inverse();
        let lo = inv * Point::new(area.x0, area.y1);
        let hi = inv * Point::new(area.x1, area.y0);

        for x in ticks(lo.x, hi.x) {
            let px = (xf * Point::new(x, 0.0)).x;
            let _ = write!(
                svg,
                r#"<line x1="{px:.2}" y1="{y0:.2}" x2="{px:.2}" y2="{y1:.2}" stroke="{color}" stroke-width="1"/>"#,
                y0 = area.y1,
                y1 = area.y1 + TICK_LENGTH,
            );
            write_text(
                svg,
                Point::new(px, area.y1 + TICK_LENGTH + AXIS_FONT_SIZE + 2.0),
                &format_tick(x),
                AXIS_FONT_SIZE,
                color,
                "middle",
                false,
            );
        }
        for y in ticks(lo.y, hi.y) {
            let py = (xf * Point::new(0.0, y)).y;
            let _ = write!(
                svg,
                r#"<line x1="{x0:.2}" y1="{py:.2}" x2="{x1:.2}" y2="{py:.2}" stroke="{color}" stroke-width="1"/>"#,
                x0 = area.x0 - TICK_LENGTH,
                x1 = area.x0,
            );
            write_text(
                svg,
                Point::new(area.x0 - TICK_LENGTH - 4.0, py + AXIS_FONT_SIZE * 0.35),
                &format_tick(y),
                AXIS_FONT_SIZE,
                color,
                "end",
                false,
            );
        }

        write_text(
            svg,
            Point::new(area.center().x, area.y0 - 20.0),
            &axes.title,
            TITLE_FONT_SIZE,
            color,
            "middle",
            true,
        );
    }
}

fn polyline(points: &[Point]) -> Option<BezPath> {
    let (first, rest) = points.split_first()?;
    let mut path = BezPath::new();
    path.move_to(*first);
    for &p in rest {
        path.line_to(p);
    }
    Some(path)
}

fn write_text(
    svg: &mut String,
    at: Point,
    text: &str,
    size: f64,
    fill: &str,
    anchor: &str,
    bold: bool,
) {
    let weight = if bold { "bold" } else { "normal" };
    let _ = write!(
        svg,
        r#"<text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="{}" font-weight="{}" fill="{}" text-anchor="{}">{}</text>"#,
        at.x,
        at.y,
        size,
        weight,
        fill,
        anchor,
        escape_xml(text)
    );
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Round tick positions (1, 2 or 5 times a power of ten) inside `[lo, hi]`
fn ticks(lo: f64, hi: f64) -> Vec<f64> {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let span = hi - lo;
    if !span.is_finite() || span <= 0.0 {
        return Vec::new();
    }
    let raw = span / TARGET_TICKS;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);

    let first = (lo / step).ceil();
    let last = (hi / step + 1e-9).floor();
    if !(first.is_finite() && last.is_finite()) || last < first || last - first > MAX_TICKS {
        return Vec::new();
    }
    // Integer steps: `v += step` stalls once `step` drops below one ULP of `v`
    let mut out: Vec<f64> = (0..=(last - first) as u32).map(|k| (first + f64::from(k)) * step).collect();
    out.dedup();
    out
}

fn format_tick(v: f64) -> String {
    if v.abs() < 1e-9 { "0".to_string() } else { format!("{:.0}", v) }
}
