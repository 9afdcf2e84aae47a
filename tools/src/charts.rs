//! Inline SVG charts.
//!
//! RULE: Charts are pure functions of already-aggregated data. They never
//! compute rates themselves.

use crate::render::escape;
use fraudscope_core::aggregate::{TemporalMatrix, DAYS_PER_WEEK, HOURS_PER_DAY, WEEKDAY_LABELS};
use std::fmt::Write as _;

pub const PALETTE: [&str; 6] = ["#EB1700", "#334155", "#0EA5E9", "#14B8A6", "#F59E0B", "#6366F1"];

const WIDTH: f64 = 760.0;
const HEIGHT: f64 = 260.0;
const LEFT: f64 = 56.0;
const RIGHT: f64 = 16.0;
const TOP: f64 = 16.0;
const BOTTOM: f64 = 40.0;
const GRID: &str = "#F1F5F9";
const TEXT: &str = "#1F2937";
const MUTE: &str = "#6B7280";

/// One named line.
pub struct Series<'a> {
    pub name: &'a str,
    pub values: Vec<Option<f64>>,
}

/// Y-axis tick formatter.
pub type TickFmt = fn(f64) -> String;

struct Scale {
    lo: f64,
    hi: f64,
}

impl Scale {
    fn fit<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let (mut lo, mut hi) = (0.0f64, 0.0f64);
        for v in values.into_iter().filter(|v| v.is_finite()) {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        if hi - lo <= f64::EPSILON {
            hi = lo + 1.0;
        }
        Self { lo, hi }
    }

    fn y(&self, v: f64) -> f64 {
        let plot = HEIGHT - TOP - BOTTOM;
        TOP + plot * (1.0 - (v - self.lo) / (self.hi - self.lo))
    }
}

fn x_at(i: usize, n: usize) -> f64 {
    let plot = WIDTH - LEFT - RIGHT;
    if n <= 1 {
        LEFT + plot / 2.0
    } else {
        LEFT + plot * i as f64 / (n - 1) as f64
    }
}

fn open_svg(out: &mut String, label: &str) {
    let _ = write!(
        out,
        "<svg class=\"chart\" viewBox=\"0 0 {WIDTH} {HEIGHT}\" role=\"img\" aria-label=\"{}\" \
         xmlns=\"http://www.w3.org/2000/svg\">",
        escape(label)
    );
}

fn y_axis(out: &mut String, scale: &Scale, fmt: TickFmt) {
    for step in 0..=4 {
        let v = scale.lo + (scale.hi - scale.lo) * f64::from(step) / 4.0;
        let y = scale.y(v);
        let _ = write!(
            out,
            "<line x1=\"{LEFT}\" x2=\"{}\" y1=\"{y:.1}\" y2=\"{y:.1}\" stroke=\"{GRID}\"/>\
             <text x=\"{}\" y=\"{:.1}\" font-size=\"10\" text-anchor=\"end\" fill=\"{MUTE}\">{}</text>",
            WIDTH - RIGHT,
            LEFT - 6.0,
            y + 3.0,
            escape(&fmt(v))
        );
    }
}

/// Every `stride`-th x label so long axes stay readable.
fn x_labels(out: &mut String, labels: &[String], max_labels: usize) {
    let n = labels.len();
    let stride = n.div_ceil(max_labels.max(1)).max(1);
    for (i, label) in labels.iter().enumerate().step_by(stride) {
        let _ = write!(
            out,
            "<text x=\"{:.1}\" y=\"{}\" font-size=\"10\" text-anchor=\"middle\" fill=\"{MUTE}\">{}</text>",
            x_at(i, n),
            HEIGHT - BOTTOM + 16.0,
            escape(label)
        );
    }
}

fn empty_chart(label: &str) -> String {
    let mut out = String::new();
    open_svg(&mut out, label);
    let _ = write!(
        out,
        "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" fill=\"{MUTE}\">No data</text></svg>",
        WIDTH / 2.0,
        HEIGHT / 2.0
    );
    out
}

// ── Line ─────────────────────────────────────────────────────────────────────

/// Multi-series line chart over a shared categorical x axis.
/// Missing points break the line.
pub fn line_chart(label: &str, x: &[String], series: &[Series<'_>], fmt: TickFmt) -> String {
    if x.is_empty() || series.iter().all(|s| s.values.iter().all(Option::is_none)) {
        return empty_chart(label);
    }
    let scale = Scale::fit(series.iter().flat_map(|s| s.values.iter().flatten().copied()));
    let mut out = String::new();
    open_svg(&mut out, label);
    y_axis(&mut out, &scale, fmt);
    x_labels(&mut out, x, 8);

    for (idx, s) in series.iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        let mut path = String::new();
        let mut pen_down = false;
        for (i, v) in s.values.iter().enumerate() {
            match v {
                Some(v) => {
                    let cmd = if pen_down { 'L' } else { 'M' };
                    let _ = write!(path, "{cmd}{:.1},{:.1} ", x_at(i, x.len()), scale.y(*v));
                    pen_down = true;
                }
                None => pen_down = false,
            }
        }
        let _ = write!(
            out,
            "<path d=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"2\"><title>{}</title></path>",
            path.trim_end(),
            escape(s.name)
        );
        if s.values.iter().flatten().count() == 1 {
            if let Some((i, v)) = s.values.iter().enumerate().find_map(|(i, v)| v.map(|v| (i, v))) {
                let _ = write!(
                    out,
                    "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"3\" fill=\"{color}\"/>",
                    x_at(i, x.len()),
                    scale.y(v)
                );
            }
        }
        let _ = write!(
            out,
            "<text x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"{color}\">{}</text>",
            LEFT + 120.0 * idx as f64,
            HEIGHT - 6.0,
            escape(s.name)
        );
    }
    out.push_str("</svg>");
    out
}

// ── Bars ─────────────────────────────────────────────────────────────────────

/// Vertical bar chart, one bar per label.
pub fn bar_chart(label: &str, labels: &[String], values: &[f64], fmt: TickFmt) -> String {
    if labels.is_empty() {
        return empty_chart(label);
    }
    let scale = Scale::fit(values.iter().copied());
    let mut out = String::new();
    open_svg(&mut out, label);
    y_axis(&mut out, &scale, fmt);

    let n = labels.len();
    let slot = (WIDTH - LEFT - RIGHT) / n as f64;
    let bar = (slot * 0.7).max(1.0);
    for (i, (name, v)) in labels.iter().zip(values).enumerate() {
        let x = LEFT + slot * i as f64 + (slot - bar) / 2.0;
        let (y0, y1) = (scale.y(0.0), scale.y(*v));
        let _ = write!(
            out,
            "<rect x=\"{x:.1}\" y=\"{:.1}\" width=\"{bar:.1}\" height=\"{:.1}\" fill=\"{}\">\
             <title>{}: {}</title></rect>",
            y0.min(y1),
            (y0 - y1).abs(),
            PALETTE[0],
            escape(name),
            escape(&fmt(*v))
        );
    }
    let stride = n.div_ceil(10).max(1);
    for (i, name) in labels.iter().enumerate().step_by(stride) {
        let _ = write!(
            out,
            "<text x=\"{:.1}\" y=\"{}\" font-size=\"10\" text-anchor=\"middle\" fill=\"{MUTE}\">{}</text>",
            LEFT + slot * (i as f64 + 0.5),
            HEIGHT - BOTTOM + 16.0,
            escape(name)
        );
    }
    out.push_str("</svg>");
    out
}

/// Horizontal bars centred on zero, for signed scores.
pub fn signed_hbar_chart(label: &str, labels: &[String], values: &[f64]) -> String {
    if labels.is_empty() {
        return empty_chart(label);
    }
    let n = labels.len();
    let row = 18.0;
    let height = TOP + BOTTOM + row * n as f64;
    let name_col = 260.0;
    let plot = WIDTH - name_col - RIGHT;
    let max_abs = values
        .iter()
        .map(|v| v.abs())
        .fold(0.0f64, f64::max)
        .max(f64::EPSILON);
    let zero = name_col + plot / 2.0;

    let mut out = String::new();
    let _ = write!(
        out,
        "<svg class=\"chart\" viewBox=\"0 0 {WIDTH} {height}\" role=\"img\" aria-label=\"{}\" \
         xmlns=\"http://www.w3.org/2000/svg\">\
         <line x1=\"{zero}\" x2=\"{zero}\" y1=\"{TOP}\" y2=\"{}\" stroke=\"{GRID}\"/>",
        escape(label),
        height - BOTTOM
    );
    for (i, (name, v)) in labels.iter().zip(values).enumerate() {
        let y = TOP + row * i as f64;
        let w = plot / 2.0 * v.abs() / max_abs;
        let x = if *v >= 0.0 { zero } else { zero - w };
        let color = if *v >= 0.0 { PALETTE[0] } else { PALETTE[1] };
        let _ = write!(
            out,
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"end\" fill=\"{TEXT}\">{}</text>\
             <rect x=\"{x:.1}\" y=\"{:.1}\" width=\"{w:.1}\" height=\"{:.1}\" fill=\"{color}\">\
             <title>{}: {v:+.3}</title></rect>",
            name_col - 8.0,
            y + row * 0.7,
            escape(name),
            y + 2.0,
            row - 4.0,
            escape(name)
        );
    }
    out.push_str("</svg>");
    out
}

// ── Heatmap ──────────────────────────────────────────────────────────────────

/// Day-of-week x hour heatmap. Cell intensity is relative to the hottest cell.
pub fn heatmap(label: &str, matrix: &TemporalMatrix) -> String {
    let cell_w = (WIDTH - LEFT - RIGHT) / HOURS_PER_DAY as f64;
    let cell_h = (HEIGHT - TOP - BOTTOM) / DAYS_PER_WEEK as f64;
    let max = matrix
        .rates
        .iter()
        .flatten()
        .copied()
        .fold(0.0f64, f64::max);

    let mut out = String::new();
    open_svg(&mut out, label);
    for (d, day) in WEEKDAY_LABELS.iter().enumerate() {
        let y = TOP + cell_h * d as f64;
        let _ = write!(
            out,
            "<text x=\"{}\" y=\"{:.1}\" font-size=\"10\" text-anchor=\"end\" fill=\"{MUTE}\">{day}</text>",
            LEFT - 6.0,
            y + cell_h * 0.65
        );
        for h in 0..HOURS_PER_DAY {
            let rate = matrix.rates[d][h];
            let intensity = if max > 0.0 { rate / max } else { 0.0 };
            let _ = write!(
                out,
                "<rect x=\"{:.1}\" y=\"{y:.1}\" width=\"{:.1}\" height=\"{:.1}\" \
                 fill=\"{}\" fill-opacity=\"{:.3}\" stroke=\"#FFFFFF\">\
                 <title>{day} {h:02}:00: {:.2}% ({} deliveries)</title></rect>",
                LEFT + cell_w * h as f64,
                cell_w,
                cell_h,
                PALETTE[0],
                0.05 + 0.95 * intensity,
                rate * 100.0,
                matrix.deliveries[d][h]
            );
        }
    }
    for h in (0..HOURS_PER_DAY).step_by(3) {
        let _ = write!(
            out,
            "<text x=\"{:.1}\" y=\"{}\" font-size=\"10\" text-anchor=\"middle\" fill=\"{MUTE}\">{h}</text>",
            LEFT + cell_w * (h as f64 + 0.5),
            HEIGHT - BOTTOM + 16.0
        );
    }
    out.push_str("</svg>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(v: f64) -> String {
        format!("{v:.1}")
    }

    #[test]
    fn empty_inputs_render_placeholder() {
        assert!(line_chart("x", &[], &[], plain).contains("No data"));
        assert!(bar_chart("x", &[], &[], plain).contains("No data"));
        assert!(signed_hbar_chart("x", &[], &[]).contains("No data"));
    }

    #[test]
    fn missing_points_break_the_line() {
        let x: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let s = Series {
            name: "rate",
            values: vec![Some(1.0), None, Some(2.0)],
        };
        let svg = line_chart("t", &x, &[s], plain);
        let path_start = svg.find("<path d=\"").unwrap();
        let d = &svg[path_start..];
        assert_eq!(d.matches('M').count(), 2, "a gap must start a new segment");
    }

    #[test]
    fn labels_are_escaped() {
        let svg = bar_chart("t", &["<iOS>".to_string()], &[0.5], plain);
        assert!(svg.contains("&lt;iOS&gt;"));
        assert!(!svg.contains("<iOS>"));
    }

    #[test]
    fn heatmap_has_every_cell() {
        let svg = heatmap("h", &TemporalMatrix::default());
        assert_eq!(svg.matches("<rect").count(), DAYS_PER_WEEK * HOURS_PER_DAY);
    }
}
