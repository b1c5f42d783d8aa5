//! SVG rendering of the PnL time-series chart, one polyline per category.

use crate::domain::market::Category;
use crate::domain::valuation::PnlPoint;
use chrono::NaiveDate;

const WIDTH: f64 = 500.0;
const HEIGHT: f64 = 200.0;
const PADDING: f64 = 40.0;

const SERIES_COLORS: [&str; 3] = ["#1f77b4", "#ff7f0e", "#2ca02c"];
const FALLBACK_COLOR: &str = "#7f7f7f";

fn series_color(index: usize) -> &'static str {
    SERIES_COLORS.get(index).copied().unwrap_or(FALLBACK_COLOR)
}

fn xml_escape(value: &str) -> String {
    value.replace('&', "&amp;").replace('<', "&lt;")
}

/// Render PnL points as an SVG line chart. The x axis is the ordered set of
/// distinct dates; each category becomes its own colored polyline.
pub fn format_pnl_chart(points: &[PnlPoint]) -> String {
    if points.is_empty() {
        return "No PnL data available.".to_string();
    }

    let mut dates: Vec<NaiveDate> = points.iter().map(|p| p.date).collect();
    dates.sort();
    dates.dedup();

    let min_pnl = points.iter().map(|p| p.pnl).fold(f64::INFINITY, f64::min);
    let max_pnl = points
        .iter()
        .map(|p| p.pnl)
        .fold(f64::NEG_INFINITY, f64::max);

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;

    let range = max_pnl - min_pnl;
    let scale_y = if range > 0.0 { plot_height / range } else { 1.0 };
    let scale_x = if dates.len() > 1 {
        plot_width / (dates.len() - 1) as f64
    } else {
        0.0
    };

    // Fixed categories first so colors are stable, then anything else the
    // data happens to contain.
    let mut categories: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
    for point in points {
        if !categories.contains(&point.category.as_str()) {
            categories.push(&point.category);
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
    ));
    out.push('\n');
    out.push_str(&format!(
        r#"  <line x1="{PADDING}" y1="{PADDING}" x2="{PADDING}" y2="{y2}" stroke="black"/>"#,
        y2 = HEIGHT - PADDING
    ));
    out.push('\n');
    out.push_str(&format!(
        r#"  <line x1="{PADDING}" y1="{y}" x2="{x2}" y2="{y}" stroke="black"/>"#,
        y = HEIGHT - PADDING,
        x2 = WIDTH - PADDING
    ));
    out.push('\n');

    for (index, category) in categories.iter().enumerate() {
        let series: Vec<String> = points
            .iter()
            .filter(|p| p.category == *category)
            .map(|p| {
                let date_index = dates.iter().position(|d| d == &p.date).unwrap_or(0);
                let x = PADDING + date_index as f64 * scale_x;
                let y = HEIGHT - PADDING - (p.pnl - min_pnl) * scale_y;
                format!("{:.1},{:.1}", x, y)
            })
            .collect();

        if series.is_empty() {
            continue;
        }

        out.push_str(&format!(
            r#"  <polyline fill="none" stroke="{}" stroke-width="1.5" points="{}"><title>{}</title></polyline>"#,
            series_color(index),
            series.join(" "),
            xml_escape(category)
        ));
        out.push('\n');
    }

    out.push_str("</svg>\n");
    out
}
