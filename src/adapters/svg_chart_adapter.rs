//! Standalone SVG chart adapter.
//!
//! Each chart is written to `<output_dir>/<chart.name>.svg`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::domain::error::CryptofolioError;
use crate::ports::chart_port::{BarChart, ChartPort, LineChart};

const LINE_WIDTH: f64 = 900.0;
const BAR_WIDTH: f64 = 640.0;
const HEIGHT: f64 = 420.0;
const PADDING: f64 = 60.0;
const LEGEND_WIDTH: f64 = 190.0;
const Y_TICKS: usize = 5;
const X_TICKS: usize = 6;
const PALETTE: [&str; 6] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b",
];

pub struct SvgChartAdapter {
    output_dir: PathBuf,
}

impl SvgChartAdapter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn chart_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.svg", name))
    }

    fn write(&self, name: &str, svg: &str) -> Result<(), CryptofolioError> {
        let path = self.chart_path(name);
        write_file(&path, svg)?;
        info!(path = %path.display(), "wrote chart");
        Ok(())
    }
}

fn write_file(path: &Path, svg: &str) -> Result<(), CryptofolioError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, svg).map_err(|e| CryptofolioError::Chart {
        reason: format!("failed to write {}: {}", path.display(), e),
    })
}

impl ChartPort for SvgChartAdapter {
    fn render_line_chart(&self, chart: &LineChart) -> Result<(), CryptofolioError> {
        let svg = line_chart_svg(chart)?;
        self.write(&chart.name, &svg)
    }

    fn render_bar_chart(&self, chart: &BarChart) -> Result<(), CryptofolioError> {
        let svg = bar_chart_svg(chart)?;
        self.write(&chart.name, &svg)
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn svg_header(width: f64, height: f64) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><style>text{{font-family:Arial,sans-serif;font-size:11px;fill:#333}}</style><rect width="{w}" height="{h}" fill="#ffffff" />"##,
        w = width,
        h = height
    )
}

fn svg_footer() -> &'static str {
    "</svg>\n"
}

fn title(svg: &mut String, width: f64, text: &str) {
    svg.push_str(&format!(
        r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" style="font-size:16px;font-weight:bold">{t}</text>"#,
        x = width / 2.0,
        y = PADDING / 2.0,
        t = escape(text)
    ));
}

fn axis_labels(svg: &mut String, plot_left: f64, plot_right: f64, x_label: &str, y_label: &str) {
    if !x_label.is_empty() {
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" style="font-size:12px">{t}</text>"#,
            x = (plot_left + plot_right) / 2.0,
            y = HEIGHT - 12.0,
            t = escape(x_label)
        ));
    }
    let cy = HEIGHT / 2.0;
    svg.push_str(&format!(
        r#"<text x="16" y="{cy:.2}" text-anchor="middle" transform="rotate(-90 16 {cy:.2})" style="font-size:12px">{t}</text>"#,
        cy = cy,
        t = escape(y_label)
    ));
}

/// Value range over the finite inputs, widened when flat or empty.
fn extent(values: impl Iterator<Item = f64>, include_zero: bool) -> (f64, f64) {
    let (mut min, mut max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if include_zero {
        min = min.min(0.0);
        max = max.max(0.0);
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if min == max {
        return (min - 0.5, max + 0.5);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

fn scale_y(value: f64, (min, max): (f64, f64)) -> f64 {
    let top = PADDING;
    let bottom = HEIGHT - PADDING;
    bottom - (value - min) / (max - min) * (bottom - top)
}

fn y_grid(svg: &mut String, range: (f64, f64), plot_left: f64, plot_right: f64) {
    let (min, max) = range;
    for i in 0..=Y_TICKS {
        let value = min + (max - min) * i as f64 / Y_TICKS as f64;
        let y = scale_y(value, range);
        svg.push_str(&format!(
            r##"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="#dddddd" stroke-width="0.5" />"##,
            x1 = plot_left,
            x2 = plot_right,
            y = y
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="end">{v:.2}</text>"#,
            x = plot_left - 6.0,
            y = y + 4.0,
            v = value
        ));
    }
}

fn x_positions(len: usize, left: f64, right: f64) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![(left + right) / 2.0],
        _ => (0..len)
            .map(|i| left + (right - left) * i as f64 / (len - 1) as f64)
            .collect(),
    }
}

fn date_axis(svg: &mut String, dates: &[NaiveDate], xs: &[f64]) {
    let axis_y = HEIGHT - PADDING;
    let step = (dates.len() / X_TICKS).max(1);
    for (idx, (date, x)) in dates.iter().zip(xs).enumerate() {
        if idx % step != 0 {
            continue;
        }
        svg.push_str(&format!(
            r##"<line x1="{x:.2}" y1="{y1:.2}" x2="{x:.2}" y2="{y2:.2}" stroke="#eeeeee" stroke-width="0.5" />"##,
            x = x,
            y1 = PADDING,
            y2 = axis_y
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">{label}</text>"#,
            x = x,
            y = axis_y + 16.0,
            label = date.format("%Y-%m")
        ));
    }
}

fn polyline(points: &[(f64, f64)], stroke: &str) -> String {
    let coords = points
        .iter()
        .map(|(x, y)| format!("{:.2},{:.2}", x, y))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        r#"<polyline fill="none" stroke="{stroke}" stroke-width="1.5" points="{coords}" />"#,
        stroke = stroke,
        coords = coords
    )
}

fn legend(svg: &mut String, names: &[&str], left: f64) {
    for (i, name) in names.iter().enumerate() {
        let y = PADDING + 10.0 + i as f64 * 18.0;
        let color = PALETTE[i % PALETTE.len()];
        svg.push_str(&format!(
            r#"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="{color}" stroke-width="2" />"#,
            x1 = left,
            x2 = left + 20.0,
            y = y,
            color = color
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{ty:.2}">{name}</text>"#,
            x = left + 26.0,
            ty = y + 4.0,
            name = escape(name)
        ));
    }
}

/// Render a multi-series line chart over a shared date axis.
///
/// Non-finite values break a line into separate segments.
pub fn line_chart_svg(chart: &LineChart) -> Result<String, CryptofolioError> {
    if chart.dates.is_empty() {
        return Err(CryptofolioError::Chart {
            reason: format!("'{}' has no dates to plot", chart.title),
        });
    }
    if let Some(bad) = chart
        .series
        .iter()
        .find(|s| s.values.len() != chart.dates.len())
    {
        return Err(CryptofolioError::Chart {
            reason: format!(
                "series '{}' has {} values for {} dates",
                bad.name,
                bad.values.len(),
                chart.dates.len()
            ),
        });
    }

    let plot_left = PADDING;
    let plot_right = LINE_WIDTH - LEGEND_WIDTH;
    let range = extent(
        chart.series.iter().flat_map(|s| s.values.iter().copied()),
        false,
    );
    let xs = x_positions(chart.dates.len(), plot_left, plot_right);

    let mut svg = svg_header(LINE_WIDTH, HEIGHT);
    title(&mut svg, LINE_WIDTH, &chart.title);
    y_grid(&mut svg, range, plot_left, plot_right);
    date_axis(&mut svg, &chart.dates, &xs);

    for (i, series) in chart.series.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let mut segment = Vec::new();
        for (x, v) in xs.iter().zip(&series.values) {
            if v.is_finite() {
                segment.push((*x, scale_y(*v, range)));
            } else if !segment.is_empty() {
                svg.push_str(&polyline(&segment, color));
                segment.clear();
            }
        }
        if !segment.is_empty() {
            svg.push_str(&polyline(&segment, color));
        }
    }

    let names: Vec<&str> = chart.series.iter().map(|s| s.name.as_str()).collect();
    legend(&mut svg, &names, plot_right + 16.0);
    axis_labels(&mut svg, plot_left, plot_right, &chart.x_label, &chart.y_label);
    svg.push_str(svg_footer());
    Ok(svg)
}

/// Render one bar per label, measured from a zero baseline.
///
/// A non-finite value gets an empty slot labelled `n/a`.
pub fn bar_chart_svg(chart: &BarChart) -> Result<String, CryptofolioError> {
    if chart.bars.is_empty() {
        return Err(CryptofolioError::Chart {
            reason: format!("'{}' has no bars to plot", chart.title),
        });
    }

    let plot_left = PADDING + 10.0;
    let plot_right = BAR_WIDTH - PADDING / 2.0;
    let range = extent(chart.bars.iter().map(|b| b.value), true);
    let zero = scale_y(0.0, range);
    let slot = (plot_right - plot_left) / chart.bars.len() as f64;
    let bar_width = slot * 0.6;

    let mut svg = svg_header(BAR_WIDTH, HEIGHT);
    title(&mut svg, BAR_WIDTH, &chart.title);
    y_grid(&mut svg, range, plot_left, plot_right);

    for (i, bar) in chart.bars.iter().enumerate() {
        let center = plot_left + slot * (i as f64 + 0.5);
        if bar.value.is_finite() {
            let y = scale_y(bar.value, range);
            let (top, bottom) = if y < zero { (y, zero) } else { (zero, y) };
            svg.push_str(&format!(
                r##"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{color}" stroke="#555555" stroke-width="0.5" />"##,
                x = center - bar_width / 2.0,
                y = top,
                w = bar_width,
                h = bottom - top,
                color = escape(&chart.color)
            ));
            let label_y = if bar.value >= 0.0 { top - 4.0 } else { bottom + 12.0 };
            svg.push_str(&format!(
                r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">{v:.2}</text>"#,
                x = center,
                y = label_y,
                v = bar.value
            ));
        } else {
            svg.push_str(&format!(
                r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">n/a</text>"#,
                x = center,
                y = zero - 4.0
            ));
        }
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">{label}</text>"#,
            x = center,
            y = HEIGHT - PADDING + 16.0,
            label = escape(&bar.label)
        ));
    }

    svg.push_str(&format!(
        r##"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="#000000" stroke-width="1" />"##,
        x1 = plot_left,
        x2 = plot_right,
        y = zero
    ));
    axis_labels(&mut svg, plot_left, plot_right, "", &chart.y_label);
    svg.push_str(svg_footer());
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::chart_port::{Bar, LineSeries};
    use tempfile::TempDir;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_line_chart() -> LineChart {
        LineChart {
            name: "portfolio_performance".into(),
            title: "Portfolio Performance Over Time".into(),
            x_label: "Date".into(),
            y_label: "Cumulative Growth".into(),
            dates: vec![d("2024-01-01"), d("2024-01-02"), d("2024-01-03")],
            series: vec![
                LineSeries {
                    name: "100% BTC".into(),
                    values: vec![1.0, 1.1, 1.05],
                },
                LineSeries {
                    name: "50% BTC + 50% ETH".into(),
                    values: vec![1.0, 0.9, 0.95],
                },
            ],
        }
    }

    fn sample_bar_chart(values: &[f64]) -> BarChart {
        BarChart {
            name: "sharpe_ratio".into(),
            title: "Sharpe Ratio by Portfolio".into(),
            y_label: "Sharpe Ratio".into(),
            color: "skyblue".into(),
            bars: values
                .iter()
                .enumerate()
                .map(|(i, v)| Bar {
                    label: format!("P{}", i),
                    value: *v,
                })
                .collect(),
        }
    }

    #[test]
    fn line_chart_has_title_labels_and_one_polyline_per_series() {
        let svg = line_chart_svg(&sample_line_chart()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("Portfolio Performance Over Time"));
        assert!(svg.contains("Cumulative Growth"));
        assert!(svg.contains(">Date<"));
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains("50% BTC + 50% ETH"));
        assert!(svg.contains("2024-01"));
    }

    #[test]
    fn line_chart_splits_on_non_finite() {
        let mut chart = sample_line_chart();
        chart.series.truncate(1);
        chart.series[0].values = vec![1.0, f64::NAN, 1.2];
        let svg = line_chart_svg(&chart).unwrap();
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(!svg.contains("NaN"));
    }

    #[test]
    fn line_chart_rejects_misaligned_series() {
        let mut chart = sample_line_chart();
        chart.series[1].values.pop();
        let err = line_chart_svg(&chart).unwrap_err();
        assert!(matches!(err, CryptofolioError::Chart { .. }));
    }

    #[test]
    fn line_chart_rejects_empty_dates() {
        let mut chart = sample_line_chart();
        chart.dates.clear();
        chart.series.clear();
        assert!(line_chart_svg(&chart).is_err());
    }

    #[test]
    fn bar_chart_draws_positive_and_negative_bars() {
        let svg = bar_chart_svg(&sample_bar_chart(&[1.25, -0.4])).unwrap();
        assert_eq!(svg.matches("<rect").count(), 3);
        assert!(svg.contains(r#"fill="skyblue""#));
        assert!(svg.contains(">1.25<"));
        assert!(svg.contains(">-0.40<"));
        assert!(svg.contains("Sharpe Ratio by Portfolio"));
    }

    #[test]
    fn bar_chart_marks_non_finite_values() {
        let svg = bar_chart_svg(&sample_bar_chart(&[f64::INFINITY, 0.5])).unwrap();
        assert!(svg.contains(">n/a<"));
        assert_eq!(svg.matches("<rect").count(), 2);
        assert!(!svg.contains("inf"));
    }

    #[test]
    fn labels_are_escaped() {
        let mut chart = sample_bar_chart(&[0.1]);
        chart.bars[0].label = "A & <B>".into();
        let svg = bar_chart_svg(&chart).unwrap();
        assert!(svg.contains("A &amp; &lt;B&gt;"));
    }

    #[test]
    fn adapter_writes_named_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("charts");
        let adapter = SvgChartAdapter::new(out.clone());

        adapter.render_line_chart(&sample_line_chart()).unwrap();
        adapter.render_bar_chart(&sample_bar_chart(&[0.3])).unwrap();

        let growth = fs::read_to_string(out.join("portfolio_performance.svg")).unwrap();
        assert!(growth.contains("<polyline"));
        assert!(out.join("sharpe_ratio.svg").exists());
        assert_eq!(adapter.chart_path("max_drawdown"), out.join("max_drawdown.svg"));
    }
}
