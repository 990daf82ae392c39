//! Chart definitions derived from an analysis report.

use crate::domain::analysis::AnalysisReport;
use crate::domain::error::CryptofolioError;
use crate::ports::chart_port::{Bar, BarChart, ChartPort, LineChart, LineSeries};

pub fn growth_chart(report: &AnalysisReport) -> LineChart {
    LineChart {
        name: "portfolio_performance".into(),
        title: "Portfolio Performance Over Time".into(),
        x_label: "Date".into(),
        y_label: "Cumulative Growth".into(),
        dates: report.returns.dates().to_vec(),
        series: report
            .results
            .iter()
            .map(|r| LineSeries {
                name: r.name.clone(),
                values: r.series.growth(),
            })
            .collect(),
    }
}

pub fn sharpe_chart(report: &AnalysisReport) -> BarChart {
    BarChart {
        name: "sharpe_ratio".into(),
        title: "Sharpe Ratio by Portfolio".into(),
        y_label: "Sharpe Ratio".into(),
        color: "skyblue".into(),
        bars: report
            .results
            .iter()
            .map(|r| Bar {
                label: r.name.clone(),
                value: r.metrics.sharpe_ratio,
            })
            .collect(),
    }
}

pub fn drawdown_chart(report: &AnalysisReport) -> BarChart {
    BarChart {
        name: "max_drawdown".into(),
        title: "Max Drawdown by Portfolio".into(),
        y_label: "Max Drawdown".into(),
        color: "salmon".into(),
        bars: report
            .results
            .iter()
            .map(|r| Bar {
                label: r.name.clone(),
                value: r.metrics.max_drawdown,
            })
            .collect(),
    }
}

/// Render the growth curves, then the Sharpe and drawdown bars.
pub fn render_charts(chart_port: &dyn ChartPort, report: &AnalysisReport) -> Result<(), CryptofolioError> {
    chart_port.render_line_chart(&growth_chart(report))?;
    chart_port.render_bar_chart(&sharpe_chart(report))?;
    chart_port.render_bar_chart(&drawdown_chart(report))?;
    Ok(())
}
