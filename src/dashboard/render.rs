//! Page layout for the terminal
//!
//! Rendering builds a [`Page`] of plain values so it can be checked without a
//! terminal; [`write_page`] turns it into text, drawing line charts with
//! `textplots`.

use super::candles::render_candles;
use super::{DashboardReport, DecompositionSection, HistoryReport, HistorySection, PipelineError};
use crate::market::PriceSeries;
use crate::news::NewsArticle;
use std::io::{self, Write};
use textplots::{Chart, Plot, Shape};

/// Narrowest chart canvas, in columns
pub const MIN_CHART_WIDTH: u32 = 32;

/// Shortest chart canvas, in rows
pub const MIN_CHART_HEIGHT: u32 = 5;

/// A rendered dashboard
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub sections: Vec<Section>,
}

/// A titled group of blocks
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text(String),
    /// Label/value rows
    Table(Vec<(String, String)>),
    Chart(LineChart),
    /// Pre-drawn text art
    Art(String),
    Warning(String),
    Error(String),
}

/// One or more named lines over a shared x axis
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub lines: Vec<(String, Vec<(f32, f32)>)>,
    pub x_max: f32,
    pub width: u32,
    pub height: u32,
}

impl Section {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    fn push(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    fn text(self, text: impl Into<String>) -> Self {
        self.push(Block::Text(text.into()))
    }

    /// Text content of every block, for lookups
    pub fn texts(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Text(s) | Block::Warning(s) | Block::Error(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Page {
    /// First section whose title starts with `prefix`
    pub fn section(&self, prefix: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title.starts_with(prefix))
    }
}

const UNKNOWN: &str = "Unknown";
const MISSING: &str = "n/a";
const NOT_ENOUGH_DATA: &str = "Not enough data to plot.";

/// Format to 2 decimals, `n/a` when not a number
fn fixed2(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}")
    } else {
        MISSING.to_string()
    }
}

/// Lay out the report for a `width` × `height` chart area
pub fn render_page(report: &DashboardReport, width: u32, height: u32) -> Page {
    let mut sections = vec![overview(report)];
    let ticker = report.ticker.as_str();

    match &report.history {
        HistorySection::Empty => {
            sections.push(Section::new("Price chart").text("No data to display."));
        }
        HistorySection::Ready(history) => {
            sections.extend(history_sections(ticker, history, width, height));
        }
    }

    Page { sections }
}

/// Single-line page for a failed run, with an untitled section
pub fn render_error(error: &PipelineError) -> Page {
    Page {
        sections: vec![Section::new("").push(Block::Error(format!("Error: {error}")))],
    }
}

fn overview(report: &DashboardReport) -> Section {
    let info = &report.info;
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| UNKNOWN.to_string());

    let market_cap = match info.market_cap_billions() {
        Some(cap) => format!("Market cap: {cap:.2} bn USD"),
        None => format!("Market cap: {UNKNOWN}"),
    };
    let price = match report.current_price {
        Some(price) => format!("Current price: ${price:.2}"),
        None => format!("Current price: {UNKNOWN}"),
    };

    Section::new(format!("Overview: {}", report.ticker))
        .text(format!("Name: {}", field(&info.long_name)))
        .text(format!("Sector: {}", field(&info.sector)))
        .text(format!("Exchange: {}", field(&info.exchange)))
        .text(market_cap)
        .text(price)
}

fn history_sections(ticker: &str, history: &HistoryReport, width: u32, height: u32) -> Vec<Section> {
    let series = &history.series;
    let closes = series.closes();
    let span = date_span(series);
    let chart = |title: String, lines: Vec<(String, Vec<(f32, f32)>)>| LineChart {
        title,
        lines,
        x_max: (series.len().saturating_sub(1)).max(1) as f32,
        width,
        height,
    };

    let price = Section::new("Price chart").push(Block::Chart(chart(
        format!("Close price for {ticker}{span}"),
        vec![("Close".to_string(), points(closes.iter().map(|c| Some(*c))))],
    )));

    let m = &history.metrics;
    let metrics = Section::new("Key metrics").push(Block::Table(vec![
        ("Mean close".into(), fixed2(m.mean_close)),
        ("Median close".into(), fixed2(m.median_close)),
        ("Max close".into(), fixed2(m.max_close)),
        ("Min close".into(), fixed2(m.min_close)),
        (
            "Change, start to end (%)".into(),
            m.percent_change.map(fixed2).unwrap_or_else(|| MISSING.to_string()),
        ),
        ("Mean daily change (%)".into(), fixed2(m.mean_daily_change_pct)),
        ("Mean volume".into(), fixed2(m.mean_volume)),
        ("Max volume".into(), fixed2(m.max_volume)),
        ("Min volume".into(), fixed2(m.min_volume)),
    ]));

    let volatility = Section::new("Volatility")
        .text(format!("Volatility: {}", percent(history.volatility)));

    let art = render_candles(series.bars(), width as usize, height as usize);
    let candles = Section::new("Candlesticks")
        .text(format!("Candlesticks for {ticker}{span}"))
        .push(if art.is_empty() {
            Block::Text(NOT_ENOUGH_DATA.to_string())
        } else {
            Block::Art(art)
        });

    let bands = &history.bollinger;
    let bollinger = Section::new("Bollinger bands").push(Block::Chart(chart(
        format!("Bollinger bands for {ticker}"),
        vec![
            ("Close".to_string(), points(closes.iter().map(|c| Some(*c)))),
            ("Upper band".to_string(), points(bands.upper.iter().copied())),
            ("Lower band".to_string(), points(bands.lower.iter().copied())),
        ],
    )));

    let news = news_section(ticker, &history.news);

    let mut decomposition = Section::new("Time series decomposition")
        .text("Decomposition uses closing prices.");
    match &history.decomposition {
        DecompositionSection::Ready(d) => {
            let observed = d.observed.iter().map(|v| Some(*v));
            let seasonal = d.seasonal.iter().map(|v| Some(*v));
            let x_max = (d.len().saturating_sub(1)).max(1) as f32;
            for (name, line) in [
                ("Observed", points(observed)),
                ("Trend", points(d.trend.iter().copied())),
                ("Seasonal", points(seasonal)),
                ("Residual", points(d.residual.iter().copied())),
            ] {
                decomposition = decomposition.push(Block::Chart(LineChart {
                    title: name.to_string(),
                    lines: vec![(name.to_string(), line)],
                    x_max,
                    width,
                    height,
                }));
            }
        }
        DecompositionSection::Insufficient { available, required } => {
            decomposition = decomposition.push(Block::Warning(format!(
                "At least {required} data points are needed for a time series decomposition \
                 (have {available}). Try a longer period."
            )));
        }
        DecompositionSection::Failed { message } => {
            decomposition =
                decomposition.push(Block::Warning(format!("Decomposition failed: {message}")));
        }
    }

    vec![price, metrics, volatility, candles, bollinger, news, decomposition]
}

fn news_section(ticker: &str, articles: &[NewsArticle]) -> Section {
    let mut section = Section::new("Financial news").text(format!("Latest news for {ticker}:"));
    if articles.is_empty() {
        return section.text("No news available.");
    }
    for article in articles {
        let published = article
            .published_at
            .map(|ts| ts.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| UNKNOWN.to_string());
        section = section
            .text(format!("{} <{}>", article.title, article.url))
            .text(format!("{} | Published: {}", article.source, published))
            .text(format!(
                "Description: {}",
                article.description.as_deref().unwrap_or(UNKNOWN)
            ));
    }
    section
}

fn percent(fraction: f64) -> String {
    if fraction.is_finite() {
        format!("{:.2}%", fraction * 100.0)
    } else {
        MISSING.to_string()
    }
}

fn date_span(series: &PriceSeries) -> String {
    match (series.bars().first(), series.bars().last()) {
        (Some(first), Some(last)) => format!(
            " ({} to {})",
            first.timestamp.format("%Y-%m-%d"),
            last.timestamp.format("%Y-%m-%d")
        ),
        _ => String::new(),
    }
}

/// Index-based points, skipping gaps
fn points(values: impl Iterator<Item = Option<f64>>) -> Vec<(f32, f32)> {
    values
        .enumerate()
        .filter_map(|(i, v)| v.filter(|v| v.is_finite()).map(|v| (i as f32, v as f32)))
        .collect()
}

/// Write the page to stdout
pub fn print_page(page: &Page) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_page(&mut out, page)?;
    out.flush()
}

/// Write the page as terminal text
pub fn write_page<W: Write>(out: &mut W, page: &Page) -> io::Result<()> {
    for section in &page.sections {
        if !section.title.is_empty() {
            writeln!(out, "== {} ==", section.title)?;
        }
        for block in &section.blocks {
            match block {
                Block::Text(text) => writeln!(out, "{text}")?,
                Block::Table(rows) => write_table(out, rows)?,
                Block::Chart(chart) => write_chart(out, chart)?,
                Block::Art(art) => write!(out, "{art}")?,
                Block::Warning(text) => writeln!(out, "Warning: {text}")?,
                Block::Error(text) => writeln!(out, "{text}")?,
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_table<W: Write>(out: &mut W, rows: &[(String, String)]) -> io::Result<()> {
    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);
    for (label, value) in rows {
        writeln!(out, "  {label:<label_width$}  {value:>value_width$}")?;
    }
    Ok(())
}

fn write_chart<W: Write>(out: &mut W, chart: &LineChart) -> io::Result<()> {
    writeln!(out, "{}", chart.title)?;
    if chart.lines.iter().all(|(_, pts)| pts.is_empty()) {
        return writeln!(out, "{NOT_ENOUGH_DATA}");
    }

    let shapes: Vec<Shape> = chart
        .lines
        .iter()
        .filter(|(_, pts)| !pts.is_empty())
        .map(|(_, pts)| Shape::Lines(pts.as_slice()))
        .collect();
    // textplots panics below its minimum canvas size
    let mut canvas = Chart::new(
        chart.width.max(MIN_CHART_WIDTH),
        chart.height.max(MIN_CHART_HEIGHT),
        0.0,
        chart.x_max,
    );
    let mut plot = &mut canvas;
    for shape in &shapes {
        plot = plot.lineplot(shape);
    }
    plot.axis();
    plot.figures();
    writeln!(out, "{plot}")?;

    if chart.lines.len() > 1 {
        let names: Vec<&str> = chart.lines.iter().map(|(name, _)| name.as_str()).collect();
        writeln!(out, "  lines: {}", names.join(", "))?;
    }
    Ok(())
}
