//! Chart generation for the analysis report.
//!
//! Renders the visual half of the analysis as PNG files under
//! `<output-dir>/charts/`: price and kilometer histograms, average-price
//! bars by seat count and by transmission, the fuel-type pie, and the
//! price-versus-kilometers scatter colored by fuel.
//!
//! Chart failures never abort an analysis run. A chart with no data to
//! draw is skipped, and a rendering error (a missing font, an unwritable
//! directory entry) is downgraded to a warning on the result.

mod render;

use crate::config::PipelineConfig;
use crate::error::{AnalysisError, Result};
use crate::types::{CategoryCount, GroupSummary};
use crate::utils::non_null_f64_values;
use plotters::style::RGBColor;
use polars::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Histogram pair for price and kilometers driven.
pub const DISTRIBUTIONS_CHART: &str = "distributions.png";
/// Average price by seat count.
pub const SEATS_CHART: &str = "avg_price_by_seats.png";
/// Fuel-type share pie.
pub const FUEL_CHART: &str = "fuel_share.png";
/// Price versus kilometers scatter, colored by fuel.
pub const SCATTER_CHART: &str = "price_vs_km.png";
/// Average price by transmission type.
pub const TRANSMISSION_CHART: &str = "avg_price_by_transmission.png";

/// Series color palette, control-blue first.
pub(crate) const PALETTE: [RGBColor; 8] = [
    RGBColor(52, 152, 219),  // blue
    RGBColor(231, 76, 60),   // red
    RGBColor(46, 204, 113),  // green
    RGBColor(155, 89, 182),  // purple
    RGBColor(243, 156, 18),  // orange
    RGBColor(26, 188, 156),  // teal
    RGBColor(233, 30, 99),   // pink
    RGBColor(96, 125, 139),  // blue grey
];

pub(crate) fn palette_color(idx: usize) -> RGBColor {
    PALETTE[idx % PALETTE.len()]
}

/// Outcome of a chart pass: files written plus soft failures.
#[derive(Debug, Clone, Default)]
pub struct ChartOutput {
    pub rendered: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

/// Renders the full chart set for one analysis run.
pub struct ChartRenderer {
    charts_dir: PathBuf,
    width: u32,
    height: u32,
    bins: usize,
}

impl ChartRenderer {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            charts_dir: config.output_dir.join("charts"),
            width: config.chart_width,
            height: config.chart_height,
            bins: config.histogram_bins,
        }
    }

    /// Directory the PNG files are written to.
    pub fn charts_dir(&self) -> &Path {
        &self.charts_dir
    }

    /// Render every chart the data supports.
    ///
    /// Only the charts directory creation can fail hard; each individual
    /// chart degrades to a warning instead.
    pub fn render_all(
        &self,
        df: &DataFrame,
        seats: &GroupSummary,
        transmission: &GroupSummary,
        fuel: &[CategoryCount],
    ) -> Result<ChartOutput> {
        fs::create_dir_all(&self.charts_dir)?;
        let mut output = ChartOutput::default();
        let dims = (self.width, self.height);

        // Price and kilometer histograms, side by side.
        let prices = match df.column("price") {
            Ok(col) => non_null_f64_values(col.as_materialized_series())?,
            Err(_) => Vec::new(),
        };
        let kms = match df.column("km") {
            Ok(col) => non_null_f64_values(col.as_materialized_series())?,
            Err(_) => Vec::new(),
        };
        if prices.is_empty() || kms.is_empty() {
            self.skip(&mut output, DISTRIBUTIONS_CHART, "no observed price/km values");
        } else {
            let path = self.charts_dir.join(DISTRIBUTIONS_CHART);
            self.finish(
                &mut output,
                DISTRIBUTIONS_CHART,
                path.clone(),
                render::price_km_histograms(&path, &prices, &kms, self.bins, dims),
            );
        }

        // Average price by seat count.
        if seats.is_empty() {
            self.skip(&mut output, SEATS_CHART, "no seat groups");
        } else {
            let labels: Vec<String> = seats.rows.iter().map(|r| r.key.clone()).collect();
            let values: Vec<f64> = seats.rows.iter().map(|r| r.average_price).collect();
            let path = self.charts_dir.join(SEATS_CHART);
            self.finish(
                &mut output,
                SEATS_CHART,
                path.clone(),
                render::bar_chart(
                    &path,
                    "Average Price by Number of Seats",
                    "Seats",
                    "Average Price",
                    &labels,
                    &values,
                    dims,
                ),
            );
        }

        // Fuel-type share pie.
        if fuel.is_empty() {
            self.skip(&mut output, FUEL_CHART, "no fuel categories");
        } else {
            let labels: Vec<String> = fuel.iter().map(|c| c.value.clone()).collect();
            let sizes: Vec<f64> = fuel.iter().map(|c| c.count as f64).collect();
            let path = self.charts_dir.join(FUEL_CHART);
            self.finish(
                &mut output,
                FUEL_CHART,
                path.clone(),
                render::pie_chart(&path, "Car Distribution by Fuel Type", &labels, &sizes, dims),
            );
        }

        // Price versus kilometers, one series per fuel type.
        let series = scatter_points(df, fuel)?;
        if series.is_empty() {
            self.skip(&mut output, SCATTER_CHART, "no complete price/km/fuel rows");
        } else {
            let path = self.charts_dir.join(SCATTER_CHART);
            self.finish(
                &mut output,
                SCATTER_CHART,
                path.clone(),
                render::scatter_chart(
                    &path,
                    "Price vs Kilometers Driven by Fuel Type",
                    "Kilometers Driven",
                    "Price",
                    &series,
                    dims,
                ),
            );
        }

        // Average price by transmission.
        if transmission.is_empty() {
            self.skip(&mut output, TRANSMISSION_CHART, "no transmission groups");
        } else {
            let labels: Vec<String> = transmission.rows.iter().map(|r| r.key.clone()).collect();
            let values: Vec<f64> = transmission.rows.iter().map(|r| r.average_price).collect();
            let path = self.charts_dir.join(TRANSMISSION_CHART);
            self.finish(
                &mut output,
                TRANSMISSION_CHART,
                path.clone(),
                render::bar_chart(
                    &path,
                    "Average Price by Transmission Type",
                    "Transmission",
                    "Average Price",
                    &labels,
                    &values,
                    dims,
                ),
            );
        }

        info!(
            "Rendered {} charts to {}",
            output.rendered.len(),
            self.charts_dir.display()
        );
        Ok(output)
    }

    fn skip(&self, output: &mut ChartOutput, chart: &str, reason: &str) {
        let message = format!("Skipping chart '{}': {}", chart, reason);
        warn!("{}", message);
        output.warnings.push(message);
    }

    fn finish(
        &self,
        output: &mut ChartOutput,
        chart: &str,
        path: PathBuf,
        result: anyhow::Result<()>,
    ) {
        match result {
            Ok(()) => {
                debug!("Chart written to {}", path.display());
                output.rendered.push(path);
            }
            Err(e) => {
                // Chart failures downgrade to warnings; the error type keeps
                // the wording consistent with the fatal paths.
                let message = AnalysisError::ChartRenderFailed {
                    chart: chart.to_string(),
                    reason: format!("{:#}", e),
                }
                .to_string();
                warn!("{}", message);
                output.warnings.push(message);
            }
        }
    }
}

/// Bucket values into `bins` equal-width intervals as (lower, upper, count).
///
/// The final bin is closed on both ends so the maximum lands inside it. A
/// constant column still produces one unit-wide bin around the value.
pub(crate) fn histogram_bins(values: &[f64], bins: usize) -> Vec<(f64, f64, usize)> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return vec![(min - 0.5, max + 0.5, values.len())];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lower = min + i as f64 * width;
            (lower, lower + width, count)
        })
        .collect()
}

/// Pad a value range by 5% on both sides for axis limits.
pub(crate) fn padded_range(min: f64, max: f64) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if min == max {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

/// Collect (km, price) points per fuel category, ordered like the fuel
/// distribution so the legend matches the pie chart.
pub(crate) fn scatter_points(
    df: &DataFrame,
    fuel_order: &[CategoryCount],
) -> Result<Vec<(String, Vec<(f64, f64)>)>> {
    let (Ok(km_col), Ok(price_col), Ok(fuel_col)) =
        (df.column("km"), df.column("price"), df.column("fuel"))
    else {
        return Ok(Vec::new());
    };

    let km = km_col
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let price = price_col
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let fuel = fuel_col.as_materialized_series().clone();
    let km_ca = km.f64()?;
    let price_ca = price.f64()?;

    let mut by_fuel: HashMap<String, Vec<(f64, f64)>> = HashMap::new();
    for i in 0..df.height() {
        let Some(k) = km_ca.get(i) else { continue };
        let Some(p) = price_ca.get(i) else { continue };
        let label = match fuel.get(i)? {
            AnyValue::Null => continue,
            AnyValue::String(s) => s.to_string(),
            AnyValue::StringOwned(s) => s.to_string(),
            other => format!("{}", other),
        };
        by_fuel.entry(label).or_default().push((k, p));
    }

    let mut series = Vec::with_capacity(by_fuel.len());
    for category in fuel_order {
        if let Some(points) = by_fuel.remove(&category.value) {
            series.push((category.value.clone(), points));
        }
    }
    let mut rest: Vec<(String, Vec<(f64, f64)>)> = by_fuel.into_iter().collect();
    rest.sort_by(|a, b| a.0.cmp(&b.0));
    series.extend(rest);

    Ok(series)
}
