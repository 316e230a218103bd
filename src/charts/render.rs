//! Plotters-backed PNG drawing.
//!
//! Pure drawing code: data selection and skip decisions live in the
//! parent module. Every function writes one bitmap and reports drawing
//! failures (fonts, IO) for the caller to downgrade.

use anyhow::Result;
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use std::path::Path;

use super::{PALETTE, histogram_bins, padded_range, palette_color};

/// Side-by-side price and kilometer histograms on one bitmap.
pub(super) fn price_km_histograms(
    path: &Path,
    prices: &[f64],
    kms: &[f64],
    bins: usize,
    (width, height): (u32, u32),
) -> Result<()> {
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;
    let (left, right) = root.split_horizontally((width / 2) as i32);

    draw_histogram(&left, "Price Distribution", "Price", prices, bins, PALETTE[0])?;
    draw_histogram(
        &right,
        "Kilometers Driven Distribution",
        "Kilometers Driven",
        kms,
        bins,
        PALETTE[2],
    )?;

    root.present()?;
    Ok(())
}

fn draw_histogram(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    title: &str,
    x_label: &str,
    values: &[f64],
    bins: usize,
    color: RGBColor,
) -> Result<()> {
    let buckets = histogram_bins(values, bins);
    let x_min = buckets.first().map(|b| b.0).unwrap_or(0.0);
    let x_max = buckets.last().map(|b| b.1).unwrap_or(1.0);
    let max_count = buckets.iter().map(|b| b.2).max().unwrap_or(0);
    let y_max = if max_count > 0 {
        max_count as f64 * 1.05
    } else {
        1.0
    };

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0f64..y_max)?;
    chart.configure_mesh().x_desc(x_label).y_desc("Count").draw()?;

    chart.draw_series(buckets.iter().map(|(lower, upper, count)| {
        Rectangle::new([(*lower, 0.0), (*upper, *count as f64)], color.mix(0.6).filled())
    }))?;

    Ok(())
}

/// Vertical bar chart with one bar per label.
pub(super) fn bar_chart(
    path: &Path,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    labels: &[String],
    values: &[f64],
    dims: (u32, u32),
) -> Result<()> {
    let root = BitMapBackend::new(path, dims).into_drawing_area();
    root.fill(&WHITE)?;

    let max_value = values.iter().copied().fold(0.0f64, f64::max);
    let y_max = if max_value > 0.0 { max_value * 1.1 } else { 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0i32..labels.len() as i32, 0f64..y_max)?;

    let formatter = |idx: &i32| -> String {
        labels
            .get(*idx as usize)
            .cloned()
            .unwrap_or_default()
    };
    chart
        .configure_mesh()
        .x_labels((labels.len() + 1).min(16))
        .x_label_formatter(&formatter)
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()?;

    chart.draw_series(values.iter().enumerate().map(|(i, value)| {
        Rectangle::new([(i as i32, 0.0), (i as i32 + 1, *value)], PALETTE[0].filled())
    }))?;

    root.present()?;
    Ok(())
}

/// Pie chart of category shares with percentage labels.
pub(super) fn pie_chart(
    path: &Path,
    title: &str,
    labels: &[String],
    sizes: &[f64],
    (width, height): (u32, u32),
) -> Result<()> {
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;
    let titled = root.titled(title, ("sans-serif", 30))?;

    let center = ((width / 2) as i32, (height / 2) as i32);
    let radius = (width.min(height) as f64) * 0.32;
    let colors: Vec<RGBColor> = (0..sizes.len()).map(palette_color).collect();

    let mut pie = Pie::new(&center, &radius, sizes, &colors, labels);
    pie.start_angle(140.0);
    pie.label_style(("sans-serif", 18).into_font().color(&BLACK));
    pie.percentages(("sans-serif", 16).into_font().color(&BLACK));
    titled.draw(&pie)?;

    root.present()?;
    Ok(())
}

/// Scatter plot with one colored series per category.
pub(super) fn scatter_chart(
    path: &Path,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    series: &[(String, Vec<(f64, f64)>)],
    dims: (u32, u32),
) -> Result<()> {
    let root = BitMapBackend::new(path, dims).into_drawing_area();
    root.fill(&WHITE)?;

    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for (_, points) in series {
        for &(x, y) in points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }
    let (x_lo, x_hi) = padded_range(x_min, x_max);
    let (y_lo, y_hi) = padded_range(y_min, y_max);

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;
    chart.configure_mesh().x_desc(x_desc).y_desc(y_desc).draw()?;

    for (idx, (name, points)) in series.iter().enumerate() {
        let color = palette_color(idx);
        chart
            .draw_series(
                points
                    .iter()
                    .map(|(x, y)| Circle::new((*x, *y), 3, color.mix(0.7).filled())),
            )?
            .label(name.clone())
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }
    chart.configure_series_labels().border_style(&BLACK).draw()?;

    root.present()?;
    Ok(())
}
