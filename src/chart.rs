// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::config::Output;
use crate::error::{Error, Result};
use crate::speedup::SpeedupTable;

use plotters::prelude::*;

use std::error::Error as StdError;
use std::ops::Range;
use std::path::Path;

macro_rules! hexcolour {
    ($colour:literal) => {
        RGBColor(
            (($colour & 0xFF0000) >> 16) as u8,
            (($colour & 0x00FF00) >> 8) as u8,
            ($colour & 0x0000FF) as u8,
        )
    };
}

const COLOURS: &[RGBColor] = &[
    hexcolour!(0x1F77B4),
    hexcolour!(0xFF7F0E),
    hexcolour!(0x2CA02C),
    hexcolour!(0xD62728),
    hexcolour!(0x9467BD),
    hexcolour!(0x8C564B),
    hexcolour!(0xE377C2),
    hexcolour!(0x7F7F7F),
    hexcolour!(0xBCBD22),
    hexcolour!(0x17BECF),
    hexcolour!(0x332288),
    hexcolour!(0x882255),
];

const FONT: &str = "sans-serif";

fn colour(index: usize) -> RGBColor {
    COLOURS[index % COLOURS.len()]
}

/// Horizontal extent covering every thread count, padded by 5% of the span
/// on each side so the end markers are drawn whole.
fn x_range(threads: &[usize]) -> Range<f64> {
    let min = threads.iter().copied().min().unwrap_or(0) as f64;
    let max = threads.iter().copied().max().unwrap_or(0) as f64;
    if min < max {
        let pad = (max - min) * 0.05;
        (min - pad)..(max + pad)
    } else {
        (min - 1.0)..(max + 1.0)
    }
}

/// Vertical extent: pinned at zero, with headroom above the largest speedup.
/// The upper bound stays finite.
fn y_range(max_speedup: f64) -> Range<f64> {
    if max_speedup > 0.0 {
        let end = max_speedup * 1.1;
        if end.is_finite() {
            0.0..end
        } else {
            0.0..max_speedup.min(f64::MAX)
        }
    } else {
        0.0..1.0
    }
}

/// Render one line per input size, speedup against thread count, and save
/// it as a PNG.
pub fn plot_speedup<P: AsRef<Path>>(
    table: &SpeedupTable,
    output: &Output,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    draw(table, output, path).map_err(|e| Error::Chart {
        path: path.to_owned(),
        reason: e.to_string(),
    })
}

fn draw(
    table: &SpeedupTable,
    output: &Output,
    path: &Path,
) -> std::result::Result<(), Box<dyn StdError>> {
    let size = output.pixels();
    let scale = size.1 as f64 / 1000.0;
    let font = |pt: f64| (FONT, (pt * scale).round().max(1.0) as u32);

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(output.caption(), font(40.0))
        .margin((20.0 * scale) as u32)
        .set_label_area_size(LabelAreaPosition::Left, (100.0 * scale) as u32)
        .set_label_area_size(LabelAreaPosition::Bottom, (80.0 * scale) as u32)
        .build_cartesian_2d(x_range(table.threads()), y_range(table.max_speedup()))?;

    chart
        .configure_mesh()
        .x_desc(output.x_desc())
        .y_desc(output.y_desc())
        .x_label_style(font(24.0))
        .y_label_style(font(24.0))
        .axis_desc_style(font(28.0))
        .draw()?;

    let stroke = (3.0 * scale).round().max(1.0) as u32;
    let marker = (8.0 * scale).round().max(2.0) as u32;

    for (i, series) in table.series().iter().enumerate() {
        let colour = colour(i);
        let points = table.points(series);

        chart
            .draw_series(LineSeries::new(points.iter().copied(), colour.stroke_width(stroke)))?
            .label(series.size())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], colour.stroke_width(stroke))
            });

        chart.draw_series(
            points
                .iter()
                .map(|&point| Circle::new(point, marker, colour.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .label_font(font(24.0))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;

    Ok(())
}
