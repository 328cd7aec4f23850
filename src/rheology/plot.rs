use std::io::Cursor;
use std::ops::Range;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::*;

use crate::rheology::{ComplexModuli, RheologyError, TimeSeries};

#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub storage_color: RGBColor,
    pub loss_color: RGBColor,
    pub marker_size: u32,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 600,
            background: WHITE,
            storage_color: RED,
            loss_color: RGBColor(65, 105, 225),
            marker_size: 3,
        }
    }
}

/// G′ and G″ against frequency on log-log axes.
///
/// Non-positive moduli have no place on a log axis and are left out.
pub fn render_moduli_png(
    moduli: &ComplexModuli,
    style: PlotStyle,
) -> Result<Vec<u8>, RheologyError> {
    if moduli.is_empty() {
        return Err(RheologyError::Plot("moduli have no frequencies".into()));
    }
    let storage = positive_points(&moduli.frequencies, &moduli.storage);
    let loss = positive_points(&moduli.frequencies, &moduli.loss);
    let x_range = log_range(moduli.frequencies.iter().copied());
    let y_range = log_range(storage.iter().chain(&loss).map(|p| p.1));

    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let mut chart = ChartBuilder::on(&root)
            .margin(15)
            .caption("Complex moduli", ("sans-serif", 20).into_font().color(&BLACK))
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 45)
            .build_cartesian_2d(x_range.log_scale(), y_range.log_scale())?;
        chart
            .configure_mesh()
            .x_desc("Frequency (Hz)")
            .y_desc("Moduli (Pa)")
            .light_line_style(&BLACK.mix(0.05))
            .draw()?;

        for (label, points, color) in [
            ("G′", &storage, style.storage_color),
            ("G″", &loss, style.loss_color),
        ] {
            chart
                .draw_series(LineSeries::new(
                    points.iter().copied(),
                    color.stroke_width(3),
                ))?
                .label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
            chart.draw_series(
                points
                    .iter()
                    .map(|&p| Circle::new(p, style.marker_size, color.filled())),
            )?;
        }
        chart
            .configure_series_labels()
            .border_style(&BLACK.mix(0.2))
            .background_style(&style.background)
            .draw()?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}

/// Relaxation curve against a log time axis.
pub fn render_signal_png(series: &TimeSeries, style: PlotStyle) -> Result<Vec<u8>, RheologyError> {
    let points: Vec<(f64, f64)> = series
        .times()
        .iter()
        .copied()
        .zip(series.values().iter().copied())
        .filter(|(t, _)| *t > 0.0)
        .collect();
    if points.is_empty() {
        return Err(RheologyError::Plot(
            "series has no samples at positive time".into(),
        ));
    }
    let x_range = log_range(points.iter().map(|p| p.0));
    let (y_lo, y_hi) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.1), hi.max(p.1))
        });
    let y_range = if (y_hi - y_lo).abs() < f64::EPSILON {
        (y_lo - 1.0)..(y_hi + 1.0)
    } else {
        y_lo..y_hi
    };

    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let mut chart = ChartBuilder::on(&root)
            .margin(15)
            .caption("Relaxation signal", ("sans-serif", 20).into_font().color(&BLACK))
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 45)
            .build_cartesian_2d(x_range.log_scale(), y_range)?;
        chart
            .configure_mesh()
            .x_desc("Time (s)")
            .light_line_style(&BLACK.mix(0.05))
            .draw()?;
        chart.draw_series(LineSeries::new(points, style.storage_color.stroke_width(2)))?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}

fn positive_points(xs: &[f64], ys: &[f64]) -> Vec<(f64, f64)> {
    xs.iter()
        .copied()
        .zip(ys.iter().copied())
        .filter(|&(x, y)| x > 0.0 && y > 0.0 && y.is_finite())
        .collect()
}

/// Bounds for a log axis, padded by a factor of two; `[1e-3, 1]` when nothing is positive.
fn log_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .filter(|v| *v > 0.0 && v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return 1e-3..1.0;
    }
    (lo / 2.0)..(hi * 2.0)
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, RheologyError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| RheologyError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
