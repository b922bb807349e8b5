//! Temperature plots

use chrono::NaiveDate;
use plotters::{prelude::*, series::DashedLineSeries};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    config::SensorTargets,
    scada::ScadaLog,
    timestamp::{DATE_FORMAT, FILENAME_DATE_FORMAT},
};

#[derive(thiserror::Error, Debug)]
pub enum PlotError {
    #[error("Nothing to plot")]
    Empty,
    #[error("Failed to draw the plot: {0}")]
    Drawing(String),
    #[error("Failed to create the plot directory {0:?}")]
    Io(PathBuf, #[source] std::io::Error),
}
type Result<T> = std::result::Result<T, PlotError>;

fn drawing<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::Drawing(e.to_string())
}

/// A temperature curve and its optional target
struct Curve {
    label: String,
    target: Option<f64>,
    points: Vec<(f64, f64)>,
}

fn draw<P: AsRef<Path>>(path: P, title: &str, curves: &[Curve]) -> Result<()> {
    let (x_max, y_min, y_max) = curves
        .iter()
        .flat_map(|c| {
            c.points
                .iter()
                .cloned()
                .chain(c.target.map(|t| (0f64, t)))
        })
        .fold(
            (f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
            |(x_max, y_min, y_max), (x, y)| (x_max.max(x), y_min.min(y), y_max.max(y)),
        );
    if !(y_min.is_finite() && y_max.is_finite()) {
        return Err(PlotError::Empty);
    }
    let x_max = x_max.max(1f64);
    let margin = ((y_max - y_min) * 5e-2).max(1f64);

    let plot = BitMapBackend::new(path.as_ref(), (1400, 800)).into_drawing_area();
    plot.fill(&WHITE).map_err(drawing)?;
    let mut chart = ChartBuilder::on(&plot)
        .caption(title, ("sans-serif", 24))
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .margin(10)
        .build_cartesian_2d(0f64..x_max, y_min - margin..y_max + margin)
        .map_err(drawing)?;
    chart
        .configure_mesh()
        .x_desc("Time [min]")
        .y_desc("Temperature [C]")
        .draw()
        .map_err(drawing)?;

    let mut colors = colorous::TABLEAU10.iter().cycle();
    for curve in curves {
        let color = colors.next().map(|c| RGBColor(c.r, c.g, c.b)).unwrap_or(BLACK);
        chart
            .draw_series(LineSeries::new(curve.points.iter().cloned(), &color))
            .map_err(drawing)?
            .label(&curve.label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
        if let Some(target) = curve.target {
            chart
                .draw_series(DashedLineSeries::new(
                    vec![(0f64, target), (x_max, target)],
                    8,
                    6,
                    RED.mix(0.3).stroke_width(1),
                ))
                .map_err(drawing)?;
        }
    }
    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .position(SeriesLabelPosition::LowerRight)
        .draw()
        .map_err(drawing)?;
    plot.present().map_err(drawing)?;
    Ok(())
}

fn points(log: &ScadaLog, column: usize) -> Vec<(f64, f64)> {
    log.series(column)
        .filter_map(|(_, m, v)| v.map(|v| (m, v)))
        .collect()
}

/// Plots every `ActValue` column of a log
pub fn trend_plot<P: AsRef<Path>>(log: &ScadaLog, title: &str, path: P) -> Result<()> {
    let curves: Vec<_> = log
        .columns()
        .iter()
        .enumerate()
        .map(|(i, column)| Curve {
            label: column.clone(),
            target: None,
            points: points(log, i),
        })
        .collect();
    draw(path, title, &curves)
}

/// Plots the heating curve of every sensor with a target, and the targets
pub fn heating_curves<P: AsRef<Path>>(
    log: &ScadaLog,
    targets: &SensorTargets,
    date: NaiveDate,
    path: P,
) -> Result<()> {
    let mut curves: Vec<Curve> = vec![];
    for (i, column) in log.columns().iter().enumerate() {
        let Some(target) = targets.match_column(column) else {
            continue;
        };
        if curves.iter().any(|c| c.label.starts_with(&target.sensor)) {
            continue;
        }
        curves.push(Curve {
            label: format!("{} (Target: {}C)", target.sensor, target.target),
            target: Some(target.target),
            points: points(log, i),
        });
    }
    let title = format!("Oven Heating Profile - {}", date.format(DATE_FORMAT));
    draw(path, &title, &curves)
}

/// Saves the heating curves of a day into `dir` as `heating_curve_<DDMMYY>.png`
pub fn save_heating_curves<P: AsRef<Path>>(
    log: &ScadaLog,
    targets: &SensorTargets,
    date: NaiveDate,
    dir: P,
) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| PlotError::Io(dir.to_path_buf(), e))?;
    let path = dir.join(format!(
        "heating_curve_{}.png",
        date.format(FILENAME_DATE_FORMAT)
    ));
    heating_curves(log, targets, date, &path)?;
    Ok(path)
}
