//! Plot the piecewise-linear exponential approximation against the ideal curve
//!
//! Look in /images/ for the resulting plot.
//!
//! Requires plotters lib: https://docs.rs/plotters/latest/plotters/. Tested on an Ubuntu machine.

use midi_retrofit::expo;
use plotters::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let num_points = 1024_u32;

    let root = BitMapBackend::new("images/expo_plot.png", (640, 480)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("Exponential converter", ("sans-serif", 40))?;

    let mut chart = ChartBuilder::on(&root)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(0f32..1f32, 0f32..1.05f32)?;

    chart
        .configure_mesh()
        .x_desc("Linear input")
        .y_desc("Output")
        .draw()?;

    // the ideal curve the segments approximate
    chart.draw_series(LineSeries::new(
        (0..num_points).map(|i| {
            let x = i as f32 / num_points as f32;
            (x, 0.0125 * (81.0_f32.powf(x) - 1.0))
        }),
        BLUE,
    ))?;

    // the float variant
    chart.draw_series(LineSeries::new(
        (0..num_points).map(|i| {
            let x = i as f32 / num_points as f32;
            (x, expo::convert(x))
        }),
        RED,
    ))?;

    // the fixed-point variant, scaled into the same frame
    chart.draw_series(LineSeries::new(
        (0..num_points).map(|i| {
            let x = i as f32 / num_points as f32;
            (x, expo::convert_u16(i as u16) as f32 / 8192.0)
        }),
        GREEN,
    ))?;

    root.present()?;

    Ok(())
}
