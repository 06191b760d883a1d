//! Plot out the glissando pitch trajectory at a few portamento settings
//!
//! Look in /images/ for the resulting plot.
//!
//! Requires plotters lib: https://docs.rs/plotters/latest/plotters/. Tested on an Ubuntu machine.

use midi_retrofit::glissando::Glissando;
use plotters::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let num_ticks = 3_000_u32;
    let target = 36_u8; // three octaves up from the starting pitch

    let root = BitMapBackend::new("images/glide_plot.png", (640, 480)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("Glissando trajectories", ("sans-serif", 40))?;

    let mut chart = ChartBuilder::on(&root)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(0u32..num_ticks, 0u32..40u32)?;

    chart
        .configure_mesh()
        .x_desc("Tick")
        .y_desc("Pitch (semitones)")
        .draw()?;

    // the same mapping the voice controller applies to CC5 values
    for (cc_value, color) in [(16_u32, RED), (48_u32, BLUE), (127_u32, GREEN)] {
        let mut glide = Glissando::new();
        glide.set_rate((51200 / cc_value) as u16);

        chart.draw_series(LineSeries::new(
            (0..num_ticks).map(|tick| {
                glide.tick(target);
                (tick, glide.current() as u32)
            }),
            color,
        ))?;
    }

    root.present()?;

    Ok(())
}
