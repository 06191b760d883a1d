//! Plot out the vibrato LFO triangle at a few rates
//!
//! Look in /images/ for the resulting plot.
//!
//! Requires plotters lib: https://docs.rs/plotters/latest/plotters/. Tested on an Ubuntu machine.

use midi_retrofit::lfo::{VibratoLfo, LFO_PHASE_MAX};
use plotters::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // enough ticks to show a few cycles at the slower rate
    let num_ticks = 4_000_u32;

    let root = BitMapBackend::new("images/lfo_plot.png", (640, 480)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("Vibrato LFO phase", ("sans-serif", 40))?;

    let mut chart = ChartBuilder::on(&root)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(0u32..num_ticks, -1.1f32..1.1f32)?;

    chart
        .configure_mesh()
        .x_desc("Tick")
        .y_desc("Phase")
        .draw()?;

    for (linear_rate, color) in [(600_u16, RED), (800_u16, BLUE)] {
        let mut lfo = VibratoLfo::new();
        lfo.set_rate(linear_rate);

        chart.draw_series(LineSeries::new(
            (0..num_ticks).map(|tick| {
                let phase = lfo.tick() as f32 / LFO_PHASE_MAX as f32;
                (tick, phase)
            }),
            color,
        ))?;
    }

    root.present()?;

    Ok(())
}
