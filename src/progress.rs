//! Optimization progress visualization.
//!
//! Two modes:
//! - **Live terminal**: Unicode sparklines while trials run
//! - **PNG export**: charts via plotters (optional feature)

#[cfg(feature = "plotters")]
use plotters::prelude::*;

use owo_colors::OwoColorize;

use crate::history::History;

/// Live progress display for an optimization run.
/// Shows the per-trial score trajectory, the best-so-far envelope, and which
/// stage the latest trial mutated.
pub struct LiveProgress {
    score_history: Vec<f64>,
    best_history: Vec<f64>,
    stage_history: Vec<String>,
}

impl LiveProgress {
    pub fn new() -> Self {
        Self {
            score_history: Vec::new(),
            best_history: Vec::new(),
            stage_history: Vec::new(),
        }
    }

    /// Record one finished trial.
    pub fn record(&mut self, score: f64, best: f64, stage: &str) {
        self.score_history.push(score);
        self.best_history.push(best);
        self.stage_history.push(stage.to_string());
    }

    /// Render sparkline from values. Non-finite values render as the lowest
    /// bar rather than breaking the scale.
    fn sparkline(values: &[f64], width: usize) -> String {
        if values.is_empty() {
            return " ".repeat(width);
        }

        let chars = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let min = finite.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = finite.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let range = (max - min).max(0.001);

        // Sample or pad to width
        let mut result = String::new();
        for i in 0..width {
            let idx = if values.len() <= width {
                if i < values.len() { Some(i) } else { None }
            } else {
                Some(i * values.len() / width)
            };

            if let Some(idx) = idx {
                let v = values[idx];
                if v.is_finite() {
                    let normalized = (v - min) / range;
                    let char_idx = ((normalized * 7.0).round() as usize).min(7);
                    result.push(chars[char_idx]);
                } else {
                    result.push(chars[0]);
                }
            } else {
                result.push(' ');
            }
        }
        result
    }

    /// Print current progress to terminal (single rewritten line).
    pub fn display(&self, trial: usize, total: usize) {
        let width = 20;

        print!("\x1b[2K\r");
        print!("T{:3}/{} ", trial, total);

        if let Some(last) = self.score_history.last() {
            print!(
                "score[{}]{:.3} ",
                Self::sparkline(&self.score_history, width),
                last
            );
        }
        if let Some(best) = self.best_history.last() {
            print!("best {:.3} ", best);
        }
        if let Some(stage) = self.stage_history.last() {
            print!("↯{} ", stage);
        }

        // Flush without newline for live update
        use std::io::Write;
        std::io::stdout().flush().ok();
    }

    /// Print final summary with full sparklines.
    pub fn final_summary(&self) {
        println!("\n");
        println!("{}", " OPTIMIZATION COMPLETE ".bold().on_green());
        println!();

        if !self.score_history.is_empty() {
            let finite: Vec<f64> = self
                .score_history
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .collect();
            let first = finite.first().copied().unwrap_or(f64::NAN);
            let last = self.best_history.last().copied().unwrap_or(f64::NAN);
            let delta = last - first;
            let delta_str = if delta > 0.0 {
                format!("{:+.4}", delta).green().to_string()
            } else if delta < 0.0 {
                format!("{:+.4}", delta).red().to_string()
            } else {
                format!("{:+.4}", delta).dimmed().to_string()
            };
            println!(
                "  {}: {:.4} → {:.4}  ({})",
                "score".bold(),
                first,
                last,
                delta_str
            );
            println!(
                "         [{}]",
                Self::sparkline(&self.score_history, 40).cyan()
            );
        }

        if !self.stage_history.is_empty() {
            // Mutation counts per stage, first-seen order
            let mut order: Vec<&str> = Vec::new();
            for stage in &self.stage_history {
                if !order.contains(&stage.as_str()) {
                    order.push(stage);
                }
            }
            let counts: Vec<String> = order
                .iter()
                .map(|stage| {
                    let n = self.stage_history.iter().filter(|s| s == stage).count();
                    format!("{}×{}", stage, n)
                })
                .collect();
            println!("  {}: {}", "stages".bold(), counts.join("  "));
        }
        println!();
    }
}

impl Default for LiveProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate an optimization progress chart from the trial ledger.
#[cfg(feature = "plotters")]
pub fn plot_optimization_progress(
    history: &History,
    output_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let scores: Vec<(f64, f64)> = history
        .trials()
        .iter()
        .filter(|t| t.score.is_finite())
        .map(|t| (t.iteration as f64, t.score))
        .collect();

    if scores.is_empty() {
        return Ok(());
    }

    let root = BitMapBackend::new(output_path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let n = history.len() as f64;
    let (min_s, max_s) = scores
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, s)| {
            (lo.min(*s), hi.max(*s))
        });

    let mut chart = ChartBuilder::on(&root)
        .caption("Trial score (higher = better)", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(0.0..n.max(1.0), (min_s - 0.05)..(max_s + 0.05))?;

    chart.configure_mesh().draw()?;

    chart
        .draw_series(LineSeries::new(scores.clone(), &BLUE))?
        .label("Trial score")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
    chart.draw_series(
        scores
            .iter()
            .map(|(x, y)| Circle::new((*x, *y), 3, BLUE.filled())),
    )?;

    // Best-so-far envelope
    let mut running = f64::NEG_INFINITY;
    let envelope: Vec<(f64, f64)> = scores
        .iter()
        .map(|(x, s)| {
            running = running.max(*s);
            (*x, running)
        })
        .collect();
    chart
        .draw_series(LineSeries::new(envelope, &GREEN))?
        .label("Best so far")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &GREEN));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    println!("Saved optimization chart to {}", output_path);

    Ok(())
}

/// Stub when plotters feature is disabled.
#[cfg(not(feature = "plotters"))]
pub fn plot_optimization_progress(
    _history: &History,
    _output_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Plotting requires --features plotters");
    Ok(())
}
