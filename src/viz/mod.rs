use egui::plot::{Legend, Line, Plot};

use crate::{
    neural::stats::{ArchitectureReport, TrainingRun},
    prelude::*,
};

/// Static chart of one or more named series, shown in its own window
pub struct AccuracyPlot {
    title: String,
    series: Vec<(String, Vec<[f64; 2]>)>,
}

impl AccuracyPlot {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            series: Vec::new(),
        }
    }

    /// Accuracy against iteration for a single training run
    pub fn from_run(run: &TrainingRun) -> Self {
        let points = run
            .history
            .iter()
            .map(|&(i, accuracy)| [i as f64, accuracy])
            .collect();
        Self::new(format!(
            "Accuracy {:.1}% after {} iterations",
            run.accuracy, run.iterations
        ))
        .with_series("accuracy", points)
    }

    /// Training time (seconds) and final accuracy per hidden width of a sweep
    pub fn from_report(report: &ArchitectureReport) -> Self {
        let elapsed = report
            .candidates
            .iter()
            .map(|c| [c.hidden as f64, c.run.elapsed.as_secs_f64()])
            .collect();
        let accuracy = report
            .candidates
            .iter()
            .map(|c| [c.hidden as f64, c.run.accuracy])
            .collect();
        let title = match report.best_candidate() {
            Some(best) => format!("Best hidden width: {}", best.hidden),
            None => "No width reached the target".to_string(),
        };
        Self::new(title)
            .with_series("seconds", elapsed)
            .with_series("accuracy", accuracy)
    }

    pub fn with_series(mut self, name: impl Into<String>, points: Vec<[f64; 2]>) -> Self {
        self.series.push((name.into(), points));
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn series(&self) -> &[(String, Vec<[f64; 2]>)] {
        &self.series
    }

    /// Opens a native window and blocks until it is closed
    pub fn show(self) -> Result<()> {
        eframe::run_native(
            "sketch_nn",
            eframe::NativeOptions::default(),
            Box::new(|_cc| Box::new(self)),
        )
        .map_err(|e| Error::Gui(e.to_string()))
    }
}

impl eframe::App for AccuracyPlot {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical(|ui| {
                ui.heading(&self.title);
                Plot::new("Accuracy")
                    .legend(Legend::default())
                    .show(ui, |plot_ui| {
                        for (name, points) in &self.series {
                            plot_ui.line(Line::new(points.clone()).name(name));
                        }
                    });
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::neural::stats::CandidateResult;

    fn run(accuracy: f64, elapsed_ms: u64) -> TrainingRun {
        TrainingRun {
            accuracy,
            error_absolute: 0.0,
            error_relative: 0.0,
            stall_counter: 0,
            converged: true,
            iterations: 12,
            elapsed: Duration::from_millis(elapsed_ms),
            iterations_per_second: 0.0,
            peak_stall_ratio: 0.0,
            history: vec![(0, 10.0), (5, 40.0), (12, accuracy)],
        }
    }

    #[test]
    fn run_history_becomes_points() {
        let plot = AccuracyPlot::from_run(&run(90.0, 1));

        assert_eq!(plot.title(), "Accuracy 90.0% after 12 iterations");
        assert_eq!(plot.series().len(), 1);
        assert_eq!(
            plot.series()[0].1,
            vec![[0.0, 10.0], [5.0, 40.0], [12.0, 90.0]]
        );
    }

    #[test]
    fn report_plots_each_width() {
        let report = ArchitectureReport {
            candidates: vec![
                CandidateResult {
                    hidden: 2,
                    run: run(80.0, 1500),
                },
                CandidateResult {
                    hidden: 3,
                    run: run(95.0, 500),
                },
            ],
            best: Some(3),
        };
        assert_eq!(report.best_candidate().map(|c| c.hidden), Some(3));
        let plot = AccuracyPlot::from_report(&report);

        assert_eq!(plot.title(), "Best hidden width: 3");
        assert_eq!(plot.series()[0].1, vec![[2.0, 1.5], [3.0, 0.5]]);
        assert_eq!(plot.series()[1].1, vec![[2.0, 80.0], [3.0, 95.0]]);
    }
}
