use std::time::{Duration, Instant};

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::{
    neural::{sample::Sample, Classifier, Network, DEFAULT_LEARNING_RATE},
    prelude::*,
};

/// Iterations without a change in accuracy after which training is considered stuck.
pub const NO_RESULT: usize = 500_000;

/// Log every n-th accuracy change while training.
pub const LOG_EVERY: usize = 80;

/// Cuts `value` down to `decimals` decimal places, rounding towards zero.
pub fn truncate(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).trunc() / factor
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Step size for networks built by [`Trainer::architecture_search`].
    pub learning_rate: f64,
    /// Stall ceiling, see [`NO_RESULT`].
    pub no_result: usize,
    pub log_every: Option<usize>,
    /// Fixes sample drawing and network initialisation.
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            no_result: NO_RESULT,
            log_every: Some(LOG_EVERY),
            seed: None,
        }
    }
}

impl TrainingConfig {
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_no_result(mut self, no_result: usize) -> Self {
        self.no_result = no_result;
        self
    }

    pub fn with_log(mut self, log_every: Option<usize>) -> Self {
        self.log_every = log_every;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

/// Error and accuracy of a classifier over a labelled dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyReport {
    /// Sum of `|guess - target|` over every output of every sample.
    pub error_absolute: f64,
    /// `error_absolute` per sample.
    pub error_relative: f64,
    /// `(1 - error_relative) * 100`, truncated to one decimal. Not clamped,
    /// so large errors give negative values.
    pub accuracy: f64,
}

/// Scores `classifier` against every sample of `dataset`.
pub fn evaluate_accuracy<C: Classifier + ?Sized>(
    classifier: &C,
    dataset: &[Sample],
) -> Result<AccuracyReport> {
    if dataset.is_empty() {
        return Err(Error::EmptyDataset);
    }

    let mut error_absolute = 0.0;
    for sample in dataset {
        let guess = classifier.feed_forward(sample.inputs())?;
        let diff = (&guess - sample.targets()?)?;
        error_absolute += diff.to_vec().iter().flatten().map(|x| x.abs()).sum::<f64>();
    }

    let error_relative = error_absolute / dataset.len() as f64;
    Ok(AccuracyReport {
        error_absolute,
        error_relative,
        accuracy: truncate((1.0 - error_relative) * 100.0, 1),
    })
}

/// Outcome of one [`Trainer::train_until`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRun {
    pub accuracy: f64,
    pub error_absolute: f64,
    pub error_relative: f64,
    /// Iterations since the accuracy last changed.
    pub stall_counter: usize,
    /// False when the stall ceiling stopped the run.
    pub converged: bool,
    pub iterations: usize,
    pub elapsed: Duration,
    pub iterations_per_second: f64,
    /// Highest `stall_counter / no_result` seen, truncated to three decimals.
    pub peak_stall_ratio: f64,
    /// `(iteration, accuracy)` at the start and at every accuracy change.
    pub history: Vec<(usize, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateResult {
    pub hidden: usize,
    pub run: TrainingRun,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArchitectureReport {
    /// One entry per hidden width, in sweep order.
    pub candidates: Vec<CandidateResult>,
    /// Hidden width of the fastest converged candidate.
    pub best: Option<usize>,
}

impl ArchitectureReport {
    pub fn best_candidate(&self) -> Option<&CandidateResult> {
        let best = self.best?;
        self.candidates.iter().find(|c| c.hidden == best)
    }
}

/// Drives single-sample stochastic training runs.
pub struct Trainer {
    config: TrainingConfig,
    rng: StdRng,
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new(TrainingConfig::default())
    }
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { config, rng }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Trains on uniformly drawn samples until the accuracy reaches
    /// `target_accuracy` or stays unchanged for `no_result` iterations.
    ///
    /// Getting stuck is not an error: the run comes back with
    /// `converged == false`.
    pub fn train_until(
        &mut self,
        net: &mut Network,
        dataset: &[Sample],
        target_accuracy: f64,
    ) -> Result<TrainingRun> {
        if target_accuracy <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "target accuracy must be positive, got {target_accuracy}"
            )));
        }
        if self.config.no_result == 0 {
            return Err(Error::InvalidArgument(
                "stall ceiling must be at least 1".to_string(),
            ));
        }

        let mut report = evaluate_accuracy(&*net, dataset)?;
        let mut history = vec![(0, report.accuracy)];
        let mut iterations = 0;
        let mut stall_counter = 0;
        let mut peak_stall_ratio: f64 = 0.0;
        let mut changes = 0;
        let mut converged = true;

        let start = Instant::now();
        while report.accuracy < target_accuracy {
            let sample = &dataset[self.rng.gen_range(0..dataset.len())];
            net.train(sample.inputs(), sample.targets()?)?;

            let previous = report.accuracy;
            report = evaluate_accuracy(&*net, dataset)?;
            iterations += 1;

            if report.accuracy != previous {
                stall_counter = 0;
                changes += 1;
                history.push((iterations, report.accuracy));
                if self.config.log_every.is_some_and(|n| n > 0 && changes % n == 0) {
                    info!(accuracy = report.accuracy, iterations, "training progress");
                }
            } else {
                stall_counter += 1;
                let ratio = truncate(stall_counter as f64 / self.config.no_result as f64, 3);
                peak_stall_ratio = peak_stall_ratio.max(ratio);

                if stall_counter >= self.config.no_result {
                    warn!(
                        accuracy = report.accuracy,
                        iterations,
                        no_result = self.config.no_result,
                        "training stalled; raise the stall ceiling or change the architecture"
                    );
                    converged = false;
                    break;
                }
            }
        }

        let elapsed = start.elapsed();
        let seconds = elapsed.as_secs_f64();
        let iterations_per_second = if seconds > 0.0 {
            truncate(iterations as f64 / seconds, 2)
        } else {
            0.0
        };

        info!(
            accuracy = report.accuracy,
            iterations,
            seconds,
            iterations_per_second,
            converged,
            "training finished"
        );

        Ok(TrainingRun {
            accuracy: report.accuracy,
            error_absolute: report.error_absolute,
            error_relative: report.error_relative,
            stall_counter,
            converged,
            iterations,
            elapsed,
            iterations_per_second,
            peak_stall_ratio,
            history,
        })
    }

    /// Trains a fresh network for every hidden width from 2 to `max_hidden`
    /// and picks the converged one that trained fastest.
    ///
    /// The sweep always covers every width.
    pub fn architecture_search(
        &mut self,
        dataset: &[Sample],
        max_hidden: usize,
        target_accuracy: f64,
    ) -> Result<ArchitectureReport> {
        let first = dataset.first().ok_or(Error::EmptyDataset)?;
        if max_hidden < 2 {
            return Err(Error::InvalidArgument(format!(
                "hidden layer needs at least 2 neurons, got a ceiling of {max_hidden}"
            )));
        }

        let input_size = first.inputs().rows();
        let output_size = first.targets()?.rows();

        let mut candidates = Vec::with_capacity(max_hidden - 1);
        let mut best: Option<(usize, Duration)> = None;

        for hidden in 2..=max_hidden {
            let mut net = Network::new_with_rng(input_size, hidden, output_size, &mut self.rng)?
                .with_learning_rate(self.config.learning_rate);
            let run = self.train_until(&mut net, dataset, target_accuracy)?;

            if run.converged {
                info!(
                    layout = ?(input_size, hidden, output_size),
                    accuracy = target_accuracy,
                    seconds = run.elapsed.as_secs_f64(),
                    iterations_per_second = run.iterations_per_second,
                    stall_level = truncate(run.peak_stall_ratio * 100.0, 1),
                    "candidate converged"
                );
                if best.map_or(true, |(_, time)| run.elapsed < time) {
                    best = Some((hidden, run.elapsed));
                }
            } else {
                info!(
                    layout = ?(input_size, hidden, output_size),
                    no_result = self.config.no_result,
                    "candidate too slow"
                );
            }

            candidates.push(CandidateResult { hidden, run });
        }

        let best = best.map(|(hidden, _)| hidden);
        debug!(?best, candidates = candidates.len(), "architecture sweep done");
        Ok(ArchitectureReport { candidates, best })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;

    struct Constant(Matrix);

    impl Classifier for Constant {
        fn feed_forward(&self, _input: &Matrix) -> Result<Matrix> {
            Ok(self.0.clone())
        }
    }

    fn or_dataset() -> Vec<Sample> {
        vec![
            Sample::from_columns(&[0.0, 0.0], &[0.0]),
            Sample::from_columns(&[0.0, 1.0], &[1.0]),
            Sample::from_columns(&[1.0, 0.0], &[1.0]),
            Sample::from_columns(&[1.0, 1.0], &[1.0]),
        ]
    }

    fn constant_dataset(target: f64, n: usize) -> Vec<Sample> {
        (0..n)
            .map(|i| Sample::from_columns(&[i as f64], &[target]))
            .collect()
    }

    #[test]
    fn truncation_not_rounding() {
        assert_eq!(truncate(12.345, 1), 12.3);
        assert_eq!(truncate(99.99, 1), 99.9);
        assert_eq!(truncate(-12.35, 1), -12.3);
        assert_eq!(truncate(0.1239, 3), 0.123);
        assert_eq!(truncate(7.9, 0), 7.0);
    }

    #[test]
    fn perfect_guesses_score_100() {
        let report =
            evaluate_accuracy(&Constant(Matrix::from_array([[1.0]])), &constant_dataset(1.0, 5))
                .unwrap();

        assert_eq!(report.accuracy, 100.0);
        assert_eq!(report.error_absolute, 0.0);
    }

    #[test]
    fn guesses_off_by_one_score_0() {
        let report =
            evaluate_accuracy(&Constant(Matrix::from_array([[1.0]])), &constant_dataset(0.0, 4))
                .unwrap();

        assert_eq!(report.accuracy, 0.0);
        assert_eq!(report.error_absolute, 4.0);
        assert_eq!(report.error_relative, 1.0);
    }

    #[test]
    fn accuracy_is_not_clamped() {
        let report =
            evaluate_accuracy(&Constant(Matrix::from_array([[3.0]])), &constant_dataset(0.0, 2))
                .unwrap();

        assert_eq!(report.accuracy, -200.0);
    }

    #[test]
    fn relative_error_is_per_sample() {
        let dataset = vec![
            Sample::from_columns(&[0.0], &[0.0, 1.0]),
            Sample::from_columns(&[1.0], &[0.5, 0.5]),
        ];
        let report =
            evaluate_accuracy(&Constant(Matrix::from_array([[0.25], [0.75]])), &dataset).unwrap();

        // (0.25 + 0.25) + (0.25 + 0.25)
        assert_eq!(report.error_absolute, 1.0);
        assert_eq!(report.error_relative, 0.5);
        assert_eq!(report.accuracy, 50.0);
    }

    #[test]
    fn evaluation_needs_labelled_data() {
        let classifier = Constant(Matrix::from_array([[1.0]]));

        assert_eq!(
            evaluate_accuracy(&classifier, &[]),
            Err(Error::EmptyDataset)
        );
        assert_eq!(
            evaluate_accuracy(&classifier, &[Sample::input(Matrix::new(1, 1))]),
            Err(Error::MissingTarget)
        );
    }

    #[test]
    fn stall_ceiling_stops_hopeless_training() {
        let mut trainer =
            Trainer::new(TrainingConfig::default().with_no_result(50).with_seed(Some(3)));
        let mut net = Network::new(2, 3, 1).unwrap().with_learning_rate(0.0);

        let run = trainer.train_until(&mut net, &or_dataset(), 101.0).unwrap();

        assert!(!run.converged);
        assert_eq!(run.iterations, 50);
        assert_eq!(run.stall_counter, 50);
        assert_eq!(run.peak_stall_ratio, 1.0);
        assert_eq!(run.history.len(), 1);
    }

    #[test]
    fn stall_counter_resets_when_accuracy_moves() {
        let mut trainer = Trainer::new(
            TrainingConfig::default()
                .with_no_result(1_000)
                .with_seed(Some(11)),
        );
        // All-zero parameters answer 0.5 everywhere, scoring exactly 50.0 on OR.
        // A small step moves the accuracy by less than its 0.1 resolution.
        let mut net = Network::new(2, 1, 1).unwrap().with_learning_rate(0.01);
        net.set_params(
            Matrix::new(1, 1),
            Matrix::new(1, 1),
            Matrix::new(1, 2),
            Matrix::new(1, 1),
        )
        .unwrap();
        assert_eq!(evaluate_accuracy(&net, &or_dataset()).unwrap().accuracy, 50.0);

        let run = trainer.train_until(&mut net, &or_dataset(), 50.5).unwrap();

        assert!(run.converged);
        assert!(run.history.len() > 2);
        assert!(run.peak_stall_ratio > 0.0);
        assert_eq!(run.stall_counter, 0);
    }

    #[test]
    fn trains_or_to_target() {
        let mut trainer = Trainer::new(
            TrainingConfig::default()
                .with_seed(Some(17))
                .with_log(Some(10)),
        );
        let mut net = Network::new_with_rng(2, 3, 1, &mut StdRng::seed_from_u64(17))
            .unwrap()
            .with_learning_rate(0.5);

        let run = trainer.train_until(&mut net, &or_dataset(), 75.0).unwrap();

        assert!(run.converged);
        assert!(run.accuracy >= 75.0);
        assert_eq!(run.history.last().map(|(_, acc)| *acc), Some(run.accuracy));
        assert!(run
            .history
            .windows(2)
            .all(|w| w[0].0 < w[1].0 && w[0].1 != w[1].1));

        let report = evaluate_accuracy(&net, &or_dataset()).unwrap();
        assert_eq!(report.accuracy, run.accuracy);
    }

    #[test]
    fn train_until_rejects_bad_arguments() {
        let mut trainer = Trainer::default();
        let mut net = Network::new(2, 2, 1).unwrap();

        assert!(matches!(
            trainer.train_until(&mut net, &or_dataset(), 0.0),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(
            trainer.train_until(&mut net, &[], 50.0),
            Err(Error::EmptyDataset)
        );
    }

    #[test]
    fn sweep_covers_every_width() {
        let mut trainer = Trainer::new(
            TrainingConfig::default()
                .with_seed(Some(8))
                .with_learning_rate(0.5)
                .with_log(None),
        );

        let report = trainer.architecture_search(&or_dataset(), 4, 70.0).unwrap();

        let widths: Vec<_> = report.candidates.iter().map(|c| c.hidden).collect();
        assert_eq!(widths, [2, 3, 4]);

        let best = report.best_candidate().expect("a converged candidate");
        assert!(best.run.converged);
        assert!(report
            .candidates
            .iter()
            .filter(|c| c.run.converged)
            .all(|c| best.run.elapsed <= c.run.elapsed));
    }

    #[test]
    fn sweep_without_convergence_has_no_best() {
        let mut trainer = Trainer::new(
            TrainingConfig::default()
                .with_seed(Some(8))
                .with_learning_rate(0.0)
                .with_no_result(20),
        );

        let report = trainer.architecture_search(&or_dataset(), 3, 101.0).unwrap();

        assert_eq!(report.candidates.len(), 2);
        assert!(report.candidates.iter().all(|c| !c.run.converged));
        assert!(report.candidates.iter().all(|c| c.run.iterations == 20));
        assert_eq!(report.best, None);
        assert!(report.best_candidate().is_none());
    }

    #[test]
    fn sweep_rejects_bad_arguments() {
        let mut trainer = Trainer::default();

        assert!(matches!(
            trainer.architecture_search(&or_dataset(), 1, 90.0),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(
            trainer.architecture_search(&[], 4, 90.0),
            Err(Error::EmptyDataset)
        );
        assert_eq!(
            trainer.architecture_search(&[Sample::input(Matrix::new(2, 1))], 4, 90.0),
            Err(Error::MissingTarget)
        );
    }
}
