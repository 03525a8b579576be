use image::{Rgb, RgbImage};
use rand::{rngs::StdRng, SeedableRng};
use sketch_nn::{
    labels::LabelRegistry,
    matrix::Matrix,
    neural::{
        params::{from_json, to_json},
        sample::Sample,
        stats::{evaluate_accuracy, Trainer, TrainingConfig},
        Network,
    },
    translator::Translator,
    viz::AccuracyPlot,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const SIDE: usize = 8;
const SEED: u64 = 3;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);
    Registry::default().with(filter).with(fmt_layer).init();
}

fn xor() -> Vec<Sample> {
    vec![
        Sample::from_columns(&[0.0, 0.0], &[0.0]),
        Sample::from_columns(&[0.0, 1.0], &[1.0]),
        Sample::from_columns(&[1.0, 0.0], &[1.0]),
        Sample::from_columns(&[1.0, 1.0], &[0.0]),
    ]
}

/// A white canvas with one thick black stroke.
fn stroke(vertical: bool, offset: u32) -> RgbImage {
    RgbImage::from_fn(120, 90, |x, y| {
        let (along, across) = if vertical { (y, x) } else { (x, y) };
        let ink = (20..70).contains(&along) && (30 + offset..42 + offset).contains(&across);
        if ink {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    })
}

fn main() {
    init_tracing();

    let dataset = xor();
    let config = TrainingConfig::default()
        .with_learning_rate(0.5)
        .with_no_result(50_000)
        .with_log(Some(20))
        .with_seed(Some(SEED));
    let mut trainer = Trainer::new(config);
    let mut rng = StdRng::seed_from_u64(SEED);

    // Sweep hidden widths on XOR
    let report = trainer.architecture_search(&dataset, 6, 90.0).unwrap();
    for candidate in &report.candidates {
        info!(
            hidden = candidate.hidden,
            converged = candidate.run.converged,
            accuracy = candidate.run.accuracy,
            elapsed = ?candidate.run.elapsed,
            "candidate"
        );
    }

    let hidden = report.best.unwrap_or(4);
    info!(hidden, "training final network");

    let mut net = Network::new_with_rng(2, hidden, 1, &mut rng)
        .unwrap()
        .with_learning_rate(0.5);
    let run = trainer.train_until(&mut net, &dataset, 90.0).unwrap();

    // Ship the parameters and reload them into a fresh network
    let json = to_json(&net.dump_params()).unwrap();
    let mut shipped = Network::new_with_rng(2, hidden, 1, &mut rng).unwrap();
    shipped.load_params(&from_json(&json).unwrap()).unwrap();
    info!(
        bytes = json.len(),
        accuracy = evaluate_accuracy(&shipped, &dataset).unwrap().accuracy,
        "reloaded network"
    );

    // Recognize strokes drawn on a canvas
    let translator = Translator::new(SIDE).unwrap();
    let labels = LabelRegistry::new(["Vertical", "Horizontal"]);
    let strokes: Vec<Sample> = (0..6)
        .flat_map(|offset| {
            let offset = offset * 4;
            [
                Sample::new(
                    translator.translate(&stroke(true, offset)),
                    Matrix::from_column(vec![1.0, 0.0]),
                ),
                Sample::new(
                    translator.translate(&stroke(false, offset)),
                    Matrix::from_column(vec![0.0, 1.0]),
                ),
            ]
        })
        .collect();

    let mut recognizer = Network::new_with_rng(SIDE * SIDE, 6, 2, &mut rng).unwrap();
    trainer.train_until(&mut recognizer, &strokes, 90.0).unwrap();

    for vertical in [true, false] {
        let sample = translator.translate_sample(&stroke(vertical, 10));
        let output = recognizer.feed_forward(sample.inputs()).unwrap();
        info!(
            drawn = if vertical { "vertical" } else { "horizontal" },
            guess = labels.label_for(&output).unwrap_or("?"),
            "recognized"
        );
    }

    match std::env::args().nth(1).as_deref() {
        Some("--plot-run") => AccuracyPlot::from_run(&run).show().unwrap(),
        Some("--plot-sweep") => AccuracyPlot::from_report(&report).show().unwrap(),
        _ => {}
    }
}
