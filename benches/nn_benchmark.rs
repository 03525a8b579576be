use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};
use rand::{rngs::StdRng, SeedableRng};
use sketch_nn::{
    matrix::Matrix,
    neural::{sample::Sample, stats::evaluate_accuracy, Network},
    translator::Translator,
};

fn seeded(input: usize, hidden: usize, output: usize) -> Network {
    Network::new_with_rng(input, hidden, output, &mut StdRng::seed_from_u64(7)).unwrap()
}

fn xor() -> Vec<Sample> {
    vec![
        Sample::from_columns(&[0.0, 0.0], &[0.0]),
        Sample::from_columns(&[0.0, 1.0], &[1.0]),
        Sample::from_columns(&[1.0, 0.0], &[1.0]),
        Sample::from_columns(&[1.0, 1.0], &[0.0]),
    ]
}

fn drawing(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        if (x as i64 - y as i64).abs() < 3 || (40..60).contains(&x) {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    })
}

fn bench_forward(c: &mut Criterion) {
    let tiny = seeded(2, 3, 1);
    let sketch = seeded(28 * 28, 64, 7);

    let tiny_input = Matrix::from_column(vec![1.0, 0.0]);
    let sketch_input = Matrix::from_column(vec![1.0; 28 * 28]);

    c.bench_function("feed forward 2-3-1", |b| {
        b.iter(|| black_box(&tiny).feed_forward(black_box(&tiny_input)))
    });
    c.bench_function("feed forward 784-64-7", |b| {
        b.iter(|| black_box(&sketch).feed_forward(black_box(&sketch_input)))
    });
}

fn bench_train(c: &mut Criterion) {
    let mut tiny = seeded(2, 3, 1);
    let mut sketch = seeded(28 * 28, 64, 7);

    let tiny_input = Matrix::from_column(vec![1.0, 0.0]);
    let tiny_target = Matrix::from_column(vec![1.0]);
    let sketch_input = Matrix::from_column(vec![1.0; 28 * 28]);
    let mut sketch_target = Matrix::new(7, 1);
    sketch_target[(3, 0)] = 1.0;

    c.bench_function("train step 2-3-1", |b| {
        b.iter(|| tiny.train(black_box(&tiny_input), black_box(&tiny_target)))
    });
    c.bench_function("train step 784-64-7", |b| {
        b.iter(|| sketch.train(black_box(&sketch_input), black_box(&sketch_target)))
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let net = seeded(2, 3, 1);
    let dataset = xor();

    c.bench_function("evaluate accuracy xor", |b| {
        b.iter(|| evaluate_accuracy(black_box(&net), black_box(&dataset)))
    });
}

fn bench_translate(c: &mut Criterion) {
    let translator = Translator::new(28).unwrap();
    let small = drawing(100, 100);
    let large = drawing(800, 600);

    c.bench_function("translate 100x100", |b| {
        b.iter(|| translator.translate(black_box(&small)))
    });
    c.bench_function("translate 800x600", |b| {
        b.iter(|| translator.translate(black_box(&large)))
    });
}

criterion_group!(
    benches,
    bench_forward,
    bench_train,
    bench_evaluate,
    bench_translate
);
criterion_main!(benches);
