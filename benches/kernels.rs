use criterion::{black_box, criterion_group, criterion_main, Criterion};

use conduit_nn::{ActivationFunction, FullyConnected, Matrix, Network, PipelineConfig, Vector};

fn bench_multiply(c: &mut Criterion) {
    let m = Matrix::random(256, 513);
    let v: Vector = (0..513).map(|i| (i as f64 * 0.01).cos()).collect();
    c.bench_function("matrix_multiply_256x513", |b| {
        b.iter(|| m.multiply(black_box(&v)).unwrap())
    });
}

fn bench_softmax(c: &mut Criterion) {
    let v: Vector = (0..4096).map(|i| (i as f64 * 0.003).sin()).collect();
    c.bench_function("softmax_4096", |b| {
        b.iter(|| ActivationFunction::Softmax.apply(black_box(&v)))
    });
}

fn bench_feed_modes(c: &mut Criterion) {
    let network = Network::create(64)
        .add_layer(FullyConnected::he(128, 64, ActivationFunction::ReLU))
        .add_layer(FullyConnected::he(128, 128, ActivationFunction::ReLU))
        .add_layer(FullyConnected::xavier(10, 128, ActivationFunction::Softmax))
        .build();
    let inputs: Vec<Vector> = (0..64)
        .map(|i| (0..64).map(|j| ((i * 64 + j) as f64).sin()).collect())
        .collect();

    c.bench_function("feed_sequential_64", |b| {
        b.iter(|| {
            for input in &inputs {
                black_box(network.feed(input).unwrap());
            }
        })
    });
    c.bench_function("feed_stream_64", |b| {
        b.iter(|| {
            for output in network.feed_stream_with(inputs.clone(), PipelineConfig::new(8)) {
                black_box(output.unwrap());
            }
        })
    });
}

criterion_group!(benches, bench_multiply, bench_softmax, bench_feed_modes);
criterion_main!(benches);
