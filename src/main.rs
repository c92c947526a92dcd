// Console demo: a fixed 2-layer sigmoid network fed five inputs through the
// streaming pipeline. Set RUST_LOG=conduit_nn=debug to watch the stages.
use conduit_nn::{ActivationFunction, FullyConnected, Matrix, Network, Result, Vector};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conduit_nn=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = run() {
        eprintln!("conduit-nn: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let network = Network::create(3)
        .add_layer(FullyConnected::new(ActivationFunction::Sigmoid, 0.0, Matrix::from_data(vec![
            vec![0.6, -1.2, 1.4, -0.7],
            vec![-1.2, -1.7, -1.6, 1.1],
        ])?)?)
        .add_layer(FullyConnected::new(ActivationFunction::Sigmoid, 0.0, Matrix::from_data(vec![
            vec![-0.4, -0.0, 2.1],
            vec![1.6, 0.0, -0.2],
            vec![1.6, -1.5, 0.0],
            vec![-1.5, 0.7, 1.8],
        ])?)?)
        .build();

    let inputs = vec![
        Vector::from([-0.6, 1.6, -1.0]),
        Vector::from([-1.4, 0.9, 1.5]),
        Vector::from([0.2, -1.3, -1.0]),
        Vector::from([-0.9, -0.7, -1.2]),
        Vector::from([0.4, 0.1, 0.2]),
    ];
    info!(layers = network.layer_count(), inputs = inputs.len(), "feeding network");

    for output in network.feed_stream(inputs) {
        println!("{}", output?);
    }

    Ok(())
}
