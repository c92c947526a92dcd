use conduit_nn::{ActivationFunction, FullyConnected, Matrix, Network, Vector};

fn console_network() -> Network {
    let first = Matrix::from_data(vec![
        vec![0.6, -1.2, 1.4, -0.7],
        vec![-1.2, -1.7, -1.6, 1.1],
    ]).expect("rectangular");
    let second = Matrix::from_data(vec![
        vec![-0.4, -0.0, 2.1],
        vec![1.6, 0.0, -0.2],
        vec![1.6, -1.5, 0.0],
        vec![-1.5, 0.7, 1.8],
    ]).expect("rectangular");

    Network::create(3)
        .add_layer(FullyConnected::new(ActivationFunction::Sigmoid, 0.0, first).unwrap())
        .add_layer(FullyConnected::new(ActivationFunction::Sigmoid, 0.0, second).unwrap())
        .build()
}

fn inputs() -> Vec<Vector> {
    vec![
        Vector::from([-0.6, 1.6, -1.0]),
        Vector::from([-1.4, 0.9, 1.5]),
        Vector::from([0.2, -1.3, -1.0]),
        Vector::from([-0.9, -0.7, -1.2]),
        Vector::from([0.4, 0.1, 0.2]),
    ]
}

const EXPECTED: [[f64; 4]; 5] = [
    [0.41197345561004917, 0.8314293993694081, 0.5301853632739774, 0.31607396490909706],
    [0.7826614091150284, 0.8084363083194981, 0.5535051760955713, 0.6427850098146376],
    [0.5898752435296561, 0.8216095372737501, 0.7543651777362295, 0.34919894670366747],
    [0.6722003953978934, 0.8166043910016146, 0.5902025844263002, 0.5087098836277426],
    [0.47322841097431845, 0.8280846566130694, 0.6910545248579614, 0.2935832341653264],
];

fn assert_close(got: &Vector, want: &[f64; 4]) {
    assert_eq!(got.size(), want.len());
    for (g, w) in got.iter().zip(want.iter()) {
        assert!(*g > 0.0 && *g < 1.0, "sigmoid output {g} outside (0, 1)");
        assert!((g - w).abs() < 1e-9, "got {g}, want {w}");
    }
}

#[test]
fn single_vector_feed_reproduces_reference_outputs() {
    let network = console_network();
    for (input, want) in inputs().iter().zip(EXPECTED.iter()) {
        assert_close(&network.feed(input).unwrap(), want);
    }
}

#[test]
fn streaming_feed_reproduces_reference_outputs_in_order() {
    let network = console_network();
    let outputs: Vec<Vector> = network
        .feed_stream(inputs())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(outputs.len(), EXPECTED.len());
    for (got, want) in outputs.iter().zip(EXPECTED.iter()) {
        assert_close(got, want);
    }
}

#[test]
fn hidden_layer_has_two_neurons() {
    let network = console_network();
    assert_eq!(network.layers()[0].output_size(), Some(2));
    assert_eq!(network.layers()[1].output_size(), Some(4));
}
