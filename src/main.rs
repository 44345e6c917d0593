// Small tour of the library. Persistence is shown in the `save_load` demo:
//   cargo run --example save_load
use unimatrix::{Matrix, Result};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut rng = rand::thread_rng();
    let weights = Matrix::normal(2, 3, 0.0, 1.0, &mut rng);
    let input = Matrix::ones(1, 2);

    weights.show("weights");
    (&input * &weights)?.show("input * weights (matrix product)");
    (&weights * &weights)?.show("weights * weights (elementwise)");
    weights.transpose().show("weights^T");
    weights.square().show("weights squared");

    if let Err(e) = &weights * &Matrix::new(4, 5) {
        println!("expected failure: {e}");
    }
    Ok(())
}
