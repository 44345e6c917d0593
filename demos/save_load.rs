use rand::rngs::StdRng;
use rand::SeedableRng;
use unimatrix::{Matrix, MatrixStore, Result};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let store = MatrixStore::new(std::env::temp_dir().join("unimatrix-demo"));
    let mut rng = StdRng::seed_from_u64(2024);
    let weights = Matrix::normal(3, 4, 0.0, 0.5, &mut rng);

    let first = weights.save(&store, "weights", "checkpoints", true)?;
    let second = weights.save(&store, "weights", "checkpoints", true)?;
    println!("saved to {} and {}", first.display(), second.display());

    // The file carries no shape; the reader has to know it.
    let mut restored = Matrix::new(3, 4);
    restored.load(&store, "weights", "checkpoints")?;
    println!("{}", restored.show("restored"));
    println!("identical: {}", restored == weights);
    Ok(())
}
