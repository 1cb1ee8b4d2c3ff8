use rand::Rng;

/// A six-digit judge login code, zero-padded.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{:06}", rng.random_range(0..1_000_000))
}
