pub mod cancel;
pub mod dna;
pub mod pool;

pub use cancel::CancelToken;
