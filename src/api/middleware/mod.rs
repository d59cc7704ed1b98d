pub mod size_limits;

pub use size_limits::{enforce_size_limit, size_limit_error, SizeLimitConfig};
