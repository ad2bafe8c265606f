/// Errors raised by the constructors that accept untyped input.
///
/// Queries on a built tree never fail; an empty tree simply yields empty results.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum KdTreeError {
    /// A flat coordinate array whose length is not a multiple of the dimension.
    #[error("flat coordinate array of length {len} is not a multiple of dimension {dim}")]
    FlatLength { len: usize, dim: usize },

    /// Parallel per-point arrays of different lengths.
    #[error("expected {expected} values, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// A region with `min > max` (or NaN) along some axis.
    #[error("region is inverted on axis {axis}: min {min} > max {max}")]
    InvertedRegion { axis: usize, min: f64, max: f64 },

    /// Gather configuration could not be parsed.
    #[error("invalid gather configuration: {0}")]
    Config(String),
}
