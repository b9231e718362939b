//! Error types for `veb-set`.

use thiserror::Error;

/// Result type alias using [`VebError`].
pub type Result<T> = std::result::Result<T, VebError>;

/// Errors raised at the `VebTree` / `Universe` boundary.
///
/// Node operations themselves are total over their universe; every failure
/// here is an argument that was rejected before it reached the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VebError {
    #[error("unsupported bit width {0} (expected one of 8, 16, 32, 64)")]
    UnsupportedBitWidth(u32),

    #[error("invalid bit width: {0:?}")]
    InvalidBitWidth(String),

    #[error("key {key} does not fit in a {bit_width}-bit universe")]
    KeyOutOfRange { key: u64, bit_width: u32 },
}
