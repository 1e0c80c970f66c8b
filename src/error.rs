//! Error types used by `wilson_burg`.

use thiserror::Error;

/// `wilson_burg` `Result` type.
pub type Result<T> = core::result::Result<T, Error>;

/// `wilson_burg` error.
///
/// This enum represents all the errors that can be produced by `wilson_burg`.
#[derive(Error, Debug)]
pub enum Error {
    /// The lag arrays and the coefficient array have different lengths.
    #[error("lag arrays and coefficient array have different lengths")]
    LagLengthMismatch,
    /// The lag table is empty.
    #[error("the lag table is empty")]
    LagsEmpty,
    /// The first lag of the table is not the zero lag.
    #[error("the first lag must be zero in every dimension")]
    FirstLagNotZero,
    /// A lag violates the non-symmetric half-plane (NSHP) causality ordering.
    ///
    /// Every lag after the first must be strictly positive in the NSHP
    /// lexicographic sense: its highest-dimension non-zero component must be
    /// positive. A filter whose lags satisfy this ordering has a well defined
    /// causal recursion for its inverse.
    #[error("lag {index} is not causal under the NSHP ordering")]
    NonCausalLag {
        /// Index of the offending lag in the lag table.
        index: usize,
    },
    /// The source and destination buffers of an operator have different
    /// extents.
    #[error("source and destination extents disagree")]
    ShapeMismatch,
    /// An extent of the auto-correlation buffer is even.
    ///
    /// Auto-correlations must have odd extent in every dimension so that the
    /// zero lag sits at the center sample.
    #[error("auto-correlation extent is not odd")]
    AutocorrelationNotOdd,
    /// An auto-correlation half-extent exceeds the maximum filter lag in that
    /// dimension.
    ///
    /// The Wilson-Burg workspace pads the auto-correlation on the early side
    /// only, which requires the half-extent in each dimension to be no larger
    /// than the filter's maximum lag there.
    #[error("auto-correlation half-extent exceeds the maximum filter lag")]
    AutocorrelationTooLong,
    /// The zero-lag filter coefficient is degenerate.
    ///
    /// Produced when the zero-lag sample of the auto-correlation is not a
    /// positive finite number, or when the zero-lag coefficient becomes zero
    /// or non-finite during Wilson-Burg iterations. Either way the causal
    /// recursion cannot divide by the zero-lag coefficient.
    #[error("zero-lag coefficient is zero or not finite")]
    ZeroLagDegenerate,
    /// Wilson-Burg iterations did not converge.
    ///
    /// The filter keeps the coefficients of the last iteration; callers that
    /// need a converged factor should discard the filter.
    #[error("Wilson-Burg iterations did not converge")]
    NotConverged,
}
