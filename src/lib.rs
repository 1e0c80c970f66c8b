//! # Multidimensional causal filtering and Wilson-Burg spectral factorization
//!
//! The [`wilson_burg`](crate) crate implements causal filters that are linear
//! and shift-invariant on regularly sampled 1-D, 2-D and 3-D grids. The
//! output samples of a causal filter depend only on present and past input
//! samples. In two dimensions causal filters are also called non-symmetric
//! half-plane (NSHP) filters, and this notion of causal extends to higher
//! dimensions.
//!
//! A causal filter is a sparse stencil: a table of integer lags, one tuple
//! per dimension, with one real coefficient per lag. It is a linear operator
//! with a corresponding anti-causal transpose (adjoint) operator. A causal
//! filter may have a causal inverse, and its transpose may have an
//! anti-causal inverse; those inverses are recursive all-pole filters,
//! applied by running the same stencil as a recursion. All four operators
//! may be applied in place, with input and output in the same buffer,
//! because each one visits grid cells in an order under which no stencil
//! read ever lands on a cell written earlier in the same pass.
//!
//! The filters pair with the iterative Wilson-Burg spectral factorization:
//! given an auto-correlation sampled on a grid with odd extents, it computes
//! the minimum-phase causal filter whose cascade with its own transpose
//! reproduces that auto-correlation on the filter's lag set. The
//! minimum-phase property is what makes the causal inverse stable, so the
//! factorization is the standard route to invertible multidimensional
//! filters.
//!
//! ## Examples
//!
//! Applying a 1-D two-tap filter and undoing it with the causal recursion:
//!
//! ```
//! use ndarray::array;
//! use wilson_burg::CausalFilter1;
//!
//! # fn main() -> Result<(), wilson_burg::error::Error> {
//! let filter = CausalFilter1::with_coefficients(&[0, 1], &[1.0, -0.5])?;
//! let x = array![1.0, 0.0, 0.0, 0.0];
//! let mut y = array![0.0, 0.0, 0.0, 0.0];
//! filter.apply(x.view(), y.view_mut())?;
//! assert_eq!(y, array![1.0, -0.5, 0.0, 0.0]);
//! filter.apply_inverse_in_place(y.view_mut());
//! assert_eq!(y, x);
//! # Ok(())
//! # }
//! ```
//!
//! Recovering a minimum-phase factor from its auto-correlation:
//!
//! ```
//! use ndarray::array;
//! use wilson_burg::CausalFilter1;
//!
//! # fn main() -> Result<(), wilson_burg::error::Error> {
//! // the auto-correlation of (1 - 0.5 z)
//! let r = array![-0.5, 1.25, -0.5];
//! let mut filter = CausalFilter1::<f64>::new(&[0, 1])?;
//! filter.factor_wilson_burg(100, 1e-10, r.view())?;
//! let a = filter.coefficients();
//! assert!((a[0] - 1.0).abs() < 1e-6);
//! assert!((a[1] + 0.5).abs() < 1e-6);
//! # Ok(())
//! # }
//! ```
//!
//! ## References
//!
//! \[1\] Claerbout, J., 1998, "Multidimensional recursive filters via a
//! helix", Geophysics, vol. 63, no. 5, pp. 1532-1541.
//!
//! \[2\] Wilson, G., 1969, "Factorization of the covariance generating
//! function of a pure moving average process", SIAM Journal on Numerical
//! Analysis, vol. 6, no. 1, pp. 1-7.
//!
//! \[3\] Fomel, S., P. Sava, J. Rickett and J. Claerbout, 2003, "The
//! Wilson-Burg method of spectral factorization with application to helical
//! filtering", Geophysical Prospecting, vol. 51, no. 5, pp. 409-420.

#![warn(missing_docs)]

pub mod conv;
pub mod error;
mod filter1;
pub use filter1::CausalFilter1;
mod filter2;
pub use filter2::CausalFilter2;
mod filter3;
pub use filter3::CausalFilter3;
mod lags;
