use crate::error::{Error, Result};
use crate::lags::{bounds, check_lags1, unit_impulse};
use itertools::izip;
use log::trace;
use ndarray::{s, Array1, ArrayView1, ArrayViewMut1};
use num_traits::{Float, ToPrimitive};

/// A 1-D causal filter that is linear and shift-invariant.
///
/// The output samples of a causal filter depend only on present and past
/// input samples. A causal filter is a linear operator with a corresponding
/// anti-causal transpose (adjoint) operator, and its stable causal inverse is
/// a recursive all-pole filter obtained by running the same sparse stencil as
/// a recursion.
///
/// The filter is stored as a lag table: an array of strictly positive sample
/// lags (after the pinned zero lag) and one coefficient per lag. Reads
/// outside the signal extent contribute zero.
///
/// The filter and its transpose, inverse, and inverse transpose may all be
/// applied in place through the `*_in_place` methods; the two-buffer methods
/// copy the source into the destination and then run the same in-place
/// kernel, so both forms produce bit-identical results.
#[derive(Debug, Clone)]
pub struct CausalFilter1<T> {
    lag1: Vec<isize>,
    a: Vec<T>,
    a0: T,
    a0i: T,
    min1: isize,
    max1: isize,
}

impl<T: Float> CausalFilter1<T> {
    /// Creates a unit-impulse filter for the specified lags.
    ///
    /// The coefficient of the zero lag is one and all other coefficients are
    /// zero, so the new filter is the identity until its coefficients are
    /// replaced, typically by [`factor_wilson_burg`](Self::factor_wilson_burg).
    ///
    /// For `j = 0` only, `lag1[j]` must be zero; all other lags must be
    /// strictly positive.
    pub fn new(lag1: &[isize]) -> Result<Self> {
        Self::with_coefficients(lag1, &unit_impulse(lag1.len()))
    }

    /// Creates a causal filter for the specified lags and coefficients.
    ///
    /// For `j = 0` only, `lag1[j]` must be zero; all other lags must be
    /// strictly positive. The coefficient array must have one entry per lag.
    pub fn with_coefficients(lag1: &[isize], a: &[T]) -> Result<Self> {
        check_lags1(lag1, a.len())?;
        let (min1, max1) = bounds(lag1);
        let a0 = a[0];
        Ok(CausalFilter1 {
            lag1: lag1.to_vec(),
            a: a.to_vec(),
            a0,
            a0i: a0.recip(),
            min1,
            max1,
        })
    }

    /// Returns the lags.
    pub fn lag1(&self) -> &[isize] {
        &self.lag1
    }

    /// Returns the filter coefficients.
    pub fn coefficients(&self) -> &[T] {
        &self.a
    }

    /// Applies this filter.
    ///
    /// Computes `y[i] = sum_j a[j] * x[i - lag1[j]]` with reads outside the
    /// array extent contributing zero. The source and destination must have
    /// equal extents. To apply with a single buffer, use
    /// [`apply_in_place`](Self::apply_in_place).
    pub fn apply(&self, x: ArrayView1<'_, T>, mut y: ArrayViewMut1<'_, T>) -> Result<()> {
        if x.dim() != y.dim() {
            return Err(Error::ShapeMismatch);
        }
        y.assign(&x);
        self.apply_in_place(y);
        Ok(())
    }

    /// Applies this filter in place.
    pub fn apply_in_place(&self, mut y: ArrayViewMut1<'_, T>) {
        let n1 = y.len() as isize;
        let i1lo = self.max1.min(n1);
        // Cells are visited from the end backward so that every stencil read
        // lands on a cell that has not yet been overwritten.
        for i1 in (i1lo..n1).rev() {
            let mut yi = self.a0 * y[i1 as usize];
            for (&l1, &aj) in izip!(&self.lag1[1..], &self.a[1..]) {
                yi = yi + aj * y[(i1 - l1) as usize];
            }
            y[i1 as usize] = yi;
        }
        for i1 in (0..i1lo).rev() {
            let mut yi = self.a0 * y[i1 as usize];
            for (&l1, &aj) in izip!(&self.lag1[1..], &self.a[1..]) {
                let k1 = i1 - l1;
                if 0 <= k1 {
                    yi = yi + aj * y[k1 as usize];
                }
            }
            y[i1 as usize] = yi;
        }
    }

    /// Applies the transpose of this filter.
    ///
    /// Computes `y[i] = sum_j a[j] * x[i + lag1[j]]`, the anti-causal adjoint
    /// of [`apply`](Self::apply). The source and destination must have equal
    /// extents.
    pub fn apply_transpose(&self, x: ArrayView1<'_, T>, mut y: ArrayViewMut1<'_, T>) -> Result<()> {
        if x.dim() != y.dim() {
            return Err(Error::ShapeMismatch);
        }
        y.assign(&x);
        self.apply_transpose_in_place(y);
        Ok(())
    }

    /// Applies the transpose of this filter in place.
    pub fn apply_transpose_in_place(&self, mut y: ArrayViewMut1<'_, T>) {
        let n1 = y.len() as isize;
        let i1hi = (n1 - self.max1).max(0);
        for i1 in 0..i1hi {
            let mut yi = self.a0 * y[i1 as usize];
            for (&l1, &aj) in izip!(&self.lag1[1..], &self.a[1..]) {
                yi = yi + aj * y[(i1 + l1) as usize];
            }
            y[i1 as usize] = yi;
        }
        for i1 in i1hi..n1 {
            let mut yi = self.a0 * y[i1 as usize];
            for (&l1, &aj) in izip!(&self.lag1[1..], &self.a[1..]) {
                let k1 = i1 + l1;
                if k1 < n1 {
                    yi = yi + aj * y[k1 as usize];
                }
            }
            y[i1 as usize] = yi;
        }
    }

    /// Applies the inverse of this filter.
    ///
    /// Solves `A x = y` for `x` by causal recursion:
    /// `x[i] = (y[i] - sum_{j>=1} a[j] * x[i - lag1[j]]) / a[0]`. The inverse
    /// has infinite impulse response; it is stable only if this filter is
    /// minimum-phase. The source and destination must have equal extents.
    pub fn apply_inverse(&self, y: ArrayView1<'_, T>, mut x: ArrayViewMut1<'_, T>) -> Result<()> {
        if y.dim() != x.dim() {
            return Err(Error::ShapeMismatch);
        }
        x.assign(&y);
        self.apply_inverse_in_place(x);
        Ok(())
    }

    /// Applies the inverse of this filter in place.
    pub fn apply_inverse_in_place(&self, mut x: ArrayViewMut1<'_, T>) {
        let n1 = x.len() as isize;
        let i1lo = self.max1.min(n1);
        for i1 in 0..i1lo {
            let mut xi = x[i1 as usize];
            for (&l1, &aj) in izip!(&self.lag1[1..], &self.a[1..]) {
                let k1 = i1 - l1;
                if 0 <= k1 {
                    xi = xi - aj * x[k1 as usize];
                }
            }
            x[i1 as usize] = xi * self.a0i;
        }
        for i1 in i1lo..n1 {
            let mut xi = x[i1 as usize];
            for (&l1, &aj) in izip!(&self.lag1[1..], &self.a[1..]) {
                xi = xi - aj * x[(i1 - l1) as usize];
            }
            x[i1 as usize] = xi * self.a0i;
        }
    }

    /// Applies the inverse transpose of this filter.
    ///
    /// Solves `A' x = y` for `x` by anti-causal recursion, visiting cells in
    /// reverse order. The source and destination must have equal extents.
    pub fn apply_inverse_transpose(
        &self,
        y: ArrayView1<'_, T>,
        mut x: ArrayViewMut1<'_, T>,
    ) -> Result<()> {
        if y.dim() != x.dim() {
            return Err(Error::ShapeMismatch);
        }
        x.assign(&y);
        self.apply_inverse_transpose_in_place(x);
        Ok(())
    }

    /// Applies the inverse transpose of this filter in place.
    pub fn apply_inverse_transpose_in_place(&self, mut x: ArrayViewMut1<'_, T>) {
        let n1 = x.len() as isize;
        let i1hi = (n1 - self.max1).max(0);
        for i1 in (i1hi..n1).rev() {
            let mut xi = x[i1 as usize];
            for (&l1, &aj) in izip!(&self.lag1[1..], &self.a[1..]) {
                let k1 = i1 + l1;
                if k1 < n1 {
                    xi = xi - aj * x[k1 as usize];
                }
            }
            x[i1 as usize] = xi * self.a0i;
        }
        for i1 in (0..i1hi).rev() {
            let mut xi = x[i1 as usize];
            for (&l1, &aj) in izip!(&self.lag1[1..], &self.a[1..]) {
                xi = xi - aj * x[(i1 + l1) as usize];
            }
            x[i1 as usize] = xi * self.a0i;
        }
    }

    /// Wilson-Burg factorization for the specified 1-D auto-correlation.
    ///
    /// Replaces the coefficients of this filter using the iterative
    /// Wilson-Burg algorithm. If the algorithm converges, the impulse
    /// response of this filter cascaded with its transpose approximates the
    /// specified auto-correlation, and the filter is the minimum-phase factor
    /// of that auto-correlation on this filter's lag set.
    ///
    /// The auto-correlation `r` must have odd length; its middle sample is
    /// the zero lag and the other samples are symmetric about the middle.
    /// Iterations have converged when the squared change in every coefficient
    /// is at most `epsilon` times the zero-lag sample.
    ///
    /// On error the filter keeps the coefficients of the last iteration;
    /// callers that need a converged factor should discard the filter.
    pub fn factor_wilson_burg(
        &mut self,
        maxiter: usize,
        epsilon: T,
        r: ArrayView1<'_, T>,
    ) -> Result<()> {
        if r.len() % 2 != 1 {
            return Err(Error::AutocorrelationNotOdd);
        }

        // Maximum length of this filter's impulse response A. The workspace
        // pads the auto-correlation with 10 times that many zeros, because
        // 1/A' has infinite length and the padding bounds its truncation.
        let m1 = (self.max1 - self.min1) as usize;
        let n1 = r.len() + 10 * m1;

        // Indices of the zero lag before and after padding with zeros.
        let l1 = (r.len() - 1) / 2;
        if l1 as isize > self.max1 {
            return Err(Error::AutocorrelationTooLong);
        }
        let k1 = n1 - 1 - self.max1 as usize;

        // S is R padded with zeros to reduce truncation of R/(AA').
        let mut s = Array1::<T>::zeros(n1);
        let mut t = Array1::<T>::zeros(n1);
        let mut u = Array1::<T>::zeros(n1);
        s.slice_mut(s![k1 - l1..=k1 + l1]).assign(&r);

        // Initial factor is minimum-phase and matches lag zero of R.
        let s0 = s[k1];
        if !(s0 > T::zero()) || !s0.is_finite() {
            return Err(Error::ZeroLagDegenerate);
        }
        for aj in self.a.iter_mut() {
            *aj = T::zero();
        }
        self.a[0] = s0.sqrt();
        self.a0 = self.a[0];
        self.a0i = self.a0.recip();

        let eemax = s0 * epsilon;
        let mut converged = false;
        for niter in 0..maxiter {
            // U(z) + U(1/z) = 1 + S(z)/(A(z)*A(1/z))
            t.assign(&s);
            self.apply_inverse_transpose_in_place(t.view_mut());
            u.assign(&t);
            self.apply_inverse_in_place(u.view_mut());
            u[k1] = u[k1] + T::one();

            // U(z) is the causal part we want; zero the anti-causal part.
            u[k1] = u[k1] * T::from(0.5).unwrap();
            u.slice_mut(s![..k1]).fill(T::zero());

            // The new A(z) is T(z) = U(z)*A(z).
            t.assign(&u);
            self.apply_in_place(t.view_mut());
            converged = true;
            let mut change = T::zero();
            for (&lag, aj) in izip!(&self.lag1, &mut self.a) {
                let j1 = k1 as isize + lag;
                if 0 <= j1 && j1 < n1 as isize {
                    let anew = t[j1 as usize];
                    let e = *aj - anew;
                    if converged {
                        converged = e * e <= eemax;
                    }
                    change = change.max(e * e);
                    *aj = anew;
                }
            }
            self.a0 = self.a[0];
            self.a0i = self.a0.recip();
            if self.a0 == T::zero() || !self.a0.is_finite() {
                return Err(Error::ZeroLagDegenerate);
            }
            trace!(
                "wilson-burg 1-d iteration {}: max squared coefficient change {:e}",
                niter,
                change.to_f64().unwrap_or(f64::NAN)
            );
            if converged {
                break;
            }
        }
        if !converged {
            return Err(Error::NotConverged);
        }
        Ok(())
    }
}
