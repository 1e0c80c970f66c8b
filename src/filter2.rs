use crate::error::{Error, Result};
use crate::lags::{bounds, check_lags2, unit_impulse};
use itertools::izip;
use log::trace;
use ndarray::{s, Array2, ArrayView2, ArrayViewMut2};
use num_traits::{Float, ToPrimitive};

/// A 2-D causal filter that is linear and shift-invariant.
///
/// In two dimensions causal filters are also called non-symmetric half-plane
/// (NSHP) filters: the lag in the slower dimension must be non-negative, and
/// on the row of zero slow lag the fast lag must be strictly positive. Lags
/// in the fast dimension may be negative on rows with positive slow lag, so
/// the stencil covers half of the plane.
///
/// Buffers are indexed `[[i2, i1]]` with `i1` the fast dimension. Operator
/// and factorization contracts are as for [`CausalFilter1`], generalized to
/// the NSHP ordering.
///
/// [`CausalFilter1`]: crate::CausalFilter1
#[derive(Debug, Clone)]
pub struct CausalFilter2<T> {
    lag1: Vec<isize>,
    lag2: Vec<isize>,
    a: Vec<T>,
    a0: T,
    a0i: T,
    min1: isize,
    max1: isize,
    min2: isize,
    max2: isize,
}

impl<T: Float> CausalFilter2<T> {
    /// Creates a unit-impulse filter for the specified lags.
    ///
    /// See [`with_coefficients`](Self::with_coefficients) for the lag
    /// constraints.
    pub fn new(lag1: &[isize], lag2: &[isize]) -> Result<Self> {
        Self::with_coefficients(lag1, lag2, &unit_impulse(lag1.len()))
    }

    /// Creates a causal filter for the specified lags and coefficients.
    ///
    /// For `j = 0` only, `lag1[j]` and `lag2[j]` must be zero. All `lag2[j]`
    /// must be non-negative, and wherever `lag2[j]` is zero, `lag1[j]` must
    /// be strictly positive.
    pub fn with_coefficients(lag1: &[isize], lag2: &[isize], a: &[T]) -> Result<Self> {
        check_lags2(lag1, lag2, a.len())?;
        let (min1, max1) = bounds(lag1);
        let (min2, max2) = bounds(lag2);
        let a0 = a[0];
        Ok(CausalFilter2 {
            lag1: lag1.to_vec(),
            lag2: lag2.to_vec(),
            a: a.to_vec(),
            a0,
            a0i: a0.recip(),
            min1,
            max1,
            min2,
            max2,
        })
    }

    /// Returns the lags in the 1st (fast) dimension.
    pub fn lag1(&self) -> &[isize] {
        &self.lag1
    }

    /// Returns the lags in the 2nd (slow) dimension.
    pub fn lag2(&self) -> &[isize] {
        &self.lag2
    }

    /// Returns the filter coefficients.
    pub fn coefficients(&self) -> &[T] {
        &self.a
    }

    /// Applies this filter. Source and destination must have equal extents.
    pub fn apply(&self, x: ArrayView2<'_, T>, mut y: ArrayViewMut2<'_, T>) -> Result<()> {
        if x.dim() != y.dim() {
            return Err(Error::ShapeMismatch);
        }
        y.assign(&x);
        self.apply_in_place(y);
        Ok(())
    }

    /// Applies this filter in place.
    pub fn apply_in_place(&self, mut y: ArrayViewMut2<'_, T>) {
        let (n2, n1) = y.dim();
        let (n1, n2) = (n1 as isize, n2 as isize);
        let i1lo = self.max1.max(0);
        let i1hi = (n1 + self.min1).min(n1);
        let i2lo = if i1lo <= i1hi { self.max2.min(n2) } else { n2 };
        let taps = || izip!(&self.lag1[1..], &self.lag2[1..], &self.a[1..]);
        // Rows with every slow-lag read in range; within each row the three
        // segments need a guard only on the fast index, if at all.
        for i2 in (i2lo..n2).rev() {
            for i1 in (i1hi..n1).rev() {
                let mut yi = self.a0 * y[[i2 as usize, i1 as usize]];
                for (&l1, &l2, &aj) in taps() {
                    let k1 = i1 - l1;
                    let k2 = i2 - l2;
                    if k1 < n1 {
                        yi = yi + aj * y[[k2 as usize, k1 as usize]];
                    }
                }
                y[[i2 as usize, i1 as usize]] = yi;
            }
            for i1 in (i1lo..i1hi).rev() {
                let mut yi = self.a0 * y[[i2 as usize, i1 as usize]];
                for (&l1, &l2, &aj) in taps() {
                    let k1 = i1 - l1;
                    let k2 = i2 - l2;
                    yi = yi + aj * y[[k2 as usize, k1 as usize]];
                }
                y[[i2 as usize, i1 as usize]] = yi;
            }
            for i1 in (0..i1lo).rev() {
                let mut yi = self.a0 * y[[i2 as usize, i1 as usize]];
                for (&l1, &l2, &aj) in taps() {
                    let k1 = i1 - l1;
                    let k2 = i2 - l2;
                    if 0 <= k1 {
                        yi = yi + aj * y[[k2 as usize, k1 as usize]];
                    }
                }
                y[[i2 as usize, i1 as usize]] = yi;
            }
        }
        // Rows near the early edge of the slow dimension; every tap guarded.
        for i2 in (0..i2lo).rev() {
            for i1 in (0..n1).rev() {
                let mut yi = self.a0 * y[[i2 as usize, i1 as usize]];
                for (&l1, &l2, &aj) in taps() {
                    let k1 = i1 - l1;
                    let k2 = i2 - l2;
                    if 0 <= k1 && k1 < n1 && 0 <= k2 {
                        yi = yi + aj * y[[k2 as usize, k1 as usize]];
                    }
                }
                y[[i2 as usize, i1 as usize]] = yi;
            }
        }
    }

    /// Applies the transpose of this filter. Source and destination must
    /// have equal extents.
    pub fn apply_transpose(&self, x: ArrayView2<'_, T>, mut y: ArrayViewMut2<'_, T>) -> Result<()> {
        if x.dim() != y.dim() {
            return Err(Error::ShapeMismatch);
        }
        y.assign(&x);
        self.apply_transpose_in_place(y);
        Ok(())
    }

    /// Applies the transpose of this filter in place.
    pub fn apply_transpose_in_place(&self, mut y: ArrayViewMut2<'_, T>) {
        let (n2, n1) = y.dim();
        let (n1, n2) = (n1 as isize, n2 as isize);
        let i1lo = (-self.min1).max(0);
        let i1hi = (n1 - self.max1).min(n1);
        let i2hi = if i1lo <= i1hi { (n2 - self.max2).max(0) } else { 0 };
        let taps = || izip!(&self.lag1[1..], &self.lag2[1..], &self.a[1..]);
        for i2 in 0..i2hi {
            for i1 in 0..i1lo {
                let mut yi = self.a0 * y[[i2 as usize, i1 as usize]];
                for (&l1, &l2, &aj) in taps() {
                    let k1 = i1 + l1;
                    let k2 = i2 + l2;
                    if 0 <= k1 {
                        yi = yi + aj * y[[k2 as usize, k1 as usize]];
                    }
                }
                y[[i2 as usize, i1 as usize]] = yi;
            }
            for i1 in i1lo..i1hi {
                let mut yi = self.a0 * y[[i2 as usize, i1 as usize]];
                for (&l1, &l2, &aj) in taps() {
                    let k1 = i1 + l1;
                    let k2 = i2 + l2;
                    yi = yi + aj * y[[k2 as usize, k1 as usize]];
                }
                y[[i2 as usize, i1 as usize]] = yi;
            }
            for i1 in i1hi..n1 {
                let mut yi = self.a0 * y[[i2 as usize, i1 as usize]];
                for (&l1, &l2, &aj) in taps() {
                    let k1 = i1 + l1;
                    let k2 = i2 + l2;
                    if k1 < n1 {
                        yi = yi + aj * y[[k2 as usize, k1 as usize]];
                    }
                }
                y[[i2 as usize, i1 as usize]] = yi;
            }
        }
        for i2 in i2hi..n2 {
            for i1 in 0..n1 {
                let mut yi = self.a0 * y[[i2 as usize, i1 as usize]];
                for (&l1, &l2, &aj) in taps() {
                    let k1 = i1 + l1;
                    let k2 = i2 + l2;
                    if 0 <= k1 && k1 < n1 && k2 < n2 {
                        yi = yi + aj * y[[k2 as usize, k1 as usize]];
                    }
                }
                y[[i2 as usize, i1 as usize]] = yi;
            }
        }
    }

    /// Applies the inverse of this filter. Source and destination must have
    /// equal extents. Stable only if this filter is minimum-phase.
    pub fn apply_inverse(&self, y: ArrayView2<'_, T>, mut x: ArrayViewMut2<'_, T>) -> Result<()> {
        if y.dim() != x.dim() {
            return Err(Error::ShapeMismatch);
        }
        x.assign(&y);
        self.apply_inverse_in_place(x);
        Ok(())
    }

    /// Applies the inverse of this filter in place.
    pub fn apply_inverse_in_place(&self, mut x: ArrayViewMut2<'_, T>) {
        let (n2, n1) = x.dim();
        let (n1, n2) = (n1 as isize, n2 as isize);
        let i1lo = self.max1.min(n1);
        let i1hi = (n1 + self.min1).min(n1);
        let i2lo = if i1lo <= i1hi { self.max2.min(n2) } else { n2 };
        let taps = || izip!(&self.lag1[1..], &self.lag2[1..], &self.a[1..]);
        for i2 in 0..i2lo {
            for i1 in 0..n1 {
                let mut xi = x[[i2 as usize, i1 as usize]];
                for (&l1, &l2, &aj) in taps() {
                    let k1 = i1 - l1;
                    let k2 = i2 - l2;
                    if 0 <= k1 && k1 < n1 && 0 <= k2 {
                        xi = xi - aj * x[[k2 as usize, k1 as usize]];
                    }
                }
                x[[i2 as usize, i1 as usize]] = xi * self.a0i;
            }
        }
        for i2 in i2lo..n2 {
            for i1 in 0..i1lo {
                let mut xi = x[[i2 as usize, i1 as usize]];
                for (&l1, &l2, &aj) in taps() {
                    let k1 = i1 - l1;
                    let k2 = i2 - l2;
                    if 0 <= k1 {
                        xi = xi - aj * x[[k2 as usize, k1 as usize]];
                    }
                }
                x[[i2 as usize, i1 as usize]] = xi * self.a0i;
            }
            for i1 in i1lo..i1hi {
                let mut xi = x[[i2 as usize, i1 as usize]];
                for (&l1, &l2, &aj) in taps() {
                    let k1 = i1 - l1;
                    let k2 = i2 - l2;
                    xi = xi - aj * x[[k2 as usize, k1 as usize]];
                }
                x[[i2 as usize, i1 as usize]] = xi * self.a0i;
            }
            for i1 in i1hi..n1 {
                let mut xi = x[[i2 as usize, i1 as usize]];
                for (&l1, &l2, &aj) in taps() {
                    let k1 = i1 - l1;
                    let k2 = i2 - l2;
                    if k1 < n1 {
                        xi = xi - aj * x[[k2 as usize, k1 as usize]];
                    }
                }
                x[[i2 as usize, i1 as usize]] = xi * self.a0i;
            }
        }
    }

    /// Applies the inverse transpose of this filter. Source and destination
    /// must have equal extents.
    pub fn apply_inverse_transpose(
        &self,
        y: ArrayView2<'_, T>,
        mut x: ArrayViewMut2<'_, T>,
    ) -> Result<()> {
        if y.dim() != x.dim() {
            return Err(Error::ShapeMismatch);
        }
        x.assign(&y);
        self.apply_inverse_transpose_in_place(x);
        Ok(())
    }

    /// Applies the inverse transpose of this filter in place.
    pub fn apply_inverse_transpose_in_place(&self, mut x: ArrayViewMut2<'_, T>) {
        let (n2, n1) = x.dim();
        let (n1, n2) = (n1 as isize, n2 as isize);
        let i1lo = (-self.min1).max(0);
        let i1hi = (n1 - self.max1).min(n1);
        let i2hi = if i1lo <= i1hi { (n2 - self.max2).max(0) } else { 0 };
        let taps = || izip!(&self.lag1[1..], &self.lag2[1..], &self.a[1..]);
        for i2 in (i2hi..n2).rev() {
            for i1 in (0..n1).rev() {
                let mut xi = x[[i2 as usize, i1 as usize]];
                for (&l1, &l2, &aj) in taps() {
                    let k1 = i1 + l1;
                    let k2 = i2 + l2;
                    if 0 <= k1 && k1 < n1 && k2 < n2 {
                        xi = xi - aj * x[[k2 as usize, k1 as usize]];
                    }
                }
                x[[i2 as usize, i1 as usize]] = xi * self.a0i;
            }
        }
        for i2 in (0..i2hi).rev() {
            for i1 in (i1hi..n1).rev() {
                let mut xi = x[[i2 as usize, i1 as usize]];
                for (&l1, &l2, &aj) in taps() {
                    let k1 = i1 + l1;
                    let k2 = i2 + l2;
                    if k1 < n1 {
                        xi = xi - aj * x[[k2 as usize, k1 as usize]];
                    }
                }
                x[[i2 as usize, i1 as usize]] = xi * self.a0i;
            }
            for i1 in (i1lo..i1hi).rev() {
                let mut xi = x[[i2 as usize, i1 as usize]];
                for (&l1, &l2, &aj) in taps() {
                    let k1 = i1 + l1;
                    let k2 = i2 + l2;
                    xi = xi - aj * x[[k2 as usize, k1 as usize]];
                }
                x[[i2 as usize, i1 as usize]] = xi * self.a0i;
            }
            for i1 in (0..i1lo).rev() {
                let mut xi = x[[i2 as usize, i1 as usize]];
                for (&l1, &l2, &aj) in taps() {
                    let k1 = i1 + l1;
                    let k2 = i2 + l2;
                    if 0 <= k1 {
                        xi = xi - aj * x[[k2 as usize, k1 as usize]];
                    }
                }
                x[[i2 as usize, i1 as usize]] = xi * self.a0i;
            }
        }
    }

    /// Wilson-Burg factorization for the specified 2-D auto-correlation.
    ///
    /// Replaces the coefficients of this filter so that, on convergence, the
    /// filter cascaded with its transpose approximates `r`. Both extents of
    /// `r` must be odd; its center sample is the zero lag. See
    /// [`CausalFilter1::factor_wilson_burg`] for the convergence criterion
    /// and failure behavior.
    ///
    /// [`CausalFilter1::factor_wilson_burg`]: crate::CausalFilter1::factor_wilson_burg
    pub fn factor_wilson_burg(
        &mut self,
        maxiter: usize,
        epsilon: T,
        r: ArrayView2<'_, T>,
    ) -> Result<()> {
        let (r2, r1) = r.dim();
        if r1 % 2 != 1 || r2 % 2 != 1 {
            return Err(Error::AutocorrelationNotOdd);
        }

        // Workspace extents: the auto-correlation padded with 10 times the
        // stencil extent in zeros, bounding the truncation of the infinite
        // inverse impulse response.
        let m1 = (self.max1 - self.min1) as usize;
        let m2 = (self.max2 - self.min2) as usize;
        let n1 = r1 + 10 * m1;
        let n2 = r2 + 10 * m2;

        // Indices of the zero lag before and after padding with zeros.
        let l1 = (r1 - 1) / 2;
        let l2 = (r2 - 1) / 2;
        if l1 as isize > self.max1 || l2 as isize > self.max2 {
            return Err(Error::AutocorrelationTooLong);
        }
        let k1 = n1 - 1 - self.max1 as usize;
        let k2 = n2 - 1 - self.max2 as usize;

        // S is R padded with zeros to reduce truncation of R/(AA').
        let mut s = Array2::<T>::zeros((n2, n1));
        let mut t = Array2::<T>::zeros((n2, n1));
        let mut u = Array2::<T>::zeros((n2, n1));
        s.slice_mut(s![k2 - l2..=k2 + l2, k1 - l1..=k1 + l1])
            .assign(&r);

        // Initial factor is minimum-phase and matches lag zero of R.
        let s0 = s[[k2, k1]];
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
            u[[k2, k1]] = u[[k2, k1]] + T::one();

            // U(z) is the causal part we want; zero the anti-causal part:
            // all rows strictly before the zero lag, then the early part of
            // the zero-lag row.
            u[[k2, k1]] = u[[k2, k1]] * T::from(0.5).unwrap();
            u.slice_mut(s![..k2, ..]).fill(T::zero());
            u.slice_mut(s![k2, ..k1]).fill(T::zero());

            // The new A(z) is T(z) = U(z)*A(z).
            t.assign(&u);
            self.apply_in_place(t.view_mut());
            converged = true;
            let mut change = T::zero();
            for (&l1j, &l2j, aj) in izip!(&self.lag1, &self.lag2, &mut self.a) {
                let j1 = k1 as isize + l1j;
                let j2 = k2 as isize + l2j;
                if 0 <= j1 && j1 < n1 as isize && 0 <= j2 && j2 < n2 as isize {
                    let anew = t[[j2 as usize, j1 as usize]];
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
                "wilson-burg 2-d iteration {}: max squared coefficient change {:e}",
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
