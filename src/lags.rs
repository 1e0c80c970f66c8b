use crate::error::{Error, Result};
use itertools::izip;
use num_traits::Float;

// Unit-impulse coefficients: one at the zero lag, zero elsewhere.
pub(crate) fn unit_impulse<T: Float>(n: usize) -> Vec<T> {
    let mut a = vec![T::zero(); n];
    if let Some(a0) = a.first_mut() {
        *a0 = T::one();
    }
    a
}

// Check a 1-D lag table against the NSHP causality ordering: the first lag
// is zero and every other lag is strictly positive.
pub(crate) fn check_lags1(lag1: &[isize], ncoeff: usize) -> Result<()> {
    if lag1.is_empty() {
        return Err(Error::LagsEmpty);
    }
    if lag1.len() != ncoeff {
        return Err(Error::LagLengthMismatch);
    }
    if lag1[0] != 0 {
        return Err(Error::FirstLagNotZero);
    }
    for (index, &l1) in lag1.iter().enumerate().skip(1) {
        if l1 <= 0 {
            return Err(Error::NonCausalLag { index });
        }
    }
    Ok(())
}

// Check a 2-D lag table. The first lag is zero in both dimensions; for the
// others lag2 must be non-negative, and wherever lag2 is zero, lag1 must be
// strictly positive.
pub(crate) fn check_lags2(lag1: &[isize], lag2: &[isize], ncoeff: usize) -> Result<()> {
    if lag1.is_empty() {
        return Err(Error::LagsEmpty);
    }
    if lag1.len() != ncoeff || lag2.len() != ncoeff {
        return Err(Error::LagLengthMismatch);
    }
    if lag1[0] != 0 || lag2[0] != 0 {
        return Err(Error::FirstLagNotZero);
    }
    for (index, (&l1, &l2)) in izip!(lag1, lag2).enumerate().skip(1) {
        if l2 < 0 || (l2 == 0 && l1 <= 0) {
            return Err(Error::NonCausalLag { index });
        }
    }
    Ok(())
}

// Check a 3-D lag table. The first lag is zero in all dimensions; for the
// others lag3 must be non-negative, wherever lag3 is zero lag2 must be
// non-negative, and wherever both are zero lag1 must be strictly positive.
pub(crate) fn check_lags3(
    lag1: &[isize],
    lag2: &[isize],
    lag3: &[isize],
    ncoeff: usize,
) -> Result<()> {
    if lag1.is_empty() {
        return Err(Error::LagsEmpty);
    }
    if lag1.len() != ncoeff || lag2.len() != ncoeff || lag3.len() != ncoeff {
        return Err(Error::LagLengthMismatch);
    }
    if lag1[0] != 0 || lag2[0] != 0 || lag3[0] != 0 {
        return Err(Error::FirstLagNotZero);
    }
    for (index, (&l1, &l2, &l3)) in izip!(lag1, lag2, lag3).enumerate().skip(1) {
        let causal = l3 > 0 || (l3 == 0 && (l2 > 0 || (l2 == 0 && l1 > 0)));
        if !causal {
            return Err(Error::NonCausalLag { index });
        }
    }
    Ok(())
}

// Minimum and maximum of a non-empty lag array.
pub(crate) fn bounds(lags: &[isize]) -> (isize, isize) {
    lags.iter()
        .fold((lags[0], lags[0]), |(lo, hi), &l| (lo.min(l), hi.max(l)))
}
