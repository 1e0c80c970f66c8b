use ndarray::{array, Array1, Array2, Array3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wilson_burg::{error::Error, CausalFilter1, CausalFilter2, CausalFilter3};

fn random_array1(rng: &mut StdRng, n1: usize) -> Array1<f64> {
    Array1::from_shape_fn(n1, |_| rng.gen_range(-1.0..1.0))
}

fn random_array2(rng: &mut StdRng, n2: usize, n1: usize) -> Array2<f64> {
    Array2::from_shape_fn((n2, n1), |_| rng.gen_range(-1.0..1.0))
}

fn random_array3(rng: &mut StdRng, n3: usize, n2: usize, n1: usize) -> Array3<f64> {
    Array3::from_shape_fn((n3, n2, n1), |_| rng.gen_range(-1.0..1.0))
}

// A stable 3-D stencil with 8 NSHP-valid lags drawn at random. The zero-lag
// coefficient dominates the others, so the inverse recursion does not blow
// up.
fn random_filter3(rng: &mut StdRng) -> CausalFilter3<f64> {
    let mut lag1 = vec![0isize];
    let mut lag2 = vec![0isize];
    let mut lag3 = vec![0isize];
    let mut a = vec![1.0];
    for _ in 1..8 {
        let l3 = rng.gen_range(0..=2isize);
        let l2 = if l3 == 0 {
            rng.gen_range(0..=2isize)
        } else {
            rng.gen_range(-2..=2isize)
        };
        let l1 = if l3 == 0 && l2 == 0 {
            rng.gen_range(1..=2isize)
        } else {
            rng.gen_range(-2..=2isize)
        };
        lag1.push(l1);
        lag2.push(l2);
        lag3.push(l3);
        a.push(rng.gen_range(-0.1..0.1));
    }
    CausalFilter3::with_coefficients(&lag1, &lag2, &lag3, &a).unwrap()
}

#[test]
fn unit_impulse_is_identity_1d() {
    let filter = CausalFilter1::with_coefficients(&[0], &[1.0]).unwrap();
    let x = array![1.0, 2.0, 3.0, 4.0];
    let mut y = Array1::zeros(4);
    filter.apply(x.view(), y.view_mut()).unwrap();
    assert_eq!(y, x);
    filter.apply_transpose(x.view(), y.view_mut()).unwrap();
    assert_eq!(y, x);
    filter.apply_inverse(x.view(), y.view_mut()).unwrap();
    assert_eq!(y, x);
    filter.apply_inverse_transpose(x.view(), y.view_mut()).unwrap();
    assert_eq!(y, x);
}

#[test]
fn unit_impulse_is_identity_2d_3d() {
    let mut rng = StdRng::seed_from_u64(7);
    let x2 = random_array2(&mut rng, 5, 6);
    let filter2 = CausalFilter2::new(&[0], &[0]).unwrap();
    let mut y2 = x2.clone();
    filter2.apply_in_place(y2.view_mut());
    filter2.apply_transpose_in_place(y2.view_mut());
    filter2.apply_inverse_in_place(y2.view_mut());
    filter2.apply_inverse_transpose_in_place(y2.view_mut());
    assert_eq!(y2, x2);

    let x3 = random_array3(&mut rng, 4, 5, 6);
    let filter3 = CausalFilter3::new(&[0], &[0], &[0]).unwrap();
    let mut y3 = x3.clone();
    filter3.apply_in_place(y3.view_mut());
    filter3.apply_transpose_in_place(y3.view_mut());
    filter3.apply_inverse_in_place(y3.view_mut());
    filter3.apply_inverse_transpose_in_place(y3.view_mut());
    assert_eq!(y3, x3);
}

#[test]
fn two_tap_apply_and_inverse_1d() {
    let filter = CausalFilter1::with_coefficients(&[0, 1], &[1.0, -0.5]).unwrap();
    let x = array![1.0, 0.0, 0.0, 0.0];
    let mut y = Array1::zeros(4);
    filter.apply(x.view(), y.view_mut()).unwrap();
    assert_eq!(y, array![1.0, -0.5, 0.0, 0.0]);
    filter.apply_inverse(x.view(), y.view_mut()).unwrap();
    assert_eq!(y, array![1.0, 0.5, 0.25, 0.125]);
}

#[test]
fn two_tap_transpose_1d() {
    let filter = CausalFilter1::with_coefficients(&[0, 1], &[1.0, -0.5]).unwrap();
    let x = array![0.0, 0.0, 0.0, 1.0];
    let mut y = Array1::zeros(4);
    filter.apply_transpose(x.view(), y.view_mut()).unwrap();
    assert_eq!(y, array![0.0, 0.0, -0.5, 1.0]);
}

#[test]
fn impulse_support_matches_lags_1d() {
    let filter = CausalFilter1::with_coefficients(&[0, 1, 3], &[1.0, -0.4, 0.2]).unwrap();
    let mut y = Array1::zeros(8);
    y[0] = 1.0;
    filter.apply_in_place(y.view_mut());
    assert_eq!(y, array![1.0, -0.4, 0.0, 0.2, 0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn impulse_near_edge_does_not_wrap_1d() {
    let filter = CausalFilter1::with_coefficients(&[0, 1, 3], &[1.0, -0.4, 0.2]).unwrap();
    let mut y = Array1::zeros(8);
    y[7] = 1.0;
    filter.apply_in_place(y.view_mut());
    assert_eq!(y, array![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    // the transpose spreads toward earlier samples only
    let mut y = Array1::zeros(8);
    y[0] = 1.0;
    filter.apply_transpose_in_place(y.view_mut());
    assert_eq!(y, array![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn impulse_support_matches_lags_2d() {
    let filter =
        CausalFilter2::with_coefficients(&[0, 1, 0, 1], &[0, 0, 1, 1], &[1.0, -0.25, -0.25, 0.1])
            .unwrap();
    let mut y = Array2::zeros((8, 8));
    y[[4, 3]] = 1.0;
    filter.apply_in_place(y.view_mut());
    let mut expected = Array2::zeros((8, 8));
    expected[[4, 3]] = 1.0;
    expected[[4, 4]] = -0.25;
    expected[[5, 3]] = -0.25;
    expected[[5, 4]] = 0.1;
    assert_eq!(y, expected);
}

#[test]
fn half_plane_stencil_reaches_negative_fast_lags_2d() {
    // (-1, 1) is a valid NSHP lag: one row later, one column earlier
    let filter = CausalFilter2::with_coefficients(&[0, -1], &[0, 1], &[1.0, 0.5]).unwrap();
    let mut y = Array2::zeros((4, 4));
    y[[1, 2]] = 1.0;
    filter.apply_in_place(y.view_mut());
    let mut expected = Array2::zeros((4, 4));
    expected[[1, 2]] = 1.0;
    expected[[2, 1]] = 0.5;
    assert_eq!(y, expected);
}

#[test]
fn causal_output_keeps_zero_prefix_1d() {
    let mut rng = StdRng::seed_from_u64(11);
    let filter = CausalFilter1::with_coefficients(&[0, 1, 3], &[1.0, -0.4, 0.2]).unwrap();
    let mut x = random_array1(&mut rng, 32);
    for i1 in 0..10 {
        x[i1] = 0.0;
    }
    filter.apply_in_place(x.view_mut());
    for i1 in 0..10 {
        assert_eq!(x[i1], 0.0);
    }
}

#[test]
fn adjoint_identity_1d() {
    let mut rng = StdRng::seed_from_u64(13);
    let filter = CausalFilter1::with_coefficients(&[0, 1, 2, 5], &[1.0, -0.6, 0.3, 0.1]).unwrap();
    let x = random_array1(&mut rng, 40);
    let y = random_array1(&mut rng, 40);
    let mut ax = Array1::zeros(40);
    let mut aty = Array1::zeros(40);
    filter.apply(x.view(), ax.view_mut()).unwrap();
    filter.apply_transpose(y.view(), aty.view_mut()).unwrap();
    let lhs: f64 = ax.iter().zip(y.iter()).map(|(a, b)| a * b).sum();
    let rhs: f64 = x.iter().zip(aty.iter()).map(|(a, b)| a * b).sum();
    assert!((lhs - rhs).abs() <= 1e-12 * lhs.abs().max(rhs.abs()).max(1.0));
}

#[test]
fn adjoint_identity_2d() {
    let mut rng = StdRng::seed_from_u64(17);
    let filter = CausalFilter2::with_coefficients(
        &[0, 1, -1, 0, 1],
        &[0, 0, 1, 1, 1],
        &[1.0, -0.3, 0.2, -0.25, 0.15],
    )
    .unwrap();
    let x = random_array2(&mut rng, 12, 9);
    let y = random_array2(&mut rng, 12, 9);
    let mut ax = Array2::zeros((12, 9));
    let mut aty = Array2::zeros((12, 9));
    filter.apply(x.view(), ax.view_mut()).unwrap();
    filter.apply_transpose(y.view(), aty.view_mut()).unwrap();
    let lhs: f64 = ax.iter().zip(y.iter()).map(|(a, b)| a * b).sum();
    let rhs: f64 = x.iter().zip(aty.iter()).map(|(a, b)| a * b).sum();
    assert!((lhs - rhs).abs() <= 1e-12 * lhs.abs().max(rhs.abs()).max(1.0));
}

#[test]
fn adjoint_identity_3d() {
    let mut rng = StdRng::seed_from_u64(19);
    let filter = random_filter3(&mut rng);
    let x = random_array3(&mut rng, 7, 8, 9);
    let y = random_array3(&mut rng, 7, 8, 9);
    let mut ax = Array3::zeros((7, 8, 9));
    let mut aty = Array3::zeros((7, 8, 9));
    filter.apply(x.view(), ax.view_mut()).unwrap();
    filter.apply_transpose(y.view(), aty.view_mut()).unwrap();
    let lhs: f64 = ax.iter().zip(y.iter()).map(|(a, b)| a * b).sum();
    let rhs: f64 = x.iter().zip(aty.iter()).map(|(a, b)| a * b).sum();
    assert!((lhs - rhs).abs() <= 1e-12 * lhs.abs().max(rhs.abs()).max(1.0));
}

#[test]
fn in_place_matches_two_buffer_1d() {
    let mut rng = StdRng::seed_from_u64(23);
    let filter = CausalFilter1::with_coefficients(&[0, 1, 4], &[1.0, -0.5, 0.25]).unwrap();
    let x = random_array1(&mut rng, 25);

    let mut separate = Array1::zeros(25);
    let mut aliased = x.clone();
    filter.apply(x.view(), separate.view_mut()).unwrap();
    filter.apply_in_place(aliased.view_mut());
    assert_eq!(separate, aliased);

    let mut separate = Array1::zeros(25);
    let mut aliased = x.clone();
    filter.apply_transpose(x.view(), separate.view_mut()).unwrap();
    filter.apply_transpose_in_place(aliased.view_mut());
    assert_eq!(separate, aliased);

    let mut separate = Array1::zeros(25);
    let mut aliased = x.clone();
    filter.apply_inverse(x.view(), separate.view_mut()).unwrap();
    filter.apply_inverse_in_place(aliased.view_mut());
    assert_eq!(separate, aliased);

    let mut separate = Array1::zeros(25);
    let mut aliased = x.clone();
    filter
        .apply_inverse_transpose(x.view(), separate.view_mut())
        .unwrap();
    filter.apply_inverse_transpose_in_place(aliased.view_mut());
    assert_eq!(separate, aliased);
}

#[test]
fn in_place_matches_two_buffer_2d() {
    let mut rng = StdRng::seed_from_u64(29);
    let filter = CausalFilter2::with_coefficients(
        &[0, 1, -1, 0],
        &[0, 0, 1, 1],
        &[1.0, -0.4, 0.2, -0.3],
    )
    .unwrap();
    let x = random_array2(&mut rng, 10, 11);

    let mut separate = Array2::zeros((10, 11));
    let mut aliased = x.clone();
    filter.apply(x.view(), separate.view_mut()).unwrap();
    filter.apply_in_place(aliased.view_mut());
    assert_eq!(separate, aliased);

    let mut separate = Array2::zeros((10, 11));
    let mut aliased = x.clone();
    filter.apply_transpose(x.view(), separate.view_mut()).unwrap();
    filter.apply_transpose_in_place(aliased.view_mut());
    assert_eq!(separate, aliased);

    let mut separate = Array2::zeros((10, 11));
    let mut aliased = x.clone();
    filter.apply_inverse(x.view(), separate.view_mut()).unwrap();
    filter.apply_inverse_in_place(aliased.view_mut());
    assert_eq!(separate, aliased);

    let mut separate = Array2::zeros((10, 11));
    let mut aliased = x.clone();
    filter
        .apply_inverse_transpose(x.view(), separate.view_mut())
        .unwrap();
    filter.apply_inverse_transpose_in_place(aliased.view_mut());
    assert_eq!(separate, aliased);
}

#[test]
fn in_place_matches_two_buffer_3d() {
    let mut rng = StdRng::seed_from_u64(31);
    let filter = random_filter3(&mut rng);
    let x = random_array3(&mut rng, 6, 7, 8);

    let mut separate = Array3::zeros((6, 7, 8));
    let mut aliased = x.clone();
    filter.apply(x.view(), separate.view_mut()).unwrap();
    filter.apply_in_place(aliased.view_mut());
    assert_eq!(separate, aliased);

    let mut separate = Array3::zeros((6, 7, 8));
    let mut aliased = x.clone();
    filter.apply_transpose(x.view(), separate.view_mut()).unwrap();
    filter.apply_transpose_in_place(aliased.view_mut());
    assert_eq!(separate, aliased);

    let mut separate = Array3::zeros((6, 7, 8));
    let mut aliased = x.clone();
    filter.apply_inverse(x.view(), separate.view_mut()).unwrap();
    filter.apply_inverse_in_place(aliased.view_mut());
    assert_eq!(separate, aliased);

    let mut separate = Array3::zeros((6, 7, 8));
    let mut aliased = x.clone();
    filter
        .apply_inverse_transpose(x.view(), separate.view_mut())
        .unwrap();
    filter.apply_inverse_transpose_in_place(aliased.view_mut());
    assert_eq!(separate, aliased);
}

#[test]
fn forward_then_inverse_round_trip_1d() {
    let mut rng = StdRng::seed_from_u64(37);
    let filter = CausalFilter1::with_coefficients(&[0, 1, 2], &[1.0, -0.5, 0.1]).unwrap();
    let x = random_array1(&mut rng, 50);
    let mut y = x.clone();
    filter.apply_in_place(y.view_mut());
    filter.apply_inverse_in_place(y.view_mut());
    for (a, b) in y.iter().zip(x.iter()) {
        assert!((a - b).abs() < 1e-12);
    }
    let mut y = x.clone();
    filter.apply_transpose_in_place(y.view_mut());
    filter.apply_inverse_transpose_in_place(y.view_mut());
    for (a, b) in y.iter().zip(x.iter()) {
        assert!((a - b).abs() < 1e-12);
    }
}

#[test]
fn forward_then_inverse_round_trip_2d() {
    let mut rng = StdRng::seed_from_u64(41);
    let filter = CausalFilter2::with_coefficients(
        &[0, 1, -1, 0, 1],
        &[0, 0, 1, 1, 1],
        &[1.0, -0.2, 0.1, -0.15, 0.05],
    )
    .unwrap();
    let x = random_array2(&mut rng, 14, 13);
    let mut y = x.clone();
    filter.apply_in_place(y.view_mut());
    filter.apply_inverse_in_place(y.view_mut());
    for (a, b) in y.iter().zip(x.iter()) {
        assert!((a - b).abs() < 1e-10);
    }
    let mut y = x.clone();
    filter.apply_inverse_transpose_in_place(y.view_mut());
    filter.apply_transpose_in_place(y.view_mut());
    for (a, b) in y.iter().zip(x.iter()) {
        assert!((a - b).abs() < 1e-10);
    }
}

// Forward then inverse on a 16x16x16 grid with a random valid 3-D stencil of
// size 8; the recursion must reconstruct the input everywhere.
#[test]
fn forward_then_inverse_round_trip_3d() {
    let mut rng = StdRng::seed_from_u64(43);
    let filter = random_filter3(&mut rng);
    let x = random_array3(&mut rng, 16, 16, 16);
    let mut y = x.clone();
    filter.apply_in_place(y.view_mut());
    filter.apply_inverse_in_place(y.view_mut());
    let mut max_err = 0.0f64;
    for (a, b) in y.iter().zip(x.iter()) {
        max_err = max_err.max((a - b).abs());
    }
    assert!(max_err < 1e-5, "max error {max_err:e}");
}

#[test]
fn accessors_return_construction_values() {
    let filter =
        CausalFilter2::with_coefficients(&[0, 1, 0], &[0, 0, 1], &[1.0, -0.25, -0.25]).unwrap();
    assert_eq!(filter.lag1(), &[0, 1, 0]);
    assert_eq!(filter.lag2(), &[0, 0, 1]);
    assert_eq!(filter.coefficients(), &[1.0, -0.25, -0.25]);
}

#[test]
fn shape_mismatch_is_reported() {
    let filter = CausalFilter1::with_coefficients(&[0, 1], &[1.0, -0.5]).unwrap();
    let x = Array1::<f64>::zeros(4);
    let mut y = Array1::<f64>::zeros(5);
    assert!(matches!(
        filter.apply(x.view(), y.view_mut()),
        Err(Error::ShapeMismatch)
    ));
    assert!(matches!(
        filter.apply_inverse(x.view(), y.view_mut()),
        Err(Error::ShapeMismatch)
    ));
}

#[test]
fn constructors_validate_lags() {
    assert!(matches!(
        CausalFilter1::<f64>::new(&[]),
        Err(Error::LagsEmpty)
    ));
    assert!(matches!(
        CausalFilter1::with_coefficients(&[0, 1], &[1.0]),
        Err(Error::LagLengthMismatch)
    ));
    assert!(matches!(
        CausalFilter1::with_coefficients(&[1, 2], &[1.0, 0.5]),
        Err(Error::FirstLagNotZero)
    ));
    assert!(matches!(
        CausalFilter1::with_coefficients(&[0, -1], &[1.0, 0.5]),
        Err(Error::NonCausalLag { index: 1 })
    ));
    assert!(matches!(
        CausalFilter2::with_coefficients(&[0, 1], &[0, -1], &[1.0, 0.5]),
        Err(Error::NonCausalLag { index: 1 })
    ));
    assert!(matches!(
        CausalFilter3::with_coefficients(&[0, 1], &[0, 0], &[0, -1], &[1.0, 0.5]),
        Err(Error::NonCausalLag { index: 1 })
    ));
}
