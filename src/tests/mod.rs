mod pdi;

use crate::config::{C, F, I};
use ndarray::prelude::*;
use ndarray::Zip;

/// Максимум модуля разности двух комплексных массивов
pub(crate) fn max_abs_diff_c(a: &Array2<C>, b: &Array2<C>) -> F {
    Zip::from(a)
        .and(b)
        .fold(0.0, |acc: F, x, y| acc.max((x - y).norm()))
}

/// Максимум модуля разности двух вещественных массивов
pub(crate) fn max_abs_diff(a: &Array2<F>, b: &Array2<F>) -> F {
    Zip::from(a)
        .and(b)
        .fold(0.0, |acc: F, x, y| acc.max((x - y).abs()))
}

/// Детерминированное гладкое комплексное поле для проверок распространения
pub(crate) fn test_field(n: usize) -> Array2<C> {
    Array2::from_shape_fn((n, n), |(iy, ix)| {
        let (x, y) = (ix as F / n as F, iy as F / n as F);
        (1.0 + 0.5 * (3.0 * x).sin() * (2.0 * y).cos()) * (I * (4.0 * x * x - 2.5 * y)).exp()
    })
}
