use super::jacobi::{jacobi, jacobi_sequence, jacobi_value};
use crate::config::F;
use ndarray::prelude::*;

/// Полином Чебышёва первого рода порядка `n`, `T_n(1) = 1`
pub fn cheby1(n: usize, x: &Array1<F>) -> Array1<F> {
    let c = 1.0 / jacobi_value(n, -0.5, -0.5, 1.0);
    jacobi(n, -0.5, -0.5, x) * c
}

/// Полиномы Чебышёва первого рода порядков `ns`; быстрее, чем `cheby1` в цикле
pub fn cheby1_sequence(ns: &[usize], x: &Array1<F>) -> Vec<Array1<F>> {
    jacobi_sequence(ns, -0.5, -0.5, x)
        .into_iter()
        .zip(ns.iter())
        .map(|(p, &n)| p / jacobi_value(n, -0.5, -0.5, 1.0))
        .collect()
}

/// Полином Чебышёва второго рода порядка `n`, `U_n(1) = n + 1`
pub fn cheby2(n: usize, x: &Array1<F>) -> Array1<F> {
    let c = (n + 1) as F / jacobi_value(n, 0.5, 0.5, 1.0);
    jacobi(n, 0.5, 0.5, x) * c
}

/// Полиномы Чебышёва второго рода порядков `ns`
pub fn cheby2_sequence(ns: &[usize], x: &Array1<F>) -> Vec<Array1<F>> {
    jacobi_sequence(ns, 0.5, 0.5, x)
        .into_iter()
        .zip(ns.iter())
        .map(|(p, &n)| p * ((n + 1) as F / jacobi_value(n, 0.5, 0.5, 1.0)))
        .collect()
}

/// Одномерные моды Чебышёва первого рода по x (порядки `ns`) и по y (порядки `ms`),
/// как для прямоугольной апертуры. Пустой список порядков -- пустой результат по оси.
pub fn cheby1_2d_sequence(
    ns: &[usize],
    ms: &[usize],
    x: &Array1<F>,
    y: &Array1<F>,
) -> (Vec<Array1<F>>, Vec<Array1<F>>) {
    (cheby1_sequence(ns, x), cheby1_sequence(ms, y))
}

/// То же для полиномов второго рода
pub fn cheby2_2d_sequence(
    ns: &[usize],
    ms: &[usize],
    x: &Array1<F>,
    y: &Array1<F>,
) -> (Vec<Array1<F>>, Vec<Array1<F>>) {
    (cheby2_sequence(ns, x), cheby2_sequence(ms, y))
}
