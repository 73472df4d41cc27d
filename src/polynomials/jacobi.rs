use crate::config::F;
use ndarray::prelude::*;

/// Коэффициенты трехчленной рекуррентной формулы для n >= 2:
/// `a P_n = (b x + c) P_{n-1} - d P_{n-2}`
fn recurrence(n: usize, alpha: F, beta: F) -> (F, F, F, F) {
    let n = n as F;
    let s = 2.0 * n + alpha + beta;
    let a = 2.0 * n * (n + alpha + beta) * (s - 2.0);
    let b = (s - 1.0) * s * (s - 2.0);
    let c = (s - 1.0) * (alpha * alpha - beta * beta);
    let d = 2.0 * (n + alpha - 1.0) * (n + beta - 1.0) * s;
    (a, b, c, d)
}

fn first_order(alpha: F, beta: F, x: F) -> F {
    (alpha + 1.0) + (alpha + beta + 2.0) * (x - 1.0) / 2.0
}

/// Значение полинома Якоби `P_n^(alpha, beta)` в точке `x`
pub fn jacobi_value(n: usize, alpha: F, beta: F, x: F) -> F {
    match n {
        0 => 1.0,
        1 => first_order(alpha, beta, x),
        _ => {
            let mut p_prev = 1.0;
            let mut p = first_order(alpha, beta, x);
            for k in 2..=n {
                let (a, b, c, d) = recurrence(k, alpha, beta);
                let next = ((b * x + c) * p - d * p_prev) / a;
                p_prev = p;
                p = next;
            }
            p
        }
    }
}

/// Полином Якоби порядка `n` на массиве точек `x`, ортогонален на [-1, 1]
pub fn jacobi(n: usize, alpha: F, beta: F, x: &Array1<F>) -> Array1<F> {
    x.mapv(|xi| jacobi_value(n, alpha, beta, xi))
}

/// Полиномы Якоби порядков `ns` за один проход рекурсии
pub fn jacobi_sequence(ns: &[usize], alpha: F, beta: F, x: &Array1<F>) -> Vec<Array1<F>> {
    let max_n = match ns.iter().copied().max() {
        Some(n) => n,
        None => return Vec::new(),
    };
    let mut orders: Vec<Array1<F>> = Vec::with_capacity(max_n + 1);
    orders.push(Array::ones(x.len()));
    if max_n >= 1 {
        orders.push(x.mapv(|xi| first_order(alpha, beta, xi)));
    }
    for k in 2..=max_n {
        let (a, b, c, d) = recurrence(k, alpha, beta);
        let next = ndarray::Zip::from(x)
            .and(&orders[k - 1])
            .and(&orders[k - 2])
            .map_collect(|&xi, &p, &p_prev| ((b * xi + c) * p - d * p_prev) / a);
        orders.push(next);
    }
    ns.iter().map(|&n| orders[n].clone()).collect()
}
