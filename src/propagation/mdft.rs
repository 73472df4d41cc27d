use crate::common::space::fftrange;
use crate::config::{C, F, I, PI};
use itertools::multizip;
use ndarray::prelude::*;
use rayon::prelude::*;

/// Направление матричного DFT
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Direction {
    Forward,  // зрачок -> фокальная плоскость, exp(-i...)
    Backward, // фокальная плоскость -> зрачок, exp(+i...)
}

impl Direction {
    fn sign(&self) -> F {
        match self {
            Direction::Forward => -1.0,
            Direction::Backward => 1.0,
        }
    }
}

/// Ядро одномерного DFT с произвольной дискретизацией:
/// `K[j, k] = exp(sign * 2πi * out[j] * inp[k] / lambda_f)`.
fn dft_kernel(out: &Array1<F>, inp: &Array1<F>, lambda_f: F, direction: Direction) -> Array2<C> {
    let prefix = direction.sign() * 2.0 * PI / lambda_f;
    let mut kernel: Array2<C> = Array::zeros((out.len(), inp.len()));
    multizip((kernel.axis_iter_mut(Axis(0)), out.iter()))
        .par_bridge()
        .for_each(|(mut row, u)| {
            multizip((row.iter_mut(), inp.iter())).for_each(|(elem, x)| {
                *elem = (I * (prefix * u * x)).exp();
            });
        });
    kernel
}

/// Матричное преобразование Фурье между двумя сетками.
///
/// Координаты входа и выхода задаются осями `[x, y]`; поле индексируется
/// `[(iy, ix)]`. Результат домножается на `norm`. Для прямого преобразования
/// `norm = dx_in^2 / (λ f)`, для обратного `norm = dx_fpm^2 / (λ f)`,
/// и при дуальной дискретизации (`dx_fpm = λ f / (N dx_in)`) пара
/// преобразований тождественна.
pub fn mdft2(
    field: &Array2<C>,
    axes_in: [&Array1<F>; 2],
    axes_out: [&Array1<F>; 2],
    lambda_f: F,
    norm: F,
    direction: Direction,
) -> Array2<C> {
    let [x_in, y_in] = axes_in;
    let [x_out, y_out] = axes_out;
    let ky = dft_kernel(y_out, y_in, lambda_f, direction);
    let kx = dft_kernel(x_out, x_in, lambda_f, direction);
    let mut out = ky.dot(field).dot(&kx.t());
    out *= C::new(norm, 0.0);
    out
}

/// Центрированная ось из `n` отсчетов с шагом `dx`, сдвинутая на `shift`
pub fn shifted_axis(n: usize, dx: F, shift: F) -> Array1<F> {
    fftrange(n) * dx + shift
}
