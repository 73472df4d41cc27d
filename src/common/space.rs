use crate::config::F;
use ndarray::prelude::*;

/// Целочисленная сетка, центрированная на нулевом отсчете DFT:
/// `-floor(n/2) .. ceil(n/2)`.
///
/// Для четного `n` ноль стоит в позиции `n/2`, что совпадает с fftshift.
pub fn fftrange(n: usize) -> Array1<F> {
    let start = -((n / 2) as F);
    Array::from_iter((0..n).map(|i| start + i as F))
}

/// Координатная сетка в плоскости зрачка или фокальной плоскости.
///
/// Массивы полей индексируются как `[(iy, ix)]`: строки -- ось y, столбцы -- ось x.
/// Шаг одинаков по обеим осям.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    pub dx: F,
    pub n: [usize; 2],
    pub x: Array1<F>,
    pub y: Array1<F>,
}

impl SpatialGrid {
    pub const DIM: usize = 2;

    /// Сетка формы `n = [ny, nx]` с шагом `dx`
    pub fn new(n: [usize; Self::DIM], dx: F) -> Self {
        let y = fftrange(n[0]) * dx;
        let x = fftrange(n[1]) * dx;
        Self { dx, n, x, y }
    }

    /// Квадратная сетка из `samples` отсчетов на диаметре `diameter`
    pub fn make_xy_grid(samples: usize, diameter: F) -> Self {
        Self::new([samples, samples], diameter / samples as F)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n[0], self.n[1])
    }

    /// Координата узла `[iy, ix]` в виде `[x, y]`
    pub fn point(&self, index: [usize; Self::DIM]) -> [F; Self::DIM] {
        [self.x[index[1]], self.y[index[0]]]
    }

    /// Двумерный массив x-координат
    pub fn x_mesh(&self) -> Array2<F> {
        Array2::from_shape_fn(self.shape(), |(_, ix)| self.x[ix])
    }

    /// Двумерный массив y-координат
    pub fn y_mesh(&self) -> Array2<F> {
        Array2::from_shape_fn(self.shape(), |(iy, _)| self.y[iy])
    }

    /// Квадрат расстояния до центра сетки
    pub fn rsq(&self) -> Array2<F> {
        Array2::from_shape_fn(self.shape(), |(iy, ix)| {
            self.x[ix].powi(2) + self.y[iy].powi(2)
        })
    }
}
