use crate::common::space::fftrange;
use crate::config::F;
use ndarray::prelude::*;

/// Двумерный вещественный массив с шагом сетки и длиной волны.
///
/// Используется для интенсивностей (интерферограмм) и восстановленной фазы.
/// Глубокая копия -- `clone()`.
#[derive(Debug, Clone, PartialEq)]
pub struct RichData {
    pub data: Array2<F>,
    pub dx: F,
    pub wavelength: F,
}

impl RichData {
    pub fn new(data: Array2<F>, dx: F, wavelength: F) -> Self {
        Self {
            data,
            dx,
            wavelength,
        }
    }

    /// Форма массива `[ny, nx]`
    pub fn shape(&self) -> [usize; 2] {
        let (ny, nx) = self.data.dim();
        [ny, nx]
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn samples_x(&self) -> usize {
        self.data.ncols()
    }

    pub fn samples_y(&self) -> usize {
        self.data.nrows()
    }

    /// Расстояние между центрами соседних отсчетов
    pub fn sample_spacing(&self) -> F {
        self.dx
    }

    pub fn center_x(&self) -> usize {
        self.samples_x() / 2
    }

    pub fn center_y(&self) -> usize {
        self.samples_y() / 2
    }

    /// Ось x, центрированная так же, как сетка полей
    pub fn x(&self) -> Array1<F> {
        fftrange(self.samples_x()) * self.dx
    }

    /// Ось y
    pub fn y(&self) -> Array1<F> {
        fftrange(self.samples_y()) * self.dx
    }

    /// Сечение вдоль оси x через центральную строку
    pub fn slice_x(&self) -> (Array1<F>, Array1<F>) {
        (self.x(), self.data.row(self.center_y()).to_owned())
    }

    /// Сечение вдоль оси y через центральный столбец
    pub fn slice_y(&self) -> (Array1<F>, Array1<F>) {
        (self.y(), self.data.column(self.center_x()).to_owned())
    }

    /// Среднее значение по всему массиву
    pub fn mean(&self) -> F {
        self.data.mean().unwrap_or(F::NAN)
    }
}
