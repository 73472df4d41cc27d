use crate::config::C;
use ndarray::{Array, Dimension};

/// Трейт для дискретного преобразования Фурье
pub trait FftMaker<D: Dimension> {
    /// прямое преобразование фурье комплексного массива (без нормировки)
    fn fft(&mut self, arr: &mut Array<C, D>);

    /// обратное преобразование фурье комплексного массива (с нормировкой 1/n)
    fn ifft(&mut self, arr: &mut Array<C, D>);
}
