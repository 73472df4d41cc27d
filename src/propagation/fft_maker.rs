use crate::config::{C, F};
use crate::traits::fft_maker::FftMaker;
use ndarray::prelude::*;
use ndrustfft::{ndfft_par, ndifft_par, FftHandler};

/// Двумерное FFT по осям 0 и 1 с переиспользуемым буфером
pub struct FftMaker2D {
    pub handler: [FftHandler<F>; 2],
    pub temp: Array2<C>,
}

impl FftMaker2D {
    pub const DIM: usize = 2;

    pub fn new(n: &[usize; Self::DIM]) -> Self {
        let handler = [FftHandler::new(n[0]), FftHandler::new(n[1])];
        let temp: Array2<C> = Array::zeros((n[0], n[1]));
        Self { handler, temp }
    }
}

impl FftMaker<Ix2> for FftMaker2D {
    fn fft(&mut self, arr: &mut Array2<C>) {
        ndfft_par(arr, &mut self.temp, &mut self.handler[0], 0);
        ndfft_par(&self.temp, arr, &mut self.handler[1], 1);
    }

    fn ifft(&mut self, arr: &mut Array2<C>) {
        ndifft_par(arr, &mut self.temp, &mut self.handler[1], 1);
        ndifft_par(&self.temp, arr, &mut self.handler[0], 0);
    }
}

/// Перенос нулевой частоты в центр массива (позиция `n/2` по каждой оси)
pub fn fftshift<T: Clone>(arr: &Array2<T>) -> Array2<T> {
    let (ny, nx) = arr.dim();
    Array2::from_shape_fn((ny, nx), |(iy, ix)| {
        arr[((iy + ny - ny / 2) % ny, (ix + nx - nx / 2) % nx)].clone()
    })
}

/// Обратная операция к [`fftshift`]
pub fn ifftshift<T: Clone>(arr: &Array2<T>) -> Array2<T> {
    let (ny, nx) = arr.dim();
    Array2::from_shape_fn((ny, nx), |(iy, ix)| {
        arr[((iy + ny / 2) % ny, (ix + nx / 2) % nx)].clone()
    })
}
