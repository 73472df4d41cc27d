use crate::config::{C, F, I};
use crate::error::{PdiError, Result};
use crate::propagation::fft_maker::{fftshift, ifftshift, FftMaker2D};
use crate::propagation::mdft::{mdft2, shifted_axis, Direction};
use crate::rich_data::RichData;
use crate::traits::fft_maker::FftMaker;
use crate::traits::router::{FocalPlaneRouter, FpmPass};
use ndarray::prelude::*;
use ndarray::Zip;
use std::ops::{Add, Mul, MulAssign};

/// Комплексное скалярное поле на равномерной квадратной сетке.
///
/// `data` индексируется `[(iy, ix)]`, `dx` -- шаг сетки, `wavelength` --
/// длина волны. Единицы согласованы так, что `dx * dx_focal / (wavelength * efl)`
/// безразмерно (например, мм в зрачке, мкм в фокусе и для длины волны).
#[derive(Debug, Clone)]
pub struct Wavefront {
    pub data: Array2<C>,
    pub dx: F,
    pub wavelength: F,
}

impl Wavefront {
    pub fn new(data: Array2<C>, dx: F, wavelength: F) -> Self {
        Self {
            data,
            dx,
            wavelength,
        }
    }

    /// Поле `amplitude * exp(i * phase)`, фаза в радианах
    pub fn from_amp_and_phase(amplitude: &Array2<F>, phase: &Array2<F>, dx: F, wavelength: F) -> Self {
        let mut data: Array2<C> = Array::zeros(amplitude.raw_dim());
        Zip::from(&mut data)
            .and(amplitude)
            .and(phase)
            .for_each(|e, &a, &p| *e = a * (I * p).exp());
        Self::new(data, dx, wavelength)
    }

    /// Форма поля `[ny, nx]`
    pub fn shape(&self) -> [usize; 2] {
        let (ny, nx) = self.data.dim();
        [ny, nx]
    }

    /// Интенсивность |E|^2
    pub fn intensity(&self) -> RichData {
        RichData::new(self.data.mapv(|e| e.norm_sqr()), self.dx, self.wavelength)
    }

    /// Полная энергия поля: сумма |E|^2 dx^2
    pub fn power(&self) -> F {
        self.data.iter().map(|e| e.norm_sqr()).sum::<F>() * self.dx * self.dx
    }

    /// Поэлементное умножение на вещественную функцию пропускания
    pub fn apply_mask(&self, mask: &Array2<F>) -> Self {
        let mut data = self.data.clone();
        Zip::from(&mut data).and(mask).for_each(|e, &m| *e *= m);
        Self::new(data, self.dx, self.wavelength)
    }

    /// Размер квадратного поля; у FFT-пути шаг один на обе оси
    fn check_square(&self) -> Result<usize> {
        let [ny, nx] = self.shape();
        if ny != nx {
            return Err(PdiError::NonSquareField { shape: [ny, nx] });
        }
        Ok(nx)
    }

    /// Фокусировка через FFT с естественной дискретизацией `λ f / (N dx)`.
    ///
    /// Нормировка та же, что у [`Wavefront::focus_fixed_sampling`], так что при
    /// дуальной сетке оба способа дают одно и то же поле. Для неквадратного
    /// поля -- ошибка, такие поля фокусируются матричным DFT.
    pub fn focus(&self, efl: F) -> Result<Self> {
        let n = self.check_square()?;
        let lambda_f = self.wavelength * efl;
        let mut fft_maker = FftMaker2D::new(&[n, n]);
        let mut data = ifftshift(&self.data);
        fft_maker.fft(&mut data);
        let mut data = fftshift(&data);
        data *= C::new(self.dx * self.dx / lambda_f, 0.0);
        Ok(Self::new(data, lambda_f / (n as F * self.dx), self.wavelength))
    }

    /// Обратная к [`Wavefront::focus`] операция
    pub fn unfocus(&self, efl: F) -> Result<Self> {
        let n = self.check_square()?;
        let lambda_f = self.wavelength * efl;
        let mut fft_maker = FftMaker2D::new(&[n, n]);
        let mut data = ifftshift(&self.data);
        fft_maker.ifft(&mut data);
        let mut data = fftshift(&data);
        // ifft нормирован на 1/n^2, возвращаем множитель
        data *= C::new(self.dx * self.dx * (n * n) as F / lambda_f, 0.0);
        Ok(Self::new(data, lambda_f / (n as F * self.dx), self.wavelength))
    }

    /// Фокусировка матричным DFT в окно из `samples = [ny, nx]` отсчетов с шагом `dx`,
    /// центр окна смещен на `shift = [x, y]`
    pub fn focus_fixed_sampling(&self, efl: F, dx: F, samples: [usize; 2], shift: [F; 2]) -> Self {
        let [ny, nx] = self.shape();
        let lambda_f = self.wavelength * efl;
        let x_in = shifted_axis(nx, self.dx, 0.0);
        let y_in = shifted_axis(ny, self.dx, 0.0);
        let x_out = shifted_axis(samples[1], dx, shift[0]);
        let y_out = shifted_axis(samples[0], dx, shift[1]);
        let data = mdft2(
            &self.data,
            [&x_in, &y_in],
            [&x_out, &y_out],
            lambda_f,
            self.dx * self.dx / lambda_f,
            Direction::Forward,
        );
        Self::new(data, dx, self.wavelength)
    }

    /// Возврат из смещенного на `shift` фокального окна на центрированную сетку
    /// из `samples` отсчетов с шагом `dx`
    pub fn unfocus_fixed_sampling(&self, efl: F, dx: F, samples: [usize; 2], shift: [F; 2]) -> Self {
        let [ny, nx] = self.shape();
        let lambda_f = self.wavelength * efl;
        let x_in = shifted_axis(nx, self.dx, shift[0]);
        let y_in = shifted_axis(ny, self.dx, shift[1]);
        let x_out = shifted_axis(samples[1], dx, 0.0);
        let y_out = shifted_axis(samples[0], dx, 0.0);
        let data = mdft2(
            &self.data,
            [&x_in, &y_in],
            [&x_out, &y_out],
            lambda_f,
            self.dx * self.dx / lambda_f,
            Direction::Backward,
        );
        Self::new(data, dx, self.wavelength)
    }
}

impl FocalPlaneRouter for Wavefront {
    fn to_fpm_and_back_full(&self, efl: F, fpm: &Array2<F>, fpm_dx: F, shift: [F; 2]) -> FpmPass<Self> {
        let (my, mx) = fpm.dim();
        let at_fpm = self.focus_fixed_sampling(efl, fpm_dx, [my, mx], shift);
        let after_fpm = at_fpm.apply_mask(fpm);
        let field = after_fpm.unfocus_fixed_sampling(efl, self.dx, self.shape(), shift);
        FpmPass {
            field,
            at_fpm,
            after_fpm,
        }
    }
}

impl Add<&Wavefront> for &Wavefront {
    type Output = Wavefront;

    fn add(self, rhs: &Wavefront) -> Wavefront {
        Wavefront::new(&self.data + &rhs.data, self.dx, self.wavelength)
    }
}

impl Add for Wavefront {
    type Output = Wavefront;

    fn add(self, rhs: Wavefront) -> Wavefront {
        &self + &rhs
    }
}

impl Mul<F> for &Wavefront {
    type Output = Wavefront;

    fn mul(self, rhs: F) -> Wavefront {
        let mut out = self.clone();
        out *= rhs;
        out
    }
}

impl Mul<F> for Wavefront {
    type Output = Wavefront;

    fn mul(mut self, rhs: F) -> Wavefront {
        self *= rhs;
        self
    }
}

impl MulAssign<F> for Wavefront {
    fn mul_assign(&mut self, rhs: F) {
        self.data *= C::new(rhs, 0.0);
    }
}
