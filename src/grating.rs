use crate::config::{F, PI};
use crate::error::PdiError;
use ndarray::prelude::*;
use std::str::FromStr;

/// Прямоугольный импульс -- обобщенный меандр со значениями `offset ± amplitude`.
///
/// `x` сворачивается в `[0, period)`; на доле `duty` периода значение
/// высокое, на остатке -- низкое. Точно в нуле (с точностью до машинного
/// эпсилон) возвращается середина `offset`, чтобы граница периода не
/// зависела от округления.
pub fn rectangle_pulse(x: F, duty: F, amplitude: F, offset: F, period: F) -> F {
    let wrapped = x.rem_euclid(period);
    if wrapped.abs() < F::EPSILON {
        offset
    } else if wrapped < duty * period {
        offset + amplitude
    } else {
        offset - amplitude
    }
}

/// Тип решетки
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum GratingKind {
    SinAmp, // синусоидальная амплитудная
    Ronchi, // прямоугольная (решетка Ронки)
}

impl GratingKind {
    pub fn as_str(&self) -> &str {
        match self {
            GratingKind::SinAmp => "sin_amp",
            GratingKind::Ronchi => "ronchi",
        }
    }
}

impl FromStr for GratingKind {
    type Err = PdiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sin_amp" => Ok(GratingKind::SinAmp),
            "ronchi" => Ok(GratingKind::Ronchi),
            _ => Err(PdiError::UnsupportedGrating(s.to_string())),
        }
    }
}

/// Ось, вдоль которой нарезаны штрихи решетки
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum GratingAxis {
    X,
    Y,
}

impl GratingAxis {
    pub fn as_str(&self) -> &str {
        match self {
            GratingAxis::X => "x",
            GratingAxis::Y => "y",
        }
    }
}

impl FromStr for GratingAxis {
    type Err = PdiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x" => Ok(GratingAxis::X),
            "y" => Ok(GratingAxis::Y),
            _ => Err(PdiError::UnsupportedAxis(s.to_string())),
        }
    }
}

/// Амплитудная решетка с `rulings` штрихами на диаметре входного зрачка `epd`
#[derive(Debug, Clone, Copy)]
pub struct Grating {
    pub kind: GratingKind,
    pub rulings: F,
    pub epd: F,
    pub period: F,
}

impl Grating {
    pub fn new(kind: GratingKind, rulings: F, epd: F) -> Self {
        Self {
            kind,
            rulings,
            epd,
            period: epd / rulings,
        }
    }

    /// Пропускание в точке `x`, значения в `[0, 1]`
    pub fn value(&self, x: F) -> F {
        match self.kind {
            GratingKind::SinAmp => {
                let prefix = self.rulings * PI / (self.epd / 2.0);
                ((prefix * x).sin() + 1.0) / 2.0
            }
            GratingKind::Ronchi => rectangle_pulse(x, 0.5, 0.5, 0.5, self.period),
        }
    }

    /// Пропускание на массиве координат при фазовом сдвиге `phase_shift` (рад).
    ///
    /// Сдвиг `2π` соответствует смещению решетки на один период; значения
    /// вне `[0, 2π)` не сворачиваются.
    pub fn transmission<D: Dimension>(&self, x: &Array<F, D>, phase_shift: F) -> Array<F, D> {
        if phase_shift != 0.0 {
            let dx = phase_shift / (2.0 * PI) * self.period;
            x.mapv(|xi| self.value(xi + dx))
        } else {
            x.mapv(|xi| self.value(xi))
        }
    }
}
