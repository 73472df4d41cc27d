//! Восстановление фазы по серии интерферограмм с фазовым сдвигом (PSI).
//!
//! Формализм де Гроота: `num = Σ s_m g_m`, `den = Σ c_m g_m`,
//! `θ = atan2(num, den)`.
//!
//! P. de Groot, "Measurement of transparent plates with wavelength-tuned
//! phase-shifting interferometry", Appl. Opt. 39, 2658-2663 (2000),
//! <https://doi.org/10.1364/AO.39.002658>
//!
//! Кадры подразумеваются вида `g_m = b + c cos(θ + δ_m)`. Таблицы весов
//! должны соответствовать реально приложенным сдвигам `δ_m`: при
//! несоответствии фаза получается смещенной, ошибки нет.
use crate::config::{F, PI};
use crate::error::{PdiError, Result};
use crate::rich_data::RichData;
use log::debug;
use ndarray::prelude::*;
use ndarray::Zip;

const FRAC_PI_2: F = PI / 2.0;
const FRAC_PI_4: F = PI / 4.0;

/// Номинальные сдвиги пятикадрового алгоритма
pub const FIVE_FRAME_PSI_NOMINAL_SHIFTS: [F; 5] = [-PI, -FRAC_PI_2, 0.0, FRAC_PI_2, PI];

/// Номинальные сдвиги четырехкадрового алгоритма
pub const FOUR_FRAME_PSI_NOMINAL_SHIFTS: [F; 4] = [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2];

/// Именованная таблица алгоритма PSI: сдвиги и веса числителя и знаменателя
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsiFormalism {
    pub name: &'static str,
    pub shifts: &'static [F],
    pub ss: &'static [F],
    pub cs: &'static [F],
}

/// Пятикадровый алгоритм Швайдера-Харихарана
pub const SCHWIDER: PsiFormalism = PsiFormalism {
    name: "Schwider-Hariharan 5-frame",
    shifts: &FIVE_FRAME_PSI_NOMINAL_SHIFTS,
    ss: &[0.0, 2.0, 0.0, -2.0, 0.0],
    cs: &[-1.0, 0.0, 2.0, 0.0, -1.0],
};

/// 13-кадровый алгоритм Zygo, шаг π/4
pub const ZYGO_THIRTEEN_FRAME: PsiFormalism = PsiFormalism {
    name: "Zygo 13-frame",
    shifts: &[
        -6.0 * FRAC_PI_4,
        -5.0 * FRAC_PI_4,
        -4.0 * FRAC_PI_4,
        -3.0 * FRAC_PI_4,
        -2.0 * FRAC_PI_4,
        -FRAC_PI_4,
        0.0,
        FRAC_PI_4,
        2.0 * FRAC_PI_4,
        3.0 * FRAC_PI_4,
        4.0 * FRAC_PI_4,
        5.0 * FRAC_PI_4,
        6.0 * FRAC_PI_4,
    ],
    ss: &[
        -3.0, -4.0, 0.0, 12.0, 21.0, 16.0, 0.0, -16.0, -21.0, -12.0, 0.0, 4.0, 3.0,
    ],
    cs: &[
        0.0, -4.0, -12.0, -12.0, 0.0, 16.0, 24.0, 16.0, 0.0, -12.0, -12.0, -4.0, 0.0,
    ],
};

/// 15-кадровый алгоритм Zygo, шаг π/2
pub const ZYGO_FIFTEEN_FRAME: PsiFormalism = PsiFormalism {
    name: "Zygo 15-frame",
    shifts: &[
        -7.0 * FRAC_PI_2,
        -6.0 * FRAC_PI_2,
        -5.0 * FRAC_PI_2,
        -4.0 * FRAC_PI_2,
        -3.0 * FRAC_PI_2,
        -2.0 * FRAC_PI_2,
        -FRAC_PI_2,
        0.0,
        FRAC_PI_2,
        2.0 * FRAC_PI_2,
        3.0 * FRAC_PI_2,
        4.0 * FRAC_PI_2,
        5.0 * FRAC_PI_2,
        6.0 * FRAC_PI_2,
        7.0 * FRAC_PI_2,
    ],
    ss: &[
        -1.0, 0.0, 9.0, 0.0, -21.0, 0.0, 29.0, 0.0, -29.0, 0.0, 21.0, 0.0, -9.0, 0.0, 1.0,
    ],
    cs: &[
        0.0, -4.0, 0.0, 15.0, 0.0, -26.0, 0.0, 30.0, 0.0, -26.0, 0.0, 15.0, 0.0, -4.0, 0.0,
    ],
};

impl PsiFormalism {
    /// Число кадров
    pub fn len(&self) -> usize {
        self.shifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }

    /// Свернутая фаза по кадрам, снятым на сдвигах `self.shifts`
    pub fn reconstruct(&self, frames: &[RichData]) -> Result<RichData> {
        debug!("{}: reconstructing from {} frames", self.name, frames.len());
        degroot_formalism_psi_rich(frames, self.ss, self.cs)
    }
}

/// Проверка согласованности кадров и таблиц весов
fn check_stack(shapes: impl Iterator<Item = [usize; 2]>, frames: usize, ss: &[F], cs: &[F]) -> Result<[usize; 2]> {
    if ss.len() != cs.len() {
        return Err(PdiError::WeightTableMismatch {
            ss: ss.len(),
            cs: cs.len(),
        });
    }
    if frames != ss.len() {
        return Err(PdiError::FrameCountMismatch {
            frames,
            weights: ss.len(),
        });
    }
    let mut shapes = shapes;
    let expected = shapes.next().ok_or(PdiError::EmptyFrameStack)?;
    for found in shapes {
        if found != expected {
            return Err(PdiError::ShapeMismatch { expected, found });
        }
    }
    Ok(expected)
}

/// Свернутая фаза по формализму де Гроота.
///
/// `gs` -- кадры, `ss` и `cs` -- веса числителя и знаменателя той же длины.
/// Слагаемые с нулевым весом пропускаются: таблицы обычно разреженные.
pub fn degroot_formalism_psi<S>(gs: &[ArrayBase<S, Ix2>], ss: &[F], cs: &[F]) -> Result<Array2<F>>
where
    S: ndarray::Data<Elem = F>,
{
    let [ny, nx] = check_stack(
        gs.iter().map(|g| [g.nrows(), g.ncols()]),
        gs.len(),
        ss,
        cs,
    )?;
    let mut num: Array2<F> = Array::zeros((ny, nx));
    let mut den: Array2<F> = Array::zeros((ny, nx));
    for (gm, &sm, &cm) in itertools::multizip((gs.iter(), ss.iter(), cs.iter())) {
        if sm != 0.0 {
            num.scaled_add(sm, gm);
        }
        if cm != 0.0 {
            den.scaled_add(cm, gm);
        }
    }
    Ok(Zip::from(&num).and(&den).map_collect(|&n, &d| n.atan2(d)))
}

/// То же для кадров с метаданными; результат получает шаг и длину волны первого кадра
pub fn degroot_formalism_psi_rich(gs: &[RichData], ss: &[F], cs: &[F]) -> Result<RichData> {
    let g00 = gs.first().ok_or(PdiError::EmptyFrameStack)?;
    let views: Vec<ArrayView2<F>> = gs.iter().map(|g| g.data.view()).collect();
    let out = degroot_formalism_psi(&views, ss, cs)?;
    Ok(RichData::new(out, g00.dx, g00.wavelength))
}
