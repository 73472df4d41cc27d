use crate::common::geometry::circle;
use crate::common::space::SpatialGrid;
use crate::config::{C, F, PI};
use crate::error::Result;
use crate::grating::{Grating, GratingAxis, GratingKind};
use crate::rich_data::RichData;
use crate::traits::router::{FocalPlaneRouter, FpmPass};
use crate::wavefront::Wavefront;
use log::debug;
use ndarray::prelude::*;
use ndarray::Zip;
use rayon::prelude::*;
use serde::Deserialize;
use std::path::Path;

/// Параметры интерферометра, не зависящие от сетки зрачка.
///
/// Размеры в фокальной плоскости заданы в единицах λ/D (`flambd`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PspdiConfig {
    /// смещение окна тестового плеча в λ/D; `None` -- по числу штрихов решетки.
    /// Отличается от `grating_rulings` только при моделировании разъюстировки.
    pub test_arm_offset: Option<F>,
    /// диаметр окна в фокусе порядка m=+1, λ/D
    pub test_arm_fov: F,
    /// число отсчетов на окне тестового плеча
    pub test_arm_samples: usize,
    /// амплитудное пропускание тестового плеча; для подложки с
    /// просветляющим покрытием с отражением R это примерно 1 - sqrt(R).
    /// Подбирается для максимальной видности полос.
    pub test_arm_transmissivity: F,
    /// диаметр точечной диафрагмы в фокусе порядка m=0, λ/D
    pub pinhole_diameter: F,
    pub pinhole_samples: usize,
    /// число штрихов решетки на диаметре входного зрачка
    pub grating_rulings: F,
    /// "sin_amp" или "ronchi"
    pub grating_type: String,
    /// "x" или "y"
    pub grating_axis: String,
}

impl Default for PspdiConfig {
    fn default() -> Self {
        Self {
            test_arm_offset: None,
            test_arm_fov: 64.0,
            test_arm_samples: 256,
            test_arm_transmissivity: 1.0,
            pinhole_diameter: 0.25,
            pinhole_samples: 128,
            grating_rulings: 64.0,
            grating_type: String::from("sin_amp"),
            grating_axis: String::from("x"),
        }
    }
}

impl PspdiConfig {
    /// Считывает конфигурацию из TOML, отсутствующие поля берутся по умолчанию
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Считывает конфигурацию из TOML-файла
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}

/// Поле на входе интерферометра: готовый волновой фронт или "сырой" массив,
/// который оборачивается с шагом и длиной волны интерферометра
#[derive(Debug, Clone, Copy)]
pub enum PupilField<'a> {
    Wave(&'a Wavefront),
    Raw(&'a Array2<C>),
}

impl<'a> From<&'a Wavefront> for PupilField<'a> {
    fn from(wave: &'a Wavefront) -> Self {
        PupilField::Wave(wave)
    }
}

impl<'a> From<&'a Array2<C>> for PupilField<'a> {
    fn from(arr: &'a Array2<C>) -> Self {
        PupilField::Raw(arr)
    }
}

/// Что возвращает прямая модель
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ForwardMode {
    Intensity, // только интенсивность на детекторе
    Debug,     // все промежуточные поля
}

/// Поля одного плеча интерферометра
#[derive(Debug, Clone)]
pub struct ArmFields {
    pub at_camera: Wavefront,
    pub at_fpm: Wavefront,
    pub after_fpm: Wavefront,
}

impl From<FpmPass<Wavefront>> for ArmFields {
    fn from(pass: FpmPass<Wavefront>) -> Self {
        Self {
            at_camera: pass.field,
            at_fpm: pass.at_fpm,
            after_fpm: pass.after_fpm,
        }
    }
}

/// Промежуточные поля прямой модели для отладки и калибровки
#[derive(Debug, Clone)]
pub struct DebugBundle {
    pub total_field: Wavefront,
    pub reference: ArmFields,
    pub test: ArmFields,
}

#[derive(Debug, Clone)]
pub enum ForwardOutput {
    Intensity(RichData),
    Debug(Box<DebugBundle>),
}

/// Интерферометр с фазовым сдвигом и точечной дифракцией (интерферометр Медецки).
///
/// Решетка перед фокусирующей оптикой расщепляет пучок на порядки. Порядок
/// m=0 фильтруется точечной диафрагмой и дает опорную сферическую волну,
/// порядок m=+1 проходит через широкое окно и несет исследуемый фронт.
/// Маски и сетки вычисляются один раз при создании и дальше только читаются.
#[derive(Debug, Clone)]
pub struct Pspdi {
    pub grid: SpatialGrid,
    pub dx: F,
    pub efl: F,
    pub epd: F,
    pub wavelength: F,
    pub fno: F,
    pub flambd: F,

    pub grating: Grating,
    pub grating_axis: GratingAxis,
    grating_coords: Array2<F>,

    pub test_arm_fov: F,
    pub test_arm_samples: usize,
    pub test_arm_eps: F,
    pub test_arm_fov_compute: F,
    pub test_arm_mask_rsq: F,
    pub test_arm_transmissivity: F,
    pub test_arm_shift: [F; 2],
    pub dx_test_arm: F,
    pub test_mask: Array2<F>,

    pub pinhole_diameter: F,
    pub pinhole_samples: usize,
    pub dx_pinhole: F,
    pub pinhole_fov_radius: F,
    pub pinhole: Array2<F>,
}

impl Pspdi {
    /// Создает интерферометр.
    ///
    /// `grid` -- сетка полей, подаваемых в [`Pspdi::forward_model`], `efl` --
    /// фокусное расстояние за решеткой, `epd` -- диаметр входного зрачка
    /// (в единицах `grid`), `wavelength` -- длина волны.
    pub fn new(grid: SpatialGrid, efl: F, epd: F, wavelength: F, config: &PspdiConfig) -> Result<Self> {
        let kind: GratingKind = config.grating_type.parse()?;
        let grating_axis: GratingAxis = config.grating_axis.parse()?;

        let dx = grid.dx;
        let fno = efl / epd;
        let flambd = fno * wavelength;

        // синтез решетки
        let grating = Grating::new(kind, config.grating_rulings, epd);
        let grating_coords = match grating_axis {
            GratingAxis::X => grid.x_mesh(),
            GratingAxis::Y => grid.y_mesh(),
        };

        // тестовое плечо: окно расширено на один отсчет, чтобы круг целиком
        // лежал внутри массива
        let test_arm_fov = config.test_arm_fov;
        let test_arm_samples = config.test_arm_samples;
        let test_arm_eps = test_arm_fov / test_arm_samples as F;
        let test_arm_fov_compute = (test_arm_fov + test_arm_eps) * flambd;
        let test_arm_mask_rsq = (test_arm_fov * flambd / 2.0).powi(2);

        let offset = config.test_arm_offset.unwrap_or(config.grating_rulings) * flambd;
        let test_arm_shift = match grating_axis {
            GratingAxis::X => [offset, 0.0],
            GratingAxis::Y => [0.0, offset],
        };

        let test_grid = SpatialGrid::make_xy_grid(test_arm_samples, test_arm_fov_compute);
        let dx_test_arm = test_grid.dx;
        let test_mask = circle(test_arm_mask_rsq, &test_grid.rsq());

        // опорное плечо: samples - 1 в знаменателе по той же причине
        let pinhole_diameter = config.pinhole_diameter * flambd;
        let pinhole_samples = config.pinhole_samples;
        let dx_pinhole = pinhole_diameter / (pinhole_samples as F - 1.0);
        let pinhole_fov_radius = pinhole_samples as F / 2.0 * dx_pinhole;
        let pinhole_grid = SpatialGrid::make_xy_grid(pinhole_samples, 2.0 * pinhole_fov_radius);
        let pinhole = circle((pinhole_diameter / 2.0).powi(2), &pinhole_grid.rsq());

        debug!(
            "PS/PDI: {} grating, {} rulings along {}, F/{:.3}, flambd = {:.4e}, test arm shift = {:?}",
            kind.as_str(),
            config.grating_rulings,
            grating_axis.as_str(),
            fno,
            flambd,
            test_arm_shift
        );

        Ok(Self {
            grid,
            dx,
            efl,
            epd,
            wavelength,
            fno,
            flambd,
            grating,
            grating_axis,
            grating_coords,
            test_arm_fov,
            test_arm_samples,
            test_arm_eps,
            test_arm_fov_compute,
            test_arm_mask_rsq,
            test_arm_transmissivity: config.test_arm_transmissivity,
            test_arm_shift,
            dx_test_arm,
            test_mask,
            pinhole_diameter,
            pinhole_samples,
            dx_pinhole,
            pinhole_fov_radius,
            pinhole,
        })
    }

    /// Пропускание решетки на сетке зрачка при фазовом сдвиге `phase_shift`
    pub fn grating_transmission(&self, phase_shift: F) -> Array2<F> {
        self.grating.transmission(&self.grating_coords, phase_shift)
    }

    /// Несущая фаза порядка m=+1: `2π rulings / epd` вдоль оси решетки.
    /// Восстановленная фаза отличается от фазы входного фронта на эту
    /// несущую (с точностью до константы).
    pub fn carrier_phase(&self) -> Array2<F> {
        let k = 2.0 * PI * self.grating.rulings / self.epd;
        self.grating_coords.mapv(|c| k * c)
    }

    /// Поле сразу за решеткой
    pub fn diffract(&self, wave_in: PupilField, phase_shift: F) -> Wavefront {
        let grating = self.grating_transmission(phase_shift);
        match wave_in {
            PupilField::Wave(wave) => wave.apply_mask(&grating),
            PupilField::Raw(arr) => {
                let data = Zip::from(arr).and(&grating).map_collect(|&e, &t| e * t);
                Wavefront::new(data, self.dx, self.wavelength)
            }
        }
    }

    /// Оба плеча: опорное (диафрагма, без сдвига) и тестовое (окно со сдвигом)
    fn propagate_arms(&self, wave_in: PupilField, phase_shift: F) -> (FpmPass<Wavefront>, FpmPass<Wavefront>) {
        let i = self.diffract(wave_in, phase_shift);
        let efl = self.efl;

        let reference = i.to_fpm_and_back_full(efl, &self.pinhole, self.dx_pinhole, [0.0, 0.0]);
        let mut test = i.to_fpm_and_back_full(efl, &self.test_mask, self.dx_test_arm, self.test_arm_shift);

        if self.test_arm_transmissivity != 1.0 {
            test.field *= self.test_arm_transmissivity;
        }
        (reference, test)
    }

    /// Интенсивность на детекторе при фазовом сдвиге `phase_shift`
    pub fn forward_model<'a>(&self, wave_in: impl Into<PupilField<'a>>, phase_shift: F) -> RichData {
        let (reference, test) = self.propagate_arms(wave_in.into(), phase_shift);
        (&reference.field + &test.field).intensity()
    }

    /// Прямая модель с промежуточными полями обоих плеч
    pub fn forward_model_debug<'a>(&self, wave_in: impl Into<PupilField<'a>>, phase_shift: F) -> DebugBundle {
        let (reference, test) = self.propagate_arms(wave_in.into(), phase_shift);
        DebugBundle {
            total_field: &reference.field + &test.field,
            reference: ArmFields::from(reference),
            test: ArmFields::from(test),
        }
    }

    /// Прямая модель с явным выбором формы результата
    pub fn forward<'a>(&self, wave_in: impl Into<PupilField<'a>>, phase_shift: F, mode: ForwardMode) -> ForwardOutput {
        match mode {
            ForwardMode::Intensity => ForwardOutput::Intensity(self.forward_model(wave_in, phase_shift)),
            ForwardMode::Debug => ForwardOutput::Debug(Box::new(self.forward_model_debug(wave_in, phase_shift))),
        }
    }

    /// Серия интерферограмм для набора фазовых сдвигов, кадры независимы
    /// и считаются параллельно; порядок кадров совпадает с порядком сдвигов
    pub fn frame_stack<'a>(&self, wave_in: impl Into<PupilField<'a>>, shifts: &[F]) -> Vec<RichData> {
        let wave_in = wave_in.into();
        shifts
            .par_iter()
            .map(|&shift| {
                debug!("forward model, phase shift = {:.4}", shift);
                self.forward_model(wave_in, shift)
            })
            .collect()
    }
}

/// Баланс мощностей опорного и тестового плеч
#[derive(Debug, Clone)]
pub struct ArmBalance {
    /// mean(I_ref) / mean(I_test)
    pub ratio: F,
    pub ref_intensity: RichData,
    pub test_intensity: RichData,
}

/// Отношение средних интенсивностей опорного и тестового плеч на детекторе.
///
/// Используется при подборе `test_arm_transmissivity`: видность полос
/// максимальна, когда мощности плеч сравнимы.
pub fn evaluate_test_ref_arm_matching(bundle: &DebugBundle) -> ArmBalance {
    let ref_intensity = bundle.reference.at_camera.intensity();
    let test_intensity = bundle.test.at_camera.intensity();
    let ratio = ref_intensity.mean() / test_intensity.mean();
    ArmBalance {
        ratio,
        ref_intensity,
        test_intensity,
    }
}
