use super::{max_abs_diff, max_abs_diff_c};
use crate::common::geometry::circle;
use crate::common::space::SpatialGrid;
use crate::config::{C, F, I, PI};
use crate::error::PdiError;
use crate::pdi::{
    evaluate_test_ref_arm_matching, ArmFields, DebugBundle, ForwardMode, ForwardOutput, Pspdi, PspdiConfig,
};
use crate::psi::SCHWIDER;
use crate::unwrap::{unwrap_phase, wrap};
use crate::wavefront::Wavefront;
use approx::assert_relative_eq;
use ndarray::prelude::*;
use ndarray::Zip;

const EFL: F = 40.0;
const EPD: F = 8.0;
const WAVELENGTH: F = 0.5;

fn small_config() -> PspdiConfig {
    PspdiConfig {
        test_arm_fov: 8.0,
        test_arm_samples: 32,
        pinhole_samples: 16,
        grating_rulings: 8.0,
        ..Default::default()
    }
}

fn small_grid() -> SpatialGrid {
    SpatialGrid::make_xy_grid(64, 12.0)
}

fn small_pspdi(config: &PspdiConfig) -> Pspdi {
    Pspdi::new(small_grid(), EFL, EPD, WAVELENGTH, config).unwrap()
}

/// Круглый зрачок с небольшой дефокусировкой и наклоном
fn aberrated_pupil() -> Wavefront {
    let grid = small_grid();
    let amp = circle((EPD / 2.0).powi(2), &grid.rsq());
    let phase = Zip::from(&grid.rsq())
        .and(&grid.x_mesh())
        .map_collect(|&r2, &x| 0.8 * r2 / 16.0 - 0.3 * x / 4.0);
    Wavefront::from_amp_and_phase(&amp, &phase, grid.dx, WAVELENGTH)
}

fn max_value(a: &Array2<F>) -> F {
    a.iter().copied().fold(0.0, F::max)
}

#[test]
fn test_arm_shift_follows_grating_axis() {
    let grid = SpatialGrid::make_xy_grid(16, 12.0);
    let config = PspdiConfig::default();
    // F/1 при λ = 1: flambd = 1
    let pspdi = Pspdi::new(grid.clone(), 10.0, 10.0, 1.0, &config).unwrap();
    assert_eq!(pspdi.flambd, 1.0);
    assert_eq!(pspdi.test_arm_shift, [64.0, 0.0]);

    let config = PspdiConfig {
        grating_axis: String::from("y"),
        ..Default::default()
    };
    let pspdi = Pspdi::new(grid.clone(), 10.0, 10.0, 1.0, &config).unwrap();
    assert_eq!(pspdi.test_arm_shift, [0.0, 64.0]);

    let config = PspdiConfig {
        test_arm_offset: Some(63.5),
        ..Default::default()
    };
    let pspdi = Pspdi::new(grid, 20.0, 10.0, 0.5, &config).unwrap();
    assert_eq!(pspdi.test_arm_shift, [63.5, 0.0]);
}

#[test]
fn focal_plane_masks() {
    let pspdi = small_pspdi(&small_config());
    assert_relative_eq!(pspdi.fno, 5.0);
    assert_relative_eq!(pspdi.flambd, 2.5);
    assert_relative_eq!(pspdi.grating.period, 1.0);

    assert_eq!(pspdi.test_mask.dim(), (32, 32));
    assert_relative_eq!(pspdi.test_arm_eps, 0.25);
    assert_relative_eq!(pspdi.dx_test_arm, (8.0 + 0.25) * 2.5 / 32.0, max_relative = 1e-14);
    // окно касается краев массива, но не выходит за них
    assert_eq!(pspdi.test_mask[(16, 16)], 1.0);
    assert_eq!(pspdi.test_mask[(0, 0)], 0.0);

    assert_eq!(pspdi.pinhole.dim(), (16, 16));
    assert_relative_eq!(pspdi.pinhole_diameter, 0.625, max_relative = 1e-14);
    assert_relative_eq!(pspdi.dx_pinhole, 0.625 / 15.0, max_relative = 1e-14);
    assert_eq!(pspdi.pinhole[(8, 8)], 1.0);
    assert!(pspdi.pinhole.sum() < 256.0);
}

#[test]
fn unsupported_grating_and_axis() {
    let config = PspdiConfig {
        grating_type: String::from("blazed"),
        ..Default::default()
    };
    assert!(matches!(
        Pspdi::new(small_grid(), EFL, EPD, WAVELENGTH, &config),
        Err(PdiError::UnsupportedGrating(name)) if name == "blazed"
    ));

    let config = PspdiConfig {
        grating_axis: String::from("z"),
        ..Default::default()
    };
    assert!(matches!(
        Pspdi::new(small_grid(), EFL, EPD, WAVELENGTH, &config),
        Err(PdiError::UnsupportedAxis(_))
    ));
}

#[test]
fn config_from_toml() {
    let config = PspdiConfig::from_toml_str(
        r#"
        test_arm_samples = "many"
        "#,
    );
    assert!(matches!(config, Err(PdiError::Config(_))));

    let config = PspdiConfig::from_toml_str(
        r#"
        test_arm_transmissivity = 0.2
        test_arm_offset = 31.5
        grating_type = "ronchi"
        grating_rulings = 32.0
        pinhole_samples = 64
        "#,
    )
    .unwrap();
    assert_eq!(config.test_arm_transmissivity, 0.2);
    assert_eq!(config.test_arm_offset, Some(31.5));
    assert_eq!(config.grating_type, "ronchi");
    assert_eq!(config.grating_rulings, 32.0);
    assert_eq!(config.pinhole_samples, 64);
    assert_eq!(config.test_arm_samples, PspdiConfig::default().test_arm_samples);
    assert_eq!(config.grating_axis, "x");

    assert_eq!(PspdiConfig::from_toml_str("").unwrap(), PspdiConfig::default());

    let path = std::env::temp_dir().join("rpdi_config_test.toml");
    std::fs::write(&path, "pinhole_diameter = 0.5\ngrating_axis = \"y\"\n").unwrap();
    let config = PspdiConfig::from_toml_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(config.pinhole_diameter, 0.5);
    assert_eq!(config.grating_axis, "y");

    assert!(matches!(
        PspdiConfig::from_toml_file(std::env::temp_dir().join("rpdi_missing_config.toml")),
        Err(PdiError::Io(_))
    ));
}

#[test]
fn frames_are_finite_and_nonnegative() {
    let wave = aberrated_pupil();
    for kind in ["sin_amp", "ronchi"] {
        let config = PspdiConfig {
            grating_type: String::from(kind),
            ..small_config()
        };
        let pspdi = small_pspdi(&config);
        let frame = pspdi.forward_model(&wave, 0.7);
        assert_eq!(frame.shape(), [64, 64]);
        assert_eq!(frame.dx, wave.dx);
        assert_eq!(frame.wavelength, WAVELENGTH);
        assert!(frame.data.iter().all(|v| v.is_finite() && *v >= 0.0));
        assert!(max_value(&frame.data) > 0.0, "{} grating gave a dark frame", kind);
    }
}

#[test]
fn debug_pass_agrees_with_intensity_pass() {
    let pspdi = small_pspdi(&small_config());
    let wave = aberrated_pupil();
    let frame = pspdi.forward_model(&wave, 1.1);
    let bundle = pspdi.forward_model_debug(&wave, 1.1);

    let scale = max_value(&frame.data);
    assert!(max_abs_diff(&bundle.total_field.intensity().data, &frame.data) <= 1e-12 * scale);

    let sum = &bundle.reference.at_camera + &bundle.test.at_camera;
    assert!(max_abs_diff_c(&sum.data, &bundle.total_field.data) <= 1e-12 * scale.sqrt());

    assert_eq!(bundle.reference.at_fpm.data.dim(), (16, 16));
    assert_eq!(bundle.test.at_fpm.data.dim(), (32, 32));
    assert_eq!(bundle.test.at_fpm.dx, pspdi.dx_test_arm);
    let outside = bundle.test.after_fpm.data[(0, 0)];
    assert_eq!(outside, C::new(0.0, 0.0));

    match pspdi.forward(&wave, 1.1, ForwardMode::Intensity) {
        ForwardOutput::Intensity(i) => assert!(max_abs_diff(&i.data, &frame.data) <= 1e-12 * scale),
        ForwardOutput::Debug(_) => panic!("expected intensity output"),
    }
    match pspdi.forward(&wave, 1.1, ForwardMode::Debug) {
        ForwardOutput::Debug(b) => assert_eq!(b.total_field.shape(), [64, 64]),
        ForwardOutput::Intensity(_) => panic!("expected debug output"),
    }
}

#[test]
fn phase_shift_is_periodic() {
    let pspdi = small_pspdi(&small_config());
    let wave = aberrated_pupil();
    let a = pspdi.forward_model(&wave, 0.4);
    let b = pspdi.forward_model(&wave, 0.4 + 2.0 * PI);
    assert!(max_abs_diff(&a.data, &b.data) <= 1e-9 * max_value(&a.data));
}

#[test]
fn raw_array_input_matches_wavefront_input() {
    let pspdi = small_pspdi(&small_config());
    let wave = aberrated_pupil();
    let from_wave = pspdi.forward_model(&wave, 2.3);
    let from_raw = pspdi.forward_model(&wave.data, 2.3);
    assert_eq!(from_raw.dx, pspdi.dx);
    assert_eq!(from_raw.wavelength, pspdi.wavelength);
    assert!(max_abs_diff(&from_wave.data, &from_raw.data) <= 1e-12 * max_value(&from_wave.data));
}

#[test]
fn transmissivity_scales_test_arm() {
    let wave = aberrated_pupil();
    let open = small_pspdi(&small_config()).forward_model_debug(&wave, 0.0);
    let config = PspdiConfig {
        test_arm_transmissivity: 0.5,
        ..small_config()
    };
    let dimmed = small_pspdi(&config).forward_model_debug(&wave, 0.0);

    let expected = open.test.at_camera.intensity().data * 0.25;
    let got = dimmed.test.at_camera.intensity().data;
    assert!(max_abs_diff(&got, &expected) <= 1e-12 * max_value(&expected));
    assert!(max_abs_diff_c(&dimmed.reference.at_camera.data, &open.reference.at_camera.data) <= 1e-15);

    let balance_open = evaluate_test_ref_arm_matching(&open);
    let balance_dimmed = evaluate_test_ref_arm_matching(&dimmed);
    assert!(balance_open.ratio.is_finite() && balance_open.ratio > 0.0);
    assert_relative_eq!(balance_dimmed.ratio, 4.0 * balance_open.ratio, max_relative = 1e-10);
}

#[test]
fn grating_along_y_mirrors_grating_along_x() {
    let wave = aberrated_pupil();
    let transposed = Wavefront::new(wave.data.t().to_owned(), wave.dx, wave.wavelength);
    let along_x = small_pspdi(&small_config());
    let config = PspdiConfig {
        grating_axis: String::from("y"),
        ..small_config()
    };
    let along_y = small_pspdi(&config);

    assert_eq!(
        along_y.grating_transmission(0.9),
        along_x.grating_transmission(0.9).t().to_owned()
    );
    for shift in [0.0, 1.3] {
        let ix = along_x.forward_model(&wave, shift);
        let iy = along_y.forward_model(&transposed, shift);
        let scale = max_value(&ix.data);
        assert!(scale > 0.0);
        assert!(max_abs_diff(&iy.data, &ix.data.t().to_owned()) <= 1e-12 * scale);
    }
}

#[test]
fn frame_stack_keeps_shift_order() {
    let pspdi = small_pspdi(&small_config());
    let wave = aberrated_pupil();
    let shifts = [1.7, 0.3, -0.9];
    let stack = pspdi.frame_stack(&wave, &shifts);
    assert_eq!(stack.len(), shifts.len());
    for (frame, &shift) in stack.iter().zip(shifts.iter()) {
        let single = pspdi.forward_model(&wave, shift);
        assert!(max_abs_diff(&frame.data, &single.data) <= 1e-12 * max_value(&single.data));
    }
}

/// Сквозная проверка: фаза, восстановленная по пяти кадрам, совпадает с
/// фазой первой гармоники интенсивности по сдвигу решетки.
///
/// Синусоидальная решетка дает поле на детекторе вида
/// `E(s) = A0 + A1 exp(is) + A-1 exp(-is)`, поэтому `A_m` точно
/// восстанавливаются по четырем сдвигам с шагом π/2, а первая гармоника
/// интенсивности имеет фазу `arg(A1 conj(A0) + A0 conj(A-1))`.
#[test]
fn schwider_reconstruction_end_to_end() {
    let pspdi = small_pspdi(&small_config());
    let wave = aberrated_pupil();

    let fields: Vec<Array2<C>> = (0..4)
        .map(|k| pspdi.forward_model_debug(&wave, k as F * PI / 2.0).total_field.data)
        .collect();
    let harmonic = |m: i32| {
        let mut a: Array2<C> = Array::zeros((64, 64));
        for (k, e) in fields.iter().enumerate() {
            let phasor = (-I * (m as F * k as F * PI / 2.0)).exp();
            a.scaled_add(phasor * 0.25, e);
        }
        a
    };
    let (a0, a1, am1) = (harmonic(0), harmonic(1), harmonic(-1));
    let z = Zip::from(&a0)
        .and(&a1)
        .and(&am1)
        .map_collect(|&a0, &a1, &am1| a1 * a0.conj() + a0 * am1.conj());
    let z_max = z.iter().map(|v| v.norm()).fold(0.0, F::max);
    assert!(z_max > 0.0);

    let stack = pspdi.frame_stack(&wave, SCHWIDER.shifts);
    let phase = SCHWIDER.reconstruct(&stack).unwrap();

    let mut checked = 0;
    for (p, zi) in phase.data.iter().zip(z.iter()) {
        if zi.norm() > 1e-3 * z_max {
            assert!(wrap(p - zi.arg()).abs() < 1e-6, "phase {} vs {}", p, zi.arg());
            checked += 1;
        }
    }
    assert!(checked > 100);
}

#[test]
fn carrier_removal_leaves_small_residual() {
    let grid = small_grid();
    let pspdi = small_pspdi(&small_config());
    let carrier = pspdi.carrier_phase();
    // 8 штрихов на 8 единицах: 2π на единицу длины вдоль x
    assert_relative_eq!(carrier[(5, 40)], 2.0 * PI * grid.x[40], max_relative = 1e-14);
    assert_eq!(carrier[(5, 40)], carrier[(60, 40)]);

    let config = PspdiConfig {
        grating_axis: String::from("y"),
        ..small_config()
    };
    let carrier_y = small_pspdi(&config).carrier_phase();
    assert_eq!(carrier_y, carrier.t().to_owned());

    let wave = aberrated_pupil();
    let phase_in = wave.data.mapv(|e| e.arg());
    let stack = pspdi.frame_stack(&wave, SCHWIDER.shifts);
    let unwrapped = unwrap_phase(&SCHWIDER.reconstruct(&stack).unwrap().data);

    let inside: Vec<(usize, usize)> = grid
        .rsq()
        .indexed_iter()
        .filter(|(_, &r2)| r2 <= (0.8 * EPD / 2.0).powi(2))
        .map(|(idx, _)| idx)
        .collect();
    let pv = |values: Vec<F>| {
        values.iter().copied().fold(F::MIN, F::max) - values.iter().copied().fold(F::MAX, F::min)
    };
    let raw_pv = pv(inside.iter().map(|&idx| unwrapped[idx]).collect());
    let residual_pv = pv(inside
        .iter()
        .map(|&idx| unwrapped[idx] - carrier[idx] - phase_in[idx])
        .collect());
    assert!(raw_pv > 30.0, "raw phase PV {}", raw_pv);
    assert!(residual_pv < 0.2 * raw_pv, "residual PV {} vs raw {}", residual_pv, raw_pv);
}

#[test]
fn arm_balance_ratio() {
    let dx = 0.1;
    let constant = |value: F| Wavefront::new(Array::from_elem((4, 6), C::new(value, 0.0)), dx, WAVELENGTH);
    let arm = |value: F| ArmFields {
        at_camera: constant(value),
        at_fpm: constant(0.0),
        after_fpm: constant(0.0),
    };
    let bundle = DebugBundle {
        total_field: constant(2.0_f64.sqrt() + 0.5_f64.sqrt()),
        reference: arm(2.0_f64.sqrt()),
        test: arm(0.5_f64.sqrt()),
    };
    let balance = evaluate_test_ref_arm_matching(&bundle);
    assert_relative_eq!(balance.ratio, 4.0, max_relative = 1e-12);
    assert_relative_eq!(balance.ref_intensity.mean(), 2.0, max_relative = 1e-12);
    assert_relative_eq!(balance.test_intensity.mean(), 0.5, max_relative = 1e-12);
    assert_eq!(balance.ref_intensity.shape(), [4, 6]);
}
