use log::info;
use ndarray::prelude::*;
use rpdi::common::{geometry::circle, space::SpatialGrid};
use rpdi::measure_time;
use rpdi::pdi::{evaluate_test_ref_arm_matching, Pspdi, PspdiConfig};
use rpdi::polynomials::cheby::cheby1_2d_sequence;
use rpdi::psi::SCHWIDER;
use rpdi::unwrap::unwrap_phase_rich;
use rpdi::wavefront::Wavefront;
use rpdi::F;

fn main() -> rpdi::Result<()> {
    env_logger::init();

    // параметры системы: мм для зрачка и фокусного расстояния, мкм для длины волны
    let epd: F = 10.0;
    let efl: F = 100.0;
    let wavelength: F = 0.6328;
    let samples = 256;
    let defocus_rad: F = 1.5;

    let config = match std::env::args().nth(1) {
        Some(path) => PspdiConfig::from_toml_file(path)?,
        None => PspdiConfig::default(),
    };
    info!("config: {:?}", config);

    // сетка зрачка с запасом вокруг апертуры
    let grid = SpatialGrid::make_xy_grid(samples, 1.2 * epd);
    let radius = epd / 2.0;
    let amplitude = circle(radius * radius, &grid.rsq());

    // исследуемый фронт: расфокусировка, записанная через T_2 по обеим осям
    let xn = &grid.x / radius;
    let yn = &grid.y / radius;
    let (tx, ty) = cheby1_2d_sequence(&[2], &[2], &xn, &yn);
    let phase = Array2::from_shape_fn(grid.shape(), |(iy, ix)| {
        defocus_rad * (tx[0][ix] + ty[0][iy]) * amplitude[(iy, ix)]
    });
    let wave = Wavefront::from_amp_and_phase(&amplitude, &phase, grid.dx, wavelength);

    let pdi = measure_time!("setup", { Pspdi::new(grid, efl, epd, wavelength, &config)? });

    let bundle = measure_time!("debug pass", { pdi.forward_model_debug(&wave, 0.0) });
    let balance = evaluate_test_ref_arm_matching(&bundle);
    info!("reference/test arm intensity ratio = {:.4}", balance.ratio);

    let frames = measure_time!("frame stack", { pdi.frame_stack(&wave, SCHWIDER.shifts) });
    let wrapped = SCHWIDER.reconstruct(&frames)?;
    let unwrapped = measure_time!("unwrap", { unwrap_phase_rich(&wrapped) });

    // остаток внутри апертуры: из восстановленной фазы вычитаются несущая
    // решетки 2π·rulings·x/epd и исходная фаза, затем поршень
    let carrier = pdi.carrier_phase();
    let residual: Vec<F> = unwrapped
        .data
        .indexed_iter()
        .filter(|&((iy, ix), _)| amplitude[(iy, ix)] > 0.0)
        .map(|((iy, ix), p)| p - carrier[(iy, ix)] - phase[(iy, ix)])
        .collect();
    let (pv, rms) = pv_rms(&residual);
    let input: Vec<F> = phase
        .iter()
        .zip(amplitude.iter())
        .filter(|(_, a)| **a > 0.0)
        .map(|(p, _)| *p)
        .collect();
    let (input_pv, input_rms) = pv_rms(&input);
    info!(
        "{}: {} frames, input phase PV = {:.3} rad, RMS = {:.3} rad",
        SCHWIDER.name,
        frames.len(),
        input_pv,
        input_rms
    );
    info!("reconstruction residual: PV = {:.3} rad, RMS = {:.3} rad", pv, rms);
    Ok(())
}

/// Размах и СКО относительно среднего
fn pv_rms(values: &[F]) -> (F, F) {
    let n = values.len() as F;
    let mean = values.iter().sum::<F>() / n;
    let rms = (values.iter().map(|p| (p - mean).powi(2)).sum::<F>() / n).sqrt();
    let pv = values.iter().cloned().fold(F::MIN, F::max) - values.iter().cloned().fold(F::MAX, F::min);
    (pv, rms)
}
