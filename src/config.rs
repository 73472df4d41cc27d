use num_complex::Complex;

// тип данных: f64 (точность важна для PSI и развертки фазы)
pub type F = f64;

// комплексный тип данных, согласованный с F
pub type C = Complex<F>;

// константы
pub const PI: F = std::f64::consts::PI;
pub const I: C = Complex::I;
