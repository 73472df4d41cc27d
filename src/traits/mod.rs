pub mod fft_maker;
pub mod router;
