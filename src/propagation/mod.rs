pub mod fft_maker;
pub mod mdft;
