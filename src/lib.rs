//! Моделирование интерферометра с фазовым сдвигом и точечной дифракцией
//! (PS/PDI) и восстановление фазы по сериям интерферограмм (PSI).
//!
//! Цепочка: [`pdi::Pspdi::forward_model`] строит кадры для набора фазовых
//! сдвигов, [`psi::PsiFormalism::reconstruct`] дает свернутую фазу,
//! [`unwrap::unwrap_phase_rich`] -- непрерывную.
pub mod common;
pub mod config;
pub mod error;
pub mod grating;
pub mod macros;
pub mod pdi;
pub mod polynomials;
pub mod propagation;
pub mod psi;
pub mod rich_data;
pub mod traits;
pub mod unwrap;
pub mod wavefront;

pub use config::{C, F, I, PI};
pub use error::{PdiError, Result};
pub use log;

#[cfg(test)]
mod tests;
