pub mod cheby;
pub mod jacobi;
