use crate::config::F;
use ndarray::Array2;

/// Результат прохода "в фокус, через маску и обратно"
#[derive(Debug, Clone)]
pub struct FpmPass<W> {
    pub field: W,     // поле, вернувшееся в плоскость зрачка
    pub at_fpm: W,    // поле в фокальной плоскости до маски
    pub after_fpm: W, // и после маски
}

/// Трейт для оператора "фокусировка -> маска -> расфокусировка".
///
/// Прямой проход переносит поле в фокальную плоскость с шагом маски `fpm_dx`
/// и числом отсчетов, равным форме маски; центр окна смещен на
/// `shift = [x, y]`. После умножения на маску поле возвращается на исходную
/// сетку. Без маски (все единицы) при дуальной дискретизации операция
/// тождественна.
pub trait FocalPlaneRouter: Sized {
    /// Проход с сохранением промежуточных полей в фокальной плоскости
    fn to_fpm_and_back_full(&self, efl: F, fpm: &Array2<F>, fpm_dx: F, shift: [F; 2]) -> FpmPass<Self>;

    /// Проход, возвращающий только поле в плоскости зрачка
    fn to_fpm_and_back(&self, efl: F, fpm: &Array2<F>, fpm_dx: F, shift: [F; 2]) -> Self {
        self.to_fpm_and_back_full(efl, fpm, fpm_dx, shift).field
    }
}
