use super::space::SpatialGrid;
use crate::config::F;
use ndarray::prelude::*;

/// Бинарная круглая маска: 1 там, где `rsq <= radius_sq`, иначе 0
pub fn circle(radius_sq: F, rsq: &Array2<F>) -> Array2<F> {
    rsq.mapv(|r2| if r2 <= radius_sq { 1.0 } else { 0.0 })
}

/// Сглаженная круглая маска.
///
/// На краю значение линейно спадает от 1 до 0 на ширине одного отсчета `dx`,
/// что примерно соответствует доле площади пикселя внутри окружности.
pub fn truecircle(radius: F, rsq: &Array2<F>, dx: F) -> Array2<F> {
    rsq.mapv(|r2| ((radius - r2.sqrt()) / dx + 0.5).clamp(0.0, 1.0))
}

/// Бинарная круглая маска с центром в точке `center = [x, y]`
pub fn offset_circle(radius: F, grid: &SpatialGrid, center: [F; 2]) -> Array2<F> {
    let radius_sq = radius * radius;
    Array2::from_shape_fn(grid.shape(), |(iy, ix)| {
        let r2 = (grid.x[ix] - center[0]).powi(2) + (grid.y[iy] - center[1]).powi(2);
        if r2 <= radius_sq {
            1.0
        } else {
            0.0
        }
    })
}
