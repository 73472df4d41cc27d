//! Двумерная развертка фазы.
//!
//! Алгоритм с сортировкой по надежности по несвязному пути:
//! M. A. Herráez, D. R. Burton, M. J. Lalor, M. A. Gdeisat, "Fast
//! two-dimensional phase-unwrapping algorithm based on sorting by reliability
//! following a noncontinuous path", Appl. Opt. 41, 7437-7444 (2002).
//!
//! Надежность пикселя обратна норме вторых разностей свернутой фазы. Ребра
//! между соседями обходятся по убыванию суммарной надежности, группы
//! пикселей сливаются через систему непересекающихся множеств, где каждый
//! узел хранит целое число периодов 2π относительно родителя.
use crate::config::{F, PI};
use crate::rich_data::RichData;
use log::debug;
use ndarray::prelude::*;
use rayon::prelude::*;

/// Сворачивание в (-π, π]
pub fn wrap(phase: F) -> F {
    let w = (phase + PI).rem_euclid(2.0 * PI) - PI;
    if w == -PI {
        PI
    } else {
        w
    }
}

/// Надежность пикселей; на границе массива -- 0
fn reliability(phase: &Array2<F>) -> Array2<F> {
    let (ny, nx) = phase.dim();
    let mut rel: Array2<F> = Array::zeros((ny, nx));
    if ny < 3 || nx < 3 {
        return rel;
    }
    rel.axis_iter_mut(Axis(0))
        .enumerate()
        .par_bridge()
        .for_each(|(iy, mut row)| {
            if iy == 0 || iy == ny - 1 {
                return;
            }
            for ix in 1..nx - 1 {
                let p = phase[(iy, ix)];
                let d2 = |a: F, b: F| wrap(a - p) - wrap(p - b);
                let h = d2(phase[(iy, ix - 1)], phase[(iy, ix + 1)]);
                let v = d2(phase[(iy - 1, ix)], phase[(iy + 1, ix)]);
                let diag1 = d2(phase[(iy - 1, ix - 1)], phase[(iy + 1, ix + 1)]);
                let diag2 = d2(phase[(iy - 1, ix + 1)], phase[(iy + 1, ix - 1)]);
                let norm = (h * h + v * v + diag1 * diag1 + diag2 * diag2).sqrt();
                row[ix] = if norm > 0.0 { 1.0 / norm } else { F::MAX };
            }
        });
    rel
}

/// Система непересекающихся множеств с целым смещением (в периодах 2π)
/// каждого узла относительно родителя
struct PeriodForest {
    parent: Vec<usize>,
    size: Vec<usize>,
    offset: Vec<i64>,
}

impl PeriodForest {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
            offset: vec![0; n],
        }
    }

    /// Корень и смещение узла относительно корня, со сжатием путей
    fn find(&mut self, node: usize) -> (usize, i64) {
        let mut path = Vec::new();
        let mut root = node;
        while self.parent[root] != root {
            path.push(root);
            root = self.parent[root];
        }
        // от ближайшего к корню узла к исходному
        let mut acc = 0;
        for &p in path.iter().rev() {
            acc += self.offset[p];
            self.offset[p] = acc;
            self.parent[p] = root;
        }
        (root, if path.is_empty() { 0 } else { self.offset[node] })
    }

    /// Присоединяет группу `rb` к `ra` так, что k(rb) = k(ra) + shift
    fn union(&mut self, ra: usize, rb: usize, shift: i64) {
        if self.size[ra] >= self.size[rb] {
            self.parent[rb] = ra;
            self.offset[rb] = shift;
            self.size[ra] += self.size[rb];
        } else {
            self.parent[ra] = rb;
            self.offset[ra] = -shift;
            self.size[rb] += self.size[ra];
        }
    }
}

/// Развертка свернутой фазы.
///
/// Результат отличается от свернутой фазы на целое число 2π в каждом пикселе;
/// общий уровень определен с точностью до константы, кратной 2π.
pub fn unwrap_phase(wrapped: &Array2<F>) -> Array2<F> {
    let (ny, nx) = wrapped.dim();
    let n = ny * nx;
    if n == 0 {
        return wrapped.clone();
    }
    let rel = reliability(wrapped);

    // ребра: горизонтальные (iy, ix)-(iy, ix+1) и вертикальные (iy, ix)-(iy+1, ix)
    let mut edges: Vec<(F, usize, usize)> = Vec::with_capacity(2 * n);
    for iy in 0..ny {
        for ix in 0..nx {
            let a = iy * nx + ix;
            if ix + 1 < nx {
                edges.push((rel[(iy, ix)] + rel[(iy, ix + 1)], a, a + 1));
            }
            if iy + 1 < ny {
                edges.push((rel[(iy, ix)] + rel[(iy + 1, ix)], a, a + nx));
            }
        }
    }
    edges.par_sort_unstable_by(|e1, e2| e2.0.total_cmp(&e1.0));

    let flat: Vec<F> = wrapped.iter().copied().collect();
    let two_pi = 2.0 * PI;
    let mut forest = PeriodForest::new(n);
    let mut merges = 0usize;
    for &(_, a, b) in edges.iter() {
        let (ra, ka) = forest.find(a);
        let (rb, kb) = forest.find(b);
        if ra == rb {
            continue;
        }
        // число периодов, при котором b ближе всего к a
        let ua = flat[a] + two_pi * ka as F;
        let ub = flat[b] + two_pi * kb as F;
        let shift = ((ua - ub) / two_pi).round() as i64;
        forest.union(ra, rb, shift);
        merges += 1;
    }
    debug!("phase unwrapping: {} edges, {} group merges", edges.len(), merges);

    let periods: Vec<i64> = (0..n).map(|p| forest.find(p).1).collect();
    Array2::from_shape_fn((ny, nx), |(iy, ix)| {
        let p = iy * nx + ix;
        flat[p] + two_pi * periods[p] as F
    })
}

/// Развертка с сохранением шага сетки и длины волны
pub fn unwrap_phase_rich(wrapped: &RichData) -> RichData {
    RichData::new(unwrap_phase(&wrapped.data), wrapped.dx, wrapped.wavelength)
}
