use std::collections::HashMap;

use crate::math::Point3;

type Cell = (i64, i64, i64);

/// Quantizes a coordinate to a grid cell index. Saturates at the `i64` range.
#[allow(clippy::cast_possible_truncation)]
fn cell(value: f64, inv: f64) -> i64 {
    (value * inv).floor() as i64
}

/// The 27 cells around `key`, itself included. Cells past the `i64` range
/// collapse onto the edge cell.
fn neighbourhood(key: Cell) -> impl Iterator<Item = Cell> {
    let step = |base: i64| (-1..=1).map(move |d: i64| base.saturating_add(d));
    step(key.0).flat_map(move |x| {
        step(key.1).flat_map(move |y| step(key.2).map(move |z| (x, y, z)))
    })
}

/// Merges points closer than `distance`.
///
/// Returns the surviving points and, for every input point, the index of
/// the point it was merged into. The first point of each cluster wins, so
/// survivors keep their relative order.
pub(crate) fn weld_points(points: &[Point3], distance: f64) -> (Vec<Point3>, Vec<usize>) {
    if !(distance.is_finite() && distance > 0.0) {
        return (points.to_vec(), (0..points.len()).collect());
    }

    let inv = 1.0 / distance;
    let mut buckets: HashMap<Cell, Vec<usize>> = HashMap::new();
    let mut out: Vec<Point3> = Vec::with_capacity(points.len());
    let mut remap = Vec::with_capacity(points.len());

    for p in points {
        let key = (cell(p.x, inv), cell(p.y, inv), cell(p.z, inv));

        let found = neighbourhood(key)
            .filter_map(|cell| buckets.get(&cell))
            .flatten()
            .copied()
            .find(|&c| (out[c] - p).norm() <= distance);

        let index = found.unwrap_or_else(|| {
            out.push(*p);
            buckets.entry(key).or_default().push(out.len() - 1);
            out.len() - 1
        });
        remap.push(index);
    }

    (out, remap)
}

/// Drops points no face references.
///
/// Returns the kept points and, per input point, its new index (`None` when
/// dropped).
pub(crate) fn drop_loose(
    points: &[Point3],
    faces: &[Vec<usize>],
) -> (Vec<Point3>, Vec<Option<usize>>) {
    let mut used = vec![false; points.len()];
    for &i in faces.iter().flatten() {
        used[i] = true;
    }

    let mut out = Vec::with_capacity(points.len());
    let remap = points
        .iter()
        .zip(&used)
        .map(|(p, &keep)| {
            keep.then(|| {
                out.push(*p);
                out.len() - 1
            })
        })
        .collect();
    (out, remap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn coincident_points_merge_into_first() {
        let points = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0005, 0.0, 0.0)];
        let (out, remap) = weld_points(&points, 0.001);
        assert_eq!(out.len(), 2);
        assert_eq!(remap, vec![0, 1, 0]);
    }

    #[test]
    fn merge_across_cell_boundary() {
        // Straddles the grid line at x = 0.001
        let points = [p(0.000_99, 0.0, 0.0), p(0.001_01, 0.0, 0.0)];
        let (out, remap) = weld_points(&points, 0.001);
        assert_eq!(out.len(), 1);
        assert_eq!(remap, vec![0, 0]);
    }

    #[test]
    fn distant_points_survive() {
        let points = [p(0.0, 0.0, 0.0), p(0.0, 0.0, 0.002)];
        let (out, _) = weld_points(&points, 0.001);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn saturated_cells_stay_separate() {
        let points = [
            p(1e16, 0.0, 0.0),
            p(3e16, 0.0, 0.0),
            p(-1e300, -1e300, 1e300),
            p(-1e300, -1e300, 1e300),
        ];
        let (out, remap) = weld_points(&points, 0.001);
        assert_eq!(out.len(), 3);
        assert_eq!(remap, vec![0, 1, 2, 2]);
    }

    #[test]
    fn loose_points_are_dropped() {
        let points = [p(0.0, 0.0, 0.0), p(9.0, 9.0, 9.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)];
        let (out, remap) = drop_loose(&points, &[vec![0, 2, 3]]);
        assert_eq!(out.len(), 3);
        assert_eq!(remap, vec![Some(0), None, Some(1), Some(2)]);
    }
}
