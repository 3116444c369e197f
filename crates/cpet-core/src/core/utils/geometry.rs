use crate::core::models::topology::TopologyRecord;
use nalgebra::{Point3, Vector3};

/// Three consecutive streamline points `p0, p1, p2`.
pub type PointTriple = [Point3<f64>; 3];

/// First and second forward differences of a point triple: `(p1 - p0, p2 - 2 p1 + p0)`.
#[inline]
pub fn finite_differences(triple: &PointTriple) -> (Vector3<f64>, Vector3<f64>) {
    let [p0, p1, p2] = triple;
    let first = p1 - p0;
    let second = (p2 - p1) - first;
    (first, second)
}

/// Curvature of the discrete curve through a point triple, `|v' x v''| / |v'|^3`.
///
/// A zero second difference gives exactly `0`. A zero first difference divides
/// by zero and gives a non-finite value; callers see it as-is.
#[inline]
pub fn curvature(triple: &PointTriple) -> f64 {
    let (first, second) = finite_differences(triple);
    first.cross(&second).norm() / first.norm().powi(3)
}

/// Reduces the start and end triples of a streamline to its topology record.
///
/// `distance` is measured between the zeroth points of the two triples; the
/// curvature is the mean of the two end curvatures.
pub fn curvature_and_distance(init: &PointTriple, last: &PointTriple) -> TopologyRecord {
    let mean_curvature = (curvature(init) + curvature(last)) / 2.0;
    let distance = (init[0] - last[0]).norm();
    TopologyRecord::new(distance, mean_curvature)
}

type Rows = Vec<Vector3<f32>>;

fn rows_from(points: &[[f32; 3]]) -> Rows {
    points.iter().map(|p| Vector3::new(p[0], p[1], p[2])).collect()
}

fn sub_rows(a: &Rows, b: &Rows) -> Rows {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

fn cross_rows(a: &Rows, b: &Rows) -> Rows {
    a.iter().zip(b).map(|(x, y)| x.cross(y)).collect()
}

fn norm_rows(a: &Rows) -> Vec<f32> {
    a.iter().map(|x| x.norm()).collect()
}

fn curvature_rows(p0: &Rows, p1: &Rows, p2: &Rows) -> Vec<f32> {
    let first = sub_rows(p1, p0);
    let second = sub_rows(&sub_rows(p2, p1), &first);
    let numerator = norm_rows(&cross_rows(&first, &second));
    let speed = norm_rows(&first);
    numerator
        .iter()
        .zip(&speed)
        .map(|(n, s)| n / (s * s * s))
        .collect()
}

/// Column-wise reduction of many streamlines at once, in single precision.
///
/// `columns` holds the six characteristic point columns
/// `[init, init+1, init+2, final, final+1, final+2]`, each with one row per
/// streamline. Each stage (differences, cross products, norms) runs over every
/// row before the next stage starts. Returns `(distances, mean_curvatures)`.
pub fn curvature_and_distance_batch(columns: [&[[f32; 3]]; 6]) -> (Vec<f32>, Vec<f32>) {
    let [i0, i1, i2, f0, f1, f2] = columns.map(rows_from);

    let init_curvature = curvature_rows(&i0, &i1, &i2);
    let final_curvature = curvature_rows(&f0, &f1, &f2);
    let mean_curvature = init_curvature
        .iter()
        .zip(&final_curvature)
        .map(|(a, b)| (a + b) / 2.0)
        .collect();
    let distance = norm_rows(&sub_rows(&i0, &f0));

    (distance, mean_curvature)
}
