/// Row-major 3x3 matrix
pub type Matrix3 = [[f64; 3]; 3];

/// Determinant by cofactor expansion along the first row.
pub fn determinant(m: &Matrix3) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

fn replace_column(m: &Matrix3, column: usize, values: &[f64; 3]) -> Matrix3 {
    let mut out = *m;
    for (row, value) in out.iter_mut().zip(values) {
        row[column] = *value;
    }
    out
}

/// Solve `m * t = rhs` by Cramer's rule.
///
/// Returns `None` when `|det(m)| <= singular_threshold`.
pub fn solve_cramer(m: &Matrix3, rhs: &[f64; 3], singular_threshold: f64) -> Option<[f64; 3]> {
    let det = determinant(m);
    if det.abs() <= singular_threshold || !det.is_finite() {
        return None;
    }

    Some([
        determinant(&replace_column(m, 0, rhs)) / det,
        determinant(&replace_column(m, 1, rhs)) / det,
        determinant(&replace_column(m, 2, rhs)) / det,
    ])
}
