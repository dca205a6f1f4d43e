use pathfinding::kuhn_munkres::kuhn_munkres_min;
use pathfinding::matrix::Matrix;

const F32_I64_MULT: f32 = 1_000.0;

/// Scaled costs are clamped to this magnitude so the solver's potentials cannot overflow
const MAX_WEIGHT: i64 = 1 << 48;

/// Solves the minimum-cost assignment over a rectangular `rows x columns` cost matrix.
///
/// Exactly `min(rows, columns)` pairs `(row, column)` are returned, sorted by row. Each row and
/// each column appears at most once. The matrix is never padded: when there are more rows than
/// columns the problem is solved on the transposed matrix, so no fabricated pair can reference an
/// index outside of the input.
///
/// Costs are quantized to 1/1000 before solving and clamped to `2^48 / 1000`.
///
pub fn linear_sum_assignment(costs: &[Vec<f32>]) -> Vec<(usize, usize)> {
    let rows = costs.len();
    let columns = costs.first().map(Vec::len).unwrap_or(0);
    if rows == 0 || columns == 0 {
        return Vec::default();
    }
    debug_assert!(costs.iter().all(|r| r.len() == columns));

    let transposed = rows > columns;
    let (m_rows, m_columns) = if transposed {
        (columns, rows)
    } else {
        (rows, columns)
    };

    let mut weights = Matrix::new(m_rows, m_columns, 0i64);
    for (r, row) in costs.iter().enumerate() {
        for (c, cost) in row.iter().enumerate() {
            let index = if transposed { (c, r) } else { (r, c) };
            weights[index] = ((cost * F32_I64_MULT).round() as i64).clamp(-MAX_WEIGHT, MAX_WEIGHT);
        }
    }

    let (_, solution) = kuhn_munkres_min(&weights);

    let mut pairs = solution
        .into_iter()
        .enumerate()
        .map(|(r, c)| if transposed { (c, r) } else { (r, c) })
        .collect::<Vec<_>>();
    pairs.sort_unstable();
    pairs
}
