//! C4: assignment solver.
//!
//! Minimum-cost bipartite matching on a rectangular cost matrix, via the
//! classic O(n^3) Kuhn-Munkres (Hungarian) algorithm with potentials. Given
//! an m x n matrix of finite, non-negative costs, returns at most
//! `min(m, n)` (row, col) pairs with no row or column repeated, minimising
//! total matched cost. Deterministic: ties are always broken by the lowest
//! column index scanned first, so repeated runs on the same input produce
//! the same matching.

/// Result of solving a rectangular assignment problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub total_cost: f64,
    /// (row, col) pairs, 0-indexed, sorted by row.
    pub pairs: Vec<(usize, usize)>,
}

/// Solve the rectangular assignment problem on `cost` (m rows x n cols).
///
/// Panics if `cost` is empty, ragged, or contains a non-finite value — per
/// SPEC_FULL.md §7 this indicates a programming error upstream, not a
/// recoverable condition.
pub fn solve(cost: &[Vec<f64>]) -> Assignment {
    let m = cost.len();
    assert!(m > 0, "assignment solver requires at least one row");
    let n = cost[0].len();
    assert!(n > 0, "assignment solver requires at least one column");
    for row in cost {
        assert_eq!(row.len(), n, "ragged cost matrix");
        for &c in row {
            assert!(c.is_finite() && c >= 0.0, "non-finite or negative cost {c}");
        }
    }

    // The classic algorithm below requires rows <= cols; transpose otherwise
    // and swap the result back.
    if m <= n {
        solve_rows_le_cols(cost, m, n)
    } else {
        let transposed: Vec<Vec<f64>> = (0..n).map(|j| (0..m).map(|i| cost[i][j]).collect()).collect();
        let Assignment { total_cost, pairs } = solve_rows_le_cols(&transposed, n, m);
        Assignment {
            total_cost,
            pairs: pairs.into_iter().map(|(r, c)| (c, r)).collect(),
        }
    }
}

fn solve_rows_le_cols(cost: &[Vec<f64>], m: usize, n: usize) -> Assignment {
    const INF: f64 = f64::INFINITY;
    // 1-indexed internal arrays, row/col 0 are sentinels for "unmatched".
    let mut u = vec![0.0f64; m + 1];
    let mut v = vec![0.0f64; n + 1];
    let mut p = vec![0usize; n + 1]; // p[j] = row matched to column j
    let mut way = vec![0usize; n + 1];

    for i in 1..=m {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![INF; n + 1];
        let mut used = vec![false; n + 1];
        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = INF;
            let mut j1 = 0usize;
            for j in 1..=n {
                if !used[j] {
                    let cur = cost[i0 - 1][j - 1] - u[i0] - v[j];
                    if cur < minv[j] {
                        minv[j] = cur;
                        way[j] = j0;
                    }
                    if minv[j] < delta {
                        delta = minv[j];
                        j1 = j;
                    }
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut row_to_col = vec![None; m];
    for j in 1..=n {
        if p[j] > 0 {
            row_to_col[p[j] - 1] = Some(j - 1);
        }
    }

    let mut pairs = Vec::with_capacity(m);
    let mut total_cost = 0.0;
    for (row, col) in row_to_col.into_iter().enumerate() {
        if let Some(col) = col {
            total_cost += cost[row][col];
            pairs.push((row, col));
        }
    }
    Assignment { total_cost, pairs }
}
