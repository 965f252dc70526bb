//! Minimum-cost bipartite assignment.

use lapjv::{lapjv, Matrix};

use crate::error::AnnotrackError;

/// Cost of pairing a real object with a padding slot. Large enough that the
/// solver pairs as many real objects as possible.
const PADDING_COST: f64 = 1e6;

/// Outcome of one assignment round.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assignment {
    /// Accepted `(row, column)` pairs.
    pub matches: Vec<(usize, usize)>,
    pub unmatched_rows: Vec<usize>,
    pub unmatched_cols: Vec<usize>,
}

/// Pairs rows with columns at minimum total cost and keeps the pairs whose
/// cost is at most `threshold`.
///
/// `costs` is row-major; every row must have the same length.
pub fn assign(costs: &[Vec<f64>], threshold: f64) -> Result<Assignment, AnnotrackError> {
    let rows = costs.len();
    let cols = costs.first().map_or(0, Vec::len);

    if rows == 0 || cols == 0 {
        return Ok(Assignment {
            matches: vec![],
            unmatched_rows: (0..rows).collect(),
            unmatched_cols: (0..cols).collect(),
        });
    }

    let row_to_col = if rows == 1 && cols == 1 {
        vec![0]
    } else {
        // costs matrix must be square
        let size = rows.max(cols);
        let padded = Matrix::from_shape_fn((size, size), |(i, j)| {
            if i < rows && j < cols {
                costs[i][j]
            } else {
                PADDING_COST
            }
        });
        let (row_to_col, _) =
            lapjv(&padded).map_err(|err| AnnotrackError::Assignment(format!("{err:?}")))?;
        row_to_col
    };

    let mut matches = Vec::new();
    let mut unmatched_rows = Vec::new();
    let mut col_matched = vec![false; cols];

    for (i, &j) in row_to_col.iter().enumerate().take(rows) {
        if j < cols && costs[i][j] <= threshold {
            matches.push((i, j));
            col_matched[j] = true;
        } else {
            unmatched_rows.push(i);
        }
    }

    let unmatched_cols = col_matched
        .iter()
        .enumerate()
        .filter_map(|(j, &matched)| if matched { None } else { Some(j) })
        .collect();

    Ok(Assignment {
        matches,
        unmatched_rows,
        unmatched_cols,
    })
}
