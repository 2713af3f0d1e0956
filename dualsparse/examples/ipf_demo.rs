//! Fit a small contingency table to target marginals with repeated IPF steps

use dualsparse::{AccessMode, ProbSparseMatrix, Result};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Observed co-occurrence counts
    let mut counts = ProbSparseMatrix::new(3, 3, AccessMode::RowWise, true);
    for &(i, j, n) in &[(0, 0, 12.0), (0, 2, 3.0), (1, 1, 7.0), (1, 2, 5.0), (2, 0, 2.0), (2, 1, 9.0)] {
        counts.incr(i, j, n, true)?;
    }
    counts.normalize_joint()?;
    println!("Joint distribution ok: {}", counts.is_joint_prob_integrity_ok());

    let row_marginal = [0.5, 0.3, 0.2];
    let col_marginal = [0.2, 0.4, 0.4];

    let mut current = counts.clone();
    for iteration in 0..20 {
        let mut next = ProbSparseMatrix::new(3, 3, AccessMode::RowWise, true);
        next.iterative_proportional_fitting_step(&current, &row_marginal, &col_marginal)?;
        let change = next.euclidian_distance(&current)?;
        current = next;
        println!("iteration {iteration:2}: change {change:.6}");
        if change < 1e-9 {
            break;
        }
    }

    for i in 0..3 {
        println!("row {i}: sum {:.4}", current.sum_row(i)?);
    }
    for j in 0..3 {
        println!("col {j}: sum {:.4}", current.sum_col(j)?);
    }
    println!("\n{}", current.to_record_string());
    Ok(())
}
