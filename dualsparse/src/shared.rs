//! Shared handles to matrices
//!
//! Matrices are plain owned values and are not synchronized internally.
//! Several consumers can hold the same matrix through these handles; the
//! thread-safe variant makes callers take the lock for every mutation, so a
//! `set` can never interleave with another access on the same matrix.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use crate::matrix::DoubleAccessSparseMatrix;
use crate::prob::ProbSparseMatrix;

/// Single-threaded shared matrix
pub type SharedMatrix<T> = Rc<RefCell<DoubleAccessSparseMatrix<T>>>;

/// Single-threaded shared probability matrix
pub type SharedProbMatrix = Rc<RefCell<ProbSparseMatrix>>;

/// Matrix shared across threads behind a mutex
pub type SyncMatrix<T> = Arc<Mutex<DoubleAccessSparseMatrix<T>>>;

/// Probability matrix shared across threads behind a mutex
pub type SyncProbMatrix = Arc<Mutex<ProbSparseMatrix>>;

pub fn shared<T>(matrix: DoubleAccessSparseMatrix<T>) -> SharedMatrix<T> {
    Rc::new(RefCell::new(matrix))
}

pub fn shared_prob(matrix: ProbSparseMatrix) -> SharedProbMatrix {
    Rc::new(RefCell::new(matrix))
}

pub fn sync<T>(matrix: DoubleAccessSparseMatrix<T>) -> SyncMatrix<T> {
    Arc::new(Mutex::new(matrix))
}

pub fn sync_prob(matrix: ProbSparseMatrix) -> SyncProbMatrix {
    Arc::new(Mutex::new(matrix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dualsparse_core::AccessMode;
    use std::thread;

    #[test]
    fn test_shared_handles_see_writes() {
        let a = shared(DoubleAccessSparseMatrix::new(2, 2, AccessMode::RowWise, true, 0u64));
        let b = Rc::clone(&a);
        a.borrow_mut().set(1, 0, 4).unwrap();
        assert_eq!(b.borrow().get(1, 0), Ok(4));
        assert_eq!(b.borrow().col(0).unwrap().get(&1), Some(&4));
    }

    #[test]
    fn test_sync_counts_from_threads() {
        let counts = sync(DoubleAccessSparseMatrix::new(1, 4, AccessMode::RowWise, false, 0i64));
        let handles: Vec<_> = (0..4)
            .map(|j| {
                let counts = Arc::clone(&counts);
                thread::spawn(move || {
                    for _ in 0..100 {
                        counts.lock().unwrap().incr(0, j, 1).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let counts = counts.lock().unwrap();
        assert_eq!(counts.sum_row(0), Ok(400));
        assert_eq!(counts.size(), 4);
    }

    #[test]
    fn test_shared_prob_matrix() {
        let p = shared_prob(ProbSparseMatrix::new(1, 2, AccessMode::RowWise, false));
        p.borrow_mut().set(0, 0, 3.0, true).unwrap();
        p.borrow_mut().set(0, 1, 1.0, true).unwrap();
        p.borrow_mut().normalize_cond().unwrap();
        assert_eq!(p.borrow().get(0, 0), Ok(0.75));

        let q = sync_prob(p.borrow().clone());
        assert!(q.lock().unwrap().check_cond_prob_integrity());
    }
}
