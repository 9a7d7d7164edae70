//! Concurrency helpers: global thread-pool sizing and parallel row filtering.

use crate::table::{Row, Table};
use rayon::prelude::*;

/// Size rayon's global pool. Only the first call in a process has an effect.
pub fn install_parallelism(threads: Option<usize>) {
    if let Some(n) = threads {
        if n > 0 {
            rayon::ThreadPoolBuilder::new().num_threads(n).build_global().ok();
        }
    }
}

/// Evaluate `keep` on every row in parallel, then drop rejected rows in order.
pub fn par_retain<F>(table: &mut Table, keep: F)
where
    F: Sync + Fn(&Row) -> bool,
{
    let mask: Vec<bool> = table.rows.par_iter().map(|r| keep(r)).collect();
    let mut it = mask.into_iter();
    table.rows.retain(|_| it.next().unwrap_or(false));
}
