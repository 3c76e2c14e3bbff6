//! 程序运行函数.

use crate::result::AblationResult;
use std::thread;
use utils::loader;

/// 实际运行.
pub fn run() -> AblationResult {
    let slices = loader::slices_from_env().expect("Loading slices error");
    assert!(!slices.is_empty(), "No slice to run on");
    let slices = slices.as_slice();

    println!(
        "Running ablation studies on {} slices with {} cpus...",
        slices.len(),
        utils::cpus()
    );
    thread::scope(|s| {
        use super::algos::*;

        let handles = [connected4, connected8, density].map(|t| s.spawn(move || t(slices)));

        AblationResult::from_iter(
            ["connected-4", "connected-8", "dbscan"].into_iter().zip(
                handles
                    .into_iter()
                    .map(|th| th.join().expect("Thread joining error")),
            ),
        )
    })
}
