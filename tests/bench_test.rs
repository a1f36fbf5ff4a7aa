//! Benchmark tests for critical operations
//!
//! Run with: cargo test --release bench -- --ignored --nocapture

use std::sync::Arc;
use std::time::{Duration, Instant};

use tempfile::NamedTempFile;

use notehub::aggregator::Aggregator;
use notehub::database::{init_db, AppState};
use notehub::views::ViewCounter;

/// Runs `op` `iterations` times and prints one summary line
///
/// Returns the mean time per call so callers can compare two runs.
fn measure<F>(label: &str, iterations: u32, mut op: F) -> Duration
where
    F: FnMut(),
{
    let started = Instant::now();
    for _ in 0..iterations {
        op();
    }
    let elapsed = started.elapsed();
    let per_op = elapsed / iterations.max(1);

    println!(
        "  {label:<36} {iterations:>9} runs  {per_op:>12?}/op  ({:.0} ops/sec)",
        f64::from(iterations) / elapsed.as_secs_f64()
    );
    per_op
}

fn setup_state() -> (AppState, NamedTempFile) {
    let temp_db = NamedTempFile::new().unwrap();
    let db = init_db(temp_db.path().to_str().unwrap()).unwrap();
    (AppState::new(Arc::new(db)), temp_db)
}

#[test]
#[ignore] // Run explicitly with: cargo test bench --release -- --ignored --nocapture
fn bench_save_notes() {
    println!("\n=== Benchmark: Save notes ===\n");

    let (state, _temp_db) = setup_state();

    let create = measure("Create with generated id", 1000, || {
        state
            .service
            .save("", "benchmark note text body", "")
            .unwrap();
    });

    let note = state.service.save("", "benchmark note text body", "pw").unwrap();
    let update = measure("Update existing note", 1000, || {
        state
            .service
            .save(&note.id, "benchmark note text, revised", "pw")
            .unwrap();
    });
    println!(
        "\n  update/create ratio: {:.2}",
        update.as_secs_f64() / create.as_secs_f64()
    );
}

#[test]
#[ignore]
fn bench_load_and_flush() {
    println!("\n=== Benchmark: Load and flush ===\n");

    let (state, _temp_db) = setup_state();
    let ids: Vec<String> = (0..100)
        .map(|i| {
            state
                .service
                .save("", &format!("benchmark note number {i}"), "")
                .unwrap()
                .id
        })
        .collect();

    let mut next = 0;
    measure("Load (fetch + view increment)", 10_000, || {
        state.service.load(&ids[next % ids.len()]);
        next += 1;
    });

    let aggregator = Aggregator::new(
        state.service.view_counter().clone(),
        state.service.repository().clone(),
        Duration::from_secs(60),
    );
    measure("Flush 100 dirty notes", 100, || {
        for id in &ids {
            state.service.view_counter().increment(id);
        }
        aggregator.flush_once();
    });
}

#[test]
#[ignore]
fn bench_view_counter() {
    println!("\n=== Benchmark: View counter ===\n");

    let views = ViewCounter::new();
    measure("Increment hot id", 1_000_000, || {
        views.increment("hot");
    });
    measure("Drain", 1_000, || {
        views.increment("hot");
        views.drain_dirty();
    });
}
