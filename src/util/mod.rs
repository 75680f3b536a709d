use std::sync::atomic::{AtomicU64, Ordering};

pub mod config;
pub mod version;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier such as `SHP-0001`.
pub fn next_id(prefix: &str) -> String {
    let sequence = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{sequence:04}")
}
