//! Lightweight global metrics for the entry store.
//!
//! Потокобезопасные атомарные счётчики для подсистем:
//! - Store (цепочки блоков, free‑лист)
//! - Codec (записи Entry)
//! - Skeleton tree (commit/load/release)

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

// ----- Store -----
static CHAINS_WRITTEN: AtomicU64 = AtomicU64::new(0);
static CHAINS_RELEASED: AtomicU64 = AtomicU64::new(0);
static BLOCKS_REUSED: AtomicU64 = AtomicU64::new(0);

// ----- Codec -----
static RECORDS_ENCODED: AtomicU64 = AtomicU64::new(0);
static RECORDS_DECODED: AtomicU64 = AtomicU64::new(0);

// ----- Skeleton tree -----
static NODES_COMMITTED: AtomicU64 = AtomicU64::new(0);
static NODES_LOADED: AtomicU64 = AtomicU64::new(0);
static NODES_RELEASED: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    // Store
    pub chains_written: u64,
    pub chains_released: u64,
    pub blocks_reused: u64,

    // Codec
    pub records_encoded: u64,
    pub records_decoded: u64,

    // Skeleton tree
    pub nodes_committed: u64,
    pub nodes_loaded: u64,
    pub nodes_released: u64,
}

impl MetricsSnapshot {
    /// Сколько раз в среднем запись подгружалась после commit.
    pub fn reload_ratio(&self) -> f64 {
        if self.nodes_committed == 0 {
            0.0
        } else {
            self.nodes_loaded as f64 / self.nodes_committed as f64
        }
    }
}

// ----- Recorders (Store) -----
pub fn record_chain_written() {
    CHAINS_WRITTEN.fetch_add(1, Ordering::Relaxed);
}
pub fn record_chain_released() {
    CHAINS_RELEASED.fetch_add(1, Ordering::Relaxed);
}
pub fn record_block_reused() {
    BLOCKS_REUSED.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (Codec) -----
pub fn record_entry_encoded() {
    RECORDS_ENCODED.fetch_add(1, Ordering::Relaxed);
}
pub fn record_entry_decoded() {
    RECORDS_DECODED.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (Skeleton tree) -----
pub fn record_node_committed() {
    NODES_COMMITTED.fetch_add(1, Ordering::Relaxed);
}
pub fn record_node_loaded() {
    NODES_LOADED.fetch_add(1, Ordering::Relaxed);
}
pub fn record_node_released() {
    NODES_RELEASED.fetch_add(1, Ordering::Relaxed);
}

// ----- Snapshot / Reset -----
pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        chains_written: CHAINS_WRITTEN.load(Ordering::Relaxed),
        chains_released: CHAINS_RELEASED.load(Ordering::Relaxed),
        blocks_reused: BLOCKS_REUSED.load(Ordering::Relaxed),

        records_encoded: RECORDS_ENCODED.load(Ordering::Relaxed),
        records_decoded: RECORDS_DECODED.load(Ordering::Relaxed),

        nodes_committed: NODES_COMMITTED.load(Ordering::Relaxed),
        nodes_loaded: NODES_LOADED.load(Ordering::Relaxed),
        nodes_released: NODES_RELEASED.load(Ordering::Relaxed),
    }
}

pub fn reset() {
    CHAINS_WRITTEN.store(0, Ordering::Relaxed);
    CHAINS_RELEASED.store(0, Ordering::Relaxed);
    BLOCKS_REUSED.store(0, Ordering::Relaxed);

    RECORDS_ENCODED.store(0, Ordering::Relaxed);
    RECORDS_DECODED.store(0, Ordering::Relaxed);

    NODES_COMMITTED.store(0, Ordering::Relaxed);
    NODES_LOADED.store(0, Ordering::Relaxed);
    NODES_RELEASED.store(0, Ordering::Relaxed);
}
