// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Tracking of in-flight imagestream/template upserts

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Reports how many sample upserts are currently running. Secret events are
/// deferred while this is non-zero so both paths never write the Config status
/// at the same time.
pub trait UpsertGate: Send + Sync {
    fn in_flight_count(&self) -> usize;
}

/// Process-local upsert counter shared between the upsert cycle and the secret
/// event path. This binary does not run an imagestream/template upsert cycle
/// yet, so nothing calls `begin` outside tests and the gate stays open; an
/// upsert cycle takes a clone of the counter and holds a guard per upsert.
#[derive(Debug, Default, Clone)]
pub struct UpsertCounter {
    in_flight: Arc<AtomicUsize>,
}

impl UpsertCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an upsert as started; it is counted until the guard is dropped
    pub fn begin(&self) -> UpsertGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        UpsertGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl UpsertGate for UpsertCounter {
    fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct UpsertGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for UpsertGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
