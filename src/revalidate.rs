//! Cache-invalidation signals for rendered listings.
//!
//! A successful mutation bumps the generation of the listing path it affects. Listing
//! handlers derive their `ETag` from that generation, so a client holding a stale copy
//! is sent fresh data on its next conditional request.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

pub trait Revalidator: Send + Sync {
    /// Marks every cached rendering of `path` as stale.
    fn revalidate(&self, path: &str);

    /// Number of times `path` has been revalidated since startup.
    fn generation(&self, path: &str) -> u64;

    /// Weak entity tag for the current generation of `path`.
    fn etag(&self, path: &str) -> String;
}

/// In-process generation counters, one per path.
pub struct PathRevalidator {
    // Distinguishes tags across restarts, when every counter starts again at zero.
    instance: Uuid,
    generations: Mutex<HashMap<String, u64>>,
}

impl Default for PathRevalidator {
    fn default() -> Self {
        Self::new()
    }
}

impl PathRevalidator {
    pub fn new() -> Self {
        Self {
            instance: Uuid::new_v4(),
            generations: Mutex::new(HashMap::new()),
        }
    }
}

impl Revalidator for PathRevalidator {
    fn revalidate(&self, path: &str) {
        let mut generations = self
            .generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let generation = generations.entry(path.to_string()).or_insert(0);
        *generation += 1;
        log::info!("Revalidated {} (generation {})", path, generation);
    }

    fn generation(&self, path: &str) -> u64 {
        self.generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    fn etag(&self, path: &str) -> String {
        format!("W/\"{}-{}\"", self.instance.simple(), self.generation(path))
    }
}
