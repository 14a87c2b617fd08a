//! Filtered random sampling over the remote catalog.
//!
//! A draw picks a uniform id in `[1, catalog_size]`, fetches the record and
//! rejects it when it matches any exclusion token. The loop is bounded by the
//! configured consecutive-rejection and consecutive-failure limits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::backends::{CatalogBackendAdapter, CatalogError, CatalogRecord};
use crate::config::SamplerConfig;

/// Result of one bounded `draw_next` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    /// An admissible record was fetched.
    Found { record: CatalogRecord, attempts: u32 },
    /// Too many consecutive records matched the exclusion snapshot.
    Exhausted { attempts: u32 },
    /// Too many consecutive fetches failed; carries the last failure.
    TransportError { error: CatalogError, attempts: u32 },
}

/// Returned when a draw is requested while another one is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("a draw is already in progress")]
pub struct SamplerBusy;

/// Returns `true` when `record` matches at least one exclusion token.
///
/// Name and category tags match by case-insensitive substring. Id, height and
/// weight match only when their decimal form equals the token exactly.
pub fn record_matches_exclusions(record: &CatalogRecord, exclusions: &[String]) -> bool {
    if exclusions.is_empty() {
        return false;
    }
    let name = record.name.to_lowercase();
    let tags: Vec<String> = record
        .category_tags
        .iter()
        .map(|tag| tag.to_lowercase())
        .collect();
    let id = record.id.to_string();
    let height = record.height.to_string();
    let weight = record.weight.to_string();

    exclusions.iter().any(|token| {
        let needle = token.to_lowercase();
        name.contains(&needle)
            || tags.iter().any(|tag| tag.contains(&needle))
            || id == *token
            || height == *token
            || weight == *token
    })
}

struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Single-flight sampler bound to one catalog adapter.
pub struct Sampler {
    backend: Arc<dyn CatalogBackendAdapter>,
    catalog_size: u32,
    policy: SamplerConfig,
    rng: Mutex<StdRng>,
    busy: AtomicBool,
}

impl Sampler {
    /// Creates a sampler seeded from the operating system.
    pub fn new(
        backend: Arc<dyn CatalogBackendAdapter>,
        catalog_size: u32,
        policy: SamplerConfig,
    ) -> Self {
        let mut seed = [0u8; 32];
        getrandom::fill(&mut seed).expect("Failed to generate random seed");
        Self::with_rng(backend, catalog_size, policy, StdRng::from_seed(seed))
    }

    pub fn with_rng(
        backend: Arc<dyn CatalogBackendAdapter>,
        catalog_size: u32,
        policy: SamplerConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            backend,
            catalog_size: catalog_size.max(1),
            policy,
            rng: Mutex::new(rng),
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn begin_draw(&self) -> Result<BusyGuard<'_>, SamplerBusy> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SamplerBusy)?;
        Ok(BusyGuard { flag: &self.busy })
    }

    fn random_id(&self) -> u32 {
        let mut rng = self.rng.lock().expect("sampler rng lock poisoned");
        rng.gen_range(1..=self.catalog_size)
    }

    /// Draws records until one passes `exclusions` or a retry bound is hit.
    ///
    /// `exclusions` is read once per call; changes made elsewhere while the
    /// draw runs apply to the next call only.
    pub fn draw_next(&self, exclusions: &[String]) -> Result<DrawOutcome, SamplerBusy> {
        let _guard = self.begin_draw()?;
        let max_rejections = self.policy.max_consecutive_rejections.max(1);
        let max_failures = self.policy.max_consecutive_fetch_failures.max(1);
        let mut attempts = 0u32;
        let mut consecutive_rejections = 0u32;
        let mut consecutive_failures = 0u32;

        loop {
            let id = self.random_id();
            attempts = attempts.saturating_add(1);
            match self.backend.fetch_record(id) {
                Ok(record) => {
                    consecutive_failures = 0;
                    if !record_matches_exclusions(&record, exclusions) {
                        return Ok(DrawOutcome::Found { record, attempts });
                    }
                    consecutive_rejections += 1;
                    debug!(
                        "Sampler: rejected id={} name={} ({}/{})",
                        record.id, record.name, consecutive_rejections, max_rejections
                    );
                    if consecutive_rejections >= max_rejections {
                        return Ok(DrawOutcome::Exhausted { attempts });
                    }
                }
                Err(error) => {
                    consecutive_failures += 1;
                    warn!(
                        "Sampler: fetch failed for id={} ({}/{}): {}",
                        id, consecutive_failures, max_failures, error
                    );
                    if consecutive_failures >= max_failures {
                        return Ok(DrawOutcome::TransportError { error, attempts });
                    }
                }
            }
        }
    }
}
