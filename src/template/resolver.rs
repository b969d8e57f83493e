//! Fixed-point prompt resolution.

use crate::config::{NodesConfig, DEFAULT_MAX_RESOLVE_ITERATIONS};
use crate::template::braces::resolve_braces;
use crate::template::metadata::{substitute_metadata, WorkflowMetadata};
use crate::template::random_range::resolve_random_ranges;
use crate::template::source::{FsWildcardStore, WildcardSource};
use crate::template::wildcard::resolve_wildcards;
use chrono::{Local, NaiveDateTime};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Resolves prompt templates against a wildcard source.
#[derive(Clone)]
pub struct PromptResolver {
    source: Arc<dyn WildcardSource>,
    max_iterations: usize,
}

impl std::fmt::Debug for PromptResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptResolver")
            .field("max_iterations", &self.max_iterations)
            .finish_non_exhaustive()
    }
}

impl PromptResolver {
    pub fn new(source: impl WildcardSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
            max_iterations: DEFAULT_MAX_RESOLVE_ITERATIONS,
        }
    }

    /// Filesystem wildcards rooted at `config.wildcards_dir`.
    pub fn from_config(config: &NodesConfig) -> Self {
        Self::new(FsWildcardStore::new(&config.wildcards_dir))
            .with_max_iterations(config.max_resolve_iterations)
    }

    /// Cap the number of full passes. At least one pass always runs.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Resolve `template` with the current local time for date tokens.
    pub fn resolve(
        &self,
        template: &str,
        seed: u64,
        metadata: Option<&WorkflowMetadata>,
    ) -> String {
        self.resolve_at(template, seed, metadata, Local::now().naive_local())
    }

    /// Resolve `template` as of `now`.
    ///
    /// Each call seeds its own generator, so equal arguments with an
    /// unchanged wildcard source give equal output.
    pub fn resolve_at(
        &self,
        template: &str,
        seed: u64,
        metadata: Option<&WorkflowMetadata>,
        now: NaiveDateTime,
    ) -> String {
        let mut state = ResolutionState {
            rng: StdRng::seed_from_u64(seed),
            seed,
            source: self.source.as_ref(),
            metadata,
            now,
        };

        let mut current = template.to_string();
        for iteration in 1..=self.max_iterations {
            let next = state.pass(&current);
            if next == current {
                log::debug!("prompt settled after {} passes", iteration);
                return next;
            }
            current = next;
        }

        log::debug!(
            "prompt still changing after {} passes; returning last result",
            self.max_iterations
        );
        current
    }
}

/// State for one top-level resolve call.
struct ResolutionState<'a> {
    rng: StdRng,
    seed: u64,
    source: &'a dyn WildcardSource,
    metadata: Option<&'a WorkflowMetadata>,
    now: NaiveDateTime,
}

impl ResolutionState<'_> {
    fn pass(&mut self, text: &str) -> String {
        let text = substitute_metadata(text, self.metadata, &self.now);
        let text = resolve_braces(&text, &mut self.rng);
        let text = resolve_random_ranges(&text, &mut self.rng);
        resolve_wildcards(&text, self.seed, self.source, &mut self.rng)
    }
}
