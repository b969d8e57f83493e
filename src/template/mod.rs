//! Wildcard prompt templating.
//!
//! A prompt template mixes plain text with four kinds of markers:
//!
//! - `%Node.widget%` and `%date:yyyy-MM-dd%` metadata references
//! - `{a|b|c}` random choice groups
//! - `<random:0.5:1.5>` random numbers
//! - `__name__` wildcards drawn from line-based text files
//!
//! [`PromptResolver`] runs these in that order and repeats the whole
//! sequence until the text stops changing, since wildcard lines may contain
//! more markers. [`strip_syntax`] removes the markers without resolving them.

pub mod braces;
pub mod metadata;
pub mod random_range;
pub mod resolver;
pub mod source;
pub mod strip;
pub mod wildcard;

pub use metadata::{format_date_pattern, substitute_metadata, WorkflowMetadata};
pub use resolver::PromptResolver;
pub use source::{FsWildcardStore, InMemoryWildcards, WildcardSource};
pub use strip::strip_syntax;
pub use wildcard::{parse_wildcards, OffsetModifier, WildcardToken};
