//! Result caching for station lookups.
//!
//! Provides a bounded LRU memoizer keyed by request parameters, with
//! single-flight deduplication of concurrent misses, and a resolver that
//! probes tide datums through it in preference order.

pub mod datum;
pub mod key;
pub mod memoizer;

pub use datum::{DatumFallbackResolver, ResolvedDatum};
pub use key::{CacheKey, KeyPart};
pub use memoizer::{CacheValue, KeyedMemoizer, MemoizerStats, StatsSnapshot, DEFAULT_CAPACITY};
