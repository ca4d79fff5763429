//! Tide datum negotiation on top of the memoizer.

use std::future::Future;
use std::sync::Arc;

use marine_common::{Datum, FetchResult, MarineError, MarineResult, TimeRange};
use tracing::{debug, warn};

use crate::key::CacheKey;
use crate::memoizer::KeyedMemoizer;

/// A non-empty tide result and the datum that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDatum {
    pub result: FetchResult,
    pub datum: Datum,
}

/// Tries tide datums in preference order until one yields data.
///
/// Every probe goes through the memoizer, so a datum that answered before is
/// served from cache and a datum that came back empty is asked again next time.
#[derive(Clone)]
pub struct DatumFallbackResolver {
    memoizer: Arc<KeyedMemoizer<FetchResult>>,
}

impl DatumFallbackResolver {
    pub fn new(memoizer: Arc<KeyedMemoizer<FetchResult>>) -> Self {
        Self { memoizer }
    }

    pub fn memoizer(&self) -> &Arc<KeyedMemoizer<FetchResult>> {
        &self.memoizer
    }

    /// Cache key for one station, window and datum.
    pub fn key_for(station_id: &str, range: &TimeRange, datum: Datum) -> CacheKey {
        CacheKey::new()
            .with(station_id)
            .with(range.start)
            .with(range.end)
            .with(datum)
    }

    /// Return the first non-empty result across `preferences`.
    ///
    /// Datums after the first hit are never fetched. An error for one datum
    /// is treated like an empty answer and the next datum is tried; when no
    /// datum produces data the first such error is returned, otherwise
    /// `Ok(None)`.
    pub async fn resolve<F, Fut>(
        &self,
        station_id: &str,
        range: &TimeRange,
        preferences: &[Datum],
        fetch: F,
    ) -> MarineResult<Option<ResolvedDatum>>
    where
        F: Fn(Datum) -> Fut,
        Fut: Future<Output = MarineResult<Option<FetchResult>>> + Send + 'static,
    {
        if preferences.is_empty() {
            return Err(MarineError::invalid_parameter(
                "datum",
                "at least one tide datum is required",
            ));
        }

        let mut first_error = None;

        for &datum in preferences {
            let key = Self::key_for(station_id, range, datum);
            match self.memoizer.get_or_compute(key, || fetch(datum)).await {
                Ok(Some(result)) if !result.is_empty() => {
                    debug!("Station {} resolved tide data with datum {}", station_id, datum);
                    return Ok(Some(ResolvedDatum { result, datum }));
                }
                Ok(_) => {
                    debug!("Station {} has no tide data for datum {}", station_id, datum);
                }
                Err(e) => {
                    warn!(
                        "Tide fetch for station {} with datum {} failed: {}",
                        station_id, datum, e
                    );
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }
}
