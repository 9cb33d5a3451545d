//! Session-scoped reference-data store: populated exactly once from one batch
//! oracle invocation, read-only for the rest of the test run.

use crate::domain::{BridgeError, BridgeResult, DumpRequest, RawTable};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct ResultCache {
    tables: Option<BTreeMap<DumpRequest, RawTable>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_populated(&self) -> bool {
        self.tables.is_some()
    }

    pub fn table_count(&self) -> usize {
        self.tables.as_ref().map_or(0, BTreeMap::len)
    }

    /// One-time bulk load. A second call means the oracle was about to be
    /// invoked twice in one session.
    pub fn populate(&mut self, tables: BTreeMap<DumpRequest, RawTable>) -> BridgeResult<()> {
        if self.tables.is_some() {
            return Err(BridgeError::cache_already_populated(
                "CACHE.REPOPULATE",
                "result cache was already populated for this session",
            ));
        }
        self.tables = Some(tables);
        Ok(())
    }

    /// A miss signals that scan-time collection and lookup-time
    /// reconstruction disagreed about this request; it must never be
    /// swallowed into an empty table.
    pub fn lookup(&self, request: &DumpRequest) -> BridgeResult<&RawTable> {
        let Some(tables) = &self.tables else {
            return Err(BridgeError::cache_miss(
                "CACHE.MISS",
                format!("result cache was never populated; no reference data for '{request}'"),
            ));
        };
        tables.get(request).ok_or_else(|| {
            BridgeError::cache_miss(
                "CACHE.MISS",
                format!("no reference data was batched for '{request}'"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ResultCache;
    use crate::domain::{BridgeErrorCategory, DumpRequest, RawTable};
    use std::collections::BTreeMap;

    fn iron_request() -> DumpRequest {
        DumpRequest::build("Element", [("Z", "26")]).expect("request should build")
    }

    fn single_table() -> BTreeMap<DumpRequest, RawTable> {
        let table = RawTable::from_parts(
            vec!["Z".to_string()],
            vec![vec!["26".to_string()]],
        )
        .expect("table should build");
        BTreeMap::from([(iron_request(), table)])
    }

    #[test]
    fn populate_then_lookup_returns_the_stored_table() {
        let mut cache = ResultCache::new();
        cache.populate(single_table()).expect("first populate should succeed");

        assert!(cache.is_populated());
        assert_eq!(cache.table_count(), 1);
        let table = cache.lookup(&iron_request()).expect("lookup should hit");
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn second_populate_is_rejected() {
        let mut cache = ResultCache::new();
        cache.populate(single_table()).expect("first populate should succeed");
        let error = cache
            .populate(BTreeMap::new())
            .expect_err("second populate should fail");
        assert_eq!(error.category(), BridgeErrorCategory::CacheAlreadyPopulated);
    }

    #[test]
    fn miss_names_the_canonical_wire_line() {
        let mut cache = ResultCache::new();
        cache.populate(BTreeMap::new()).expect("populate should succeed");

        let request =
            DumpRequest::build("XRayTransition", [("trans", "1"), ("Z", "26")]).expect("builds");
        let error = cache.lookup(&request).expect_err("lookup should miss");
        assert_eq!(error.category(), BridgeErrorCategory::CacheMiss);
        assert!(
            error.message().contains("XRayTransition Z=26 trans=1"),
            "message should carry the canonical wire line: {}",
            error.message()
        );
    }

    #[test]
    fn lookup_before_populate_is_a_miss() {
        let cache = ResultCache::new();
        let error = cache.lookup(&iron_request()).expect_err("should miss");
        assert_eq!(error.category(), BridgeErrorCategory::CacheMiss);
    }
}
