//! Collection-time orchestrator: scans test declarations, batches every
//! unique request through one oracle invocation, populates the cache, and
//! serves typed reference rows to individual test bodies.

use crate::cache::ResultCache;
use crate::domain::{BridgeError, BridgeResult, DumpRequest, RawTable};
use crate::oracle::BatchRunner;
use crate::schema::{SchemaRegistry, TypedRecord, validate_table};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// What a test exposes to opt into reference data: a stable test id, a dump
/// module, and the concrete argument combinations of its parametrization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpDeclaration {
    test_id: String,
    module: String,
    cases: Vec<Vec<(String, String)>>,
}

impl DumpDeclaration {
    pub fn new(test_id: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            test_id: test_id.into(),
            module: module.into(),
            cases: Vec::new(),
        }
    }

    pub fn with_case<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.cases.push(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    /// Add one case per combination of the given value dimensions, mirroring
    /// the cartesian product a host framework's parametrization produces.
    pub fn with_parameter_grid(mut self, dimensions: &[(&str, &[&str])]) -> Self {
        self.cases.extend(parameter_grid(dimensions));
        self
    }

    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn cases(&self) -> &[Vec<(String, String)>] {
        &self.cases
    }
}

/// Cartesian product of named parametrization dimensions. An empty dimension
/// list yields one argument-free combination; an empty value list yields no
/// combinations at all.
pub fn parameter_grid(dimensions: &[(&str, &[&str])]) -> Vec<Vec<(String, String)>> {
    let mut combinations: Vec<Vec<(String, String)>> = vec![Vec::new()];
    for (key, values) in dimensions {
        let mut expanded = Vec::with_capacity(combinations.len() * values.len());
        for combination in &combinations {
            for value in *values {
                let mut next = combination.clone();
                next.push((key.to_string(), value.to_string()));
                expanded.push(next);
            }
        }
        combinations = expanded;
    }
    combinations
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Idle,
    Scanning,
    Batching,
    Populated,
    DoneEmpty,
}

impl SessionState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Scanning => "SCANNING",
            Self::Batching => "BATCHING",
            Self::Populated => "POPULATED",
            Self::DoneEmpty => "DONE-EMPTY",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub declared_tests: usize,
    pub declared_cases: usize,
    pub unique_requests: usize,
    pub frames_received: usize,
    pub rows_received: usize,
    pub state: SessionState,
}

impl SessionReport {
    pub fn to_json_string(&self) -> BridgeResult<String> {
        serde_json::to_string_pretty(self).map_err(|source| {
            BridgeError::io_system(
                "SESSION.REPORT_ENCODE",
                format!("failed to encode session report: {source}"),
            )
        })
    }

    pub fn write_json(&self, path: &Path) -> BridgeResult<()> {
        let payload = self.to_json_string()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| {
                BridgeError::io_system(
                    "SESSION.REPORT_WRITE",
                    format!(
                        "failed to create report directory '{}': {}",
                        parent.display(),
                        source
                    ),
                )
            })?;
        }
        fs::write(path, payload + "\n").map_err(|source| {
            BridgeError::io_system(
                "SESSION.REPORT_WRITE",
                format!(
                    "failed to write session report '{}': {}",
                    path.display(),
                    source
                ),
            )
        })
    }
}

pub fn render_session_summary(report: &SessionReport) -> String {
    format!(
        "Oracle session: {}\n  declared tests: {}\n  declared cases: {}\n  unique requests: {}\n  frames received: {}\n  rows received: {}",
        report.state.as_str(),
        report.declared_tests,
        report.declared_cases,
        report.unique_requests,
        report.frames_received,
        report.rows_received,
    )
}

/// One oracle session: owns the schema registry and the result cache, runs
/// the `Idle -> Scanning -> (DoneEmpty | Batching -> Populated)` machine to
/// completion inside [`OracleSession::collect`], then serves read-only typed
/// lookups for the rest of the test run.
#[derive(Debug)]
pub struct OracleSession {
    registry: SchemaRegistry,
    cache: ResultCache,
    declared_modules: BTreeMap<String, String>,
    state: SessionState,
}

impl OracleSession {
    pub fn new(registry: SchemaRegistry) -> Self {
        Self {
            registry,
            cache: ResultCache::new(),
            declared_modules: BTreeMap::new(),
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Scan every declaration, dedupe requests, and run at most one batch.
    /// With zero requests the runner is never invoked. Any construction,
    /// transport, or protocol failure aborts collection for the whole run.
    pub fn collect(
        &mut self,
        declarations: &[DumpDeclaration],
        runner: &dyn BatchRunner,
    ) -> BridgeResult<SessionReport> {
        if self.state != SessionState::Idle {
            return Err(BridgeError::cache_already_populated(
                "SESSION.RECOLLECT",
                "collection already ran for this session",
            ));
        }
        self.state = SessionState::Scanning;

        let mut requests: BTreeSet<DumpRequest> = BTreeSet::new();
        let mut declared_cases = 0usize;
        for declaration in declarations {
            match self.declared_modules.get(declaration.test_id()) {
                Some(existing) if existing != declaration.module() => {
                    return Err(BridgeError::request_construction(
                        "SESSION.DECLARATION_CONFLICT",
                        format!(
                            "test '{}' declared with both module '{}' and module '{}'",
                            declaration.test_id(),
                            existing,
                            declaration.module()
                        ),
                    ));
                }
                _ => {
                    self.declared_modules.insert(
                        declaration.test_id().to_string(),
                        declaration.module().to_string(),
                    );
                }
            }
            for case in declaration.cases() {
                declared_cases += 1;
                requests.insert(DumpRequest::build(
                    declaration.module(),
                    case.iter().cloned(),
                )?);
            }
        }

        if requests.is_empty() {
            self.state = SessionState::DoneEmpty;
            return Ok(SessionReport {
                declared_tests: self.declared_modules.len(),
                declared_cases,
                unique_requests: 0,
                frames_received: 0,
                rows_received: 0,
                state: self.state,
            });
        }

        self.state = SessionState::Batching;
        let unique_requests = requests.len();
        let tables = runner.run_batch(&requests)?;
        let frames_received = tables.len();
        let rows_received = tables.values().map(RawTable::row_count).sum();
        self.cache.populate(tables)?;
        self.state = SessionState::Populated;

        Ok(SessionReport {
            declared_tests: self.declared_modules.len(),
            declared_cases,
            unique_requests,
            frames_received,
            rows_received,
            state: self.state,
        })
    }

    /// Per-test retrieval: rebuild the canonical request from the test's
    /// actual argument values, look it up, and validate against the module
    /// schema. A test that never declared a module fails fast.
    pub fn reference_rows<I, K, V>(
        &self,
        test_id: &str,
        arguments: I,
    ) -> BridgeResult<Vec<TypedRecord>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let Some(module) = self.declared_modules.get(test_id) else {
            return Err(BridgeError::missing_declaration(
                "SESSION.UNDECLARED_TEST",
                format!(
                    "test '{test_id}' requested reference data without an oracle-dependency declaration"
                ),
            ));
        };

        let request = DumpRequest::build(module.clone(), arguments)?;
        let table = self.cache.lookup(&request)?;
        let schema = self.registry.get(module)?;
        validate_table(schema, table)
            .map_err(|error| error.with_context(format!("request '{request}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::{DumpDeclaration, OracleSession, SessionState, parameter_grid};
    use crate::domain::BridgeErrorCategory;
    use crate::modules::builtin_schema_registry;
    use crate::oracle::BatchRunner;
    use std::collections::{BTreeMap, BTreeSet};

    struct EmptyRunner;

    impl BatchRunner for EmptyRunner {
        fn run_batch(
            &self,
            _requests: &BTreeSet<crate::domain::DumpRequest>,
        ) -> crate::domain::BridgeResult<BTreeMap<crate::domain::DumpRequest, crate::domain::RawTable>>
        {
            Ok(BTreeMap::new())
        }
    }

    #[test]
    fn parameter_grid_builds_the_full_cartesian_product() {
        let grid = parameter_grid(&[("Z", &["26", "79"]), ("trans", &["0", "1", "2"])]);
        assert_eq!(grid.len(), 6);
        assert_eq!(
            grid[0],
            vec![("Z".to_string(), "26".to_string()), ("trans".to_string(), "0".to_string())]
        );

        assert_eq!(parameter_grid(&[]).len(), 1);
        assert!(parameter_grid(&[("Z", &[])]).is_empty());
    }

    #[test]
    fn conflicting_declarations_for_one_test_fail_collection() {
        let declarations = [
            DumpDeclaration::new("test_shells", "AtomicShell").with_case([("Z", "26")]),
            DumpDeclaration::new("test_shells", "Element").with_case([("Z", "26")]),
        ];
        let mut session = OracleSession::new(builtin_schema_registry());
        let error = session
            .collect(&declarations, &EmptyRunner)
            .expect_err("conflicting module declarations should fail");
        assert_eq!(error.placeholder(), "SESSION.DECLARATION_CONFLICT");
    }

    #[test]
    fn second_collect_call_is_rejected() {
        let mut session = OracleSession::new(builtin_schema_registry());
        session
            .collect(&[], &EmptyRunner)
            .expect("empty collect should succeed");
        assert_eq!(session.state(), SessionState::DoneEmpty);

        let error = session
            .collect(&[], &EmptyRunner)
            .expect_err("second collect should fail");
        assert_eq!(
            error.category(),
            BridgeErrorCategory::CacheAlreadyPopulated
        );
    }
}
