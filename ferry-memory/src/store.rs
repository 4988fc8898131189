use ferry_core::{Error, QueryResult, Record, Result, RowsAffected, TableSchema, truncate_long};
use std::{
    collections::{HashMap, VecDeque},
    sync::{Mutex, MutexGuard, PoisonError},
};

/// Tables and statement journal shared by every connection to the same store.
#[derive(Default, Debug)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

#[derive(Default, Debug)]
struct StoreState {
    tables: HashMap<(String, String), MemoryTable>,
    executed: Vec<String>,
    answers: VecDeque<Vec<QueryResult>>,
    sessions_opened: usize,
    commits: usize,
    session_failure: Option<String>,
}

#[derive(Debug)]
struct MemoryTable {
    schema: TableSchema,
    rows: Vec<Record>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create (or replace) an empty table.
    pub fn create_table(&self, project: &str, table: &str, schema: TableSchema) {
        self.state().tables.insert(
            (project.into(), table.into()),
            MemoryTable {
                schema,
                rows: Vec::new(),
            },
        );
    }

    /// Committed rows of a table, `None` if the table does not exist.
    pub fn rows(&self, project: &str, table: &str) -> Option<Vec<Record>> {
        self.state()
            .tables
            .get(&(project.into(), table.into()))
            .map(|t| t.rows.clone())
    }

    pub fn sessions_opened(&self) -> usize {
        self.state().sessions_opened
    }

    pub fn commits(&self) -> usize {
        self.state().commits
    }

    /// Text statements received so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.state().executed.clone()
    }

    /// Script the results of the next text statement. Unscripted statements
    /// report zero rows affected.
    pub fn respond_with(&self, results: impl IntoIterator<Item = QueryResult>) {
        self.state()
            .answers
            .push_back(results.into_iter().collect());
    }

    /// Make every following upload session creation fail with `reason`, `None` restores it.
    pub fn fail_sessions(&self, reason: Option<String>) {
        self.state().session_failure = reason;
    }

    pub(crate) fn answer(&self, sql: String) -> Vec<QueryResult> {
        log::debug!("Memory store received:\n{}", truncate_long!(sql));
        let mut state = self.state();
        state.executed.push(sql);
        state
            .answers
            .pop_front()
            .unwrap_or_else(|| vec![RowsAffected::default().into()])
    }

    pub(crate) fn open_session(&self, project: &str, table: &str) -> Result<TableSchema> {
        let mut state = self.state();
        if let Some(reason) = &state.session_failure {
            return Err(Error::msg(reason.clone()));
        }
        let schema = state
            .tables
            .get(&(project.into(), table.into()))
            .map(|t| t.schema.clone())
            .ok_or_else(|| Error::msg(format!("Table {project}.{table} not found")))?;
        state.sessions_opened += 1;
        Ok(schema)
    }

    pub(crate) fn commit(&self, project: &str, table: &str, rows: Vec<Record>) -> Result<()> {
        let mut state = self.state();
        let Some(target) = state.tables.get_mut(&(project.into(), table.into())) else {
            return Err(Error::msg(format!(
                "Table {project}.{table} was dropped before the commit"
            )));
        };
        target.rows.extend(rows);
        state.commits += 1;
        Ok(())
    }
}
