use crate::{
    AsValue, BatchState, Charset, ColumnMismatch, Connection, Context, Driver, Error,
    ErrorContext, Parameters, ROW_UNKNOWN, ROW_WRITTEN, RecordWriter, Result, Row, RowLabeled,
    RowsAffected, SqlWriter, StatementError, TableTunnel, UploadSession, Value,
    count_placeholders, log_error, to_column_value, truncate_long,
    future::{self, Either},
    stream::{self, Stream},
};
use std::{
    borrow::Cow,
    fmt::{self, Display},
    mem,
    time::Instant,
};

/// A statement template with positional `?` placeholders.
///
/// Values are bound by 1-based index. The statement is either rendered into literal
/// SQL for a single execution, or accumulated row by row with [`add_batch`] and then
/// bulk loaded through an upload session by [`execute_batch`], which only accepts
/// `INSERT INTO <table> [(<columns>)] VALUES (?, ...)`.
///
/// Character data is encoded at bind time with the charset of the statement,
/// UTF-8 unless changed with [`with_charset`]. [`Connection::prepare`] uses the
/// charset of the connection.
///
/// Calls on one statement are sequential, the type holds no lock.
///
/// [`with_charset`]: PreparedStatement::with_charset
///
/// [`add_batch`]: PreparedStatement::add_batch
/// [`execute_batch`]: PreparedStatement::execute_batch
#[derive(Debug, Clone)]
pub struct PreparedStatement {
    sql: String,
    placeholders: usize,
    parameters: Parameters,
    batch: Vec<Row>,
    state: BatchState,
    charset: Option<Charset>,
}

impl PreparedStatement {
    pub fn new(sql: impl Into<String>) -> Self {
        let sql = sql.into();
        Self {
            placeholders: count_placeholders(&sql),
            sql,
            parameters: Parameters::new(),
            batch: Vec::new(),
            state: BatchState::Unverified,
            charset: Some(Charset::Utf8),
        }
    }

    /// Charset used to encode the character data bound from now on.
    pub fn with_charset(mut self, charset: Option<Charset>) -> Self {
        self.charset = charset;
        self
    }

    pub fn charset(&self) -> Option<Charset> {
        self.charset
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of `?` in the template, it is the width of every batched row.
    pub fn placeholders(&self) -> usize {
        self.placeholders
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Rows queued by [`PreparedStatement::add_batch`].
    pub fn batch(&self) -> &[Row] {
        &self.batch
    }

    pub fn state(&self) -> &BatchState {
        &self.state
    }

    /// Bind a value at `index` (from 1), replacing the previous one.
    ///
    /// ```rust
    /// use ferry_core::PreparedStatement;
    /// let mut statement = PreparedStatement::new("SELECT * FROM t WHERE id = ? AND name = ?");
    /// statement.bind(1, 42)?.bind(2, "abc")?;
    /// # Ok::<(), ferry_core::Error>(())
    /// ```
    pub fn bind(&mut self, index: u32, value: impl AsValue) -> Result<&mut Self> {
        let value = value.as_value_encoded(self.charset).map_err(log_error)?;
        self.parameters.bind(index, value)?;
        Ok(self)
    }

    /// Bind SQL NULL at `index`.
    pub fn bind_null(&mut self, index: u32) -> Result<&mut Self> {
        self.parameters.bind(index, Value::Null)?;
        Ok(self)
    }

    /// Remove all the bound values, the queued rows are kept.
    pub fn clear_parameters(&mut self) -> &mut Self {
        self.parameters.clear();
        self
    }

    /// Queue the current bindings as a row and clear them.
    pub fn add_batch(&mut self) -> &mut Self {
        let row = self.parameters.compact(self.placeholders);
        self.batch.push(row);
        self
    }

    pub fn clear_batch(&mut self) -> &mut Self {
        self.batch.clear();
        self
    }

    /// Render the template with the current bindings as literals.
    pub fn render(&self, writer: &dyn SqlWriter, context: &mut Context) -> Result<Cow<'_, str>> {
        writer
            .write_query(context, &self.sql, &self.parameters)
            .with_context(|| format!("While rendering the statement:\n{}", truncate_long!(self.sql)))
            .map_err(log_error)
    }

    /// Render the template using the dialect and charset of `connection`.
    pub fn render_for<C: Connection>(&self, connection: &C) -> Result<Cow<'_, str>> {
        let writer = connection.driver().sql_writer();
        let mut context = connection.config().context();
        let sql = self.render(writer.as_dyn(), &mut context)?;
        log::debug!("Rendered statement:\n{}", truncate_long!(sql));
        Ok(sql)
    }

    /// Execute the rendered statement, returns true when it produced a result set.
    pub async fn execute<C: Connection>(&self, connection: &mut C) -> Result<bool> {
        let sql = self.render_for(connection)?.into_owned();
        connection.submit(sql).await
    }

    /// Execute the rendered statement and stream its rows.
    pub fn execute_query<C: Connection>(
        &self,
        connection: &mut C,
    ) -> impl Stream<Item = Result<RowLabeled>> + Send {
        match self.render_for(connection) {
            Ok(sql) => Either::Left(connection.fetch(sql.into_owned())),
            Err(e) => Either::Right(stream::once(future::ready(Err::<RowLabeled, _>(e)))),
        }
    }

    /// Execute the rendered statement and return the number of rows affected.
    pub async fn execute_update<C: Connection>(&self, connection: &mut C) -> Result<RowsAffected> {
        let sql = self.render_for(connection)?.into_owned();
        connection.execute(sql).await
    }

    /// Bulk load the queued rows into the table named by the statement.
    ///
    /// The first call checks the template against the insert grammar, the result is
    /// cached for the lifetime of the statement. An empty queue returns an empty
    /// result without opening any session. The rows go through one upload session
    /// which is committed only after every row was written, so a failure leaves the
    /// table untouched. The queue is always emptied.
    ///
    /// Returns one outcome per row: [`ROW_WRITTEN`] for every row when successful.
    pub async fn execute_batch<C: Connection>(&mut self, connection: &C) -> Result<Vec<i32>> {
        let rows = mem::take(&mut self.batch);
        let target = self.state.verify(&self.sql)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let (project, table) = target.resolve(&connection.config().project);
        upload_rows(connection.tunnel(), project, table, &rows).await
    }
}

async fn upload_rows<T: TableTunnel>(
    mut tunnel: T,
    project: &str,
    table: &str,
    rows: &[Row],
) -> Result<Vec<i32>> {
    log::debug!(
        "{} records are going to be uploaded to table {}.{} in batch",
        rows.len(),
        project,
        table
    );
    let session_error = |reason: String| {
        log_error(Error::new(StatementError::SessionOpen {
            project: project.into(),
            table: table.into(),
            reason,
        }))
    };
    let context = || format!("While uploading {} records to {}.{}", rows.len(), project, table);
    let mut update_counts = vec![ROW_UNKNOWN; rows.len()];
    let mut session = tunnel
        .create_upload_session(project, table)
        .await
        .map_err(|e| session_error(format!("{e:#}")))?;
    log::info!("Created upload session id={}", session.id());
    let schema = session.schema().clone();
    let width = rows.first().map_or(0, |row| row.len());
    if width != schema.len() {
        return Err(session_error(format!(
            "the table has {} columns, but insert {} values",
            schema.len(),
            width
        )));
    }
    let mut record = session.new_record();
    let start = Instant::now();
    let mut writer = session
        .open_record_writer(0, true)
        .await
        .with_context(context)
        .map_err(log_error)?;
    for (i, row) in rows.iter().enumerate() {
        for (j, column) in schema.columns.iter().enumerate() {
            let value = row.get(j).unwrap_or(&Value::Null);
            let column_value = to_column_value(value, column.column_type).map_err(|mismatch| {
                log_error(Error::new(match mismatch {
                    ColumnMismatch::UnsupportedColumn => StatementError::UnsupportedColumnType {
                        column: j,
                        column_type: column.column_type,
                    },
                    ColumnMismatch::Expected(expected) => StatementError::RowTypeMismatch {
                        row: i,
                        column: j,
                        column_type: column.column_type,
                        expected,
                        found: value.kind_name(),
                        update_counts: update_counts.clone(),
                    },
                }))
            })?;
            record.set(j, column_value);
        }
        writer
            .write(&record)
            .await
            .with_context(context)
            .map_err(log_error)?;
        update_counts[i] = ROW_WRITTEN;
    }
    writer.flush().await.with_context(context).map_err(log_error)?;
    let elapsed = start.elapsed();
    let bytes = writer.total_bytes();
    writer.close().await.with_context(context).map_err(log_error)?;
    log::info!(
        "It took {} ms to insert {} records, {:.2} MiB/s",
        elapsed.as_millis(),
        rows.len(),
        bytes as f64 / 1024.0 / 1024.0 / elapsed.as_secs_f64().max(1e-9)
    );
    session
        .commit(&[0])
        .await
        .with_context(context)
        .map_err(log_error)?;
    Ok(update_counts)
}

impl Display for PreparedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.sql))
    }
}
