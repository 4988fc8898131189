use crate::{
    Charset, Context, Error, ErrorContext, Executor, PreparedStatement, Result, TableTunnel,
    log_error, truncate_long,
};
use std::{borrow::Cow, future::Future};
use url::Url;
use urlencoding::decode;

/// Settings of a connection, decoded from its URL.
///
/// The URL has the shape `<driver>://<endpoint>/<default project>?charset=<name>`.
/// A missing `charset` means UTF-8, an empty one leaves the encoding unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub endpoint: String,
    /// Project used for table names that are not qualified.
    pub project: String,
    /// Encoding used to decode character data when rendering literals.
    pub charset: Option<Charset>,
}

impl ConnectionConfig {
    pub fn new(endpoint: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            project: project.into(),
            charset: Some(Charset::Utf8),
        }
    }

    pub fn with_charset(mut self, charset: Option<Charset>) -> Self {
        self.charset = charset;
        self
    }

    pub fn from_url(url: &str, driver_name: &str) -> Result<Self> {
        let context = || format!("While decoding the connection URL `{}`", truncate_long!(url));
        let prefix = format!("{}://", driver_name);
        if !url.starts_with(&prefix) {
            return Err(log_error(
                Error::msg(format!("Connection url must start with `{}`", &prefix))
                    .context(context()),
            ));
        }
        let parsed = Url::parse(url)
            .with_context(context)
            .map_err(log_error)?;
        let endpoint = parsed.host_str().unwrap_or_default().to_owned();
        let project = decode(parsed.path().trim_start_matches('/'))
            .with_context(context)
            .map_err(log_error)?
            .into_owned();
        if project.is_empty() || project.contains('/') {
            return Err(log_error(
                Error::msg("The path of the url must be the default project name")
                    .context(context()),
            ));
        }
        let charset = match parsed.query_pairs().find(|(k, _)| k == "charset") {
            None => Some(Charset::Utf8),
            Some((_, v)) if v.trim().is_empty() => None,
            Some((_, v)) => Some(
                v.parse::<Charset>()
                    .with_context(context)
                    .map_err(log_error)?,
            ),
        };
        Ok(Self {
            endpoint,
            project,
            charset,
        })
    }

    /// Writing context for literals rendered on this connection.
    pub fn context(&self) -> Context {
        Context::new(self.charset)
    }
}

pub trait Connection: Executor {
    type Tunnel: TableTunnel;

    /// Open a connection to the given URL
    fn connect(url: Cow<'static, str>) -> impl Future<Output = Result<Self>>;

    fn config(&self) -> &ConnectionConfig;

    /// Handle on the bulk ingestion channel of the store behind this connection.
    fn tunnel(&self) -> Self::Tunnel;

    fn prepare(&self, sql: impl Into<String>) -> PreparedStatement {
        PreparedStatement::new(sql).with_charset(self.config().charset)
    }
}
