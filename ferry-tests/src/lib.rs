mod batch;
mod people;
mod statement;

use crate::{
    batch::{batch_insert, batch_reuse, batch_rejected},
    statement::statement,
};
use ferry::Connection;
use log::LevelFilter;
use std::{env, sync::LazyLock};
use tokio::sync::Mutex;

pub use people::{PEOPLE, PEOPLE_COLUMNS, people_schema};

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Run the shared suite.
///
/// The connection default project must contain the table [`PEOPLE`] with the
/// schema [`people_schema`], its content is not inspected.
pub async fn execute_tests<C: Connection>(mut connection: C) {
    // The suites share the people table
    static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    let _lock = MUTEX.lock().await;
    statement(&mut connection).await;
    batch_insert(&mut connection).await;
    batch_reuse(&mut connection).await;
    batch_rejected(&mut connection).await;
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
