mod as_value;
mod batch;
mod charset;
mod connection;
mod driver;
mod error;
mod executor;
mod parameters;
mod prepared;
mod sql_writer;
mod tunnel;
mod util;
mod value;

pub use ::anyhow::Context as ErrorContext;
pub use as_value::*;
pub use batch::*;
pub use charset::*;
pub use connection::*;
pub use driver::*;
pub use error::*;
pub use executor::*;
pub use parameters::*;
pub use prepared::*;
pub use sql_writer::*;
pub use tunnel::*;
pub use util::*;
pub use value::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
