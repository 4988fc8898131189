mod connection;
mod driver;
mod sql_writer;
mod store;
mod tunnel;

pub use connection::*;
pub use driver::*;
pub use sql_writer::*;
pub use store::*;
pub use tunnel::*;
