//! Client side of the Garden container API.
//!
//! Garden serves a JSON API over HTTP/1.1 on a local unix socket. This module
//! contains the wire models, a [`GardenApi`] implementation on top of `hyper`,
//! the retry-guarded [`ConnectionService`] that gates access to it, and the
//! [`list`] pass that turns Garden containers into
//! [`ContainerRecord`](crate::container::ContainerRecord)s.
mod client;
mod connection;
mod error;
mod lister;
pub mod models;
mod unix;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{GardenApi, HttpGardenClient};
pub use connection::{ConnectionService, DEFAULT_RETRY_COUNT, DEFAULT_RETRY_DELAY};
pub use error::{Error, Result};
pub(crate) use lister::build_listing;
pub use lister::{GARDEN_RUNTIME, Listing, list};
pub use unix::UnixConnector;

/// Default location of the Garden server socket.
pub const DEFAULT_SOCKET_PATH: &str = "/var/vcap/data/garden/garden.sock";
