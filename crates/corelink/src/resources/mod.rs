//! Resource endpoints
//!
//! Thin typed accessors over the session's request pipeline, one per area of
//! Core's REST surface. Each borrows the [`Client`](crate::Client) for the
//! duration of a call and adds no pipeline semantics of its own beyond the
//! occasional "404 means absent".

pub mod chaos;
pub mod drivers;
pub mod modules;
pub mod nodes;

pub use chaos::Chaos;
pub use drivers::Drivers;
pub use modules::Modules;
pub use nodes::{Cluster, Nodes};

/// Percent-encode one path segment.
pub(crate) fn segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
