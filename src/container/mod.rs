//! Container identity and the per-pass container record.
//!
//! A Garden container is addressed by its opaque *handle*. Downstream tag
//! consumers key containers by an *entity identifier* of the form
//! `container_id://<handle>`, shared with every other container collector.
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

mod error;
mod record;

pub use error::{Error, Result};
pub use record::{ContainerRecord, ContainerState, NetworkAddress, Skipped};

/// The maximum allowed length for a [`ContainerID`].
const CONTAINER_ID_MAX_LEN: usize = 255;

/// Prefix of every container entity identifier.
pub const CONTAINER_ENTITY_PREFIX: &str = "container_id://";

/// A validated, non-empty container handle.
///
/// # Examples
///
/// ```
/// # use garden_tagger::container::ContainerID;
/// let id = ContainerID::new("4a2c7d0e-3b1f-4e9a-6c5d-0f1e2d3c4b5a").unwrap();
/// assert_eq!(id.entity_id(), "container_id://4a2c7d0e-3b1f-4e9a-6c5d-0f1e2d3c4b5a");
/// assert!(ContainerID::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerID(Arc<str>);

impl ContainerID {
    /// Creates a new `ContainerID` from the given handle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyContainerID`] for an empty handle and
    /// [`Error::ContainerIDTooLong`] if it exceeds [`CONTAINER_ID_MAX_LEN`] bytes.
    pub fn new(src: impl AsRef<str>) -> Result<Self> {
        let src = src.as_ref();
        if src.is_empty() {
            return Err(Error::EmptyContainerID);
        }
        if src.len() > CONTAINER_ID_MAX_LEN {
            return Err(Error::ContainerIDTooLong {
                id: src.to_owned(),
                max: CONTAINER_ID_MAX_LEN,
            });
        }

        Ok(Self(src.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the entity identifier of this container.
    pub fn entity_id(&self) -> String {
        build_entity_id(&self.0)
    }
}

impl AsRef<str> for ContainerID {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ContainerID {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds the entity identifier for a container handle.
pub fn build_entity_id(handle: &str) -> String {
    format!("{CONTAINER_ENTITY_PREFIX}{handle}")
}

/// Extracts the container handle from an entity identifier.
///
/// Identifiers without the container prefix are taken to be bare handles.
pub fn handle_for_entity(entity: &str) -> &str {
    entity
        .strip_prefix(CONTAINER_ENTITY_PREFIX)
        .unwrap_or(entity)
}

/// Returns the first 12 bytes of a handle for log output.
pub(crate) fn short_id(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_round_trip() {
        let entity = build_entity_id("abc");
        assert_eq!(entity, "container_id://abc");
        assert_eq!(handle_for_entity(&entity), "abc");
    }

    #[test]
    fn test_handle_for_bare_entity() {
        assert_eq!(handle_for_entity("abc"), "abc");
        assert_eq!(handle_for_entity("container_id://"), "");
    }

    #[test]
    fn test_container_id_too_long() {
        let long = "a".repeat(CONTAINER_ID_MAX_LEN + 1);
        assert!(matches!(
            ContainerID::new(&long),
            Err(Error::ContainerIDTooLong { max: CONTAINER_ID_MAX_LEN, .. })
        ));
        assert!(ContainerID::new(&long[1..]).is_ok());
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdef"), "0123456789ab");
        assert_eq!(short_id("abc"), "abc");
    }
}
