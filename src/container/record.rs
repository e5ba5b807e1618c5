use std::net::IpAddr;

use crate::metrics::{ContainerMetrics, ContainerUsage, ResourceLimits};

use super::ContainerID;

/// Lifecycle state of a container as reported by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Active,
    Stopped,
    Unknown,
}

impl ContainerState {
    /// Maps a Garden `State` string onto a [`ContainerState`].
    pub fn from_garden(state: &str) -> Self {
        match state {
            "active" => ContainerState::Active,
            "stopped" => ContainerState::Stopped,
            _ => ContainerState::Unknown,
        }
    }
}

/// A host-side port binding of a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkAddress {
    /// `None` if the runtime reported no (or an unparsable) external IP.
    pub ip: Option<IpAddr>,
    pub port: u16,
    pub protocol: &'static str,
}

/// One container discovered during a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerRecord {
    id: ContainerID,
    entity_id: String,
    name: String,
    runtime: &'static str,
    state: ContainerState,
    addresses: Vec<NetworkAddress>,
    limits: Option<ResourceLimits>,
    metrics: Option<ContainerMetrics>,
}

impl ContainerRecord {
    pub fn new(
        id: ContainerID,
        runtime: &'static str,
        state: ContainerState,
        addresses: Vec<NetworkAddress>,
    ) -> Self {
        Self {
            entity_id: id.entity_id(),
            name: id.as_str().to_owned(),
            id,
            runtime,
            state,
            addresses,
            limits: None,
            metrics: None,
        }
    }

    pub fn id(&self) -> &ContainerID {
        &self.id
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn runtime(&self) -> &'static str {
        self.runtime
    }

    pub fn state(&self) -> ContainerState {
        self.state
    }

    pub fn addresses(&self) -> &[NetworkAddress] {
        &self.addresses
    }

    pub fn limits(&self) -> Option<&ResourceLimits> {
        self.limits.as_ref()
    }

    pub fn metrics(&self) -> Option<&ContainerMetrics> {
        self.metrics.as_ref()
    }

    /// Attaches limits and metrics to an active container.
    ///
    /// Returns `false` and leaves the record untouched if the container is not
    /// [`ContainerState::Active`].
    pub fn attach_usage(&mut self, usage: ContainerUsage) -> bool {
        if self.state != ContainerState::Active {
            return false;
        }
        self.limits = Some(usage.limits);
        self.metrics = Some(usage.metrics);
        true
    }

    /// Returns the attached limits and metrics, if any.
    pub fn usage(&self) -> Option<ContainerUsage> {
        Some(ContainerUsage {
            limits: self.limits.clone()?,
            metrics: self.metrics.clone()?,
        })
    }
}

/// A container left out of a pass, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub id: String,
    pub reason: String,
}

impl Skipped {
    pub fn new(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(state: ContainerState) -> ContainerRecord {
        ContainerRecord::new(ContainerID::new("abc").unwrap(), "garden", state, Vec::new())
    }

    #[test]
    fn test_state_from_garden() {
        assert_eq!(ContainerState::from_garden("active"), ContainerState::Active);
        assert_eq!(ContainerState::from_garden("stopped"), ContainerState::Stopped);
        assert_eq!(ContainerState::from_garden("running"), ContainerState::Unknown);
        assert_eq!(ContainerState::from_garden(""), ContainerState::Unknown);
    }

    #[test]
    fn test_new_record_derives_names() {
        let r = record(ContainerState::Active);
        assert_eq!(r.entity_id(), "container_id://abc");
        assert_eq!(r.name(), "abc");
        assert_eq!(r.runtime(), "garden");
        assert!(r.usage().is_none());
    }

    #[test]
    fn test_attach_usage_only_when_active() {
        let usage = ContainerUsage::default();

        let mut stopped = record(ContainerState::Stopped);
        assert!(!stopped.attach_usage(usage.clone()));
        assert!(stopped.metrics().is_none());
        assert!(stopped.limits().is_none());

        let mut active = record(ContainerState::Active);
        assert!(active.attach_usage(usage.clone()));
        assert_eq!(active.usage(), Some(usage));
    }
}
