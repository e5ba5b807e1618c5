use std::collections::HashMap;
use std::net::IpAddr;

use crate::container::{ContainerID, ContainerRecord, ContainerState, NetworkAddress, Skipped, short_id};

use super::models::{ContainerInfo, ContainerInfoEntry};
use super::{GardenApi, Result};

/// Runtime tag of every record produced from Garden.
pub const GARDEN_RUNTIME: &str = "garden";

/// Result of one discovery pass.
#[derive(Debug, Default)]
pub struct Listing {
    pub records: Vec<ContainerRecord>,
    /// Handles that were listed but could not be turned into a record.
    pub skipped: Vec<Skipped>,
}

/// Lists all containers with a single `containers` and a single `bulk_info` call.
///
/// Containers without a usable metadata entry are recorded in
/// [`Listing::skipped`] instead of failing the pass.
///
/// # Errors
///
/// Fails if either of the two backend calls fails.
pub async fn list<C: GardenApi>(client: &C) -> Result<Listing> {
    let handles = client.containers().await?;
    log::trace!("garden lists {} containers", handles.len());
    let entries = client.bulk_info(&handles).await?;

    Ok(build_listing(&handles, entries))
}

/// Maps `bulk_info` entries onto records, in the order of `handles`.
pub(crate) fn build_listing(
    handles: &[String],
    mut entries: HashMap<String, ContainerInfoEntry>,
) -> Listing {
    let mut listing = Listing::default();
    for handle in handles {
        let reason = match entries.remove(handle) {
            None => "no container info returned".to_owned(),
            Some(ContainerInfoEntry { err: Some(err), .. }) => {
                format!("failed to retrieve container info: {}", err.message)
            }
            Some(ContainerInfoEntry { info, err: None }) => match ContainerID::new(handle) {
                Ok(id) => {
                    listing.records.push(build_record(id, &info));
                    continue;
                }
                Err(err) => err.to_string(),
            },
        };
        log::debug!("skipping container `{}`: {}", short_id(handle), reason);
        listing.skipped.push(Skipped::new(handle.as_str(), reason));
    }

    listing
}

fn build_record(id: ContainerID, info: &ContainerInfo) -> ContainerRecord {
    let ip = info.external_ip.parse::<IpAddr>().ok();
    let addresses = info
        .mapped_ports
        .iter()
        .filter_map(|port| match u16::try_from(port.host_port) {
            Ok(port) => Some(NetworkAddress {
                ip,
                port,
                protocol: "tcp",
            }),
            Err(_) => {
                log::debug!("ignoring invalid host port {} of `{}`", port.host_port, id);
                None
            }
        })
        .collect();

    ContainerRecord::new(
        id,
        GARDEN_RUNTIME,
        ContainerState::from_garden(&info.state),
        addresses,
    )
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::garden::fake::{self, FakeGarden};
    use crate::garden::models::PortMapping;

    #[tokio::test]
    async fn test_list_maps_records_and_skips_broken() {
        let mut a = fake::info("active");
        a.external_ip = "10.0.0.5".to_owned();
        a.mapped_ports = vec![
            PortMapping {
                host_port: 61001,
                container_port: 8080,
            },
            PortMapping {
                host_port: 70000,
                container_port: 2222,
            },
        ];
        let client = FakeGarden::default()
            .with_container("a", a)
            .with_container("b", fake::info("stopped"))
            .with_broken_container("c", "unknown handle: c")
            .with_listed_handle("d");

        let listing = list(&client).await.unwrap();
        assert_eq!(client.containers_calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.bulk_info_calls.load(Ordering::SeqCst), 1);

        let ids: Vec<_> = listing.records.iter().map(|r| r.id().as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let a = &listing.records[0];
        assert_eq!(a.entity_id(), "container_id://a");
        assert_eq!(a.runtime(), "garden");
        assert_eq!(a.state(), ContainerState::Active);
        assert_eq!(
            a.addresses(),
            &[NetworkAddress {
                ip: Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5))),
                port: 61001,
                protocol: "tcp",
            }]
        );
        assert!(a.usage().is_none());
        assert_eq!(listing.records[1].state(), ContainerState::Stopped);

        let skipped: Vec<_> = listing.skipped.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(skipped, vec!["c", "d"]);
        assert!(listing.skipped[0].reason.contains("unknown handle: c"));
    }

    #[tokio::test]
    async fn test_list_skips_empty_handle() {
        let client = FakeGarden::default().with_container("", fake::info("active"));
        let listing = list(&client).await.unwrap();
        assert!(listing.records.is_empty());
        assert_eq!(listing.skipped.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_external_ip() {
        let mut info = fake::info("active");
        info.mapped_ports = vec![PortMapping {
            host_port: 61001,
            container_port: 8080,
        }];
        let client = FakeGarden::default().with_container("a", info);
        let listing = list(&client).await.unwrap();
        assert_eq!(listing.records[0].addresses()[0].ip, None);
    }

    #[tokio::test]
    async fn test_list_fails_on_backend_errors() {
        let client = FakeGarden::default().with_container("a", fake::info("active"));
        client.fail_bulk_info.store(true, Ordering::SeqCst);
        assert!(list(&client).await.is_err());

        client.fail_containers.store(true, Ordering::SeqCst);
        assert!(list(&client).await.is_err());
    }
}
