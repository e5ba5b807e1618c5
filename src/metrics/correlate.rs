use crate::container::{ContainerRecord, ContainerState, Skipped, short_id};

use super::Snapshot;

/// Attaches normalized usage to every active record with a snapshot entry.
///
/// Records that are not active are left alone. Active records without a
/// snapshot entry, or whose entry fails to normalize, keep no usage and are
/// returned as skipped.
pub fn correlate(records: &mut [ContainerRecord], snapshot: &Snapshot) -> Vec<Skipped> {
    let mut skipped = Vec::new();
    for record in records
        .iter_mut()
        .filter(|r| r.state() == ContainerState::Active)
    {
        let handle = record.id().as_str();
        let Some(raw) = snapshot.get(handle) else {
            log::debug!("no metrics for container `{}`", short_id(handle));
            skipped.push(Skipped::new(handle, "no metrics snapshot entry"));
            continue;
        };
        match raw.normalize() {
            Ok(usage) => {
                record.attach_usage(usage);
            }
            Err(err) => {
                log::debug!(
                    "failed to read metrics of container `{}`: {}",
                    short_id(handle),
                    err
                );
                skipped.push(Skipped::new(handle, err.to_string()));
            }
        }
    }

    skipped
}
