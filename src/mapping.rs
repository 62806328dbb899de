//! Joins volume inventory to instance inventory.
//!
//! The mapping is a transient view built once per invocation: one row per
//! attached volume, one row per unattached volume, and one row per instance
//! that has no volumes at all. Every volume appears in exactly one row.

use std::collections::BTreeMap;

use crate::backend::{EbsVolume, Ec2Instance};

/// A single output row pairing an instance with a volume.
///
/// At least one side is always present: rows for unattached volumes carry no
/// instance, rows for volume-less instances carry no volume.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MappingRow {
    /// Instance side of the pairing, absent for unattached volumes.
    pub instance: Option<Ec2Instance>,
    /// Volume side of the pairing, absent for instances with no volumes.
    pub volume: Option<EbsVolume>,
}

impl MappingRow {
    /// Builds a row for a volume attached to a known instance.
    #[must_use]
    pub const fn attached(instance: Ec2Instance, volume: EbsVolume) -> Self {
        Self {
            instance: Some(instance),
            volume: Some(volume),
        }
    }

    /// Builds a row for a volume with no owning instance. This also covers
    /// volumes whose attachment references an instance the provider did not
    /// return.
    #[must_use]
    pub const fn unattached(volume: EbsVolume) -> Self {
        Self {
            instance: None,
            volume: Some(volume),
        }
    }

    /// Builds a row for an instance with no volumes.
    #[must_use]
    pub const fn bare_instance(instance: Ec2Instance) -> Self {
        Self {
            instance: Some(instance),
            volume: None,
        }
    }
}

/// Joins volumes to instances by attachment reference.
///
/// Row order is deterministic: instances sorted by id (each followed by its
/// volumes sorted by id, or a single bare row), then unattached volumes
/// sorted by id. When `attached_only` is set, rows without an instance side
/// are suppressed.
#[must_use]
pub fn map_resources(
    instances: &[Ec2Instance],
    volumes: &[EbsVolume],
    attached_only: bool,
) -> Vec<MappingRow> {
    let mut by_instance: BTreeMap<&str, Vec<&EbsVolume>> = BTreeMap::new();
    let mut orphans: Vec<&EbsVolume> = Vec::new();

    let known_ids: std::collections::BTreeSet<&str> =
        instances.iter().map(|instance| instance.id.as_str()).collect();

    for volume in volumes {
        match volume.instance_id.as_deref() {
            Some(instance_id) if known_ids.contains(instance_id) => {
                by_instance.entry(instance_id).or_default().push(volume);
            }
            _ => orphans.push(volume),
        }
    }

    let mut sorted_instances: Vec<&Ec2Instance> = instances.iter().collect();
    sorted_instances.sort_by(|left, right| left.id.cmp(&right.id));

    let mut rows = Vec::new();
    for instance in sorted_instances {
        match by_instance.get(instance.id.as_str()) {
            Some(attached) => {
                let mut sorted_volumes = attached.clone();
                sorted_volumes.sort_by(|left, right| left.id.cmp(&right.id));
                for volume in sorted_volumes {
                    rows.push(MappingRow::attached(instance.clone(), volume.clone()));
                }
            }
            None => rows.push(MappingRow::bare_instance(instance.clone())),
        }
    }

    if !attached_only {
        orphans.sort_by(|left, right| left.id.cmp(&right.id));
        for volume in orphans {
            rows.push(MappingRow::unattached(volume.clone()));
        }
    }

    rows
}
