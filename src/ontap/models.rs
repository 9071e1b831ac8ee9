//! Typed views of the ONTAP REST records the checks read.
//!
//! ONTAP only returns the fields that were asked for and that apply to the object at hand, so
//! every field is optional.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

pub const SOFTWARE: &str = "/api/cluster/software";
pub const CLUSTER: &str = "/api/cluster";
pub const NODES: &str = "/api/cluster/nodes";
pub const AGGREGATES: &str = "/api/storage/aggregates";
pub const VOLUMES: &str = "/api/storage/volumes";
pub const LUNS: &str = "/api/storage/luns";
pub const DISKS: &str = "/api/storage/disks";
pub const ETHERNET_PORTS: &str = "/api/network/ethernet/ports";
pub const FC_PORTS: &str = "/api/network/fc/ports";
pub const IP_INTERFACES: &str = "/api/network/ip/interfaces";
pub const SNAPMIRROR_RELATIONSHIPS: &str = "/api/snapmirror/relationships";
pub const ENVIRONMENT_SENSORS: &str = "/api/private/cli/system/node/environment/sensors";

pub fn plexes(aggregate_uuid: &str) -> String {
    format!("{}/{}/plexes", AGGREGATES, aggregate_uuid)
}

pub fn snapshots(volume_uuid: &str) -> String {
    format!("{}/{}/snapshots", VOLUMES, volume_uuid)
}

/// A reference to another object, e.g. the node a disk is attached to.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Reference {
    pub name: Option<String>,
    pub uuid: Option<String>,
}

impl Reference {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("unknown")
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Software {
    pub version: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Cluster {
    pub name: Option<String>,
    pub version: Option<ClusterVersion>,
    pub metric: Option<ClusterMetric>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ClusterVersion {
    pub full: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ClusterMetric {
    pub status: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Node {
    pub name: Option<String>,
    pub state: Option<String>,
    pub membership: Option<String>,
    pub ha: Option<NodeHa>,
    pub controller: Option<Controller>,
    pub nvram: Option<Nvram>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct NodeHa {
    pub giveback: Option<HaState>,
    pub takeover: Option<HaState>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct HaState {
    pub state: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Controller {
    pub over_temperature: Option<String>,
    pub failed_fan: Option<FailedComponent>,
    pub failed_power_supply: Option<FailedComponent>,
    pub frus: Option<Vec<Fru>>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct FailedComponent {
    pub count: Option<u64>,
    pub message: Option<ComponentMessage>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ComponentMessage {
    pub message: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Fru {
    pub id: Option<String>,
    pub state: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Nvram {
    pub battery_state: Option<String>,
}

/// Size and usage figures shared by aggregates, volumes and luns.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Space {
    pub size: Option<u64>,
    pub used: Option<u64>,
    pub available: Option<u64>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Aggregate {
    pub uuid: Option<String>,
    pub name: Option<String>,
    pub space: Option<AggregateSpace>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AggregateSpace {
    pub block_storage: Option<Space>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Plex {
    pub name: Option<String>,
    pub raid_groups: Option<Vec<RaidGroup>>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RaidGroup {
    pub name: Option<String>,
    pub reconstruct: Option<Activity>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Activity {
    pub active: Option<bool>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Volume {
    pub uuid: Option<String>,
    pub name: Option<String>,
    pub state: Option<String>,
    pub style: Option<String>,
    pub comment: Option<String>,
    pub svm: Option<Reference>,
    pub space: Option<VolumeSpace>,
    pub files: Option<Files>,
    pub snapshot_count: Option<u64>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct VolumeSpace {
    pub size: Option<u64>,
    pub used: Option<u64>,
    pub available: Option<u64>,
    pub snapshot: Option<SnapshotSpace>,
}

impl VolumeSpace {
    pub fn as_space(&self) -> Space {
        Space {
            size: self.size,
            used: self.used,
            available: self.available,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct SnapshotSpace {
    pub used: Option<u64>,
    pub reserve_size: Option<u64>,
    pub space_used_percent: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Files {
    pub maximum: Option<u64>,
    pub used: Option<u64>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Snapshot {
    pub name: Option<String>,
    pub create_time: Option<DateTime<FixedOffset>>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Lun {
    pub name: Option<String>,
    pub space: Option<Space>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Disk {
    pub name: Option<String>,
    pub state: Option<String>,
    pub container_type: Option<String>,
    pub bay: Option<u64>,
    pub node: Option<Reference>,
    pub home_node: Option<Reference>,
    pub paths: Option<Vec<DiskPath>>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DiskPath {
    pub initiator: Option<String>,
    pub port_name: Option<String>,
    pub port_type: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Port {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub state: Option<String>,
    pub enabled: Option<bool>,
    pub node: Option<Reference>,
    pub lag: Option<Lag>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Lag {
    pub active_ports: Option<Vec<Reference>>,
    pub member_ports: Option<Vec<Reference>>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct FcPort {
    pub name: Option<String>,
    pub state: Option<String>,
    pub enabled: Option<bool>,
    pub physical_protocol: Option<String>,
    pub node: Option<Reference>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct IpInterface {
    pub name: Option<String>,
    pub state: Option<String>,
    pub enabled: Option<bool>,
    pub ip: Option<IpInfo>,
    pub location: Option<Location>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct IpInfo {
    pub address: Option<String>,
    pub netmask: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Location {
    pub is_home: Option<bool>,
    pub node: Option<Reference>,
    pub home_node: Option<Reference>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct SnapmirrorRelationship {
    pub state: Option<String>,
    pub healthy: Option<bool>,
    pub lag_time: Option<String>,
    pub source: Option<Endpoint>,
    pub unhealthy_reason: Option<Vec<UnhealthyReason>>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Endpoint {
    pub path: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct UnhealthyReason {
    pub message: Option<String>,
}

/// A row of `system node environment sensors show`, read through the CLI passthrough.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Sensor {
    pub node: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub state: Option<String>,
    pub value: Option<serde_json::Value>,
    pub units: Option<String>,
}
