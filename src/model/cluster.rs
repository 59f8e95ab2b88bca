//! ClickHouse cluster configuration.
//!
//! Field names serialize in PascalCase; they are the keys of the cluster
//! schemas and the identifiers used in their predicates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::params::{FieldDef, FieldType, Reflect, StructRef};

/// Database used for connectivity checks.
pub const DEFAULT_DATABASE: &str = "default";

/// A managed ClickHouse cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ClusterConfig {
    pub cluster: String,
    pub logic_cluster: Option<String>,
    pub ssh_user: String,
    /// 0 = public key, 1 = password (saved), 2 = password (not saved).
    pub authenticate_type: u8,
    pub ssh_password: String,
    pub ssh_port: u16,
    pub user: String,
    pub password: String,
    pub is_replica: bool,
    pub manual_shards: bool,
    pub hosts: Vec<String>,
    pub shards: Vec<Shard>,
    pub port: u16,
    pub zk_nodes: Vec<String>,
    pub zk_port: u16,
    pub zk_status_port: u16,
    pub path: String,
    pub storage: Option<Storage>,
    pub version: String,
}

impl Reflect for ClusterConfig {
    const TYPE_NAME: &'static str = "ClusterConfig";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::new("Cluster", FieldType::String),
            FieldDef::new("LogicCluster", FieldType::String),
            FieldDef::new("SshUser", FieldType::String),
            FieldDef::new("AuthenticateType", FieldType::Int),
            FieldDef::new("SshPassword", FieldType::String),
            FieldDef::new("SshPort", FieldType::Int),
            FieldDef::new("User", FieldType::String),
            FieldDef::new("Password", FieldType::String),
            FieldDef::new("IsReplica", FieldType::Bool),
            FieldDef::new("ManualShards", FieldType::Bool),
            FieldDef::new("Hosts", FieldType::Array),
            FieldDef::new("Shards", FieldType::ObjectArray(StructRef::of::<Shard>())),
            FieldDef::new("Port", FieldType::Int),
            FieldDef::new("ZkNodes", FieldType::Array),
            FieldDef::new("ZkPort", FieldType::Int),
            FieldDef::new("ZkStatusPort", FieldType::Int),
            FieldDef::new("Path", FieldType::String),
            FieldDef::new("Storage", FieldType::Object(StructRef::of::<Storage>())),
            FieldDef::new("Version", FieldType::String),
        ];
        FIELDS
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Shard {
    pub replicas: Vec<Replica>,
}

impl Reflect for Shard {
    const TYPE_NAME: &'static str = "Shard";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[FieldDef::new(
            "Replicas",
            FieldType::ObjectArray(StructRef::of::<Replica>()),
        )];
        FIELDS
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Replica {
    pub ip: String,
    pub host_name: String,
}

impl Reflect for Replica {
    const TYPE_NAME: &'static str = "Replica";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::new("Ip", FieldType::String),
            FieldDef::new("HostName", FieldType::String),
        ];
        FIELDS
    }
}

/// Storage policy: disks plus the policies that reference them by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Storage {
    pub disks: Vec<Disk>,
    pub policies: Vec<Policy>,
}

impl Reflect for Storage {
    const TYPE_NAME: &'static str = "Storage";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::new("Disks", FieldType::ObjectArray(StructRef::of::<Disk>())),
            FieldDef::new("Policies", FieldType::ObjectArray(StructRef::of::<Policy>())),
        ];
        FIELDS
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Disk {
    pub name: String,
    /// `local`, `s3` or `hdfs`.
    #[serde(rename = "Type")]
    pub disk_type: String,
    pub disk_local: Option<DiskLocal>,
    #[serde(rename = "DiskS3")]
    pub disk_s3: Option<DiskS3>,
    pub disk_hdfs: Option<DiskHdfs>,
}

impl Reflect for Disk {
    const TYPE_NAME: &'static str = "Disk";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::new("Name", FieldType::String),
            FieldDef::new("Type", FieldType::String),
            FieldDef::new("DiskLocal", FieldType::Object(StructRef::of::<DiskLocal>())),
            FieldDef::new("DiskS3", FieldType::Object(StructRef::of::<DiskS3>())),
            FieldDef::new("DiskHdfs", FieldType::Object(StructRef::of::<DiskHdfs>())),
        ];
        FIELDS
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct DiskLocal {
    pub path: String,
    pub keep_free_space_bytes: Option<i64>,
}

impl Reflect for DiskLocal {
    const TYPE_NAME: &'static str = "DiskLocal";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::new("Path", FieldType::String),
            FieldDef::new("KeepFreeSpaceBytes", FieldType::Int),
        ];
        FIELDS
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct DiskS3 {
    pub endpoint: String,
    #[serde(rename = "AccessKeyID")]
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub use_environment_credentials: bool,
    /// Raw S3 disk settings for expert mode.
    pub expert: BTreeMap<String, String>,
}

impl Reflect for DiskS3 {
    const TYPE_NAME: &'static str = "DiskS3";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::new("Endpoint", FieldType::String),
            FieldDef::new("AccessKeyID", FieldType::String),
            FieldDef::new("SecretAccessKey", FieldType::String),
            FieldDef::new("Region", FieldType::String),
            FieldDef::new("UseEnvironmentCredentials", FieldType::Bool),
            FieldDef::new("Expert", FieldType::Map),
        ];
        FIELDS
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct DiskHdfs {
    pub endpoint: String,
}

impl Reflect for DiskHdfs {
    const TYPE_NAME: &'static str = "DiskHdfs";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[FieldDef::new("Endpoint", FieldType::String)];
        FIELDS
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Policy {
    pub name: String,
    pub volumes: Vec<Volume>,
    /// Free-space ratio below which parts move to the next volume.
    pub move_factor: Option<f64>,
}

impl Reflect for Policy {
    const TYPE_NAME: &'static str = "Policy";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::new("Name", FieldType::String),
            FieldDef::new("Volumes", FieldType::ObjectArray(StructRef::of::<Volume>())),
            FieldDef::new("MoveFactor", FieldType::Float),
        ];
        FIELDS
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Volume {
    pub name: String,
    pub disks: Vec<String>,
    pub max_data_part_size_bytes: Option<i64>,
}

impl Reflect for Volume {
    const TYPE_NAME: &'static str = "Volume";

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::new("Name", FieldType::String),
            FieldDef::new("Disks", FieldType::Array),
            FieldDef::new("MaxDataPartSizeBytes", FieldType::Int),
        ];
        FIELDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_names_match_reflection() {
        fn check<T: Reflect>() {
            let zero = StructRef::of::<T>().zero_value().unwrap();
            let object = zero.as_object().unwrap();
            let names: Vec<&str> = T::fields().iter().map(|f| f.name).collect();
            let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
            let mut sorted = names.clone();
            keys.sort_unstable();
            sorted.sort_unstable();
            assert_eq!(keys, sorted, "{}", T::TYPE_NAME);
        }

        check::<ClusterConfig>();
        check::<Shard>();
        check::<Replica>();
        check::<Storage>();
        check::<Disk>();
        check::<DiskLocal>();
        check::<DiskS3>();
        check::<DiskHdfs>();
        check::<Policy>();
        check::<Volume>();
    }

    #[test]
    fn test_deserialize_pascal_case() {
        let conf: ClusterConfig = serde_json::from_str(
            r#"{"Cluster":"abc","Port":9000,"Shards":[{"Replicas":[{"Ip":"10.0.0.1"}]}]}"#,
        )
        .unwrap();
        assert_eq!(conf.cluster, "abc");
        assert_eq!(conf.port, 9000);
        assert_eq!(conf.shards[0].replicas[0].ip, "10.0.0.1");
        assert!(conf.storage.is_none());
    }
}
