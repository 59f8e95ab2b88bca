//! Form schema for creating a cluster.

use crate::model::{
    ClusterConfig, Disk, DiskHdfs, DiskLocal, DiskS3, Policy, Replica, Shard, Storage, Volume,
};
use crate::params::{Candidate, ConfigParams, Parameter};

/// Build the registry behind the `create` schema.
pub fn register_create_cluster_schema() -> ConfigParams {
    let mut params = ConfigParams::new();

    params.must_register::<ClusterConfig>(
        "Cluster",
        Parameter::new("物理集群名", "Cluster Name")
            .description("不得与本ckman管理的其他集群名重复", "not allow to duplicate with exist name"),
    );
    params.must_register::<ClusterConfig>(
        "LogicCluster",
        Parameter::new("逻辑集群名", "Logic Name")
            .description("逻辑集群，存在于物理集群之上", "require physical cluster"),
    );
    params.must_register::<ClusterConfig>(
        "SshUser",
        Parameter::new("系统账户名", "SSH Username")
            .description("必须有root或者sudo权限", "must have permission with root or sudo"),
    );
    params.must_register::<ClusterConfig>(
        "AuthenticateType",
        Parameter::new("认证方式", "Authenticate Type")
            .description("SSH 访问节点的方式，可使用公钥或者密码", "Authenticate type of connect node")
            .candidates(vec![
                Candidate::new("0", "公钥认证", "Public Key"),
                Candidate::new("1", "密码认证(保存密码)", "Password(save)"),
                Candidate::new("2", "密码认证(不保存密码)", "Password(not save)"),
            ])
            .default_value("0"),
    );
    params.must_register::<ClusterConfig>(
        "SshPassword",
        Parameter::new("系统账户密码", "SSH Password")
            .description("不得为空", "can't be empty")
            .visible("AuthenticateType != '0'")
            .password(),
    );
    params.must_register::<ClusterConfig>(
        "SshPort",
        Parameter::new("SSH 端口", "SSH Port")
            .description("不得为空", "can't be empty")
            .default_value("22"),
    );
    params.must_register::<ClusterConfig>(
        "User",
        Parameter::new("ClickHouse 用户名", "ClickHouse Username")
            .description("不能是default用户", "can not be default"),
    );
    params.must_register::<ClusterConfig>(
        "Password",
        Parameter::new("ClickHouse 用户密码", "ClickHouse Password")
            .description("不能为空", "can't be empty")
            .password(),
    );
    params.must_register::<ClusterConfig>(
        "IsReplica",
        Parameter::new("是否为多副本", "Replica").description(
            "物理集群的每个shard是否为多副本, 生产环境建议每个shard为两副本",
            "Whether each Shard of the cluster is multiple replication, we suggest each shard have two copies.",
        ),
    );
    params.must_register::<ClusterConfig>(
        "ManualShards",
        Parameter::new("是否手工指定shard", "ManualShards")
            .description(
                "由ckman完成或者手工指定各结点分配到shard",
                "Completed by ckman or by manually designation of each node to Shard",
            )
            .visible("IsReplica == true"),
    );
    params.must_register::<ClusterConfig>(
        "Hosts",
        Parameter::new("集群结点IP地址列表", "ClickHouse Node List")
            .description(
                "由ckman完成各结点分配到shard。每输入框为单个IP，或者IP范围，或者网段掩码",
                "ClickHouse Node ip, support CIDR or Range.designation by ckman automatically",
            )
            .required("ManualShards == false"),
    );
    params.must_register::<ClusterConfig>(
        "Shards",
        Parameter::new("集群结点IP地址列表", "Shards")
            .description("手工指定各结点分配到shard", "manually designation node to shard")
            .required("ManualShards == true"),
    );
    params.must_register::<ClusterConfig>(
        "Port",
        Parameter::new("TCP端口", "TCPPort").default_value("9000"),
    );
    params.must_register::<ClusterConfig>(
        "ZkNodes",
        Parameter::new("ZooKeeper集群结点列表", "Zookeeper Node List")
            .description("每段为单个IP，或者IP范围，或者网段掩码", "Zookeeper Node ip, support CIDR or Range."),
    );
    params.must_register::<ClusterConfig>(
        "ZkPort",
        Parameter::new("ZooKeeper集群监听端口", "Zookeeper Port").default_value("2181"),
    );
    register_zk_status_port(&mut params);
    register_data_path(&mut params);
    register_storage(&mut params);

    params.must_register::<Shard>(
        "Replicas",
        Parameter::new("分片", "Shard").description("分片内结点IP列表", "ip list in shard"),
    );
    params.must_register::<Replica>("Ip", Parameter::new("副本IP地址", "Replica IP"));
    params.must_register::<Replica>(
        "HostName",
        Parameter::new("副本hostname", "Replica hostname").visible("false"),
    );

    register_version(&mut params);
    params
}

pub(crate) fn register_zk_status_port(params: &mut ConfigParams) {
    params.must_register::<ClusterConfig>(
        "ZkStatusPort",
        Parameter::new("Zookeeper监控端口", "Zookeeper Status Port")
            .description(
                "暴露给mntr等四字命令的端口，zookeeper 3.5.0 以上支持",
                "expose to commands/mntr, zookeeper support it after 3.5.0",
            )
            .default_value("8080"),
    );
}

pub(crate) fn register_data_path(params: &mut ConfigParams) {
    params.must_register::<ClusterConfig>(
        "Path",
        Parameter::new("数据存储路径", "Data Path").description(
            "ClickHouse存储数据的路径，路径需要存在且不要以'/'结尾",
            "path need exist, please don't end with '/'",
        ),
    );
}

/// The `Version` field, whose candidates are the uploaded packages.
pub(crate) fn register_version(params: &mut ConfigParams) {
    params.must_register::<ClusterConfig>(
        "Version",
        Parameter::new("ClickHouse版本", "Package Version")
            .description(
                "需要部署的ClickHouse集群的版本号，需提前上传安装包",
                "which version of clickhouse will deployed, need upload rpm package before",
            )
            .package_candidates(),
    );
}

/// `Storage` and every structure nested under it.
pub(crate) fn register_storage(params: &mut ConfigParams) {
    params.must_register::<ClusterConfig>(
        "Storage",
        Parameter::new("集群存储配置", "Storage Policy").description(
            "由disks, policies两部分构成。policies提到的disk名必须在disks中定义。ClickHouse内置了名为default的policy和disk。",
            "Composed of Disks, Policies. The Disk name mentioned by Policies must be defined in Disks. Clickhouse has built-in Policy and Disk named Default. ",
        ),
    );

    params.must_register::<Storage>(
        "Disks",
        Parameter::new("硬盘列表", "Disk List")
            .description("定义的disks，后续在policies中用到", "defined Disks, follow-up in policies"),
    );
    params.must_register::<Storage>("Policies", Parameter::new("存储策略列表", "Policies List"));

    params.must_register::<Disk>("Name", Parameter::new("磁盘名称", "Name"));
    params.must_register::<Disk>(
        "Type",
        Parameter::new("硬盘类型", "Disk Type")
            .default_value("local")
            .candidates(vec![
                Candidate::new("local", "本地磁盘", "Local"),
                Candidate::new("s3", "AWS S3", "AWS S3"),
                Candidate::new("hdfs", "HDFS", "HDFS"),
            ]),
    );
    params.must_register::<Disk>("DiskLocal", Parameter::new("本地硬盘", "Local").visible("Type == 'local'"));
    params.must_register::<Disk>("DiskS3", Parameter::new("AWS S3", "AWS S3").visible("Type == 's3'"));
    params.must_register::<Disk>("DiskHdfs", Parameter::new("HDFS", "HDFS").visible("Type == 'hdfs'"));

    params.must_register::<DiskLocal>("Path", Parameter::new("挂载路径", "Amount Path"));
    params.must_register::<DiskLocal>(
        "KeepFreeSpaceBytes",
        Parameter::new("保留空闲空间大小", "KeepFreeSpaceBytes"),
    );

    params.must_register::<DiskS3>("Endpoint", Parameter::new("S3端点URI", "Endpoint"));
    params.must_register::<DiskS3>("AccessKeyID", Parameter::new("AccessKeyID", "AccessKeyID"));
    params.must_register::<DiskS3>(
        "SecretAccessKey",
        Parameter::new("SecretAccessKey", "SecretAccessKey").password(),
    );
    params.must_register::<DiskS3>("Region", Parameter::new("Region", "Region"));
    params.must_register::<DiskS3>(
        "UseEnvironmentCredentials",
        Parameter::new("UseEnvironmentCredentials", "UseEnvironmentCredentials"),
    );
    params.must_register::<DiskS3>(
        "Expert",
        Parameter::new("专家模式", "Expert Mode")
            .description("专家模式的S3参数", "configure S3 params by yourself"),
    );

    params.must_register::<DiskHdfs>("Endpoint", Parameter::new("HDFS端点URI", "Endpoint"));

    params.must_register::<Policy>("Name", Parameter::new("策略名称", "Name"));
    params.must_register::<Policy>("Volumes", Parameter::new("卷", "Volumes"));
    params.must_register::<Policy>(
        "MoveFactor",
        Parameter::new("空闲占比阈值", "Move Factor")
            .description(
                "当一个volume空闲空间占比小于此值时，移动部分parts到下一个volume",
                "move parts to the next volume when the free space ratio of a volume is below this value",
            )
            .range(0.0, 1.0, 0.1),
    );

    params.must_register::<Volume>("Name", Parameter::new("卷名称", "Name"));
    params.must_register::<Volume>("Disks", Parameter::new("磁盘", "Disks"));
    params.must_register::<Volume>(
        "MaxDataPartSizeBytes",
        Parameter::new("MaxDataPartSizeBytes", "MaxDataPartSizeBytes"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_schema_keys() {
        let params = register_create_cluster_schema();
        for key in [
            "Cluster",
            "SshPassword",
            "Shards.Replicas.Ip",
            "Shards.Replicas.HostName",
            "Storage.Disks.DiskS3.Endpoint",
            "Storage.Disks.DiskHdfs.Endpoint",
            "Storage.Policies.Volumes.MaxDataPartSizeBytes",
            "Storage.Policies.MoveFactor",
            "Version",
        ] {
            assert!(params.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(params.keys().last(), Some("Version"));
    }
}
