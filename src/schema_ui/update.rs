//! Form schema for updating the configuration of an existing cluster.
//!
//! Only settings that can change after deployment are offered; topology and
//! SSH access are fixed at creation.

use crate::model::ClusterConfig;
use crate::params::{ConfigParams, Parameter};
use crate::schema_ui::create::{register_data_path, register_storage, register_version, register_zk_status_port};

/// Build the registry behind the `config` schema.
pub fn register_update_config_schema() -> ConfigParams {
    let mut params = ConfigParams::new();

    register_version(&mut params);
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
        "Port",
        Parameter::new("TCP端口", "TCPPort").default_value("9000"),
    );
    register_zk_status_port(&mut params);
    register_data_path(&mut params);
    register_storage(&mut params);

    params
}
