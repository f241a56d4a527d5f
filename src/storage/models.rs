use serde::{Deserialize, Serialize};

/// 数据库范围查询的结果行
///
/// 除 `ip` 以外的所有字段都可以为空：数据集中缺失的字段是正常状态，
/// 序列化时直接省略而不是输出 null。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub ip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl LocationRecord {
    /// 构造一个只含 IP、其余字段为空的记录
    pub fn empty(ip: impl Into<String>) -> Self {
        LocationRecord {
            ip: ip.into(),
            country: None,
            city: None,
            region: None,
            latitude: None,
            longitude: None,
            postal_code: None,
            timezone: None,
        }
    }
}
