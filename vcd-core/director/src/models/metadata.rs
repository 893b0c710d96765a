//! 元数据模型

use serde::{Deserialize, Serialize};

use super::common::{Link, XMLNS_VCLOUD, XMLNS_XSI};

/// 元数据值类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataType {
    String,
    Number,
    Boolean,
    DateTime,
}

impl MetadataType {
    /// 对应的 `xsi:type` 取值
    pub fn xsi_type(&self) -> &'static str {
        match self {
            Self::String => "MetadataStringValue",
            Self::Number => "MetadataNumberValue",
            Self::Boolean => "MetadataBooleanValue",
            Self::DateTime => "MetadataDateTimeValue",
        }
    }

    pub fn from_xsi_type(s: &str) -> Option<Self> {
        // 服务端可能带命名空间前缀
        let local = s.rsplit(':').next().unwrap_or(s);
        match local {
            "MetadataStringValue" => Some(Self::String),
            "MetadataNumberValue" => Some(Self::Number),
            "MetadataBooleanValue" => Some(Self::Boolean),
            "MetadataDateTimeValue" => Some(Self::DateTime),
            _ => None,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "boolean" | "bool" => Some(Self::Boolean),
            "datetime" => Some(Self::DateTime),
            _ => None,
        }
    }
}

/// 带类型的元数据值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypedValue {
    #[serde(rename(serialize = "@xsi:type", deserialize = "@type"), default)]
    pub xsi_type: String,

    #[serde(rename = "Value", default)]
    pub value: String,
}

impl TypedValue {
    pub fn new(kind: MetadataType, value: &str) -> Self {
        Self {
            xsi_type: kind.xsi_type().to_string(),
            value: value.to_string(),
        }
    }

    pub fn string(value: &str) -> Self {
        Self::new(MetadataType::String, value)
    }

    pub fn kind(&self) -> Option<MetadataType> {
        MetadataType::from_xsi_type(&self.xsi_type)
    }
}

/// 元数据条目
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataEntry {
    #[serde(rename = "@href", default)]
    pub href: String,

    #[serde(rename = "Link", default)]
    pub links: Vec<Link>,

    #[serde(rename = "Key", default)]
    pub key: String,

    #[serde(rename = "TypedValue", default)]
    pub typed_value: TypedValue,
}

/// 资源的全部元数据
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metadata {
    #[serde(rename = "@href", default)]
    pub href: String,

    #[serde(rename = "Link", default)]
    pub links: Vec<Link>,

    #[serde(rename = "MetadataEntry", default)]
    pub entries: Vec<MetadataEntry>,
}

impl Metadata {
    /// 按 key 查找值
    pub fn get(&self, key: &str) -> Option<&TypedValue> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.typed_value)
    }
}

/// 写入单个元数据值的请求体
#[derive(Debug, Clone, Serialize)]
pub struct MetadataValue {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    #[serde(rename = "@xmlns:xsi")]
    pub xmlns_xsi: String,

    #[serde(rename = "TypedValue")]
    pub typed_value: TypedValue,
}

impl MetadataValue {
    pub fn new(typed_value: TypedValue) -> Self {
        Self {
            xmlns: XMLNS_VCLOUD.to_string(),
            xmlns_xsi: XMLNS_XSI.to_string(),
            typed_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{from_xml, to_xml};

    #[test]
    fn test_encode_metadata_value() {
        let xml = to_xml("MetadataValue", &MetadataValue::new(TypedValue::string("prod"))).unwrap();
        assert!(xml.contains("xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\""));
        assert!(xml.contains("<TypedValue xsi:type=\"MetadataStringValue\"><Value>prod</Value></TypedValue>"));
    }

    #[test]
    fn test_decode_metadata() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<Metadata xmlns="http://www.vmware.com/vcloud/v1.5" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
          href="https://vcd.local/api/vApp/vapp-1/metadata" type="application/vnd.vmware.vcloud.metadata+xml">
    <Link rel="up" href="https://vcd.local/api/vApp/vapp-1"/>
    <MetadataEntry href="https://vcd.local/api/vApp/vapp-1/metadata/env">
        <Key>env</Key>
        <TypedValue xsi:type="MetadataStringValue"><Value>prod</Value></TypedValue>
    </MetadataEntry>
    <MetadataEntry href="https://vcd.local/api/vApp/vapp-1/metadata/replicas">
        <Key>replicas</Key>
        <TypedValue xsi:type="MetadataNumberValue"><Value>3</Value></TypedValue>
    </MetadataEntry>
</Metadata>"#;

        let metadata: Metadata = from_xml(xml).unwrap();
        assert_eq!(metadata.entries.len(), 2);
        assert_eq!(metadata.get("env").map(|v| v.value.as_str()), Some("prod"));
        assert_eq!(metadata.get("replicas").and_then(|v| v.kind()), Some(MetadataType::Number));
        assert!(metadata.get("missing").is_none());
    }

    #[test]
    fn test_metadata_type_parsing() {
        assert_eq!(MetadataType::from_str("Bool"), Some(MetadataType::Boolean));
        assert_eq!(MetadataType::from_xsi_type("ns1:MetadataDateTimeValue"), Some(MetadataType::DateTime));
        assert_eq!(MetadataType::from_str("list"), None);
    }
}
