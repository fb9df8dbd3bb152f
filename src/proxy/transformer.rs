//! 订阅配置转换
//!
//! 输入是上游 Clash 风格的 YAML 文档. 只改动 `proxies`, `proxy-groups`,
//! `dns.fallback` 和 `rules`, 其余字段原样保留 (包括键顺序).

use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::core::models::SubscriptionConfig;

pub const MAIN_GROUP: &str = "main";
pub const MAINLAND_GROUP: &str = "mainland";

/// 最小规则集
pub const MINIMAL_RULES: [&str; 4] = [
    "RULE-SET,AntiAd,REJECT",
    "GEOIP,LAN,DIRECT",
    "GEOIP,CN,DIRECT",
    "MATCH,main",
];

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("上游配置格式错误: {0}")]
    MalformedUpstream(String),

    #[error("自定义节点格式错误: {0}")]
    InvalidCustomNode(String),
}

/// 转换选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformOptions {
    /// 用 [`MINIMAL_RULES`] 替换 rules
    pub override_rules: bool,
    /// 在 main 之后追加 mainland 选择组
    pub include_mainland_group: bool,
}

impl From<&SubscriptionConfig> for TransformOptions {
    fn from(config: &SubscriptionConfig) -> Self {
        Self {
            override_rules: config.override_rules,
            include_mainland_group: config.include_mainland_group,
        }
    }
}

/// 丢弃固定长度的直连前缀
///
/// 从第二个包含 `-` 的名字开始 (含) 保留到末尾; 不足两个时返回空.
pub fn filter_outsea_proxies<S: AsRef<str> + Clone>(names: &[S]) -> Vec<S> {
    let mut hyphenated = 0;
    for (i, name) in names.iter().enumerate() {
        if name.as_ref().contains('-') {
            hyphenated += 1;
            if hyphenated == 2 {
                return names[i..].to_vec();
            }
        }
    }
    Vec::new()
}

fn malformed(reason: &str) -> TransformError {
    TransformError::MalformedUpstream(reason.to_string())
}

fn string_seq<I: IntoIterator<Item = S>, S: Into<String>>(items: I) -> Value {
    Value::Sequence(items.into_iter().map(|s| Value::String(s.into())).collect())
}

fn build_main_group(template: &Value) -> Result<Value, TransformError> {
    let mut group: Mapping = template
        .as_mapping()
        .cloned()
        .ok_or_else(|| malformed("proxy-groups[0] is not a mapping"))?;

    let names = group
        .get("proxies")
        .and_then(Value::as_sequence)
        .ok_or_else(|| malformed("proxy-groups[0].proxies is missing"))?
        .iter()
        .map(|v| v.as_str().map(str::to_owned))
        .collect::<Option<Vec<String>>>()
        .ok_or_else(|| malformed("proxy-groups[0].proxies contains a non-string entry"))?;

    group.insert("name".into(), MAIN_GROUP.into());
    group.insert("proxies".into(), string_seq(filter_outsea_proxies(&names)));
    Ok(Value::Mapping(group))
}

fn build_mainland_group() -> Value {
    let mut group = Mapping::new();
    group.insert("name".into(), MAINLAND_GROUP.into());
    group.insert("type".into(), "select".into());
    group.insert("proxies".into(), string_seq(["DIRECT", MAIN_GROUP]));
    Value::Mapping(group)
}

/// 追加一个节点, 并把名字追加到最后一个代理组
pub fn add_node(document: &mut Mapping, node: &Value) -> Result<(), TransformError> {
    let name = node
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| TransformError::InvalidCustomNode("node has no string name".to_string()))?
        .to_owned();

    document
        .get_mut("proxies")
        .and_then(Value::as_sequence_mut)
        .ok_or_else(|| malformed("proxies is missing"))?
        .push(node.clone());

    document
        .get_mut("proxy-groups")
        .and_then(Value::as_sequence_mut)
        .and_then(|groups| groups.last_mut())
        .and_then(|group| group.get_mut("proxies"))
        .and_then(Value::as_sequence_mut)
        .ok_or_else(|| malformed("last proxy group has no proxies"))?
        .push(Value::String(name));

    Ok(())
}

/// 转换上游文档
pub fn transform(
    mut document: Value,
    custom_nodes: Option<&[Value]>,
    options: &TransformOptions,
) -> Result<Value, TransformError> {
    let root = document
        .as_mapping_mut()
        .ok_or_else(|| malformed("document is not a mapping"))?;

    if !matches!(root.get("proxies"), Some(Value::Sequence(_))) {
        return Err(malformed("proxies is missing"));
    }

    let template = root
        .get("proxy-groups")
        .and_then(Value::as_sequence)
        .and_then(|groups| groups.first())
        .ok_or_else(|| malformed("proxy-groups[0] is missing"))?;

    let mut groups = vec![build_main_group(template)?];
    if options.include_mainland_group {
        groups.push(build_mainland_group());
    }
    root.insert("proxy-groups".into(), Value::Sequence(groups));

    if let Some(Value::Mapping(dns)) = root.get_mut("dns") {
        dns.shift_remove("fallback");
    }

    if options.override_rules {
        root.insert("rules".into(), string_seq(MINIMAL_RULES));
    }

    for node in custom_nodes.unwrap_or_default() {
        add_node(root, node)?;
    }

    Ok(document)
}
