//! 이름/값 쌍.

use serde::{Deserialize, Serialize};

/// 이름/값 쌍 (디바이스 메타데이터, 측정 메타데이터, 차원, 필드)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NamedValue {
    pub name: String,
    pub value: String,
}

impl NamedValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// 순서를 유지하며 같은 이름은 값을 덮어쓴다
pub fn upsert(values: &mut Vec<NamedValue>, name: &str, value: impl Into<String>) {
    match values.iter_mut().find(|nv| nv.name == name) {
        Some(existing) => existing.value = value.into(),
        None => values.push(NamedValue::new(name, value)),
    }
}
