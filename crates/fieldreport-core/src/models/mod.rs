//! fieldreport 도메인 모델.
//!
//! 리포트 와이어 포맷을 구성하는 데이터 구조체를 정의한다.
//! 모든 모델은 `serde` Serialize/Deserialize를 구현하며 멤버 이름은 PascalCase로 직렬화된다.

pub mod attachment;
mod base64_bytes;
pub mod event;
pub mod measure;
pub mod metric;
pub mod named_value;
pub mod report;
pub mod screenshot;
