//! 포트 인터페이스 (trait).
//!
//! 리포팅 클라이언트가 소비하는 플랫폼 협력자 경계.
//! 각 어댑터 crate가 이 trait들을 구현하며,
//! `fieldreport-app`에서 `Arc<dyn T>`로 와이어링한다.
//!
//! 비동기 작업(업로드, 캡처)은 `async_trait` 매크로를 사용하여 object safety를 보장하고,
//! 매 틱 호출되는 훅(지표 소스, 리포트 데코레이터)은 동기 trait으로 둔다.

pub mod analytics;
pub mod monitor;
pub mod transport;
pub mod vision;
