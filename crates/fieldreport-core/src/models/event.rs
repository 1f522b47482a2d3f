//! 로그 이벤트 모델.
//!
//! 리포트에 포함되는 로그/예외 이벤트. 생성 후 변경하지 않는다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;

/// 이벤트 레벨
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventLevel {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// 로그 이벤트
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Event {
    /// 이벤트 레벨
    pub level: EventLevel,
    /// 메시지
    pub message: Option<String>,
    /// 스택 트레이스 (텍스트)
    pub stack_trace: Option<String>,
    /// 구조화된 에러 정보
    pub exception: Option<ExceptionInfo>,
    /// 기록 시점의 프레임 번호
    pub frame_number: u64,
    /// 기록 시각
    pub timestamp: DateTime<Utc>,
}

impl Event {
    /// 새 이벤트 생성 (현재 시각)
    pub fn new(level: EventLevel, message: impl Into<String>, frame_number: u64) -> Self {
        Self {
            level,
            message: Some(message.into()),
            stack_trace: None,
            exception: None,
            frame_number,
            timestamp: Utc::now(),
        }
    }

    /// 메시지 + 개행 + 스택 트레이스
    pub fn full_message(&self) -> String {
        format!(
            "{}\n{}",
            self.message.as_deref().unwrap_or_default(),
            self.stack_trace.as_deref().unwrap_or_default()
        )
    }
}

/// 구조화된 스택 프레임
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct StackFrameInfo {
    pub declaring_type: Option<String>,
    pub method: String,
    pub method_name: String,
    pub file_name: Option<String>,
    pub file_line: u32,
    pub file_column: u32,
}

/// 직렬화 가능한 에러 정보
///
/// `source()` 체인은 `inner_exception`으로 중첩된다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ExceptionInfo {
    /// 에러 타입 이름 (알 수 있는 경우)
    #[serde(rename = "Type")]
    pub type_name: Option<String>,
    pub message: String,
    /// Debug 표현 전체
    pub full_text: String,
    pub stack_trace: Vec<StackFrameInfo>,
    /// "{타입} at {선언타입}.{메서드}"
    pub problem_identifier: Option<String>,
    /// 상위 두 프레임까지 포함한 식별자
    pub detailed_problem_identifier: Option<String>,
    pub inner_exception: Option<Box<ExceptionInfo>>,
}

impl ExceptionInfo {
    /// 에러 값에서 생성 (타입 이름 포함)
    pub fn from_error<E: StdError + ?Sized>(error: &E) -> Self {
        Self::build(
            error.to_string(),
            format!("{error:?}"),
            error.source(),
            Some(std::any::type_name::<E>().to_string()),
        )
    }

    /// `dyn Error`에서 생성 (타입 이름 없음)
    pub fn from_dyn(error: &(dyn StdError + 'static)) -> Self {
        Self::build(error.to_string(), format!("{error:?}"), error.source(), None)
    }

    fn build(
        message: String,
        full_text: String,
        source: Option<&(dyn StdError + 'static)>,
        type_name: Option<String>,
    ) -> Self {
        let mut info = Self {
            type_name,
            message,
            full_text,
            stack_trace: Vec::new(),
            problem_identifier: None,
            detailed_problem_identifier: None,
            inner_exception: source.map(|inner| Box::new(Self::from_dyn(inner))),
        };
        info.identify();
        info
    }

    /// 스택 프레임 지정 후 문제 식별자 재계산
    pub fn with_frames(mut self, frames: Vec<StackFrameInfo>) -> Self {
        self.stack_trace = frames;
        self.identify();
        self
    }

    fn identify(&mut self) {
        let type_name = self.type_name.as_deref().unwrap_or("Error");
        let location = |frame: &StackFrameInfo| {
            format!(
                "{}.{}",
                frame.declaring_type.as_deref().unwrap_or_default(),
                frame.method_name
            )
        };

        self.problem_identifier = Some(match self.stack_trace.first() {
            Some(top) => format!("{type_name} at {}", location(top)),
            None => type_name.to_string(),
        });

        self.detailed_problem_identifier = match self.stack_trace.as_slice() {
            [first, second, ..] => Some(format!(
                "{type_name} at {} from {}",
                location(first),
                location(second)
            )),
            _ => None,
        };
    }
}
