//! 리포트 모델.
//!
//! `Report`는 조립 시점의 스냅샷 값이다. 순환 버퍼를 참조하지 않으므로
//! 조립 이후 버퍼가 계속 변해도 영향을 받지 않는다.
//! 목록/미리보기용 필드는 `ReportSummary`에 모아 `Report`에 포함한다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CoreError;

use super::attachment::Attachment;
use super::event::Event;
use super::measure::Measure;
use super::metric::Metric;
use super::named_value::NamedValue;
use super::screenshot::Screenshot;

/// 리포트 표시 힌트
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppearanceHint {
    #[default]
    Normal,
    Landscape,
    Portrait,
    Large,
}

/// 리포트 요약 (목록/미리보기용)
///
/// `identifier`, `content_length`, `received_on`, `expires_on`은 서버가 채운다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ReportSummary {
    /// 측정 구간 평균을 재샘플링한 지표 (이름순)
    pub aggregate_metrics: Vec<Metric>,
    pub appearance_hint: AppearanceHint,
    /// 서버 할당: 수신된 본문 크기
    pub content_length: u64,
    /// 분류용 차원
    pub dimensions: Vec<NamedValue>,
    /// 서버 할당: 만료 시각
    pub expires_on: Option<DateTime<Utc>>,
    pub geo_country: Option<String>,
    /// 서버 할당: 리포트 식별자
    pub identifier: Option<String>,
    #[serde(rename = "IPAddress")]
    pub ip_address: Option<String>,
    pub is_hidden_without_dimension: bool,
    pub is_silent: bool,
    pub is_temporary: bool,
    /// 서버가 보고하는 프로젝트 라이선스 등급
    pub license_level: i32,
    pub project_identifier: String,
    /// 서버 할당: 수신 시각
    pub received_on: Option<DateTime<Utc>>,
    /// 사용자가 입력한 한 줄 요약
    pub summary: String,
    /// 가장 최근 스크린샷
    pub thumbnail: Option<Screenshot>,
}

/// 서버의 리포트 목록 응답 (한 페이지)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ReportList {
    pub continuation_token: Option<String>,
    pub error: Option<String>,
    pub has_more: bool,
    #[serde(rename = "UserReportPreviews")]
    pub previews: Vec<ReportSummary>,
}

impl ReportList {
    /// JSON 본문에서 목록 해석
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// 목록 확정: `limit`을 넘는 항목을 잘라내고 다음 페이지 토큰을 기록한다
    pub fn complete(&mut self, limit: usize, continuation_token: impl Into<String>) {
        if self.previews.len() > limit {
            self.previews.truncate(limit);
            self.continuation_token = Some(continuation_token.into());
            self.has_more = true;
        }
    }
}

/// 조립된 리포트
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Report {
    #[serde(flatten)]
    pub overview: ReportSummary,
    pub attachments: Vec<Attachment>,
    /// 클라이언트 자체 지표 (프로세스 수명 누적)
    pub client_metrics: Vec<Metric>,
    pub device_metadata: Vec<NamedValue>,
    pub events: Vec<Event>,
    /// 사용자 입력 필드
    pub fields: Vec<NamedValue>,
    pub measures: Vec<Measure>,
    pub screenshots: Vec<Screenshot>,
}

impl Report {
    /// 빈 리포트
    pub fn new(project_identifier: impl Into<String>) -> Self {
        let mut report = Self::default();
        report.overview.project_identifier = project_identifier.into();
        report
    }

    /// 파생 필드 확정 (썸네일, 집계 지표)
    ///
    /// 집계 지표는 측정 구간마다의 평균을 새 지표에 샘플링한 결과이며
    /// 이름 순(바이트 순서)으로 정렬된다. 다시 호출하면 새로 계산한다.
    pub fn complete(&mut self) {
        if let Some(last) = self.screenshots.last() {
            self.overview.thumbnail = Some(last.clone());
        }

        let mut aggregates: BTreeMap<&str, Metric> = BTreeMap::new();
        for measure in &self.measures {
            for metric in &measure.metrics {
                aggregates
                    .entry(metric.name.as_str())
                    .or_insert_with(|| Metric::new(metric.name.as_str()))
                    .sample(metric.average());
            }
        }

        let mut aggregate_metrics: Vec<Metric> = aggregates.into_values().collect();
        aggregate_metrics.sort_by(|a, b| a.name.cmp(&b.name));
        self.overview.aggregate_metrics = aggregate_metrics;
    }

    /// 요약만 복사
    pub fn to_summary(&self) -> ReportSummary {
        self.overview.clone()
    }

    /// 클라이언트가 채우면 안 되는 서버 할당 필드 중 설정된 첫 번째 필드
    pub fn server_assigned_field(&self) -> Option<&'static str> {
        if self.overview.identifier.is_some() {
            Some("Identifier")
        } else if self.overview.content_length != 0 {
            Some("ContentLength")
        } else if self.overview.received_on.is_some() {
            Some("ReceivedOn")
        } else if self.overview.expires_on.is_some() {
            Some("ExpiresOn")
        } else {
            None
        }
    }

    /// 차원 추가
    pub fn add_dimension(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.overview.dimensions.push(NamedValue::new(name, value));
    }

    /// "이름: 값, 이름: 값" 형식의 차원 문자열
    pub fn dimensions_string(&self) -> String {
        self.overview
            .dimensions
            .iter()
            .map(|d| format!("{}: {}", d.name, d.value))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// 크기/용량 예산을 넘는 오래된 스크린샷 제거
    ///
    /// 최신 `ignore_count`개는 무조건 유지한다. 나머지는 최신부터 거슬러 올라가며
    /// 크기 제한을 넘거나 누적 바이트가 `total_bytes`를 넘으면 제거된다.
    /// 남은 스크린샷의 순서는 유지된다.
    pub fn remove_screenshots(
        &mut self,
        maximum_width: u32,
        maximum_height: u32,
        total_bytes: usize,
        ignore_count: usize,
    ) {
        let mut kept_bytes = 0usize;
        let mut keep = vec![true; self.screenshots.len()];

        for (age, (index, shot)) in self.screenshots.iter().enumerate().rev().enumerate() {
            let len = shot.data.len();
            if age < ignore_count {
                kept_bytes += len;
                continue;
            }
            let oversized = shot.width() > maximum_width || shot.height() > maximum_height;
            if oversized || kept_bytes + len > total_bytes {
                keep[index] = false;
            } else {
                kept_bytes += len;
            }
        }

        let mut flags = keep.into_iter();
        self.screenshots.retain(|_| flags.next().unwrap_or(true));
    }
}
