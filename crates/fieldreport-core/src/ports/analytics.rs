//! 리포트 후처리/분석 훅.

use crate::models::named_value::NamedValue;
use crate::models::report::Report;

/// 조립된 리포트를 호스트가 보강하는 훅
pub trait ReportDecorator: Send + Sync {
    fn decorate(&self, report: &mut Report);
}

/// 분석 이벤트 싱크
pub trait AnalyticsSink: Send + Sync {
    fn send_event(&self, name: &str, parameters: &[NamedValue]);
}
