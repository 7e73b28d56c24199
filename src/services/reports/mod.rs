pub mod email;
pub mod export;
pub mod print;
pub mod query;
pub mod render;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use chrono::{Duration, Months, NaiveDate};
use std::sync::Arc;

use crate::mailer::Mailer;
use crate::models::reports::requests::{
    CustomReportRequest, PeriodReportRequest, ReportPeriod, SendEmailsRequest,
};
use crate::storage::Storage;

pub struct ReportService {
    storage: Option<Arc<dyn Storage>>,
}

impl ReportService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub(crate) fn get_mailer(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Mailer>> {
        request
            .app_data::<web::Data<Arc<dyn Mailer>>>()
            .map(|data| data.get_ref().clone())
            .ok_or_else(|| actix_web::error::ErrorInternalServerError("Mailer not found in app data"))
    }

    // 全部成绩
    pub async fn all_results(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        query::all_results(self, request).await
    }

    // 单个学生的成绩历史
    pub async fn student_result(
        &self,
        request: &HttpRequest,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        query::student_result(self, request, student_id).await
    }

    pub async fn custom_report(
        &self,
        request: &HttpRequest,
        body: CustomReportRequest,
    ) -> ActixResult<HttpResponse> {
        query::custom_report(self, request, body).await
    }

    pub async fn period_report(
        &self,
        request: &HttpRequest,
        period: ReportPeriod,
        body: PeriodReportRequest,
    ) -> ActixResult<HttpResponse> {
        query::period_report(self, request, period, body).await
    }

    pub async fn send_emails(
        &self,
        request: &HttpRequest,
        body: SendEmailsRequest,
    ) -> ActixResult<HttpResponse> {
        email::send_emails(self, request, body).await
    }

    // 打印用的 HTML 报表
    pub async fn print_report(
        &self,
        request: &HttpRequest,
        body: CustomReportRequest,
    ) -> ActixResult<HttpResponse> {
        print::print_report(self, request, body).await
    }

    pub async fn export_report(
        &self,
        request: &HttpRequest,
        body: CustomReportRequest,
    ) -> ActixResult<HttpResponse> {
        export::export_report(self, request, body).await
    }
}

/// 报表的日期区间与标题
#[derive(Debug, Clone, PartialEq)]
pub struct ReportWindow {
    pub title: &'static str,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// 没有数据时的提示
    pub empty_message: &'static str,
}

impl ReportWindow {
    pub fn all() -> Self {
        Self {
            title: "All Results",
            from: None,
            to: None,
            empty_message: "No results found",
        }
    }

    /// 自定义区间（闭区间），from 不能晚于 to
    pub fn custom(from: NaiveDate, to: NaiveDate) -> Result<Self, &'static str> {
        if from > to {
            return Err("Start date must not be after end date");
        }
        Ok(Self {
            title: "Custom Report",
            from: Some(from),
            to: Some(to),
            empty_message: "No results found for the selected period",
        })
    }

    /// 最近 7 天
    pub fn weekly(today: NaiveDate) -> Self {
        Self {
            title: "Weekly Report",
            from: Some(today - Duration::days(7)),
            to: Some(today),
            empty_message: "No results found for the past week",
        }
    }

    /// 最近一个月（按日历月回退）
    pub fn monthly(today: NaiveDate) -> Self {
        Self {
            title: "Monthly Report",
            from: today.checked_sub_months(Months::new(1)).or(Some(today)),
            to: Some(today),
            empty_message: "No results found for the past month",
        }
    }

    pub fn for_period(
        period: ReportPeriod,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self, &'static str> {
        match period {
            ReportPeriod::Weekly => Ok(Self::weekly(today)),
            ReportPeriod::Monthly => Ok(Self::monthly(today)),
            ReportPeriod::Custom => match (from, to) {
                (Some(from), Some(to)) => Self::custom(from, to),
                _ => Err("Start and end dates are required for a custom report"),
            },
        }
    }

    /// 页眉上显示的日期区间
    pub fn range_label(&self) -> String {
        match (self.from, self.to) {
            (Some(from), Some(to)) => format!("{} to {}", from.format("%d-%m-%Y"), to.format("%d-%m-%Y")),
            _ => "All dates".to_string(),
        }
    }
}

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekly_and_monthly_windows() {
        let today = date(2025, 3, 31);

        let weekly = ReportWindow::weekly(today);
        assert_eq!(weekly.from, Some(date(2025, 3, 24)));
        assert_eq!(weekly.to, Some(today));

        // 3 月 31 日回退一个月落在 2 月最后一天
        let monthly = ReportWindow::monthly(today);
        assert_eq!(monthly.from, Some(date(2025, 2, 28)));
    }

    #[test]
    fn test_custom_window_rejects_reversed_range() {
        assert!(ReportWindow::custom(date(2025, 3, 2), date(2025, 3, 1)).is_err());
        let same_day = ReportWindow::custom(date(2025, 3, 1), date(2025, 3, 1)).unwrap();
        assert_eq!(same_day.range_label(), "01-03-2025 to 01-03-2025");
    }

    #[test]
    fn test_custom_period_requires_dates() {
        let err = ReportWindow::for_period(ReportPeriod::Custom, None, None, date(2025, 3, 1))
            .unwrap_err();
        assert!(err.contains("required"));
        let weekly =
            ReportWindow::for_period(ReportPeriod::Weekly, None, None, date(2025, 3, 8)).unwrap();
        assert_eq!(weekly.title, "Weekly Report");
    }
}
