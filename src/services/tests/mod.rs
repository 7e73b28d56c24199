pub mod get;
pub mod import;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::tests::requests::{
    CreateTestRequest, CreateTestWithMarksRequest, TestCheckParams, TestListParams,
};
use crate::storage::Storage;
use crate::utils::validate::validate_required;

pub struct TestService {
    storage: Option<Arc<dyn Storage>>,
}

impl TestService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_tests(
        &self,
        request: &HttpRequest,
        query: TestListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_tests(self, request, query).await
    }

    pub async fn list_tests_by_user(
        &self,
        request: &HttpRequest,
        user_id: i64,
    ) -> ActixResult<HttpResponse> {
        list::list_tests_by_user(self, request, user_id).await
    }

    pub async fn create_test(
        &self,
        request: &HttpRequest,
        test: CreateTestRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_test(self, request, test).await
    }

    // 手动录入：测验和成绩一起提交
    pub async fn create_test_with_marks(
        &self,
        request: &HttpRequest,
        body: CreateTestWithMarksRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_test_with_marks(self, request, body).await
    }

    pub async fn check_test(
        &self,
        request: &HttpRequest,
        query: TestCheckParams,
    ) -> ActixResult<HttpResponse> {
        get::check_test(self, request, query).await
    }

    pub async fn get_test(&self, request: &HttpRequest, test_id: i64) -> ActixResult<HttpResponse> {
        get::get_test(self, request, test_id).await
    }

    pub async fn delete_test(
        &self,
        request: &HttpRequest,
        test_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_test(self, request, test_id).await
    }

    // 从 Excel 成绩表导入
    pub async fn import_test(
        &self,
        request: &HttpRequest,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        import::import_test(self, request, payload).await
    }
}

/// 去掉首尾空白后校验测验字段
pub(crate) fn normalize_test_request(
    mut req: CreateTestRequest,
) -> Result<CreateTestRequest, &'static str> {
    req.subject = req.subject.trim().to_string();
    req.chapter = req.chapter.trim().to_string();
    req.standard = req.standard.trim().to_string();

    validate_required(&req.subject, "Subject is required")?;
    validate_required(&req.chapter, "Chapter is required")?;
    validate_required(&req.standard, "Standard is required")?;
    if req.total_marks <= 0 {
        return Err("Total marks must be greater than 0");
    }
    if req.test_date > chrono::Local::now().date_naive() {
        return Err("Test date cannot be in the future");
    }
    Ok(req)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request(total_marks: i32, test_date: NaiveDate) -> CreateTestRequest {
        CreateTestRequest {
            subject: "  Chemistry ".into(),
            chapter: "Bonding".into(),
            total_marks,
            test_date,
            standard: "11".into(),
        }
    }

    #[test]
    fn test_normalize_trims_fields() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let req = normalize_test_request(request(25, date)).unwrap();
        assert_eq!(req.subject, "Chemistry");
    }

    #[test]
    fn test_rejects_bad_totals_and_future_dates() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(
            normalize_test_request(request(0, date)).unwrap_err(),
            "Total marks must be greater than 0"
        );

        let tomorrow = chrono::Local::now().date_naive() + chrono::Duration::days(1);
        assert_eq!(
            normalize_test_request(request(10, tomorrow)).unwrap_err(),
            "Test date cannot be in the future"
        );
    }

    #[test]
    fn test_rejects_blank_chapter() {
        let mut req = request(10, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        req.chapter = "   ".into();
        assert_eq!(
            normalize_test_request(req).unwrap_err(),
            "Chapter is required"
        );
    }
}
