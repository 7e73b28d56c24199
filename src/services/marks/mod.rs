pub mod bulk;
pub mod create;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashSet;
use std::sync::Arc;

use crate::models::{
    ErrorCode,
    marks::requests::{BulkMarksRequest, MarkEntry, MarkRequest},
    tests::entities::Test,
};
use crate::services::{bad_request, error_response, not_found};
use crate::storage::Storage;

pub struct MarkService {
    storage: Option<Arc<dyn Storage>>,
}

impl MarkService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_marks(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_marks(self, request).await
    }

    pub async fn list_marks_by_student(
        &self,
        request: &HttpRequest,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        list::list_marks_by_student(self, request, student_id).await
    }

    pub async fn list_marks_by_test(
        &self,
        request: &HttpRequest,
        test_id: i64,
    ) -> ActixResult<HttpResponse> {
        list::list_marks_by_test(self, request, test_id).await
    }

    pub async fn create_mark(
        &self,
        request: &HttpRequest,
        mark: MarkRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_mark(self, request, mark).await
    }

    pub async fn update_mark(
        &self,
        request: &HttpRequest,
        mark: MarkRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_mark(self, request, mark).await
    }

    pub async fn bulk_upsert(
        &self,
        request: &HttpRequest,
        body: BulkMarksRequest,
    ) -> ActixResult<HttpResponse> {
        bulk::bulk_upsert(self, request, body).await
    }
}

/// 分数必须在 0..=total_marks 之间，None 表示缺考
pub(crate) fn check_score(test: &Test, score: Option<f64>) -> Result<(), HttpResponse> {
    match score {
        Some(value) if !test.accepts_score(value) => Err(bad_request(
            ErrorCode::MarkOutOfRange,
            format!(
                "Marks must be between 0 and {} for this test",
                test.total_marks
            ),
        )),
        _ => Ok(()),
    }
}

/// 校验一组成绩：学生不能重复、必须属于当前用户、分数在范围内
pub(crate) async fn check_mark_entries(
    storage: &Arc<dyn Storage>,
    user_id: i64,
    test: &Test,
    entries: &[MarkEntry],
) -> Result<(), HttpResponse> {
    let mut seen = HashSet::new();
    for entry in entries {
        if !seen.insert(entry.student_id) {
            return Err(bad_request(
                ErrorCode::BadRequest,
                format!("Duplicate marks for student {}", entry.student_id),
            ));
        }
        check_score(test, entry.marks_obtained)?;
    }

    let ids: Vec<i64> = seen.into_iter().collect();
    let owned: HashSet<i64> = storage
        .get_students_by_ids(user_id, &ids)
        .await
        .map_err(error_response)?
        .into_iter()
        .map(|s| s.id)
        .collect();

    if let Some(missing) = entries.iter().find(|e| !owned.contains(&e.student_id)) {
        return Err(not_found(
            ErrorCode::StudentNotFound,
            format!("Student {} not found", missing.student_id),
        ));
    }
    Ok(())
}
