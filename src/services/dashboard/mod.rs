use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Duration;
use std::sync::Arc;

use crate::models::ApiResponse;
use crate::services::{current_user_id, error_response, reports::today};
use crate::storage::Storage;

/// 统计“最近测验”的天数
const RECENT_DAYS: i64 = 30;

pub struct DashboardService {
    storage: Option<Arc<dyn Storage>>,
}

impl DashboardService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn get_stats(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let user_id = match current_user_id(request) {
            Ok(id) => id,
            Err(response) => return Ok(response),
        };

        let recent_since = today() - Duration::days(RECENT_DAYS);
        match storage.dashboard_stats(user_id, recent_since).await {
            Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                stats,
                "Dashboard statistics retrieved successfully",
            ))),
            Err(e) => Ok(error_response(e)),
        }
    }
}
