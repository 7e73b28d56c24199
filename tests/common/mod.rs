#![allow(dead_code, unused_macros)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use rust_marksystem::errors::{MarkSystemError, Result};
use rust_marksystem::mailer::{EmailMessage, Mailer};
use rust_marksystem::storage::{Storage, sea_orm_storage::SeaOrmStorage};
use serde_json::{Value, json};

pub const PASSWORD: &str = "Secret123";

/// 内存数据库，已运行迁移
pub async fn memory_storage() -> Arc<dyn Storage> {
    let storage = SeaOrmStorage::connect("sqlite::memory:", 1, 10)
        .await
        .expect("in-memory database should start");
    Arc::new(storage)
}

/// 记录所有邮件，对指定地址返回发送失败
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail_for: Vec<String>,
}

impl RecordingMailer {
    pub fn failing_for(addresses: &[&str]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_for: addresses.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn recipients(&self) -> Vec<String> {
        let mut list: Vec<String> = self
            .sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.to_email.clone())
            .collect();
        list.sort();
        list
    }
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        if self.fail_for.contains(&message.to_email) {
            return Err(MarkSystemError::mail_delivery("mailbox unavailable"));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

static NEXT_IP: AtomicU32 = AtomicU32::new(1);

/// 每个请求使用不同的来源地址，避免触发登录/注册限流
pub fn next_ip() -> SocketAddr {
    let n = NEXT_IP.fetch_add(1, Ordering::Relaxed);
    let [_, b, c, d] = n.to_be_bytes();
    SocketAddr::from(([10, b, c, d], 40000))
}

pub fn register_body(username: &str) -> Value {
    json!({
        "username": username,
        "password": PASSWORD,
        "email": format!("{username}@example.com"),
        "phone": "+91 98765 43210",
        "insname": format!("{username} Academy"),
        "tagline": "Learn every day",
        "insaddress": "12 Station Road, Pune",
    })
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

pub fn days_ago(days: i64) -> String {
    (chrono::Local::now().date_naive() - chrono::Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

/// 构建 multipart/form-data 请求体
pub fn multipart_body(boundary: &str, fields: &[(&str, &str)], file: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"marks.xlsx\"\r\n\
             Content-Type: application/vnd.openxmlformats-officedocument.spreadsheetml.sheet\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(file);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

/// 初始化带存储和邮件发送器的测试应用
macro_rules! init_app {
    ($storage:expr, $mailer:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($storage.clone()))
                .app_data(actix_web::web::Data::new($mailer.clone()))
                .app_data(
                    actix_web::web::JsonConfig::default()
                        .error_handler(rust_marksystem::utils::json_error_handler),
                )
                .app_data(
                    actix_web::web::QueryConfig::default()
                        .error_handler(rust_marksystem::utils::query_error_handler),
                )
                .configure(rust_marksystem::routes::configure_routes),
        )
        .await
    };
}

/// 发送请求，返回状态码和 JSON 响应体（非 JSON 时为 Null）
macro_rules! call {
    ($app:expr, $req:expr) => {{
        let resp = actix_web::test::call_service(
            &$app,
            $req.peer_addr(crate::common::next_ip()).to_request(),
        )
        .await;
        let status = resp.status();
        let body = actix_web::test::read_body(resp).await;
        let json = serde_json::from_slice::<serde_json::Value>(&body)
            .unwrap_or(serde_json::Value::Null);
        (status, json)
    }};
}

/// 注册机构账号并登录，返回 (token, user_id)
macro_rules! register_and_login {
    ($app:expr, $username:expr) => {{
        let (status, body) = call!(
            $app,
            actix_web::test::TestRequest::post()
                .uri("/register")
                .set_json(crate::common::register_body($username))
        );
        assert_eq!(status, actix_web::http::StatusCode::CREATED, "{body}");

        let (status, body) = call!(
            $app,
            actix_web::test::TestRequest::post()
                .uri("/login")
                .set_json(serde_json::json!({
                    "username": $username,
                    "password": crate::common::PASSWORD,
                }))
        );
        assert_eq!(status, actix_web::http::StatusCode::OK, "{body}");
        (
            body["data"]["token"].as_str().unwrap().to_string(),
            body["data"]["user"]["id"].as_i64().unwrap(),
        )
    }};
}
