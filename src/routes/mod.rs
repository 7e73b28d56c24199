pub mod auth;

pub mod students;

pub mod tests;

pub mod marks;

pub mod reports;

pub mod dashboard;

pub use auth::configure_auth_routes;
pub use dashboard::configure_dashboard_routes;
pub use marks::configure_marks_routes;
pub use reports::configure_reports_routes;
pub use students::configure_students_routes;
pub use tests::configure_tests_routes;

use actix_web::web;

/// 注册全部路由
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_auth_routes)
        .configure(configure_students_routes)
        .configure(configure_tests_routes)
        .configure(configure_marks_routes)
        .configure(configure_reports_routes)
        .configure(configure_dashboard_routes);
}
