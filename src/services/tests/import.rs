//! Excel 成绩表导入
//!
//! 表单字段：file、subject、chapter、test_date、total_marks、standard，可选 sheet。
//! 在工作表中定位测验所在列后逐行读取成绩，测验和有效成绩在同一事务中写入。

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use futures_util::StreamExt;
use std::collections::{HashMap, HashSet};

use super::{TestService, normalize_test_request};
use crate::config::AppConfig;
use crate::models::{
    ApiResponse, ErrorCode,
    marks::requests::MarkEntry,
    tests::{
        requests::CreateTestRequest,
        responses::{SkippedRow, TestImportResponse},
    },
};
use crate::services::{bad_request, current_user_id, error_response, not_found};
use crate::utils::excel_marks::{
    ColumnSpec, ParsedRow, RowOutcome, find_test_column, load_sheet, parse_text_date,
    read_student_rows,
};

/// 上传表单
#[derive(Debug, Default)]
struct ImportForm {
    file: Vec<u8>,
    fields: HashMap<String, String>,
}

enum FormError {
    Read(String),
    TooLarge,
}

pub async fn import_test(
    service: &TestService,
    request: &HttpRequest,
    mut payload: Multipart,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let config = AppConfig::get();
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    // 1. 读取表单
    let form = match read_form(&mut payload, config.server.limits.max_upload_size).await {
        Ok(form) => form,
        Err(FormError::TooLarge) => {
            return Ok(HttpResponse::PayloadTooLarge().json(ApiResponse::error_empty(
                ErrorCode::FileSizeExceeded,
                "Uploaded file is too large",
            )));
        }
        Err(FormError::Read(msg)) => {
            return Ok(bad_request(ErrorCode::ImportFileParseFailed, msg));
        }
    };

    if form.file.is_empty() {
        return Ok(bad_request(
            ErrorCode::ImportFileParseFailed,
            "Excel file is required",
        ));
    }

    // 2. 测验信息
    let test = match test_from_fields(&form.fields).and_then(normalize_test_request) {
        Ok(test) => test,
        Err(msg) => return Ok(bad_request(ErrorCode::TestInvalid, msg)),
    };

    // 3. 解析工作表（阻塞操作）
    let sheet_name = form
        .fields
        .get("sheet")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| config.report.excel_sheet_name.clone());
    let grid = match actix_web::web::block(move || load_sheet(form.file, &sheet_name)).await {
        Ok(Ok(grid)) => grid,
        Ok(Err(e)) => {
            tracing::debug!("Excel import failed: {}", e);
            return Ok(bad_request(ErrorCode::ImportFileParseFailed, e.message()));
        }
        Err(e) => {
            return Ok(bad_request(
                ErrorCode::ImportFileParseFailed,
                format!("Failed to read Excel file: {e}"),
            ));
        }
    };

    // 4. 定位测验列
    let spec = ColumnSpec {
        subject: &test.subject,
        chapter: &test.chapter,
        test_date: test.test_date,
        total_marks: test.total_marks,
    };
    let Some(column) = find_test_column(&grid, &spec) else {
        return Ok(not_found(
            ErrorCode::ImportColumnNotFound,
            "Matching test not found in Excel",
        ));
    };

    let rows = read_student_rows(
        &grid,
        column,
        config.report.excel_student_start_row,
        test.total_marks,
    );
    if rows.is_empty() {
        return Ok(bad_request(
            ErrorCode::ImportFileDataInvalid,
            "No student rows found in Excel",
        ));
    }
    if rows.len() > config.report.max_import_rows {
        return Ok(bad_request(
            ErrorCode::ImportFileDataInvalid,
            format!(
                "At most {} student rows can be imported at once",
                config.report.max_import_rows
            ),
        ));
    }

    // 5. 只接受属于当前用户的学号
    let roll_ids: Vec<i64> = rows
        .iter()
        .filter_map(|r| r.roll.parse::<i64>().ok())
        .collect();
    let owned: HashSet<i64> = match storage.get_students_by_ids(user_id, &roll_ids).await {
        Ok(students) => students.into_iter().map(|s| s.id).collect(),
        Err(e) => return Ok(error_response(e)),
    };

    let (entries, skipped) = split_rows(rows, &owned);
    if entries.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error(
            ErrorCode::ImportFileDataInvalid,
            skipped,
            "No valid marks found in Excel",
        )));
    }

    // 6. 测验与成绩一起写入
    let imported = entries.len();
    let absent = entries.iter().filter(|e| e.marks_obtained.is_none()).count();
    match storage.create_test_with_marks(user_id, test, entries).await {
        Ok((test, _)) => {
            tracing::info!(
                "User {} imported test {}: {} marks, {} skipped",
                user_id,
                test.id,
                imported,
                skipped.len()
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                TestImportResponse {
                    test,
                    imported,
                    absent,
                    skipped,
                },
                "Marks imported successfully",
            )))
        }
        Err(e) => Ok(error_response(e)),
    }
}

/// 区分可写入的成绩和被跳过的行
fn split_rows(rows: Vec<ParsedRow>, owned: &HashSet<i64>) -> (Vec<MarkEntry>, Vec<SkippedRow>) {
    let mut entries = Vec::new();
    let mut skipped = Vec::new();
    let mut seen = HashSet::new();

    for row in rows {
        let skip = |reason: String| SkippedRow {
            row: row.row,
            roll: row.roll.clone(),
            reason,
        };

        let student_id = match row.roll.parse::<i64>() {
            Ok(id) if owned.contains(&id) => id,
            _ => {
                skipped.push(skip(format!("Student with roll {} not found", row.roll)));
                continue;
            }
        };
        if !seen.insert(student_id) {
            skipped.push(skip("Duplicate roll number".to_string()));
            continue;
        }

        match row.outcome {
            RowOutcome::Present(score) => entries.push(MarkEntry {
                student_id,
                marks_obtained: Some(score),
            }),
            RowOutcome::Absent => entries.push(MarkEntry {
                student_id,
                marks_obtained: None,
            }),
            RowOutcome::Invalid(reason) => skipped.push(skip(reason)),
        }
    }

    (entries, skipped)
}

fn test_from_fields(fields: &HashMap<String, String>) -> Result<CreateTestRequest, &'static str> {
    let field = |name: &str| fields.get(name).map(|s| s.trim()).unwrap_or_default();

    let total_marks = field("total_marks")
        .parse::<f64>()
        .ok()
        .filter(|n| n.fract() == 0.0 && *n <= f64::from(i32::MAX))
        .ok_or("Total marks must be a whole number")? as i32;
    let test_date = parse_text_date(field("test_date")).ok_or("Test date is invalid")?;

    Ok(CreateTestRequest {
        subject: field("subject").to_string(),
        chapter: field("chapter").to_string(),
        total_marks,
        test_date,
        standard: field("standard").to_string(),
    })
}

/// 读取整个表单，所有字段合计不能超过 max_upload_size
async fn read_form(payload: &mut Multipart, max_upload_size: usize) -> Result<ImportForm, FormError> {
    let mut form = ImportForm::default();
    let mut received = 0usize;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| FormError::Read(format!("Failed to read form field: {e}")))?;
        let name = field.name().unwrap_or_default().to_string();

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| FormError::Read(format!("Failed to read form data: {e}")))?;
            received += chunk.len();
            if received > max_upload_size {
                return Err(FormError::TooLarge);
            }
            data.extend_from_slice(&chunk);
        }

        if name == "file" {
            form.file = data;
        } else {
            form.fields
                .insert(name, String::from_utf8_lossy(&data).into_owned());
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::error::PayloadError;
    use actix_web::http::header::{self, HeaderMap, HeaderValue};
    use actix_web::web::Bytes;

    fn multipart(fields: &[(&str, String)]) -> Multipart {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--XB\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str("--XB--\r\n");

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("multipart/form-data; boundary=XB"),
        );
        let stream =
            futures_util::stream::once(async move { Ok::<_, PayloadError>(Bytes::from(body)) });
        Multipart::new(&headers, stream)
    }

    #[actix_web::test]
    async fn test_read_form_limits_total_size_across_fields() {
        let fields: Vec<(&str, String)> = ["subject", "chapter", "standard"]
            .into_iter()
            .map(|name| (name, "x".repeat(40)))
            .collect();

        // 每个字段都小于上限，但合计超过上限
        let mut payload = multipart(&fields);
        assert!(matches!(
            read_form(&mut payload, 100).await,
            Err(FormError::TooLarge)
        ));

        let mut payload = multipart(&fields);
        let form = read_form(&mut payload, 1000).await.ok().unwrap();
        assert_eq!(form.fields.len(), 3);
        assert!(form.file.is_empty());
    }

    fn parsed(row: usize, roll: &str, outcome: RowOutcome) -> ParsedRow {
        ParsedRow {
            row,
            roll: roll.to_string(),
            outcome,
        }
    }

    #[test]
    fn test_split_rows_filters_unknown_and_duplicate_students() {
        let owned: HashSet<i64> = [11, 12, 13].into_iter().collect();
        let rows = vec![
            parsed(6, "11", RowOutcome::Present(42.0)),
            parsed(7, "12", RowOutcome::Absent),
            parsed(8, "99", RowOutcome::Present(10.0)),
            parsed(9, "13", RowOutcome::Invalid("Unrecognized mark value 'x'".into())),
            parsed(10, "11", RowOutcome::Present(1.0)),
        ];

        let (entries, skipped) = split_rows(rows, &owned);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].marks_obtained, Some(42.0));
        assert!(entries[1].marks_obtained.is_none());
        let skipped_rows: Vec<usize> = skipped.iter().map(|s| s.row).collect();
        assert_eq!(skipped_rows, vec![8, 9, 10]);
        assert_eq!(skipped[2].reason, "Duplicate roll number");
    }

    #[test]
    fn test_fields_to_request() {
        let fields: HashMap<String, String> = [
            ("subject", "Physics"),
            ("chapter", "Optics"),
            ("test_date", "01-03-2025"),
            ("total_marks", "50"),
            ("standard", "12"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let req = test_from_fields(&fields).unwrap();
        assert_eq!(req.total_marks, 50);
        assert_eq!(
            req.test_date,
            chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_fields_reject_fractional_total() {
        let fields: HashMap<String, String> = [("total_marks", "12.5"), ("test_date", "2025-03-01")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(
            test_from_fields(&fields).unwrap_err(),
            "Total marks must be a whole number"
        );
    }
}
