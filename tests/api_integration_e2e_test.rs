// ==========================================
// HTTP 接口端到端测试
// ==========================================
// 测试目标: 通过 axum Router 驱动完整请求链路
// 覆盖: 健康检查 / JSON 批量创建 / 表格上传 / 单条 CRUD / 统计
// ==========================================


use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use it_asset_tracker::api::build_router;
use it_asset_tracker::app::AppState;
use it_asset_tracker::config::config_keys;
use it_asset_tracker::logging;
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use test_helpers::{create_test_db, csv_bytes, insert_test_config, row};
use tower::ServiceExt;

const BOUNDARY: &str = "----it-asset-test-boundary";

async fn setup_app() -> (NamedTempFile, Router) {
    let (temp_file, _db_path, app) = setup_app_with_path().await;
    (temp_file, app)
}

async fn setup_app_with_path() -> (NamedTempFile, String, Router) {
    logging::init_test();
    let (temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let state = AppState::new(db_path.clone())
        .await
        .expect("Failed to create AppState");
    (temp_file, db_path, build_router(state))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body read failed")
        .to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// 手工拼装 multipart 请求体
fn upload_request(file: Option<(&str, &[u8])>, created_by: Option<&str>) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    if let Some(creator) = created_by {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"createdBy\"\r\n\r\n{creator}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: text/csv\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/assets/upload-excel")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (_db, app) = setup_app().await;

    let (status, body) = send(&app, empty_request(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_bulk_create_with_duplicate() {
    let (_db, app) = setup_app().await;

    let request = json_request(
        Method::POST,
        "/assets/bulk",
        json!({
            "assets": [{ "serialNumber": "A" }, { "serialNumber": "A" }],
            "createdBy": "u1"
        }),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["created"], 1);
    assert_eq!(body["data"]["failed"], 1);
    assert_eq!(body["data"]["errors"][0]["index"], 1);
    assert_eq!(body["data"]["errors"][0]["message"], "Duplicate serial number");
    assert_eq!(body["data"]["assets"][0]["device"], "Other");
    assert_eq!(body["data"]["assets"][0]["status"], "Active");
}

#[tokio::test]
async fn test_bulk_create_rejections() {
    let (_db, app) = setup_app().await;

    let cases = [
        json!({ "assets": [], "createdBy": "u1" }),
        json!({ "assets": "nope", "createdBy": "u1" }),
        json!({ "assets": [{ "serialNumber": "X" }] }),
    ];
    for payload in cases {
        let (status, body) =
            send(&app, json_request(Method::POST, "/assets/bulk", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().is_some());
    }

    let malformed = Request::builder()
        .method(Method::POST)
        .uri("/assets/bulk")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let (status, body) = send(&app, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_upload_csv_report() {
    let (_db, app) = setup_app().await;

    let content = csv_bytes(
        &["Sr No", "Serial Number", "Company", "Dept", "User", "Device"],
        &[
            row(&["1", "LT-001", "Acme", "Eng", "Jane", "laptop"]),
            row(&["2", "", "Acme", "Ops", "Omar", "Desktop"]),
            row(&["3", "", "", "", "", ""]),
            row(&["4", "lt-001", "Acme", "Eng", "Li", "Laptop"]),
        ],
    );
    let (status, body) = send(
        &app,
        upload_request(Some(("assets.csv", &content)), Some("u1")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let report = &body["data"];
    assert_eq!(report["totalRows"], 4);
    assert_eq!(report["created"], 2);
    assert_eq!(report["failed"], 1);
    assert_eq!(report["skippedEmptyRows"], 1);
    assert_eq!(report["insertErrors"][0]["row"], 5);
    assert_eq!(report["insertErrors"][0]["serialNumber"], "LT-001");

    let (status, body) = send(&app, empty_request(Method::GET, "/assets?search=LT-001")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["device"], "Laptop");
}

#[tokio::test]
async fn test_upload_rejections() {
    let (_db, app) = setup_app().await;
    let content = csv_bytes(&["Company"], &[row(&["Acme"])]);

    // 缺少 createdBy
    let (status, body) = send(&app, upload_request(Some(("a.csv", &content)), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "createdBy is required");

    // 缺少文件
    let (status, body) = send(&app, upload_request(None, Some("u1"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No file uploaded");

    // 不支持的格式
    let (status, body) = send(
        &app,
        upload_request(Some(("notes.pdf", &b"%PDF-1.4"[..])), Some("u1")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_upload_xlsx_fixture() {
    let (_db, app) = setup_app().await;

    let content: &[u8] = include_bytes!("fixtures/assets_sr_no.xlsx");
    let (status, body) = send(
        &app,
        upload_request(Some(("assets_sr_no.xlsx", content)), Some("u1")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let report = &body["data"];
    assert_eq!(report["totalRows"], 3);
    assert_eq!(report["created"], 2);
    assert_eq!(report["skippedEmptyRows"], 1);

    let (_, body) = send(&app, empty_request(Method::GET, "/assets?search=12345")).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["device"], "Laptop");
    assert_eq!(body["data"]["items"][0]["companyName"], "Globex");
}

#[tokio::test]
async fn test_upload_limit_follows_current_config() {
    let (_db, db_path, app) = setup_app_with_path().await;

    let rows: Vec<Vec<String>> = (0..20)
        .map(|i| row(&[&format!("UL-{}", i), "Acme Corporation"]))
        .collect();
    let content = csv_bytes(&["Serial Number", "Company"], &rows);
    assert!(content.len() > 100);

    // 启动后调低上限，下一次请求即生效
    insert_test_config(&db_path, config_keys::IMPORT_MAX_UPLOAD_BYTES, "100").unwrap();
    let (status, body) = send(
        &app,
        upload_request(Some(("big.csv", &content)), Some("u1")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("File too large"));

    insert_test_config(&db_path, config_keys::IMPORT_MAX_UPLOAD_BYTES, "1048576").unwrap();
    let (status, body) = send(
        &app,
        upload_request(Some(("big.csv", &content)), Some("u1")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["created"], 20);
}

#[tokio::test]
async fn test_upload_blank_csv_lines_reported() {
    let (_db, app) = setup_app().await;

    let (status, body) = send(
        &app,
        upload_request(Some(("blank.csv", &b"Company,Dept\n\n\n\n"[..])), Some("u1")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["totalRows"], 3);
    assert_eq!(body["data"]["skippedEmptyRows"], 3);
}

#[tokio::test]
async fn test_upload_all_empty_rows() {
    let (_db, app) = setup_app().await;

    let content = csv_bytes(
        &["Sr No", "Company", "OS"],
        &[row(&["1", "", "Windows"]), row(&["2", "NA", ""])],
    );
    let (status, body) = send(
        &app,
        upload_request(Some(("empty.csv", &content)), Some("u1")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["totalRows"], 2);
    assert_eq!(body["data"]["skippedEmptyRows"], 2);
    assert_eq!(body["data"]["created"], 0);

    let (_, body) = send(&app, empty_request(Method::GET, "/assets/stats")).await;
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn test_single_asset_lifecycle() {
    let (_db, app) = setup_app().await;

    // 创建
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/assets",
            json!({
                "serialNumber": "srv-01",
                "device": "server",
                "department": "IT",
                "dateOfPurchase": "15/03/2023",
                "createdBy": "admin"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["serialNumber"], "SRV-01");
    assert_eq!(body["data"]["device"], "Server");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    // 重复序列号
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/assets",
            json!({ "serialNumber": "SRV-01", "createdBy": "admin" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    // 更新
    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/assets/{}", id),
            json!({ "status": "in repair", "userName": "Ops" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "In Repair");
    assert_eq!(body["data"]["userName"], "Ops");

    // 空更新
    let (status, _) = send(
        &app,
        json_request(Method::PUT, &format!("/assets/{}", id), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // 软删除后不可见
    let (status, _) = send(&app, empty_request(Method::DELETE, &format!("/assets/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, empty_request(Method::GET, &format!("/assets/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (_, body) = send(&app, empty_request(Method::GET, "/assets")).await;
    assert_eq!(body["data"]["total"], 0);
    let (_, body) = send(&app, empty_request(Method::GET, "/assets?includeDeleted=true")).await;
    assert_eq!(body["data"]["total"], 1);

    // 恢复
    let (status, body) = send(
        &app,
        empty_request(Method::POST, &format!("/assets/{}/restore", id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isDeleted"], false);

    // 彻底删除
    let (status, _) = send(
        &app,
        empty_request(Method::DELETE, &format!("/assets/{}/permanent", id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &app,
        empty_request(Method::POST, &format!("/assets/{}/restore", id)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_after_bulk_create() {
    let (_db, app) = setup_app().await;

    let request = json_request(
        Method::POST,
        "/assets/bulk",
        json!({
            "assets": [
                { "serialNumber": "S1", "device": "Laptop", "department": "Eng" },
                { "serialNumber": "S2", "device": "Laptop", "department": "Eng" },
                { "serialNumber": "S3", "device": "Printer", "status": "Retired" }
            ],
            "createdBy": "u1"
        }),
    );
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, empty_request(Method::GET, "/assets/stats")).await;
    assert_eq!(status, StatusCode::OK);
    let stats = &body["data"];
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["deleted"], 0);
    assert_eq!(stats["byDevice"][0]["key"], "Laptop");
    assert_eq!(stats["byDevice"][0]["count"], 2);

    let (_, body) = send(
        &app,
        empty_request(Method::GET, "/assets?device=Printer&limit=1"),
    )
    .await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["status"], "Retired");
}
