//! ledger_service / admin_service 单元测试

use super::admin_service::{SeedRequest, SeedUser, apply_seed};
use super::*;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use ecosrev_points::Benefit;
use ecosrev_points::ledger::{Fault, LedgerOperation};
use serde_json::{Value, json};
use tower::ServiceExt;

fn seeded_state() -> Arc<LedgerServiceState> {
    let state = Arc::new(LedgerServiceState::new());
    apply_seed(
        &state,
        SeedRequest {
            users: vec![
                SeedUser {
                    user_id: "user-1".to_string(),
                    email: "maria@ecosrev.com".to_string(),
                    password: "senha123".to_string(),
                    nome: Some("Maria".to_string()),
                    points: Some(100),
                    token: Some("token-1".to_string()),
                    must_reset_password: false,
                },
                SeedUser {
                    user_id: "user-2".to_string(),
                    email: "joao@ecosrev.com".to_string(),
                    password: "temp".to_string(),
                    nome: None,
                    points: None,
                    token: Some("token-2".to_string()),
                    must_reset_password: true,
                },
            ],
            benefits: vec![
                Benefit::new("B1", "Cupom feira", 40, 3),
                Benefit::new("B2", "Esgotado", 10, 0),
            ],
        },
    );
    state
}

fn create_test_app(state: Arc<LedgerServiceState>) -> Router {
    build_router(state)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("access-token", token);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app(Arc::new(LedgerServiceState::new()));
    let response = app
        .oneshot(request("GET", "/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_and_me() {
    let state = seeded_state();

    let response = create_test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/usuario/login",
            None,
            Some(json!({"email": "maria@ecosrev.com", "senha": "senha123"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let login = body_json(response).await;
    let token = login["access_token"].as_str().unwrap().to_string();
    assert!(login.get("redirect_url").is_none());

    let response = create_test_app(state)
        .oneshot(request("GET", "/api/usuario/me", Some(&token), None))
        .await
        .unwrap();
    let me = body_json(response).await;
    assert_eq!(me["_id"], "user-1");
    assert!(me.get("resetPasswordToken").is_none());
}

#[tokio::test]
async fn test_login_with_temporary_password() {
    let response = create_test_app(seeded_state())
        .oneshot(request(
            "POST",
            "/api/usuario/login",
            None,
            Some(json!({"email": "joao@ecosrev.com", "senha": "temp"})),
        ))
        .await
        .unwrap();

    let login = body_json(response).await;
    assert_eq!(login["redirect_url"], "/reset-password");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let response = create_test_app(seeded_state())
        .oneshot(request(
            "POST",
            "/api/usuario/login",
            None,
            Some(json!({"email": "maria@ecosrev.com", "senha": "errada"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["errors"][0]["msg"], "Email ou senha inválidos");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let response = create_test_app(seeded_state())
        .oneshot(request("GET", "/api/usuario/pontos", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = create_test_app(seeded_state())
        .oneshot(request("GET", "/api/usuario/pontos", Some("forged"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_balance_rows() {
    let state = seeded_state();

    let response = create_test_app(state.clone())
        .oneshot(request("GET", "/api/usuario/pontos", Some("token-1"), None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!([{"pontos": 100}]));

    // 没有积分记录的用户返回空数组
    let response = create_test_app(state)
        .oneshot(request("GET", "/api/usuario/pontos", Some("token-2"), None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_write_balance_and_quantity() {
    let state = seeded_state();

    let response = create_test_app(state.clone())
        .oneshot(request(
            "PUT",
            "/api/usuario/pontos",
            Some("token-1"),
            Some(json!({"pontos": 60})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.ledger.balance("user-1"), Some(60));

    let response = create_test_app(state.clone())
        .oneshot(request(
            "PUT",
            "/api/beneficio/resgate",
            Some("token-1"),
            Some(json!({"_id": "B1", "quantidade": 2})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.ledger.benefit("B1").unwrap().available_quantity, 2);

    let response = create_test_app(state)
        .oneshot(request(
            "PUT",
            "/api/beneficio/resgate",
            Some("token-1"),
            Some(json!({"_id": "nope", "quantidade": 2})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_includes_out_of_stock_rows() {
    let response = create_test_app(seeded_state())
        .oneshot(request("GET", "/api/beneficio", Some("token-1"), None))
        .await
        .unwrap();

    let rows = body_json(response).await;
    assert_eq!(rows.as_array().unwrap().len(), 2);
    assert_eq!(rows[0]["_id"], "B1");
    assert_eq!(rows[0]["pontos"], 40);
    assert_eq!(rows[1]["quantidade"], 0);
}

#[tokio::test]
async fn test_history_endpoints_record_transactions() {
    let state = seeded_state();

    let response = create_test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/hist/pontos",
            Some("token-1"),
            Some(json!({"idUser": "user-1", "points": 25, "id": "H1"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = create_test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/hist/transacoes",
            Some("token-1"),
            Some(json!({"idUser": "user-1", "points": 40, "description": "Cupom feira", "id": "B1"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let transactions = state.ledger.transactions();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0].delta, 25);
    assert_eq!(transactions[1].delta, -40);
}

#[tokio::test]
async fn test_injected_faults_map_to_status_codes() {
    let state = seeded_state();

    let response = create_test_app(state.clone())
        .oneshot(request(
            "POST",
            "/admin/faults",
            None,
            Some(json!({"operation": "write_balance", "fault": "timeout", "count": 2})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(state.ledger.pending_faults(), 2);

    let response = create_test_app(state.clone())
        .oneshot(request(
            "PUT",
            "/api/usuario/pontos",
            Some("token-1"),
            Some(json!({"pontos": 1})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(state.ledger.balance("user-1"), Some(100));

    state
        .ledger
        .fail_next(LedgerOperation::ReadCatalog, Fault::Rejected);
    let response = create_test_app(state.clone())
        .oneshot(request("GET", "/api/beneficio", Some("token-1"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = create_test_app(state.clone())
        .oneshot(request("DELETE", "/admin/faults", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(state.ledger.pending_faults(), 0);
}

#[tokio::test]
async fn test_admin_state_and_reset() {
    let state = seeded_state();

    let response = create_test_app(state.clone())
        .oneshot(request("GET", "/admin/state", None, None))
        .await
        .unwrap();
    let view = body_json(response).await;
    assert_eq!(view["users"][0]["userId"], "user-1");
    assert_eq!(view["users"][0]["points"], 100);
    assert!(view["users"][1]["points"].is_null());
    assert_eq!(view["benefits"].as_array().unwrap().len(), 2);
    assert_eq!(view["writeCounts"]["balance"], 0);

    let response = create_test_app(state.clone())
        .oneshot(request("POST", "/admin/reset", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(state.ledger.catalog().is_empty());
    assert!(state.accounts.resolve("token-1").is_none());
}

#[tokio::test]
async fn test_admin_seed_endpoint() {
    let state = Arc::new(LedgerServiceState::new());

    let response = create_test_app(state.clone())
        .oneshot(request(
            "POST",
            "/admin/seed",
            None,
            Some(json!({
                "users": [{
                    "userId": "user-9",
                    "email": "ana@ecosrev.com",
                    "password": "x",
                    "points": 7,
                    "token": "t9"
                }],
                "benefits": [{
                    "id": "B9",
                    "name": "Caneca",
                    "pointCost": 5,
                    "availableQuantity": 1
                }]
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.ledger.balance("user-9"), Some(7));
    assert_eq!(state.accounts.resolve("t9").as_deref(), Some("user-9"));
    assert_eq!(state.ledger.benefit("B9").unwrap().point_cost, 5);
}
