// Fluxos completos pela API, contra um Postgres real.
// Sem TEST_DATABASE_URL os testes são ignorados.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use ordens_backend::{
    build_router,
    config::{AppConfig, AppState},
};

async fn build_app() -> anyhow::Result<Option<Router>> {
    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL não definida; pulando");
        return Ok(None);
    };

    let config = AppConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some(database_url.clone()),
        "JWT_SECRET" => Some("segredo-de-teste".to_string()),
        _ => None,
    })?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;

    Ok(Some(build_router(AppState::from_pool(pool, config))))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> anyhow::Result<(StatusCode, Value)> {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => request.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

fn money(value: &Value) -> Decimal {
    value.as_str().and_then(|raw| raw.parse().ok()).unwrap_or_else(|| panic!("valor monetário inválido: {value}"))
}

/// Registra um profissional novo e devolve o access token.
async fn login_new_professional(app: &Router) -> anyhow::Result<String> {
    let username = format!("pro_{}", Uuid::new_v4().simple());
    let (status, _) = send(
        app,
        Method::POST,
        "/api/user/register/",
        None,
        Some(json!({
            "username": username,
            "password": "senha-forte",
            "email": format!("{username}@example.com"),
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, tokens) = send(
        app,
        Method::POST,
        "/api/token/",
        None,
        Some(json!({ "username": username, "password": "senha-forte" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(tokens["access"].as_str().unwrap_or_default().to_string())
}

async fn create(app: &Router, token: &str, uri: &str, body: Value) -> anyhow::Result<Value> {
    let (status, value) = send(app, Method::POST, uri, Some(token), Some(body)).await?;
    assert_eq!(status, StatusCode::CREATED, "POST {uri}: {value}");
    Ok(value)
}

#[tokio::test]
async fn order_lifecycle_with_payments() -> anyhow::Result<()> {
    let Some(app) = build_app().await? else { return Ok(()) };
    let token = login_new_professional(&app).await?;

    let client = create(&app, &token, "/api/clientes/", json!({ "name": "Maria da Silva" })).await?;
    let service = create(&app, &token, "/api/servicos/", json!({ "name": "Instalação", "price": "100.00" })).await?;
    let material = create(
        &app,
        &token,
        "/api/materiais/",
        json!({ "name": "Tomada", "unitPrice": "15.00", "store": "Casa Elétrica" }),
    )
    .await?;

    let order = create(
        &app,
        &token,
        "/api/ordens/",
        json!({
            "clientId": client["id"],
            "serviceIds": [service["id"]],
            "materials": [{ "materialId": material["id"], "quantity": 2 }],
        }),
    )
    .await?;
    assert_eq!(order["status"], "OPEN");
    assert_eq!(money(&order["servicesValue"]), Decimal::new(10000, 2));
    assert_eq!(money(&order["materialsValue"]), Decimal::new(3000, 2));
    assert_eq!(money(&order["totalValue"]), Decimal::new(13000, 2));
    let order_uri = format!("/api/ordens/{}/", order["id"]);

    create(&app, &token, "/api/pagamentos/", json!({ "workOrderId": order["id"], "amount": "50.00", "method": "PIX" })).await?;

    // Acima do pendente (80.00) é recusado
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/pagamentos/",
        Some(token.as_str()),
        Some(json!({ "workOrderId": order["id"], "amount": "100.00", "method": "CASH" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, finished) = send(&app, Method::POST, &format!("{order_uri}finalizar/"), Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(finished["status"], "FINISHED");
    assert_eq!(money(&finished["pendingValue"]), Decimal::new(8000, 2));

    let last = create(&app, &token, "/api/pagamentos/", json!({ "workOrderId": order["id"], "amount": "80.00", "method": "CASH" })).await?;
    let (_, paid) = send(&app, Method::GET, &order_uri, Some(token.as_str()), None).await?;
    assert_eq!(paid["status"], "PAID");
    assert_eq!(money(&paid["pendingValue"]), Decimal::ZERO);

    // Remover o último pagamento reabre o saldo
    let (status, _) = send(&app, Method::DELETE, &format!("/api/pagamentos/{}/", last["id"]), Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, reopened) = send(&app, Method::GET, &order_uri, Some(token.as_str()), None).await?;
    assert_eq!(reopened["status"], "FINISHED");
    assert!(reopened["finishedAt"].is_null());

    let (status, stats) = send(&app, Method::GET, &format!("/api/clientes/{}/stats/", client["id"]), Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(money(&stats["totalPaid"]), Decimal::new(5000, 2));

    Ok(())
}

#[tokio::test]
async fn overlapping_schedule_is_rejected() -> anyhow::Result<()> {
    let Some(app) = build_app().await? else { return Ok(()) };
    let token = login_new_professional(&app).await?;

    let client = create(&app, &token, "/api/clientes/", json!({ "name": "João" })).await?;
    create(
        &app,
        &token,
        "/api/ordens/",
        json!({
            "clientId": client["id"],
            "scheduledAt": "2030-05-10T13:00:00Z",
            "estimatedDurationHours": "2.00",
        }),
    )
    .await?;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/ordens/",
        Some(token.as_str()),
        Some(json!({
            "clientId": client["id"],
            "scheduledAt": "2030-05-10T14:00:00Z",
            "estimatedDurationHours": "1.00",
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("João"));

    // Encostar no fim da outra não é conflito
    create(
        &app,
        &token,
        "/api/ordens/",
        json!({
            "clientId": client["id"],
            "scheduledAt": "2030-05-10T15:00:00Z",
            "estimatedDurationHours": "1.00",
        }),
    )
    .await?;

    let (status, agenda) = send(&app, Method::GET, "/api/ordens/agenda/", Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(agenda.as_array().map(Vec::len), Some(2));

    Ok(())
}

#[tokio::test]
async fn client_with_orders_cannot_be_deleted() -> anyhow::Result<()> {
    let Some(app) = build_app().await? else { return Ok(()) };
    let token = login_new_professional(&app).await?;

    let client = create(&app, &token, "/api/clientes/", json!({ "name": "Ana" })).await?;
    let order = create(&app, &token, "/api/ordens/", json!({ "clientId": client["id"] })).await?;
    let client_uri = format!("/api/clientes/{}/", client["id"]);

    let (status, _) = send(&app, Method::DELETE, &client_uri, Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/ordens/{}/", order["id"]), Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &client_uri, Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    Ok(())
}

#[tokio::test]
async fn records_of_other_professionals_are_invisible() -> anyhow::Result<()> {
    let Some(app) = build_app().await? else { return Ok(()) };
    let owner = login_new_professional(&app).await?;
    let intruder = login_new_professional(&app).await?;

    let client = create(&app, &owner, "/api/clientes/", json!({ "name": "Carlos" })).await?;
    let order = create(&app, &owner, "/api/ordens/", json!({ "clientId": client["id"] })).await?;

    let (status, _) = send(&app, Method::GET, &format!("/api/ordens/{}/", order["id"]), Some(intruder.as_str()), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, orders) = send(&app, Method::GET, "/api/ordens/", Some(intruder.as_str()), None).await?;
    assert_eq!(orders.as_array().map(Vec::len), Some(0));

    // Cliente alheio no payload é referência inválida
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/ordens/",
        Some(intruder.as_str()),
        Some(json!({ "clientId": client["id"] })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_token() -> anyhow::Result<()> {
    let Some(app) = build_app().await? else { return Ok(()) };

    let (status, _) = send(&app, Method::GET, "/api/clientes/", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/dashboard/stats/", Some("nao-e-um-jwt"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn editing_an_order_without_materials_keeps_its_usages() -> anyhow::Result<()> {
    let Some(app) = build_app().await? else { return Ok(()) };
    let token = login_new_professional(&app).await?;

    let client = create(&app, &token, "/api/clientes/", json!({ "name": "Beatriz" })).await?;
    let material = create(&app, &token, "/api/materiais/", json!({ "name": "Cabo", "unitPrice": "12.50" })).await?;
    let order = create(
        &app,
        &token,
        "/api/ordens/",
        json!({ "clientId": client["id"], "materials": [{ "materialId": material["id"], "quantity": 2 }] }),
    )
    .await?;
    let order_uri = format!("/api/ordens/{}/", order["id"]);
    let usage_uri = format!("/api/materiais-utilizados/{}/", order["materialUsages"][0]["id"]);

    let (status, patched) = send(&app, Method::PATCH, &order_uri, Some(token.as_str()), Some(json!({ "notes": "Levar escada" }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["notes"], "Levar escada");
    let (status, usage) = send(&app, Method::GET, &usage_uri, Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(usage["quantity"], 2);

    // PUT sem "materials" também preserva as linhas
    let (status, updated) = send(&app, Method::PUT, &order_uri, Some(token.as_str()), Some(json!({ "clientId": client["id"] }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(money(&updated["totalValue"]), Decimal::new(2500, 2));
    let (status, _) = send(&app, Method::GET, &usage_uri, Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::OK);

    // Lista vazia remove
    let (status, emptied) = send(
        &app,
        Method::PUT,
        &order_uri,
        Some(token.as_str()),
        Some(json!({ "clientId": client["id"], "materials": [] })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(money(&emptied["totalValue"]), Decimal::ZERO);
    let (status, _) = send(&app, Method::GET, &usage_uri, Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn catalog_price_change_updates_order_totals() -> anyhow::Result<()> {
    let Some(app) = build_app().await? else { return Ok(()) };
    let token = login_new_professional(&app).await?;

    let client = create(&app, &token, "/api/clientes/", json!({ "name": "Paulo" })).await?;
    let service = create(&app, &token, "/api/servicos/", json!({ "name": "Reparo", "price": "100.00" })).await?;
    let material = create(&app, &token, "/api/materiais/", json!({ "name": "Disjuntor", "unitPrice": "15.00" })).await?;
    let order = create(
        &app,
        &token,
        "/api/ordens/",
        json!({
            "clientId": client["id"],
            "serviceIds": [service["id"]],
            "materials": [{ "materialId": material["id"], "quantity": 2 }],
        }),
    )
    .await?;
    let order_uri = format!("/api/ordens/{}/", order["id"]);

    create(&app, &token, "/api/pagamentos/", json!({ "workOrderId": order["id"], "amount": "130.00", "method": "PIX" })).await?;
    let (_, paid) = send(&app, Method::POST, &format!("{order_uri}finalizar/"), Some(token.as_str()), None).await?;
    assert_eq!(paid["status"], "PAID");

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/servicos/{}/", service["id"]),
        Some(token.as_str()),
        Some(json!({ "name": "Reparo", "price": "120.00" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let (_, reopened) = send(&app, Method::GET, &order_uri, Some(token.as_str()), None).await?;
    assert_eq!(money(&reopened["totalValue"]), Decimal::new(15000, 2));
    assert_eq!(money(&reopened["pendingValue"]), Decimal::new(2000, 2));
    assert_eq!(reopened["status"], "FINISHED");

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/materiais/{}/", material["id"]),
        Some(token.as_str()),
        Some(json!({ "unitPrice": "10.00" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let (_, cheaper) = send(&app, Method::GET, &order_uri, Some(token.as_str()), None).await?;
    assert_eq!(money(&cheaper["totalValue"]), Decimal::new(14000, 2));
    assert_eq!(money(&cheaper["pendingValue"]), Decimal::new(1000, 2));

    // O saldo reaberto aceita pagamento e a ordem volta a PAID
    create(&app, &token, "/api/pagamentos/", json!({ "workOrderId": order["id"], "amount": "10.00", "method": "CASH" })).await?;
    let (_, settled) = send(&app, Method::GET, &order_uri, Some(token.as_str()), None).await?;
    assert_eq!(settled["status"], "PAID");

    Ok(())
}

#[tokio::test]
async fn total_beyond_the_column_limit_is_a_bad_request() -> anyhow::Result<()> {
    let Some(app) = build_app().await? else { return Ok(()) };
    let token = login_new_professional(&app).await?;

    let client = create(&app, &token, "/api/clientes/", json!({ "name": "Rita" })).await?;
    let material = create(&app, &token, "/api/materiais/", json!({ "name": "Gerador", "unitPrice": "60000000.00" })).await?;
    let lines = json!([{ "materialId": material["id"], "quantity": 2 }]);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/ordens/",
        Some(token.as_str()),
        Some(json!({ "clientId": client["id"], "materials": lines })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let order = create(&app, &token, "/api/ordens/", json!({ "clientId": client["id"] })).await?;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/materiais-utilizados/",
        Some(token.as_str()),
        Some(json!({ "workOrderId": order["id"], "materialId": material["id"], "quantity": 2 })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let usage = create(
        &app,
        &token,
        "/api/materiais-utilizados/",
        json!({ "workOrderId": order["id"], "materialId": material["id"], "quantity": 1 }),
    )
    .await?;
    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/materiais-utilizados/{}/", usage["id"]),
        Some(token.as_str()),
        Some(json!({ "quantity": 3 })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nada foi gravado pelas tentativas recusadas
    let (_, unchanged) = send(&app, Method::GET, &format!("/api/ordens/{}/", order["id"]), Some(token.as_str()), None).await?;
    assert_eq!(money(&unchanged["totalValue"]), Decimal::new(6_000_000_000, 2));
    assert_eq!(unchanged["materialUsages"][0]["quantity"], 1);

    Ok(())
}

#[tokio::test]
async fn malformed_body_is_a_json_bad_request() -> anyhow::Result<()> {
    let Some(app) = build_app().await? else { return Ok(()) };
    let token = login_new_professional(&app).await?;

    let (status, body) = send(&app, Method::POST, "/api/clientes/", Some(token.as_str()), Some(json!({ "email": "x@y.com" }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "O corpo da requisição é inválido.");
    assert!(body["details"]["body"][0].as_str().unwrap_or_default().contains("name"));

    Ok(())
}

#[tokio::test]
async fn catalog_items_in_use_cannot_be_deleted() -> anyhow::Result<()> {
    let Some(app) = build_app().await? else { return Ok(()) };
    let token = login_new_professional(&app).await?;

    let client = create(&app, &token, "/api/clientes/", json!({ "name": "Lúcia" })).await?;
    let used_service = create(&app, &token, "/api/servicos/", json!({ "name": "Pintura", "price": "300.00" })).await?;
    let free_service = create(&app, &token, "/api/servicos/", json!({ "name": "Vistoria", "price": "80.00" })).await?;
    let used_material = create(&app, &token, "/api/materiais/", json!({ "name": "Tinta", "unitPrice": "90.00" })).await?;
    let free_material = create(&app, &token, "/api/materiais/", json!({ "name": "Lixa", "unitPrice": "3.00" })).await?;
    let order = create(
        &app,
        &token,
        "/api/ordens/",
        json!({
            "clientId": client["id"],
            "serviceIds": [used_service["id"]],
            "materials": [{ "materialId": used_material["id"], "quantity": 1 }],
        }),
    )
    .await?;

    let used_service_uri = format!("/api/servicos/{}/", used_service["id"]);
    let used_material_uri = format!("/api/materiais/{}/", used_material["id"]);

    let (status, _) = send(&app, Method::DELETE, &used_service_uri, Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, Method::DELETE, &used_material_uri, Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/servicos/{}/", free_service["id"]), Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &format!("/api/materiais/{}/", free_material["id"]), Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Sem a ordem, os itens ficam livres
    let (status, _) = send(&app, Method::DELETE, &format!("/api/ordens/{}/", order["id"]), Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &used_service_uri, Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &used_material_uri, Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    Ok(())
}

#[tokio::test]
async fn material_usage_writes_recompute_the_order_total() -> anyhow::Result<()> {
    let Some(app) = build_app().await? else { return Ok(()) };
    let token = login_new_professional(&app).await?;

    let client = create(&app, &token, "/api/clientes/", json!({ "name": "Sérgio" })).await?;
    let service = create(&app, &token, "/api/servicos/", json!({ "name": "Instalação", "price": "100.00" })).await?;
    let cable = create(&app, &token, "/api/materiais/", json!({ "name": "Cabo", "unitPrice": "15.00" })).await?;
    let switch = create(&app, &token, "/api/materiais/", json!({ "name": "Interruptor", "unitPrice": "22.00" })).await?;
    let order = create(&app, &token, "/api/ordens/", json!({ "clientId": client["id"], "serviceIds": [service["id"]] })).await?;
    let order_uri = format!("/api/ordens/{}/", order["id"]);

    let total = |order: &Value| money(&order["totalValue"]);

    let usage = create(
        &app,
        &token,
        "/api/materiais-utilizados/",
        json!({ "workOrderId": order["id"], "materialId": cable["id"], "quantity": 3 }),
    )
    .await?;
    assert_eq!(money(&usage["lineValue"]), Decimal::new(4500, 2));
    let (_, current) = send(&app, Method::GET, &order_uri, Some(token.as_str()), None).await?;
    assert_eq!(total(&current), Decimal::new(14500, 2));

    let usage_uri = format!("/api/materiais-utilizados/{}/", usage["id"]);
    let (status, _) = send(&app, Method::PATCH, &usage_uri, Some(token.as_str()), Some(json!({ "quantity": 1 }))).await?;
    assert_eq!(status, StatusCode::OK);
    let (_, current) = send(&app, Method::GET, &order_uri, Some(token.as_str()), None).await?;
    assert_eq!(total(&current), Decimal::new(11500, 2));

    let (status, swapped) = send(&app, Method::PUT, &usage_uri, Some(token.as_str()), Some(json!({ "materialId": switch["id"] }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(swapped["quantity"], 1);
    let (_, current) = send(&app, Method::GET, &order_uri, Some(token.as_str()), None).await?;
    assert_eq!(total(&current), Decimal::new(12200, 2));

    let (status, _) = send(&app, Method::DELETE, &usage_uri, Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, current) = send(&app, Method::GET, &order_uri, Some(token.as_str()), None).await?;
    assert_eq!(total(&current), Decimal::new(10000, 2));

    let (_, usages) = send(&app, Method::GET, &format!("/api/materiais-utilizados/?ordem={}", order["id"]), Some(token.as_str()), None).await?;
    assert_eq!(usages.as_array().map(Vec::len), Some(0));

    Ok(())
}

#[tokio::test]
async fn closed_orders_reject_finalize_and_payments() -> anyhow::Result<()> {
    let Some(app) = build_app().await? else { return Ok(()) };
    let token = login_new_professional(&app).await?;

    let client = create(&app, &token, "/api/clientes/", json!({ "name": "Tereza" })).await?;
    let service = create(&app, &token, "/api/servicos/", json!({ "name": "Visita", "price": "50.00" })).await?;

    let paid = create(&app, &token, "/api/ordens/", json!({ "clientId": client["id"], "serviceIds": [service["id"]] })).await?;
    create(&app, &token, "/api/pagamentos/", json!({ "workOrderId": paid["id"], "amount": "50.00", "method": "PIX" })).await?;
    let finalize_paid = format!("/api/ordens/{}/finalizar/", paid["id"]);
    let (_, order) = send(&app, Method::POST, &finalize_paid, Some(token.as_str()), None).await?;
    assert_eq!(order["status"], "PAID");
    let (status, _) = send(&app, Method::POST, &finalize_paid, Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let canceled = create(&app, &token, "/api/ordens/", json!({ "clientId": client["id"], "serviceIds": [service["id"]] })).await?;
    let (status, order) = send(&app, Method::POST, &format!("/api/ordens/{}/cancelar/", canceled["id"]), Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "CANCELED");

    let (status, _) = send(&app, Method::POST, &format!("/api/ordens/{}/finalizar/", canceled["id"]), Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/pagamentos/",
        Some(token.as_str()),
        Some(json!({ "workOrderId": canceled["id"], "amount": "10.00", "method": "CASH" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, payments) = send(&app, Method::GET, &format!("/api/pagamentos/?ordem={}", canceled["id"]), Some(token.as_str()), None).await?;
    assert_eq!(payments.as_array().map(Vec::len), Some(0));

    Ok(())
}

#[tokio::test]
async fn dashboard_and_stores_with_a_valid_token() -> anyhow::Result<()> {
    let Some(app) = build_app().await? else { return Ok(()) };
    let token = login_new_professional(&app).await?;

    let client = create(&app, &token, "/api/clientes/", json!({ "name": "Otávio" })).await?;
    let service = create(&app, &token, "/api/servicos/", json!({ "name": "Manutenção", "price": "200.00" })).await?;
    for store in ["Casa Elétrica", "  Casa Elétrica ", "   ", "", "Ferragens Lima"] {
        create(&app, &token, "/api/materiais/", json!({ "name": "Item", "unitPrice": "1.00", "store": store })).await?;
    }

    let order = create(&app, &token, "/api/ordens/", json!({ "clientId": client["id"], "serviceIds": [service["id"]] })).await?;
    create(&app, &token, "/api/pagamentos/", json!({ "workOrderId": order["id"], "amount": "200.00", "method": "PIX" })).await?;
    send(&app, Method::POST, &format!("/api/ordens/{}/finalizar/", order["id"]), Some(token.as_str()), None).await?;
    create(&app, &token, "/api/ordens/", json!({ "clientId": client["id"] })).await?;

    let (status, stores) = send(&app, Method::GET, "/api/materiais/stores/", Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stores, json!(["Casa Elétrica", "Ferragens Lima"]));

    let (status, stats) = send(&app, Method::GET, "/api/dashboard/stats/", Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalOrders"], 2);
    assert_eq!(stats["openOrders"], 1);
    assert_eq!(stats["paidOrders"], 1);
    assert_eq!(stats["completedOrders"], 1);
    assert_eq!(stats["totalClients"], 1);
    assert_eq!(stats["totalServices"], 1);
    assert_eq!(money(&stats["totalRevenue"]), Decimal::new(20000, 2));
    assert_eq!(money(&stats["revenueThisMonth"]), Decimal::new(20000, 2));
    assert_eq!(money(&stats["averageTicket"]), Decimal::new(20000, 2));

    Ok(())
}
