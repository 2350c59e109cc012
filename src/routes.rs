// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

/// Monta o router completo: rotas públicas, rotas protegidas por JWT e a documentação.
pub fn build_router(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/api/user/register/", post(handlers::auth::register))
        .route("/api/token/", post(handlers::auth::obtain_token))
        .route("/api/token/refresh/", post(handlers::auth::refresh_token));

    // Tudo abaixo exige access token; cada consulta é limitada ao profissional autenticado
    let protected_routes = Router::new()
        .route("/api/user/me/", get(handlers::auth::get_me))
        // Clientes
        .route(
            "/api/clientes/",
            get(handlers::clients::list_clients).post(handlers::clients::create_client),
        )
        .route(
            "/api/clientes/{id}/",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .patch(handlers::clients::patch_client)
                .delete(handlers::clients::delete_client),
        )
        .route("/api/clientes/{id}/stats/", get(handlers::clients::client_stats))
        // Catálogo
        .route(
            "/api/servicos/",
            get(handlers::catalog::list_services).post(handlers::catalog::create_service),
        )
        .route(
            "/api/servicos/{id}/",
            get(handlers::catalog::get_service)
                .put(handlers::catalog::update_service)
                .patch(handlers::catalog::patch_service)
                .delete(handlers::catalog::delete_service),
        )
        .route(
            "/api/materiais/",
            get(handlers::catalog::list_materials).post(handlers::catalog::create_material),
        )
        .route("/api/materiais/stores/", get(handlers::catalog::list_stores))
        .route(
            "/api/materiais/{id}/",
            get(handlers::catalog::get_material)
                .put(handlers::catalog::update_material)
                .patch(handlers::catalog::patch_material)
                .delete(handlers::catalog::delete_material),
        )
        // Ordens de serviço
        .route(
            "/api/ordens/",
            get(handlers::work_orders::list_orders).post(handlers::work_orders::create_order),
        )
        .route("/api/ordens/agenda/", get(handlers::work_orders::agenda))
        .route(
            "/api/ordens/{id}/",
            get(handlers::work_orders::get_order)
                .put(handlers::work_orders::update_order)
                .patch(handlers::work_orders::patch_order)
                .delete(handlers::work_orders::delete_order),
        )
        .route("/api/ordens/{id}/finalizar/", post(handlers::work_orders::finalize_order))
        .route("/api/ordens/{id}/cancelar/", post(handlers::work_orders::cancel_order))
        // Materiais utilizados
        .route(
            "/api/materiais-utilizados/",
            get(handlers::material_usages::list_usages).post(handlers::material_usages::create_usage),
        )
        .route(
            "/api/materiais-utilizados/{id}/",
            get(handlers::material_usages::get_usage)
                .put(handlers::material_usages::update_usage)
                .patch(handlers::material_usages::update_usage)
                .delete(handlers::material_usages::delete_usage),
        )
        // Pagamentos
        .route(
            "/api/pagamentos/",
            get(handlers::payments::list_payments).post(handlers::payments::create_payment),
        )
        .route(
            "/api/pagamentos/{id}/",
            get(handlers::payments::get_payment).delete(handlers::payments::delete_payment),
        )
        // Dashboard
        .route("/api/dashboard/stats/", get(handlers::dashboard::get_stats))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .merge(auth_routes)
        .merge(protected_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
