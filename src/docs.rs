// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::obtain_token,
        handlers::auth::refresh_token,
        handlers::auth::get_me,

        // --- Clientes ---
        handlers::clients::list_clients,
        handlers::clients::create_client,
        handlers::clients::get_client,
        handlers::clients::update_client,
        handlers::clients::patch_client,
        handlers::clients::delete_client,
        handlers::clients::client_stats,

        // --- Catálogo ---
        handlers::catalog::list_services,
        handlers::catalog::create_service,
        handlers::catalog::get_service,
        handlers::catalog::update_service,
        handlers::catalog::patch_service,
        handlers::catalog::delete_service,
        handlers::catalog::list_materials,
        handlers::catalog::create_material,
        handlers::catalog::list_stores,
        handlers::catalog::get_material,
        handlers::catalog::update_material,
        handlers::catalog::patch_material,
        handlers::catalog::delete_material,

        // --- Ordens ---
        handlers::work_orders::list_orders,
        handlers::work_orders::create_order,
        handlers::work_orders::agenda,
        handlers::work_orders::get_order,
        handlers::work_orders::update_order,
        handlers::work_orders::patch_order,
        handlers::work_orders::delete_order,
        handlers::work_orders::finalize_order,
        handlers::work_orders::cancel_order,

        // --- Materiais utilizados ---
        handlers::material_usages::list_usages,
        handlers::material_usages::create_usage,
        handlers::material_usages::get_usage,
        handlers::material_usages::update_usage,
        handlers::material_usages::delete_usage,

        // --- Pagamentos ---
        handlers::payments::list_payments,
        handlers::payments::create_payment,
        handlers::payments::get_payment,
        handlers::payments::delete_payment,

        // --- Dashboard ---
        handlers::dashboard::get_stats,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::TokenPayload,
            models::auth::RefreshPayload,
            models::auth::TokenPair,
            models::auth::AccessToken,

            // --- Clientes ---
            models::client::Client,
            models::client::ClientPayload,
            models::client::ClientPatch,
            models::client::ClientStats,

            // --- Catálogo ---
            models::catalog::Service,
            models::catalog::ServicePayload,
            models::catalog::ServicePatch,
            models::catalog::Material,
            models::catalog::MaterialPayload,
            models::catalog::MaterialPatch,

            // --- Ordens ---
            models::work_order::WorkOrderStatus,
            models::work_order::WorkOrder,
            models::work_order::WorkOrderDetail,
            models::work_order::OrderValues,
            models::work_order::AgendaEntry,
            models::work_order::MaterialLinePayload,
            models::work_order::WorkOrderPayload,
            models::work_order::WorkOrderPatch,
            models::work_order::MaterialUsage,
            models::work_order::MaterialUsageDetail,
            models::work_order::CreateMaterialUsagePayload,
            models::work_order::MaterialUsagePatch,

            // --- Pagamentos ---
            models::payment::PaymentMethod,
            models::payment::Payment,
            models::payment::PaymentView,
            models::payment::CreatePaymentPayload,

            // --- Dashboard ---
            models::dashboard::StatusCounts,
            models::dashboard::DashboardStats,
        )
    ),
    tags(
        (name = "Auth", description = "Registro, tokens e perfil do profissional"),
        (name = "Clientes", description = "Cadastro de clientes e seus totais"),
        (name = "Serviços", description = "Catálogo de serviços"),
        (name = "Materiais", description = "Catálogo de materiais"),
        (name = "Ordens de Serviço", description = "Ordens, agenda, finalização e cancelamento"),
        (name = "Materiais Utilizados", description = "Materiais lançados nas ordens"),
        (name = "Pagamentos", description = "Pagamentos das ordens"),
        (name = "Dashboard", description = "Indicadores do profissional")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
