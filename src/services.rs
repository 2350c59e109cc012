pub mod auth;
pub mod billing;
pub mod catalog_service;
pub mod client_service;
pub mod dashboard_service;
pub mod payment_service;
pub mod scheduling;
pub mod work_order_service;
