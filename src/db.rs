pub mod user_repo;
pub use user_repo::UserRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod work_order_repo;
pub use work_order_repo::WorkOrderRepository;
pub mod payment_repo;
pub use payment_repo::PaymentRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
