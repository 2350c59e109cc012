pub mod auth;
pub mod catalog;
pub mod clients;
pub mod dashboard;
pub mod material_usages;
pub mod payments;
pub mod work_orders;
