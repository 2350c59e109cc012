pub mod auth;
pub mod catalog;
pub mod client;
pub mod dashboard;
pub mod payment;
pub mod work_order;
