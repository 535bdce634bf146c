pub mod account_service;
pub mod audit_service;
pub mod error;
pub mod policy;
pub mod projection;
pub mod ticket_service;
pub mod visibility;
