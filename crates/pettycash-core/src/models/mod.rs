//! Data models for vouchers and pipeline configuration.

pub mod config;
pub mod voucher;
