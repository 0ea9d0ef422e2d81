//! Stafflink: recruitment-intake backend.
//!
//! Issues time-boxed public application links for hiring campaigns, accepts
//! applicant submissions and document uploads, routes them through the
//! back-office verification queue, and exports approved applicants to the
//! Smart payroll system. Authentication is proxied to an external IAM
//! service.

pub mod auth;
pub mod config;
pub mod error;
pub mod integrations;
pub mod recruitment;
pub mod telemetry;
