//! Core use-case services.
//!
//! # Responsibility
//! - Resolve the caller's owner once per call and thread it explicitly.
//! - Keep UI/navigation layers decoupled from storage details.

pub mod connectr_service;
