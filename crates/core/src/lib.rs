//! Core business logic for Curafin.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, derivation rules, and validation guards live here.
//!
//! # Modules
//!
//! - `auth` - Password hashing
//! - `budget` - Budget consumption arithmetic and health classification
//! - `invoice` - Invoice totals and payment status derivation
//! - `serial` - Serial number formatting for ledger records
//! - `validation` - Monetary input guards

pub mod auth;
pub mod budget;
pub mod invoice;
pub mod serial;
pub mod validation;
