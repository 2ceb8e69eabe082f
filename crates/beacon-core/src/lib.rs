//! Shared types for the beacon tracking client.
//!
//! This crate provides:
//! - `PayloadBuilder`: renders tracking parameters as a URL query or JSON body
//! - `params`: the collector's tracking parameter names
//! - `CustomVariables`: the five-slot custom variable set
//! - `ApiUrl`: normalized collector endpoint addresses
//! - `visitor_id_for_user`: stable visitor id derivation

mod api_url;
mod error;
mod identity;
mod payload;
pub mod params;
mod vars;

pub use api_url::{normalize_api_url, ApiUrl};
pub use error::{CoreError, CoreResult};
pub use identity::visitor_id_for_user;
pub use payload::{Method, PayloadBuilder, QueryFormat};
pub use vars::{CustomVariables, CUSTOM_VARIABLE_SLOTS, CUSTOM_VARIABLE_MAX_LEN};
