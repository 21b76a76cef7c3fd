//! Efficy SDK
//!
//! Public contract of the Efficy CRM bridge, shared by the gateway module and by the
//! presentation layer that consumes it.
//!
//! ## API Traits
//!
//! - `EfficyGatewayApi` - authenticated passthrough to one of the CRM resource namespaces
//! - `EfficyDemandesApi` - email → person → demandes lookup chain
//! - `EfficyRecordsApi` - typed, label-resolved records for one caller session
//!
//! ## Usage
//!
//! ```ignore
//! use efficy_sdk::{CallerContext, EfficyDemandesApi};
//!
//! let caller = CallerContext::new(authorization, Some("jane@example.com".to_owned()));
//! let response = demandes.fetch_demandes_for_current_user(&caller, 20).await?;
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod api;
pub mod entities;
pub mod error;
pub mod models;

// API traits
pub use api::{EfficyDemandesApi, EfficyGatewayApi, EfficyRecordsApi};

// Error types
pub use error::{BusinessRule, EfficyError, ErrorKind};

// Models
pub use models::{CallerContext, GatewayRequest, GatewayResponse, HttpMethod, ResourceType};

// Entities
pub use entities::{
    Attachment, BrokerOpportunity, Demande, Faq, NewAttachment, NewDemande, UserProfile,
    UserProfilePatch,
};

// Bean primitives (re-exported for convenience)
pub use efficy_bean::{Bean, BeanField};
