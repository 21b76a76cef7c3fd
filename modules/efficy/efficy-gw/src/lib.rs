//! Efficy CRM bridge module.
//!
//! Sits between a frontend and a single Efficy CRM instance:
//!
//! - Authenticated passthrough to the `advanced`, `base` and `service` namespaces
//! - Caller email → person id → demandes lookup chain
//! - Referential cache for reference tables, enterprises and persons
//! - Typed record operations (demandes, profile, opportunities, FAQs, attachments)
//!
//! ## Architecture
//!
//! ```text
//!      HTTP frontend              in-process consumer
//!            │                            │
//!            ▼ api::rest::router          ▼ EfficyLocalClient
//! ┌──────────────────────────────────────────────────────┐
//! │ DemandesService  CrmRecordsService  ReferentialCache │
//! │                        │                             │
//! │                        ▼                             │
//! │                  GatewayService                      │
//! └────────────────────────┬─────────────────────────────┘
//!                          ▼ UpstreamTransport (reqwest)
//!                      Efficy CRM
//! ```
//!
//! The public API is defined in `efficy-sdk` and re-exported here.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

// === PUBLIC API (from SDK) ===
pub use efficy_sdk::{
    Attachment, BrokerOpportunity, BusinessRule, CallerContext, Demande, EfficyDemandesApi,
    EfficyError, EfficyGatewayApi, EfficyRecordsApi, ErrorKind, Faq, GatewayRequest,
    GatewayResponse, HttpMethod, NewAttachment, NewDemande, ResourceType, UserProfile,
    UserProfilePatch,
};

// === MODULE DEFINITION ===
pub mod module;
pub use module::EfficyModule;

// === LOCAL CLIENT ===
pub mod local_client;
pub use local_client::EfficyLocalClient;

pub mod config;
pub use config::EfficyConfig;

pub mod secret;
pub use secret::SecretString;

// === INTERNAL MODULES ===
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
