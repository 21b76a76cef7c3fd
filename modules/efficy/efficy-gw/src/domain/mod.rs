//! Domain layer: gateway proxy, identity chain, referential cache and record services.

pub mod auth;
pub mod beans;
pub mod demandes;
pub mod error;
pub mod gateway;
pub mod paging;
pub mod ports;
pub mod records;
pub mod referential;

pub use auth::AuthorizationResolver;
pub use demandes::{DemandesService, PersonLookup};
pub use error::DomainError;
pub use gateway::GatewayService;
pub use paging::PageLimits;
pub use records::CrmRecordsService;
pub use referential::{ReferentialCache, ReferentialMap, ReferentialOption};
