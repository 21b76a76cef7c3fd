//! Efficy API traits.

use async_trait::async_trait;

use crate::entities::{
    Attachment, BrokerOpportunity, Demande, Faq, NewDemande, UserProfile, UserProfilePatch,
};
use crate::error::EfficyError;
use crate::models::{CallerContext, GatewayRequest, GatewayResponse};

/// Authenticated passthrough to the CRM.
///
/// ```ignore
/// let req = GatewayRequest::new(ResourceType::Base, HttpMethod::Get, "Faq", caller);
/// let resp = gateway.forward(req).await?;
/// ```
///
/// A CRM error status is not an `Err`: the upstream status and body come back verbatim
/// in the response.
#[async_trait]
pub trait EfficyGatewayApi: Send + Sync {
    /// Forward one request to the namespace named by `req.resource_type`.
    ///
    /// # Returns
    /// * `Ok(GatewayResponse)` - Whatever the CRM answered, including error statuses
    /// * `Err(EfficyError::Validation)` - Path rejected before any network call
    /// * `Err(EfficyError::Transport)` - CRM unreachable or timed out
    async fn forward(&self, req: GatewayRequest) -> Result<GatewayResponse, EfficyError>;
}

/// Email → person → demandes lookup chain for the calling user.
#[async_trait]
pub trait EfficyDemandesApi: Send + Sync {
    /// Resolve the caller's person record (id only).
    ///
    /// # Returns
    /// * `Ok(GatewayResponse)` - The person lookup response, relayed as received
    /// * `Err(EfficyError::Validation)` - Missing or malformed caller email
    async fn fetch_current_person(
        &self,
        caller: &CallerContext,
    ) -> Result<GatewayResponse, EfficyError>;

    /// List the caller's demandes, at most `page_size` (capped by configuration).
    ///
    /// # Returns
    /// * `Ok(GatewayResponse)` - The demandes response, or the failed person lookup
    /// * `Err(EfficyError::IdentityNotFound)` - No person matches the caller email
    async fn fetch_demandes_for_current_user(
        &self,
        caller: &CallerContext,
        page_size: u32,
    ) -> Result<GatewayResponse, EfficyError>;
}

/// Typed CRM records with referential labels resolved.
///
/// Upstream error statuses surface as `EfficyError::Upstream`.
#[async_trait]
pub trait EfficyRecordsApi: Send + Sync {
    /// Demandes of the calling user.
    async fn list_demandes(
        &self,
        caller: &CallerContext,
        page_size: u32,
    ) -> Result<Vec<Demande>, EfficyError>;

    /// Profile of the calling user with the enterprise name resolved.
    async fn get_user_profile(&self, caller: &CallerContext) -> Result<UserProfile, EfficyError>;

    /// Apply `patch` to the person `person_id` and return the updated profile.
    async fn update_user_profile(
        &self,
        caller: &CallerContext,
        person_id: &str,
        patch: UserProfilePatch,
    ) -> Result<UserProfile, EfficyError>;

    /// Opportunities brokered by `person_id`.
    async fn list_broker_opportunities(
        &self,
        caller: &CallerContext,
        person_id: &str,
    ) -> Result<Vec<BrokerOpportunity>, EfficyError>;

    async fn list_faqs(&self, caller: &CallerContext) -> Result<Vec<Faq>, EfficyError>;

    /// Download attachments by id. Unreadable ones are left out of the result.
    async fn list_attachments(
        &self,
        caller: &CallerContext,
        ids: &[String],
    ) -> Result<Vec<Attachment>, EfficyError>;

    /// Create a demande owned by the calling user and return its id.
    ///
    /// # Returns
    /// * `Ok(String)` - Id of the new demande
    /// * `Err(EfficyError::BusinessRule)` - Required field missing, nothing was sent
    async fn create_demande(
        &self,
        caller: &CallerContext,
        demande: NewDemande,
    ) -> Result<String, EfficyError>;
}
