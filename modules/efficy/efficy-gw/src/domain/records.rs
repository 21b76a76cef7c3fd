//! Typed CRM records for the presentation layer.

use std::sync::Arc;

use efficy_bean::{Bean, FieldRef};
use efficy_sdk::entities::{
    attachment_fields, demande_fields, faq_fields, opportunity_fields, person_fields,
};
use efficy_sdk::{
    Attachment, BrokerOpportunity, CallerContext, Demande, Faq, GatewayRequest, HttpMethod,
    NewDemande, ResourceType, UserProfile, UserProfilePatch,
};
use futures::future::join_all;
use tracing::{debug, info, instrument, warn};
use url::form_urlencoded;

use super::beans::{equals_filter, get_request, read_beans, restrict_to};
use super::demandes::{DemandesService, is_record_id};
use super::error::DomainError;
use super::gateway::GatewayService;
use super::referential::ReferentialCache;

const DEMANDE_PATH: &str = "Demande";
const PERSON_PATH: &str = "Person";
const OPPORTUNITY_PATH: &str = "Opportunity";
const FAQ_PATH: &str = "Faq";
const ATTACHMENT_PATH: &str = "Attachment";

/// Record operations built on the gateway, the identity chain and the referential cache.
pub struct CrmRecordsService {
    gateway: Arc<GatewayService>,
    identity: Arc<DemandesService>,
    referential: Arc<ReferentialCache>,
}

impl CrmRecordsService {
    #[must_use]
    pub fn new(
        gateway: Arc<GatewayService>,
        identity: Arc<DemandesService>,
        referential: Arc<ReferentialCache>,
    ) -> Self {
        Self {
            gateway,
            identity,
            referential,
        }
    }

    /// Demandes of the caller with status, priority and qualification labels resolved.
    ///
    /// # Errors
    /// Identity chain errors, `Upstream` when the CRM rejects the listing.
    #[instrument(skip(self, caller))]
    pub async fn list_demandes(
        &self,
        caller: &CallerContext,
        page_size: u32,
    ) -> Result<Vec<Demande>, DomainError> {
        let person_id = self.identity.require_person_id(caller).await?;
        let response = self
            .identity
            .fetch_demandes_for_person(caller, &person_id, page_size)
            .await?;

        let mut demandes = Vec::new();
        for bean in read_beans(&response)? {
            let mut demande = Demande::from_bean(&bean);
            demande.status = self
                .label_or(caller, demande_fields::STATUS, &demande.status_id, demande.status)
                .await;
            demande.priority = self
                .label_or(caller, demande_fields::PRIORITY, &demande.priority_id, demande.priority)
                .await;
            demande.priority_weight = self
                .numeric_value(caller, demande_fields::PRIORITY, &demande.priority_id)
                .await;
            demande.qualification = self
                .label_or(
                    caller,
                    demande_fields::QUALIFICATION,
                    &demande.qualification_id,
                    demande.qualification,
                )
                .await;
            demandes.push(demande);
        }
        debug!(count = demandes.len(), "demandes listed");
        Ok(demandes)
    }

    /// Profile of the caller, enterprise name included.
    ///
    /// # Errors
    /// Identity chain errors, `IdentityNotFound` when the person record is gone.
    #[instrument(skip_all)]
    pub async fn get_user_profile(&self, caller: &CallerContext) -> Result<UserProfile, DomainError> {
        let person_id = self.identity.require_person_id(caller).await?;
        self.load_profile(caller, &person_id).await
    }

    /// Apply `patch` to person `person_id`.
    ///
    /// # Errors
    /// `BusinessRule` for an invalid patch (nothing sent), `Validation` for a malformed id,
    /// `Upstream` when the CRM rejects the update.
    #[instrument(skip(self, caller, patch))]
    pub async fn update_user_profile(
        &self,
        caller: &CallerContext,
        person_id: &str,
        patch: &UserProfilePatch,
    ) -> Result<UserProfile, DomainError> {
        patch.validate()?;
        let person_id = checked_id(person_id)?;

        let req = GatewayRequest::new(
            ResourceType::Advanced,
            HttpMethod::Put,
            format!("{PERSON_PATH}/{person_id}"),
            caller.clone(),
        )
        .with_body(patch.to_json().to_string());
        let response = self.gateway.forward(req).await?;
        if response.is_error() {
            return Err(DomainError::upstream_response(&response));
        }

        self.referential.forget_person(person_id);
        info!("user profile updated");
        self.load_profile(caller, person_id).await
    }

    /// Opportunities brokered by `person_id`.
    ///
    /// # Errors
    /// `Validation` for a malformed id, `Upstream` when the CRM rejects the listing.
    #[instrument(skip(self, caller))]
    pub async fn list_broker_opportunities(
        &self,
        caller: &CallerContext,
        person_id: &str,
    ) -> Result<Vec<BrokerOpportunity>, DomainError> {
        let person_id = checked_id(person_id)?;
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(
                "filter",
                &equals_filter(opportunity_fields::BROKER, person_id),
            )
            .append_pair("restrict_to", &restrict_to(&opportunity_fields::LISTED))
            .finish();
        let response = self
            .gateway
            .forward(get_request(
                ResourceType::Advanced,
                OPPORTUNITY_PATH,
                Some(query),
                caller,
            ))
            .await?;

        let mut opportunities = Vec::new();
        for bean in read_beans(&response)? {
            let mut opportunity = BrokerOpportunity::from_bean(&bean);
            opportunity.status = self
                .label_or(
                    caller,
                    opportunity_fields::STATUS,
                    &opportunity.status_id,
                    opportunity.status,
                )
                .await;
            if opportunity.enterprise_name.is_empty() {
                opportunity.enterprise_name =
                    self.enterprise_name(caller, &opportunity.enterprise_id).await;
            }
            opportunities.push(opportunity);
        }
        Ok(opportunities)
    }

    /// # Errors
    /// `Upstream` when the CRM rejects the listing.
    #[instrument(skip_all)]
    pub async fn list_faqs(&self, caller: &CallerContext) -> Result<Vec<Faq>, DomainError> {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("restrict_to", &restrict_to(&faq_fields::LISTED))
            .finish();
        let response = self
            .gateway
            .forward(get_request(ResourceType::Base, FAQ_PATH, Some(query), caller))
            .await?;
        Ok(read_beans(&response)?.iter().map(Faq::from_bean).collect())
    }

    /// Attachments by id, fetched concurrently. Items that cannot be read are skipped.
    ///
    /// # Errors
    /// Transport errors abort the whole listing.
    #[instrument(skip(self, caller, ids), fields(requested = ids.len()))]
    pub async fn list_attachments(
        &self,
        caller: &CallerContext,
        ids: &[String],
    ) -> Result<Vec<Attachment>, DomainError> {
        let mut unique: Vec<&str> = Vec::new();
        for id in ids.iter().map(String::as_str).map(str::trim).filter(|id| !id.is_empty()) {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }

        let results = join_all(unique.into_iter().map(|id| self.fetch_attachment(caller, id))).await;
        results
            .into_iter()
            .filter_map(Result::transpose)
            .collect()
    }

    /// Create a demande owned by the caller and return its id.
    ///
    /// # Errors
    /// `BusinessRule` before anything is sent, identity chain errors, `Upstream` when the
    /// CRM rejects the creation, `Internal` when it answers without an id.
    #[instrument(skip_all, fields(attachments = demande.attachments.len()))]
    pub async fn create_demande(
        &self,
        caller: &CallerContext,
        demande: &NewDemande,
    ) -> Result<String, DomainError> {
        demande.validate()?;
        let person_id = self.identity.require_person_id(caller).await?;

        let req = GatewayRequest::new(
            ResourceType::Advanced,
            HttpMethod::Post,
            DEMANDE_PATH,
            caller.clone(),
        )
        .with_body(demande.to_json(&person_id).to_string());
        let response = self.gateway.forward(req).await?;
        if response.is_error() {
            return Err(DomainError::upstream_response(&response));
        }

        let body = response
            .json_body()
            .map_err(|_| DomainError::internal("Efficy returned a body that is not JSON"))?;
        let id = Bean::find_fields(&body, demande_fields::ID)
            .iter()
            .filter_map(|field| field.resolve_raw().and_then(FieldRef::first_text))
            .map(str::trim)
            .find(|id| !id.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| DomainError::internal("Efficy did not return the new demande id"))?;

        info!(demande_id = %id, "demande created");
        Ok(id)
    }

    async fn load_profile(
        &self,
        caller: &CallerContext,
        person_id: &str,
    ) -> Result<UserProfile, DomainError> {
        let mut profile = (*self.referential.get_person_info(caller, person_id).await?).clone();
        if profile.person_id.is_empty() {
            person_id.clone_into(&mut profile.person_id);
        }
        if profile.enterprise_name.is_empty() {
            profile.enterprise_name = self.enterprise_name(caller, &profile.enterprise_id).await;
        }
        Ok(profile)
    }

    async fn fetch_attachment(
        &self,
        caller: &CallerContext,
        id: &str,
    ) -> Result<Option<Attachment>, DomainError> {
        if !is_record_id(id) {
            warn!(attachment_id = id, "skipping malformed attachment id");
            return Ok(None);
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("restrict_to", &restrict_to(&attachment_fields::LISTED))
            .finish();
        let response = self
            .gateway
            .forward(get_request(
                ResourceType::Advanced,
                format!("{ATTACHMENT_PATH}/{id}"),
                Some(query),
                caller,
            ))
            .await?;

        let beans = match read_beans(&response) {
            Ok(beans) => beans,
            Err(e) => {
                warn!(attachment_id = id, error = %e, "skipping unreadable attachment");
                return Ok(None);
            }
        };
        let Some(bean) = beans.first() else {
            warn!(attachment_id = id, "attachment not found");
            return Ok(None);
        };

        match Attachment::from_bean(bean) {
            Ok(mut attachment) => {
                if attachment.id.is_empty() {
                    id.clone_into(&mut attachment.id);
                }
                Ok(Some(attachment))
            }
            Err(e) => {
                warn!(attachment_id = id, error = %e, "skipping undecodable attachment");
                Ok(None)
            }
        }
    }

    /// Reference label of `id`, or `fallback` when the table has none or is unavailable.
    async fn label_or(
        &self,
        caller: &CallerContext,
        field: &str,
        id: &str,
        fallback: String,
    ) -> String {
        if id.is_empty() {
            return fallback;
        }
        match self.referential.get_label(caller, field, id).await {
            Ok(label) if !label.is_empty() => label,
            Ok(_) => fallback,
            Err(e) => {
                warn!(field, error = %e, "reference table unavailable, keeping record label");
                fallback
            }
        }
    }

    async fn numeric_value(&self, caller: &CallerContext, field: &str, id: &str) -> f64 {
        if id.is_empty() {
            return 0.0;
        }
        self.referential
            .get_numeric_value(caller, field, id)
            .await
            .unwrap_or_else(|e| {
                warn!(field, error = %e, "reference table unavailable, no weight");
                0.0
            })
    }

    async fn enterprise_name(&self, caller: &CallerContext, enterprise_id: &str) -> String {
        self.referential
            .get_enterprise_name(caller, enterprise_id)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "enterprise lookup failed");
                String::new()
            })
    }
}

fn checked_id(id: &str) -> Result<&str, DomainError> {
    let id = id.trim();
    if is_record_id(id) {
        Ok(id)
    } else {
        Err(DomainError::validation(format!(
            "Invalid {} value",
            person_fields::ID
        )))
    }
}
