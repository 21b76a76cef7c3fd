//! Caller email → person id → demandes.

use std::sync::{Arc, LazyLock};

use efficy_bean::{Bean, BeanField, FieldValue};
use efficy_sdk::entities::{demande_fields, person_fields};
use efficy_sdk::{CallerContext, GatewayRequest, GatewayResponse, HttpMethod, ResourceType};
use regex::Regex;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::form_urlencoded;

use super::beans::{equals_filter, restrict_to};
use super::error::DomainError;
use super::gateway::GatewayService;
use super::paging::PageLimits;

const PERSON_PATH: &str = "Person";
const DEMANDE_PATH: &str = "Demande";

#[allow(clippy::expect_used)] // good regex, it doesn't panic
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex should not panic")
});
#[allow(clippy::expect_used)] // good regex, it doesn't panic
static RECORD_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("static regex should not panic"));

/// Outcome of the person lookup step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonLookup {
    Found(String),
    /// The CRM rejected the lookup; its response is relayed as is.
    Relayed(GatewayResponse),
}

/// Resolves the calling user and the records scoped to them.
pub struct DemandesService {
    gateway: Arc<GatewayService>,
    paging: PageLimits,
}

impl DemandesService {
    #[must_use]
    pub fn new(gateway: Arc<GatewayService>, paging: PageLimits) -> Self {
        Self { gateway, paging }
    }

    #[must_use]
    pub fn paging(&self) -> PageLimits {
        self.paging
    }

    /// Person lookup by caller email, restricted to the id field.
    ///
    /// # Errors
    /// Validation error for a missing or malformed email, transport error when the CRM
    /// is unreachable.
    #[instrument(skip_all)]
    pub async fn fetch_current_person(
        &self,
        caller: &CallerContext,
    ) -> Result<GatewayResponse, DomainError> {
        let email = caller_email(caller)?;
        let req = GatewayRequest::new(
            ResourceType::Advanced,
            HttpMethod::Get,
            PERSON_PATH,
            caller.clone(),
        )
        .with_query(person_query(email));

        self.gateway.forward(req).await
    }

    /// Run the person lookup and extract the person id.
    ///
    /// # Errors
    /// `IdentityNotFound` when the response carries no usable id.
    pub async fn resolve_person_id(
        &self,
        caller: &CallerContext,
    ) -> Result<PersonLookup, DomainError> {
        let response = self.fetch_current_person(caller).await?;
        if response.is_error() {
            debug!(status = response.status, "person lookup rejected upstream");
            return Ok(PersonLookup::Relayed(response));
        }

        let body = response.json_body().map_err(|e| {
            warn!(error = %e, "person lookup returned a non-JSON body");
            DomainError::IdentityNotFound
        })?;

        extract_person_id(&body)
            .map(PersonLookup::Found)
            .ok_or(DomainError::IdentityNotFound)
    }

    /// Like [`resolve_person_id`](Self::resolve_person_id), but an upstream rejection is
    /// an error too.
    ///
    /// # Errors
    /// `Upstream` when the CRM rejected the lookup, plus the errors of `resolve_person_id`.
    pub async fn require_person_id(&self, caller: &CallerContext) -> Result<String, DomainError> {
        match self.resolve_person_id(caller).await? {
            PersonLookup::Found(id) => Ok(id),
            PersonLookup::Relayed(response) => Err(DomainError::upstream_response(&response)),
        }
    }

    /// The caller's demandes, raw.
    ///
    /// A rejected person lookup is returned verbatim and no demandes call is made.
    ///
    /// # Errors
    /// `IdentityNotFound` when no person matches, before any demandes call.
    #[instrument(skip(self, caller))]
    pub async fn fetch_demandes_for_current_user(
        &self,
        caller: &CallerContext,
        page_size: u32,
    ) -> Result<GatewayResponse, DomainError> {
        let person_id = match self.resolve_person_id(caller).await? {
            PersonLookup::Found(id) => id,
            PersonLookup::Relayed(response) => return Ok(response),
        };
        self.fetch_demandes_for_person(caller, &person_id, page_size)
            .await
    }

    /// Demandes owned by `person_id`, at most `page_size` (after clamping).
    ///
    /// # Errors
    /// Transport error when the CRM is unreachable.
    pub async fn fetch_demandes_for_person(
        &self,
        caller: &CallerContext,
        person_id: &str,
        page_size: u32,
    ) -> Result<GatewayResponse, DomainError> {
        let limit = self.paging.clamp(page_size);
        debug!(person_id, limit, "fetching demandes");
        let req = GatewayRequest::new(
            ResourceType::Advanced,
            HttpMethod::Get,
            DEMANDE_PATH,
            caller.clone(),
        )
        .with_query(demandes_query(person_id, limit));

        self.gateway.forward(req).await
    }
}

/// Whether `value` is safe to use as a record id in a path or filter.
#[must_use]
pub fn is_record_id(value: &str) -> bool {
    RECORD_ID.is_match(value)
}

fn caller_email(caller: &CallerContext) -> Result<&str, DomainError> {
    caller
        .user_email()
        .map(str::trim)
        .filter(|email| EMAIL.is_match(email))
        .ok_or_else(|| DomainError::validation("Unable to resolve logged user email"))
}

fn person_query(email: &str) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("filter", &equals_filter(person_fields::EMAIL, email))
        .append_pair("restrict_to", &restrict_to(&[person_fields::ID]))
        .append_pair("nb_of_result", "1")
        .finish()
}

fn demandes_query(person_id: &str, limit: u32) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("filter", &equals_filter(demande_fields::PERSON, person_id))
        .append_pair("restrict_to", &restrict_to(&demande_fields::LISTED))
        .append_pair("nb_of_result", &limit.to_string())
        .finish()
}

fn descriptor_raw_value(field: &BeanField) -> Option<&FieldValue> {
    match field {
        BeanField::Descriptor(d) => d.raw_value.as_ref(),
        _ => None,
    }
}

fn descriptor_value(field: &BeanField) -> Option<&FieldValue> {
    match field {
        BeanField::Descriptor(d) => d.value.as_ref(),
        _ => None,
    }
}

fn descriptor_label(field: &BeanField) -> Option<&FieldValue> {
    match field {
        BeanField::Descriptor(d) => d.label.as_ref(),
        _ => None,
    }
}

fn first_text(value: &FieldValue) -> Option<&str> {
    value.as_field_ref().first_text()
}

fn bare_scalar(field: &BeanField) -> Option<&str> {
    match field {
        BeanField::Scalar(text) => Some(text),
        _ => None,
    }
}

/// First person id in the response.
///
/// Every `PerID` occurrence is considered; representations are tried as
/// `raw_value`, `value`, `label`, then bare string. The winner must look like an id.
fn extract_person_id(body: &Value) -> Option<String> {
    let fields = Bean::find_fields(body, person_fields::ID);
    let descriptor_pickers: [fn(&BeanField) -> Option<&FieldValue>; 3] =
        [descriptor_raw_value, descriptor_value, descriptor_label];

    let candidate = descriptor_pickers
        .iter()
        .find_map(|pick| {
            fields
                .iter()
                .filter_map(pick)
                .find_map(first_text)
                .map(str::trim)
                .filter(|id| !id.is_empty())
        })
        .or_else(|| {
            fields
                .iter()
                .filter_map(bare_scalar)
                .map(str::trim)
                .find(|id| !id.is_empty())
        })?;

    if RECORD_ID.is_match(candidate) {
        Some(candidate.to_owned())
    } else {
        warn!("person id has an unexpected shape, treating as not found");
        None
    }
}
