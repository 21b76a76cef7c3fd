//! Session-lifetime cache for reference tables and single-entity lookups.
//!
//! Every key is backed by its own `OnceCell`, so concurrent first-time lookups for the
//! same key share one in-flight fetch. A failed fetch leaves the cell empty and the
//! next caller retries. Entries never expire.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use efficy_bean::Bean;
use efficy_sdk::entities::{enterprise_fields, person_fields};
use efficy_sdk::{CallerContext, ResourceType, UserProfile};
use tokio::sync::OnceCell;
use tracing::{debug, instrument, warn};
use url::form_urlencoded;

use super::beans::{get_request, read_beans, restrict_to};
use super::demandes::is_record_id;
use super::error::DomainError;
use super::gateway::GatewayService;

/// Keys of one reference table entry.
const OPTION_ID: &str = "id";
const OPTION_LABEL: &str = "label";
const OPTION_VALUE: &str = "value";

/// One entry of a reference table.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferentialOption {
    pub id: String,
    pub label: String,
    /// Numeric weight, `0.0` when the entry carries none.
    pub value: f64,
}

impl ReferentialOption {
    fn from_bean(bean: &Bean) -> Self {
        Self {
            id: bean.read_raw_text(OPTION_ID),
            label: bean.read_text(OPTION_LABEL),
            value: bean.read_number(OPTION_VALUE),
        }
    }
}

/// Reference table keyed by option id.
pub type ReferentialMap = HashMap<String, ReferentialOption>;

type Slot<T> = Arc<OnceCell<Arc<T>>>;

pub struct ReferentialCache {
    gateway: Arc<GatewayService>,
    referential_path: String,
    tables: DashMap<String, Slot<ReferentialMap>>,
    enterprises: DashMap<String, Slot<String>>,
    persons: DashMap<String, Slot<UserProfile>>,
}

impl ReferentialCache {
    #[must_use]
    pub fn new(gateway: Arc<GatewayService>, referential_path: &str) -> Self {
        Self {
            gateway,
            referential_path: referential_path.trim().trim_matches('/').to_owned(),
            tables: DashMap::new(),
            enterprises: DashMap::new(),
            persons: DashMap::new(),
        }
    }

    /// Reference table for `field`, fetched once per cache lifetime.
    ///
    /// # Errors
    /// Returns the fetch error; nothing is cached in that case.
    #[instrument(skip(self, caller))]
    pub async fn get_referential_map(
        &self,
        caller: &CallerContext,
        field: &str,
    ) -> Result<Arc<ReferentialMap>, DomainError> {
        memoized(&self.tables, field, || async {
            debug!("loading reference table");
            let req = get_request(
                ResourceType::Base,
                format!("{}/{field}", self.referential_path),
                None,
                caller,
            );
            let response = self.gateway.forward(req).await?;
            Ok(parse_referential(&read_beans(&response)?))
        })
        .await
    }

    /// Label of `id` in the `field` table. Unknown ids give an empty string.
    ///
    /// # Errors
    /// Returns the table fetch error.
    pub async fn get_label(
        &self,
        caller: &CallerContext,
        field: &str,
        id: &str,
    ) -> Result<String, DomainError> {
        let table = self.get_referential_map(caller, field).await?;
        Ok(table
            .get(id.trim())
            .map(|option| option.label.clone())
            .unwrap_or_default())
    }

    /// Numeric value of `id` in the `field` table. Unknown ids give `0.0`.
    ///
    /// # Errors
    /// Returns the table fetch error.
    pub async fn get_numeric_value(
        &self,
        caller: &CallerContext,
        field: &str,
        id: &str,
    ) -> Result<f64, DomainError> {
        let table = self.get_referential_map(caller, field).await?;
        Ok(table.get(id.trim()).map_or(0.0, |option| option.value))
    }

    /// Enterprise name by id. A blank id gives an empty name without a fetch.
    ///
    /// # Errors
    /// Returns the fetch error.
    #[instrument(skip(self, caller))]
    pub async fn get_enterprise_name(
        &self,
        caller: &CallerContext,
        enterprise_id: &str,
    ) -> Result<String, DomainError> {
        let enterprise_id = enterprise_id.trim();
        if enterprise_id.is_empty() {
            return Ok(String::new());
        }
        if !is_record_id(enterprise_id) {
            warn!("malformed enterprise id, name left empty");
            return Ok(String::new());
        }
        let name = memoized(&self.enterprises, enterprise_id, || async {
            let req = get_request(
                ResourceType::Advanced,
                format!("Enterprise/{enterprise_id}"),
                Some(restrict_query(&[enterprise_fields::NAME])),
                caller,
            );
            let response = self.gateway.forward(req).await?;
            Ok(read_beans(&response)?
                .first()
                .map(|bean| bean.read_text(enterprise_fields::NAME))
                .unwrap_or_default())
        })
        .await?;
        Ok((*name).clone())
    }

    /// Profile fields of person `person_id`, without the enterprise name resolved.
    ///
    /// # Errors
    /// `IdentityNotFound` when the CRM returns no record, otherwise the fetch error.
    #[instrument(skip(self, caller))]
    pub async fn get_person_info(
        &self,
        caller: &CallerContext,
        person_id: &str,
    ) -> Result<Arc<UserProfile>, DomainError> {
        let person_id = person_id.trim();
        memoized(&self.persons, person_id, || async {
            let req = get_request(
                ResourceType::Advanced,
                format!("Person/{person_id}"),
                Some(restrict_query(&person_fields::PROFILE)),
                caller,
            );
            let response = self.gateway.forward(req).await?;
            read_beans(&response)?
                .first()
                .map(UserProfile::from_bean)
                .ok_or(DomainError::IdentityNotFound)
        })
        .await
    }

    /// Drop the cached profile of `person_id`, e.g. after an update.
    pub fn forget_person(&self, person_id: &str) {
        self.persons.remove(person_id.trim());
    }
}

async fn memoized<T, F, Fut>(
    slots: &DashMap<String, Slot<T>>,
    key: &str,
    fetch: F,
) -> Result<Arc<T>, DomainError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, DomainError>>,
{
    // The shard guard must be released before awaiting.
    let slot = Arc::clone(&slots.entry(key.to_owned()).or_default());
    slot.get_or_try_init(|| async { fetch().await.map(Arc::new) })
        .await
        .cloned()
}

fn restrict_query(fields: &[&str]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("restrict_to", &restrict_to(fields))
        .finish()
}

fn parse_referential(beans: &[Bean]) -> ReferentialMap {
    beans
        .iter()
        .map(ReferentialOption::from_bean)
        .filter(|option| !option.id.is_empty())
        .map(|option| (option.id.clone(), option))
        .collect()
}
