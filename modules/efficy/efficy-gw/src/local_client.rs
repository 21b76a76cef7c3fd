//! Local client adapter implementing the SDK API traits.
//!
//! Bridges the domain services to `EfficyGatewayApi`, `EfficyDemandesApi` and
//! `EfficyRecordsApi` for in-process consumers.

use std::sync::Arc;

use async_trait::async_trait;
use efficy_sdk::{
    Attachment, BrokerOpportunity, CallerContext, Demande, EfficyDemandesApi, EfficyError,
    EfficyGatewayApi, EfficyRecordsApi, Faq, GatewayRequest, GatewayResponse, NewDemande,
    UserProfile, UserProfilePatch,
};

use crate::domain::{CrmRecordsService, DemandesService, GatewayService};

pub struct EfficyLocalClient {
    gateway: Arc<GatewayService>,
    demandes: Arc<DemandesService>,
    records: Arc<CrmRecordsService>,
}

impl EfficyLocalClient {
    #[must_use]
    pub fn new(
        gateway: Arc<GatewayService>,
        demandes: Arc<DemandesService>,
        records: Arc<CrmRecordsService>,
    ) -> Self {
        Self {
            gateway,
            demandes,
            records,
        }
    }
}

#[async_trait]
impl EfficyGatewayApi for EfficyLocalClient {
    async fn forward(&self, req: GatewayRequest) -> Result<GatewayResponse, EfficyError> {
        self.gateway.forward(req).await.map_err(Into::into)
    }
}

#[async_trait]
impl EfficyDemandesApi for EfficyLocalClient {
    async fn fetch_current_person(
        &self,
        caller: &CallerContext,
    ) -> Result<GatewayResponse, EfficyError> {
        self.demandes
            .fetch_current_person(caller)
            .await
            .map_err(Into::into)
    }

    async fn fetch_demandes_for_current_user(
        &self,
        caller: &CallerContext,
        page_size: u32,
    ) -> Result<GatewayResponse, EfficyError> {
        self.demandes
            .fetch_demandes_for_current_user(caller, page_size)
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl EfficyRecordsApi for EfficyLocalClient {
    async fn list_demandes(
        &self,
        caller: &CallerContext,
        page_size: u32,
    ) -> Result<Vec<Demande>, EfficyError> {
        self.records
            .list_demandes(caller, page_size)
            .await
            .map_err(Into::into)
    }

    async fn get_user_profile(&self, caller: &CallerContext) -> Result<UserProfile, EfficyError> {
        self.records
            .get_user_profile(caller)
            .await
            .map_err(Into::into)
    }

    async fn update_user_profile(
        &self,
        caller: &CallerContext,
        person_id: &str,
        patch: UserProfilePatch,
    ) -> Result<UserProfile, EfficyError> {
        self.records
            .update_user_profile(caller, person_id, &patch)
            .await
            .map_err(Into::into)
    }

    async fn list_broker_opportunities(
        &self,
        caller: &CallerContext,
        person_id: &str,
    ) -> Result<Vec<BrokerOpportunity>, EfficyError> {
        self.records
            .list_broker_opportunities(caller, person_id)
            .await
            .map_err(Into::into)
    }

    async fn list_faqs(&self, caller: &CallerContext) -> Result<Vec<Faq>, EfficyError> {
        self.records.list_faqs(caller).await.map_err(Into::into)
    }

    async fn list_attachments(
        &self,
        caller: &CallerContext,
        ids: &[String],
    ) -> Result<Vec<Attachment>, EfficyError> {
        self.records
            .list_attachments(caller, ids)
            .await
            .map_err(Into::into)
    }

    async fn create_demande(
        &self,
        caller: &CallerContext,
        demande: NewDemande,
    ) -> Result<String, EfficyError> {
        self.records
            .create_demande(caller, &demande)
            .await
            .map_err(Into::into)
    }
}
