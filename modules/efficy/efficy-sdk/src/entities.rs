//! Efficy domain entities.
//!
//! Plain typed records built from CRM beans. Coded fields keep the raw id (for updates)
//! next to a display label; the gateway replaces the label with the referential one when
//! the reference table knows the id.

use efficy_bean::attachment::{self, AttachmentCodecError, AttachmentPayload};
use efficy_bean::Bean;
use serde_json::{Map, Value, json};

use crate::error::EfficyError;

/// Field names of the `Demande` (service request) entity.
pub mod demande_fields {
    pub const ID: &str = "DmdID";
    pub const TOKEN: &str = "DmdToken";
    pub const STATUS: &str = "DmdStatus";
    pub const ACTIVITY: &str = "DmdActID";
    pub const CREATED_AT: &str = "DmdCrDt";
    pub const DESCRIPTION: &str = "DmdDescription";
    pub const PRIORITY: &str = "DmdPriority";
    pub const QUALIFICATION: &str = "DmdQualifID";
    pub const ATTACHMENTS: &str = "DmdAttID";
    pub const PERSON: &str = "DmdPerID";

    /// Fields requested when listing demandes.
    pub const LISTED: [&str; 9] = [
        ID,
        TOKEN,
        STATUS,
        ACTIVITY,
        CREATED_AT,
        DESCRIPTION,
        PRIORITY,
        QUALIFICATION,
        ATTACHMENTS,
    ];
}

/// Field names of the `Person` entity.
pub mod person_fields {
    pub const ID: &str = "PerID";
    pub const FIRST_NAME: &str = "PerFirstName";
    pub const LAST_NAME: &str = "PerName";
    pub const EMAIL: &str = "PerMail";
    pub const PHONE: &str = "PerPhone";
    pub const ENTERPRISE: &str = "PerEntID";

    pub const PROFILE: [&str; 6] = [ID, FIRST_NAME, LAST_NAME, EMAIL, PHONE, ENTERPRISE];
}

/// Field names of the `Enterprise` entity.
pub mod enterprise_fields {
    pub const ID: &str = "EntID";
    pub const NAME: &str = "EntName";
}

/// Field names of the `Opportunity` entity.
pub mod opportunity_fields {
    pub const ID: &str = "OppID";
    pub const TITLE: &str = "OppTitle";
    pub const STATUS: &str = "OppStatus";
    pub const AMOUNT: &str = "OppAmount";
    pub const ENTERPRISE: &str = "OppEntID";
    pub const CREATED_AT: &str = "OppCrDt";
    pub const PROBABILITY: &str = "OppProbability";
    pub const BROKER: &str = "OppBrokerPerID";

    pub const LISTED: [&str; 7] = [
        ID,
        TITLE,
        STATUS,
        AMOUNT,
        ENTERPRISE,
        CREATED_AT,
        PROBABILITY,
    ];
}

/// Field names of the `Faq` entity.
pub mod faq_fields {
    pub const ID: &str = "FaqID";
    pub const QUESTION: &str = "FaqQuestion";
    pub const ANSWER: &str = "FaqAnswer";
    pub const CATEGORY: &str = "FaqCategory";
    pub const TAGS: &str = "FaqTags";

    pub const LISTED: [&str; 5] = [ID, QUESTION, ANSWER, CATEGORY, TAGS];
}

/// Field names of the `Attachment` entity.
pub mod attachment_fields {
    pub const ID: &str = "AttID";
    pub const NAME: &str = "AttName";
    pub const MIME: &str = "AttMime";
    pub const SIZE: &str = "AttSize";
    pub const CONTENT: &str = "AttContent";

    pub const LISTED: [&str; 5] = [ID, NAME, MIME, SIZE, CONTENT];
}

/// A service request.
#[derive(Debug, Clone, PartialEq)]
pub struct Demande {
    pub id: String,
    pub token: String,
    pub status_id: String,
    pub status: String,
    pub activity_id: String,
    pub created_at: String,
    pub description: String,
    pub priority_id: String,
    pub priority: String,
    /// Numeric weight of the priority from the reference table, `0.0` when unknown.
    pub priority_weight: f64,
    pub qualification_id: String,
    pub qualification: String,
    pub attachment_ids: Vec<String>,
}

impl Demande {
    #[must_use]
    pub fn from_bean(bean: &Bean) -> Self {
        use demande_fields as f;
        Self {
            id: bean.read_raw_text(f::ID),
            token: bean.read_text(f::TOKEN),
            status_id: bean.read_raw_text(f::STATUS),
            status: bean.read_label(f::STATUS),
            activity_id: bean.read_raw_text(f::ACTIVITY),
            created_at: bean.read_text(f::CREATED_AT),
            description: bean.read_text(f::DESCRIPTION),
            priority_id: bean.read_raw_text(f::PRIORITY),
            priority: bean.read_label(f::PRIORITY),
            priority_weight: 0.0,
            qualification_id: bean.read_raw_text(f::QUALIFICATION),
            qualification: bean.read_label(f::QUALIFICATION),
            attachment_ids: bean.read_id_list(f::ATTACHMENTS),
        }
    }
}

/// The caller's CRM person record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub person_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub enterprise_id: String,
    pub enterprise_name: String,
}

impl UserProfile {
    #[must_use]
    pub fn from_bean(bean: &Bean) -> Self {
        use person_fields as f;
        Self {
            person_id: bean.read_raw_text(f::ID),
            first_name: bean.read_text(f::FIRST_NAME),
            last_name: bean.read_text(f::LAST_NAME),
            email: bean.read_text(f::EMAIL),
            phone: bean.read_text(f::PHONE),
            enterprise_id: bean.read_raw_text(f::ENTERPRISE),
            enterprise_name: bean.read_descriptor_label(f::ENTERPRISE),
        }
    }

    /// `First Last`, skipping whichever part is empty.
    #[must_use]
    pub fn display_name(&self) -> String {
        [self.first_name.trim(), self.last_name.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Editable subset of a user profile. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfilePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

impl UserProfilePatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.phone.is_none()
    }

    /// Check the patch before it is sent.
    ///
    /// # Errors
    /// Returns a business rule error when the patch is empty or blanks a name.
    pub fn validate(&self) -> Result<(), EfficyError> {
        if self.is_empty() {
            return Err(EfficyError::invalid_value("profile", "nothing to update"));
        }
        for (field, value) in [
            (person_fields::FIRST_NAME, &self.first_name),
            (person_fields::LAST_NAME, &self.last_name),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(EfficyError::missing_field(field));
            }
        }
        Ok(())
    }

    /// Update body with only the fields being changed.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        for (field, value) in [
            (person_fields::FIRST_NAME, &self.first_name),
            (person_fields::LAST_NAME, &self.last_name),
            (person_fields::PHONE, &self.phone),
        ] {
            if let Some(value) = value {
                body.insert(field.to_owned(), Value::String(value.trim().to_owned()));
            }
        }
        Value::Object(body)
    }
}

/// An opportunity the caller brokers.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerOpportunity {
    pub id: String,
    pub title: String,
    pub status_id: String,
    pub status: String,
    pub amount: f64,
    pub enterprise_id: String,
    pub enterprise_name: String,
    pub created_at: String,
    pub probability: f64,
}

impl BrokerOpportunity {
    #[must_use]
    pub fn from_bean(bean: &Bean) -> Self {
        use opportunity_fields as f;
        Self {
            id: bean.read_raw_text(f::ID),
            title: bean.read_text(f::TITLE),
            status_id: bean.read_raw_text(f::STATUS),
            status: bean.read_label(f::STATUS),
            amount: bean.read_number(f::AMOUNT),
            enterprise_id: bean.read_raw_text(f::ENTERPRISE),
            enterprise_name: bean.read_descriptor_label(f::ENTERPRISE),
            created_at: bean.read_text(f::CREATED_AT),
            probability: bean.read_number(f::PROBABILITY),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Faq {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub category: String,
    pub tags: Vec<String>,
}

impl Faq {
    #[must_use]
    pub fn from_bean(bean: &Bean) -> Self {
        use faq_fields as f;
        Self {
            id: bean.read_raw_text(f::ID),
            question: bean.read_text(f::QUESTION),
            answer: bean.read_text(f::ANSWER),
            category: bean.read_label(f::CATEGORY),
            tags: bean.read_id_list(f::TAGS),
        }
    }
}

/// A downloaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    /// `true` when the record had no size and `size` was derived from the payload.
    pub size_estimated: bool,
    pub content: Vec<u8>,
}

impl Attachment {
    /// Decode an attachment record.
    ///
    /// # Errors
    /// Returns an error when the content is missing or cannot be decoded.
    pub fn from_bean(bean: &Bean) -> Result<Self, AttachmentCodecError> {
        use attachment_fields as f;
        let payload = bean
            .read_scalar(f::CONTENT)
            .ok_or(AttachmentCodecError::Missing)
            .and_then(AttachmentPayload::from_field)?;
        let declared_size = bean
            .read_text(f::SIZE)
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|size| *size > 0);
        let decoded = payload.decode(declared_size)?;

        Ok(Self {
            id: bean.read_raw_text(f::ID),
            name: bean.read_text(f::NAME),
            mime_type: bean.read_text(f::MIME),
            size: decoded.size,
            size_estimated: decoded.size_estimated,
            content: decoded.bytes,
        })
    }
}

/// A file to upload with a new demande.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttachment {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl NewAttachment {
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert(attachment_fields::NAME.to_owned(), json!(self.name));
        body.insert(attachment_fields::MIME.to_owned(), json!(self.mime_type));
        body.insert(
            attachment_fields::CONTENT.to_owned(),
            json!(attachment::encode(&self.bytes)),
        );
        Value::Object(body)
    }
}

/// A service request to create.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewDemande {
    pub description: String,
    pub qualification_id: String,
    pub priority_id: Option<String>,
    pub attachments: Vec<NewAttachment>,
}

impl NewDemande {
    /// Check required fields before anything is sent.
    ///
    /// # Errors
    /// Returns a business rule error naming the first missing field.
    pub fn validate(&self) -> Result<(), EfficyError> {
        if self.description.trim().is_empty() {
            return Err(EfficyError::missing_field(demande_fields::DESCRIPTION));
        }
        if self.qualification_id.trim().is_empty() {
            return Err(EfficyError::missing_field(demande_fields::QUALIFICATION));
        }
        if let Some(empty) = self.attachments.iter().find(|a| a.name.trim().is_empty()) {
            return Err(EfficyError::invalid_value(
                attachment_fields::NAME,
                format!("attachment of {} bytes has no name", empty.bytes.len()),
            ));
        }
        Ok(())
    }

    /// Create body for the demande, owned by `person_id`.
    #[must_use]
    pub fn to_json(&self, person_id: &str) -> Value {
        let mut body = Map::new();
        body.insert(demande_fields::PERSON.to_owned(), json!(person_id));
        body.insert(
            demande_fields::DESCRIPTION.to_owned(),
            json!(self.description.trim()),
        );
        body.insert(
            demande_fields::QUALIFICATION.to_owned(),
            json!(self.qualification_id.trim()),
        );
        if let Some(priority) = self
            .priority_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
        {
            body.insert(demande_fields::PRIORITY.to_owned(), json!(priority));
        }
        if !self.attachments.is_empty() {
            body.insert(
                "attachments".to_owned(),
                Value::Array(self.attachments.iter().map(NewAttachment::to_json).collect()),
            );
        }
        Value::Object(body)
    }
}
