//! Efficy bean normalization.
//!
//! The CRM exposes every record as a *bean*: a map from field name to a value whose
//! shape is not fixed. A field may be a plain scalar, an ordered list, or a descriptor
//! carrying up to three alternative representations (`raw_value`, `value`, `label`).
//!
//! This crate turns those beans into stable typed values:
//!
//! - [`BeanField`] models the three shapes as a sum type.
//! - [`Bean`] exposes one total accessor per target type (`read_text`, `read_raw_text`,
//!   `read_id_list`, `read_number`). Accessors never fail; a missing or malformed field
//!   degrades to an empty string, an empty list or zero.
//! - [`attachment`] converts binary attachment payloads between their wire form and bytes.
//!
//! Everything here is pure and stateless, so it is safe to call from any number of
//! concurrent tasks.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod attachment;
pub mod bean;
pub mod entities;
pub mod field;
pub mod ids;
pub mod number;

pub use attachment::{AttachmentCodecError, AttachmentPayload, DecodedAttachment};
pub use bean::Bean;
pub use entities::decode_entities;
pub use field::{BeanField, FieldDescriptor, FieldRef, FieldValue};
pub use ids::split_id_list;
pub use number::parse_locale_number;
