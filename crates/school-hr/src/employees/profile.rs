//! Self-service portion of an employee record: personal details and uploaded documents.
//!
//! Every field is optional because employees fill the profile in over time. Sections and
//! nested structures accept `null` as "not provided yet".

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Snapshot scored by the completion evaluator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    #[serde(default)]
    pub personal_details: Option<PersonalDetails>,
    #[serde(default)]
    pub documents: Option<Documents>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalDetails {
    #[serde(default, deserialize_with = "blank_date_as_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub personal_email: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<EmergencyContact>,
    #[serde(default)]
    pub current_address: Option<Address>,
    #[serde(default)]
    pub bank_account: Option<BankAccount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    #[serde(default)]
    pub holder_name: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub routing_code: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
}

/// Reference to a file already hosted by the media provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
}

impl StoredFile {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            public_id: None,
        }
    }
}

/// Entry of a multi-file document collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionDocument {
    pub file: StoredFile,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Documents {
    #[serde(default)]
    pub offer_letter: Option<StoredFile>,
    #[serde(default)]
    pub appointment_letter: Option<StoredFile>,
    #[serde(default)]
    pub resume: Option<StoredFile>,
    #[serde(default)]
    pub photo: Option<StoredFile>,
    #[serde(default)]
    pub tax_id_card: Option<StoredFile>,
    #[serde(default)]
    pub national_id_card: Option<StoredFile>,
    #[serde(default)]
    pub address_proof: Option<StoredFile>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub educational_certificates: Vec<CollectionDocument>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub identity_proofs: Vec<CollectionDocument>,
}

/// Addressable document location used when attaching a single upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSlot {
    OfferLetter,
    AppointmentLetter,
    Resume,
    Photo,
    TaxIdCard,
    NationalIdCard,
    AddressProof,
    EducationalCertificate,
    IdentityProof,
}

impl DocumentSlot {
    pub fn parse(raw: &str) -> Option<Self> {
        let slot = match raw.trim().replace('-', "_").as_str() {
            "offer_letter" => Self::OfferLetter,
            "appointment_letter" => Self::AppointmentLetter,
            "resume" => Self::Resume,
            "photo" => Self::Photo,
            "tax_id_card" => Self::TaxIdCard,
            "national_id_card" => Self::NationalIdCard,
            "address_proof" => Self::AddressProof,
            "educational_certificate" | "educational_certificates" => {
                Self::EducationalCertificate
            }
            "identity_proof" | "identity_proofs" => Self::IdentityProof,
            _ => return None,
        };
        Some(slot)
    }
}

impl Documents {
    /// Place `file` into `slot`, appending for collection slots.
    pub fn attach(&mut self, slot: DocumentSlot, file: StoredFile, uploaded_at: DateTime<Utc>) {
        let single = match slot {
            DocumentSlot::OfferLetter => &mut self.offer_letter,
            DocumentSlot::AppointmentLetter => &mut self.appointment_letter,
            DocumentSlot::Resume => &mut self.resume,
            DocumentSlot::Photo => &mut self.photo,
            DocumentSlot::TaxIdCard => &mut self.tax_id_card,
            DocumentSlot::NationalIdCard => &mut self.national_id_card,
            DocumentSlot::AddressProof => &mut self.address_proof,
            DocumentSlot::EducationalCertificate => {
                self.educational_certificates
                    .push(CollectionDocument { file, uploaded_at });
                return;
            }
            DocumentSlot::IdentityProof => {
                self.identity_proofs
                    .push(CollectionDocument { file, uploaded_at });
                return;
            }
        };
        *single = Some(file);
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn blank_date_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|err| {
                serde::de::Error::custom(format!("failed to parse '{value}' as YYYY-MM-DD ({err})"))
            }),
    }
}
