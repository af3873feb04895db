use super::super::profile::{Documents, PersonalDetails, StoredFile};

pub(crate) const PERSONAL_FIELD_COUNT: u32 = 15;
pub(crate) const SINGLE_DOCUMENT_COUNT: u32 = 7;
pub(crate) const DOCUMENT_UNIT_COUNT: u32 = SINGLE_DOCUMENT_COUNT + 2;

/// One scored input and whether it currently counts as filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TrackedField {
    pub name: &'static str,
    pub filled: bool,
}

const fn tracked(name: &'static str, filled: bool) -> TrackedField {
    TrackedField { name, filled }
}

fn text(value: Option<&str>) -> bool {
    value.is_some_and(|value| !value.is_empty())
}

fn file(value: Option<&StoredFile>) -> bool {
    value.is_some_and(|file| !file.url.is_empty())
}

pub(crate) fn personal_fields(details: Option<&PersonalDetails>) -> [TrackedField; 15] {
    let emergency = details.and_then(|d| d.emergency_contact.as_ref());
    let address = details.and_then(|d| d.current_address.as_ref());
    let bank = details.and_then(|d| d.bank_account.as_ref());

    [
        tracked(
            "date_of_birth",
            details.and_then(|d| d.date_of_birth).is_some(),
        ),
        tracked(
            "contact_number",
            text(details.and_then(|d| d.contact_number.as_deref())),
        ),
        tracked(
            "personal_email",
            text(details.and_then(|d| d.personal_email.as_deref())),
        ),
        tracked("tax_id", text(details.and_then(|d| d.tax_id.as_deref()))),
        tracked(
            "national_id",
            text(details.and_then(|d| d.national_id.as_deref())),
        ),
        tracked(
            "emergency_contact.name",
            text(emergency.and_then(|c| c.name.as_deref())),
        ),
        tracked(
            "emergency_contact.number",
            text(emergency.and_then(|c| c.number.as_deref())),
        ),
        tracked(
            "current_address.street",
            text(address.and_then(|a| a.street.as_deref())),
        ),
        tracked(
            "current_address.city",
            text(address.and_then(|a| a.city.as_deref())),
        ),
        tracked(
            "current_address.postal_code",
            text(address.and_then(|a| a.postal_code.as_deref())),
        ),
        tracked(
            "bank_account.holder_name",
            text(bank.and_then(|b| b.holder_name.as_deref())),
        ),
        tracked(
            "bank_account.bank_name",
            text(bank.and_then(|b| b.bank_name.as_deref())),
        ),
        tracked(
            "bank_account.account_number",
            text(bank.and_then(|b| b.account_number.as_deref())),
        ),
        tracked(
            "bank_account.routing_code",
            text(bank.and_then(|b| b.routing_code.as_deref())),
        ),
        tracked(
            "bank_account.branch",
            text(bank.and_then(|b| b.branch.as_deref())),
        ),
    ]
}

pub(crate) fn single_documents(documents: Option<&Documents>) -> [TrackedField; 7] {
    [
        tracked(
            "offer_letter",
            file(documents.and_then(|d| d.offer_letter.as_ref())),
        ),
        tracked(
            "appointment_letter",
            file(documents.and_then(|d| d.appointment_letter.as_ref())),
        ),
        tracked("resume", file(documents.and_then(|d| d.resume.as_ref()))),
        tracked("photo", file(documents.and_then(|d| d.photo.as_ref()))),
        tracked(
            "tax_id_card",
            file(documents.and_then(|d| d.tax_id_card.as_ref())),
        ),
        tracked(
            "national_id_card",
            file(documents.and_then(|d| d.national_id_card.as_ref())),
        ),
        tracked(
            "address_proof",
            file(documents.and_then(|d| d.address_proof.as_ref())),
        ),
    ]
}

/// A collection counts as a single unit once it holds at least one entry.
pub(crate) fn collection_flags(documents: Option<&Documents>) -> [TrackedField; 2] {
    [
        tracked(
            "educational_certificates",
            documents.is_some_and(|d| !d.educational_certificates.is_empty()),
        ),
        tracked(
            "identity_proofs",
            documents.is_some_and(|d| !d.identity_proofs.is_empty()),
        ),
    ]
}
