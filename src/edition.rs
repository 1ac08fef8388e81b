//! Edition matching
//!
//! Narrows a catalogue group down to the entries that belong to the same
//! edition as the candidate. Matching is a fixed list of field rules: media
//! must always be equal, every other field only has to be equal when the
//! candidate has a value for it.

use crate::catalogue::ExistingVariant;
use crate::origin::EditionIdentity;

/// A field that takes part in edition matching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditionField {
    Media,
    RemasterTitle,
    RemasterCatalogueNumber,
    RemasterRecordLabel,
    RemasterYear,
}

/// When a field rule applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Values must be equal, even if empty
    Always,
    /// Values must be equal only if the candidate's value is non-empty
    IfCandidateSet,
}

/// The matching rule set
pub const EDITION_RULES: [(EditionField, Requirement); 5] = [
    (EditionField::Media, Requirement::Always),
    (EditionField::RemasterTitle, Requirement::IfCandidateSet),
    (EditionField::RemasterCatalogueNumber, Requirement::IfCandidateSet),
    (EditionField::RemasterRecordLabel, Requirement::IfCandidateSet),
    (EditionField::RemasterYear, Requirement::IfCandidateSet),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldValue<'a> {
    Text(&'a str),
    Year(u32),
}

impl EditionField {
    fn of_candidate(self, identity: &EditionIdentity) -> Option<FieldValue<'_>> {
        match self {
            EditionField::Media => Some(FieldValue::Text(&identity.media)),
            EditionField::RemasterTitle => text(&identity.remaster_title),
            EditionField::RemasterCatalogueNumber => text(&identity.remaster_catalogue_number),
            EditionField::RemasterRecordLabel => text(&identity.remaster_record_label),
            EditionField::RemasterYear => identity.remaster_year.map(FieldValue::Year),
        }
    }

    fn of_variant(self, variant: &ExistingVariant) -> Option<FieldValue<'_>> {
        match self {
            EditionField::Media => Some(FieldValue::Text(&variant.media)),
            EditionField::RemasterTitle => text(&variant.remaster_title),
            EditionField::RemasterCatalogueNumber => text(&variant.remaster_catalogue_number),
            EditionField::RemasterRecordLabel => text(&variant.remaster_record_label),
            EditionField::RemasterYear => variant.remaster_year.map(FieldValue::Year),
        }
    }
}

fn text(value: &Option<String>) -> Option<FieldValue<'_>> {
    value
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(FieldValue::Text)
}

/// Whether `variant` belongs to the edition described by `identity`
pub fn is_same_edition(identity: &EditionIdentity, variant: &ExistingVariant) -> bool {
    EDITION_RULES.iter().all(|(field, requirement)| {
        let wanted = field.of_candidate(identity);
        match requirement {
            Requirement::Always => wanted == field.of_variant(variant),
            Requirement::IfCandidateSet => {
                wanted.is_none() || wanted == field.of_variant(variant)
            }
        }
    })
}

/// The entries of one catalogue group that share the candidate's edition
#[derive(Debug, Clone, Default)]
pub struct EditionGroup<'a> {
    pub variants: Vec<&'a ExistingVariant>,
}

impl<'a> EditionGroup<'a> {
    /// Filter a group's entries down to the candidate's edition
    pub fn matching(identity: &EditionIdentity, variants: &'a [ExistingVariant]) -> Self {
        Self {
            variants: variants
                .iter()
                .filter(|v| is_same_edition(identity, v))
                .collect(),
        }
    }

    /// Whether an entry with this encoding already exists
    pub fn has_encoding(&self, encoding: &str) -> bool {
        self.variants.iter().any(|v| v.encoding == encoding)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}
