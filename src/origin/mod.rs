//! Candidate release description
//!
//! - Reading the on-disk `origin.yaml` descriptor
//! - Deriving the edition identity used to match catalogue entries

pub mod descriptor;

pub use descriptor::{OriginDescriptor, OriginFile};

/// The fields that distinguish one edition of a release from another
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditionIdentity {
    pub media: String,
    pub remaster_title: Option<String>,
    pub remaster_catalogue_number: Option<String>,
    /// Edition year, or the original year when the edition has none
    pub remaster_year: Option<u32>,
    pub remaster_record_label: Option<String>,
}
