//! Test fixtures
//!
//! Builders for probe results, catalogue entries and origin descriptors, so
//! tests can describe releases without real audio files or a remote service.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::catalogue::ExistingVariant;
use crate::origin::{EditionIdentity, OriginDescriptor, OriginFile};
use crate::validation::REQUIRED_TAGS;

/// A FLAC probe carrying every required tag
pub fn probe(name: &str, sample_rate: u32, bits_per_sample: u32) -> crate::probe::ProbeResult {
    let mut result = probe_with_tags(name, &REQUIRED_TAGS);
    result.sample_rate = sample_rate;
    result.bits_per_sample = bits_per_sample;
    result
}

/// A 44.1kHz/16-bit FLAC probe carrying exactly `tags`
pub fn probe_with_tags(name: &str, tags: &[&str]) -> crate::probe::ProbeResult {
    let tags: BTreeMap<String, String> = tags
        .iter()
        .map(|t| (t.to_string(), format!("{} of {}", t, name)))
        .collect();
    crate::probe::ProbeResult {
        path: PathBuf::from(format!("{}.flac", name)),
        codec: "flac".to_string(),
        sample_rate: 44_100,
        bits_per_sample: 16,
        tags,
    }
}

/// An identity with only the media set
pub fn identity(media: &str) -> EditionIdentity {
    EditionIdentity {
        media: media.to_string(),
        ..Default::default()
    }
}

/// A published catalogue entry
pub fn variant(
    media: &str,
    encoding: &str,
    title: Option<&str>,
    catalogue_number: Option<&str>,
    year: Option<u32>,
    record_label: Option<&str>,
) -> ExistingVariant {
    let format = if encoding.contains("Lossless") { "FLAC" } else { "MP3" };
    ExistingVariant {
        media: media.to_string(),
        format: format.to_string(),
        encoding: encoding.to_string(),
        remaster_title: title.map(str::to_string),
        remaster_catalogue_number: catalogue_number.map(str::to_string),
        remaster_year: year,
        remaster_record_label: record_label.map(str::to_string),
    }
}

/// A 24-bit WEB release with two tracks and no edition details
pub fn origin() -> OriginDescriptor {
    OriginDescriptor {
        artist: "Vanilla".to_string(),
        name: "Pointbreak".to_string(),
        media: "WEB".to_string(),
        format: "FLAC".to_string(),
        encoding: "24bit Lossless".to_string(),
        edition: None,
        edition_year: None,
        original_year: Some(2021),
        catalog_number: None,
        record_label: None,
        info_hash: "C0FFEE00C0FFEE00C0FFEE00C0FFEE00C0FFEE00".to_string(),
        permalink: "https://redacted.ch/torrents.php?torrentid=1".to_string(),
        files: vec![
            OriginFile {
                name: "01 - Pointbreak.flac".to_string(),
                size: Some(1_000),
            },
            OriginFile {
                name: "02 - Riptide.flac".to_string(),
                size: Some(1_000),
            },
            OriginFile {
                name: "cover.jpg".to_string(),
                size: Some(100),
            },
        ],
    }
}

/// Render an origin descriptor as `origin.yaml` text
pub fn origin_yaml(origin: &OriginDescriptor) -> String {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    let year = |v: Option<u32>| v.map(|y| y.to_string()).unwrap_or_default();

    let mut yaml = format!(
        "Artist: {}\nName: {}\nEdition: {}\nEdition year: {}\nMedia: {}\nCatalog number: {}\nRecord label: {}\nOriginal year: {}\nFormat: {}\nEncoding: {}\nInfo hash: {}\nPermalink: {}\nFiles:\n",
        origin.artist,
        origin.name,
        opt(&origin.edition),
        year(origin.edition_year),
        origin.media,
        opt(&origin.catalog_number),
        opt(&origin.record_label),
        year(origin.original_year),
        origin.format,
        origin.encoding,
        origin.info_hash,
        origin.permalink,
    );
    for file in &origin.files {
        yaml.push_str(&format!(
            "- Name: {}\n  Size: {}\n",
            file.name,
            file.size.unwrap_or(0)
        ));
    }
    yaml
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_has_required_tags() {
        let p = probe("1", 96_000, 24);
        assert!(REQUIRED_TAGS.iter().all(|t| p.has_tag(t)));
        assert_eq!(p.path, PathBuf::from("1.flac"));
        assert_eq!(p.sample_rate, 96_000);
    }

    #[test]
    fn test_origin_yaml_parses_back() {
        let o = origin();
        let parsed = OriginDescriptor::parse(&origin_yaml(&o)).unwrap();
        assert_eq!(parsed.artist, o.artist);
        assert_eq!(parsed.year(), Some(2021));
        assert_eq!(parsed.edition, None);
        assert_eq!(parsed.catalog_number, None);
        assert_eq!(parsed.files, o.files);
        assert!(parsed.is_24bit_lossless());
    }
}
