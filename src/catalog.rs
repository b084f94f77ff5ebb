//! Source catalog: normalizes the backend's heterogeneous rendition list
//! into a flat, deduplicated set of playable sources.
//!
//! Pure transformation, no network. Malformed rows (unknown provider,
//! embed entry without a URL) are dropped rather than surfaced as errors;
//! a sparse or legacy payload degrades to fewer entries, never a failure.

use crate::api::VideoRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage/hosting backend for one rendition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Server-hosted file, streamed through `/stream/{id}`.
    Local,
    /// Messaging-platform-hosted file, also streamed through the backend.
    Telegram,
    /// Third-party embed.
    Streamtape,
    /// Third-party embed.
    Doodstream,
}

impl Provider {
    /// Parse a backend provider tag. Unknown tags yield `None` so the
    /// caller can drop the row.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "local" => Some(Self::Local),
            "telegram" => Some(Self::Telegram),
            "streamtape" => Some(Self::Streamtape),
            "doodstream" => Some(Self::Doodstream),
            _ => None,
        }
    }

    /// Embed providers play in an iframe; the rest through a media element.
    pub fn is_embed(&self) -> bool {
        matches!(self, Self::Streamtape | Self::Doodstream)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Telegram => "telegram",
            Self::Streamtape => "streamtape",
            Self::Doodstream => "doodstream",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to hand the player for one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayableRef {
    /// Resolved to a direct URL via the stream endpoint. `resolution` is
    /// the query parameter; `None` requests the original file.
    Stream { resolution: Option<String> },
    /// Embeddable third-party URL, used as-is.
    Embed { url: String },
}

/// One playable `(provider, resolution)` rendition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSource {
    pub provider: Provider,
    /// Display label, e.g. "720p" or "Original". Not guaranteed numeric.
    pub resolution: String,
    pub reference: PlayableRef,
}

/// Rank a resolution label by its leading integer. Unparseable labels
/// rank 0 and therefore lose to every parseable one.
pub fn resolution_rank(label: &str) -> u32 {
    let digits: String = label.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

const ORIGINAL_LABEL: &str = "Original";

/// Deduplicated set of playable sources for one video.
#[derive(Debug, Clone, Default)]
pub struct SourceCatalog {
    sources: Vec<VideoSource>,
}

impl SourceCatalog {
    /// Build the catalog from a raw video record.
    ///
    /// Explicit source rows come first; legacy messaging-platform
    /// resolution rows and the legacy primary-embed field are synthesized
    /// after, skipping any `(provider, resolution)` key already taken.
    pub fn from_record(record: &VideoRecord) -> Self {
        let mut catalog = Self::default();

        for raw in &record.sources {
            let Some(provider) = Provider::parse(&raw.provider) else {
                tracing::debug!(provider = %raw.provider, "Skipping source with unknown provider");
                continue;
            };

            let reference = if provider.is_embed() {
                match &raw.embed_url {
                    Some(url) if !url.is_empty() => PlayableRef::Embed { url: url.clone() },
                    _ => {
                        tracing::debug!(%provider, "Skipping embed source without URL");
                        continue;
                    }
                }
            } else {
                PlayableRef::Stream {
                    resolution: raw.resolution.clone(),
                }
            };

            catalog.push(VideoSource {
                provider,
                resolution: label_of(raw.resolution.as_deref()),
                reference,
            });
        }

        // Legacy per-resolution rows exist only for messaging-platform
        // uploads; merge them under keys not already claimed above.
        for row in &record.resolutions {
            catalog.push(VideoSource {
                provider: Provider::Telegram,
                resolution: row.resolution.clone(),
                reference: PlayableRef::Stream {
                    resolution: Some(row.resolution.clone()),
                },
            });
        }

        // Legacy primary embed: only meaningful when nothing else exists
        // and the upload landed on an embed provider.
        if catalog.sources.is_empty() {
            if let Some(provider) = record.storage_mode.as_deref().and_then(Provider::parse) {
                if provider.is_embed() {
                    if let Some(url) = record.embed_url.as_deref().filter(|u| !u.is_empty()) {
                        catalog.push(VideoSource {
                            provider,
                            resolution: label_of(record.original_resolution.as_deref()),
                            reference: PlayableRef::Embed {
                                url: url.to_string(),
                            },
                        });
                    }
                }
            }
        }

        catalog
    }

    /// Insert unless the `(provider, resolution)` key is already present.
    fn push(&mut self, source: VideoSource) {
        let taken = self
            .sources
            .iter()
            .any(|s| s.provider == source.provider && s.resolution == source.resolution);
        if !taken {
            self.sources.push(source);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn sources(&self) -> &[VideoSource] {
        &self.sources
    }

    /// Distinct providers in first-seen order, for the server selector UI.
    pub fn providers(&self) -> Vec<Provider> {
        let mut seen = Vec::new();
        for source in &self.sources {
            if !seen.contains(&source.provider) {
                seen.push(source.provider);
            }
        }
        seen
    }

    /// The subset initial selection draws from: messaging-platform files
    /// if any exist, otherwise server files, otherwise everything.
    pub fn preferred(&self) -> Vec<&VideoSource> {
        for provider in [Provider::Telegram, Provider::Local] {
            let subset: Vec<&VideoSource> = self
                .sources
                .iter()
                .filter(|s| s.provider == provider)
                .collect();
            if !subset.is_empty() {
                return subset;
            }
        }
        self.sources.iter().collect()
    }

    /// Pick the initial source: highest-ranked resolution within the
    /// preferred subset. Ties keep the earliest entry.
    pub fn initial_selection(&self) -> Option<&VideoSource> {
        Self::highest(self.preferred().into_iter())
    }

    /// Highest-ranked resolution offered by one provider.
    pub fn best_for_provider(&self, provider: Provider) -> Option<&VideoSource> {
        Self::highest(self.sources.iter().filter(|s| s.provider == provider))
    }

    /// Exact `(provider, resolution)` lookup. "Original" matches entries
    /// whose label is the original-file marker.
    pub fn find(&self, provider: Provider, resolution: &str) -> Option<&VideoSource> {
        self.sources
            .iter()
            .find(|s| s.provider == provider && s.resolution == resolution)
    }

    /// Resolution labels offered by one provider, highest first.
    pub fn resolutions_for(&self, provider: Provider) -> Vec<&str> {
        let mut labels: Vec<&str> = self
            .sources
            .iter()
            .filter(|s| s.provider == provider)
            .map(|s| s.resolution.as_str())
            .collect();
        labels.sort_by(|a, b| resolution_rank(b).cmp(&resolution_rank(a)));
        labels.dedup();
        labels
    }

    fn highest<'a>(iter: impl Iterator<Item = &'a VideoSource>) -> Option<&'a VideoSource> {
        let mut best: Option<&VideoSource> = None;
        for source in iter {
            match best {
                Some(current) if resolution_rank(&source.resolution) <= resolution_rank(&current.resolution) => {}
                _ => best = Some(source),
            }
        }
        best
    }
}

fn label_of(resolution: Option<&str>) -> String {
    match resolution {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => ORIGINAL_LABEL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{RawResolution, RawSource, VideoRecord};

    fn record(sources: Vec<RawSource>) -> VideoRecord {
        VideoRecord {
            id: 1,
            title: "test".into(),
            description: None,
            views: 0,
            duration: None,
            storage_mode: None,
            embed_url: None,
            original_resolution: None,
            sources,
            resolutions: vec![],
            uploader_id: None,
            upload_date: None,
        }
    }

    fn raw(provider: &str, resolution: Option<&str>) -> RawSource {
        RawSource {
            id: None,
            provider: provider.into(),
            resolution: resolution.map(Into::into),
            embed_url: Some("https://embed.example/e/abc".into()),
            download_url: None,
        }
    }

    #[test]
    fn rank_parses_leading_integer() {
        assert_eq!(resolution_rank("720p"), 720);
        assert_eq!(resolution_rank("1080p HDR"), 1080);
        assert_eq!(resolution_rank("Original"), 0);
        assert_eq!(resolution_rank(""), 0);
    }

    #[test]
    fn builds_and_dedups_on_provider_resolution() {
        let rec = record(vec![
            raw("local", Some("720p")),
            raw("local", Some("720p")),
            raw("local", Some("480p")),
        ]);
        let catalog = SourceCatalog::from_record(&rec);
        assert_eq!(catalog.len(), 2);

        // Same payload twice yields identical output.
        let again = SourceCatalog::from_record(&rec);
        assert_eq!(catalog.sources(), again.sources());
    }

    #[test]
    fn unknown_provider_is_dropped() {
        let rec = record(vec![raw("mega", Some("720p")), raw("local", Some("480p"))]);
        let catalog = SourceCatalog::from_record(&rec);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.sources()[0].provider, Provider::Local);
    }

    #[test]
    fn embed_without_url_is_dropped() {
        let mut source = raw("streamtape", Some("720p"));
        source.embed_url = None;
        let catalog = SourceCatalog::from_record(&record(vec![source]));
        assert!(catalog.is_empty());
    }

    #[test]
    fn initial_selection_picks_highest_resolution() {
        let rec = record(vec![
            raw("local", Some("480p")),
            raw("local", Some("720p")),
            raw("local", Some("360p")),
        ]);
        let catalog = SourceCatalog::from_record(&rec);
        assert_eq!(catalog.initial_selection().unwrap().resolution, "720p");
    }

    #[test]
    fn unparseable_label_ranks_lowest() {
        let rec = record(vec![raw("local", None), raw("local", Some("720p"))]);
        let catalog = SourceCatalog::from_record(&rec);
        assert_eq!(catalog.initial_selection().unwrap().resolution, "720p");
    }

    #[test]
    fn telegram_preferred_over_higher_resolution_local() {
        let rec = record(vec![
            raw("local", Some("1080p")),
            raw("telegram", Some("480p")),
        ]);
        let catalog = SourceCatalog::from_record(&rec);
        let initial = catalog.initial_selection().unwrap();
        assert_eq!(initial.provider, Provider::Telegram);
        assert_eq!(initial.resolution, "480p");
    }

    #[test]
    fn embeds_used_only_as_fallback() {
        let rec = record(vec![
            raw("streamtape", Some("720p")),
            raw("doodstream", Some("480p")),
        ]);
        let catalog = SourceCatalog::from_record(&rec);
        let initial = catalog.initial_selection().unwrap();
        assert_eq!(initial.resolution, "720p");
        assert!(initial.provider.is_embed());
    }

    #[test]
    fn legacy_resolution_rows_merge_without_overwriting() {
        let mut rec = record(vec![raw("telegram", Some("720p"))]);
        rec.resolutions = vec![
            RawResolution {
                resolution: "720p".into(),
                file_size: None,
            },
            RawResolution {
                resolution: "480p".into(),
                file_size: None,
            },
        ];
        let catalog = SourceCatalog::from_record(&rec);
        assert_eq!(catalog.len(), 2);
        // The explicit 720p row wins over the synthesized one.
        assert!(catalog.find(Provider::Telegram, "480p").is_some());
    }

    #[test]
    fn legacy_primary_embed_synthesized_when_sources_empty() {
        let mut rec = record(vec![]);
        rec.storage_mode = Some("doodstream".into());
        rec.embed_url = Some("https://dood.example/e/xyz".into());
        rec.original_resolution = Some("1080p".into());

        let catalog = SourceCatalog::from_record(&rec);
        assert_eq!(catalog.len(), 1);
        let source = &catalog.sources()[0];
        assert_eq!(source.provider, Provider::Doodstream);
        assert_eq!(source.resolution, "1080p");
    }

    #[test]
    fn no_synthesis_for_local_storage_mode() {
        // Zero sources on a server-hosted upload means still processing.
        let mut rec = record(vec![]);
        rec.storage_mode = Some("local".into());
        let catalog = SourceCatalog::from_record(&rec);
        assert!(catalog.is_empty());
    }

    #[test]
    fn resolutions_for_sorted_high_to_low() {
        let rec = record(vec![
            raw("local", Some("480p")),
            raw("local", Some("1080p")),
            raw("local", Some("720p")),
        ]);
        let catalog = SourceCatalog::from_record(&rec);
        assert_eq!(
            catalog.resolutions_for(Provider::Local),
            vec!["1080p", "720p", "480p"]
        );
    }

    #[test]
    fn providers_in_first_seen_order() {
        let rec = record(vec![
            raw("doodstream", Some("720p")),
            raw("local", Some("720p")),
            raw("doodstream", Some("480p")),
        ]);
        let catalog = SourceCatalog::from_record(&rec);
        assert_eq!(
            catalog.providers(),
            vec![Provider::Doodstream, Provider::Local]
        );
    }
}
