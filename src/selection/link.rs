use percent_encoding::percent_decode_str;
use url::Url;

use crate::config::LinkOptions;
use crate::error::{EngineError, EngineResult};

/// The page address the shareable identifier is written into.
pub trait AddressBar: Send {
    /// Replace the current location without navigating or reloading.
    fn replace(&mut self, url: &str);

    /// The location currently shown, if one has been written.
    fn location(&self) -> Option<&str>;
}

/// Address bar kept in memory (headless sessions and tests).
#[derive(Debug, Clone, Default)]
pub struct MemoryAddressBar {
    location: Option<String>,
    writes: usize,
}

impl MemoryAddressBar {
    pub fn new() -> Self { Self::default() }

    /// Number of times the location was replaced.
    #[inline] pub fn writes(&self) -> usize { self.writes }
}

impl AddressBar for MemoryAddressBar {
    fn replace(&mut self, url: &str) {
        self.location = Some(url.to_string());
        self.writes += 1;
    }

    fn location(&self) -> Option<&str> { self.location.as_deref() }
}

/// Builds and parses shareable URLs carrying a catchment id, either as the
/// last path segment or as a query parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareableLink {
    base: Url,
    query_param: Option<String>,
}

impl ShareableLink {
    /// Fails when the base is not an absolute URL that can carry a path.
    pub fn new(options: &LinkOptions) -> EngineResult<Self> {
        let mut base = Url::parse(&options.base_url)
            .map_err(|err| EngineError::InvalidLink(format!("{:?}: {err}", options.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(EngineError::InvalidLink(format!("{:?} cannot carry a path", options.base_url)));
        }
        // Any query or fragment on the base is dropped; the id is the only state.
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self { base, query_param: options.query_param.clone() })
    }

    /// The URL denoting catchment `id`.
    pub fn url_for(&self, id: &str) -> String {
        let mut url = self.base.clone();
        match &self.query_param {
            Some(param) => {
                url.query_pairs_mut().append_pair(param, id);
            }
            None => {
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments.pop_if_empty().push(id);
                }
            }
        }
        url.into()
    }

    /// Extract a catchment id from a page location (full URL, path, or bare id).
    /// Relative locations are resolved against the base. The configured query
    /// parameter wins; otherwise the last non-empty path segment is used.
    pub fn identifier_from(&self, location: &str) -> Option<String> {
        let url = Url::parse(location).or_else(|_| self.base.join(location)).ok()?;

        if let Some(param) = &self.query_param {
            let value = url.query_pairs()
                .find(|(key, _)| key == param.as_str())
                .map(|(_, value)| value.into_owned())
                .filter(|value| !value.is_empty());
            if value.is_some() { return value }
        }

        url.path_segments()?
            .rfind(|segment| !segment.is_empty())
            .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
            .filter(|id| !id.is_empty())
    }
}

/// The identifier the page should show: the one in `location`, or `default`
/// when the location names none.
pub fn inbound_identifier(location: Option<&str>, link: &ShareableLink, default: &str) -> String {
    location
        .and_then(|location| link.identifier_from(location))
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::{inbound_identifier, AddressBar, MemoryAddressBar, ShareableLink};
    use crate::config::LinkOptions;
    use crate::error::EngineError;

    fn path_link() -> ShareableLink {
        ShareableLink::new(&LinkOptions { base_url: "https://schools.example/catchment/".to_string(), query_param: None }).unwrap()
    }

    fn query_link() -> ShareableLink {
        ShareableLink::new(&LinkOptions { base_url: "https://schools.example/map?x=1".to_string(), query_param: Some("school".to_string()) }).unwrap()
    }

    #[test]
    fn path_segment_urls() {
        assert_eq!(path_link().url_for("lindfield_ps"), "https://schools.example/catchment/lindfield_ps");
        assert_eq!(path_link().url_for("st_mary's_ps"), "https://schools.example/catchment/st_mary's_ps");
        assert_eq!(path_link().url_for("gordon/east ps"), "https://schools.example/catchment/gordon%2Feast%20ps");
    }

    #[test]
    fn query_param_urls() {
        assert_eq!(query_link().url_for("killara_ps"), "https://schools.example/map?school=killara_ps");
        assert_eq!(query_link().url_for("st_mary's_ps"), "https://schools.example/map?school=st_mary%27s_ps");
    }

    #[test]
    fn identifier_round_trips_through_url() {
        for link in [path_link(), query_link()] {
            for id in ["st_mary's_ps", "gordon/east ps"] {
                let url = link.url_for(id);
                assert_eq!(link.identifier_from(&url).as_deref(), Some(id));
            }
        }
    }

    #[test]
    fn identifier_from_paths_and_bare_ids() {
        let link = path_link();
        assert_eq!(link.identifier_from("/lindfield_ps").as_deref(), Some("lindfield_ps"));
        assert_eq!(link.identifier_from("/catchment/lindfield_ps/").as_deref(), Some("lindfield_ps"));
        assert_eq!(link.identifier_from("lindfield_ps").as_deref(), Some("lindfield_ps"));
        assert_eq!(link.identifier_from("https://schools.example/roseville_ps?ref=share#map").as_deref(), Some("roseville_ps"));
    }

    #[test]
    fn bare_host_has_no_identifier() {
        let link = path_link();
        assert_eq!(link.identifier_from("https://schools.example"), None);
        assert_eq!(link.identifier_from("https://schools.example/"), None);
        assert_eq!(link.identifier_from("/"), None);
    }

    #[test]
    fn query_param_falls_back_to_path() {
        let link = query_link();
        assert_eq!(link.identifier_from("/map?school=gordon_ps").as_deref(), Some("gordon_ps"));
        assert_eq!(link.identifier_from("/gordon_ps?school=").as_deref(), Some("gordon_ps"));
    }

    #[test]
    fn missing_identifier_uses_default() {
        let link = path_link();
        assert_eq!(inbound_identifier(None, &link, "lindfield_eps"), "lindfield_eps");
        assert_eq!(inbound_identifier(Some("https://schools.example/"), &link, "lindfield_eps"), "lindfield_eps");
        assert_eq!(inbound_identifier(Some("/killara_ps"), &link, "lindfield_eps"), "killara_ps");
    }

    #[test]
    fn escapes_are_decoded_and_malformed_ones_kept() {
        let link = query_link();
        assert_eq!(link.identifier_from("/st%20ives_ps").as_deref(), Some("st ives_ps"));
        assert_eq!(link.identifier_from("/a%zzb").as_deref(), Some("a%zzb"));
        assert_eq!(link.identifier_from("/map?school=st+ives_ps").as_deref(), Some("st ives_ps"));
    }

    #[test]
    fn base_must_be_an_absolute_url() {
        for base_url in ["schools.example/catchment", "mailto:office@schools.example"] {
            let options = LinkOptions { base_url: base_url.to_string(), query_param: None };
            assert!(matches!(ShareableLink::new(&options), Err(EngineError::InvalidLink(_))));
        }
    }

    #[test]
    fn memory_address_bar_counts_writes() {
        let mut bar = MemoryAddressBar::new();
        assert_eq!(bar.location(), None);
        bar.replace("https://schools.example/a");
        bar.replace("https://schools.example/b");
        assert_eq!(bar.location(), Some("https://schools.example/b"));
        assert_eq!(bar.writes(), 2);
    }
}
