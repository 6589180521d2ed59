//! The page address and its processing marker.

use url::Url;

use crate::error::TypesError;

/// Query parameter set by the hosted-verification redirect back.
pub const STATUS_PARAM: &str = "status";
pub const PROCESSING_VALUE: &str = "processing";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageLocation {
    url: Url,
    referrer: Option<String>,
}

impl PageLocation {
    pub fn parse(address: &str) -> Result<Self, TypesError> {
        let url = Url::parse(address).map_err(|e| TypesError::InvalidLocation(format!("{address}: {e}")))?;
        Ok(Self { url, referrer: None })
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        let referrer = referrer.into();
        self.referrer = (!referrer.is_empty()).then_some(referrer);
        self
    }

    pub fn href(&self) -> &str {
        self.url.as_str()
    }

    pub fn referrer(&self) -> Option<&str> {
        self.referrer.as_deref()
    }

    /// Whether the page was loaded by the hosted-verification redirect back.
    pub fn is_processing(&self) -> bool {
        self.url
            .query_pairs()
            .any(|(k, v)| k == STATUS_PARAM && v == PROCESSING_VALUE)
    }

    /// Relative address (path, query, fragment) with the status marker removed.
    ///
    /// Returns `None` when there is no marker to strip.
    pub fn without_status_marker(&self) -> Option<String> {
        if !self.url.query_pairs().any(|(k, _)| k == STATUS_PARAM) {
            return None;
        }

        let kept: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(k, _)| k != STATUS_PARAM)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let mut url = self.url.clone();
        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }

        let mut relative = url.path().to_string();
        if let Some(query) = url.query() {
            relative.push('?');
            relative.push_str(query);
        }
        if let Some(fragment) = url.fragment() {
            relative.push('#');
            relative.push_str(fragment);
        }
        Some(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_processing_marker() {
        let loc = PageLocation::parse("https://shop.test/pages/verify?status=processing").unwrap();
        assert!(loc.is_processing());
        let other = PageLocation::parse("https://shop.test/pages/verify?status=done").unwrap();
        assert!(!other.is_processing());
    }

    #[test]
    fn strips_marker_and_keeps_other_params() {
        let loc =
            PageLocation::parse("https://shop.test/pages/verify?ref=cart&status=processing#top")
                .unwrap();
        assert_eq!(
            loc.without_status_marker().as_deref(),
            Some("/pages/verify?ref=cart#top")
        );
    }

    #[test]
    fn strips_only_param_to_bare_path() {
        let loc = PageLocation::parse("https://shop.test/pages/verify?status=processing").unwrap();
        assert_eq!(loc.without_status_marker().as_deref(), Some("/pages/verify"));
    }

    #[test]
    fn nothing_to_strip_without_marker() {
        let loc = PageLocation::parse("https://shop.test/pages/verify").unwrap();
        assert_eq!(loc.without_status_marker(), None);
    }
}
