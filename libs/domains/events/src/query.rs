//! Query routing for `GET /events`

use crate::error::{EventError, Result};
use serde::Deserialize;
use strum::{Display, EnumString};
use utoipa::IntoParams;

pub const DEFAULT_LIMIT: u32 = 5;
pub const MAX_LIMIT: u32 = 100;
pub const DEFAULT_PAGE: u32 = 1;

/// Raw query string of `GET /events`.
///
/// Numbers are kept as text so a malformed value becomes a domain
/// validation error rather than an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Fetch a single event by id (takes precedence over `type`)
    pub id: Option<String>,
    /// Listing mode, only `latest` is supported
    #[serde(rename = "type")]
    #[param(example = "latest")]
    pub kind: Option<String>,
    /// Page size, clamped to 1..=100 (default 5)
    #[param(value_type = Option<u32>)]
    pub limit: Option<String>,
    /// 1-based page number (default 1)
    #[param(value_type = Option<u32>)]
    pub page: Option<String>,
}

/// Supported values of `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ListKind {
    Latest,
}

/// What a `GET /events` request asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSelector {
    /// Raw id, parsed by the service so a bad one maps to `InvalidId`
    ById(String),
    Latest(Pagination),
}

impl ListQuery {
    /// A non-empty `id` wins; otherwise `type` must be `latest`.
    pub fn into_selector(self) -> Result<EventSelector> {
        if let Some(id) = self.id.filter(|id| !id.is_empty()) {
            return Ok(EventSelector::ById(id));
        }

        match self.kind.as_deref().map(str::parse::<ListKind>) {
            Some(Ok(ListKind::Latest)) => Ok(EventSelector::Latest(Pagination::from_params(
                self.limit.as_deref(),
                self.page.as_deref(),
            )?)),
            _ => Err(EventError::InvalidQuery),
        }
    }
}

/// Clamped page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    limit: u32,
    page: u32,
}

impl Pagination {
    /// Clamps `limit` to `1..=MAX_LIMIT` and `page` to at least 1.
    pub fn new(limit: i64, page: i64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT as i64) as u32,
            page: page.clamp(1, u32::MAX as i64) as u32,
        }
    }

    /// Missing or blank values take the defaults; non-integers are rejected.
    pub fn from_params(limit: Option<&str>, page: Option<&str>) -> Result<Self> {
        let limit = parse_param("limit", limit, DEFAULT_LIMIT)?;
        let page = parse_param("page", page, DEFAULT_PAGE)?;
        Ok(Self::new(limit, page))
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Documents to skip before this page.
    pub fn skip(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT as i64, DEFAULT_PAGE as i64)
    }
}

fn parse_param(name: &str, raw: Option<&str>, default: u32) -> Result<i64> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default as i64),
        Some(value) => value
            .parse::<i64>()
            .map_err(|_| EventError::validation(format!("{name}: '{value}' is not an integer"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(id: Option<&str>, kind: Option<&str>, limit: Option<&str>, page: Option<&str>) -> ListQuery {
        ListQuery {
            id: id.map(String::from),
            kind: kind.map(String::from),
            limit: limit.map(String::from),
            page: page.map(String::from),
        }
    }

    #[test]
    fn test_id_takes_precedence_over_type() {
        let selector = query(Some("abc"), Some("latest"), None, None)
            .into_selector()
            .unwrap();
        assert_eq!(selector, EventSelector::ById("abc".to_string()));
    }

    #[test]
    fn test_empty_id_falls_through_to_type() {
        let selector = query(Some(""), Some("latest"), None, None)
            .into_selector()
            .unwrap();
        assert_eq!(selector, EventSelector::Latest(Pagination::default()));
    }

    #[test]
    fn test_unknown_or_missing_type_is_invalid() {
        for q in [
            query(None, None, None, None),
            query(None, Some("oldest"), None, None),
            query(None, Some("LATEST"), None, None),
            query(Some(""), None, Some("3"), None),
        ] {
            assert!(matches!(q.into_selector(), Err(EventError::InvalidQuery)));
        }
    }

    #[test]
    fn test_defaults() {
        let page = Pagination::from_params(None, Some(" ")).unwrap();
        assert_eq!(page.limit(), 5);
        assert_eq!(page.page(), 1);
        assert_eq!(page.skip(), 0);
    }

    #[test]
    fn test_clamping() {
        assert_eq!(Pagination::new(0, 0), Pagination::new(1, 1));
        assert_eq!(Pagination::new(-4, -9), Pagination::new(1, 1));
        assert_eq!(Pagination::new(1000, 2).limit(), MAX_LIMIT);
        assert_eq!(Pagination::new(10, i64::MAX).page(), u32::MAX);
    }

    #[test]
    fn test_skip_is_page_offset() {
        assert_eq!(Pagination::new(2, 2).skip(), 2);
        assert_eq!(Pagination::new(5, 3).skip(), 10);
        assert_eq!(
            Pagination::new(100, i64::MAX).skip(),
            (u32::MAX as u64 - 1) * 100
        );
    }

    #[test]
    fn test_non_numeric_values_are_rejected() {
        assert!(matches!(
            Pagination::from_params(Some("ten"), None),
            Err(EventError::Validation { .. })
        ));
        assert!(matches!(
            Pagination::from_params(None, Some("1.5")),
            Err(EventError::Validation { .. })
        ));
    }

    #[test]
    fn test_list_kind_round_trips_lowercase() {
        assert_eq!("latest".parse::<ListKind>().unwrap(), ListKind::Latest);
        assert_eq!(ListKind::Latest.to_string(), "latest");
    }
}
