//! Request query parameters (`filter[..]`, `sort`, `include`, `page[..]`).

use url::Url;

use crate::config::SerializerConfig;
use crate::error::{ApiError, Result};
use crate::graph::PathSet;

use super::csv::split_csv;
use super::sequence::OrderBy;

/// One `filter[name]=v1,v2` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterProperty {
    pub name: String,
    pub values: Vec<String>,
}

/// All filters of a request. Properties are ANDed, values of one property ORed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilteringContext {
    properties: Vec<FilterProperty>,
}

impl FilteringContext {
    pub fn new(properties: Vec<FilterProperty>) -> Self {
        Self { properties }
    }

    pub fn properties(&self) -> &[FilterProperty] {
        &self.properties
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    fn push(&mut self, name: &str, values: Vec<String>) {
        match self.properties.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.values.extend(values),
            None => self.properties.push(FilterProperty {
                name: name.to_string(),
                values,
            }),
        }
    }
}

/// One `sort` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortProperty {
    pub name: String,
    pub order: OrderBy,
}

/// `sort=age,-id`: first entry orders, the rest break ties.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortingContext {
    properties: Vec<SortProperty>,
}

impl SortingContext {
    pub fn new(properties: Vec<SortProperty>) -> Self {
        Self { properties }
    }

    /// Parses a raw `sort` value.
    pub fn parse(raw: &str) -> Self {
        let properties = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|entry| match entry.strip_prefix('-') {
                Some(name) => SortProperty {
                    name: name.to_string(),
                    order: OrderBy::Desc,
                },
                None => SortProperty {
                    name: entry.strip_prefix('+').unwrap_or(entry).to_string(),
                    order: OrderBy::Asc,
                },
            })
            .collect();
        Self { properties }
    }

    pub fn properties(&self) -> &[SortProperty] {
        &self.properties
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Which relationships end up in `included`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IncludingContext {
    includes: Option<Vec<String>>,
    disable_default_included: bool,
}

impl IncludingContext {
    pub fn new(includes: Option<Vec<String>>, disable_default_included: bool) -> Self {
        Self {
            includes,
            disable_default_included,
        }
    }

    pub fn includes(&self) -> Option<&[String]> {
        self.includes.as_deref()
    }

    pub fn disable_default_included(&self) -> bool {
        self.disable_default_included
    }

    /// Paths the graph builder follows.
    pub fn path_set(&self) -> PathSet {
        match &self.includes {
            Some(paths) => PathSet::from_paths(paths),
            None if self.disable_default_included => PathSet::None,
            None => PathSet::All,
        }
    }

    /// `false` when the document gets no `included` member at all.
    pub fn renders_included(&self) -> bool {
        !self.disable_default_included || self.includes.is_some()
    }

    /// Whether a node reached through `property_name` may appear in `included`.
    pub fn allows(&self, property_name: &str) -> bool {
        if !self.disable_default_included {
            return true;
        }
        match &self.includes {
            Some(paths) => PathSet::from_paths(paths)
                .segments()
                .contains(crate::config::canonical_name(property_name).as_str()),
            None => false,
        }
    }
}

/// `page[number]` (zero-based) and `page[size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationContext {
    number: usize,
    size: usize,
}

impl PaginationContext {
    pub fn new(number: usize, size: usize) -> Self {
        Self { number, size }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn skip(&self) -> usize {
        self.number.saturating_mul(self.size)
    }

    pub fn previous(&self) -> Option<usize> {
        self.number.checked_sub(1)
    }

    pub fn next(&self) -> usize {
        self.number.saturating_add(1)
    }

    /// A full page suggests another one follows.
    pub fn has_next(&self, count: usize) -> bool {
        count >= self.size
    }
}

/// Parsed query of one request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryContext {
    filtering: Option<FilteringContext>,
    sorting: Option<SortingContext>,
    including: IncludingContext,
    pagination: Option<PaginationContext>,
    pairs: Vec<(String, String)>,
}

impl QueryContext {
    /// Parses decoded key/value pairs. Unknown keys are kept for link building
    /// and otherwise ignored.
    pub fn from_pairs<I, K, V>(pairs: I, config: &SerializerConfig) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let pairs: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let mut filtering = FilteringContext::default();
        let mut sorting: Option<SortingContext> = None;
        let mut includes: Option<Vec<String>> = None;
        let mut page_number: Option<usize> = None;
        let mut page_size: Option<usize> = None;

        for (key, value) in &pairs {
            if let Some(name) = bracketed(key, "filter") {
                filtering.push(name, split_csv(value));
                continue;
            }
            match key.as_str() {
                "sort" => sorting = Some(SortingContext::parse(value)),
                "include" => {
                    includes.get_or_insert_with(Vec::new).extend(
                        value
                            .split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(String::from),
                    );
                }
                "page[number]" => page_number = Some(parse_count(key, value, false)?),
                "page[size]" => page_size = Some(parse_count(key, value, true)?),
                _ => {}
            }
        }

        let pagination = match &config.pagination {
            Some(settings) => {
                let size = page_size.unwrap_or(settings.per_page);
                if let Some(limit) = settings.page_size_limit
                    && size > limit
                {
                    return Err(ApiError::PageSizeExceeded {
                        requested: size,
                        limit,
                    });
                }
                Some(PaginationContext::new(page_number.unwrap_or(0), size))
            }
            None => None,
        };

        Ok(Self {
            filtering: (!filtering.is_empty()).then_some(filtering),
            sorting: sorting.filter(|s| !s.is_empty()),
            including: IncludingContext::new(includes, config.disable_default_included),
            pagination,
            pairs,
        })
    }

    /// Parses a raw (percent-encoded) query string.
    pub fn from_query_string(query: &str, config: &SerializerConfig) -> Result<Self> {
        Self::from_pairs(
            url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()).into_owned(),
            config,
        )
    }

    pub fn from_url(url: &Url, config: &SerializerConfig) -> Result<Self> {
        Self::from_pairs(url.query_pairs().into_owned(), config)
    }

    pub fn filtering(&self) -> Option<&FilteringContext> {
        self.filtering.as_ref()
    }

    pub fn sorting(&self) -> Option<&SortingContext> {
        self.sorting.as_ref()
    }

    pub fn including(&self) -> &IncludingContext {
        &self.including
    }

    pub fn pagination(&self) -> Option<&PaginationContext> {
        self.pagination.as_ref()
    }

    /// The decoded pairs, in request order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// `filter[name]` -> `name`.
fn bracketed<'k>(key: &'k str, family: &str) -> Option<&'k str> {
    key.strip_prefix(family)?
        .strip_prefix('[')?
        .strip_suffix(']')
        .filter(|name| !name.is_empty())
}

fn parse_count(key: &str, value: &str, positive: bool) -> Result<usize> {
    let invalid = |reason: &str| ApiError::InvalidQueryValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };
    let n = value
        .trim()
        .parse::<usize>()
        .map_err(|_| invalid("expected a non-negative integer"))?;
    if positive && n == 0 {
        return Err(invalid("must be greater than zero"));
    }
    Ok(n)
}
