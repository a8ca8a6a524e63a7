use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use url::form_urlencoded;

use crate::Error;

/// Ordered, multi-valued query parameters. Keys keep the position in which
/// they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, Vec<String>)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw query string, with or without a leading `?`.
    pub fn parse(query: &str) -> Self {
        let mut params = Self::new();
        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            params.append(&key, &value);
        }
        params
    }

    /// Last value given for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key)
            .and_then(|values| values.last())
            .map(|v| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    pub fn append(&mut self, key: &str, value: &str) {
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => values.push(value.to_string()),
            None => self.0.push((key.to_string(), vec![value.to_string()])),
        }
    }

    /// Replaces every value of `key`, keeping its position.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => *values = vec![value.to_string()],
            None => self.0.push((key.to_string(), vec![value.to_string()])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn urlencode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, values) in self.0.iter() {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

impl FromStr for QueryParams {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.urlencode())
    }
}

/// List state that a link can carry over to the next page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOverrides {
    pub state: Option<String>,
    pub page: Option<u32>,
    pub matching: Option<String>,
    pub sort: Option<String>,
}

impl QueryOverrides {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Default::default()
        }
    }
}

/// Encodes `params` with every non-empty override applied. Empty strings and
/// page `0` count as absent and never remove an existing value.
pub fn query_transform(params: &QueryParams, overrides: &QueryOverrides) -> String {
    let mut updated = params.clone();

    if let Some(state) = overrides.state.as_deref().filter(|s| !s.is_empty()) {
        updated.set("state", state);
    }

    if let Some(page) = overrides.page.filter(|p| *p != 0) {
        updated.set("page", &page.to_string());
    }

    if let Some(matching) = overrides.matching.as_deref().filter(|s| !s.is_empty()) {
        updated.set("match", matching);
    }

    if let Some(sort) = overrides.sort.as_deref().filter(|s| !s.is_empty()) {
        updated.set("sort", sort);
    }

    updated.urlencode()
}

/// JSON array of the given values, for handing lists to page scripts.
pub fn values_list<I, T>(values: I) -> Result<String, Error>
where
    I: IntoIterator<Item = T>,
    T: Serialize,
{
    Ok(serde_json::to_string(&values.into_iter().collect::<Vec<T>>())?)
}
