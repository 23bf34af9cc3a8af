//! Facet counts and facet filters.

use crate::discovery::types::FacetResult;
use serde::Serialize;

/// Aggregate count breakdown returned alongside results.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Facet {
    pub key: String,
    pub values: Vec<FacetValue>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FacetValue {
    pub value: String,
    pub count: u64,
}

impl From<FacetResult> for Facet {
    fn from(result: FacetResult) -> Self {
        Self {
            key: result.key,
            values: result
                .values
                .into_iter()
                .map(|v| FacetValue {
                    value: v.value,
                    count: v.count,
                })
                .collect(),
        }
    }
}

/// Selected facet values, keyed by facet key, in selection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetFilters {
    entries: Vec<(String, Vec<String>)>,
}

impl FacetFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `value` under `key`. Duplicates are ignored.
    pub fn add(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => {
                if !values.iter().any(|v| v == value) {
                    values.push(value.to_string());
                }
            }
            None => self.entries.push((key.to_string(), vec![value.to_string()])),
        }
    }

    /// Builder-style [`FacetFilters::add`].
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.add(key, value);
        self
    }

    /// Collect filters from `key=value` pairs, keeping only keys accepted by `allow`.
    pub fn from_pairs<'a, I, F>(pairs: I, allow: F) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
        F: Fn(&str) -> bool,
    {
        let mut filters = Self::new();
        for (key, value) in pairs {
            if allow(key) && !value.is_empty() {
                filters.add(key, value);
            }
        }
        filters
    }

    pub fn is_selected(&self, key: &str, value: &str) -> bool {
        self.values(key).iter().any(|v| v == value)
    }

    pub fn values(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, values)| values.is_empty())
    }

    /// Copy of these filters with `value` under `key` flipped on or off.
    pub fn toggled(&self, key: &str, value: &str) -> Self {
        let mut next = self.clone();
        if self.is_selected(key, value) {
            if let Some((_, values)) = next.entries.iter_mut().find(|(k, _)| k == key) {
                values.retain(|v| v != value);
            }
            next.entries.retain(|(_, values)| !values.is_empty());
        } else {
            next.add(key, value);
        }
        next
    }

    /// Flattened `(key, value)` pairs, e.g. for query strings.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(k, values)| values.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    /// Render as a search filter expression: `key: ANY("v1") AND key: ANY("v2") AND ...`.
    pub fn to_filter_expression(&self) -> String {
        self.entries
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(key, values)| {
                values
                    .iter()
                    .map(|v| format!("{}: ANY(\"{}\")", key, escape_literal(v)))
                    .collect::<Vec<_>>()
                    .join(" AND ")
            })
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_expression() {
        let filters = FacetFilters::new()
            .with("persons.name", "A. Player")
            .with("hash_tags", "#Goal")
            .with("persons.name", "B. Keeper");

        assert_eq!(
            filters.to_filter_expression(),
            r##"persons.name: ANY("A. Player") AND persons.name: ANY("B. Keeper") AND hash_tags: ANY("#Goal")"##
        );
    }

    #[test]
    fn test_filter_expression_empty() {
        assert_eq!(FacetFilters::new().to_filter_expression(), "");
        assert!(FacetFilters::new().is_empty());
    }

    #[test]
    fn test_filter_escapes_quotes() {
        let filters = FacetFilters::new().with("organizations.name", r#"The "Reds""#);
        assert_eq!(
            filters.to_filter_expression(),
            r#"organizations.name: ANY("The \"Reds\"")"#
        );
    }

    #[test]
    fn test_from_pairs_respects_allow_list() {
        let pairs = vec![
            ("q", "goal"),
            ("hash_tags", "#Goal"),
            ("hash_tags", "#Goal"),
            ("hash_tags", ""),
            ("persons.name", "A"),
        ];
        let filters = FacetFilters::from_pairs(pairs, |k| k == "hash_tags" || k == "persons.name");

        assert_eq!(filters.values("hash_tags"), ["#Goal".to_string()]);
        assert_eq!(filters.values("persons.name"), ["A".to_string()]);
        assert!(filters.values("q").is_empty());
    }

    #[test]
    fn test_toggle() {
        let filters = FacetFilters::new().with("hash_tags", "#Goal");

        let off = filters.toggled("hash_tags", "#Goal");
        assert!(off.is_empty());
        assert_eq!(off.pairs().count(), 0);

        let on = filters.toggled("hash_tags", "#Save");
        assert!(on.is_selected("hash_tags", "#Goal"));
        assert!(on.is_selected("hash_tags", "#Save"));
        // original untouched
        assert!(!filters.is_selected("hash_tags", "#Save"));
    }

    #[test]
    fn test_facet_from_result() {
        let result: FacetResult = serde_json::from_value(serde_json::json!({
            "key": "hash_tags",
            "values": [{ "value": "#Goal", "count": "3" }]
        }))
        .unwrap();

        let facet = Facet::from(result);
        assert_eq!(facet.key, "hash_tags");
        assert_eq!(
            facet.values,
            vec![FacetValue {
                value: "#Goal".to_string(),
                count: 3
            }]
        );
    }
}
