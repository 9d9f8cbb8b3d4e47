//! Dot-notation field paths.

use std::fmt;

use super::value::{FieldValue, Fields};

/// A parsed field path such as `shipping.address`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Split a dot-notation path into segments.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path.split('.').map(String::from).collect(),
        }
    }

    /// Path segments, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// A path is writable only when no segment is empty.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.segments.iter().all(|s| !s.is_empty())
    }

    /// Look up the value at this path.
    #[must_use]
    pub fn get<'a>(&self, fields: &'a Fields) -> Option<&'a FieldValue> {
        let (last, parents) = self.segments.split_last()?;
        let mut current = fields;
        for segment in parents {
            current = current.get(segment)?.as_record()?;
        }
        current.get(last)
    }

    /// Write `value` at this path.
    ///
    /// A single segment is always written. Nested paths are written only if
    /// every parent already exists as a record; parents are never created.
    /// Returns whether the value was written.
    pub fn apply(&self, fields: &mut Fields, value: FieldValue) -> bool {
        if !self.is_valid() {
            return false;
        }
        let Some((last, parents)) = self.segments.split_last() else {
            return false;
        };

        let mut current = fields;
        for segment in parents {
            current = match current.get_mut(segment) {
                Some(FieldValue::Record(child)) => child,
                _ => return false,
            };
        }
        current.insert(last.clone(), value);
        true
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(json: serde_json::Value) -> Fields {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_top_level_write_creates_field() {
        let mut f = fields(serde_json::json!({"grossTotal": 2400}));
        assert!(FieldPath::parse("serviceDate").apply(&mut f, "2024-01-01".into()));
        assert_eq!(f["serviceDate"], FieldValue::from("2024-01-01"));
    }

    #[test]
    fn test_nested_write_requires_existing_parent() {
        let mut f = fields(serde_json::json!({"tax": {"rate": 19}}));

        assert!(FieldPath::parse("tax.rate").apply(&mut f, 7.into()));
        assert_eq!(
            FieldPath::parse("tax.rate").get(&f),
            Some(&FieldValue::from(7))
        );

        let before = f.clone();
        assert!(!FieldPath::parse("shipping.date").apply(&mut f, "x".into()));
        assert_eq!(f, before);
    }

    #[test]
    fn test_nested_write_skips_non_record_parent() {
        let mut f = fields(serde_json::json!({"currency": "EUR", "discount": null}));
        assert!(!FieldPath::parse("currency.code").apply(&mut f, "USD".into()));
        assert!(!FieldPath::parse("discount.pct").apply(&mut f, 2.into()));
        assert_eq!(f["currency"], FieldValue::from("EUR"));
    }

    #[test]
    fn test_deep_path() {
        let mut f = fields(serde_json::json!({"a": {"b": {"c": 1}}}));
        assert!(FieldPath::parse("a.b.c").apply(&mut f, 2.into()));
        assert_eq!(FieldPath::parse("a.b.c").get(&f), Some(&FieldValue::from(2)));
        assert!(!FieldPath::parse("a.x.c").apply(&mut f, 3.into()));
    }

    #[test]
    fn test_empty_segments_are_never_written() {
        let mut f = Fields::new();
        assert!(!FieldPath::parse("").apply(&mut f, 1.into()));
        assert!(!FieldPath::parse("a..b").apply(&mut f, 1.into()));
        assert!(f.is_empty());
    }

    #[test]
    fn test_display_round_trips() {
        assert_eq!(FieldPath::parse("a.b").to_string(), "a.b");
        assert_eq!(FieldPath::parse("a.b").segments().len(), 2);
    }
}
