use std::borrow::Borrow;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Stable short identifier of an administrative region (e.g. `"B"`, `"CJ"`).
///
/// Values only come out of an [`IdTable`], so every code reaching the scene
/// has been checked against the id-mapping file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionCode(String);

impl RegionCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Ordering and equality are those of the inner string.
impl Borrow<str> for RegionCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Census display name → region code lookup, built from the id-mapping file.
#[derive(Debug, Clone, Default)]
pub struct IdTable {
    by_name: HashMap<String, RegionCode>,
    codes: BTreeSet<RegionCode>,
}

impl IdTable {
    /// Parse the id-mapping JSON object (`{ "Alba": "AB", ... }`).
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let pairs: HashMap<String, String> = serde_json::from_value(value)?;
        Ok(Self::from_pairs(pairs))
    }

    pub fn from_pairs<I, N, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: Into<String>,
    {
        let mut table = Self::default();
        for (name, code) in pairs {
            let code = RegionCode(code.into());
            table.codes.insert(code.clone());
            table.by_name.insert(name.into(), code);
        }
        table
    }

    /// Resolve a census row name to its code.
    pub fn resolve(&self, name: &str) -> Option<&RegionCode> {
        self.by_name.get(name)
    }

    /// Check a raw code (as found in the topology) against the known codes.
    pub fn validate(&self, code: &str) -> Option<&RegionCode> {
        self.codes.get(code)
    }

    /// Number of distinct codes.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_and_validate() {
        let table = IdTable::from_pairs([("Bucuresti", "B"), ("Cluj", "CJ")]);
        assert_eq!(table.resolve("Cluj").map(RegionCode::as_str), Some("CJ"));
        assert_eq!(table.resolve("Atlantis"), None);
        assert_eq!(table.validate("B").map(RegionCode::as_str), Some("B"));
        assert_eq!(table.validate("ZZ"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_validate_many_codes() {
        let pairs: Vec<(String, String)> = (0..500)
            .map(|i| (format!("Region {i}"), format!("R{i:03}")))
            .collect();
        let table = IdTable::from_pairs(pairs);
        let code = table.validate("R499").expect("known code");
        assert_eq!(code.as_str(), "R499");
        assert_eq!(table.resolve("Region 499"), Some(code));
        assert_eq!(table.validate("R500"), None);
        assert_eq!(table.validate(" R001"), None);
    }

    #[test]
    fn test_from_json_object() {
        let table = IdTable::from_json(json!({ "Alba": "AB", "Arad": "AR" })).expect("parse");
        assert_eq!(table.resolve("Arad").map(|c| c.to_string()), Some("AR".into()));
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(IdTable::from_json(json!(["AB", "AR"])).is_err());
        assert!(IdTable::from_json(json!({ "Alba": 1 })).is_err());
    }
}
