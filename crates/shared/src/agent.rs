use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of a locality's agent roster.
///
/// The backend owns the shape; records are kept as an opaque object and only
/// formatted for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentRecord(pub Map<String, Value>);

const NAME_PARTS: [(&str, &str); 3] = [
    ("first_name", "firstName"),
    ("middle_name", "middleName"),
    ("last_name", "lastName"),
];

const JURISDICTION: [(&str, &str); 4] = [
    ("Office", "office"),
    ("Division", "division"),
    ("District", "district"),
    ("Taluka", "taluka"),
];

const ADDRESS_PARTS: [(&str, &str); 6] = [
    ("address_line1", "addressLine1"),
    ("address_line2", "addressLine2"),
    ("village", "village"),
    ("city", "city"),
    ("pincode", "pincode"),
    ("state", "state"),
];

impl AgentRecord {
    /// A scalar field as display text, looked up by snake_case key then camelCase alias.
    pub fn text(&self, key: &str, alias: &str) -> Option<String> {
        self.0
            .get(key)
            .or_else(|| self.0.get(alias))
            .and_then(scalar_text)
    }

    pub fn full_name(&self) -> String {
        let parts: Vec<String> = NAME_PARTS
            .iter()
            .filter_map(|(key, alias)| self.text(key, alias))
            .collect();
        if !parts.is_empty() {
            return parts.join(" ");
        }
        self.text("name", "fullName")
            .unwrap_or_else(|| "Unnamed agent".to_string())
    }

    /// Labelled office/division/district/taluka lines, skipping absent ones.
    pub fn jurisdiction(&self) -> Vec<(&'static str, String)> {
        JURISDICTION
            .iter()
            .filter_map(|(label, key)| self.text(key, key).map(|v| (*label, v)))
            .collect()
    }

    pub fn address(&self) -> Option<String> {
        let parts: Vec<String> = ADDRESS_PARTS
            .iter()
            .filter_map(|(key, alias)| self.text(key, alias))
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }

    pub fn past_experience(&self) -> Vec<String> {
        self.list("past_experience", "pastExperience")
    }

    pub fn current_projects(&self) -> Vec<String> {
        self.list("current_projects", "currentProjects")
    }

    fn list(&self, key: &str, alias: &str) -> Vec<String> {
        match self.0.get(key).or_else(|| self.0.get(alias)) {
            Some(Value::Array(items)) => items.iter().filter_map(describe_entry).collect(),
            Some(other) => describe_entry(other).into_iter().collect(),
            None => Vec::new(),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Render a list entry: scalars as-is, objects as their scalar values joined by " · ".
fn describe_entry(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            let parts: Vec<String> = map.values().filter_map(scalar_text).collect();
            (!parts.is_empty()).then(|| parts.join(" · "))
        }
        other => scalar_text(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn agent(value: Value) -> AgentRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_full_name_from_parts() {
        let a = agent(json!({"first_name": "Asha", "middle_name": " ", "last_name": "Patil"}));
        assert_eq!(a.full_name(), "Asha Patil");
    }

    #[test]
    fn test_full_name_camel_case_alias() {
        let a = agent(json!({"firstName": "Ravi", "lastName": "Kulkarni"}));
        assert_eq!(a.full_name(), "Ravi Kulkarni");
    }

    #[test]
    fn test_full_name_fallbacks() {
        assert_eq!(agent(json!({"name": "S. Deshmukh"})).full_name(), "S. Deshmukh");
        assert_eq!(agent(json!({})).full_name(), "Unnamed agent");
    }

    #[test]
    fn test_jurisdiction_skips_missing() {
        let a = agent(json!({"office": "Pune HQ", "taluka": "Haveli", "division": null}));
        assert_eq!(
            a.jurisdiction(),
            vec![("Office", "Pune HQ".to_string()), ("Taluka", "Haveli".to_string())]
        );
    }

    #[test]
    fn test_address_joins_numeric_pincode() {
        let a = agent(json!({"address_line1": "12 MG Road", "city": "Pune", "pincode": 411001}));
        assert_eq!(a.address().as_deref(), Some("12 MG Road, Pune, 411001"));
        assert!(agent(json!({})).address().is_none());
    }

    #[test]
    fn test_lists_accept_strings_and_objects() {
        let a = agent(json!({
            "past_experience": ["Survey 2019", {"project": "Census", "year": 2021}, null],
            "current_projects": "Water audit"
        }));
        assert_eq!(a.past_experience(), vec!["Survey 2019", "Census · 2021"]);
        assert_eq!(a.current_projects(), vec!["Water audit"]);
    }

    #[test]
    fn test_record_roundtrips_unknown_fields() {
        let a = agent(json!({"first_name": "Asha", "badge": 7}));
        let back = serde_json::to_value(&a).unwrap();
        assert_eq!(back["badge"], 7);
    }
}
