//! Parameter descriptors.

use serde::{Deserialize, Serialize};

/// Client rendering hint. Never used for validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    #[default]
    Text,
    Password,
}

/// Where a descriptor's candidate list comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CandidateSource {
    /// Fixed at registration time.
    #[default]
    Static,
    /// Recomputed from the installed packages on every marshal.
    PackageInventory,
}

/// An allowed value with its display labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub value: String,
    #[serde(default)]
    pub label_zh: String,
    #[serde(default)]
    pub label_en: String,
}

impl Candidate {
    pub fn new(value: impl Into<String>, label_zh: impl Into<String>, label_en: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label_zh: label_zh.into(),
            label_en: label_en.into(),
        }
    }

    /// A candidate whose value is its own label.
    pub fn bare(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label_zh: String::new(),
            label_en: String::new(),
        }
    }
}

/// Numeric range for number inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

/// Metadata for one configurable field.
///
/// Labels and descriptions are kept per language with no fallback between
/// them. `visible` and `required` hold predicate source text; they are parsed
/// when the descriptor is registered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameter {
    pub label_zh: String,
    pub label_en: String,
    pub description_zh: String,
    pub description_en: String,
    pub input_type: InputType,
    pub default: Option<String>,
    pub candidates: Vec<Candidate>,
    pub candidate_source: CandidateSource,
    pub range: Option<Range>,
    pub visible: Option<String>,
    pub required: Option<String>,
}

impl Parameter {
    pub fn new(label_zh: impl Into<String>, label_en: impl Into<String>) -> Self {
        Self {
            label_zh: label_zh.into(),
            label_en: label_en.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, zh: impl Into<String>, en: impl Into<String>) -> Self {
        self.description_zh = zh.into();
        self.description_en = en.into();
        self
    }

    pub fn password(mut self) -> Self {
        self.input_type = InputType::Password;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn candidates(mut self, candidates: Vec<Candidate>) -> Self {
        self.candidates = candidates;
        self
    }

    /// Take candidates from the package inventory at marshal time.
    pub fn package_candidates(mut self) -> Self {
        self.candidate_source = CandidateSource::PackageInventory;
        self
    }

    pub fn range(mut self, min: f64, max: f64, step: f64) -> Self {
        self.range = Some(Range { min, max, step });
        self
    }

    pub fn visible(mut self, predicate: impl Into<String>) -> Self {
        self.visible = Some(predicate.into());
        self
    }

    pub fn required(mut self, predicate: impl Into<String>) -> Self {
        self.required = Some(predicate.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let p = Parameter::new("端口", "Port")
            .description("不得为空", "can't be empty")
            .default_value("22")
            .visible("AuthenticateType != '0'")
            .password();

        assert_eq!(p.label_en, "Port");
        assert_eq!(p.description_zh, "不得为空");
        assert_eq!(p.default.as_deref(), Some("22"));
        assert_eq!(p.input_type, InputType::Password);
        assert_eq!(p.candidate_source, CandidateSource::Static);
        assert!(p.required.is_none());
    }

    #[test]
    fn test_input_type_wire_form() {
        assert_eq!(serde_json::to_string(&InputType::Password).unwrap(), "\"password\"");
        assert_eq!(serde_json::to_string(&InputType::default()).unwrap(), "\"text\"");
    }
}
