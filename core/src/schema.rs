//! Declarative description of the editable settings.
//!
//! # Design
//! A field is declared as a `FieldDef` with only the attributes it cares
//! about; `FieldDef::with_defaults` resolves it into a complete `FieldSpec`
//! against a fixed default record. `FieldDef` deserializes from JSON so a
//! host can append its own fields without recompiling.

use serde::{Deserialize, Serialize};

/// Control kind used when rendering a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Select,
    Checkbox,
    Radio,
    Textarea,
}

impl FieldKind {
    /// The HTML `type` attribute (or element name) for this kind.
    pub fn html_type(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Select => "select",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Radio => "radio",
            FieldKind::Textarea => "textarea",
        }
    }
}

/// A stored setting: one string, or several for multi-valued checkboxes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    Multi(Vec<String>),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Scalar(String::new())
    }
}

impl FieldValue {
    /// The value as a single string. A sequence yields its first element.
    pub fn as_str(&self) -> &str {
        match self {
            FieldValue::Scalar(s) => s,
            FieldValue::Multi(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// The value viewed as a sequence; a scalar becomes a one-element slice.
    pub fn as_slice(&self) -> &[String] {
        match self {
            FieldValue::Scalar(s) => std::slice::from_ref(s),
            FieldValue::Multi(values) => values,
        }
    }

    pub fn contains(&self, candidate: &str) -> bool {
        self.as_slice().iter().any(|v| v == candidate)
    }

    /// Loose truthiness: empty text, `"0"` and an empty sequence are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Scalar(s) => !s.is_empty() && s != "0",
            FieldValue::Multi(values) => !values.is_empty(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Scalar(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Scalar(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        FieldValue::Multi(values)
    }
}

/// Size hints for text inputs (`size`) and textareas (`rows`, `cols`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub rows: Option<u32>,
    #[serde(default)]
    pub cols: Option<u32>,
}

/// A fully resolved field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub description: String,
    pub layout: Layout,
    pub default_value: FieldValue,
    /// Value → display label, in render order.
    pub options: Vec<(String, String)>,
    /// Emitted after every checkbox/radio entry, typically `<br>`.
    pub option_separator: String,
}

/// A partially specified field; unset attributes are filled by
/// [`FieldDef::with_defaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FieldDef {
    pub name: String,
    pub label: Option<String>,
    pub kind: Option<FieldKind>,
    pub description: Option<String>,
    pub size: Option<u32>,
    pub rows: Option<u32>,
    pub cols: Option<u32>,
    pub value: Option<FieldValue>,
    pub options: Option<Vec<(String, String)>>,
    pub option_separator: Option<String>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn kind(mut self, kind: FieldKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn rows_cols(mut self, rows: u32, cols: u32) -> Self {
        self.rows = Some(rows);
        self.cols = Some(cols);
        self
    }

    pub fn value(mut self, value: impl Into<FieldValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn options<'a>(mut self, options: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        self.options = Some(
            options
                .into_iter()
                .map(|(v, l)| (v.to_string(), l.to_string()))
                .collect(),
        );
        self
    }

    pub fn option_separator(mut self, separator: impl Into<String>) -> Self {
        self.option_separator = Some(separator.into());
        self
    }

    /// Resolve every unset attribute from the default record: empty label and
    /// description, `Text` kind, no layout hints, empty default value, no
    /// options, empty separator.
    pub fn with_defaults(self) -> FieldSpec {
        FieldSpec {
            name: self.name,
            label: self.label.unwrap_or_default(),
            kind: self.kind.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            layout: Layout {
                size: self.size,
                rows: self.rows,
                cols: self.cols,
            },
            default_value: self.value.unwrap_or_default(),
            options: self.options.unwrap_or_default(),
            option_separator: self.option_separator.unwrap_or_default(),
        }
    }
}

/// The six settings every web service bundle carries, in render order.
pub fn webservice_fields() -> Vec<FieldSpec> {
    vec![
        FieldDef::new("url")
            .label("API Url")
            .kind(FieldKind::Text)
            .size(100)
            .value("http://httpbin.org/"),
        FieldDef::new("method")
            .label("HTTP Method")
            .kind(FieldKind::Select)
            .value("GET")
            .options([("POST", "POST"), ("GET", "GET")]),
        FieldDef::new("content_type")
            .label("Content Type")
            .kind(FieldKind::Select)
            .value("text/html")
            .options([
                ("application/json", "JSON"),
                ("application/xml", "XML"),
                ("text/html", "HTML"),
            ]),
        FieldDef::new("sslverify")
            .label("Verify SSL for HTTPS sites")
            .kind(FieldKind::Select)
            .value("0")
            .options([("0", "no"), ("1", "yes")]),
        FieldDef::new("headers")
            .label("Additional Headers")
            .kind(FieldKind::Textarea)
            .description("One header per line in the format: header=value")
            .rows_cols(5, 100),
        FieldDef::new("data")
            .label("Additional POST Data")
            .kind(FieldKind::Textarea)
            .description("One parameter per line in the format: parameter=value")
            .rows_cols(5, 100),
    ]
    .into_iter()
    .map(FieldDef::with_defaults)
    .collect()
}
