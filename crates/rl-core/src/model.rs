//! The spatial entity placed on a report: [`DocElement`].
//!
//! Geometry is kept twice, as the text the user typed (`x`, `y`, `width`,
//! `height`) and as numbers derived from that text (`x_val`, ...). The
//! numeric side is re-derived whenever the text changes and is what every
//! constraint computation reads.

use crate::id::ObjectId;
use crate::kind::{ElementKind, FieldType, field_type};
use crate::units::{Rect, convert_input_to_number, format_number};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Geometry field names, in the order they are stored.
pub const GEOMETRY_FIELDS: [&str; 4] = ["x", "y", "width", "height"];

/// A single property value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    /// Structured rich-text content (a delta document).
    Rich(serde_json::Value),
    /// Reference to another document object, e.g. `containerId`.
    Id(Option<ObjectId>),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<ObjectId> {
        match self {
            FieldValue::Id(id) => *id,
            _ => None,
        }
    }

    /// Text form used for geometry and plain string fields.
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Rich(v) => v.to_string(),
            FieldValue::Id(Some(id)) => id.as_str().to_string(),
            FieldValue::Id(None) => String::new(),
        }
    }

    /// Default value for a freshly created property.
    pub fn default_for(field: &str) -> Self {
        match field_type(field) {
            FieldType::Text => FieldValue::Text(String::new()),
            FieldType::Checkbox => FieldValue::Bool(false),
            FieldType::RichText => FieldValue::Rich(serde_json::json!({ "ops": [] })),
        }
    }
}

/// A validation diagnostic attached to an element by an external validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub msg_key: String,
    #[serde(default)]
    pub info: Option<String>,
}

/// Side effect the document must perform after a raw field assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum FieldEffect {
    None,
    /// Geometry changed: refresh the display.
    Geometry,
    /// `containerId` changed from the given container.
    Container { old: Option<ObjectId> },
    /// Style changed; `geometry` is set when borders or padding moved.
    Style { geometry: bool },
}

/// A positioned, sized rectangle placed inside a container.
#[derive(Debug, Clone)]
pub struct DocElement {
    pub id: ObjectId,
    pub name: String,
    pub kind: ElementKind,

    pub x: String,
    pub y: String,
    pub width: String,
    pub height: String,

    pub x_val: f32,
    pub y_val: f32,
    pub width_val: f32,
    pub height_val: f32,

    /// Container this element is placed in.
    pub container_id: Option<ObjectId>,
    /// Container represented by this element (frame interior, band, ...).
    pub linked_container_id: Option<ObjectId>,

    pub print_if: String,
    pub remove_empty_element: bool,

    /// Kind-specific properties (content, style, data source, ...).
    props: BTreeMap<String, FieldValue>,

    errors: Vec<ValidationError>,
}

impl DocElement {
    /// New element of `kind` at 0/0 with the kind's default size.
    pub fn new(id: ObjectId, kind: ElementKind) -> Self {
        let caps = kind.capabilities();
        let mut props = BTreeMap::new();
        for field in caps.properties {
            if !is_builtin_field(field) {
                props.insert((*field).to_string(), FieldValue::default_for(field));
            }
        }
        let width = format_number(caps.default_width);
        let height = format_number(caps.default_height);
        Self {
            id,
            name: kind.as_str().to_string(),
            kind,
            x: "0".to_string(),
            y: "0".to_string(),
            width_val: convert_input_to_number(&width),
            height_val: convert_input_to_number(&height),
            width,
            height,
            x_val: 0.0,
            y_val: 0.0,
            container_id: None,
            linked_container_id: None,
            print_if: String::new(),
            remove_empty_element: false,
            props,
            errors: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder-style raw assignment, for constructing fixtures and loading.
    pub fn with_value(mut self, field: &str, value: FieldValue) -> Self {
        self.set_field(field, value);
        self
    }

    pub fn rect(&self) -> Rect {
        Rect::new(
            self.x_val,
            self.y_val,
            self.display_width(),
            self.display_height(),
        )
    }

    pub fn display_width(&self) -> f32 {
        self.width_val
    }

    pub fn display_height(&self) -> f32 {
        self.height_val
    }

    pub fn min_width(&self) -> f32 {
        self.kind.capabilities().min_width
    }

    pub fn min_height(&self) -> f32 {
        self.kind.capabilities().min_height
    }

    /// Editable properties of this element's kind.
    pub fn properties(&self) -> &'static [&'static str] {
        self.kind.capabilities().properties
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.kind.has_property(property)
    }

    /// All serialized fields: `id`, `containerId`, then the properties.
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields = vec!["id", "containerId"];
        fields.extend_from_slice(self.properties());
        fields
    }

    pub fn get_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "x" => Some(FieldValue::Text(self.x.clone())),
            "y" => Some(FieldValue::Text(self.y.clone())),
            "width" => Some(FieldValue::Text(self.width.clone())),
            "height" => Some(FieldValue::Text(self.height.clone())),
            "name" => Some(FieldValue::Text(self.name.clone())),
            "containerId" => Some(FieldValue::Id(self.container_id)),
            "linkedContainerId" => Some(FieldValue::Id(self.linked_container_id)),
            "printIf" => Some(FieldValue::Text(self.print_if.clone())),
            "removeEmptyElement" => Some(FieldValue::Bool(self.remove_empty_element)),
            _ => self.props.get(field).cloned(),
        }
    }

    /// Text of a plain string property, empty when unset.
    pub fn text_value(&self, field: &str) -> String {
        self.get_value(field)
            .and_then(|v| v.as_text().map(str::to_string))
            .unwrap_or_default()
    }

    /// Raw assignment without undo recording. Reports which side effect the
    /// owning document has to run.
    pub(crate) fn set_field(&mut self, field: &str, value: FieldValue) -> FieldEffect {
        match field {
            "x" | "y" | "width" | "height" => {
                let text = value.to_text();
                let number = convert_input_to_number(&text);
                match field {
                    "x" => {
                        self.x = text;
                        self.x_val = number;
                    }
                    "y" => {
                        self.y = text;
                        self.y_val = number;
                    }
                    "width" => {
                        self.width = text;
                        self.width_val = number;
                    }
                    _ => {
                        self.height = text;
                        self.height_val = number;
                    }
                }
                FieldEffect::Geometry
            }
            "name" => {
                self.name = value.to_text();
                FieldEffect::None
            }
            "containerId" => {
                let old = self.container_id;
                self.container_id = value.as_id();
                FieldEffect::Container { old }
            }
            "linkedContainerId" => {
                self.linked_container_id = value.as_id();
                FieldEffect::None
            }
            "printIf" => {
                self.print_if = value.to_text();
                FieldEffect::None
            }
            "removeEmptyElement" => {
                self.remove_empty_element = value.as_bool().unwrap_or(false);
                FieldEffect::None
            }
            _ => {
                self.props.insert(field.to_string(), value);
                if crate::kind::STYLE_FIELDS.contains(&field) {
                    FieldEffect::Style {
                        geometry: crate::kind::BOX_MODEL_FIELDS.contains(&field),
                    }
                } else {
                    FieldEffect::None
                }
            }
        }
    }

    /// Parameter name of the `dataSource` expression, if it is exactly one
    /// `${name}` reference.
    pub fn data_source_parameter_name(&self) -> Option<String> {
        if !self.kind.capabilities().has_data_source {
            return None;
        }
        let data_source = self.text_value("dataSource");
        let data_source = data_source.trim();
        if data_source.len() >= 3 && data_source.starts_with("${") && data_source.ends_with('}') {
            Some(data_source[2..data_source.len() - 1].to_string())
        } else {
            None
        }
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }
}

/// Fields stored directly on the struct rather than in the property map.
fn is_builtin_field(field: &str) -> bool {
    matches!(
        field,
        "x" | "y"
            | "width"
            | "height"
            | "name"
            | "containerId"
            | "linkedContainerId"
            | "printIf"
            | "removeEmptyElement"
    )
}
