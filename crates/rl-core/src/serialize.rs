//! Plain-mapping form of elements.
//!
//! `to_js` produces the object stored in a saved report: `elementType`, the
//! identity fields and every declared property, with geometry as numbers.
//! `from_js` reads the same shape back, turning numbers into geometry text
//! and re-deriving the numeric geometry from it.

use crate::document::Document;
use crate::error::DocumentError;
use crate::id::ObjectId;
use crate::kind::{ElementKind, FieldType, field_type};
use crate::model::{DocElement, FieldValue, GEOMETRY_FIELDS};
use crate::units::format_number;
use serde_json::{Map, Value};

impl DocElement {
    pub fn to_js(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("elementType".into(), Value::from(self.kind.as_str()));
        map.insert("name".into(), Value::from(self.name.as_str()));
        map.insert(
            "linkedContainerId".into(),
            id_to_js(self.linked_container_id),
        );
        for field in self.fields() {
            let value = match field {
                "id" => Value::from(self.id.as_str()),
                "x" => number_to_js(self.x_val),
                "y" => number_to_js(self.y_val),
                "width" => number_to_js(self.width_val),
                "height" => number_to_js(self.height_val),
                _ => match self.get_value(field) {
                    Some(FieldValue::Text(s)) => Value::String(s),
                    Some(FieldValue::Bool(b)) => Value::Bool(b),
                    Some(FieldValue::Rich(v)) => v,
                    Some(FieldValue::Id(id)) => id_to_js(id),
                    None => Value::Null,
                },
            };
            map.insert(field.to_string(), value);
        }
        map
    }

    /// Rebuild an element from its `to_js` form. Unknown keys are ignored.
    pub fn from_js(data: &Map<String, Value>) -> Result<Self, DocumentError> {
        let element_type = data
            .get("elementType")
            .and_then(Value::as_str)
            .ok_or(DocumentError::MissingField("elementType"))?;
        let kind = ElementKind::parse(element_type)
            .ok_or_else(|| DocumentError::UnknownElementType(element_type.to_string()))?;
        let id = data
            .get("id")
            .and_then(ObjectId::from_json)
            .ok_or(DocumentError::MissingField("id"))?;

        let mut element = DocElement::new(id, kind);
        for (key, value) in data {
            let field = key.as_str();
            let accepted = matches!(field, "name" | "containerId" | "linkedContainerId")
                || element.has_property(field)
                || GEOMETRY_FIELDS.contains(&field);
            if !accepted {
                log::trace!("{id}: ignoring {field}");
                continue;
            }
            element = element.with_value(field, field_from_js(field, value));
        }
        Ok(element)
    }
}

fn number_to_js(value: f32) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f32 {
        Value::from(value as i64)
    } else {
        Value::from(f64::from(value))
    }
}

fn id_to_js(id: Option<ObjectId>) -> Value {
    id.map_or(Value::Null, |id| Value::from(id.as_str()))
}

fn field_from_js(field: &str, value: &Value) -> FieldValue {
    if matches!(field, "containerId" | "linkedContainerId") {
        return FieldValue::Id(ObjectId::from_json(value));
    }
    match field_type(field) {
        FieldType::Checkbox => FieldValue::Bool(match value {
            Value::Bool(b) => *b,
            Value::String(s) => s == "true",
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            _ => false,
        }),
        FieldType::RichText => FieldValue::Rich(value.clone()),
        FieldType::Text => FieldValue::Text(match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n
                .as_f64()
                .map(|n| format_number(n as f32))
                .unwrap_or_default(),
            Value::Null => String::new(),
            other => other.to_string(),
        }),
    }
}

impl Document {
    /// Add serialized elements in order. Every element's container must
    /// exist by the time the element is read, so owners come before the
    /// elements placed in them.
    pub fn load_elements(&mut self, json: &str) -> Result<Vec<ObjectId>, DocumentError> {
        let data: Vec<Map<String, Value>> = serde_json::from_str(json)?;
        let mut ids = Vec::with_capacity(data.len());
        for item in &data {
            let element = DocElement::from_js(item)?;
            let container = element.container_id;
            ids.push(self.add_element(element, container, None)?);
        }
        log::debug!("loaded {} element(s)", ids.len());
        Ok(ids)
    }

    /// Serialize every element, band by band (top to bottom), each element
    /// followed by the elements nested in it.
    pub fn elements_to_js(&self) -> Vec<Map<String, Value>> {
        let mut bands: Vec<_> = self
            .containers()
            .iter()
            .filter(|c| c.owner.is_none())
            .collect();
        bands.sort_by(|a, b| a.band_rect.y.total_cmp(&b.band_rect.y));

        let mut out = Vec::new();
        for band in bands {
            for child in &band.children {
                let nested = std::iter::once(*child).chain(self.container_children(*child));
                out.extend(nested.filter_map(|id| self.element(id)).map(DocElement::to_js));
            }
        }
        out
    }
}
