//! Element kinds and their capability table.
//!
//! Every element carries one [`ElementKind`] tag. Behaviour that differs per
//! kind (minimum size, which properties are editable, whether the element
//! hosts a nested container, ...) is looked up in a static
//! [`KindCapabilities`] row instead of being dispatched through a trait.

use crate::container::ContainerKind;
use crate::drag::Handle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Text,
    Image,
    Line,
    BarCode,
    PageBreak,
    Frame,
    Table,
    TableBand,
    TableText,
    Section,
    SectionBand,
}

/// Static per-kind behaviour.
#[derive(Debug)]
pub struct KindCapabilities {
    pub default_width: f32,
    pub default_height: f32,
    pub min_width: f32,
    pub min_height: f32,
    /// Editable properties, in property-panel order.
    pub properties: &'static [&'static str],
    /// Kind of the nested container this element hosts, if any.
    pub linked_container: Option<ContainerKind>,
    pub has_data_source: bool,
    /// Resize handles shown when selected.
    pub sizers: &'static [Handle],
    pub draggable: bool,
    /// Text fields that may hold `${...}` parameter references.
    pub parameter_fields: &'static [&'static str],
}

const DEFAULT_MIN: f32 = 20.0;

const ALL_SIZERS: &[Handle] = &[
    Handle::N,
    Handle::NE,
    Handle::E,
    Handle::SE,
    Handle::S,
    Handle::SW,
    Handle::W,
    Handle::NW,
];

static TEXT: KindCapabilities = KindCapabilities {
    default_width: 100.0,
    default_height: 20.0,
    min_width: DEFAULT_MIN,
    min_height: DEFAULT_MIN,
    properties: &[
        "content",
        "richText",
        "richTextContent",
        "eval",
        "x",
        "y",
        "width",
        "height",
        "styleId",
        "bold",
        "italic",
        "underline",
        "strikethrough",
        "horizontalAlignment",
        "verticalAlignment",
        "textColor",
        "backgroundColor",
        "font",
        "fontSize",
        "lineSpacing",
        "borderColor",
        "borderWidth",
        "borderAll",
        "borderLeft",
        "borderTop",
        "borderRight",
        "borderBottom",
        "paddingLeft",
        "paddingTop",
        "paddingRight",
        "paddingBottom",
        "pattern",
        "link",
        "printIf",
        "removeEmptyElement",
        "alwaysPrintOnSamePage",
    ],
    linked_container: None,
    has_data_source: false,
    sizers: ALL_SIZERS,
    draggable: true,
    parameter_fields: &["content", "richTextContent", "printIf", "link"],
};

static IMAGE: KindCapabilities = KindCapabilities {
    default_width: 80.0,
    default_height: 80.0,
    min_width: DEFAULT_MIN,
    min_height: DEFAULT_MIN,
    properties: &[
        "source",
        "image",
        "imageFilename",
        "x",
        "y",
        "width",
        "height",
        "horizontalAlignment",
        "verticalAlignment",
        "backgroundColor",
        "link",
        "printIf",
        "removeEmptyElement",
    ],
    linked_container: None,
    has_data_source: false,
    sizers: ALL_SIZERS,
    draggable: true,
    parameter_fields: &["source", "printIf", "link"],
};

static LINE: KindCapabilities = KindCapabilities {
    default_width: 100.0,
    default_height: 1.0,
    min_width: DEFAULT_MIN,
    min_height: 1.0,
    properties: &["color", "x", "y", "width", "height", "printIf"],
    linked_container: None,
    has_data_source: false,
    sizers: ALL_SIZERS,
    draggable: true,
    parameter_fields: &["printIf"],
};

static BAR_CODE: KindCapabilities = KindCapabilities {
    default_width: 120.0,
    default_height: 60.0,
    min_width: DEFAULT_MIN,
    min_height: DEFAULT_MIN,
    properties: &[
        "content",
        "format",
        "displayValue",
        "barWidth",
        "x",
        "y",
        "width",
        "height",
        "printIf",
        "removeEmptyElement",
    ],
    linked_container: None,
    has_data_source: false,
    sizers: ALL_SIZERS,
    draggable: true,
    parameter_fields: &["content", "printIf"],
};

static PAGE_BREAK: KindCapabilities = KindCapabilities {
    default_width: 100.0,
    default_height: 1.0,
    min_width: DEFAULT_MIN,
    min_height: 1.0,
    properties: &["y"],
    linked_container: None,
    has_data_source: false,
    sizers: &[],
    draggable: true,
    parameter_fields: &[],
};

static FRAME: KindCapabilities = KindCapabilities {
    default_width: 100.0,
    default_height: 100.0,
    min_width: DEFAULT_MIN,
    min_height: DEFAULT_MIN,
    properties: &[
        "label",
        "x",
        "y",
        "width",
        "height",
        "backgroundColor",
        "borderColor",
        "borderWidth",
        "borderAll",
        "borderLeft",
        "borderTop",
        "borderRight",
        "borderBottom",
        "printIf",
        "removeEmptyElement",
        "shrinkToContentHeight",
    ],
    linked_container: Some(ContainerKind::Frame),
    has_data_source: false,
    sizers: ALL_SIZERS,
    draggable: true,
    parameter_fields: &["printIf"],
};

static TABLE: KindCapabilities = KindCapabilities {
    default_width: 200.0,
    default_height: 40.0,
    min_width: DEFAULT_MIN,
    min_height: DEFAULT_MIN,
    properties: &[
        "label",
        "dataSource",
        "columns",
        "header",
        "footer",
        "x",
        "y",
        "width",
        "printIf",
        "removeEmptyElement",
    ],
    linked_container: Some(ContainerKind::TableInterior),
    has_data_source: true,
    sizers: &[],
    draggable: true,
    parameter_fields: &["dataSource", "printIf"],
};

static TABLE_BAND: KindCapabilities = KindCapabilities {
    default_width: 200.0,
    default_height: 20.0,
    min_width: DEFAULT_MIN,
    min_height: 10.0,
    properties: &["bandType", "height", "backgroundColor", "repeatHeader"],
    linked_container: Some(ContainerKind::TableBand),
    has_data_source: false,
    sizers: &[Handle::S],
    draggable: false,
    parameter_fields: &[],
};

static TABLE_TEXT: KindCapabilities = KindCapabilities {
    default_width: 100.0,
    default_height: 20.0,
    min_width: DEFAULT_MIN,
    min_height: DEFAULT_MIN,
    properties: &[
        "content",
        "richText",
        "richTextContent",
        "eval",
        "width",
        "styleId",
        "bold",
        "italic",
        "horizontalAlignment",
        "textColor",
        "backgroundColor",
        "pattern",
        "link",
        "printIf",
    ],
    linked_container: None,
    has_data_source: false,
    sizers: &[],
    draggable: false,
    parameter_fields: &["content", "richTextContent", "printIf", "link"],
};

static SECTION: KindCapabilities = KindCapabilities {
    default_width: 200.0,
    default_height: 60.0,
    min_width: DEFAULT_MIN,
    min_height: DEFAULT_MIN,
    properties: &["label", "dataSource", "y", "header", "footer", "printIf"],
    linked_container: Some(ContainerKind::SectionInterior),
    has_data_source: true,
    sizers: &[],
    draggable: true,
    parameter_fields: &["dataSource", "printIf"],
};

static SECTION_BAND: KindCapabilities = KindCapabilities {
    default_width: 200.0,
    default_height: 40.0,
    min_width: DEFAULT_MIN,
    min_height: 10.0,
    properties: &[
        "bandType",
        "height",
        "repeatHeader",
        "alwaysPrintOnSamePage",
        "shrinkToContentHeight",
    ],
    linked_container: Some(ContainerKind::SectionBand),
    has_data_source: false,
    sizers: &[Handle::S],
    draggable: false,
    parameter_fields: &[],
};

impl ElementKind {
    pub fn capabilities(self) -> &'static KindCapabilities {
        match self {
            ElementKind::Text => &TEXT,
            ElementKind::Image => &IMAGE,
            ElementKind::Line => &LINE,
            ElementKind::BarCode => &BAR_CODE,
            ElementKind::PageBreak => &PAGE_BREAK,
            ElementKind::Frame => &FRAME,
            ElementKind::Table => &TABLE,
            ElementKind::TableBand => &TABLE_BAND,
            ElementKind::TableText => &TABLE_TEXT,
            ElementKind::Section => &SECTION,
            ElementKind::SectionBand => &SECTION_BAND,
        }
    }

    /// Name used for `elementType` in serialized documents.
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Image => "image",
            ElementKind::Line => "line",
            ElementKind::BarCode => "bar_code",
            ElementKind::PageBreak => "page_break",
            ElementKind::Frame => "frame",
            ElementKind::Table => "table",
            ElementKind::TableBand => "table_band",
            ElementKind::TableText => "table_text",
            ElementKind::Section => "section",
            ElementKind::SectionBand => "section_band",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "text" => ElementKind::Text,
            "image" => ElementKind::Image,
            "line" => ElementKind::Line,
            "bar_code" => ElementKind::BarCode,
            "page_break" => ElementKind::PageBreak,
            "frame" => ElementKind::Frame,
            "table" => ElementKind::Table,
            "table_band" => ElementKind::TableBand,
            "table_text" => ElementKind::TableText,
            "section" => ElementKind::Section,
            "section_band" => ElementKind::SectionBand,
            _ => return None,
        })
    }

    pub fn has_property(self, property: &str) -> bool {
        self.capabilities().properties.contains(&property)
    }
}

// ─── Field typing ────────────────────────────────────────────────────────

/// How a property value is stored and edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Checkbox,
    RichText,
}

const CHECKBOX_FIELDS: &[&str] = &[
    "richText",
    "eval",
    "bold",
    "italic",
    "underline",
    "strikethrough",
    "borderAll",
    "borderLeft",
    "borderTop",
    "borderRight",
    "borderBottom",
    "displayValue",
    "header",
    "footer",
    "repeatHeader",
    "removeEmptyElement",
    "alwaysPrintOnSamePage",
    "shrinkToContentHeight",
];

pub fn field_type(field: &str) -> FieldType {
    if field == "richTextContent" {
        FieldType::RichText
    } else if CHECKBOX_FIELDS.contains(&field) {
        FieldType::Checkbox
    } else {
        FieldType::Text
    }
}

/// Fields whose change requires the renderer to re-apply the style.
pub const STYLE_FIELDS: &[&str] = &[
    "styleId",
    "bold",
    "italic",
    "underline",
    "strikethrough",
    "horizontalAlignment",
    "verticalAlignment",
    "textColor",
    "backgroundColor",
    "font",
    "fontSize",
    "lineSpacing",
    "borderColor",
    "borderWidth",
    "borderAll",
    "borderLeft",
    "borderTop",
    "borderRight",
    "borderBottom",
    "paddingLeft",
    "paddingTop",
    "paddingRight",
    "paddingBottom",
];

/// Style fields that also change the element's outer geometry.
pub const BOX_MODEL_FIELDS: &[&str] = &[
    "borderWidth",
    "borderAll",
    "borderLeft",
    "borderTop",
    "borderRight",
    "borderBottom",
    "paddingLeft",
    "paddingTop",
    "paddingRight",
    "paddingBottom",
];
