pub mod command;
pub mod config;
pub mod container;
pub mod document;
pub mod drag;
pub mod error;
pub mod id;
pub mod kind;
pub mod model;
pub mod parameter;
pub mod rename;
pub mod serialize;
pub mod units;

pub use command::{Command, CommandGroup, ElementSnapshot, ValueKind};
pub use config::{LayoutConfig, PageSettings};
pub use container::{BandType, Container, ContainerKind, ContainerTree};
pub use document::{DisplayRequest, Document, linked_container_id_for};
pub use drag::{DragOutcome, Edge, Gesture, Handle};
pub use error::DocumentError;
pub use id::ObjectId;
pub use kind::{ElementKind, KindCapabilities};
pub use model::{DocElement, FieldValue, ValidationError};
pub use parameter::{Parameter, ParameterSet, ParameterType};
pub use rename::DataSource;
pub use units::{Offset, PointUnits, Rect, Size, UnitConverter};
