//! Property tables for inspectors
//!
//! Each component exposes a static table of [`Property`] rows: a name, the
//! editor widget to show and plain function pointers to read and write the
//! field. An inspector lists rows with [`describe`] and writes back with
//! [`assign`]; the scene then calls the component's `on_property_changed`.

use crate::ecs::component::ComponentKind;
use crate::foundation::math::{Quat, Vec3};
use crate::scene::SceneError;

/// A value shown in or written by an inspector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    /// Checkbox value
    Bool(bool),
    /// Number field value
    Number(f32),
    /// Vector field value
    Vec3(Vec3),
    /// Rotation field value
    Quat(Quat),
    /// Color picker value, linear RGB
    Color(Vec3),
    /// Index into a select widget's options
    Choice(u32),
}

impl PropertyValue {
    /// Name of the variant, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Vec3(_) => "vec3",
            Self::Quat(_) => "quat",
            Self::Color(_) => "color",
            Self::Choice(_) => "choice",
        }
    }

    /// The boolean, if this is one
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The number, if this is one
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// The vector or color, if this is one
    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Self::Vec3(value) | Self::Color(value) => Some(*value),
            _ => None,
        }
    }

    /// The choice index, if this is one
    pub fn as_choice(&self) -> Option<u32> {
        match self {
            Self::Choice(value) => Some(*value),
            _ => None,
        }
    }
}

/// Widget an inspector shows for a property
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorKind {
    /// Checkbox
    Boolean,
    /// Number field with optional bounds
    Number {
        /// Lower bound
        min: Option<f32>,
        /// Upper bound
        max: Option<f32>,
    },
    /// Three number fields
    Vec3,
    /// Euler-angle fields
    Quat,
    /// Color picker
    Color,
    /// Drop-down of named options
    Select(&'static [&'static str]),
}

impl EditorKind {
    /// Unbounded number field
    pub const NUMBER: Self = Self::Number { min: None, max: None };
}

/// One row of a component's property table
pub struct Property<T> {
    /// Field name, also the key passed to `on_property_changed`
    pub name: &'static str,
    /// Widget to show
    pub editor: EditorKind,
    /// Read the current value
    pub get: fn(&T) -> PropertyValue,
    /// Write a value; returns `false` when the value has the wrong type
    pub set: fn(&mut T, PropertyValue) -> bool,
}

/// A property row with its current value
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyEntry {
    /// Field name
    pub name: &'static str,
    /// Widget to show
    pub editor: EditorKind,
    /// Current value
    pub value: PropertyValue,
}

/// List every row of `table` with its current value on `target`
pub fn describe<T>(table: &[Property<T>], target: &T) -> Vec<PropertyEntry> {
    table
        .iter()
        .map(|property| PropertyEntry {
            name: property.name,
            editor: property.editor,
            value: (property.get)(target),
        })
        .collect()
}

/// Write `value` into the row called `name`, clamping bounded numbers
pub fn assign<T>(
    table: &[Property<T>],
    kind: ComponentKind,
    target: &mut T,
    name: &str,
    value: PropertyValue,
) -> Result<(), SceneError> {
    let property = table
        .iter()
        .find(|property| property.name == name)
        .ok_or_else(|| SceneError::UnknownProperty {
            kind,
            property: name.to_string(),
        })?;

    let value = match (property.editor, value) {
        (EditorKind::Number { min, max }, PropertyValue::Number(n)) => {
            let n = min.map_or(n, |min| n.max(min));
            PropertyValue::Number(max.map_or(n, |max| n.min(max)))
        }
        (EditorKind::Select(options), PropertyValue::Choice(index)) if index as usize >= options.len() => {
            return Err(SceneError::PropertyType {
                property: name.to_string(),
                expected: "choice within range",
                found: value.type_name(),
            });
        }
        _ => value,
    };

    if (property.set)(target, value) {
        Ok(())
    } else {
        Err(SceneError::PropertyType {
            property: name.to_string(),
            expected: match property.editor {
                EditorKind::Boolean => "bool",
                EditorKind::Number { .. } => "number",
                EditorKind::Vec3 => "vec3",
                EditorKind::Quat => "quat",
                EditorKind::Color => "color",
                EditorKind::Select(_) => "choice",
            },
            found: value.type_name(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Lamp {
        on: bool,
        brightness: f32,
    }

    const LAMP: &[Property<Lamp>] = &[
        Property {
            name: "on",
            editor: EditorKind::Boolean,
            get: |lamp| PropertyValue::Bool(lamp.on),
            set: |lamp, value| value.as_bool().map(|on| lamp.on = on).is_some(),
        },
        Property {
            name: "brightness",
            editor: EditorKind::Number { min: Some(0.0), max: Some(1.0) },
            get: |lamp| PropertyValue::Number(lamp.brightness),
            set: |lamp, value| value.as_number().map(|b| lamp.brightness = b).is_some(),
        },
    ];

    #[test]
    fn test_describe_lists_current_values() {
        let lamp = Lamp { on: true, brightness: 0.5 };
        let entries = describe(LAMP, &lamp);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].value, PropertyValue::Bool(true));
        assert_eq!(entries[1].value, PropertyValue::Number(0.5));
    }

    #[test]
    fn test_assign_clamps_and_checks_types() {
        let mut lamp = Lamp::default();
        assign(LAMP, ComponentKind::PointLight, &mut lamp, "brightness", PropertyValue::Number(3.0)).unwrap();
        assert_eq!(lamp.brightness, 1.0);

        let wrong = assign(LAMP, ComponentKind::PointLight, &mut lamp, "on", PropertyValue::Number(1.0));
        assert!(matches!(wrong, Err(SceneError::PropertyType { .. })));

        let unknown = assign(LAMP, ComponentKind::PointLight, &mut lamp, "color", PropertyValue::Bool(true));
        assert!(matches!(unknown, Err(SceneError::UnknownProperty { .. })));
    }
}
