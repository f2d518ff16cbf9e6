//! Scene errors

use crate::config::ConfigError;
use crate::ecs::component::ComponentKind;

/// Errors raised by scene and component operations
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// The entity handle is stale or was never issued
    #[error("Entity not found")]
    EntityNotFound,

    /// The entity has no component of this kind
    #[error("Entity has no {0} component")]
    ComponentNotFound(ComponentKind),

    /// A component was added without a sibling it depends on
    #[error("{component} requires a {required} component on the same entity")]
    MissingSibling {
        /// Component being added
        component: ComponentKind,
        /// Sibling it needs
        required: ComponentKind,
    },

    /// No property with this name exists on the component
    #[error("{kind} has no property named '{property}'")]
    UnknownProperty {
        /// Component kind
        kind: ComponentKind,
        /// Requested property
        property: String,
    },

    /// The value doesn't fit the property
    #[error("Property '{property}' expects {expected}, got {found}")]
    PropertyType {
        /// Property name
        property: String,
        /// Accepted value type
        expected: &'static str,
        /// Supplied value type
        found: &'static str,
    },

    /// Parenting would make an entity its own ancestor
    #[error("Cannot parent an entity under itself or one of its descendants")]
    InvalidParent,

    /// No scene setting with this name exists
    #[error("Unknown scene setting '{0}'")]
    UnknownSetting(String),

    /// A scene description refers to an entity name that doesn't exist
    #[error("Scene description refers to unknown entity '{0}'")]
    UnknownEntity(String),

    /// A scene description names an entity without a camera as the active camera
    #[error("Entity '{0}' has no camera")]
    NotACamera(String),

    /// Loading or validating configuration failed
    #[error(transparent)]
    Config(#[from] ConfigError),
}
