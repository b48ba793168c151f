//! Declarative description of the surface this provider exposes to an
//! orchestrating tool.
//!
//! The host plugin framework owns wire serialization; these types only
//! describe what it should declare: one `kuc_user` resource, one
//! provider configuration block, import by id.

use serde::{Deserialize, Serialize};

/// Resource type name registered with the orchestrator.
pub const USER_RESOURCE_TYPE: &str = "kuc_user";

/// An attribute of a resource or of the provider configuration block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeSchema {
    /// Attribute name as seen in configuration.
    pub name: String,

    /// Whether the practitioner must supply a value.
    #[serde(default)]
    pub required: bool,

    /// Whether the value is computed by the provider.
    #[serde(default)]
    pub computed: bool,

    /// Whether the value must be redacted from plans and logs.
    #[serde(default)]
    pub sensitive: bool,

    /// Whether a known prior value is kept when re-planning with
    /// unknown state, instead of showing as a change.
    #[serde(default)]
    pub use_state_for_unknown: bool,
}

impl AttributeSchema {
    /// A practitioner-supplied required attribute.
    #[must_use]
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
            computed: false,
            sensitive: false,
            use_state_for_unknown: false,
        }
    }

    /// An optional attribute (environment may fill it in).
    #[must_use]
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            computed: false,
            sensitive: false,
            use_state_for_unknown: false,
        }
    }

    /// A provider-computed attribute.
    #[must_use]
    pub fn computed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            computed: true,
            sensitive: false,
            use_state_for_unknown: false,
        }
    }

    /// Marks the attribute sensitive.
    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Keeps the prior known value across unknown-state re-plans.
    #[must_use]
    pub fn preserve_unknown(mut self) -> Self {
        self.use_state_for_unknown = true;
        self
    }
}

/// A managed resource type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSchema {
    /// Type name (e.g. `kuc_user`).
    pub type_name: String,
    /// Attributes of the resource.
    pub attributes: Vec<AttributeSchema>,
    /// Attribute accepted as the import key, if importable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_key: Option<String>,
}

impl ResourceSchema {
    /// Finds an attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// The whole provider surface: configuration block plus resources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSchema {
    /// Attributes of the provider configuration block. All four fall
    /// back to `KEYCLOAK_*` environment variables, hence optional here;
    /// absence from both sources is a configure-time error.
    pub config_attributes: Vec<AttributeSchema>,
    /// Managed resource types.
    pub resources: Vec<ResourceSchema>,
}

/// Builds the surface this provider exposes.
#[must_use]
pub fn provider_schema() -> ProviderSchema {
    ProviderSchema {
        config_attributes: vec![
            AttributeSchema::optional("url"),
            AttributeSchema::optional("realm"),
            AttributeSchema::optional("client_id"),
            AttributeSchema::optional("client_secret").sensitive(),
        ],
        resources: vec![ResourceSchema {
            type_name: USER_RESOURCE_TYPE.to_string(),
            attributes: vec![
                AttributeSchema::required("username"),
                AttributeSchema::computed("id").preserve_unknown(),
            ],
            import_key: Some("id".to_string()),
        }],
    }
}
