//! Machine-learning model names.

use std::fmt;

use emporium_core::FieldType;
use serde::{Deserialize, Serialize};

/// The closed set of known models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelName {
    /// AlexNet.
    Alexnet,
    /// ResNet.
    Resnet,
    /// LeNet.
    Lenet,
}

impl ModelName {
    /// Every member, in declaration order.
    pub const ALL: [Self; 3] = [Self::Alexnet, Self::Resnet, Self::Lenet];

    /// Returns the wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alexnet => "alexnet",
            Self::Resnet => "resnet",
            Self::Lenet => "lenet",
        }
    }

    /// Returns the enum field type used to bind a model name.
    pub fn field_type() -> FieldType {
        FieldType::enumeration(Self::ALL.iter().map(|m| m.as_str()))
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
