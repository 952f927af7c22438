use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Parameter kind as reported by the host. Kinds without a dedicated
/// coercion land in `Other` and are handled as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum KnobKind {
    Boolean,
    ChannelMask,
    Enumeration,
    Integer,
    Format,
    Array,
    Disable,
    Other(String),
}

impl KnobKind {
    pub fn host_tag(&self) -> &str {
        match self {
            KnobKind::Boolean => "Boolean_Knob",
            KnobKind::ChannelMask => "ChannelMask_Knob",
            KnobKind::Enumeration => "Enumeration_Knob",
            KnobKind::Integer => "Int_Knob",
            KnobKind::Format => "Format_Knob",
            KnobKind::Array => "Array_Knob",
            KnobKind::Disable => "Disable_Knob",
            KnobKind::Other(tag) => tag,
        }
    }
}

impl FromStr for KnobKind {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let kind = match raw.trim() {
            "Boolean_Knob" | "boolean" => KnobKind::Boolean,
            "ChannelMask_Knob" | "channel_mask" => KnobKind::ChannelMask,
            "Enumeration_Knob" | "enumeration" => KnobKind::Enumeration,
            "Int_Knob" | "integer" => KnobKind::Integer,
            "Format_Knob" | "format" => KnobKind::Format,
            "Array_Knob" | "array" => KnobKind::Array,
            "Disable_Knob" | "disable" => KnobKind::Disable,
            other => KnobKind::Other(other.to_string()),
        };
        Ok(kind)
    }
}

impl From<String> for KnobKind {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<KnobKind> for String {
    fn from(value: KnobKind) -> Self {
        value.host_tag().to_string()
    }
}

impl fmt::Display for KnobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.host_tag())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KnobValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for KnobValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnobValue::Int(v) => write!(f, "{v}"),
            KnobValue::Float(v) => write!(f, "{v:?}"),
            KnobValue::Text(v) => f.write_str(v),
        }
    }
}

/// A value ready to be handed to a knob: one slot, or one entry per
/// array slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coerced {
    Scalar(KnobValue),
    Array(Vec<KnobValue>),
}

impl fmt::Display for Coerced {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coerced::Scalar(value) => write!(f, "{value}"),
            Coerced::Array(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    pub name: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default = "default_pixel_aspect")]
    pub pixel_aspect: f64,
}

fn default_pixel_aspect() -> f64 {
    1.0
}

impl FormatDescriptor {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            pixel_aspect: default_pixel_aspect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
