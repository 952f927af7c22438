use std::{
    cell::RefCell,
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};
use shared::{
    domain::{Coerced, FormatDescriptor, KnobKind},
    error::HostError,
};
use thiserror::Error;
use tracing::debug;

use crate::{FormatRegistry, GraphNode, Knob, NodeGraph};

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to access scene file: {0}")]
    Io(#[from] io::Error),
    #[error("malformed scene file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// In-memory node graph, saved as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default = "default_root_format")]
    pub root_format: FormatDescriptor,
    #[serde(default)]
    pub formats: Vec<FormatDescriptor>,
    #[serde(default)]
    pub nodes: Vec<SceneNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    pub class: String,
    #[serde(default)]
    pub knobs: Vec<SceneKnob>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SceneNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneKnob {
    pub name: String,
    pub kind: KnobKind,
    #[serde(default = "scalar_arity")]
    pub arity: usize,
    #[serde(default)]
    pub value: RefCell<Option<Coerced>>,
    /// Locked knobs reject every write.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub locked: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            root_format: default_root_format(),
            formats: Vec::new(),
            nodes: Vec::new(),
        }
    }
}

fn default_root_format() -> FormatDescriptor {
    FormatDescriptor::new("HD_1080", 1920, 1080)
}

fn scalar_arity() -> usize {
    1
}

impl Scene {
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let reader = BufReader::new(File::open(path)?);
        let scene = serde_json::from_reader(reader)?;
        debug!(path = %path.display(), "loaded scene");
        Ok(scene)
    }

    pub fn save(&self, path: &Path) -> Result<(), SceneError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        debug!(path = %path.display(), "saved scene");
        Ok(())
    }

    pub fn with_node(mut self, node: SceneNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_format(mut self, format: FormatDescriptor) -> Self {
        self.formats.push(format);
        self
    }

    /// Depth-first lookup by node name, group contents included.
    pub fn node(&self, name: &str) -> Option<&SceneNode> {
        fn find<'a>(nodes: &'a [SceneNode], name: &str) -> Option<&'a SceneNode> {
            nodes.iter().find_map(|node| {
                if node.name == name {
                    Some(node)
                } else {
                    find(&node.children, name)
                }
            })
        }
        find(&self.nodes, name)
    }
}

impl SceneNode {
    pub fn new(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            knobs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_knob(mut self, knob: SceneKnob) -> Self {
        self.knobs.push(knob);
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn knob(&self, name: &str) -> Option<&SceneKnob> {
        self.knobs.iter().find(|knob| knob.name == name)
    }

    fn collect<'a>(&'a self, recursive: bool, out: &mut Vec<&'a dyn GraphNode>) {
        out.push(self);
        if recursive {
            for child in &self.children {
                child.collect(recursive, out);
            }
        }
    }
}

impl SceneKnob {
    pub fn new(name: impl Into<String>, kind: KnobKind, arity: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            arity,
            value: RefCell::new(None),
            locked: false,
        }
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn value(&self) -> Option<Coerced> {
        self.value.borrow().clone()
    }
}

impl FormatRegistry for Scene {
    fn list_formats(&self) -> Vec<FormatDescriptor> {
        self.formats.clone()
    }

    fn default_format(&self) -> FormatDescriptor {
        self.root_format.clone()
    }
}

impl NodeGraph for Scene {
    fn enumerate_nodes(&self, recursive: bool) -> Vec<&dyn GraphNode> {
        let mut out = Vec::new();
        for node in &self.nodes {
            node.collect(recursive, &mut out);
        }
        out
    }
}

impl GraphNode for SceneNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn class_name(&self) -> &str {
        &self.class
    }

    fn parameter_names(&self) -> Vec<String> {
        self.knobs.iter().map(|knob| knob.name.clone()).collect()
    }

    fn get_parameter(&self, name: &str) -> Option<&dyn Knob> {
        self.knob(name).map(|knob| knob as &dyn Knob)
    }
}

impl Knob for SceneKnob {
    fn kind_tag(&self) -> KnobKind {
        self.kind.clone()
    }

    fn expected_arity(&self) -> usize {
        self.arity
    }

    fn set_value(&self, value: Coerced) -> Result<(), HostError> {
        if self.locked {
            return Err(HostError::new(format!("knob '{}' is locked", self.name)));
        }
        if let Coerced::Array(values) = &value {
            if values.len() != self.arity {
                return Err(HostError::new(format!(
                    "knob '{}' holds {} values, got {}",
                    self.name,
                    self.arity,
                    values.len()
                )));
            }
        }
        *self.value.borrow_mut() = Some(value);
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/scene_tests.rs"]
mod tests;
