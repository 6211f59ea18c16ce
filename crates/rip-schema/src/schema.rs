//! Type schemas: the table format and its compiled, flattened form.
//!
//! A table declares types like this:
//!
//! ```toml
//! [[type]]
//! name = "Renderer"
//! base = "Component"
//! fields = [
//!     { name = "m_Enabled", kind = "bool" },
//!     { name = "m_Materials", kind = "array<pptr>" },
//! ]
//! layout = [
//!     { read = "m_Enabled" },
//!     { align = 4 },
//!     { read = "m_Materials", when = "materials" },
//! ]
//!
//! [type.predicates]
//! materials = { since = "3.0" }
//! ```
//!
//! Field declarations fix the export order; layout steps fix the wire order.

use std::collections::BTreeMap;

use rip_model::Version;
use serde::Deserialize;

use crate::default::{DefaultRule, RawDefault};
use crate::kind::FieldKind;
use crate::predicate::{Condition, VersionRange};
use crate::revision::{RevisionRule, select_revision};

/// A schema table document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawCatalog {
    #[serde(rename = "type", default)]
    pub types: Vec<RawType>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawType {
    pub name: String,
    #[serde(default)]
    pub class_id: Option<i32>,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub flow: bool,
    #[serde(default)]
    pub supported: Option<VersionRange>,
    #[serde(default)]
    pub revisions: Vec<RevisionRule>,
    #[serde(default)]
    pub predicates: BTreeMap<String, VersionRange>,
    #[serde(default)]
    pub fields: Vec<RawField>,
    #[serde(default)]
    pub layout: Vec<RawStep>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawField {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub default: Option<RawDefault>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawStep {
    #[serde(default)]
    pub read: Option<String>,
    #[serde(default)]
    pub align: Option<usize>,
    #[serde(default)]
    pub bitmask: Option<String>,
    #[serde(rename = "as", default)]
    pub wire: Option<String>,
    #[serde(default)]
    pub bits: Option<u8>,
    #[serde(default)]
    pub when: Option<String>,
}

/// A declared field of a compiled type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub(crate) name: String,
    pub(crate) kind: FieldKind,
    pub(crate) default: DefaultRule,
    pub(crate) owner: String,
}

impl FieldDecl {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> &FieldKind {
        &self.kind
    }

    #[must_use]
    pub const fn default(&self) -> &DefaultRule {
        &self.default
    }

    /// Type that declared the field (a base type for inherited fields).
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }
}

/// Operation of a layout step. Field operands index [`TypeSchema::fields`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOp {
    Read { field: usize, wire: FieldKind },
    Align(usize),
    Bitmask { field: usize, bits: u8 },
}

/// A layout step and the condition gating it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub(crate) op: StepOp,
    pub(crate) when: Option<Condition>,
}

impl Step {
    #[must_use]
    pub const fn op(&self) -> &StepOp {
        &self.op
    }

    #[must_use]
    pub const fn condition(&self) -> Option<&Condition> {
        self.when.as_ref()
    }

    /// Whether the step executes at `version`.
    #[must_use]
    pub fn is_enabled(&self, version: &Version) -> bool {
        self.when.as_ref().is_none_or(|when| when.holds(version))
    }

    /// Field the step writes, if any.
    #[must_use]
    pub const fn field(&self) -> Option<usize> {
        match self.op {
            StepOp::Read { field, .. } | StepOp::Bitmask { field, .. } => Some(field),
            StepOp::Align(_) => None,
        }
    }
}

/// Compiled type: base layout first, then the type's own.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSchema {
    pub(crate) name: String,
    pub(crate) class_id: Option<i32>,
    pub(crate) base: Option<String>,
    pub(crate) flow: bool,
    pub(crate) supported: VersionRange,
    pub(crate) revisions: Vec<RevisionRule>,
    pub(crate) fields: Vec<FieldDecl>,
    pub(crate) steps: Vec<Step>,
}

impl TypeSchema {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn class_id(&self) -> Option<i32> {
        self.class_id
    }

    #[must_use]
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Whether records of this type export as inline flow mappings.
    #[must_use]
    pub const fn is_flow(&self) -> bool {
        self.flow
    }

    #[must_use]
    pub const fn supported(&self) -> VersionRange {
        self.supported
    }

    #[must_use]
    pub fn revisions(&self) -> &[RevisionRule] {
        &self.revisions
    }

    /// Flattened field declarations in export order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    /// Flattened layout in wire order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Whether the field at `index` is written at `version`.
    ///
    /// True when any read or bitmask step for the field is enabled.
    #[must_use]
    pub fn is_present_at(&self, index: usize, version: &Version) -> bool {
        self.steps
            .iter()
            .any(|step| step.field() == Some(index) && step.is_enabled(version))
    }

    /// Whether the named field is written at `version`.
    #[must_use]
    pub fn is_present(&self, name: &str, version: &Version) -> bool {
        self.field_index(name)
            .is_some_and(|index| self.is_present_at(index, version))
    }

    /// Whether the type has a layout for `version`.
    ///
    /// Both the supported range and, when declared, the revision rules must
    /// admit the version.
    #[must_use]
    pub fn supports(&self, version: &Version) -> bool {
        self.supported.contains(version)
            && (self.revisions.is_empty() || self.revision(version, false).is_some())
    }

    /// Schema revision to tag exports with, if the type declares any.
    #[must_use]
    pub fn revision(&self, version: &Version, topmost: bool) -> Option<u32> {
        select_revision(&self.revisions, version, topmost)
    }
}

/// Human-readable rendering of a step with field names resolved.
#[must_use]
pub fn describe_step(schema: &TypeSchema, step: &Step) -> String {
    let name = |index: usize| {
        schema
            .fields
            .get(index)
            .map_or("?", |field| field.name.as_str())
    };
    let mut text = match &step.op {
        StepOp::Read { field, wire } => match schema.fields.get(*field) {
            Some(decl) if decl.kind == *wire => format!("read {}", decl.name),
            _ => format!("read {} as {wire}", name(*field)),
        },
        StepOp::Align(alignment) => format!("align {alignment}"),
        StepOp::Bitmask { field, bits } => format!("bitmask {} bits {bits}", name(*field)),
    };
    if let Some(when) = &step.when {
        text.push_str(" when ");
        text.push_str(&when.to_string());
    }
    text
}
