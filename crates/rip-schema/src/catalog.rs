//! Schema catalog: loading, validation and lookup.
//!
//! Tables are compiled once into flattened [`TypeSchema`]s. A compiled
//! catalog is immutable; merging two catalogs builds a new one.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::OnceLock;

use tracing::debug;

use crate::default::{DefaultRule, RawDefault, literal_value};
use crate::error::{SchemaError, SchemaResult};
use crate::kind::FieldKind;
use crate::predicate::{Condition, VersionRange};
use crate::schema::{FieldDecl, RawCatalog, RawField, RawStep, RawType, Step, StepOp, TypeSchema};

/// Built-in type table, embedded at compile time.
pub const BUILTIN_SCHEMAS: &str = include_str!("../schemas/builtin.toml");

static BUILTIN: OnceLock<SchemaCatalog> = OnceLock::new();

/// A validated set of type schemas.
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    raw: Vec<RawType>,
    types: BTreeMap<String, TypeSchema>,
    class_ids: BTreeMap<i32, String>,
}

impl SchemaCatalog {
    /// Compile a schema table from TOML text.
    pub fn from_toml_str(text: &str) -> SchemaResult<Self> {
        Self::parse(text, "<inline>")
    }

    /// Read and compile a schema table file.
    pub fn from_path(path: &Path) -> SchemaResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| SchemaError::io(path, e))?;
        Self::parse(&text, &path.display().to_string())
    }

    /// The built-in catalog, compiled on first use.
    pub fn builtin() -> SchemaResult<&'static Self> {
        if let Some(catalog) = BUILTIN.get() {
            return Ok(catalog);
        }
        let catalog = Self::parse(BUILTIN_SCHEMAS, "builtin.toml")?;
        Ok(BUILTIN.get_or_init(|| catalog))
    }

    /// Catalog holding the types of both; types in `other` replace same-named
    /// types in `self`.
    pub fn merged_with(&self, other: &Self) -> SchemaResult<Self> {
        let replaced: BTreeSet<&str> = other.raw.iter().map(|t| t.name.as_str()).collect();
        let raw = self
            .raw
            .iter()
            .filter(|t| !replaced.contains(t.name.as_str()))
            .chain(other.raw.iter())
            .cloned()
            .collect();
        Self::compile(raw)
    }

    fn parse(text: &str, origin: &str) -> SchemaResult<Self> {
        let document: RawCatalog = toml::from_str(text).map_err(|source| SchemaError::Toml {
            origin: origin.to_string(),
            source,
        })?;
        let catalog = Self::compile(document.types)?;
        debug!(origin, types = catalog.len(), "compiled schema catalog");
        Ok(catalog)
    }

    fn compile(raw: Vec<RawType>) -> SchemaResult<Self> {
        let mut compiler = Compiler::new(&raw)?;
        for ty in &raw {
            compiler.compile_type(ty)?;
        }
        let types = compiler.done;
        check_record_cycles(&types)?;

        let mut class_ids: BTreeMap<i32, String> = BTreeMap::new();
        for ty in &raw {
            if let Some(class_id) = ty.class_id
                && let Some(first) = class_ids.insert(class_id, ty.name.clone())
            {
                return Err(SchemaError::DuplicateClassId {
                    class_id,
                    first,
                    second: ty.name.clone(),
                });
            }
        }

        Ok(Self {
            raw,
            types,
            class_ids,
        })
    }

    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&TypeSchema> {
        self.types.get(type_name)
    }

    #[must_use]
    pub fn by_class_id(&self, class_id: i32) -> Option<&TypeSchema> {
        self.class_ids
            .get(&class_id)
            .and_then(|name| self.types.get(name))
    }

    /// Type names in sorted order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeSchema> {
        self.types.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

struct Compiler<'a> {
    raw: BTreeMap<&'a str, &'a RawType>,
    done: BTreeMap<String, TypeSchema>,
    visiting: Vec<String>,
}

impl<'a> Compiler<'a> {
    fn new(types: &'a [RawType]) -> SchemaResult<Self> {
        let mut raw = BTreeMap::new();
        for ty in types {
            if raw.insert(ty.name.as_str(), ty).is_some() {
                return Err(SchemaError::DuplicateType {
                    type_name: ty.name.clone(),
                });
            }
        }
        Ok(Self {
            raw,
            done: BTreeMap::new(),
            visiting: Vec::new(),
        })
    }

    fn compile_type(&mut self, raw: &'a RawType) -> SchemaResult<()> {
        if self.done.contains_key(&raw.name) {
            return Ok(());
        }
        if self.visiting.contains(&raw.name) {
            return Err(SchemaError::BaseCycle {
                type_name: raw.name.clone(),
            });
        }

        let (mut fields, mut steps, inherited) = match &raw.base {
            Some(base) => {
                let Some(&base_raw) = self.raw.get(base.as_str()) else {
                    return Err(SchemaError::UnknownBase {
                        type_name: raw.name.clone(),
                        base: base.clone(),
                    });
                };
                self.visiting.push(raw.name.clone());
                let compiled = self.compile_type(base_raw);
                self.visiting.pop();
                compiled?;
                let base = &self.done[base.as_str()];
                (base.fields.clone(), base.steps.clone(), base.supported)
            }
            None => (Vec::new(), Vec::new(), VersionRange::ALL),
        };

        for field in &raw.fields {
            let decl = self.compile_field(raw, field, &fields)?;
            fields.push(decl);
        }
        for (index, step) in raw.layout.iter().enumerate() {
            steps.push(compile_step(raw, index, step, &fields)?);
        }

        let schema = TypeSchema {
            name: raw.name.clone(),
            class_id: raw.class_id,
            base: raw.base.clone(),
            flow: raw.flow,
            supported: raw.supported.unwrap_or(inherited),
            revisions: raw.revisions.clone(),
            fields,
            steps,
        };
        self.done.insert(raw.name.clone(), schema);
        Ok(())
    }

    fn compile_field(
        &self,
        owner: &RawType,
        field: &RawField,
        earlier: &[FieldDecl],
    ) -> SchemaResult<FieldDecl> {
        if earlier.iter().any(|decl| decl.name == field.name) {
            return Err(SchemaError::DuplicateField {
                type_name: owner.name.clone(),
                field: field.name.clone(),
            });
        }
        let kind: FieldKind = field
            .kind
            .parse()
            .map_err(|_| SchemaError::InvalidKind {
                type_name: owner.name.clone(),
                field: field.name.clone(),
                kind: field.kind.clone(),
            })?;
        if let Some(record) = kind.record_name()
            && !self.raw.contains_key(record)
        {
            return Err(SchemaError::UnknownRecordType {
                type_name: owner.name.clone(),
                field: field.name.clone(),
                record: record.to_string(),
            });
        }
        let default = compile_default(owner, field, &kind, earlier)?;
        Ok(FieldDecl {
            name: field.name.clone(),
            kind,
            default,
            owner: owner.name.clone(),
        })
    }
}

fn compile_default(
    owner: &RawType,
    field: &RawField,
    kind: &FieldKind,
    earlier: &[FieldDecl],
) -> SchemaResult<DefaultRule> {
    let invalid = |message: String| SchemaError::default(&owner.name, &field.name, message);
    match &field.default {
        None => Ok(DefaultRule::Zero),
        Some(RawDefault::Literal(literal)) => literal_value(kind, literal)
            .map(DefaultRule::Literal)
            .map_err(invalid),
        Some(RawDefault::Derived(derived)) => {
            let Some(source) = earlier.iter().find(|decl| decl.name == derived.field) else {
                return Err(SchemaError::UnknownField {
                    type_name: owner.name.clone(),
                    field: derived.field.clone(),
                });
            };
            if !source.kind.is_integer() {
                return Err(invalid(format!(
                    "`{}` is {}, not an integer",
                    source.name, source.kind
                )));
            }
            let cases = derived
                .cases
                .iter()
                .map(|case| literal_value(kind, &case.value).map(|value| (case.when, value)))
                .collect::<Result<Vec<_>, String>>()
                .map_err(invalid)?;
            let otherwise = literal_value(kind, &derived.otherwise).map_err(invalid)?;
            Ok(DefaultRule::Derived {
                field: derived.field.clone(),
                cases,
                otherwise,
            })
        }
    }
}

fn compile_step(
    owner: &RawType,
    index: usize,
    step: &RawStep,
    fields: &[FieldDecl],
) -> SchemaResult<Step> {
    let name = owner.name.as_str();
    let field_index = |field: &str| {
        fields
            .iter()
            .position(|decl| decl.name == field)
            .ok_or_else(|| SchemaError::UnknownField {
                type_name: name.to_string(),
                field: field.to_string(),
            })
    };

    let op = match (&step.read, step.align, &step.bitmask) {
        (Some(field), None, None) => {
            if step.bits.is_some() {
                return Err(SchemaError::step(name, index, "`bits` only applies to bitmask"));
            }
            let field = field_index(field)?;
            let kind = &fields[field].kind;
            let wire = match &step.wire {
                None => kind.clone(),
                Some(text) => {
                    let wire: FieldKind = text
                        .parse()
                        .map_err(|message: String| SchemaError::step(name, index, message))?;
                    if !wire.is_scalar() || !kind.accepts_wire(&wire) {
                        return Err(SchemaError::step(
                            name,
                            index,
                            format!("{kind} field cannot be read as {wire}"),
                        ));
                    }
                    wire
                }
            };
            StepOp::Read { field, wire }
        }
        (None, Some(alignment), None) => {
            if step.wire.is_some() || step.bits.is_some() {
                return Err(SchemaError::step(name, index, "align takes no operands"));
            }
            if !alignment.is_power_of_two() {
                return Err(SchemaError::InvalidAlignment {
                    type_name: name.to_string(),
                    alignment,
                });
            }
            StepOp::Align(alignment)
        }
        (None, None, Some(field)) => {
            if step.wire.is_some() {
                return Err(SchemaError::step(name, index, "bitmask is always read as i32"));
            }
            let bits = step
                .bits
                .filter(|bits| (1..=32).contains(bits))
                .ok_or_else(|| SchemaError::step(name, index, "bitmask needs `bits` in 1..=32"))?;
            let field = field_index(field)?;
            if fields[field].kind != FieldKind::Bytes {
                return Err(SchemaError::step(
                    name,
                    index,
                    format!("bitmask target `{}` must be bytes", fields[field].name),
                ));
            }
            StepOp::Bitmask { field, bits }
        }
        _ => {
            return Err(SchemaError::step(
                name,
                index,
                "expected exactly one of `read`, `align` or `bitmask`",
            ));
        }
    };

    let when = step
        .when
        .as_deref()
        .map(|reference| {
            let (predicate, negated) = Condition::parse_reference(reference);
            owner
                .predicates
                .get(predicate)
                .map(|range| Condition::new(predicate, *range, negated))
                .ok_or_else(|| SchemaError::UnknownPredicate {
                    type_name: name.to_string(),
                    predicate: predicate.to_string(),
                })
        })
        .transpose()?;

    Ok(Step { op, when })
}

/// Reject records that contain themselves without an array in between.
fn check_record_cycles(types: &BTreeMap<String, TypeSchema>) -> SchemaResult<()> {
    fn reaches(
        types: &BTreeMap<String, TypeSchema>,
        from: &str,
        target: &str,
        seen: &mut BTreeSet<String>,
    ) -> bool {
        let Some(schema) = types.get(from) else {
            return false;
        };
        schema.fields.iter().any(|field| match &field.kind {
            FieldKind::Record(record) => {
                record == target
                    || (seen.insert(record.clone()) && reaches(types, record, target, seen))
            }
            _ => false,
        })
    }

    for (name, schema) in types {
        for field in &schema.fields {
            if let FieldKind::Record(record) = &field.kind {
                let mut seen = BTreeSet::new();
                if record == name || reaches(types, record, name, &mut seen) {
                    return Err(SchemaError::RecordCycle {
                        type_name: name.clone(),
                        field: field.name.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}
