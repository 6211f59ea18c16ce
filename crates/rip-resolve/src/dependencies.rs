//! Dependency enumeration and reachability.

use std::collections::{BTreeSet, VecDeque};

use rip_model::{AssetObject, ObjectId, PPtr, Record, Value};
use rip_schema::SchemaCatalog;
use tracing::debug;

use crate::registry::{Registry, Resolver};

/// A non-null reference found inside an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Location of the pointer, e.g. `m_Component[1].component`.
    pub field: String,
    pub ptr: PPtr,
}

/// Lazily walks one record for the weak references it holds.
///
/// Nested records and arrays are descended into; pointers are never
/// followed. Array items are visited in index order. Fields are visited in
/// the declaration order of their type (base fields first) when a catalog
/// is given and declares the type, otherwise in name order.
#[derive(Debug, Clone)]
pub struct Dependencies<'a> {
    pending: Vec<(String, &'a Value)>,
    catalog: Option<&'a SchemaCatalog>,
}

impl<'a> Dependencies<'a> {
    /// Walk `record` visiting fields in name order.
    #[must_use]
    pub fn new(record: &'a Record) -> Self {
        Self::walk(record, None)
    }

    /// Walk `record` visiting fields in declaration order.
    #[must_use]
    pub fn declared(catalog: &'a SchemaCatalog, record: &'a Record) -> Self {
        Self::walk(record, Some(catalog))
    }

    fn walk(record: &'a Record, catalog: Option<&'a SchemaCatalog>) -> Self {
        let mut dependencies = Self {
            pending: Vec::new(),
            catalog,
        };
        dependencies.push_fields("", record);
        dependencies
    }

    fn push_fields(&mut self, prefix: &str, record: &'a Record) {
        let start = self.pending.len();
        match self.catalog.and_then(|catalog| catalog.get(record.type_name())) {
            Some(schema) => {
                for decl in schema.fields() {
                    if let Some(value) = record.get(decl.name()) {
                        self.push_field(prefix, decl.name(), value);
                    }
                }
                // Undeclared extras follow in name order.
                for (name, value) in record.fields() {
                    if schema.field_index(name).is_none() {
                        self.push_field(prefix, name, value);
                    }
                }
            }
            None => {
                for (name, value) in record.fields() {
                    self.push_field(prefix, name, value);
                }
            }
        }
        self.pending[start..].reverse();
    }

    fn push_field(&mut self, prefix: &str, name: &str, value: &'a Value) {
        if may_hold_pointers(value) {
            let path = if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{prefix}.{name}")
            };
            self.pending.push((path, value));
        }
    }

    fn push_items(&mut self, prefix: &str, items: &'a [Value]) {
        let start = self.pending.len();
        for (index, item) in items.iter().enumerate() {
            if may_hold_pointers(item) {
                self.pending.push((format!("{prefix}[{index}]"), item));
            }
        }
        self.pending[start..].reverse();
    }
}

impl Iterator for Dependencies<'_> {
    type Item = Dependency;

    fn next(&mut self) -> Option<Dependency> {
        while let Some((field, value)) = self.pending.pop() {
            match value {
                Value::PPtr(ptr) if !ptr.is_null() => {
                    return Some(Dependency { field, ptr: *ptr });
                }
                Value::Record(record) => self.push_fields(&field, record),
                Value::Array(items) => self.push_items(&field, items),
                _ => {}
            }
        }
        None
    }
}

fn may_hold_pointers(value: &Value) -> bool {
    matches!(value, Value::PPtr(_) | Value::Record(_) | Value::Array(_))
}

/// One-hop references of `object`, fields in name order.
#[must_use]
pub fn enumerate_dependencies(object: &AssetObject) -> Dependencies<'_> {
    Dependencies::new(&object.data)
}

/// One-hop references of `object`, fields in the declaration order of
/// `catalog`.
#[must_use]
pub fn enumerate_declared_dependencies<'a>(
    catalog: &'a SchemaCatalog,
    object: &'a AssetObject,
) -> Dependencies<'a> {
    Dependencies::declared(catalog, &object.data)
}

/// A reference whose target is not in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub from: ObjectId,
    pub field: String,
    pub ptr: PPtr,
}

/// Everything reachable from one root object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Closure {
    /// Reachable objects in breadth-first order, root first.
    pub reachable: Vec<ObjectId>,
    pub dangling: Vec<DanglingReference>,
}

impl Closure {
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.reachable.contains(&id)
    }
}

/// Breadth-first walk of the references reachable from `root`.
///
/// Each object is visited once, so self-references and cycles terminate.
/// A root that is not in the registry yields an empty closure. References
/// of one object are taken in field name order.
pub fn dependency_closure<R: Registry + ?Sized>(registry: &R, root: ObjectId) -> Closure {
    walk_closure(registry, None, root)
}

/// [`dependency_closure`] taking each object's references in the
/// declaration order of `catalog`.
pub fn declared_dependency_closure<R: Registry + ?Sized>(
    catalog: &SchemaCatalog,
    registry: &R,
    root: ObjectId,
) -> Closure {
    walk_closure(registry, Some(catalog), root)
}

fn walk_closure<R: Registry + ?Sized>(
    registry: &R,
    catalog: Option<&SchemaCatalog>,
    root: ObjectId,
) -> Closure {
    let resolver = Resolver::new(registry);
    let mut closure = Closure::default();
    if registry.object(root.file, root.path_id).is_none() {
        return closure;
    }

    let mut visited = BTreeSet::from([root]);
    let mut queue = VecDeque::from([root]);
    while let Some(id) = queue.pop_front() {
        closure.reachable.push(id);
        let Some(object) = registry.object(id.file, id.path_id) else {
            continue;
        };
        let dependencies = match catalog {
            Some(catalog) => Dependencies::declared(catalog, &object.data),
            None => Dependencies::new(&object.data),
        };
        for Dependency { field, ptr } in dependencies {
            let target = resolver
                .resolve_id(id.file, ptr)
                .filter(|target| registry.object(target.file, target.path_id).is_some());
            match target {
                Some(target) => {
                    if visited.insert(target) {
                        queue.push_back(target);
                    }
                }
                None => {
                    debug!(from = %id, field = %field, %ptr, "dangling reference");
                    closure.dangling.push(DanglingReference {
                        from: id,
                        field,
                        ptr,
                    });
                }
            }
        }
    }
    closure
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ptrs(record: &Record) -> Vec<(String, PPtr)> {
        Dependencies::new(record)
            .map(|dependency| (dependency.field, dependency.ptr))
            .collect()
    }

    #[test]
    fn test_walks_nested_records_and_arrays() {
        let pair = |path_id| {
            Value::Record(
                Record::new("ComponentPair").with("component", Value::PPtr(PPtr::local(path_id))),
            )
        };
        let record = Record::new("GameObject")
            .with("m_Component", Value::Array(vec![pair(4), pair(0), pair(199)]))
            .with("m_Layer", Value::Int(0))
            .with("m_Owner", Value::PPtr(PPtr::new(1, 9)));

        assert_eq!(
            ptrs(&record),
            vec![
                ("m_Component[0].component".to_string(), PPtr::local(4)),
                ("m_Component[2].component".to_string(), PPtr::local(199)),
                ("m_Owner".to_string(), PPtr::new(1, 9)),
            ]
        );
    }

    #[test]
    fn test_declared_order_follows_the_schema() {
        let catalog = SchemaCatalog::from_toml_str(
            r#"
            [[type]]
            name = "Link"
            fields = [{ name = "target", kind = "pptr" }, { name = "anchor", kind = "pptr" }]
            layout = [{ read = "target" }, { read = "anchor" }]

            [[type]]
            name = "Rig"
            fields = [
                { name = "m_Root", kind = "pptr" },
                { name = "m_Links", kind = "array<Link>" },
                { name = "m_Bone", kind = "pptr" },
            ]
            layout = [{ read = "m_Root" }, { read = "m_Links" }, { read = "m_Bone" }]
            "#,
        )
        .unwrap();
        let link = Record::new("Link")
            .with("target", Value::PPtr(PPtr::local(3)))
            .with("anchor", Value::PPtr(PPtr::local(4)));
        let record = Record::new("Rig")
            .with("m_Root", Value::PPtr(PPtr::local(1)))
            .with("m_Links", Value::Array(vec![Value::Record(link)]))
            .with("m_Bone", Value::PPtr(PPtr::local(2)))
            .with("m_Extra", Value::PPtr(PPtr::local(5)));

        let declared: Vec<String> = Dependencies::declared(&catalog, &record)
            .map(|dependency| dependency.field)
            .collect();
        assert_eq!(
            declared,
            [
                "m_Root",
                "m_Links[0].target",
                "m_Links[0].anchor",
                "m_Bone",
                "m_Extra"
            ]
        );

        let by_name: Vec<String> = ptrs(&record).into_iter().map(|(field, _)| field).collect();
        assert_eq!(
            by_name,
            [
                "m_Bone",
                "m_Extra",
                "m_Links[0].anchor",
                "m_Links[0].target",
                "m_Root"
            ]
        );
    }

    #[test]
    fn test_null_pointers_are_skipped() {
        let record = Record::new("Renderer")
            .with("m_Materials", Value::Array(vec![Value::PPtr(PPtr::NULL)]))
            .with("m_GameObject", Value::PPtr(PPtr::NULL));
        assert!(ptrs(&record).is_empty());
    }
}
