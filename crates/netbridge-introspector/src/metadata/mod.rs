//! CLR metadata provider.
//!
//! Reads the ECMA-335 metadata embedded in a managed PE image: the type,
//! method, nesting and generic parameter tables plus the heaps they point
//! into. Nothing in the image is executed.

mod heaps;
mod pe;
mod reader;
mod signature;
mod tables;

use crate::provider::ComponentProvider;
use crate::types::{ComponentMetadata, MemberMetadata, TypeKind, TypeMetadata, Visibility};
use heaps::{BlobHeap, Streams, StringsHeap};
use netbridge_core::{Error, Result};
use signature::{GenericOwner, TypeResolver};
use std::collections::HashMap;
use std::path::Path;
use tables::{Coded, Table, TableStream};
use thiserror::Error;

/// Low-level failure while decoding an image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum MetadataError {
    #[error("not a managed image: {0}")]
    NotManaged(String),

    #[error("truncated image: {len} byte(s) needed at offset 0x{offset:X}")]
    Truncated { offset: usize, len: usize },

    #[error("malformed metadata: {0}")]
    Malformed(String),

    #[error("{table} index {row} is out of range")]
    InvalidIndex { table: &'static str, row: u32 },

    #[error("unsupported metadata table 0x{0:02X}")]
    UnsupportedTable(usize),
}

const TYPE_INTERFACE: u32 = 0x0000_0020;

const METHOD_ACCESS_MASK: u32 = 0x0007;
const METHOD_STATIC: u32 = 0x0010;
const METHOD_SPECIAL_NAME: u32 = 0x0800;

const MODULE_TYPE: &str = "<Module>";
const MAX_NESTING: usize = 32;

// TypeDef columns
const TYPEDEF_FLAGS: usize = 0;
const TYPEDEF_NAME: usize = 1;
const TYPEDEF_NAMESPACE: usize = 2;
const TYPEDEF_EXTENDS: usize = 3;
const TYPEDEF_METHODS: usize = 5;

// MethodDef columns
const METHOD_FLAGS: usize = 2;
const METHOD_NAME: usize = 3;
const METHOD_SIGNATURE: usize = 4;

/// Reads components from managed `.dll`/`.exe` images.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClrMetadataProvider;

impl ClrMetadataProvider {
    /// Creates the provider.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds the component description from an in-memory image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoadable`] if `image` is not a managed PE image
    /// or its metadata is structurally broken, and
    /// [`Error::PartialTypeLoad`] if some types or members could not be
    /// resolved. The latter lists every failure.
    pub fn parse(path: &Path, image: &[u8]) -> Result<ComponentMetadata> {
        let not_loadable = |e: MetadataError| Error::NotLoadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let root = pe::metadata_root(image).map_err(not_loadable)?;
        let streams = Streams::parse(root).map_err(not_loadable)?;
        let tables = TableStream::parse(streams.tables).map_err(not_loadable)?;
        let model = Model::new(tables, streams.strings, streams.blobs).map_err(not_loadable)?;

        let (types, causes) = model.types();
        if !causes.is_empty() {
            for cause in &causes {
                tracing::debug!("unresolved: {cause}");
            }
            return Err(Error::PartialTypeLoad {
                path: path.to_path_buf(),
                causes,
            });
        }

        tracing::debug!(
            runtime = streams.version,
            types = types.len(),
            "read CLR metadata from {}",
            path.display()
        );

        Ok(ComponentMetadata {
            runtime_version: Some(streams.version.to_string()),
            assembly: None,
            types,
        })
    }
}

impl ComponentProvider for ClrMetadataProvider {
    fn name(&self) -> &'static str {
        "clr-metadata"
    }

    fn load(&self, path: &Path) -> Result<ComponentMetadata> {
        let image = std::fs::read(path).map_err(|e| Error::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(path, &image)
    }
}

/// Tables and heaps plus the cross-table indexes built once per image.
struct Model<'a> {
    tables: TableStream<'a>,
    strings: StringsHeap<'a>,
    blobs: BlobHeap<'a>,
    /// nested TypeDef row -> enclosing TypeDef row
    enclosing: HashMap<u32, u32>,
    /// owner -> (number, name)
    generics: HashMap<(Table, u32), Vec<(u32, &'a str)>>,
}

impl<'a> Model<'a> {
    fn new(
        tables: TableStream<'a>,
        strings: StringsHeap<'a>,
        blobs: BlobHeap<'a>,
    ) -> std::result::Result<Self, MetadataError> {
        let mut enclosing = HashMap::new();
        for row in 1..=tables.row_count(Table::NestedClass) {
            enclosing.insert(
                tables.get(Table::NestedClass, row, 0)?,
                tables.get(Table::NestedClass, row, 1)?,
            );
        }

        let mut generics: HashMap<(Table, u32), Vec<(u32, &'a str)>> = HashMap::new();
        for row in 1..=tables.row_count(Table::GenericParam) {
            let number = tables.get(Table::GenericParam, row, 0)?;
            let owner = Coded::TypeOrMethodDef.decode(tables.get(Table::GenericParam, row, 2)?)?;
            let name = strings.get(tables.get(Table::GenericParam, row, 3)?)?;
            generics.entry(owner).or_default().push((number, name));
        }

        Ok(Self {
            tables,
            strings,
            blobs,
            enclosing,
            generics,
        })
    }

    /// Every declared type except `<Module>`, plus one cause per failure.
    fn types(&self) -> (Vec<TypeMetadata>, Vec<String>) {
        let mut types = Vec::new();
        let mut causes = Vec::new();

        for row in 1..=self.tables.row_count(Table::TypeDef) {
            match self.type_definition(row, &mut causes) {
                Ok(Some(declared)) => types.push(declared),
                Ok(None) => {}
                Err(e) => causes.push(format!("type #{row}: {e}")),
            }
        }

        (types, causes)
    }

    fn type_definition(
        &self,
        row: u32,
        causes: &mut Vec<String>,
    ) -> std::result::Result<Option<TypeMetadata>, MetadataError> {
        let (namespace, name) = self.typedef_name(row, 0)?;
        if namespace.is_empty() && name == MODULE_TYPE {
            return Ok(None);
        }

        let flags = self.tables.get(Table::TypeDef, row, TYPEDEF_FLAGS)?;
        let kind = self.type_kind(row, flags)?;
        let owner = join(&namespace, &name);

        let mut members = Vec::new();
        for method_row in self.method_rows(row)? {
            let method_name = match self
                .tables
                .get(Table::MethodDef, method_row, METHOD_NAME)
                .and_then(|index| self.strings.get(index))
            {
                Ok(method_name) => method_name,
                Err(e) => {
                    causes.push(format!("{owner} method #{method_row}: {e}"));
                    continue;
                }
            };
            match self.method(row, method_row, method_name) {
                Ok(member) => members.push(member),
                Err(e) => causes.push(format!("{owner}.{method_name}: {e}")),
            }
        }

        Ok(Some(TypeMetadata {
            namespace,
            name,
            kind,
            members,
        }))
    }

    fn method(
        &self,
        type_row: u32,
        method_row: u32,
        name: &str,
    ) -> std::result::Result<MemberMetadata, MetadataError> {
        let flags = self.tables.get(Table::MethodDef, method_row, METHOD_FLAGS)?;
        let blob = self
            .blobs
            .get(self.tables.get(Table::MethodDef, method_row, METHOD_SIGNATURE)?)?;
        let scope = Scope {
            model: self,
            type_row,
            method_row,
        };
        let signature = signature::method_signature(blob, &scope)?;

        Ok(MemberMetadata {
            name: name.to_string(),
            visibility: visibility(flags),
            is_static: flags & METHOD_STATIC != 0,
            is_special: flags & METHOD_SPECIAL_NAME != 0,
            return_type: signature.return_type,
            parameter_types: signature.parameters,
        })
    }

    /// MethodDef rows owned by a TypeDef, following `MethodPtr` when present.
    fn method_rows(&self, type_row: u32) -> std::result::Result<Vec<u32>, MetadataError> {
        let indirect = self.tables.row_count(Table::MethodPtr) > 0;
        let len = if indirect {
            self.tables.row_count(Table::MethodPtr)
        } else {
            self.tables.row_count(Table::MethodDef)
        };

        let start = self
            .tables
            .get(Table::TypeDef, type_row, TYPEDEF_METHODS)?
            .max(1);
        let end = if type_row < self.tables.row_count(Table::TypeDef) {
            self.tables
                .get(Table::TypeDef, type_row + 1, TYPEDEF_METHODS)?
        } else {
            len + 1
        }
        .min(len + 1);

        (start..end)
            .map(|i| {
                if indirect {
                    self.tables.get(Table::MethodPtr, i, 0)
                } else {
                    Ok(i)
                }
            })
            .collect()
    }

    /// `(namespace, name)` of a TypeDef; nested types read `Outer+Inner`
    /// and take the namespace of their outermost enclosing type.
    fn typedef_name(
        &self,
        row: u32,
        depth: usize,
    ) -> std::result::Result<(String, String), MetadataError> {
        if depth > MAX_NESTING {
            return Err(MetadataError::Malformed("type nesting cycle".to_string()));
        }
        let name = self
            .strings
            .get(self.tables.get(Table::TypeDef, row, TYPEDEF_NAME)?)?;

        match self.enclosing.get(&row) {
            Some(&outer) => {
                let (namespace, outer_name) = self.typedef_name(outer, depth + 1)?;
                Ok((namespace, format!("{outer_name}+{name}")))
            }
            None => {
                let namespace = self
                    .strings
                    .get(self.tables.get(Table::TypeDef, row, TYPEDEF_NAMESPACE)?)?;
                Ok((namespace.to_string(), name.to_string()))
            }
        }
    }

    fn typeref_name(&self, row: u32, depth: usize) -> std::result::Result<String, MetadataError> {
        if depth > MAX_NESTING {
            return Err(MetadataError::Malformed("type reference cycle".to_string()));
        }
        let name = self.strings.get(self.tables.get(Table::TypeRef, row, 1)?)?;

        let scope = self.tables.get(Table::TypeRef, row, 0)?;
        if scope != 0
            && let (Table::TypeRef, outer) = Coded::ResolutionScope.decode(scope)?
            && outer != 0
        {
            return Ok(format!("{}+{name}", self.typeref_name(outer, depth + 1)?));
        }

        let namespace = self.strings.get(self.tables.get(Table::TypeRef, row, 2)?)?;
        Ok(join(namespace, name))
    }

    fn type_kind(&self, row: u32, flags: u32) -> std::result::Result<TypeKind, MetadataError> {
        if flags & TYPE_INTERFACE != 0 {
            return Ok(TypeKind::Interface);
        }

        let extends = self.tables.get(Table::TypeDef, row, TYPEDEF_EXTENDS)?;
        let base = match Coded::TypeDefOrRef.decode(extends)? {
            (_, 0) => return Ok(TypeKind::Class),
            (Table::TypeDef, base) => {
                let (namespace, name) = self.typedef_name(base, 0)?;
                join(&namespace, &name)
            }
            (Table::TypeRef, base) => self.typeref_name(base, 0)?,
            // Generic instantiations are never one of the special bases.
            _ => return Ok(TypeKind::Class),
        };

        Ok(match base.as_str() {
            "System.Enum" => TypeKind::Enum,
            "System.ValueType" => TypeKind::Struct,
            "System.MulticastDelegate" | "System.Delegate" => TypeKind::Delegate,
            _ => TypeKind::Class,
        })
    }
}

/// Resolves signature tokens in the context of one method.
struct Scope<'m, 'a> {
    model: &'m Model<'a>,
    type_row: u32,
    method_row: u32,
}

impl TypeResolver for Scope<'_, '_> {
    fn resolve(&self, table: Table, row: u32, depth: usize) -> std::result::Result<String, MetadataError> {
        if row == 0 {
            return Err(MetadataError::Malformed("null type reference".to_string()));
        }
        let model = self.model;
        match table {
            Table::TypeDef => {
                let (namespace, name) = model.typedef_name(row, 0)?;
                Ok(join(&namespace, &name))
            }
            Table::TypeRef => model.typeref_name(row, 0),
            Table::TypeSpec => {
                let blob = model.blobs.get(model.tables.get(Table::TypeSpec, row, 0)?)?;
                signature::type_spec(blob, self, depth)
            }
            other => Err(MetadataError::Malformed(format!(
                "{} is not a type table",
                other.name()
            ))),
        }
    }

    fn generic_param(&self, owner: GenericOwner, index: u32) -> Option<String> {
        let key = match owner {
            GenericOwner::Type => (Table::TypeDef, self.type_row),
            GenericOwner::Method => (Table::MethodDef, self.method_row),
        };
        self.model
            .generics
            .get(&key)?
            .iter()
            .find(|(number, _)| *number == index)
            .map(|(_, name)| (*name).to_string())
    }
}

const fn visibility(flags: u32) -> Visibility {
    match flags & METHOD_ACCESS_MASK {
        2 => Visibility::FamilyAndAssembly,
        3 => Visibility::Assembly,
        4 => Visibility::Family,
        5 => Visibility::FamilyOrAssembly,
        6 => Visibility::Public,
        // Private and compiler-controlled
        _ => Visibility::Private,
    }
}

fn join(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_from_access_mask() {
        assert_eq!(visibility(0x0006), Visibility::Public);
        assert_eq!(visibility(0x0016), Visibility::Public);
        assert_eq!(visibility(0x0001), Visibility::Private);
        assert_eq!(visibility(0x0000), Visibility::Private);
        assert_eq!(visibility(0x0003), Visibility::Assembly);
        assert_eq!(visibility(0x0004), Visibility::Family);
    }

    #[test]
    fn test_join() {
        assert_eq!(join("Demo", "Calc"), "Demo.Calc");
        assert_eq!(join("", "Calc"), "Calc");
    }

    #[test]
    fn test_non_pe_is_not_loadable() {
        let err = ClrMetadataProvider::parse(Path::new("notes.txt"), b"plain text").unwrap_err();
        assert!(err.is_not_loadable());
        assert!(err.to_string().contains("MZ"));
    }

    #[test]
    fn test_missing_file_is_load_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = ClrMetadataProvider::new()
            .load(&dir.path().join("absent.dll"))
            .unwrap_err();
        assert!(matches!(err, Error::LoadFailed { .. }));
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(ClrMetadataProvider::new().name(), "clr-metadata");
    }
}
