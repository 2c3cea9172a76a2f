//! The `#~` table stream (ECMA-335 II.24.2.6 and II.22).
//!
//! Row sizes depend on the row counts of other tables and on the heap size
//! flags, so every table present in the image has to be laid out even when
//! only a few are read.

use super::MetadataError;
use super::reader::{uint_at, u32_at, u64_at};

/// Table identifiers (II.22).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub(crate) enum Table {
    Module = 0x00,
    TypeRef = 0x01,
    TypeDef = 0x02,
    FieldPtr = 0x03,
    Field = 0x04,
    MethodPtr = 0x05,
    MethodDef = 0x06,
    ParamPtr = 0x07,
    Param = 0x08,
    InterfaceImpl = 0x09,
    MemberRef = 0x0A,
    Constant = 0x0B,
    CustomAttribute = 0x0C,
    FieldMarshal = 0x0D,
    DeclSecurity = 0x0E,
    ClassLayout = 0x0F,
    FieldLayout = 0x10,
    StandAloneSig = 0x11,
    EventMap = 0x12,
    EventPtr = 0x13,
    Event = 0x14,
    PropertyMap = 0x15,
    PropertyPtr = 0x16,
    Property = 0x17,
    MethodSemantics = 0x18,
    MethodImpl = 0x19,
    ModuleRef = 0x1A,
    TypeSpec = 0x1B,
    ImplMap = 0x1C,
    FieldRva = 0x1D,
    EncLog = 0x1E,
    EncMap = 0x1F,
    Assembly = 0x20,
    AssemblyProcessor = 0x21,
    AssemblyOs = 0x22,
    AssemblyRef = 0x23,
    AssemblyRefProcessor = 0x24,
    AssemblyRefOs = 0x25,
    File = 0x26,
    ExportedType = 0x27,
    ManifestResource = 0x28,
    NestedClass = 0x29,
    GenericParam = 0x2A,
    MethodSpec = 0x2B,
    GenericParamConstraint = 0x2C,
}

const TABLE_COUNT: usize = 0x2D;

/// Coded index kinds (II.24.2.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Coded {
    TypeDefOrRef,
    HasConstant,
    HasCustomAttribute,
    HasFieldMarshal,
    HasDeclSecurity,
    MemberRefParent,
    HasSemantics,
    MethodDefOrRef,
    MemberForwarded,
    Implementation,
    CustomAttributeType,
    ResolutionScope,
    TypeOrMethodDef,
}

impl Coded {
    const fn tag_bits(self) -> u32 {
        match self {
            Self::HasFieldMarshal
            | Self::HasSemantics
            | Self::MethodDefOrRef
            | Self::MemberForwarded
            | Self::TypeOrMethodDef => 1,
            Self::TypeDefOrRef
            | Self::HasConstant
            | Self::HasDeclSecurity
            | Self::Implementation
            | Self::ResolutionScope => 2,
            Self::MemberRefParent | Self::CustomAttributeType => 3,
            Self::HasCustomAttribute => 5,
        }
    }

    /// Tables addressed by the tag values, in tag order. `None` marks unused tags.
    const fn targets(self) -> &'static [Option<Table>] {
        use Table as T;
        match self {
            Self::TypeDefOrRef => &[Some(T::TypeDef), Some(T::TypeRef), Some(T::TypeSpec)],
            Self::HasConstant => &[Some(T::Field), Some(T::Param), Some(T::Property)],
            Self::HasCustomAttribute => &[
                Some(T::MethodDef),
                Some(T::Field),
                Some(T::TypeRef),
                Some(T::TypeDef),
                Some(T::Param),
                Some(T::InterfaceImpl),
                Some(T::MemberRef),
                Some(T::Module),
                Some(T::DeclSecurity),
                Some(T::Property),
                Some(T::Event),
                Some(T::StandAloneSig),
                Some(T::ModuleRef),
                Some(T::TypeSpec),
                Some(T::Assembly),
                Some(T::AssemblyRef),
                Some(T::File),
                Some(T::ExportedType),
                Some(T::ManifestResource),
                Some(T::GenericParam),
                Some(T::GenericParamConstraint),
                Some(T::MethodSpec),
            ],
            Self::HasFieldMarshal => &[Some(T::Field), Some(T::Param)],
            Self::HasDeclSecurity => &[Some(T::TypeDef), Some(T::MethodDef), Some(T::Assembly)],
            Self::MemberRefParent => &[
                Some(T::TypeDef),
                Some(T::TypeRef),
                Some(T::ModuleRef),
                Some(T::MethodDef),
                Some(T::TypeSpec),
            ],
            Self::HasSemantics => &[Some(T::Event), Some(T::Property)],
            Self::MethodDefOrRef => &[Some(T::MethodDef), Some(T::MemberRef)],
            Self::MemberForwarded => &[Some(T::Field), Some(T::MethodDef)],
            Self::Implementation => &[Some(T::File), Some(T::AssemblyRef), Some(T::ExportedType)],
            Self::CustomAttributeType => &[None, None, Some(T::MethodDef), Some(T::MemberRef), None],
            Self::ResolutionScope => &[
                Some(T::Module),
                Some(T::ModuleRef),
                Some(T::AssemblyRef),
                Some(T::TypeRef),
            ],
            Self::TypeOrMethodDef => &[Some(T::TypeDef), Some(T::MethodDef)],
        }
    }

    /// Splits a raw coded value into its target table and 1-based row.
    ///
    /// A zero row is a null reference.
    pub(crate) fn decode(self, raw: u32) -> Result<(Table, u32), MetadataError> {
        let bits = self.tag_bits();
        let tag = (raw & ((1 << bits) - 1)) as usize;
        let row = raw >> bits;
        self.targets()
            .get(tag)
            .copied()
            .flatten()
            .map(|table| (table, row))
            .ok_or_else(|| MetadataError::Malformed(format!("invalid {self:?} tag {tag}")))
    }
}

/// Column kinds of the physical schema.
#[derive(Debug, Clone, Copy)]
enum Col {
    U16,
    U32,
    Str,
    Guid,
    Blob,
    Index(Table),
    Coded(Coded),
}

fn schema(table: Table) -> &'static [Col] {
    use Col::{Blob, Guid, Index, Str, U16, U32};
    use Col::Coded as C;
    use Table as T;
    match table {
        T::Module => &[U16, Str, Guid, Guid, Guid],
        T::TypeRef => &[C(Coded::ResolutionScope), Str, Str],
        T::TypeDef => &[U32, Str, Str, C(Coded::TypeDefOrRef), Index(T::Field), Index(T::MethodDef)],
        T::FieldPtr => &[Index(T::Field)],
        T::Field => &[U16, Str, Blob],
        T::MethodPtr => &[Index(T::MethodDef)],
        T::MethodDef => &[U32, U16, U16, Str, Blob, Index(T::Param)],
        T::ParamPtr => &[Index(T::Param)],
        T::Param => &[U16, U16, Str],
        T::InterfaceImpl => &[Index(T::TypeDef), C(Coded::TypeDefOrRef)],
        T::MemberRef => &[C(Coded::MemberRefParent), Str, Blob],
        // Type is a byte followed by a padding byte.
        T::Constant => &[U16, C(Coded::HasConstant), Blob],
        T::CustomAttribute => &[C(Coded::HasCustomAttribute), C(Coded::CustomAttributeType), Blob],
        T::FieldMarshal => &[C(Coded::HasFieldMarshal), Blob],
        T::DeclSecurity => &[U16, C(Coded::HasDeclSecurity), Blob],
        T::ClassLayout => &[U16, U32, Index(T::TypeDef)],
        T::FieldLayout => &[U32, Index(T::Field)],
        T::StandAloneSig => &[Blob],
        T::EventMap => &[Index(T::TypeDef), Index(T::Event)],
        T::EventPtr => &[Index(T::Event)],
        T::Event => &[U16, Str, C(Coded::TypeDefOrRef)],
        T::PropertyMap => &[Index(T::TypeDef), Index(T::Property)],
        T::PropertyPtr => &[Index(T::Property)],
        T::Property => &[U16, Str, Blob],
        T::MethodSemantics => &[U16, Index(T::MethodDef), C(Coded::HasSemantics)],
        T::MethodImpl => &[Index(T::TypeDef), C(Coded::MethodDefOrRef), C(Coded::MethodDefOrRef)],
        T::ModuleRef => &[Str],
        T::TypeSpec => &[Blob],
        T::ImplMap => &[U16, C(Coded::MemberForwarded), Str, Index(T::ModuleRef)],
        T::FieldRva => &[U32, Index(T::Field)],
        T::EncLog => &[U32, U32],
        T::EncMap => &[U32],
        T::Assembly => &[U32, U16, U16, U16, U16, U32, Blob, Str, Str],
        T::AssemblyProcessor => &[U32],
        T::AssemblyOs => &[U32, U32, U32],
        T::AssemblyRef => &[U16, U16, U16, U16, U32, Blob, Str, Str, Blob],
        T::AssemblyRefProcessor => &[U32, Index(T::AssemblyRef)],
        T::AssemblyRefOs => &[U32, U32, U32, Index(T::AssemblyRef)],
        T::File => &[U32, Str, Blob],
        T::ExportedType => &[U32, U32, Str, Str, C(Coded::Implementation)],
        T::ManifestResource => &[U32, U32, Str, C(Coded::Implementation)],
        T::NestedClass => &[Index(T::TypeDef), Index(T::TypeDef)],
        T::GenericParam => &[U16, U16, C(Coded::TypeOrMethodDef), Str],
        T::MethodSpec => &[C(Coded::MethodDefOrRef), Blob],
        T::GenericParamConstraint => &[Index(T::GenericParam), C(Coded::TypeDefOrRef)],
    }
}

fn table_from_id(id: usize) -> Option<Table> {
    use Table as T;
    const ALL: [Table; TABLE_COUNT] = [
        T::Module,
        T::TypeRef,
        T::TypeDef,
        T::FieldPtr,
        T::Field,
        T::MethodPtr,
        T::MethodDef,
        T::ParamPtr,
        T::Param,
        T::InterfaceImpl,
        T::MemberRef,
        T::Constant,
        T::CustomAttribute,
        T::FieldMarshal,
        T::DeclSecurity,
        T::ClassLayout,
        T::FieldLayout,
        T::StandAloneSig,
        T::EventMap,
        T::EventPtr,
        T::Event,
        T::PropertyMap,
        T::PropertyPtr,
        T::Property,
        T::MethodSemantics,
        T::MethodImpl,
        T::ModuleRef,
        T::TypeSpec,
        T::ImplMap,
        T::FieldRva,
        T::EncLog,
        T::EncMap,
        T::Assembly,
        T::AssemblyProcessor,
        T::AssemblyOs,
        T::AssemblyRef,
        T::AssemblyRefProcessor,
        T::AssemblyRefOs,
        T::File,
        T::ExportedType,
        T::ManifestResource,
        T::NestedClass,
        T::GenericParam,
        T::MethodSpec,
        T::GenericParamConstraint,
    ];
    ALL.get(id).copied()
}

const HEAP_STRINGS_WIDE: u8 = 0x01;
const HEAP_GUID_WIDE: u8 = 0x02;
const HEAP_BLOB_WIDE: u8 = 0x04;
const HEAP_EXTRA_DATA: u8 = 0x40;

/// Physical layout of one table.
#[derive(Debug, Clone, Default)]
struct Layout {
    offset: usize,
    row_size: usize,
    /// `(offset within row, width)` per column
    columns: Vec<(usize, usize)>,
}

/// Parsed table stream with random access to any column of any row.
#[derive(Debug, Clone)]
pub(crate) struct TableStream<'a> {
    data: &'a [u8],
    rows: [u32; TABLE_COUNT],
    layouts: Vec<Layout>,
}

impl<'a> TableStream<'a> {
    /// Parses the stream header and lays out every present table.
    pub(crate) fn parse(data: &'a [u8]) -> Result<Self, MetadataError> {
        let heap_sizes = *data.get(6).ok_or(MetadataError::Truncated { offset: 6, len: 1 })?;
        let valid = u64_at(data, 8)?;

        let mut rows = [0u32; TABLE_COUNT];
        let mut cursor = 24;
        for bit in 0..64 {
            if valid & (1u64 << bit) == 0 {
                continue;
            }
            if bit >= TABLE_COUNT {
                return Err(MetadataError::UnsupportedTable(bit));
            }
            rows[bit] = u32_at(data, cursor)?;
            cursor += 4;
        }
        if heap_sizes & HEAP_EXTRA_DATA != 0 {
            cursor += 4;
        }

        let width_of = |col: Col| -> usize {
            match col {
                Col::U16 => 2,
                Col::U32 => 4,
                Col::Str => heap_width(heap_sizes, HEAP_STRINGS_WIDE),
                Col::Guid => heap_width(heap_sizes, HEAP_GUID_WIDE),
                Col::Blob => heap_width(heap_sizes, HEAP_BLOB_WIDE),
                Col::Index(table) => {
                    if rows[table as usize] < (1 << 16) {
                        2
                    } else {
                        4
                    }
                }
                Col::Coded(coded) => {
                    let max_rows = coded
                        .targets()
                        .iter()
                        .flatten()
                        .map(|&table| rows[table as usize])
                        .max()
                        .unwrap_or(0);
                    if max_rows < (1 << (16 - coded.tag_bits())) {
                        2
                    } else {
                        4
                    }
                }
            }
        };

        let mut layouts = Vec::with_capacity(TABLE_COUNT);
        for id in 0..TABLE_COUNT {
            let table = table_from_id(id)
                .ok_or_else(|| MetadataError::Malformed(format!("unknown table 0x{id:02X}")))?;
            let mut columns = Vec::new();
            let mut row_size = 0;
            for &col in schema(table) {
                let width = width_of(col);
                columns.push((row_size, width));
                row_size += width;
            }
            layouts.push(Layout {
                offset: cursor,
                row_size,
                columns,
            });
            cursor = cursor.saturating_add(row_size.saturating_mul(rows[id] as usize));
        }

        if cursor > data.len() {
            return Err(MetadataError::Truncated {
                offset: data.len(),
                len: cursor - data.len(),
            });
        }

        Ok(Self {
            data,
            rows,
            layouts,
        })
    }

    /// Number of rows in `table`.
    pub(crate) fn row_count(&self, table: Table) -> u32 {
        self.rows[table as usize]
    }

    /// Reads column `col` of the 1-based `row` of `table`.
    pub(crate) fn get(&self, table: Table, row: u32, col: usize) -> Result<u32, MetadataError> {
        if row == 0 || row > self.row_count(table) {
            return Err(MetadataError::InvalidIndex {
                table: table.name(),
                row,
            });
        }
        let layout = &self.layouts[table as usize];
        let &(col_offset, width) = layout
            .columns
            .get(col)
            .ok_or_else(|| MetadataError::Malformed(format!("{table:?} has no column {col}")))?;
        let offset = layout.offset + (row as usize - 1) * layout.row_size + col_offset;
        uint_at(self.data, offset, width)
    }
}

impl Table {
    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::TypeRef => "TypeRef",
            Self::TypeDef => "TypeDef",
            Self::MethodDef => "MethodDef",
            Self::MethodPtr => "MethodPtr",
            Self::TypeSpec => "TypeSpec",
            Self::NestedClass => "NestedClass",
            Self::GenericParam => "GenericParam",
            _ => "metadata table",
        }
    }
}

const fn heap_width(heap_sizes: u8, flag: u8) -> usize {
    if heap_sizes & flag == 0 { 2 } else { 4 }
}
