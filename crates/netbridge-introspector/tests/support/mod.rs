//! Builds minimal managed PE images for tests.
//!
//! The images carry just enough metadata for the reader: a Module row,
//! a few TypeRefs into `System`, TypeDefs with their MethodDefs, and
//! optional NestedClass and GenericParam rows. All heap and table indices
//! are 2 bytes wide.

#![allow(dead_code)]

pub const TYPE_PUBLIC: u32 = 0x0000_0001;
pub const TYPE_SEALED: u32 = 0x0000_0100;
pub const TYPE_INTERFACE: u32 = 0x0000_00A1;
pub const TYPE_NESTED_PUBLIC: u32 = 0x0000_0002;

pub const METHOD_PRIVATE: u16 = 0x0001;
pub const METHOD_ASSEMBLY: u16 = 0x0003;
pub const METHOD_PUBLIC: u16 = 0x0006;
pub const METHOD_STATIC: u16 = 0x0010;
pub const METHOD_SPECIAL: u16 = 0x0800 | 0x1000;

/// TypeRef rows created by [`AssemblyBuilder::new`].
pub const OBJECT: u32 = 1;
pub const VALUE_TYPE: u32 = 2;
pub const ENUM: u32 = 3;
pub const MULTICAST_DELEGATE: u32 = 4;

const RUNTIME_VERSION: &str = "v4.0.30319";

/// `TypeDefOrRef` coded value for a TypeRef row.
pub const fn type_ref(row: u32) -> u16 {
    ((row << 2) | 1) as u16
}

/// `TypeDefOrRef` coded value for a TypeDef row.
pub const fn type_def(row: u32) -> u16 {
    (row << 2) as u16
}

struct TypeDefRow {
    flags: u32,
    name: u16,
    namespace: u16,
    extends: u16,
    methods: u16,
}

struct MethodRow {
    flags: u16,
    name: u16,
    signature: u16,
}

pub struct AssemblyBuilder {
    strings: Vec<u8>,
    blobs: Vec<u8>,
    type_refs: Vec<(u16, u16, u16)>,
    type_defs: Vec<TypeDefRow>,
    methods: Vec<MethodRow>,
    nested: Vec<(u16, u16)>,
    generic_params: Vec<(u16, u16, u16)>,
}

impl AssemblyBuilder {
    /// Starts an image with `<Module>` as TypeDef 1 and the System TypeRefs.
    pub fn new() -> Self {
        let mut builder = Self {
            strings: vec![0],
            blobs: vec![0],
            type_refs: Vec::new(),
            type_defs: Vec::new(),
            methods: Vec::new(),
            nested: Vec::new(),
            generic_params: Vec::new(),
        };
        for name in ["Object", "ValueType", "Enum", "MulticastDelegate"] {
            builder.add_type_ref("System", name);
        }
        builder.add_type("", "<Module>", 0, 0);
        builder
    }

    /// Adds a TypeRef scoped to an assembly reference; returns its row.
    pub fn add_type_ref(&mut self, namespace: &str, name: &str) -> u32 {
        let name = self.string(name);
        let namespace = self.string(namespace);
        // ResolutionScope: AssemblyRef row 1
        self.type_refs.push(((1 << 2) | 2, name, namespace));
        self.type_refs.len() as u32
    }

    /// Adds a TypeDef; methods added afterwards belong to it. Returns its row.
    pub fn add_type(&mut self, namespace: &str, name: &str, flags: u32, extends: u16) -> u32 {
        let name = self.string(name);
        let namespace = self.string(namespace);
        self.type_defs.push(TypeDefRow {
            flags,
            name,
            namespace,
            extends,
            methods: (self.methods.len() + 1) as u16,
        });
        self.type_defs.len() as u32
    }

    pub fn add_class(&mut self, namespace: &str, name: &str) -> u32 {
        self.add_type(namespace, name, TYPE_PUBLIC, type_ref(OBJECT))
    }

    /// Adds a method to the most recent type; returns its MethodDef row.
    pub fn add_method(&mut self, name: &str, flags: u16, signature: &[u8]) -> u32 {
        let name = self.string(name);
        let signature = self.blob(signature);
        self.methods.push(MethodRow {
            flags,
            name,
            signature,
        });
        self.methods.len() as u32
    }

    pub fn nest(&mut self, inner: u32, outer: u32) {
        self.nested.push((inner as u16, outer as u16));
    }

    /// Declares generic parameter `number` on TypeDef `owner`.
    pub fn add_type_generic_param(&mut self, owner: u32, number: u16, name: &str) {
        let name = self.string(name);
        self.generic_params.push((number, (owner << 1) as u16, name));
    }

    /// Declares generic parameter `number` on MethodDef `owner`.
    pub fn add_method_generic_param(&mut self, owner: u32, number: u16, name: &str) {
        let name = self.string(name);
        self.generic_params.push((number, ((owner << 1) | 1) as u16, name));
    }

    fn string(&mut self, value: &str) -> u16 {
        if value.is_empty() {
            return 0;
        }
        let index = self.strings.len() as u16;
        self.strings.extend_from_slice(value.as_bytes());
        self.strings.push(0);
        index
    }

    fn blob(&mut self, value: &[u8]) -> u16 {
        let index = self.blobs.len() as u16;
        self.blobs.push(value.len() as u8);
        self.blobs.extend_from_slice(value);
        index
    }

    fn table_stream(&self) -> Vec<u8> {
        let mut present: Vec<(u8, usize)> = vec![
            (0x00, 1),
            (0x01, self.type_refs.len()),
            (0x02, self.type_defs.len()),
            (0x06, self.methods.len()),
        ];
        if !self.nested.is_empty() {
            present.push((0x29, self.nested.len()));
        }
        if !self.generic_params.is_empty() {
            present.push((0x2A, self.generic_params.len()));
        }

        let valid = present.iter().fold(0u64, |acc, &(id, _)| acc | (1 << id));

        let mut out = Vec::new();
        put_u32(&mut out, 0);
        out.extend_from_slice(&[2, 0, 0, 1]);
        out.extend_from_slice(&valid.to_le_bytes());
        out.extend_from_slice(&0u64.to_le_bytes());
        for &(_, rows) in &present {
            put_u32(&mut out, rows as u32);
        }

        // Module: generation, name, mvid, encid, encbaseid
        put_u16(&mut out, 0);
        put_u16(&mut out, 0);
        put_u16(&mut out, 1);
        put_u16(&mut out, 0);
        put_u16(&mut out, 0);

        for &(scope, name, namespace) in &self.type_refs {
            put_u16(&mut out, scope);
            put_u16(&mut out, name);
            put_u16(&mut out, namespace);
        }

        for row in &self.type_defs {
            put_u32(&mut out, row.flags);
            put_u16(&mut out, row.name);
            put_u16(&mut out, row.namespace);
            put_u16(&mut out, row.extends);
            put_u16(&mut out, 1);
            put_u16(&mut out, row.methods);
        }

        for row in &self.methods {
            put_u32(&mut out, 0);
            put_u16(&mut out, 0);
            put_u16(&mut out, row.flags);
            put_u16(&mut out, row.name);
            put_u16(&mut out, row.signature);
            put_u16(&mut out, 1);
        }

        for &(inner, outer) in &self.nested {
            put_u16(&mut out, inner);
            put_u16(&mut out, outer);
        }

        for &(number, owner, name) in &self.generic_params {
            put_u16(&mut out, number);
            put_u16(&mut out, 0);
            put_u16(&mut out, owner);
            put_u16(&mut out, name);
        }

        out
    }

    fn metadata_root(&self) -> Vec<u8> {
        let streams: [(&str, Vec<u8>); 5] = [
            ("#~", self.table_stream()),
            ("#Strings", self.strings.clone()),
            ("#US", vec![0]),
            ("#GUID", vec![0x11; 16]),
            ("#Blob", self.blobs.clone()),
        ];

        let version = padded(RUNTIME_VERSION.as_bytes(), 4);
        let headers_len: usize = streams
            .iter()
            .map(|(name, _)| 8 + (name.len() + 4) / 4 * 4)
            .sum();

        let mut out = Vec::new();
        put_u32(&mut out, 0x424A_5342);
        put_u16(&mut out, 1);
        put_u16(&mut out, 1);
        put_u32(&mut out, 0);
        put_u32(&mut out, version.len() as u32);
        out.extend_from_slice(&version);
        put_u16(&mut out, 0);
        put_u16(&mut out, streams.len() as u16);

        let mut offset = out.len() + headers_len;
        let mut bodies = Vec::new();
        for (name, body) in &streams {
            let body = padded(body, 4);
            put_u32(&mut out, offset as u32);
            put_u32(&mut out, body.len() as u32);
            let mut name = name.as_bytes().to_vec();
            name.push(0);
            out.extend_from_slice(&padded(&name, 4));
            offset += body.len();
            bodies.extend_from_slice(&body);
        }
        out.extend_from_slice(&bodies);
        out
    }

    /// Serializes the PE32 image.
    pub fn build(&self) -> Vec<u8> {
        const PE_OFFSET: usize = 0x80;
        const OPTIONAL_SIZE: usize = 0xE0;
        const SECTION_RVA: u32 = 0x2000;
        const SECTION_OFFSET: usize = 0x200;
        const CLI_HEADER_SIZE: u32 = 72;

        let metadata = self.metadata_root();
        let section_len = CLI_HEADER_SIZE as usize + metadata.len();
        let mut image = vec![0u8; SECTION_OFFSET];

        image[0] = b'M';
        image[1] = b'Z';
        image[0x3C..0x40].copy_from_slice(&(PE_OFFSET as u32).to_le_bytes());
        image[PE_OFFSET..PE_OFFSET + 4].copy_from_slice(b"PE\0\0");

        let coff = PE_OFFSET + 4;
        write_u16(&mut image, coff, 0x014C);
        write_u16(&mut image, coff + 2, 1);
        write_u16(&mut image, coff + 16, OPTIONAL_SIZE as u16);
        write_u16(&mut image, coff + 18, 0x2102);

        let optional = coff + 20;
        write_u16(&mut image, optional, 0x010B);
        write_u32(&mut image, optional + 92, 16);
        let cli_directory = optional + 96 + 14 * 8;
        write_u32(&mut image, cli_directory, SECTION_RVA);
        write_u32(&mut image, cli_directory + 4, CLI_HEADER_SIZE);

        let section = optional + OPTIONAL_SIZE;
        image[section..section + 5].copy_from_slice(b".text");
        write_u32(&mut image, section + 8, section_len as u32);
        write_u32(&mut image, section + 12, SECTION_RVA);
        write_u32(&mut image, section + 16, section_len.next_multiple_of(0x200) as u32);
        write_u32(&mut image, section + 20, SECTION_OFFSET as u32);

        let mut cli = Vec::new();
        put_u32(&mut cli, CLI_HEADER_SIZE);
        put_u16(&mut cli, 2);
        put_u16(&mut cli, 5);
        put_u32(&mut cli, SECTION_RVA + CLI_HEADER_SIZE);
        put_u32(&mut cli, metadata.len() as u32);
        put_u32(&mut cli, 1);
        cli.resize(CLI_HEADER_SIZE as usize, 0);

        image.extend_from_slice(&cli);
        image.extend_from_slice(&metadata);
        image.resize(SECTION_OFFSET + section_len.next_multiple_of(0x200), 0);
        image
    }
}

fn padded(bytes: &[u8], align: usize) -> Vec<u8> {
    let mut out = bytes.to_vec();
    out.resize(bytes.len().next_multiple_of(align).max(align), 0);
    out
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn write_u16(image: &mut [u8], offset: usize, value: u16) {
    image[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn write_u32(image: &mut [u8], offset: usize, value: u32) {
    image[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
