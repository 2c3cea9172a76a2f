//! Method and type signature blobs (ECMA-335 II.23.2).
//!
//! Types are rendered the way the runtime's `Type.ToString()` spells them:
//! `System.Int32[]`, ``System.Collections.Generic.List`1[System.String]``,
//! `Outer+Inner`.

use super::MetadataError;
use super::reader::Cursor;
use super::tables::{Coded, Table};

const MAX_DEPTH: usize = 32;

const HAS_THIS: u8 = 0x20;
const GENERIC: u8 = 0x10;
const CALLING_CONVENTION_MASK: u8 = 0x0F;
const VARARG: u8 = 0x05;

const ELEMENT_VOID: u8 = 0x01;
const ELEMENT_PTR: u8 = 0x0F;
const ELEMENT_BYREF: u8 = 0x10;
const ELEMENT_VALUETYPE: u8 = 0x11;
const ELEMENT_CLASS: u8 = 0x12;
const ELEMENT_VAR: u8 = 0x13;
const ELEMENT_ARRAY: u8 = 0x14;
const ELEMENT_GENERICINST: u8 = 0x15;
const ELEMENT_TYPEDBYREF: u8 = 0x16;
const ELEMENT_I: u8 = 0x18;
const ELEMENT_U: u8 = 0x19;
const ELEMENT_FNPTR: u8 = 0x1B;
const ELEMENT_OBJECT: u8 = 0x1C;
const ELEMENT_SZARRAY: u8 = 0x1D;
const ELEMENT_MVAR: u8 = 0x1E;
const ELEMENT_CMOD_REQD: u8 = 0x1F;
const ELEMENT_CMOD_OPT: u8 = 0x20;
const ELEMENT_SENTINEL: u8 = 0x41;
const ELEMENT_PINNED: u8 = 0x45;

/// Which generic parameter list a `VAR`/`MVAR` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GenericOwner {
    Type,
    Method,
}

/// Name lookups a signature needs from the surrounding tables.
pub(crate) trait TypeResolver {
    /// Full name of a TypeDef, TypeRef or TypeSpec row.
    fn resolve(&self, table: Table, row: u32, depth: usize) -> Result<String, MetadataError>;

    /// Declared name of the `index`th generic parameter, if recorded.
    fn generic_param(&self, owner: GenericOwner, index: u32) -> Option<String>;
}

/// A decoded `MethodDefSig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MethodSignature {
    pub has_this: bool,
    pub return_type: String,
    pub parameters: Vec<String>,
}

/// Decodes a method signature blob.
pub(crate) fn method_signature(
    blob: &[u8],
    resolver: &dyn TypeResolver,
) -> Result<MethodSignature, MetadataError> {
    let mut cursor = Cursor::new(blob);
    read_method(&mut cursor, resolver, 0)
}

/// Decodes a `TypeSpec` blob into a type name.
pub(crate) fn type_spec(
    blob: &[u8],
    resolver: &dyn TypeResolver,
    depth: usize,
) -> Result<String, MetadataError> {
    let mut cursor = Cursor::new(blob);
    read_type(&mut cursor, resolver, depth)
}

fn read_method(
    cursor: &mut Cursor<'_>,
    resolver: &dyn TypeResolver,
    depth: usize,
) -> Result<MethodSignature, MetadataError> {
    let convention = cursor.u8()?;
    if convention & CALLING_CONVENTION_MASK > VARARG {
        return Err(MetadataError::Malformed(format!(
            "not a method signature (calling convention 0x{convention:02X})"
        )));
    }
    if convention & GENERIC != 0 {
        cursor.compressed_u32()?;
    }

    let count = cursor.compressed_u32()?;
    let return_type = read_type(cursor, resolver, depth + 1)?;

    let mut parameters = Vec::new();
    for _ in 0..count {
        if cursor.peek() == Some(ELEMENT_SENTINEL) {
            cursor.u8()?;
        }
        parameters.push(read_type(cursor, resolver, depth + 1)?);
    }

    Ok(MethodSignature {
        has_this: convention & HAS_THIS != 0,
        return_type,
        parameters,
    })
}

fn read_type(
    cursor: &mut Cursor<'_>,
    resolver: &dyn TypeResolver,
    depth: usize,
) -> Result<String, MetadataError> {
    if depth > MAX_DEPTH {
        return Err(MetadataError::Malformed(
            "type signature nested too deeply".to_string(),
        ));
    }

    while matches!(cursor.peek(), Some(ELEMENT_CMOD_REQD | ELEMENT_CMOD_OPT)) {
        cursor.u8()?;
        cursor.compressed_u32()?;
    }

    let element = cursor.u8()?;
    if let Some(name) = primitive(element) {
        return Ok(name.to_string());
    }

    let next = depth + 1;
    match element {
        ELEMENT_PTR => Ok(format!("{}*", read_type(cursor, resolver, next)?)),
        ELEMENT_BYREF => Ok(format!("{}&", read_type(cursor, resolver, next)?)),
        ELEMENT_PINNED => read_type(cursor, resolver, next),
        ELEMENT_SZARRAY => Ok(format!("{}[]", read_type(cursor, resolver, next)?)),
        ELEMENT_VALUETYPE | ELEMENT_CLASS => read_type_token(cursor, resolver, next),
        ELEMENT_VAR => generic_name(cursor, resolver, GenericOwner::Type),
        ELEMENT_MVAR => generic_name(cursor, resolver, GenericOwner::Method),
        ELEMENT_ARRAY => {
            let element_type = read_type(cursor, resolver, next)?;
            let rank = cursor.compressed_u32()?;
            let sizes = cursor.compressed_u32()?;
            for _ in 0..sizes {
                cursor.compressed_u32()?;
            }
            let bounds = cursor.compressed_u32()?;
            for _ in 0..bounds {
                cursor.compressed_u32()?;
            }
            let dimensions = if rank <= 1 {
                "*".to_string()
            } else {
                ",".repeat(rank as usize - 1)
            };
            Ok(format!("{element_type}[{dimensions}]"))
        }
        ELEMENT_GENERICINST => {
            let kind = cursor.u8()?;
            if kind != ELEMENT_CLASS && kind != ELEMENT_VALUETYPE {
                return Err(MetadataError::Malformed(format!(
                    "generic instantiation of element type 0x{kind:02X}"
                )));
            }
            let base = read_type_token(cursor, resolver, next)?;
            let count = cursor.compressed_u32()?;
            let arguments = (0..count)
                .map(|_| read_type(cursor, resolver, next))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(format!("{base}[{}]", arguments.join(",")))
        }
        ELEMENT_FNPTR => {
            read_method(cursor, resolver, next)?;
            Ok("System.IntPtr".to_string())
        }
        other => Err(MetadataError::Malformed(format!(
            "unknown element type 0x{other:02X}"
        ))),
    }
}

fn read_type_token(
    cursor: &mut Cursor<'_>,
    resolver: &dyn TypeResolver,
    depth: usize,
) -> Result<String, MetadataError> {
    let (table, row) = Coded::TypeDefOrRef.decode(cursor.compressed_u32()?)?;
    resolver.resolve(table, row, depth)
}

fn generic_name(
    cursor: &mut Cursor<'_>,
    resolver: &dyn TypeResolver,
    owner: GenericOwner,
) -> Result<String, MetadataError> {
    let index = cursor.compressed_u32()?;
    Ok(resolver.generic_param(owner, index).unwrap_or_else(|| match owner {
        GenericOwner::Type => format!("!{index}"),
        GenericOwner::Method => format!("!!{index}"),
    }))
}

const fn primitive(element: u8) -> Option<&'static str> {
    Some(match element {
        ELEMENT_VOID => "System.Void",
        0x02 => "System.Boolean",
        0x03 => "System.Char",
        0x04 => "System.SByte",
        0x05 => "System.Byte",
        0x06 => "System.Int16",
        0x07 => "System.UInt16",
        0x08 => "System.Int32",
        0x09 => "System.UInt32",
        0x0A => "System.Int64",
        0x0B => "System.UInt64",
        0x0C => "System.Single",
        0x0D => "System.Double",
        0x0E => "System.String",
        ELEMENT_TYPEDBYREF => "System.TypedReference",
        ELEMENT_I => "System.IntPtr",
        ELEMENT_U => "System.UIntPtr",
        ELEMENT_OBJECT => "System.Object",
        _ => return None,
    })
}
