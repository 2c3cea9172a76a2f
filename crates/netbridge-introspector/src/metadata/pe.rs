//! PE/COFF container: locates the CLI metadata root inside an image.

use super::MetadataError;
use super::reader::{slice_at, u16_at, u32_at};

const DOS_MAGIC: u16 = 0x5A4D; // "MZ"
const PE_SIGNATURE: u32 = 0x0000_4550; // "PE\0\0"
const PE32_MAGIC: u16 = 0x010B;
const PE32_PLUS_MAGIC: u16 = 0x020B;
const CLI_HEADER_DIRECTORY: usize = 14;
const SECTION_HEADER_SIZE: usize = 40;

/// A section's mapping from virtual addresses to file offsets.
#[derive(Debug, Clone, Copy)]
struct Section {
    virtual_address: u32,
    virtual_size: u32,
    raw_size: u32,
    raw_offset: u32,
}

impl Section {
    fn contains(&self, rva: u32) -> bool {
        let extent = self.virtual_size.max(self.raw_size);
        rva >= self.virtual_address && rva - self.virtual_address < extent
    }

    /// File offset of `rva`, which must lie in this section.
    fn file_offset(&self, rva: u32) -> Option<usize> {
        (rva - self.virtual_address)
            .checked_add(self.raw_offset)
            .map(|offset| offset as usize)
    }
}

/// Returns the metadata root (`BSJB` blob) of a managed PE image.
///
/// # Errors
///
/// Returns [`MetadataError::NotManaged`] if the buffer is not a PE image,
/// has no CLI header, or the header points outside the file.
pub(crate) fn metadata_root(image: &[u8]) -> Result<&[u8], MetadataError> {
    let not_managed = |reason: &str| MetadataError::NotManaged(reason.to_string());

    if u16_at(image, 0).ok() != Some(DOS_MAGIC) {
        return Err(not_managed("missing MZ signature"));
    }

    let pe_offset = u32_at(image, 0x3C).map_err(|_| not_managed("truncated DOS header"))? as usize;
    if u32_at(image, pe_offset).ok() != Some(PE_SIGNATURE) {
        return Err(not_managed("missing PE signature"));
    }

    let coff = pe_offset + 4;
    let section_count = usize::from(u16_at(image, coff + 2)?);
    let optional_size = usize::from(u16_at(image, coff + 16)?);
    let optional = coff + 20;

    let (directory_count_offset, directories_offset) = match u16_at(image, optional)? {
        PE32_MAGIC => (optional + 92, optional + 96),
        PE32_PLUS_MAGIC => (optional + 108, optional + 112),
        other => {
            return Err(MetadataError::NotManaged(format!(
                "unknown optional header magic 0x{other:04X}"
            )));
        }
    };

    let directory_count = u32_at(image, directory_count_offset)? as usize;
    if directory_count <= CLI_HEADER_DIRECTORY {
        return Err(not_managed("no CLI header data directory"));
    }

    let cli_entry = directories_offset + CLI_HEADER_DIRECTORY * 8;
    let cli_rva = u32_at(image, cli_entry)?;
    if cli_rva == 0 {
        return Err(not_managed("image has no CLI header (native binary)"));
    }

    let sections = (0..section_count)
        .map(|i| {
            let header = optional + optional_size + i * SECTION_HEADER_SIZE;
            Ok(Section {
                virtual_size: u32_at(image, header + 8)?,
                virtual_address: u32_at(image, header + 12)?,
                raw_size: u32_at(image, header + 16)?,
                raw_offset: u32_at(image, header + 20)?,
            })
        })
        .collect::<Result<Vec<_>, MetadataError>>()?;

    let to_offset = |rva: u32| -> Result<usize, MetadataError> {
        let section = sections.iter().find(|s| s.contains(rva)).ok_or_else(|| {
            MetadataError::NotManaged(format!("RVA 0x{rva:08X} is not mapped by any section"))
        })?;
        section.file_offset(rva).ok_or_else(|| {
            MetadataError::NotManaged(format!("RVA 0x{rva:08X} maps past the end of the file"))
        })
    };

    let cli_header = to_offset(cli_rva)?;
    let metadata_rva = u32_at(image, cli_header + 8)?;
    let metadata_size = u32_at(image, cli_header + 12)? as usize;
    let metadata_offset = to_offset(metadata_rva)?;

    slice_at(image, metadata_offset, metadata_size)
        .map_err(|_| not_managed("metadata directory extends past end of file"))
}
