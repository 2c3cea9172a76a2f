//! Component description providers.
//!
//! A provider turns a component path into [`ComponentMetadata`]. The
//! pipeline only ever sees this abstraction, never the concrete mechanism
//! behind it.

use crate::types::ComponentMetadata;
use crate::{ClrMetadataProvider, JsonDescriptionProvider};
use netbridge_core::Result;
use std::fmt::Debug;
use std::path::Path;

/// Source of component descriptions.
///
/// # Errors
///
/// Implementations report failures with the load-family variants of
/// [`netbridge_core::Error`]: `NotLoadable` when the input is not in the
/// provider's format, `PartialTypeLoad` when some types cannot be resolved,
/// and `LoadFailed` for anything else.
///
/// # Examples
///
/// ```
/// use netbridge_core::Result;
/// use netbridge_introspector::{ComponentMetadata, ComponentProvider};
/// use std::path::Path;
///
/// #[derive(Debug)]
/// struct Empty;
///
/// impl ComponentProvider for Empty {
///     fn name(&self) -> &'static str {
///         "empty"
///     }
///
///     fn load(&self, _path: &Path) -> Result<ComponentMetadata> {
///         Ok(ComponentMetadata::default())
///     }
/// }
///
/// assert_eq!(Empty.load(Path::new("x")).unwrap().member_count(), 0);
/// ```
pub trait ComponentProvider: Debug + Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &'static str;

    /// Loads the description of the component at `path`.
    ///
    /// # Errors
    ///
    /// See the trait-level documentation.
    fn load(&self, path: &Path) -> Result<ComponentMetadata>;
}

/// Picks a provider from the component's file extension.
///
/// `.json` files are read as component descriptions; everything else is
/// treated as a PE image carrying ECMA-335 metadata.
///
/// # Examples
///
/// ```
/// use netbridge_introspector::provider_for_path;
/// use std::path::Path;
///
/// assert_eq!(provider_for_path(Path::new("Demo.dll")).name(), "clr-metadata");
/// assert_eq!(provider_for_path(Path::new("demo.JSON")).name(), "json-description");
/// ```
#[must_use]
pub fn provider_for_path(path: &Path) -> Box<dyn ComponentProvider> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        Box::new(JsonDescriptionProvider::new())
    } else {
        Box::new(ClrMetadataProvider::new())
    }
}
