//! The unit of copy work.

use imgsync_registry::RegistryContext;

/// Which images of a manifest list to copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageListSelection {
    /// Copy the single image matching the (possibly overridden) architecture.
    System,
    /// Copy the whole index and every image it lists.
    All,
}

/// One copy from a source context to a destination context.
///
/// Built fresh for each copy and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct CopyRequest {
    source: RegistryContext,
    destination: RegistryContext,
    selection: ImageListSelection,
}

impl CopyRequest {
    /// Creates a request.
    #[must_use]
    pub const fn new(
        source: RegistryContext,
        destination: RegistryContext,
        copy_full_index: bool,
    ) -> Self {
        let selection = if copy_full_index {
            ImageListSelection::All
        } else {
            ImageListSelection::System
        };
        Self {
            source,
            destination,
            selection,
        }
    }

    /// Source side.
    #[must_use]
    pub const fn source(&self) -> &RegistryContext {
        &self.source
    }

    /// Destination side.
    #[must_use]
    pub const fn destination(&self) -> &RegistryContext {
        &self.destination
    }

    /// Image list selection mode.
    #[must_use]
    pub const fn selection(&self) -> ImageListSelection {
        self.selection
    }

    /// Effective architecture filter; empty when none applies.
    #[must_use]
    pub fn arch_choice(&self) -> &str {
        &self.source.arch_choice
    }
}
