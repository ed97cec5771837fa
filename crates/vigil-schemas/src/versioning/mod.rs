//! Draft detection and per-draft keyword profiles
//!
//! A schema declares its draft through `$schema`; the draft picks the
//! [`VersionProfile`] whose keyword table drives validation. Profiles are
//! built on demand and can be extended with extra keywords through a
//! [`ProfileExtension`].
//!
//! Copyright (c) 2025 Vigil Team
//! Licensed under the Apache-2.0 license

pub mod profile;
pub mod version;

pub(crate) use profile::Handler;
pub use profile::{profile_for, ProfileExtension, VersionProfile};
pub use version::{Draft, UnknownDraft};

use std::sync::Arc;

/// Build the profile for `draft` with every extension applied in order
pub fn build_profile(draft: Draft, extensions: &[Arc<dyn ProfileExtension>]) -> VersionProfile {
    let mut profile = VersionProfile::new(draft);
    for extension in extensions {
        extension.extend(&mut profile);
    }
    profile
}
