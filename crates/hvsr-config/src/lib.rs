//! Analysis profile management for the hvsr engine.
//!
//! A profile is a named, TOML-backed [`HvsrSettings`](hvsr_core::HvsrSettings)
//! bundle. Profiles can be loaded from files, built programmatically, saved,
//! or taken from the built-in set.
//!
//! # Features
//!
//! - **Profiles**: Load and save analysis settings as TOML files
//! - **Validation**: Loaded settings are checked against the engine's rules
//! - **Built-in Profiles**: `default`, `sesame` and `legacy`, always available
//!
//! # Example
//!
//! ```rust,no_run
//! use hvsr_config::{AnalysisProfile, builtin_profile};
//! use hvsr_core::CombinationMethod;
//!
//! // Start from a built-in profile and tweak it
//! let profile = builtin_profile("sesame")
//!     .unwrap()
//!     .with_water_level(1.5);
//! profile.save("profiles/soft_soil.toml").unwrap();
//!
//! // Or build one from scratch
//! let profile = AnalysisProfile::new("Rock site")
//!     .with_method(CombinationMethod::QuadraticMean);
//! ```

mod builtin;
mod error;
mod profile;

pub use builtin::{
    BUILTIN_PROFILE_NAMES, builtin_profile, builtin_profile_names, builtin_profiles,
    is_builtin_profile, resolve_profile,
};
pub use error::ConfigError;
pub use profile::AnalysisProfile;
