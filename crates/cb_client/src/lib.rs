//! # A crate for resolving and launching client versions
//!
//! The pipeline this crate implements:
//! version id -> resolved descriptor (inheritance flattened) ->
//! rule-filtered library list -> {classpath, natives on disk} ->
//! command line -> spawned process.
//!
//! # A note about natives
//! Natives are the platform-specific shared libraries the client
//! loads at runtime. They arrive in three formats that all have to
//! be handled:
//! - `name: *:natives-*`: a separate library whose jar is
//!   extracted into the natives folder.
//! - `classifiers: *`: part of a main library, with one jar per
//!   OS/arch keyed by classifier.
//! - `natives: *`: the legacy map pointing at a classifier key,
//!   sometimes with an `${arch}` token inside.
//!
//! Selection prefers the most specific classifier for the current
//! OS + architecture and falls back gracefully (see
//! [`artifact::native_classifier_candidates`]). Extraction is
//! race-free under concurrent downloads; see [`natives`].

pub mod artifact;
pub mod config;
pub mod download;
pub mod java;
mod launch;
pub mod natives;
pub mod resolver;
pub mod rules;

pub use config::{Instance, LauncherConfig};
pub use download::{DownloadError, LibraryFailure, LibraryFailures};
pub use launch::{launch, ArgParseError, CommandBuilder, GameLaunchError, GameProcess, LaunchArgs};
pub use natives::NativesDir;
pub use resolver::VersionResolver;
pub use rules::FeatureFlags;
