//! Browser and artifact-store adapters for stepshot.
//!
//! The capture driver depends only on the traits in [`traits`].  This crate
//! also ships the production implementations: a Chrome DevTools Protocol
//! browser ([`CdpLauncher`]) and a filesystem store ([`FsArtifactStore`]).

pub mod browser;
pub mod error;
pub mod pattern;
pub mod store;
pub mod traits;

pub use browser::CdpLauncher;
pub use error::{AdapterError, Result};
pub use pattern::Pattern;
pub use store::FsArtifactStore;
pub use traits::{
    ArtifactStore, BrowserLauncher, BrowserSession, ElementHandle, LaunchOptions, Page,
};
