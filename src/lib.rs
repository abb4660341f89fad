//! Packages starter-project templates into zip archives, one per template
//! directory.

pub mod archive;
pub mod cmd;
pub mod config;
pub mod error;
pub mod exclude;
pub mod packager;
pub mod progress;
pub mod template;
pub mod userpath;
pub mod verbosity;
pub mod walkdir;

pub use error::{PackError, PackResult};
pub use exclude::{ExcludeSet, DEFAULT_EXCLUDES};
pub use packager::{package, package_with_progress, plan, PackOptions, TemplatePlan};
pub use template::Template;
