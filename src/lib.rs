pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::ClientConfig;
pub use core::{client::RankLookupClient, lookup::LookupEngine, xml::XmlDocument};
pub use domain::model::{LookupMode, RankRecord};
pub use utils::error::{RankError, Result};
