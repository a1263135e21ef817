pub mod client;
pub mod lookup;
pub mod xml;

pub use crate::domain::model::{LookupMode, RankRecord};
pub use crate::domain::ports::RankSource;
pub use crate::utils::error::Result;
