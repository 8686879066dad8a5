pub mod assessment;
pub mod config;
pub mod market;
pub mod taxonomy;

pub use assessment::*;
pub use config::{Config, SearchConfig};
pub use market::{CurrencyRate, MarketSnapshot};
pub use taxonomy::{RiskCategory, Taxonomy, TaxonomyError};
