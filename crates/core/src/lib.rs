pub mod config;
pub mod cpq;
pub mod domain;
pub mod errors;
pub mod export;

pub use cpq::catalog::Catalog;
pub use cpq::pricing::{
    compute_quote, DeterministicQuoteEngine, PricingRates, QuotePricingEngine, DEFAULT_HOURLY_RATE,
};
pub use cpq::source::{load_catalog, CatalogSource, FileCatalogSource, StaticCatalogSource};
pub use cpq::QuoteRuntime;
pub use domain::addon::AddOn;
pub use domain::product::{Category, Product, ProductId};
pub use domain::quote::{QuoteLineItem, QuoteResult};
pub use domain::selection::{Customization, PreferredDate, Selection, SelectionForm};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use export::ExportFormat;
