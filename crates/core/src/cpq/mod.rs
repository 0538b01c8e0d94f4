pub mod catalog;
pub mod pricing;
pub mod source;

use crate::domain::quote::QuoteResult;
use crate::domain::selection::{Selection, SelectionForm};
use crate::errors::DomainError;

use self::{
    catalog::Catalog,
    pricing::{DeterministicQuoteEngine, PricingRates, QuotePricingEngine},
};

/// A loaded catalog paired with the engine that prices against it. The catalog is shared
/// read-only; every call is an independent computation.
pub struct QuoteRuntime<P> {
    catalog: Catalog,
    pricing_engine: P,
}

impl<P> QuoteRuntime<P> {
    pub fn new(catalog: Catalog, pricing_engine: P) -> Self {
        Self { catalog, pricing_engine }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

impl QuoteRuntime<DeterministicQuoteEngine> {
    pub fn with_rates(catalog: Catalog, rates: PricingRates) -> Self {
        Self::new(catalog, DeterministicQuoteEngine::new(rates))
    }
}

impl<P: QuotePricingEngine> QuoteRuntime<P> {
    pub fn quote(&self, selection: &Selection) -> Result<QuoteResult, DomainError> {
        self.pricing_engine.compute_quote(&self.catalog, selection)
    }

    pub fn quote_form(&self, form: &SelectionForm) -> Result<QuoteResult, DomainError> {
        self.quote(&Selection::from_form(form))
    }
}
