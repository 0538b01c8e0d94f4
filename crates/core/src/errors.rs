use thiserror::Error;

use crate::domain::product::ProductId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("malformed catalog: {reason}")]
    MalformedCatalog { reason: String },
    #[error("unknown product `{product_id}` in selection")]
    UnknownProduct { product_id: ProductId },
    #[error("quote amount out of range while computing {stage}")]
    AmountOverflow { stage: String },
}

impl DomainError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedCatalog { reason: reason.into() }
    }

    pub fn overflow(stage: impl Into<String>) -> Self {
        Self::AmountOverflow { stage: stage.into() }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("catalog source failure: {0}")]
    CatalogSource(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("catalog unavailable: {message}")]
    CatalogUnavailable { message: String },
    #[error("quote unavailable: {message}")]
    QuoteUnavailable { message: String },
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::CatalogUnavailable { .. } => "No products available.",
            Self::QuoteUnavailable { .. } => "Cannot generate quote.",
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(error @ DomainError::MalformedCatalog { .. }) => {
                Self::CatalogUnavailable { message: error.to_string() }
            }
            ApplicationError::Domain(
                error @ (DomainError::UnknownProduct { .. } | DomainError::AmountOverflow { .. }),
            ) => {
                Self::QuoteUnavailable { message: error.to_string() }
            }
            ApplicationError::CatalogSource(message) => Self::CatalogUnavailable { message },
            ApplicationError::Configuration(message) => Self::Internal { message },
        }
    }
}

impl From<DomainError> for InterfaceError {
    fn from(value: DomainError) -> Self {
        ApplicationError::from(value).into()
    }
}
