pub mod addon;
pub mod product;
pub mod quote;
pub mod selection;
