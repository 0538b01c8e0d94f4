use std::path::PathBuf;

use quotesmith_core::config::LoadOptions;
use quotesmith_core::export::render_catalog;
use quotesmith_core::Category;
use serde::Serialize;

use crate::commands::{load_catalog_blocking, load_config, CommandResult};

#[derive(Debug, Serialize)]
struct CatalogListing<'a> {
    command: &'static str,
    status: &'static str,
    source: String,
    product_count: usize,
    categories: &'a [Category],
}

pub fn run(
    options: LoadOptions,
    catalog_path: Option<PathBuf>,
    json_output: bool,
) -> CommandResult {
    let config = match load_config("catalog", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let path = catalog_path.unwrap_or(config.catalog.path);

    let catalog = match load_catalog_blocking(&path) {
        Ok(catalog) => catalog,
        Err(error) => return CommandResult::unavailable("catalog", error),
    };

    if !json_output {
        return CommandResult::raw(render_catalog(&catalog));
    }

    let listing = CatalogListing {
        command: "catalog",
        status: "ok",
        source: path.display().to_string(),
        product_count: catalog.len(),
        categories: catalog.categories(),
    };
    match serde_json::to_string_pretty(&listing) {
        Ok(output) => CommandResult::raw(output),
        Err(error) => CommandResult::failure(
            "catalog",
            "serialization",
            format!("catalog serialization failed: {error}"),
            1,
        ),
    }
}
