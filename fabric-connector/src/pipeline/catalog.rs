//! Pattern and model catalogs.
//!
//! Both fabric flavors can list their patterns and models, in different
//! formats: the local install prints one name per line, the alternate build
//! prefixes every entry with a bracketed index (`[3] summarize`).

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;
use tracing::{debug, error, info};

use super::executor::validate_identifier;
use super::launcher::Launcher;
use super::strategy::InvocationStrategy;
use super::tools::Flavor;
use crate::{Error, Result};

static INDEXED_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[\d+\]\s*(\S.*?)\s*$").unwrap());

/// Group banners the local fabric interleaves with its model listing.
///
/// Matched literally. A new banner upstream shows up as a bogus model entry.
pub const MODEL_SECTION_HEADERS: &[&str] = &[
    "GPT Models:",
    "Local Models:",
    "Claude Models:",
    "Google Models:",
];

/// One named catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub name: String,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One name per non-empty line.
pub fn parse_plain(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// `[N] name` lines; anything else (group titles, blank lines) is skipped.
///
/// Fails when the output has content but no line matches.
pub fn parse_indexed(output: &str) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut skipped = 0usize;

    for line in output.lines().filter(|l| !l.trim().is_empty()) {
        match INDEXED_ENTRY.captures(line) {
            Some(caps) => names.push(caps[1].to_string()),
            None => {
                skipped += 1;
                debug!(line = %line.trim(), "Skipping non-entry catalog line");
            }
        }
    }

    if names.is_empty() && skipped > 0 {
        return Err(Error::CatalogParse(format!(
            "no indexed entries in {skipped} line(s) of listing output"
        )));
    }
    Ok(names)
}

fn drop_section_headers(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| !MODEL_SECTION_HEADERS.contains(&name.as_str()))
        .collect()
}

/// Catalog accessors backed by fabric's listing flags.
#[derive(Clone)]
pub struct Catalog {
    strategy: Arc<dyn InvocationStrategy>,
    launcher: Arc<dyn Launcher>,
}

impl Catalog {
    pub fn new(strategy: Arc<dyn InvocationStrategy>, launcher: Arc<dyn Launcher>) -> Self {
        Self { strategy, launcher }
    }

    async fn query(&self, flavor: Flavor, args: &[&str]) -> Result<String> {
        let plan = self.strategy.fabric_query(flavor, args);
        self.launcher.run(&plan).await
    }

    /// Names of the available patterns.
    pub async fn list_templates(&self, flavor: Flavor) -> Result<Vec<CatalogEntry>> {
        let output = self.query(flavor, &[flavor.list_patterns_flag()]).await?;
        let names = match flavor {
            Flavor::Local => parse_plain(&output),
            Flavor::Alternate => degrade("patterns", flavor, parse_indexed(&output)),
        };
        info!(flavor = %flavor, count = names.len(), "Listed patterns");
        Ok(names.into_iter().map(CatalogEntry::new).collect())
    }

    /// Names of the available models.
    pub async fn list_models(&self, flavor: Flavor) -> Result<Vec<CatalogEntry>> {
        let output = self.query(flavor, &[flavor.list_models_flag()]).await?;
        let names = match flavor {
            Flavor::Local => drop_section_headers(parse_plain(&output)),
            Flavor::Alternate => degrade("models", flavor, parse_indexed(&output)),
        };
        info!(flavor = %flavor, count = names.len(), "Listed models");
        Ok(names.into_iter().map(CatalogEntry::new).collect())
    }

    /// Change fabric's default model and return the tool's output verbatim.
    pub async fn set_default_model(&self, flavor: Flavor, model: &str) -> Result<String> {
        let model = model.trim();
        validate_identifier("model", model)?;
        info!(flavor = %flavor, model, "Changing default model");
        self.query(flavor, &[flavor.change_default_model_flag(), model])
            .await
    }
}

/// An unparseable listing becomes an empty catalog.
fn degrade(kind: &str, flavor: Flavor, parsed: Result<Vec<String>>) -> Vec<String> {
    parsed.unwrap_or_else(|e| {
        error!(kind, flavor = %flavor, "Unparseable catalog listing, returning empty: {}", e);
        Vec::new()
    })
}
