// ABOUTME: Loader for the builtin portal adapters embedded as JSON and plain-text blacklists.
// ABOUTME: Provides load_builtin_registry() to initialize the default SiteRegistry.

//! Builtin site registry loader.
//!
//! Each builtin portal ships as one JSON file plus a blacklist text file,
//! both compiled into the binary.

use once_cell::sync::Lazy;

use crate::error::ExtractError;
use crate::sites::SiteRegistry;

/// `(id, site JSON, blacklist text)` for every builtin portal.
const BUILTIN_SITES: &[(&str, &str, &str)] = &[
    (
        "alfahir",
        include_str!("../../data/sites/alfahir.json"),
        include_str!("../../data/blacklists/alfahir.txt"),
    ),
    (
        "hang",
        include_str!("../../data/sites/hang.json"),
        include_str!("../../data/blacklists/hang.txt"),
    ),
    (
        "hiradohu",
        include_str!("../../data/sites/hiradohu.json"),
        include_str!("../../data/blacklists/hiradohu.txt"),
    ),
    (
        "hvg",
        include_str!("../../data/sites/hvg.json"),
        include_str!("../../data/blacklists/hvg.txt"),
    ),
    (
        "kronika",
        include_str!("../../data/sites/kronika.json"),
        include_str!("../../data/blacklists/kronika.txt"),
    ),
    (
        "magyarnarancs",
        include_str!("../../data/sites/magyarnarancs.json"),
        include_str!("../../data/blacklists/magyarnarancs.txt"),
    ),
    (
        "merce",
        include_str!("../../data/sites/merce.json"),
        include_str!("../../data/blacklists/merce.txt"),
    ),
    (
        "vadhajtasok",
        include_str!("../../data/sites/vadhajtasok.json"),
        include_str!("../../data/blacklists/vadhajtasok.txt"),
    ),
];

static BUILTIN: Lazy<Result<SiteRegistry, String>> =
    Lazy::new(|| try_load_builtin_registry().map_err(|e| e.to_string()));

/// Builds a registry from the embedded portal data.
pub fn try_load_builtin_registry() -> Result<SiteRegistry, ExtractError> {
    let mut registry = SiteRegistry::new();
    for (id, json, blacklist) in BUILTIN_SITES {
        let origin = format!("builtin:{}", id);
        registry.load_json(json, &origin, None)?;
        match registry.sites.get_mut(*id) {
            Some(site) => site.blacklist.extend_lines(blacklist),
            None => {
                let msg = anyhow::anyhow!("site file does not define portal {:?}", id);
                return Err(ExtractError::config(origin, "load builtin site", Some(msg)));
            }
        }
    }
    Ok(registry)
}

/// Loads the builtin site registry from embedded JSON.
///
/// The embedded data is parsed once per process; later calls clone the cached registry.
///
/// # Panics
///
/// Panics if the embedded JSON is malformed or cannot be deserialized.
pub fn load_builtin_registry() -> SiteRegistry {
    match &*BUILTIN {
        Ok(registry) => registry.clone(),
        Err(msg) => panic!("failed to parse builtin sites: {}", msg),
    }
}
