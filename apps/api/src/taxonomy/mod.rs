//! Taxonomy Access — canonical skills and tiered action verbs from YAML.
//!
//! Loaded lazily on first use, cached for the process lifetime, and
//! invalidated explicitly via `reload()`. The `Taxonomy` is constructed once
//! in `main` and injected through `AppState` — no module-level globals.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

/// Alias (lowercase) → canonical display name.
pub type SkillMap = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("malformed configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("missing required verb categories: {missing:?}")]
    Schema { missing: Vec<String> },
}

/// The strength tier an action verb belongs to. Weights are fixed design
/// constants, not configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbTier {
    Impact,
    Build,
    Support,
}

impl VerbTier {
    pub fn weight(self) -> f64 {
        match self {
            VerbTier::Impact => 3.0,
            VerbTier::Build => 2.0,
            VerbTier::Support => 1.0,
        }
    }
}

/// Action verbs categorized by tier, lowercased for lookup.
#[derive(Debug, Clone, Default)]
pub struct VerbTiers {
    pub impact: BTreeSet<String>,
    pub build: BTreeSet<String>,
    pub support: BTreeSet<String>,
}

impl VerbTiers {
    /// Returns the tier of `token` (already lowercased), if it is a known verb.
    pub fn tier_of(&self, token: &str) -> Option<VerbTier> {
        if self.impact.contains(token) {
            Some(VerbTier::Impact)
        } else if self.build.contains(token) {
            Some(VerbTier::Build)
        } else if self.support.contains(token) {
            Some(VerbTier::Support)
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct SkillEntry {
    name: String,
    #[serde(default)]
    synonyms: Vec<String>,
}

/// Versioned skill/verb configuration with a process-lifetime cache.
///
/// Concurrent first access is safe: readers double-check under the write
/// lock, so at most one load runs and no torn state is observable.
pub struct Taxonomy {
    dir: PathBuf,
    skills: RwLock<Option<Arc<SkillMap>>>,
    verbs: RwLock<Option<Arc<VerbTiers>>>,
}

impl Taxonomy {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            skills: RwLock::new(None),
            verbs: RwLock::new(None),
        }
    }

    /// Returns the alias → canonical skill mapping, loading it on first call.
    pub fn skills(&self) -> Result<Arc<SkillMap>, ConfigError> {
        if let Some(cached) = self.skills.read().expect("skills lock poisoned").as_ref() {
            return Ok(Arc::clone(cached));
        }

        let mut slot = self.skills.write().expect("skills lock poisoned");
        if let Some(cached) = slot.as_ref() {
            return Ok(Arc::clone(cached));
        }

        let loaded = Arc::new(load_skills(&self.dir.join("skills.yaml"))?);
        *slot = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Returns the tiered action-verb lists, loading them on first call.
    pub fn verbs(&self) -> Result<Arc<VerbTiers>, ConfigError> {
        if let Some(cached) = self.verbs.read().expect("verbs lock poisoned").as_ref() {
            return Ok(Arc::clone(cached));
        }

        let mut slot = self.verbs.write().expect("verbs lock poisoned");
        if let Some(cached) = slot.as_ref() {
            return Ok(Arc::clone(cached));
        }

        let loaded = Arc::new(load_action_verbs(&self.dir.join("action_verbs.yaml"))?);
        *slot = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Resolves an alias (case-insensitive) to its canonical skill name.
    pub fn find_canonical(&self, alias: &str) -> Result<Option<String>, ConfigError> {
        let skills = self.skills()?;
        Ok(skills.get(&alias.to_lowercase()).cloned())
    }

    /// Clears both caches; the next access re-reads from disk.
    pub fn reload(&self) {
        *self.skills.write().expect("skills lock poisoned") = None;
        *self.verbs.write().expect("verbs lock poisoned") = None;
        info!("taxonomy cache cleared, will reload on next access");
    }
}

/// Reads `skills.yaml` and flattens categories into an alias → canonical map.
///
/// Categories iterate in sorted (BTreeMap) order and entries in file order,
/// so alias conflicts resolve deterministically: the last writer wins.
fn load_skills(path: &Path) -> Result<SkillMap, ConfigError> {
    let raw = read_config(path)?;

    let categories: BTreeMap<String, Vec<SkillEntry>> =
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let mut mapping = SkillMap::new();
    for (category, entries) in &categories {
        for entry in entries {
            if entry.name.trim().is_empty() {
                warn!("skipping unnamed skill entry in category '{category}'");
                continue;
            }
            insert_alias(&mut mapping, &entry.name, &entry.name);
            for synonym in &entry.synonyms {
                insert_alias(&mut mapping, synonym, &entry.name);
            }
        }
    }

    info!(
        "loaded {} skill aliases from {} categories",
        mapping.len(),
        categories.len()
    );
    Ok(mapping)
}

fn insert_alias(mapping: &mut SkillMap, alias: &str, canonical: &str) {
    let key = alias.to_lowercase();
    if let Some(previous) = mapping.insert(key, canonical.to_string()) {
        if previous != canonical {
            warn!("alias '{alias}' remapped from '{previous}' to '{canonical}' (last-write-wins)");
        }
    }
}

/// Reads `action_verbs.yaml` and validates that all three tiers are present.
fn load_action_verbs(path: &Path) -> Result<VerbTiers, ConfigError> {
    let raw = read_config(path)?;

    let categories: BTreeMap<String, Vec<String>> =
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let required = ["impact_verbs", "build_verbs", "support_verbs"];
    let missing: Vec<String> = required
        .iter()
        .filter(|key| !categories.contains_key(**key))
        .map(|key| key.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ConfigError::Schema { missing });
    }

    let tier = |key: &str| -> BTreeSet<String> {
        categories[key].iter().map(|v| v.to_lowercase()).collect()
    };

    let tiers = VerbTiers {
        impact: tier("impact_verbs"),
        build: tier("build_verbs"),
        support: tier("support_verbs"),
    };

    info!(
        "loaded {} action verbs across 3 tiers",
        tiers.impact.len() + tiers.build.len() + tiers.support.len()
    );
    Ok(tiers)
}

fn read_config(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|_| ConfigError::NotFound {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SKILLS_FIXTURE: &str = r#"
languages:
  - name: Python
    synonyms: [py, python3]
  - name: Rust
frameworks:
  - name: React
    synonyms: [reactjs]
"#;

    const VERBS_FIXTURE: &str = r#"
impact_verbs: [led, managed]
build_verbs: [developed, built]
support_verbs: [assisted]
"#;

    fn write_taxonomy(skills: &str, verbs: &str) -> TempDir {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("skills.yaml"), skills).expect("write skills");
        fs::write(dir.path().join("action_verbs.yaml"), verbs).expect("write verbs");
        dir
    }

    #[test]
    fn test_skills_map_includes_synonyms() {
        let dir = write_taxonomy(SKILLS_FIXTURE, VERBS_FIXTURE);
        let taxonomy = Taxonomy::new(dir.path());
        let skills = taxonomy.skills().expect("skills load");
        assert_eq!(skills.get("py").map(String::as_str), Some("Python"));
        assert_eq!(skills.get("python"), skills.get("python3"));
        assert_eq!(skills.get("reactjs").map(String::as_str), Some("React"));
    }

    #[test]
    fn test_find_canonical_is_case_insensitive() {
        let dir = write_taxonomy(SKILLS_FIXTURE, VERBS_FIXTURE);
        let taxonomy = Taxonomy::new(dir.path());
        let canonical = taxonomy.find_canonical("PYTHON3").expect("lookup");
        assert_eq!(canonical.as_deref(), Some("Python"));
        assert_eq!(taxonomy.find_canonical("cobol").expect("lookup"), None);
    }

    #[test]
    fn test_alias_conflict_last_write_wins() {
        // "js" claimed by two skills; categories iterate alphabetically, so
        // the entry under "zz_tools" (later category) wins deterministically.
        let skills = r#"
languages:
  - name: JavaScript
    synonyms: [js]
zz_tools:
  - name: JScript
    synonyms: [js]
"#;
        let dir = write_taxonomy(skills, VERBS_FIXTURE);
        let taxonomy = Taxonomy::new(dir.path());
        let canonical = taxonomy.find_canonical("js").expect("lookup");
        assert_eq!(canonical.as_deref(), Some("JScript"));
    }

    #[test]
    fn test_verbs_lookup_by_tier() {
        let dir = write_taxonomy(SKILLS_FIXTURE, VERBS_FIXTURE);
        let taxonomy = Taxonomy::new(dir.path());
        let verbs = taxonomy.verbs().expect("verbs load");
        assert_eq!(verbs.tier_of("led"), Some(VerbTier::Impact));
        assert_eq!(verbs.tier_of("developed"), Some(VerbTier::Build));
        assert_eq!(verbs.tier_of("assisted"), Some(VerbTier::Support));
        assert_eq!(verbs.tier_of("pondered"), None);
    }

    #[test]
    fn test_tier_weights_are_fixed() {
        assert_eq!(VerbTier::Impact.weight(), 3.0);
        assert_eq!(VerbTier::Build.weight(), 2.0);
        assert_eq!(VerbTier::Support.weight(), 1.0);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let taxonomy = Taxonomy::new(dir.path());
        match taxonomy.skills() {
            Err(ConfigError::NotFound { path }) => {
                assert!(path.ends_with("skills.yaml"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let dir = write_taxonomy("languages: {not: [valid", VERBS_FIXTURE);
        let taxonomy = Taxonomy::new(dir.path());
        assert!(matches!(taxonomy.skills(), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_verb_category_is_schema_error() {
        let verbs = "impact_verbs: [led]\nbuild_verbs: [developed]\n";
        let dir = write_taxonomy(SKILLS_FIXTURE, verbs);
        let taxonomy = Taxonomy::new(dir.path());
        match taxonomy.verbs() {
            Err(ConfigError::Schema { missing }) => {
                assert_eq!(missing, vec!["support_verbs".to_string()]);
            }
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_reload_picks_up_changed_config() {
        let dir = write_taxonomy(SKILLS_FIXTURE, VERBS_FIXTURE);
        let taxonomy = Taxonomy::new(dir.path());
        assert!(taxonomy.find_canonical("kotlin").expect("lookup").is_none());

        fs::write(
            dir.path().join("skills.yaml"),
            "languages:\n  - name: Kotlin\n",
        )
        .expect("rewrite skills");

        // Cached until explicitly reloaded.
        assert!(taxonomy.find_canonical("kotlin").expect("lookup").is_none());
        taxonomy.reload();
        assert_eq!(
            taxonomy.find_canonical("kotlin").expect("lookup").as_deref(),
            Some("Kotlin")
        );
    }

    #[test]
    fn test_concurrent_first_access_loads_once_per_view() {
        let dir = write_taxonomy(SKILLS_FIXTURE, VERBS_FIXTURE);
        let taxonomy = Arc::new(Taxonomy::new(dir.path()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let taxonomy = Arc::clone(&taxonomy);
                std::thread::spawn(move || taxonomy.skills().expect("skills load"))
            })
            .collect();

        let maps: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("thread join"))
            .collect();

        // All threads observe the same cached Arc.
        for map in &maps[1..] {
            assert!(Arc::ptr_eq(&maps[0], map));
        }
    }
}
