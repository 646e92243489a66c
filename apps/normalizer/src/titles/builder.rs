//! Offline synonym-map construction: bucket the title universe, cluster
//! each bucket through the oracle, merge the results.
//!
//! Buckets are independent — one bucket failing the oracle never affects
//! another, and failed buckets are persisted for out-of-band reprocessing.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::llm_client::{ClusteringOracle, TitleClusters};

/// Characters stripped from the bucket key around the first token.
fn is_key_trim(c: char) -> bool {
    "!@#$%^&*()_+-=[]{}|;:,.<>? ".contains(c)
}

/// Partitions raw titles into buckets keyed by their first whitespace
/// token, lower-cased with surrounding punctuation stripped. Keeps each
/// oracle call small and plausibly related by naming convention.
pub fn group_titles(titles: &[String]) -> Vec<Vec<String>> {
    let mut buckets: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for title in titles {
        let Some(first) = title.split_whitespace().next() else {
            continue;
        };
        let key = first.to_lowercase().trim_matches(is_key_trim).to_string();
        buckets.entry(key).or_default().push(title.clone());
    }
    buckets.into_values().collect()
}

/// Folds one bucket's clustering into the global map. When two buckets
/// independently produce the same canonical key, variant lists are
/// unioned without duplicates.
pub fn merge_clusters(global: &mut HashMap<String, Vec<String>>, bucket: TitleClusters) {
    for (canonical, variants) in bucket {
        let entry = global.entry(canonical).or_default();
        for variant in variants {
            if !entry.contains(&variant) {
                entry.push(variant);
            }
        }
    }
}

/// Final state of one build run.
#[derive(Debug)]
pub struct BuildOutcome {
    pub mappings: HashMap<String, Vec<String>>,
    pub failed_buckets: Vec<Vec<String>>,
}

/// Runs the full build: group, cluster, merge, persist.
///
/// The mapping file is reloaded first when it exists, so a re-run only ever
/// adds or extends mappings. Both output files are rewritten after every
/// bucket — an interrupt loses at most the in-flight bucket.
pub async fn run_build(
    oracle: &dyn ClusteringOracle,
    titles: &[String],
    mappings_path: &Path,
    failed_path: &Path,
) -> Result<BuildOutcome> {
    let mut mappings = load_existing(mappings_path);
    let mut failed: Vec<Vec<String>> = Vec::new();

    let buckets = group_titles(titles);
    info!(
        "Grouped {} titles into {} buckets ({} existing mappings)",
        titles.len(),
        buckets.len(),
        mappings.len()
    );

    for bucket in &buckets {
        match oracle.cluster(bucket).await {
            Ok(Some(clusters)) => {
                merge_clusters(&mut mappings, clusters);
                info!("Clustered bucket of {} titles", bucket.len());
            }
            Ok(None) => {
                warn!(
                    "Bucket of {} titles produced no clustering, queued for reprocessing",
                    bucket.len()
                );
                failed.push(bucket.clone());
            }
            Err(e) => {
                warn!("Bucket clustering failed: {e}; queued for reprocessing");
                failed.push(bucket.clone());
            }
        }
        persist(&mappings, &failed, mappings_path, failed_path)?;
    }

    info!(
        "Title map build finished: {} canonical titles, {} failed buckets",
        mappings.len(),
        failed.len()
    );
    Ok(BuildOutcome {
        mappings,
        failed_buckets: failed,
    })
}

fn load_existing(path: &Path) -> HashMap<String, Vec<String>> {
    let Ok(raw) = std::fs::read_to_string(path) else {
        return HashMap::new();
    };
    match serde_json::from_str(&raw) {
        Ok(existing) => existing,
        Err(e) => {
            warn!(
                "Existing mapping file {} is malformed ({e}); starting fresh",
                path.display()
            );
            HashMap::new()
        }
    }
}

fn persist(
    mappings: &HashMap<String, Vec<String>>,
    failed: &[Vec<String>],
    mappings_path: &Path,
    failed_path: &Path,
) -> Result<()> {
    let rendered = serde_json::to_string_pretty(mappings)?;
    std::fs::write(mappings_path, rendered)
        .with_context(|| format!("writing {}", mappings_path.display()))?;

    let rendered = serde_json::to_string_pretty(failed)?;
    std::fs::write(failed_path, rendered)
        .with_context(|| format!("writing {}", failed_path.display()))?;
    Ok(())
}
