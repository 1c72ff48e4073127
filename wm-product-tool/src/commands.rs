//! Subcommand implementations
//!
//! Each command works on loaded products and returns what should be
//! printed, so `main` only handles arguments, logging and output.

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;
use uuid::Uuid;
use wm_storage::{CopyMode, EventBus, ParameterSetLoader, Product, SeamRef};

/// Indented tree of series, seams, links and intervals
pub fn show(product: &Product) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Product \"{}\" ({}) type {}",
        product.name(),
        product.uuid(),
        product.product_type()
    );
    let pool = product.filter_parameter_sets();
    let _ = writeln!(
        out,
        "  filter parameter sets: {} loaded, {} discarded",
        pool.len(),
        pool.discarded().count()
    );
    for series in product.seam_series() {
        let _ = writeln!(
            out,
            "  Series {} \"{}\" ({}): {} entries",
            series.visual_number(),
            series.name(),
            series.uuid(),
            series.entries().len()
        );
        for entry in series.all_seams() {
            match entry {
                SeamRef::Seam(seam) => {
                    let _ = writeln!(
                        out,
                        "    Seam {} \"{}\" ({}): {} intervals, length {}, {} interval errors",
                        seam.visual_number(),
                        seam.name(),
                        seam.uuid(),
                        seam.intervals().len(),
                        seam.length(),
                        seam.interval_errors().len()
                    );
                }
                SeamRef::Link { link, target } => {
                    let _ = writeln!(
                        out,
                        "    Link {} -> Seam {} ({})",
                        link.visual_number(),
                        target.visual_number(),
                        link.uuid()
                    );
                }
            }
        }
    }
    out
}

/// Copy the product at `source` to `output`
pub fn duplicate(
    source: &Path,
    output: &Path,
    mode: CopyMode,
    bus: Option<&EventBus>,
) -> Result<Product> {
    let product = load(source, bus)?;
    let copy = product.duplicate(mode);
    copy.save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(source = %product.uuid(), copy = %copy.uuid(), "Duplicated product");
    Ok(copy)
}

/// Copy `seam` to the tail of the series numbered `series`, or of its own
/// series, returning the change log of the edit
pub fn copy_seam(
    product: &mut Product,
    seam: &Uuid,
    series: Option<i32>,
    mode: CopyMode,
) -> Result<Vec<Value>> {
    let source_series = product
        .find_seam(seam)
        .ok_or_else(|| anyhow!("Seam {} not found", seam))?
        .series();
    let target = match series {
        Some(number) => product
            .find_seam_series(number)
            .ok_or_else(|| anyhow!("Seam series {} not found", number))?
            .uuid(),
        None => source_series,
    };
    product.set_change_tracking_enabled(true);
    let copy = product
        .create_seam_copy(mode, &target, seam)
        .ok_or_else(|| anyhow!("Seam {} could not be copied", seam))?;
    info!(seam = %seam, copy = %copy, "Copied seam");
    Ok(product.changes())
}

/// Link `seam` under `label`, returning the change log of the edit
pub fn link_seam(product: &mut Product, seam: &Uuid, label: &str) -> Result<Vec<Value>> {
    if product.find_seam(seam).is_none() {
        return Err(anyhow!("Seam {} not found", seam));
    }
    product.set_change_tracking_enabled(true);
    let link = product
        .create_seam_link(seam, label)
        .ok_or_else(|| anyhow!("Label {} is not a free seam number", label))?;
    info!(seam = %seam, link = %link, label, "Linked seam");
    Ok(product.changes())
}

/// Load every filter parameter set, drop the unused ones and save in place
///
/// Returns how many sets the document lost.
pub async fn prune(
    path: &Path,
    loader: &ParameterSetLoader,
    bus: Option<&EventBus>,
) -> Result<usize> {
    let before = stored_set_count(path)?;
    let mut product = Product::load_lazy(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    product.set_event_bus(bus.cloned());
    let loaded = loader.load_discarded(&mut product).await?;
    product.remove_unused_filter_parameter_sets();
    product.save_in_place()?;
    let removed = before.saturating_sub(product.filter_parameter_sets().len());
    info!(path = %path.display(), loaded, removed, "Pruned product");
    Ok(removed)
}

fn stored_set_count(path: &Path) -> Result<usize> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let document: Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("{} is not a JSON document", path.display()))?;
    Ok(document
        .get("filterParameterSets")
        .and_then(Value::as_array)
        .map_or(0, Vec::len))
}

/// Re-serialize the product, writing current keys only
pub fn normalize(path: &Path, output: Option<&Path>, bus: Option<&EventBus>) -> Result<()> {
    let product = load(path, bus)?;
    let output = output.unwrap_or(path);
    product
        .save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(())
}

/// Load a product and attach `bus` to it
pub fn load(path: &Path, bus: Option<&EventBus>) -> Result<Product> {
    let mut product =
        Product::load(path).with_context(|| format!("Failed to load {}", path.display()))?;
    product.set_event_bus(bus.cloned());
    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_sample(dir: &TempDir) -> (std::path::PathBuf, Uuid) {
        let mut product = Product::new(Uuid::new_v4());
        product.set_name("Bracket");
        let series = product.create_first_seam_series().unwrap();
        let seam = product.create_seam_in(&series).unwrap();
        product.create_seam_in(&series).unwrap();
        let path = dir.path().join("bracket.json");
        product.save(&path).unwrap();
        (path, seam)
    }

    #[test]
    fn test_show_lists_links() {
        let dir = TempDir::new().unwrap();
        let (path, seam) = write_sample(&dir);
        let mut product = load(&path, None).unwrap();
        product.create_seam_link(&seam, "9").unwrap();
        let text = show(&product);
        assert!(text.starts_with("Product \"Bracket\""));
        assert!(text.contains("Seam 2 "));
        assert!(text.contains("Link 10 -> Seam 1"));
    }

    #[test]
    fn test_duplicate_writes_new_product() {
        let dir = TempDir::new().unwrap();
        let (path, _) = write_sample(&dir);
        let output = dir.path().join("copy.json");
        let copy = duplicate(&path, &output, CopyMode::WithDifferentIds, None).unwrap();
        let reloaded = load(&output, None).unwrap();
        assert_eq!(reloaded.uuid(), copy.uuid());
        assert_ne!(reloaded.uuid(), load(&path, None).unwrap().uuid());
    }

    #[test]
    fn test_copy_seam_reports_changes() {
        let dir = TempDir::new().unwrap();
        let (path, seam) = write_sample(&dir);
        let mut product = load(&path, None).unwrap();
        let changes = copy_seam(&mut product, &seam, None, CopyMode::WithDifferentIds).unwrap();
        assert!(changes.iter().any(|c| c.get("seamSeries").is_some()));
        assert_eq!(product.all_real_seams().len(), 3);
        assert!(copy_seam(&mut product, &seam, Some(4), CopyMode::Identical).is_err());
        assert!(copy_seam(&mut product, &Uuid::new_v4(), None, CopyMode::Identical).is_err());
    }

    #[test]
    fn test_link_rejects_taken_number() {
        let dir = TempDir::new().unwrap();
        let (path, seam) = write_sample(&dir);
        let mut product = load(&path, None).unwrap();
        assert!(link_seam(&mut product, &seam, "1").is_err());
        assert!(link_seam(&mut product, &seam, "6").is_ok());
    }

    #[tokio::test]
    async fn test_prune_drops_unused_sets() {
        let dir = TempDir::new().unwrap();
        let (path, seam) = write_sample(&dir);
        let mut product = load(&path, None).unwrap();
        let set = product.find_seam(&seam).unwrap().task().graph_param_set();
        let other = product.seam_series()[0].seams().nth(1).unwrap().uuid();
        product.find_seam_mut(&other).unwrap().task_mut().set_graph_param_set(set);
        product.save(&path).unwrap();

        let removed = prune(&path, &ParameterSetLoader::default(), None).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(load(&path, None).unwrap().filter_parameter_sets().len(), 1);
    }

    #[test]
    fn test_normalize_to_other_file() {
        let dir = TempDir::new().unwrap();
        let (path, _) = write_sample(&dir);
        let output = dir.path().join("normalized.json");
        normalize(&path, Some(&output), None).unwrap();
        assert_eq!(load(&output, None).unwrap().to_json(), load(&path, None).unwrap().to_json());
    }
}
