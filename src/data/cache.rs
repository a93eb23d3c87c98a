use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::error::{LoadError, LoadResult};
use super::loader::{load_file, CatalogSchema};
use super::model::ProductCatalog;

/// Identity of a loaded source: the same path with a different size or
/// modification time is a different source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceKey {
    pub path: PathBuf,
    pub schema: CatalogSchema,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl SourceKey {
    pub fn for_path(path: &Path, schema: CatalogSchema) -> LoadResult<Self> {
        let io_err = |source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let canonical = path.canonicalize().map_err(io_err)?;
        let meta = std::fs::metadata(&canonical).map_err(io_err)?;
        Ok(SourceKey {
            path: canonical,
            schema,
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// Memoizes parsed catalogs for the lifetime of the process.
///
/// Failed loads are not remembered, so fixing the file and retrying works.
#[derive(Debug, Default)]
pub struct CatalogCache {
    entries: HashMap<SourceKey, Arc<ProductCatalog>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached catalog for `path`, parsing it on first use.
    pub fn get_or_load(
        &mut self,
        path: &Path,
        schema: CatalogSchema,
    ) -> LoadResult<Arc<ProductCatalog>> {
        let key = SourceKey::for_path(path, schema)?;
        if let Some(hit) = self.entries.get(&key) {
            log::debug!("catalog cache hit for {}", key.path.display());
            return Ok(Arc::clone(hit));
        }

        log::debug!("catalog cache miss for {}", key.path.display());
        let catalog = Arc::new(load_file(&key.path, schema)?);
        // An older version of the same file is never hit again.
        self.entries.retain(|k, _| k.path != key.path || k.schema != key.schema);
        self.entries.insert(key, Arc::clone(&catalog));
        log::debug!("{} catalog(s) cached", self.len());
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
product_name,brand,retail_price,discounted_price
Mug,Acme,100,80
Plate,Zeta,50,45
";

    fn write_catalog(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("catalog.csv");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn second_load_is_a_hit_with_identical_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_catalog(&dir, CSV);
        let mut cache = CatalogCache::new();

        let first = cache.get_or_load(&path, CatalogSchema::Minimal).unwrap();
        let second = cache.get_or_load(&path, CatalogSchema::Minimal).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        let fresh = load_file(&path, CatalogSchema::Minimal).unwrap();
        assert_eq!(*second, fresh);
    }

    #[test]
    fn schema_is_part_of_the_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.csv");
        std::fs::write(
            &path,
            "product_name,product_category_tree,crawl_timestamp,product_rating,brand,retail_price,discounted_price\n\
             Mug,,2016-01-01,4,Acme,100,80\n",
        )
        .unwrap();
        let mut cache = CatalogCache::new();

        let minimal = cache.get_or_load(&path, CatalogSchema::Minimal).unwrap();
        let full = cache.get_or_load(&path, CatalogSchema::Full).unwrap();
        assert_eq!(minimal.len(), 1);
        // Full drops rows without a category path.
        assert_eq!(full.len(), 0);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn changed_file_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_catalog(&dir, CSV);
        let mut cache = CatalogCache::new();

        let before = cache.get_or_load(&path, CatalogSchema::Minimal).unwrap();
        write_catalog(&dir, &format!("{CSV}Bowl,Acme,30,20\n"));
        let after = cache.get_or_load(&path, CatalogSchema::Minimal).unwrap();

        assert_eq!(before.len(), 2);
        assert_eq!(after.len(), 3);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_reload_keeps_previous_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_catalog(&dir, CSV);
        let mut cache = CatalogCache::new();

        cache.get_or_load(&path, CatalogSchema::Minimal).unwrap();
        write_catalog(&dir, "brand,retail_price\nAcme,10\n");
        assert!(cache.get_or_load(&path, CatalogSchema::Minimal).is_err());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_catalog(&dir, "brand,retail_price\nAcme,10\n");
        let mut cache = CatalogCache::new();

        assert!(cache.get_or_load(&path, CatalogSchema::Minimal).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn missing_file_reports_io_error() {
        let mut cache = CatalogCache::new();
        let err = cache
            .get_or_load(Path::new("/definitely/not/here.csv"), CatalogSchema::Minimal)
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
