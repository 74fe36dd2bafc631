//! Product repository over injectable key-value storage.
//!
//! The catalog is kept as one JSON array under [`PRODUCTS_KEY`], the way a
//! browser key-value store would hold it. [`MemoryStorage`] backs tests and
//! one-shot CLI runs; [`FileStorage`] writes one file per key on disk.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{RepositoryError, RepositoryResult};
use crate::models::{Category, Product};

/// Directory where the catalog is stored (relative to current dir)
pub const DEFAULT_STORE_DIR: &str = ".ezme";

/// Storage key holding the product array.
pub const PRODUCTS_KEY: &str = "products";

/// Storage key holding the last write timestamp (RFC 3339).
pub const UPDATED_AT_KEY: &str = "products-updated-at";

// =============================================================================
// Storage backends
// =============================================================================

/// Minimal string key-value store.
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> RepositoryResult<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> RepositoryResult<()>;
    fn remove_item(&mut self, key: &str) -> RepositoryResult<()>;
}

/// In-memory storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> RepositoryResult<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> RepositoryResult<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> RepositoryResult<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// Disk storage: each key is a `{key}.json` file in a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a storage rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: PathBuf::from(dir.as_ref()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> RepositoryResult<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(RepositoryError::Storage(format!("invalid key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl Default for FileStorage {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_DIR)
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> RepositoryResult<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set_item(&mut self, key: &str, value: &str) -> RepositoryResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, value)?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> RepositoryResult<()> {
        let path = self.path_for(key)?;
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Product catalog persisted through a [`KeyValueStorage`].
///
/// Every mutation rewrites the whole array, matching the one-key layout.
pub struct ProductRepository<S> {
    storage: S,
    products: Vec<Product>,
}

impl<S: KeyValueStorage> ProductRepository<S> {
    /// Load the catalog from storage (empty when the key is absent).
    pub fn new(storage: S) -> RepositoryResult<Self> {
        let products = match storage.get_item(PRODUCTS_KEY)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };
        Ok(Self { storage, products })
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn list(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Products of one category, in catalog order.
    pub fn by_category(&self, category: Category) -> Vec<&Product> {
        self.products.iter().filter(|p| p.category == category).collect()
    }

    /// Products flagged for the storefront home page.
    pub fn featured(&self) -> Vec<&Product> {
        self.products.iter().filter(|p| p.featured).collect()
    }

    /// Add a new product; fails if the id is taken.
    pub fn add(&mut self, product: Product) -> RepositoryResult<()> {
        if self.get(&product.id).is_some() {
            return Err(RepositoryError::Duplicate(product.id));
        }
        let mut next = self.products.clone();
        next.push(product);
        self.commit(next)
    }

    /// Replace an existing product; fails if the id is unknown.
    pub fn update(&mut self, product: Product) -> RepositoryResult<()> {
        let index = self
            .position(&product.id)
            .ok_or_else(|| RepositoryError::NotFound(product.id.clone()))?;
        let mut next = self.products.clone();
        next[index] = product;
        self.commit(next)
    }

    /// Insert or replace by id.
    pub fn upsert(&mut self, product: Product) -> RepositoryResult<()> {
        self.upsert_all(std::iter::once(product)).map(|_| ())
    }

    /// Insert or replace many products with a single write.
    ///
    /// Returns how many products were new.
    pub fn upsert_all(&mut self, products: impl IntoIterator<Item = Product>) -> RepositoryResult<usize> {
        let mut next = self.products.clone();
        let mut inserted = 0;
        for product in products {
            match next.iter_mut().find(|p| p.id == product.id) {
                Some(slot) => *slot = product,
                None => {
                    next.push(product);
                    inserted += 1;
                }
            }
        }
        self.commit(next)?;
        Ok(inserted)
    }

    /// Remove a product and return it.
    pub fn delete(&mut self, id: &str) -> RepositoryResult<Product> {
        let index = self
            .position(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        let mut next = self.products.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        Ok(removed)
    }

    /// Remove every product.
    pub fn clear(&mut self) -> RepositoryResult<()> {
        self.storage.remove_item(PRODUCTS_KEY)?;
        self.storage.remove_item(UPDATED_AT_KEY)?;
        self.products.clear();
        Ok(())
    }

    /// Time of the last write, if any.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.storage
            .get_item(UPDATED_AT_KEY)
            .ok()
            .flatten()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.products.iter().position(|p| p.id == id)
    }

    /// Write `next` to storage, then make it the in-memory catalog.
    ///
    /// On a failed write the catalog is left as it was.
    fn commit(&mut self, next: Vec<Product>) -> RepositoryResult<()> {
        let content = serde_json::to_string_pretty(&next)?;
        self.storage.set_item(PRODUCTS_KEY, &content)?;
        self.products = next;
        self.storage.set_item(UPDATED_AT_KEY, &Utc::now().to_rfc3339())
    }
}
