//! Static export of a catalog tree to JSON files.
//!
//! Layout under the output directory:
//!
//! ```text
//! index.json
//! {collection_id}/collection.json
//! {collection_id}/{item_id}/{item_id}.json
//! ```
//!
//! Every link is absolute, resolved against the public URL of the root file.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use super::types::{Catalog, Collection, Item, Link};
use crate::error::CatalogError;

const ROOT_FILE_FALLBACK: &str = "catalog.json";

/// Counts of what a write produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteSummary {
    pub collections: usize,
    pub items: usize,
}

/// Writes a catalog tree under one directory.
pub struct CatalogWriter {
    root_href: Url,
    output_dir: PathBuf,
}

impl CatalogWriter {
    pub fn new(root_href: &str, output_dir: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        Ok(Self {
            root_href: Url::parse(root_href)?,
            output_dir: output_dir.into(),
        })
    }

    fn root_file(&self) -> String {
        self.root_href
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .unwrap_or(ROOT_FILE_FALLBACK)
            .to_string()
    }

    fn href(&self, relative: &str) -> Result<String, CatalogError> {
        Ok(self.root_href.join(relative)?.to_string())
    }

    fn collection_path(collection: &Collection) -> String {
        format!("{}/collection.json", collection.id)
    }

    fn item_path(collection: &Collection, item: &Item) -> String {
        format!("{}/{}/{}.json", collection.id, item.id, item.id)
    }

    /// Write the whole tree, replacing files that already exist.
    pub fn write(&self, catalog: &Catalog) -> Result<WriteSummary, CatalogError> {
        let root_file = self.root_file();
        let root_href = self.href(&root_file)?;
        let mut summary = WriteSummary::default();

        let mut root = catalog.clone();
        root.links.push(Link::new("root", &root_href).media_type(Link::JSON));
        root.links.push(Link::new("self", &root_href).media_type(Link::JSON));

        for collection in &catalog.children {
            let collection_path = Self::collection_path(collection);
            let collection_href = self.href(&collection_path)?;
            root.links.push(
                Link::new("child", &collection_href)
                    .media_type(Link::JSON)
                    .title(&collection.title),
            );

            let mut document = collection.clone();
            document.links.push(Link::new("root", &root_href).media_type(Link::JSON));
            document.links.push(Link::new("parent", &root_href).media_type(Link::JSON));
            document.links.push(Link::new("self", &collection_href).media_type(Link::JSON));

            for item in &collection.items {
                let item_path = Self::item_path(collection, item);
                let item_href = self.href(&item_path)?;
                document.links.push(Link::new("item", &item_href).media_type(Link::GEOJSON));

                let mut item = item.clone();
                item.links.push(Link::new("root", &root_href).media_type(Link::JSON));
                item.links.push(Link::new("parent", &collection_href).media_type(Link::JSON));
                item.links.push(Link::new("collection", &collection_href).media_type(Link::JSON));
                item.links.push(Link::new("self", &item_href).media_type(Link::GEOJSON));

                self.write_json(&item_path, &item)?;
                summary.items += 1;
            }

            self.write_json(&collection_path, &document)?;
            summary.collections += 1;
        }

        self.write_json(&root_file, &root)?;

        info!(
            collections = summary.collections,
            items = summary.items,
            "Wrote catalog to {}",
            self.output_dir.display()
        );

        Ok(summary)
    }

    fn write_json<T: Serialize>(&self, relative: &str, document: &T) -> Result<(), CatalogError> {
        let path = self.output_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        write_pretty(&path, document)?;
        debug!(path = %path.display(), "Wrote document");
        Ok(())
    }
}

fn write_pretty<T: Serialize>(path: &Path, document: &T) -> Result<(), CatalogError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, document)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
