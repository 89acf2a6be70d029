//! The page CRUD surface.
//!
//! [`Wiki`] ties the store, the metadata cache, the renderer and the asset
//! builder to one configuration. It is the only entry point a front end
//! (the CLI here, a web layer elsewhere) needs:
//!
//! - `show` - rendered page plus navigation
//! - `edit` - raw source
//! - `save` - write, optionally moving the page first
//! - `delete`
//! - `pdf` - typeset page

use std::sync::Arc;

use crate::address::PageAddress;
use crate::asset::{AssetBuilder, Toolchain};
use crate::config::WikiConfig;
use crate::embed::Template;
use crate::embed::pdf::{PPDF_TEX, PdfVars};
use crate::error::{RenderWarning, WikiError};
use crate::log;
use crate::page::{MetaCache, PageNode, PageStore, TreeIndex};
use crate::render::MarkupRenderer;
use crate::utils::html::escape_latex;

#[cfg(test)]
mod tests;

/// A rendered page with its navigation context.
#[derive(Debug, Clone)]
pub struct ShowPage {
    pub node: PageNode,
    pub html: String,
    pub warnings: Vec<RenderWarning>,
    pub parent: Option<PageNode>,
    pub children: Vec<PageNode>,
    pub previous: Option<PageNode>,
    pub next: Option<PageNode>,
    pub edit_url: String,
    pub pdf_url: String,
}

/// Source of a page for editing. Missing pages edit as empty.
#[derive(Debug, Clone)]
pub struct EditPage {
    pub node: PageNode,
    pub source: String,
}

/// One line of a subtree listing.
#[derive(Debug, Clone)]
pub struct TreeEntry {
    pub depth: usize,
    pub node: PageNode,
}

pub struct Wiki {
    config: WikiConfig,
    store: PageStore,
    cache: MetaCache,
    assets: AssetBuilder,
}

impl Wiki {
    /// Open the wiki described by `config`, creating the storage root.
    pub fn open(config: WikiConfig) -> Result<Self, WikiError> {
        let assets = AssetBuilder::new(&config);
        Self::with_assets(config, assets)
    }

    /// Open with a custom toolchain for asset and PDF builds.
    pub fn with_toolchain(
        config: WikiConfig,
        toolchain: Arc<dyn Toolchain>,
    ) -> Result<Self, WikiError> {
        let assets = AssetBuilder::with_toolchain(&config, toolchain);
        Self::with_assets(config, assets)
    }

    fn with_assets(config: WikiConfig, assets: AssetBuilder) -> Result<Self, WikiError> {
        Ok(Self {
            store: PageStore::open(&config.storage.root)?,
            cache: MetaCache::new(),
            assets,
            config,
        })
    }

    pub fn config(&self) -> &WikiConfig {
        &self.config
    }

    pub fn tree(&self) -> TreeIndex<'_> {
        TreeIndex::new(&self.store, &self.cache)
    }

    fn renderer(&self) -> MarkupRenderer<'_> {
        MarkupRenderer::new(&self.config, &self.assets)
    }

    fn node(&self, address: &PageAddress) -> Result<PageNode, WikiError> {
        Ok(PageNode::load(&self.store, &self.cache, address.clone())?)
    }

    fn existing(&self, address: &PageAddress) -> Result<PageNode, WikiError> {
        let node = self.node(address)?;
        if !node.exists {
            return Err(WikiError::NotFound(address.clone()));
        }
        Ok(node)
    }

    /// Render a page for display.
    pub fn show(&self, address: &PageAddress) -> Result<ShowPage, WikiError> {
        let node = self.existing(address)?;
        let raw = node.raw_content(&self.store)?;
        let rendered = self.renderer().render(&raw, address);

        let tree = self.tree();
        let parent = match tree.parent(address) {
            Some(parent) => Some(self.node(&parent)?),
            None => None,
        };
        let (previous, next) = tree.series_neighbors(address)?;

        Ok(ShowPage {
            html: rendered.body,
            warnings: rendered.warnings,
            parent,
            children: tree.children(address)?,
            previous,
            next,
            edit_url: self.config.routes.edit_url(address),
            pdf_url: self.config.routes.pdf_url(address),
            node,
        })
    }

    /// Raw source for the editor.
    pub fn edit(&self, address: &PageAddress) -> Result<EditPage, WikiError> {
        let node = self.node(address)?;
        let source = node.raw_content(&self.store)?;
        Ok(EditPage { node, source })
    }

    /// Write `content` to `address`, moving the page to `new_address` first
    /// when one is given. Returns the address the content ended up at.
    pub fn save(
        &self,
        address: &PageAddress,
        new_address: Option<&PageAddress>,
        content: &str,
    ) -> Result<PageAddress, WikiError> {
        let target = new_address.unwrap_or(address);
        if target != address && self.store.rename(address, target)? {
            self.cache.invalidate_subtree(address);
            log!("store"; "moved {} -> {}", address, target);
        }

        self.store.save(target, &normalize(content))?;
        self.cache.invalidate(target);
        log!("store"; "saved {}", target);
        Ok(target.clone())
    }

    /// Delete a page body, collapsing emptied ancestors.
    pub fn delete(&self, address: &PageAddress) -> Result<(), WikiError> {
        if !self.store.delete(address)? {
            return Err(WikiError::NotFound(address.clone()));
        }
        self.cache.invalidate_subtree(address);
        log!("store"; "deleted {}", address);
        Ok(())
    }

    /// Depth-first listing below `address`, including `address` at depth 0.
    pub fn subtree(&self, address: &PageAddress) -> Result<Vec<TreeEntry>, WikiError> {
        let mut entries = Vec::new();
        let mut pending = vec![TreeEntry {
            depth: 0,
            node: self.existing(address)?,
        }];
        let tree = self.tree();
        while let Some(entry) = pending.pop() {
            let children = tree.children(&entry.node.address)?;
            pending.extend(children.into_iter().rev().map(|node| TreeEntry {
                depth: entry.depth + 1,
                node,
            }));
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Typeset a page to PDF bytes.
    pub fn pdf(&self, address: &PageAddress) -> Result<Vec<u8>, WikiError> {
        let node = self.existing(address)?;
        let raw = node.raw_content(&self.store)?;
        let rendered = self.renderer().render_latex(&raw, address);

        let title = escape_latex(node.title()).into_owned();
        let subtitle = escape_latex(node.meta.subtitle.as_deref().unwrap_or_default()).into_owned();
        let author = escape_latex(node.meta.author.as_deref().unwrap_or_default()).into_owned();
        let vars = PdfVars {
            title: &title,
            subtitle: &subtitle,
            author: &author,
            body: &rendered.body,
        };

        let template: Template<PdfVars<'_>> = match &self.config.toolchain.template_dir {
            Some(dir) => PPDF_TEX.or_override(&dir.join("pdf/ppdf.tex")).unwrap_or_else(|err| {
                log!("warning"; "pdf template override unreadable, using embedded: {}", err);
                PPDF_TEX
            }),
            None => PPDF_TEX,
        };

        log!("pdf"; "typesetting {}", address);
        self.assets
            .make_pdf(&template.render(&vars), 2)
            .map_err(WikiError::Pdf)
    }
}

/// Unix line endings, no surrounding whitespace.
fn normalize(content: &str) -> String {
    content.replace("\r\n", "\n").trim().to_string()
}
