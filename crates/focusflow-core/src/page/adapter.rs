//! Bridges a page to the simplifier service.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use focusflow_config::SimplifierConfig;
use focusflow_protocols::{BatchItem, Grade, Settings};

use super::discover::discover;
use super::tree::{NodeId, PageTree};
use crate::fallback::FallbackSimplifier;
use crate::service::SimplifierHandle;

#[cfg(test)]
#[path = "adapter_tests.rs"]
mod tests;

/// Whether the remote service was reachable the last time we asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Unknown,
    Available,
    Unavailable,
}

impl From<bool> for Availability {
    fn from(available: bool) -> Self {
        if available {
            Self::Available
        } else {
            Self::Unavailable
        }
    }
}

/// A text block picked out of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnit {
    pub id: String,
    pub text: String,
    pub node: NodeId,
}

impl TextUnit {
    pub fn to_batch_item(&self) -> BatchItem {
        BatchItem::new(self.id.clone(), self.text.clone())
    }
}

#[derive(Debug, Clone)]
pub struct AdapterOptions {
    /// Units per `simplify_batch` request.
    pub batch_size: usize,
    /// Blocks with less trimmed text than this are ignored.
    pub min_text_length: usize,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            batch_size: 10,
            min_text_length: 20,
        }
    }
}

impl From<&SimplifierConfig> for AdapterOptions {
    fn from(config: &SimplifierConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            min_text_length: config.min_text_length,
        }
    }
}

/// Per-page state: originals for restoring, remote availability, and
/// whether the page is currently showing simplified text.
pub struct PageAdapter {
    service: SimplifierHandle,
    fallback: FallbackSimplifier,
    options: AdapterOptions,
    page_id: String,
    originals: HashMap<NodeId, String>,
    availability: Availability,
    active: bool,
    /// Last backend URL the service accepted from settings.
    backend_url: Option<String>,
}

impl PageAdapter {
    pub fn new(
        service: SimplifierHandle,
        page_id: impl Into<String>,
        options: AdapterOptions,
    ) -> Self {
        Self {
            service,
            fallback: FallbackSimplifier::new(),
            options,
            page_id: page_id.into(),
            originals: HashMap::new(),
            availability: Availability::Unknown,
            active: false,
            backend_url: None,
        }
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    pub fn availability(&self) -> Availability {
        self.availability
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Original text remembered for `node`, if it was ever collected.
    pub fn original(&self, node: NodeId) -> Option<&str> {
        self.originals.get(&node).map(String::as_str)
    }

    pub fn discover(&self, tree: &PageTree) -> Vec<NodeId> {
        discover(tree, self.options.min_text_length)
    }

    /// Length is judged on the remembered original, so a node whose
    /// simplified text got short is still picked up on the next grade.
    fn units(&self, tree: &PageTree, prefix: &str) -> Vec<TextUnit> {
        let stamp = chrono::Utc::now().timestamp_millis();
        discover(tree, 0)
            .into_iter()
            .filter_map(|node| {
                let text = match self.originals.get(&node) {
                    Some(original) => original.clone(),
                    None => tree.text_content(node).trim().to_string(),
                };
                (text.chars().count() >= self.options.min_text_length).then_some((node, text))
            })
            .enumerate()
            .map(|(index, (node, text))| TextUnit {
                id: format!("{prefix}_{stamp}_{index}"),
                text,
                node,
            })
            .collect()
    }

    /// Text units for the page, remembering each node's original text the
    /// first time it is seen.
    ///
    /// Nodes already simplified are reported with their original text, so a
    /// grade change re-simplifies the source rather than the previous output.
    pub fn collect_units(&mut self, tree: &PageTree) -> Vec<TextUnit> {
        let units = self.units(tree, "p");
        for unit in &units {
            self.originals
                .entry(unit.node)
                .or_insert_with(|| unit.text.clone());
        }
        units
    }

    async fn refresh_availability(&mut self) -> Availability {
        let available = match self.service.probe().await {
            Ok(available) => available,
            Err(e) => {
                warn!(page_id = %self.page_id, error = %e, "Availability probe failed");
                false
            }
        };
        self.availability = Availability::from(available);
        self.availability
    }

    /// Simplify every unit on the page. Returns how many nodes changed.
    pub async fn simplify_page(&mut self, tree: &mut PageTree, grade: Grade) -> usize {
        let units = self.collect_units(tree);
        debug!(page_id = %self.page_id, units = units.len(), grade = %grade, "Simplifying page");

        if self.availability == Availability::Unknown {
            self.refresh_availability().await;
            info!(
                page_id = %self.page_id,
                availability = ?self.availability,
                "Detected remote availability"
            );
        }

        let mut replaced = 0;
        if self.availability == Availability::Available {
            for chunk in units.chunks(self.options.batch_size.max(1)) {
                replaced += self.simplify_chunk(tree, chunk, grade).await;
            }
        } else {
            for unit in &units {
                let simplified = self.fallback.simplify(&unit.text, grade);
                if splice(tree, unit, &simplified) {
                    replaced += 1;
                }
            }
        }

        info!(
            page_id = %self.page_id,
            units = units.len(),
            replaced,
            grade = %grade,
            "Page simplified"
        );
        replaced
    }

    async fn simplify_chunk(
        &self,
        tree: &mut PageTree,
        chunk: &[TextUnit],
        grade: Grade,
    ) -> usize {
        let items: Vec<BatchItem> = chunk.iter().map(TextUnit::to_batch_item).collect();

        let results: HashMap<String, String> = match self
            .service
            .simplify_batch(items, grade, self.page_id.clone())
            .await
        {
            Ok(results) => results.into_iter().map(|r| (r.id, r.text)).collect(),
            Err(e) => {
                warn!(
                    page_id = %self.page_id,
                    units = chunk.len(),
                    error = %e,
                    "Batch request failed, simplifying locally"
                );
                chunk
                    .iter()
                    .map(|unit| (unit.id.clone(), self.fallback.simplify(&unit.text, grade)))
                    .collect()
            }
        };

        let mut replaced = 0;
        for unit in chunk {
            if let Some(text) = results.get(&unit.id) {
                if splice(tree, unit, text) {
                    replaced += 1;
                }
            }
        }
        replaced
    }

    /// Record availability and, when the remote is up, queue one pre-cache
    /// request covering every unit. Returns whether the remote is up.
    pub async fn pre_cache(&mut self, tree: &PageTree, grade: Grade) -> bool {
        let available = self.refresh_availability().await == Availability::Available;
        if !available {
            info!(page_id = %self.page_id, "Remote unavailable, skipping pre-cache");
            return false;
        }

        let items: Vec<BatchItem> = self
            .units(tree, "precache")
            .iter()
            .map(TextUnit::to_batch_item)
            .collect();
        if items.is_empty() {
            return true;
        }

        let count = items.len();
        match self.service.pre_cache(items, grade, self.page_id.clone()).await {
            Ok(()) => info!(
                page_id = %self.page_id,
                units = count,
                grade = %grade,
                "Pre-cache queued"
            ),
            Err(e) => warn!(page_id = %self.page_id, error = %e, "Could not queue pre-cache"),
        }
        true
    }

    /// Put the original text back into every remembered node still on the
    /// page, then forget all originals. Returns how many nodes were restored.
    pub fn restore(&mut self, tree: &mut PageTree) -> usize {
        let mut restored = 0;
        for (node, original) in self.originals.drain() {
            if tree.is_connected(node) {
                tree.set_text_content(node, &original);
                restored += 1;
            }
        }
        debug!(page_id = %self.page_id, restored, "Restored original text");
        restored
    }

    /// Hand a changed backend URL to the service. A new backend means the
    /// remembered availability no longer holds.
    async fn apply_backend_url(&mut self, settings: &Settings) {
        let Some(url) = settings.backend_url.as_deref() else {
            return;
        };
        if self.backend_url.as_deref() == Some(url) {
            return;
        }
        match self.service.set_backend_url(url).await {
            Ok(true) => {
                info!(page_id = %self.page_id, url, "Backend URL updated from settings");
                self.backend_url = Some(url.to_string());
                self.availability = Availability::Unknown;
            }
            Ok(false) => debug!(page_id = %self.page_id, url, "Backend URL not accepted"),
            Err(e) => warn!(page_id = %self.page_id, error = %e, "Could not update backend URL"),
        }
    }

    /// React to a settings update.
    pub async fn on_settings_changed(&mut self, tree: &mut PageTree, settings: &Settings) {
        self.apply_backend_url(settings).await;
        let grade = settings.text_simplifier_grade;
        match (settings.text_simplifier_enabled, self.active) {
            (true, false) => {
                self.simplify_page(tree, grade).await;
                self.active = true;
            }
            (false, true) => {
                self.restore(tree);
                self.active = false;
            }
            (true, true) => {
                debug!(
                    page_id = %self.page_id,
                    grade = %grade,
                    "Settings changed while active, re-simplifying"
                );
                self.simplify_page(tree, grade).await;
            }
            (false, false) => {}
        }
    }
}

/// Write `text` into the unit's node when it is non-empty and differs from
/// what the node shows now.
fn splice(tree: &mut PageTree, unit: &TextUnit, text: &str) -> bool {
    if text.is_empty() || tree.text_content(unit.node).trim() == text {
        return false;
    }
    tree.set_text_content(unit.node, text);
    true
}
