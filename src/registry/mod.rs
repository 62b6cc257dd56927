use std::collections::{BTreeSet, HashMap};
use std::fmt;

use blake3::Hash;

use crate::error::{Result, SeatingError};
use crate::geometry::Rect;

/// The fixed set of screen regions the editor draws into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Panel {
    Controls,
    Chart,
    Status,
    Hints,
}

impl Panel {
    pub const ALL: [Panel; 4] = [Panel::Controls, Panel::Chart, Panel::Status, Panel::Hints];

    pub fn id(self) -> &'static str {
        match self {
            Panel::Controls => "choir:controls",
            Panel::Chart => "choir:chart",
            Panel::Status => "choir:status",
            Panel::Hints => "choir:hints",
        }
    }

    /// Panels whose content arrives as styled, already fitted lines.
    pub fn is_pre_rendered(self) -> bool {
        matches!(self, Panel::Controls | Panel::Chart)
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone)]
pub struct PanelState {
    pub rect: Rect,
    pub content: String,
    hash: Option<Hash>,
    pub is_dirty: bool,
}

impl PanelState {
    fn new(rect: Rect) -> Self {
        Self {
            rect,
            content: String::new(),
            hash: None,
            is_dirty: true,
        }
    }

    fn update_content(&mut self, content: String) {
        let new_hash = blake3::hash(content.as_bytes());
        if self.hash.map(|h| h != new_hash).unwrap_or(true) {
            self.content = content;
            self.hash = Some(new_hash);
            self.is_dirty = true;
        }
    }
}

/// Last known rect and content per panel, with dirty tracking so only panels
/// whose content or placement changed get redrawn.
#[derive(Debug, Default)]
pub struct PanelRegistry {
    entries: HashMap<Panel, PanelState>,
    dirty: BTreeSet<Panel>,
}

impl PanelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync_layout(&mut self, solved_rects: &HashMap<Panel, Rect>) {
        use std::collections::hash_map::Entry;

        for (panel, rect) in solved_rects {
            match self.entries.entry(*panel) {
                Entry::Occupied(mut entry) => {
                    let state = entry.get_mut();
                    if state.rect != *rect {
                        state.rect = *rect;
                        state.is_dirty = true;
                        self.dirty.insert(*panel);
                    }
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(PanelState::new(*rect));
                    self.dirty.insert(*panel);
                }
            }
        }

        self.entries.retain(|panel, _| solved_rects.contains_key(panel));
        self.dirty.retain(|panel| solved_rects.contains_key(panel));
    }

    pub fn apply_content(&mut self, panel: Panel, content: String) -> Result<()> {
        let entry = self
            .entries
            .get_mut(&panel)
            .ok_or_else(|| SeatingError::PanelNotFound(panel.id().to_string()))?;
        entry.update_content(content);
        if entry.is_dirty {
            self.dirty.insert(panel);
        }
        Ok(())
    }

    /// Drain dirty panels in a stable top-to-bottom order.
    pub fn take_dirty(&mut self) -> Vec<(Panel, PanelState)> {
        let panels = std::mem::take(&mut self.dirty);
        panels
            .into_iter()
            .filter_map(|panel| {
                self.entries.get_mut(&panel).map(|state| {
                    state.is_dirty = false;
                    (panel, state.clone())
                })
            })
            .collect()
    }

    pub fn rect_of(&self, panel: Panel) -> Option<Rect> {
        self.entries.get(&panel).map(|state| state.rect)
    }

    pub fn content_of(&self, panel: Panel) -> Option<&str> {
        self.entries.get(&panel).map(|state| state.content.as_str())
    }

    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solved() -> HashMap<Panel, Rect> {
        let mut solved = HashMap::new();
        solved.insert(Panel::Chart, Rect::new(0, 3, 80, 10));
        solved.insert(Panel::Status, Rect::new(0, 13, 80, 1));
        solved
    }

    #[test]
    fn sync_layout_flags_new_panels_as_dirty() {
        let mut registry = PanelRegistry::new();
        registry.sync_layout(&solved());
        let dirty = registry.take_dirty();
        assert_eq!(
            dirty.iter().map(|(panel, _)| *panel).collect::<Vec<_>>(),
            vec![Panel::Chart, Panel::Status]
        );
        assert!(!registry.has_dirty());
    }

    #[test]
    fn apply_content_detects_changes() {
        let mut registry = PanelRegistry::new();
        registry.sync_layout(&solved());
        registry.take_dirty();

        registry
            .apply_content(Panel::Status, "Seated 6".to_string())
            .unwrap();
        assert_eq!(registry.take_dirty().len(), 1);

        registry
            .apply_content(Panel::Status, "Seated 6".to_string())
            .unwrap();
        assert!(registry.take_dirty().is_empty());
        assert_eq!(registry.content_of(Panel::Status), Some("Seated 6"));
    }

    #[test]
    fn resize_marks_moved_panels_and_drops_missing_ones() {
        let mut registry = PanelRegistry::new();
        registry.sync_layout(&solved());
        registry.take_dirty();

        let mut resized = HashMap::new();
        resized.insert(Panel::Chart, Rect::new(0, 3, 100, 10));
        registry.sync_layout(&resized);

        let dirty = registry.take_dirty();
        assert_eq!(dirty.len(), 1);
        assert_eq!(dirty[0].0, Panel::Chart);
        assert!(registry.rect_of(Panel::Status).is_none());
        assert!(registry.apply_content(Panel::Status, String::new()).is_err());
    }
}
