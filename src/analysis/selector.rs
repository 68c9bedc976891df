use std::collections::HashMap;

/// Legend state: which source keys are drawn and count toward the value
/// range. Every key starts visible.
#[derive(Debug, Clone, Default)]
pub struct SeriesSelector {
    keys: Vec<String>,
    visible: Vec<bool>,
    index: HashMap<String, usize>,
}

impl SeriesSelector {
    /// Builds a selector over `keys` in the given (first-seen) order.
    /// Repeated keys are ignored.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selector = Self::default();
        for key in keys {
            let key = key.into();
            if selector.index.contains_key(&key) {
                continue;
            }
            selector.index.insert(key.clone(), selector.keys.len());
            selector.keys.push(key);
            selector.visible.push(true);
        }
        selector
    }

    /// All keys, visible or not, in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    #[must_use]
    pub fn visible_keys(&self) -> Vec<&str> {
        self.keys
            .iter()
            .zip(&self.visible)
            .filter(|(_, shown)| **shown)
            .map(|(key, _)| key.as_str())
            .collect()
    }

    #[must_use]
    pub fn is_visible(&self, key: &str) -> bool {
        self.index.get(key).is_some_and(|&slot| self.visible[slot])
    }

    /// Flips a key's visibility and returns the new state, or `None` for a
    /// key this selector does not know. Callers must recompute the plot
    /// domain afterwards.
    pub fn toggle(&mut self, key: &str) -> Option<bool> {
        let slot = *self.index.get(key)?;
        self.visible[slot] = !self.visible[slot];
        Some(self.visible[slot])
    }
}
