/// Ordered record of every candidate proposed during a session.
///
/// Only the most recent `window` entries are shown to the model.
pub struct History {
    entries: Vec<String>,
    window: usize,
}

impl History {
    pub fn new(window: usize) -> Self {
        Self {
            entries: Vec::new(),
            window,
        }
    }

    pub fn add(&mut self, entry: String) {
        self.entries.push(entry);
    }

    pub fn recent(&self) -> &[String] {
        let start = self.entries.len().saturating_sub(self.window);
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}
