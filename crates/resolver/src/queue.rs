//! Pending operations, by package name

/// Names queued for the next patch run
///
/// Each list holds a name at most once and keeps insertion order. Names
/// point at records in the local catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchQueue {
    pub install: Vec<String>,
    pub update: Vec<String>,
    pub uninstall: Vec<String>,
}

impl PatchQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.install.is_empty() && self.update.is_empty() && self.uninstall.is_empty()
    }

    pub fn clear(&mut self) {
        self.install.clear();
        self.update.clear();
        self.uninstall.clear();
    }

    /// Append `name` unless already present; returns whether it was added
    pub fn push(list: &mut Vec<String>, name: &str) -> bool {
        if list.iter().any(|n| n == name) {
            return false;
        }
        list.push(name.to_string());
        true
    }

    /// Remove `name`; returns whether it was present
    pub fn take(list: &mut Vec<String>, name: &str) -> bool {
        let before = list.len();
        list.retain(|n| n != name);
        list.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_is_unique() {
        let mut queue = PatchQueue::new();
        assert!(PatchQueue::push(&mut queue.install, "A"));
        assert!(!PatchQueue::push(&mut queue.install, "A"));
        assert_eq!(queue.install, ["A"]);
        assert!(PatchQueue::take(&mut queue.install, "A"));
        assert!(!PatchQueue::take(&mut queue.install, "A"));
        assert!(queue.is_empty());
    }
}
