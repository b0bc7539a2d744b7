//! Read-only link directory used to resolve link lengths.

use std::collections::HashMap;

/// Link lengths in meters, keyed by link id.
#[derive(Debug, Default, Clone)]
pub struct Network {
    links: HashMap<String, f64>,
}

impl Network {
    /// Returns the length of `link_id` in meters, if the link is known.
    pub fn link_length(&self, link_id: &str) -> Option<f64> {
        self.links.get(link_id).copied()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl FromIterator<(String, f64)> for Network {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self {
            links: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_length_lookup() {
        let network: Network = [("a".to_string(), 100.0), ("b".to_string(), 50.0)]
            .into_iter()
            .collect();

        assert_eq!(network.len(), 2);
        assert_eq!(network.link_length("a"), Some(100.0));
        assert_eq!(network.link_length("missing"), None);
    }

    #[test]
    fn test_duplicate_link_last_wins() {
        let network: Network = [("a".to_string(), 100.0), ("a".to_string(), 75.0)]
            .into_iter()
            .collect();

        assert_eq!(network.len(), 1);
        assert_eq!(network.link_length("a"), Some(75.0));
    }
}
