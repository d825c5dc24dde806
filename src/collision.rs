use std::collections::{HashMap, HashSet};

use crate::naming::canonical;
use crate::schema::Message;

/// How many messages declare each field name.
///
/// Names are counted in their canonical form, so `first_name` and `firstName`
/// are the same name. A message contributes at most one count per name.
#[derive(Clone, Debug, Default)]
pub struct CollisionMap {
    counts: HashMap<String, usize>,
}

impl CollisionMap {
    pub fn analyze<'a>(messages: impl IntoIterator<Item = &'a Message>) -> Self {
        let mut counts = HashMap::new();
        let mut seen = HashSet::new();
        for message in messages {
            seen.clear();
            for field in &message.fields {
                let name = canonical(&field.name);
                if seen.insert(name.clone()) {
                    *counts.entry(name).or_insert(0) += 1;
                }
            }
        }
        Self { counts }
    }

    pub fn count(&self, field_name: &str) -> usize {
        self.counts.get(&canonical(field_name)).copied().unwrap_or(0)
    }

    /// Whether options generated for `field_name` need the owner suffix.
    pub fn is_ambiguous(&self, field_name: &str) -> bool {
        self.count(field_name) > 1
    }

    /// Ambiguous names in sorted order.
    pub fn ambiguous_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self
            .counts
            .iter()
            .filter(|(_, &n)| n > 1)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}
