//! Aggregation of per-unit endpoints into one titled, versioned collection.

use crate::model::{EndpointRecord, ParsedSwagger, Tag};
use log::debug;
use std::collections::HashSet;

/// Accumulates endpoints and tags from many source units.
///
/// Tags are de-duplicated by name and keep the order in which they were first seen.
pub struct CollectionBuilder {
    title: String,
    version: String,
    description: Option<String>,
    endpoints: Vec<EndpointRecord>,
    tags: Vec<Tag>,
    seen_tags: HashSet<String>,
    units: usize,
}

impl CollectionBuilder {
    /// Title and version are passed through unchanged
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            description: None,
            endpoints: Vec::new(),
            tags: Vec::new(),
            seen_tags: HashSet::new(),
            units: 0,
        }
    }

    /// Overrides the synthetic `Generated from N file(s)` description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds the endpoints and tags extracted from one source unit
    pub fn add_unit(&mut self, endpoints: Vec<EndpointRecord>, tags: Vec<Tag>) {
        self.units += 1;
        self.endpoints.extend(endpoints);

        for tag in tags {
            if self.seen_tags.insert(tag.name.clone()) {
                self.tags.push(tag);
            } else {
                debug!("Skipping duplicate tag {}", tag.name);
            }
        }
    }

    pub fn build(self) -> ParsedSwagger {
        let description = self
            .description
            .unwrap_or_else(|| format!("Generated from {} file(s)", self.units));

        ParsedSwagger {
            title: self.title,
            description,
            version: self.version,
            base_url: String::new(),
            endpoints: self.endpoints,
            tags: self.tags,
        }
    }
}
