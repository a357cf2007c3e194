//! Configuration properties and keyed property sets.

use std::collections::BTreeMap;

/// A single configuration entry with its presentation metadata.
///
/// Metadata options default to `false`, an empty display name and display
/// order `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    key: String,
    value: String,
    required: bool,
    secure: bool,
    part_of_identity: bool,
    display_name: String,
    display_order: i32,
}

impl Property {
    /// Creates a property with default metadata.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            required: false,
            secure: false,
            part_of_identity: false,
            display_name: String::new(),
            display_order: 0,
        }
    }

    /// Marks the property as mandatory.
    #[must_use]
    pub const fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Marks the property value as secret.
    #[must_use]
    pub const fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Marks the property as contributing to material identity.
    #[must_use]
    pub const fn with_part_of_identity(mut self, part_of_identity: bool) -> Self {
        self.part_of_identity = part_of_identity;
        self
    }

    /// Sets the human-readable label.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Sets the position used when rendering configuration forms.
    #[must_use]
    pub const fn with_display_order(mut self, display_order: i32) -> Self {
        self.display_order = display_order;
        self
    }

    /// Returns the property key.
    #[must_use]
    pub const fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns the property value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.value.as_str()
    }

    /// Returns whether the property is mandatory.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns whether the property value is secret.
    #[must_use]
    pub const fn is_secure(&self) -> bool {
        self.secure
    }

    /// Returns whether the property contributes to material identity.
    #[must_use]
    pub const fn is_part_of_identity(&self) -> bool {
        self.part_of_identity
    }

    /// Returns the human-readable label.
    #[must_use]
    pub const fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the rendering position.
    #[must_use]
    pub const fn display_order(&self) -> i32 {
        self.display_order
    }
}

/// A set of properties with unique keys.
///
/// Insertion order is kept for encoding, but equality ignores it: two
/// configurations are equal when they hold the same properties.
///
/// # Example
///
/// ```
/// use tether_scm::{Property, PropertyConfiguration};
///
/// let mut configuration = PropertyConfiguration::new();
/// configuration.insert(Property::new("url", "https://example.com/repo.git"));
/// configuration.insert(Property::new("url", "https://example.com/other.git"));
/// assert_eq!(configuration.len(), 1);
/// assert_eq!(configuration.value("url"), Some("https://example.com/other.git"));
/// ```
#[derive(Debug, Clone, Default, Eq)]
pub struct PropertyConfiguration {
    properties: Vec<Property>,
}

impl PropertyConfiguration {
    /// Creates an empty configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            properties: Vec::new(),
        }
    }

    /// Builds a configuration of plain key/value properties.
    ///
    /// Later pairs replace earlier ones with the same key.
    #[must_use]
    pub fn from_values<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut configuration = Self::new();
        for (key, value) in pairs {
            configuration.insert(Property::new(key, value));
        }
        configuration
    }

    /// Adds a property, replacing any existing property with the same key in
    /// place.
    ///
    /// Returns the replaced property.
    pub fn insert(&mut self, property: Property) -> Option<Property> {
        match self
            .properties
            .iter_mut()
            .find(|existing| existing.key == property.key)
        {
            Some(slot) => Some(std::mem::replace(slot, property)),
            None => {
                self.properties.push(property);
                None
            }
        }
    }

    /// Looks up a property by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.key == key)
    }

    /// Looks up a property value by key.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).map(Property::value)
    }

    /// Returns whether a property with `key` exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates properties in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Property> {
        self.properties.iter()
    }

    /// Returns the number of properties.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` when no properties are set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Returns the key/value pairs that identify a material.
    ///
    /// Metadata is excluded so a configuration echoed back by a plugin
    /// matches the one the server sent.
    #[must_use]
    pub fn identity(&self) -> BTreeMap<&str, &str> {
        self.properties
            .iter()
            .map(|property| (property.key(), property.value()))
            .collect()
    }
}

impl PartialEq for PropertyConfiguration {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .properties
                .iter()
                .all(|property| other.get(property.key()) == Some(property))
    }
}

impl<'a> IntoIterator for &'a PropertyConfiguration {
    type Item = &'a Property;
    type IntoIter = std::slice::Iter<'a, Property>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
