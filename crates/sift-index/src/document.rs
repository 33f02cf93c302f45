//! Add-on documents as stored in a corpus.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Locale -> text for one translated field.
pub type Translations = BTreeMap<String, String>;

/// Kind of add-on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddonType {
    /// Browser extension.
    #[default]
    Extension,
    /// Static or lightweight theme. Themes are ranked by weekly downloads.
    Theme,
    /// Spell-check dictionary.
    Dictionary,
    /// Interface language pack.
    LanguagePack,
    /// Search engine plugin.
    Search,
}

/// One add-on with its multilingual text and popularity counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonDocument {
    /// Stable identifier, unique within a corpus.
    pub id: u64,
    /// URL slug.
    pub slug: String,
    /// Kind of add-on.
    #[serde(default, rename = "type")]
    pub addon_type: AddonType,
    /// Locale the add-on was authored in. `name` always has an entry for it.
    pub default_locale: String,
    /// Display name per locale.
    pub name: Translations,
    /// Short summary per locale.
    #[serde(default)]
    pub summary: Translations,
    /// Long description per locale.
    #[serde(default)]
    pub description: Translations,
    /// Average daily users.
    #[serde(default)]
    pub average_daily_users: u64,
    /// Downloads over the last week.
    #[serde(default)]
    pub weekly_downloads: u64,
}

impl AddonDocument {
    /// Creates an extension with a single name in its default locale.
    pub fn new(
        id: u64,
        slug: impl Into<String>,
        default_locale: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let default_locale = default_locale.into();
        let mut names = Translations::new();
        names.insert(default_locale.clone(), name.into());
        Self {
            id,
            slug: slug.into(),
            addon_type: AddonType::Extension,
            default_locale,
            name: names,
            summary: Translations::new(),
            description: Translations::new(),
            average_daily_users: 0,
            weekly_downloads: 0,
        }
    }

    /// Adds a name translation.
    #[must_use]
    pub fn with_name(mut self, locale: impl Into<String>, text: impl Into<String>) -> Self {
        self.name.insert(locale.into(), text.into());
        self
    }

    /// Adds a summary translation.
    #[must_use]
    pub fn with_summary(mut self, locale: impl Into<String>, text: impl Into<String>) -> Self {
        self.summary.insert(locale.into(), text.into());
        self
    }

    /// Adds a description translation.
    #[must_use]
    pub fn with_description(mut self, locale: impl Into<String>, text: impl Into<String>) -> Self {
        self.description.insert(locale.into(), text.into());
        self
    }

    /// Sets the popularity counters.
    #[must_use]
    pub fn with_popularity(mut self, average_daily_users: u64, weekly_downloads: u64) -> Self {
        self.average_daily_users = average_daily_users;
        self.weekly_downloads = weekly_downloads;
        self
    }

    /// Sets the add-on type.
    #[must_use]
    pub fn with_type(mut self, addon_type: AddonType) -> Self {
        self.addon_type = addon_type;
        self
    }

    /// The counter popularity is measured by: weekly downloads for themes,
    /// average daily users for everything else.
    pub fn popularity_signal(&self) -> u64 {
        match self.addon_type {
            AddonType::Theme => self.weekly_downloads,
            _ => self.average_daily_users,
        }
    }

    /// Name in the default locale, if present.
    pub fn default_name(&self) -> Option<&str> {
        self.name.get(&self.default_locale).map(String::as_str)
    }
}
