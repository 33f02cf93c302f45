//! Locale resolution: which text to display and which analyzer to query with.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use sift_config::AnalyzerSettings;

use crate::{AddonDocument, IndexError, analyzer::AnalyzerId, document::Translations};

/// A piece of translated text together with the locale it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocalizedText<'a> {
    /// The text.
    pub text: &'a str,
    /// Locale the text is written in.
    pub locale: &'a str,
}

/// Maps locales to analyzers and picks translations for display.
#[derive(Debug, Clone, Default)]
pub struct LocaleResolver {
    /// Locale -> analyzer, validated.
    bindings: BTreeMap<String, AnalyzerId>,
}

impl LocaleResolver {
    /// Builds a resolver from analyzer settings, rejecting unknown analyzer languages.
    pub fn new(settings: &AnalyzerSettings) -> Result<Self, IndexError> {
        let bindings = settings
            .bindings
            .iter()
            .map(|(locale, analyzer)| Ok((locale.clone(), AnalyzerId::parse(analyzer)?)))
            .collect::<Result<_, IndexError>>()?;
        Ok(Self { bindings })
    }

    /// Name to display for a document in the requested locale.
    ///
    /// Uses the requested translation when it exists, else the default-locale name.
    pub fn resolve_display<'a>(
        &self,
        document: &'a AddonDocument,
        requested_locale: &str,
    ) -> LocalizedText<'a> {
        if let Some((locale, text)) = document.name.get_key_value(requested_locale) {
            return LocalizedText { text, locale };
        }
        // A validated corpus guarantees the default-locale name.
        let text = document.default_name().unwrap_or_default();
        LocalizedText {
            text,
            locale: &document.default_locale,
        }
    }

    /// Same fallback as [`resolve_display`](Self::resolve_display) for optional fields
    /// such as the summary or description.
    pub fn resolve_text<'a>(
        &self,
        translations: &'a Translations,
        document: &'a AddonDocument,
        requested_locale: &str,
    ) -> Option<LocalizedText<'a>> {
        translations
            .get_key_value(requested_locale)
            .or_else(|| translations.get_key_value(&document.default_locale))
            .map(|(locale, text)| LocalizedText { text, locale })
    }

    /// Analyzer for a locale: exact binding, then primary language subtag, then default.
    pub fn resolve_analyzer(&self, requested_locale: &str) -> AnalyzerId {
        if let Some(analyzer) = self.bindings.get(requested_locale) {
            return analyzer.clone();
        }
        primary_subtag(requested_locale)
            .and_then(|language| self.bindings.get(language))
            .cloned()
            .unwrap_or(AnalyzerId::Default)
    }

    /// Every distinct stemming analyzer that some locale is bound to.
    pub fn analyzers(&self) -> BTreeSet<AnalyzerId> {
        self.bindings
            .values()
            .filter(|analyzer| !analyzer.is_default())
            .cloned()
            .collect()
    }
}

/// Language part of a locale tag, if the tag has a region or script suffix.
fn primary_subtag(locale: &str) -> Option<&str> {
    locale
        .split_once(['-', '_'])
        .map(|(language, _)| language)
        .filter(|language| !language.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> LocaleResolver {
        LocaleResolver::new(&AnalyzerSettings::default()).unwrap()
    }

    fn foobar() -> AddonDocument {
        AddonDocument::new(1, "foobar", "fr", "Foobar unique francais")
            .with_name("en-US", "Foobar unique english")
            .with_summary("fr", "Résumé")
    }

    #[test]
    fn display_uses_requested_translation() {
        let doc = foobar();
        let shown = resolver().resolve_display(&doc, "en-US");
        assert_eq!(shown.text, "Foobar unique english");
        assert_eq!(shown.locale, "en-US");
    }

    #[test]
    fn display_falls_back_to_default_locale() {
        let doc = foobar();
        for locale in ["mn", "de", "", "en"] {
            let shown = resolver().resolve_display(&doc, locale);
            assert_eq!(shown.text, "Foobar unique francais");
            assert_eq!(shown.locale, "fr");
        }
    }

    #[test]
    fn resolve_text_is_optional() {
        let doc = foobar();
        let resolver = resolver();

        let summary = resolver.resolve_text(&doc.summary, &doc, "en-US").unwrap();
        assert_eq!(summary.locale, "fr");
        assert!(resolver.resolve_text(&doc.description, &doc, "fr").is_none());
    }

    #[test]
    fn analyzer_exact_binding() {
        assert_eq!(
            resolver().resolve_analyzer("en-US"),
            AnalyzerId::Language("english".into())
        );
        assert_eq!(
            resolver().resolve_analyzer("de"),
            AnalyzerId::Language("german".into())
        );
    }

    #[test]
    fn analyzer_primary_subtag_fallback() {
        assert_eq!(
            resolver().resolve_analyzer("fr-CA"),
            AnalyzerId::Language("french".into())
        );
        assert_eq!(
            resolver().resolve_analyzer("de_AT"),
            AnalyzerId::Language("german".into())
        );
    }

    #[test]
    fn analyzer_unbound_locale_uses_default() {
        assert_eq!(resolver().resolve_analyzer("mn"), AnalyzerId::Default);
        assert_eq!(resolver().resolve_analyzer(""), AnalyzerId::Default);
        assert_eq!(resolver().resolve_analyzer("-US"), AnalyzerId::Default);
        // en-US is bound but the bare primary tag is not.
        assert_eq!(resolver().resolve_analyzer("en"), AnalyzerId::Default);
    }

    #[test]
    fn rejects_unknown_language() {
        let mut settings = AnalyzerSettings::default();
        settings.bindings.insert("ca".into(), "catalan".into());
        assert!(LocaleResolver::new(&settings).is_err());
    }

    #[test]
    fn lists_distinct_analyzers() {
        let analyzers = resolver().analyzers();
        assert!(analyzers.contains(&AnalyzerId::Language("english".into())));
        assert!(!analyzers.contains(&AnalyzerId::Default));
        assert_eq!(
            analyzers
                .iter()
                .filter(|a| a.as_str() == "norwegian")
                .count(),
            1
        );
    }
}
