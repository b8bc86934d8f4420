use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{error, warn};
use unic_langid::LanguageIdentifier;

/// Language used when the requested one has no translations
pub const DEFAULT_LANGUAGE: &str = "en";

/// Bundled translations, keyed by primary language subtag
const RESOURCES: &[(&str, &str)] = &[
    ("en", include_str!("../locales/en/main.ftl")),
    ("ar", include_str!("../locales/ar/main.ftl")),
];

/// Localization manager for the dashboard bot
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    /// Create a manager holding every bundled language
    pub fn new() -> Self {
        let bundles = RESOURCES
            .iter()
            .map(|(code, source)| (code.to_string(), Self::create_bundle(code, source)))
            .collect();

        Self { bundles }
    }

    /// Create a fluent bundle for a specific locale
    fn create_bundle(code: &str, source: &str) -> FluentBundle<FluentResource> {
        let locale: LanguageIdentifier = code.parse().unwrap_or_default();
        let mut bundle = FluentBundle::new_concurrent(vec![locale]);
        // Telegram renders the bidi isolation marks literally
        bundle.set_use_isolating(false);

        let resource = match FluentResource::try_new(source.to_string()) {
            Ok(resource) => resource,
            Err((resource, errors)) => {
                error!(language = code, errors = ?errors, "Translation resource has syntax errors");
                resource
            }
        };
        if let Err(errors) = bundle.add_resource(resource) {
            warn!(language = code, errors = ?errors, "Duplicate translation keys");
        }

        bundle
    }

    /// Languages with bundled translations
    pub fn supported_languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = self.bundles.keys().map(String::as_str).collect();
        languages.sort_unstable();
        languages
    }

    /// Whether translations exist for a Telegram language code such as `ar` or `en-US`
    pub fn is_language_supported(&self, language_code: &str) -> bool {
        self.bundles.contains_key(primary_subtag(language_code))
    }

    /// Get a localized message in the requested language, falling back to English
    pub fn get_message_in_language(
        &self,
        key: &str,
        language_code: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let bundle = self
            .bundles
            .get(primary_subtag(language_code))
            .filter(|bundle| bundle.has_message(key))
            .or_else(|| self.bundles.get(DEFAULT_LANGUAGE));

        let Some(bundle) = bundle else {
            return format!("Missing translation: {key}");
        };

        let msg = match bundle.get_message(key) {
            Some(msg) => msg,
            None => return format!("Missing translation: {key}"),
        };

        let pattern = match msg.value() {
            Some(pattern) => pattern,
            None => return format!("Missing value for key: {key}"),
        };

        let fluent_args = args.map(|args| {
            FluentArgs::from_iter(args.iter().map(|(k, v)| (*k, FluentValue::from(*v))))
        });

        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, fluent_args.as_ref(), &mut errors);
        if !errors.is_empty() {
            warn!(key, errors = ?errors, "Errors while formatting translation");
        }

        value.into_owned()
    }
}

impl Default for LocalizationManager {
    fn default() -> Self {
        Self::new()
    }
}

fn primary_subtag(language_code: &str) -> &str {
    language_code
        .split(['-', '_'])
        .next()
        .unwrap_or(language_code)
}

static LOCALIZATION_MANAGER: LazyLock<LocalizationManager> = LazyLock::new(LocalizationManager::new);

/// Get the global localization manager
pub fn get_localization_manager() -> &'static LocalizationManager {
    &LOCALIZATION_MANAGER
}

/// Localized message for an optional Telegram language code
pub fn t_lang(key: &str, language_code: Option<&str>) -> String {
    get_localization_manager().get_message_in_language(
        key,
        language_code.unwrap_or(DEFAULT_LANGUAGE),
        None,
    )
}

/// Localized message with arguments for an optional Telegram language code
pub fn t_args_lang(key: &str, args: &[(&str, &str)], language_code: Option<&str>) -> String {
    let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
    get_localization_manager().get_message_in_language(
        key,
        language_code.unwrap_or(DEFAULT_LANGUAGE),
        Some(&args_map),
    )
}
