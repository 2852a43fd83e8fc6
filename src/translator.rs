//! Runtime lookup: resolves `(language, domain)` to a compiled catalog via a
//! pluggable [`Loader`], then dispatches `Get`/`GetN`/`GetCtxt`/`GetCtxtN`
//! through the catalog's `Plural-Forms` rule. Lookup failures are never
//! fatal: the original message is returned and the failure is logged.

use std::collections::HashMap;
use std::fs::File as StdFile;
use std::io::BufReader;
use std::sync::Mutex;

use once_cell::sync::OnceCell;

use crate::error::Result;
use crate::file::File as PoFile;
use crate::mo::MoFile;

/// A `(language, domain)` catalog factory.
///
/// `Translator` calls this at most once per key, caching the result
/// (including failures, which are never retried) behind a single-flight
/// lock so concurrent first requests for the same key share one load.
pub trait Loader: Send + Sync {
    fn load(&self, lang: &str, domain: &str) -> Result<MoFile>;
}

/// Loads `.mo`/`.po` files from disk using a path pattern with three
/// substitutions: `{language}`, `{domain}`, `{ext}` (the spaced form
/// `{{ language }}` etc. is also accepted, for compatibility with older
/// catalogs). Resolution order for `(lang, domain)`: full-language `.mo`,
/// full-language `.po`, short-language (prefix before `_`) `.mo`, short `.po`.
pub struct FileLoader {
    pattern: String,
}

impl FileLoader {
    pub fn new(pattern: impl Into<String>) -> Self {
        FileLoader {
            pattern: pattern.into(),
        }
    }

    fn path_for(&self, lang: &str, domain: &str, ext: &str) -> String {
        let mut path = self.pattern.clone();
        for (needle, value) in [
            ("{language}", lang),
            ("{{ language }}", lang),
            ("{domain}", domain),
            ("{{ domain }}", domain),
            ("{ext}", ext),
            ("{{ ext }}", ext),
        ] {
            path = path.replace(needle, value);
        }
        path
    }

    fn load_exact(&self, lang: &str, domain: &str) -> Result<MoFile> {
        if let Ok(f) = StdFile::open(self.path_for(lang, domain, "mo")) {
            return MoFile::read(BufReader::new(f));
        }
        let f = StdFile::open(self.path_for(lang, domain, "po"))?;
        let po = PoFile::read(BufReader::new(f))?;
        Ok(MoFile::from_po(&po))
    }
}

impl Loader for FileLoader {
    fn load(&self, lang: &str, domain: &str) -> Result<MoFile> {
        match self.load_exact(lang, domain) {
            Ok(mo) => Ok(mo),
            Err(err) => match lang.split_once('_') {
                Some((short, _)) => self.load_exact(short, domain),
                None => Err(err),
            },
        }
    }
}

/// How to look up and post-process one message.
#[derive(Default)]
pub struct TranslateOptions {
    domain: Option<String>,
    context: Option<String>,
    plural: Option<(String, i64)>,
    format: Option<Box<dyn Fn(&str) -> std::result::Result<String, String> + Send + Sync>>,
}

impl TranslateOptions {
    pub fn new() -> Self {
        TranslateOptions::default()
    }

    /// Catalog domain to search; defaults to `"default"`.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Disambiguation context (`msgctxt`).
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Plural lookup: the `other`-form source text and the count `n` that
    /// selects the plural form via the catalog's `Plural-Forms` rule.
    pub fn plural(mut self, other: impl Into<String>, n: i64) -> Self {
        self.plural = Some((other.into(), n));
        self
    }

    /// Post-processing applied to the looked-up string (e.g. printf-style or
    /// templated substitution). A returned `Err` is logged and degrades to
    /// the raw looked-up string rather than failing the call.
    pub fn format(
        mut self,
        f: impl Fn(&str) -> std::result::Result<String, String> + Send + Sync + 'static,
    ) -> Self {
        self.format = Some(Box::new(f));
        self
    }

    fn domain_or_default(&self) -> &str {
        self.domain.as_deref().unwrap_or("default")
    }
}

type CacheSlot = std::sync::Arc<OnceCell<Option<MoFile>>>;

/// Translates messages for a default language via an injected [`Loader`],
/// caching loaded catalogs behind a single-flight `(lang, domain)` map.
pub struct Translator<L: Loader> {
    default_lang: String,
    loader: L,
    cache: Mutex<HashMap<String, CacheSlot>>,
}

impl<L: Loader> Translator<L> {
    pub fn new(default_lang: impl Into<String>, loader: L) -> Self {
        Translator {
            default_lang: default_lang.into(),
            loader,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn slot_for(&self, key: &str) -> CacheSlot {
        let mut cache = self.cache.lock().unwrap();
        cache
            .entry(key.to_string())
            .or_insert_with(|| std::sync::Arc::new(OnceCell::new()))
            .clone()
    }

    /// Loads (or returns the cached) catalog for `(lang, domain)`. At most
    /// one load per key ever runs; concurrent callers block on the same
    /// `OnceLock` and share its result, including a cached `None` on failure.
    fn catalog(&self, lang: &str, domain: &str) -> Option<MoFile> {
        let key = format!("{lang}/{domain}");
        let slot = self.slot_for(&key);
        slot.get_or_init(|| match self.loader.load(lang, domain) {
            Ok(mo) => Some(mo),
            Err(err) => {
                log::warn!("error loading locale {key:?}: {err}");
                None
            }
        })
        .clone()
    }

    /// Translates `msg`, falling back to `lang` (or the translator's default
    /// language if `lang` is `None`). Returns `msg` unchanged if the catalog,
    /// the key, or the chosen plural form is not found.
    pub fn translate(&self, lang: Option<&str>, msg: &str, opts: &TranslateOptions) -> String {
        let lang = lang.unwrap_or(&self.default_lang);
        let looked_up = self.lookup(lang, msg, opts);
        match &opts.format {
            None => looked_up,
            Some(f) => match f(&looked_up) {
                Ok(formatted) => formatted,
                Err(err) => {
                    log::warn!("error formatting message {looked_up:?}: {err}");
                    looked_up
                }
            },
        }
    }

    fn lookup(&self, lang: &str, msg: &str, opts: &TranslateOptions) -> String {
        let Some(catalog) = self.catalog(lang, opts.domain_or_default()) else {
            return msg.to_string();
        };
        let found = match (&opts.context, &opts.plural) {
            (None, None) => catalog.get(msg),
            (None, Some((plural, n))) => catalog.get_n(msg, plural, *n),
            (Some(ctxt), None) => catalog.get_ctxt(msg, ctxt),
            (Some(ctxt), Some((plural, n))) => catalog.get_ctxt_n(msg, plural, ctxt, *n),
        };
        found.unwrap_or(msg).to_string()
    }
}
