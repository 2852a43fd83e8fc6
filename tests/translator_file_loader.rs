//! Exercises `FileLoader` and `Translator` against real files on disk,
//! covering the `.mo`-before-`.po` and full-before-short-language fallback
//! chains that the in-crate unit tests stub out with an in-memory loader.

use std::fs;
use std::io::BufReader;

use tempfile::tempdir;
use translate_storage::{File, FileLoader, Loader, MoFile, TranslateOptions, Translator};

fn write_po(path: &std::path::Path, body: &str) {
    fs::write(path, body).unwrap();
}

#[test]
fn file_loader_compiles_po_when_no_mo_is_present() {
    let dir = tempdir().unwrap();
    let po_path = dir.path().join("es_ES.default.po");
    write_po(
        &po_path,
        concat!(
            "msgid \"\"\n",
            "msgstr \"\"\n",
            "\"Language: es_ES\\n\"\n",
            "\n",
            "msgid \"Hello\"\n",
            "msgstr \"Hola\"\n",
        ),
    );

    let loader = FileLoader::new(dir.path().join("{language}.{domain}.{ext}").to_str().unwrap());
    let mo = loader.load("es_ES", "default").unwrap();
    assert_eq!(mo.get("Hello"), Some("Hola"));
}

#[test]
fn file_loader_prefers_mo_over_po() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("fr_FR.default");
    write_po(
        &base.with_extension("po"),
        concat!("msgid \"\"\n", "msgstr \"\"\n", "\n", "msgid \"Hi\"\n", "msgstr \"should not be used\"\n"),
    );

    let po = File::read(BufReader::new(
        fs::File::open(base.with_extension("po")).unwrap(),
    ))
    .unwrap();
    let mut mo = MoFile::from_po(&po);
    mo.entries.insert("Hi".to_string(), vec!["Salut".to_string()]);
    let mo_bytes_path = base.with_extension("mo");
    let mut out = fs::File::create(&mo_bytes_path).unwrap();
    mo.write(&mut out).unwrap();

    let loader = FileLoader::new(dir.path().join("{language}.{domain}.{ext}").to_str().unwrap());
    let loaded = loader.load("fr_FR", "default").unwrap();
    assert_eq!(loaded.get("Hi"), Some("Salut"));
}

#[test]
fn translator_falls_back_to_short_language_when_full_tag_is_missing() {
    let dir = tempdir().unwrap();
    write_po(
        &dir.path().join("pt.default.po"),
        concat!(
            "msgid \"\"\n",
            "msgstr \"\"\n",
            "\n",
            "msgid \"Bye\"\n",
            "msgstr \"Tchau\"\n",
        ),
    );

    let loader = FileLoader::new(dir.path().join("{language}.{domain}.{ext}").to_str().unwrap());
    let translator = Translator::new("pt_BR", loader);
    let got = translator.translate(None, "Bye", &TranslateOptions::new());
    assert_eq!(got, "Tchau");
}

#[test]
fn translator_keeps_source_message_when_no_catalog_resolves() {
    let dir = tempdir().unwrap();
    let loader = FileLoader::new(dir.path().join("{language}.{domain}.{ext}").to_str().unwrap());
    let translator = Translator::new("de_DE", loader);
    let got = translator.translate(None, "Untranslated", &TranslateOptions::new());
    assert_eq!(got, "Untranslated");
}
