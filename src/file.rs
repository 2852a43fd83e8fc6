//! Drives the scanner/entry-parser across a whole document, and implements
//! the merge ("update") operation that reconciles a translated catalog with
//! freshly extracted reference text.

use std::io::{BufRead, Write};

use crate::entry::{read_entry, Entry};
use crate::error::Result;
use crate::formatter::Formatter;
use crate::header::Header;
use crate::scanner::Scanner;
use crate::similarity::SimilarityIndex;

/// Width applied to `msgctxt`/`msgid`/`msgid_plural`/`msgstr*` on print.
pub const DEFAULT_WIDTH: i64 = 80;

/// Similarity threshold above which [`File::update`] treats two entries as
/// "the same message, renamed" rather than an addition plus a removal.
const MERGE_THRESHOLD: f64 = 0.8;

/// A parsed PO document: its header plus entries in source order.
#[derive(Debug, Clone, Default)]
pub struct File {
    pub header: Header,
    pub entries: Vec<Entry>,
}

impl File {
    /// Reads a whole PO document. The first entry with an empty `msgid` is
    /// consumed as the header and does not appear in `entries`.
    pub fn read<R: BufRead>(r: R) -> Result<Self> {
        let mut scanner = Scanner::new(r);
        let mut file = File::default();
        let mut plural_count = 1;
        let mut first = true;

        loop {
            match read_entry(&mut scanner, plural_count)? {
                Some((entry, finished)) => {
                    if entry.msgid.is_empty() && first {
                        file.header = Header::from_entry(&entry)?;
                        plural_count = file.header.plural_count();
                    } else {
                        file.entries.push(entry);
                    }
                    first = false;
                    if finished {
                        return Ok(file);
                    }
                }
                None => return Ok(file),
            }
        }
    }

    /// Identity string for merge matching: `msgid` plus, for plural entries,
    /// `msgid_plural` separated by a marker unlikely to appear in real text.
    fn entry_id(entry: &Entry) -> String {
        if entry.msgidp.is_empty() {
            entry.msgid.clone()
        } else {
            format!("{}  \x00  {}", entry.msgid, entry.msgidp)
        }
    }

    /// Reconciles `self` (the existing, translated catalog) with `next` (a
    /// freshly extracted reference catalog): entries surviving under a new
    /// identity are matched by trigram similarity and carry their
    /// translation forward (marked `fuzzy` if the source text changed);
    /// entries with no match in `next` are kept but marked obsolete.
    pub fn update(&self, next: &File) -> File {
        let mut index = SimilarityIndex::new();
        for entry in &self.entries {
            index.add(Self::entry_id(entry));
        }

        let mut consumed = vec![false; self.entries.len()];
        let mut entries = Vec::with_capacity(next.entries.len());
        for entry in &next.entries {
            let query = Self::entry_id(entry);
            let best = index.search(&query).filter(|&i| {
                index.similarity(&Self::entry_id(&self.entries[i]), &query) > MERGE_THRESHOLD
            });
            match best {
                Some(i) => {
                    entries.push(self.entries[i].update(entry));
                    consumed[i] = true;
                }
                None => entries.push(entry.clone()),
            }
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if !consumed[i] && !entry.obsolete {
                let mut obsolete = entry.clone();
                obsolete.obsolete = true;
                entries.push(obsolete);
            }
        }

        File {
            header: next.header.clone(),
            entries,
        }
    }

    /// Writes the document: the header entry first, then each entry
    /// separated by a blank line.
    pub fn print<W: Write>(&self, w: W) -> Result<()> {
        let mut f = Formatter::new(w);
        self.header.to_entry().print(&mut f, DEFAULT_WIDTH)?;
        for entry in &self.entries {
            f.break_line()?;
            entry.print(&mut f, DEFAULT_WIDTH)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(msgid: &str, msgstr: &str) -> Entry {
        let mut e = Entry::default();
        e.msgid = msgid.to_string();
        e.translation = crate::entry::Translation::Singular(msgstr.to_string());
        e
    }

    #[test]
    fn update_adds_extracted_comment_without_losing_translation() {
        let current = File {
            header: Header::default(),
            entries: vec![entry("One", "Один")],
        };
        let mut next_entry = entry("One", "");
        next_entry.e_comment = "EComment".to_string();
        let next = File {
            header: Header::default(),
            entries: vec![next_entry],
        };

        let merged = current.update(&next);
        assert_eq!(merged.entries.len(), 1);
        assert_eq!(merged.entries[0].e_comment, "EComment");
        assert_eq!(
            merged.entries[0].translation,
            crate::entry::Translation::Singular("Один".to_string())
        );
        assert!(!merged.entries[0].flags.contains("fuzzy"));
    }

    #[test]
    fn update_adds_new_entry_and_preserves_existing() {
        let current = File {
            header: Header::default(),
            entries: vec![entry("One", "Один")],
        };
        let next = File {
            header: Header::default(),
            entries: vec![entry("One", ""), entry("Two", "")],
        };

        let merged = current.update(&next);
        assert_eq!(merged.entries.len(), 2);
        assert_eq!(merged.entries[0].msgid, "One");
        assert_eq!(
            merged.entries[0].translation,
            crate::entry::Translation::Singular("Один".to_string())
        );
        assert_eq!(merged.entries[1].msgid, "Two");
    }

    #[test]
    fn update_marks_removed_entries_obsolete() {
        let current = File {
            header: Header::default(),
            entries: vec![entry("One", "Один"), entry("Two", "Два")],
        };
        let next = File {
            header: Header::default(),
            entries: vec![entry("One", "")],
        };

        let merged = current.update(&next);
        assert_eq!(merged.entries.len(), 2);
        assert_eq!(merged.entries[0].msgid, "One");
        assert_eq!(merged.entries[1].msgid, "Two");
        assert!(merged.entries[1].obsolete);
    }

    #[test]
    fn update_is_identity_on_itself() {
        let current = File {
            header: Header::default(),
            entries: vec![entry("One", "Один"), entry("Two", "Два")],
        };
        let merged = current.update(&current);
        assert_eq!(merged.entries.len(), 2);
        for entry in &merged.entries {
            assert!(!entry.flags.contains("fuzzy"));
            assert!(!entry.obsolete);
        }
    }

    #[test]
    fn reads_entries_and_header_from_a_full_document() {
        let source = concat!(
            "msgid \"\"\n",
            "msgstr \"\"\n",
            "\"Language: es_ES\\n\"\n",
            "\n",
            "msgid \"One\"\n",
            "msgstr \"Uno\"\n",
        );
        let file = File::read(std::io::Cursor::new(source.as_bytes().to_vec())).unwrap();
        assert_eq!(file.header.language, "es_ES");
        assert_eq!(file.entries.len(), 1);
        assert_eq!(file.entries[0].msgid, "One");
    }

    #[test]
    fn print_round_trips_read() {
        let source = concat!(
            "msgid \"\"\n",
            "msgstr \"\"\n",
            "\"Language: es_ES\\n\"\n",
            "\n",
            "msgid \"One\"\n",
            "msgstr \"Uno\"\n",
        );
        let file = File::read(std::io::Cursor::new(source.as_bytes().to_vec())).unwrap();
        let mut out = Vec::new();
        file.print(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), source);
    }
}
