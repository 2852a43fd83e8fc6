//! A single PO catalog entry: comments, context, singular/plural source
//! text, and the translator's rendering of it.

use std::io::{BufRead, Write};

use crate::error::{Error, Result};
use crate::flags::Flags;
use crate::formatter::Formatter;
use crate::scanner::Scanner;
use crate::starter::{PlainStarter, RegexpStarter, Starter};

const PREV_BORDER: &str = "#| ";

/// The translator's rendering of a message: untranslated, a single string,
/// or one string per plural form. Mutually exclusive by construction, unlike
/// a raw `msgstr`/`msgstr[n]` field pair.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Translation {
    #[default]
    None,
    Singular(String),
    Plural(Vec<String>),
}

/// One `msgid`/`msgstr` block, with its surrounding comments and history.
#[derive(Debug, Clone, Default)]
pub struct Entry {
    pub t_comment: String,
    pub e_comment: String,
    pub reference: String,
    pub flags: Flags,
    pub prev_msgctxt: String,
    pub prev_msgid: String,
    pub prev_msgidp: String,
    pub msgctxt: String,
    pub msgid: String,
    pub msgidp: String,
    pub translation: Translation,
    pub obsolete: bool,
}

/// Starters recognizing every PO entry block, in priority order. The bare
/// `#` starter must stay last: it would otherwise swallow `#.`, `#:`, `#,`,
/// `#|`, and `#~` lines too.
pub fn po_starters() -> Vec<Box<dyn Starter>> {
    vec![
        Box::new(PlainStarter::new("#. ", "")),
        Box::new(PlainStarter::new("#: ", "")),
        Box::new(PlainStarter::new("#, ", "")),
        Box::new(PlainStarter::new(PREV_BORDER, "msgctxt ")),
        Box::new(PlainStarter::new(PREV_BORDER, "msgid ")),
        Box::new(PlainStarter::new(PREV_BORDER, "msgid_plural ")),
        Box::new(PlainStarter::new("", "msgctxt ")),
        Box::new(PlainStarter::new("#~ ", "msgctxt ")),
        Box::new(PlainStarter::new("", "msgid ")),
        Box::new(PlainStarter::new("#~ ", "msgid ")),
        Box::new(PlainStarter::new("", "msgid_plural ")),
        Box::new(PlainStarter::new("#~ ", "msgid_plural ")),
        Box::new(PlainStarter::new("", "msgstr ")),
        Box::new(PlainStarter::new("#~ ", "msgstr ")),
        Box::new(RegexpStarter::new("", r"msgstr\[\d+\] ")),
        Box::new(RegexpStarter::new("#~ ", r"msgstr\[\d+\] ")),
        Box::new(PlainStarter::new("# ", "")),
        Box::new(PlainStarter::new("#", "")),
    ]
}

/// Reads one entry from `scanner`. Returns `Ok(None)` if there was nothing
/// left to read at all. Otherwise returns the entry and whether input ended
/// with it (`true`) or a blank line separated it from the next entry
/// (`false`). Callers loop until this flag is `true`.
pub fn read_entry<R: BufRead>(
    scanner: &mut Scanner<R>,
    plural_count: usize,
) -> Result<Option<(Entry, bool)>> {
    scanner.starters = po_starters();
    let mut entry = Entry::default();
    let mut applied_any = false;

    loop {
        match scanner.scan() {
            Ok(()) => {
                apply_block(&mut entry, scanner, plural_count)?;
                applied_any = true;
                if scanner.is_blank_line() {
                    return Ok(Some((entry, false)));
                }
            }
            Err(e) if e.is_eof() => {
                let has_block = !scanner.border.is_empty()
                    || !scanner.prefix.is_empty()
                    || !scanner.buffer.is_empty();
                if has_block {
                    apply_block(&mut entry, scanner, plural_count)?;
                    applied_any = true;
                }
                if !applied_any {
                    return Ok(None);
                }
                return Ok(Some((entry, true)));
            }
            Err(e) => return Err(e),
        }
    }
}

fn apply_block<R: BufRead>(
    entry: &mut Entry,
    scanner: &Scanner<R>,
    plural_count: usize,
) -> Result<()> {
    check_obsolete(entry, scanner)?;
    let buf = scanner.buffer.clone();

    match (scanner.border.as_str(), scanner.prefix.as_str()) {
        ("#", "") | ("# ", "") => {
            if !entry.t_comment.is_empty() {
                entry.t_comment.push('\n');
            }
            entry.t_comment.push_str(&buf);
        }
        ("#. ", "") => {
            ensure_empty(scanner, &entry.e_comment)?;
            entry.e_comment = buf;
        }
        ("#: ", "") => {
            ensure_empty(scanner, &entry.reference)?;
            entry.reference = buf;
        }
        ("#, ", "") => {
            ensure_empty(scanner, &entry.flags.to_string())?;
            entry.flags.parse(&buf);
        }
        (PREV_BORDER, "msgctxt ") => {
            ensure_empty(scanner, &entry.prev_msgctxt)?;
            entry.prev_msgctxt = buf;
        }
        (PREV_BORDER, "msgid ") => {
            ensure_empty(scanner, &entry.prev_msgid)?;
            entry.prev_msgid = buf;
        }
        (PREV_BORDER, "msgid_plural ") => {
            ensure_empty(scanner, &entry.prev_msgidp)?;
            entry.prev_msgidp = buf;
        }
        ("", "msgctxt ") | ("#~ ", "msgctxt ") => {
            ensure_empty(scanner, &entry.msgctxt)?;
            entry.msgctxt = buf;
        }
        ("", "msgid ") | ("#~ ", "msgid ") => {
            ensure_empty(scanner, &entry.msgid)?;
            entry.msgid = buf;
        }
        ("", "msgid_plural ") | ("#~ ", "msgid_plural ") => {
            ensure_empty(scanner, &entry.msgidp)?;
            entry.msgidp = buf;
        }
        ("", "msgstr ") | ("#~ ", "msgstr ") => match &entry.translation {
            Translation::None => entry.translation = Translation::Singular(buf),
            _ => return Err(duplicate_block_error(scanner)),
        },
        _ => update_msg_str_p(entry, scanner, plural_count, buf)?,
    }
    Ok(())
}

fn check_obsolete<R: BufRead>(entry: &mut Entry, scanner: &Scanner<R>) -> Result<()> {
    let prior_line = scanner.line.saturating_sub(1);
    if scanner.border == "#~ " {
        if entry.obsolete {
            return Ok(());
        }
        if !entry.msgctxt.is_empty()
            || !entry.msgid.is_empty()
            || !entry.msgidp.is_empty()
            || !matches!(entry.translation, Translation::None)
        {
            return Err(Error::grammar(
                prior_line,
                format!("mixed obsolete and not obsolete blocks at {prior_line}"),
            ));
        }
        entry.obsolete = true;
    }
    if scanner.border.is_empty() && entry.obsolete {
        return Err(Error::grammar(
            prior_line,
            format!("mixed obsolete and not obsolete blocks at {prior_line}"),
        ));
    }
    Ok(())
}

fn ensure_empty<R: BufRead>(scanner: &Scanner<R>, text: &str) -> Result<()> {
    if !text.is_empty() {
        return Err(duplicate_block_error(scanner));
    }
    Ok(())
}

fn duplicate_block_error<R: BufRead>(scanner: &Scanner<R>) -> Error {
    Error::grammar(
        scanner.line,
        format!(
            "duplicate block \"{}{}\" at {}",
            scanner.border, scanner.prefix, scanner.line
        ),
    )
}

fn update_msg_str_p<R: BufRead>(
    entry: &mut Entry,
    scanner: &Scanner<R>,
    plural_count: usize,
    buf: String,
) -> Result<()> {
    if !scanner.prefix.starts_with("msgstr[") {
        log::trace!(
            "unrecognized block border={:?} prefix={:?} buffer={:?}",
            scanner.border,
            scanner.prefix,
            scanner.buffer
        );
        return Ok(());
    }
    if matches!(entry.translation, Translation::None) {
        entry.translation = Translation::Plural(vec![String::new(); plural_count]);
    }
    let slots = match &mut entry.translation {
        Translation::Plural(slots) => slots,
        Translation::Singular(_) => {
            return Err(Error::grammar(
                scanner.line,
                "plural block mixed with singular msgstr",
            ));
        }
        Translation::None => unreachable!("initialized above"),
    };

    let idx_str = &scanner.prefix[7..scanner.prefix.len() - 2];
    let n: usize = idx_str
        .parse()
        .map_err(|_| Error::grammar(scanner.line, format!("invalid plural index {idx_str:?}")))?;
    if n >= plural_count {
        let prior_line = scanner.line.saturating_sub(1);
        return Err(Error::grammar(
            prior_line,
            format!("unknown plural form {n} at {prior_line}"),
        ));
    }
    if !slots[n].is_empty() {
        return Err(duplicate_block_error(scanner));
    }
    slots[n] = buf;
    Ok(())
}

impl Entry {
    /// Writes the entry in PO format. `width` wraps `msgid`/`msgstr`
    /// payloads (comments and previous-value blocks are never wrapped).
    pub fn print<W: Write>(&self, f: &mut Formatter<W>, width: i64) -> Result<()> {
        f.width = 0;
        if !self.t_comment.is_empty() {
            f.border = "# ".to_string();
            f.prefix = String::new();
            f.format(&self.t_comment)?;
        }
        if !self.e_comment.is_empty() {
            f.border = "#. ".to_string();
            f.prefix = String::new();
            f.format(&self.e_comment)?;
        }
        if !self.reference.is_empty() {
            f.border = "#: ".to_string();
            f.prefix = String::new();
            f.format(&self.reference)?;
        }
        if !self.flags.is_empty() {
            f.border = "#, ".to_string();
            f.prefix = String::new();
            f.format(&self.flags.to_string())?;
        }
        if !self.prev_msgctxt.is_empty() {
            f.border = PREV_BORDER.to_string();
            f.prefix = "msgctxt ".to_string();
            f.format(&self.prev_msgctxt)?;
        }
        if !self.prev_msgid.is_empty() {
            f.border = PREV_BORDER.to_string();
            f.prefix = "msgid ".to_string();
            f.format(&self.prev_msgid)?;
        }
        if !self.prev_msgidp.is_empty() {
            f.border = PREV_BORDER.to_string();
            f.prefix = "msgid_plural ".to_string();
            f.format(&self.prev_msgidp)?;
        }

        f.border = if self.obsolete {
            "#~ ".to_string()
        } else {
            String::new()
        };
        f.width = width;
        if !self.msgctxt.is_empty() {
            f.prefix = "msgctxt ".to_string();
            f.format(&self.msgctxt)?;
        }
        f.prefix = "msgid ".to_string();
        f.format(&self.msgid)?;
        if !self.msgidp.is_empty() {
            f.prefix = "msgid_plural ".to_string();
            f.format(&self.msgidp)?;
        }
        match &self.translation {
            Translation::Plural(slots) => {
                for (i, slot) in slots.iter().enumerate() {
                    f.prefix = format!("msgstr[{i}] ");
                    f.format(slot)?;
                }
            }
            Translation::Singular(text) => {
                f.prefix = "msgstr ".to_string();
                f.format(text)?;
            }
            Translation::None => {
                f.prefix = "msgstr ".to_string();
                f.format("")?;
            }
        }
        Ok(())
    }

    /// Merges this (translated) entry with `next` (freshly extracted source
    /// text): comments refresh unconditionally, while context/id/plural-id
    /// changes move the old value to the `prev_*` slot and raise the
    /// `fuzzy` flag so a translator knows to re-check it. The translation
    /// itself carries over untouched.
    pub fn update(&self, next: &Entry) -> Entry {
        let mut res = self.clone();
        res.e_comment = next.e_comment.clone();
        if res.msgctxt != next.msgctxt {
            res.prev_msgctxt = std::mem::replace(&mut res.msgctxt, next.msgctxt.clone());
            res.flags.add("fuzzy");
        }
        if res.msgid != next.msgid {
            res.prev_msgid = std::mem::replace(&mut res.msgid, next.msgid.clone());
            res.flags.add("fuzzy");
        }
        if res.msgidp != next.msgidp {
            res.prev_msgidp = std::mem::replace(&mut res.msgidp, next.msgidp.clone());
            res.flags.add("fuzzy");
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join(lines: &[&str]) -> String {
        lines.join("\n")
    }

    #[test]
    fn round_trips_a_full_plural_entry() {
        let source = join(&[
            "# TComment",
            "#. EComment",
            "#: Reference",
            "#, Flags",
            "#| msgctxt \"PrevMsgCtxt\"",
            "#| msgid \"PrevMsgID\"",
            "#| msgid_plural \"PrevMsgIDP\"",
            "msgctxt \"MsgCtxt\"",
            "msgid \"MsgID\"",
            "msgid_plural \"MsgIDP\"",
            "msgstr[0] \"MsgStr\"",
            "msgstr[1] \"MsgStrP\"",
        ]);
        let cursor = std::io::Cursor::new(source.clone().into_bytes());
        let mut scanner = Scanner::new(cursor);
        let (entry, finished) = read_entry(&mut scanner, 2).unwrap().unwrap();
        assert!(finished);
        assert_eq!(entry.t_comment, "TComment");
        assert_eq!(entry.msgctxt, "MsgCtxt");
        assert_eq!(entry.msgid, "MsgID");
        assert_eq!(entry.msgidp, "MsgIDP");
        assert_eq!(
            entry.translation,
            Translation::Plural(vec!["MsgStr".to_string(), "MsgStrP".to_string()])
        );

        let mut out = Vec::new();
        let mut f = Formatter::new(&mut out);
        entry.print(&mut f, 0).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), source + "\n");
    }

    #[test]
    fn round_trips_an_obsolete_entry() {
        let source = join(&[
            "# TComment",
            "#. EComment",
            "#: Reference",
            "#, Flags",
            "#| msgctxt \"PrevMsgCtxt\"",
            "#| msgid \"PrevMsgID\"",
            "#| msgid_plural \"PrevMsgIDP\"",
            "#~ msgctxt \"MsgCtxt\"",
            "#~ msgid \"MsgID\"",
            "#~ msgstr \"MsgStr\"",
        ]);
        let cursor = std::io::Cursor::new(source.clone().into_bytes());
        let mut scanner = Scanner::new(cursor);
        let (entry, finished) = read_entry(&mut scanner, 2).unwrap().unwrap();
        assert!(finished);
        assert!(entry.obsolete);
        assert_eq!(entry.translation, Translation::Singular("MsgStr".to_string()));

        let mut out = Vec::new();
        let mut f = Formatter::new(&mut out);
        entry.print(&mut f, 0).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), source + "\n");
    }

    #[test]
    fn mixing_obsolete_and_live_blocks_is_a_grammar_error() {
        let source = "msgid \"MsgID\"\n#~ msgstr \"MsgStr\"\n";
        let cursor = std::io::Cursor::new(source.as_bytes().to_vec());
        let mut scanner = Scanner::new(cursor);
        let err = read_entry(&mut scanner, 1).unwrap_err();
        assert!(matches!(err, Error::Grammar { .. }));
    }

    #[test]
    fn update_moves_changed_source_text_to_prev_and_flags_fuzzy() {
        let mut old = Entry::default();
        old.msgid = "old text".to_string();
        old.translation = Translation::Singular("translated".to_string());

        let mut fresh = Entry::default();
        fresh.msgid = "new text".to_string();

        let merged = old.update(&fresh);
        assert_eq!(merged.msgid, "new text");
        assert_eq!(merged.prev_msgid, "old text");
        assert!(merged.flags.contains("fuzzy"));
        assert_eq!(merged.translation, Translation::Singular("translated".to_string()));
    }

    #[test]
    fn empty_input_yields_no_entry() {
        let cursor = std::io::Cursor::new(Vec::new());
        let mut scanner = Scanner::new(cursor);
        assert!(read_entry(&mut scanner, 1).unwrap().is_none());
    }
}
