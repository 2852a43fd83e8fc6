//! Parses and reconstructs the conventional PO header entry: the `msgid ""`
//! block whose comment names the project and translators, and whose
//! `msgstr` carries `Key: value` metadata lines.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use lazy_static::lazy_static;
use regex::Regex;

use crate::entry::{Entry, Translation};
use crate::error::{Error, Result};
use crate::plural::PluralRules;

lazy_static! {
    static ref PERSON_RE: Regex = Regex::new(r"^([^<]+) <([^>]+)>$").unwrap();
    static ref COPYRIGHT_RE: Regex = Regex::new(r"^Copyright \(C\) (.+)$").unwrap();
    static ref PACKAGE_RE: Regex =
        Regex::new(r"^This file is distributed under the same license as the (.+) package\.$")
            .unwrap();
    static ref AUTHORS_RE: Regex =
        Regex::new(r"^([^<]+) <([^>]+)>, ((?:\d+,\s*)*\d+)\.$").unwrap();
    static ref TIMESTAMP_RE: Regex =
        Regex::new(r"^(\d{4})-(\d{2})-(\d{2}) (\d{2}):(\d{2})(Z|[+-]\d{2}:\d{2})$").unwrap();
}

/// A named contributor, formatted as `Name <email>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Person {
    pub name: String,
    pub email: String,
}

impl Person {
    /// Parses `Name <email>`, leaving both fields empty on mismatch.
    pub fn parse(text: &str) -> Self {
        match PERSON_RE.captures(text) {
            Some(caps) => Person {
                name: caps[1].to_string(),
                email: caps[2].to_string(),
            },
            None => Person::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty()
    }
}

impl std::fmt::Display for Person {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// A translator credited in the header comment, with the years they worked on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    pub person: Person,
    pub years: Vec<i32>,
}

/// Structured view of a catalog's metadata entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub title: String,
    pub copyright: String,
    pub package_license: String,
    pub authors: Vec<Author>,
    pub fuzzy: bool,
    pub project_id_version: String,
    pub report_msgid_bugs_to: String,
    pub pot_creation_date: Option<DateTime<FixedOffset>>,
    pub po_revision_date: Option<DateTime<FixedOffset>>,
    pub last_translator: Person,
    pub language_team: String,
    pub language: String,
    pub content_type: String,
    pub content_transfer_encoding: String,
    /// Unrecognized `Key: value` lines, preserved in parse order.
    pub unknown: Vec<(String, String)>,
    /// Parsed `Plural-Forms` header value.
    pub plural_forms: Option<PluralRules>,
}

impl Header {
    /// Builds a `Header` from the catalog's header entry (`msgid ""`). Fails
    /// with [`Error::Format`] if `Plural-Forms` or an author year is malformed.
    pub fn from_entry(entry: &Entry) -> Result<Self> {
        let mut header = Header::default();
        header.parse_comment(&entry.t_comment)?;
        header.fuzzy = entry.flags.contains("fuzzy");
        let msg_str = match &entry.translation {
            Translation::Singular(s) => s.as_str(),
            _ => "",
        };
        header.parse_msg_str(msg_str)?;
        if header.content_type.is_empty() {
            header.content_type = "text/plain; charset=UTF-8".to_string();
        }
        if header.content_transfer_encoding.is_empty() {
            header.content_transfer_encoding = "8bit".to_string();
        }
        Ok(header)
    }

    /// Number of plural forms for entries governed by this header, or `1`
    /// (singular-only) when no `Plural-Forms` header is present.
    pub fn plural_count(&self) -> usize {
        self.plural_forms.as_ref().map_or(1, PluralRules::len)
    }

    fn parse_comment(&mut self, comment: &str) -> Result<()> {
        for line in comment.split('\n') {
            if let Some(caps) = COPYRIGHT_RE.captures(line) {
                self.copyright = caps[1].to_string();
            } else if let Some(caps) = PACKAGE_RE.captures(line) {
                self.package_license = caps[1].to_string();
            } else if let Some(caps) = AUTHORS_RE.captures(line) {
                let person = Person {
                    name: caps[1].to_string(),
                    email: caps[2].to_string(),
                };
                let years = caps[3]
                    .split(',')
                    .map(|y| {
                        y.trim()
                            .parse()
                            .map_err(|_| Error::format(format!("non-numeric author year {y:?}")))
                    })
                    .collect::<Result<Vec<i32>>>()?;
                self.authors.push(Author { person, years });
            } else {
                self.title = line.trim_end_matches('.').to_string();
            }
        }
        Ok(())
    }

    fn parse_msg_str(&mut self, text: &str) -> Result<()> {
        for line in text.split('\n') {
            let Some((key, val)) = line.split_once(':') else {
                continue;
            };
            let val = val.trim();
            match key {
                "Project-Id-Version" => self.project_id_version = val.to_string(),
                "Report-Msgid-Bugs-To" => self.report_msgid_bugs_to = val.to_string(),
                "POT-Creation-Date" => self.pot_creation_date = parse_timestamp(val),
                "PO-Revision-Date" => self.po_revision_date = parse_timestamp(val),
                "Last-Translator" => self.last_translator = Person::parse(val),
                "Language-Team" => self.language_team = val.to_string(),
                "Language" => self.language = val.to_string(),
                "Content-Type" => self.content_type = val.to_string(),
                "Content-Transfer-Encoding" => self.content_transfer_encoding = val.to_string(),
                "Plural-Forms" => self.plural_forms = Some(PluralRules::parse(val)?),
                other => self.unknown.push((other.to_string(), val.to_string())),
            }
        }
        Ok(())
    }

    /// Reconstructs the header entry. Known keys are emitted in the
    /// conventional gettext order, with captured `unknown` pairs appended
    /// afterward in the order they were first seen.
    pub fn to_entry(&self) -> Entry {
        let mut entry = Entry::default();
        entry.t_comment = self.render_comment();
        if self.fuzzy {
            entry.flags.add("fuzzy");
        }
        entry.translation = Translation::Singular(self.render_msg_str());
        entry
    }

    /// The raw `msgstr` text the MO codec stores for the empty-id header
    /// entry, without the surrounding `t_comment`/flags an `Entry` carries.
    pub fn to_entry_msg_str(&self) -> String {
        self.render_msg_str()
    }

    fn render_comment(&self) -> String {
        let mut lines = Vec::new();
        if !self.title.is_empty() {
            lines.push(format!("{}.", self.title));
        }
        if !self.copyright.is_empty() {
            lines.push(format!("Copyright (C) {}", self.copyright));
        }
        if !self.package_license.is_empty() {
            lines.push(format!(
                "This file is distributed under the same license as the {} package.",
                self.package_license
            ));
        }
        for author in &self.authors {
            let years = author
                .years
                .iter()
                .map(i32::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!("{}, {}.", author.person, years));
        }
        lines.join("\n")
    }

    fn render_msg_str(&self) -> String {
        let mut lines = Vec::new();
        let mut push = |key: &str, val: &str| {
            if !val.is_empty() {
                lines.push(format!("{key}: {val}\n"));
            }
        };
        push("Project-Id-Version", &self.project_id_version);
        push("Report-Msgid-Bugs-To", &self.report_msgid_bugs_to);
        if let Some(ts) = &self.pot_creation_date {
            push("POT-Creation-Date", &format_timestamp(ts));
        }
        if let Some(ts) = &self.po_revision_date {
            push("PO-Revision-Date", &format_timestamp(ts));
        }
        if !self.last_translator.is_empty() {
            push("Last-Translator", &self.last_translator.to_string());
        }
        push("Language-Team", &self.language_team);
        push("Language", &self.language);
        push("Content-Type", &self.content_type);
        push("Content-Transfer-Encoding", &self.content_transfer_encoding);
        if let Some(pf) = &self.plural_forms {
            push("Plural-Forms", &pf.to_string());
        }
        drop(push);
        for (key, val) in &self.unknown {
            lines.push(format!("{key}: {val}\n"));
        }
        lines.concat()
    }
}

/// Parses Gettext's `YYYY-MM-DD HH:MMZ`/`YYYY-MM-DD HH:MM+HH:MM` timestamp format.
fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    let caps = TIMESTAMP_RE.captures(text)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    let hour: u32 = caps[4].parse().ok()?;
    let minute: u32 = caps[5].parse().ok()?;
    let offset = if &caps[6] == "Z" {
        FixedOffset::east_opt(0)?
    } else {
        let sign = if caps[6].starts_with('-') { -1 } else { 1 };
        let rest = &caps[6][1..];
        let (oh, om) = rest.split_once(':')?;
        let secs = sign * (oh.parse::<i32>().ok()? * 3600 + om.parse::<i32>().ok()? * 60);
        FixedOffset::east_opt(secs)?
    };
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let naive = date.and_hms_opt(hour, minute, 0)?;
    offset.from_local_datetime(&naive).single()
}

/// Inverse of [`parse_timestamp`]: prints `Z` for a zero UTC offset, else a
/// signed `HH:MM` offset.
fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    let offset_secs = ts.offset().local_minus_utc();
    let tz = if offset_secs == 0 {
        "Z".to_string()
    } else {
        let sign = if offset_secs < 0 { '-' } else { '+' };
        let abs = offset_secs.unsigned_abs();
        format!("{sign}{:02}:{:02}", abs / 3600, (abs % 3600) / 60)
    };
    format!("{}{tz}", ts.format("%Y-%m-%d %H:%M"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Scanner;

    fn join(lines: &[&str]) -> String {
        lines.join("\n")
    }

    #[test]
    fn parses_and_round_trips_a_full_header() {
        let source = join(&[
            "# Translation of kstars.po into Spanish.",
            "# Copyright (C) 2008 None",
            "# This file is distributed under the same license as the kdeedu package.",
            "# Pablo de Vicente <pablo@foo.com>, 2005, 2006, 2007, 2008.",
            "# Eloy Cuadra <eloy@bar.net>, 2007, 2008.",
            "#, fuzzy",
            "msgid \"\"",
            "msgstr \"\"",
            "\"Project-Id-Version: kstars\\n\"",
            "\"Report-Msgid-Bugs-To: http://bugs.kde.org\\n\"",
            "\"POT-Creation-Date: 2008-09-01 09:37Z\\n\"",
            "\"PO-Revision-Date: 2008-07-22 18:13Z\\n\"",
            "\"Last-Translator: Eloy Cuadra <eloy@bar.net>\\n\"",
            "\"Language-Team: Spanish <kde-l10n-es@kde.org>\\n\"",
            "\"Language: es_ES\\n\"",
            "\"Content-Type: text/plain; charset=UTF-8\\n\"",
            "\"Content-Transfer-Encoding: 8bit\\n\"",
            "\"Plural-Forms: nplurals=3; plural=n%10 == 1 && n%100 != 11 ? 0 : n%10 >= 2 && n\"",
            "\"%10 <= 4 && (n%100 < 10 || n%100 >= 20) ? 1 : 2;\\n\"",
            "\"MIME-Version: 1.0\\n\"",
        ]);
        let cursor = std::io::Cursor::new(source.into_bytes());
        let mut scanner = Scanner::new(cursor);
        let (entry, _) = crate::entry::read_entry(&mut scanner, 0).unwrap().unwrap();

        let header = Header::from_entry(&entry).unwrap();
        assert_eq!(header.title, "Translation of kstars.po into Spanish");
        assert_eq!(header.copyright, "2008 None");
        assert_eq!(header.package_license, "kdeedu");
        assert_eq!(header.authors.len(), 2);
        assert_eq!(header.authors[0].person.name, "Pablo de Vicente");
        assert_eq!(header.authors[0].years, vec![2005, 2006, 2007, 2008]);
        assert_eq!(header.authors[1].years, vec![2007, 2008]);
        assert!(header.fuzzy);
        assert_eq!(header.project_id_version, "kstars");
        assert_eq!(header.report_msgid_bugs_to, "http://bugs.kde.org");
        assert_eq!(
            header.pot_creation_date,
            parse_timestamp("2008-09-01 09:37Z")
        );
        assert_eq!(header.last_translator.email, "eloy@bar.net");
        assert_eq!(header.language, "es_ES");
        assert_eq!(header.content_type, "text/plain; charset=UTF-8");
        assert_eq!(
            header.unknown,
            vec![("MIME-Version".to_string(), "1.0".to_string())]
        );

        assert_eq!(header.plural_count(), 3);
        assert_eq!(header.plural_forms.as_ref().unwrap().eval(1), 0);

        let new_entry = header.to_entry();
        assert_eq!(new_entry.t_comment, entry.t_comment);
        assert_eq!(new_entry.translation, entry.translation);
        assert_eq!(new_entry.flags, entry.flags);
    }

    #[test]
    fn missing_plural_forms_defaults_to_one_plural_count() {
        let header = Header::default();
        assert_eq!(header.plural_count(), 1);
    }

    #[test]
    fn timestamp_round_trips_nonzero_offset() {
        let parsed = parse_timestamp("2021-06-05 14:30+02:00").unwrap();
        assert_eq!(format_timestamp(&parsed), "2021-06-05 14:30+02:00");
    }
}
