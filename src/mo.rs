//! Binary MO ("Machine Object") codec: a fixed little-endian layout with
//! offset tables for originals and translations, carrying the same
//! `(id -> translations)` map a PO [`crate::file::File`] expresses as text.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::file::File;
use crate::header::Header;

const MAGIC: u32 = 0x950412de;
const CTXT_SEP: &str = "\x04";
const PLURAL_SEP: &str = "\x00";

/// A compiled catalog: header plus a flat `id -> translation forms` map,
/// where `id` is `[ctxt "\x04"] msgid ["\x00" msgidp]`.
#[derive(Debug, Clone, Default)]
pub struct MoFile {
    pub header: Header,
    pub entries: BTreeMap<String, Vec<String>>,
}

#[derive(Clone, Copy)]
struct Position {
    length: u32,
    offset: u32,
}

impl MoFile {
    /// Reads a binary MO file. Validates magic, revision, and that the
    /// offset tables are strictly non-overlapping and increasing.
    pub fn read<R: Read>(mut r: R) -> Result<Self> {
        let magic = read_u32(&mut r)?;
        if magic != MAGIC {
            return Err(Error::mo("magic number mismatch"));
        }
        let revision = read_u32(&mut r)?;
        if revision != 0 {
            return Err(Error::mo(format!("unsupported format revision {revision}")));
        }

        let n = read_u32(&mut r)?;
        if n == 0 {
            return Ok(MoFile::default());
        }
        let o = read_u32(&mut r)?;
        if o < 28 {
            return Err(Error::mo("bad original table offset"));
        }
        let t = read_u32(&mut r)?;
        if t < o + n * 8 {
            return Err(Error::mo("bad translation table offset"));
        }
        let s = read_u32(&mut r)?;
        let h = read_u32(&mut r)?;
        if s > 0 && h < t + n * 8 {
            return Err(Error::mo("bad hashing table offset"));
        }

        let mut pos = 28u32;
        skip(&mut r, &mut pos, o)?;
        let o_table = read_position_table(&mut r, &mut pos, n, h + s * 4)?;
        let last = o_table[n as usize - 1];
        let t_table = read_position_table(&mut r, &mut pos, n, last.offset + last.length + 1)?;

        let originals = read_strings(&mut r, &mut pos, &o_table)?;
        let translations = read_strings(&mut r, &mut pos, &t_table)?;

        let mut file = MoFile::default();
        for (id, translation) in originals.into_iter().zip(translations) {
            if id.is_empty() {
                file.header = header_from_raw(&translation)?;
            } else {
                file.entries
                    .insert(id, translation.split(PLURAL_SEP).map(str::to_string).collect());
            }
        }
        Ok(file)
    }

    /// Writes the binary MO representation: keys sorted ascending, `S = 0`
    /// (no hash table), strings packed immediately after the tables.
    pub fn write<W: Write>(&self, mut w: W) -> Result<()> {
        let mut ids: Vec<&String> = self.entries.keys().collect();
        ids.sort();

        let header_str = self.header.to_entry_msg_str();
        let mut originals: Vec<&str> = vec![""];
        originals.extend(ids.iter().map(|s| s.as_str()));

        let mut translations: Vec<String> = Vec::with_capacity(originals.len());
        translations.push(header_str);
        for id in &ids {
            translations.push(self.entries[*id].join(PLURAL_SEP));
        }

        let n = originals.len() as u32;
        let o = 28u32;
        let t = o + n * 8;
        let s = 0u32;
        let h = t + n * 8;

        write_u32(&mut w, MAGIC)?;
        write_u32(&mut w, 0)?;
        write_u32(&mut w, n)?;
        write_u32(&mut w, o)?;
        write_u32(&mut w, t)?;
        write_u32(&mut w, s)?;
        write_u32(&mut w, h)?;

        let mut offset = h;
        offset = write_positions(&mut w, offset, originals.iter().map(|s| s.len() as u32))?;
        write_positions(&mut w, offset, translations.iter().map(|s| s.len() as u32))?;

        for s in &originals {
            write_string(&mut w, s)?;
        }
        for s in &translations {
            write_string(&mut w, s)?;
        }
        Ok(())
    }

    /// Converts a PO [`File`] to its MO-shaped catalog, keying entries by
    /// `[ctxt "\x04"] msgid ["\x00" msgidp]` per §4.8.
    pub fn from_po(po: &File) -> MoFile {
        let mut entries = BTreeMap::new();
        for entry in &po.entries {
            let mut id = entry.msgid.clone();
            if !entry.msgctxt.is_empty() {
                id = format!("{}{CTXT_SEP}{}", entry.msgctxt, id);
            }
            let forms = match &entry.translation {
                crate::entry::Translation::Plural(slots) => {
                    id = format!("{id}{PLURAL_SEP}{}", entry.msgidp);
                    slots.clone()
                }
                crate::entry::Translation::Singular(s) => vec![s.clone()],
                crate::entry::Translation::None => vec![String::new()],
            };
            entries.insert(id, forms);
        }
        MoFile {
            header: po.header.clone(),
            entries,
        }
    }

    /// Looks up the singular translation of `msg`, or `None` if absent.
    pub fn get(&self, msg: &str) -> Option<&str> {
        self.entries.get(msg)?.first().map(String::as_str)
    }

    /// Looks up a plural translation, choosing the form via the header's
    /// `Plural-Forms` rule. Returns `None` if the id or chosen form is absent.
    pub fn get_n(&self, msg: &str, plural: &str, n: i64) -> Option<&str> {
        let i = self.header.plural_forms.as_ref().map_or(0, |pf| pf.eval(n));
        let id = format!("{msg}{PLURAL_SEP}{plural}");
        self.entries.get(&id)?.get(i).map(String::as_str)
    }

    /// Looks up a context-disambiguated singular translation.
    pub fn get_ctxt(&self, msg: &str, ctxt: &str) -> Option<&str> {
        let id = format!("{ctxt}{CTXT_SEP}{msg}");
        self.entries.get(&id)?.first().map(String::as_str)
    }

    /// Looks up a context-disambiguated plural translation.
    pub fn get_ctxt_n(&self, msg: &str, plural: &str, ctxt: &str, n: i64) -> Option<&str> {
        let i = self.header.plural_forms.as_ref().map_or(0, |pf| pf.eval(n));
        let id = format!("{ctxt}{CTXT_SEP}{msg}{PLURAL_SEP}{plural}");
        self.entries.get(&id)?.get(i).map(String::as_str)
    }
}

fn header_from_raw(msg_str: &str) -> Result<Header> {
    let mut entry = crate::entry::Entry::default();
    entry.translation = crate::entry::Translation::Singular(msg_str.to_string());
    Header::from_entry(&entry)
}

fn read_u32<R: Read>(r: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).map_err(|_| Error::mo("unexpected end of file"))?;
    Ok(u32::from_le_bytes(buf))
}

fn write_u32<W: Write>(w: &mut W, v: u32) -> Result<()> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn skip<R: Read>(r: &mut R, pos: &mut u32, target: u32) -> Result<()> {
    if target < *pos {
        return Err(Error::mo("bad offset in table"));
    }
    let mut buf = vec![0u8; (target - *pos) as usize];
    r.read_exact(&mut buf).map_err(|_| Error::mo("unexpected end of file"))?;
    *pos = target;
    Ok(())
}

fn read_position_table<R: Read>(
    r: &mut R,
    pos: &mut u32,
    n: u32,
    min_offset: u32,
) -> Result<Vec<Position>> {
    let mut table = Vec::with_capacity(n as usize);
    let mut expected = min_offset;
    for _ in 0..n {
        let length = read_u32(r)?;
        let offset = read_u32(r)?;
        *pos += 8;
        if offset < expected {
            return Err(Error::mo("bad offset in table"));
        }
        expected = offset + length + 1;
        table.push(Position { length, offset });
    }
    Ok(table)
}

fn read_strings<R: Read>(r: &mut R, pos: &mut u32, table: &[Position]) -> Result<Vec<String>> {
    let mut out = Vec::with_capacity(table.len());
    for p in table {
        skip(r, pos, p.offset)?;
        let mut buf = vec![0u8; p.length as usize + 1];
        r.read_exact(&mut buf).map_err(|_| Error::mo("unexpected end of file"))?;
        *pos += p.length + 1;
        if buf[p.length as usize] != 0 {
            return Err(Error::mo("expected null byte"));
        }
        buf.truncate(p.length as usize);
        let s = String::from_utf8(buf).map_err(|_| Error::mo("invalid utf-8 in string table"))?;
        out.push(s);
    }
    Ok(out)
}

fn write_positions<W: Write>(
    w: &mut W,
    mut offset: u32,
    lengths: impl Iterator<Item = u32>,
) -> Result<u32> {
    for len in lengths {
        write_u32(w, len)?;
        write_u32(w, offset)?;
        offset += len + 1;
    }
    Ok(offset)
}

fn write_string<W: Write>(w: &mut W, s: &str) -> Result<()> {
    w.write_all(s.as_bytes())?;
    w.write_all(&[0u8])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Entry, Translation};

    fn sample() -> MoFile {
        let mut file = MoFile::default();
        file.header.language = "es_ES".to_string();
        file.entries
            .insert("One".to_string(), vec!["Uno".to_string()]);
        file.entries.insert(
            "msg\x00plural".to_string(),
            vec!["uno".to_string(), "unos".to_string()],
        );
        file
    }

    #[test]
    fn round_trips_through_bytes() {
        let file = sample();
        let mut buf = Vec::new();
        file.write(&mut buf).unwrap();
        let decoded = MoFile::read(std::io::Cursor::new(buf)).unwrap();
        assert_eq!(decoded.header.language, "es_ES");
        assert_eq!(decoded.entries, file.entries);
    }

    #[test]
    fn rejects_bad_magic() {
        let err = MoFile::read(std::io::Cursor::new(vec![0u8; 32])).unwrap_err();
        assert!(matches!(err, Error::Mo { .. }));
    }

    #[test]
    fn from_po_keys_plural_entries_with_null_separated_id() {
        let mut entry = Entry::default();
        entry.msgid = "msg".to_string();
        entry.msgidp = "plural".to_string();
        entry.translation = Translation::Plural(vec!["uno".to_string(), "unos".to_string()]);
        let po = File {
            header: Header::default(),
            entries: vec![entry],
        };
        let mo = MoFile::from_po(&po);
        assert_eq!(
            mo.entries.get("msg\x00plural"),
            Some(&vec!["uno".to_string(), "unos".to_string()])
        );
    }

    #[test]
    fn lookup_helpers_use_plural_forms_to_choose_form() {
        let mut file = sample();
        file.header.plural_forms = Some(crate::plural::PluralRules::parse("nplurals=2; plural=n != 1;").unwrap());
        assert_eq!(file.get("One"), Some("Uno"));
        assert_eq!(file.get_n("msg", "plural", 1), Some("uno"));
        assert_eq!(file.get_n("msg", "plural", 2), Some("unos"));
        assert_eq!(file.get("missing"), None);
    }
}
