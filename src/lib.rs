//! Reads, writes, merges, and consults gettext-style message catalogs in two
//! complementary formats: the textual [PO][po] format (source of truth,
//! human-edited) and the binary [MO][mo] format (compiled, consumed at
//! runtime).
//!
//! The hard engineering is concentrated in three coupled cores:
//!
//! - The [`scanner`]/[`entry`] pair: a two-level state machine that
//!   classifies each input line by a `(border, prefix)` tag, then accretes
//!   continuation lines into typed blocks that assemble into a structured
//!   [`entry::Entry`].
//! - The [`formatter`]: an inverse that re-emits entries with configurable
//!   per-field border, prefix, and word-wrapped width while preserving
//!   round-trip semantics through escaping and quoting.
//! - The [`plural`] engine: a parser, AST, and evaluator for the
//!   arithmetic/Boolean expression grammar gettext uses in the
//!   `Plural-Forms` header, plus a container that reconstructs the
//!   canonical nested ternary form.
//!
//! [`file::File`] drives the scanner/parser across a whole document and
//! implements catalog merge; [`mo::MoFile`] is the binary codec; and
//! [`translator::Translator`] is the runtime `Get`/`GetN`/`GetCtxt`/
//! `GetCtxtN` lookup API built on top of both.
//!
//! [po]: https://www.gnu.org/software/gettext/manual/html_node/PO-Files.html
//! [mo]: https://www.gnu.org/software/gettext/manual/html_node/MO-Files.html

pub mod entry;
pub mod error;
pub mod file;
pub mod flags;
pub mod formatter;
pub mod header;
pub mod mo;
pub mod plural;
pub mod scanner;
pub mod similarity;
pub mod starter;
pub mod translator;

pub use entry::{Entry, Translation};
pub use error::{Error, Result};
pub use file::File;
pub use header::{Author, Header, Person};
pub use mo::MoFile;
pub use plural::PluralRules;
pub use translator::{FileLoader, Loader, TranslateOptions, Translator};
