//! `wc FILE...`: counts lines, words, and chars across the translated
//! strings of one or more PO catalogs.

use std::fs::File as StdFile;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use translate_storage::entry::Translation;
use translate_storage::file::File;

#[derive(Parser)]
#[command(name = "wc", about = "Count resources words and symbols")]
struct Cli {
    /// PO files to count
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let mut lines = 0usize;
    let mut words = 0usize;
    let mut chars = 0usize;

    for path in &cli.files {
        let file = match StdFile::open(path) {
            Ok(f) => f,
            Err(err) => {
                eprintln!("fail to open file {path:?}: {err}");
                return ExitCode::FAILURE;
            }
        };
        let po = match File::read(BufReader::new(file)) {
            Ok(po) => po,
            Err(err) => {
                eprintln!("fail to parse file {path:?}: {err}");
                return ExitCode::FAILURE;
            }
        };
        for entry in &po.entries {
            match &entry.translation {
                Translation::Plural(forms) => {
                    for form in forms {
                        count_line(form, &mut lines, &mut words, &mut chars);
                    }
                }
                Translation::Singular(text) => count_line(text, &mut lines, &mut words, &mut chars),
                Translation::None => {}
            }
        }
    }

    println!("Lines: {lines}");
    println!("Words: {words}");
    println!("Chars: {chars}");
    ExitCode::SUCCESS
}

fn count_line(text: &str, lines: &mut usize, words: &mut usize, chars: &mut usize) {
    *lines += 1;
    *words += text.split_whitespace().count();
    *chars += text.chars().count();
}
