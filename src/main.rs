//! Main entry point for the zipwalk CLI application.
//!
//! This binary lists and extracts ZIP archives in a single forward pass, reading
//! from a local file, standard input, or an HTTP URL.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use zipwalk::{ByteStream, Cli, ZipEntry, ZipWalker, open_file, open_stdin, open_url};

/// Application entry point.
///
/// Parses command-line arguments, sets up logging and dispatches on the
/// kind of source: HTTP URL, standard input, or local file.
fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    if cli.is_http_url() {
        let mut walker = ZipWalker::new(open_url(&cli.file)?);
        process_zip(&mut walker, &cli)?;

        // Display network transfer statistics for HTTP sources
        if !cli.is_quiet() {
            eprintln!("\nTotal bytes transferred: {}", format_size(walker.offset()));
        }
    } else if cli.is_stdin() {
        process_zip(&mut ZipWalker::new(open_stdin()), &cli)?;
    } else {
        process_zip(&mut ZipWalker::new(open_file(Path::new(&cli.file))?), &cli)?;
    }

    Ok(())
}

/// Process a ZIP stream based on CLI options.
///
/// - List mode (`-l` or `-v`): display archive contents
/// - Extract mode: extract entries matching the filters as they go by
///
/// Everything happens in one pass; an entry that is not selected is skipped
/// and cannot be revisited.
fn process_zip<S: ByteStream>(walker: &mut ZipWalker<S>, cli: &Cli) -> Result<()> {
    if cli.list || cli.verbose {
        return list_files(walker, cli.verbose);
    }

    // Pipe mode marks each entry unless exactly one named file was requested.
    let show_filename = cli.pipe && !(cli.files.len() == 1 && !has_glob_chars(&cli.files[0]));

    while let Some(entry) = walker.next_entry()? {
        if is_selected(&entry, cli) {
            extract_file(walker, &entry, cli, show_filename)?;
        }
    }

    Ok(())
}

/// Apply the positional and `-x` filters to an entry.
///
/// Directories are never selected; they are created as needed when files
/// inside them are extracted.
fn is_selected(entry: &ZipEntry, cli: &Cli) -> bool {
    if entry.is_directory() {
        return false;
    }

    // If specific files are requested via positional arguments,
    // only include entries that match
    if !cli.files.is_empty() {
        let matches = cli.files.iter().any(|f| {
            if has_glob_chars(f) {
                glob_match(f, &entry.name)
            } else {
                // No wildcards: exact match on filename or full path
                let basename = Path::new(&entry.name)
                    .file_name()
                    .map(|s| s.to_string_lossy())
                    .unwrap_or_default();
                entry.name == *f || basename == *f
            }
        });
        if !matches {
            return false;
        }
    }

    !cli
        .exclude
        .iter()
        .any(|x| entry.name.contains(x) || glob_match(x, &entry.name))
}

/// List the entries of the archive.
///
/// Each payload is skipped to reach the next header, which also yields the
/// real sizes of deferred-size entries for the verbose table.
fn list_files<S: ByteStream>(walker: &mut ZipWalker<S>, verbose: bool) -> Result<()> {
    if verbose {
        println!(
            "{:>10}  {:>10}  {:>5}  {:>10}  {:>5}  Name",
            "Length", "Size", "Cmpr", "Date", "Time"
        );
        println!("{}", "-".repeat(70));
    }

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    while let Some(entry) = walker.next_entry()? {
        if !verbose {
            println!("{}", entry.name);
            continue;
        }

        let header = walker.skip_data()?;
        let (year, month, day) = header.mod_date();
        let (hour, minute, _second) = header.mod_time();
        let uncompressed = u64::from(header.uncompressed_size);
        let compressed = u64::from(header.compressed_size);

        println!(
            "{:>10}  {:>10}  {}  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
            uncompressed,
            compressed,
            ratio(compressed, uncompressed),
            year,
            month,
            day,
            hour,
            minute,
            entry.name
        );

        if !entry.is_directory() {
            total_uncompressed += uncompressed;
            total_compressed += compressed;
            file_count += 1;
        }
    }

    if verbose {
        println!("{}", "-".repeat(70));
        println!(
            "{:>10}  {:>10}  {}  {:>21}  {} files",
            total_uncompressed,
            total_compressed,
            ratio(total_compressed, total_uncompressed),
            "",
            file_count
        );
    }

    Ok(())
}

/// Compression ratio as percentage saved.
fn ratio(compressed: u64, uncompressed: u64) -> String {
    if uncompressed > 0 && compressed <= uncompressed {
        format!("{:>4}%", 100 - (compressed * 100 / uncompressed))
    } else {
        "  0%".to_string()
    }
}

/// Extract the current entry.
///
/// Handles various extraction options:
/// - Pipe mode (`-p`): Write to stdout instead of file
/// - Custom output directory (`-d`): Extract to specified directory
/// - Junk paths (`-j`): Ignore directory structure in archive
/// - Overwrite control (`-n`, `-o`): Handle existing files
fn extract_file<S: ByteStream>(
    walker: &mut ZipWalker<S>,
    entry: &ZipEntry,
    cli: &Cli,
    show_filename: bool,
) -> Result<()> {
    if cli.pipe {
        let stdout = std::io::stdout();
        let mut stdout = stdout.lock();
        if show_filename {
            writeln!(stdout, "--- {} ---", entry.name)?;
        }
        walker.copy_data(&mut stdout)?;
        stdout.flush()?;
        return Ok(());
    }

    let Some(output_path) = output_path(entry, cli) else {
        log::warn!("Refusing to extract {}: path leaves the target directory", entry.name);
        return Ok(());
    };

    if output_path.exists() {
        if cli.never_overwrite {
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (file exists)", entry.name);
            }
            return Ok(());
        }

        if !cli.overwrite {
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (use -o to overwrite)", entry.name);
            }
            return Ok(());
        }
    }

    if !cli.is_quiet() {
        println!("  extracting: {}", entry.name);
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(&output_path)
        .with_context(|| format!("cannot create {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    walker.copy_data(&mut writer)?;
    writer.flush()?;

    Ok(())
}

/// Destination path for an entry, or `None` if the entry name would escape
/// the extraction directory.
fn output_path(entry: &ZipEntry, cli: &Cli) -> Option<PathBuf> {
    let name = Path::new(&entry.name);
    let relative = if cli.junk_paths {
        PathBuf::from(name.file_name()?)
    } else {
        if name
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return None;
        }
        name.to_path_buf()
    };

    Some(match cli.extract_dir {
        Some(ref dir) => PathBuf::from(dir).join(relative),
        None => relative,
    })
}

/// Check if a pattern contains glob wildcard characters.
fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Simple glob pattern matching supporting `*` and `?` wildcards.
///
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern_chars: Vec<char> = pattern.chars().collect();
    let text_chars: Vec<char> = text.chars().collect();

    fn do_match(pattern: &[char], text: &[char]) -> bool {
        match (pattern.first(), text.first()) {
            (None, None) => true,
            // Star matches zero characters, or one and stays for more
            (Some('*'), _) => {
                do_match(&pattern[1..], text) || (!text.is_empty() && do_match(pattern, &text[1..]))
            }
            (Some('?'), Some(_)) => do_match(&pattern[1..], &text[1..]),
            (Some(p), Some(t)) if *p == *t => do_match(&pattern[1..], &text[1..]),
            _ => false,
        }
    }

    do_match(&pattern_chars, &text_chars)
}

/// Format a byte size into a human-readable string.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zipwalk::ZipHeader;

    fn entry(name: &str) -> ZipEntry {
        ZipEntry {
            name: name.to_string(),
            header: ZipHeader::default(),
            header_offset: 0,
            data_offset: 0,
        }
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("zipwalk").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn glob_wildcards() {
        assert!(glob_match("*.txt", "readme.txt"));
        assert!(glob_match("file?.dat", "file1.dat"));
        assert!(!glob_match("*.txt", "readme.md"));
        assert!(glob_match("OEBPS/*", "OEBPS/ch1.xhtml"));
    }

    #[test]
    fn sizes_are_humanized() {
        assert_eq!(format_size(500), "500 bytes");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1048576), "1.00 MB");
    }

    #[test]
    fn ratio_handles_empty_and_expanded_entries() {
        assert_eq!(ratio(25, 100), "  75%");
        assert_eq!(ratio(0, 0), "  0%");
        assert_eq!(ratio(120, 100), "  0%");
    }

    #[test]
    fn selection_filters() {
        let c = cli(&["a.zip", "*.xhtml", "-x", "skip"]);
        assert!(is_selected(&entry("OEBPS/ch1.xhtml"), &c));
        assert!(!is_selected(&entry("OEBPS/skip.xhtml"), &c));
        assert!(!is_selected(&entry("mimetype"), &c));
        assert!(!is_selected(&entry("OEBPS/"), &cli(&["a.zip"])));
        assert!(is_selected(&entry("META-INF/container.xml"), &cli(&["a.zip", "container.xml"])));
    }

    #[test]
    fn escaping_paths_are_refused() {
        let c = cli(&["a.zip", "-d", "out"]);
        assert_eq!(output_path(&entry("a/b.txt"), &c), Some(PathBuf::from("out/a/b.txt")));
        assert_eq!(output_path(&entry("../evil"), &c), None);
        assert_eq!(output_path(&entry("/etc/passwd"), &c), None);

        let junk = cli(&["a.zip", "-j"]);
        assert_eq!(output_path(&entry("a/b.txt"), &junk), Some(PathBuf::from("b.txt")));
    }
}
