//! Main entry point for the checkzip CLI application.
//!
//! This binary verifies ZIP archives: structural parsing, per-member
//! checksum verification, and optional comparison of the member name set
//! against a source directory tree.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use checkzip::verify::conformance::{self, ConformanceReport};
use checkzip::verify::integrity::{self, COMPRESSION_WORTHWHILE_MIN, VerifyOutcome};
use checkzip::{Archive, Cli, NamePolicy};

fn main() -> Result<()> {
    checkzip::logging::init_logging();
    let cli = Cli::parse();

    let policy = match cli.codepage {
        Some(id) => NamePolicy::legacy(id)
            .with_context(|| format!("cannot decode names with codepage {id}"))?,
        None => NamePolicy::Utf8,
    };

    let data = fs::read(&cli.file).with_context(|| format!("cannot read {}", cli.file))?;
    let archive = Archive::parse(&data, &policy)
        .with_context(|| format!("cannot parse {}", cli.file))?;

    // List mode: display archive contents and exit
    if cli.list || cli.verbose {
        list_entries(&archive, cli.verbose);
        return Ok(());
    }

    let report = if cli.names.is_empty() {
        check_all(&archive, &cli)?
    } else {
        check_selected(&archive, &cli)
    };

    for issue in &report.issues {
        eprintln!("{issue}");
    }
    if !cli.quiet {
        println!(
            "{}: {} member(s) verified, {} issue(s)",
            cli.file,
            report.verified_entries,
            report.issues.len()
        );
    }

    if !report.is_pass() {
        bail!("verification failed with {} issue(s)", report.issues.len());
    }
    Ok(())
}

/// Run the whole conformance suite against the archive.
fn check_all(archive: &Archive<'_>, cli: &Cli) -> Result<ConformanceReport> {
    let mut report = conformance::check_integrity(archive);
    report.merge(conformance::check_compression(
        archive,
        COMPRESSION_WORTHWHILE_MIN,
    ));

    if let Some(ref source) = cli.source {
        let expected = walk_source_tree(Path::new(source))
            .with_context(|| format!("cannot walk source tree {source}"))?;
        report.merge(conformance::check_name_set(archive, &expected));
    }

    for name in &cli.expect_absent {
        report.merge(conformance::check_absent(archive, name));
    }

    Ok(report)
}

/// Verify only the members named on the command line.
fn check_selected(archive: &Archive<'_>, cli: &Cli) -> ConformanceReport {
    let mut report = ConformanceReport::default();

    for name in &cli.names {
        let Some(entry) = archive.entry(name) else {
            report.issues.push(conformance::Issue {
                kind: conformance::IssueKind::ExtractFailed,
                name: name.clone(),
                message: format!("no such entry in archive: {name}"),
            });
            continue;
        };
        match archive.extract(entry) {
            Ok(content) => {
                match integrity::verify(entry, &content) {
                    VerifyOutcome::Valid => {
                        report.verified_entries += 1;
                        if !cli.quiet {
                            println!("  verified: {name}");
                        }
                    }
                    VerifyOutcome::Corrupt { expected, actual } => {
                        report.issues.push(conformance::Issue {
                            kind: conformance::IssueKind::ChecksumMismatch,
                            name: name.clone(),
                            message: format!(
                                "stored {expected:#010x}, computed {actual:#010x}"
                            ),
                        });
                    }
                }
            }
            Err(err) => {
                report.issues.push(conformance::Issue {
                    kind: conformance::IssueKind::ExtractFailed,
                    name: name.clone(),
                    message: err.to_string(),
                });
            }
        }
    }

    report
}

/// Collect the expected relative-path set from a source directory.
///
/// Directories carry a trailing `/`; all separators are canonical `/`
/// whatever the host convention.
fn walk_source_tree(root: &Path) -> Result<BTreeSet<String>> {
    let mut expected = BTreeSet::new();

    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry?;
        let rel = entry.path().strip_prefix(root)?;
        let parts: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect();
        let name = parts.join("/");
        if entry.file_type().is_dir() {
            expected.insert(format!("{name}/"));
        } else {
            expected.insert(name);
        }
    }

    Ok(expected)
}

/// List archive members.
///
/// Simple format (`-l`): one name per line. Verbose format (`-v`): a
/// table with sizes, compression ratio and DOS timestamps.
fn list_entries(archive: &Archive<'_>, verbose: bool) {
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

    for entry in archive.entries() {
        if verbose {
            let (year, month, day) = entry.mod_date();
            let (hour, minute, _second) = entry.mod_time();

            let ratio = if entry.uncompressed_size > 0 {
                format!(
                    "{:>4}%",
                    100 - (entry.compressed_size * 100 / entry.uncompressed_size)
                )
            } else {
                "  0%".to_string()
            };

            println!(
                "{:>10}  {:>10}  {}  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
                entry.uncompressed_size,
                entry.compressed_size,
                ratio,
                year,
                month,
                day,
                hour,
                minute,
                entry.name
            );

            if !entry.is_directory {
                total_uncompressed += entry.uncompressed_size;
                total_compressed += entry.compressed_size;
                file_count += 1;
            }
        } else {
            println!("{}", entry.name);
        }
    }

    if verbose {
        println!("{}", "-".repeat(70));
        let total_ratio = if total_uncompressed > 0 {
            format!(
                "{:>4}%",
                100 - (total_compressed * 100 / total_uncompressed)
            )
        } else {
            "  0%".to_string()
        };
        println!(
            "{:>10}  {:>10}  {}  {:>21}  {} files",
            total_uncompressed, total_compressed, total_ratio, "", file_count
        );
    }
}
