use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use confedit::config::{load_from_path, Settings, SettingsInput};
use confedit::{FileRewriter, RewriteError, RewriteOutcome};
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// No line changed
const EXIT_UNCHANGED: u8 = 0;
/// At least one line changed (or would change, with --dry-run)
const EXIT_CHANGED: u8 = 1;
/// Missing or invalid arguments/profile
const EXIT_MISCONFIGURED: u8 = 2;
/// The file could not be read, decoded or replaced
const EXIT_FAILED: u8 = 3;

#[derive(Parser)]
#[command(name = "confedit")]
#[command(
    about = "Edit key/value pairs in line-oriented config files in place",
    long_about = "Edit key/value pairs in line-oriented config files (sshd_config style) in place.\n\n\
                  Exit status: 0 nothing changed, 1 at least one line changed, \
                  2 missing or invalid arguments, 3 the file could not be rewritten."
)]
#[command(version)]
struct Cli {
    /// Config file to edit
    #[arg(short, long, value_name = "FILE")]
    path: Option<PathBuf>,

    /// Comment character(s); any of them starts a comment, e.g. "#"
    #[arg(short, long, value_name = "CHARS", allow_hyphen_values = true)]
    comment: Option<String>,

    /// Separator character(s) between key and value, e.g. " "
    #[arg(short, long, value_name = "CHARS", allow_hyphen_values = true)]
    separator: Option<String>,

    /// Set KEY to VALUE (repeatable; the last value for a key wins)
    #[arg(
        short = 'a',
        long = "assign",
        num_args = 2,
        value_names = ["KEY", "VALUE"],
        allow_hyphen_values = true
    )]
    assign: Vec<String>,

    /// TOML profile providing [syntax] delimiters and a [set] of values
    #[arg(short = 'f', long, value_name = "FILE")]
    profile: Option<PathBuf>,

    /// Echo parsed arguments and report skipped comment lines and substitutions
    #[arg(short, long)]
    verbose: bool,

    /// Dry run - show what would be changed without modifying the file
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Show unified diff of changes
    #[arg(short, long)]
    diff: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            println!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::from(EXIT_FAILED)
        }
    }
}

/// Diagnostics go to stdout; `-v` turns on the library's debug events.
/// `RUST_LOG` overrides both.
fn init_tracing(verbose: bool) {
    let default = if verbose { "confedit=debug" } else { "confedit=error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: Cli) -> Result<u8> {
    // 1. Optional profile
    let profile = match &cli.profile {
        Some(path) => match load_from_path(path) {
            Ok(profile) => Some(profile),
            Err(e) => {
                println!("{}", e.to_string().red());
                return Ok(EXIT_MISCONFIGURED);
            }
        },
        None => None,
    };

    // 2. Merge with command-line values
    let input = SettingsInput {
        path: cli.path,
        comment: cli.comment,
        separator: cli.separator,
        assignments: cli
            .assign
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect(),
    };
    let settings = match Settings::resolve(input, profile.as_ref()) {
        Ok(settings) => settings,
        Err(e) => {
            println!("{}", e.to_string().yellow());
            return Ok(EXIT_MISCONFIGURED);
        }
    };

    if cli.verbose {
        echo_settings(&settings);
    }

    let rewriter = FileRewriter::new(&settings.path, &settings.syntax, &settings.replacements);

    if cli.dry_run {
        cmd_preview(&rewriter, cli.diff)
    } else {
        cmd_apply(&rewriter, cli.diff)
    }
}

fn echo_settings(settings: &Settings) {
    println!("{}", "Arguments:".bold());
    println!("  path {}", settings.path.display());
    println!("  comment {:?}", settings.syntax.comment.to_string());
    println!("  separator {:?}", settings.syntax.separator.to_string());
    for (key, value) in &settings.replacements {
        println!("  key {} value {}", key, value);
    }
}

fn cmd_apply(rewriter: &FileRewriter<'_>, show_diff: bool) -> Result<u8> {
    // Capture file contents before applying (for diff output)
    let before = if show_diff {
        fs::read_to_string(rewriter.path()).ok()
    } else {
        None
    };

    let outcome = match rewriter.run() {
        Ok(outcome) => outcome,
        Err(e) => {
            report_rewrite_error(&e);
            return Ok(EXIT_FAILED);
        }
    };

    match &outcome {
        RewriteOutcome::Committed { file, summary } => {
            println!(
                "{} {}: {} of {} line(s) changed",
                "✓".green(),
                file.display(),
                summary.changed_lines.len(),
                summary.lines
            );
            if let Some(before) = before {
                let after = fs::read_to_string(file)
                    .with_context(|| format!("failed to re-read {}", file.display()))?;
                display_diff(file, &before, &after);
            }
            Ok(EXIT_CHANGED)
        }
        RewriteOutcome::Unchanged { file, .. } => {
            println!("{} {}: no changes", "⊙".yellow(), file.display());
            Ok(EXIT_UNCHANGED)
        }
    }
}

fn cmd_preview(rewriter: &FileRewriter<'_>, show_diff: bool) -> Result<u8> {
    println!("{}", "[DRY RUN - showing what would be changed]".cyan());

    let preview = match rewriter.preview() {
        Ok(preview) => preview,
        Err(e) => {
            report_rewrite_error(&e);
            return Ok(EXIT_FAILED);
        }
    };

    if !preview.summary.changed() {
        println!("{} {}: no changes", "⊙".yellow(), preview.file.display());
        return Ok(EXIT_UNCHANGED);
    }

    println!(
        "{} {}: would change line(s) {}",
        "✓".green(),
        preview.file.display(),
        preview
            .summary
            .changed_lines
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    if show_diff {
        display_diff(&preview.file, &preview.original, &preview.rewritten);
    }
    Ok(EXIT_CHANGED)
}

fn report_rewrite_error(e: &RewriteError) {
    match e {
        RewriteError::InvalidEncoding {
            line, valid_prefix, ..
        } => {
            println!("{}", format!("Invalid UTF-8 encoding detected at line {}", line).red());
            println!("This part is fine: {}", valid_prefix);
            println!("Quitting... (file left unmodified)");
        }
        RewriteError::TempFileExists(path) => {
            println!("{} {}", "✗".red(), e);
            println!(
                "  Another run may be in progress; remove {} if it is stale",
                path.display()
            );
        }
        _ => println!("{} {}", "✗".red(), e),
    }
}

/// Print the rewrite as unified-diff hunks, three lines of context each.
fn display_diff(file: &Path, original: &str, modified: &str) {
    let name = file.display();
    println!("\n{}", format!("--- a/{name}\n+++ b/{name}").dimmed());

    let diff = TextDiff::from_lines(original, modified);
    let mut unified = diff.unified_diff();
    for hunk in unified.context_radius(3).iter_hunks() {
        println!("{}", hunk.header().to_string().cyan());
        for change in hunk.iter_changes() {
            let text = change.value().trim_end_matches(['\n', '\r']);
            match change.tag() {
                ChangeTag::Delete => println!("{}", format!("-{text}").red()),
                ChangeTag::Insert => println!("{}", format!("+{text}").green()),
                ChangeTag::Equal => println!(" {text}"),
            }
        }
    }
}
