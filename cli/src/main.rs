//! docfill CLI - DOCX template placeholder tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docfill::generate::{fill_batch_with_progress, BatchProgress};
use docfill::render::{self, JsonFormat, TextOptions};
use docfill::{
    detect_format_from_path, DocxTemplate, FillOptions, LoadOptions, MissingValuePolicy, Recipient,
    ValueMap,
};

#[derive(Parser)]
#[command(name = "docfill")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Scan and fill {PLACEHOLDER} tokens in DOCX templates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the placeholders of a template
    Scan {
        /// Template DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output a JSON array
        #[arg(long)]
        json: bool,

        /// Show where each occurrence is
        #[arg(short, long)]
        locations: bool,
    },

    /// Fill a template with values
    Fill {
        /// Template DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// JSON object mapping tokens to values ({"{FIO}": "..."})
        #[arg(long, value_name = "JSON_FILE")]
        values: Option<PathBuf>,

        /// Single value as CODE=VALUE (repeatable, overrides --values)
        #[arg(short = 's', long = "set", value_name = "CODE=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, String)>,

        /// Output file (default: <stem>_filled.docx next to the input)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// What to do with placeholders that have no value
        #[arg(long, env = "DOCFILL_ON_MISSING", default_value = "keep", value_parser = parse_policy)]
        on_missing: MissingValuePolicy,

        /// Skip unreadable headers, footers and document properties
        #[arg(long)]
        lenient: bool,
    },

    /// Generate one document per recipient
    Batch {
        /// Template DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// JSON array of {"id": ..., "values": {...}}
        #[arg(long, value_name = "JSON_FILE")]
        recipients: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// What to do with placeholders that have no value
        #[arg(long, env = "DOCFILL_ON_MISSING", default_value = "keep", value_parser = parse_policy)]
        on_missing: MissingValuePolicy,

        /// Render recipients one after another
        #[arg(long)]
        sequential: bool,
    },

    /// Print the logical text of every paragraph
    Text {
        /// Template DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Prefix lines with paragraph locations
        #[arg(short, long)]
        locations: bool,

        /// Only paragraphs containing placeholders
        #[arg(short, long)]
        placeholders: bool,
    },

    /// Dump the document model as JSON
    Json {
        /// Template DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show template information
    Info {
        /// Template DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn parse_policy(s: &str) -> Result<MissingValuePolicy, String> {
    s.parse().map_err(|e: docfill::Error| e.to_string())
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (code, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected CODE=VALUE, got {:?}", s))?;
    Ok((code.to_string(), value.to_string()))
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Scan {
            input,
            json,
            locations,
        }) => cmd_scan(&input, json, locations),
        Some(Commands::Fill {
            input,
            values,
            set,
            output,
            on_missing,
            lenient,
        }) => cmd_fill(
            &input,
            values.as_deref(),
            &set,
            output.as_deref(),
            on_missing,
            lenient,
        ),
        Some(Commands::Batch {
            input,
            recipients,
            output,
            on_missing,
            sequential,
        }) => cmd_batch(
            &input,
            &recipients,
            output.as_deref(),
            on_missing,
            sequential,
        ),
        Some(Commands::Text {
            input,
            output,
            locations,
            placeholders,
        }) => cmd_text(&input, output.as_deref(), locations, placeholders),
        Some(Commands::Json {
            input,
            output,
            compact,
        }) => cmd_json(&input, output.as_deref(), compact),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: docfill <COMMAND> <FILE>".yellow());
            println!("       docfill --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_scan(input: &Path, json: bool, locations: bool) -> Result<(), Box<dyn std::error::Error>> {
    let template = DocxTemplate::open(input)?;

    if json {
        let output = if locations {
            render::to_json_string(&template.occurrences(), JsonFormat::Pretty)?
        } else {
            render::to_json_string(&template.scan(), JsonFormat::Pretty)?
        };
        println!("{}", output);
        return Ok(());
    }

    let tokens = template.scan();
    if tokens.is_empty() {
        println!("{}", "No placeholders found".yellow());
        return Ok(());
    }

    if locations {
        for occurrence in template.occurrences() {
            println!(
                "{}  {}",
                occurrence.token.cyan(),
                occurrence.location.to_string().dimmed()
            );
        }
    } else {
        for token in &tokens {
            println!("{}", token);
        }
    }
    println!(
        "\n{} {} placeholder(s)",
        "Found".green().bold(),
        tokens.len()
    );

    Ok(())
}

fn load_values(
    file: Option<&Path>,
    set: &[(String, String)],
) -> Result<ValueMap, Box<dyn std::error::Error>> {
    let mut values = match file {
        Some(path) => {
            let data = fs::read_to_string(path)?;
            let raw: ValueMap = serde_json::from_str(&data)
                .map_err(|e| format!("Invalid values file {}: {}", path.display(), e))?;
            // keys may be bare codes or full tokens
            ValueMap::from_fields(raw.iter())?
        }
        None => ValueMap::new(),
    };
    for (code, value) in set {
        values.insert_field(code, value.as_str())?;
    }
    Ok(values)
}

fn cmd_fill(
    input: &Path,
    values_file: Option<&Path>,
    set: &[(String, String)],
    output: Option<&Path>,
    on_missing: MissingValuePolicy,
    lenient: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let values = load_values(values_file, set)?;

    let mut options = FillOptions::new().on_missing(on_missing);
    if lenient {
        options = options.lenient();
    }

    let output = output.map(Path::to_path_buf).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        input.with_file_name(format!("{}_filled.docx", stem))
    });

    let report = docfill::fill_file(input, &output, &values, &options)?;

    println!(
        "{} {} ({} replaced in {} paragraphs)",
        "Saved to".green(),
        output.display(),
        report.replaced,
        report.paragraphs_rewritten
    );
    if !report.kept.is_empty() {
        let kept: Vec<&str> = report.kept.iter().map(String::as_str).collect();
        println!("{} {}", "Left without value:".yellow(), kept.join(", "));
    }

    Ok(())
}

fn cmd_batch(
    input: &Path,
    recipients_file: &Path,
    output: Option<&Path>,
    on_missing: MissingValuePolicy,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let recipients: Vec<Recipient> = serde_json::from_str(&fs::read_to_string(recipients_file)?)
        .map_err(|e| format!("Invalid recipients file {}: {}", recipients_file.display(), e))?;

    let stem = input
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let output_dir = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format!("{}_generated", stem)));

    let options = FillOptions::new()
        .on_missing(on_missing)
        .with_parallel(!sequential);

    let pb = ProgressBar::new(recipients.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let (tx, rx) = crossbeam_channel::unbounded();
    let documents = std::thread::scope(|scope| {
        let bar = pb.clone();
        scope.spawn(move || {
            for event in rx.iter() {
                match event {
                    BatchProgress::Started { total } => {
                        bar.set_length(total as u64);
                        bar.set_message("Generating...");
                    }
                    BatchProgress::Rendered { recipient } => {
                        bar.set_message(recipient);
                        bar.inc(1);
                    }
                    BatchProgress::Failed { recipient, message } => {
                        bar.println(format!("{} {}: {}", "Failed".red(), recipient, message));
                    }
                }
            }
        });
        let result = fill_batch_with_progress(&data, &recipients, &options, Some(&tx));
        drop(tx);
        result
    });

    let documents = match documents {
        Ok(documents) => documents,
        Err(e) => {
            pb.abandon_with_message("Aborted");
            return Err(e.into());
        }
    };

    fs::create_dir_all(&output_dir)?;
    for doc in &documents {
        fs::write(output_dir.join(doc.file_name(&stem)), &doc.bytes)?;
    }
    pb.finish_with_message("Done!");

    println!(
        "\n{} {} documents in {}",
        "Generated".green().bold(),
        documents.len(),
        output_dir.display()
    );
    let incomplete = documents.iter().filter(|d| !d.report.is_complete()).count();
    if incomplete > 0 {
        println!(
            "{} {} document(s) still contain placeholders",
            "Note:".yellow(),
            incomplete
        );
    }

    Ok(())
}

fn cmd_text(
    input: &Path,
    output: Option<&Path>,
    locations: bool,
    placeholders: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // headers or footers that fail to parse should not hide the body text
    let template = DocxTemplate::open_with_options(input, &LoadOptions::new().lenient())?;

    let mut options = TextOptions::new();
    if locations {
        options = options.with_locations();
    }
    if placeholders {
        options = options.placeholders_only();
    }

    let text = render::to_text(template.document(), &options)?;

    if let Some(path) = output {
        fs::write(path, &text)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", text);
    }

    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let template = DocxTemplate::open(input)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = render::to_json(template.document(), format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let format = detect_format_from_path(input)?;
    let template = DocxTemplate::open_with_options(input, &LoadOptions::new().lenient())?;
    let doc = template.document();

    println!("{}", "Template Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), format);
    println!("{}: {}", "Sections".bold(), doc.sections.len());
    println!("{}: {}", "Story parts".bold(), template.story_parts().join(", "));

    let metadata = &doc.metadata;
    if let Some(ref title) = metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref creator) = metadata.creator {
        println!("{}: {}", "Creator".bold(), creator);
    }
    if let Some(ref modified_by) = metadata.last_modified_by {
        println!("{}: {}", "Last modified by".bold(), modified_by);
    }
    if let Some(ref created) = metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let paragraphs = doc.paragraphs();
    let in_tables = paragraphs.iter().filter(|(l, _)| l.in_table()).count();
    let occurrences = template.occurrences();

    println!("{}: {}", "Paragraphs".bold(), paragraphs.len());
    println!("{}: {}", "In tables".bold(), in_tables);
    println!("{}: {}", "Placeholders".bold(), template.scan().len());
    println!("{}: {}", "Occurrences".bold(), occurrences.len());

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docfill".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("DOCX template placeholder tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/docfill".dimmed());
    println!("License: MIT");
}
