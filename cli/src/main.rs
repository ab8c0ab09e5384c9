//! sapdf CLI - PDF validation model inspection tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;

use sapdf::features::{signatures, SignatureFeaturesObject};
use sapdf::report::{self, summarize_files, DocumentSummary, FileSummary};
use sapdf::{
    ContrastCheck, FeatureExtractionResult, FeaturesObject, JsonFormat, LopdfSource,
    ModelNodeDump, ModelObject, SaDocument, ValidationOptions,
};

#[derive(Parser)]
#[command(name = "sapdf")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Inspect the semantic validation model of PDF documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump the model tree as JSON
    Tree {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Compact JSON output
        #[arg(short, long)]
        compact: bool,

        /// Maximum link depth to follow
        #[arg(long, default_value_t = sapdf::report::DEFAULT_DUMP_DEPTH)]
        depth: usize,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// List annotations with the text under them
    Links {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Only show link annotations
        #[arg(long)]
        only_links: bool,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Report signature features as JSON
    Features {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Compact JSON output
        #[arg(short, long)]
        compact: bool,
    },

    /// Summarize one or more PDF files
    Summary {
        /// Input PDF files
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Print summaries as JSON
        #[arg(long)]
        json: bool,

        /// Process files one at a time
        #[arg(long)]
        sequential: bool,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Show version information
    Version,
}

/// Options controlling how the model is built.
#[derive(Args)]
struct ModelArgs {
    /// Fail on undecodable page content instead of skipping it
    #[arg(long, env = "SAPDF_STRICT")]
    strict: bool,

    /// When to run the contrast checker
    #[arg(long, value_enum, default_value = "when-named")]
    contrast: ContrastMode,

    /// Skip semantic classification of structure elements
    #[arg(long)]
    no_semantics: bool,
}

impl ModelArgs {
    fn options(&self) -> ValidationOptions {
        let options = ValidationOptions::new()
            .with_contrast_check(self.contrast.into())
            .with_semantics(!self.no_semantics);
        if self.strict {
            options.strict()
        } else {
            options
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ContrastMode {
    /// Only for documents with a file name (default)
    WhenNamed,
    /// For every document
    Always,
    /// Never
    Never,
}

impl From<ContrastMode> for ContrastCheck {
    fn from(mode: ContrastMode) -> Self {
        match mode {
            ContrastMode::WhenNamed => ContrastCheck::WhenNamed,
            ContrastMode::Always => ContrastCheck::Always,
            ContrastMode::Never => ContrastCheck::Never,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Tree {
            input,
            output,
            compact,
            depth,
            model,
        } => cmd_tree(&input, output.as_deref(), compact, depth, &model),
        Commands::Links {
            input,
            only_links,
            model,
        } => cmd_links(&input, only_links, &model),
        Commands::Features { input, compact } => cmd_features(&input, compact),
        Commands::Summary {
            inputs,
            json,
            sequential,
            model,
        } => cmd_summary(&inputs, json, sequential, &model),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn cmd_tree(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    depth: usize,
    model: &ModelArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = SaDocument::open(input, model.options())?;
    let dump = ModelNodeDump::with_depth(&doc, depth);
    let json = report::to_json(&dump, json_format(compact))?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!(
            "{} {} ({} nodes)",
            "Saved to".green(),
            path.display(),
            dump.count()
        );
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_links(
    input: &Path,
    only_links: bool,
    model: &ModelArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = SaDocument::open(input, model.options())?;

    for page in doc.pages().iter() {
        let annots = page.annotations();
        if annots.is_empty() {
            continue;
        }
        println!(
            "{} {}",
            "Page".cyan().bold(),
            page.page_number().to_string().cyan().bold()
        );

        for annot in annots.iter() {
            if only_links && annot.kind() != sapdf::AnnotationKind::Link {
                continue;
            }
            let subtype = annot.subtype().unwrap_or("?");
            let marker = if annot.has_link_value() {
                "link".green()
            } else {
                "text".yellow()
            };
            println!(
                "  {} [{}] {:?}",
                annot.object_type().bold(),
                marker,
                annot.text_value()
            );
            println!("    {}: {}", "Subtype".dimmed(), subtype);
            if let Some(uri) = annot.uri() {
                println!("    {}: {}", "URI".dimmed(), uri);
            }
            if annot.is_outside_crop_box() == Some(true) {
                println!("    {}", "outside crop box".red());
            }
        }
    }

    Ok(())
}

fn cmd_features(input: &Path, compact: bool) -> Result<(), Box<dyn std::error::Error>> {
    let source = LopdfSource::load_file(input)?;
    let objects: Vec<SignatureFeaturesObject> = signatures(&source)
        .into_iter()
        .map(|sig| SignatureFeaturesObject::new(Some(sig)))
        .collect();

    let result =
        FeatureExtractionResult::collect(objects.iter().map(|o| o as &dyn FeaturesObject));
    for error in result.errors() {
        eprintln!("{}: {}", "Warning".yellow().bold(), error);
    }
    println!("{}", report::to_json(&result, json_format(compact))?);

    Ok(())
}

fn cmd_summary(
    inputs: &[PathBuf],
    json: bool,
    sequential: bool,
    model: &ModelArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = model.options().with_parallel(!sequential);
    let results = summarize_files(inputs, &options);

    if json {
        println!("{}", report::to_json(&results, JsonFormat::Pretty)?);
    } else {
        for result in &results {
            print_summary(result);
        }
    }

    let failed = results.iter().filter(|r| !r.is_ok()).count();
    if failed > 0 {
        return Err(format!("{} of {} files failed", failed, results.len()).into());
    }
    Ok(())
}

fn print_summary(result: &FileSummary) {
    println!("{}", result.path.display().to_string().cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let Some(summary) = &result.summary else {
        println!(
            "{}: {}",
            "Error".red().bold(),
            result.error.as_deref().unwrap_or("unknown")
        );
        println!();
        return;
    };
    let DocumentSummary {
        page_count,
        is_tagged,
        chunk_count,
        annotation_count,
        link_annotation_count,
        link_text_annotation_count,
        annotations_outside_crop_box,
        structure_element_count,
        classified_element_count,
        mismatched_element_count,
        lowest_contrast_ratio,
        signature_count,
        ..
    } = summary;

    println!("{}: {}", "Pages".bold(), page_count);
    println!(
        "{}: {}",
        "Tagged".bold(),
        if *is_tagged { "Yes" } else { "No" }
    );
    println!("{}: {}", "Content chunks".bold(), chunk_count);
    println!(
        "{}: {} ({} links, {} with URI text, {} outside crop box)",
        "Annotations".bold(),
        annotation_count,
        link_annotation_count,
        link_text_annotation_count,
        annotations_outside_crop_box
    );
    println!(
        "{}: {} ({} classified, {} mismatched)",
        "Structure elements".bold(),
        structure_element_count,
        classified_element_count,
        mismatched_element_count
    );
    if let Some(ratio) = lowest_contrast_ratio {
        let text = format!("{:.2}:1", ratio);
        let text = if *ratio < 4.5 { text.red() } else { text.green() };
        println!("{}: {}", "Lowest contrast".bold(), text);
    }
    println!("{}: {}", "Signatures".bold(), signature_count);
    println!();
}

fn cmd_version() {
    println!("{} {}", "sapdf".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF semantic validation model inspector");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/sapdf".dimmed());
    println!("License: MIT");
}
