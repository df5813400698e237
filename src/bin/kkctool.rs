use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::process;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use kkc_bridge::composing::ComposingText;
use kkc_bridge::converter::Converter;
use kkc_bridge::engine::{Candidate, ConversionRequest};

#[derive(Parser)]
#[command(name = "kkctool", about = "kkc-bridge conversion diagnostics")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct Resources {
    /// Dictionary TSV file or directory
    #[arg(long)]
    dict: String,
    /// Weight model TOML (optional)
    #[arg(long, default_value = "")]
    weight: String,
    /// Left-side context text
    #[arg(long, default_value = "")]
    context: String,
}

#[derive(Subcommand)]
enum Command {
    /// Convert romaji input and print ranked candidates
    Convert {
        #[command(flatten)]
        resources: Resources,
        /// Romaji (or kana) input
        input: String,
        /// Number of candidates to show
        #[arg(short, long, default_value = "10")]
        n: usize,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show how input is split into composing units
    Romaji {
        /// Romaji input
        input: String,
    },

    /// Convert inputs from a file and record top-N results to JSONL
    Snapshot {
        #[command(flatten)]
        resources: Resources,
        /// Path to the input file (one romaji input per line)
        input_file: String,
        /// Path to the output JSONL file
        output_file: String,
        /// Number of top results to record per input
        #[arg(short, long, default_value = "5")]
        n: usize,
    },

    /// Compare current output against a saved snapshot
    DiffSnapshot {
        #[command(flatten)]
        resources: Resources,
        /// Path to the input file (one romaji input per line)
        input_file: String,
        /// Path to the baseline JSONL snapshot file
        baseline_file: String,
        /// Number of top results to compare per input
        #[arg(short, long, default_value = "5")]
        n: usize,
    },
}

/// A single snapshot entry (one per input).
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    input: String,
    surfaces: Vec<String>,
}

fn composing(input: &str) -> ComposingText {
    let mut text = ComposingText::new();
    text.insert_at_cursor(input);
    text
}

fn convert(converter: &Converter, resources: &Resources, input: &str, n: usize) -> Vec<Candidate> {
    let request = ConversionRequest {
        context: &resources.context,
        dictionary_path: &resources.dict,
        weight_path: &resources.weight,
    };
    let mut result = converter
        .request_candidates(composing(input).snapshot(), &request)
        .unwrap_or_else(|e| {
            eprintln!("Conversion failed for {}: {}", input, e);
            process::exit(1);
        });
    result.main_results.truncate(n);
    result.main_results
}

fn start_converter() -> Converter {
    Converter::new().unwrap_or_else(|e| {
        eprintln!("Failed to start converter: {}", e);
        process::exit(1);
    })
}

fn read_inputs(input_file: &str) -> Vec<String> {
    let file = fs::File::open(input_file).unwrap_or_else(|e| {
        eprintln!("Failed to open input file {}: {}", input_file, e);
        process::exit(1);
    });
    BufReader::new(file)
        .lines()
        .map(|l| {
            l.unwrap_or_else(|e| {
                eprintln!("Failed to read line: {}", e);
                process::exit(1);
            })
        })
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect()
}

fn run_snapshot(
    converter: &Converter,
    resources: &Resources,
    input: &str,
    n: usize,
) -> SnapshotEntry {
    let surfaces = convert(converter, resources, input, n)
        .into_iter()
        .map(|c| c.text)
        .collect();
    SnapshotEntry {
        input: input.to_string(),
        surfaces,
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Convert {
            resources,
            input,
            n,
            json,
        } => {
            let converter = start_converter();
            let candidates = convert(&converter, &resources, &input, n);
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&candidates).expect("JSON serialization failed")
                );
            } else {
                let units = composing(&input).len();
                println!("{} ({} units)", composing(&input).convert_target(), units);
                for (i, c) in candidates.iter().enumerate() {
                    println!(
                        "  {:>2}. {}  [{}/{} units, cost {}]",
                        i + 1,
                        c.text,
                        c.corresponding_count,
                        units,
                        c.cost
                    );
                }
            }
        }

        Command::Romaji { input } => {
            let text = composing(&input);
            for unit in text.units() {
                let marker = if unit.pending { " (pending)" } else { "" };
                println!("{:<6} <- {}{}", unit.text, unit.raw, marker);
            }
        }

        Command::Snapshot {
            resources,
            input_file,
            output_file,
            n,
        } => {
            let converter = start_converter();
            let inputs = read_inputs(&input_file);

            let file = fs::File::create(&output_file).unwrap_or_else(|e| {
                eprintln!("Failed to create output file {}: {}", output_file, e);
                process::exit(1);
            });
            let mut writer = BufWriter::new(file);

            for input in &inputs {
                let entry = run_snapshot(&converter, &resources, input, n);
                let line = serde_json::to_string(&entry).expect("JSON serialization failed");
                writeln!(writer, "{}", line).unwrap_or_else(|e| {
                    eprintln!("Failed to write: {}", e);
                    process::exit(1);
                });
            }

            eprintln!("Snapshot written: {} inputs -> {}", inputs.len(), output_file);
        }

        Command::DiffSnapshot {
            resources,
            input_file,
            baseline_file,
            n,
        } => {
            let converter = start_converter();
            let inputs = read_inputs(&input_file);

            let baseline_content = fs::read_to_string(&baseline_file).unwrap_or_else(|e| {
                eprintln!("Failed to read baseline file {}: {}", baseline_file, e);
                process::exit(1);
            });
            let mut baseline: HashMap<String, SnapshotEntry> = HashMap::new();
            for line in baseline_content.lines() {
                if line.trim().is_empty() {
                    continue;
                }
                let entry: SnapshotEntry = serde_json::from_str(line).unwrap_or_else(|e| {
                    eprintln!("Failed to parse baseline JSONL: {}", e);
                    process::exit(1);
                });
                baseline.insert(entry.input.clone(), entry);
            }

            let first = |entry: &SnapshotEntry| {
                entry
                    .surfaces
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "(empty)".to_string())
            };

            let mut changed = 0usize;
            let mut new_count = 0usize;
            for input in &inputs {
                let current = run_snapshot(&converter, &resources, input, n);
                match baseline.get(input) {
                    Some(base) if base.surfaces != current.surfaces => {
                        changed += 1;
                        println!(
                            "  CHANGED: {} -> {} (was: {})",
                            input,
                            first(&current),
                            first(base)
                        );
                    }
                    Some(_) => {}
                    None => {
                        new_count += 1;
                        println!("  NEW:     {} -> {}", input, first(&current));
                    }
                }
            }

            println!();
            println!("=== Summary ===");
            println!("  Total:    {}", inputs.len());
            println!("  Changed:  {changed}");
            println!("  New:      {new_count}");

            if changed > 0 {
                process::exit(1);
            }
        }
    }
}
