//! quizstyle - force styling onto quiz action buttons in an HTML file

use std::process::ExitCode;

use clap::Parser;

use quizstyle::enforce::{MARKER_SELECTOR, is_action_button};
use quizstyle::hook::style_record;
use quizstyle::{StyleEnforcer, parse_html};

#[derive(Parser)]
#[command(name = "quizstyle")]
#[command(version, about = "Force styling onto quiz action buttons", long_about = None)]
#[command(after_help = "EXAMPLES:
    quizstyle page.html styled.html    Enforce button styles and write the result
    quizstyle -i page.html             List eligible action buttons
    quizstyle --style-json             Print the declared style as JSON")]
struct Cli {
    /// Input HTML file
    #[arg(value_name = "INPUT", required_unless_present = "style_json")]
    input: Option<String>,

    /// Output HTML file
    #[arg(value_name = "OUTPUT")]
    output: Option<String>,

    /// List eligible action buttons without writing output
    #[arg(short, long)]
    inspect: bool,

    /// Print the declared style record as JSON
    #[arg(long)]
    style_json: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = if cli.style_json {
        print_style_json()
    } else {
        let input = cli.input.expect("input required");
        if cli.inspect {
            inspect(&input)
        } else {
            match cli.output {
                Some(output) => enforce(&input, &output, cli.quiet),
                None => Err("output file required (or pass --inspect)".to_string()),
            }
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn print_style_json() -> Result<(), String> {
    let json = serde_json::to_string_pretty(style_record()).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn inspect(path: &str) -> Result<(), String> {
    let html = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let doc = parse_html(&html);

    let candidates = doc
        .query_selector_all(MARKER_SELECTOR)
        .map_err(|e| e.to_string())?;

    println!("File: {path}");
    for id in &candidates {
        let tag = doc.tag_name(*id).unwrap_or("?");
        let eligible = if is_action_button(&doc, *id) {
            "eligible"
        } else {
            "skipped (wrong element kind)"
        };
        match doc.attribute(*id, "type") {
            Some(t) => println!("  <{tag} type=\"{t}\">: {eligible}"),
            None => println!("  <{tag}>: {eligible}"),
        }
    }
    println!("Candidates: {}", candidates.len());

    Ok(())
}

fn enforce(input: &str, output: &str, quiet: bool) -> Result<(), String> {
    let html = std::fs::read_to_string(input).map_err(|e| e.to_string())?;
    let mut doc = parse_html(&html);

    let enforcer = StyleEnforcer::new().map_err(|e| e.to_string())?;
    enforcer.apply_pass(&mut doc);

    std::fs::write(output, doc.to_html()).map_err(|e| e.to_string())?;

    if !quiet {
        println!("{input} -> {output}");
    }
    Ok(())
}
