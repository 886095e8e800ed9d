//! Kumihan CLI - Parse, validate, and inspect Kumihan notation documents
//!
//! Usage:
//!   kumihan [OPTIONS] [COMMAND] <FILE>
//!
//! Commands:
//!   parse     Parse and display the AST (default)
//!   validate  Check document for recoverable problems
//!   stats     Show document statistics

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::process;

use kumihan_core::ast::{self, NodeContent};
use kumihan_core::{
    Diagnostic, DiagnosticSink, LogSink, MarkerTable, Node, ParseResult, Parser, ParserConfig,
    Severity,
};
use serde::Serialize;

fn main() {
    let args: Vec<String> = env::args().collect();

    match run(&args) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let config = parse_args(args)?;
    init_logging(config.verbose);

    let input = read_file(&config.file)?;
    let parser = build_parser(&config)?;

    let result = parser
        .parse_with_recovery(&input)
        .map_err(|e| format!("failed to parse '{}': {}", config.file, e))?;

    match config.command {
        Command::Parse => cmd_parse(&result, &config),
        Command::Validate => cmd_validate(&result, &input, &config),
        Command::Stats => cmd_stats(&result, &input, &config),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn read_file(path: &str) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("failed to read '{}': {}", path, e))
}

fn build_parser(config: &Config) -> Result<Parser, String> {
    let markers = match &config.markers {
        Some(path) => {
            let table = MarkerTable::from_toml_str(&read_file(path)?)
                .map_err(|e| format!("invalid marker file '{}': {}", path, e))?;
            log::info!("loaded {} markers from {}", table.len(), path);
            table
        }
        None => MarkerTable::default(),
    };

    let parser_config = match &config.config {
        Some(path) => ParserConfig::from_toml_str(&read_file(path)?)
            .map_err(|e| format!("invalid config file '{}': {}", path, e))?,
        None => ParserConfig::default(),
    };

    Ok(Parser::with_markers(markers).with_config(parser_config))
}

#[derive(Debug)]
struct Config {
    command: Command,
    file: String,
    format: OutputFormat,
    verbose: bool,
    markers: Option<String>,
    config: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Parse,
    Validate,
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_args(args: &[String]) -> Result<Config, String> {
    let mut command = Command::Parse;
    let mut format = OutputFormat::Text;
    let mut verbose = false;
    let mut markers = None;
    let mut config = None;
    let mut file = None;

    let mut i = 1;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                process::exit(0);
            }
            "-V" | "--version" => {
                println!("kumihan {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "-v" | "--verbose" => verbose = true,
            "-j" | "--json" => format = OutputFormat::Json,
            "-m" | "--markers" => {
                i += 1;
                let path = args
                    .get(i)
                    .ok_or_else(|| format!("{} requires a file argument", arg))?;
                markers = Some(path.clone());
            }
            "-c" | "--config" => {
                i += 1;
                let path = args
                    .get(i)
                    .ok_or_else(|| format!("{} requires a file argument", arg))?;
                config = Some(path.clone());
            }
            "parse" => command = Command::Parse,
            "validate" => command = Command::Validate,
            "stats" => command = Command::Stats,
            _ if arg.starts_with('-') => {
                return Err(format!("unknown option: {}", arg));
            }
            _ => {
                if file.is_some() {
                    return Err("multiple files specified".to_string());
                }
                file = Some(arg.clone());
            }
        }
        i += 1;
    }

    let file = file.ok_or_else(|| "no input file specified".to_string())?;

    Ok(Config {
        command,
        file,
        format,
        verbose,
        markers,
        config,
    })
}

fn print_help() {
    eprintln!(
        r#"kumihan - Kumihan notation parser and validator

USAGE:
    kumihan [OPTIONS] [COMMAND] <FILE>

COMMANDS:
    parse       Parse and display the AST (default)
    validate    Check document for problems; exits non-zero on warnings
    stats       Show document statistics

OPTIONS:
    -v, --verbose         Show the full tree and debug logging
    -j, --json            Output in JSON format
    -m, --markers <FILE>  Load the marker table from a TOML file
    -c, --config <FILE>   Load parser limits from a TOML file
    -h, --help            Print help information
    -V, --version         Print version information

EXAMPLES:
    kumihan document.txt              Parse a document
    kumihan -v document.txt           Parse with the full tree
    kumihan -j document.txt           Output AST as JSON
    kumihan validate document.txt     Validate without output
    kumihan -m markers.toml doc.txt   Parse with custom markers
"#
    );
}

// =============================================================================
// Parse Command
// =============================================================================

fn cmd_parse(result: &ParseResult, config: &Config) -> Result<(), String> {
    let mut sink = LogSink;
    for diagnostic in result.diagnostics.iter() {
        sink.report(diagnostic);
    }

    match config.format {
        OutputFormat::Json => print_json(&result.ast)?,
        OutputFormat::Text => {
            if config.verbose {
                print_tree(&result.ast);
            } else {
                print_summary(&result.ast);
            }
        }
    }

    Ok(())
}

// =============================================================================
// Validate Command
// =============================================================================

fn cmd_validate(result: &ParseResult, input: &str, config: &Config) -> Result<(), String> {
    let warnings = result
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();

    if config.format == OutputFormat::Json {
        let diagnostics: Vec<_> = result.diagnostics.iter().map(diagnostic_json).collect();
        println!(
            "{}",
            serde_json::json!({"valid": warnings == 0, "diagnostics": diagnostics})
        );
    } else if result.is_clean() {
        println!("Valid: no problems found");
    } else {
        let label = if warnings == 0 { "Valid" } else { "Invalid" };
        eprintln!(
            "{}: {} diagnostic(s), {} warning(s)",
            label,
            result.diagnostics.len(),
            warnings
        );
        for diagnostic in result.diagnostics.iter() {
            eprintln!("  - {}", diagnostic);
            eprintln!("    | {}", excerpt(input, diagnostic));
        }
    }

    if warnings == 0 {
        Ok(())
    } else {
        Err(format!("{} warning(s) found", warnings))
    }
}

/// First source line covered by a diagnostic's span.
fn excerpt<'a>(input: &'a str, diagnostic: &Diagnostic) -> &'a str {
    input
        .get(diagnostic.span.range())
        .and_then(|text| text.lines().next())
        .unwrap_or("")
}

fn diagnostic_json(diagnostic: &Diagnostic) -> serde_json::Value {
    serde_json::json!({
        "kind": diagnostic.kind.as_str(),
        "severity": diagnostic.severity.to_string(),
        "message": diagnostic.message,
        "line": diagnostic.line,
        "span": {"start": diagnostic.span.start, "end": diagnostic.span.end},
    })
}

// =============================================================================
// Stats Command
// =============================================================================

fn cmd_stats(result: &ParseResult, input: &str, config: &Config) -> Result<(), String> {
    let stats = DocumentStats::from_ast(&result.ast, input);
    let headings = ast::headings(&result.ast);

    if config.format == OutputFormat::Json {
        let outline: Vec<_> = headings
            .iter()
            .map(|h| serde_json::json!({"level": h.level, "id": h.id, "text": h.text}))
            .collect();
        println!(
            "{}",
            serde_json::json!({
                "top_level_nodes": result.ast.len(),
                "total_nodes": stats.total_nodes,
                "node_types": stats.by_type,
                "footnotes": stats.footnotes,
                "chars": stats.chars,
                "lines": stats.lines,
                "diagnostics": result.diagnostics.len(),
                "headings": outline,
            })
        );
        return Ok(());
    }

    println!("Document Statistics");
    println!("-------------------");
    println!("Top-level nodes: {}", result.ast.len());
    println!("Total nodes:     {}", stats.total_nodes);
    println!("Footnotes:       {}", stats.footnotes);
    println!();
    println!("Node types:");
    for (node_type, count) in &stats.by_type {
        println!("  {:<16}{}", node_type, count);
    }
    if !headings.is_empty() {
        println!();
        println!("Outline:");
        for heading in &headings {
            let indent = "  ".repeat(heading.level as usize);
            println!("{}{}", indent, heading.text);
        }
    }
    println!();
    println!("Size:");
    println!("  Characters:     {}", stats.chars);
    println!("  Lines:          {}", stats.lines);
    println!();
    println!("Diagnostics:    {}", result.diagnostics.len());

    Ok(())
}

struct DocumentStats<'a> {
    total_nodes: usize,
    footnotes: usize,
    by_type: BTreeMap<&'a str, usize>,
    chars: usize,
    lines: usize,
}

impl<'a> DocumentStats<'a> {
    fn from_ast(nodes: &'a [Node], input: &str) -> Self {
        let mut stats = Self {
            total_nodes: 0,
            footnotes: 0,
            by_type: BTreeMap::new(),
            chars: input.chars().count(),
            lines: input.lines().count(),
        };

        for node in nodes {
            stats.count(node);
            for inner in node.descendants() {
                stats.count(inner);
            }
        }
        stats
    }

    fn count(&mut self, node: &'a Node) {
        self.total_nodes += 1;
        if node.node_type() == "footnote" {
            self.footnotes += 1;
        }
        *self.by_type.entry(node.node_type()).or_insert(0) += 1;
    }
}

// =============================================================================
// JSON Output
// =============================================================================

#[derive(Serialize)]
struct JsonNode<'a> {
    #[serde(rename = "type")]
    node_type: &'a str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<&'a str, &'a str>,
    content: JsonContent<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum JsonContent<'a> {
    Text(&'a str),
    Children(Vec<JsonNode<'a>>),
}

fn print_json(nodes: &[Node]) -> Result<(), String> {
    let json: Vec<_> = nodes.iter().map(convert_node).collect();
    let text = serde_json::to_string_pretty(&json).map_err(|e| e.to_string())?;
    println!("{}", text);
    Ok(())
}

fn convert_node(node: &Node) -> JsonNode<'_> {
    JsonNode {
        node_type: node.node_type(),
        attributes: node
            .attributes()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect(),
        content: match node.content() {
            NodeContent::Text(text) => JsonContent::Text(text),
            NodeContent::Children(children) => {
                JsonContent::Children(children.iter().map(convert_node).collect())
            }
        },
    }
}

// =============================================================================
// Text Output
// =============================================================================

fn print_summary(nodes: &[Node]) {
    println!("Nodes: {}", nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        println!("  [{}] {}", i + 1, describe_node(node));
    }
}

fn print_tree(nodes: &[Node]) {
    println!("=== Kumihan AST ===");
    for (i, node) in nodes.iter().enumerate() {
        println!();
        println!("[{}] {}", i + 1, describe_node(node));
        print_node_verbose(node, 1);
    }
}

fn describe_node(node: &Node) -> String {
    let mut out = node.node_type().to_string();
    if !node.attributes().is_empty() {
        let attrs: Vec<String> = node
            .attributes()
            .iter()
            .map(|(k, v)| format!("{}={:?}", k, v))
            .collect();
        out.push_str(&format!(" ({})", attrs.join(", ")));
    }
    match node.content() {
        NodeContent::Text(text) => out.push_str(&format!(": {}", preview(text))),
        NodeContent::Children(children) if !children.is_empty() => {
            out.push_str(&format!(" [{} children]", children.len()))
        }
        NodeContent::Children(_) => {}
    }
    out
}

fn print_node_verbose(node: &Node, indent: usize) {
    let prefix = "  ".repeat(indent);
    for child in node.children() {
        println!("{}{}", prefix, describe_node(child));
        print_node_verbose(child, indent + 1);
    }
}

fn preview(text: &str) -> String {
    let short: String = text.chars().take(60).collect();
    let ellipsis = if text.chars().count() > 60 { "..." } else { "" };
    format!("{}{}", short.replace('\n', "\\n"), ellipsis)
}
