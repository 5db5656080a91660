//! Print the object tree of a PDF
//!
//! Opens a document, prints one of its views as an indented outline (or as
//! JSON), optionally selects an object in every view that reaches it and
//! optionally saves a full rewrite.
//!
//! Usage:
//!   cargo run --release --bin pdf_tree -- file.pdf
//!   cargo run --release --bin pdf_tree -- file.pdf --view pages --depth 4
//!   cargo run --release --bin pdf_tree -- file.pdf --select 6 --save copy.pdf
//!   cargo run --release --bin pdf_tree -- file.pdf --json --strict

use pdf_rups::config::InspectorConfig;
use pdf_rups::inspector::Inspector;
use pdf_rups::object::ObjectRef;
use pdf_rups::parser_config::ParserOptions;
use pdf_rups::tree::{NodeId, ViewRoot};
use std::path::PathBuf;
use std::process::ExitCode;

struct CliConfig {
    input: Option<PathBuf>,
    view: ViewRoot,
    depth: usize,
    select: Option<ObjectRef>,
    save: Option<PathBuf>,
    json: bool,
    strict: bool,
    compact: bool,
}

impl CliConfig {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut config = Self {
            input: None,
            view: ViewRoot::Document,
            depth: 3,
            select: None,
            save: None,
            json: false,
            strict: false,
            compact: false,
        };

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--view" => {
                    i += 1;
                    config.view = match args.get(i).map(String::as_str) {
                        Some("document") => ViewRoot::Document,
                        Some("pages") => ViewRoot::Pages,
                        Some("outlines") => ViewRoot::Outlines,
                        Some("form") => ViewRoot::Form,
                        other => return Err(format!("unknown view {:?}", other)),
                    };
                },
                "--depth" => {
                    i += 1;
                    config.depth = args
                        .get(i)
                        .and_then(|d| d.parse().ok())
                        .ok_or("--depth needs a number")?;
                },
                "--select" => {
                    i += 1;
                    config.select = Some(parse_ref(args.get(i).map(String::as_str))?);
                },
                "--save" => {
                    i += 1;
                    config.save = Some(PathBuf::from(args.get(i).ok_or("--save needs a path")?));
                },
                "--json" => config.json = true,
                "--strict" => config.strict = true,
                "--compact" => config.compact = true,
                arg if arg.starts_with("--") => return Err(format!("unknown option {}", arg)),
                arg => config.input = Some(PathBuf::from(arg)),
            }
            i += 1;
        }

        Ok(config)
    }
}

/// Parse `N` or `N.G` into an object reference.
fn parse_ref(arg: Option<&str>) -> Result<ObjectRef, String> {
    let arg = arg.ok_or("--select needs an object number")?;
    let (id, gen) = arg.split_once('.').unwrap_or((arg, "0"));
    match (id.parse(), gen.parse()) {
        (Ok(id), Ok(gen)) => Ok(ObjectRef::new(id, gen)),
        _ => Err(format!("invalid object reference {}", arg)),
    }
}

fn run(cli: CliConfig) -> pdf_rups::Result<()> {
    let Some(input) = cli.input else {
        eprintln!("Usage: pdf_tree <file.pdf> [--view document|pages|outlines|form] [--depth N]");
        eprintln!("                [--select N[.G]] [--save out.pdf] [--json] [--strict] [--compact]");
        return Ok(());
    };

    let parser = if cli.strict {
        ParserOptions::strict()
    } else {
        ParserOptions::lenient()
    };
    let config = InspectorConfig::new()
        .with_parser_options(parser)
        .with_compact_output(cli.compact);
    let mut inspector = Inspector::new(config);
    inspector.open(&input)?;

    if cli.json {
        let snapshot = inspector.snapshot(cli.view, cli.depth)?;
        println!("{}", snapshot.to_json(cli.compact)?);
    } else {
        print!("{}", inspector.outline(cli.view, cli.depth)?);
    }

    if let Some(obj_ref) = cli.select {
        let target = {
            let projection = inspector
                .projection()
                .ok_or_else(|| pdf_rups::Error::Unreachable("no document is open".to_string()))?;
            projection.store().lookup(obj_ref)
        };
        // Objects not yet expanded are found by searching the document view
        let target = match target {
            Some(node) => node,
            None => locate(&mut inspector, obj_ref)?,
        };
        let views = inspector.forward_selection(target)?;
        println!();
        for root in views {
            if let Some(path) = inspector.view(root).selection() {
                println!("{:?}: {} nodes from root to {}", root, path.len(), obj_ref);
            }
        }
    }

    if let Some(target) = cli.save {
        inspector.save(&target)?;
        println!("Saved to {}", target.display());
    }

    Ok(())
}

/// Expand the document view until `obj_ref` has a node.
fn locate(inspector: &mut Inspector, obj_ref: ObjectRef) -> pdf_rups::Result<NodeId> {
    let missing = || pdf_rups::Error::Unreachable(format!("{} is not reachable from the trailer", obj_ref));
    let root = inspector.projection().ok_or_else(missing)?.root();
    let mut queue = vec![root];
    while let Some(node) = queue.pop() {
        let edges = inspector.expand(node)?;
        if let Some(found) = inspector.projection().and_then(|p| p.store().lookup(obj_ref)) {
            return Ok(found);
        }
        for edge in edges.iter().rev() {
            let child = inspector.projection().and_then(|p| p.node(edge.node));
            if child.is_some_and(|n| !n.is_expanded()) {
                queue.push(edge.node);
            }
        }
    }
    Err(missing())
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = match CliConfig::from_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        },
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}
