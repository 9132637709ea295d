//! Folio CLI: document analysis server and one-shot commands.
//!
//! Usage:
//!   folio serve [--config path] [--host addr] [--port n]
//!   folio analyze <file> --feature <id> [--config path]
//!   folio chat <file> [--config path]
//!   folio normalize <file> --feature <id>
//!   folio features

use clap::{Parser, Subcommand};
use folio::server::{self, AppState};
use folio::chat::{GREETING, SUGGESTED_QUESTIONS};
use folio::{
    AnalysisSession, Content, FeatureKind, FolioConfig, GeminiClient, ModelClient, Normalizer,
    Notice, CATALOG,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "folio",
    version,
    about = "Typed document analysis over a hosted language model"
)]
struct Cli {
    /// Path to YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP endpoint
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run one analysis over a plain-text document
    Analyze {
        /// Path to the document text
        #[arg(required = true)]
        file: PathBuf,
        /// Feature id (summary, mindmap, faq, timeline, knowledge-graph, key-insights)
        #[arg(long, short)]
        feature: FeatureKind,
    },
    /// Ask questions about a document, one per line on stdin
    Chat {
        /// Path to the document text
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Normalize a saved model reply without calling the model
    Normalize {
        /// Path to the raw reply
        #[arg(required = true)]
        file: PathBuf,
        #[arg(long, short)]
        feature: FeatureKind,
    },
    /// List the available features
    Features,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("FOLIO_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<FolioConfig, String> {
    FolioConfig::load(path).map_err(|e| format!("Failed to load config: {}", e))
}

fn read_text(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("cannot read '{}': {}", path.display(), e))
}

fn open_client(config: &FolioConfig) -> Result<Arc<dyn ModelClient>, String> {
    let client = GeminiClient::new(&config.model).map_err(|e| e.to_string())?;
    Ok(Arc::new(client))
}

fn print_content(content: &Content) {
    match content {
        Content::PlainText(text) => println!("{}", text),
        Content::FaqList(items) => {
            for item in items {
                println!("Q: {}\nA: {}\n", item.question, item.answer);
            }
        }
        Content::TimelineList(items) => {
            for item in items {
                println!("{:<8}  {}", item.year, item.event);
            }
        }
        Content::Graph(graph) => {
            for node in &graph.nodes {
                println!("[{}] {} ({})", node.id, node.label, node.node_type);
            }
            for edge in &graph.edges {
                println!("{} -[{}]-> {}", edge.from, edge.label, edge.to);
            }
            if !graph.summary.is_empty() {
                println!("\n{}", graph.summary);
            }
        }
    }
}

fn cmd_serve(config: FolioConfig, host: Option<String>, port: Option<u16>) -> i32 {
    let mut config = config;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let client = match open_client(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let state = Arc::new(AppState::new(
        client,
        Normalizer::with_config(config.normalizer.clone()),
    ));

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to create tokio runtime: {}", e);
            return 1;
        }
    };
    match rt.block_on(server::run(&config.server, state)) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("server error: {}", e);
            1
        }
    }
}

fn cmd_analyze(config: FolioConfig, file: &Path, feature: FeatureKind) -> i32 {
    let text = match read_text(file) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let client = match open_client(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let session =
        AnalysisSession::with_normalizer(client, Normalizer::with_config(config.normalizer));
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    session.load_document(name, text);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to create tokio runtime: {}", e);
            return 1;
        }
    };
    let outcome = rt.block_on(session.analyze(feature));
    let notice = Notice::for_analysis(feature, &outcome);
    match outcome {
        Ok(result) => {
            eprintln!("{}: {}", notice.title, notice.description);
            println!("{}\n", result.title);
            print_content(&result.content);
            0
        }
        Err(e) => {
            eprintln!("{}: {} ({})", notice.title, notice.description, e);
            1
        }
    }
}

fn cmd_chat(config: FolioConfig, file: &Path) -> i32 {
    let text = match read_text(file) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let client = match open_client(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let session =
        AnalysisSession::with_normalizer(client, Normalizer::with_config(config.normalizer));
    session.load_document(file.display().to_string(), text);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to create tokio runtime: {}", e);
            return 1;
        }
    };

    println!("{}", GREETING);
    for question in SUGGESTED_QUESTIONS {
        println!("  - {}", question);
    }
    for line in std::io::stdin().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match rt.block_on(session.ask(&line)) {
            Ok(answer) => println!("\n{}\n", answer),
            Err(e) => {
                let notice = e.notice();
                eprintln!("{}: {} ({})", notice.title, notice.description, e);
            }
        }
    }
    0
}

fn cmd_normalize(config: FolioConfig, file: &Path, feature: FeatureKind) -> i32 {
    let raw = match read_text(file) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let normalized = Normalizer::with_config(config.normalizer).normalize_with_path(feature, &raw);
    match serde_json::to_string_pretty(&normalized.content) {
        Ok(json) => {
            println!("{}", json);
            eprintln!("path: {:?}", normalized.path);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_features() -> i32 {
    println!("{:<16}  {:<16}  {}", "ID", "TITLE", "DESCRIPTION");
    println!("{}", "-".repeat(72));
    for info in CATALOG.iter() {
        println!("{:<16}  {:<16}  {}", info.kind.as_str(), info.title, info.description);
    }
    0
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let code = match cli.command {
        Commands::Features => cmd_features(),
        command => {
            let config = match load_config(cli.config.as_deref()) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            match command {
                Commands::Serve { host, port } => cmd_serve(config, host, port),
                Commands::Analyze { file, feature } => cmd_analyze(config, &file, feature),
                Commands::Chat { file } => cmd_chat(config, &file),
                Commands::Normalize { file, feature } => cmd_normalize(config, &file, feature),
                Commands::Features => cmd_features(),
            }
        }
    };
    std::process::exit(code);
}
