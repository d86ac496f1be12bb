// todo-pdf: Generate linked todo-list planners with dot-grid detail pages

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use todo_pdf::error::AppError;
use todo_pdf::web::{self, ServerSettings};
use todo_pdf::{presets, render, share, store, Configuration, GeneratedPdf};

// ============================================================================
// Data Structures
// ============================================================================

/// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Generate linked todo-list planners with dot-grid detail pages")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the full planner PDF
    Generate {
        #[command(flatten)]
        source: Source,

        /// Output filename (defaults to the configuration's output_filename)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a one-page preview of the first todo page
    Preview {
        #[command(flatten)]
        source: Source,

        /// Output filename
        #[arg(short, long, default_value = "preview.pdf")]
        output: PathBuf,
    },

    /// Serve the browser UI
    Serve {
        /// Address to bind
        #[arg(long, env = "TODO_PDF_BIND", default_value = "127.0.0.1")]
        bind: String,

        /// Port to listen on
        #[arg(short, long, env = "TODO_PDF_PORT", default_value = "8501")]
        port: u16,

        /// Directory of saved configurations
        #[arg(long, env = "TODO_PDF_CONFIG_DIR", default_value = "saved_configs")]
        config_dir: PathBuf,

        /// Directory generated PDFs are written to
        #[arg(long, env = "TODO_PDF_OUTPUT_DIR", default_value = "output")]
        output_dir: PathBuf,

        /// Directory of the public gallery
        #[arg(long, env = "TODO_PDF_GALLERY_DIR", default_value = "public_gallery")]
        gallery_dir: PathBuf,
    },

    /// Manage saved configurations
    Configs {
        /// Directory of saved configurations
        #[arg(long, env = "TODO_PDF_CONFIG_DIR", default_value = "saved_configs", global = true)]
        config_dir: PathBuf,

        #[command(subcommand)]
        action: ConfigAction,
    },

    /// List built-in presets and themes
    Presets,

    /// Export or import share codes
    Share {
        #[command(subcommand)]
        action: ShareAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// List saved configuration names
    List,
    /// Print a saved configuration as JSON
    Show { name: String },
    /// Save a configuration under a name
    Save {
        name: String,
        #[command(flatten)]
        source: Source,
    },
    /// Delete a saved configuration
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
enum ShareAction {
    /// Print the share code and link for a configuration
    Export {
        #[command(flatten)]
        source: Source,

        /// Base URL of the web UI
        #[arg(long, default_value = "http://127.0.0.1:8501/")]
        base_url: String,
    },
    /// Decode a share code into a configuration file
    Import {
        code: String,

        /// Write the configuration here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Where the configuration comes from. Defaults apply when none is given.
#[derive(Args, Debug, Default)]
struct Source {
    /// Configuration JSON file
    #[arg(short, long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Built-in preset or theme name
    #[arg(long)]
    preset: Option<String>,
}

impl Source {
    fn load(&self) -> Result<Configuration, AppError> {
        match (&self.config, &self.preset) {
            (Some(path), _) => store::load_file(path),
            (None, Some(name)) => presets::find(name)?.configuration(),
            (None, None) => Ok(Configuration::default()),
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate { source, output } => {
            let config = source.load()?;
            let output_file = output.unwrap_or_else(|| PathBuf::from(&config.output_filename));
            let pdf = render::generate_pdf(&config)?;
            pdf.write_to(&output_file)?;

            println!("✓ Generated: {}", output_file.display());
            println!("  Pages: {}", pdf.pages);
            println!("  Todo items: {}", config_summary(&config));
            print_warnings(&pdf);
        }
        Command::Preview { source, output } => {
            let config = source.load()?;
            let pdf = render::generate_preview(&config)?;
            pdf.write_to(&output)?;

            println!("✓ Preview: {}", output.display());
            print_warnings(&pdf);
        }
        Command::Serve { bind, port, config_dir, output_dir, gallery_dir } => {
            web::serve(&ServerSettings { bind, port, config_dir, output_dir, gallery_dir })?;
        }
        Command::Configs { config_dir, action } => run_configs(store::ConfigStore::new(config_dir), action)?,
        Command::Presets => {
            println!("Presets:");
            for preset in presets::presets() {
                println!("  {:<16} {}", preset.name, preset.description);
            }
            println!("Themes:");
            for theme in presets::themes() {
                println!("  {:<16} {} [{}]", theme.name, theme.description, theme.tags.join(", "));
            }
        }
        Command::Share { action } => match action {
            ShareAction::Export { source, base_url } => {
                let config = source.load()?;
                println!("{}", share::export_code(&config)?);
                println!("{}", share::share_url(&base_url, &config)?);
            }
            ShareAction::Import { code, output } => {
                let config = share::import_code(&code)?;
                let json = config.to_json_pretty()?;
                match output {
                    Some(path) => {
                        std::fs::write(&path, json)?;
                        println!("✓ Imported: {}", path.display());
                    }
                    None => println!("{}", json),
                }
            }
        },
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

fn run_configs(store: store::ConfigStore, action: ConfigAction) -> Result<(), AppError> {
    match action {
        ConfigAction::List => {
            for name in store.list()? {
                println!("{}", name);
            }
        }
        ConfigAction::Show { name } => println!("{}", store.load(&name)?.to_json_pretty()?),
        ConfigAction::Save { name, source } => {
            let path = store.save(&name, &source.load()?)?;
            println!("✓ Saved: {}", path.display());
        }
        ConfigAction::Delete { name } => {
            store.delete(&name)?;
            println!("✓ Deleted: {}", name);
        }
    }
    Ok(())
}

/// Item count as requested; the rendered document may clamp it.
fn config_summary(config: &Configuration) -> String {
    format!(
        "{} ({} pages x {} columns x {} rows)",
        config.total_items(),
        config.pages_of_todos,
        config.columns,
        config.items_per_col
    )
}

fn print_warnings(pdf: &GeneratedPdf) {
    for warning in &pdf.warnings {
        println!("  ⚠ {}: {}", warning.field, warning.message);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generate_with_preset() {
        let cli = Cli::try_parse_from(["todo-pdf", "generate", "--preset", "Minimal", "-o", "out.pdf"]).unwrap();
        match cli.command {
            Command::Generate { source, output } => {
                assert_eq!(source.preset.as_deref(), Some("Minimal"));
                assert_eq!(output, Some(PathBuf::from("out.pdf")));
                assert_eq!(source.load().unwrap().columns, 1);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn config_and_preset_conflict() {
        let result = Cli::try_parse_from(["todo-pdf", "generate", "-c", "a.json", "--preset", "Minimal"]);
        assert!(result.is_err());
    }

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from(["todo-pdf", "serve", "--port", "9000"]).unwrap();
        match cli.command {
            Command::Serve { port, output_dir, .. } => {
                assert_eq!(port, 9000);
                assert_eq!(output_dir, PathBuf::from("output"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn configs_subcommands() {
        let cli = Cli::try_parse_from(["todo-pdf", "configs", "save", "weekly", "--preset", "A4 Standard", "--config-dir", "/tmp/x"]).unwrap();
        match cli.command {
            Command::Configs { config_dir, action: ConfigAction::Save { name, source } } => {
                assert_eq!(config_dir, PathBuf::from("/tmp/x"));
                assert_eq!(name, "weekly");
                assert_eq!(source.preset.as_deref(), Some("A4 Standard"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn no_source_means_defaults() {
        assert_eq!(Source::default().load().unwrap(), Configuration::default());
    }
}
