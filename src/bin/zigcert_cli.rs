//! ZiG Certificate CLI - Bridge interface for the desktop shell
//!
//! Commands: categories, validate, preview, export
//! Outputs JSON to stdout
//! Returns non-zero on validation failure

use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use zigcert_core::{
    export::ExportFormat,
    pipeline::{CertificatePipeline, FormState, PipelineError},
    template::Template,
    validation::RawInput,
};

#[derive(Parser)]
#[command(name = "zigcert-cli")]
#[command(about = "ZiG Certificate CLI - Membership Certificate Engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a template definition (JSON); omit for the built-in template
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Path to the fonts directory
    #[arg(short, long, default_value = "fonts")]
    fonts_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// List the valid membership categories
    Categories,

    /// Validate form fields
    Validate {
        #[arg(long)]
        name: String,

        #[arg(long)]
        category: String,

        #[arg(long)]
        id: String,
    },

    /// Render a preview and print it as a PNG data URL
    Preview {
        #[arg(long)]
        name: String,

        #[arg(long)]
        category: String,

        #[arg(long)]
        id: String,

        /// Write the preview PNG here instead of printing a data URL
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Export the certificate as PNG or PDF
    Export {
        #[arg(long)]
        name: String,

        #[arg(long)]
        category: String,

        #[arg(long)]
        id: String,

        /// Output format: png or pdf
        #[arg(long, default_value = "png")]
        format: String,

        /// Directory the artifact file is written into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let template = match &cli.template {
        Some(path) => match Template::load_from_file(path) {
            Ok(t) => t,
            Err(e) => {
                eprintln!(r#"{{"error": "Failed to load template: {}"}}"#, e);
                return ExitCode::FAILURE;
            }
        },
        None => Template::builtin(),
    };

    match cli.command {
        Commands::Categories => {
            let categories: Vec<_> = template.category_set().iter().map(String::from).collect();
            println!("{}", serde_json::to_string_pretty(&categories).unwrap());
            ExitCode::SUCCESS
        }

        Commands::Validate { name, category, id } => {
            // Validation needs no fonts or background; construct directly.
            let raw = RawInput::new(&name, &category, &id);
            let outcome = zigcert_core::validation::validate(&raw, &template.category_set());

            let output = serde_json::json!({
                "outcome": outcome,
                "valid": outcome.is_valid(),
                "message": outcome.message(),
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap());
            if outcome.is_valid() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2) // Validation failure
            }
        }

        Commands::Preview {
            name,
            category,
            id,
            out,
        } => {
            let pipeline = match open_pipeline(template, &cli.fonts_dir) {
                Ok(p) => p,
                Err(code) => return code,
            };

            let mut form = FormState::with_input(RawInput::new(&name, &category, &id));
            match pipeline.preview(&mut form) {
                Ok(Some(data_url)) => {
                    if let Some(path) = out {
                        if let Err(e) = write_data_url_png(&data_url, &path) {
                            eprintln!(r#"{{"error": "Failed to write preview: {}"}}"#, e);
                            return ExitCode::FAILURE;
                        }
                        let output = serde_json::json!({
                            "success": true,
                            "path": path,
                        });
                        println!("{}", serde_json::to_string_pretty(&output).unwrap());
                    } else {
                        let output = serde_json::json!({
                            "success": true,
                            "dataUrl": data_url,
                        });
                        println!("{}", serde_json::to_string(&output).unwrap());
                    }
                    ExitCode::SUCCESS
                }
                Ok(None) => {
                    println!(r#"{{"success": false, "error": "Template background not ready"}}"#);
                    ExitCode::FAILURE
                }
                Err(e) => report_pipeline_error(e),
            }
        }

        Commands::Export {
            name,
            category,
            id,
            format,
            out_dir,
        } => {
            let format: ExportFormat = match format.parse() {
                Ok(f) => f,
                Err(e) => {
                    eprintln!(r#"{{"error": "{}"}}"#, e);
                    return ExitCode::FAILURE;
                }
            };

            let pipeline = match open_pipeline(template, &cli.fonts_dir) {
                Ok(p) => p,
                Err(code) => return code,
            };

            let mut form = FormState::with_input(RawInput::new(&name, &category, &id));
            match pipeline.export(&mut form, format) {
                Ok(artifact) => {
                    let bytes = match artifact.data() {
                        Ok(b) => b,
                        Err(e) => {
                            eprintln!(r#"{{"error": "{}"}}"#, e);
                            return ExitCode::FAILURE;
                        }
                    };
                    let path = out_dir.join(&artifact.filename);
                    if let Err(e) = fs::write(&path, bytes) {
                        eprintln!(r#"{{"error": "Failed to write artifact: {}"}}"#, e);
                        return ExitCode::FAILURE;
                    }

                    let output = serde_json::json!({
                        "success": true,
                        "artifact": {
                            "id": artifact.id,
                            "filename": artifact.filename,
                            "format": artifact.format,
                            "size": artifact.size,
                            "hash": artifact.hash,
                            "path": path,
                        },
                    });
                    println!("{}", serde_json::to_string_pretty(&output).unwrap());
                    ExitCode::SUCCESS
                }
                Err(e) => report_pipeline_error(e),
            }
        }
    }
}

fn open_pipeline(
    template: Template,
    fonts_dir: &std::path::Path,
) -> Result<CertificatePipeline<zigcert_core::layout::FontLibrary>, ExitCode> {
    let mut pipeline = match CertificatePipeline::open(template, fonts_dir) {
        Ok(p) => p,
        Err(e) => {
            eprintln!(r#"{{"error": "{}"}}"#, e);
            return Err(ExitCode::FAILURE);
        }
    };
    if let Err(e) = pipeline.load_background() {
        eprintln!(r#"{{"error": "{}"}}"#, e);
        return Err(ExitCode::FAILURE);
    }
    Ok(pipeline)
}

fn report_pipeline_error(error: PipelineError) -> ExitCode {
    let output = serde_json::json!({
        "success": false,
        "error": error.to_string(),
    });
    println!("{}", serde_json::to_string(&output).unwrap());
    match error {
        PipelineError::Validation(_) => ExitCode::from(2), // Validation failure
        _ => ExitCode::FAILURE,
    }
}

fn write_data_url_png(data_url: &str, path: &std::path::Path) -> Result<(), String> {
    use base64::Engine as _;
    let encoded = data_url
        .strip_prefix("data:image/png;base64,")
        .ok_or_else(|| "not a PNG data URL".to_string())?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| e.to_string())?;
    fs::write(path, bytes).map_err(|e| e.to_string())
}
