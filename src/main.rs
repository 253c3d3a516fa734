//! # Slipcast CLI
//!
//! Command-line interface for rendering and printing template slips.
//!
//! ## Usage
//!
//! ```bash
//! # Render a template file with a record and send it to a USB printer
//! slipcast render slip.json --record order.json --device /dev/usb/lp0
//!
//! # Override single values and save a preview instead of printing
//! slipcast render slip.json --set phone=0901234567 --png preview.png
//!
//! # Print the active template from the store over the network
//! slipcast render --active --record order.json --host 192.168.1.50
//!
//! # Print plain text (braces are not placeholders here)
//! echo "Hello" | slipcast text - --align center --host 192.168.1.50
//!
//! # Manage stored templates
//! slipcast template save slip.json
//! slipcast template use order-slip
//! slipcast template list
//! ```

use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use slipcast::{
    PrintJob, RenderConfig, SlipcastError, Template, TemplateStore,
    raster::FontSet,
    render_plain_text, render_template,
    substitute::Record,
    template::{Align, PaperWidth},
    transport,
};

/// Slipcast - template slips for ESC/POS thermal printers
#[derive(Parser, Debug)]
#[command(name = "slipcast")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a template with a data record
    Render {
        /// Template JSON file (omit when using --name or --active)
        template: Option<PathBuf>,

        /// Use a stored template by name
        #[arg(long, conflicts_with_all = ["template", "active"])]
        name: Option<String>,

        /// Use the active stored template
        #[arg(long, conflicts_with = "template")]
        active: bool,

        /// Record JSON file (object of key to value)
        #[arg(long, value_name = "FILE")]
        record: Option<PathBuf>,

        /// Set a record value (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        values: Vec<String>,

        #[command(flatten)]
        render: RenderArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Render plain text
    Text {
        /// Text to print, or "-" to read stdin
        text: String,

        /// Paper width in dots or as 58mm/80mm/104mm
        #[arg(long, value_parser = parse_width)]
        width: Option<u32>,

        /// Font size in pixels
        #[arg(long)]
        font_size: Option<f32>,

        /// left, center or right
        #[arg(long)]
        align: Option<Align>,

        /// Font family
        #[arg(long)]
        font_family: Option<String>,

        #[command(flatten)]
        render: RenderArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Check a template file and list every problem
    Validate {
        /// Template JSON file
        template: PathBuf,
    },

    /// Manage stored templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,

        /// Template store file
        #[arg(long, global = true, default_value = "slipcast-templates.json")]
        store: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum TemplateAction {
    /// Validate and save a template file
    Save { file: PathBuf },
    /// List stored templates
    List,
    /// Print a stored template as JSON
    Show { name: String },
    /// Delete a stored template
    Delete { name: String },
    /// Make a stored template the active one
    Use { name: String },
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Register a TrueType font (repeatable)
    #[arg(long = "font", value_name = "FAMILY=PATH")]
    fonts: Vec<String>,

    /// Render configuration JSON file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Template store file
    #[arg(long, default_value = "slipcast-templates.json")]
    store: PathBuf,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Write the printer command buffer to a file
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Save a PNG preview of the packed bitmap
    #[arg(long, value_name = "FILE")]
    png: Option<PathBuf>,

    /// Printer device path
    #[arg(long, conflicts_with = "host")]
    device: Option<PathBuf>,

    /// Network printer address (host or host:port, default port 9100)
    #[arg(long)]
    host: Option<String>,

    /// Network timeout in seconds
    #[arg(long, default_value = "5")]
    timeout: u64,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize logging based on verbosity.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
}

fn run(command: Commands) -> Result<(), SlipcastError> {
    match command {
        Commands::Render {
            template,
            name,
            active,
            record,
            values,
            render,
            output,
        } => {
            let template = match (template, name, active) {
                (Some(path), _, _) => load_template(&path)?,
                (None, Some(name), _) => {
                    let store = TemplateStore::open(&render.store)?;
                    store.get(&name).cloned().ok_or_else(|| {
                        SlipcastError::Store(format!("No template named '{}'", name))
                    })?
                }
                (None, None, true) => {
                    let store = TemplateStore::open(&render.store)?;
                    store.active().cloned().ok_or_else(|| {
                        SlipcastError::Store("No active template".to_string())
                    })?
                }
                (None, None, false) => {
                    return Err(SlipcastError::Config(
                        "Give a template file, --name or --active".to_string(),
                    ));
                }
            };

            let mut data = match record {
                Some(path) => load_record(&path)?,
                None => Record::new(),
            };
            for pair in &values {
                let (key, value) = pair.split_once('=').ok_or_else(|| {
                    SlipcastError::Config(format!("Expected KEY=VALUE, got '{}'", pair))
                })?;
                data.insert(key.to_string(), value.to_string());
            }

            let (config, fonts) = load_render(&render)?;
            let job = render_template(&template, &data, &fonts, &config)?;
            log::info!(
                "rendered '{}' ({} lines, {}x{} dots)",
                template.name,
                job.lines.len(),
                job.bitmap.width,
                job.bitmap.height
            );
            deliver(&job, &output)
        }

        Commands::Text {
            text,
            width,
            font_size,
            align,
            font_family,
            render,
            output,
        } => {
            let text = if text == "-" {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf.trim_end_matches('\n').to_string()
            } else {
                text
            };

            let mut settings = slipcast::Settings::default();
            if let Some(width) = width {
                settings.width = width;
            }
            if let Some(size) = font_size {
                settings.font_size = size;
            }
            if let Some(align) = align {
                settings.align = align;
            }
            if let Some(family) = font_family {
                settings.font_family = family;
            }

            let (config, fonts) = load_render(&render)?;
            let job = render_plain_text(&text, &settings, &fonts, &config)?;
            log::info!(
                "rendered text ({} lines, {}x{} dots)",
                job.lines.len(),
                job.bitmap.width,
                job.bitmap.height
            );
            deliver(&job, &output)
        }

        Commands::Validate { template } => {
            let template = load_template(&template)?;
            let problems = template.problems();
            if problems.is_empty() {
                println!(
                    "{}: ok ({} lines, placeholders: {})",
                    template.name,
                    template.line_count(),
                    template.placeholders().join(", ")
                );
                return Ok(());
            }
            for problem in &problems {
                println!("  {}", problem);
            }
            Err(SlipcastError::Template(problems[0].clone()))
        }

        Commands::Template { action, store } => {
            let mut store = TemplateStore::open(&store)?;
            match action {
                TemplateAction::Save { file } => {
                    let template = load_template(&file)?;
                    let name = template.name.clone();
                    store.save(template)?;
                    log::info!("saved template '{}' to {}", name, store.path().display());
                }
                TemplateAction::List => {
                    let active = store.active_name();
                    for name in store.list() {
                        let marker = if Some(name) == active { "*" } else { " " };
                        println!("{} {}", marker, name);
                    }
                }
                TemplateAction::Show { name } => {
                    let template = store.get(&name).ok_or_else(|| {
                        SlipcastError::Store(format!("No template named '{}'", name))
                    })?;
                    println!("{}", template.to_json()?);
                }
                TemplateAction::Delete { name } => {
                    store.delete(&name)?;
                    log::info!("deleted template '{}'", name);
                }
                TemplateAction::Use { name } => {
                    store.set_active(&name)?;
                    log::info!("active template is now '{}'", name);
                }
            }
            Ok(())
        }
    }
}

fn parse_width(s: &str) -> Result<u32, String> {
    PaperWidth::parse(s).map(PaperWidth::dots)
}

fn load_template(path: &Path) -> Result<Template, SlipcastError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        SlipcastError::Config(format!("Failed to read {}: {}", path.display(), e))
    })?;
    Template::from_json(&raw)
}

/// Read a record file. Non-string JSON values are printed as JSON.
fn load_record(path: &Path) -> Result<Record, SlipcastError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        SlipcastError::Config(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let values: BTreeMap<String, serde_json::Value> = serde_json::from_str(&raw)?;
    Ok(values
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            (key, text)
        })
        .collect())
}

fn load_render(args: &RenderArgs) -> Result<(RenderConfig, FontSet), SlipcastError> {
    let mut config = match &args.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };
    for font in &args.fonts {
        config.add_font_arg(font)?;
    }
    let fonts = config.font_set()?;
    Ok((config, fonts))
}

fn deliver(job: &PrintJob, output: &OutputArgs) -> Result<(), SlipcastError> {
    if let Some(path) = &output.png {
        std::fs::write(path, job.bitmap.to_png()?)?;
        log::info!("saved preview to {}", path.display());
    }

    if let Some(path) = &output.out {
        std::fs::write(path, &job.commands)?;
        log::info!("wrote {} bytes to {}", job.commands.len(), path.display());
    }

    if let Some(device) = &output.device {
        transport::write_device(device, &job.commands)?;
        log::info!("sent {} bytes to {}", job.commands.len(), device.display());
    } else if let Some(host) = &output.host {
        transport::send_tcp(host, &job.commands, Duration::from_secs(output.timeout))?;
        log::info!("sent {} bytes to {}", job.commands.len(), host);
    }

    Ok(())
}
