//! Site icon admin CLI
//!
//! Thin wrapper around the admin requests for command-line usage.
//!
//! ```bash
//! # Step 2: upload an image and get the crop page data
//! site-icon upload ./logo.jpg
//!
//! # Step 2: use an image already in the catalog
//! site-icon choose 12
//!
//! # Step 3: crop (preview coordinates) and publish
//! site-icon crop 64 0 384 384
//!
//! # Drop the pending upload, or delete the published icon
//! site-icon cancel
//! site-icon remove
//!
//! # Public side
//! site-icon url 32
//! site-icon head
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use site_icon::admin::{dispatch, AdminRequest, AdminResponse, CropSource, UploadedFile};
use site_icon::{IconConfig, Library, RasterEditor, SiteContext, SiteIconManager};

/// Upload, crop and publish a site icon
#[derive(Parser)]
#[command(name = "site-icon")]
#[command(version)]
#[command(about = "Upload, crop and publish a square site icon")]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (default: $SITE_ICON_CONFIG, then built-in defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Site to operate on
    #[arg(long, default_value_t = 1, global = true)]
    site: i64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a new image and prepare it for cropping
    Upload {
        path: PathBuf,
        /// Name to store the file under (default: the file's own name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Prepare an image already in the catalog for cropping
    Choose { asset_id: i64 },
    /// Crop the pending image and publish it
    Crop { x: u32, y: u32, w: u32, h: u32 },
    /// Discard the pending image
    Cancel,
    /// Delete the published icon
    Remove,
    /// Print the icon URL for a size
    Url {
        #[arg(default_value_t = 512)]
        size: u32,
    },
    /// Print the document head tags
    Head,
    /// Show the workflow step
    Status,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> site_icon::Result<IconConfig> {
    match path {
        Some(path) => IconConfig::load(path),
        None => IconConfig::from_env(),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> site_icon::Result<()> {
    let config = load_config(cli.config.as_ref())?;
    let library = Library::open(&config)?;
    let editor = RasterEditor::new();
    let manager = SiteIconManager::new(&library, &library, &editor, config);
    let ctx = SiteContext::new(cli.site);

    let request = match cli.command {
        Commands::Upload { path, name } => {
            let name = name.unwrap_or_else(|| {
                path.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "upload".to_string())
            });
            AdminRequest::Crop(CropSource::Upload(UploadedFile { path, name }))
        }
        Commands::Choose { asset_id } => AdminRequest::Crop(CropSource::Existing(asset_id)),
        Commands::Crop { x, y, w, h } => {
            let query: Vec<(String, String)> = [
                ("step", "3".to_string()),
                ("crop-x", x.to_string()),
                ("crop-y", y.to_string()),
                ("crop-w", w.to_string()),
                ("crop-h", h.to_string()),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
            AdminRequest::from_query(&query, None)?
        }
        Commands::Cancel => AdminRequest::Cancel,
        Commands::Remove => AdminRequest::Remove,
        Commands::Url { size } => {
            match manager.site_icon_url(&ctx, size)? {
                Some(url) => println!("{}", url),
                None => println!("(no site icon)"),
            }
            return Ok(());
        }
        Commands::Head => {
            for tag in manager.head_tags(&ctx)? {
                println!("{}", tag);
            }
            return Ok(());
        }
        Commands::Status => {
            println!("{:?}", manager.status(&ctx)?);
            if let Some(path) = library.path() {
                println!("Catalog: {}", path.display());
            }
            return Ok(());
        }
    };

    match dispatch(&manager, &ctx, request)? {
        AdminResponse::SelectFile { message, .. } => {
            if let Some(message) = message {
                println!("⚠️  {}", message);
            }
            println!("Back to step 1: choose another image.");
        }
        AdminResponse::CropPage(page) => {
            println!(
                "Source:  #{} {}x{} ({})",
                page.source.id, page.source.width, page.source.height, page.source.url
            );
            println!(
                "Preview: #{} {}x{} ({}), scale ratio {:.4}",
                page.preview.id, page.preview.width, page.preview.height, page.preview.url, page.preview.scale_ratio
            );
            println!(
                "Suggested crop: x={} y={} size={} (min {:.1})",
                page.crop_box.init_x, page.crop_box.init_y, page.crop_box.init_size, page.crop_box.min_size
            );
            println!(
                "Next: site-icon crop {} {} {} {}",
                page.crop_box.init_x, page.crop_box.init_y, page.crop_box.init_size, page.crop_box.init_size
            );
        }
        AdminResponse::Published(icon) => {
            println!("✅ Site icon updated: {}", icon.master.url);
            for variant in &icon.variants {
                println!("   {}px: {}", variant.size, variant.url);
            }
        }
        AdminResponse::Cancelled { pending } => {
            if pending {
                println!("Upload discarded.");
            } else {
                println!("Nothing to cancel.");
            }
        }
        AdminResponse::Removed { existed } => {
            if existed {
                println!("Site Icon removed.");
            } else {
                println!("No site icon was set.");
            }
        }
    }

    Ok(())
}
