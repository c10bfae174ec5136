use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use trackplot::cache::CacheKey;
use trackplot::config::TrackPlotConfig;
use trackplot::geometry::RotationPolicy;
use trackplot::pipeline::{PipelineOptions, TrackImagePipeline};
use trackplot::provider::SessionProvider;
use trackplot::providers::ArchiveProvider;
use trackplot::server::{self, AppState};
use trackplot::{EventRef, FigureSize, RenderRequest, SessionKind};

#[derive(Parser, Debug)]
#[command(name = "trackplot", version, about = "Circuit plan-view images from recorded sessions")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve track images over HTTP.
    Serve(ServeArgs),
    /// Render one track image to a file.
    Render(RenderArgs),
    /// Print the cache key a request would use.
    Key(KeyArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address, overriding the configuration.
    #[arg(long)]
    bind: Option<SocketAddr>,
}

#[derive(Args, Debug)]
struct EventArgs {
    /// Season year.
    #[arg(long)]
    year: i32,

    /// Race name, e.g. "Monaco Grand Prix".
    #[arg(long)]
    event: String,

    /// Rotation override in degrees.
    #[arg(long, allow_hyphen_values = true)]
    angle: Option<f64>,

    /// Draw axes and a title.
    #[arg(long, default_value_t = false)]
    show_axes: bool,

    /// Figure width in inches.
    #[arg(long, requires = "height")]
    width: Option<f64>,

    /// Figure height in inches.
    #[arg(long, requires = "width")]
    height: Option<f64>,
}

impl EventArgs {
    fn request(&self) -> anyhow::Result<RenderRequest> {
        let event = EventRef::new(self.year, &self.event)?;
        let mut request = RenderRequest::new(event).with_axes(self.show_axes);
        if let Some(angle) = self.angle {
            request = request.with_rotation(angle);
        }
        if let (Some(w), Some(h)) = (self.width, self.height) {
            request = request.with_figure_size(FigureSize::new(w, h)?);
        }
        Ok(request)
    }
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    event: EventArgs,

    /// Session kind (FP1, FP2, FP3, Q, R).
    #[arg(long)]
    session: Option<SessionKind>,

    /// Fall back to a -90 degree rotation when no circuit rotation exists.
    #[arg(long, default_value_t = false)]
    legacy: bool,

    /// Output PNG path; defaults to `<identifier>_<year>.png`.
    #[arg(long)]
    output: Option<PathBuf>,

    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct KeyArgs {
    #[command(flatten)]
    event: EventArgs,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<TrackPlotConfig> {
    match path {
        Some(path) => TrackPlotConfig::from_yaml_file(path)
            .with_context(|| format!("load config '{}'", path.display())),
        None => Ok(TrackPlotConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Render(args) => cmd_render(args).await,
        Command::Key(args) => cmd_key(args),
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    let bind = config.bind;

    let provider: Arc<dyn SessionProvider> = Arc::new(ArchiveProvider::new(&config.archive_dir));
    let state = AppState::from_pipeline(Arc::new(TrackImagePipeline::new(provider, config)));
    server::serve(state, bind).await.with_context(|| format!("serve on {}", bind))
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let request = args.event.request()?;

    let mut options = PipelineOptions::for_request(&request, &config);
    if let Some(kind) = args.session {
        options.session_kind = kind;
    }
    if args.legacy {
        options = options.with_policy(RotationPolicy::Legacy);
    }

    let pipeline = TrackImagePipeline::new(ArchiveProvider::new(&config.archive_dir), config);
    let view = pipeline.render_view(&request.event, &options).await;
    eprintln!("{}", view.title);

    let image = view.image.context("no image rendered")?;
    let out = args.output.unwrap_or_else(|| {
        PathBuf::from(format!("{}_{}.png", request.event.identifier(), request.event.year()))
    });
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&out, image).with_context(|| format!("write png '{}'", out.display()))?;

    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_key(args: KeyArgs) -> anyhow::Result<()> {
    let request = args.event.request()?;
    println!("{}", CacheKey::for_request(&request));
    Ok(())
}
