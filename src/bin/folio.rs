use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

use folio::{Boot, Page, RenderContext, Scene, SiteConfig, Viewport, template};

/// Largest frame `folio frame` will step to; about 4.6 hours at 60 fps.
const MAX_FRAME: u64 = 1_000_000;

#[derive(Parser, Debug)]
#[command(name = "folio", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the résumé into the host HTML template.
    Build(BuildArgs),
    /// Write the view model as JSON.
    Data(DataArgs),
    /// Write the LaTeX CV.
    Cv(CvArgs),
    /// Render one background frame as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct BuildArgs {
    /// Input résumé JSON.
    #[arg(long = "in", default_value = folio::DEFAULT_RESUME_PATH)]
    in_path: PathBuf,

    /// Host HTML template containing every slot element.
    #[arg(long)]
    template: PathBuf,

    /// Output HTML path.
    #[arg(long)]
    out: PathBuf,

    /// Site configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path of the downloadable CV, linked from the page.
    #[arg(long)]
    cv: Option<String>,

    /// Profile picture path; overrides the résumé image.
    #[arg(long)]
    profile_picture: Option<String>,
}

#[derive(Parser, Debug)]
struct DataArgs {
    /// Input résumé JSON.
    #[arg(long = "in", default_value = folio::DEFAULT_RESUME_PATH)]
    in_path: PathBuf,

    /// Output JSON path.
    #[arg(long)]
    out: PathBuf,

    /// Site configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct CvArgs {
    /// Input résumé JSON.
    #[arg(long = "in", default_value = folio::DEFAULT_RESUME_PATH)]
    in_path: PathBuf,

    /// Output `.tex` path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Frame index (0 is the initial scene).
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=MAX_FRAME))]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Scene seed; overrides the configuration.
    #[arg(long)]
    seed: Option<u64>,

    /// Site configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("folio=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Build(args) => cmd_build(args),
        Command::Data(args) => cmd_data(args),
        Command::Cv(args) => cmd_cv(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn read_config(path: Option<&Path>) -> anyhow::Result<SiteConfig> {
    match path {
        Some(p) => SiteConfig::load(p).with_context(|| format!("load config '{}'", p.display())),
        None => Ok(SiteConfig::default()),
    }
}

fn create_parent(out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_build(args: BuildArgs) -> anyhow::Result<()> {
    let mut config = read_config(args.config.as_deref())?;
    if args.cv.is_some() {
        config.transform.cv = args.cv;
    }
    if args.profile_picture.is_some() {
        config.transform.profile_picture = args.profile_picture;
    }
    config.validate()?;

    let template_html = fs::read_to_string(&args.template)
        .with_context(|| format!("read template '{}'", args.template.display()))?;
    create_parent(&args.out)?;

    let boot = folio::boot(
        &args.in_path,
        Page::standard(),
        RenderContext::now(config.render.clone()),
        &config,
        Vec::new(),
        Viewport::default(),
    )?;

    match boot {
        Boot::Ready {
            session, report, ..
        } => {
            let html = template::inject(&template_html, session.page())?;
            fs::write(&args.out, html)
                .with_context(|| format!("write html '{}'", args.out.display()))?;
            if !report.dropped_courses.is_empty() {
                eprintln!(
                    "dropped {} unrecognised program course(s)",
                    report.dropped_courses.len()
                );
            }
            session.unload();
            eprintln!("wrote {}", args.out.display());
            Ok(())
        }
        Boot::Fallback { page, error } => {
            let html = template::inject(&template_html, &page)?;
            fs::write(&args.out, html)
                .with_context(|| format!("write html '{}'", args.out.display()))?;
            eprintln!("wrote fallback page {}", args.out.display());
            Err(anyhow::Error::new(error)
                .context(format!("load résumé '{}'", args.in_path.display())))
        }
    }
}

fn cmd_data(args: DataArgs) -> anyhow::Result<()> {
    let config = read_config(args.config.as_deref())?;
    let resume = folio::load_resume(&args.in_path)?;
    let transformed = folio::transform(&resume, &config.transform)?;

    create_parent(&args.out)?;
    let f = fs::File::create(&args.out)
        .with_context(|| format!("create '{}'", args.out.display()))?;
    serde_json::to_writer_pretty(f, &transformed.view).with_context(|| "write view model JSON")?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_cv(args: CvArgs) -> anyhow::Result<()> {
    let resume = folio::load_resume(&args.in_path)?;
    create_parent(&args.out)?;
    folio::cv::write_cv(&resume, &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut config = read_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.background.seed = seed;
    }

    let viewport = Viewport::new(f64::from(args.width), f64::from(args.height), 1.0)?;
    let mut scene = Scene::new(&config.background, viewport)?;
    scene.advance_to(args.frame);

    let settings = folio::PosterSettings {
        width: args.width,
        height: args.height,
        ..folio::PosterSettings::default()
    };
    let poster = folio::render_frame(&scene, &settings)?;

    create_parent(&args.out)?;
    poster.save_png(&args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
