use carousel_studio::aspect::AspectRatio;
use carousel_studio::controller::TransformController;
use carousel_studio::deck::{self, Deck};
use carousel_studio::export_worker::{ExportEvent, Exporter, Submission};
use carousel_studio::render::{
    FontBook, FontFamily, RenderBackend, Rgba, RustBackend, inspect_slide,
};
use carousel_studio::types::{Alignment, Slide, SlideUpdate};
use carousel_studio::{check, config, logging, output};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "carousel-studio")]
#[command(about = "Compose and export photo carousel slides")]
#[command(long_about = "\
Compose and export photo carousel slides

A deck is an ordered list of slides, one photo each, stored as JSON. Every
slide is cropped to its aspect ratio by cover fit, then panned and zoomed;
the crop is stored in percent, so it survives any preview or export size.

Workflow:

  carousel-studio init photos/            # one slide per image
  carousel-studio aspect 4/5              # active slide → portrait
  carousel-studio pan --dx -60            # drag 60 px left in the preview
  carousel-studio zoom 1.4                # zoom in, position re-clamped
  carousel-studio style --caption \"Day one\" --font playfair --align left
  carousel-studio export                  # exports/slide-<id>.jpg

Export sizes:
  1 / 1   Square      1080×1080
  4 / 5   Portrait    1080×1350
  9 / 16  Story       1080×1920
  16 / 9  Landscape   1920×1080

Captions need font files; map families to TTF/OTF paths in studio.toml.
Run 'carousel-studio gen-config' to generate a documented studio.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Deck file
    #[arg(long, default_value = deck::DECK_FILENAME, global = true)]
    deck: PathBuf,

    /// Config file (stock defaults if absent)
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Which slide an edit applies to.
#[derive(clap::Args, Clone)]
struct Target {
    /// Slide id (defaults to the active slide)
    #[arg(long)]
    slide: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Create a deck from image files and directories
    Init {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Add to an existing deck instead of refusing to overwrite it
        #[arg(long)]
        append: bool,
    },
    /// Show every slide with its export geometry
    List,
    /// Validate images, positions, fonts, and colors without exporting
    Check,
    /// Make a slide the active one
    Select { id: String },
    /// Drag the image by a pointer delta in preview pixels
    Pan {
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        dx: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        dy: f64,
        #[command(flatten)]
        target: Target,
    },
    /// Set the zoom factor (1 = cover fit)
    Zoom {
        scale: f64,
        #[command(flatten)]
        target: Target,
    },
    /// Set the aspect ratio (1/1, 4/5, 9/16, 16/9 or square, portrait, story, landscape)
    Aspect {
        ratio: String,
        #[command(flatten)]
        target: Target,
    },
    /// Change caption text and styling
    Style {
        #[arg(long)]
        caption: Option<String>,
        /// inter, playfair, roboto-mono, merriweather, oswald
        #[arg(long)]
        font: Option<String>,
        /// Hex color: #RGB, #RRGGBB or #RRGGBBAA
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        align: Option<Alignment>,
        /// On-screen font size in px (12-48)
        #[arg(long)]
        size: Option<f32>,
        /// Bottom shadow opacity (0-1)
        #[arg(long)]
        gradient: Option<f32>,
        #[command(flatten)]
        target: Target,
    },
    /// Remove a slide
    Remove {
        #[command(flatten)]
        target: Target,
    },
    /// Render slides to JPEG
    Export {
        /// Export only this slide (default: all)
        #[arg(long)]
        slide: Option<String>,
        /// Output directory (default: export.output_dir from config)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print a stock studio.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let mut studio = config::load_config(&cli.config)?;
    studio.logging.level = logging::level_for_verbosity(&studio.logging.level, cli.verbose);
    logging::init_logging(&studio.logging);

    let backend = RustBackend::new();

    match cli.command {
        Command::Init { paths, append } => {
            let mut deck = if append {
                Deck::load(&cli.deck)?
            } else if cli.deck.exists() {
                return Err(format!(
                    "{} already exists; pass --append to add to it",
                    cli.deck.display()
                )
                .into());
            } else {
                Deck::new()
            };

            let images = deck::collect_images(&paths)?;
            if images.is_empty() {
                return Err("no supported images found".into());
            }
            for image in &images {
                deck.add_image(&std::path::absolute(image)?, &studio.defaults);
            }
            deck.save(&cli.deck)?;
            println!("Added {} slides to {}", images.len(), cli.deck.display());
            print_deck(&deck, &backend);
        }
        Command::List => {
            let deck = Deck::load(&cli.deck)?;
            print_deck(&deck, &backend);
        }
        Command::Check => {
            let deck = Deck::load(&cli.deck)?;
            let fonts = FontBook::from_config(&studio.fonts);
            println!("==> Checking {}", cli.deck.display());
            let results = check::check_deck(&deck, &backend, &fonts);
            output::print_check(&deck, &results);
            check::ensure_clean(&results)?;
            println!("==> Deck is valid");
        }
        Command::Select { id } => {
            let mut deck = Deck::load(&cli.deck)?;
            deck.select(&id)?;
            deck.save(&cli.deck)?;
            print_slide(&deck, &id, &backend);
        }
        Command::Pan { dx, dy, target } => {
            edit(&cli.deck, &target, &studio, &backend, |session| {
                if !session.controller.is_pannable(&session.slide) {
                    tracing::info!("image exactly fills the frame at this zoom; nothing to pan");
                }
                session.controller.pointer_down(0.0, 0.0, &session.slide);
                let moved = session.controller.pointer_move(dx, dy, &session.slide);
                session.controller.pointer_up();
                session.apply(moved);
                Ok(())
            })?;
        }
        Command::Zoom { scale, target } => {
            edit(&cli.deck, &target, &studio, &backend, |session| {
                let update = session.controller.set_scale(&session.slide, scale);
                session.apply(Some(update));
                Ok(())
            })?;
        }
        Command::Aspect { ratio, target } => {
            let ratio = parse_ratio(&ratio)?;
            edit(&cli.deck, &target, &studio, &backend, |session| {
                let update = session.controller.set_aspect_ratio(&session.slide, ratio);
                session.apply(Some(update));
                Ok(())
            })?;
        }
        Command::Style {
            caption,
            font,
            color,
            align,
            size,
            gradient,
            target,
        } => {
            let update = style_update(caption, font, color, align, size, gradient)?;
            edit(&cli.deck, &target, &studio, &backend, |session| {
                session.apply(Some(update));
                Ok(())
            })?;
        }
        Command::Remove { target } => {
            let mut deck = Deck::load(&cli.deck)?;
            let id = deck.target(target.slide.as_deref())?.id.clone();
            let removed = deck.remove(&id)?;
            deck.save(&cli.deck)?;
            println!("Removed {} ({})", removed.id, removed.image_source);
            match deck.active.as_deref() {
                Some(active) => println!("Active: {}", active),
                None => println!("Deck is empty"),
            }
        }
        Command::Export { slide, output } => {
            let deck = Deck::load(&cli.deck)?;
            let slides: Vec<Slide> = match slide.as_deref() {
                Some(id) => vec![deck.target(Some(id))?.clone()],
                None => deck.slides.clone(),
            };
            if slides.is_empty() {
                return Err(deck::DeckError::Empty.into());
            }
            let output_dir = output.unwrap_or_else(|| studio.export.output_dir.clone());
            export(slides, studio, output_dir, backend)?;
        }
        Command::GenConfig => unreachable!("handled before config loading"),
    }

    Ok(())
}

/// One edit: the target slide, a controller primed with its preview and image
/// sizes, and the accumulated update.
struct Session {
    slide: Slide,
    controller: TransformController,
    update: SlideUpdate,
}

impl Session {
    fn open(slide: Slide, studio: &config::StudioConfig, backend: &impl RenderBackend) -> Self {
        let mut session = Self {
            controller: TransformController::new(),
            update: SlideUpdate::default(),
            slide,
        };

        let container = session
            .slide
            .aspect()
            .container_for_width(studio.preview.container_width);
        let correction =
            session
                .controller
                .resize_container(container.width, container.height, &session.slide);
        session.apply(correction);

        match backend.identify(Path::new(&session.slide.image_source)) {
            Ok(dims) => {
                let correction = session.controller.set_image_size(
                    dims.width as f64,
                    dims.height as f64,
                    &session.slide,
                );
                session.apply(correction);
            }
            Err(e) => tracing::warn!(
                slide = %session.slide.id,
                error = %e,
                "image unreadable, position changes are skipped"
            ),
        }
        session
    }

    /// Merge an update into the working slide and the pending change set.
    fn apply(&mut self, update: Option<SlideUpdate>) {
        if let Some(update) = update {
            self.slide.apply(update.clone());
            self.update = std::mem::take(&mut self.update).merge(update);
        }
    }
}

fn edit(
    deck_path: &Path,
    target: &Target,
    studio: &config::StudioConfig,
    backend: &RustBackend,
    change: impl FnOnce(&mut Session) -> Result<(), Box<dyn std::error::Error>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut deck = Deck::load(deck_path)?;
    let slide = deck.target(target.slide.as_deref())?.clone();
    let id = slide.id.clone();

    let mut session = Session::open(slide, studio, backend);
    change(&mut session)?;

    if session.update.is_empty() {
        println!("No change");
    } else {
        tracing::debug!(slide = %id, update = ?session.update, "applying update");
        deck.update(&id, session.update)?;
        deck.save(deck_path)?;
    }
    print_slide(&deck, &id, backend);
    Ok(())
}

fn style_update(
    caption: Option<String>,
    font: Option<String>,
    color: Option<String>,
    align: Option<Alignment>,
    size: Option<f32>,
    gradient: Option<f32>,
) -> Result<SlideUpdate, Box<dyn std::error::Error>> {
    let font_family = match font {
        Some(name) => Some(
            FontFamily::parse(&name)
                .ok_or_else(|| format!("unknown font family '{name}'"))?
                .key()
                .to_string(),
        ),
        None => None,
    };
    if let Some(c) = &color {
        if Rgba::from_hex(c).is_none() {
            return Err(format!("invalid color '{c}' (expected #RGB, #RRGGBB or #RRGGBBAA)").into());
        }
    }
    if size.is_some_and(|s| !s.is_finite() || s <= 0.0) {
        return Err("font size must be a positive number".into());
    }
    if gradient.is_some_and(|g| !(0.0..=1.0).contains(&g)) {
        return Err("gradient must be between 0 and 1".into());
    }

    let update = SlideUpdate {
        caption: caption.map(|c| c.replace("\\n", "\n")),
        font_family,
        text_color: color,
        alignment: align,
        font_size: size,
        gradient_intensity: gradient,
        ..SlideUpdate::default()
    };
    if update.is_empty() {
        return Err("nothing to change; pass at least one style option".into());
    }
    Ok(update)
}

/// Accept ratio strings ("4/5", "4 / 5", "4:5") and labels ("portrait").
fn parse_ratio(value: &str) -> Result<AspectRatio, String> {
    AspectRatio::ALL
        .into_iter()
        .find(|r| r.label().eq_ignore_ascii_case(value.trim()))
        .or_else(|| AspectRatio::parse(value))
        .ok_or_else(|| format!("unknown aspect ratio '{value}' (use 1/1, 4/5, 9/16 or 16/9)"))
}

fn export(
    slides: Vec<Slide>,
    studio: config::StudioConfig,
    output_dir: PathBuf,
    backend: RustBackend,
) -> Result<(), Box<dyn std::error::Error>> {
    let fonts = Arc::new(FontBook::from_config(&studio.fonts));
    println!("==> Exporting {} slides to {}", slides.len(), output_dir.display());
    let (exporter, events) = Exporter::spawn(backend, studio, fonts, output_dir);

    let mut queued = 0;
    for slide in &slides {
        match exporter.submit(slide) {
            Submission::Queued => queued += 1,
            Submission::AlreadyInFlight => {
                tracing::warn!(slide = %slide.id, "duplicate export request skipped")
            }
            Submission::Closed => return Err("export worker stopped unexpectedly".into()),
        }
    }

    let mut failed = 0;
    for event in events.iter().take(queued) {
        if matches!(event, ExportEvent::Failed { .. }) {
            failed += 1;
        }
        for line in output::format_export_event(&event) {
            println!("{}", line);
        }
    }
    exporter.finish();

    println!("Exported {} of {} slides", queued - failed, queued);
    if failed > 0 {
        return Err(format!("Could not save {failed} slide(s)").into());
    }
    Ok(())
}

fn print_deck(deck: &Deck, backend: &impl RenderBackend) {
    let geometries: Vec<_> = deck
        .slides
        .iter()
        .map(|slide| inspect_slide(backend, slide).ok())
        .collect();
    output::print_deck(deck, &geometries);
}

fn print_slide(deck: &Deck, id: &str, backend: &impl RenderBackend) {
    if let Some(slide) = deck.get(id) {
        let geometry = inspect_slide(backend, slide).ok();
        for line in output::format_slide(deck, slide, geometry.as_ref()) {
            println!("{}", line);
        }
    }
}
