//! Command-line front end for collage projects.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};

use collage::model::{CanvasFormat, Color, ItemId, ItemKind, ProjectId, Raster};
use collage::{AppConfig, EditorSession, ProjectRegistry};

#[derive(Parser, Debug)]
#[command(name = "collage", version, about = "Manage photo collage projects")]
struct Cli {
    /// Projects directory (defaults to the configured or platform data dir).
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Configuration file (defaults to the platform config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List projects, most recent first.
    List,
    /// Create an empty project.
    New { name: String },
    /// Rename a project.
    Rename { id: ProjectId, name: String },
    /// Delete a project and its scene.
    Delete { id: ProjectId },
    /// Print a project's scene.
    Show { id: ProjectId },
    /// Add a photo from an image file.
    AddPhoto { id: ProjectId, path: PathBuf },
    /// Add a text item.
    AddText { id: ProjectId, text: Option<String> },
    /// Remove an item from a scene.
    RemoveItem { id: ProjectId, item: ItemId },
    /// Change the canvas format (Square, Portrait, Landscape, Story).
    SetFormat { id: ProjectId, format: CanvasFormat },
    /// Set the background color; components are 0-1.
    SetBackground {
        id: ProjectId,
        red: f64,
        green: f64,
        blue: f64,
        #[arg(default_value_t = 1.0)]
        opacity: f64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_or_default(cli.config.as_deref());

    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let root = match cli.dir.clone().or_else(|| config.storage.projects_dir()) {
        Some(root) => root,
        None => bail!("could not determine a projects directory; pass --dir"),
    };
    let mut registry = ProjectRegistry::open(&root)
        .with_context(|| format!("open projects in '{}'", root.display()))?
        .with_jpeg_quality(config.preferences.jpeg_quality);
    if let Some(reason) = registry.index_recovery() {
        log::warn!("Project index was unreadable and has been reset: {}", reason);
    }

    match cli.cmd {
        Command::List => cmd_list(&registry),
        Command::New { name } => {
            let project = registry.create(name)?;
            println!("{}", project.id);
            Ok(())
        }
        Command::Rename { id, name } => {
            if !registry.rename(id, name)? {
                bail!("no project {id}");
            }
            Ok(())
        }
        Command::Delete { id } => {
            if !registry.delete(id)? {
                bail!("no project {id}");
            }
            Ok(())
        }
        Command::Show { id } => cmd_show(&mut registry, id),
        cmd => cmd_edit(&mut registry, &config, cmd),
    }
}

fn cmd_list(registry: &ProjectRegistry) -> anyhow::Result<()> {
    let mut projects: Vec<_> = registry.list().iter().collect();
    projects.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
    for project in projects {
        println!(
            "{}  {}  {}",
            project.id,
            project.last_modified.format("%Y-%m-%d %H:%M"),
            project.name
        );
    }
    Ok(())
}

fn cmd_show(registry: &mut ProjectRegistry, id: ProjectId) -> anyhow::Result<()> {
    let Some(project) = registry.get(id).cloned() else {
        bail!("no project {id}");
    };
    let scene = registry.try_load_scene(id)?.unwrap_or_default();

    println!("{} ({})", project.name, project.id);
    println!("format: {}", scene.format);
    let bg = scene.background;
    println!(
        "background: rgba({:.3}, {:.3}, {:.3}, {:.3}){}",
        bg.red,
        bg.green,
        bg.blue,
        bg.opacity,
        if scene.background_image.is_some() {
            " + image"
        } else {
            ""
        }
    );
    for item in scene.render_order() {
        let detail = match item.kind() {
            ItemKind::Photo(photo) => match &photo.image {
                Some(image) => format!("{}x{} px", image.width(), image.height()),
                None => "no image".to_string(),
            },
            ItemKind::Text(text) => format!("{:?}", text.text),
        };
        println!(
            "  {} {:<5} at ({:.1}, {:.1}) size {:.1}x{:.1} rot {:.1} z {} {}",
            item.id(),
            item.kind_name(),
            item.position.x,
            item.position.y,
            item.size.width,
            item.size.height,
            item.rotation.degrees(),
            item.z_index,
            detail
        );
    }
    Ok(())
}

fn load_photo(path: &Path) -> anyhow::Result<Raster> {
    let image = image::open(path).with_context(|| format!("open image '{}'", path.display()))?;
    Ok(Raster::from(image))
}

fn cmd_edit(
    registry: &mut ProjectRegistry,
    config: &AppConfig,
    cmd: Command,
) -> anyhow::Result<()> {
    let id = match &cmd {
        Command::AddPhoto { id, .. }
        | Command::AddText { id, .. }
        | Command::RemoveItem { id, .. }
        | Command::SetFormat { id, .. }
        | Command::SetBackground { id, .. } => *id,
        other => bail!("{other:?} is not an edit"),
    };
    if registry.get(id).is_none() {
        bail!("no project {id}");
    }

    let mut session = EditorSession::open(
        registry,
        id,
        config.preferences.viewport(),
        config.preferences.undo_config(),
    );

    match cmd {
        Command::AddPhoto { path, .. } => {
            let item = session.add_photo(load_photo(&path)?)?;
            println!("{item}");
        }
        Command::AddText { text, .. } => {
            let item = session.add_text()?;
            if let Some(text) = text {
                session.update_item(item, |scene_item| {
                    if let ItemKind::Text(style) = scene_item.kind_mut() {
                        style.text = text;
                    }
                })?;
            }
            println!("{item}");
        }
        Command::RemoveItem { item, .. } => {
            if !session.remove_item(item)? {
                bail!("no item {item} in project {id}");
            }
        }
        Command::SetFormat { format, .. } => session.set_format(format)?,
        Command::SetBackground {
            red,
            green,
            blue,
            opacity,
            ..
        } => session.set_background_color(Color::rgba(red, green, blue, opacity))?,
        _ => {}
    }
    Ok(())
}
