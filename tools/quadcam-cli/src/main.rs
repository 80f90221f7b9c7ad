//! quadcam CLI: manage camera layouts, align telemetry, play and export feeds.
//!
//! Usage:
//!   quadcam projects <ACTION>     List, create, update, delete or seed projects
//!   quadcam layout <ACTION>       Edit a project's poses and sync offsets
//!   quadcam telemetry <ACTION>    Extract telemetry or look up a HUD sample
//!   quadcam play [OPTIONS]        Headless synchronized playback
//!   quadcam export [OPTIONS]      Burn a telemetry overlay clip
//!   quadcam check                 Check external tools and configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use quadcam_common::config::AppConfig;
use quadcam_project_model::{CameraView, ProjectId};

mod commands;

#[derive(Parser)]
#[command(
    name = "quadcam",
    about = "Four-camera dashcam playback with synchronized telemetry",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to $XDG_CONFIG_HOME/quadcam/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage saved projects
    Projects {
        #[command(subcommand)]
        action: ProjectsAction,
    },

    /// Edit a project's layout
    Layout {
        #[command(subcommand)]
        action: LayoutAction,
    },

    /// Telemetry extraction and lookup
    Telemetry {
        #[command(subcommand)]
        action: TelemetryAction,
    },

    /// Play feeds headlessly on one synchronized timeline
    Play {
        /// Project whose layout and offsets to use (standard layout if omitted)
        #[arg(short, long)]
        project: Option<ProjectId>,

        /// Front feed file
        #[arg(long)]
        front: Option<PathBuf>,

        /// Back feed file
        #[arg(long)]
        back: Option<PathBuf>,

        /// Left feed file
        #[arg(long)]
        left: Option<PathBuf>,

        /// Right feed file
        #[arg(long)]
        right: Option<PathBuf>,

        /// Start position in seconds
        #[arg(long)]
        start: Option<f64>,

        /// Stop after this many wall-clock seconds (runs to the end if omitted)
        #[arg(long)]
        run_secs: Option<f64>,

        /// Duration to assume when a feed cannot be probed
        #[arg(long, default_value = "60")]
        assume_duration: f64,

        /// Print a status line every N frames
        #[arg(long, default_value = "30")]
        status_every: u64,
    },

    /// Burn a telemetry overlay onto a short clip of one feed
    Export {
        /// Which feed the clip is cut from
        #[arg(long, default_value = "front")]
        view: CameraView,

        /// Feed file name, relative to the media directory
        #[arg(long)]
        file: String,

        /// Front feed file for telemetry (defaults to --file when exporting the front view)
        #[arg(long)]
        front: Option<String>,

        /// Logical playback time whose HUD sample is burned
        #[arg(short, long, default_value = "0")]
        time: f64,

        /// Project whose sync offsets apply
        #[arg(short, long)]
        project: Option<ProjectId>,
    },

    /// Check external tools and configuration
    Check,
}

#[derive(Subcommand)]
enum ProjectsAction {
    /// List all projects
    List,

    /// Show one project as JSON
    Get { id: ProjectId },

    /// Create a project
    Create {
        /// Project name
        #[arg(short, long)]
        name: String,

        /// Optional description
        #[arg(short, long)]
        description: Option<String>,

        /// Layout JSON file (standard layout if omitted)
        #[arg(long)]
        layout: Option<PathBuf>,
    },

    /// Update name, description or layout
    Update {
        id: ProjectId,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Layout JSON file
        #[arg(long)]
        layout: Option<PathBuf>,
    },

    /// Delete a project
    Delete { id: ProjectId },

    /// Create the default project if the store is empty
    Seed,
}

#[derive(Subcommand)]
enum LayoutAction {
    /// Print poses (rotations in degrees) and offsets
    Show { id: ProjectId },

    /// Set one pose component: scale, position.x|y|z, rotation.x|y|z
    SetPose {
        id: ProjectId,
        view: CameraView,
        field: String,
        #[arg(allow_hyphen_values = true)]
        value: f64,

        /// Interpret rotation values as degrees
        #[arg(long)]
        degrees: bool,
    },

    /// Set a feed's sync offset in seconds
    SetOffset {
        id: ProjectId,
        view: CameraView,
        #[arg(allow_hyphen_values = true)]
        secs: f64,
    },
}

#[derive(Subcommand)]
enum TelemetryAction {
    /// Extract telemetry for a front feed (falls back to synthetic data)
    Extract {
        /// File name relative to the media directory
        file: String,

        /// Print every sample as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the HUD sample for a playback time
    Lookup {
        /// File name relative to the media directory
        file: String,

        /// Logical playback time in seconds
        #[arg(short, long)]
        time: f64,

        /// Front feed sync offset in seconds
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        front_offset: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    quadcam_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Projects { action } => match action {
            ProjectsAction::List => commands::projects::list(&config).await,
            ProjectsAction::Get { id } => commands::projects::get(&config, id).await,
            ProjectsAction::Create {
                name,
                description,
                layout,
            } => commands::projects::create(&config, name, description, layout).await,
            ProjectsAction::Update {
                id,
                name,
                description,
                layout,
            } => commands::projects::update(&config, id, name, description, layout).await,
            ProjectsAction::Delete { id } => commands::projects::delete(&config, id).await,
            ProjectsAction::Seed => commands::projects::seed(&config).await,
        },
        Commands::Layout { action } => match action {
            LayoutAction::Show { id } => commands::layout::show(&config, id).await,
            LayoutAction::SetPose {
                id,
                view,
                field,
                value,
                degrees,
            } => commands::layout::set_pose(&config, id, view, &field, value, degrees).await,
            LayoutAction::SetOffset { id, view, secs } => {
                commands::layout::set_offset(&config, id, view, secs).await
            }
        },
        Commands::Telemetry { action } => match action {
            TelemetryAction::Extract { file, json } => {
                commands::telemetry::extract(&config, &file, json).await
            }
            TelemetryAction::Lookup {
                file,
                time,
                front_offset,
            } => commands::telemetry::lookup(&config, &file, time, front_offset).await,
        },
        Commands::Play {
            project,
            front,
            back,
            left,
            right,
            start,
            run_secs,
            assume_duration,
            status_every,
        } => {
            commands::play::run(
                &config,
                commands::play::PlayOptions {
                    project,
                    feeds: [front, back, left, right],
                    start,
                    run_secs,
                    assume_duration,
                    status_every,
                },
            )
            .await
        }
        Commands::Export {
            view,
            file,
            front,
            time,
            project,
        } => commands::export::run(&config, view, file, front, time, project).await,
        Commands::Check => commands::check::run(&config),
    }
}
