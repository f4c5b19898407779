//! LuaTools Game Checker - command-line entry point.
//!
//! Initializes logging and settings, then runs one subcommand against the local
//! Steam installation:
//!
//! - `libraries`: list library roots from `libraryfolders.vdf`
//! - `resolve <APPID>`: show the manifest-derived game record
//! - `locate <APPID>`: find the generated Lua script under `config/stplug-in`
//! - `status <APPID>`: report whether the script has updates enabled or disabled
//! - `disable <APPID>` / `enable <APPID>`: toggle the script in place
//! - `inspect <APPID>`: install size (actual vs Steam's) and root folder listing
//! - `verify-status <APPID>`: pending verification and download-record state
//! - `verify-request`, `verify-done`, `record-download <APPID>`: update that state
//! - `show <APPID>`: print the script in display form
//!
//! `resolve`, `disable`, `enable` and the tracking updates only accept games on
//! the local allow list that Steam reports as fully installed.
//!
//! Restarting Steam, dialogs and report saving are left to the caller.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use luatools_checker::services::{
    self, AllowList, DownloadMode, FixedSteamRoot, GameResolver, ScriptFile, SteamRootLocator,
    SystemSteamLocator, ToggleEngine, VerificationTracker,
};
use luatools_checker::{APP_NAME, AppId, ConfigManager, GameRecord, VERSION};
use std::time::SystemTime;

#[derive(Parser, Debug)]
#[command(name = "luatools-checker", version, about = "Steam game install checker and LuaTools download toggle")]
struct Cli {
    /// Directory holding `LuaTools Settings.yaml`
    #[arg(long, default_value = "LuaTools Data")]
    config_dir: Utf8PathBuf,

    /// Steam installation root (overrides settings and auto-detection)
    #[arg(long)]
    steam_path: Option<Utf8PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List configured Steam library folders
    Libraries,
    /// Show the manifest details of an installed game
    Resolve { app_id: AppId },
    /// Find the generated Lua script for a game
    Locate { app_id: AppId },
    /// Show whether updates are enabled in a game's script
    Status { app_id: AppId },
    /// Pin versions and stop downloading other depots
    Disable { app_id: AppId },
    /// Un-pin versions and resume downloading other depots
    Enable { app_id: AppId },
    /// Compare install size with Steam's and list the install folder
    Inspect { app_id: AppId },
    /// Show pending verification and download-record state
    VerifyStatus { app_id: AppId },
    /// Record that a file verification was requested for a game
    VerifyRequest { app_id: AppId },
    /// Clear the pending verification and mark the download as verified
    VerifyDone { app_id: AppId },
    /// Record that a script was downloaded for a game
    RecordDownload { app_id: AppId },
    /// Print a game's script in display form
    Show { app_id: AppId },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(&cli.config_dir)?;
    let mut settings = config_manager.load_settings()?;
    if cli.debug {
        settings.debug_mode = true;
    }
    if let Some(path) = &cli.steam_path {
        settings.steam_path = Some(path.clone());
    }

    let _log_guard = luatools_checker::logging::setup_logging(&settings)?;
    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let steam_root = match &settings.steam_path {
        Some(path) => FixedSteamRoot(path.clone()).locate(),
        None => SystemSteamLocator.locate(),
    }
    .context("Steam installation not found")?;
    tracing::info!("Using Steam installation at {}", steam_root);

    let resolver = GameResolver::new(FixedSteamRoot(steam_root.clone()));
    let reports_dir = config_manager.reports_dir(&settings);
    let supported = |app_id: &AppId| supported_game(&resolver, &reports_dir, app_id);

    let result = match cli.command {
        Command::Libraries => {
            for library in services::read_libraries(&steam_root)? {
                println!("{}", library);
            }
            Ok(())
        }
        Command::Resolve { app_id } => {
            let game = supported(&app_id)?;
            println!("AppID:        {}", game.id);
            println!("Name:         {}", game.name);
            println!("Install dir:  {}", game.install_dir);
            println!("Game path:    {}", game.game_path);
            println!("Library:      {}", game.library_path);
            println!("Build ID:     {}", game.build_id);
            println!("Size on disk: {}", game.size_on_disk);
            Ok(())
        }
        Command::Locate { app_id } => {
            println!("{}", services::find_script(&steam_root, &app_id)?);
            Ok(())
        }
        Command::Status { app_id } => {
            let path = services::find_script(&steam_root, &app_id)?;
            let script = ScriptFile::read(&path)?;
            println!("{}: {}", path, script.mode());
            Ok(())
        }
        Command::Disable { app_id } => {
            toggle(&supported(&app_id)?, &steam_root, DownloadMode::Disabled)
        }
        Command::Enable { app_id } => {
            toggle(&supported(&app_id)?, &steam_root, DownloadMode::Enabled)
        }
        Command::Inspect { app_id } => {
            let game = resolver.resolve(&app_id)?;
            let actual = services::directory_size(&game.game_path);
            println!("Folder Size (Actual): {} ({} bytes)", services::format_bytes(actual), actual);
            match game.size_on_disk_bytes() {
                Some(reported) => println!(
                    "Folder Size (Steam):  {} ({} bytes)",
                    services::format_bytes(reported),
                    reported
                ),
                None => println!("Folder Size (Steam):  {}", game.size_on_disk),
            }
            println!();
            print!("{}", services::folder_tree(&game.game_path));
            Ok(())
        }
        Command::VerifyStatus { app_id } => {
            let game = resolver.resolve(&app_id)?;
            let tracker = VerificationTracker::new(&reports_dir)?;
            println!("Verification pending: {}", tracker.flag_exists(&app_id));
            println!(
                "Verification complete: {}",
                tracker.is_complete(&app_id, game.last_updated)
            );
            println!("Unverified download: {}", tracker.bypass_attempted(&app_id));
            Ok(())
        }
        Command::VerifyRequest { app_id } => {
            let game = supported(&app_id)?;
            VerificationTracker::new(&reports_dir)?.create_flag(&game.id, game.last_updated)?;
            println!("Verification requested for {} ({})", game.name, game.id);
            Ok(())
        }
        Command::VerifyDone { app_id } => {
            let game = supported(&app_id)?;
            let tracker = VerificationTracker::new(&reports_dir)?;
            if !tracker.is_complete(&game.id, game.last_updated) {
                tracing::warn!(
                    "Steam has not updated AppID {} since verification was requested",
                    game.id
                );
            }
            tracker.delete_flag(&game.id)?;
            tracker.mark_verified(&game.id)?;
            println!("Verification recorded for {} ({})", game.name, game.id);
            Ok(())
        }
        Command::RecordDownload { app_id } => {
            let game = supported(&app_id)?;
            VerificationTracker::new(&reports_dir)?.record_download(&game.id, game.last_updated)?;
            println!("Download recorded for {} ({})", game.name, game.id);
            Ok(())
        }
        Command::Show { app_id } => {
            let path = services::find_script(&steam_root, &app_id)?;
            let script = ScriptFile::read(&path)?;
            println!("{} ({})", path, script.mode());
            print!("{}", services::format_script(&script.lines));
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!("Command failed: {:#}", e);
    }
    result
}

/// Resolve a game the tool is allowed to work on: allow-listed, then fully installed.
fn supported_game<L: SteamRootLocator>(
    resolver: &GameResolver<L>,
    reports_dir: &Utf8Path,
    app_id: &AppId,
) -> Result<GameRecord> {
    let allow_list = AllowList::load(reports_dir)?;
    if allow_list.needs_update(SystemTime::now()) {
        tracing::warn!(
            "Allow list at {} is missing or older than 7 days; refresh it",
            allow_list.path()
        );
    }
    allow_list.ensure_listed(app_id)?;

    let game = resolver.resolve(app_id)?;
    services::ensure_fully_installed(&game)?;
    Ok(game)
}

fn toggle(game: &GameRecord, steam_root: &Utf8Path, target: DownloadMode) -> Result<()> {
    let path = services::find_script(steam_root, &game.id)?;
    let script = services::set_download_mode(&ToggleEngine::new(), &path, &game.id, target)?;

    println!("{} ({}): {}", game.name, game.id, script.mode());
    Ok(())
}
