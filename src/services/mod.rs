//! Services module - Pure business logic for inspecting Steam and toggling LuaTools scripts.
//!
//! Nothing here touches a UI or spawns processes; every input is an explicit
//! parameter, and the only side effects are filesystem reads (and, for the
//! script and tracking helpers, writes).
//!
//! # Components
//!
//! - [`keyvalues`]: permissive `"key" "value"` scanner for Valve text files
//! - [`library`]: reads `libraryfolders.vdf` and `appmanifest_<id>.acf`
//! - [`GameResolver`]: turns an AppID into a [`GameRecord`](crate::models::GameRecord)
//! - [`LineClassifier`]: tags script lines as pins, depot declarations, comments...
//! - [`ToggleEngine`]: rewrites a script between "updates enabled" and "updates disabled"
//! - [`script`]: loads/saves scripts with their line endings and applies the toggle in place
//! - [`locator`]: finds the generated script for an AppID under `config/stplug-in`
//! - [`VerificationTracker`]: pending-verification flags and download records
//! - [`inspection`]: install size and folder listing helpers
//! - [`AllowList`]: locally cached list of supported AppIDs
//!
//! # Usage Example
//!
//! ```ignore
//! use luatools_checker::services::{GameResolver, SystemSteamLocator, find_script, disable_downloads};
//!
//! let resolver = GameResolver::new(SystemSteamLocator);
//! let game = resolver.resolve(&"1245620".parse()?)?;
//! let script = find_script(&resolver.steam_root()?, &game.id)?;
//! disable_downloads(&script, &game.id)?;
//! ```

pub mod allow_list;
pub mod classifier;
pub mod inspection;
pub mod keyvalues;
pub mod library;
pub mod locator;
pub mod resolver;
pub mod script;
pub mod toggle;
pub mod verification;

pub use allow_list::{ALLOW_LIST_FILE, AllowList, AllowListError};
pub use classifier::{
    ConfigLine, DirectiveKind, HEADER_MARKER, LineCategory, LineClassifier,
};
pub use inspection::{directory_size, folder_tree, format_bytes};
pub use library::{LibraryError, read_libraries, read_manifest};
pub use locator::{LocateError, find_script, find_script_in, scripts_dir};
pub use resolver::{
    FixedSteamRoot, GameResolver, ResolveError, SteamRootLocator, SystemSteamLocator,
    ensure_fully_installed, resolve_game, resolve_in,
};
pub use script::{
    ScriptError, ScriptFile, disable_downloads, enable_downloads, format_script, set_download_mode,
};
pub use toggle::{AUTHENTICITY_MARKER, DownloadMode, ToggleEngine, ToggleError, download_mode};
pub use verification::VerificationTracker;
