//! The must-use plugin that installs the exclusion filter inside WordPress.

/// File name written into the must-use plugins directory.
pub const FILE_NAME: &str = "render-command.php";

/// WordPress filter the snippet hooks.
pub const HOOK: &str = "option_active_plugins";

/// Priority the snippet registers its callback at.
pub const PRIORITY: u32 = 10;

/// Static PHP source of the must-use plugin.
pub const SOURCE: &str = include_str!("../templates/render-command.php");
