//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Quadtile command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "quadtile", about = "Quad-tree tile geometry")]
pub struct CliArgs {
    /// Samples across a tile in x.
    #[arg(long)]
    pub sample_x: Option<u32>,

    /// Samples across a tile in y.
    #[arg(long)]
    pub sample_y: Option<u32>,

    /// Build wireframe lines instead of triangles.
    #[arg(long)]
    pub line_mode: Option<bool>,

    /// Hang skirts from tile edges.
    #[arg(long)]
    pub skirts: Option<bool>,

    /// Cap the poles.
    #[arg(long)]
    pub cover_poles: Option<bool>,

    /// Deepest quad tree level to load.
    #[arg(long)]
    pub max_level: Option<u8>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(x) = args.sample_x {
            self.geometry.sample_x = x;
        }
        if let Some(y) = args.sample_y {
            self.geometry.sample_y = y;
        }
        if let Some(lines) = args.line_mode {
            self.geometry.line_mode = lines;
        }
        if let Some(skirts) = args.skirts {
            self.manager.build_skirts = skirts;
        }
        if let Some(poles) = args.cover_poles {
            self.manager.cover_poles = poles;
        }
        if let Some(level) = args.max_level {
            self.tree.max_level = level;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            sample_x: Some(4),
            skirts: Some(true),
            max_level: Some(9),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.geometry.sample_x, 4);
        assert!(config.manager.build_skirts);
        assert_eq!(config.tree.max_level, 9);
        // Non-overridden fields retain defaults
        assert_eq!(config.geometry.sample_y, 10);
        assert!(config.manager.cover_poles);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from([
            "quadtile",
            "--sample-x",
            "2",
            "--line-mode",
            "true",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.sample_x, Some(2));
        assert_eq!(args.line_mode, Some(true));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.config.is_none());
    }
}
