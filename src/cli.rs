//! Command line arguments for the `qrsnap` binary.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use image::Rgb;
use qrsnap::config::{parse_hex_color, Colors, EncodingConfig};
use qrsnap::qrcode::{EcLevel, VersionChoice};

#[derive(Parser, Debug)]
#[command(
    name = "qrsnap",
    version,
    about = "Type a text, get a scannable QR code",
    long_about = "Encode text into a QR code, preview it in the terminal and save it as PNG.\n\n\
                  With TEXT, runs once and exits. Without it, reads lines from stdin:\n\
                  plain lines set the text, :generate (:g) builds the code,\n\
                  :save [PATH] (:s) writes it, :status shows the state, :quit (:q) exits."
)]
pub struct Cli {
    /// Text to encode. Starts an interactive session when omitted.
    #[arg(value_name = "TEXT")]
    pub text: Option<String>,

    /// Write the PNG to this path.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Symbol version: auto or 1-40.
    #[arg(long = "qr-version", value_name = "VERSION", default_value = "auto")]
    pub qr_version: VersionChoice,

    /// Error correction level: L, M, Q or H.
    #[arg(long, value_name = "LEVEL", default_value = "L")]
    pub ecc: EcLevel,

    /// Pixels per module.
    #[arg(long, value_name = "PX", default_value_t = 10)]
    pub module_size: u32,

    /// Quiet zone width in modules.
    #[arg(long, value_name = "MODULES", default_value_t = 4)]
    pub border: u32,

    /// Dark module color.
    #[arg(long, value_name = "#RRGGBB", value_parser = parse_hex_color, default_value = "#000000")]
    pub fg: Rgb<u8>,

    /// Light module color.
    #[arg(long, value_name = "#RRGGBB", value_parser = parse_hex_color, default_value = "#FFFFFF")]
    pub bg: Rgb<u8>,

    /// Do not print the text preview.
    #[arg(long)]
    pub no_preview: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn encoding_config(&self) -> EncodingConfig {
        EncodingConfig::new()
            .with_version(self.qr_version)
            .with_ec_level(self.ecc)
            .with_module_size(self.module_size)
            .with_border_modules(self.border)
    }

    pub fn colors(&self) -> Colors {
        Colors::new(self.fg, self.bg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["qrsnap"]).unwrap();
        assert!(cli.text.is_none());
        assert_eq!(cli.encoding_config(), EncodingConfig::default());
        assert_eq!(cli.colors(), Colors::default());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_options() {
        let cli = Cli::try_parse_from([
            "qrsnap",
            "hello",
            "-o",
            "out.png",
            "--qr-version",
            "7",
            "--ecc",
            "high",
            "--module-size",
            "3",
            "--border",
            "0",
            "--fg",
            "#1976d2",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.text.as_deref(), Some("hello"));
        assert_eq!(cli.output, Some(PathBuf::from("out.png")));
        let config = cli.encoding_config();
        assert_eq!(config.version.to_string(), "7");
        assert_eq!(config.ec_level, EcLevel::High);
        assert_eq!(config.module_size_px, 3);
        assert_eq!(config.border_modules, 0);
        assert_eq!(cli.fg, Rgb([0x19, 0x76, 0xd2]));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Cli::try_parse_from(["qrsnap", "--qr-version", "41"]).is_err());
        assert!(Cli::try_parse_from(["qrsnap", "--ecc", "X"]).is_err());
        assert!(Cli::try_parse_from(["qrsnap", "--fg", "red"]).is_err());
    }
}
