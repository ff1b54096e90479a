use crate::serial::SerialArgs;
use autostar::Sexagesimal;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lists connected serial devices
    List,
    /// Lists every operation the client can send
    Operations,
    /// Sends any operation by name
    Invoke(InvokeConf),
    /// Reports where the telescope is pointing
    Position(SerialArgs),
    /// Reports product name and firmware
    Info(SerialArgs),
    /// Slews to the given coordinates
    Goto(GotoConf),
    /// Stops all motion
    Halt(SerialArgs),
    /// Selects one of the stored observing sites
    Site(SiteConf),
}

#[derive(Args)]
pub struct InvokeConf {
    /// Operation name, as printed by `operations`
    #[clap(value_parser)]
    pub operation: String,

    /// Arguments in wire notation, e.g. 05:35:17, -05*23, 10/18/26, 12.5
    #[clap(value_parser, allow_hyphen_values = true)]
    pub args: Vec<String>,

    #[clap(flatten)]
    pub serial: SerialArgs,
}

#[derive(Args)]
pub struct GotoConf {
    /// Right ascension, HH:MM:SS or HH:MM.T
    #[clap(value_parser)]
    pub ra: Sexagesimal,

    /// Declination, sDD*MM or sDD*MM:SS
    #[clap(value_parser, allow_hyphen_values = true)]
    pub dec: Sexagesimal,

    #[clap(flatten)]
    pub serial: SerialArgs,
}

#[derive(Args)]
pub struct SiteConf {
    /// Site index
    #[clap(value_parser = clap::value_parser!(u8).range(0..=3))]
    pub site: u8,

    #[clap(flatten)]
    pub serial: SerialArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn goto_accepts_negative_declination() {
        let cli = Cli::parse_from([
            "autostar_cli",
            "goto",
            "-s",
            "/dev/ttyUSB0",
            "05:35:17",
            "-05*23",
        ]);
        match cli.command {
            Commands::Goto(conf) => {
                assert_eq!(conf.ra, Sexagesimal::hms(5, 35, 17));
                assert!(conf.dec.negative);
                assert_eq!(conf.serial.serial, "/dev/ttyUSB0");
            }
            _ => panic!("expected goto"),
        }
    }
}
