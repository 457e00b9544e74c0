use clap::{ArgAction, Parser, ValueEnum};
use tracing::Level;

/// Which singleton implementation the demo drives.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// Double-checked locking over a static cell.
    ThreadSafe,
    /// Unsynchronized lazy initialization; overlapping first calls may race.
    Unsync,
}

#[derive(Parser, Debug)]
#[command(
    name = "singleton-demo",
    about = "Request a singleton twice with different values and print what comes back"
)]
pub struct Params {
    /// Singleton implementation to request the instance from.
    #[arg(long, value_enum, default_value_t = Variant::ThreadSafe)]
    pub variant: Variant,

    /// Value passed to the first accessor call.
    #[arg(long, default_value = "Value1")]
    pub first: String,

    /// Value passed to the second accessor call.
    #[arg(long, default_value = "Value2")]
    pub second: String,

    /// Afterwards, release this many threads onto the accessor at once.
    #[arg(long, value_name = "THREADS")]
    pub race: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Params {
    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Params::command().debug_assert();
    }

    #[test]
    fn defaults_reproduce_the_classic_demo() {
        let params = Params::try_parse_from(["singleton-demo"]).unwrap();
        assert_eq!(params.variant, Variant::ThreadSafe);
        assert_eq!(params.first, "Value1");
        assert_eq!(params.second, "Value2");
        assert_eq!(params.race, None);
        assert_eq!(params.log_level(), Level::WARN);
    }

    #[test]
    fn parses_every_option() {
        let params = Params::try_parse_from([
            "singleton-demo",
            "--variant",
            "unsync",
            "--first",
            "a",
            "--second",
            "b",
            "--race",
            "12",
            "-vv",
        ])
        .unwrap();
        assert_eq!(params.variant, Variant::Unsync);
        assert_eq!(params.first, "a");
        assert_eq!(params.second, "b");
        assert_eq!(params.race, Some(12));
        assert_eq!(params.log_level(), Level::DEBUG);
    }

    #[test]
    fn help_describes_every_option() {
        let help = Params::command().render_long_help().to_string();
        assert!(help.contains("Singleton implementation to request the instance from"));
        assert!(help.contains("Value passed to the first accessor call"));
        assert!(help.contains("release this many threads"));
    }

    #[test]
    fn unknown_variant_rejected() {
        assert!(Params::try_parse_from(["singleton-demo", "--variant", "lazy"]).is_err());
    }
}
