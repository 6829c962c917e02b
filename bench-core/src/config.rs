//! Command line and environment configuration.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use argh::FromArgs;

use crate::discovery::{default_triple, EngineTriple};
use crate::driver::DEFAULT_TRIALS;
use crate::report::Format;

pub const DEFAULT_INPUT: &str = "mondial.xml";

/// Times event-style and cursor-style processing of an XML file with every
/// available engine.
#[derive(Debug, FromArgs)]
pub struct Args {
    /// the file to process, `mondial.xml` by default
    #[argh(option, short = 'i')]
    pub input: Option<String>,

    /// trials per engine and processing style, 100 by default
    #[argh(option, short = 'n')]
    pub trials: Option<usize>,

    /// report format: `text` or `json`
    #[argh(option)]
    pub format: Option<Format>,

    /// print the discovered engines and exit
    #[argh(switch)]
    pub list_engines: bool,

    /// event factory to benchmark instead of every discovered engine
    #[argh(option)]
    pub event_factory: Option<String>,

    /// input factory to benchmark instead of every discovered engine
    #[argh(option)]
    pub input_factory: Option<String>,

    /// output factory to benchmark instead of every discovered engine
    #[argh(option)]
    pub output_factory: Option<String>,
}

impl Args {
    /// Fills options left unset on the command line from `lookup`.
    pub fn apply_environment_variables(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        self.list_engines = self.list_engines || lookup("XML_BENCH_LIST_ENGINES").is_some();

        self.input.ambient_value(&lookup, "XML_BENCH_INPUT");
        self.trials.ambient_value(&lookup, "XML_BENCH_TRIALS");
        self.format.ambient_value(&lookup, "XML_BENCH_FORMAT");
        self.event_factory
            .ambient_value(&lookup, "XML_BENCH_EVENT_FACTORY");
        self.input_factory
            .ambient_value(&lookup, "XML_BENCH_INPUT_FACTORY");
        self.output_factory
            .ambient_value(&lookup, "XML_BENCH_OUTPUT_FACTORY");
    }

    pub fn into_options(self) -> Options {
        let Self {
            input,
            trials,
            format,
            list_engines,
            event_factory,
            input_factory,
            output_factory,
        } = self;

        let trials = match trials {
            Some(0) => {
                log::warn!("ignoring a trial count of 0, using {}", DEFAULT_TRIALS);
                DEFAULT_TRIALS
            }
            trials => trials.unwrap_or(DEFAULT_TRIALS),
        };

        let selection = if event_factory.is_some() || input_factory.is_some() || output_factory.is_some()
        {
            let defaults = default_triple();
            Some(EngineTriple {
                event_factory: event_factory.unwrap_or(defaults.event_factory),
                input_factory: input_factory.unwrap_or(defaults.input_factory),
                output_factory: output_factory.unwrap_or(defaults.output_factory),
            })
        } else {
            None
        };

        Options {
            input: PathBuf::from(input.unwrap_or_else(|| DEFAULT_INPUT.to_owned())),
            trials,
            format: format.unwrap_or_default(),
            list_engines,
            selection,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub input: PathBuf,
    pub trials: usize,
    pub format: Format,
    pub list_engines: bool,
    /// Explicit engine; `None` benchmarks every discovered one.
    pub selection: Option<EngineTriple>,
}

impl Options {
    pub fn from_env_and_command_line() -> Self {
        let mut args: Args = argh::from_env();
        args.apply_environment_variables(|name| env::var(name).ok());
        args.into_options()
    }
}

trait AmbientValue {
    fn ambient_value(&mut self, lookup: &dyn Fn(&str) -> Option<String>, env_var_name: &str);
}

impl<T> AmbientValue for Option<T>
where
    T: FromStr,
{
    fn ambient_value(&mut self, lookup: &dyn Fn(&str) -> Option<String>, env_var_name: &str) {
        if self.is_none() {
            if let Some(v) = lookup(env_var_name) {
                *self = v.parse().ok();
                if self.is_none() {
                    log::warn!("ignoring unparsable {}={}", env_var_name, v);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn parse(args: &[&str]) -> Args {
        Args::from_args(&["xml-bench"], args).unwrap()
    }

    fn environment(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let mut args = parse(&[]);
        args.apply_environment_variables(environment(&[]));
        assert_eq!(
            args.into_options(),
            Options {
                input: PathBuf::from("mondial.xml"),
                trials: 100,
                format: Format::Text,
                list_engines: false,
                selection: None,
            }
        );
    }

    #[test]
    fn test_command_line_wins_over_environment() {
        let mut args = parse(&["--trials", "3", "--format", "json"]);
        args.apply_environment_variables(environment(&[
            ("XML_BENCH_TRIALS", "50"),
            ("XML_BENCH_INPUT", "other.xml"),
        ]));
        let options = args.into_options();
        assert_eq!(options.trials, 3);
        assert_eq!(options.format, Format::Json);
        assert_eq!(options.input, PathBuf::from("other.xml"));
    }

    #[test]
    fn test_partial_selection_falls_back_to_builtin() {
        let mut args = parse(&[]);
        args.apply_environment_variables(environment(&[(
            "XML_BENCH_INPUT_FACTORY",
            "xml_bench::engines::quick::QuickXmlInputFactory",
        )]));
        let selection = args.into_options().selection.unwrap();
        assert_eq!(
            selection.input_factory,
            "xml_bench::engines::quick::QuickXmlInputFactory"
        );
        assert_eq!(selection.event_factory, default_triple().event_factory);
        assert_eq!(selection.output_factory, default_triple().output_factory);
    }

    #[test]
    fn test_zero_trials_uses_default() {
        let options = parse(&["-n", "0"]).into_options();
        assert_eq!(options.trials, DEFAULT_TRIALS);
    }

    #[test]
    fn test_invalid_format_rejected() {
        assert!(Args::from_args(&["xml-bench"], &["--format", "yaml"]).is_err());
    }
}
