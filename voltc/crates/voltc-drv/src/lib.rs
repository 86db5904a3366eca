//! voltc-drv - Driver for the Volt compiler front-end.
//!
//! Orchestrates the pipeline: read each input file, lex and parse it, and
//! once every unit is parsed, run the cross-file semantic analyzer. All
//! phases share one diagnostic handler; the driver renders it to stderr
//! when the run finishes, colorized only when stderr is a terminal and
//! `NO_COLOR` is unset.
//!
//! The command-line contract is `voltc <in1> <in2> … -o <out1> <out2> …`:
//! the literal `-o` separates inputs from outputs and the counts must
//! match. Output paths are only validated here; downstream stages own
//! writing them.

use std::path::PathBuf;

use thiserror::Error;
use voltc_lex::Lexer;
use voltc_par::{volt_grammar, CstNode, Grammar, Parser};
use voltc_sem::{Analyzer, SourceUnit};
use voltc_util::Handler;

/// Driver failure; diagnostics carry the per-location details.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("{0}")]
    Usage(String),

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing failed")]
    Parse,

    #[error("semantic analysis failed")]
    Analysis,
}

/// Parsed command line.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub inputs: Vec<PathBuf>,
    pub outputs: Vec<PathBuf>,
}

impl Config {
    /// Parse `<in1> <in2> … -o <out1> <out2> …`.
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Result<Config, DriverError> {
        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        let mut seen_separator = false;

        for arg in args {
            if arg == "-o" {
                if seen_separator {
                    return Err(DriverError::Usage("duplicate '-o' separator".to_string()));
                }
                seen_separator = true;
            } else if seen_separator {
                outputs.push(PathBuf::from(arg));
            } else {
                inputs.push(PathBuf::from(arg));
            }
        }

        if inputs.is_empty() {
            return Err(DriverError::Usage(
                "usage: voltc <inputs..> -o <outputs..>".to_string(),
            ));
        }
        if !seen_separator {
            return Err(DriverError::Usage("missing '-o' separator".to_string()));
        }
        if inputs.len() != outputs.len() {
            return Err(DriverError::Usage(format!(
                "{} input file(s) but {} output file(s)",
                inputs.len(),
                outputs.len()
            )));
        }

        Ok(Config { inputs, outputs })
    }
}

/// One compilation run: configuration, grammar and the shared handler.
pub struct Session {
    config: Config,
    handler: Handler,
    grammar: Grammar,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            handler: Handler::new(),
            grammar: volt_grammar(),
        }
    }

    /// The shared diagnostic sink.
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Read every input file and run the front-end over them.
    pub fn compile(&self) -> Result<(), DriverError> {
        let mut sources = Vec::new();
        for path in &self.config.inputs {
            let text = std::fs::read_to_string(path).map_err(|source| DriverError::Io {
                path: path.clone(),
                source,
            })?;
            sources.push((path.display().to_string(), text));
        }
        self.compile_sources(&sources)
    }

    /// Run the front-end over in-memory `(filename, text)` sources.
    ///
    /// Lexing always completes; a unit whose parse fails is reported and
    /// excluded, and analysis only runs when every unit parsed.
    pub fn compile_sources(&self, sources: &[(String, String)]) -> Result<(), DriverError> {
        log::info!("Compiling {} unit(s)", sources.len());

        let mut parsed: Vec<(CstNode, &str)> = Vec::new();
        let mut parse_failed = false;
        for (name, text) in sources {
            log::debug!("lexing {}", name);
            let tokens = Lexer::new(text, name, &self.handler).tokenize();
            log::debug!("parsing {} ({} tokens)", name, tokens.len());
            match Parser::new(&tokens, &self.grammar, name, &self.handler).parse() {
                Ok(root) => parsed.push((root, name.as_str())),
                Err(_) => parse_failed = true,
            }
        }

        if parse_failed {
            return Err(DriverError::Parse);
        }

        let units: Vec<SourceUnit<'_>> = parsed
            .iter()
            .map(|(root, name)| SourceUnit::new(root, name))
            .collect();
        let mut analyzer = Analyzer::new(&units, &self.handler);
        analyzer.analyze().map_err(|_| DriverError::Analysis)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args<'a>(list: &'a [&'a str]) -> impl Iterator<Item = String> + 'a {
        list.iter().map(|s| s.to_string())
    }

    #[test]
    fn test_config_balanced() {
        let config = Config::from_args(args(&["a.vlt", "b.vlt", "-o", "a.o", "b.o"])).unwrap();
        assert_eq!(config.inputs.len(), 2);
        assert_eq!(config.outputs.len(), 2);
    }

    #[test]
    fn test_config_count_mismatch() {
        let err = Config::from_args(args(&["a.vlt", "b.vlt", "-o", "a.o"])).unwrap_err();
        assert!(matches!(err, DriverError::Usage(_)));
        assert_eq!(err.to_string(), "2 input file(s) but 1 output file(s)");
    }

    #[test]
    fn test_config_missing_separator() {
        let err = Config::from_args(args(&["a.vlt"])).unwrap_err();
        assert_eq!(err.to_string(), "missing '-o' separator");
    }

    #[test]
    fn test_config_no_inputs() {
        let err = Config::from_args(args(&["-o", "a.o"])).unwrap_err();
        assert!(matches!(err, DriverError::Usage(_)));
    }

    #[test]
    fn test_config_duplicate_separator() {
        let err = Config::from_args(args(&["a.vlt", "-o", "a.o", "-o", "b.o"])).unwrap_err();
        assert_eq!(err.to_string(), "duplicate '-o' separator");
    }
}
