use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

/// Overrides the log filter, e.g. `DOC_TRANSLATOR_LOG=doc_translator_rust=trace`.
pub const LOG_ENV: &str = "DOC_TRANSLATOR_LOG";
const VERBOSE_FILTER: &str = "doc_translator_rust=debug,warn";

/// Logs to stderr when `--verbose` is given or `DOC_TRANSLATOR_LOG` is set.
/// stdout stays reserved for the output path or translated text.
pub fn init(verbose: bool) -> Result<()> {
    let Some(filter) = filter(std::env::var(LOG_ENV).ok(), verbose)? else {
        return Ok(());
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
}

fn filter(directives: Option<String>, verbose: bool) -> Result<Option<EnvFilter>> {
    match directives.filter(|value| !value.trim().is_empty()) {
        Some(directives) => Ok(Some(EnvFilter::try_new(directives)?)),
        None if verbose => Ok(Some(EnvFilter::try_new(VERBOSE_FILTER)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_without_flag_or_env() {
        assert!(filter(None, false).unwrap().is_none());
        assert!(filter(Some("  ".to_string()), false).unwrap().is_none());
    }

    #[test]
    fn verbose_enables_crate_debug() {
        let filter = filter(None, true).unwrap().expect("filter");
        assert!(filter.to_string().contains("doc_translator_rust=debug"));
    }

    #[test]
    fn env_directives_win_over_verbose() {
        let filter = filter(Some("doc_translator_rust=trace".to_string()), true)
            .unwrap()
            .expect("filter");
        assert!(filter.to_string().contains("doc_translator_rust=trace"));
    }

    #[test]
    fn invalid_directives_are_rejected() {
        assert!(filter(Some("doc_translator_rust=loud".to_string()), false).is_err());
    }
}
