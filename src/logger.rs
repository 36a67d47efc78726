//! Log setup: stderr or a file, level from -v flags or RUST_LOG.

use std::fs::File;
use std::io;

use crate::parse_args::Verbosity;

fn level_for(verbosity: Verbosity) -> log::LevelFilter {
    match verbosity {
        Verbosity::Quiet => log::LevelFilter::Info,
        Verbosity::Verbose => log::LevelFilter::Debug,
        Verbosity::Trace => log::LevelFilter::Trace,
    }
}

/// Install the global logger. `RUST_LOG` overrides the -v level.
pub fn init(verbosity: Verbosity, log_file: Option<&str>) -> io::Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level_for(verbosity));
    builder.parse_default_env();
    if let Some(path) = log_file {
        let file = File::create(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
        builder.write_style(env_logger::WriteStyle::Never);
    }
    builder
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(level_for(Verbosity::Quiet), log::LevelFilter::Info);
        assert_eq!(level_for(Verbosity::Verbose), log::LevelFilter::Debug);
        assert_eq!(level_for(Verbosity::Trace), log::LevelFilter::Trace);
    }
}
