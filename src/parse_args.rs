use std::path::PathBuf;

const HELP: &str = "\
sargon-vice - Plays Sargon II in the VICE xvic emulator

Talks to xvic over its binary and text remote monitors.

USAGE:
  sargon-vice [OPTIONS] [MOVES...]

MOVES are entered in order, each as from-to (e.g. d2-d4).

OPTIONS:
  -h, --help            Prints help information
  -c, --config <file>   Config file (default: ~/.sargon-vice.toml)
  --host <addr>         Monitor host (default: 127.0.0.1)
  --port <port>         Binary monitor port (default: 6502)
  --text-port <port>    Text monitor port (default: 6510)
  -l, --launch          Start xvic with Sargon II first
  --colour <w|b>        Colour the human plays (default: white)
  --level <0-6>         Sargon's playing level (default: 2)
  -d, --dump            Print the board after each computer move
  -w, --warp            Run the emulator in warp mode
  --save-mem <file>     Save all 64K of memory to <file> when done
  -q, --quit            Quit the emulator when done
  -v, --verbose         Show protocol commands and polls
  -vv, --trace          Show every frame as hex
  --log <file>          Write log output to file instead of stderr
";

/// Verbosity level for log output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Game events, warnings and errors
    #[default]
    Quiet = 0,
    /// Protocol commands, drained events and polls
    Verbose = 1,
    /// Hex dumps of every frame
    Trace = 2,
}

#[derive(Debug)]
pub struct AppArgs {
    pub config: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub text_port: Option<u16>,
    pub launch: bool,
    pub colour: Option<sargon_board::Color>,
    pub level: Option<u32>,
    pub dump: bool,
    pub warp: bool,
    pub save_mem: Option<PathBuf>,
    pub quit: bool,
    pub verbosity: Verbosity,
    pub log_file: Option<String>,
    pub moves: Vec<String>,
}

pub fn parse_args() -> Result<AppArgs, pico_args::Error> {
    let mut pargs = pico_args::Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{}", HELP);
        std::process::exit(0);
    }

    let verbosity = if pargs.contains("--trace") || pargs.contains("-vv") {
        Verbosity::Trace
    } else if pargs.contains(["-v", "--verbose"]) {
        Verbosity::Verbose
    } else {
        Verbosity::Quiet
    };

    let mut args = AppArgs {
        config: pargs.opt_value_from_os_str(["-c", "--config"], |s| {
            Ok::<_, std::convert::Infallible>(PathBuf::from(s))
        })?,
        host: pargs.opt_value_from_str("--host")?,
        port: pargs.opt_value_from_str("--port")?,
        text_port: pargs.opt_value_from_str("--text-port")?,
        launch: pargs.contains(["-l", "--launch"]),
        colour: pargs.opt_value_from_str("--colour")?,
        level: pargs.opt_value_from_str("--level")?,
        dump: pargs.contains(["-d", "--dump"]),
        warp: pargs.contains(["-w", "--warp"]),
        save_mem: pargs.opt_value_from_os_str("--save-mem", |s| {
            Ok::<_, std::convert::Infallible>(PathBuf::from(s))
        })?,
        quit: pargs.contains(["-q", "--quit"]),
        verbosity,
        log_file: pargs.opt_value_from_str("--log")?,
        moves: Vec::new(),
    };

    for free in pargs.finish() {
        let free = free.to_string_lossy().into_owned();
        if free.starts_with('-') {
            eprintln!("Warning: unknown option {} ignored.", free);
        } else {
            args.moves.push(free);
        }
    }

    Ok(args)
}
