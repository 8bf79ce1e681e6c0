use std::env;
use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use algo::ui::picker::{self, PickerOutcome, PickerState};
use algo::ui::theme::{BuiltinPalette, Palette, Theme};
use algo::ui::theme_loader::PaletteResolver;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const SAMPLE_ITEMS: [&str; 6] = [
    "binary search",
    "breadth-first search",
    "depth-first search",
    "dijkstra",
    "merge sort",
    "quick sort",
];

fn print_help() {
    println!("algo {} - themeable terminal list picker", VERSION);
    println!();
    println!("USAGE:");
    println!("    algo [OPTIONS] [ITEMS...]");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help              Print help information");
    println!("    -v, --version           Print version information");
    println!("    -t, --theme <NAME>      Palette: default, rose-pine, or any other name to read theme.conf");
    println!("    --config-dir <DIR>      Read <DIR>/algo/theme.conf instead of the user config dir");
    println!("    --list-themes           List built-in palettes");
    println!("    --print-palette         Print the resolved palette in theme.conf syntax");
    println!("    --json                  With --print-palette, print JSON instead");
    println!("    --render-test           Draw the picker off-screen and print it");
    println!();
    println!("Items are read from stdin when none are given and stdin is not a terminal.");
}

#[derive(Default)]
struct Options {
    theme: String,
    config_dir: Option<PathBuf>,
    list_themes: bool,
    print_palette: bool,
    json: bool,
    render_test: bool,
    items: Vec<String>,
}

enum Command {
    Run(Options),
    Exit,
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut opts = Options::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                return Ok(Command::Exit);
            }
            "-v" | "--version" => {
                println!("algo {}", VERSION);
                return Ok(Command::Exit);
            }
            "-t" | "--theme" => {
                opts.theme = iter
                    .next()
                    .ok_or_else(|| format!("{} requires a theme name", arg))?
                    .clone();
            }
            "--config-dir" => {
                let dir = iter
                    .next()
                    .ok_or_else(|| "--config-dir requires a directory".to_string())?;
                opts.config_dir = Some(PathBuf::from(dir));
            }
            "--list-themes" => opts.list_themes = true,
            "--print-palette" => opts.print_palette = true,
            "--json" => opts.json = true,
            "--render-test" => opts.render_test = true,
            other if other.starts_with('-') && other.len() > 1 => {
                return Err(format!("Unknown option: {}", other));
            }
            item => opts.items.push(item.to_string()),
        }
    }
    Ok(Command::Run(opts))
}

fn read_items(opts: &Options) -> io::Result<Vec<String>> {
    if !opts.items.is_empty() {
        return Ok(opts.items.clone());
    }

    let stdin = io::stdin();
    if !stdin.is_terminal() {
        let mut items = Vec::new();
        for line in stdin.lock().lines() {
            let line = line?;
            if !line.trim().is_empty() {
                items.push(line);
            }
        }
        if !items.is_empty() {
            return Ok(items);
        }
    }

    Ok(SAMPLE_ITEMS.iter().map(|s| s.to_string()).collect())
}

fn print_palette(palette: &Palette, json: bool) -> io::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(palette)?);
    } else {
        print!("{}", palette.to_conf());
    }
    Ok(())
}

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let opts = match parse_args(&args) {
        Ok(Command::Run(opts)) => opts,
        Ok(Command::Exit) => return Ok(()),
        Err(msg) => {
            eprintln!("Error: {}", msg);
            eprintln!("Use --help for usage information");
            std::process::exit(2);
        }
    };

    if opts.list_themes {
        for builtin in BuiltinPalette::ALL {
            println!("{}", builtin.name());
        }
        return Ok(());
    }

    let resolver = match &opts.config_dir {
        Some(dir) => PaletteResolver::with_config_dir(dir),
        None => PaletteResolver::new(),
    };
    let palette = resolver.resolve(&opts.theme);

    if opts.print_palette {
        return print_palette(&palette, opts.json);
    }

    let theme = Theme::build(&palette);
    let mut state = PickerState::new(read_items(&opts)?);

    if opts.render_test {
        for line in picker::render_to_lines(&mut state, &theme, 60, 16)? {
            println!("{}", line);
        }
        return Ok(());
    }

    // The picker draws on stderr so stdout stays free for the chosen item
    let result = {
        let _guard = TerminalGuard::enter()?;
        run_picker(&mut state, &theme)
    };

    match result {
        Ok(PickerOutcome::Accepted(item)) => println!("{}", item),
        Ok(_) => std::process::exit(1),
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Raw mode plus alternate screen; both are undone on drop, whatever the exit path
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard;
        let mut stderr = io::stderr();
        execute!(stderr, EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = restore_screen(&mut io::stderr());
    }
}

fn restore_screen<W: io::Write>(out: &mut W) -> io::Result<()> {
    execute!(out, LeaveAlternateScreen, crossterm::cursor::Show)
}

fn run_picker(state: &mut PickerState, theme: &Theme) -> io::Result<PickerOutcome> {
    let backend = CrosstermBackend::new(io::stderr());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    run_app(&mut terminal, state, theme)
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    state: &mut PickerState,
    theme: &Theme,
) -> io::Result<PickerOutcome> {
    loop {
        terminal.draw(|f| {
            let area = f.area();
            picker::draw(f, state, area, theme);
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match state.handle_key(key) {
                PickerOutcome::Pending => {}
                outcome => return Ok(outcome),
            }
        }
    }
}
