use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use structopt::StructOpt;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use chordbook::{parse_chords, render_sequence_file, AppError, ClientConfig};
use chordbook_core::{
    auto_starting_fret_with, fretboard_to_svg, lint, parse_sequence, validate, ChordbookError, Fretboard,
    Marker,
};

#[derive(Debug, StructOpt)]
#[structopt(name = "chordbook", about = "Chord diagrams and chord sequences.")]
enum Command {
    #[structopt(name = "render", about = "Render a chord sequence file to SVG.")]
    Render {
        #[structopt(parse(from_os_str), help = "Sequence file (YAML or JSON).")]
        input: PathBuf,

        #[structopt(long = "chords", parse(from_os_str), help = "Chord list used for beat labels.")]
        chords: Option<PathBuf>,

        #[structopt(long = "no-validate", help = "Render even if the sequence is malformed.")]
        no_validate: bool,

        #[structopt(
            short = "o",
            long = "output",
            parse(from_os_str),
            help = "Output file, or stdout if not specified."
        )]
        output: Option<PathBuf>,
    },

    #[structopt(name = "lint", about = "Check a sequence file for structural errors and repeat mistakes.")]
    Lint {
        #[structopt(parse(from_os_str))]
        input: PathBuf,
    },

    #[structopt(name = "fretboard", about = "Draw a chord diagram as SVG.")]
    Fretboard {
        #[structopt(long = "template", help = "Bundled chord shape, e.g. Am.")]
        template: Option<String>,

        #[structopt(long = "markers", help = "Markers as string:fret pairs, e.g. 1:1,2:2,3:2.")]
        markers: Option<MarkerList>,

        #[structopt(long = "start", help = "Saved starting fret; adjusted so every marker shows.")]
        start: Option<u8>,

        #[structopt(short = "o", long = "output", parse(from_os_str))]
        output: Option<PathBuf>,
    },

    #[structopt(name = "window", about = "Print the starting fret the editor would open a chord at.")]
    Window {
        #[structopt(long = "markers")]
        markers: MarkerList,

        #[structopt(long = "start", default_value = "0")]
        start: u8,
    },

    #[structopt(name = "templates", about = "List bundled chord shapes.")]
    Templates {
        #[structopt(help = "Case-insensitive name filter.")]
        query: Option<String>,
    },

    #[structopt(name = "config", about = "Print the effective client configuration.")]
    Config,
}

/// `--markers` value: comma-separated `string:fret` pairs
#[derive(Debug, Clone, PartialEq)]
struct MarkerList(Vec<Marker>);

impl FromStr for MarkerList {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (string, fret) = pair
                    .split_once(':')
                    .ok_or_else(|| format!("expected string:fret, got '{}'", pair))?;
                let string = string.trim().parse().map_err(|_| format!("bad string in '{}'", pair))?;
                let fret = fret.trim().parse().map_err(|_| format!("bad fret in '{}'", pair))?;
                Ok(Marker::new(string, fret))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(MarkerList)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let command = Command::from_args();

    if let Err(e) = run_command(command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_command(command: Command) -> Result<(), AppError> {
    let config = ClientConfig::load_or_default()?;

    match command {
        Command::Render {
            input,
            chords,
            no_validate,
            output,
        } => {
            let chords = match chords {
                Some(path) => parse_chords(&read(&path)?)?,
                None => Vec::new(),
            };
            let svg = render_sequence_file(&input, &chords, !no_validate)?;
            write_output(&svg, output.as_deref())
        }

        Command::Lint { input } => {
            let sequence = parse_sequence(&read(&input)?)?;
            validate(&sequence)?;
            let warnings = lint(&sequence);
            for warning in &warnings {
                println!("measure {}: {}", warning.measure, warning.message);
            }
            eprintln!("{} measures, {} warnings", sequence.len(), warnings.len());
            Ok(())
        }

        Command::Fretboard {
            template,
            markers,
            start,
            output,
        } => {
            let board = match (template, markers) {
                (Some(name), _) => {
                    let template = chordbook_templates::get_template(&name)?
                        .ok_or_else(|| ChordbookError::Template {
                            name: name.clone(),
                            message: "no bundled template with that name".to_string(),
                        })?;
                    Fretboard::for_template(&template)
                }
                (None, Some(MarkerList(markers))) => Fretboard::new(markers),
                (None, None) => Fretboard::default(),
            };
            let saved = start.unwrap_or(board.starting_fret);
            let starting_fret = auto_starting_fret_with(&board.markers, saved, config.fret_count);
            debug!(saved, starting_fret, "placed fret window");
            let svg = fretboard_to_svg(&board.with_window(starting_fret, config.fret_count));
            write_output(&svg, output.as_deref())
        }

        Command::Window {
            markers: MarkerList(markers),
            start,
        } => {
            println!("{}", auto_starting_fret_with(&markers, start, config.fret_count));
            Ok(())
        }

        Command::Templates { query } => {
            let catalog = chordbook_templates::catalog()?;
            for template in catalog.search(query.as_deref().unwrap_or("")) {
                let shape: Vec<String> = template
                    .markers
                    .iter()
                    .map(|m| format!("{}:{}", m.string, m.fret))
                    .collect();
                println!("{:<6} {}", template.name, shape.join(","));
            }
            Ok(())
        }

        Command::Config => {
            let yaml = serde_yaml::to_string(&config).map_err(|e| ChordbookError::Parse(e.to_string()))?;
            print!("{}", yaml);
            Ok(())
        }
    }
}

fn read(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|e| AppError::io(path, e))
}

fn write_output(content: &str, output: Option<&Path>) -> Result<(), AppError> {
    match output {
        Some(path) => {
            fs::write(path, content).map_err(|e| AppError::io(path, e))?;
            eprintln!("Wrote SVG to {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
