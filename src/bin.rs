use clap::Parser;
use crossword_csp::backtracking_search::Solver;
use crossword_csp::grid_config::{render_grid, OwnedGridConfig};
use crossword_csp::word_list::WordList;
use std::fmt::{Debug, Formatter};
use std::fs;

/// crossword-fill: fill a crossword structure with words from a list
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the structure file, with # representing blocks and _ or . representing open squares
    structure_path: String,

    /// Path to the word list, one word per line
    words_path: String,

    /// Print fill statistics after the grid
    #[arg(long)]
    stats: bool,
}

struct Error(String);

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0) // Print error unquoted
    }
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::parse();

    let template = fs::read_to_string(&args.structure_path)
        .map_err(|_| Error(format!("Couldn't read file '{}'", args.structure_path)))?;

    let word_list = WordList::from_file(&args.words_path).map_err(|e| Error(e.to_string()))?;

    for error in &word_list.errors {
        log::warn!("{error}");
    }

    let grid_config =
        OwnedGridConfig::from_template(word_list, &template).map_err(|e| Error(e.to_string()))?;
    let config = grid_config.to_config_ref();

    let mut solver = Solver::new(&config);
    match solver.solve() {
        Ok(result) => {
            println!("{}", render_grid(&config, &result.assignment));
            if args.stats {
                println!("{:#?}", result.statistics);
            }
            Ok(())
        }
        Err(failure) if failure.is_unsatisfiable() => {
            log::info!("{failure}");
            println!("No solution.");
            if args.stats {
                println!("{:#?}", solver.statistics());
            }
            Ok(())
        }
        Err(failure) => Err(Error(failure.to_string())),
    }
}
