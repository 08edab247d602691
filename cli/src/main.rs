use std::io::{self, Read};
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{WrapErr, eyre};
use log::info;
use megaminx_core::facelets::{self, FaceletState, STICKERS_PER_FACE};
use megaminx_core::moves::{format_sequence, parse_sequence};
use megaminx_core::{Face, PieceState, scramble};
use megaminx_solver::Solver;
use owo_colors::OwoColorize;

/// Megaminx state engine and layered solver
#[derive(Parser)]
#[command(version, about)]
enum Commands {
    /// Generate a seeded scramble and print the sequence and the
    /// resulting sticker net
    Scramble {
        /// Number of random moves
        #[arg(long, default_value_t = 70)]
        length: usize,
        /// Seed; the same seed always gives the same scramble
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Solve the state reached by applying a move sequence to a
    /// solved puzzle
    Solve {
        /// Whitespace-separated moves, e.g. "U R2 BL' DFR2'"
        sequence: String,
        /// Reject solutions longer than this many moves
        #[arg(long)]
        max_depth: Option<usize>,
        /// Give up after this many seconds
        #[arg(long, default_value_t = 30)]
        time_budget: u64,
    },
    /// Apply a move sequence to a solved puzzle and print the
    /// sticker net
    Apply {
        /// Whitespace-separated moves
        sequence: String,
    },
    /// Read a sticker net from stdin (12 lines of 11 face names, in
    /// the face order U F R BR BL L DBR DBL DFL DFR DB D) and report
    /// whether it describes a reachable state
    Validate,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    pretty_env_logger::init();
    match Commands::parse() {
        Commands::Scramble { length, seed } => {
            let (state, record) = scramble(length, seed);
            println!("{}", format_sequence(&record));
            print_net(&state);
        }
        Commands::Solve {
            sequence,
            max_depth,
            time_budget,
        } => {
            let moves = parse_sequence(&sequence).wrap_err("invalid scramble sequence")?;
            let state = PieceState::solved().apply_all(&moves);
            let mut solver = Solver::new().with_time_budget(Duration::from_secs(time_budget));
            if let Some(max_depth) = max_depth {
                solver = solver.with_max_depth(max_depth);
            }
            let solution = solver.solve(&state)?;
            info!("solution verified: {}", state.apply_all(&solution).is_solved());
            println!("{}", format_sequence(&solution));
            eprintln!("{} moves", solution.len().bold());
        }
        Commands::Apply { sequence } => {
            let moves = parse_sequence(&sequence).wrap_err("invalid move sequence")?;
            print_net(&PieceState::solved().apply_all(&moves));
        }
        Commands::Validate => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .wrap_err("could not read the sticker net from stdin")?;
            let net = parse_net(&input)?;
            match facelets::reconstruct(&net) {
                Ok(_) => println!("{}", "reachable".green()),
                Err(reason) => {
                    println!("{}: {reason}", "unreachable".red());
                    std::process::exit(1);
                }
            }
        }
    }
    Ok(())
}

fn parse_face(token: &str) -> color_eyre::Result<Face> {
    Face::ALL
        .into_iter()
        .find(|face| face.name() == token)
        .ok_or_else(|| eyre!("unknown face name {token:?}"))
}

fn parse_net(input: &str) -> color_eyre::Result<FaceletState> {
    let lines: Vec<&str> = input.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() != 12 {
        return Err(eyre!("expected 12 lines of stickers, got {}", lines.len()));
    }
    let mut grid = [[Face::U; STICKERS_PER_FACE]; 12];
    for (face, line) in lines.iter().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != STICKERS_PER_FACE {
            return Err(eyre!(
                "face {} needs {STICKERS_PER_FACE} stickers, got {}",
                Face::from_index(face as u8).unwrap(),
                tokens.len()
            ));
        }
        for (i, token) in tokens.iter().enumerate() {
            grid[face][i] = parse_face(token)?;
        }
    }
    Ok(FaceletState(grid))
}

fn rgb(face: Face) -> (u8, u8, u8) {
    let hex = face.color_hex();
    let channel = |i: usize| u8::from_str_radix(&hex[1 + 2 * i..3 + 2 * i], 16).unwrap_or(0);
    (channel(0), channel(1), channel(2))
}

fn print_net(state: &PieceState) {
    let FaceletState(grid) = facelets::project(state);
    for face in Face::ALL {
        print!("{:>4} ", face.name());
        for color in grid[face.index()] {
            let (r, g, b) = rgb(color);
            print!("{} ", color.name().truecolor(r, g, b));
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_split_into_channels() {
        assert_eq!(rgb(Face::U), (0xFF, 0xFF, 0xFF));
        assert_eq!(rgb(Face::F), (0x00, 0x00, 0xFF));
        assert_eq!(rgb(Face::DBR), (0xA0, 0x52, 0x2D));
    }

    #[test]
    fn a_solved_net_parses_and_reconstructs() {
        let input: String = Face::ALL
            .iter()
            .map(|f| vec![f.name(); STICKERS_PER_FACE].join(" "))
            .collect::<Vec<_>>()
            .join("\n");
        let net = parse_net(&input).unwrap();
        assert!(facelets::reconstruct(&net).unwrap().is_solved());
    }
}
