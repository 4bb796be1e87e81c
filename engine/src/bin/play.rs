use anyhow::Result;
use chess_session::{
    format_clock, Difficulty, Game, GameConfig, GameError, GameEvent, GameMode, GameStorage, Side,
};
use clap::Parser;
use log::info;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON config file; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Computer difficulty: 1 (easy), 2 (medium) or 3 (hard)
    #[arg(short, long)]
    difficulty: Option<String>,

    /// Two humans share the board instead of playing the computer
    #[arg(long)]
    human_vs_human: bool,

    /// Play Black against the computer
    #[arg(long)]
    black: bool,

    /// Save file path
    #[arg(long)]
    save_path: Option<PathBuf>,

    /// Seed for the computer's random choices
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn into_config(self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::from_file(path)?,
            None => GameConfig::default(),
        };
        if let Some(token) = &self.difficulty {
            config.difficulty = Difficulty::from_token(token)?;
        }
        if self.human_vs_human {
            config.human_vs_human = true;
        }
        if self.black {
            config.human_side = Side::Black;
        }
        if let Some(path) = self.save_path {
            config.save_path = path;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

fn print_board(game: &Game) {
    println!("\n{}", game.board());
    println!(
        "White {} (score {})   Black {} (score {})",
        format_clock(game.timers().remaining(Side::White)),
        game.scores().white,
        format_clock(game.timers().remaining(Side::Black)),
        game.scores().black,
    );
    if let Some(message) = game.outcome_message() {
        println!("{}", message);
        println!("Type 'new' to start a new game");
    } else {
        println!("{} to move", game.side_to_move());
    }
}

fn announce(events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::Moved { mv, side } => println!("{} played {}", side, mv),
            GameEvent::Captured { mv, side, piece } => println!("{} played {} capturing {}", side, mv, piece),
            GameEvent::Check { side } => println!("CHECK: {} is in check", side),
            GameEvent::Checkmate { winner } => println!("CHECKMATE: {} wins", winner),
            GameEvent::Stalemate => println!("STALEMATE"),
            GameEvent::Timeout { winner } => println!("TIME: {} wins on time", winner),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = Args::parse().into_config()?;
    let storage = GameStorage::new(&config.save_path);
    let mut game = Game::new(&config);
    let opening = game.new_game(game.mode());
    announce(&opening);

    println!("Chess");
    println!("Enter moves like e2e4 or e7e8q. Commands: new, mode, difficulty, hints <square>, moves, save, load, json, quit");

    let mut last_tick = Instant::now();
    loop {
        print_board(&game);
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        // Time spent thinking is charged to whoever was on move.
        let elapsed = last_tick.elapsed().as_secs_f64();
        last_tick = Instant::now();
        if let Some(event) = game.tick(elapsed) {
            announce(&[event]);
        }

        let mut words = input.split_whitespace();
        match words.next() {
            None => continue,
            Some("quit") | Some("exit") => break,
            Some("new") => announce(&game.new_game(game.mode())),
            Some("mode") => {
                let events = game.toggle_mode();
                println!(
                    "{}",
                    match game.mode() {
                        GameMode::HumanVsHuman => "Mode: human vs human",
                        GameMode::HumanVsComputer => "Mode: human vs computer",
                    }
                );
                announce(&events);
            }
            Some("difficulty") => println!("Difficulty: {}", game.cycle_difficulty()),
            Some("hints") => match words.next() {
                Some(square) => {
                    let hints: Vec<String> = game.valid_moves_from(square).iter().map(|m| m.to_string()).collect();
                    println!("{}", hints.join(" "));
                }
                None => println!("usage: hints <square>"),
            },
            Some("moves") => {
                let history: Vec<String> = game.move_history().iter().map(|m| m.to_string()).collect();
                println!("{}", history.join(" "));
            }
            Some("save") => match game.save_to(&storage) {
                Ok(()) => println!("Game saved successfully"),
                Err(e) => println!("Error saving game: {}", e),
            },
            Some("load") => match game.load_from(&storage) {
                Ok(events) => {
                    println!("Game loaded successfully");
                    announce(&events);
                }
                Err(GameError::NothingToLoad(_)) => println!("No saved game found"),
                Err(e) => println!("Error loading game: {}", e),
            },
            Some("json") => println!("{}", serde_json::to_string_pretty(&game.snapshot())?),
            Some(token) => {
                let side = game.side_to_move();
                match game.propose_move(token, side) {
                    Ok(events) => announce(&events),
                    Err(rejection) => {
                        info!("rejected {}: {}", token, rejection);
                        println!("Invalid move: {}", rejection);
                    }
                }
            }
        }
    }

    Ok(())
}
