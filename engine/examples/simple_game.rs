use chess_session::{Difficulty, Engine, Game, GameConfig, GameEvent, Side};

fn main() {
    let config = GameConfig {
        difficulty: Difficulty::Hard,
        seed: Some(2024),
        ..GameConfig::default()
    };
    let mut game = Game::new(&config);
    // Stands in for the human at the White pieces.
    let mut stand_in = Engine::with_seed(Difficulty::Medium, 7);

    println!("Starting a new game!");
    println!("\nInitial position:");
    println!("{}", game.board());

    for move_number in 1..=10 {
        if game.is_over() {
            break;
        }
        let Some(mv) = stand_in.choose_move(game.rules()) else {
            println!("No legal moves available!");
            break;
        };

        println!("\nMove {}", move_number);
        match game.propose_move(mv.as_str(), Side::White) {
            Ok(events) => {
                for event in events {
                    match event {
                        GameEvent::Moved { mv, side } => println!("{} plays {}", side, mv),
                        GameEvent::Captured { mv, side, piece } => println!("{} plays {} taking {}", side, mv, piece),
                        other => println!("{:?}", other),
                    }
                }
            }
            Err(rejection) => {
                println!("Rejected {}: {}", mv, rejection);
                break;
            }
        }
        println!("{}", game.board());
        println!("Score: White {} - Black {}", game.scores().white, game.scores().black);
    }

    match game.outcome_message() {
        Some(message) => println!("\n{}", message),
        None => println!("\nGame finished!"),
    }
}
