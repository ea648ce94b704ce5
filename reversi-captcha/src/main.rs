use reversi_captcha::{CaptchaConfig, CaptchaError, ChallengeHandle};
use reversi_engine::{Board, Point, RenderData, Stone};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;

const HELP: &str = "Commands: <row> <col> | pass | reset | show | json | quit";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reversi_captcha=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match CaptchaConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", CaptchaError::from(e));
            std::process::exit(2);
        }
    };
    tracing::info!(
        "Starting challenge (opponent delay {:?}, success delay {:?})",
        config.timings.opponent_delay,
        config.timings.success_delay
    );

    let (verified_tx, mut verified) = oneshot::channel();
    let handle = ChallengeHandle::from_config(&config, move || {
        let _ = verified_tx.send(());
    });
    let mut updates = handle.subscribe();

    println!("Lose this game of reversi to prove you are human.");
    println!("{HELP}");
    print_challenge(&updates.borrow_and_update());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Ok(()) = &mut verified => {
                println!("Verified. Welcome, human.");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                print_challenge(&updates.borrow_and_update());
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if !handle_line(&handle, &line).await {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Failed to read stdin: {e}");
                    break;
                }
            },
        }
    }

    if let Err(e) = handle.dismiss().await {
        tracing::debug!("Dismiss on exit failed: {e}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Place(Point),
    Pass,
    Reset,
    Show,
    Json,
    Help,
    Quit,
}

impl std::str::FromStr for Input {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = s.split_whitespace().collect();
        match words.as_slice() {
            ["pass" | "p"] => Ok(Input::Pass),
            ["reset" | "restart"] => Ok(Input::Reset),
            ["show" | "s"] | [] => Ok(Input::Show),
            ["json"] => Ok(Input::Json),
            ["help" | "h" | "?"] => Ok(Input::Help),
            ["quit" | "q" | "exit"] => Ok(Input::Quit),
            [row, col] => {
                let row = row.parse().map_err(|_| format!("Bad row: {row}"))?;
                let col = col.parse().map_err(|_| format!("Bad column: {col}"))?;
                Ok(Input::Place((row, col)))
            }
            _ => Err(format!("Unknown command: {s}")),
        }
    }
}

/// Returns false once the session should end.
async fn handle_line(handle: &ChallengeHandle, line: &str) -> bool {
    let input = match line.parse::<Input>() {
        Ok(input) => input,
        Err(e) => {
            println!("{e}. {HELP}");
            return true;
        }
    };

    // Successful actions show up through the update stream.
    let result = match input {
        Input::Place(point) => handle.place_stone(point).await.map(drop),
        Input::Pass => handle.pass().await.map(drop),
        Input::Reset => handle.reset().await.map(drop),
        Input::Show => handle.render().await.map(|data| print_challenge(&data)),
        Input::Json => handle.render().await.map(|data| {
            match serde_json::to_string_pretty(&data) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::error!("Failed to serialize render data: {e}"),
            }
        }),
        Input::Help => {
            println!("{HELP}");
            Ok(())
        }
        Input::Quit => return false,
    };

    match result {
        Ok(()) => true,
        Err(CaptchaError::Rejected(e)) => {
            println!("Not allowed: {e}");
            true
        }
        Err(e) => {
            tracing::error!("{e}");
            false
        }
    }
}

fn print_challenge(data: &RenderData) {
    if let Some(board) = Board::from_cells(&data.board) {
        print!("\n{board}");
    }
    println!(
        "You ({}): {}  AI ({}): {}",
        Stone::Player.symbol(),
        data.counts.player,
        Stone::Opponent.symbol(),
        data.counts.opponent
    );
    println!("{}", data.status_text);
    if data.pass_available {
        println!("No moves available: type `pass`.");
    }
    if data.can_restart {
        println!("Type `reset` to try again.");
    }
}
