//! delve demo front end.
//!
//! ```text
//! delve [seed] [keys]    replay a key string and print the final map
//! delve play [seed]      play interactively in the terminal
//! ```
//!
//! Keys: `w a s d` move, space waits, `0` toggles the fog, `q` quits.

use std::io::{self, Write};

use crossterm::{
    cursor,
    event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    terminal::{self, ClearType},
};

use delve_core::Direction;
use delve_lib::{Command, Session, SessionConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("play") => {
            let seed = parse_seed(args.get(1))?;
            play(Session::new(SessionConfig::with_seed(seed))?)
        }
        _ => {
            let seed = parse_seed(args.first())?;
            let keys = args.get(1).map(String::as_str).unwrap_or("");
            replay(Session::new(SessionConfig::with_seed(seed))?, keys);
            Ok(())
        }
    }
}

fn parse_seed(arg: Option<&String>) -> Result<u64, std::num::ParseIntError> {
    arg.map_or(Ok(0), |s| s.parse())
}

fn status(session: &Session) -> String {
    let mut line = format!(
        "turn {}  health {}/{}  keys {}/{}",
        session.turn(),
        session.health(),
        session.config().max_health,
        session.keys_found(),
        session.config().key_count
    );
    if let Some(outcome) = session.outcome() {
        line.push_str(&format!("  [{outcome:?}]"));
    }
    line
}

fn replay(mut session: Session, keys: &str) {
    for cmd in keys.chars().filter_map(Command::from_key) {
        for ev in session.apply(cmd) {
            log::info!("turn {}: {ev:?}", session.turn());
        }
    }
    print!("{}", session.view());
    println!("{}", status(&session));
    for entry in session.journal().recent(5) {
        println!("{entry}");
    }
}

fn play(mut session: Session) -> Result<(), Box<dyn std::error::Error>> {
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::Clear(ClearType::All)
    )?;

    let result = run(&mut session, &mut stdout);

    execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn run(session: &mut Session, stdout: &mut io::Stdout) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        draw(session, stdout)?;
        let TermEvent::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        else {
            continue;
        };
        match code {
            KeyCode::Esc | KeyCode::Char('q') => return Ok(()),
            KeyCode::Char(c) => {
                if let Some(cmd) = Command::from_key(c) {
                    session.apply(cmd);
                }
            }
            KeyCode::Up => {
                session.apply(Command::Move(Direction::North));
            }
            KeyCode::Down => {
                session.apply(Command::Move(Direction::South));
            }
            KeyCode::Left => {
                session.apply(Command::Move(Direction::West));
            }
            KeyCode::Right => {
                session.apply(Command::Move(Direction::East));
            }
            _ => {}
        }
    }
}

fn draw(session: &Session, stdout: &mut io::Stdout) -> io::Result<()> {
    queue!(stdout, terminal::Clear(ClearType::All))?;
    let view = session.view();
    let mut y = 0u16;
    for line in view.lines() {
        queue!(stdout, cursor::MoveTo(0, y))?;
        write!(stdout, "{line}")?;
        y += 1;
    }
    queue!(stdout, cursor::MoveTo(0, y))?;
    write!(stdout, "{}", status(session))?;
    for entry in session.journal().recent(3) {
        y += 1;
        queue!(stdout, cursor::MoveTo(0, y))?;
        write!(stdout, "{entry}")?;
    }
    stdout.flush()
}
