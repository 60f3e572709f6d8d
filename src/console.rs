//! Line-oriented terminal driver.
//!
//! Reads commands from stdin, waits out scheduled tickets, forwards link
//! events, and prints the view after every change. Holds no game logic.

use crate::games::twist::{BLOCK_COUNT, End, Symbol};
use crate::net::{ConnectionStatus, LinkEvent, LinkEvents};
use crate::session::{Notice, Session, Ticket, View};
use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

/// How the game is played, shown on first run and on `?`.
pub const RULES: &str = "\
TwistTacToe
  Ten hidden blocks hold five X and five O. Player 1 reveals from the
  front of the row, player 2 from the back. Reveal a block, then place
  the symbol it shows on any empty cell. Either symbol can win for
  whoever completes the line. The game is drawn when the board fills or
  the blocks run out.
  In the arrangement variant each player first hides two X and two O in
  the half of the row the opponent will reveal from.";

const HELP: &str = "\
Commands:
  f / b        reveal from the front / back
  p <1-9>      place the revealed symbol
  s <1-4>      select a pool entry (arrangement)
  c <0-9>      commit the selection to a block (arrangement)
  r            restart
  j <step>     jump to a turn (local play; 0 restarts)
  ?            rules    h  help    q  quit";

/// Why the console stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The player quit or closed stdin.
    Quit,
    /// The peer link gave up.
    LinkFailed,
}

/// A parsed command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Reveal from an end.
    Reveal(End),
    /// Place on a 0-based cell.
    Place(usize),
    /// Select a 0-based pool entry.
    Select(usize),
    /// Commit to a block slot.
    Commit(usize),
    /// New game.
    Restart,
    /// View a turn record.
    Jump(usize),
    /// Print the rules.
    Rules,
    /// Print the commands.
    Help,
    /// Leave.
    Quit,
}

/// Parses one command line. Cells and pool entries are typed 1-based.
pub fn parse_input(line: &str) -> Option<Input> {
    let mut words = line.split_whitespace();
    let command = words.next()?.to_ascii_lowercase();
    let number = words.next().and_then(|word| word.parse::<usize>().ok());
    if words.next().is_some() {
        return None;
    }
    let one_based = |n: Option<usize>| n.and_then(|n| n.checked_sub(1));
    match (command.as_str(), number) {
        ("f" | "front", None) => Some(Input::Reveal(End::Front)),
        ("b" | "back", None) => Some(Input::Reveal(End::Back)),
        ("p" | "place", n) => one_based(n).map(Input::Place),
        ("s" | "select", n) => one_based(n).map(Input::Select),
        ("c" | "commit", Some(n)) => Some(Input::Commit(n)),
        ("r" | "restart", None) => Some(Input::Restart),
        ("j" | "jump", Some(n)) => Some(Input::Jump(n)),
        ("?" | "rules", None) => Some(Input::Rules),
        ("h" | "help", None) => Some(Input::Help),
        ("q" | "quit", None) => Some(Input::Quit),
        _ => None,
    }
}

/// Renders a view as plain text.
pub fn render(view: &View) -> String {
    let mut out = String::new();

    let blocks: Vec<String> = (0..BLOCK_COUNT)
        .map(|index| {
            let shown = view
                .revealed_blocks()
                .iter()
                .chain(view.arranged_slots())
                .find(|(slot, _)| *slot == index)
                .map(|(_, symbol)| symbol_char(*symbol))
                .unwrap_or('#');
            let marker = if index == *view.front_index() && *view.remaining() > 0 {
                '>'
            } else if Some(index) == *view.back_index() && *view.remaining() > 0 {
                '<'
            } else {
                ' '
            };
            format!("{}{}", marker, shown)
        })
        .collect();
    out.push_str(&format!("Blocks {}\n", blocks.join("")));
    out.push_str("       ");
    out.push_str(&(0..BLOCK_COUNT).map(|i| format!(" {}", i)).collect::<String>());
    out.push_str("\n\n");
    out.push_str(&view.board().display());
    out.push('\n');

    if let (Some(end), Some((front_pool, back_pool))) = (view.arranging(), view.pools()) {
        let pool = match end {
            End::Front => front_pool,
            End::Back => back_pool,
        };
        let entries: Vec<String> = pool
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let mark = if *view.staged() == Some(i) { "*" } else { "" };
                format!("{}:{}{}", i + 1, entry.map_or('-', symbol_char), mark)
            })
            .collect();
        out.push_str(&format!("Pool ({}) {}\n", end, entries.join(" ")));
    }
    if let Some(symbol) = view.pending() {
        out.push_str(&format!("Revealed: {}\n", symbol));
    }
    out.push_str(&format!("Turn {}/{}\n", view.step(), view.history_len() - 1));
    if let Some(code) = view.room_code() {
        out.push_str(&format!(
            "Room {}  host {} - {} guest\n",
            code,
            view.host_wins(),
            view.guest_wins()
        ));
    }
    out.push_str(view.status());
    out
}

fn symbol_char(symbol: Symbol) -> char {
    match symbol {
        Symbol::X => 'X',
        Symbol::O => 'O',
    }
}

/// Drives a session until the player quits or the link fails.
#[instrument(skip_all, fields(mode = %session.mode()))]
pub async fn run(mut session: Session, mut link: Option<LinkEvents>) -> Result<Exit> {
    info!("Console started");
    let (ticket_tx, mut ticket_rx) = mpsc::unbounded_channel::<Ticket>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}\n", HELP);
    refresh(&mut session, &ticket_tx);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_input(&line) {
                    Some(Input::Quit) => break,
                    Some(Input::Help) => {
                        println!("{}", HELP);
                        continue;
                    }
                    Some(Input::Rules) => {
                        println!("{}", RULES);
                        continue;
                    }
                    Some(input) => apply(&mut session, input),
                    None => {
                        println!("Unknown command; type h for help");
                        continue;
                    }
                }
            }
            Some(ticket) = ticket_rx.recv() => session.fire(ticket),
            event = next_event(&mut link) => match event {
                Some(LinkEvent::Status(status)) => session.on_connection(status),
                Some(LinkEvent::Message(message)) => {
                    // Rejected messages are logged by the session.
                    let _ = session.on_message(message);
                }
                None => {
                    debug!("Link closed");
                    link = None;
                }
            },
        }
        refresh(&mut session, &ticket_tx);
        if let Some(ConnectionStatus::Failed { .. }) = session.connection() {
            info!("Console stopped: link failed");
            return Ok(Exit::LinkFailed);
        }
    }
    info!("Console stopped");
    Ok(Exit::Quit)
}

fn apply(session: &mut Session, input: Input) {
    let outcome = match input {
        Input::Reveal(end) => session.reveal(end).map(|_| ()),
        Input::Place(cell) => session.place(cell).map(|_| ()),
        Input::Select(index) => session.select_pool(index).map(|_| ()),
        Input::Commit(index) => session.commit_block(index).map(|_| ()),
        Input::Restart => session.restart(),
        Input::Jump(step) => session.jump_to(step),
        Input::Rules | Input::Help | Input::Quit => Ok(()),
    };
    if let Err(rejection) = outcome {
        println!("  {}", rejection);
    }
}

/// Hands new tickets to sleeping tasks, prints notices and the view.
fn refresh(session: &mut Session, tickets: &mpsc::UnboundedSender<Ticket>) {
    for ticket in session.take_scheduled() {
        let tickets = tickets.clone();
        tokio::spawn(async move {
            tokio::time::sleep(ticket.delay()).await;
            let _ = tickets.send(ticket);
        });
    }
    for notice in session.drain_notices() {
        match notice {
            Notice::Celebration { winner } => println!("*** {} completes a line! ***", winner),
            Notice::Connection(message) => println!("!! {}", message),
        }
    }
    println!("\n{}\n", render(&session.view()));
}

async fn next_event(link: &mut Option<LinkEvents>) -> Option<LinkEvent> {
    match link {
        Some(link) => link.recv().await,
        None => std::future::pending().await,
    }
}
