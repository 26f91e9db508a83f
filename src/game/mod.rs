//! The hidden card game.
//!
//! Entered only through the navigator's easter-egg exit, after the TUI has
//! released the terminal. Plays a pared-down game of durak on plain
//! stdin/stdout: one attack card per round, defender beats with a higher
//! card of the same suit or any trump, refill to six after each round, and
//! the last player holding cards is the durak.

use crossterm::style::Stylize;
use std::io::{self, BufRead, Write};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Card suits, in deck order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suit {
    /// Hearts.
    Hearts,
    /// Diamonds.
    Diamonds,
    /// Spades.
    Spades,
    /// Clubs.
    Clubs,
}

impl Suit {
    const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Spades, Suit::Clubs];

    fn symbol(&self) -> char {
        match self {
            Suit::Hearts => '\u{2665}',
            Suit::Diamonds => '\u{2666}',
            Suit::Spades => '\u{2660}',
            Suit::Clubs => '\u{2663}',
        }
    }
}

/// A single playing card from the 36-card deck (ranks 6 through ace).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    /// The card's suit.
    pub suit: Suit,
    /// Rank 6..=14, where 11..=14 are J, Q, K, A.
    pub rank: u8,
}

impl Card {
    fn face(&self) -> String {
        let rank = match self.rank {
            11 => " J".to_string(),
            12 => " Q".to_string(),
            13 => " K".to_string(),
            14 => " A".to_string(),
            r => format!("{r:>2}"),
        };
        format!("\u{2502}{}{}\u{2502}", self.suit.symbol(), rank)
    }
}

/// Whether `defense` beats `attack` under `trump` rules: higher rank of the
/// same suit, or any trump against a non-trump.
pub fn beats(attack: Card, defense: Card, trump: Suit) -> bool {
    if attack.suit == defense.suit {
        defense.rank > attack.rank
    } else {
        defense.suit == trump
    }
}

/// Build the ordered 36-card deck.
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(36);
    for suit in Suit::ALL {
        for rank in 6..=14 {
            deck.push(Card { suit, rank });
        }
    }
    deck
}

/// Small xorshift generator for shuffling; no cryptographic needs here.
struct Shuffler(u64);

impl Shuffler {
    fn from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x9E37_79B9_7F4A_7C15);
        Self(seed | 1)
    }

    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn shuffle(&mut self, cards: &mut [Card]) {
        for i in (1..cards.len()).rev() {
            let j = (self.next() % (i as u64 + 1)) as usize;
            cards.swap(i, j);
        }
    }
}

struct Player {
    id: usize,
    hand: Vec<Card>,
}

/// Run the game on the line-mode terminal. Returns when a durak is found
/// or the table quits.
pub fn play() -> io::Result<()> {
    info!("starting the card game");
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    writeln!(out)?;
    writeln!(out, "{}", "D U R A K".red().bold())?;
    writeln!(out)?;

    let player_count = match prompt_player_count(&mut input, &mut out)? {
        Some(count) => count,
        None => return Ok(()),
    };

    let mut rng = Shuffler::from_clock();
    let mut deck = full_deck();
    rng.shuffle(&mut deck);
    let trump = deck[0].suit;
    writeln!(
        out,
        "Trump suit: {}",
        format!("{} ", trump.symbol()).yellow()
    )?;

    let mut players: Vec<Player> = (1..=player_count)
        .map(|id| Player {
            id,
            hand: Vec::new(),
        })
        .collect();
    for player in &mut players {
        refill(&mut deck, &mut player.hand);
    }

    let mut attacker = 0usize;
    while players.len() > 1 {
        let defender = (attacker + 1) % players.len();
        writeln!(out)?;
        writeln!(
            out,
            "Player {} attacks player {}.",
            players[attacker].id, players[defender].id
        )?;

        let attack = match pick_card(&mut input, &mut out, &players[attacker], None, trump)? {
            Some(card) => card,
            None => return Ok(()),
        };
        remove_card(&mut players[attacker].hand, attack);
        writeln!(out, "Attack: {}", attack.face())?;

        let defended =
            match pick_card(&mut input, &mut out, &players[defender], Some(attack), trump)? {
                Some(card) => {
                    remove_card(&mut players[defender].hand, card);
                    writeln!(out, "Beaten with {}", card.face())?;
                    true
                }
                None => {
                    writeln!(out, "Player {} takes the card.", players[defender].id)?;
                    players[defender].hand.push(attack);
                    false
                }
            };

        for index in [attacker, defender] {
            let player = &mut players[index];
            refill(&mut deck, &mut player.hand);
        }

        // Pick the next attacker by id while the seats are still stable;
        // indexes shift once empty hands leave the table.
        let next = next_attacker_id(&players, defender, defended);

        let mut departed: Vec<usize> = Vec::new();
        players.retain(|player| {
            let stays = !player.hand.is_empty();
            if !stays {
                departed.push(player.id);
            }
            stays
        });
        for id in departed {
            writeln!(out, "{}", format!("Player {id} is out of cards!").green())?;
        }

        if players.len() <= 1 {
            break;
        }
        attacker = next
            .and_then(|id| players.iter().position(|p| p.id == id))
            .unwrap_or(0);
    }

    match players.first() {
        Some(loser) => writeln!(
            out,
            "{}",
            format!("Player {} is the durak!", loser.id).red().bold()
        )?,
        None => writeln!(out, "{}", "Nobody is the durak. A draw!".green())?,
    }
    Ok(())
}

/// Id of the next attacker: the defender after a successful defense,
/// otherwise the player behind them, skipping anyone about to leave the
/// table with an empty hand.
fn next_attacker_id(players: &[Player], defender: usize, defended: bool) -> Option<usize> {
    let offset = if defended { 0 } else { 1 };
    (0..players.len())
        .map(|step| &players[(defender + offset + step) % players.len()])
        .find(|player| !player.hand.is_empty())
        .map(|player| player.id)
}

fn prompt_player_count(input: &mut impl BufRead, out: &mut impl Write) -> io::Result<Option<usize>> {
    loop {
        write!(out, "{}", "Amount of players (2 - 6 or quit): ".green())?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("quit") {
            return Ok(None);
        }
        if let Ok(count) = trimmed.parse::<usize>() {
            if (2..=6).contains(&count) {
                return Ok(Some(count));
            }
        }
    }
}

/// Show a hand and read a card choice. When `must_beat` is set, only cards
/// that beat it are accepted and an empty answer means "take".
fn pick_card(
    input: &mut impl BufRead,
    out: &mut impl Write,
    player: &Player,
    must_beat: Option<Card>,
    trump: Suit,
) -> io::Result<Option<Card>> {
    writeln!(out, "Player {}'s hand:", player.id)?;
    for (index, card) in player.hand.iter().enumerate() {
        writeln!(out, "  {}: {}", index + 1, card.face())?;
    }
    loop {
        match must_beat {
            Some(card) => write!(
                out,
                "Beat {} (number, Enter to take, quit): ",
                card.face()
            )?,
            None => write!(out, "Card to play (number or quit): ")?,
        }
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("quit") {
            return Ok(None);
        }
        if trimmed.is_empty() && must_beat.is_some() {
            return Ok(None);
        }
        if let Ok(choice) = trimmed.parse::<usize>() {
            if let Some(card) = player.hand.get(choice.wrapping_sub(1)).copied() {
                match must_beat {
                    Some(attack) if !beats(attack, card, trump) => {
                        writeln!(out, "{}", "That card doesn't beat the attack.".yellow())?;
                    }
                    _ => return Ok(Some(card)),
                }
            }
        }
    }
}

fn refill(deck: &mut Vec<Card>, hand: &mut Vec<Card>) {
    while hand.len() < 6 {
        match deck.pop() {
            Some(card) => hand.push(card),
            None => break,
        }
    }
}

fn remove_card(hand: &mut Vec<Card>, card: Card) {
    if let Some(position) = hand.iter().position(|c| *c == card) {
        hand.remove(position);
    }
}
