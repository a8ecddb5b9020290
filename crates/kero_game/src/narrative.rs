//! Scripted death lines and dialogue layout.
//!
//! Lines are authored pre-wrapped for an 18-column text box, padded with
//! spaces, so laying them out is plain chunking. Hyphenation is part of the
//! text.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DIALOGUE_COLUMNS: usize = 18;
pub const DIALOGUE_ROWS: usize = 6;

pub const DEATH_LINES: [&str; 28] = [
    "Ribbit. Guess I   croaked for real  that time.",
    "Note to self:     spikes hurt more  than they look.",
    "Good thing I'm    not on an N-Gage  - I'd need a new  battery by now.",
    "One small hop for frog, one giant   leap into fail-   ure.",
    "Put that one on   my highlight reel - the blooper     edition.",
    "If Madeline can   do it a thousand  times, so can I.  Ribbit.",
    "I'd say 'call for help,' but my     N-Gage has no     signal.",
    "Death count: too  high. Pride: stillintact.",
    "Respawn faster    than an N-Gage    Arena match       disconnects.",
    "Pro tip: Don't do what I just did.",
    "At least when I   dash into spikes, I don't have to   listen to a moti- vational speech first.",
    "Guess I just      Madelined myself  into the spikes   again. Classic.",
    "Climbing my way   to the afterlife  - one dumb jump   ata time.",
    "Next time I'll    bring a moti-     vational sound-   track like        Madeline. Might help.",
    "If Madeline can   face her demons, Ican face...       whatever just     impaled me.",
    "Maybe I should've stuck to straw-   berries instead   of pain.",
    "Bad jump. Worse   landing.          10/10 Celeste tri-bute though.",
    "Hey Madeline! Saveme a spot on the  death counter!",
    "I'd call for help,but my inner      demon's on        vacation.",
    "Frog fact: unlike mountains, spikes always win.",
    "Like a Nokia brick- unbreakable? Nottoday.",
    "Should've brought my Celeste        climbing gloves.",
    "Better luck next  leap, Frogger 2003edition.",
    "This is where I   leapt... and this is where I        flopped.",
    "This is where I   sticked the land- ing -just kidding.",
    "This was where I  ribbited. This waswhere I regretted it.",
    "This was where I  went full ninja.  And full pancake.",
    "This was where I  thought Frogger   physics still     applied.",
];

/// Whose face is drawn next to the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Portrait {
    Kero,
    KeroMasked,
    Sign,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialogue {
    pub text: String,
    pub portrait: Portrait,
}

impl Dialogue {
    pub fn new(text: impl Into<String>, portrait: Portrait) -> Self {
        Self {
            text: text.into(),
            portrait,
        }
    }

    /// Text split into rows of at most [`DIALOGUE_COLUMNS`] characters.
    /// Rows past [`DIALOGUE_ROWS`] are dropped.
    pub fn rows(&self) -> Vec<String> {
        let chars: Vec<char> = self
            .text
            .chars()
            .map(|c| if (' '..='~').contains(&c) { c } else { ' ' })
            .collect();
        chars
            .chunks(DIALOGUE_COLUMNS)
            .take(DIALOGUE_ROWS)
            .map(|row| row.iter().collect::<String>().trim_end().to_string())
            .collect()
    }
}

/// Picks death lines from a seeded generator so a replay sees the same text.
pub struct DeathLines {
    rng: StdRng,
    last: Option<usize>,
}

impl DeathLines {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            last: None,
        }
    }

    /// Next line, never the same one twice in a row.
    pub fn pick(&mut self) -> (usize, &'static str) {
        let index = match self.last {
            None => self.rng.gen_range(0..DEATH_LINES.len()),
            Some(last) => {
                let index = self.rng.gen_range(0..DEATH_LINES.len() - 1);
                if index >= last {
                    index + 1
                } else {
                    index
                }
            }
        };
        self.last = Some(index);
        (index, DEATH_LINES[index])
    }
}
