//! Scenario modes and their composition into instruction blocks.
//!
//! Modes are independent tags. Any subset can be active; composition emits
//! one block per active mode in a fixed precedence order so the same set
//! always produces the same guidance.

use echoroom_common::ModeFlags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Emergency,
    Crazy,
    FakeNews,
}

/// Order in which active modes are emitted.
pub const PRECEDENCE: [Mode; 3] = [Mode::Emergency, Mode::Crazy, Mode::FakeNews];

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Emergency => "EMERGENCY MODE",
            Mode::Crazy => "UNHINGED REPORTER MODE",
            Mode::FakeNews => "FAKE NEWS MODE",
        }
    }
}

/// Set of active modes. Insertion order is not remembered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeSet {
    active: [bool; PRECEDENCE.len()],
}

impl ModeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_flags(flags: &ModeFlags) -> Self {
        let mut set = Self::new();
        if flags.emergency_mode {
            set.insert(Mode::Emergency);
        }
        if flags.crazy_mode {
            set.insert(Mode::Crazy);
        }
        if flags.fake_news {
            set.insert(Mode::FakeNews);
        }
        set
    }

    pub fn with(mut self, mode: Mode) -> Self {
        self.insert(mode);
        self
    }

    pub fn insert(&mut self, mode: Mode) {
        self.active[slot(mode)] = true;
    }

    pub fn contains(&self, mode: Mode) -> bool {
        self.active[slot(mode)]
    }

    pub fn is_empty(&self) -> bool {
        !self.active.iter().any(|a| *a)
    }

    /// Active modes in precedence order.
    pub fn iter(&self) -> impl Iterator<Item = Mode> + '_ {
        PRECEDENCE.into_iter().filter(|m| self.contains(*m))
    }
}

impl FromIterator<Mode> for ModeSet {
    fn from_iter<I: IntoIterator<Item = Mode>>(iter: I) -> Self {
        let mut set = Self::new();
        for mode in iter {
            set.insert(mode);
        }
        set
    }
}

fn slot(mode: Mode) -> usize {
    PRECEDENCE
        .iter()
        .position(|m| *m == mode)
        .unwrap_or_default()
}

/// One block of mode guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeInstruction {
    Normal,
    Scenario(Mode),
}

impl ModeInstruction {
    pub fn label(&self) -> &'static str {
        match self {
            ModeInstruction::Normal => "NORMAL MODE",
            ModeInstruction::Scenario(mode) => mode.label(),
        }
    }

    /// How the public perceives the author under this mode.
    pub fn framing(&self) -> &'static str {
        match self {
            ModeInstruction::Normal => {
                "The author is an ordinary working journalist. Reactions are realistic and mixed: \
                 some readers agree, some push back, most react in proportion to how much the story \
                 affects them."
            }
            ModeInstruction::Scenario(Mode::Emergency) => {
                "The article is breaking emergency news and the author is treated as an urgent, \
                 credible source. Readers panic, share safety information, demand government \
                 action and spread unverified rumours alongside the facts."
            }
            ModeInstruction::Scenario(Mode::Crazy) => {
                "The public believes the reporter has completely lost it. Readers mock the \
                 writing, turn quotes into memes, worry about the reporter's wellbeing and tag \
                 the outlet demanding an explanation."
            }
            ModeInstruction::Scenario(Mode::FakeNews) => {
                "The article is fabricated and sharp-eyed readers notice. Comments fact-check \
                 claims, accuse the author of spreading fake news, demand a correction, while a \
                 gullible minority shares it anyway. Reliability must be scored low."
            }
        }
    }

    /// How market indicators should skew under this mode.
    pub fn market_bias(&self) -> &'static str {
        match self {
            ModeInstruction::Normal => {
                "Index moves are modest and proportionate to the story's economic relevance; \
                 unrelated stories barely move the market."
            }
            ModeInstruction::Scenario(Mode::Emergency) => {
                "High volatility: a sharp sell-off in risk assets, safe havens rally, and sectors \
                 tied to the emergency swing hardest."
            }
            ModeInstruction::Scenario(Mode::Crazy) => {
                "Erratic, meme-driven swings with little fundamental basis; small caps named in \
                 the chaos spike and crash within the session."
            }
            ModeInstruction::Scenario(Mode::FakeNews) => {
                "A knee-jerk move on the headline followed by a reversal once the story is \
                 debunked; net change stays small."
            }
        }
    }

    pub fn render(&self) -> String {
        format!(
            "[{}]\nPublic perception: {}\nMarket reaction: {}",
            self.label(),
            self.framing(),
            self.market_bias()
        )
    }
}

/// Compose the instruction blocks for a mode set.
///
/// One block per active mode in precedence order; the normal block alone when
/// nothing is active. Blocks are additive and meant to be blended.
pub fn compose(modes: &ModeSet) -> Vec<ModeInstruction> {
    let blocks: Vec<ModeInstruction> = modes.iter().map(ModeInstruction::Scenario).collect();
    if blocks.is_empty() {
        vec![ModeInstruction::Normal]
    } else {
        blocks
    }
}
