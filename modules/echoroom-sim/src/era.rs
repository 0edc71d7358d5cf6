//! Era context: which tone and which platforms fit the simulated year.

/// Years past `current + FUTURE_HORIZON` are treated as speculative future.
pub const FUTURE_HORIZON: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EraBracket {
    /// Before 1990: newspapers, radio, television. Nothing online.
    PrintBroadcast,
    /// 1990-1999: dial-up PC-communication bulletin boards.
    TextTerminal,
    /// 2000-2009: the early social web.
    EarlySocial,
    /// Everything not covered by another bracket.
    Contemporary,
    /// Beyond the near-future horizon.
    Future,
}

/// A family of platforms with its canonical names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformGroup {
    pub role: &'static str,
    pub names: &'static [&'static str],
}

const PRINT_BROADCAST: &[PlatformGroup] = &[
    PlatformGroup {
        role: "newspaper letters to the editor",
        names: &["Letters to the Editor"],
    },
    PlatformGroup {
        role: "radio call-in programme",
        names: &["Radio Call-in"],
    },
    PlatformGroup {
        role: "television street interview",
        names: &["TV Street Interview"],
    },
    PlatformGroup {
        role: "word of mouth at the market or barbershop",
        names: &["Neighborhood Talk"],
    },
];

const TEXT_TERMINAL: &[PlatformGroup] = &[PlatformGroup {
    role: "PC-communication bulletin board",
    names: &["Hitel", "Chollian", "Nownuri", "Unitel"],
}];

const EARLY_SOCIAL: &[PlatformGroup] = &[
    PlatformGroup {
        role: "personal mini-homepage",
        names: &["Cyworld"],
    },
    PlatformGroup {
        role: "portal discussion forum",
        names: &["Daum Agora", "Naver Knowledge iN"],
    },
    PlatformGroup {
        role: "online café community",
        names: &["Daum Cafe", "Freechal"],
    },
];

const CONTEMPORARY: &[PlatformGroup] = &[
    PlatformGroup {
        role: "integrated social network",
        names: &["X (Twitter)", "Instagram", "Threads", "YouTube"],
    },
    PlatformGroup {
        role: "female-skewed community",
        names: &["theqoo", "Nate Pann", "Instiz"],
    },
    PlatformGroup {
        role: "male-skewed community",
        names: &["FM Korea", "DC Inside", "Ppomppu"],
    },
    PlatformGroup {
        role: "anonymous workplace board",
        names: &["Blind", "Everytime"],
    },
    PlatformGroup {
        role: "news portal comment section",
        names: &["Naver News", "Daum News"],
    },
];

const FUTURE: &[PlatformGroup] = &[
    PlatformGroup {
        role: "neural feed",
        names: &["NeuroLink Feed"],
    },
    PlatformGroup {
        role: "holographic town square",
        names: &["HoloForum"],
    },
    PlatformGroup {
        role: "off-world colony network",
        names: &["Orbital Commons"],
    },
];

impl EraBracket {
    /// Bracket for `year`. Total over all years; `current_year` anchors the
    /// future horizon.
    pub fn for_year(year: i32, current_year: i32) -> Self {
        match year {
            y if y < 1990 => EraBracket::PrintBroadcast,
            1990..=1999 => EraBracket::TextTerminal,
            2000..=2009 => EraBracket::EarlySocial,
            y if y > current_year.saturating_add(FUTURE_HORIZON) => EraBracket::Future,
            _ => EraBracket::Contemporary,
        }
    }

    pub fn tone(&self) -> &'static str {
        match self {
            EraBracket::PrintBroadcast => {
                "Formal, measured print and broadcast register. Reactions are letters, call-ins and \
                 interviews; people write in full sentences with period-appropriate idioms and no \
                 internet slang whatsoever."
            }
            EraBracket::TextTerminal => {
                "Dial-up bulletin-board idiom: terse text-terminal posts, handle-based usernames, \
                 early chat abbreviations, excitement about being online."
            }
            EraBracket::EarlySocial => {
                "Early social-web idiom: emoticons, mini-homepage moods, heated forum debates, \
                 exaggerated punctuation, early meme phrases."
            }
            EraBracket::Contemporary => {
                "Contemporary online idiom: fast, meme-heavy, ironic, with each community keeping \
                 its own slang and political lean."
            }
            EraBracket::Future => {
                "Speculative future idiom: invented slang, references to technologies and \
                 institutions that do not exist yet, but still recognisably human emotions."
            }
        }
    }

    pub fn platforms(&self) -> &'static [PlatformGroup] {
        match self {
            EraBracket::PrintBroadcast => PRINT_BROADCAST,
            EraBracket::TextTerminal => TEXT_TERMINAL,
            EraBracket::EarlySocial => EARLY_SOCIAL,
            EraBracket::Contemporary => CONTEMPORARY,
            EraBracket::Future => FUTURE,
        }
    }

    pub fn all() -> [EraBracket; 5] {
        [
            EraBracket::PrintBroadcast,
            EraBracket::TextTerminal,
            EraBracket::EarlySocial,
            EraBracket::Contemporary,
            EraBracket::Future,
        ]
    }
}

/// Resolved tone and platform vocabulary for one simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EraContext {
    pub year: i32,
    pub bracket: EraBracket,
    pub time_travel: bool,
}

impl EraContext {
    /// Resolve the era for an effective year. Without time travel the
    /// contemporary profile is always used.
    pub fn resolve(year: i32, time_travel: bool, current_year: i32) -> Self {
        let bracket = if time_travel {
            EraBracket::for_year(year, current_year)
        } else {
            EraBracket::Contemporary
        };
        Self {
            year,
            bracket,
            time_travel,
        }
    }

    pub fn platform_names(&self) -> Vec<&'static str> {
        self.bracket
            .platforms()
            .iter()
            .flat_map(|g| g.names.iter().copied())
            .collect()
    }

    /// The era section of the guidance text.
    pub fn framing(&self) -> String {
        let platforms = self
            .bracket
            .platforms()
            .iter()
            .map(|g| format!("- {}: {}", g.role, g.names.join(", ")))
            .collect::<Vec<_>>()
            .join("\n");

        let setting = if self.time_travel {
            format!(
                "TIME MACHINE ACTIVE: this article is published in the year {year}. Vocabulary, \
                 prices, technology and cultural references must all belong to {year}; never \
                 mention anything that did not exist yet.",
                year = self.year
            )
        } else {
            format!("SETTING: the present day ({}).", self.year)
        };

        format!(
            "{setting}\n\nTONE: {tone}\n\nREACTION CHANNELS (use these names for the `platform` field):\n{platforms}",
            tone = self.bracket.tone(),
        )
    }
}
