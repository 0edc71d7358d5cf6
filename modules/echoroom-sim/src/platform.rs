//! Render-time classification of free-form platform labels.

use echoroom_common::Comment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformFamily {
    IntegratedSocial,
    FemaleCommunity,
    MaleCommunity,
    AnonymousBoard,
    NewsPortal,
    /// Print, broadcast, BBS and early-web channels.
    Legacy,
    Other,
}

// Checked in this order; the first family with a matching pattern wins.
const PATTERNS: &[(PlatformFamily, &[&str])] = &[
    (
        PlatformFamily::Legacy,
        &[
            "letters to the editor",
            "newspaper",
            "radio",
            "television",
            "tv street",
            "neighborhood",
            "hitel",
            "chollian",
            "nownuri",
            "unitel",
            "cyworld",
            "agora",
            "knowledge in",
            "daum cafe",
            "freechal",
        ],
    ),
    (
        PlatformFamily::AnonymousBoard,
        &["blind", "everytime", "anonymous", "블라인드", "에브리타임"],
    ),
    (
        PlatformFamily::FemaleCommunity,
        &["theqoo", "더쿠", "nate pann", "네이트판", "instiz", "인스티즈"],
    ),
    (
        PlatformFamily::MaleCommunity,
        &["fm korea", "fmkorea", "에펨", "dc inside", "dcinside", "디시", "ppomppu", "뽐뿌"],
    ),
    (
        PlatformFamily::IntegratedSocial,
        &["twitter", "x (", "instagram", "threads", "youtube", "facebook", "tiktok", "트위터"],
    ),
    (
        PlatformFamily::NewsPortal,
        &["naver", "daum", "news", "네이버", "다음"],
    ),
];

/// Classify a platform label by case-insensitive pattern match.
pub fn classify(label: &str) -> PlatformFamily {
    let lower = label.trim().to_lowercase();
    if lower == "x" {
        return PlatformFamily::IntegratedSocial;
    }
    PATTERNS
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|p| lower.contains(p)))
        .map(|(family, _)| *family)
        .unwrap_or(PlatformFamily::Other)
}

/// Which comments are currently displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlatformFilter {
    #[default]
    All,
    Family(PlatformFamily),
}

impl PlatformFilter {
    pub fn matches(&self, comment: &Comment) -> bool {
        match self {
            PlatformFilter::All => true,
            PlatformFilter::Family(family) => classify(&comment.platform) == *family,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::era::EraBracket;

    #[test]
    fn classifies_contemporary_exemplars_by_role() {
        let cases = [
            ("X (Twitter)", PlatformFamily::IntegratedSocial),
            ("Instagram", PlatformFamily::IntegratedSocial),
            ("x", PlatformFamily::IntegratedSocial),
            ("theqoo", PlatformFamily::FemaleCommunity),
            ("Nate Pann", PlatformFamily::FemaleCommunity),
            ("FM Korea", PlatformFamily::MaleCommunity),
            ("DC Inside gallery", PlatformFamily::MaleCommunity),
            ("Blind", PlatformFamily::AnonymousBoard),
            ("Naver News", PlatformFamily::NewsPortal),
            ("Daum News", PlatformFamily::NewsPortal),
            ("HoloForum", PlatformFamily::Other),
        ];
        for (label, expected) in cases {
            assert_eq!(classify(label), expected, "{label}");
        }
    }

    #[test]
    fn older_era_channels_are_legacy() {
        for bracket in [
            EraBracket::PrintBroadcast,
            EraBracket::TextTerminal,
            EraBracket::EarlySocial,
        ] {
            for group in bracket.platforms() {
                for name in group.names {
                    assert_eq!(classify(name), PlatformFamily::Legacy, "{name}");
                }
            }
        }
    }

    #[test]
    fn every_contemporary_exemplar_is_recognised() {
        for group in EraBracket::Contemporary.platforms() {
            for name in group.names {
                assert_ne!(classify(name), PlatformFamily::Other, "{name}");
                assert_ne!(classify(name), PlatformFamily::Legacy, "{name}");
            }
        }
    }

    #[test]
    fn filter_matches_by_family() {
        let comment = crate::testing::comment("theqoo", "u", "c");
        assert!(PlatformFilter::All.matches(&comment));
        assert!(PlatformFilter::Family(PlatformFamily::FemaleCommunity).matches(&comment));
        assert!(!PlatformFilter::Family(PlatformFamily::MaleCommunity).matches(&comment));
    }
}
