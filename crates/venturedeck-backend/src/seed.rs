//! Demo data served by the mock backend.

use serde_json::json;

use crate::record::{into_fields, Record};

/// Id of the fixed demo user.
pub const DEMO_USER_ID: &str = "u_demo";

/// Email of the fixed demo user.
pub const DEMO_USER_EMAIL: &str = "demo@venturedeck.dev";

/// Display name of the fixed demo user.
pub const DEMO_DISPLAY_NAME: &str = "Demo Founder";

/// Static token carried by the mock session.
pub const DEMO_TOKEN: &str = "mock-session-token";

/// Startups shown on the investor swipe deck and the innovator dashboard.
pub fn demo_startups() -> Vec<Record> {
    vec![
        Record::new(
            "s_demo_1",
            into_fields(json!({
                "title": "Solarloop",
                "tagline": "Peer-to-peer rooftop energy trading",
                "stage": "seed",
                "sector": "climate",
                "ask_usd": 750_000,
                "team_size": 4
            })),
        ),
        Record::new(
            "s_demo_2",
            into_fields(json!({
                "title": "Docket",
                "tagline": "Case management for small law firms",
                "stage": "pre-seed",
                "sector": "legaltech",
                "ask_usd": 250_000,
                "team_size": 2
            })),
        ),
        Record::new(
            "s_demo_3",
            into_fields(json!({
                "title": "Harvest Hub",
                "tagline": "Cold-chain logistics for smallholder farms",
                "stage": "series-a",
                "sector": "agtech",
                "ask_usd": 3_000_000,
                "team_size": 11
            })),
        ),
    ]
}

/// Profile record of the fixed demo user.
pub fn demo_profile() -> Record {
    Record::new(
        DEMO_USER_ID,
        into_fields(json!({
            "display_name": DEMO_DISPLAY_NAME,
            "email": DEMO_USER_EMAIL,
            "bio": "Building things people swipe right on.",
            "location": "Remote",
            "skills": ["product", "go-to-market"]
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_demo_startup_ids_unique() {
        let startups = demo_startups();
        let ids: HashSet<_> = startups.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), startups.len());
    }

    #[test]
    fn test_demo_profile_matches_user() {
        let profile = demo_profile();
        assert_eq!(profile.id, DEMO_USER_ID);
        assert_eq!(profile.get_str("email"), Some(DEMO_USER_EMAIL));
    }
}
