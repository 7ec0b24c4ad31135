//! Cache key builders.
//!
//! Keys carry the category prefix that selects their default lifetime.

use super::policy::{FANTASY_PREFIX, MATCHES_PREFIX, PLAYERS_PREFIX};

pub fn live_matches() -> String {
    format!("{MATCHES_PREFIX}live")
}

pub fn match_details(match_id: &str) -> String {
    format!("{MATCHES_PREFIX}details_{match_id}")
}

pub fn season_fixtures(season_id: &str) -> String {
    format!("{MATCHES_PREFIX}season_{season_id}")
}

pub fn player(player_id: &str) -> String {
    format!("{PLAYERS_PREFIX}{player_id}")
}

pub fn fantasy_points(match_id: &str) -> String {
    format!("{FANTASY_PREFIX}points_{match_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_prefixed() {
        assert_eq!(live_matches(), "matches_live");
        assert_eq!(match_details("m1"), "matches_details_m1");
        assert_eq!(season_fixtures("ipl"), "matches_season_ipl");
        assert_eq!(player("p9"), "players_p9");
        assert_eq!(fantasy_points("m1"), "fantasy_points_m1");
    }
}
