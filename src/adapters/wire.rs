use crate::domain::model::{GameMeta, Roster, RosterLoadResult, Team};
use serde::{Deserialize, Serialize};

/// Combined roster payload. Every field is required:
/// `{ teamA: [[string]], teamB: [[string]], date, colourA, colourB }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedPayload {
    #[serde(rename = "teamA")]
    pub team_a: Vec<Vec<String>>,
    #[serde(rename = "teamB")]
    pub team_b: Vec<Vec<String>>,
    pub date: String,
    #[serde(rename = "colourA")]
    pub colour_a: String,
    #[serde(rename = "colourB")]
    pub colour_b: String,
}

impl From<CombinedPayload> for RosterLoadResult {
    fn from(payload: CombinedPayload) -> Self {
        RosterLoadResult {
            roster_a: Roster::from_rows(&payload.team_a),
            roster_b: Roster::from_rows(&payload.team_b),
            meta: GameMeta {
                date: payload.date,
                colour_a: payload.colour_a,
                colour_b: payload.colour_b,
            },
        }
    }
}

/// Object form of a legacy per-team endpoint: `{ teamA|teamB, date, colourA|colourB }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamSheetPayload {
    #[serde(rename = "teamA", default)]
    pub team_a: Vec<Vec<String>>,
    #[serde(rename = "teamB", default)]
    pub team_b: Vec<Vec<String>>,
    pub date: String,
    #[serde(rename = "colourA", default)]
    pub colour_a: String,
    #[serde(rename = "colourB", default)]
    pub colour_b: String,
}

/// What a legacy per-team endpoint may return: bare sheet rows, or the
/// object form carrying the game date and colour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TeamPayload {
    Rows(Vec<Vec<String>>),
    Sheet(TeamSheetPayload),
}

/// One team's share of a split load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamPart {
    pub roster: Roster,
    pub date: Option<String>,
    pub colour: String,
}

impl TeamPayload {
    pub fn into_part(self, team: Team) -> TeamPart {
        match self {
            TeamPayload::Rows(rows) => TeamPart {
                roster: Roster::from_rows(&rows),
                date: None,
                colour: String::new(),
            },
            TeamPayload::Sheet(sheet) => {
                let (rows, colour) = match team {
                    Team::A => (sheet.team_a, sheet.colour_a),
                    Team::B => (sheet.team_b, sheet.colour_b),
                };
                TeamPart {
                    roster: Roster::from_rows(&rows),
                    date: Some(sheet.date).filter(|date| !date.trim().is_empty()),
                    colour,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScoresBody {
    #[serde(rename = "scoreTeamA")]
    pub score_team_a: u32,
    #[serde(rename = "scoreTeamB")]
    pub score_team_b: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerGoalsBody {
    pub goals: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_combined_payload() {
        let json = r#"{
            "teamA": [["Rik"], ["Joe", "captain"]],
            "teamB": [["Darren"]],
            "date": "2023-10-04",
            "colourA": "ff0000",
            "colourB": "00ff00"
        }"#;

        let loaded: RosterLoadResult =
            serde_json::from_str::<CombinedPayload>(json).unwrap().into();

        assert_eq!(loaded.roster_a, Roster::from_names(["Rik", "Joe"]));
        assert_eq!(loaded.roster_b, Roster::from_names(["Darren"]));
        assert_eq!(loaded.meta.date, "2023-10-04");
        assert_eq!(loaded.meta.colour_b, "00ff00");
    }

    #[test]
    fn test_combined_payload_requires_every_field() {
        let missing_date = r#"{ "teamA": [["Rik"]], "teamB": [], "colourA": "", "colourB": "" }"#;
        assert!(serde_json::from_str::<CombinedPayload>(missing_date).is_err());

        let missing_team = r#"{ "teamA": [["Rik"]], "date": "2023-10-04", "colourA": "", "colourB": "" }"#;
        assert!(serde_json::from_str::<CombinedPayload>(missing_team).is_err());

        let only_date = r#"{ "date": "2023-10-04" }"#;
        assert!(serde_json::from_str::<CombinedPayload>(only_date).is_err());
    }

    #[test]
    fn test_team_payload_accepts_bare_rows() {
        let payload: TeamPayload = serde_json::from_str(r#"[["Rik"], ["Joe"]]"#).unwrap();
        let part = payload.into_part(Team::A);

        assert_eq!(part.roster, Roster::from_names(["Rik", "Joe"]));
        assert_eq!(part.date, None);
        assert_eq!(part.colour, "");
    }

    #[test]
    fn test_team_payload_object_form() {
        let json = r#"{ "teamB": [["Darren"]], "date": "2023-10-04", "colourB": "blue" }"#;
        let part = serde_json::from_str::<TeamPayload>(json)
            .unwrap()
            .into_part(Team::B);

        assert_eq!(part.roster, Roster::from_names(["Darren"]));
        assert_eq!(part.date.as_deref(), Some("2023-10-04"));
        assert_eq!(part.colour, "blue");
    }

    #[test]
    fn test_score_body_field_names() {
        let body = serde_json::to_value(TeamScoresBody {
            score_team_a: 3,
            score_team_b: 1,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"scoreTeamA": 3, "scoreTeamB": 1}));
    }
}
