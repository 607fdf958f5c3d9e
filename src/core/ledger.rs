use crate::domain::model::{Player, Roster, Team};

/// Roster, per-player goals and the team total for one side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamSheet {
    roster: Roster,
    tally: Vec<u32>,
    aggregate: u32,
}

impl TeamSheet {
    fn new(roster: Roster) -> Self {
        let tally = vec![0; roster.len()];
        Self {
            roster,
            tally,
            aggregate: 0,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn tally(&self) -> &[u32] {
        &self.tally
    }

    pub fn aggregate(&self) -> u32 {
        self.aggregate
    }

    /// Players paired with their goals for this game, in roster order.
    pub fn entries(&self) -> impl Iterator<Item = (&Player, u32)> {
        self.roster.players().iter().zip(self.tally.iter().copied())
    }

    fn slot(&mut self, team: Team, index: usize) -> &mut u32 {
        let len = self.tally.len();
        match self.tally.get_mut(index) {
            Some(slot) => slot,
            None => panic!("player index {index} out of bounds for team {team:?} ({len} players)"),
        }
    }

    fn check(&self, team: Team) {
        debug_assert_eq!(
            self.aggregate,
            self.tally.iter().sum::<u32>(),
            "aggregate drifted from tally for team {team:?}"
        );
        debug_assert_eq!(self.tally.len(), self.roster.len());
    }
}

/// In-memory score state for both teams.
///
/// Every mutation updates the player's tally and the team aggregate together,
/// so `aggregate == sum(tally)` holds after each call. Tallies are unsigned and
/// decrements clamp at zero; increments are unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreLedger {
    team_a: TeamSheet,
    team_b: TeamSheet,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rosters(roster_a: Roster, roster_b: Roster) -> Self {
        let mut ledger = Self::new();
        ledger.load_roster(roster_a, roster_b);
        ledger
    }

    /// Replaces both rosters and zeroes tallies sized to the new lengths.
    /// Previous tallies are discarded, never merged.
    pub fn load_roster(&mut self, roster_a: Roster, roster_b: Roster) {
        self.team_a = TeamSheet::new(roster_a);
        self.team_b = TeamSheet::new(roster_b);
    }

    /// # Panics
    ///
    /// Panics if `index` is outside the team's roster, or if the player's tally
    /// or the team aggregate would overflow. Nothing is written in either case.
    pub fn increment(&mut self, team: Team, index: usize) {
        let sheet = self.sheet_mut(team);
        let goals = sheet.slot(team, index).checked_add(1);
        let aggregate = sheet.aggregate.checked_add(1);
        let (Some(goals), Some(aggregate)) = (goals, aggregate) else {
            panic!("goal count overflow for team {team:?} player {index}");
        };
        *sheet.slot(team, index) = goals;
        sheet.aggregate = aggregate;
        sheet.check(team);
    }

    /// Returns `false` when the tally was already zero and nothing changed.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the team's roster.
    pub fn decrement(&mut self, team: Team, index: usize) -> bool {
        let sheet = self.sheet_mut(team);
        let slot = sheet.slot(team, index);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        sheet.aggregate -= 1;
        sheet.check(team);
        true
    }

    pub fn reset(&mut self) {
        for team in Team::ALL {
            let sheet = self.sheet_mut(team);
            sheet.tally.iter_mut().for_each(|goals| *goals = 0);
            sheet.aggregate = 0;
            sheet.check(team);
        }
    }

    pub fn sheet(&self, team: Team) -> &TeamSheet {
        match team {
            Team::A => &self.team_a,
            Team::B => &self.team_b,
        }
    }

    fn sheet_mut(&mut self, team: Team) -> &mut TeamSheet {
        match team {
            Team::A => &mut self.team_a,
            Team::B => &mut self.team_b,
        }
    }

    pub fn roster(&self, team: Team) -> &Roster {
        self.sheet(team).roster()
    }

    pub fn tally(&self, team: Team) -> &[u32] {
        self.sheet(team).tally()
    }

    pub fn aggregate(&self, team: Team) -> u32 {
        self.sheet(team).aggregate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scenario_ledger() -> ScoreLedger {
        ScoreLedger::with_rosters(
            Roster::from_names(["Rik", "Joe"]),
            Roster::from_names(["Darren"]),
        )
    }

    #[test]
    fn test_increment_scenario() {
        let mut ledger = scenario_ledger();
        ledger.increment(Team::A, 0);
        ledger.increment(Team::A, 0);
        ledger.increment(Team::A, 1);
        for _ in 0..3 {
            ledger.increment(Team::B, 0);
        }

        assert_eq!(ledger.tally(Team::A), &[2, 1]);
        assert_eq!(ledger.aggregate(Team::A), 3);
        assert_eq!(ledger.tally(Team::B), &[3]);
        assert_eq!(ledger.aggregate(Team::B), 3);
    }

    #[test]
    fn test_decrement_clamps_at_zero() {
        let mut ledger = scenario_ledger();
        ledger.increment(Team::A, 0);
        ledger.increment(Team::A, 0);
        ledger.increment(Team::A, 1);

        assert!(ledger.decrement(Team::A, 0));
        assert_eq!(ledger.tally(Team::A), &[1, 1]);
        assert_eq!(ledger.aggregate(Team::A), 2);

        assert!(ledger.decrement(Team::A, 1));
        assert!(!ledger.decrement(Team::A, 1));
        assert_eq!(ledger.tally(Team::A), &[1, 0]);
        assert_eq!(ledger.aggregate(Team::A), 1);
    }

    #[test]
    fn test_decrement_on_zero_is_noop() {
        let mut ledger = scenario_ledger();
        let before = ledger.clone();
        assert!(!ledger.decrement(Team::B, 0));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_increment_has_no_upper_bound() {
        let mut ledger = scenario_ledger();
        for _ in 0..1000 {
            ledger.increment(Team::A, 1);
        }
        assert_eq!(ledger.tally(Team::A), &[0, 1000]);
        assert_eq!(ledger.aggregate(Team::A), 1000);
    }

    #[test]
    fn test_load_roster_resizes_and_discards() {
        let mut ledger = scenario_ledger();
        ledger.increment(Team::A, 0);
        ledger.increment(Team::B, 0);

        ledger.load_roster(
            Roster::from_names(["Pete", "Rik", "Chris", "Cal", "Joe"]),
            Roster::from_names(["Harry", "Louis", "Oli"]),
        );

        assert_eq!(ledger.tally(Team::A), &[0; 5]);
        assert_eq!(ledger.tally(Team::B), &[0; 3]);
        assert_eq!(ledger.aggregate(Team::A), 0);
        assert_eq!(ledger.aggregate(Team::B), 0);
    }

    #[test]
    fn test_reset_preserves_roster_shape() {
        let mut ledger = scenario_ledger();
        ledger.increment(Team::A, 1);
        ledger.increment(Team::B, 0);
        ledger.reset();

        assert_eq!(ledger.tally(Team::A), &[0, 0]);
        assert_eq!(ledger.tally(Team::B), &[0]);
        assert_eq!(ledger.aggregate(Team::A), 0);
        assert_eq!(ledger.roster(Team::A).len(), 2);
    }

    #[test]
    fn test_load_reset_reload_matches_single_load() {
        let a = Roster::from_names(["Rik", "Joe"]);
        let b = Roster::from_names(["Darren"]);

        let mut ledger = ScoreLedger::new();
        ledger.load_roster(a.clone(), b.clone());
        ledger.increment(Team::A, 0);
        ledger.reset();
        ledger.load_roster(a.clone(), b.clone());

        assert_eq!(ledger, ScoreLedger::with_rosters(a, b));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_increment_out_of_bounds_panics() {
        let mut ledger = scenario_ledger();
        ledger.increment(Team::B, 1);
    }

    #[test]
    #[should_panic(expected = "overflow")]
    fn test_increment_overflow_panics() {
        let mut ledger = scenario_ledger();
        ledger.team_b.tally[0] = u32::MAX;
        ledger.team_b.aggregate = u32::MAX;
        ledger.increment(Team::B, 0);
    }

    #[test]
    fn test_overflowing_increment_leaves_sheet_untouched() {
        let mut ledger = scenario_ledger();
        ledger.team_b.tally[0] = u32::MAX;
        ledger.team_b.aggregate = u32::MAX;

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            ledger.increment(Team::B, 0);
        }));

        assert!(result.is_err());
        assert_eq!(ledger.tally(Team::B), &[u32::MAX]);
        assert_eq!(ledger.aggregate(Team::B), u32::MAX);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Inc(Team, usize),
        Dec(Team, usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        let team = prop_oneof![Just(Team::A), Just(Team::B)];
        (any::<bool>(), team, 0usize..4).prop_map(|(up, team, index)| {
            if up {
                Op::Inc(team, index)
            } else {
                Op::Dec(team, index)
            }
        })
    }

    proptest! {
        #[test]
        fn aggregate_tracks_tally(ops in proptest::collection::vec(op(), 0..200)) {
            let mut ledger = ScoreLedger::with_rosters(
                Roster::from_names(["Pete", "Rik", "Chris", "Cal"]),
                Roster::from_names(["Joe", "Harry", "Louis", "Oli"]),
            );
            for op in ops {
                match op {
                    Op::Inc(team, index) => ledger.increment(team, index),
                    Op::Dec(team, index) => {
                        ledger.decrement(team, index);
                    }
                }
                for team in Team::ALL {
                    prop_assert_eq!(
                        ledger.aggregate(team),
                        ledger.tally(team).iter().sum::<u32>()
                    );
                }
            }
        }
    }
}
