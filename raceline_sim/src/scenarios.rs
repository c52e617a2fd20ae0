//! Overlay scenarios for deterministic runs.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// RL-001: Constant speed straight line, baseline sampling rate
    Straight,

    /// RL-002: Tight constant-radius turn, trail bends and stays on screen
    Hairpin,

    /// RL-003: Hard braking to a stop under the speed-delta policy
    Braking,

    /// RL-004: Parked car, degenerate zero velocity everywhere
    Stationary,

    /// RL-005: Render frames with Gaussian timing jitter
    FrameJitter,

    /// RL-006: User clears the trail mid-run
    Reset,

    /// RL-007: Host stops reporting the car for a while
    Blackout,

    /// RL-008: Car leaves a ramp, prediction follows it through the air
    Jump,

    /// RL-009: Vehicle state delivered by a host update hook
    PushFeed,

    /// RL-010: Vehicle state polled at a fixed interval
    PollFeed,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Straight,
            ScenarioId::Hairpin,
            ScenarioId::Braking,
            ScenarioId::Stationary,
            ScenarioId::FrameJitter,
            ScenarioId::Reset,
            ScenarioId::Blackout,
            ScenarioId::Jump,
            ScenarioId::PushFeed,
            ScenarioId::PollFeed,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Straight => "straight",
            ScenarioId::Hairpin => "hairpin",
            ScenarioId::Braking => "braking",
            ScenarioId::Stationary => "stationary",
            ScenarioId::FrameJitter => "frame_jitter",
            ScenarioId::Reset => "reset",
            ScenarioId::Blackout => "blackout",
            ScenarioId::Jump => "jump",
            ScenarioId::PushFeed => "push_feed",
            ScenarioId::PollFeed => "poll_feed",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Straight => {
                "30 m/s straight line, trail sampled at ~30 Hz from 60 Hz frames"
            }
            ScenarioId::Hairpin => {
                "20 m/s on a 25 m radius, trail heading turns through the corner"
            }
            ScenarioId::Braking => "40 m/s to standstill, trail speeds never increase",
            ScenarioId::Stationary => "Zero velocity, no NaN anywhere in the output",
            ScenarioId::FrameJitter => "±6 ms frame jitter, sampling stays time-gated",
            ScenarioId::Reset => "Clear trail at half time, only later samples survive",
            ScenarioId::Blackout => {
                "Vehicle missing for the middle third, trail untouched meanwhile"
            }
            ScenarioId::Jump => "Ramp launch, predicted heights fall back to the ground",
            ScenarioId::PushFeed => {
                "Host hook pushes state; pushes stop mid-run and the state expires"
            }
            ScenarioId::PollFeed => "State polled every 50 ms; failed polls count as missing",
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "straight" | "rl-001" => Ok(ScenarioId::Straight),
            "hairpin" | "rl-002" => Ok(ScenarioId::Hairpin),
            "braking" | "rl-003" => Ok(ScenarioId::Braking),
            "stationary" | "rl-004" => Ok(ScenarioId::Stationary),
            "frame_jitter" | "framejitter" | "jitter" | "rl-005" => Ok(ScenarioId::FrameJitter),
            "reset" | "rl-006" => Ok(ScenarioId::Reset),
            "blackout" | "rl-007" => Ok(ScenarioId::Blackout),
            "jump" | "rl-008" => Ok(ScenarioId::Jump),
            "push_feed" | "pushfeed" | "rl-009" => Ok(ScenarioId::PushFeed),
            "poll_feed" | "pollfeed" | "rl-010" => Ok(ScenarioId::PollFeed),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_parse_back() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.name().parse::<ScenarioId>(), Ok(scenario));
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!("RL-005".parse::<ScenarioId>(), Ok(ScenarioId::FrameJitter));
        assert!("drift".parse::<ScenarioId>().is_err());
    }
}
