use serde::{Deserialize, Serialize};

/// What a member is on the platform for. Stored lowercase in `profiles.goal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    /// Hiring for a role.
    Recruiting,
    /// Looking for a job.
    Searching,
    /// Looking for founders and teams to back.
    Investing,
    /// General networking.
    Other,
}

impl Goal {
    pub const ALL: [Goal; 4] = [Goal::Recruiting, Goal::Searching, Goal::Investing, Goal::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Recruiting => "recruiting",
            Goal::Searching => "searching",
            Goal::Investing => "investing",
            Goal::Other => "other",
        }
    }
}

impl std::fmt::Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Goal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recruiting" => Ok(Goal::Recruiting),
            "searching" => Ok(Goal::Searching),
            "investing" => Ok(Goal::Investing),
            "other" | "networking" => Ok(Goal::Other),
            _ => Err(format!("unknown goal: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stored_and_display_names() {
        for goal in Goal::ALL {
            assert_eq!(goal.as_str().parse::<Goal>().unwrap(), goal);
        }
        assert_eq!("Networking".parse::<Goal>().unwrap(), Goal::Other);
        assert!("dating".parse::<Goal>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Goal::Investing).unwrap(), "\"investing\"");
    }
}
