use std::env;
use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "https://fantasy.premierleague.com/api";
const DEFAULT_OUTPUT_DIR: &str = "data";
const MAX_WINDOW: usize = 38;

/// How repeated (player, gameweek) entries are treated by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Keep every entry and report the anomaly. Double gameweeks land here.
    KeepAll,
    /// Abort the run on the first repeated gameweek.
    Reject,
}

impl DuplicatePolicy {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "keep_all" | "keep-all" | "keep" => Some(DuplicatePolicy::KeepAll),
            "reject" | "error" => Some(DuplicatePolicy::Reject),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SummaryConfig {
    pub alpha: f64,
    pub recent_short: usize,
    pub recent_long: usize,
    pub points_threshold: i32,
    pub duplicate_policy: DuplicatePolicy,
    pub fetch_parallelism: usize,
    pub fetch_retries: u32,
    pub api_base: String,
    pub output_dir: PathBuf,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            recent_short: 4,
            recent_long: 8,
            points_threshold: 3,
            duplicate_policy: DuplicatePolicy::KeepAll,
            fetch_parallelism: 6,
            fetch_retries: 2,
            api_base: DEFAULT_API_BASE.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl SummaryConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let alpha = env_parse::<f64>("FPL_ALPHA")
            .filter(|v| v.is_finite())
            .unwrap_or(defaults.alpha)
            .clamp(0.0, 2.0);
        let recent_short = env_parse::<usize>("FPL_RECENT_SHORT")
            .unwrap_or(defaults.recent_short)
            .clamp(1, MAX_WINDOW);
        let recent_long = env_parse::<usize>("FPL_RECENT_LONG")
            .unwrap_or(defaults.recent_long)
            .clamp(1, MAX_WINDOW)
            .max(recent_short);
        let points_threshold =
            env_parse::<i32>("FPL_POINTS_THRESHOLD").unwrap_or(defaults.points_threshold);
        let duplicate_policy = env::var("FPL_DUPLICATE_POLICY")
            .ok()
            .and_then(|raw| DuplicatePolicy::parse(&raw))
            .unwrap_or(defaults.duplicate_policy);
        let fetch_parallelism = env_parse::<usize>("FETCH_PARALLELISM")
            .unwrap_or(defaults.fetch_parallelism)
            .clamp(2, 32);
        let fetch_retries = env_parse::<u32>("FETCH_RETRIES")
            .unwrap_or(defaults.fetch_retries)
            .clamp(0, 5);
        let api_base = env::var("FPL_API_BASE")
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_base);
        let output_dir = env::var("FPL_OUTPUT_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        Self {
            alpha,
            recent_short,
            recent_long,
            points_threshold,
            duplicate_policy,
            fetch_parallelism,
            fetch_retries,
            api_base,
            output_dir,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|val| val.trim().parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_published_table() {
        let cfg = SummaryConfig::default();
        assert_eq!(cfg.alpha, 0.1);
        assert_eq!(cfg.recent_short, 4);
        assert_eq!(cfg.recent_long, 8);
        assert_eq!(cfg.points_threshold, 3);
        assert_eq!(cfg.duplicate_policy, DuplicatePolicy::KeepAll);
    }

    #[test]
    fn duplicate_policy_parses_aliases() {
        assert_eq!(DuplicatePolicy::parse(" Reject "), Some(DuplicatePolicy::Reject));
        assert_eq!(DuplicatePolicy::parse("keep-all"), Some(DuplicatePolicy::KeepAll));
        assert_eq!(DuplicatePolicy::parse("latest"), None);
    }
}
