use crate::types::GameRecord;
use regex::Regex;

pub const DEFAULT_MAX_RATING: u32 = 1500;

/// Lichess engine-evaluation comment annotation, e.g. `{ [%eval 0.17] }`.
/// Exposed as a configurable pattern because dumps from other sources may
/// mark analysis differently.
pub const DEFAULT_EVAL_MARKER: &str = r"\[%eval ";

#[derive(Debug, Clone)]
pub struct FilterCriteria {
    /// Exclusive upper bound applied to both players' ratings.
    pub max_rating: u32,
    pub require_eval: bool,
    pub eval_marker: Regex,
}

impl FilterCriteria {
    pub fn new(
        max_rating: u32,
        require_eval: bool,
        eval_marker: &str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            max_rating,
            require_eval,
            eval_marker: Regex::new(eval_marker)?,
        })
    }
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            max_rating: DEFAULT_MAX_RATING,
            require_eval: true,
            eval_marker: Regex::new(DEFAULT_EVAL_MARKER).unwrap(),
        }
    }
}

/// Pure inclusion predicate: both ratings strictly below the cap and, when
/// required, at least one eval annotation in the body. A missing or
/// unparsable rating never matches.
pub fn matches(record: &GameRecord, criteria: &FilterCriteria) -> bool {
    let (Some(white), Some(black)) = (record.white_elo, record.black_elo) else {
        return false;
    };
    if white >= criteria.max_rating || black >= criteria.max_rating {
        return false;
    }
    !criteria.require_eval || criteria.eval_marker.is_match(&record.movetext)
}
