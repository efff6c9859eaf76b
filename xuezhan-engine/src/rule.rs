use serde::{Deserialize, Serialize};

use crate::errors::{MahjongError, MahjongResult};

/// Largest accepted `base_point`, penalty or kong charge. Keeps every
/// payment and delta well inside `i64`.
pub const MAX_RULE_VALUE: i64 = 1_000_000;

/// Table-level scoring configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameRule {
    /// Points paid per multiplier unit.
    pub base_point: i64,
    /// Fixed multiple each flowery pig pays every non-pig player.
    pub flowery_pig_penalty: i64,
    /// Upper bound on any single multiplier; `None` is uncapped.
    pub multiplier_cap: Option<u32>,

    /// Multiples of `base_point` collected per paying player.
    pub exposed_kong_charge: i64,
    pub concealed_kong_charge: i64,
    pub upgraded_kong_charge: i64,

    /// Whether flowery pigs also pay the big call as non-tenpai players.
    pub flowery_pig_pays_big_call: bool,
}

impl Default for GameRule {
    fn default() -> Self {
        Self::default_xuezhan()
    }
}

impl GameRule {
    pub fn default_xuezhan() -> Self {
        Self {
            base_point: 1,
            flowery_pig_penalty: 16,
            multiplier_cap: None,

            exposed_kong_charge: 2,
            concealed_kong_charge: 2,
            upgraded_kong_charge: 1,

            flowery_pig_pays_big_call: true,
        }
    }

    /// Common house rule: multipliers top out at 64.
    pub fn default_capped() -> Self {
        Self {
            multiplier_cap: Some(64),
            flowery_pig_penalty: 64,
            ..Self::default_xuezhan()
        }
    }

    /// Applies `multiplier_cap`.
    pub fn cap(&self, multiplier: u32) -> u32 {
        match self.multiplier_cap {
            Some(cap) => multiplier.min(cap),
            None => multiplier,
        }
    }

    /// Rejects negative or oversized amounts.
    pub fn validate(&self) -> MahjongResult<()> {
        let fields = [
            ("base_point", self.base_point),
            ("flowery_pig_penalty", self.flowery_pig_penalty),
            ("exposed_kong_charge", self.exposed_kong_charge),
            ("concealed_kong_charge", self.concealed_kong_charge),
            ("upgraded_kong_charge", self.upgraded_kong_charge),
        ];
        for (name, value) in fields {
            if !(0..=MAX_RULE_VALUE).contains(&value) {
                return Err(MahjongError::invalid_state(format!(
                    "{} = {} outside 0..={}",
                    name, value, MAX_RULE_VALUE
                )));
            }
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> MahjongResult<Self> {
        let rule: Self = serde_json::from_str(json)?;
        rule.validate()?;
        Ok(rule)
    }

    pub fn to_json(&self) -> MahjongResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
