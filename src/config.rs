use serde::{Deserialize, Serialize};

/// How the third digit of Fx33 (LD B, Vx) gets computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BcdOnes {
    /// `(Vx % 100) / 10`, so 123 is stored as [1, 2, 2]
    Legacy,
    /// `Vx % 10`, so 123 is stored as [1, 2, 3]
    Canonical,
}

impl Default for BcdOnes {
    fn default() -> Self {
        BcdOnes::Legacy
    }
}

/// What happens to I after Fx55 (LD [I], Vx) and Fx65 (LD Vx, [I])
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkIndex {
    /// I := I + x + 1
    Advance,
    /// I := x + 1
    SetToCount,
    /// I is left alone
    Unchanged,
}

impl Default for BulkIndex {
    fn default() -> Self {
        BulkIndex::Advance
    }
}

/// Instruction behaviours where CHIP-8 interpreters disagree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quirks {
    pub bcd_ones: BcdOnes,
    pub bulk_index: BulkIndex,
}

/// Settings for an [`Emulator`](crate::Emulator)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub quirks: Quirks,
    /// Seed for the RND instruction. Taken from OS entropy when absent
    pub rng_seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.quirks.bcd_ones, BcdOnes::Legacy);
        assert_eq!(config.quirks.bulk_index, BulkIndex::Advance);
        assert_eq!(config.rng_seed, None);
    }

    #[test]
    fn from_toml() {
        let config: Config = serdeconv::from_toml_str(
            r#"
rng_seed = 7

[quirks]
bcd_ones = "canonical"
bulk_index = "set_to_count"
"#,
        )
        .unwrap();

        assert_eq!(config.rng_seed, Some(7));
        assert_eq!(config.quirks.bcd_ones, BcdOnes::Canonical);
        assert_eq!(config.quirks.bulk_index, BulkIndex::SetToCount);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = serdeconv::from_toml_str("[quirks]\nbulk_index = \"unchanged\"\n").unwrap();
        assert_eq!(config.quirks.bcd_ones, BcdOnes::Legacy);
        assert_eq!(config.quirks.bulk_index, BulkIndex::Unchanged);
        assert_eq!(config.rng_seed, None);
    }
}
