use crate::error::{PoolError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// PoolConfig
// ---------------------------------------------------------------------------

/// Tunable thresholds for one pool. Every knob the engine and the rotation
/// allocator consult lives here; nothing is read from globals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Health floor, 0-100. Accounts scoring below this are pulled from
    /// sending and marked sick.
    #[serde(default = "default_warmup_threshold")]
    pub warmup_threshold: u8,
    /// Sick accounts whose score climbs strictly above this move to the
    /// bench to rest.
    #[serde(default = "default_health_recovery_threshold")]
    pub health_recovery_threshold: u8,
    /// Benched accounts scoring at or above this are eligible to return to
    /// sending.
    #[serde(default = "default_health_return_threshold")]
    pub health_return_threshold: u8,
    /// Accounts younger than this many days stay in warmup regardless of
    /// score.
    #[serde(default = "default_min_age_days")]
    pub min_age_days: i64,
    /// Share of each rotation bucket to keep resting, 0-100. Zero disables
    /// rotation planning entirely.
    #[serde(default)]
    pub bench_percent: u8,
    /// Treat the whole pool as one shared rotation bucket, ignoring customer
    /// group labels.
    #[serde(default)]
    pub single_pool: bool,
}

fn default_version() -> u32 {
    1
}

fn default_warmup_threshold() -> u8 {
    70
}

fn default_health_recovery_threshold() -> u8 {
    95
}

fn default_health_return_threshold() -> u8 {
    90
}

fn default_min_age_days() -> i64 {
    14
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            warmup_threshold: default_warmup_threshold(),
            health_recovery_threshold: default_health_recovery_threshold(),
            health_return_threshold: default_health_return_threshold(),
            min_age_days: default_min_age_days(),
            bench_percent: 0,
            single_pool: false,
        }
    }
}

impl PoolConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PoolError::ConfigNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        let cfg: PoolConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Load the config file, falling back to defaults when it is absent.
    /// A present but malformed file is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(cfg) => Ok(cfg),
            Err(PoolError::ConfigNotFound(_)) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        for (name, value) in [
            ("warmup_threshold", self.warmup_threshold),
            ("health_recovery_threshold", self.health_recovery_threshold),
            ("health_return_threshold", self.health_return_threshold),
            ("bench_percent", self.bench_percent),
        ] {
            if value > 100 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("{name}={value} is outside 0-100"),
                });
            }
        }

        if self.min_age_days < 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("min_age_days={} is negative", self.min_age_days),
            });
        }

        if self.warmup_threshold > self.health_recovery_threshold {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "warmup_threshold={} exceeds health_recovery_threshold={} \
                     — sick accounts recover below the health floor and will \
                     be marked sick again next cycle",
                    self.warmup_threshold, self.health_recovery_threshold
                ),
            });
        }

        if self.bench_percent > 50 && self.bench_percent <= 100 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "bench_percent={} rests more than half of every bucket",
                    self.bench_percent
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let cfg = PoolConfig::default();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.warmup_threshold, 70);
        assert_eq!(cfg.health_recovery_threshold, 95);
        assert_eq!(cfg.health_return_threshold, 90);
        assert_eq!(cfg.min_age_days, 14);
        assert_eq!(cfg.bench_percent, 0);
        assert!(!cfg.single_pool);
    }

    #[test]
    fn roundtrip() {
        let cfg = PoolConfig {
            bench_percent: 30,
            single_pool: true,
            ..PoolConfig::default()
        };
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: PoolConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = "bench_percent: 25\n";
        let cfg: PoolConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.bench_percent, 25);
        assert_eq!(cfg.warmup_threshold, 70);
        assert_eq!(cfg.min_age_days, 14);
    }

    #[test]
    fn save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mailpool.yaml");
        let cfg = PoolConfig {
            warmup_threshold: 75,
            ..PoolConfig::default()
        };
        cfg.save(&path).unwrap();
        let loaded = PoolConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn load_missing_is_error() {
        let dir = TempDir::new().unwrap();
        let err = PoolConfig::load(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, PoolError::ConfigNotFound(_)));
    }

    #[test]
    fn load_or_default_missing_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = PoolConfig::load_or_default(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(cfg, PoolConfig::default());
    }

    #[test]
    fn load_or_default_malformed_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mailpool.yaml");
        std::fs::write(&path, "warmup_threshold: [not a number]").unwrap();
        assert!(PoolConfig::load_or_default(&path).is_err());
    }

    #[test]
    fn validate_defaults_clean() {
        assert!(PoolConfig::default().validate().is_empty());
    }

    #[test]
    fn validate_threshold_out_of_range() {
        let cfg = PoolConfig {
            warmup_threshold: 120,
            ..PoolConfig::default()
        };
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("warmup_threshold=120")));
    }

    #[test]
    fn validate_negative_min_age() {
        let cfg = PoolConfig {
            min_age_days: -3,
            ..PoolConfig::default()
        };
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.level == WarnLevel::Error));
    }

    #[test]
    fn validate_floor_above_recovery_warns() {
        let cfg = PoolConfig {
            warmup_threshold: 98,
            health_recovery_threshold: 95,
            ..PoolConfig::default()
        };
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.level == WarnLevel::Warning
            && w.message.contains("marked sick again")));
    }

    #[test]
    fn validate_heavy_bench_warns() {
        let cfg = PoolConfig {
            bench_percent: 60,
            ..PoolConfig::default()
        };
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Warning && w.message.contains("bench_percent=60")));
    }
}
