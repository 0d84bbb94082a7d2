//! Signing plans: validated units handed to an external signer.
//!
//! A plan carries the sender, the unit, its dependency edges and its digest.
//! Plans are printed to stdout or appended, one JSON object per line, to an
//! outbox file that a signer drains.

use crate::error::ComposeError;
use crate::transport::{SubmitReceipt, Submitter};
use crate::types::SuiAddress;
use crate::unit::{Dependency, TransactionUnit, ValidatedUnit};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Schema tag written into every plan.
pub const PLAN_SCHEMA: &str = "springsui.unit.v1";

/// Serialized form of a submitted unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPlan {
    /// Always [`PLAN_SCHEMA`].
    pub schema: String,
    /// Account expected to sign.
    pub sender: SuiAddress,
    /// Hex BLAKE2b-256 digest of the unit.
    pub digest: String,
    /// Wall-clock creation time.
    pub created_at_ms: u64,
    /// Producer → consumer edges.
    pub dependencies: Vec<Dependency>,
    /// The unit itself.
    pub unit: TransactionUnit,
}

impl UnitPlan {
    /// Plan for `unit` signed by `sender`.
    pub fn new(sender: &SuiAddress, unit: &ValidatedUnit) -> Self {
        let created_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default();
        Self {
            schema: PLAN_SCHEMA.to_string(),
            sender: *sender,
            digest: unit.digest_hex(),
            created_at_ms,
            dependencies: unit.unit().dependencies(),
            unit: unit.unit().clone(),
        }
    }
}

/// Destination for plans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanWriter {
    /// Pretty JSON on stdout.
    Stdout,
    /// One JSON line appended per plan.
    Outbox(PathBuf),
}

impl PlanWriter {
    /// Outbox writer when `outbox` is set, stdout otherwise.
    pub fn from_outbox(outbox: Option<PathBuf>) -> Self {
        match outbox {
            Some(path) => Self::Outbox(path),
            None => Self::Stdout,
        }
    }
}

impl Submitter for PlanWriter {
    fn submit(
        &self,
        sender: &SuiAddress,
        unit: &ValidatedUnit,
    ) -> Result<SubmitReceipt, ComposeError> {
        let plan = UnitPlan::new(sender, unit);
        let destination = match self {
            Self::Stdout => {
                let bytes = serde_json::to_vec_pretty(&plan)
                    .map_err(|err| ComposeError::Transport(format!("encode plan: {err}")))?;
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(&bytes)
                    .and_then(|_| stdout.write_all(b"\n"))
                    .map_err(|err| ComposeError::Transport(format!("write plan: {err}")))?;
                "stdout".to_string()
            }
            Self::Outbox(path) => {
                append_plan(path, &plan)?;
                path.display().to_string()
            }
        };
        info!(
            evt = "plan_written",
            digest = %plan.digest,
            %destination,
            commands = plan.unit.len()
        );
        Ok(SubmitReceipt {
            digest: plan.digest,
            destination,
        })
    }
}

fn append_plan(path: &Path, plan: &UnitPlan) -> Result<(), ComposeError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|err| ComposeError::Transport(format!("create {}: {err}", parent.display())))?;
    }
    let line = serde_json::to_string(plan)
        .map_err(|err| ComposeError::Transport(format!("encode plan: {err}")))?;
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| file.write_all(format!("{line}\n").as_bytes()))
        .map_err(|err| ComposeError::Transport(format!("append {}: {err}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sender;

    fn temp_path(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        p.push(format!("{name}_{ts}"));
        p
    }

    fn validated(amount: u64) -> ValidatedUnit {
        let mut unit = TransactionUnit::new();
        let coin = unit.split_gas(amount);
        unit.transfer_coin(coin, &sender());
        unit.validate().unwrap()
    }

    #[test]
    fn outbox_appends_one_line_per_plan() {
        let dir = temp_path("springsui_outbox");
        let path = dir.join("plans.jsonl");
        let writer = PlanWriter::from_outbox(Some(path.clone()));

        let first = writer.submit(&sender(), &validated(1)).unwrap();
        let second = writer.submit(&sender(), &validated(2)).unwrap();
        assert_ne!(first.digest, second.digest);
        assert_eq!(first.destination, path.display().to_string());

        let contents = fs::read_to_string(&path).unwrap();
        let plans: Vec<UnitPlan> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].schema, PLAN_SCHEMA);
        assert_eq!(plans[0].digest, first.digest);
        assert_eq!(plans[1].sender, sender());
        assert_eq!(plans[1].dependencies.len(), 1);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn plan_digest_matches_unit() {
        let unit = validated(5);
        let plan = UnitPlan::new(&sender(), &unit);
        assert_eq!(plan.digest, unit.digest_hex());
        assert_eq!(&plan.unit, unit.unit());
    }
}
