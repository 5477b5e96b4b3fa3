//! Coarse progress read model.
//!
//! Collapses execution states into one [`FutureStatus`] per future, grouped by module,
//! for progress display. Futures that were never initialized are classified from their
//! declared dependencies.

use crate::deployment_state::DeploymentState;
use ignition_types::ExecutionStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FutureStatus {
    Success,
    Failure,
    Hold,
    Running,
    Ready,
    Waiting,
}

impl FutureStatus {
    /// Display order within a module: finished futures first, waiting ones last.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Success | Self::Failure | Self::Hold => 0,
            Self::Running => 1,
            Self::Ready => 2,
            Self::Waiting => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Hold => "hold",
            Self::Running => "running",
            Self::Ready => "ready",
            Self::Waiting => "waiting",
        }
    }
}

impl fmt::Display for FutureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ExecutionStatus> for FutureStatus {
    fn from(status: ExecutionStatus) -> Self {
        match status {
            ExecutionStatus::Started => Self::Running,
            ExecutionStatus::Success => Self::Success,
            ExecutionStatus::Failed => Self::Failure,
            ExecutionStatus::Timeout => Self::Hold,
        }
    }
}

/// Futures of one module and their dependencies.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePlan {
    pub id: String,
    /// Future id to the ids it depends on.
    #[serde(default)]
    pub futures: BTreeMap<String, Vec<String>>,
}

/// Modules in execution order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentPlan {
    pub modules: Vec<ModulePlan>,
}

impl DeploymentPlan {
    /// Reconstructs a plan from the futures a projection knows about.
    ///
    /// Futures are grouped by the module prefix of their id (`Module#future`), with
    /// modules ordered by id.
    pub fn from_state(state: &DeploymentState) -> Self {
        let mut modules: BTreeMap<&str, ModulePlan> = BTreeMap::new();
        for (future_id, execution_state) in &state.execution_states {
            let module_id = future_id
                .split_once('#')
                .map(|(module, _)| module)
                .unwrap_or(future_id.as_str());
            modules
                .entry(module_id)
                .or_insert_with(|| ModulePlan {
                    id: module_id.to_string(),
                    futures: BTreeMap::new(),
                })
                .futures
                .insert(
                    future_id.clone(),
                    execution_state.dependencies().iter().cloned().collect(),
                );
        }
        Self {
            modules: modules.into_values().collect(),
        }
    }
}

/// Status of a single future.
pub fn future_status<'a, I>(
    state: &DeploymentState,
    future_id: &str,
    dependencies: I,
) -> FutureStatus
where
    I: IntoIterator<Item = &'a str>,
{
    if let Some(execution_state) = state.get(future_id) {
        return execution_state.status().into();
    }
    let satisfied = dependencies.into_iter().all(|dependency| {
        state
            .get(dependency)
            .is_some_and(|dependency| dependency.status() == ExecutionStatus::Success)
    });
    if satisfied {
        FutureStatus::Ready
    } else {
        FutureStatus::Waiting
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FutureSummary {
    pub id: String,
    pub status: FutureStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSummary {
    pub id: String,
    pub successful: bool,
    /// Sorted by [`FutureStatus::rank`], then id.
    pub futures: Vec<FutureSummary>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSummary {
    /// First module that is not fully successful.
    pub current_module: Option<String>,
    pub successful_modules: usize,
    pub modules: Vec<ModuleSummary>,
}

pub fn summarize_module(state: &DeploymentState, module: &ModulePlan) -> ModuleSummary {
    let mut futures: Vec<FutureSummary> = module
        .futures
        .iter()
        .map(|(id, dependencies)| FutureSummary {
            id: id.clone(),
            status: future_status(state, id, dependencies.iter().map(String::as_str)),
        })
        .collect();
    futures.sort_by(|a, b| {
        a.status
            .rank()
            .cmp(&b.status.rank())
            .then_with(|| a.id.cmp(&b.id))
    });
    let successful = futures
        .iter()
        .all(|future| future.status == FutureStatus::Success);

    ModuleSummary {
        id: module.id.clone(),
        successful,
        futures,
    }
}

pub fn summarize(state: &DeploymentState, plan: &DeploymentPlan) -> DeploymentSummary {
    let modules: Vec<ModuleSummary> = plan
        .modules
        .iter()
        .map(|module| summarize_module(state, module))
        .collect();
    let current_module = modules
        .iter()
        .find(|module| !module.successful)
        .map(|module| module.id.clone());
    let successful_modules = modules.iter().filter(|module| module.successful).count();

    DeploymentSummary {
        current_module,
        successful_modules,
        modules,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{
        deployment_failure, deployment_init, deployment_success, onchain_request, send,
        timeout_message,
    };
    use crate::replay::replay;

    fn plan() -> DeploymentPlan {
        DeploymentPlan {
            modules: vec![
                ModulePlan {
                    id: "Lib".to_string(),
                    futures: BTreeMap::from([("Lib#Math".to_string(), vec![])]),
                },
                ModulePlan {
                    id: "Token".to_string(),
                    futures: BTreeMap::from([
                        ("Token#Token".to_string(), vec!["Lib#Math".to_string()]),
                        (
                            "Token#Vault".to_string(),
                            vec!["Token#Token".to_string()],
                        ),
                        ("Token#Faucet".to_string(), vec![]),
                    ]),
                },
            ],
        }
    }

    #[test]
    fn classifies_from_execution_status() {
        assert_eq!(
            FutureStatus::from(ExecutionStatus::Started),
            FutureStatus::Running
        );
        assert_eq!(
            FutureStatus::from(ExecutionStatus::Success),
            FutureStatus::Success
        );
        assert_eq!(
            FutureStatus::from(ExecutionStatus::Failed),
            FutureStatus::Failure
        );
        assert_eq!(
            FutureStatus::from(ExecutionStatus::Timeout),
            FutureStatus::Hold
        );
    }

    #[test]
    fn uninitialized_futures_wait_for_dependencies() {
        let state = replay(&[
            deployment_init("Lib#Math", &[]),
            deployment_success("Lib#Math", "0x01"),
        ])
        .unwrap();
        assert_eq!(
            future_status(&state, "Token#Token", ["Lib#Math"]),
            FutureStatus::Ready
        );
        assert_eq!(
            future_status(&state, "Token#Vault", ["Token#Token"]),
            FutureStatus::Waiting
        );
        assert_eq!(
            future_status(&state, "Token#Faucet", std::iter::empty()),
            FutureStatus::Ready
        );
    }

    #[test]
    fn failed_dependency_keeps_dependents_waiting() {
        let state = replay(&[
            deployment_init("Lib#Math", &[]),
            deployment_failure("Lib#Math", "reverted"),
        ])
        .unwrap();
        assert_eq!(
            future_status(&state, "Token#Token", ["Lib#Math"]),
            FutureStatus::Waiting
        );
    }

    #[test]
    fn summary_orders_futures_and_finds_current_module() {
        let state = replay(&[
            deployment_init("Lib#Math", &[]),
            deployment_success("Lib#Math", "0x01"),
            deployment_init("Token#Token", &["Lib#Math"]),
            onchain_request("Token#Token", 0),
            send("Token#Token", 0, "0xaaa", 0),
            deployment_init("Token#Faucet", &[]),
            onchain_request("Token#Faucet", 0),
            send("Token#Faucet", 0, "0xbbb", 0),
            timeout_message("Token#Faucet", 0),
        ])
        .unwrap();

        let summary = summarize(&state, &plan());
        assert_eq!(summary.current_module.as_deref(), Some("Token"));
        assert_eq!(summary.successful_modules, 1);
        assert!(summary.modules[0].successful);

        let token = &summary.modules[1];
        assert_eq!(
            token
                .futures
                .iter()
                .map(|future| (future.id.as_str(), future.status))
                .collect::<Vec<_>>(),
            vec![
                ("Token#Faucet", FutureStatus::Hold),
                ("Token#Token", FutureStatus::Running),
                ("Token#Vault", FutureStatus::Waiting),
            ]
        );
    }

    #[test]
    fn plan_from_state_groups_by_module() {
        let state = replay(&[
            deployment_init("Token#Token", &["Lib#Math"]),
            deployment_init("Lib#Math", &[]),
        ])
        .unwrap();
        let plan = DeploymentPlan::from_state(&state);
        assert_eq!(
            plan.modules.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
            vec!["Lib", "Token"]
        );
        assert_eq!(
            plan.modules[1].futures["Token#Token"],
            vec!["Lib#Math".to_string()]
        );
    }

    #[test]
    fn summary_serializes_lowercase_statuses() {
        let summary = summarize(&DeploymentState::new(), &plan());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["currentModule"], "Lib");
        assert_eq!(json["modules"][0]["futures"][0]["status"], "ready");
    }
}
