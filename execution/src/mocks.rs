//! Message builders and journal doubles for tests.

use crate::journal::{Journal, JournalError};
use ignition_types::{
    CallInitialize, Completed, ContractAtInitialize, DeploymentInitialize, DeploymentSuccess,
    ExecutionFailure, ExecutionResult, FutureDescriptor, FutureType, JournalMessage, NetworkFees,
    NetworkInteraction, OnchainInteraction, RawStaticCallResult, ReadEventArgumentInitialize,
    SendDataInitialize, SolidityValue, StaticCall, StaticCallInitialize, StaticCallSuccess,
    Transaction, TransactionLog, TransactionReceipt, TransactionReceiptStatus,
};
use std::collections::BTreeMap;
use std::io;

/// First default hardhat account.
pub const DEPLOYER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

/// Address used as the target of calls.
pub const CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

pub const FEES: NetworkFees = NetworkFees::Eip1559 {
    max_fee_per_gas: 2_000_000_000,
    max_priority_fee_per_gas: 1_000_000_000,
};

fn descriptor(future_id: &str, future_type: FutureType, dependencies: &[&str]) -> FutureDescriptor {
    FutureDescriptor::new(future_id, future_type, dependencies.iter().copied())
}

pub fn run_start(chain_id: u64) -> JournalMessage {
    JournalMessage::RunStart { chain_id }
}

pub fn wipe(future_id: &str) -> JournalMessage {
    JournalMessage::Wipe {
        future_id: future_id.to_string(),
    }
}

pub fn deployment_init(future_id: &str, dependencies: &[&str]) -> JournalMessage {
    let contract_name = future_id
        .split_once('#')
        .map(|(_, name)| name)
        .unwrap_or(future_id);
    JournalMessage::DeploymentExecutionStateInitialize(DeploymentInitialize {
        future: descriptor(
            future_id,
            FutureType::NamedArtifactContractDeployment,
            dependencies,
        ),
        artifact_future_id: future_id.to_string(),
        contract_name: contract_name.to_string(),
        constructor_args: vec![SolidityValue::Uint(1_000_000)],
        libraries: BTreeMap::new(),
        value: 0,
        from: DEPLOYER.to_string(),
    })
}

pub fn call_init(future_id: &str, dependencies: &[&str]) -> JournalMessage {
    JournalMessage::CallExecutionStateInitialize(CallInitialize {
        future: descriptor(future_id, FutureType::NamedContractCall, dependencies),
        artifact_future_id: dependencies.first().copied().unwrap_or(future_id).to_string(),
        contract_address: CONTRACT.to_string(),
        function_name: "mint".to_string(),
        args: vec![
            SolidityValue::Address(DEPLOYER.to_string()),
            SolidityValue::Uint(5),
        ],
        value: 0,
        from: DEPLOYER.to_string(),
    })
}

pub fn static_call_init(future_id: &str, dependencies: &[&str]) -> JournalMessage {
    JournalMessage::StaticCallExecutionStateInitialize(StaticCallInitialize {
        future: descriptor(future_id, FutureType::NamedStaticCall, dependencies),
        artifact_future_id: dependencies.first().copied().unwrap_or(future_id).to_string(),
        contract_address: CONTRACT.to_string(),
        function_name: "balanceOf".to_string(),
        args: vec![SolidityValue::Address(DEPLOYER.to_string())],
        name_or_index: "0".to_string(),
        from: DEPLOYER.to_string(),
    })
}

pub fn send_data_init(future_id: &str, dependencies: &[&str]) -> JournalMessage {
    JournalMessage::SendDataExecutionStateInitialize(SendDataInitialize {
        future: descriptor(future_id, FutureType::SendData, dependencies),
        to: CONTRACT.to_string(),
        data: Vec::new(),
        value: 1_000_000_000_000_000_000,
        from: DEPLOYER.to_string(),
    })
}

pub fn contract_at_init(future_id: &str, dependencies: &[&str]) -> JournalMessage {
    JournalMessage::ContractAtExecutionStateInitialize(ContractAtInitialize {
        future: descriptor(future_id, FutureType::NamedContractAt, dependencies),
        artifact_future_id: future_id.to_string(),
        contract_name: "Token".to_string(),
        contract_address: CONTRACT.to_string(),
    })
}

pub fn read_event_argument_init(future_id: &str, dependencies: &[&str]) -> JournalMessage {
    JournalMessage::ReadEventArgumentExecutionStateInitialize(ReadEventArgumentInitialize {
        future: descriptor(future_id, FutureType::ReadEventArgument, dependencies),
        artifact_future_id: dependencies.first().copied().unwrap_or(future_id).to_string(),
        event_name: "Transfer".to_string(),
        argument_name: "value".to_string(),
        event_index: 0,
        emitter_address: CONTRACT.to_string(),
        tx_to_read_from: "0xaaa".to_string(),
        result: SolidityValue::Uint(5),
    })
}

pub fn onchain_request(future_id: &str, id: u32) -> JournalMessage {
    JournalMessage::NetworkInteractionRequest {
        future_id: future_id.to_string(),
        network_interaction: NetworkInteraction::Onchain(OnchainInteraction::new(
            id,
            Some(CONTRACT.to_string()),
            vec![0x40, 0xc1, 0x0f, 0x19],
            0,
            DEPLOYER,
        )),
    }
}

pub fn static_call_request(future_id: &str, id: u32) -> JournalMessage {
    JournalMessage::NetworkInteractionRequest {
        future_id: future_id.to_string(),
        network_interaction: NetworkInteraction::StaticCall(StaticCall::new(
            id,
            Some(CONTRACT.to_string()),
            vec![0x70, 0xa0, 0x82, 0x31],
            0,
            DEPLOYER,
        )),
    }
}

pub fn send(future_id: &str, id: u32, hash: &str, nonce: u64) -> JournalMessage {
    JournalMessage::TransactionSend {
        future_id: future_id.to_string(),
        network_interaction_id: id,
        transaction: Transaction::sent(hash, FEES),
        nonce,
    }
}

pub fn receipt() -> TransactionReceipt {
    TransactionReceipt {
        block_hash: "0x0b1c".to_string(),
        block_number: 1,
        contract_address: None,
        status: TransactionReceiptStatus::Success,
        logs: vec![TransactionLog {
            address: CONTRACT.to_string(),
            log_index: 0,
            data: vec![0; 32],
            topics: vec![
                "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef".to_string(),
            ],
        }],
    }
}

pub fn confirm(future_id: &str, id: u32, hash: &str) -> JournalMessage {
    JournalMessage::TransactionConfirm {
        future_id: future_id.to_string(),
        network_interaction_id: id,
        hash: hash.to_string(),
        receipt: receipt(),
    }
}

pub fn static_call_complete(future_id: &str, id: u32) -> JournalMessage {
    JournalMessage::StaticCallComplete {
        future_id: future_id.to_string(),
        network_interaction_id: id,
        result: RawStaticCallResult {
            return_data: vec![0; 32],
            success: true,
            custom_error_reported: false,
        },
    }
}

pub fn bump_fees(future_id: &str, id: u32) -> JournalMessage {
    JournalMessage::OnchainInteractionBumpFees {
        future_id: future_id.to_string(),
        network_interaction_id: id,
    }
}

pub fn dropped(future_id: &str, id: u32) -> JournalMessage {
    JournalMessage::OnchainInteractionDropped {
        future_id: future_id.to_string(),
        network_interaction_id: id,
    }
}

pub fn replaced_by_user(future_id: &str, id: u32) -> JournalMessage {
    JournalMessage::OnchainInteractionReplacedByUser {
        future_id: future_id.to_string(),
        network_interaction_id: id,
    }
}

pub fn timeout_message(future_id: &str, id: u32) -> JournalMessage {
    JournalMessage::OnchainInteractionTimeout {
        future_id: future_id.to_string(),
        network_interaction_id: id,
    }
}

pub fn deployment_success(future_id: &str, address: &str) -> JournalMessage {
    JournalMessage::DeploymentExecutionStateComplete {
        future_id: future_id.to_string(),
        result: ExecutionResult::Success(DeploymentSuccess {
            address: address.to_string(),
        }),
    }
}

pub fn deployment_failure(future_id: &str, reason: &str) -> JournalMessage {
    JournalMessage::DeploymentExecutionStateComplete {
        future_id: future_id.to_string(),
        result: ExecutionResult::Failure(ExecutionFailure::Revert {
            message: reason.to_string(),
        }),
    }
}

pub fn call_complete_success(future_id: &str) -> JournalMessage {
    JournalMessage::CallExecutionStateComplete {
        future_id: future_id.to_string(),
        result: ExecutionResult::Success(Completed),
    }
}

pub fn static_call_success(future_id: &str, value: SolidityValue) -> JournalMessage {
    JournalMessage::StaticCallExecutionStateComplete {
        future_id: future_id.to_string(),
        result: ExecutionResult::Success(StaticCallSuccess { value }),
    }
}

pub fn send_data_complete_success(future_id: &str) -> JournalMessage {
    JournalMessage::SendDataExecutionStateComplete {
        future_id: future_id.to_string(),
        result: ExecutionResult::Success(Completed),
    }
}

/// Full lifecycle of a single deployment: request, two attempts, confirm the second.
pub fn deployment_lifecycle(future_id: &str, dependencies: &[&str]) -> Vec<JournalMessage> {
    vec![
        deployment_init(future_id, dependencies),
        onchain_request(future_id, 0),
        send(future_id, 0, "0xaaa", 0),
        send(future_id, 0, "0xbbb", 0),
        confirm(future_id, 0, "0xbbb"),
        deployment_success(future_id, CONTRACT),
    ]
}

/// Journal that accepts reads but fails every append.
#[derive(Clone, Debug, Default)]
pub struct FailingJournal {
    pub messages: Vec<JournalMessage>,
}

impl Journal for FailingJournal {
    fn append(&mut self, _: &JournalMessage) -> Result<(), JournalError> {
        Err(JournalError::Io(io::Error::new(
            io::ErrorKind::Other,
            "disk full",
        )))
    }

    fn read_all(&self) -> Result<Vec<JournalMessage>, JournalError> {
        Ok(self.messages.clone())
    }
}
