//! Journal messages.
//!
//! Each message records one fact observed while executing a deployment. The journal is
//! the ordered list of these messages and the only durable input of the state machine.

use crate::codec::{
    read_string, read_string_map, string_encode_size, string_map_encode_size, write_string,
    write_string_map,
};
use crate::constants::{
    MAX_DATA_LENGTH, MAX_FUTURE_ID_LENGTH, MAX_HEX_STRING_LENGTH, MAX_LIBRARIES, MAX_NAME_LENGTH,
};
use crate::execution_state::{
    CallResult, DeploymentResult, FutureDescriptor, SendDataResult, StaticCallResult,
};
use crate::network_interaction::{
    NetworkInteraction, RawStaticCallResult, Transaction, TransactionReceipt,
};
use crate::value::{read_values, values_encode_size, write_values, SolidityValue};
use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, ReadRangeExt, Write};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentInitialize {
    #[serde(flatten)]
    pub future: FutureDescriptor,
    pub artifact_future_id: String,
    pub contract_name: String,
    pub constructor_args: Vec<SolidityValue>,
    pub libraries: BTreeMap<String, String>,
    #[serde(with = "crate::codec::serde_u128")]
    pub value: u128,
    pub from: String,
}

impl Write for DeploymentInitialize {
    fn write(&self, writer: &mut impl BufMut) {
        self.future.write(writer);
        write_string(&self.artifact_future_id, writer);
        write_string(&self.contract_name, writer);
        write_values(&self.constructor_args, writer);
        write_string_map(&self.libraries, writer);
        self.value.write(writer);
        write_string(&self.from, writer);
    }
}

impl Read for DeploymentInitialize {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            future: FutureDescriptor::read(reader)?,
            artifact_future_id: read_string(reader, MAX_FUTURE_ID_LENGTH)?,
            contract_name: read_string(reader, MAX_NAME_LENGTH)?,
            constructor_args: read_values(reader)?,
            libraries: read_string_map(reader, MAX_LIBRARIES, MAX_NAME_LENGTH)?,
            value: u128::read(reader)?,
            from: read_string(reader, MAX_HEX_STRING_LENGTH)?,
        })
    }
}

impl EncodeSize for DeploymentInitialize {
    fn encode_size(&self) -> usize {
        self.future.encode_size()
            + string_encode_size(&self.artifact_future_id)
            + string_encode_size(&self.contract_name)
            + values_encode_size(&self.constructor_args)
            + string_map_encode_size(&self.libraries)
            + self.value.encode_size()
            + string_encode_size(&self.from)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallInitialize {
    #[serde(flatten)]
    pub future: FutureDescriptor,
    pub artifact_future_id: String,
    pub contract_address: String,
    pub function_name: String,
    pub args: Vec<SolidityValue>,
    #[serde(with = "crate::codec::serde_u128")]
    pub value: u128,
    pub from: String,
}

impl Write for CallInitialize {
    fn write(&self, writer: &mut impl BufMut) {
        self.future.write(writer);
        write_string(&self.artifact_future_id, writer);
        write_string(&self.contract_address, writer);
        write_string(&self.function_name, writer);
        write_values(&self.args, writer);
        self.value.write(writer);
        write_string(&self.from, writer);
    }
}

impl Read for CallInitialize {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            future: FutureDescriptor::read(reader)?,
            artifact_future_id: read_string(reader, MAX_FUTURE_ID_LENGTH)?,
            contract_address: read_string(reader, MAX_HEX_STRING_LENGTH)?,
            function_name: read_string(reader, MAX_NAME_LENGTH)?,
            args: read_values(reader)?,
            value: u128::read(reader)?,
            from: read_string(reader, MAX_HEX_STRING_LENGTH)?,
        })
    }
}

impl EncodeSize for CallInitialize {
    fn encode_size(&self) -> usize {
        self.future.encode_size()
            + string_encode_size(&self.artifact_future_id)
            + string_encode_size(&self.contract_address)
            + string_encode_size(&self.function_name)
            + values_encode_size(&self.args)
            + self.value.encode_size()
            + string_encode_size(&self.from)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticCallInitialize {
    #[serde(flatten)]
    pub future: FutureDescriptor,
    pub artifact_future_id: String,
    pub contract_address: String,
    pub function_name: String,
    pub args: Vec<SolidityValue>,
    pub name_or_index: String,
    pub from: String,
}

impl Write for StaticCallInitialize {
    fn write(&self, writer: &mut impl BufMut) {
        self.future.write(writer);
        write_string(&self.artifact_future_id, writer);
        write_string(&self.contract_address, writer);
        write_string(&self.function_name, writer);
        write_values(&self.args, writer);
        write_string(&self.name_or_index, writer);
        write_string(&self.from, writer);
    }
}

impl Read for StaticCallInitialize {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            future: FutureDescriptor::read(reader)?,
            artifact_future_id: read_string(reader, MAX_FUTURE_ID_LENGTH)?,
            contract_address: read_string(reader, MAX_HEX_STRING_LENGTH)?,
            function_name: read_string(reader, MAX_NAME_LENGTH)?,
            args: read_values(reader)?,
            name_or_index: read_string(reader, MAX_NAME_LENGTH)?,
            from: read_string(reader, MAX_HEX_STRING_LENGTH)?,
        })
    }
}

impl EncodeSize for StaticCallInitialize {
    fn encode_size(&self) -> usize {
        self.future.encode_size()
            + string_encode_size(&self.artifact_future_id)
            + string_encode_size(&self.contract_address)
            + string_encode_size(&self.function_name)
            + values_encode_size(&self.args)
            + string_encode_size(&self.name_or_index)
            + string_encode_size(&self.from)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendDataInitialize {
    #[serde(flatten)]
    pub future: FutureDescriptor,
    pub to: String,
    #[serde(with = "crate::codec::serde_hex")]
    pub data: Vec<u8>,
    #[serde(with = "crate::codec::serde_u128")]
    pub value: u128,
    pub from: String,
}

impl Write for SendDataInitialize {
    fn write(&self, writer: &mut impl BufMut) {
        self.future.write(writer);
        write_string(&self.to, writer);
        self.data.write(writer);
        self.value.write(writer);
        write_string(&self.from, writer);
    }
}

impl Read for SendDataInitialize {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            future: FutureDescriptor::read(reader)?,
            to: read_string(reader, MAX_HEX_STRING_LENGTH)?,
            data: Vec::<u8>::read_range(reader, 0..=MAX_DATA_LENGTH)?,
            value: u128::read(reader)?,
            from: read_string(reader, MAX_HEX_STRING_LENGTH)?,
        })
    }
}

impl EncodeSize for SendDataInitialize {
    fn encode_size(&self) -> usize {
        self.future.encode_size()
            + string_encode_size(&self.to)
            + self.data.encode_size()
            + self.value.encode_size()
            + string_encode_size(&self.from)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractAtInitialize {
    #[serde(flatten)]
    pub future: FutureDescriptor,
    pub artifact_future_id: String,
    pub contract_name: String,
    pub contract_address: String,
}

impl Write for ContractAtInitialize {
    fn write(&self, writer: &mut impl BufMut) {
        self.future.write(writer);
        write_string(&self.artifact_future_id, writer);
        write_string(&self.contract_name, writer);
        write_string(&self.contract_address, writer);
    }
}

impl Read for ContractAtInitialize {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            future: FutureDescriptor::read(reader)?,
            artifact_future_id: read_string(reader, MAX_FUTURE_ID_LENGTH)?,
            contract_name: read_string(reader, MAX_NAME_LENGTH)?,
            contract_address: read_string(reader, MAX_HEX_STRING_LENGTH)?,
        })
    }
}

impl EncodeSize for ContractAtInitialize {
    fn encode_size(&self) -> usize {
        self.future.encode_size()
            + string_encode_size(&self.artifact_future_id)
            + string_encode_size(&self.contract_name)
            + string_encode_size(&self.contract_address)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadEventArgumentInitialize {
    #[serde(flatten)]
    pub future: FutureDescriptor,
    pub artifact_future_id: String,
    pub event_name: String,
    pub argument_name: String,
    pub event_index: u32,
    pub emitter_address: String,
    pub tx_to_read_from: String,
    pub result: SolidityValue,
}

impl Write for ReadEventArgumentInitialize {
    fn write(&self, writer: &mut impl BufMut) {
        self.future.write(writer);
        write_string(&self.artifact_future_id, writer);
        write_string(&self.event_name, writer);
        write_string(&self.argument_name, writer);
        self.event_index.write(writer);
        write_string(&self.emitter_address, writer);
        write_string(&self.tx_to_read_from, writer);
        self.result.write(writer);
    }
}

impl Read for ReadEventArgumentInitialize {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            future: FutureDescriptor::read(reader)?,
            artifact_future_id: read_string(reader, MAX_FUTURE_ID_LENGTH)?,
            event_name: read_string(reader, MAX_NAME_LENGTH)?,
            argument_name: read_string(reader, MAX_NAME_LENGTH)?,
            event_index: u32::read(reader)?,
            emitter_address: read_string(reader, MAX_HEX_STRING_LENGTH)?,
            tx_to_read_from: read_string(reader, MAX_HEX_STRING_LENGTH)?,
            result: SolidityValue::read(reader)?,
        })
    }
}

impl EncodeSize for ReadEventArgumentInitialize {
    fn encode_size(&self) -> usize {
        self.future.encode_size()
            + string_encode_size(&self.artifact_future_id)
            + string_encode_size(&self.event_name)
            + string_encode_size(&self.argument_name)
            + self.event_index.encode_size()
            + string_encode_size(&self.emitter_address)
            + string_encode_size(&self.tx_to_read_from)
            + self.result.encode_size()
    }
}

/// Discriminant of a [`JournalMessage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum JournalMessageType {
    RunStart = 0,
    Wipe = 1,
    DeploymentExecutionStateInitialize = 2,
    DeploymentExecutionStateComplete = 3,
    CallExecutionStateInitialize = 4,
    CallExecutionStateComplete = 5,
    StaticCallExecutionStateInitialize = 6,
    StaticCallExecutionStateComplete = 7,
    SendDataExecutionStateInitialize = 8,
    SendDataExecutionStateComplete = 9,
    ContractAtExecutionStateInitialize = 10,
    ReadEventArgumentExecutionStateInitialize = 11,
    NetworkInteractionRequest = 12,
    TransactionSend = 13,
    TransactionConfirm = 14,
    StaticCallComplete = 15,
    OnchainInteractionBumpFees = 16,
    OnchainInteractionDropped = 17,
    OnchainInteractionReplacedByUser = 18,
    OnchainInteractionTimeout = 19,
}

impl JournalMessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RunStart => "RUN_START",
            Self::Wipe => "WIPE",
            Self::DeploymentExecutionStateInitialize => "DEPLOYMENT_EXECUTION_STATE_INITIALIZE",
            Self::DeploymentExecutionStateComplete => "DEPLOYMENT_EXECUTION_STATE_COMPLETE",
            Self::CallExecutionStateInitialize => "CALL_EXECUTION_STATE_INITIALIZE",
            Self::CallExecutionStateComplete => "CALL_EXECUTION_STATE_COMPLETE",
            Self::StaticCallExecutionStateInitialize => "STATIC_CALL_EXECUTION_STATE_INITIALIZE",
            Self::StaticCallExecutionStateComplete => "STATIC_CALL_EXECUTION_STATE_COMPLETE",
            Self::SendDataExecutionStateInitialize => "SEND_DATA_EXECUTION_STATE_INITIALIZE",
            Self::SendDataExecutionStateComplete => "SEND_DATA_EXECUTION_STATE_COMPLETE",
            Self::ContractAtExecutionStateInitialize => "CONTRACT_AT_EXECUTION_STATE_INITIALIZE",
            Self::ReadEventArgumentExecutionStateInitialize => {
                "READ_EVENT_ARGUMENT_EXECUTION_STATE_INITIALIZE"
            }
            Self::NetworkInteractionRequest => "NETWORK_INTERACTION_REQUEST",
            Self::TransactionSend => "TRANSACTION_SEND",
            Self::TransactionConfirm => "TRANSACTION_CONFIRM",
            Self::StaticCallComplete => "STATIC_CALL_COMPLETE",
            Self::OnchainInteractionBumpFees => "ONCHAIN_INTERACTION_BUMP_FEES",
            Self::OnchainInteractionDropped => "ONCHAIN_INTERACTION_DROPPED",
            Self::OnchainInteractionReplacedByUser => "ONCHAIN_INTERACTION_REPLACED_BY_USER",
            Self::OnchainInteractionTimeout => "ONCHAIN_INTERACTION_TIMEOUT",
        }
    }
}

impl fmt::Display for JournalMessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fact recorded in the journal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JournalMessage {
    /// A new execution run started against `chain_id`.
    #[serde(rename_all = "camelCase")]
    RunStart { chain_id: u64 },
    /// Drops the execution state of a future so it can be executed again.
    #[serde(rename_all = "camelCase")]
    Wipe { future_id: String },

    DeploymentExecutionStateInitialize(DeploymentInitialize),
    #[serde(rename_all = "camelCase")]
    DeploymentExecutionStateComplete {
        future_id: String,
        result: DeploymentResult,
    },
    CallExecutionStateInitialize(CallInitialize),
    #[serde(rename_all = "camelCase")]
    CallExecutionStateComplete { future_id: String, result: CallResult },
    StaticCallExecutionStateInitialize(StaticCallInitialize),
    #[serde(rename_all = "camelCase")]
    StaticCallExecutionStateComplete {
        future_id: String,
        result: StaticCallResult,
    },
    SendDataExecutionStateInitialize(SendDataInitialize),
    #[serde(rename_all = "camelCase")]
    SendDataExecutionStateComplete {
        future_id: String,
        result: SendDataResult,
    },
    ContractAtExecutionStateInitialize(ContractAtInitialize),
    ReadEventArgumentExecutionStateInitialize(ReadEventArgumentInitialize),

    #[serde(rename_all = "camelCase")]
    NetworkInteractionRequest {
        future_id: String,
        network_interaction: NetworkInteraction,
    },
    #[serde(rename_all = "camelCase")]
    TransactionSend {
        future_id: String,
        network_interaction_id: u32,
        transaction: Transaction,
        nonce: u64,
    },
    #[serde(rename_all = "camelCase")]
    TransactionConfirm {
        future_id: String,
        network_interaction_id: u32,
        hash: String,
        receipt: TransactionReceipt,
    },
    #[serde(rename_all = "camelCase")]
    StaticCallComplete {
        future_id: String,
        network_interaction_id: u32,
        result: RawStaticCallResult,
    },
    /// The pending transaction should be resent with higher fees (same nonce).
    #[serde(rename_all = "camelCase")]
    OnchainInteractionBumpFees {
        future_id: String,
        network_interaction_id: u32,
    },
    /// Every sent transaction vanished from the mempool (nonce still ours).
    #[serde(rename_all = "camelCase")]
    OnchainInteractionDropped {
        future_id: String,
        network_interaction_id: u32,
    },
    /// The nonce was consumed by a transaction the engine did not send.
    #[serde(rename_all = "camelCase")]
    OnchainInteractionReplacedByUser {
        future_id: String,
        network_interaction_id: u32,
    },
    #[serde(rename_all = "camelCase")]
    OnchainInteractionTimeout {
        future_id: String,
        network_interaction_id: u32,
    },
}

impl JournalMessage {
    pub fn message_type(&self) -> JournalMessageType {
        match self {
            Self::RunStart { .. } => JournalMessageType::RunStart,
            Self::Wipe { .. } => JournalMessageType::Wipe,
            Self::DeploymentExecutionStateInitialize(_) => {
                JournalMessageType::DeploymentExecutionStateInitialize
            }
            Self::DeploymentExecutionStateComplete { .. } => {
                JournalMessageType::DeploymentExecutionStateComplete
            }
            Self::CallExecutionStateInitialize(_) => {
                JournalMessageType::CallExecutionStateInitialize
            }
            Self::CallExecutionStateComplete { .. } => {
                JournalMessageType::CallExecutionStateComplete
            }
            Self::StaticCallExecutionStateInitialize(_) => {
                JournalMessageType::StaticCallExecutionStateInitialize
            }
            Self::StaticCallExecutionStateComplete { .. } => {
                JournalMessageType::StaticCallExecutionStateComplete
            }
            Self::SendDataExecutionStateInitialize(_) => {
                JournalMessageType::SendDataExecutionStateInitialize
            }
            Self::SendDataExecutionStateComplete { .. } => {
                JournalMessageType::SendDataExecutionStateComplete
            }
            Self::ContractAtExecutionStateInitialize(_) => {
                JournalMessageType::ContractAtExecutionStateInitialize
            }
            Self::ReadEventArgumentExecutionStateInitialize(_) => {
                JournalMessageType::ReadEventArgumentExecutionStateInitialize
            }
            Self::NetworkInteractionRequest { .. } => JournalMessageType::NetworkInteractionRequest,
            Self::TransactionSend { .. } => JournalMessageType::TransactionSend,
            Self::TransactionConfirm { .. } => JournalMessageType::TransactionConfirm,
            Self::StaticCallComplete { .. } => JournalMessageType::StaticCallComplete,
            Self::OnchainInteractionBumpFees { .. } => {
                JournalMessageType::OnchainInteractionBumpFees
            }
            Self::OnchainInteractionDropped { .. } => JournalMessageType::OnchainInteractionDropped,
            Self::OnchainInteractionReplacedByUser { .. } => {
                JournalMessageType::OnchainInteractionReplacedByUser
            }
            Self::OnchainInteractionTimeout { .. } => JournalMessageType::OnchainInteractionTimeout,
        }
    }

    /// Future the message is scoped to. `None` for deployment-wide messages.
    pub fn future_id(&self) -> Option<&str> {
        match self {
            Self::RunStart { .. } => None,
            Self::DeploymentExecutionStateInitialize(init) => Some(&init.future.id),
            Self::CallExecutionStateInitialize(init) => Some(&init.future.id),
            Self::StaticCallExecutionStateInitialize(init) => Some(&init.future.id),
            Self::SendDataExecutionStateInitialize(init) => Some(&init.future.id),
            Self::ContractAtExecutionStateInitialize(init) => Some(&init.future.id),
            Self::ReadEventArgumentExecutionStateInitialize(init) => Some(&init.future.id),
            Self::Wipe { future_id }
            | Self::DeploymentExecutionStateComplete { future_id, .. }
            | Self::CallExecutionStateComplete { future_id, .. }
            | Self::StaticCallExecutionStateComplete { future_id, .. }
            | Self::SendDataExecutionStateComplete { future_id, .. }
            | Self::NetworkInteractionRequest { future_id, .. }
            | Self::TransactionSend { future_id, .. }
            | Self::TransactionConfirm { future_id, .. }
            | Self::StaticCallComplete { future_id, .. }
            | Self::OnchainInteractionBumpFees { future_id, .. }
            | Self::OnchainInteractionDropped { future_id, .. }
            | Self::OnchainInteractionReplacedByUser { future_id, .. }
            | Self::OnchainInteractionTimeout { future_id, .. } => Some(future_id),
        }
    }

    /// Network interaction the message refers to, if any.
    pub fn network_interaction_id(&self) -> Option<u32> {
        match self {
            Self::NetworkInteractionRequest {
                network_interaction,
                ..
            } => Some(network_interaction.id()),
            Self::TransactionSend {
                network_interaction_id,
                ..
            }
            | Self::TransactionConfirm {
                network_interaction_id,
                ..
            }
            | Self::StaticCallComplete {
                network_interaction_id,
                ..
            }
            | Self::OnchainInteractionBumpFees {
                network_interaction_id,
                ..
            }
            | Self::OnchainInteractionDropped {
                network_interaction_id,
                ..
            }
            | Self::OnchainInteractionReplacedByUser {
                network_interaction_id,
                ..
            }
            | Self::OnchainInteractionTimeout {
                network_interaction_id,
                ..
            } => Some(*network_interaction_id),
            _ => None,
        }
    }

    /// Whether the message creates an execution state.
    pub fn is_initialize(&self) -> bool {
        matches!(
            self,
            Self::DeploymentExecutionStateInitialize(_)
                | Self::CallExecutionStateInitialize(_)
                | Self::StaticCallExecutionStateInitialize(_)
                | Self::SendDataExecutionStateInitialize(_)
                | Self::ContractAtExecutionStateInitialize(_)
                | Self::ReadEventArgumentExecutionStateInitialize(_)
        )
    }
}

fn write_future_id(future_id: &str, writer: &mut impl BufMut) {
    write_string(future_id, writer);
}

fn read_future_id(reader: &mut impl Buf) -> Result<String, Error> {
    read_string(reader, MAX_FUTURE_ID_LENGTH)
}

impl Write for JournalMessage {
    fn write(&self, writer: &mut impl BufMut) {
        (self.message_type() as u8).write(writer);
        match self {
            Self::RunStart { chain_id } => chain_id.write(writer),
            Self::Wipe { future_id } => write_future_id(future_id, writer),
            Self::DeploymentExecutionStateInitialize(init) => init.write(writer),
            Self::DeploymentExecutionStateComplete { future_id, result } => {
                write_future_id(future_id, writer);
                result.write(writer);
            }
            Self::CallExecutionStateInitialize(init) => init.write(writer),
            Self::CallExecutionStateComplete { future_id, result } => {
                write_future_id(future_id, writer);
                result.write(writer);
            }
            Self::StaticCallExecutionStateInitialize(init) => init.write(writer),
            Self::StaticCallExecutionStateComplete { future_id, result } => {
                write_future_id(future_id, writer);
                result.write(writer);
            }
            Self::SendDataExecutionStateInitialize(init) => init.write(writer),
            Self::SendDataExecutionStateComplete { future_id, result } => {
                write_future_id(future_id, writer);
                result.write(writer);
            }
            Self::ContractAtExecutionStateInitialize(init) => init.write(writer),
            Self::ReadEventArgumentExecutionStateInitialize(init) => init.write(writer),
            Self::NetworkInteractionRequest {
                future_id,
                network_interaction,
            } => {
                write_future_id(future_id, writer);
                network_interaction.write(writer);
            }
            Self::TransactionSend {
                future_id,
                network_interaction_id,
                transaction,
                nonce,
            } => {
                write_future_id(future_id, writer);
                network_interaction_id.write(writer);
                transaction.write(writer);
                nonce.write(writer);
            }
            Self::TransactionConfirm {
                future_id,
                network_interaction_id,
                hash,
                receipt,
            } => {
                write_future_id(future_id, writer);
                network_interaction_id.write(writer);
                write_string(hash, writer);
                receipt.write(writer);
            }
            Self::StaticCallComplete {
                future_id,
                network_interaction_id,
                result,
            } => {
                write_future_id(future_id, writer);
                network_interaction_id.write(writer);
                result.write(writer);
            }
            Self::OnchainInteractionBumpFees {
                future_id,
                network_interaction_id,
            }
            | Self::OnchainInteractionDropped {
                future_id,
                network_interaction_id,
            }
            | Self::OnchainInteractionReplacedByUser {
                future_id,
                network_interaction_id,
            }
            | Self::OnchainInteractionTimeout {
                future_id,
                network_interaction_id,
            } => {
                write_future_id(future_id, writer);
                network_interaction_id.write(writer);
            }
        }
    }
}

impl Read for JournalMessage {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let message = match u8::read(reader)? {
            0 => Self::RunStart {
                chain_id: u64::read(reader)?,
            },
            1 => Self::Wipe {
                future_id: read_future_id(reader)?,
            },
            2 => Self::DeploymentExecutionStateInitialize(DeploymentInitialize::read(reader)?),
            3 => Self::DeploymentExecutionStateComplete {
                future_id: read_future_id(reader)?,
                result: DeploymentResult::read(reader)?,
            },
            4 => Self::CallExecutionStateInitialize(CallInitialize::read(reader)?),
            5 => Self::CallExecutionStateComplete {
                future_id: read_future_id(reader)?,
                result: CallResult::read(reader)?,
            },
            6 => Self::StaticCallExecutionStateInitialize(StaticCallInitialize::read(reader)?),
            7 => Self::StaticCallExecutionStateComplete {
                future_id: read_future_id(reader)?,
                result: StaticCallResult::read(reader)?,
            },
            8 => Self::SendDataExecutionStateInitialize(SendDataInitialize::read(reader)?),
            9 => Self::SendDataExecutionStateComplete {
                future_id: read_future_id(reader)?,
                result: SendDataResult::read(reader)?,
            },
            10 => Self::ContractAtExecutionStateInitialize(ContractAtInitialize::read(reader)?),
            11 => Self::ReadEventArgumentExecutionStateInitialize(
                ReadEventArgumentInitialize::read(reader)?,
            ),
            12 => Self::NetworkInteractionRequest {
                future_id: read_future_id(reader)?,
                network_interaction: NetworkInteraction::read(reader)?,
            },
            13 => Self::TransactionSend {
                future_id: read_future_id(reader)?,
                network_interaction_id: u32::read(reader)?,
                transaction: Transaction::read(reader)?,
                nonce: u64::read(reader)?,
            },
            14 => Self::TransactionConfirm {
                future_id: read_future_id(reader)?,
                network_interaction_id: u32::read(reader)?,
                hash: read_string(reader, MAX_HEX_STRING_LENGTH)?,
                receipt: TransactionReceipt::read(reader)?,
            },
            15 => Self::StaticCallComplete {
                future_id: read_future_id(reader)?,
                network_interaction_id: u32::read(reader)?,
                result: RawStaticCallResult::read(reader)?,
            },
            16 => Self::OnchainInteractionBumpFees {
                future_id: read_future_id(reader)?,
                network_interaction_id: u32::read(reader)?,
            },
            17 => Self::OnchainInteractionDropped {
                future_id: read_future_id(reader)?,
                network_interaction_id: u32::read(reader)?,
            },
            18 => Self::OnchainInteractionReplacedByUser {
                future_id: read_future_id(reader)?,
                network_interaction_id: u32::read(reader)?,
            },
            19 => Self::OnchainInteractionTimeout {
                future_id: read_future_id(reader)?,
                network_interaction_id: u32::read(reader)?,
            },
            i => return Err(Error::InvalidEnum(i)),
        };
        Ok(message)
    }
}

impl EncodeSize for JournalMessage {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::RunStart { .. } => u64::SIZE,
            Self::Wipe { future_id } => string_encode_size(future_id),
            Self::DeploymentExecutionStateInitialize(init) => init.encode_size(),
            Self::DeploymentExecutionStateComplete { future_id, result } => {
                string_encode_size(future_id) + result.encode_size()
            }
            Self::CallExecutionStateInitialize(init) => init.encode_size(),
            Self::CallExecutionStateComplete { future_id, result } => {
                string_encode_size(future_id) + result.encode_size()
            }
            Self::StaticCallExecutionStateInitialize(init) => init.encode_size(),
            Self::StaticCallExecutionStateComplete { future_id, result } => {
                string_encode_size(future_id) + result.encode_size()
            }
            Self::SendDataExecutionStateInitialize(init) => init.encode_size(),
            Self::SendDataExecutionStateComplete { future_id, result } => {
                string_encode_size(future_id) + result.encode_size()
            }
            Self::ContractAtExecutionStateInitialize(init) => init.encode_size(),
            Self::ReadEventArgumentExecutionStateInitialize(init) => init.encode_size(),
            Self::NetworkInteractionRequest {
                future_id,
                network_interaction,
            } => string_encode_size(future_id) + network_interaction.encode_size(),
            Self::TransactionSend {
                future_id,
                transaction,
                ..
            } => string_encode_size(future_id) + u32::SIZE + transaction.encode_size() + u64::SIZE,
            Self::TransactionConfirm {
                future_id,
                hash,
                receipt,
                ..
            } => {
                string_encode_size(future_id)
                    + u32::SIZE
                    + string_encode_size(hash)
                    + receipt.encode_size()
            }
            Self::StaticCallComplete {
                future_id, result, ..
            } => string_encode_size(future_id) + u32::SIZE + result.encode_size(),
            Self::OnchainInteractionBumpFees { future_id, .. }
            | Self::OnchainInteractionDropped { future_id, .. }
            | Self::OnchainInteractionReplacedByUser { future_id, .. }
            | Self::OnchainInteractionTimeout { future_id, .. } => {
                string_encode_size(future_id) + u32::SIZE
            }
        }
    }
}
