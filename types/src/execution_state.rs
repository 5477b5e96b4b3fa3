//! Per-future execution states.
//!
//! Every future of a deployment owns exactly one [`ExecutionState`]. The state records
//! what the future is ([`FutureDescriptor`]), how far it got ([`ExecutionStatus`]) and
//! every network interaction issued on its behalf.

use crate::codec::{
    read_string, read_string_map, read_string_set, string_encode_size, string_map_encode_size,
    string_set_encode_size, write_string, write_string_map, write_string_set,
};
use crate::constants::{
    MAX_DATA_LENGTH, MAX_DEPENDENCIES, MAX_FUTURE_ID_LENGTH, MAX_HEX_STRING_LENGTH,
    MAX_LIBRARIES, MAX_NAME_LENGTH, MAX_NETWORK_INTERACTIONS, MAX_STRING_LENGTH,
};
use crate::codec::read_len;
use crate::network_interaction::NetworkInteraction;
use crate::value::{read_values, values_encode_size, write_values, SolidityValue};
use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, ReadRangeExt, Write};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Overall progress of a future.
///
/// Transitions only go from `Started` to one of the terminal statuses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum ExecutionStatus {
    Started = 0,
    Success = 1,
    Failed = 2,
    Timeout = 3,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Started)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "STARTED",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Timeout => "TIMEOUT",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Write for ExecutionStatus {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for ExecutionStatus {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Started),
            1 => Ok(Self::Success),
            2 => Ok(Self::Failed),
            3 => Ok(Self::Timeout),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for ExecutionStatus {
    const SIZE: usize = 1;
}

/// Plan-level type of a future.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum FutureType {
    NamedArtifactContractDeployment = 0,
    ArtifactContractDeployment = 1,
    NamedArtifactLibraryDeployment = 2,
    ArtifactLibraryDeployment = 3,
    NamedContractCall = 4,
    NamedStaticCall = 5,
    NamedContractAt = 6,
    ArtifactContractAt = 7,
    ReadEventArgument = 8,
    SendData = 9,
}

impl FutureType {
    /// Kind of execution state a future of this type is executed with.
    pub fn state_type(&self) -> ExecutionStateType {
        match self {
            Self::NamedArtifactContractDeployment
            | Self::ArtifactContractDeployment
            | Self::NamedArtifactLibraryDeployment
            | Self::ArtifactLibraryDeployment => ExecutionStateType::Deployment,
            Self::NamedContractCall => ExecutionStateType::Call,
            Self::NamedStaticCall => ExecutionStateType::StaticCall,
            Self::NamedContractAt | Self::ArtifactContractAt => ExecutionStateType::ContractAt,
            Self::ReadEventArgument => ExecutionStateType::ReadEventArgument,
            Self::SendData => ExecutionStateType::SendData,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NamedArtifactContractDeployment => "NAMED_ARTIFACT_CONTRACT_DEPLOYMENT",
            Self::ArtifactContractDeployment => "ARTIFACT_CONTRACT_DEPLOYMENT",
            Self::NamedArtifactLibraryDeployment => "NAMED_ARTIFACT_LIBRARY_DEPLOYMENT",
            Self::ArtifactLibraryDeployment => "ARTIFACT_LIBRARY_DEPLOYMENT",
            Self::NamedContractCall => "NAMED_CONTRACT_CALL",
            Self::NamedStaticCall => "NAMED_STATIC_CALL",
            Self::NamedContractAt => "NAMED_CONTRACT_AT",
            Self::ArtifactContractAt => "ARTIFACT_CONTRACT_AT",
            Self::ReadEventArgument => "READ_EVENT_ARGUMENT",
            Self::SendData => "SEND_DATA",
        }
    }
}

impl fmt::Display for FutureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Write for FutureType {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for FutureType {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::NamedArtifactContractDeployment),
            1 => Ok(Self::ArtifactContractDeployment),
            2 => Ok(Self::NamedArtifactLibraryDeployment),
            3 => Ok(Self::ArtifactLibraryDeployment),
            4 => Ok(Self::NamedContractCall),
            5 => Ok(Self::NamedStaticCall),
            6 => Ok(Self::NamedContractAt),
            7 => Ok(Self::ArtifactContractAt),
            8 => Ok(Self::ReadEventArgument),
            9 => Ok(Self::SendData),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for FutureType {
    const SIZE: usize = 1;
}

/// Kind of an execution state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionStateType {
    #[serde(rename = "DEPLOYMENT_EXECUTION_STATE")]
    Deployment,
    #[serde(rename = "CALL_EXECUTION_STATE")]
    Call,
    #[serde(rename = "STATIC_CALL_EXECUTION_STATE")]
    StaticCall,
    #[serde(rename = "SEND_DATA_EXECUTION_STATE")]
    SendData,
    #[serde(rename = "CONTRACT_AT_EXECUTION_STATE")]
    ContractAt,
    #[serde(rename = "READ_EVENT_ARGUMENT_EXECUTION_STATE")]
    ReadEventArgument,
}

impl ExecutionStateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deployment => "DEPLOYMENT_EXECUTION_STATE",
            Self::Call => "CALL_EXECUTION_STATE",
            Self::StaticCall => "STATIC_CALL_EXECUTION_STATE",
            Self::SendData => "SEND_DATA_EXECUTION_STATE",
            Self::ContractAt => "CONTRACT_AT_EXECUTION_STATE",
            Self::ReadEventArgument => "READ_EVENT_ARGUMENT_EXECUTION_STATE",
        }
    }
}

impl fmt::Display for ExecutionStateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a future, fixed when its execution state is initialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FutureDescriptor {
    pub id: String,
    pub future_type: FutureType,
    pub strategy: String,
    pub dependencies: BTreeSet<String>,
}

impl FutureDescriptor {
    pub fn new<I, S>(id: impl Into<String>, future_type: FutureType, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            future_type,
            strategy: "basic".to_string(),
            dependencies: dependencies.into_iter().map(Into::into).collect(),
        }
    }
}

impl Write for FutureDescriptor {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.id, writer);
        self.future_type.write(writer);
        write_string(&self.strategy, writer);
        write_string_set(&self.dependencies, writer);
    }
}

impl Read for FutureDescriptor {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            id: read_string(reader, MAX_FUTURE_ID_LENGTH)?,
            future_type: FutureType::read(reader)?,
            strategy: read_string(reader, MAX_NAME_LENGTH)?,
            dependencies: read_string_set(reader, MAX_DEPENDENCIES, MAX_FUTURE_ID_LENGTH)?,
        })
    }
}

impl EncodeSize for FutureDescriptor {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.id)
            + FutureType::SIZE
            + string_encode_size(&self.strategy)
            + string_set_encode_size(&self.dependencies)
    }
}

/// Structured reason a future did not succeed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionFailure {
    Revert { message: String },
    StaticCallFailed { message: String },
    SimulationFailed { message: String },
    StrategyError { message: String },
}

impl ExecutionFailure {
    pub fn message(&self) -> &str {
        match self {
            Self::Revert { message }
            | Self::StaticCallFailed { message }
            | Self::SimulationFailed { message }
            | Self::StrategyError { message } => message,
        }
    }

    fn tag(&self) -> u8 {
        match self {
            Self::Revert { .. } => 0,
            Self::StaticCallFailed { .. } => 1,
            Self::SimulationFailed { .. } => 2,
            Self::StrategyError { .. } => 3,
        }
    }
}

impl Write for ExecutionFailure {
    fn write(&self, writer: &mut impl BufMut) {
        self.tag().write(writer);
        write_string(self.message(), writer);
    }
}

impl Read for ExecutionFailure {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let tag = u8::read(reader)?;
        let message = read_string(reader, MAX_STRING_LENGTH)?;
        match tag {
            0 => Ok(Self::Revert { message }),
            1 => Ok(Self::StaticCallFailed { message }),
            2 => Ok(Self::SimulationFailed { message }),
            3 => Ok(Self::StrategyError { message }),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl EncodeSize for ExecutionFailure {
    fn encode_size(&self) -> usize {
        1 + string_encode_size(self.message())
    }
}

/// Outcome recorded by a completion message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecutionResult<T> {
    Success(T),
    Failure(ExecutionFailure),
}

impl<T> ExecutionResult<T> {
    /// Status a future ends with after recording this result.
    pub fn status(&self) -> ExecutionStatus {
        match self {
            Self::Success(_) => ExecutionStatus::Success,
            Self::Failure(_) => ExecutionStatus::Failed,
        }
    }
}

impl<T: Write> Write for ExecutionResult<T> {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Success(value) => {
                0u8.write(writer);
                value.write(writer);
            }
            Self::Failure(failure) => {
                1u8.write(writer);
                failure.write(writer);
            }
        }
    }
}

impl<T: Read<Cfg = ()>> Read for ExecutionResult<T> {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Success(T::read(reader)?)),
            1 => Ok(Self::Failure(ExecutionFailure::read(reader)?)),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl<T: EncodeSize> EncodeSize for ExecutionResult<T> {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::Success(value) => value.encode_size(),
            Self::Failure(failure) => failure.encode_size(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSuccess {
    pub address: String,
}

impl Write for DeploymentSuccess {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.address, writer);
    }
}

impl Read for DeploymentSuccess {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            address: read_string(reader, MAX_HEX_STRING_LENGTH)?,
        })
    }
}

impl EncodeSize for DeploymentSuccess {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.address)
    }
}

/// A successful call or send-data carries no payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completed;

impl Write for Completed {
    fn write(&self, _: &mut impl BufMut) {}
}

impl Read for Completed {
    type Cfg = ();

    fn read_cfg(_: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self)
    }
}

impl EncodeSize for Completed {
    fn encode_size(&self) -> usize {
        0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticCallSuccess {
    pub value: SolidityValue,
}

impl Write for StaticCallSuccess {
    fn write(&self, writer: &mut impl BufMut) {
        self.value.write(writer);
    }
}

impl Read for StaticCallSuccess {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            value: SolidityValue::read(reader)?,
        })
    }
}

impl EncodeSize for StaticCallSuccess {
    fn encode_size(&self) -> usize {
        self.value.encode_size()
    }
}

pub type DeploymentResult = ExecutionResult<DeploymentSuccess>;
pub type CallResult = ExecutionResult<Completed>;
pub type StaticCallResult = ExecutionResult<StaticCallSuccess>;
pub type SendDataResult = ExecutionResult<Completed>;

fn write_interactions(interactions: &[NetworkInteraction], writer: &mut impl BufMut) {
    (interactions.len() as u32).write(writer);
    for interaction in interactions {
        interaction.write(writer);
    }
}

fn read_interactions(reader: &mut impl Buf) -> Result<Vec<NetworkInteraction>, Error> {
    let len = read_len(reader, MAX_NETWORK_INTERACTIONS, "NetworkInteractions")?;
    let mut interactions = Vec::with_capacity(len);
    for _ in 0..len {
        interactions.push(NetworkInteraction::read(reader)?);
    }
    Ok(interactions)
}

fn interactions_encode_size(interactions: &[NetworkInteraction]) -> usize {
    4 + interactions
        .iter()
        .map(EncodeSize::encode_size)
        .sum::<usize>()
}

fn write_optional<T: Write>(value: Option<&T>, writer: &mut impl BufMut) {
    match value {
        Some(value) => {
            true.write(writer);
            value.write(writer);
        }
        None => false.write(writer),
    }
}

fn read_optional<T: Read<Cfg = ()>>(reader: &mut impl Buf) -> Result<Option<T>, Error> {
    if bool::read(reader)? {
        Ok(Some(T::read(reader)?))
    } else {
        Ok(None)
    }
}

fn optional_encode_size<T: EncodeSize>(value: Option<&T>) -> usize {
    1 + value.map(EncodeSize::encode_size).unwrap_or(0)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentExecutionState {
    #[serde(flatten)]
    pub future: FutureDescriptor,
    pub status: ExecutionStatus,
    pub artifact_future_id: String,
    pub contract_name: String,
    pub constructor_args: Vec<SolidityValue>,
    pub libraries: BTreeMap<String, String>,
    #[serde(with = "crate::codec::serde_u128")]
    pub value: u128,
    pub from: String,
    pub network_interactions: Vec<NetworkInteraction>,
    pub result: Option<DeploymentResult>,
}

impl Write for DeploymentExecutionState {
    fn write(&self, writer: &mut impl BufMut) {
        self.future.write(writer);
        self.status.write(writer);
        write_string(&self.artifact_future_id, writer);
        write_string(&self.contract_name, writer);
        write_values(&self.constructor_args, writer);
        write_string_map(&self.libraries, writer);
        self.value.write(writer);
        write_string(&self.from, writer);
        write_interactions(&self.network_interactions, writer);
        write_optional(self.result.as_ref(), writer);
    }
}

impl Read for DeploymentExecutionState {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            future: FutureDescriptor::read(reader)?,
            status: ExecutionStatus::read(reader)?,
            artifact_future_id: read_string(reader, MAX_FUTURE_ID_LENGTH)?,
            contract_name: read_string(reader, MAX_NAME_LENGTH)?,
            constructor_args: read_values(reader)?,
            libraries: read_string_map(reader, MAX_LIBRARIES, MAX_NAME_LENGTH)?,
            value: u128::read(reader)?,
            from: read_string(reader, MAX_HEX_STRING_LENGTH)?,
            network_interactions: read_interactions(reader)?,
            result: read_optional(reader)?,
        })
    }
}

impl EncodeSize for DeploymentExecutionState {
    fn encode_size(&self) -> usize {
        self.future.encode_size()
            + ExecutionStatus::SIZE
            + string_encode_size(&self.artifact_future_id)
            + string_encode_size(&self.contract_name)
            + values_encode_size(&self.constructor_args)
            + string_map_encode_size(&self.libraries)
            + self.value.encode_size()
            + string_encode_size(&self.from)
            + interactions_encode_size(&self.network_interactions)
            + optional_encode_size(self.result.as_ref())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallExecutionState {
    #[serde(flatten)]
    pub future: FutureDescriptor,
    pub status: ExecutionStatus,
    pub artifact_future_id: String,
    pub contract_address: String,
    pub function_name: String,
    pub args: Vec<SolidityValue>,
    #[serde(with = "crate::codec::serde_u128")]
    pub value: u128,
    pub from: String,
    pub network_interactions: Vec<NetworkInteraction>,
    pub result: Option<CallResult>,
}

impl Write for CallExecutionState {
    fn write(&self, writer: &mut impl BufMut) {
        self.future.write(writer);
        self.status.write(writer);
        write_string(&self.artifact_future_id, writer);
        write_string(&self.contract_address, writer);
        write_string(&self.function_name, writer);
        write_values(&self.args, writer);
        self.value.write(writer);
        write_string(&self.from, writer);
        write_interactions(&self.network_interactions, writer);
        write_optional(self.result.as_ref(), writer);
    }
}

impl Read for CallExecutionState {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            future: FutureDescriptor::read(reader)?,
            status: ExecutionStatus::read(reader)?,
            artifact_future_id: read_string(reader, MAX_FUTURE_ID_LENGTH)?,
            contract_address: read_string(reader, MAX_HEX_STRING_LENGTH)?,
            function_name: read_string(reader, MAX_NAME_LENGTH)?,
            args: read_values(reader)?,
            value: u128::read(reader)?,
            from: read_string(reader, MAX_HEX_STRING_LENGTH)?,
            network_interactions: read_interactions(reader)?,
            result: read_optional(reader)?,
        })
    }
}

impl EncodeSize for CallExecutionState {
    fn encode_size(&self) -> usize {
        self.future.encode_size()
            + ExecutionStatus::SIZE
            + string_encode_size(&self.artifact_future_id)
            + string_encode_size(&self.contract_address)
            + string_encode_size(&self.function_name)
            + values_encode_size(&self.args)
            + self.value.encode_size()
            + string_encode_size(&self.from)
            + interactions_encode_size(&self.network_interactions)
            + optional_encode_size(self.result.as_ref())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticCallExecutionState {
    #[serde(flatten)]
    pub future: FutureDescriptor,
    pub status: ExecutionStatus,
    pub artifact_future_id: String,
    pub contract_address: String,
    pub function_name: String,
    pub args: Vec<SolidityValue>,
    /// Name or position of the return value to extract.
    pub name_or_index: String,
    pub from: String,
    pub network_interactions: Vec<NetworkInteraction>,
    pub result: Option<StaticCallResult>,
}

impl Write for StaticCallExecutionState {
    fn write(&self, writer: &mut impl BufMut) {
        self.future.write(writer);
        self.status.write(writer);
        write_string(&self.artifact_future_id, writer);
        write_string(&self.contract_address, writer);
        write_string(&self.function_name, writer);
        write_values(&self.args, writer);
        write_string(&self.name_or_index, writer);
        write_string(&self.from, writer);
        write_interactions(&self.network_interactions, writer);
        write_optional(self.result.as_ref(), writer);
    }
}

impl Read for StaticCallExecutionState {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            future: FutureDescriptor::read(reader)?,
            status: ExecutionStatus::read(reader)?,
            artifact_future_id: read_string(reader, MAX_FUTURE_ID_LENGTH)?,
            contract_address: read_string(reader, MAX_HEX_STRING_LENGTH)?,
            function_name: read_string(reader, MAX_NAME_LENGTH)?,
            args: read_values(reader)?,
            name_or_index: read_string(reader, MAX_NAME_LENGTH)?,
            from: read_string(reader, MAX_HEX_STRING_LENGTH)?,
            network_interactions: read_interactions(reader)?,
            result: read_optional(reader)?,
        })
    }
}

impl EncodeSize for StaticCallExecutionState {
    fn encode_size(&self) -> usize {
        self.future.encode_size()
            + ExecutionStatus::SIZE
            + string_encode_size(&self.artifact_future_id)
            + string_encode_size(&self.contract_address)
            + string_encode_size(&self.function_name)
            + values_encode_size(&self.args)
            + string_encode_size(&self.name_or_index)
            + string_encode_size(&self.from)
            + interactions_encode_size(&self.network_interactions)
            + optional_encode_size(self.result.as_ref())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendDataExecutionState {
    #[serde(flatten)]
    pub future: FutureDescriptor,
    pub status: ExecutionStatus,
    pub to: String,
    #[serde(with = "crate::codec::serde_hex")]
    pub data: Vec<u8>,
    #[serde(with = "crate::codec::serde_u128")]
    pub value: u128,
    pub from: String,
    pub network_interactions: Vec<NetworkInteraction>,
    pub result: Option<SendDataResult>,
}

impl Write for SendDataExecutionState {
    fn write(&self, writer: &mut impl BufMut) {
        self.future.write(writer);
        self.status.write(writer);
        write_string(&self.to, writer);
        self.data.write(writer);
        self.value.write(writer);
        write_string(&self.from, writer);
        write_interactions(&self.network_interactions, writer);
        write_optional(self.result.as_ref(), writer);
    }
}

impl Read for SendDataExecutionState {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            future: FutureDescriptor::read(reader)?,
            status: ExecutionStatus::read(reader)?,
            to: read_string(reader, MAX_HEX_STRING_LENGTH)?,
            data: Vec::<u8>::read_range(reader, 0..=MAX_DATA_LENGTH)?,
            value: u128::read(reader)?,
            from: read_string(reader, MAX_HEX_STRING_LENGTH)?,
            network_interactions: read_interactions(reader)?,
            result: read_optional(reader)?,
        })
    }
}

impl EncodeSize for SendDataExecutionState {
    fn encode_size(&self) -> usize {
        self.future.encode_size()
            + ExecutionStatus::SIZE
            + string_encode_size(&self.to)
            + self.data.encode_size()
            + self.value.encode_size()
            + string_encode_size(&self.from)
            + interactions_encode_size(&self.network_interactions)
            + optional_encode_size(self.result.as_ref())
    }
}

/// A contract that already exists at a known address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractAtExecutionState {
    #[serde(flatten)]
    pub future: FutureDescriptor,
    pub status: ExecutionStatus,
    pub artifact_future_id: String,
    pub contract_name: String,
    pub contract_address: String,
}

impl Write for ContractAtExecutionState {
    fn write(&self, writer: &mut impl BufMut) {
        self.future.write(writer);
        self.status.write(writer);
        write_string(&self.artifact_future_id, writer);
        write_string(&self.contract_name, writer);
        write_string(&self.contract_address, writer);
    }
}

impl Read for ContractAtExecutionState {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            future: FutureDescriptor::read(reader)?,
            status: ExecutionStatus::read(reader)?,
            artifact_future_id: read_string(reader, MAX_FUTURE_ID_LENGTH)?,
            contract_name: read_string(reader, MAX_NAME_LENGTH)?,
            contract_address: read_string(reader, MAX_HEX_STRING_LENGTH)?,
        })
    }
}

impl EncodeSize for ContractAtExecutionState {
    fn encode_size(&self) -> usize {
        self.future.encode_size()
            + ExecutionStatus::SIZE
            + string_encode_size(&self.artifact_future_id)
            + string_encode_size(&self.contract_name)
            + string_encode_size(&self.contract_address)
    }
}

/// An event argument read from the receipt of an earlier transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadEventArgumentExecutionState {
    #[serde(flatten)]
    pub future: FutureDescriptor,
    pub status: ExecutionStatus,
    pub artifact_future_id: String,
    pub event_name: String,
    pub argument_name: String,
    pub event_index: u32,
    pub emitter_address: String,
    pub tx_to_read_from: String,
    pub result: SolidityValue,
}

impl Write for ReadEventArgumentExecutionState {
    fn write(&self, writer: &mut impl BufMut) {
        self.future.write(writer);
        self.status.write(writer);
        write_string(&self.artifact_future_id, writer);
        write_string(&self.event_name, writer);
        write_string(&self.argument_name, writer);
        self.event_index.write(writer);
        write_string(&self.emitter_address, writer);
        write_string(&self.tx_to_read_from, writer);
        self.result.write(writer);
    }
}

impl Read for ReadEventArgumentExecutionState {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            future: FutureDescriptor::read(reader)?,
            status: ExecutionStatus::read(reader)?,
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

impl EncodeSize for ReadEventArgumentExecutionState {
    fn encode_size(&self) -> usize {
        self.future.encode_size()
            + ExecutionStatus::SIZE
            + string_encode_size(&self.artifact_future_id)
            + string_encode_size(&self.event_name)
            + string_encode_size(&self.argument_name)
            + self.event_index.encode_size()
            + string_encode_size(&self.emitter_address)
            + string_encode_size(&self.tx_to_read_from)
            + self.result.encode_size()
    }
}

/// Execution state of one future, keyed by kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExecutionState {
    #[serde(rename = "DEPLOYMENT_EXECUTION_STATE")]
    Deployment(DeploymentExecutionState),
    #[serde(rename = "CALL_EXECUTION_STATE")]
    Call(CallExecutionState),
    #[serde(rename = "STATIC_CALL_EXECUTION_STATE")]
    StaticCall(StaticCallExecutionState),
    #[serde(rename = "SEND_DATA_EXECUTION_STATE")]
    SendData(SendDataExecutionState),
    #[serde(rename = "CONTRACT_AT_EXECUTION_STATE")]
    ContractAt(ContractAtExecutionState),
    #[serde(rename = "READ_EVENT_ARGUMENT_EXECUTION_STATE")]
    ReadEventArgument(ReadEventArgumentExecutionState),
}

impl ExecutionState {
    pub fn future(&self) -> &FutureDescriptor {
        match self {
            Self::Deployment(state) => &state.future,
            Self::Call(state) => &state.future,
            Self::StaticCall(state) => &state.future,
            Self::SendData(state) => &state.future,
            Self::ContractAt(state) => &state.future,
            Self::ReadEventArgument(state) => &state.future,
        }
    }

    pub fn id(&self) -> &str {
        &self.future().id
    }

    pub fn future_type(&self) -> FutureType {
        self.future().future_type
    }

    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.future().dependencies
    }

    pub fn status(&self) -> ExecutionStatus {
        match self {
            Self::Deployment(state) => state.status,
            Self::Call(state) => state.status,
            Self::StaticCall(state) => state.status,
            Self::SendData(state) => state.status,
            Self::ContractAt(state) => state.status,
            Self::ReadEventArgument(state) => state.status,
        }
    }

    pub fn state_type(&self) -> ExecutionStateType {
        match self {
            Self::Deployment(_) => ExecutionStateType::Deployment,
            Self::Call(_) => ExecutionStateType::Call,
            Self::StaticCall(_) => ExecutionStateType::StaticCall,
            Self::SendData(_) => ExecutionStateType::SendData,
            Self::ContractAt(_) => ExecutionStateType::ContractAt,
            Self::ReadEventArgument(_) => ExecutionStateType::ReadEventArgument,
        }
    }

    /// Interactions issued so far. Empty for kinds that never reach the network.
    pub fn network_interactions(&self) -> &[NetworkInteraction] {
        match self {
            Self::Deployment(state) => &state.network_interactions,
            Self::Call(state) => &state.network_interactions,
            Self::StaticCall(state) => &state.network_interactions,
            Self::SendData(state) => &state.network_interactions,
            Self::ContractAt(_) | Self::ReadEventArgument(_) => &[],
        }
    }
}

impl Write for ExecutionState {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Deployment(state) => {
                0u8.write(writer);
                state.write(writer);
            }
            Self::Call(state) => {
                1u8.write(writer);
                state.write(writer);
            }
            Self::StaticCall(state) => {
                2u8.write(writer);
                state.write(writer);
            }
            Self::SendData(state) => {
                3u8.write(writer);
                state.write(writer);
            }
            Self::ContractAt(state) => {
                4u8.write(writer);
                state.write(writer);
            }
            Self::ReadEventArgument(state) => {
                5u8.write(writer);
                state.write(writer);
            }
        }
    }
}

impl Read for ExecutionState {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Deployment(DeploymentExecutionState::read(reader)?)),
            1 => Ok(Self::Call(CallExecutionState::read(reader)?)),
            2 => Ok(Self::StaticCall(StaticCallExecutionState::read(reader)?)),
            3 => Ok(Self::SendData(SendDataExecutionState::read(reader)?)),
            4 => Ok(Self::ContractAt(ContractAtExecutionState::read(reader)?)),
            5 => Ok(Self::ReadEventArgument(
                ReadEventArgumentExecutionState::read(reader)?,
            )),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl EncodeSize for ExecutionState {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::Deployment(state) => state.encode_size(),
            Self::Call(state) => state.encode_size(),
            Self::StaticCall(state) => state.encode_size(),
            Self::SendData(state) => state.encode_size(),
            Self::ContractAt(state) => state.encode_size(),
            Self::ReadEventArgument(state) => state.encode_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network_interaction::OnchainInteraction;
    use commonware_codec::{DecodeExt, Encode};

    fn deployment() -> ExecutionState {
        ExecutionState::Deployment(DeploymentExecutionState {
            future: FutureDescriptor::new(
                "Module#Token",
                FutureType::NamedArtifactContractDeployment,
                ["Module#Lib"],
            ),
            status: ExecutionStatus::Success,
            artifact_future_id: "Module#Token".to_string(),
            contract_name: "Token".to_string(),
            constructor_args: vec![SolidityValue::Uint(1_000), SolidityValue::Bool(true)],
            libraries: BTreeMap::from([(
                "Lib".to_string(),
                "0x5fbdb2315678afecb367f032d93f642f64180aa3".to_string(),
            )]),
            value: 0,
            from: "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".to_string(),
            network_interactions: vec![NetworkInteraction::Onchain(OnchainInteraction::new(
                0,
                None,
                vec![0x60, 0x80],
                0,
                "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            ))],
            result: Some(ExecutionResult::Success(DeploymentSuccess {
                address: "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512".to_string(),
            })),
        })
    }

    #[test]
    fn future_types_map_to_state_types() {
        assert_eq!(
            FutureType::ArtifactLibraryDeployment.state_type(),
            ExecutionStateType::Deployment
        );
        assert_eq!(
            FutureType::ArtifactContractAt.state_type(),
            ExecutionStateType::ContractAt
        );
        assert_eq!(
            FutureType::NamedStaticCall.state_type(),
            ExecutionStateType::StaticCall
        );
        assert_eq!(FutureType::SendData.state_type(), ExecutionStateType::SendData);
    }

    #[test]
    fn only_started_is_not_terminal() {
        assert!(!ExecutionStatus::Started.is_terminal());
        assert!(ExecutionStatus::Success.is_terminal());
        assert!(ExecutionStatus::Failed.is_terminal());
        assert!(ExecutionStatus::Timeout.is_terminal());
    }

    #[test]
    fn execution_state_roundtrips() {
        let state = deployment();
        let encoded = state.encode();
        assert_eq!(encoded.len(), state.encode_size());
        assert_eq!(ExecutionState::decode(encoded).unwrap(), state);
    }

    #[test]
    fn failure_result_roundtrips() {
        let result: CallResult = ExecutionResult::Failure(ExecutionFailure::Revert {
            message: "Ownable: caller is not the owner".to_string(),
        });
        assert_eq!(result.status(), ExecutionStatus::Failed);
        let encoded = result.encode();
        assert_eq!(CallResult::decode(encoded).unwrap(), result);
    }

    #[test]
    fn rejects_unknown_status() {
        assert!(matches!(
            ExecutionStatus::read(&mut &[9u8][..]),
            Err(Error::InvalidEnum(9))
        ));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(deployment()).unwrap();
        assert_eq!(json["type"], "DEPLOYMENT_EXECUTION_STATE");
        assert_eq!(json["id"], "Module#Token");
        assert_eq!(json["futureType"], "NAMED_ARTIFACT_CONTRACT_DEPLOYMENT");
        assert_eq!(json["status"], "SUCCESS");
    }
}
