//! Network interactions and their transaction attempts.
//!
//! A [`NetworkInteraction`] is one logical call issued on behalf of a future. Onchain
//! interactions accumulate [`Transaction`] attempts (initial send, fee bumps, resends)
//! until one of them confirms; static calls hold their result directly.
//!
//! The functions at the bottom of this module are the only way an interaction list
//! changes. Each takes the current list by reference and returns a new one, leaving the
//! input untouched so earlier projections stay valid.

use crate::codec::{
    optional_string_encode_size, read_len, read_optional_string, read_string, string_encode_size,
    write_optional_string, write_string,
};
use crate::constants::{
    MAX_DATA_LENGTH, MAX_HEX_STRING_LENGTH, MAX_LOGS, MAX_TOPICS, MAX_TRANSACTIONS,
};
use crate::error::InvariantViolation;
use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, ReadRangeExt, Write};
use serde::{Deserialize, Serialize};

/// Fee parameters a transaction was broadcast with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NetworkFees {
    #[serde(rename_all = "camelCase")]
    Eip1559 {
        #[serde(with = "crate::codec::serde_u128")]
        max_fee_per_gas: u128,
        #[serde(with = "crate::codec::serde_u128")]
        max_priority_fee_per_gas: u128,
    },
    #[serde(rename_all = "camelCase")]
    Legacy {
        #[serde(with = "crate::codec::serde_u128")]
        gas_price: u128,
    },
}

impl Write for NetworkFees {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => {
                0u8.write(writer);
                max_fee_per_gas.write(writer);
                max_priority_fee_per_gas.write(writer);
            }
            Self::Legacy { gas_price } => {
                1u8.write(writer);
                gas_price.write(writer);
            }
        }
    }
}

impl Read for NetworkFees {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Eip1559 {
                max_fee_per_gas: u128::read(reader)?,
                max_priority_fee_per_gas: u128::read(reader)?,
            }),
            1 => Ok(Self::Legacy {
                gas_price: u128::read(reader)?,
            }),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl EncodeSize for NetworkFees {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::Eip1559 { .. } => 32,
            Self::Legacy { .. } => 16,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum TransactionReceiptStatus {
    Success = 0,
    Failure = 1,
}

impl Write for TransactionReceiptStatus {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for TransactionReceiptStatus {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Success),
            1 => Ok(Self::Failure),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for TransactionReceiptStatus {
    const SIZE: usize = 1;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionLog {
    pub address: String,
    pub log_index: u32,
    #[serde(with = "crate::codec::serde_hex")]
    pub data: Vec<u8>,
    pub topics: Vec<String>,
}

impl Write for TransactionLog {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.address, writer);
        self.log_index.write(writer);
        self.data.write(writer);
        (self.topics.len() as u32).write(writer);
        for topic in &self.topics {
            write_string(topic, writer);
        }
    }
}

impl Read for TransactionLog {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let address = read_string(reader, MAX_HEX_STRING_LENGTH)?;
        let log_index = u32::read(reader)?;
        let data = Vec::<u8>::read_range(reader, 0..=MAX_DATA_LENGTH)?;
        let topic_count = read_len(reader, MAX_TOPICS, "TransactionLog")?;
        let mut topics = Vec::with_capacity(topic_count);
        for _ in 0..topic_count {
            topics.push(read_string(reader, MAX_HEX_STRING_LENGTH)?);
        }
        Ok(Self {
            address,
            log_index,
            data,
            topics,
        })
    }
}

impl EncodeSize for TransactionLog {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.address)
            + self.log_index.encode_size()
            + self.data.encode_size()
            + 4
            + self
                .topics
                .iter()
                .map(|t| string_encode_size(t))
                .sum::<usize>()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub block_hash: String,
    pub block_number: u64,
    pub contract_address: Option<String>,
    pub status: TransactionReceiptStatus,
    pub logs: Vec<TransactionLog>,
}

impl Write for TransactionReceipt {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.block_hash, writer);
        self.block_number.write(writer);
        write_optional_string(self.contract_address.as_deref(), writer);
        self.status.write(writer);
        (self.logs.len() as u32).write(writer);
        for log in &self.logs {
            log.write(writer);
        }
    }
}

impl Read for TransactionReceipt {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let block_hash = read_string(reader, MAX_HEX_STRING_LENGTH)?;
        let block_number = u64::read(reader)?;
        let contract_address = read_optional_string(reader, MAX_HEX_STRING_LENGTH)?;
        let status = TransactionReceiptStatus::read(reader)?;
        let log_count = read_len(reader, MAX_LOGS, "TransactionReceipt")?;
        let mut logs = Vec::with_capacity(log_count);
        for _ in 0..log_count {
            logs.push(TransactionLog::read(reader)?);
        }
        Ok(Self {
            block_hash,
            block_number,
            contract_address,
            status,
            logs,
        })
    }
}

impl EncodeSize for TransactionReceipt {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.block_hash)
            + self.block_number.encode_size()
            + optional_string_encode_size(self.contract_address.as_deref())
            + TransactionReceiptStatus::SIZE
            + 4
            + self.logs.iter().map(EncodeSize::encode_size).sum::<usize>()
    }
}

/// One broadcast attempt of an onchain interaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: String,
    pub fees: NetworkFees,
    pub receipt: Option<TransactionReceipt>,
}

impl Transaction {
    /// Creates a transaction that has been sent but not confirmed.
    pub fn sent(hash: impl Into<String>, fees: NetworkFees) -> Self {
        Self {
            hash: hash.into(),
            fees,
            receipt: None,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.receipt.is_some()
    }
}

impl Write for Transaction {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.hash, writer);
        self.fees.write(writer);
        match &self.receipt {
            Some(receipt) => {
                true.write(writer);
                receipt.write(writer);
            }
            None => false.write(writer),
        }
    }
}

impl Read for Transaction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let hash = read_string(reader, MAX_HEX_STRING_LENGTH)?;
        let fees = NetworkFees::read(reader)?;
        let receipt = if bool::read(reader)? {
            Some(TransactionReceipt::read(reader)?)
        } else {
            None
        };
        Ok(Self {
            hash,
            fees,
            receipt,
        })
    }
}

impl EncodeSize for Transaction {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.hash)
            + self.fees.encode_size()
            + 1
            + self.receipt.as_ref().map(EncodeSize::encode_size).unwrap_or(0)
    }
}

/// A state-changing interaction, landed through one or more transactions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnchainInteraction {
    pub id: u32,
    /// Absent for contract creation.
    pub to: Option<String>,
    #[serde(with = "crate::codec::serde_hex")]
    pub data: Vec<u8>,
    #[serde(with = "crate::codec::serde_u128")]
    pub value: u128,
    pub from: String,
    pub nonce: Option<u64>,
    pub transactions: Vec<Transaction>,
    pub should_be_resent: bool,
}

impl OnchainInteraction {
    /// Creates an interaction with no transactions sent yet.
    pub fn new(
        id: u32,
        to: Option<String>,
        data: Vec<u8>,
        value: u128,
        from: impl Into<String>,
    ) -> Self {
        Self {
            id,
            to,
            data,
            value,
            from: from.into(),
            nonce: None,
            transactions: Vec::new(),
            should_be_resent: false,
        }
    }

    /// Returns the confirmed transaction, if any.
    pub fn confirmed_transaction(&self) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.is_confirmed())
    }

    /// An interaction is resolved once one of its transactions confirmed.
    pub fn is_resolved(&self) -> bool {
        self.confirmed_transaction().is_some()
    }
}

impl Write for OnchainInteraction {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        write_optional_string(self.to.as_deref(), writer);
        self.data.write(writer);
        self.value.write(writer);
        write_string(&self.from, writer);
        match self.nonce {
            Some(nonce) => {
                true.write(writer);
                nonce.write(writer);
            }
            None => false.write(writer),
        }
        (self.transactions.len() as u32).write(writer);
        for transaction in &self.transactions {
            transaction.write(writer);
        }
        self.should_be_resent.write(writer);
    }
}

impl Read for OnchainInteraction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let id = u32::read(reader)?;
        let to = read_optional_string(reader, MAX_HEX_STRING_LENGTH)?;
        let data = Vec::<u8>::read_range(reader, 0..=MAX_DATA_LENGTH)?;
        let value = u128::read(reader)?;
        let from = read_string(reader, MAX_HEX_STRING_LENGTH)?;
        let nonce = if bool::read(reader)? {
            Some(u64::read(reader)?)
        } else {
            None
        };
        let count = read_len(reader, MAX_TRANSACTIONS, "OnchainInteraction")?;
        let mut transactions = Vec::with_capacity(count);
        for _ in 0..count {
            transactions.push(Transaction::read(reader)?);
        }
        let should_be_resent = bool::read(reader)?;
        Ok(Self {
            id,
            to,
            data,
            value,
            from,
            nonce,
            transactions,
            should_be_resent,
        })
    }
}

impl EncodeSize for OnchainInteraction {
    fn encode_size(&self) -> usize {
        self.id.encode_size()
            + optional_string_encode_size(self.to.as_deref())
            + self.data.encode_size()
            + self.value.encode_size()
            + string_encode_size(&self.from)
            + 1
            + self.nonce.map(|_| u64::SIZE).unwrap_or(0)
            + 4
            + self
                .transactions
                .iter()
                .map(EncodeSize::encode_size)
                .sum::<usize>()
            + 1
    }
}

/// Raw outcome of an `eth_call`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStaticCallResult {
    #[serde(with = "crate::codec::serde_hex")]
    pub return_data: Vec<u8>,
    pub success: bool,
    pub custom_error_reported: bool,
}

impl Write for RawStaticCallResult {
    fn write(&self, writer: &mut impl BufMut) {
        self.return_data.write(writer);
        self.success.write(writer);
        self.custom_error_reported.write(writer);
    }
}

impl Read for RawStaticCallResult {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            return_data: Vec::<u8>::read_range(reader, 0..=MAX_DATA_LENGTH)?,
            success: bool::read(reader)?,
            custom_error_reported: bool::read(reader)?,
        })
    }
}

impl EncodeSize for RawStaticCallResult {
    fn encode_size(&self) -> usize {
        self.return_data.encode_size() + 2
    }
}

/// A read-only call. It never has transactions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticCall {
    pub id: u32,
    pub to: Option<String>,
    #[serde(with = "crate::codec::serde_hex")]
    pub data: Vec<u8>,
    #[serde(with = "crate::codec::serde_u128")]
    pub value: u128,
    pub from: String,
    pub result: Option<RawStaticCallResult>,
}

impl StaticCall {
    pub fn new(
        id: u32,
        to: Option<String>,
        data: Vec<u8>,
        value: u128,
        from: impl Into<String>,
    ) -> Self {
        Self {
            id,
            to,
            data,
            value,
            from: from.into(),
            result: None,
        }
    }
}

impl Write for StaticCall {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        write_optional_string(self.to.as_deref(), writer);
        self.data.write(writer);
        self.value.write(writer);
        write_string(&self.from, writer);
        match &self.result {
            Some(result) => {
                true.write(writer);
                result.write(writer);
            }
            None => false.write(writer),
        }
    }
}

impl Read for StaticCall {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let id = u32::read(reader)?;
        let to = read_optional_string(reader, MAX_HEX_STRING_LENGTH)?;
        let data = Vec::<u8>::read_range(reader, 0..=MAX_DATA_LENGTH)?;
        let value = u128::read(reader)?;
        let from = read_string(reader, MAX_HEX_STRING_LENGTH)?;
        let result = if bool::read(reader)? {
            Some(RawStaticCallResult::read(reader)?)
        } else {
            None
        };
        Ok(Self {
            id,
            to,
            data,
            value,
            from,
            result,
        })
    }
}

impl EncodeSize for StaticCall {
    fn encode_size(&self) -> usize {
        self.id.encode_size()
            + optional_string_encode_size(self.to.as_deref())
            + self.data.encode_size()
            + self.value.encode_size()
            + string_encode_size(&self.from)
            + 1
            + self.result.as_ref().map(EncodeSize::encode_size).unwrap_or(0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NetworkInteraction {
    #[serde(rename = "ONCHAIN_INTERACTION")]
    Onchain(OnchainInteraction),
    #[serde(rename = "STATIC_CALL")]
    StaticCall(StaticCall),
}

impl NetworkInteraction {
    pub fn id(&self) -> u32 {
        match self {
            Self::Onchain(interaction) => interaction.id,
            Self::StaticCall(call) => call.id,
        }
    }

    pub fn as_onchain(&self) -> Option<&OnchainInteraction> {
        match self {
            Self::Onchain(interaction) => Some(interaction),
            Self::StaticCall(_) => None,
        }
    }

    pub fn as_static_call(&self) -> Option<&StaticCall> {
        match self {
            Self::Onchain(_) => None,
            Self::StaticCall(call) => Some(call),
        }
    }
}

impl Write for NetworkInteraction {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Onchain(interaction) => {
                0u8.write(writer);
                interaction.write(writer);
            }
            Self::StaticCall(call) => {
                1u8.write(writer);
                call.write(writer);
            }
        }
    }
}

impl Read for NetworkInteraction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Onchain(OnchainInteraction::read(reader)?)),
            1 => Ok(Self::StaticCall(StaticCall::read(reader)?)),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl EncodeSize for NetworkInteraction {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::Onchain(interaction) => interaction.encode_size(),
            Self::StaticCall(call) => call.encode_size(),
        }
    }
}

fn position_of(interactions: &[NetworkInteraction], id: u32) -> Result<usize, InvariantViolation> {
    interactions
        .iter()
        .position(|interaction| interaction.id() == id)
        .ok_or(InvariantViolation::UnknownNetworkInteraction { id })
}

fn replace_at(
    interactions: &[NetworkInteraction],
    position: usize,
    interaction: NetworkInteraction,
) -> Vec<NetworkInteraction> {
    let mut next = interactions.to_vec();
    next[position] = interaction;
    next
}

fn update_onchain_interaction<F>(
    interactions: &[NetworkInteraction],
    id: u32,
    update: F,
) -> Result<Vec<NetworkInteraction>, InvariantViolation>
where
    F: FnOnce(&OnchainInteraction) -> Result<OnchainInteraction, InvariantViolation>,
{
    let position = position_of(interactions, id)?;
    let NetworkInteraction::Onchain(interaction) = &interactions[position] else {
        return Err(InvariantViolation::NotOnchainInteraction { id });
    };
    let updated = update(interaction)?;
    Ok(replace_at(
        interactions,
        position,
        NetworkInteraction::Onchain(updated),
    ))
}

/// Appends a newly requested interaction.
///
/// Ids are assigned by the orchestrator, starting at 0, one per request.
pub fn append_network_interaction(
    interactions: &[NetworkInteraction],
    interaction: NetworkInteraction,
) -> Result<Vec<NetworkInteraction>, InvariantViolation> {
    let expected = interactions.len() as u32;
    if interaction.id() != expected {
        return Err(InvariantViolation::NonSequentialNetworkInteraction {
            expected,
            got: interaction.id(),
        });
    }
    let mut next = interactions.to_vec();
    next.push(interaction);
    Ok(next)
}

/// Records a transaction attempt on an onchain interaction.
///
/// A hash that is already recorded is accepted as a no-op, so an attempt observed
/// twice (e.g. after a crash between broadcast and journaling) is harmless.
pub fn append_transaction(
    interactions: &[NetworkInteraction],
    id: u32,
    transaction: Transaction,
    nonce: u64,
) -> Result<Vec<NetworkInteraction>, InvariantViolation> {
    update_onchain_interaction(interactions, id, |interaction| {
        if interaction
            .transactions
            .iter()
            .any(|tx| tx.hash == transaction.hash)
        {
            return Ok(interaction.clone());
        }
        if interaction.is_resolved() {
            return Err(InvariantViolation::InteractionResolved { id });
        }
        if transaction.is_confirmed() {
            return Err(InvariantViolation::SentTransactionHasReceipt {
                id,
                hash: transaction.hash,
            });
        }
        if let Some(expected) = interaction.nonce {
            if expected != nonce {
                return Err(InvariantViolation::NonceMismatch {
                    id,
                    expected,
                    got: nonce,
                });
            }
        }

        let mut transactions = interaction.transactions.clone();
        transactions.push(transaction);
        Ok(OnchainInteraction {
            nonce: Some(nonce),
            transactions,
            should_be_resent: false,
            ..interaction.clone()
        })
    })
}

/// Attaches a receipt to one attempt and discards every other attempt.
///
/// Once an attempt for a nonce lands, the competing attempts can never confirm, so the
/// interaction keeps only the confirmed transaction.
pub fn confirm_transaction(
    interactions: &[NetworkInteraction],
    id: u32,
    hash: &str,
    receipt: TransactionReceipt,
) -> Result<Vec<NetworkInteraction>, InvariantViolation> {
    update_onchain_interaction(interactions, id, |interaction| {
        let confirmed = interaction
            .transactions
            .iter()
            .find(|tx| tx.hash == hash)
            .ok_or_else(|| InvariantViolation::UnknownTransaction {
                id,
                hash: hash.to_string(),
            })?;

        Ok(OnchainInteraction {
            transactions: vec![Transaction {
                receipt: Some(receipt),
                ..confirmed.clone()
            }],
            should_be_resent: false,
            ..interaction.clone()
        })
    })
}

/// Flags an unresolved onchain interaction for resending.
///
/// `clear_nonce` releases the nonce when it was consumed by someone else.
pub fn mark_for_resend(
    interactions: &[NetworkInteraction],
    id: u32,
    clear_nonce: bool,
) -> Result<Vec<NetworkInteraction>, InvariantViolation> {
    update_onchain_interaction(interactions, id, |interaction| {
        if interaction.is_resolved() {
            return Err(InvariantViolation::InteractionResolved { id });
        }
        Ok(OnchainInteraction {
            nonce: if clear_nonce { None } else { interaction.nonce },
            should_be_resent: true,
            ..interaction.clone()
        })
    })
}

/// Checks that `id` names an unresolved onchain interaction.
pub fn ensure_pending_onchain_interaction(
    interactions: &[NetworkInteraction],
    id: u32,
) -> Result<(), InvariantViolation> {
    let position = position_of(interactions, id)?;
    match &interactions[position] {
        NetworkInteraction::Onchain(interaction) if interaction.is_resolved() => {
            Err(InvariantViolation::InteractionResolved { id })
        }
        NetworkInteraction::Onchain(_) => Ok(()),
        NetworkInteraction::StaticCall(_) => Err(InvariantViolation::NotOnchainInteraction { id }),
    }
}

/// Records the result of a static call.
pub fn complete_static_call(
    interactions: &[NetworkInteraction],
    id: u32,
    result: RawStaticCallResult,
) -> Result<Vec<NetworkInteraction>, InvariantViolation> {
    let position = position_of(interactions, id)?;
    let NetworkInteraction::StaticCall(call) = &interactions[position] else {
        return Err(InvariantViolation::NotStaticCall { id });
    };
    if call.result.is_some() {
        return Err(InvariantViolation::StaticCallCompleted { id });
    }
    Ok(replace_at(
        interactions,
        position,
        NetworkInteraction::StaticCall(StaticCall {
            result: Some(result),
            ..call.clone()
        }),
    ))
}
