//! Transaction units.
//!
//! A [`TransactionUnit`] is an append-only list of commands over an input
//! table. Commands refer to inputs and to results of earlier commands through
//! [`Argument`]s, which makes the unit a directed acyclic graph whose edges
//! always point backwards. [`TransactionUnit::validate`] re-checks that graph
//! before the unit is handed to a [`Submitter`](crate::transport::Submitter).

use crate::error::ComposeError;
use crate::types::{ObjectId, SuiAddress};
use blake2::digest::{consts::U32, Digest};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Most commands a single unit may carry.
pub const MAX_COMMANDS: usize = 1_024;

/// Most inputs a single unit may carry; every index must fit an `Input(u16)`.
pub const MAX_INPUTS: usize = u16::MAX as usize + 1;

type Blake2b256 = blake2::Blake2b<U32>;

/// Reference to a value available to a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Argument {
    /// The coin paying for gas.
    GasCoin,
    /// Entry of the input table.
    Input(u16),
    /// Sole result of an earlier command.
    Result(u16),
    /// One result of an earlier multi-result command.
    NestedResult(u16, u16),
}

impl Argument {
    fn producer(&self) -> Option<u16> {
        match self {
            Self::Result(cmd) | Self::NestedResult(cmd, _) => Some(*cmd),
            Self::GasCoin | Self::Input(_) => None,
        }
    }

    // `Result(i)` and `NestedResult(i, 0)` name the same value.
    fn value_key(&self) -> Self {
        match self {
            Self::Result(cmd) => Self::NestedResult(*cmd, 0),
            other => *other,
        }
    }
}

/// Object input left for the transport to resolve to a concrete version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectArg {
    /// Shared object, optionally borrowed mutably.
    Shared {
        /// Object id.
        id: ObjectId,
        /// Whether any command takes it by `&mut`.
        mutable: bool,
    },
    /// Object owned by the sender.
    Owned {
        /// Object id.
        id: ObjectId,
    },
}

impl ObjectArg {
    /// Object id.
    pub fn id(&self) -> ObjectId {
        match self {
            Self::Shared { id, .. } | Self::Owned { id } => *id,
        }
    }
}

/// Entry of the input table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallInput {
    /// Ledger object.
    Object(ObjectArg),
    /// Serialized pure value.
    Pure(#[serde(with = "hex_bytes")] Vec<u8>),
}

/// One contract entry-point call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCall {
    /// Package holding the module.
    pub package: ObjectId,
    /// Module name.
    pub module: String,
    /// Function name.
    pub function: String,
    /// Type arguments, fully qualified.
    pub type_arguments: Vec<String>,
    /// Call arguments in declaration order.
    pub arguments: Vec<Argument>,
    /// Arguments passed by value; each is used up by this call.
    pub consumed: Vec<Argument>,
    /// Number of values the call returns.
    pub returns: u16,
}

/// Command inside a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Contract call.
    MoveCall(MoveCall),
    /// Splits `amounts` off `coin`, one new coin per amount.
    SplitCoins {
        /// Coin to split (borrowed).
        coin: Argument,
        /// Pure u64 amounts.
        amounts: Vec<Argument>,
    },
    /// Merges `sources` into `destination`.
    MergeCoins {
        /// Coin receiving the balance (borrowed).
        destination: Argument,
        /// Coins used up by the merge.
        sources: Vec<Argument>,
    },
    /// Sends `objects` to `recipient`.
    TransferObjects {
        /// Objects moved to the recipient.
        objects: Vec<Argument>,
        /// Pure address.
        recipient: Argument,
    },
}

impl Command {
    fn references(&self) -> Vec<Argument> {
        match self {
            Self::MoveCall(call) => call.arguments.clone(),
            Self::SplitCoins { coin, amounts } => {
                std::iter::once(*coin).chain(amounts.iter().copied()).collect()
            }
            Self::MergeCoins {
                destination,
                sources,
            } => std::iter::once(*destination)
                .chain(sources.iter().copied())
                .collect(),
            Self::TransferObjects { objects, recipient } => objects
                .iter()
                .copied()
                .chain(std::iter::once(*recipient))
                .collect(),
        }
    }

    fn consumes(&self) -> &[Argument] {
        match self {
            Self::MoveCall(call) => call.consumed.as_slice(),
            Self::SplitCoins { .. } => &[],
            Self::MergeCoins { sources, .. } => sources.as_slice(),
            Self::TransferObjects { objects, .. } => objects.as_slice(),
        }
    }

    fn result_count(&self) -> usize {
        match self {
            Self::MoveCall(call) => usize::from(call.returns),
            Self::SplitCoins { amounts, .. } => amounts.len(),
            Self::MergeCoins { .. } | Self::TransferObjects { .. } => 0,
        }
    }

    fn label(&self) -> String {
        match self {
            Self::MoveCall(call) => format!("{}::{}", call.module, call.function),
            Self::SplitCoins { .. } => "split_coins".to_string(),
            Self::MergeCoins { .. } => "merge_coins".to_string(),
            Self::TransferObjects { .. } => "transfer_objects".to_string(),
        }
    }
}

/// Producer → consumer edge between two commands of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Dependency {
    /// Index of the command producing the value.
    pub producer: u16,
    /// Index of the command reading it.
    pub consumer: u16,
}

/// Handle to a coin inside a unit.
///
/// Handles are move-only: passing one by value into a composer operation or
/// a merge/transfer uses the coin up, so it cannot be consumed twice.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a coin handle must be consumed, merged, or transferred"]
pub struct CoinHandle(Argument);

impl CoinHandle {
    pub(crate) fn new(argument: Argument) -> Self {
        Self(argument)
    }

    /// Underlying argument, for inspection.
    pub fn argument(&self) -> Argument {
        self.0
    }

    pub(crate) fn into_argument(self) -> Argument {
        self.0
    }
}

/// Ordered, append-only batch of commands submitted atomically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionUnit {
    inputs: Vec<CallInput>,
    commands: Vec<Command>,
}

impl TransactionUnit {
    /// Empty unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no command has been appended.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Input table.
    pub fn inputs(&self) -> &[CallInput] {
        &self.inputs
    }

    /// Commands in append order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    fn push_input(&mut self, input: CallInput) -> Argument {
        let index = u16::try_from(self.inputs.len()).unwrap_or(u16::MAX);
        self.inputs.push(input);
        Argument::Input(index)
    }

    /// Adds a serialized pure value.
    pub fn pure(&mut self, bytes: Vec<u8>) -> Argument {
        self.push_input(CallInput::Pure(bytes))
    }

    /// Adds a little-endian u64.
    pub fn pure_u64(&mut self, value: u64) -> Argument {
        self.pure(value.to_le_bytes().to_vec())
    }

    /// Adds a 32-byte address.
    pub fn pure_address(&mut self, address: &SuiAddress) -> Argument {
        self.pure(address.as_bytes().to_vec())
    }

    /// Adds (or reuses) a shared object input. Mutability only ever widens.
    pub fn shared_object(&mut self, id: ObjectId, mutable: bool) -> Argument {
        for (index, input) in self.inputs.iter_mut().enumerate() {
            if let CallInput::Object(ObjectArg::Shared {
                id: existing,
                mutable: existing_mut,
            }) = input
            {
                if *existing == id {
                    *existing_mut |= mutable;
                    return Argument::Input(u16::try_from(index).unwrap_or(u16::MAX));
                }
            }
        }
        self.push_input(CallInput::Object(ObjectArg::Shared { id, mutable }))
    }

    /// Adds (or reuses) an owned object input.
    pub fn owned_object(&mut self, id: ObjectId) -> Argument {
        let existing = self.inputs.iter().position(|input| {
            matches!(input, CallInput::Object(ObjectArg::Owned { id: existing }) if *existing == id)
        });
        match existing {
            Some(index) => Argument::Input(u16::try_from(index).unwrap_or(u16::MAX)),
            None => self.push_input(CallInput::Object(ObjectArg::Owned { id })),
        }
    }

    /// Owned coin object as a handle.
    pub fn coin_input(&mut self, id: ObjectId) -> CoinHandle {
        CoinHandle::new(self.owned_object(id))
    }

    pub(crate) fn push(&mut self, command: Command) -> u16 {
        let index = u16::try_from(self.commands.len()).unwrap_or(u16::MAX);
        debug!(evt = "append", index, command = %command.label(), "appended command");
        self.commands.push(command);
        index
    }

    /// Splits `amount` off the gas coin.
    pub fn split_gas(&mut self, amount: u64) -> CoinHandle {
        let amount = self.pure_u64(amount);
        let index = self.push(Command::SplitCoins {
            coin: Argument::GasCoin,
            amounts: vec![amount],
        });
        CoinHandle::new(Argument::NestedResult(index, 0))
    }

    /// Splits `amount` off `coin`, which stays usable.
    pub fn split_coin(&mut self, coin: &CoinHandle, amount: u64) -> CoinHandle {
        let amount = self.pure_u64(amount);
        let index = self.push(Command::SplitCoins {
            coin: coin.argument(),
            amounts: vec![amount],
        });
        CoinHandle::new(Argument::NestedResult(index, 0))
    }

    /// Merges `sources` into `destination`. No-op for an empty source list.
    pub fn merge_coins(&mut self, destination: &CoinHandle, sources: Vec<CoinHandle>) {
        if sources.is_empty() {
            return;
        }
        self.push(Command::MergeCoins {
            destination: destination.argument(),
            sources: sources.into_iter().map(CoinHandle::into_argument).collect(),
        });
    }

    /// Sends a coin to `recipient`.
    pub fn transfer_coin(&mut self, coin: CoinHandle, recipient: &SuiAddress) {
        self.transfer_objects(vec![coin.into_argument()], recipient);
    }

    pub(crate) fn transfer_objects(&mut self, objects: Vec<Argument>, recipient: &SuiAddress) {
        let recipient = self.pure_address(recipient);
        self.push(Command::TransferObjects { objects, recipient });
    }

    /// Producer → consumer edges, deduplicated and sorted.
    pub fn dependencies(&self) -> Vec<Dependency> {
        let mut edges = Vec::new();
        for (consumer, command) in self.commands.iter().enumerate() {
            let consumer = u16::try_from(consumer).unwrap_or(u16::MAX);
            for argument in command.references() {
                if let Some(producer) = argument.producer() {
                    edges.push(Dependency { producer, consumer });
                }
            }
        }
        edges.sort();
        edges.dedup();
        edges
    }

    /// Checks the reference graph and seals the unit.
    ///
    /// Every argument must name an existing input or a result of an
    /// *earlier* command, and every by-value argument must be used exactly
    /// once and never read afterwards.
    pub fn validate(self) -> Result<ValidatedUnit, ComposeError> {
        if self.commands.is_empty() {
            return Err(ComposeError::MalformedUnit("unit has no commands".into()));
        }
        if self.commands.len() > MAX_COMMANDS {
            return Err(ComposeError::MalformedUnit(format!(
                "{} commands exceed the limit of {MAX_COMMANDS}",
                self.commands.len()
            )));
        }
        if self.inputs.len() > MAX_INPUTS {
            return Err(ComposeError::MalformedUnit(format!(
                "{} inputs exceed the limit of {MAX_INPUTS}",
                self.inputs.len()
            )));
        }

        let mut consumed_by: HashMap<Argument, usize> = HashMap::new();
        for (index, command) in self.commands.iter().enumerate() {
            let references = command.references();
            for argument in &references {
                self.check_reference(index, argument)?;
                if let Some(by) = consumed_by.get(&argument.value_key()) {
                    return Err(ComposeError::MalformedUnit(format!(
                        "command {index} ({}) reads {argument:?} after command {by} consumed it",
                        command.label()
                    )));
                }
            }
            for argument in command.consumes() {
                if !references.contains(argument) {
                    return Err(ComposeError::MalformedUnit(format!(
                        "command {index} consumes {argument:?} without passing it"
                    )));
                }
                if self.is_pure(argument) {
                    continue;
                }
                let key = argument.value_key();
                let uses = references.iter().filter(|a| a.value_key() == key).count();
                if uses > 1 || consumed_by.insert(key, index).is_some() {
                    return Err(ComposeError::MalformedUnit(format!(
                        "command {index} ({}) consumes {argument:?} more than once",
                        command.label()
                    )));
                }
            }
        }

        let bytes = serde_json::to_vec(&self)
            .map_err(|err| ComposeError::MalformedUnit(format!("unit encoding failed: {err}")))?;
        let digest: [u8; 32] = Blake2b256::digest(&bytes).into();
        Ok(ValidatedUnit { unit: self, digest })
    }

    fn check_reference(&self, index: usize, argument: &Argument) -> Result<(), ComposeError> {
        let dangling = |reason: String| -> Result<(), ComposeError> {
            Err(ComposeError::MalformedUnit(format!(
                "command {index} references {argument:?}: {reason}"
            )))
        };
        match *argument {
            Argument::GasCoin => Ok(()),
            Argument::Input(input) if usize::from(input) < self.inputs.len() => Ok(()),
            Argument::Input(_) => dangling(format!("only {} inputs", self.inputs.len())),
            Argument::Result(cmd) | Argument::NestedResult(cmd, _)
                if usize::from(cmd) >= index =>
            {
                dangling("producer is not an earlier command".into())
            }
            Argument::Result(cmd) => match self.commands[usize::from(cmd)].result_count() {
                1 => Ok(()),
                n => dangling(format!("producer returns {n} values")),
            },
            Argument::NestedResult(cmd, slot) => {
                let count = self.commands[usize::from(cmd)].result_count();
                if usize::from(slot) < count {
                    Ok(())
                } else {
                    dangling(format!("producer returns {count} values"))
                }
            }
        }
    }

    fn is_pure(&self, argument: &Argument) -> bool {
        matches!(argument, Argument::Input(i)
            if matches!(self.inputs.get(usize::from(*i)), Some(CallInput::Pure(_))))
    }
}

/// A unit whose reference graph passed validation, with its digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUnit {
    unit: TransactionUnit,
    digest: [u8; 32],
}

impl ValidatedUnit {
    /// The sealed unit.
    pub fn unit(&self) -> &TransactionUnit {
        &self.unit
    }

    /// BLAKE2b-256 over the unit's JSON encoding.
    pub fn digest(&self) -> [u8; 32] {
        self.digest
    }

    /// Hex form of [`digest`](Self::digest).
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }

    /// Gives the unit back.
    pub fn into_inner(self) -> TransactionUnit {
        self.unit
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        hex::decode(raw).map_err(serde::de::Error::custom)
    }
}
