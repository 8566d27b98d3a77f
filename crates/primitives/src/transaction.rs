use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rpc::{Address, ObjectId};

/// Fully qualified Move function: `package::module::function`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MoveTarget {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
}

impl MoveTarget {
    pub fn new(package: ObjectId, module: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            package,
            module: module.into(),
            function: function.into(),
        }
    }
}

impl fmt::Display for MoveTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.package, self.module, self.function)
    }
}

impl From<MoveTarget> for String {
    fn from(value: MoveTarget) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for MoveTarget {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let mut parts = value.splitn(3, "::");
        match (parts.next(), parts.next(), parts.next()) {
            (Some(package), Some(module), Some(function)) if !module.is_empty() && !function.is_empty() => {
                let package = ObjectId::from_hex(package).map_err(|e| e.to_string())?;
                Ok(MoveTarget::new(package, module, function))
            }
            _ => Err(format!("invalid move target: {}", value)),
        }
    }
}

/// A pure (BCS-encodable) input value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PureValue {
    String(String),
    U64(u64),
    Address(Address),
    Bool(bool),
}

/// An input of the transaction, referenced by index from commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CallArg {
    Pure { value: PureValue },
    Object { object_id: ObjectId },
}

/// A value usable as a command argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Argument {
    GasCoin,
    Input(u16),
    Result(u16),
    NestedResult(u16, u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    #[serde(rename_all = "camelCase")]
    MoveCall {
        target: MoveTarget,
        arguments: Vec<Argument>,
        type_arguments: Vec<String>,
    },
    SplitCoins {
        coin: Argument,
        amounts: Vec<Argument>,
    },
    MergeCoins {
        destination: Argument,
        sources: Vec<Argument>,
    },
    TransferObjects {
        objects: Vec<Argument>,
        address: Argument,
    },
}

/// An unsigned programmable transaction, ready to hand to a wallet.
///
/// Built once by [`TransactionBuilder`] and never mutated afterwards except
/// for filling in the sender right before signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
    inputs: Vec<CallArg>,
    commands: Vec<Command>,
    sender: Option<Address>,
    gas_budget: Option<u64>,
}

impl UnsignedTransaction {
    pub fn inputs(&self) -> &[CallArg] {
        &self.inputs
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn sender(&self) -> Option<Address> {
        self.sender
    }

    pub fn gas_budget(&self) -> Option<u64> {
        self.gas_budget
    }

    /// Returns the transaction with `sender` set, keeping an existing sender.
    pub fn with_default_sender(mut self, sender: Address) -> Self {
        if self.sender.is_none() {
            self.sender = Some(sender);
        }
        self
    }

    /// Targets of every move call, in command order.
    pub fn move_targets(&self) -> impl Iterator<Item = &MoveTarget> {
        self.commands.iter().filter_map(|command| match command {
            Command::MoveCall { target, .. } => Some(target),
            _ => None,
        })
    }
}

/// Accumulates inputs and commands in order.
#[derive(Debug, Default)]
pub struct TransactionBuilder {
    inputs: Vec<CallArg>,
    commands: Vec<Command>,
    sender: Option<Address>,
    gas_budget: Option<u64>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_input(&mut self, arg: CallArg) -> Argument {
        self.inputs.push(arg);
        Argument::Input((self.inputs.len() - 1) as u16)
    }

    fn push_command(&mut self, command: Command) -> u16 {
        self.commands.push(command);
        (self.commands.len() - 1) as u16
    }

    pub fn pure(&mut self, value: PureValue) -> Argument {
        self.push_input(CallArg::Pure { value })
    }

    pub fn pure_string(&mut self, value: impl Into<String>) -> Argument {
        self.pure(PureValue::String(value.into()))
    }

    pub fn pure_u64(&mut self, value: u64) -> Argument {
        self.pure(PureValue::U64(value))
    }

    pub fn pure_address(&mut self, value: Address) -> Argument {
        self.pure(PureValue::Address(value))
    }

    pub fn object(&mut self, object_id: ObjectId) -> Argument {
        self.push_input(CallArg::Object { object_id })
    }

    pub fn gas(&self) -> Argument {
        Argument::GasCoin
    }

    pub fn move_call(&mut self, target: MoveTarget, arguments: Vec<Argument>) -> Argument {
        let index = self.push_command(Command::MoveCall {
            target,
            arguments,
            type_arguments: vec![],
        });
        Argument::Result(index)
    }

    /// Splits `amounts` off `coin`, returning one argument per new coin.
    pub fn split_coins(&mut self, coin: Argument, amounts: Vec<Argument>) -> Vec<Argument> {
        let count = amounts.len() as u16;
        let index = self.push_command(Command::SplitCoins { coin, amounts });
        (0..count).map(|i| Argument::NestedResult(index, i)).collect()
    }

    pub fn merge_coins(&mut self, destination: Argument, sources: Vec<Argument>) {
        self.push_command(Command::MergeCoins { destination, sources });
    }

    pub fn transfer_objects(&mut self, objects: Vec<Argument>, address: Argument) {
        self.push_command(Command::TransferObjects { objects, address });
    }

    pub fn set_sender(&mut self, sender: Address) {
        self.sender = Some(sender);
    }

    pub fn set_gas_budget(&mut self, budget: u64) {
        self.gas_budget = Some(budget);
    }

    pub fn finish(self) -> UnsignedTransaction {
        UnsignedTransaction {
            inputs: self.inputs,
            commands: self.commands,
            sender: self.sender,
            gas_budget: self.gas_budget,
        }
    }
}

/// Bytes and signatures produced by a sign-only wallet feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    /// Base64 encoded transaction data
    pub transaction_bytes: String,
    pub signatures: Vec<String>,
}
