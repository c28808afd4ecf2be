//! Purpose: Smart contract create, call and delete operations.
//! Exports: `ContractCreateRequest`, `ContractCallRequest`, `ContractDeleteRequest` and results.
//! Invariants: Gas is always positive; payable and initial balances are never negative.
use bytes::Bytes;

use crate::config::Operator;
use crate::core::amount::Hbar;
use crate::core::entity::{AccountId, ContractId, FileId, TransactionId};
use crate::core::error::{ApiResult, Error};
use crate::core::key::PublicKey;
use crate::core::status::Status;
use crate::protocol::network::TransactionBody;
use crate::protocol::options::{
    KeySource, TransactionOptions, check_memo, check_non_negative, check_positive,
};
use crate::protocol::request::{Operation, OperationKind, Outcome, Request, required};

/// Gas used when a factory is not given an explicit limit.
pub const DEFAULT_CONTRACT_GAS: u64 = 100_000;

fn check_gas(gas: u64) -> ApiResult<u64> {
    let signed = i64::try_from(gas)
        .map_err(|_| Error::invalid_argument(format!("gas {gas} is out of range")))?;
    check_positive(signed, "gas")?;
    Ok(gas)
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContractCreateRequest {
    bytecode_file_id: FileId,
    gas: u64,
    constructor_parameters: Bytes,
    initial_balance: Hbar,
    admin_key: KeySource,
    memo: Option<String>,
    options: TransactionOptions,
}

impl ContractCreateRequest {
    /// Deploys the bytecode stored in `bytecode_file_id`, administered by the operator key.
    pub fn of(bytecode_file_id: FileId) -> Self {
        Self {
            bytecode_file_id,
            gas: DEFAULT_CONTRACT_GAS,
            constructor_parameters: Bytes::new(),
            initial_balance: Hbar::ZERO,
            admin_key: KeySource::Operator,
            memo: None,
            options: TransactionOptions::default(),
        }
    }

    pub fn of_parameters(
        bytecode_file_id: FileId,
        gas: u64,
        constructor_parameters: impl Into<Bytes>,
    ) -> ApiResult<Self> {
        Ok(Self {
            gas: check_gas(gas)?,
            constructor_parameters: constructor_parameters.into(),
            ..Self::of(bytecode_file_id)
        })
    }

    /// Passing `None` deploys an immutable contract.
    pub fn of_admin_key(
        bytecode_file_id: FileId,
        gas: u64,
        constructor_parameters: impl Into<Bytes>,
        admin_key: Option<PublicKey>,
    ) -> ApiResult<Self> {
        let mut request = Self::of_parameters(bytecode_file_id, gas, constructor_parameters)?;
        request.admin_key = admin_key.into();
        Ok(request)
    }

    pub fn with_initial_balance(mut self, initial_balance: Hbar) -> ApiResult<Self> {
        check_non_negative(initial_balance, "initial balance")?;
        self.initial_balance = initial_balance;
        Ok(self)
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> ApiResult<Self> {
        let memo = memo.into();
        check_memo(&memo, "contract memo")?;
        self.memo = Some(memo);
        Ok(self)
    }

    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn gas(&self) -> u64 {
        self.gas
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContractCreateResult {
    pub transaction_id: TransactionId,
    pub status: Status,
    pub contract_id: ContractId,
}

impl Request for ContractCreateRequest {
    type Output = ContractCreateResult;

    fn kind(&self) -> OperationKind {
        OperationKind::ContractCreate
    }

    fn operation(&self, operator: &Operator) -> ApiResult<Operation> {
        Ok(Operation::Transaction {
            body: TransactionBody::ContractCreate {
                bytecode_file_id: self.bytecode_file_id,
                gas: self.gas,
                constructor_parameters: self.constructor_parameters.clone(),
                initial_balance: self.initial_balance,
                admin_key: self.admin_key.resolve(operator),
                memo: self.memo.clone(),
            },
            options: self.options.clone(),
        })
    }

    fn output(outcome: Outcome) -> ApiResult<Self::Output> {
        let kind = OperationKind::ContractCreate;
        let receipt = outcome.into_receipt(kind)?;
        Ok(ContractCreateResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
            contract_id: required(receipt.contract_id, &receipt, kind, "contract id")?,
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContractCallRequest {
    contract_id: ContractId,
    gas: u64,
    function_parameters: Bytes,
    payable_amount: Hbar,
    options: TransactionOptions,
}

impl ContractCallRequest {
    /// `function_parameters` is the ABI-encoded selector and arguments.
    pub fn of(contract_id: ContractId, function_parameters: impl Into<Bytes>) -> Self {
        Self {
            contract_id,
            gas: DEFAULT_CONTRACT_GAS,
            function_parameters: function_parameters.into(),
            payable_amount: Hbar::ZERO,
            options: TransactionOptions::default(),
        }
    }

    pub fn of_gas(
        contract_id: ContractId,
        gas: u64,
        function_parameters: impl Into<Bytes>,
    ) -> ApiResult<Self> {
        Ok(Self {
            gas: check_gas(gas)?,
            ..Self::of(contract_id, function_parameters)
        })
    }

    pub fn of_payable(
        contract_id: ContractId,
        gas: u64,
        function_parameters: impl Into<Bytes>,
        payable_amount: Hbar,
    ) -> ApiResult<Self> {
        check_non_negative(payable_amount, "payable amount")?;
        let mut request = Self::of_gas(contract_id, gas, function_parameters)?;
        request.payable_amount = payable_amount;
        Ok(request)
    }

    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContractCallResult {
    pub transaction_id: TransactionId,
    pub status: Status,
    pub gas_used: u64,
    pub result: Bytes,
}

impl Request for ContractCallRequest {
    type Output = ContractCallResult;

    fn kind(&self) -> OperationKind {
        OperationKind::ContractCall
    }

    fn operation(&self, _operator: &Operator) -> ApiResult<Operation> {
        Ok(Operation::Transaction {
            body: TransactionBody::ContractCall {
                contract_id: self.contract_id,
                gas: self.gas,
                function_parameters: self.function_parameters.clone(),
                payable_amount: self.payable_amount,
            },
            options: self.options.clone(),
        })
    }

    fn output(outcome: Outcome) -> ApiResult<Self::Output> {
        let kind = OperationKind::ContractCall;
        let receipt = outcome.into_receipt(kind)?;
        let call = required(receipt.contract_call.clone(), &receipt, kind, "call result")?;
        Ok(ContractCallResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
            gas_used: call.gas_used,
            result: call.result,
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContractDeleteRequest {
    contract_id: ContractId,
    transfer_account_id: Option<AccountId>,
    options: TransactionOptions,
}

impl ContractDeleteRequest {
    /// Remaining balance goes to the operator account.
    pub fn of(contract_id: ContractId) -> Self {
        Self {
            contract_id,
            transfer_account_id: None,
            options: TransactionOptions::default(),
        }
    }

    pub fn of_transfer(contract_id: ContractId, transfer_account_id: AccountId) -> Self {
        Self {
            transfer_account_id: Some(transfer_account_id),
            ..Self::of(contract_id)
        }
    }

    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContractDeleteResult {
    pub transaction_id: TransactionId,
    pub status: Status,
}

impl Request for ContractDeleteRequest {
    type Output = ContractDeleteResult;

    fn kind(&self) -> OperationKind {
        OperationKind::ContractDelete
    }

    fn operation(&self, operator: &Operator) -> ApiResult<Operation> {
        Ok(Operation::Transaction {
            body: TransactionBody::ContractDelete {
                contract_id: self.contract_id,
                transfer_account_id: self.transfer_account_id.unwrap_or(operator.account_id),
            },
            options: self.options.clone(),
        })
    }

    fn output(outcome: Outcome) -> ApiResult<Self::Output> {
        let receipt = outcome.into_receipt(OperationKind::ContractDelete)?;
        Ok(ContractDeleteResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
        })
    }
}
