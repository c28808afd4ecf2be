// Ledger response codes, named as the network and the mirror node spell them.
use std::fmt;
use std::str::FromStr;

macro_rules! statuses {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
        pub enum Status {
            $($variant,)+
            /// A code this client does not know by name.
            Unknown,
        }

        impl Status {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Status::$variant => $name,)+
                    Status::Unknown => "UNKNOWN",
                }
            }
        }

        impl FromStr for Status {
            type Err = std::convert::Infallible;

            fn from_str(input: &str) -> Result<Self, Self::Err> {
                Ok(match input {
                    $($name => Status::$variant,)+
                    _ => Status::Unknown,
                })
            }
        }
    };
}

statuses! {
    Ok => "OK",
    Success => "SUCCESS",
    InvalidTransaction => "INVALID_TRANSACTION",
    InvalidSignature => "INVALID_SIGNATURE",
    InsufficientPayerBalance => "INSUFFICIENT_PAYER_BALANCE",
    InsufficientTxFee => "INSUFFICIENT_TX_FEE",
    InsufficientAccountBalance => "INSUFFICIENT_ACCOUNT_BALANCE",
    InvalidAccountId => "INVALID_ACCOUNT_ID",
    AccountDeleted => "ACCOUNT_DELETED",
    TransferAccountSameAsDeleteAccount => "TRANSFER_ACCOUNT_SAME_AS_DELETE_ACCOUNT",
    InvalidTransferAccountId => "INVALID_TRANSFER_ACCOUNT_ID",
    InvalidAccountAmounts => "INVALID_ACCOUNT_AMOUNTS",
    InvalidFileId => "INVALID_FILE_ID",
    FileDeleted => "FILE_DELETED",
    InvalidContractId => "INVALID_CONTRACT_ID",
    ContractDeleted => "CONTRACT_DELETED",
    ContractExecutionException => "CONTRACT_EXECUTION_EXCEPTION",
    InvalidTokenId => "INVALID_TOKEN_ID",
    TokenAlreadyAssociatedToAccount => "TOKEN_ALREADY_ASSOCIATED_TO_ACCOUNT",
    TokenNotAssociatedToAccount => "TOKEN_NOT_ASSOCIATED_TO_ACCOUNT",
    InsufficientTokenBalance => "INSUFFICIENT_TOKEN_BALANCE",
    TokenHasNoSupplyKey => "TOKEN_HAS_NO_SUPPLY_KEY",
    InvalidTokenMintAmount => "INVALID_TOKEN_MINT_AMOUNT",
    InvalidTokenBurnAmount => "INVALID_TOKEN_BURN_AMOUNT",
    InvalidNftId => "INVALID_NFT_ID",
    TokenMaxSupplyReached => "TOKEN_MAX_SUPPLY_REACHED",
    InvalidTopicId => "INVALID_TOPIC_ID",
    Unauthorized => "UNAUTHORIZED",
    InvalidTopicMessage => "INVALID_TOPIC_MESSAGE",
    MessageSizeTooLarge => "MESSAGE_SIZE_TOO_LARGE",
    MemoTooLong => "MEMO_TOO_LONG",
    NotSupported => "NOT_SUPPORTED",
}

impl Status {
    pub fn is_success(self) -> bool {
        matches!(self, Status::Ok | Status::Success)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Status;

    #[test]
    fn names_round_trip() {
        for status in [
            Status::Success,
            Status::InvalidTopicId,
            Status::TokenNotAssociatedToAccount,
        ] {
            let parsed: Status = status.as_str().parse().expect("infallible");
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn unrecognised_names_are_unknown() {
        let parsed: Status = "SOMETHING_NEW".parse().expect("infallible");
        assert_eq!(parsed, Status::Unknown);
        assert!(!parsed.is_success());
    }
}
