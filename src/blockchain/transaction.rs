//! Transfer instruction building.
//!
//! # Responsibilities
//! - Hold the immutable sender / recipient / lamports triple
//! - Compile it into a legacy message with the sender as fee payer
//! - Produce the unsigned transaction handed to a wallet

use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::system_instruction;
use solana_sdk::transaction::Transaction;

use crate::blockchain::types::{Hash, Pubkey};

/// A native value transfer, derived from a validated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferInstruction {
    sender: Pubkey,
    recipient: Pubkey,
    lamports: u64,
}

impl TransferInstruction {
    pub fn new(sender: Pubkey, recipient: Pubkey, lamports: u64) -> Self {
        Self {
            sender,
            recipient,
            lamports,
        }
    }

    pub fn sender(&self) -> Pubkey {
        self.sender
    }

    pub fn recipient(&self) -> Pubkey {
        self.recipient
    }

    pub fn lamports(&self) -> u64 {
        self.lamports
    }

    /// The System Program transfer instruction.
    pub fn instruction(&self) -> Instruction {
        system_instruction::transfer(&self.sender, &self.recipient, self.lamports)
    }

    /// Message anchored at `blockhash`; the sender is the only signer and
    /// pays the fee.
    pub fn message(&self, blockhash: &Hash) -> Message {
        Message::new_with_blockhash(&[self.instruction()], Some(&self.sender), blockhash)
    }

    /// Transaction with an empty signature slot for the sender.
    pub fn unsigned_transaction(&self, blockhash: &Hash) -> Transaction {
        Transaction::new_unsigned(self.message(blockhash))
    }
}
